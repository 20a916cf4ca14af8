// Filter -> sort -> search pipeline producing the visible rows

use crate::filter::FilterMode;
use crate::models::Task;
use crate::sort::SortMode;

/// Filter then sort a task sequence. Pure; the input order is insertion order.
pub fn compute_view(tasks: &[Task], filter: FilterMode, sort: SortMode) -> Vec<&Task> {
    let mut view: Vec<&Task> = tasks.iter().filter(|t| filter.matches(t)).collect();
    sort.apply(&mut view);
    view
}

/// Plain-text rendering of a task as it appears in a listing
///
/// Free-text search runs over exactly this text.
pub fn rendered_text(task: &Task) -> String {
    format!(
        "{}\n{}\nCategory: {} | Priority: {}\nDue: {}",
        task.title,
        task.description,
        task.category,
        task.priority,
        task.due_date.as_deref().unwrap_or("No date"),
    )
}

/// Keep rows whose rendered text contains `term`, ignoring case
pub fn search<'a>(view: Vec<&'a Task>, term: &str) -> Vec<&'a Task> {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return view;
    }
    view.into_iter()
        .filter(|t| rendered_text(t).to_lowercase().contains(&term))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Priority, TaskId};

    fn task(title: &str, priority: Priority, completed: bool) -> Task {
        Task {
            id: TaskId::new(),
            title: title.to_string(),
            description: format!("about {}", title),
            priority,
            category: "general".to_string(),
            due_date: None,
            completed,
        }
    }

    fn sample() -> Vec<Task> {
        vec![
            task("alpha", Priority::Low, false),
            task("bravo", Priority::High, true),
            task("charlie", Priority::Medium, false),
        ]
    }

    #[test]
    fn test_none_filter_is_always_empty() {
        let tasks = sample();
        for sort in [SortMode::None, SortMode::Date, SortMode::Priority, SortMode::Category] {
            assert!(compute_view(&tasks, FilterMode::None, sort).is_empty());
        }
    }

    #[test]
    fn test_all_unsorted_is_insertion_order() {
        let tasks = sample();
        let view = compute_view(&tasks, FilterMode::All, SortMode::None);
        let titles: Vec<&str> = view.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["alpha", "bravo", "charlie"]);
    }

    #[test]
    fn test_active_and_completed_partition() {
        let tasks = sample();
        let active = compute_view(&tasks, FilterMode::Active, SortMode::None);
        let completed = compute_view(&tasks, FilterMode::Completed, SortMode::None);

        assert!(active.iter().all(|t| !t.completed));
        assert!(completed.iter().all(|t| t.completed));
        assert_eq!(active.len() + completed.len(), tasks.len());
    }

    #[test]
    fn test_filter_then_sort() {
        let tasks = sample();
        let view = compute_view(&tasks, FilterMode::Active, SortMode::Priority);
        let titles: Vec<&str> = view.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["charlie", "alpha"]);
    }

    #[test]
    fn test_rendered_text_shows_no_date() {
        let text = rendered_text(&task("alpha", Priority::High, false));
        assert!(text.contains("Category: general | Priority: high"));
        assert!(text.contains("Due: No date"));
    }

    #[test]
    fn test_search_is_case_insensitive_over_rendered_text() {
        let tasks = sample();
        let view = compute_view(&tasks, FilterMode::All, SortMode::None);

        let hits = search(view.clone(), "BRAVO");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "bravo");

        // Matches the priority line, not only the title
        let hits = search(view.clone(), "priority: medium");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "charlie");

        assert_eq!(search(view, "  ").len(), 3);
    }
}
