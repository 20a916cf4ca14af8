// Terminal rendering of task rows and notifications

use crate::models::{Priority, Task};
use crate::notify::{Notification, NotificationKind};
use colored::{ColoredString, Colorize};

/// One listing line plus an optional indented description line
pub fn render_row(task: &Task, selected: bool, dark_mode: bool) -> String {
    let check = if task.completed { "[x]" } else { "[ ]" };
    let marker = if selected { "*" } else { " " };
    let title = if task.completed {
        task.title.strikethrough().dimmed()
    } else {
        task.title.bold()
    };

    let mut line = format!(
        "{}{} {} {}  {} | {} | Due: {}",
        marker,
        task.id.short().dimmed(),
        check,
        title,
        priority_label(task.priority, dark_mode),
        task.category,
        task.due_date.as_deref().unwrap_or("No date"),
    );

    if !task.description.is_empty() {
        line.push_str(&format!("\n             {}", task.description));
    }
    line
}

pub fn render_notification(notification: &Notification) -> ColoredString {
    match notification.kind {
        NotificationKind::Success => notification.message.green(),
        NotificationKind::Warning => notification.message.yellow(),
        NotificationKind::Error => notification.message.red(),
    }
}

// Dark mode swaps to the bright palette so labels stay readable on dark backgrounds
fn priority_label(priority: Priority, dark_mode: bool) -> ColoredString {
    let label = priority.as_str();
    match (priority, dark_mode) {
        (Priority::High, false) => label.red(),
        (Priority::High, true) => label.bright_red(),
        (Priority::Medium, false) => label.yellow(),
        (Priority::Medium, true) => label.bright_yellow(),
        (Priority::Low, false) => label.green(),
        (Priority::Low, true) => label.bright_green(),
    }
}
