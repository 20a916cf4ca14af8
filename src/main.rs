use clap::{ArgAction, Args, Parser, Subcommand};
use colored::Colorize;
use eyre::Result;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tasklist::lock::SessionLock;
use tasklist::notify::NotificationKind;
use tasklist::render::{render_notification, render_row};
use tasklist::storage::STORE_DIR;
use tasklist::{
    App, Config, ContactMessage, FilterMode, KeyValueStore, MemoryStorage, OutboxDispatcher, Priority, SortMode,
    SqliteStorage, TaskDraft, TaskId, TaskResult,
};
use tracing::warn;
use tracing_subscriber::EnvFilter;

type CliApp = App<Box<dyn KeyValueStore>, OutboxDispatcher>;

#[derive(Parser)]
#[command(name = "tasklist")]
#[command(about = "tasklist - Local task list manager with filtered views, batch edits and JSON import/export")]
#[command(version)]
struct Cli {
    /// Directory holding the task store (overrides the config file)
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Path to the config file (default: <config dir>/tasklist/config.yaml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(flatten)]
    Task(TaskCommand),

    /// List tasks
    List(ListArgs),

    /// Start an interactive session with selection and batch commands
    Shell,
}

/// Commands available both from the command line and inside the shell
#[derive(Subcommand)]
enum TaskCommand {
    /// Add a new task
    Add(AddArgs),

    /// Toggle completion of a task
    Done {
        /// Task id or unique id prefix
        id: String,
    },

    /// Change the title of a task
    Edit {
        /// Task id or unique id prefix
        id: String,
        #[arg(required = true, num_args = 1..)]
        title: Vec<String>,
    },

    /// Delete a task
    Delete {
        /// Task id or unique id prefix
        id: String,
    },

    /// Replace all tasks with the contents of a tasks.json file
    Import { file: PathBuf },

    /// Write all tasks to tasks.json in a directory
    Export {
        #[arg(default_value = ".")]
        dir: PathBuf,
    },

    /// Toggle dark mode
    DarkMode,

    /// Send a message through the contact form
    Contact(ContactArgs),

    /// Show contact messages waiting in the outbox
    Outbox,
}

#[derive(Args)]
struct AddArgs {
    #[arg(short, long, default_value = "")]
    description: String,

    #[arg(short, long, default_value = "medium")]
    priority: Priority,

    #[arg(short, long, default_value = tasklist::models::DEFAULT_CATEGORY)]
    category: String,

    /// Due date, YYYY-MM-DD
    #[arg(long)]
    due: Option<String>,

    #[arg(required = true, num_args = 1..)]
    title: Vec<String>,
}

#[derive(Args)]
struct ListArgs {
    /// none, all, active, completed or high
    #[arg(short, long)]
    filter: Option<FilterMode>,

    /// none, date, priority or category
    #[arg(short, long)]
    sort: Option<SortMode>,

    /// Only show tasks whose text contains this term
    #[arg(long)]
    search: Option<String>,
}

#[derive(Args)]
struct ContactArgs {
    #[arg(long)]
    name: String,

    #[arg(long)]
    email: String,

    #[arg(required = true, num_args = 1..)]
    message: Vec<String>,
}

#[derive(Parser)]
#[command(no_binary_name = true, name = "tasklist", disable_version_flag = true)]
struct ShellLine {
    #[command(subcommand)]
    command: ShellCommand,
}

#[derive(Subcommand)]
enum ShellCommand {
    #[command(flatten)]
    Task(TaskCommand),

    /// Show the current view
    List,

    /// Change the filter: none, all, active, completed or high
    Filter { mode: FilterMode },

    /// Change the sort: none, date, priority or category
    Sort { mode: SortMode },

    /// Narrow the view to tasks containing a term; no term clears it
    Search { term: Vec<String> },

    /// Toggle selection of a task
    Select {
        /// Task id or unique id prefix
        id: String,
    },

    /// Select every task
    SelectAll,

    /// Clear the selection
    Clear,

    /// Delete all selected tasks
    BatchDelete,

    /// Complete all selected tasks
    BatchComplete,

    /// Leave the shell
    #[command(alias = "exit")]
    Quit,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    let config = Config::load(cli.config.as_deref())?;
    let data_dir = match cli.data_dir {
        Some(dir) => dir,
        None => config.data_dir()?,
    };
    let store_dir = data_dir.join(STORE_DIR);

    let _lock = match lock_store(&store_dir) {
        Ok(lock) => Some(lock),
        Err(e) => {
            warn!(error = %e, "Could not lock the task store");
            None
        }
    };

    let storage: Box<dyn KeyValueStore> = match SqliteStorage::open(&data_dir) {
        Ok(storage) => Box::new(storage),
        Err(e) => {
            warn!(error = %e, "Falling back to in-memory storage");
            eprintln!(
                "{}",
                "Storage unavailable; changes kept for this session only.".yellow()
            );
            Box::new(MemoryStorage::new())
        }
    };

    let mut app = App::open(storage, OutboxDispatcher::new(&store_dir));
    // Startup problems would otherwise be replaced by the command's own message
    print_notification(&mut app);
    app.set_filter(config.default_filter);
    app.set_sort(config.default_sort);

    match cli.command {
        Commands::Task(cmd) => {
            if let Err(e) = run_task_command(&mut app, cmd) {
                app.notifications_mut().dismiss();
                return Err(e.into());
            }
            print_notification(&mut app);
        }
        Commands::List(args) => {
            if let Some(filter) = args.filter {
                app.set_filter(filter);
            }
            if let Some(sort) = args.sort {
                app.set_sort(sort);
            }
            if let Some(term) = args.search {
                app.set_search(term);
            }
            print_view(&app);
        }
        Commands::Shell => run_shell(&mut app)?,
    }

    Ok(())
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn lock_store(store_dir: &Path) -> TaskResult<SessionLock> {
    if let Some(lock) = SessionLock::try_acquire(store_dir)? {
        return Ok(lock);
    }

    eprintln!(
        "{}",
        "Another tasklist session is using this store; waiting for it to finish...".yellow()
    );
    SessionLock::acquire(store_dir)
}

fn run_task_command(app: &mut CliApp, cmd: TaskCommand) -> TaskResult<()> {
    match cmd {
        TaskCommand::Add(args) => {
            let mut draft = TaskDraft::new(args.title.join(" "))
                .description(args.description)
                .priority(args.priority)
                .category(args.category);
            if let Some(due) = args.due {
                draft = draft.due_date(due);
            }
            let id = app.add_task(draft)?;
            println!("{}", id.short());
        }
        TaskCommand::Done { id } => {
            let id = resolve(app, &id)?;
            app.toggle_complete(id)?;
        }
        TaskCommand::Edit { id, title } => {
            let id = resolve(app, &id)?;
            app.edit_task(id, &title.join(" "))?;
        }
        TaskCommand::Delete { id } => {
            let id = resolve(app, &id)?;
            app.delete_task(id)?;
        }
        TaskCommand::Import { file } => {
            app.import(&file)?;
        }
        TaskCommand::Export { dir } => {
            app.export(&dir)?;
        }
        TaskCommand::DarkMode => {
            let enabled = app.toggle_dark_mode();
            println!("Dark mode {}", if enabled { "on" } else { "off" });
        }
        TaskCommand::Contact(args) => {
            let message = ContactMessage::new(args.name, args.email, args.message.join(" "));
            app.send_contact(&message)?;
        }
        TaskCommand::Outbox => {
            let pending = match app.dispatcher().pending() {
                Ok(pending) => pending,
                Err(e) => {
                    app.notifications_mut().error(e.to_string());
                    return Err(e);
                }
            };
            if pending.is_empty() {
                println!("Outbox is empty.");
            }
            for entry in &pending {
                println!("{} <{}>: {}", entry.message.name, entry.message.email, entry.message.message);
            }
        }
    }
    Ok(())
}

fn resolve(app: &mut CliApp, prefix: &str) -> TaskResult<TaskId> {
    let resolved = app.store().resolve(prefix);
    if let Err(e) = &resolved {
        app.notifications_mut().error(e.to_string());
    }
    resolved
}

// Returns whether the view should be re-rendered
fn run_shell_command(app: &mut CliApp, cmd: ShellCommand) -> bool {
    match cmd {
        ShellCommand::Task(cmd) => run_task_command(app, cmd).is_ok(),
        ShellCommand::List => true,
        ShellCommand::Filter { mode } => {
            app.set_filter(mode);
            true
        }
        ShellCommand::Sort { mode } => {
            app.set_sort(mode);
            true
        }
        ShellCommand::Search { term } => {
            app.set_search(term.join(" "));
            true
        }
        ShellCommand::Select { id } => match resolve(app, &id) {
            Ok(id) => app.toggle_select(id).is_ok(),
            Err(_) => false,
        },
        ShellCommand::SelectAll => {
            let count = app.select_all();
            app.notifications_mut().success(format!("{} tasks selected", count));
            true
        }
        ShellCommand::Clear => {
            app.clear_selection();
            true
        }
        ShellCommand::BatchDelete => app.batch_delete().is_ok(),
        ShellCommand::BatchComplete => app.batch_complete().is_ok(),
        ShellCommand::Quit => false,
    }
}

fn run_shell(app: &mut CliApp) -> Result<()> {
    println!("tasklist shell. Type `help` for commands, `quit` to leave.");
    print_view(app);

    let stdin = io::stdin();
    loop {
        print!("tasklist> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        let words = match shell_words::split(&line) {
            Ok(words) => words,
            Err(e) => {
                eprintln!("{}", format!("Could not parse input: {}", e).red());
                continue;
            }
        };
        if words.is_empty() {
            continue;
        }

        let parsed = match ShellLine::try_parse_from(words) {
            Ok(parsed) => parsed,
            Err(e) => {
                let _ = e.print();
                continue;
            }
        };

        if matches!(parsed.command, ShellCommand::Quit) {
            break;
        }

        let rerender = run_shell_command(app, parsed.command);
        print_notification(app);
        if rerender {
            print_view(app);
        }
    }

    Ok(())
}

fn print_notification(app: &mut CliApp) {
    if let Some(notification) = app.notifications_mut().take(Instant::now()) {
        match notification.kind {
            NotificationKind::Error => eprintln!("{}", render_notification(&notification)),
            _ => println!("{}", render_notification(&notification)),
        }
    }
}

fn print_view(app: &CliApp) {
    if app.filter() == FilterMode::None {
        println!(
            "{}",
            "No filter selected. Choose one with `filter all` (shell) or `list --filter all`.".dimmed()
        );
        return;
    }

    let rows = app.visible();
    if rows.is_empty() {
        println!("No tasks to show.");
    }
    for task in &rows {
        println!(
            "{}",
            render_row(task, app.selection().contains(task.id), app.dark_mode())
        );
    }

    let summary = format!(
        "{} shown of {} | filter: {} | sort: {} | {} selected",
        rows.len(),
        app.store().len(),
        app.filter(),
        app.sort(),
        app.selection().len()
    );
    println!("{}", summary.dimmed());
}
