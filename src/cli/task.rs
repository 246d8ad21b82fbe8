//! taskheap task command implementations.

use serde::Serialize;

use crate::cli::{load_context, ContextOptions};
use crate::error::{Error, Result};
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::scheduler::Completion;
use crate::task::{TaskDraft, TaskRecord};

pub struct AddOptions {
    pub name: String,
    pub priority: String,
    pub due: String,
    pub dependencies: Vec<String>,
    pub context: ContextOptions,
    pub json: bool,
    pub quiet: bool,
}

pub struct ListOptions {
    pub context: ContextOptions,
    pub json: bool,
    pub quiet: bool,
}

pub struct CompleteOptions {
    pub name: String,
    pub strict: bool,
    pub context: ContextOptions,
    pub json: bool,
    pub quiet: bool,
}

pub struct NextOptions {
    pub context: ContextOptions,
    pub json: bool,
    pub quiet: bool,
}

/// JSON shape of a task in command output.
#[derive(Debug, Serialize)]
pub(crate) struct TaskView<'a> {
    name: &'a str,
    priority: i64,
    due_date: String,
    dependencies: &'a [String],
}

impl<'a> From<&'a TaskRecord> for TaskView<'a> {
    fn from(record: &'a TaskRecord) -> Self {
        Self {
            name: record.name(),
            priority: record.priority(),
            due_date: record.due_date().to_iso(),
            dependencies: record.dependencies(),
        }
    }
}

#[derive(Serialize)]
struct TaskOutput<'a> {
    task: TaskView<'a>,
}

#[derive(Serialize)]
struct TaskListOutput<'a> {
    total: usize,
    tasks: Vec<TaskView<'a>>,
}

#[derive(Serialize)]
struct CompleteOutput<'a> {
    task: &'a str,
    #[serde(flatten)]
    completion: Completion,
}

/// One-line human description of a task.
pub(crate) fn describe(record: &TaskRecord) -> String {
    let mut line = format!(
        "[{}] {} (due {})",
        record.priority(),
        record.name(),
        record.due_date()
    );
    if !record.dependencies().is_empty() {
        line.push_str(&format!(" after: {}", record.dependencies().join(", ")));
    }
    line
}

pub fn run_add(options: AddOptions) -> Result<()> {
    let mut ctx = load_context(options.context)?;
    let draft = TaskDraft::from_input(options.name, options.priority, options.due)
        .depends_on(options.dependencies);
    let record = ctx.scheduler.add_task(draft)?;

    let mut human = HumanOutput::new(format!("Added task: {}", record.name()));
    human.push_summary("Priority", record.priority().to_string());
    human.push_summary("Due", record.due_date().to_string());
    if !record.dependencies().is_empty() {
        human.push_summary("Depends on", record.dependencies().join(", "));
    }
    human.push_summary("Pending", ctx.scheduler.pending_len().to_string());

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "add",
        &TaskOutput {
            task: TaskView::from(&record),
        },
        Some(&human),
    )
}

pub fn run_list(options: ListOptions) -> Result<()> {
    let ctx = load_context(options.context)?;
    let tasks = ctx.scheduler.list_pending();

    let output = TaskListOutput {
        total: tasks.len(),
        tasks: tasks.iter().map(TaskView::from).collect(),
    };

    let mut human = HumanOutput::new("Pending tasks");
    human.push_summary("Total", tasks.len().to_string());
    human.push_summary("Data dir", ctx.data_dir.display().to_string());
    for task in &tasks {
        human.push_detail(describe(task));
    }
    if tasks.is_empty() {
        human.push_next_step("taskheap add <name> --priority <n> --due <YYYY-MM-DD>");
    }

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "list",
        &output,
        Some(&human),
    )
}

pub fn run_complete(options: CompleteOptions) -> Result<()> {
    let mut ctx = load_context(options.context)?;
    let name = options.name.trim();
    let completion = ctx.scheduler.complete_task(name)?;

    let human = match completion {
        Completion::Completed { removed } => {
            let mut human = HumanOutput::new(format!("Completed task: {name}"));
            if removed > 1 {
                human.push_summary("Removed", removed.to_string());
            }
            human.push_summary("Pending", ctx.scheduler.pending_len().to_string());
            human
        }
        Completion::NotFound => {
            if options.strict {
                return Err(Error::TaskNotFound(name.to_string()));
            }
            let mut human = HumanOutput::new(format!("Task not found: {name}"));
            human.push_next_step("taskheap list");
            human
        }
    };

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "complete",
        &CompleteOutput {
            task: name,
            completion,
        },
        Some(&human),
    )
}

pub fn run_next(options: NextOptions) -> Result<()> {
    let mut ctx = load_context(options.context)?;
    let pending_before = ctx.scheduler.pending_len();
    let result = ctx.scheduler.next_ready_task();
    let discarded = pending_before - ctx.scheduler.pending_len();
    let record = result?;

    let mut human = HumanOutput::new(format!("Next task: {}", record.name()));
    human.push_detail(describe(&record));
    if discarded > 0 {
        human.push_warning(format!("discarded {discarded} blocked task(s)"));
    }
    human.push_next_step(format!("taskheap complete \"{}\"", record.name()));

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "next",
        &TaskOutput {
            task: TaskView::from(&record),
        },
        Some(&human),
    )
}
