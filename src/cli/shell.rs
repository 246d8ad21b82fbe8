//! Interactive menu over a scheduler.
//!
//! Reads from any `BufRead` and writes to any `Write`, so the loop runs the
//! same against a terminal or a test buffer. End of input quits.

use std::io::{self, BufRead, Write};

use crate::cli::task::describe;
use crate::cli::{load_context, ContextOptions};
use crate::error::Result;
use crate::persist::SnapshotStore;
use crate::scheduler::{Completion, Scheduler};
use crate::task::{split_dependency_list, TaskDraft};

pub struct ShellOptions {
    pub context: ContextOptions,
}

const MENU: &str = "\
Task scheduler
  1. Add task
  2. List tasks
  3. Complete task
  4. Next task
  5. Quit";

pub fn run(options: ShellOptions) -> Result<()> {
    let mut ctx = load_context(options.context)?;
    let stdin = io::stdin();
    let stdout = io::stdout();
    Shell::new(&mut ctx.scheduler, stdin.lock(), stdout.lock()).run()
}

pub(crate) struct Shell<'a, S, R, W> {
    scheduler: &'a mut Scheduler<S>,
    input: R,
    output: W,
}

impl<'a, S: SnapshotStore, R: BufRead, W: Write> Shell<'a, S, R, W> {
    pub(crate) fn new(scheduler: &'a mut Scheduler<S>, input: R, output: W) -> Self {
        Self {
            scheduler,
            input,
            output,
        }
    }

    pub(crate) fn run(mut self) -> Result<()> {
        loop {
            writeln!(self.output, "\n{MENU}")?;
            let Some(choice) = self.prompt("Select an option: ")? else {
                writeln!(self.output)?;
                return Ok(());
            };

            let keep_going = match choice.as_str() {
                "1" => self.add()?,
                "2" => self.list()?,
                "3" => self.complete()?,
                "4" => self.next()?,
                "5" | "q" | "quit" => false,
                other => {
                    writeln!(self.output, "Invalid option '{other}', choose 1-5.")?;
                    true
                }
            };
            if !keep_going {
                return Ok(());
            }
        }
    }

    /// Print `label` and read one trimmed line; `None` at end of input.
    fn prompt(&mut self, label: &str) -> Result<Option<String>> {
        write!(self.output, "{label}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn add(&mut self) -> Result<bool> {
        let Some(name) = self.prompt("Task name: ")? else {
            return Ok(false);
        };
        let Some(priority) = self.prompt("Priority (lower is more urgent): ")? else {
            return Ok(false);
        };
        let Some(due) = self.prompt("Due date (YYYY-MM-DD): ")? else {
            return Ok(false);
        };
        let Some(deps) = self.prompt("Dependencies (comma separated, blank for none): ")? else {
            return Ok(false);
        };

        let draft =
            TaskDraft::from_input(name, priority, due).depends_on(split_dependency_list(&deps));
        match self.scheduler.add_task(draft) {
            Ok(record) => writeln!(self.output, "Added: {}", describe(&record))?,
            Err(err) => writeln!(self.output, "error: {err}")?,
        }
        Ok(true)
    }

    fn list(&mut self) -> Result<bool> {
        let tasks = self.scheduler.list_pending();
        if tasks.is_empty() {
            writeln!(self.output, "No pending tasks.")?;
        }
        for task in &tasks {
            writeln!(self.output, "  {}", describe(task))?;
        }
        Ok(true)
    }

    fn complete(&mut self) -> Result<bool> {
        let Some(name) = self.prompt("Task name: ")? else {
            return Ok(false);
        };
        match self.scheduler.complete_task(&name) {
            Ok(Completion::Completed { .. }) => writeln!(self.output, "Completed: {name}")?,
            Ok(Completion::NotFound) => writeln!(self.output, "Task not found: {name}")?,
            Err(err) => writeln!(self.output, "error: {err}")?,
        }
        Ok(true)
    }

    fn next(&mut self) -> Result<bool> {
        match self.scheduler.next_ready_task() {
            Ok(record) => writeln!(self.output, "Next: {}", describe(&record))?,
            Err(err) => writeln!(self.output, "{err}")?,
        }
        Ok(true)
    }
}
