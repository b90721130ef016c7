//! Task progress reporting
//!
//! Reporters observe long-running work as `start`/`finish` brackets around
//! named tasks. They never influence the work itself, so misuse (finishing
//! a task that was never started) is logged rather than raised.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Instant;
use tracing::{info, warn};

/// Observer for named units of work.
pub trait TaskReporter: Send + Sync {
    fn start(&self, task: &str);
    fn finish(&self, task: &str);
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Reporter that discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentTaskReporter;

impl TaskReporter for SilentTaskReporter {
    fn start(&self, _task: &str) {}
    fn finish(&self, _task: &str) {}
}

/// Reporter that logs each task through `tracing`, with elapsed time on finish.
#[derive(Debug, Default)]
pub struct LoggingTaskReporter {
    active: Mutex<HashMap<String, Instant>>,
}

impl LoggingTaskReporter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TaskReporter for LoggingTaskReporter {
    fn start(&self, task: &str) {
        let mut active = lock(&self.active);
        if active.contains_key(task) {
            warn!(task, "task started twice");
        }
        active.insert(task.to_string(), Instant::now());
        info!("  GO   {}", task);
    }

    fn finish(&self, task: &str) {
        match lock(&self.active).remove(task) {
            Some(started) => {
                let elapsed_ms = started.elapsed().as_millis();
                info!("DONE   {} ({}ms)", task, elapsed_ms);
            }
            None => warn!(task, "finished a task that was not started"),
        }
    }
}

/// A reporter notification, as captured by [`RecordingTaskReporter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskEvent {
    Start(String),
    Finish(String),
}

/// Reporter that records every notification in order.
#[derive(Debug, Default)]
pub struct RecordingTaskReporter {
    events: Mutex<Vec<TaskEvent>>,
}

impl RecordingTaskReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<TaskEvent> {
        lock(&self.events).clone()
    }

    /// Tasks that were started but not yet finished
    pub fn active_tasks(&self) -> Vec<String> {
        let mut active: Vec<String> = Vec::new();
        for event in lock(&self.events).iter() {
            match event {
                TaskEvent::Start(task) => active.push(task.clone()),
                TaskEvent::Finish(task) => active.retain(|t| t != task),
            }
        }
        active
    }
}

impl TaskReporter for RecordingTaskReporter {
    fn start(&self, task: &str) {
        lock(&self.events).push(TaskEvent::Start(task.to_string()));
    }

    fn finish(&self, task: &str) {
        lock(&self.events).push(TaskEvent::Finish(task.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_reporter_keeps_order() {
        let reporter = RecordingTaskReporter::new();
        reporter.start("a");
        reporter.start("b");
        reporter.finish("b");
        assert_eq!(
            reporter.events(),
            vec![
                TaskEvent::Start("a".into()),
                TaskEvent::Start("b".into()),
                TaskEvent::Finish("b".into()),
            ]
        );
        assert_eq!(reporter.active_tasks(), vec!["a".to_string()]);
    }

    #[test]
    fn logging_reporter_tolerates_misuse() {
        let reporter = LoggingTaskReporter::new();
        reporter.finish("never started");
        reporter.start("task");
        reporter.start("task");
        reporter.finish("task");
        assert!(lock(&reporter.active).is_empty());
    }
}
