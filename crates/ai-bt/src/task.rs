use std::borrow::Cow;

use ai_blackboard::WorldMut;

use crate::{BtNode, BtStatus, TaskContext, TaskStatus};

/// A tree node plus its runtime state.
pub struct Task<W>
where
    W: WorldMut + 'static,
{
    node: Box<dyn BtNode<W>>,
    label: Option<Cow<'static, str>>,
    status: TaskStatus,
    elapsed: f64,
    setup_failed: bool,
}

impl<W> Task<W>
where
    W: WorldMut + 'static,
{
    pub fn new(node: impl BtNode<W>) -> Self {
        Self {
            node: Box::new(node),
            label: None,
            status: TaskStatus::Fresh,
            elapsed: 0.0,
            setup_failed: false,
        }
    }

    pub fn labeled(mut self, label: impl Into<Cow<'static, str>>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn name(&self) -> &str {
        match &self.label {
            Some(label) => label.as_ref(),
            None => self.node.name(),
        }
    }

    pub fn status(&self) -> TaskStatus {
        self.status
    }

    /// Seconds spent in the current run; zero once the run finished.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn setup_failed(&self) -> bool {
        self.setup_failed
    }

    pub fn children(&self) -> &[Task<W>] {
        self.node.children()
    }

    /// Ticks the task once.
    ///
    /// Setup runs when the task is fresh; a failed setup makes every tick fail until the
    /// task is aborted.
    pub fn execute(&mut self, ctx: &mut TaskContext<'_, W>) -> BtStatus {
        if self.status == TaskStatus::Fresh {
            self.setup_failed = match self.node.setup(ctx) {
                Ok(()) => false,
                Err(err) => {
                    tracing::warn!(task = %self.name(), error = %err, "task setup failed");
                    true
                }
            };
        }

        if self.setup_failed {
            self.status = TaskStatus::Failure;
            self.elapsed = 0.0;
            return BtStatus::Failure;
        }

        if self.status != TaskStatus::Running {
            self.elapsed = 0.0;
            self.node.enter(ctx);
        }

        self.elapsed += ctx.tick.dt_seconds;
        let status = self.node.tick(ctx, self.elapsed);
        self.status = status.into();
        if status.is_done() {
            self.elapsed = 0.0;
        }
        status
    }

    /// Interrupts the task and its subtree, returning them to `Fresh`.
    pub fn abort(&mut self, ctx: &mut TaskContext<'_, W>) {
        if self.status == TaskStatus::Fresh {
            return;
        }

        for child in self.node.children_mut() {
            child.abort(ctx);
        }
        if self.status == TaskStatus::Running {
            tracing::trace!(task = %self.name(), "aborting running task");
            self.node.abort(ctx);
        }

        self.status = TaskStatus::Fresh;
        self.elapsed = 0.0;
        self.setup_failed = false;
    }
}

impl<W> std::fmt::Debug for Task<W>
where
    W: WorldMut + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Task")
            .field("name", &self.name())
            .field("status", &self.status)
            .field("elapsed", &self.elapsed)
            .field("children", &self.children())
            .finish()
    }
}
