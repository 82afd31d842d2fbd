//! Single-child nodes that reshape their child's result.

use ai_blackboard::WorldMut;

use crate::bt::{BtNode, BtStatus, TaskContext, TaskStatus};
use crate::Task;

macro_rules! single_child {
    () => {
        fn children(&self) -> &[Task<W>] {
            std::slice::from_ref(&self.child)
        }

        fn children_mut(&mut self) -> &mut [Task<W>] {
            std::slice::from_mut(&mut self.child)
        }
    };
}

/// Swaps success and failure.
pub struct Invert<W>
where
    W: WorldMut + 'static,
{
    child: Task<W>,
}

impl<W> Invert<W>
where
    W: WorldMut + 'static,
{
    pub fn new(child: Task<W>) -> Self {
        Self { child }
    }
}

impl<W> BtNode<W> for Invert<W>
where
    W: WorldMut + 'static,
{
    fn tick(&mut self, ctx: &mut TaskContext<'_, W>, _elapsed: f64) -> BtStatus {
        match self.child.execute(ctx) {
            BtStatus::Running => BtStatus::Running,
            BtStatus::Success => BtStatus::Failure,
            BtStatus::Failure => BtStatus::Success,
        }
    }

    single_child!();
}

pub struct AlwaysSucceed<W>
where
    W: WorldMut + 'static,
{
    child: Task<W>,
}

impl<W> AlwaysSucceed<W>
where
    W: WorldMut + 'static,
{
    pub fn new(child: Task<W>) -> Self {
        Self { child }
    }
}

impl<W> BtNode<W> for AlwaysSucceed<W>
where
    W: WorldMut + 'static,
{
    fn tick(&mut self, ctx: &mut TaskContext<'_, W>, _elapsed: f64) -> BtStatus {
        match self.child.execute(ctx) {
            BtStatus::Running => BtStatus::Running,
            _ => BtStatus::Success,
        }
    }

    single_child!();
}

pub struct AlwaysFail<W>
where
    W: WorldMut + 'static,
{
    child: Task<W>,
}

impl<W> AlwaysFail<W>
where
    W: WorldMut + 'static,
{
    pub fn new(child: Task<W>) -> Self {
        Self { child }
    }
}

impl<W> BtNode<W> for AlwaysFail<W>
where
    W: WorldMut + 'static,
{
    fn tick(&mut self, ctx: &mut TaskContext<'_, W>, _elapsed: f64) -> BtStatus {
        match self.child.execute(ctx) {
            BtStatus::Running => BtStatus::Running,
            _ => BtStatus::Failure,
        }
    }

    single_child!();
}

/// Re-runs a failing child, up to `max_attempts` runs in total.
///
/// Each retry starts on the following tick; the decorator stays running in between.
pub struct Retry<W>
where
    W: WorldMut + 'static,
{
    child: Task<W>,
    max_attempts: u32,
    attempts: u32,
}

impl<W> Retry<W>
where
    W: WorldMut + 'static,
{
    pub fn new(child: Task<W>, max_attempts: u32) -> Self {
        Self {
            child,
            max_attempts: max_attempts.max(1),
            attempts: 0,
        }
    }
}

impl<W> BtNode<W> for Retry<W>
where
    W: WorldMut + 'static,
{
    fn enter(&mut self, _ctx: &mut TaskContext<'_, W>) {
        self.attempts = 0;
    }

    fn tick(&mut self, ctx: &mut TaskContext<'_, W>, _elapsed: f64) -> BtStatus {
        match self.child.execute(ctx) {
            BtStatus::Failure => {
                self.attempts += 1;
                if self.attempts >= self.max_attempts {
                    BtStatus::Failure
                } else {
                    BtStatus::Running
                }
            }
            status => status,
        }
    }

    single_child!();
}

/// Runs the child repeatedly; fails as soon as the child fails.
pub struct Repeat<W>
where
    W: WorldMut + 'static,
{
    child: Task<W>,
    times: Option<u32>,
    count: u32,
}

impl<W> Repeat<W>
where
    W: WorldMut + 'static,
{
    pub fn times(child: Task<W>, times: u32) -> Self {
        Self {
            child,
            times: Some(times.max(1)),
            count: 0,
        }
    }

    pub fn forever(child: Task<W>) -> Self {
        Self {
            child,
            times: None,
            count: 0,
        }
    }

    /// Completed child runs in the current run of the decorator.
    pub fn count(&self) -> u32 {
        self.count
    }
}

impl<W> BtNode<W> for Repeat<W>
where
    W: WorldMut + 'static,
{
    fn enter(&mut self, _ctx: &mut TaskContext<'_, W>) {
        self.count = 0;
    }

    fn tick(&mut self, ctx: &mut TaskContext<'_, W>, _elapsed: f64) -> BtStatus {
        match self.child.execute(ctx) {
            BtStatus::Running => BtStatus::Running,
            BtStatus::Failure => BtStatus::Failure,
            BtStatus::Success => {
                self.count += 1;
                match self.times {
                    Some(times) if self.count >= times => BtStatus::Success,
                    _ => BtStatus::Running,
                }
            }
        }
    }

    single_child!();
}

/// Fails without ticking the child until `duration` seconds after the child last finished.
pub struct Cooldown<W>
where
    W: WorldMut + 'static,
{
    child: Task<W>,
    duration: f64,
    trigger_on_failure: bool,
    ready_at: f64,
}

impl<W> Cooldown<W>
where
    W: WorldMut + 'static,
{
    pub fn new(child: Task<W>, duration: f64) -> Self {
        Self {
            child,
            duration,
            trigger_on_failure: false,
            ready_at: f64::NEG_INFINITY,
        }
    }

    /// Start the cooldown after a failed run too, not just after a success.
    pub fn trigger_on_failure(mut self, trigger: bool) -> Self {
        self.trigger_on_failure = trigger;
        self
    }
}

impl<W> BtNode<W> for Cooldown<W>
where
    W: WorldMut + 'static,
{
    fn tick(&mut self, ctx: &mut TaskContext<'_, W>, _elapsed: f64) -> BtStatus {
        let now = ctx.tick.time_seconds;
        if self.child.status() != TaskStatus::Running && now < self.ready_at {
            return BtStatus::Failure;
        }

        let status = self.child.execute(ctx);
        let triggers = match status {
            BtStatus::Running => false,
            BtStatus::Success => true,
            BtStatus::Failure => self.trigger_on_failure,
        };
        if triggers {
            self.ready_at = now + self.duration;
        }
        status
    }

    single_child!();
}

/// Gates entry into the child on a predicate.
///
/// By default the predicate is only checked when the child is not already running. A
/// reactive guard checks it every tick and aborts the running child once it turns false.
pub struct Guard<W, F>
where
    W: WorldMut + 'static,
{
    child: Task<W>,
    allow: F,
    reactive: bool,
}

impl<W, F> Guard<W, F>
where
    W: WorldMut + 'static,
    F: FnMut(&TaskContext<'_, W>) -> bool + 'static,
{
    pub fn new(allow: F, child: Task<W>) -> Self {
        Self {
            child,
            allow,
            reactive: false,
        }
    }

    pub fn reactive(mut self) -> Self {
        self.reactive = true;
        self
    }
}

impl<W, F> BtNode<W> for Guard<W, F>
where
    W: WorldMut + 'static,
    F: FnMut(&TaskContext<'_, W>) -> bool + 'static,
{
    fn tick(&mut self, ctx: &mut TaskContext<'_, W>, _elapsed: f64) -> BtStatus {
        let running = self.child.status() == TaskStatus::Running;
        if (!running || self.reactive) && !(self.allow)(ctx) {
            if running {
                self.child.abort(ctx);
            }
            return BtStatus::Failure;
        }
        self.child.execute(ctx)
    }

    single_child!();
}

/// Fails and aborts the child once it has been running for `limit` seconds.
pub struct TimeLimit<W>
where
    W: WorldMut + 'static,
{
    child: Task<W>,
    limit: f64,
}

impl<W> TimeLimit<W>
where
    W: WorldMut + 'static,
{
    pub fn new(child: Task<W>, limit: f64) -> Self {
        Self { child, limit }
    }
}

impl<W> BtNode<W> for TimeLimit<W>
where
    W: WorldMut + 'static,
{
    fn tick(&mut self, ctx: &mut TaskContext<'_, W>, elapsed: f64) -> BtStatus {
        let status = self.child.execute(ctx);
        if status == BtStatus::Running && elapsed >= self.limit {
            tracing::debug!(task = %self.child.name(), limit = self.limit, "time limit reached");
            self.child.abort(ctx);
            return BtStatus::Failure;
        }
        status
    }

    single_child!();
}
