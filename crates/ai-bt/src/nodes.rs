//! Composite nodes.
//!
//! Memory variants ([`Sequence`], [`Selector`]) resume the running child on the next tick.
//! Reactive variants re-evaluate from the first child every tick and abort a previously
//! running child that is no longer reached.

use ai_blackboard::WorldMut;

use crate::bt::{BtNode, BtStatus, TaskContext, TaskStatus};
use crate::Task;

pub struct Sequence<W>
where
    W: WorldMut + 'static,
{
    children: Vec<Task<W>>,
    index: usize,
}

impl<W> Sequence<W>
where
    W: WorldMut + 'static,
{
    pub fn new(children: Vec<Task<W>>) -> Self {
        Self { children, index: 0 }
    }
}

impl<W> BtNode<W> for Sequence<W>
where
    W: WorldMut + 'static,
{
    fn enter(&mut self, _ctx: &mut TaskContext<'_, W>) {
        self.index = 0;
    }

    fn tick(&mut self, ctx: &mut TaskContext<'_, W>, _elapsed: f64) -> BtStatus {
        while self.index < self.children.len() {
            match self.children[self.index].execute(ctx) {
                BtStatus::Running => return BtStatus::Running,
                BtStatus::Failure => return BtStatus::Failure,
                BtStatus::Success => self.index += 1,
            }
        }
        BtStatus::Success
    }

    fn children(&self) -> &[Task<W>] {
        &self.children
    }

    fn children_mut(&mut self) -> &mut [Task<W>] {
        &mut self.children
    }
}

pub struct Selector<W>
where
    W: WorldMut + 'static,
{
    children: Vec<Task<W>>,
    index: usize,
}

impl<W> Selector<W>
where
    W: WorldMut + 'static,
{
    pub fn new(children: Vec<Task<W>>) -> Self {
        Self { children, index: 0 }
    }
}

impl<W> BtNode<W> for Selector<W>
where
    W: WorldMut + 'static,
{
    fn enter(&mut self, _ctx: &mut TaskContext<'_, W>) {
        self.index = 0;
    }

    fn tick(&mut self, ctx: &mut TaskContext<'_, W>, _elapsed: f64) -> BtStatus {
        while self.index < self.children.len() {
            match self.children[self.index].execute(ctx) {
                BtStatus::Running => return BtStatus::Running,
                BtStatus::Success => return BtStatus::Success,
                BtStatus::Failure => self.index += 1,
            }
        }
        BtStatus::Failure
    }

    fn children(&self) -> &[Task<W>] {
        &self.children
    }

    fn children_mut(&mut self) -> &mut [Task<W>] {
        &mut self.children
    }
}

/// Aborts the child that was running last tick unless it is `keep`.
fn preempt<W>(
    children: &mut [Task<W>],
    running: &mut Option<usize>,
    keep: Option<usize>,
    ctx: &mut TaskContext<'_, W>,
) where
    W: WorldMut + 'static,
{
    if let Some(prev) = *running {
        if Some(prev) != keep && children[prev].status() == TaskStatus::Running {
            children[prev].abort(ctx);
        }
    }
    *running = keep;
}

pub struct ReactiveSequence<W>
where
    W: WorldMut + 'static,
{
    children: Vec<Task<W>>,
    running: Option<usize>,
}

impl<W> ReactiveSequence<W>
where
    W: WorldMut + 'static,
{
    pub fn new(children: Vec<Task<W>>) -> Self {
        Self {
            children,
            running: None,
        }
    }
}

impl<W> BtNode<W> for ReactiveSequence<W>
where
    W: WorldMut + 'static,
{
    fn enter(&mut self, _ctx: &mut TaskContext<'_, W>) {
        self.running = None;
    }

    fn tick(&mut self, ctx: &mut TaskContext<'_, W>, _elapsed: f64) -> BtStatus {
        for i in 0..self.children.len() {
            match self.children[i].execute(ctx) {
                BtStatus::Success => continue,
                BtStatus::Failure => {
                    preempt(&mut self.children, &mut self.running, None, ctx);
                    return BtStatus::Failure;
                }
                BtStatus::Running => {
                    preempt(&mut self.children, &mut self.running, Some(i), ctx);
                    return BtStatus::Running;
                }
            }
        }

        self.running = None;
        BtStatus::Success
    }

    fn children(&self) -> &[Task<W>] {
        &self.children
    }

    fn children_mut(&mut self) -> &mut [Task<W>] {
        &mut self.children
    }
}

pub struct ReactiveSelector<W>
where
    W: WorldMut + 'static,
{
    children: Vec<Task<W>>,
    running: Option<usize>,
}

impl<W> ReactiveSelector<W>
where
    W: WorldMut + 'static,
{
    pub fn new(children: Vec<Task<W>>) -> Self {
        Self {
            children,
            running: None,
        }
    }
}

impl<W> BtNode<W> for ReactiveSelector<W>
where
    W: WorldMut + 'static,
{
    fn enter(&mut self, _ctx: &mut TaskContext<'_, W>) {
        self.running = None;
    }

    fn tick(&mut self, ctx: &mut TaskContext<'_, W>, _elapsed: f64) -> BtStatus {
        for i in 0..self.children.len() {
            match self.children[i].execute(ctx) {
                BtStatus::Failure => continue,
                BtStatus::Success => {
                    preempt(&mut self.children, &mut self.running, None, ctx);
                    return BtStatus::Success;
                }
                BtStatus::Running => {
                    preempt(&mut self.children, &mut self.running, Some(i), ctx);
                    return BtStatus::Running;
                }
            }
        }

        self.running = None;
        BtStatus::Failure
    }

    fn children(&self) -> &[Task<W>] {
        &self.children
    }

    fn children_mut(&mut self) -> &mut [Task<W>] {
        &mut self.children
    }
}

/// Completion thresholds for [`Parallel`].
///
/// Thresholds are clamped to `1..=children` when evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParallelPolicy {
    pub success_threshold: usize,
    pub failure_threshold: usize,
    /// Restart children that finished before the thresholds were met.
    pub repeat: bool,
}

impl ParallelPolicy {
    pub fn new(success_threshold: usize, failure_threshold: usize) -> Self {
        Self {
            success_threshold,
            failure_threshold,
            repeat: false,
        }
    }

    /// Succeeds once every child succeeded; fails on the first failure.
    pub fn all_succeed() -> Self {
        Self::new(usize::MAX, 1)
    }

    /// Succeeds on the first success; fails once every child failed.
    pub fn any_succeed() -> Self {
        Self::new(1, usize::MAX)
    }

    pub fn repeating(mut self) -> Self {
        self.repeat = true;
        self
    }
}

impl Default for ParallelPolicy {
    fn default() -> Self {
        Self::all_succeed()
    }
}

/// Ticks every child each step.
pub struct Parallel<W>
where
    W: WorldMut + 'static,
{
    children: Vec<Task<W>>,
    policy: ParallelPolicy,
    results: Vec<Option<BtStatus>>,
}

impl<W> Parallel<W>
where
    W: WorldMut + 'static,
{
    pub fn new(children: Vec<Task<W>>, policy: ParallelPolicy) -> Self {
        let results = vec![None; children.len()];
        Self {
            children,
            policy,
            results,
        }
    }

    fn abort_running(&mut self, ctx: &mut TaskContext<'_, W>) {
        for child in self.children.iter_mut() {
            if child.status() == TaskStatus::Running {
                child.abort(ctx);
            }
        }
    }
}

impl<W> BtNode<W> for Parallel<W>
where
    W: WorldMut + 'static,
{
    fn enter(&mut self, _ctx: &mut TaskContext<'_, W>) {
        self.results.clear();
        self.results.resize(self.children.len(), None);
    }

    fn tick(&mut self, ctx: &mut TaskContext<'_, W>, _elapsed: f64) -> BtStatus {
        let n = self.children.len();
        if n == 0 {
            return BtStatus::Success;
        }

        let mut succeeded = 0;
        let mut failed = 0;
        for (child, result) in self.children.iter_mut().zip(self.results.iter_mut()) {
            if !self.policy.repeat {
                if let Some(done) = *result {
                    match done {
                        BtStatus::Success => succeeded += 1,
                        _ => failed += 1,
                    }
                    continue;
                }
            }

            let status = child.execute(ctx);
            match status {
                BtStatus::Success => succeeded += 1,
                BtStatus::Failure => failed += 1,
                BtStatus::Running => {}
            }
            *result = status.is_done().then_some(status);
        }

        let need_success = self.policy.success_threshold.clamp(1, n);
        let need_failure = self.policy.failure_threshold.clamp(1, n);
        if succeeded >= need_success {
            self.abort_running(ctx);
            BtStatus::Success
        } else if failed >= need_failure {
            self.abort_running(ctx);
            BtStatus::Failure
        } else if !self.policy.repeat && succeeded + failed == n {
            BtStatus::Failure
        } else {
            BtStatus::Running
        }
    }

    fn children(&self) -> &[Task<W>] {
        &self.children
    }

    fn children_mut(&mut self) -> &mut [Task<W>] {
        &mut self.children
    }
}
