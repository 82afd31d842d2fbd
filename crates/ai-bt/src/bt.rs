use ai_blackboard::{Blackboard, BlackboardError, ScopeId, Value, WorldMut};

use crate::{SetupError, Task, TickContext};

/// Result of ticking a task once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum BtStatus {
    Running,
    Success,
    Failure,
}

impl BtStatus {
    pub fn is_done(self) -> bool {
        self != BtStatus::Running
    }
}

/// Lifecycle state of a [`Task`].
///
/// `Fresh` means never ticked since construction or the last abort; setup runs on the
/// next tick from this state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskStatus {
    #[default]
    Fresh,
    Running,
    Success,
    Failure,
}

impl From<BtStatus> for TaskStatus {
    fn from(status: BtStatus) -> Self {
        match status {
            BtStatus::Running => TaskStatus::Running,
            BtStatus::Success => TaskStatus::Success,
            BtStatus::Failure => TaskStatus::Failure,
        }
    }
}

/// Everything a task may touch while it is ticked.
pub struct TaskContext<'a, W>
where
    W: WorldMut,
{
    pub tick: TickContext,
    pub agent: W::Agent,
    pub world: &'a mut W,
    pub board: &'a mut Blackboard,
    /// The owning tree instance's scope.
    pub scope: ScopeId,
}

impl<'a, W> TaskContext<'a, W>
where
    W: WorldMut,
{
    pub fn new(
        tick: TickContext,
        agent: W::Agent,
        world: &'a mut W,
        board: &'a mut Blackboard,
        scope: ScopeId,
    ) -> Self {
        Self {
            tick,
            agent,
            world,
            board,
            scope,
        }
    }

    pub fn get(&self, name: &str) -> Result<&Value, BlackboardError> {
        self.board.get(self.scope, name)
    }

    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<(), BlackboardError> {
        self.board.set(self.scope, name, value)
    }

    pub fn has(&self, name: &str) -> bool {
        self.board.has(self.scope, name)
    }
}

/// A node of a behavior tree.
///
/// Implementors only provide behavior; status bookkeeping, elapsed time and the
/// setup/enter/abort protocol live in [`Task`].
pub trait BtNode<W>: 'static
where
    W: WorldMut + 'static,
{
    /// Runs on the first tick after construction or abort.
    fn setup(&mut self, _ctx: &mut TaskContext<'_, W>) -> Result<(), SetupError> {
        Ok(())
    }

    /// Runs whenever the task starts a new run, before `tick`.
    fn enter(&mut self, _ctx: &mut TaskContext<'_, W>) {}

    /// `elapsed` includes the current step's delta.
    fn tick(&mut self, ctx: &mut TaskContext<'_, W>, elapsed: f64) -> BtStatus;

    /// Cleanup for an interrupted run. Only called while running.
    fn abort(&mut self, _ctx: &mut TaskContext<'_, W>) {}

    fn children(&self) -> &[Task<W>] {
        &[]
    }

    fn children_mut(&mut self) -> &mut [Task<W>] {
        &mut []
    }

    fn name(&self) -> &str {
        short_type_name(std::any::type_name::<Self>())
    }
}

fn short_type_name(full: &str) -> &str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}
