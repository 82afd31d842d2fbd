use std::sync::Arc;

use ai_blackboard::{Blackboard, BlackboardError, Plan, PopulateReport, Resolver, ScopeId, WorldMut};

use crate::{BtStatus, Task, TaskContext, TickContext};

/// A tree definition: the plan its instances populate and a builder for fresh task trees.
pub struct BehaviorTree<W>
where
    W: WorldMut + 'static,
{
    plan: Arc<Plan>,
    build: Box<dyn Fn() -> Task<W>>,
}

impl<W> BehaviorTree<W>
where
    W: WorldMut + 'static,
{
    pub fn new(plan: impl Into<Arc<Plan>>, build: impl Fn() -> Task<W> + 'static) -> Self {
        Self {
            plan: plan.into(),
            build: Box::new(build),
        }
    }

    pub fn plan(&self) -> &Arc<Plan> {
        &self.plan
    }

    /// Creates an instance with its own scope under `parent`, populated from the plan.
    pub fn instantiate(
        &self,
        board: &mut Blackboard,
        world: &W,
        agent: W::Agent,
        parent: Option<ScopeId>,
    ) -> Result<TreeInstance<W>, BlackboardError>
    where
        W: Resolver,
    {
        let (scope, report) = self.plan.instantiate(board, world, agent, parent)?;
        Ok(TreeInstance {
            agent,
            root: (self.build)(),
            scope,
            last: None,
            report,
        })
    }
}

/// One agent's running copy of a tree.
pub struct TreeInstance<W>
where
    W: WorldMut + 'static,
{
    agent: W::Agent,
    root: Task<W>,
    scope: ScopeId,
    last: Option<BtStatus>,
    report: PopulateReport,
}

impl<W> TreeInstance<W>
where
    W: WorldMut + 'static,
{
    pub fn agent(&self) -> W::Agent {
        self.agent
    }

    pub fn scope(&self) -> ScopeId {
        self.scope
    }

    pub fn root(&self) -> &Task<W> {
        &self.root
    }

    /// `None` until the first tick.
    pub fn last_status(&self) -> Option<BtStatus> {
        self.last
    }

    /// Problems met while populating the scope.
    pub fn report(&self) -> &PopulateReport {
        &self.report
    }

    pub fn tick(&mut self, tick: &TickContext, world: &mut W, board: &mut Blackboard) -> BtStatus {
        let mut ctx = TaskContext::new(*tick, self.agent, world, board, self.scope);
        let status = self.root.execute(&mut ctx);
        self.last = Some(status);
        status
    }

    /// Aborts the whole tree; the next tick starts from fresh tasks.
    pub fn abort(&mut self, tick: &TickContext, world: &mut W, board: &mut Blackboard) {
        let mut ctx = TaskContext::new(*tick, self.agent, world, board, self.scope);
        self.root.abort(&mut ctx);
    }
}
