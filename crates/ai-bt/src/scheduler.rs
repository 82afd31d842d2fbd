use std::collections::BTreeMap;

use ai_blackboard::{AgentId, Blackboard, Resolver, ScopeId, WorldMut};

use crate::config::{SchedulerConfig, ThinkSchedule};
use crate::{BehaviorTree, BtStatus, SchedulerError, TickContext, TreeInstance};

/// Handle to a tree instance owned by a [`Scheduler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InstanceId(u64);

struct Slot<W>
where
    W: WorldMut + 'static,
{
    instance: TreeInstance<W>,
    schedule: ThinkSchedule,
}

/// Owns the blackboard and the tree instances ticked against it.
///
/// Instances tick in ascending agent order, ties broken by spawn order, so a run is
/// reproducible for the same inputs.
pub struct Scheduler<W>
where
    W: WorldMut + 'static,
{
    board: Blackboard,
    config: SchedulerConfig,
    slots: BTreeMap<InstanceId, Slot<W>>,
    next_id: u64,
}

impl<W> Scheduler<W>
where
    W: WorldMut + 'static,
{
    pub fn new(config: SchedulerConfig) -> Self {
        Self::with_board(Blackboard::new(), config)
    }

    pub fn with_board(board: Blackboard, config: SchedulerConfig) -> Self {
        Self {
            board,
            config,
            slots: BTreeMap::new(),
            next_id: 0,
        }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn board(&self) -> &Blackboard {
        &self.board
    }

    pub fn board_mut(&mut self) -> &mut Blackboard {
        &mut self.board
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn instance(&self, id: InstanceId) -> Option<&TreeInstance<W>> {
        self.slots.get(&id).map(|slot| &slot.instance)
    }

    pub fn scope(&self, id: InstanceId) -> Option<ScopeId> {
        self.instance(id).map(TreeInstance::scope)
    }

    pub fn last_status(&self, id: InstanceId) -> Option<BtStatus> {
        self.instance(id).and_then(TreeInstance::last_status)
    }

    /// Instantiates `tree` for `agent` in a root-level scope, or under `parent` when given.
    pub fn spawn(
        &mut self,
        tree: &BehaviorTree<W>,
        world: &W,
        agent: W::Agent,
        parent: Option<ScopeId>,
    ) -> Result<InstanceId, SchedulerError>
    where
        W: Resolver,
    {
        let instance = tree.instantiate(&mut self.board, world, agent, parent)?;
        let id = InstanceId(self.next_id);
        self.next_id += 1;

        tracing::debug!(
            instance = id.0,
            agent = agent.stable_id(),
            issues = instance.report().issues.len(),
            "spawned tree instance"
        );
        self.slots.insert(
            id,
            Slot {
                instance,
                schedule: self.config.schedule_for(agent),
            },
        );
        Ok(id)
    }

    /// Spawns a tree whose scope chains to another instance's scope.
    pub fn spawn_child(
        &mut self,
        tree: &BehaviorTree<W>,
        world: &W,
        agent: W::Agent,
        parent: InstanceId,
    ) -> Result<InstanceId, SchedulerError>
    where
        W: Resolver,
    {
        let scope = self
            .scope(parent)
            .ok_or(SchedulerError::UnknownInstance(parent))?;
        self.spawn(tree, world, agent, Some(scope))
    }

    /// Aborts an instance's tree without removing it.
    pub fn abort(
        &mut self,
        id: InstanceId,
        tick: &TickContext,
        world: &mut W,
    ) -> Result<(), SchedulerError> {
        let slot = self
            .slots
            .get_mut(&id)
            .ok_or(SchedulerError::UnknownInstance(id))?;
        slot.instance.abort(tick, world, &mut self.board);
        Ok(())
    }

    /// Aborts the instance, then destroys it and its scope.
    ///
    /// Scopes of child instances keep their dangling parent handle; lookups that reach it
    /// report [`ai_blackboard::BlackboardError::DanglingScope`].
    pub fn despawn(
        &mut self,
        id: InstanceId,
        tick: &TickContext,
        world: &mut W,
    ) -> Result<(), SchedulerError> {
        let mut slot = self
            .slots
            .remove(&id)
            .ok_or(SchedulerError::UnknownInstance(id))?;
        slot.instance.abort(tick, world, &mut self.board);
        self.board.remove_scope(slot.instance.scope());
        tracing::debug!(instance = id.0, "despawned tree instance");
        Ok(())
    }

    pub fn tick(&mut self, tick: &TickContext, world: &mut W) {
        let mut order: Vec<(u64, InstanceId)> = self
            .slots
            .iter()
            .map(|(id, slot)| (slot.instance.agent().stable_id(), *id))
            .collect();
        order.sort_unstable();

        for (_, id) in order {
            let Some(slot) = self.slots.get_mut(&id) else {
                continue;
            };
            let Some(step) = slot.schedule.step(tick) else {
                continue;
            };

            let status = slot.instance.tick(&step, world, &mut self.board);
            if status.is_done() {
                tracing::trace!(instance = id.0, ?status, "tree finished");
                if self.config.restart_on_completion {
                    slot.instance.abort(&step, world, &mut self.board);
                }
            }
        }
    }
}
