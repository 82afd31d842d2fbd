use core::fmt::Debug;

use crate::ObjectId;

/// Who a scope or tree instance belongs to.
///
/// `stable_id` orders instances within a scheduler tick and picks per-agent think offsets,
/// so it must not change over the agent's lifetime.
pub trait AgentId: Copy + Ord + Debug {
    fn stable_id(self) -> u64;
}

macro_rules! integer_agent_id {
    ($($ty:ty),*) => {
        $(impl AgentId for $ty {
            fn stable_id(self) -> u64 {
                self as u64
            }
        })*
    };
}

integer_agent_id!(u16, u32, u64, usize);

/// Scene objects can drive their own trees.
impl AgentId for ObjectId {
    fn stable_id(self) -> u64 {
        self.0
    }
}

/// Read-only world access.
///
/// The blackboard never inspects the world itself; behaviors that need in-world data
/// define extension traits on their world type.
pub trait WorldView {
    type Agent: AgentId;
}

/// Write access / effect sink.
pub trait WorldMut: WorldView {}

/// Turns a stored reference path into a live object for one agent.
///
/// Resolution should be a synchronous local lookup. The path is opaque to the blackboard.
pub trait Resolver: WorldView {
    fn resolve(&self, agent: Self::Agent, path: &str) -> Option<ObjectId>;
}

/// Resolver for worlds without path references; every lookup fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullResolver;

impl WorldView for NullResolver {
    type Agent = u64;
}

impl Resolver for NullResolver {
    fn resolve(&self, _agent: u64, _path: &str) -> Option<ObjectId> {
        None
    }
}
