//! Behavior Tree runtime over scoped `ai-blackboard` variables.
//!
//! A [`BehaviorTree`] pairs a [`Plan`](ai_blackboard::Plan) with a builder for its task tree.
//! Each agent gets a [`TreeInstance`] with its own blackboard scope; a [`Scheduler`] ticks
//! instances deterministically.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod bt;
pub mod config;
pub mod decorators;
pub mod error;
pub mod leaves;
pub mod nodes;
pub mod scheduler;
pub mod task;
pub mod tick;
pub mod tree;

pub use bt::{BtNode, BtStatus, TaskContext, TaskStatus};
pub use config::{SchedulerConfig, ThinkSchedule};
pub use decorators::{AlwaysFail, AlwaysSucceed, Cooldown, Guard, Invert, Repeat, Retry, TimeLimit};
#[cfg(feature = "serde")]
pub use error::ConfigError;
pub use error::{SchedulerError, SetupError};
pub use leaves::{Action, AwaitCondition, CheckVar, Compare, Condition, SetVar, Target, Wait};
pub use nodes::{Parallel, ParallelPolicy, ReactiveSelector, ReactiveSequence, Selector, Sequence};
pub use scheduler::{InstanceId, Scheduler};
pub use task::Task;
pub use tick::TickContext;
pub use tree::{BehaviorTree, TreeInstance};
