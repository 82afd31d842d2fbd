//! Typed, scoped blackboard variables for behavior-tree agents.
//!
//! A [`Plan`] declares variables and their defaults, optionally deriving from a base plan.
//! Instantiating a plan fills a scope of a [`Blackboard`] registry; scopes chain to a parent
//! scope and may alias names into it.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod blackboard;
pub mod error;
pub mod plan;
pub mod property;
pub mod var;
pub mod world;

pub use blackboard::{Blackboard, BlackboardConfig, Link, Scope, ScopeId, ScopeStore};
pub use error::{BlackboardError, PlanError};
pub use plan::{is_identifier, BaseChange, Plan, PlanId, PopulateReport, RESERVED_PREFIX};
pub use property::{Property, PropertyInfo, PropertyUsage};
pub use var::{Hint, HintKind, ObjectId, Value, VarType, Variable};
pub use world::{AgentId, NullResolver, Resolver, WorldMut, WorldView};
