use thiserror::Error;

use crate::{ScopeId, VarType};

/// Failures of runtime blackboard reads and writes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BlackboardError {
    #[error("undefined variable: {0}")]
    UndefinedVariable(String),

    #[error("type mismatch for variable {name}: expected {expected}, got {actual}")]
    TypeMismatch {
        name: String,
        expected: VarType,
        actual: VarType,
    },

    #[error("link chain for variable {0} does not terminate")]
    LinkCycle(String),

    #[error("scope {0:?} no longer exists")]
    DanglingScope(ScopeId),
}

/// Failures of structural plan edits and plan instantiation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanError {
    #[error("variable already declared: {0}")]
    DuplicateName(String),

    #[error("variable not found: {0}")]
    NotFound(String),

    #[error("invalid variable name: {0:?}")]
    InvalidName(String),

    #[error("index {index} out of range for {len} variables")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("plan has {local} variables after sync but base has {base}")]
    StructuralMismatch { local: usize, base: usize },

    #[error("cannot link variable {0} to parent scope: no parent scope")]
    MissingParentScope(String),

    #[error("could not resolve {path:?} for variable {name}")]
    Unresolved { name: String, path: String },

    #[error("unknown property: {0}")]
    UnknownProperty(String),

    #[error("property {path} expects a {expected} value")]
    PropertyKind { path: String, expected: &'static str },

    #[error("property {0} is read-only")]
    ReadOnly(String),

    #[error(transparent)]
    Blackboard(#[from] BlackboardError),
}
