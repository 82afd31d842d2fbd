use ai_blackboard::BlackboardError;
use thiserror::Error;

use crate::InstanceId;

/// Why a task could not acquire what it needs to run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SetupError {
    #[error("required parameter is not set: {0}")]
    MissingParameter(&'static str),

    #[error("could not resolve {0:?}")]
    Unresolved(String),

    #[error(transparent)]
    Blackboard(#[from] BlackboardError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchedulerError {
    #[error("no such tree instance: {0:?}")]
    UnknownInstance(InstanceId),

    #[error(transparent)]
    Blackboard(#[from] BlackboardError),
}

#[cfg(feature = "serde")]
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid scheduler config: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
