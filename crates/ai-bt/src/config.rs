use ai_blackboard::AgentId;

use crate::TickContext;
#[cfg(feature = "serde")]
use crate::ConfigError;

/// Scheduler-wide knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SchedulerConfig {
    /// Instances tick once every this many scheduler ticks.
    pub think_every_ticks: u32,
    /// Spread instances over the think period by agent id instead of ticking them together.
    pub stagger_agents: bool,
    /// Reset a tree to fresh tasks after its root finishes.
    pub restart_on_completion: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            think_every_ticks: 1,
            stagger_agents: false,
            restart_on_completion: true,
        }
    }
}

impl SchedulerConfig {
    #[cfg(feature = "serde")]
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// The schedule of a newly spawned instance for `agent`.
    pub fn schedule_for(&self, agent: impl AgentId) -> ThinkSchedule {
        let period = u64::from(self.think_every_ticks.max(1));
        let phase = if self.stagger_agents {
            agent.stable_id() % period
        } else {
            0
        };
        ThinkSchedule {
            period,
            phase,
            last_time_seconds: None,
        }
    }
}

/// Which steps a single instance runs on, and when it last ran.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThinkSchedule {
    period: u64,
    phase: u64,
    last_time_seconds: Option<f64>,
}

impl Default for ThinkSchedule {
    fn default() -> Self {
        SchedulerConfig::default().schedule_for(0u64)
    }
}

impl ThinkSchedule {
    pub fn period(&self) -> u64 {
        self.period
    }

    pub fn phase(&self) -> u64 {
        self.phase
    }

    /// The step the instance sees during `tick`, or `None` when it sits the step out.
    ///
    /// The returned `dt_seconds` spans every step since the instance last ran, so task
    /// elapsed time keeps pace with simulation time. The first run uses the step's own delta.
    pub fn step(&mut self, tick: &TickContext) -> Option<TickContext> {
        if tick.tick % self.period != self.phase {
            return None;
        }
        let dt_seconds = match self.last_time_seconds {
            Some(last) => (tick.time_seconds - last).max(0.0),
            None => tick.dt_seconds,
        };
        self.last_time_seconds = Some(tick.time_seconds);
        Some(TickContext { dt_seconds, ..*tick })
    }
}
