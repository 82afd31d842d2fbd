/// One control step, as seen by every task ticked during it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickContext {
    pub tick: u64,
    pub dt_seconds: f64,
    /// Simulation time at the end of this step.
    pub time_seconds: f64,
}

impl TickContext {
    /// The first step of a run with a fixed timestep.
    pub fn start(dt_seconds: f64) -> Self {
        Self {
            tick: 0,
            dt_seconds,
            time_seconds: dt_seconds,
        }
    }

    pub fn next(self) -> Self {
        self.next_with(self.dt_seconds)
    }

    pub fn next_with(self, dt_seconds: f64) -> Self {
        Self {
            tick: self.tick + 1,
            dt_seconds,
            time_seconds: self.time_seconds + dt_seconds,
        }
    }
}
