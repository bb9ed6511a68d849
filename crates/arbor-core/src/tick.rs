/// Simulation clock of one tree instance.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickContext {
    /// Number of ticks since the instance was bound (the first tick is 1).
    pub tick: u64,
    pub dt_seconds: f32,
    /// Accumulated simulated time at the end of the current tick.
    pub time_seconds: f64,
}

impl TickContext {
    pub fn advance(&mut self, dt_seconds: f32) {
        self.tick = self.tick.wrapping_add(1);
        self.dt_seconds = dt_seconds;
        self.time_seconds += f64::from(dt_seconds);
    }
}
