use std::time::{Duration, Instant};

use serde::Serialize;

/// Lap timer for tick processing cost
#[derive(Debug)]
pub struct Clock {
    last_tick: Instant,
    laps: LapStats,
}

/// Running summary of measured laps
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct LapStats {
    pub count: u64,
    pub total_ms: f64,
    pub min_ms: f64,
    pub max_ms: f64,
}

impl LapStats {
    pub fn record(&mut self, lap: Duration) {
        let ms = lap.as_secs_f64() * 1000.0;
        if self.count == 0 {
            self.min_ms = ms;
            self.max_ms = ms;
        } else {
            self.min_ms = self.min_ms.min(ms);
            self.max_ms = self.max_ms.max(ms);
        }
        self.count += 1;
        self.total_ms += ms;
    }

    pub fn mean_ms(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.total_ms / self.count as f64
        }
    }
}

impl Clock {
    /// Create new clock starting now
    pub fn new() -> Self {
        Self {
            last_tick: Instant::now(),
            laps: LapStats::default(),
        }
    }

    /// Restart the current lap without recording anything
    pub fn start(&mut self) {
        self.last_tick = Instant::now();
    }

    /// Close the current lap, record it and start the next one
    pub fn lap(&mut self) -> Duration {
        let now = Instant::now();
        let lap = now.duration_since(self.last_tick);
        self.last_tick = now;
        self.laps.record(lap);
        lap
    }

    pub fn stats(&self) -> LapStats {
        self.laps
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}
