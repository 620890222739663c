//! Stop-the-timer reaction game
//!
//! A countdown runs faster than real time; stopping it at exactly the target
//! reading earns a point. Time is kept in integer tenths of a second so the
//! target comparison is exact.

use serde::{Deserialize, Serialize};

use crate::settings::CountdownTuning;

/// What a stop or an expiry produced
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum CountdownOutcome {
    /// Stopped exactly on target
    Perfect { stopped_secs: f32, points: u32 },
    /// Stopped anywhere else
    Miss { stopped_secs: f32 },
    /// Reached zero before a stop
    TimeUp,
}

#[derive(Debug, Clone)]
pub struct Countdown {
    tuning: CountdownTuning,
    remaining_tenths: u32,
    running: bool,
    points: u32,
    last_stopped_tenths: Option<u32>,
    accumulator_ms: f64,
}

fn tenths_to_secs(tenths: u32) -> f32 {
    tenths as f32 / 10.0
}

impl Countdown {
    pub fn new(tuning: &CountdownTuning) -> Self {
        Self {
            tuning: tuning.clone(),
            remaining_tenths: tuning.start_tenths,
            running: false,
            points: 0,
            last_stopped_tenths: None,
            accumulator_ms: 0.0,
        }
    }

    /// Restart from the top; points carry over
    pub fn start(&mut self) {
        self.remaining_tenths = self.tuning.start_tenths;
        self.running = true;
        self.last_stopped_tenths = None;
        self.accumulator_ms = 0.0;
        log::debug!("Countdown started at {}s", self.remaining_secs());
    }

    /// Run the clock; returns `TimeUp` on the frame it hits zero
    pub fn advance(&mut self, elapsed_ms: f64) -> Option<CountdownOutcome> {
        if !self.running || !elapsed_ms.is_finite() || elapsed_ms <= 0.0 {
            return None;
        }
        if !(self.tuning.interval_ms > 0.0) {
            log::warn!("Countdown interval {} ms is not positive", self.tuning.interval_ms);
            return None;
        }
        self.accumulator_ms += elapsed_ms;

        while self.accumulator_ms >= self.tuning.interval_ms {
            self.accumulator_ms -= self.tuning.interval_ms;
            self.remaining_tenths = self.remaining_tenths.saturating_sub(self.tuning.step_tenths);
            if self.remaining_tenths == 0 {
                self.running = false;
                self.remaining_tenths = self.tuning.start_tenths;
                self.accumulator_ms = 0.0;
                log::info!("Countdown: time's up");
                return Some(CountdownOutcome::TimeUp);
            }
        }
        None
    }

    /// Stop the clock; `None` when it is not running
    pub fn stop(&mut self) -> Option<CountdownOutcome> {
        if !self.running {
            return None;
        }
        let stopped = self.remaining_tenths;
        self.running = false;
        self.remaining_tenths = self.tuning.start_tenths;
        self.accumulator_ms = 0.0;
        self.last_stopped_tenths = Some(stopped);

        let stopped_secs = tenths_to_secs(stopped);
        if stopped == self.tuning.target_tenths {
            self.points += 1;
            log::info!("Countdown: perfect stop at {}s ({} points)", stopped_secs, self.points);
            Some(CountdownOutcome::Perfect {
                stopped_secs,
                points: self.points,
            })
        } else {
            log::info!("Countdown: stopped at {}s", stopped_secs);
            Some(CountdownOutcome::Miss { stopped_secs })
        }
    }

    pub fn remaining_secs(&self) -> f32 {
        tenths_to_secs(self.remaining_tenths)
    }

    pub fn remaining_tenths(&self) -> u32 {
        self.remaining_tenths
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn points(&self) -> u32 {
        self.points
    }

    pub fn last_stopped_secs(&self) -> Option<f32> {
        self.last_stopped_tenths.map(tenths_to_secs)
    }
}
