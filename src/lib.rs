//! Pocket Arcade - simulation core for three casual mini-games
//!
//! Core modules:
//! - `sim`: Deterministic brick-breaker round (ball, paddle, bricks)
//! - `clicker`: Derivative Clicker idle progression game
//! - `countdown`: Stop-the-timer reaction game
//! - `settings`: Data-driven tuning for all three games

pub mod clicker;
pub mod countdown;
pub mod settings;
pub mod sim;

pub use clicker::Clicker;
pub use countdown::Countdown;
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Largest simulation step a single tick may advance (one 60 Hz frame)
    pub const MAX_STEP_MS: f32 = 1000.0 / 60.0;

    /// Ball defaults
    pub const BALL_RADIUS: f32 = 10.0;
    /// Launch velocity in px/s (up and to the right; screen y grows downward)
    pub const BALL_LAUNCH_VX: f32 = 180.0;
    pub const BALL_LAUNCH_VY: f32 = -300.0;
    /// Ball rest spot, measured up from the bottom edge
    pub const BALL_START_OFFSET: f32 = 50.0;

    /// Paddle defaults
    pub const PADDLE_WIDTH: f32 = 100.0;
    pub const PADDLE_HEIGHT: f32 = 15.0;
    /// Paddle centre line, measured up from the bottom edge
    pub const PADDLE_Y_OFFSET: f32 = 30.0;

    /// Brick grid defaults
    pub const BRICK_WIDTH: f32 = 60.0;
    pub const BRICK_HEIGHT: f32 = 20.0;
    pub const BRICK_GAP: f32 = 5.0;
    pub const BRICK_ROWS: u32 = 5;
    /// Centre of the first brick row
    pub const BRICK_TOP_OFFSET: f32 = 50.0;
    /// Grid limits; keep ids and the brick list bounded
    pub const MAX_BRICK_ROWS: u32 = 64;
    pub const MAX_BRICK_COLS: u32 = 256;

    /// Clicker defaults
    pub const CLICKER_START_MONEY: f64 = 0.1;
    pub const CLICKER_MONEY_PER_CLICK: f64 = 1.0;
    pub const CLICKER_PAYOUT_INTERVAL_MS: f64 = 1000.0;
    /// Money per second from each first-order building
    pub const CLICKER_BASE_PRODUCTION: f64 = 0.1;

    /// Countdown defaults (tenths of a second keep the arithmetic exact)
    pub const COUNTDOWN_START_TENTHS: u32 = 100;
    pub const COUNTDOWN_STEP_TENTHS: u32 = 2;
    pub const COUNTDOWN_INTERVAL_MS: f64 = 100.0;
    pub const COUNTDOWN_TARGET_TENTHS: u32 = 30;
}

/// Clamp `value` into `[min, max]`, collapsing to the midpoint when the span is inverted
#[inline]
pub fn clamp_to_span(value: f32, min: f32, max: f32) -> f32 {
    if min > max {
        return (min + max) / 2.0;
    }
    value.clamp(min, max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_to_span() {
        assert_eq!(clamp_to_span(-50.0, 40.0, 360.0), 40.0);
        assert_eq!(clamp_to_span(500.0, 40.0, 360.0), 360.0);
        assert_eq!(clamp_to_span(120.0, 40.0, 360.0), 120.0);
        // Paddle wider than the field: stays centred
        assert_eq!(clamp_to_span(10.0, 60.0, 40.0), 50.0);
    }
}
