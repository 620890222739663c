//! Deterministic brick-breaker simulation
//!
//! All round logic lives here. This module must stay pure:
//! - Frame time clamped to a fixed maximum step
//! - Stable brick iteration order (layout order)
//! - Geometry and integration delegated to a `PhysicsWorld`
//! - No rendering or platform dependencies

pub mod physics;
pub mod state;
pub mod tick;

pub use physics::{
    ArcadeWorld, BodyDesc, BodyHandle, BodyRole, Motion, PhysicsError, PhysicsWorld, Shape,
    shapes_overlap,
};
pub use state::{
    Ball, BallView, Brick, BrickView, Paddle, PointerEvent, RectView, Round, RoundEvent,
    RoundPhase, RoundSnapshot,
};
pub use tick::{
    clamp_step_ms, generate_bricks, handle_pointer, move_paddle, setup, setup_with, start, tick,
};
