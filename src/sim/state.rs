//! Round state and core brick-breaker types
//!
//! Positions live in the physics world; `Ball` mirrors the last value read
//! back so snapshots never have to touch the world.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::physics::{
    ArcadeWorld, BodyDesc, BodyHandle, BodyRole, Motion, PhysicsError, PhysicsWorld, Shape,
};
use crate::settings::BreakoutTuning;

/// Lifecycle of a round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundPhase {
    /// Ball held static above the paddle, waiting for `start`
    Idle,
    /// Ball integrated and colliding
    Running,
    /// Every brick destroyed; ball frozen
    Cleared,
}

/// Things that happened during a call, for the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundEvent {
    Launched,
    BrickDestroyed { id: u32, remaining: u32 },
    PaddleHit,
    WallBounce,
    /// Ball fell past the bottom edge and was put back
    BallMissed,
    FieldCleared,
    /// Physics service failed; round was reset
    PhysicsFault,
}

/// Pointer/touch input in field-local coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointerEvent {
    /// Missing on malformed events
    pub x: Option<f32>,
}

impl PointerEvent {
    pub fn at(x: f32) -> Self {
        Self { x: Some(x) }
    }
}

/// The single ball of a round
#[derive(Debug, Clone)]
pub struct Ball {
    pub body: BodyHandle,
    pub radius: f32,
    /// Last position read from the world
    pub pos: Vec2,
    /// Last velocity read from the world
    pub vel: Vec2,
    /// Rest spot used at setup and after every miss
    pub start: Vec2,
    pub launch_velocity: Vec2,
}

impl Ball {
    pub fn desc(&self, motion: Motion) -> BodyDesc {
        BodyDesc {
            role: BodyRole::Ball,
            shape: Shape::Circle { radius: self.radius },
            motion,
            position: self.pos,
            velocity: self.vel,
        }
    }
}

/// The player's paddle (static body, moved only by input)
#[derive(Debug, Clone)]
pub struct Paddle {
    pub body: BodyHandle,
    /// Centre x
    pub x: f32,
    /// Centre y, fixed for the whole round
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Paddle {
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }
}

/// A destructible brick; slots are never reused, `alive` only goes true -> false
#[derive(Debug, Clone)]
pub struct Brick {
    pub id: u32,
    pub body: BodyHandle,
    pub center: Vec2,
    pub size: Vec2,
    pub alive: bool,
}

/// One brick-breaker playthrough
#[derive(Debug, Clone)]
pub struct Round<W = ArcadeWorld> {
    /// Play-field width and height
    pub field: Vec2,
    pub tuning: BreakoutTuning,
    pub world: W,
    pub ball: Ball,
    pub paddle: Paddle,
    /// Layout order; destroyed bricks stay as tombstones
    pub bricks: Vec<Brick>,
    pub phase: RoundPhase,
    /// Set by the first launch; survives fault resets
    pub started: bool,
    /// Bricks destroyed so far
    pub cleared_count: u32,
    /// Times the ball fell past the bottom
    pub misses: u32,
    /// Running ticks processed
    pub time_ticks: u64,
    events: Vec<RoundEvent>,
}

impl<W: PhysicsWorld> Round<W> {
    pub(crate) fn from_parts(
        world: W,
        field: Vec2,
        tuning: BreakoutTuning,
        ball: Ball,
        paddle: Paddle,
        bricks: Vec<Brick>,
    ) -> Self {
        Self {
            field,
            tuning,
            world,
            ball,
            paddle,
            bricks,
            phase: RoundPhase::Idle,
            started: false,
            cleared_count: 0,
            misses: 0,
            time_ticks: 0,
            events: Vec::new(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.phase == RoundPhase::Running
    }

    /// Whether `start` has launched the ball at some point
    pub fn has_started(&self) -> bool {
        self.started
    }

    pub fn alive_bricks(&self) -> impl Iterator<Item = &Brick> {
        self.bricks.iter().filter(|b| b.alive)
    }

    pub fn alive_count(&self) -> u32 {
        self.alive_bricks().count() as u32
    }

    pub fn brick(&self, id: u32) -> Option<&Brick> {
        self.bricks.iter().find(|b| b.id == id)
    }

    /// Move the ball (world and mirror)
    pub fn place_ball(&mut self, pos: Vec2) -> Result<(), PhysicsError> {
        self.world.set_position(self.ball.body, pos)?;
        self.ball.pos = pos;
        Ok(())
    }

    /// Set the ball velocity (world and mirror)
    pub fn set_ball_velocity(&mut self, vel: Vec2) -> Result<(), PhysicsError> {
        self.world.set_velocity(self.ball.body, vel)?;
        self.ball.vel = vel;
        Ok(())
    }

    /// Refresh the ball mirror from the world
    pub(crate) fn sync_ball(&mut self) -> Result<(), PhysicsError> {
        self.ball.pos = self.world.position(self.ball.body)?;
        self.ball.vel = self.world.velocity(self.ball.body)?;
        Ok(())
    }

    pub(crate) fn push_event(&mut self, event: RoundEvent) {
        self.events.push(event);
    }

    /// Events since the last drain, oldest first
    pub fn events(&self) -> &[RoundEvent] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<RoundEvent> {
        std::mem::take(&mut self.events)
    }

    /// Plain values the presentation layer draws from
    pub fn snapshot(&self) -> RoundSnapshot {
        RoundSnapshot {
            phase: self.phase,
            field: self.field,
            ball: BallView {
                pos: self.ball.pos,
                radius: self.ball.radius,
            },
            paddle: RectView {
                center: self.paddle.center(),
                size: self.paddle.size(),
            },
            bricks: self
                .alive_bricks()
                .map(|b| BrickView {
                    id: b.id,
                    rect: RectView {
                        center: b.center,
                        size: b.size,
                    },
                })
                .collect(),
            cleared: self.cleared_count,
            misses: self.misses,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BallView {
    pub pos: Vec2,
    pub radius: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RectView {
    pub center: Vec2,
    pub size: Vec2,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BrickView {
    pub id: u32,
    pub rect: RectView,
}

/// Read-only frame data for rendering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundSnapshot {
    pub phase: RoundPhase,
    pub field: Vec2,
    pub ball: BallView,
    pub paddle: RectView,
    /// Alive bricks in layout order
    pub bricks: Vec<BrickView>,
    pub cleared: u32,
    pub misses: u32,
}
