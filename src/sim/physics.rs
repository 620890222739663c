//! Physics service boundary
//!
//! The round never integrates or tests geometry itself. It talks to a
//! `PhysicsWorld`: create bodies, step the world, read/write position and
//! velocity, ask whether two bodies overlap. `ArcadeWorld` is the in-process
//! service used by default: frictionless, gravity-free, no contact
//! resolution (the round decides every response).

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Opaque handle to a body owned by a physics world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BodyHandle(pub u32);

impl fmt::Display for BodyHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "body#{}", self.0)
    }
}

/// Collision geometry, centred on the body position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Circle { radius: f32 },
    Rect { half_extents: Vec2 },
}

impl Shape {
    pub fn rect(width: f32, height: f32) -> Self {
        Shape::Rect {
            half_extents: Vec2::new(width / 2.0, height / 2.0),
        }
    }
}

/// Whether the world integrates a body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Motion {
    /// Held in place; only moved by explicit `set_position`
    Static,
    /// Integrated every step
    Dynamic,
}

/// What a body stands for in the round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyRole {
    Ball,
    Paddle,
    Brick { id: u32 },
}

/// Everything needed to create a body
#[derive(Debug, Clone, Copy)]
pub struct BodyDesc {
    pub role: BodyRole,
    pub shape: Shape,
    pub motion: Motion,
    pub position: Vec2,
    pub velocity: Vec2,
}

impl BodyDesc {
    pub fn fixed(role: BodyRole, shape: Shape, position: Vec2) -> Self {
        Self {
            role,
            shape,
            motion: Motion::Static,
            position,
            velocity: Vec2::ZERO,
        }
    }
}

/// Failures reported by a physics world
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PhysicsError {
    /// Handle was never issued or the body was removed
    UnknownBody(BodyHandle),
    /// Step size was NaN or infinite
    NonFiniteStep(f32),
    /// A body's position or velocity went NaN or infinite
    NonFiniteState(BodyHandle),
}

impl fmt::Display for PhysicsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhysicsError::UnknownBody(h) => write!(f, "unknown {h}"),
            PhysicsError::NonFiniteStep(dt) => write!(f, "non-finite step: {dt}"),
            PhysicsError::NonFiniteState(h) => write!(f, "non-finite state on {h}"),
        }
    }
}

impl std::error::Error for PhysicsError {}

/// The physics service consumed by a round
pub trait PhysicsWorld {
    fn insert(&mut self, desc: BodyDesc) -> BodyHandle;
    fn remove(&mut self, handle: BodyHandle) -> Result<(), PhysicsError>;
    /// Advance every dynamic body by `dt` seconds
    fn step(&mut self, dt: f32) -> Result<(), PhysicsError>;
    fn role(&self, handle: BodyHandle) -> Result<BodyRole, PhysicsError>;
    fn set_motion(&mut self, handle: BodyHandle, motion: Motion) -> Result<(), PhysicsError>;
    fn position(&self, handle: BodyHandle) -> Result<Vec2, PhysicsError>;
    fn set_position(&mut self, handle: BodyHandle, position: Vec2) -> Result<(), PhysicsError>;
    fn velocity(&self, handle: BodyHandle) -> Result<Vec2, PhysicsError>;
    fn set_velocity(&mut self, handle: BodyHandle, velocity: Vec2) -> Result<(), PhysicsError>;
    /// Whether the shapes of two bodies overlap (touching counts)
    fn overlaps(&self, a: BodyHandle, b: BodyHandle) -> Result<bool, PhysicsError>;
    fn body_count(&self) -> usize;
}

#[derive(Debug, Clone)]
struct Body {
    role: BodyRole,
    shape: Shape,
    motion: Motion,
    pos: Vec2,
    vel: Vec2,
}

/// Minimal kinematic world: explicit Euler, no forces, no contact solving
#[derive(Debug, Clone, Default)]
pub struct ArcadeWorld {
    /// Slot per issued handle; removed bodies leave `None` so handles stay stable
    bodies: Vec<Option<Body>>,
}

impl ArcadeWorld {
    pub fn new() -> Self {
        Self::default()
    }

    fn get(&self, handle: BodyHandle) -> Result<&Body, PhysicsError> {
        self.bodies
            .get(handle.0 as usize)
            .and_then(Option::as_ref)
            .ok_or(PhysicsError::UnknownBody(handle))
    }

    fn get_mut(&mut self, handle: BodyHandle) -> Result<&mut Body, PhysicsError> {
        self.bodies
            .get_mut(handle.0 as usize)
            .and_then(Option::as_mut)
            .ok_or(PhysicsError::UnknownBody(handle))
    }
}

impl PhysicsWorld for ArcadeWorld {
    fn insert(&mut self, desc: BodyDesc) -> BodyHandle {
        let handle = BodyHandle(self.bodies.len() as u32);
        self.bodies.push(Some(Body {
            role: desc.role,
            shape: desc.shape,
            motion: desc.motion,
            pos: desc.position,
            vel: desc.velocity,
        }));
        handle
    }

    fn remove(&mut self, handle: BodyHandle) -> Result<(), PhysicsError> {
        let slot = self
            .bodies
            .get_mut(handle.0 as usize)
            .ok_or(PhysicsError::UnknownBody(handle))?;
        slot.take().map(|_| ()).ok_or(PhysicsError::UnknownBody(handle))
    }

    fn step(&mut self, dt: f32) -> Result<(), PhysicsError> {
        if !dt.is_finite() {
            return Err(PhysicsError::NonFiniteStep(dt));
        }
        for (index, slot) in self.bodies.iter_mut().enumerate() {
            let Some(body) = slot else { continue };
            if body.motion != Motion::Dynamic {
                continue;
            }
            body.pos += body.vel * dt;
            if !body.pos.is_finite() || !body.vel.is_finite() {
                return Err(PhysicsError::NonFiniteState(BodyHandle(index as u32)));
            }
        }
        Ok(())
    }

    fn role(&self, handle: BodyHandle) -> Result<BodyRole, PhysicsError> {
        Ok(self.get(handle)?.role)
    }

    fn set_motion(&mut self, handle: BodyHandle, motion: Motion) -> Result<(), PhysicsError> {
        self.get_mut(handle)?.motion = motion;
        Ok(())
    }

    fn position(&self, handle: BodyHandle) -> Result<Vec2, PhysicsError> {
        Ok(self.get(handle)?.pos)
    }

    fn set_position(&mut self, handle: BodyHandle, position: Vec2) -> Result<(), PhysicsError> {
        self.get_mut(handle)?.pos = position;
        Ok(())
    }

    fn velocity(&self, handle: BodyHandle) -> Result<Vec2, PhysicsError> {
        Ok(self.get(handle)?.vel)
    }

    fn set_velocity(&mut self, handle: BodyHandle, velocity: Vec2) -> Result<(), PhysicsError> {
        self.get_mut(handle)?.vel = velocity;
        Ok(())
    }

    fn overlaps(&self, a: BodyHandle, b: BodyHandle) -> Result<bool, PhysicsError> {
        let a = self.get(a)?;
        let b = self.get(b)?;
        Ok(shapes_overlap(a.shape, a.pos, b.shape, b.pos))
    }

    fn body_count(&self) -> usize {
        self.bodies.iter().filter(|b| b.is_some()).count()
    }
}

/// Pairwise overlap test for centred shapes
pub fn shapes_overlap(a: Shape, a_pos: Vec2, b: Shape, b_pos: Vec2) -> bool {
    match (a, b) {
        (Shape::Circle { radius: ra }, Shape::Circle { radius: rb }) => {
            a_pos.distance_squared(b_pos) <= (ra + rb) * (ra + rb)
        }
        (Shape::Circle { radius }, Shape::Rect { half_extents }) => {
            circle_rect_overlap(a_pos, radius, b_pos, half_extents)
        }
        (Shape::Rect { half_extents }, Shape::Circle { radius }) => {
            circle_rect_overlap(b_pos, radius, a_pos, half_extents)
        }
        (Shape::Rect { half_extents: ha }, Shape::Rect { half_extents: hb }) => {
            let d = (a_pos - b_pos).abs();
            d.x <= ha.x + hb.x && d.y <= ha.y + hb.y
        }
    }
}

/// Circle against axis-aligned box: distance from the centre to the closest box point
fn circle_rect_overlap(center: Vec2, radius: f32, rect_center: Vec2, half_extents: Vec2) -> bool {
    let closest = center.clamp(rect_center - half_extents, rect_center + half_extents);
    center.distance_squared(closest) <= radius * radius
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ball_at(world: &mut ArcadeWorld, pos: Vec2, vel: Vec2) -> BodyHandle {
        world.insert(BodyDesc {
            role: BodyRole::Ball,
            shape: Shape::Circle { radius: 10.0 },
            motion: Motion::Dynamic,
            position: pos,
            velocity: vel,
        })
    }

    #[test]
    fn test_step_moves_only_dynamic_bodies() {
        let mut world = ArcadeWorld::new();
        let ball = ball_at(&mut world, Vec2::new(100.0, 100.0), Vec2::new(60.0, -120.0));
        let wall = world.insert(BodyDesc {
            velocity: Vec2::new(50.0, 0.0),
            ..BodyDesc::fixed(BodyRole::Paddle, Shape::rect(80.0, 15.0), Vec2::new(0.0, 0.0))
        });

        world.step(0.5).unwrap();
        assert_eq!(world.position(ball).unwrap(), Vec2::new(130.0, 40.0));
        assert_eq!(world.position(wall).unwrap(), Vec2::ZERO);

        world.set_motion(ball, Motion::Static).unwrap();
        world.step(0.5).unwrap();
        assert_eq!(world.position(ball).unwrap(), Vec2::new(130.0, 40.0));
    }

    #[test]
    fn test_removed_handle_is_unknown() {
        let mut world = ArcadeWorld::new();
        let ball = ball_at(&mut world, Vec2::ZERO, Vec2::ZERO);
        let brick = world.insert(BodyDesc::fixed(
            BodyRole::Brick { id: 7 },
            Shape::rect(55.0, 15.0),
            Vec2::new(30.0, 50.0),
        ));
        assert_eq!(world.body_count(), 2);
        assert_eq!(world.role(brick).unwrap(), BodyRole::Brick { id: 7 });

        world.remove(brick).unwrap();
        assert_eq!(world.body_count(), 1);
        assert_eq!(world.remove(brick), Err(PhysicsError::UnknownBody(brick)));
        assert_eq!(world.overlaps(ball, brick), Err(PhysicsError::UnknownBody(brick)));
        assert_eq!(
            world.position(BodyHandle(99)),
            Err(PhysicsError::UnknownBody(BodyHandle(99)))
        );
    }

    #[test]
    fn test_non_finite_step_rejected() {
        let mut world = ArcadeWorld::new();
        let ball = ball_at(&mut world, Vec2::ZERO, Vec2::new(f32::INFINITY, 0.0));
        assert!(matches!(world.step(f32::NAN), Err(PhysicsError::NonFiniteStep(_))));
        assert_eq!(world.step(0.016), Err(PhysicsError::NonFiniteState(ball)));
    }

    #[test]
    fn test_circle_rect_overlap() {
        let rect = Shape::rect(60.0, 20.0);
        let circle = Shape::Circle { radius: 10.0 };
        let center = Vec2::new(100.0, 100.0);

        // Centre inside
        assert!(shapes_overlap(circle, center, rect, center));
        // Just touching the top edge
        assert!(shapes_overlap(circle, Vec2::new(100.0, 80.0), rect, center));
        // Clear of the top edge
        assert!(!shapes_overlap(circle, Vec2::new(100.0, 79.0), rect, center));
        // Near a corner but outside the rounded region
        assert!(!shapes_overlap(circle, Vec2::new(138.0, 118.0), rect, center));
        // Argument order does not matter
        assert!(shapes_overlap(rect, center, circle, Vec2::new(135.0, 100.0)));
    }

    #[test]
    fn test_circle_circle_and_rect_rect_overlap() {
        let c = Shape::Circle { radius: 5.0 };
        assert!(shapes_overlap(c, Vec2::ZERO, c, Vec2::new(10.0, 0.0)));
        assert!(!shapes_overlap(c, Vec2::ZERO, c, Vec2::new(10.1, 0.0)));

        let r = Shape::rect(10.0, 10.0);
        assert!(shapes_overlap(r, Vec2::ZERO, r, Vec2::new(9.0, 9.0)));
        assert!(!shapes_overlap(r, Vec2::ZERO, r, Vec2::new(11.0, 0.0)));
    }
}
