//! Round controller: setup, launch, per-frame tick and paddle input
//!
//! Driven once per frame by an external scheduler. Every call is
//! synchronous; nothing here blocks or spawns.

use glam::Vec2;

use super::physics::{ArcadeWorld, BodyDesc, BodyRole, Motion, PhysicsError, PhysicsWorld, Shape};
use super::state::{Ball, Brick, Paddle, PointerEvent, Round, RoundEvent, RoundPhase};
use crate::clamp_to_span;
use crate::consts::{MAX_BRICK_COLS, MAX_BRICK_ROWS};
use crate::settings::BreakoutTuning;

/// Build a round on the default in-process physics world
pub fn setup(field_width: f32, field_height: f32, tuning: &BreakoutTuning) -> Round {
    setup_with(ArcadeWorld::new(), field_width, field_height, tuning)
}

/// Build a round on any physics world: brick grid, centred paddle, ball held above it
pub fn setup_with<W: PhysicsWorld>(
    mut world: W,
    field_width: f32,
    field_height: f32,
    tuning: &BreakoutTuning,
) -> Round<W> {
    let field = Vec2::new(field_width, field_height);
    let bricks = generate_bricks(&mut world, field, tuning);

    let paddle_center = Vec2::new(field_width / 2.0, field_height - tuning.paddle_y_offset);
    let paddle_body = world.insert(BodyDesc::fixed(
        BodyRole::Paddle,
        Shape::rect(tuning.paddle_width, tuning.paddle_height),
        paddle_center,
    ));
    let paddle = Paddle {
        body: paddle_body,
        x: paddle_center.x,
        y: paddle_center.y,
        width: tuning.paddle_width,
        height: tuning.paddle_height,
    };

    let start = Vec2::new(field_width / 2.0, field_height - tuning.ball_start_offset);
    let ball_body = world.insert(BodyDesc::fixed(
        BodyRole::Ball,
        Shape::Circle {
            radius: tuning.ball_radius,
        },
        start,
    ));
    let ball = Ball {
        body: ball_body,
        radius: tuning.ball_radius,
        pos: start,
        vel: Vec2::ZERO,
        start,
        launch_velocity: tuning.launch_velocity,
    };

    log::info!(
        "Round setup: field {}x{}, {} bricks ({} rows)",
        field_width,
        field_height,
        bricks.len(),
        tuning.brick_rows
    );

    Round::from_parts(world, field, tuning.clone(), ball, paddle, bricks)
}

/// Lay out the brick grid: as many columns as fit the field width, fixed row count
pub fn generate_bricks<W: PhysicsWorld>(
    world: &mut W,
    field: Vec2,
    tuning: &BreakoutTuning,
) -> Vec<Brick> {
    let fit = (field.x / tuning.brick_width).floor();
    let cols = if fit.is_finite() {
        fit.clamp(0.0, MAX_BRICK_COLS as f32) as u32
    } else {
        0
    };
    let rows = tuning.brick_rows.min(MAX_BRICK_ROWS);
    if rows < tuning.brick_rows || fit > MAX_BRICK_COLS as f32 {
        log::warn!(
            "Brick grid capped at {}x{} (asked for {} rows, {} columns fit)",
            cols,
            rows,
            tuning.brick_rows,
            fit
        );
    }
    let size = Vec2::new(
        tuning.brick_width - tuning.brick_gap,
        tuning.brick_height - tuning.brick_gap,
    );

    let mut bricks = Vec::with_capacity((cols * rows) as usize);
    for row in 0..rows {
        for col in 0..cols {
            let id = row * cols + col;
            let center = Vec2::new(
                col as f32 * tuning.brick_width + tuning.brick_width / 2.0,
                row as f32 * tuning.brick_height + tuning.brick_top_offset,
            );
            let body = world.insert(BodyDesc::fixed(
                BodyRole::Brick { id },
                Shape::rect(size.x, size.y),
                center,
            ));
            bricks.push(Brick {
                id,
                body,
                center,
                size,
                alive: true,
            });
        }
    }
    bricks
}

/// Launch the ball. Only an idle round launches; anything else is a no-op.
pub fn start<W: PhysicsWorld>(round: &mut Round<W>) {
    match round.phase {
        RoundPhase::Idle => {}
        RoundPhase::Running => {
            log::debug!("start ignored: round already running");
            return;
        }
        RoundPhase::Cleared => {
            log::debug!("start ignored: field already cleared");
            return;
        }
    }

    if let Err(err) = launch(round) {
        recover(round, err);
    }
}

fn launch<W: PhysicsWorld>(round: &mut Round<W>) -> Result<(), PhysicsError> {
    let body = round.ball.body;
    round.world.set_motion(body, Motion::Dynamic)?;
    round.set_ball_velocity(round.ball.launch_velocity)?;
    round.phase = RoundPhase::Running;
    round.started = true;
    round.push_event(RoundEvent::Launched);
    log::debug!("Ball launched with velocity {:?}", round.ball.vel);
    Ok(())
}

/// Clamp frame time into a stable integration step
pub fn clamp_step_ms(elapsed_ms: f32, max_step_ms: f32) -> f32 {
    if !elapsed_ms.is_finite() || elapsed_ms <= 0.0 {
        return 0.0;
    }
    elapsed_ms.min(max_step_ms)
}

/// Advance a running round by one frame
pub fn tick<W: PhysicsWorld>(round: &mut Round<W>, elapsed_ms: f32) {
    if round.phase != RoundPhase::Running {
        return;
    }
    if let Err(err) = advance(round, elapsed_ms) {
        recover(round, err);
    }
}

fn advance<W: PhysicsWorld>(round: &mut Round<W>, elapsed_ms: f32) -> Result<(), PhysicsError> {
    round.time_ticks += 1;

    // Ball already below the field: put it back before integrating
    if round.ball.pos.y > round.field.y {
        return reset_ball(round);
    }

    let step_ms = clamp_step_ms(elapsed_ms, round.tuning.max_step_ms);
    round.world.step(step_ms / 1000.0)?;
    round.sync_ball()?;

    // First overlapping brick in layout order wins; one brick per tick
    let ball_body = round.ball.body;
    let mut hit = None;
    for (index, brick) in round.bricks.iter().enumerate() {
        if brick.alive && round.world.overlaps(ball_body, brick.body)? {
            hit = Some(index);
            break;
        }
    }
    if let Some(index) = hit {
        destroy_brick(round, index)?;
        if round.phase == RoundPhase::Cleared {
            return Ok(());
        }
    }

    if round.ball.vel.y > 0.0 && round.world.overlaps(ball_body, round.paddle.body)? {
        let vel = round.ball.vel;
        round.set_ball_velocity(Vec2::new(vel.x, -vel.y))?;
        round.push_event(RoundEvent::PaddleHit);
    }

    if round.tuning.walls {
        bounce_off_walls(round)?;
    }

    if round.ball.pos.y > round.field.y {
        reset_ball(round)?;
    }
    Ok(())
}

fn destroy_brick<W: PhysicsWorld>(round: &mut Round<W>, index: usize) -> Result<(), PhysicsError> {
    let (id, body) = {
        let brick = &round.bricks[index];
        (brick.id, brick.body)
    };
    round.world.remove(body)?;
    round.bricks[index].alive = false;
    round.cleared_count += 1;

    let vel = round.ball.vel;
    round.set_ball_velocity(Vec2::new(vel.x, -vel.y))?;

    let remaining = round.alive_count();
    round.push_event(RoundEvent::BrickDestroyed { id, remaining });
    log::debug!("Brick {} destroyed, {} remaining", id, remaining);

    if remaining == 0 {
        round.world.set_motion(round.ball.body, Motion::Static)?;
        round.set_ball_velocity(Vec2::ZERO)?;
        round.phase = RoundPhase::Cleared;
        round.push_event(RoundEvent::FieldCleared);
        log::info!("Field cleared after {} ticks", round.time_ticks);
    }
    Ok(())
}

/// Reflect off the side and top edges, only when moving into them
fn bounce_off_walls<W: PhysicsWorld>(round: &mut Round<W>) -> Result<(), PhysicsError> {
    let (pos, vel, radius) = (round.ball.pos, round.ball.vel, round.ball.radius);
    let mut new_vel = vel;

    if (pos.x - radius < 0.0 && vel.x < 0.0) || (pos.x + radius > round.field.x && vel.x > 0.0) {
        new_vel.x = -vel.x;
    }
    if pos.y - radius < 0.0 && vel.y < 0.0 {
        new_vel.y = -vel.y;
    }

    if new_vel != vel {
        round.set_ball_velocity(new_vel)?;
        round.push_event(RoundEvent::WallBounce);
    }
    Ok(())
}

/// Miss recovery: back to the start spot with the launch velocity
fn reset_ball<W: PhysicsWorld>(round: &mut Round<W>) -> Result<(), PhysicsError> {
    round.place_ball(round.ball.start)?;
    round.set_ball_velocity(round.ball.launch_velocity)?;
    round.misses += 1;
    round.push_event(RoundEvent::BallMissed);
    log::info!("Ball missed ({} total), reset to start", round.misses);
    Ok(())
}

/// Put the paddle under the pointer, clamped so it stays inside the field
pub fn move_paddle<W: PhysicsWorld>(round: &mut Round<W>, pointer_x: f32) {
    if !pointer_x.is_finite() {
        log::debug!("Ignoring non-finite pointer x {}", pointer_x);
        return;
    }
    let half = round.paddle.width / 2.0;
    let x = clamp_to_span(pointer_x, half, round.field.x - half);

    let target = Vec2::new(x, round.paddle.y);
    match round.world.set_position(round.paddle.body, target) {
        Ok(()) => round.paddle.x = x,
        Err(err) => recover(round, err),
    }
}

/// Input callback entry point; events without a coordinate are dropped
pub fn handle_pointer<W: PhysicsWorld>(round: &mut Round<W>, event: PointerEvent) {
    match event.x {
        Some(x) => move_paddle(round, x),
        None => log::debug!("Ignoring pointer event without coordinate"),
    }
}

/// Physics failure: log, then rebuild the ball and paddle bodies and go idle.
/// Surviving bricks are kept; any whose body went missing is re-inserted.
fn recover<W: PhysicsWorld>(round: &mut Round<W>, err: PhysicsError) {
    log::error!("Physics failure, resetting round: {}", err);

    // Either body may already be gone from a broken world
    let _ = round.world.remove(round.ball.body);
    let _ = round.world.remove(round.paddle.body);

    round.ball.pos = round.ball.start;
    round.ball.vel = Vec2::ZERO;
    round.ball.body = round.world.insert(round.ball.desc(Motion::Static));

    round.paddle.x = round.field.x / 2.0;
    round.paddle.body = round.world.insert(BodyDesc::fixed(
        BodyRole::Paddle,
        Shape::rect(round.paddle.width, round.paddle.height),
        round.paddle.center(),
    ));

    for brick in round.bricks.iter_mut().filter(|b| b.alive) {
        if round.world.position(brick.body).is_ok() {
            continue;
        }
        log::warn!("Brick {} lost its body, re-inserting", brick.id);
        brick.body = round.world.insert(BodyDesc::fixed(
            BodyRole::Brick { id: brick.id },
            Shape::rect(brick.size.x, brick.size.y),
            brick.center,
        ));
    }

    if round.phase == RoundPhase::Running {
        round.phase = RoundPhase::Idle;
    }
    round.push_event(RoundEvent::PhysicsFault);
}
