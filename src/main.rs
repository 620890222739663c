//! Pocket Arcade headless driver
//!
//! Plays scripted sessions of each mini-game with a fixed frame clock and
//! prints the final state as JSON. Stands in for the app's frame scheduler.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use pocket_arcade::Settings;
use pocket_arcade::clicker::Clicker;
use pocket_arcade::countdown::Countdown;
use pocket_arcade::sim::{self, PointerEvent, RoundEvent};

#[derive(Parser, Debug)]
#[command(name = "pocket-arcade", about = "Run pocket arcade mini-games headless")]
struct Cli {
    /// JSON settings file (defaults are used when absent)
    #[arg(long)]
    settings: Option<PathBuf>,
    #[command(subcommand)]
    game: Game,
}

#[derive(Subcommand, Debug)]
enum Game {
    /// Brick breaker round
    Breakout {
        #[arg(long, default_value_t = 400.0)]
        width: f32,
        #[arg(long, default_value_t = 800.0)]
        height: f32,
        #[arg(long, default_value_t = 600)]
        frames: u32,
        #[arg(long, default_value_t = 16.0)]
        frame_ms: f32,
        /// Sweep the paddle back and forth across the field
        #[arg(long)]
        sweep: bool,
    },
    /// Derivative Clicker session
    Clicker {
        #[arg(long, default_value_t = 20)]
        clicks: u32,
        /// Idle time after clicking, in seconds
        #[arg(long, default_value_t = 10)]
        seconds: u32,
        /// Building indices to buy, in order
        #[arg(long, num_args = 0..)]
        buy: Vec<usize>,
    },
    /// Stop-the-timer reaction game
    Countdown {
        /// Real time before pressing stop
        #[arg(long, default_value_t = 3_500)]
        stop_at_ms: u32,
        #[arg(long, default_value_t = 16)]
        frame_ms: u32,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let settings = match &cli.settings {
        Some(path) => Settings::try_load_from(path)
            .with_context(|| format!("loading settings from {}", path.display()))?,
        None => Settings::default(),
    };
    settings.validate().context("settings rejected")?;

    match cli.game {
        Game::Breakout {
            width,
            height,
            frames,
            frame_ms,
            sweep,
        } => run_breakout(&settings, width, height, frames, frame_ms, sweep),
        Game::Clicker { clicks, seconds, buy } => run_clicker(&settings, clicks, seconds, &buy),
        Game::Countdown {
            stop_at_ms,
            frame_ms,
        } => run_countdown(&settings, stop_at_ms, frame_ms),
    }
}

fn run_breakout(
    settings: &Settings,
    width: f32,
    height: f32,
    frames: u32,
    frame_ms: f32,
    sweep: bool,
) -> Result<()> {
    settings.validate_field(width, height)?;
    let mut round = sim::setup(width, height, &settings.breakout);
    sim::start(&mut round);

    for frame in 0..frames {
        if sweep {
            // Triangle wave across the field, one pass every 240 frames
            let t = (frame % 240) as f32 / 120.0;
            let x = width * if t < 1.0 { t } else { 2.0 - t };
            sim::handle_pointer(&mut round, PointerEvent::at(x));
        }
        sim::tick(&mut round, frame_ms);

        for event in round.drain_events() {
            match event {
                RoundEvent::BrickDestroyed { id, remaining } => {
                    log::info!("frame {frame}: brick {id} down, {remaining} left")
                }
                RoundEvent::FieldCleared => log::info!("frame {frame}: field cleared"),
                other => log::debug!("frame {frame}: {other:?}"),
            }
        }
        if !round.is_running() {
            break;
        }
    }

    println!("{}", serde_json::to_string_pretty(&round.snapshot())?);
    Ok(())
}

fn run_clicker(settings: &Settings, clicks: u32, seconds: u32, buy: &[usize]) -> Result<()> {
    let mut clicker = Clicker::new(&settings.clicker);
    for _ in 0..clicks {
        clicker.click();
    }
    for &index in buy {
        match clicker.buy(index) {
            Ok(purchase) => {
                if let Some(achievement) = purchase.achievement {
                    log::info!("Achievement Unlocked! {achievement}");
                }
            }
            Err(e) => log::warn!("purchase of building {index} failed: {e}"),
        }
    }
    let paid = clicker.advance(f64::from(seconds) * 1000.0);
    log::info!("idle payout over {seconds}s: ${paid:.2}");

    println!("{}", serde_json::to_string_pretty(&clicker.snapshot())?);
    Ok(())
}

fn run_countdown(settings: &Settings, stop_at_ms: u32, frame_ms: u32) -> Result<()> {
    let frame_ms = frame_ms.max(1);
    let mut game = Countdown::new(&settings.countdown);
    game.start();

    let mut elapsed: u32 = 0;
    let mut outcome = None;
    while let Some(next) = elapsed.checked_add(frame_ms).filter(|&t| t <= stop_at_ms) {
        elapsed = next;
        outcome = game.advance(f64::from(frame_ms));
        if outcome.is_some() {
            break;
        }
    }
    if outcome.is_none() {
        outcome = game.stop();
    }

    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}
