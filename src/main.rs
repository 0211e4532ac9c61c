//! Froggit entry point
//!
//! Runs a level headless at a fixed timestep, feeding scripted hops and
//! printing how the level ended.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;

use froggit::audio::{AudioManager, LogSink};
use froggit::renderer::SpriteBatch;
use froggit::sim::{GameEvent, Heading, TickInput};
use froggit::{Settings, load_level};

#[derive(Parser, Debug)]
#[command(name = "froggit")]
#[command(about = "Run a Froggit level headless", long_about = None)]
struct Cli {
    /// Level description (JSON)
    level: PathBuf,

    /// Image and sprite description (JSON)
    assets: PathBuf,

    /// Settings file; defaults are used if it is missing
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Frames to simulate
    #[arg(long, default_value_t = 600)]
    frames: u32,

    /// Simulation rate (fixed dt = 1/fps)
    #[arg(long, default_value_t = 60.0)]
    fps: f32,

    /// Hops to play, one per idle frame: U D L R, `.` waits a frame
    #[arg(long, default_value = "")]
    script: String,
}

/// One scripted step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Hop(Heading),
    Wait,
}

fn parse_script(script: &str) -> Result<Vec<Step>> {
    script
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| match c.to_ascii_uppercase() {
            'U' => Ok(Step::Hop(Heading::North)),
            'D' => Ok(Step::Hop(Heading::South)),
            'L' => Ok(Step::Hop(Heading::West)),
            'R' => Ok(Step::Hop(Heading::East)),
            '.' => Ok(Step::Wait),
            other => bail!("unknown script key '{other}' (use U, D, L, R or .)"),
        })
        .collect()
}

#[derive(Debug, Default)]
struct Summary {
    frames: u32,
    hops: u32,
    deaths: u32,
    captures: u32,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    if !(cli.fps.is_finite() && cli.fps > 0.0) {
        bail!("--fps must be a positive number, got {}", cli.fps);
    }
    let script = parse_script(&cli.script)?;

    let settings = cli
        .settings
        .as_deref()
        .map(Settings::load)
        .unwrap_or_default();
    let mut level = load_level(&cli.level, &cli.assets, &settings).with_context(|| {
        format!(
            "failed to load level {} with assets {}",
            cli.level.display(),
            cli.assets.display()
        )
    })?;
    log::info!("Froggit starting: {}", cli.level.display());

    let mut audio = AudioManager::from_settings(LogSink, &settings);
    let mut batch = SpriteBatch::new();
    let mut steps = script.into_iter();
    let mut summary = Summary::default();
    let dt = 1.0 / cli.fps;

    while summary.frames < cli.frames {
        if level.all_goals_captured() || level.lives_exhausted() {
            break;
        }
        if !level.actor_present() {
            level.respawn();
        }

        let idle = level.frog().is_some_and(|frog| !frog.is_animating());
        let input = match idle.then(|| steps.next()).flatten() {
            Some(Step::Hop(heading)) => TickInput::press(heading),
            Some(Step::Wait) | None => TickInput::default(),
        };
        level.update(&input, dt);
        summary.frames += 1;

        let events = level.drain_events();
        for event in &events {
            match event {
                GameEvent::Hopped { .. } => summary.hops += 1,
                GameEvent::Died { .. } => summary.deaths += 1,
                GameEvent::GoalCaptured { .. } => summary.captures += 1,
                _ => {}
            }
        }
        audio.handle_events(&events);

        batch.clear();
        level.draw(&mut batch);
    }

    let outcome = if level.all_goals_captured() {
        "won"
    } else if level.lives_exhausted() {
        "lost"
    } else {
        "unfinished"
    };
    println!("Level {}", cli.level.display());
    println!("  Outcome:   {outcome}");
    println!("  Frames:    {}", summary.frames);
    println!("  Hops:      {}", summary.hops);
    println!("  Deaths:    {}", summary.deaths);
    println!("  Captures:  {}", summary.captures);
    println!("  Lives:     {}", level.lives());
    println!("  Sprites:   {}", batch.sprite_count());
    Ok(())
}
