//! Snake 3310 entry point
//!
//! Headless driver: plays a demo run on a virtual clock, replays the sealed
//! log and checks both runs rendered the same frames. Prints the replay
//! payload on success.
//!
//! Usage: `snake3310 [settings.json] [--seed N] [--max-ticks N]`

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use snake3310::sim::{Mode, Snapshot, steer};
use snake3310::{
    Effect, GameStateMachine, ManualScheduler, MemorySink, Settings, Submission, forward_sealed,
};

/// Play a demo run headlessly and check that its replay matches.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct CliArgs {
    /// Settings file (JSON). Defaults apply when omitted or missing.
    #[arg(value_name = "SETTINGS")]
    settings: Option<PathBuf>,
    /// Seed for food placement; overrides the settings file.
    #[arg(long)]
    seed: Option<u64>,
    /// Stop the run after this many ticks.
    #[arg(
        long,
        value_name = "TICKS",
        default_value_t = 5_000,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    max_ticks: u64,
}

/// Fire timers until the machine is idle again, collecting step frames.
/// `player` gets a chance to press a key before every timer.
fn run_to_idle(
    machine: &mut GameStateMachine<ManualScheduler>,
    max_ticks: u64,
    mut player: impl FnMut(&mut GameStateMachine<ManualScheduler>),
) -> (Vec<Snapshot>, Vec<Effect>) {
    let mut frames = Vec::new();
    let mut effects = Vec::new();

    while let Some(handle) = machine.scheduler_mut().fire_next() {
        player(machine);
        machine.on_timer(handle);
        for effect in machine.drain_effects() {
            if let Effect::Tick(snapshot) = &effect {
                frames.push(snapshot.clone());
            }
            effects.push(effect);
        }
        if machine.state().tick >= max_ticks && machine.state().is_active() {
            log::warn!("Tick limit {max_ticks} reached, stopping");
            machine.stop();
            effects.extend(machine.drain_effects());
            break;
        }
    }

    (frames, effects)
}

fn main() -> ExitCode {
    env_logger::init();
    log::info!("Snake 3310 (headless) starting...");

    let args = CliArgs::parse();

    let mut settings = match &args.settings {
        Some(path) => match Settings::load(path) {
            Ok(settings) => settings,
            Err(e) => {
                log::error!("{e}");
                return ExitCode::FAILURE;
            }
        },
        None => Settings::default(),
    };
    if args.seed.is_some() {
        settings.seed = args.seed;
    }

    let seed = settings.run_seed();
    let mut machine =
        GameStateMachine::new(ManualScheduler::new(), settings.grid(), settings.difficulty);

    machine.start(seed);
    let (live_frames, effects) = run_to_idle(&mut machine, args.max_ticks, |m| {
        if m.mode() == Mode::Running {
            if let Some(direction) = steer(m.state()) {
                m.input(direction);
            }
        }
    });

    let mut sink = MemorySink::new();
    forward_sealed(&effects, &mut sink, None);
    let Some(Submission { replay, .. }) = sink.submissions.first().cloned() else {
        log::info!("Run scored nothing; no replay to check");
        return ExitCode::SUCCESS;
    };
    log::info!(
        "Live run: {} ticks, score {}, {:.1}s of game time",
        live_frames.len(),
        replay.final_score(),
        machine.scheduler().now().as_secs_f32()
    );

    machine.play_replay(replay.clone());
    let (replay_frames, _) = run_to_idle(&mut machine, args.max_ticks, |_| {});

    if replay_frames != live_frames {
        let diverged = live_frames
            .iter()
            .zip(&replay_frames)
            .position(|(a, b)| a != b)
            .unwrap_or(live_frames.len().min(replay_frames.len()));
        log::error!("Replay diverged at frame {diverged}");
        return ExitCode::FAILURE;
    }
    log::info!("Replay matched {} frames", replay_frames.len());

    match replay.to_json() {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
