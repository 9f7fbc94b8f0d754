mod app;
mod frame;
mod headless;
mod input;
mod render;

use anyhow::{Context, Result};
use app::ArmApp;
use clap::Parser;
use glam::Vec2;
use ik_kernel::{IkSolver, KinematicChain};
use settings::{SettingsStore, UserSettings};
use std::path::PathBuf;
use tracing::info;
use winit::event_loop::EventLoop;

#[derive(Parser)]
#[command(name = "ik_arm", about = "Jacobian Transpose IK arm that follows the mouse")]
struct Cli {
    /// Solve once without opening a window and print a JSON report.
    #[arg(long)]
    headless: bool,

    /// Goal position in chain coordinates, overriding the configured one.
    #[arg(long, num_args = 2, value_names = ["X", "Y"], allow_negative_numbers = true)]
    goal: Option<Vec<f32>>,

    /// Tick cap for headless solving.
    #[arg(long, default_value_t = 2000)]
    max_steps: usize,

    /// Distance at which a headless solve counts as converged.
    #[arg(long, default_value_t = 0.5)]
    tolerance: f32,

    /// Settings file to use instead of the platform config directory.
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Write the effective settings back to the settings file.
    #[arg(long)]
    save_settings: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    let settings_store = match &cli.settings {
        Some(path) => SettingsStore::at(path),
        None => SettingsStore::new().context("settings store init failed")?,
    };
    let user_settings = load_settings(&settings_store, cli.save_settings)?;

    let mut solver = build_solver(&user_settings)?;
    if let Some(&[x, y]) = cli.goal.as_deref() {
        solver.set_goal(Vec2::new(x, y), solver.goal().orientation);
    }
    info!(
        "Chain of {} links (reach {:.1}), ticking at {} Hz",
        solver.chain().link_count(),
        solver.chain().reach(),
        user_settings.simulation.tick_rate
    );

    if cli.headless {
        let report = headless::run(&mut solver, cli.tolerance, cli.max_steps);
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("failed to encode report")?
        );
        return Ok(());
    }

    let event_loop = EventLoop::new().context("failed to create event loop")?;
    let mut app = ArmApp::new(solver, &user_settings)?;
    event_loop.run_app(&mut app).context("event loop error")?;
    Ok(())
}

/// Read the settings file, writing it back only after a successful load.
/// A missing file means defaults; an unreadable or malformed one is an error.
fn load_settings(store: &SettingsStore, save: bool) -> Result<UserSettings> {
    let settings = store
        .load()
        .with_context(|| format!("failed to load settings from {}", store.path().display()))?;
    if save {
        store
            .save(&settings)
            .with_context(|| format!("failed to save {}", store.path().display()))?;
        info!("Wrote settings to {}", store.path().display());
    }
    Ok(settings)
}

/// Validate the configured chain and solver before anything starts ticking.
fn build_solver(settings: &UserSettings) -> Result<IkSolver> {
    let chain = KinematicChain::with_origin(
        settings.chain.link_lengths.clone(),
        settings.chain.origin_vec(),
    )
    .context("invalid chain configuration")?;
    IkSolver::new(
        chain,
        settings.simulation.initial_goal.to_goal(),
        settings.simulation.solver_config(),
    )
    .context("invalid solver configuration")
}
