//! Application entry point: kiosk greeter viewport.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Parse the command line; `seed-avatars` writes placeholder avatars and
//!    exits.
//! 3. Load [`AppConfig`] from disk (returns default on first run) and apply
//!    the `--role` override.
//! 4. Create the [`tokio`] runtime (current thread: one cooperative event
//!    loop per viewport).
//! 5. Bind the UDP bus and build the backend clients.
//! 6. Acquire the capture source (roles that own capture) and the mascot
//!    compositor (roles that render results).
//! 7. Spawn the stdin operator console.
//! 8. Run the [`ViewportCoordinator`] until the console closes or Ctrl-C.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use kiosk_greeter::{
    assets::{generate_placeholders, AvatarCatalog},
    bus::{MessageBus, UdpBus},
    capture::CaptureService,
    compositor::{ChromaKey, ColorKeyCompositor, KeyColor, MemorySurface, Threshold},
    config::{AppConfig, ViewRole},
    coordinator::{
        viewport::ALERT_CAPTURE, Collaborators, Command, CoordinatorSettings, LogView,
        ParseCommandError, ViewSink, ViewportCoordinator,
    },
    gesture::BestEffortDetector,
    media::FrameSequence,
    narration::{CommandSpeechEngine, NarrationService},
    remote::{GestureDetector, HttpAnalysisClient, HttpGestureClient},
};

// ---------------------------------------------------------------------------
// Command line
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(name = "kiosk-greeter", version, about = "Guest greeting kiosk viewport")]
struct Cli {
    /// Viewport role; overrides the configured one.
    #[arg(long, value_enum)]
    role: Option<ViewRole>,

    /// Settings file to use instead of the platform config dir.
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<CliCommand>,
}

#[derive(Subcommand, Debug)]
enum CliCommand {
    /// Write placeholder avatars for every gender and attire.
    SeedAvatars {
        /// Target directory.
        #[arg(default_value = "static/avatars")]
        dir: PathBuf,
    },
}

// ---------------------------------------------------------------------------
// Operator console
// ---------------------------------------------------------------------------

/// Read `submit <name>` / `reset` / `read` lines from stdin until `quit`
/// or end of input.  Dropping `commands` stops the coordinator.
async fn read_console(commands: mpsc::Sender<Command>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                log::warn!("console: failed to read stdin: {e}");
                break;
            }
        };
        if line.trim().eq_ignore_ascii_case("quit") {
            break;
        }

        match line.parse::<Command>() {
            Ok(command) => {
                if commands.send(command).await.is_err() {
                    break;
                }
            }
            Err(ParseCommandError::Empty) => {}
            Err(e) => log::warn!("console: {e}"),
        }
    }

    log::info!("console: closed");
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    if let Some(CliCommand::SeedAvatars { dir }) = &cli.command {
        let written = generate_placeholders(dir)?;
        log::info!("seeded {} avatar(s) in {}", written.len(), dir.display());
        return Ok(());
    }

    let loaded = match &cli.config {
        Some(path) => AppConfig::load_from(path),
        None => AppConfig::load(),
    };
    let mut config = loaded.unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e}); using defaults");
        AppConfig::default()
    });
    if let Some(role) = cli.role {
        config.role = role;
    }
    log::info!("Kiosk greeter starting up ({} viewport)", config.role.label());

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to create tokio runtime")?;

    rt.block_on(run(config))
}

async fn run(config: AppConfig) -> anyhow::Result<()> {
    let role = config.role;

    let bus = UdpBus::bind(&config.bus)
        .await
        .with_context(|| format!("failed to bind bus on {}", config.bus.listen))?;
    let bus: Arc<dyn MessageBus> = Arc::new(bus);

    let view: Arc<dyn ViewSink> = Arc::new(LogView::new(role.label()));

    let capture = if role.owns_capture() {
        match CaptureService::acquire(&config.capture) {
            Ok(capture) => Some(capture),
            Err(e) => {
                log::warn!("capture unavailable: {e}");
                view.alert(ALERT_CAPTURE);
                None
            }
        }
    } else {
        None
    };

    let detector: Option<Arc<dyn GestureDetector>> = role.owns_capture().then(|| {
        Arc::new(BestEffortDetector::new(HttpGestureClient::from_config(
            &config.backend,
        ))) as Arc<dyn GestureDetector>
    });

    let compositor = if role.renders_results() {
        let mascot = &config.compositor;
        match FrameSequence::open(&mascot.mascot_source, mascot.looping) {
            Ok(source) => Some(ColorKeyCompositor::new(
                Arc::new(source),
                Arc::new(MemorySurface::new()),
                ChromaKey::new(
                    KeyColor::from(mascot.key_color),
                    Threshold::new(mascot.threshold),
                ),
                mascot.frame_period(),
            )),
            Err(e) => {
                log::warn!("mascot video unavailable, running without it: {e}");
                None
            }
        }
    } else {
        None
    };

    let parts = Collaborators {
        bus,
        analysis: Arc::new(HttpAnalysisClient::from_config(&config.backend)),
        capture,
        detector,
        compositor,
        narration: NarrationService::new(Arc::new(CommandSpeechEngine::from_config(
            &config.narration,
        ))),
        view,
        avatars: AvatarCatalog::from_config(&config.assets),
    };
    let coordinator =
        ViewportCoordinator::new(role, CoordinatorSettings::from_config(&config), parts);

    let (command_tx, command_rx) = mpsc::channel::<Command>(16);
    tokio::spawn(read_console(command_tx));

    tokio::select! {
        _ = coordinator.run(command_rx) => {}
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                log::warn!("failed to wait for Ctrl-C: {e}");
            }
            log::info!("Ctrl-C received, shutting down");
        }
    }

    Ok(())
}
