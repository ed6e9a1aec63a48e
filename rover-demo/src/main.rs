//! Sample host for the Rover core.
//!
//! ```bash
//! # Lay out the home screen of an experience document, then scroll it
//! rover-demo layout experience.json --width 360 --height 640 --scroll 200 --scroll 500
//!
//! # Print the outbound payload for a location update (no network)
//! rover-demo event --latitude 43.65 --longitude -79.38
//!
//! # Fetch the inbox (reads ROVER_* from the environment)
//! rover-demo inbox
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use rover_api::{Customer, Device, Event, EventKind, Screen};
use rover_client::{DecodeJob, Inbox, RoverConfig, RoverContext};
use rover_jsonapi::{Resource, ResourceRegistry, decode_slice, event_document};
use rover_layout::{LayoutEngine, ScrollState, Size};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "rover-demo")]
#[command(about = "Decode, lay out and submit Rover documents")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Lay out a screen from an experience or screen document
    Layout {
        /// JSON:API document containing an experience or a screen
        file: PathBuf,

        #[arg(long, default_value_t = 360.0)]
        width: f32,

        #[arg(long, default_value_t = 640.0)]
        height: f32,

        /// Pixels per point
        #[arg(long, default_value_t = 1.0)]
        density: f32,

        /// Screen id (defaults to the experience's home screen)
        #[arg(long)]
        screen: Option<String>,

        /// Scroll deltas applied in order
        #[arg(long = "scroll", allow_hyphen_values = true)]
        scroll: Vec<f32>,
    },

    /// Print the events document for a location update
    Event {
        #[arg(long)]
        latitude: f64,

        #[arg(long)]
        longitude: f64,

        #[arg(long)]
        accuracy: Option<f64>,
    },

    /// Fetch and print the inbox
    Inbox,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    match Cli::parse().command {
        Commands::Layout {
            file,
            width,
            height,
            density,
            screen,
            scroll,
        } => run_layout(file, Size::new(width, height), density, screen, &scroll),
        Commands::Event {
            latitude,
            longitude,
            accuracy,
        } => run_event(latitude, longitude, accuracy),
        Commands::Inbox => run_inbox().await,
    }
}

fn load_screen(file: &Path, screen_id: Option<&str>) -> Result<Screen> {
    let bytes = std::fs::read(file).with_context(|| format!("reading {}", file.display()))?;
    let registry = ResourceRegistry::with_builtins();
    let document = decode_slice::<Resource, _>(&bytes, &registry)
        .with_context(|| format!("decoding {}", file.display()))?;

    match document.data.into_single() {
        Some(Resource::Experience(experience)) => {
            let screen = match screen_id {
                Some(id) => experience.screen(id),
                None => experience.home_screen(),
            };
            screen
                .cloned()
                .with_context(|| format!("experience {} has no such screen", experience.id))
        }
        Some(Resource::Screen(screen)) => Ok(screen),
        Some(other) => bail!("expected an experience or screen, found {}", other.kind()),
        None => bail!("document has no primary resource"),
    }
}

fn run_layout(
    file: PathBuf,
    viewport: Size,
    density: f32,
    screen_id: Option<String>,
    deltas: &[f32],
) -> Result<()> {
    let screen = load_screen(&file, screen_id.as_deref())?;
    let layout = LayoutEngine::new(density)
        .with_provider(&screen)
        .layout(viewport)?;

    println!(
        "screen {:?}: {} rows, {} blocks, content height {:.1}",
        screen.id,
        layout.rows.len(),
        layout.frames.len(),
        layout.bottom_limit
    );
    for (index, frame) in layout.frames.iter().enumerate() {
        let r = frame.rect;
        println!(
            "  [{index:>3}] row {:>2} block {:>2} {:?} {:?} x={:.1} y={:.1} w={:.1} h={:.1}",
            frame.row, frame.block, frame.kind, frame.position, r.x, r.y, r.width, r.height
        );
    }

    let mut state = ScrollState::for_layout(&layout);
    for &dy in deltas {
        let traveled = state.scroll_by(dy);
        let (top, bottom) = state.window();
        let visible: Vec<usize> = layout.visible(top, bottom).collect();
        println!(
            "scroll {dy:+.1} -> traveled {traveled:+.1}, window [{top:.1}, {bottom:.1}], visible {visible:?}"
        );
    }
    Ok(())
}

fn run_event(latitude: f64, longitude: f64, accuracy: Option<f64>) -> Result<()> {
    let config = RoverConfig::from_env();
    let event = Event::now(EventKind::LocationUpdate {
        latitude,
        longitude,
        accuracy,
    });
    let body = event_document(&event, &Customer::default(), &Device::new(config.device_id))?;
    let value: serde_json::Value = serde_json::from_slice(&body)?;
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

async fn run_inbox() -> Result<()> {
    let config = RoverConfig::from_env();
    if config.api_key.is_empty() {
        bail!("set ROVER_API_KEY to fetch the inbox");
    }
    let job = DecodeJob::new(std::sync::Arc::new(RoverContext::connect(config)?));

    let mut inbox = Inbox::new();
    inbox.begin_refresh();
    inbox.apply(job.spawn_inbox().await?);
    if let Some(err) = inbox.last_error() {
        bail!("inbox refresh failed: {err}");
    }

    println!("{} messages, {} unread", inbox.messages().len(), inbox.unread_count());
    for message in inbox.messages() {
        println!(
            "  {} {} {}{}",
            message.timestamp.format("%Y-%m-%d %H:%M"),
            if message.read { " " } else { "*" },
            message.title.as_deref().map(|t| format!("{t}: ")).unwrap_or_default(),
            message.text
        );
    }
    Ok(())
}
