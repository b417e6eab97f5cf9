//! Flow animator
//!
//! Renders the particle flow animation for a bounding box to PNG frames.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use particle_flow::SimulatorConfig;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};
use wind_common::{parse_request_time, BoundingBox, SourceSelection, WindRequest};

use flow_animator::{run_session, AnimatorConfig, CacheEngineLoader, SessionConfig};

#[derive(Parser, Debug)]
#[command(name = "flow-animator")]
#[command(about = "Render animated wind particle flow to PNG frames")]
struct Args {
    /// Bounding box as minLon,minLat,maxLon,maxLat
    #[arg(long, default_value = "79.5,5.9,82.0,10.0")]
    bbox: String,

    /// Valid time (ISO 8601); now when omitted
    #[arg(long)]
    time: Option<String>,

    /// auto, icon, gfs, era5 or nomads
    #[arg(long, default_value = "auto")]
    source: String,

    /// Lattice resolution in kilometres
    #[arg(long, default_value = "25")]
    resolution_km: f64,

    /// Output width in pixels
    #[arg(long, default_value = "800")]
    width: u32,

    /// Output height in pixels
    #[arg(long, default_value = "600")]
    height: u32,

    /// Number of particles
    #[arg(long, default_value = "2000")]
    particles: usize,

    /// Frames to render
    #[arg(long, default_value = "300")]
    frames: u64,

    /// Frame rate
    #[arg(long, default_value = "30")]
    fps: u32,

    /// Save a PNG every N frames (0 disables)
    #[arg(long, default_value = "30")]
    every: u64,

    /// Degrees to pan east on each pan
    #[arg(long, default_value = "0.0")]
    pan_deg: f64,

    /// Pan every N frames (0 disables)
    #[arg(long, default_value = "0")]
    pan_every: u64,

    /// Directory for PNG frames
    #[arg(long, default_value = "frames")]
    output_dir: PathBuf,

    /// Path to the YAML configuration file
    #[arg(long, default_value = "config/flow-animator.yaml", env = "FLOW_ANIMATOR_CONFIG")]
    config: PathBuf,

    /// Seed for particle placement
    #[arg(long)]
    seed: Option<u64>,

    /// Debounce for field reloads, in milliseconds
    #[arg(long, default_value = "250")]
    debounce_ms: u64,

    /// Log level
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,
}

impl Args {
    fn request(&self) -> Result<WindRequest> {
        let bbox = BoundingBox::from_query_string(&self.bbox)
            .with_context(|| format!("Invalid --bbox: {}", self.bbox))?;
        let source: SourceSelection = self.source.parse().context("Invalid --source")?;

        let mut request = WindRequest::new(bbox, self.resolution_km).with_source(source);
        if let Some(time) = &self.time {
            request = request.with_time(parse_request_time(time).context("Invalid --time")?);
        }
        Ok(request)
    }

    fn session(&self) -> Result<SessionConfig> {
        let mut session = SessionConfig::new(self.request()?, self.output_dir.clone());
        session.width = self.width;
        session.height = self.height;
        session.simulator = SimulatorConfig {
            particle_count: self.particles,
            seed: self.seed,
            ..SimulatorConfig::default()
        };
        session.frames = self.frames;
        session.fps = self.fps;
        session.snapshot_every = self.every;
        session.pan_deg = self.pan_deg;
        session.pan_every = self.pan_every;
        session.debounce = Duration::from_millis(self.debounce_ms);
        Ok(session)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    fmt().with_env_filter(filter).compact().init();

    let session = args.session()?;
    let config = AnimatorConfig::load(&args.config)?;
    let loader = Arc::new(CacheEngineLoader::from_config(&config)?);

    let report = run_session(loader, session).await?;

    info!(
        frames = report.frames,
        loads = report.loads,
        snapshots = report.snapshots.len(),
        output_dir = %args.output_dir.display(),
        "Done"
    );
    Ok(())
}
