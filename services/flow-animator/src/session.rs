//! One animation run: feed, animator and snapshot writer wired together.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use particle_flow::{
    AnimatorEvent, Debouncer, FieldFeed, FieldLoader, FlowAnimator, FlowSimulator, PixmapSurface,
    RenderError, SimulatorConfig, Viewport,
};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use wind_common::WindRequest;

const CHANNEL_CAPACITY: usize = 32;

/// Everything a session needs besides the loader.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Initial request; its bbox is also the initial viewport.
    pub request: WindRequest,
    pub width: u32,
    pub height: u32,
    pub simulator: SimulatorConfig,
    /// Frames to draw before stopping.
    pub frames: u64,
    pub fps: u32,
    /// Write a PNG every this many frames; 0 disables snapshots.
    pub snapshot_every: u64,
    /// Eastward pan per move, degrees.
    pub pan_deg: f64,
    /// Pan every this many frames; 0 disables panning.
    pub pan_every: u64,
    pub output_dir: PathBuf,
    pub debounce: Duration,
}

impl SessionConfig {
    pub fn new(request: WindRequest, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            request,
            width: 800,
            height: 600,
            simulator: SimulatorConfig::default(),
            frames: 300,
            fps: 30,
            snapshot_every: 30,
            pan_deg: 0.0,
            pan_every: 0,
            output_dir: output_dir.into(),
            debounce: Duration::from_millis(250),
        }
    }

    fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.fps.max(1)))
    }
}

#[derive(Debug, Clone, Default)]
pub struct SessionReport {
    pub frames: u64,
    pub loads: usize,
    pub snapshots: Vec<PathBuf>,
}

fn snapshot_path(dir: &Path, frame: u64) -> PathBuf {
    dir.join(format!("frame_{:05}.png", frame))
}

/// Run an animation session to completion.
pub async fn run_session<L>(loader: Arc<L>, config: SessionConfig) -> Result<SessionReport>
where
    L: FieldLoader + 'static,
{
    if config.snapshot_every > 0 {
        std::fs::create_dir_all(&config.output_dir).with_context(|| {
            format!("Failed to create output dir: {}", config.output_dir.display())
        })?;
    }

    let viewport = Viewport::new(config.request.bbox, config.width, config.height);
    let surface = PixmapSurface::new(config.width, config.height)?;
    let simulator = FlowSimulator::new(config.simulator.clone(), viewport);
    let mut animator = FlowAnimator::new(simulator, surface);

    let (request_tx, request_rx) = mpsc::channel::<WindRequest>(CHANNEL_CAPACITY);
    let (event_tx, event_rx) = mpsc::channel::<AnimatorEvent>(CHANNEL_CAPACITY);

    let feed = FieldFeed::new(loader, Debouncer::new(config.debounce));
    let feed_handle = tokio::spawn(feed.run(request_rx, event_tx.clone()));

    request_tx
        .send(config.request.clone())
        .await
        .context("Field feed stopped before the first request")?;

    info!(
        bbox = ?config.request.bbox,
        source = %config.request.source,
        frames = config.frames,
        fps = config.fps,
        "Starting animation session"
    );

    let mut snapshots = Vec::new();
    let mut save_error: Option<RenderError> = None;
    let mut current = viewport;

    let frames = {
        let snapshots = &mut snapshots;
        let save_error = &mut save_error;
        let current = &mut current;
        let request = &config.request;

        animator
            .run(
                event_rx,
                config.frame_interval(),
                Some(config.frames),
                move |frame, stats, surface| {
                    if config.snapshot_every > 0
                        && frame % config.snapshot_every == 0
                        && save_error.is_none()
                    {
                        let path = snapshot_path(&config.output_dir, frame);
                        match surface.save_png(&path) {
                            Ok(()) => {
                                debug!(frame, segments = stats.segments, path = %path.display(), "Saved snapshot");
                                snapshots.push(path);
                            }
                            Err(e) => *save_error = Some(e),
                        }
                    }

                    if config.pan_every > 0 && frame % config.pan_every == 0 && frame < config.frames {
                        *current = current.panned(config.pan_deg, 0.0);
                        let moved = event_tx
                            .try_send(AnimatorEvent::BeginViewportMove)
                            .and_then(|_| event_tx.try_send(AnimatorEvent::EndViewportMove(*current)));
                        let reload = WindRequest {
                            bbox: current.bounds,
                            ..request.clone()
                        };
                        if moved.is_err() || request_tx.try_send(reload).is_err() {
                            warn!(frame, "Event queue full, skipping pan");
                        } else {
                            debug!(frame, bbox = ?current.bounds, "Panned viewport");
                        }
                    }
                },
            )
            .await
    };

    // The closure owned the last senders; the feed drains and exits.
    let loads = feed_handle.await.context("Field feed task failed")?;

    if let Some(e) = save_error {
        return Err(e).context("Failed to write snapshot");
    }

    info!(frames, loads, snapshots = snapshots.len(), "Animation session finished");

    Ok(SessionReport {
        frames,
        loads,
        snapshots,
    })
}
