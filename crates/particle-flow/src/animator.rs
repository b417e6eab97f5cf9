//! Cooperative animation loop.
//!
//! One task owns the simulator and the surface. Frames are driven by a timer;
//! events arrive over a channel and are handled between frames, so particle
//! state is never touched concurrently. While the viewport is moving the loop
//! is stopped and nothing is drawn; when the move ends particles are rebuilt
//! for the new view and the loop restarts.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};
use wind_common::WindField;

use crate::simulator::FlowSimulator;
use crate::surface::RenderSurface;
use crate::viewport::Viewport;

/// Alpha erased from the surface before each frame.
pub const DEFAULT_FADE: f32 = 0.08;

/// Input to a running animator.
#[derive(Debug, Clone)]
pub enum AnimatorEvent {
    /// A new field replaced the old one.
    Field(Arc<WindField>),
    /// The user started panning or zooming.
    BeginViewportMove,
    /// Movement ended at this viewport.
    EndViewportMove(Viewport),
    Shutdown,
}

/// Result of drawing one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameStats {
    pub segments: usize,
    pub particles: usize,
}

pub struct FlowAnimator<S: RenderSurface> {
    simulator: FlowSimulator,
    surface: S,
    fade: f32,
    running: bool,
    frames: u64,
}

impl<S: RenderSurface> FlowAnimator<S> {
    pub fn new(simulator: FlowSimulator, surface: S) -> Self {
        Self {
            simulator,
            surface,
            fade: DEFAULT_FADE,
            running: false,
            frames: 0,
        }
    }

    pub fn with_fade(mut self, fade: f32) -> Self {
        self.fade = fade;
        self
    }

    pub fn simulator(&self) -> &FlowSimulator {
        &self.simulator
    }

    pub fn simulator_mut(&mut self) -> &mut FlowSimulator {
        &mut self.simulator
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Frames drawn so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn start(&mut self) {
        if !self.running {
            debug!("Animation started");
        }
        self.running = true;
    }

    pub fn stop(&mut self) {
        if self.running {
            debug!(frames = self.frames, "Animation stopped");
        }
        self.running = false;
    }

    /// Fade the surface, advance the simulation and draw its segments.
    pub fn frame(&mut self) -> FrameStats {
        self.surface.fade(self.fade);
        let segments = self.simulator.tick();
        for segment in &segments {
            self.surface.draw_segment(segment);
        }
        self.frames += 1;

        FrameStats {
            segments: segments.len(),
            particles: self.simulator.particles().len(),
        }
    }

    /// Load a new field and restart from a clean surface.
    pub fn set_field(&mut self, field: Arc<WindField>) {
        self.simulator.set_field(field);
        self.surface.clear();
        self.start();
    }

    pub fn begin_viewport_move(&mut self) {
        self.stop();
    }

    /// Rebuild for the new view and restart.
    pub fn end_viewport_move(&mut self, viewport: Viewport) {
        self.simulator.set_viewport(viewport);
        self.surface.clear();
        self.start();
    }

    /// Apply one event. Returns `false` on shutdown.
    pub fn handle(&mut self, event: AnimatorEvent) -> bool {
        match event {
            AnimatorEvent::Field(field) => self.set_field(field),
            AnimatorEvent::BeginViewportMove => self.begin_viewport_move(),
            AnimatorEvent::EndViewportMove(viewport) => self.end_viewport_move(viewport),
            AnimatorEvent::Shutdown => return false,
        }
        true
    }

    /// Drive frames every `frame_interval` until shutdown, until `max_frames`
    /// frames have been drawn, or until the event channel closes while the
    /// animation is stopped. `on_frame` sees the surface after each frame.
    pub async fn run<F>(
        &mut self,
        mut events: mpsc::Receiver<AnimatorEvent>,
        frame_interval: Duration,
        max_frames: Option<u64>,
        mut on_frame: F,
    ) -> u64
    where
        F: FnMut(u64, FrameStats, &S),
    {
        let mut ticker = interval(frame_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut events_open = true;
        let start_frames = self.frames;

        loop {
            if max_frames.is_some_and(|max| self.frames - start_frames >= max) {
                break;
            }
            if !events_open && !self.running {
                break;
            }

            tokio::select! {
                event = events.recv(), if events_open => match event {
                    Some(event) => {
                        if !self.handle(event) {
                            break;
                        }
                    }
                    None => events_open = false,
                },
                _ = ticker.tick(), if self.running => {
                    let stats = self.frame();
                    on_frame(self.frames, stats, &self.surface);
                }
            }
        }

        let drawn = self.frames - start_frames;
        info!(frames = drawn, "Animation loop finished");
        drawn
    }
}
