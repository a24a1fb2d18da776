//! The gesture loop: one frame in, pointer actions out, until an exit
//! condition is met.

use anyhow::Result;
use colored::*;
use image::imageops;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::camera::FrameSource;
use crate::dispatch::Dispatcher;
use crate::gesture::{Classification, GestureClassifier};
use crate::output::{FrameSink, SinkEvent};
use crate::overlay::OverlayRenderer;
use crate::pipeline::Pipeline;
use crate::pointer::PointerDriver;
use crate::stats::GestureStats;
use crate::types::ScreenSize;

pub trait Clock {
    fn now(&self) -> Instant;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitReason {
    FrameReadFailed,
    MouthOpen,
    KeyPressed(String),
    WindowClosed,
    TimeLimit,
}

#[derive(Debug, Clone)]
pub struct LoopSettings {
    pub mirror: bool,
    pub screen: ScreenSize,
    pub time_limit: Duration,
    pub stats_interval: Duration,
}

/// Everything that lives for the whole session.
pub struct SessionState {
    pub started_at: Instant,
    pub last_stats_print: Instant,
    pub frames: u64,
    /// Periodic reports printed so far, not counting the final one.
    pub reports: u32,
    pub stats: GestureStats,
}

impl SessionState {
    pub fn new(now: Instant) -> Self {
        Self {
            started_at: now,
            last_stats_print: now,
            frames: 0,
            reports: 0,
            stats: GestureStats::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SessionSummary {
    pub reason: ExitReason,
    pub frames: u64,
    pub stats: GestureStats,
}

pub struct GestureLoop<F: FrameSource, S: FrameSink, P: PointerDriver, C: Clock> {
    source: F,
    pipeline: Box<dyn Pipeline>,
    sink: S,
    dispatcher: Dispatcher<P>,
    clock: C,
    overlay: OverlayRenderer,
    settings: LoopSettings,
    classifier: GestureClassifier,
    state: SessionState,
}

impl<F: FrameSource, S: FrameSink, P: PointerDriver, C: Clock> GestureLoop<F, S, P, C> {
    pub fn new(
        source: F,
        pipeline: Box<dyn Pipeline>,
        sink: S,
        pointer: P,
        clock: C,
        overlay: OverlayRenderer,
        settings: LoopSettings,
    ) -> Self {
        let now = clock.now();
        Self {
            source,
            pipeline,
            sink,
            dispatcher: Dispatcher::new(pointer),
            clock,
            overlay,
            settings,
            classifier: GestureClassifier::new(now),
            state: SessionState::new(now),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn stats(&self) -> &GestureStats {
        &self.state.stats
    }

    pub fn pointer(&self) -> &P {
        self.dispatcher.pointer()
    }

    /// Runs until an exit condition, then releases the camera and prints the
    /// final report. Detector errors end the session the same way before
    /// being returned.
    pub fn run(&mut self) -> Result<SessionSummary> {
        print_banner();
        info!(pipeline = %self.pipeline.name(), screen_w = self.settings.screen.width, screen_h = self.settings.screen.height, "session started");

        let outcome = self.run_frames();

        self.source.release();
        println!("\n{}", "Final Accuracy Report:".bold());
        self.state.stats.print_stats();

        let reason = outcome?;
        info!(?reason, frames = self.state.frames, "session ended");
        Ok(SessionSummary {
            reason,
            frames: self.state.frames,
            stats: self.state.stats.clone(),
        })
    }

    fn run_frames(&mut self) -> Result<ExitReason> {
        loop {
            if let Some(reason) = self.step()? {
                return Ok(reason);
            }
        }
    }

    /// One iteration. `Some` means the session is over.
    pub fn step(&mut self) -> Result<Option<ExitReason>> {
        let mut frame = match self.source.capture() {
            Ok(frame) => frame,
            Err(e) => {
                warn!(error = %e, "frame read failed, stopping");
                return Ok(Some(ExitReason::FrameReadFailed));
            }
        };
        if self.settings.mirror {
            imageops::flip_horizontal_in_place(&mut frame);
        }
        self.state.frames += 1;

        let landmarks = self.pipeline.process(&frame)?;

        if let Some(lm) = &landmarks {
            match self.classifier.classify(lm, self.clock.now(), self.settings.screen) {
                Classification::Exit => {
                    println!("{}", "Mouth open detected - exiting program".yellow());
                    return Ok(Some(ExitReason::MouthOpen));
                }
                Classification::Gestures(gestures) => {
                    for gesture in gestures {
                        debug!(?gesture, "dispatch");
                        self.dispatcher.dispatch(gesture, &mut self.state.stats, &self.clock);
                    }
                }
            }
        }

        self.overlay.draw(&mut frame, landmarks.as_ref());
        self.sink.present(&frame)?;

        let now = self.clock.now();
        if now.saturating_duration_since(self.state.last_stats_print) > self.settings.stats_interval {
            self.state.stats.print_stats();
            self.state.last_stats_print = now;
            self.state.reports += 1;
        }

        match self.sink.poll_event() {
            Some(SinkEvent::KeyPressed(key)) => {
                println!("Key detected: {}", key);
                return Ok(Some(ExitReason::KeyPressed(key)));
            }
            Some(SinkEvent::Closed) => {
                println!("Window closed - exiting");
                return Ok(Some(ExitReason::WindowClosed));
            }
            None => {}
        }

        if now.saturating_duration_since(self.state.started_at) > self.settings.time_limit {
            println!("{}", "Session time limit reached - exiting".yellow());
            return Ok(Some(ExitReason::TimeLimit));
        }

        Ok(None)
    }
}

fn print_banner() {
    println!("{}", "Eye Controlled Mouse is active".green().bold());
    println!("Open your mouth wide to exit the program");
    println!("Session started at {}", chrono::Local::now().format("%H:%M:%S"));
    println!("{}", "-".repeat(50));
}
