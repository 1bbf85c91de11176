//! Swing capture session - the per-frame pipeline
//!
//! One session per active capture. Each observation runs synchronously
//! through smoothing → angle assembly → buffering → phase detection, and
//! analysis when a swing reaches its finish. Callers must deliver frames
//! one at a time in timestamp order; the session holds no shared state, so
//! independent sessions can run side by side.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::SwingConfig;
use crate::pose::{PoseBuffer, PoseFrame, PoseObservation, PoseSmoother};
use crate::swing::{PhaseTransition, SwingCapture, SwingPhase, SwingPhaseDetector, WristMotionMetrics};

/// Something the embedding application may want to react to
#[derive(Clone, Debug, PartialEq)]
pub enum SwingEvent {
    PhaseChanged {
        from: SwingPhase,
        to: SwingPhase,
        timestamp: f64,
    },
    /// Emitted exactly once per finished swing
    SwingCompleted(Box<SwingCapture>),
    /// In-progress swing abandoned after a phase timeout
    SwingCancelled { phase: SwingPhase, elapsed: f64 },
}

/// Headline numbers for the on-screen overlay, refreshed every frame
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveView {
    pub timestamp: f64,
    pub phase: SwingPhase,
    pub confidence: f32,
    pub hip_rotation: Option<f32>,
    pub shoulder_rotation: Option<f32>,
    pub spine_angle: Option<f32>,
}

impl LiveView {
    fn idle() -> Self {
        Self {
            timestamp: 0.0,
            phase: SwingPhase::Setup,
            confidence: 0.0,
            hip_rotation: None,
            shoulder_rotation: None,
            spine_angle: None,
        }
    }
}

/// Totals reported when a session ends
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub frames_processed: u64,
    pub swings_completed: u32,
    pub swings_cancelled: u32,
    pub average_score: Option<f32>,
}

/// Owns every piece of per-session state: filters, pose buffer, phase machine
pub struct SwingSession {
    config: SwingConfig,
    smoother: PoseSmoother,
    buffer: PoseBuffer,
    detector: SwingPhaseDetector,
    wrist_metrics: Option<WristMotionMetrics>,
    live: LiveView,
    last_timestamp: Option<f64>,

    frames_processed: u64,
    swings_completed: u32,
    swings_cancelled: u32,
    score_sum: f32,
    scored_swings: u32,
}

impl SwingSession {
    pub fn new(config: SwingConfig) -> Self {
        Self {
            smoother: PoseSmoother::new(config.filter.clone()),
            buffer: PoseBuffer::new(config.buffer_capacity),
            detector: SwingPhaseDetector::new(&config),
            config,
            wrist_metrics: None,
            live: LiveView::idle(),
            last_timestamp: None,
            frames_processed: 0,
            swings_completed: 0,
            swings_cancelled: 0,
            score_sum: 0.0,
            scored_swings: 0,
        }
    }

    pub fn config(&self) -> &SwingConfig {
        &self.config
    }

    pub fn phase(&self) -> SwingPhase {
        self.detector.phase()
    }

    pub fn live_view(&self) -> &LiveView {
        &self.live
    }

    pub fn buffer(&self) -> &PoseBuffer {
        &self.buffer
    }

    /// Latest wrist-sensor record; held until a swing consumes it
    pub fn set_wrist_metrics(&mut self, metrics: WristMotionMetrics) {
        debug!(impact = ?metrics.impact_timestamp, "wrist metrics received");
        self.wrist_metrics = Some(metrics);
    }

    /// Process one observation from the pose detector
    pub fn process_frame(&mut self, observation: &PoseObservation) -> Option<SwingEvent> {
        if let Some(last) = self.last_timestamp {
            if observation.timestamp < last {
                warn!(
                    timestamp = observation.timestamp,
                    previous = last,
                    "frame timestamp went backwards"
                );
            }
        }
        self.last_timestamp = Some(observation.timestamp);
        self.frames_processed += 1;

        // 1. Smooth and derive angles
        let smoothed = self.smoother.smooth(observation);
        let frame = PoseFrame::assemble(smoothed);

        // 2. Buffer before detection so a finishing swing includes this frame
        self.buffer.push(frame.clone());

        // 3. Phase machine
        let sensor_impact = self.wrist_metrics.as_ref().and_then(|m| m.impact_timestamp);
        let transition = self.detector.update(&frame, sensor_impact);
        self.drop_stale_wrist_metrics();

        self.live = LiveView {
            timestamp: frame.timestamp,
            phase: self.detector.phase(),
            confidence: frame.confidence,
            hip_rotation: frame.hip_rotation,
            shoulder_rotation: frame.shoulder_rotation,
            spine_angle: frame.spine_angle,
        };

        match transition? {
            PhaseTransition::Advanced { to: SwingPhase::Finish, .. } => {
                Some(SwingEvent::SwingCompleted(Box::new(self.finalize_swing(&frame))))
            }
            PhaseTransition::Advanced { from, to, marker } => Some(SwingEvent::PhaseChanged {
                from,
                to,
                timestamp: marker.timestamp,
            }),
            PhaseTransition::Cancelled { phase, elapsed } => {
                self.swings_cancelled += 1;
                self.wrist_metrics = None;
                Some(SwingEvent::SwingCancelled { phase, elapsed })
            }
        }
    }

    /// A record whose impact predates the swing in progress belongs to an earlier swing
    fn drop_stale_wrist_metrics(&mut self) {
        let start = self.detector.swing_start();
        let impact = self.wrist_metrics.as_ref().and_then(|m| m.impact_timestamp);
        if let (Some(start), Some(impact)) = (start, impact) {
            if impact < start {
                debug!(impact, swing_start = start, "dropping wrist metrics from an earlier swing");
                self.wrist_metrics = None;
            }
        }
    }

    fn finalize_swing(&mut self, frame: &PoseFrame) -> SwingCapture {
        let start = self.detector.swing_start().unwrap_or(frame.timestamp);
        let wrist = self.wrist_metrics.take();
        let capture = SwingCapture::analyze(
            start,
            frame.timestamp,
            self.buffer.since(start),
            self.detector.phase_history().to_vec(),
            wrist.as_ref(),
            self.config.target_tempo,
        );

        self.swings_completed += 1;
        if let Some(score) = capture.overall_score() {
            self.score_sum += score;
            self.scored_swings += 1;
        }

        info!(
            duration = capture.duration(),
            frames = capture.pose_frames.len(),
            score = ?capture.overall_score(),
            fault = ?capture.primary_fault().map(|f| f.name()),
            "swing captured"
        );
        capture
    }

    /// The tracked person left the frame: forget all filter state
    pub fn tracking_lost(&mut self) {
        debug!("tracking lost");
        self.smoother.reset();
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            frames_processed: self.frames_processed,
            swings_completed: self.swings_completed,
            swings_cancelled: self.swings_cancelled,
            average_score: if self.scored_swings > 0 {
                Some(self.score_sum / self.scored_swings as f32)
            } else {
                None
            },
        }
    }

    /// Stop the session, discarding any swing in progress
    ///
    /// The session is reset and can be reused afterwards.
    pub fn end(&mut self) -> SessionSummary {
        let summary = self.summary();
        if self.detector.phase().is_in_motion() {
            debug!(phase = self.detector.phase().name(), "discarding swing in progress");
        }

        self.detector.reset();
        self.smoother.reset();
        self.buffer.clear();
        self.wrist_metrics = None;
        self.live = LiveView::idle();
        self.last_timestamp = None;
        self.frames_processed = 0;
        self.swings_completed = 0;
        self.swings_cancelled = 0;
        self.score_sum = 0.0;
        self.scored_swings = 0;

        info!(
            frames = summary.frames_processed,
            swings = summary.swings_completed,
            cancelled = summary.swings_cancelled,
            "session ended"
        );
        summary
    }
}

impl Default for SwingSession {
    fn default() -> Self {
        Self::new(SwingConfig::default())
    }
}
