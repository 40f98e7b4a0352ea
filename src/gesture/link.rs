//! Hand tracker boundary
//!
//! A tracker produces `HandFrame`s on its own thread and pushes them into a
//! bounded channel. The link is opened when a boss encounter starts and
//! closed as soon as it ends, which stops the tracker and releases capture.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender, TrySendError, bounded};
use thiserror::Error;

use super::HandFrame;

/// Frames buffered between the tracker and the frame tick
pub const LINK_CAPACITY: usize = 256;

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("hand tracking unavailable: {0}")]
    Unavailable(String),
    #[error("tracker I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid hand trace: {0}")]
    Trace(#[from] serde_json::Error),
}

/// Source of hand samples
pub trait HandTracker {
    /// Begin delivering frames into `frames`
    fn start(&mut self, frames: Sender<HandFrame>) -> Result<(), CaptureError>;
    /// Stop delivering and release any capture resources
    fn stop(&mut self);
}

/// Tracker for sessions without a camera; the boss phase runs on keyboard hits
#[derive(Debug, Default)]
pub struct NoTracker;

impl HandTracker for NoTracker {
    fn start(&mut self, _frames: Sender<HandFrame>) -> Result<(), CaptureError> {
        Err(CaptureError::Unavailable("no tracker configured".into()))
    }

    fn stop(&mut self) {}
}

/// Background producer thread with a cooperative stop flag
#[derive(Debug, Default)]
struct Worker {
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl Worker {
    /// Run `step(index)` every `interval` until it returns `None`, the
    /// receiver goes away, or the worker is stopped.
    fn spawn<F>(
        &mut self,
        name: &str,
        interval: Duration,
        frames: Sender<HandFrame>,
        mut step: F,
    ) -> Result<(), CaptureError>
    where
        F: FnMut(u64) -> Option<HandFrame> + Send + 'static,
    {
        self.stop();
        let running = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&running);
        let handle = thread::Builder::new().name(name.to_string()).spawn(move || {
            let mut index = 0;
            while flag.load(Ordering::Relaxed) {
                let Some(frame) = step(index) else { break };
                match frames.try_send(frame) {
                    Ok(()) => {}
                    Err(TrySendError::Full(_)) => log::trace!("Hand frame dropped, queue full"),
                    Err(TrySendError::Disconnected(_)) => break,
                }
                index += 1;
                thread::sleep(interval);
            }
            log::debug!("Hand tracker thread finished after {index} frames");
        })?;
        self.running = running;
        self.handle = Some(handle);
        Ok(())
    }

    fn stop(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::warn!("Hand tracker thread panicked");
            }
        }
    }
}

/// Replays a recorded trace at a fixed cadence
#[derive(Debug)]
pub struct ReplayTracker {
    frames: Arc<Vec<HandFrame>>,
    interval: Duration,
    looping: bool,
    worker: Worker,
}

impl ReplayTracker {
    pub fn new(frames: Vec<HandFrame>, interval: Duration, looping: bool) -> Self {
        Self {
            frames: Arc::new(frames),
            interval,
            looping,
            worker: Worker::default(),
        }
    }

    /// Load a JSON array of frames
    pub fn load(path: &Path, interval: Duration) -> Result<Self, CaptureError> {
        let data = std::fs::read_to_string(path)?;
        let frames: Vec<HandFrame> = serde_json::from_str(&data)?;
        log::info!("Loaded {} hand frames from {:?}", frames.len(), path);
        Ok(Self::new(frames, interval, true))
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl HandTracker for ReplayTracker {
    fn start(&mut self, frames: Sender<HandFrame>) -> Result<(), CaptureError> {
        if self.frames.is_empty() {
            return Err(CaptureError::Unavailable("empty hand trace".into()));
        }
        let trace = Arc::clone(&self.frames);
        let looping = self.looping;
        self.worker.spawn("hand-replay", self.interval, frames, move |index| {
            let i = index as usize;
            if looping {
                trace.get(i % trace.len()).cloned()
            } else {
                trace.get(i).cloned()
            }
        })
    }

    fn stop(&mut self) {
        self.worker.stop();
    }
}

/// Produces an oscillating two-hand motion, for demos without a camera
#[derive(Debug)]
pub struct SyntheticTracker {
    interval: Duration,
    /// Samples per full up-down cycle
    period: u32,
    amplitude: f32,
    worker: Worker,
}

impl Default for SyntheticTracker {
    fn default() -> Self {
        Self::new(Duration::from_millis(33), 12, 0.2)
    }
}

impl SyntheticTracker {
    pub fn new(interval: Duration, period: u32, amplitude: f32) -> Self {
        Self {
            interval,
            period: period.max(2),
            amplitude,
            worker: Worker::default(),
        }
    }

    /// The sample this tracker sends at `index`
    pub fn frame_at(index: u64, period: u32, amplitude: f32) -> HandFrame {
        let phase = (index % u64::from(period)) as f32 / period as f32;
        let y = 0.5 + amplitude * (phase * std::f32::consts::TAU).sin();
        HandFrame::two_hands(y, y)
    }
}

impl HandTracker for SyntheticTracker {
    fn start(&mut self, frames: Sender<HandFrame>) -> Result<(), CaptureError> {
        let (period, amplitude) = (self.period, self.amplitude);
        self.worker.spawn("hand-synthetic", self.interval, frames, move |index| {
            Some(Self::frame_at(index, period, amplitude))
        })
    }

    fn stop(&mut self) {
        self.worker.stop();
    }
}

/// Owns a tracker and the receiving end of its queue
pub struct TrackingLink {
    tracker: Box<dyn HandTracker>,
    receiver: Option<Receiver<HandFrame>>,
}

impl TrackingLink {
    pub fn new(tracker: Box<dyn HandTracker>) -> Self {
        Self {
            tracker,
            receiver: None,
        }
    }

    /// Start the tracker. Failure is logged and leaves the link closed;
    /// the caller keeps running without gesture input.
    pub fn open(&mut self) -> bool {
        if self.receiver.is_some() {
            return true;
        }
        let (sender, receiver) = bounded(LINK_CAPACITY);
        match self.tracker.start(sender) {
            Ok(()) => {
                log::info!("Hand tracking started");
                self.receiver = Some(receiver);
                true
            }
            Err(e) => {
                log::warn!("Hand tracking not available ({e}), keyboard hits only");
                false
            }
        }
    }

    /// Stop the tracker and drop the queue
    pub fn close(&mut self) {
        if self.receiver.take().is_some() {
            self.tracker.stop();
            log::info!("Hand tracking stopped");
        }
    }

    pub fn is_open(&self) -> bool {
        self.receiver.is_some()
    }

    /// Drain pending frames without blocking
    pub fn poll(&mut self) -> Vec<HandFrame> {
        self.receiver
            .as_ref()
            .map(|rx| rx.try_iter().collect())
            .unwrap_or_default()
    }
}

impl Drop for TrackingLink {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for TrackingLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackingLink")
            .field("open", &self.is_open())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    fn poll_until(link: &mut TrackingLink, count: usize) -> Vec<HandFrame> {
        let deadline = Instant::now() + Duration::from_secs(5);
        let mut frames = Vec::new();
        while frames.len() < count && Instant::now() < deadline {
            frames.extend(link.poll());
            thread::sleep(Duration::from_millis(1));
        }
        frames
    }

    #[test]
    fn test_no_tracker_stays_closed() {
        let mut link = TrackingLink::new(Box::new(NoTracker));
        assert!(!link.open());
        assert!(!link.is_open());
        assert!(link.poll().is_empty());
        link.close();
    }

    #[test]
    fn test_replay_delivers_trace_in_order() {
        let trace = vec![
            HandFrame::two_hands(0.1, 0.2),
            HandFrame::two_hands(0.3, 0.4),
            HandFrame::two_hands(0.5, 0.6),
        ];
        let tracker = ReplayTracker::new(trace.clone(), Duration::ZERO, false);
        let mut link = TrackingLink::new(Box::new(tracker));
        assert!(link.open());
        let frames = poll_until(&mut link, 3);
        assert_eq!(frames, trace);
        link.close();
        assert!(!link.is_open());
        assert!(link.poll().is_empty());
    }

    #[test]
    fn test_empty_replay_is_unavailable() {
        let mut tracker = ReplayTracker::new(Vec::new(), Duration::ZERO, true);
        let (tx, _rx) = bounded(1);
        assert!(matches!(tracker.start(tx), Err(CaptureError::Unavailable(_))));
    }

    #[test]
    fn test_synthetic_stops_on_close() {
        let tracker = SyntheticTracker::new(Duration::from_millis(1), 8, 0.2);
        let mut link = TrackingLink::new(Box::new(tracker));
        assert!(link.open());
        assert!(!poll_until(&mut link, 4).is_empty());
        link.close();
        // Reopening starts a fresh worker
        assert!(link.open());
        assert!(!poll_until(&mut link, 1).is_empty());
    }

    #[test]
    fn test_synthetic_motion_shape() {
        let top = SyntheticTracker::frame_at(3, 12, 0.2).wrist_pair().unwrap();
        assert!((top.0 - 0.7).abs() < 1e-5);
        let start = SyntheticTracker::frame_at(12, 12, 0.2).wrist_pair().unwrap();
        assert!((start.0 - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_load_trace_errors() {
        let dir = std::env::temp_dir().join(format!("lane-rush-trace-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("bad.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(
            ReplayTracker::load(&path, Duration::ZERO),
            Err(CaptureError::Trace(_))
        ));
        assert!(matches!(
            ReplayTracker::load(&dir.join("missing.json"), Duration::ZERO),
            Err(CaptureError::Io(_))
        ));
        let _ = std::fs::remove_dir_all(&dir);
    }
}
