use crate::status::{ArchiveSnapshot, ArchiveStatus};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// Number of progress checkpoints in one run.
pub const STEPS: u32 = 10;

const DEFAULT_MAX_STEP: Duration = Duration::from_secs(1);
const DEFAULT_SETTLE: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchiverTiming {
    /// Upper bound of the uniformly random sleep before each progress checkpoint.
    pub max_step: Duration,
    /// Fixed sleep between the last progress checkpoint and completion.
    pub settle: Duration,
}

impl Default for ArchiverTiming {
    fn default() -> Self {
        Self {
            max_step: DEFAULT_MAX_STEP,
            settle: DEFAULT_SETTLE,
        }
    }
}

impl ArchiverTiming {
    /// Longest time a run can keep going after [`Archiver::reset`] before it notices.
    ///
    /// Cancellation is only observed at checkpoints, so this is the longest sleep
    /// between two of them.
    pub fn cancellation_latency(&self) -> Duration {
        self.max_step.max(self.settle)
    }

    /// Upper bound on the duration of an uncancelled run.
    pub fn max_run_duration(&self) -> Duration {
        self.max_step * STEPS + self.settle
    }
}

#[derive(Debug)]
struct ArchiveState {
    status: ArchiveStatus,
    steps_done: u32,
    // Bumped by every start and reset; a run only owns the state while this matches.
    generation: u64,
}

impl ArchiveState {
    fn snapshot(&self) -> ArchiveSnapshot {
        ArchiveSnapshot {
            status: self.status,
            progress: f64::from(self.steps_done) / f64::from(STEPS),
        }
    }
}

/// Handle to the background export job.
///
/// Cloning is cheap and every clone observes and drives the same job. All state
/// lives behind one mutex that is held only for the duration of a read or write.
#[derive(Clone)]
pub struct Archiver {
    state: Arc<Mutex<ArchiveState>>,
    timing: ArchiverTiming,
    archive_file: PathBuf,
}

impl Archiver {
    pub fn new(archive_file: impl Into<PathBuf>) -> Self {
        Self::with_timing(archive_file, ArchiverTiming::default())
    }

    pub fn with_timing(archive_file: impl Into<PathBuf>, timing: ArchiverTiming) -> Self {
        Self {
            state: Arc::new(Mutex::new(ArchiveState {
                status: ArchiveStatus::Waiting,
                steps_done: 0,
                generation: 0,
            })),
            timing,
            archive_file: archive_file.into(),
        }
    }

    pub fn timing(&self) -> ArchiverTiming {
        self.timing
    }

    pub fn status(&self) -> ArchiveStatus {
        self.lock().status
    }

    /// Fraction of the run completed, in `[0.0, 1.0]`.
    pub fn progress(&self) -> f64 {
        self.snapshot().progress
    }

    pub fn progress_percentage(&self) -> f64 {
        self.snapshot().progress_percentage()
    }

    /// Status and progress read under a single lock acquisition.
    pub fn snapshot(&self) -> ArchiveSnapshot {
        self.lock().snapshot()
    }

    /// The file offered for download once the archive is complete.
    pub fn archive_file(&self) -> &Path {
        &self.archive_file
    }

    /// Launch a run if the archiver is waiting. Returns `false` (and does nothing)
    /// when a run is already in flight or has completed.
    ///
    /// # Panics
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(&self) -> bool {
        let run = {
            let mut state = self.lock();
            if state.status != ArchiveStatus::Waiting {
                return false;
            }
            state.status = ArchiveStatus::Running;
            state.steps_done = 0;
            state.generation += 1;
            Run {
                state: Arc::clone(&self.state),
                generation: state.generation,
            }
        };

        log::info!("Archive run {} started", run.generation);
        tokio::spawn(run.execute(self.timing));
        true
    }

    /// Force the archiver back to waiting.
    ///
    /// An in-flight run is abandoned: it stops at its next checkpoint and can no
    /// longer mark the archive complete, even if another run is started meanwhile.
    /// Progress is left as is until the next start.
    pub fn reset(&self) {
        let mut state = self.lock();
        state.status = ArchiveStatus::Waiting;
        state.generation += 1;
        log::info!("Archive reset (generation {})", state.generation);
    }

    fn lock(&self) -> MutexGuard<'_, ArchiveState> {
        self.state.lock().expect("archiver mutex poisoned")
    }
}

struct Run {
    state: Arc<Mutex<ArchiveState>>,
    generation: u64,
}

impl Run {
    async fn execute(self, timing: ArchiverTiming) {
        for step in 1..=STEPS {
            tokio::time::sleep(random_step(timing.max_step)).await;
            if !self.advance(step) {
                log::info!(
                    "Archive run {} cancelled at checkpoint {step}",
                    self.generation
                );
                return;
            }
        }

        tokio::time::sleep(timing.settle).await;
        if self.complete() {
            log::info!("Archive run {} complete", self.generation);
        } else {
            log::info!(
                "Archive run {} cancelled before completion",
                self.generation
            );
        }
    }

    fn owns(&self, state: &ArchiveState) -> bool {
        state.status == ArchiveStatus::Running && state.generation == self.generation
    }

    fn advance(&self, step: u32) -> bool {
        let mut state = self.state.lock().expect("archiver mutex poisoned");
        if !self.owns(&state) {
            return false;
        }
        state.steps_done = step;
        log::debug!(
            "Archive run {} progress {:.2}",
            self.generation,
            state.snapshot().progress
        );
        true
    }

    // Running(generation) -> Complete, nothing else.
    fn complete(&self) -> bool {
        let mut state = self.state.lock().expect("archiver mutex poisoned");
        if !self.owns(&state) {
            return false;
        }
        state.status = ArchiveStatus::Complete;
        true
    }
}

fn random_step(max_step: Duration) -> Duration {
    max_step.mul_f64(rand::random::<f64>())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_archiver_is_waiting() {
        let archiver = Archiver::new("contacts.json");
        assert_eq!(archiver.status(), ArchiveStatus::Waiting);
        assert_eq!(archiver.progress(), 0.0);
        assert_eq!(archiver.archive_file(), Path::new("contacts.json"));
    }

    #[test]
    fn random_step_stays_within_bound() {
        let max = Duration::from_millis(250);
        for _ in 0..1_000 {
            assert!(random_step(max) <= max);
        }
        assert_eq!(random_step(Duration::ZERO), Duration::ZERO);
    }

    #[test]
    fn timing_bounds() {
        let timing = ArchiverTiming {
            max_step: Duration::from_millis(300),
            settle: Duration::from_millis(500),
        };
        assert_eq!(timing.cancellation_latency(), Duration::from_millis(500));
        assert_eq!(timing.max_run_duration(), Duration::from_millis(3_500));
    }

    #[test]
    fn checkpoints_step_progress_by_tenths() {
        let archiver = Archiver::new("contacts.json");
        // Claim the run by hand so no background task races the checkpoints.
        let run = {
            let mut state = archiver.lock();
            state.status = ArchiveStatus::Running;
            state.generation += 1;
            Run {
                state: Arc::clone(&archiver.state),
                generation: state.generation,
            }
        };

        let mut seen = Vec::new();
        for step in 1..=STEPS {
            assert!(run.advance(step));
            seen.push(archiver.progress());
            assert_eq!(archiver.status(), ArchiveStatus::Running);
        }
        assert_eq!(
            seen,
            [0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8, 0.9, 1.0]
        );

        assert!(run.complete());
        assert_eq!(archiver.status(), ArchiveStatus::Complete);
        assert_eq!(archiver.progress_percentage(), 100.0);
    }

    #[tokio::test(start_paused = true)]
    async fn stale_run_cannot_touch_a_newer_run() {
        let archiver = Archiver::new("contacts.json");
        assert!(archiver.start());
        let stale = Run {
            state: Arc::clone(&archiver.state),
            generation: archiver.lock().generation,
        };

        archiver.reset();
        assert!(archiver.start());

        assert!(!stale.advance(9));
        assert!(!stale.complete());
        assert_eq!(archiver.status(), ArchiveStatus::Running);
        assert_eq!(archiver.progress(), 0.0);
    }
}
