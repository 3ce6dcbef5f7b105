//! # Contacts Archiver
//!
//! Simulated long-running export with observable status and progress.
//!
//! ```text
//! Waiting ──start──> Running ──10 checkpoints + settle──> Complete
//!    ^                  │                                    │
//!    └──────reset───────┴────────────────reset───────────────┘
//! ```
//!
//! A run is cancelled cooperatively: [`Archiver::reset`] flips the shared state and
//! the background task notices at its next checkpoint, so cancellation latency is
//! bounded by [`ArchiverTiming::cancellation_latency`]. Every start and reset opens a
//! new generation; a task only writes progress or completes while its generation is
//! current, which makes "reset wins" deterministic even when it races the final
//! checkpoint.

mod archiver;
mod status;

pub use archiver::{Archiver, ArchiverTiming, STEPS};
pub use status::{ArchiveSnapshot, ArchiveStatus};
