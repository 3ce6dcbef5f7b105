use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArchiveStatus {
    Waiting,
    Running,
    Complete,
}

impl ArchiveStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Waiting => "Waiting",
            Self::Running => "Running",
            Self::Complete => "Complete",
        }
    }
}

impl fmt::Display for ArchiveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Point-in-time view of the archiver, safe to hand to a renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArchiveSnapshot {
    pub status: ArchiveStatus,
    pub progress: f64,
}

impl ArchiveSnapshot {
    pub fn progress_percentage(&self) -> f64 {
        self.progress * 100.0
    }

    pub fn is_running(&self) -> bool {
        self.status == ArchiveStatus::Running
    }

    pub fn is_complete(&self) -> bool {
        self.status == ArchiveStatus::Complete
    }
}
