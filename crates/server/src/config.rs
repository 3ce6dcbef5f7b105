use clap::Args;
use contacts_archiver::ArchiverTiming;
use contacts_store::DEFAULT_DB_FILE_NAME;
use std::path::PathBuf;
use std::time::Duration;

pub const DB_PATH_ENV: &str = "CONTACTS_DB";
pub const DEFAULT_BIND: &str = "127.0.0.1:8080";

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Address to listen on
    #[arg(long, default_value = DEFAULT_BIND)]
    pub bind: String,

    /// Allow binding to a non-loopback address
    #[arg(long)]
    pub public: bool,

    /// Contact DB file (JSON array of contacts)
    #[arg(long, env = DB_PATH_ENV, default_value = DEFAULT_DB_FILE_NAME)]
    pub db: PathBuf,

    /// Directory served under /static
    #[arg(long, default_value = "static")]
    pub static_dir: PathBuf,

    /// Upper bound of each randomized archive progress step (ms)
    #[arg(long, default_value_t = 1_000)]
    pub archive_step_ms: u64,

    /// Delay between the last archive step and completion (ms)
    #[arg(long, default_value_t = 1_000)]
    pub archive_settle_ms: u64,
}

impl ServeArgs {
    pub fn archiver_timing(&self) -> ArchiverTiming {
        ArchiverTiming {
            max_step: Duration::from_millis(self.archive_step_ms),
            settle: Duration::from_millis(self.archive_settle_ms),
        }
    }
}
