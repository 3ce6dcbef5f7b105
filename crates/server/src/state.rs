use crate::config::ServeArgs;
use crate::flash::FlashStore;
use contacts_archiver::{Archiver, ArchiverTiming};
use contacts_store::ContactStore;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex as TokioMutex;

/// Everything the handlers share. Passed to axum as `State<Arc<AppState>>`.
pub struct AppState {
    /// Single writer for the contact DB; every mutation persists while holding it.
    pub store: TokioMutex<ContactStore>,
    pub archiver: Archiver,
    pub flashes: FlashStore,
    pub static_dir: PathBuf,
}

impl AppState {
    pub fn new(store: ContactStore, timing: ArchiverTiming, static_dir: PathBuf) -> Arc<Self> {
        let archiver = Archiver::with_timing(store.path(), timing);
        Arc::new(Self {
            store: TokioMutex::new(store),
            archiver,
            flashes: FlashStore::default(),
            static_dir,
        })
    }

    pub async fn open(args: &ServeArgs) -> contacts_store::Result<Arc<Self>> {
        let store = ContactStore::open(&args.db).await?;
        Ok(Self::new(
            store,
            args.archiver_timing(),
            args.static_dir.clone(),
        ))
    }
}
