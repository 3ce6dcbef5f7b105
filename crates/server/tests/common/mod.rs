#![allow(dead_code)]

use contacts_archiver::ArchiverTiming;
use contacts_server::AppState;
use contacts_store::{Contact, ContactStore};
use reqwest::redirect::Policy;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

pub struct TestServer {
    pub base: String,
    pub state: Arc<AppState>,
    pub db: PathBuf,
    pub static_dir: PathBuf,
    _dir: TempDir,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base)
    }
}

pub fn fast_timing() -> ArchiverTiming {
    ArchiverTiming {
        max_step: Duration::from_millis(10),
        settle: Duration::from_millis(20),
    }
}

pub fn contact(n: u64) -> Contact {
    Contact::new(
        format!("First{n}"),
        format!("Last{n}"),
        format!("555-{n:04}"),
        format!("user{n}@example.com"),
    )
}

/// Serve a store seeded with `seed` contacts on an ephemeral loopback port.
pub async fn spawn_server(seed: u64) -> TestServer {
    let dir = TempDir::new().expect("tempdir");
    let db = dir.path().join("contacts.json");
    let static_dir = dir.path().join("static");
    std::fs::create_dir_all(&static_dir).expect("static dir");

    let mut store = ContactStore::new(&db);
    for n in 1..=seed {
        let mut c = contact(n);
        assert!(store.save(&mut c).await.expect("seed save"));
    }

    let state = AppState::new(store, fast_timing(), static_dir.clone());
    let app = contacts_server::router(Arc::clone(&state));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });

    TestServer {
        base: format!("http://{addr}"),
        state,
        db,
        static_dir,
        _dir: dir,
    }
}

/// Put a directory where the contact DB lives so every later write fails.
pub fn make_db_unwritable(server: &TestServer) {
    if server.db.is_file() {
        std::fs::remove_file(&server.db).expect("remove db");
    }
    std::fs::create_dir_all(&server.db).expect("db dir");
}

/// Client that surfaces redirects instead of following them.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(Policy::none())
        .build()
        .expect("client")
}

/// `name=value` of the first Set-Cookie header, ready for a Cookie header.
pub fn cookie_pair(response: &reqwest::Response) -> Option<String> {
    response
        .headers()
        .get(reqwest::header::SET_COOKIE)?
        .to_str()
        .ok()?
        .split(';')
        .next()
        .map(str::to_string)
}
