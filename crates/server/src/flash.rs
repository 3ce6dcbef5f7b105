use axum::http::{header::COOKIE, HeaderMap};
use getrandom::getrandom;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::{Duration, Instant};

pub const SESSION_COOKIE: &str = "contacts_session";

const FLASH_STORE_CAPACITY: usize = 1024;
const FLASH_STORE_TTL: Duration = Duration::from_secs(10 * 60);
const SESSION_ID_BYTES: usize = 16;

struct FlashEntry {
    messages: Vec<String>,
    expires_at: Instant,
}

#[derive(Default)]
struct FlashState {
    entries: HashMap<String, FlashEntry>,
    order: VecDeque<String>,
}

impl FlashState {
    fn prune_expired(&mut self, now: Instant) {
        let entries = &mut self.entries;
        entries.retain(|_, entry| entry.expires_at > now);
        self.order.retain(|id| entries.contains_key(id));
    }

    fn enforce_capacity(&mut self, capacity: usize) {
        while self.entries.len() > capacity {
            let Some(evict) = self.order.pop_front() else {
                break;
            };
            self.entries.remove(&evict);
        }
    }
}

/// One-shot messages shown on the next full page a session renders.
///
/// Messages live in memory keyed by an opaque session id carried in the
/// [`SESSION_COOKIE`] cookie. Sessions expire after a TTL and the store is
/// capacity-bounded, evicting the oldest session first.
pub struct FlashStore {
    state: Mutex<FlashState>,
    capacity: usize,
    ttl: Duration,
}

impl Default for FlashStore {
    fn default() -> Self {
        Self::new(FLASH_STORE_CAPACITY, FLASH_STORE_TTL)
    }
}

impl FlashStore {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            state: Mutex::new(FlashState::default()),
            capacity: capacity.max(1),
            ttl,
        }
    }

    pub fn new_session_id() -> Option<String> {
        let mut bytes = [0u8; SESSION_ID_BYTES];
        getrandom(&mut bytes).ok()?;
        Some(hex::encode(bytes))
    }

    pub fn push(&self, session: &str, message: impl Into<String>) {
        let now = Instant::now();
        let mut state = self.state.lock().expect("flash mutex poisoned");
        state.prune_expired(now);

        let entry = state
            .entries
            .entry(session.to_string())
            .or_insert_with(|| FlashEntry {
                messages: Vec::new(),
                expires_at: now,
            });
        entry.messages.push(message.into());
        entry.expires_at = now + self.ttl;

        state.order.retain(|id| id != session);
        state.order.push_back(session.to_string());
        state.enforce_capacity(self.capacity);
    }

    /// Drain the pending messages of `session`.
    pub fn take(&self, session: &str) -> Vec<String> {
        let mut state = self.state.lock().expect("flash mutex poisoned");
        state.prune_expired(Instant::now());
        let Some(entry) = state.entries.remove(session) else {
            return Vec::new();
        };
        state.order.retain(|id| id != session);
        entry.messages
    }

    pub fn len(&self) -> usize {
        self.state.lock().expect("flash mutex poisoned").entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The session id from the request cookies, if it is well-formed.
pub fn session_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.trim())
        .filter(|value| is_session_id(value))
        .map(str::to_string)
}

pub fn session_cookie(session: &str) -> String {
    format!("{SESSION_COOKIE}={session}; Path=/; HttpOnly; SameSite=Lax")
}

fn is_session_id(value: &str) -> bool {
    value.len() == SESSION_ID_BYTES * 2 && value.bytes().all(|b| b.is_ascii_hexdigit())
}
