//! Scripted transport for tests. No network access.

use crate::config::SourceConfig;
use crate::error::FetchError;
use crate::fetch::{Connector, Transport};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Canned response for one attempt.
#[derive(Debug, Clone)]
pub enum Reply {
    Body(&'static str),
    Text(String),
    /// Body returned after a delay.
    Slow(Duration, &'static str),
    Status(u16),
    Refused,
    /// Never completes; only a timeout ends the attempt.
    Hang,
}

#[derive(Default)]
struct State {
    script: Mutex<HashMap<String, VecDeque<Reply>>>,
    calls: Mutex<Vec<String>>,
    refuse_open: Mutex<HashSet<String>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    open_sessions: AtomicUsize,
    sessions_opened: AtomicUsize,
}

/// Replays scripted replies per URL. Replies for a URL are consumed in
/// order and the last one repeats; unscripted URLs are refused.
#[derive(Clone, Default)]
pub struct ScriptedConnector {
    state: Arc<State>,
}

impl ScriptedConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, url: &str, reply: Reply) -> Self {
        self.state
            .script
            .lock()
            .unwrap()
            .entry(url.to_string())
            .or_default()
            .push_back(reply);
        self
    }

    /// Make `open` fail for the source with this id.
    pub fn refuse_open(self, source_id: &str) -> Self {
        self.state
            .refuse_open
            .lock()
            .unwrap()
            .insert(source_id.to_string());
        self
    }

    pub fn session(&self) -> ScriptedSession {
        self.state.open_sessions.fetch_add(1, Ordering::SeqCst);
        self.state.sessions_opened.fetch_add(1, Ordering::SeqCst);
        ScriptedSession {
            state: Arc::clone(&self.state),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.calls.lock().unwrap().clone()
    }

    pub fn attempts(&self, url: &str) -> usize {
        self.calls().iter().filter(|u| *u == url).count()
    }

    pub fn max_in_flight(&self) -> usize {
        self.state.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn open_sessions(&self) -> usize {
        self.state.open_sessions.load(Ordering::SeqCst)
    }

    pub fn sessions_opened(&self) -> usize {
        self.state.sessions_opened.load(Ordering::SeqCst)
    }
}

impl State {
    fn next_reply(&self, url: &str) -> Reply {
        let mut script = self.script.lock().unwrap();
        match script.get_mut(url) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap_or(Reply::Refused),
            Some(queue) => queue.front().cloned().unwrap_or(Reply::Refused),
            None => Reply::Refused,
        }
    }
}

impl Connector for ScriptedConnector {
    type Session = ScriptedSession;

    fn open(&self, source: &SourceConfig) -> Result<ScriptedSession, FetchError> {
        if self.state.refuse_open.lock().unwrap().contains(&source.id) {
            return Err(FetchError::Client("refused to open session".into()));
        }
        Ok(self.session())
    }
}

pub struct ScriptedSession {
    state: Arc<State>,
}

struct InFlight<'a>(&'a State);

impl<'a> InFlight<'a> {
    fn enter(state: &'a State) -> Self {
        let now = state.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        state.max_in_flight.fetch_max(now, Ordering::SeqCst);
        Self(state)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

impl Transport for ScriptedSession {
    async fn get(&self, url: &str) -> Result<String, FetchError> {
        self.state.calls.lock().unwrap().push(url.to_string());
        let reply = self.state.next_reply(url);

        let _guard = InFlight::enter(&self.state);
        // Give sibling tasks a chance to overlap with this one.
        for _ in 0..5 {
            tokio::task::yield_now().await;
        }

        match reply {
            Reply::Body(body) => Ok(body.to_string()),
            Reply::Text(body) => Ok(body),
            Reply::Slow(delay, body) => {
                tokio::time::sleep(delay).await;
                Ok(body.to_string())
            }
            Reply::Status(code) => Err(FetchError::Status(code)),
            Reply::Refused => Err(FetchError::Connect("connection refused".into())),
            Reply::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(FetchError::Timeout(3600))
            }
        }
    }
}

impl Drop for ScriptedSession {
    fn drop(&mut self) {
        self.state.open_sessions.fetch_sub(1, Ordering::SeqCst);
    }
}
