use std::fs;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

use thiserror::Error;

use crate::problem::{Platform, RawPageSnapshot};

const FETCH_TIMEOUT_SECS: u64 = 15;
const USER_AGENT: &str = concat!("codementor/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HostError {
    #[error("request failed: {0}")]
    Network(String),
    #[error("could not read page: {0}")]
    Unreadable(String),
}

/// Where to read a problem page from: a live URL or a local markup file
/// (the latter doubles as the fixture path for tests).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageTarget {
    Url(String),
    File(PathBuf),
}

impl PageTarget {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            Self::Url(trimmed.to_string())
        } else {
            Self::File(PathBuf::from(trimmed))
        }
    }

    /// Live URLs must point at an actual problem page; local files only need
    /// a recognizable platform hint in their name.
    pub fn looks_like_problem_page(&self) -> bool {
        match self {
            Self::Url(url) => Platform::is_problem_url(url),
            Self::File(path) => Platform::detect(&path.display().to_string()).is_some(),
        }
    }
}

/// Read a snapshot from the target. Plain HTTP and file reads cannot expose
/// structured editor models, so `editor_models` stays empty and code
/// extraction falls back to the markup heuristics.
pub fn read_page(target: &PageTarget) -> Result<RawPageSnapshot, HostError> {
    match target {
        PageTarget::Url(url) => {
            let client = reqwest::blocking::Client::builder()
                .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
                .user_agent(USER_AGENT)
                .build()
                .map_err(|err| HostError::Network(err.to_string()))?;
            let response = client
                .get(url)
                .send()
                .map_err(|err| HostError::Network(err.to_string()))?;
            let status = response.status();
            if !status.is_success() {
                return Err(HostError::Network(format!("HTTP {status}")));
            }
            let html = response
                .text()
                .map_err(|err| HostError::Network(err.to_string()))?;
            Ok(RawPageSnapshot {
                url: url.clone(),
                html,
                editor_models: Vec::new(),
            })
        }
        PageTarget::File(path) => {
            let html = fs::read_to_string(path)
                .map_err(|err| HostError::Unreadable(format!("{}: {err}", path.display())))?;
            Ok(RawPageSnapshot {
                url: path.display().to_string(),
                html,
                editor_models: Vec::new(),
            })
        }
    }
}

#[derive(Debug)]
pub struct PageEvent {
    pub result: Result<RawPageSnapshot, HostError>,
}

/// Background page reader so a slow fetch never blocks the UI loop; the
/// start/re-read controls stay disabled while a read is in flight.
pub struct PageReadAdapter {
    event_tx: Sender<PageEvent>,
    event_rx: Receiver<PageEvent>,
}

impl PageReadAdapter {
    pub fn new() -> Self {
        let (event_tx, event_rx) = mpsc::channel();
        Self { event_tx, event_rx }
    }

    pub fn read_page(&self, target: PageTarget) {
        let tx = self.event_tx.clone();
        thread::spawn(move || {
            let result = read_page(&target);
            let _ = tx.send(PageEvent { result });
        });
    }

    pub fn drain_events(&self) -> Vec<PageEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.event_rx.try_recv() {
            events.push(event);
        }
        events
    }
}
