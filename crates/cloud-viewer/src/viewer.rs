//! The viewer façade: takes source references, runs fetch + parse off the UI
//! thread and turns the newest result into a live session.
//!
//! Every `display` call with a new reference bumps a generation counter.
//! Outcomes carrying an older generation are dropped on arrival, so a slow
//! response can never replace the session of a later request.

use crate::error::ViewerError;
use crate::loader::{spawn_load, LoadOutcome};
use crate::source::{Fetch, SourceRef};
use crossbeam_channel::{Receiver, Sender};
use ply_text::PointSet;
use std::sync::Arc;
use std::time::Duration;

/// What happened to one load outcome taken off the channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Answered a request that has since been superseded.
    Stale,
    /// A new session is live.
    Loaded,
    /// Fetch, parse or build failed; the error state is set.
    Failed,
}

pub struct Viewer<S> {
    fetcher: Arc<dyn Fetch>,
    tx: Sender<LoadOutcome>,
    rx: Receiver<LoadOutcome>,

    generation: u64,
    requested: Option<SourceRef>,
    loading: bool,

    session: Option<S>,
    error: Option<String>,
}

impl<S> Viewer<S> {
    pub fn new(fetcher: Arc<dyn Fetch>) -> Self {
        let (tx, rx) = crossbeam_channel::unbounded();
        Self {
            fetcher,
            tx,
            rx,
            generation: 0,
            requested: None,
            loading: false,
            session: None,
            error: None,
        }
    }

    /// Starts loading `reference` unless it is empty or already the current
    /// request. The previous session is released before the fetch starts.
    /// Returns whether a load was started.
    pub fn display(&mut self, reference: &str) -> bool {
        let Some(source) = SourceRef::new(reference) else {
            log::debug!("Ignoring empty source reference");
            return false;
        };

        if self.requested.as_ref() == Some(&source) {
            return false;
        }

        self.generation += 1;
        self.error = None;
        self.loading = true;

        if self.session.take().is_some() {
            log::debug!("Released previous session");
        }

        log::info!("Loading {} (generation {})", source, self.generation);

        spawn_load(
            Arc::clone(&self.fetcher),
            source.clone(),
            self.generation,
            self.tx.clone(),
        );
        self.requested = Some(source);
        true
    }

    /// Drains finished loads without blocking. `build` turns a parsed point
    /// set into a session; it runs on the calling thread.
    pub fn poll<F>(&mut self, mut build: F)
    where
        F: FnMut(&SourceRef, PointSet) -> Result<S, ViewerError>,
    {
        while let Ok(outcome) = self.rx.try_recv() {
            self.accept(outcome, &mut build);
        }
    }

    /// Blocks up to `timeout` for the next load outcome and applies it.
    /// `None` when nothing arrived in time.
    pub fn wait_next<F>(&mut self, timeout: Duration, mut build: F) -> Option<Delivery>
    where
        F: FnMut(&SourceRef, PointSet) -> Result<S, ViewerError>,
    {
        let outcome = self.rx.recv_timeout(timeout).ok()?;
        Some(self.accept(outcome, &mut build))
    }

    fn accept<F>(&mut self, outcome: LoadOutcome, build: &mut F) -> Delivery
    where
        F: FnMut(&SourceRef, PointSet) -> Result<S, ViewerError>,
    {
        if outcome.generation != self.generation {
            log::debug!(
                "Discarding stale result for {} (generation {}, current {})",
                outcome.source,
                outcome.generation,
                self.generation
            );
            return Delivery::Stale;
        }

        self.loading = false;
        // Nothing from an earlier request may survive into the new one.
        self.session = None;

        match outcome.result.and_then(|points| build(&outcome.source, points)) {
            Ok(session) => {
                self.session = Some(session);
                Delivery::Loaded
            }
            Err(e) => {
                log::error!("Failed to display {}: {}", outcome.source, e);
                self.error = Some(e.to_string());
                Delivery::Failed
            }
        }
    }

    /// Human-readable description of the last failure, if the current
    /// request failed.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn session(&self) -> Option<&S> {
        self.session.as_ref()
    }

    pub fn session_mut(&mut self) -> Option<&mut S> {
        self.session.as_mut()
    }

    /// The most recently requested reference.
    pub fn source(&self) -> Option<&SourceRef> {
        self.requested.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }
}
