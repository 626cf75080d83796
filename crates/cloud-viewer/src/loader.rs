use crate::error::ViewerError;
use crate::source::{Fetch, SourceRef};
use crossbeam_channel::Sender;
use ply_text::PointSet;
use std::sync::Arc;
use std::thread;

/// Result of one fetch + parse attempt, tagged with the request it answers.
#[derive(Debug)]
pub struct LoadOutcome {
    pub generation: u64,
    pub source: SourceRef,
    pub result: Result<PointSet, ViewerError>,
}

/// Fetches and parses `source` on a worker thread and sends the outcome back.
/// The worker never touches camera or GPU state.
pub fn spawn_load(
    fetcher: Arc<dyn Fetch>,
    source: SourceRef,
    generation: u64,
    tx: Sender<LoadOutcome>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let result = fetcher
            .fetch(&source)
            .and_then(|bytes| ply_text::parse_ply_bytes(&bytes).map_err(ViewerError::from));

        match &result {
            Ok(points) => log::debug!(
                "Loaded {} (generation {}): {} points",
                source,
                generation,
                points.position_count()
            ),
            Err(e) => log::debug!("Load of {} (generation {}) failed: {}", source, generation, e),
        }

        let outcome = LoadOutcome {
            generation,
            source,
            result,
        };

        // The viewer may be gone by now; nothing left to notify.
        if tx.send(outcome).is_err() {
            log::debug!("Dropped load outcome (viewer closed)");
        }
    })
}
