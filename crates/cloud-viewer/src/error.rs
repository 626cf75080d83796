//! Failure taxonomy surfaced through the viewer's single error state.

use ply_text::PlyError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ViewerError {
    /// Network, status or filesystem failure while obtaining the payload.
    #[error("FetchError: {0}")]
    Fetch(String),

    /// Payload was obtained but is not a usable point cloud.
    #[error("FormatError: {0}")]
    Format(#[from] PlyError),

    /// The output surface or GPU could not be set up.
    #[error("RenderSetupError: {0}")]
    RenderSetup(String),
}
