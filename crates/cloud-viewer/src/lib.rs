//! Interactive viewer for ASCII PLY point clouds.
//!
//! A [`viewer::Viewer`] accepts source references (URLs or paths), fetches and
//! parses them on a worker thread and turns the newest result into a
//! [`session::ViewerSession`]: GPU buffers, an orbit camera framed on the
//! cloud's bounding sphere and a render loop. Switching references releases
//! the previous session; late results of superseded requests are dropped.

pub mod app;
pub mod camera;
pub mod config;
pub mod data;
pub mod error;
pub mod loader;
pub mod render_loop;
pub mod renderer;
pub mod session;
pub mod source;
pub mod ui;
pub mod viewer;

pub use error::ViewerError;
pub use source::{Fetch, SourceFetcher, SourceRef};
pub use viewer::Viewer;
