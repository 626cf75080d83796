//! Data handling modules for the viewer.
//!
//! This module provides functionality for:
//! - Turning a parsed point set into a renderable scene with derived bounds.
//! - Defining the data structures for GPU buffers.

pub mod scene;
pub mod types;

pub use self::scene::{fits_in_buffer, instance_buffer_size, BoundingSphere, SceneData};
pub use self::types::{PointInstance, SceneGpu, SceneUniform};
