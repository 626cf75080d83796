use crate::source::SourceRef;
use anyhow::{bail, Result};
use clap::Parser;

/// `cloud-viewer` - interactive preview of reconstructed point clouds.
///
/// Loads an ASCII PLY point cloud from a URL, a file, or a reconstruction job
/// on the upstream service, frames it, and lets you orbit it with the mouse.
/// Drop another `.ply` file onto the window to swap the displayed cloud.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Config {
    /// URL (`http://`, `https://`) or path of the `.ply` file to display.
    pub source: Option<String>,

    /// Reconstruction job id; displays `<upstream>/api/jobs/<id>/gaussians.ply`.
    #[arg(long, conflicts_with = "source")]
    pub job: Option<String>,

    /// Base URL of the reconstruction service.
    ///
    /// Falls back to `NEXT_PUBLIC_API_BASE` when `CSRAI_UPSTREAM` is unset.
    #[arg(long, env = "CSRAI_UPSTREAM")]
    pub upstream: Option<String>,

    /// Logical width of the view surface.
    #[arg(long, default_value_t = 920)]
    pub width: u32,

    /// Logical height of the view surface.
    #[arg(long, default_value_t = 560)]
    pub height: u32,

    /// Vertical field of view in degrees.
    #[arg(long, default_value_t = 60.0)]
    pub fov_deg: f32,

    /// Point size in world units.
    #[arg(long, default_value_t = 0.008)]
    pub point_size: f32,
}

impl Config {
    /// The reference to display at startup, if any.
    pub fn source_ref(&self) -> Result<Option<SourceRef>> {
        if let Some(job) = self.job.as_deref() {
            let upstream = self
                .upstream
                .clone()
                .or_else(|| std::env::var("NEXT_PUBLIC_API_BASE").ok())
                .unwrap_or_default();

            return match SourceRef::for_job(&upstream, job) {
                Some(src) => Ok(Some(src)),
                None => bail!("--job needs an upstream (--upstream or CSRAI_UPSTREAM) and a non-empty id"),
            };
        }

        Ok(self.source.as_deref().and_then(SourceRef::new))
    }

    pub fn viewer_config(&self) -> ViewerConfig {
        ViewerConfig {
            fov_y_rad: self.fov_deg.clamp(1.0, 170.0).to_radians(),
            point_size: self.point_size.max(0.0),
            ..ViewerConfig::default()
        }
    }
}

/// Render and interaction constants handed to every session.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerConfig {
    /// Vertical field of view, radians.
    pub fov_y_rad: f32,
    /// Multiplier on the fit distance so the cloud is not clipped at the border.
    pub frame_margin: f32,
    /// Radians of yaw/pitch per pixel of drag.
    pub drag_sensitivity: f32,
    /// Distance kept between pitch and the poles.
    pub pitch_epsilon: f32,
    /// Point sprite edge in world units.
    pub point_size: f32,
    /// Sprites never shrink below this many pixels.
    pub min_point_px: f32,
    /// Used when the cloud carries no per-vertex color.
    pub flat_color: [f32; 3],
    pub background: [f64; 3],
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            fov_y_rad: 60f32.to_radians(),
            frame_margin: 1.2,
            drag_sensitivity: 0.005,
            pitch_epsilon: 0.01,
            point_size: 0.008,
            min_point_px: 1.0,
            flat_color: [0x11 as f32 / 255.0; 3],
            background: [1.0, 1.0, 1.0],
        }
    }
}
