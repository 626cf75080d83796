use crate::error::ViewerError;
use std::sync::Arc;
use winit::window::Window;

/// Holds all GPU resources needed for rendering.
pub struct GfxContext {
    pub surface: wgpu::Surface<'static>,
    pub device:  wgpu::Device,
    pub queue:   wgpu::Queue,
    pub config:  wgpu::SurfaceConfiguration,
    pub size:    winit::dpi::PhysicalSize<u32>,
}

impl GfxContext {
    /// Creates a new graphics context bound to the given window.
    pub async fn new(window: Arc<Window>) -> Result<Self, ViewerError> {
        let size = window.inner_size();
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor::default());

        // The surface must outlive the window; `Arc` guarantees this.
        let surface = instance
            .create_surface(window.clone())
            .map_err(|e| ViewerError::RenderSetup(format!("surface: {}", e)))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference:         wgpu::PowerPreference::default(),
                compatible_surface:       Some(&surface),
                force_fallback_adapter:   false,
            })
            .await
            .ok_or_else(|| ViewerError::RenderSetup("no compatible GPU adapter".into()))?;

        log::debug!("Using adapter {:?}", adapter.get_info());

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label:            Some("Device"),
                    required_features: wgpu::Features::empty(),
                    // Downlevel limits keep older GPUs and GL backends usable;
                    // buffer size is whatever the adapter offers.
                    required_limits:   wgpu::Limits {
                        max_buffer_size: adapter.limits().max_buffer_size,
                        ..wgpu::Limits::downlevel_defaults().using_resolution(adapter.limits())
                    },
                },
                None, // no trace
            )
            .await
            .map_err(|e| ViewerError::RenderSetup(format!("device: {}", e)))?;

        // Linear surface: PLY colors are written as-is and egui expects it.
        let caps = surface.get_capabilities(&adapter);
        let surface_format = caps
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .or_else(|| caps.formats.first().copied())
            .ok_or_else(|| ViewerError::RenderSetup("surface reports no formats".into()))?;

        let alpha_mode = caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage:                       wgpu::TextureUsages::RENDER_ATTACHMENT,
            format:                      surface_format,
            width:                       size.width.max(1),
            height:                      size.height.max(1),
            present_mode:                wgpu::PresentMode::Fifo, // V‑sync
            alpha_mode,
            view_formats:                vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            size,
        })
    }

    /// Resizes the swap chain when the window size changes.
    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.size = new_size;
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    /// Reapplies the current configuration after the surface was lost.
    pub fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
    }
}
