use crate::{
    config::ViewerConfig,
    error::ViewerError,
    renderer::Renderer,
    session::ViewerSession,
    source::Fetch,
    ui::{self, HudState},
    viewer::Viewer,
};
use std::sync::Arc;
use winit::{event::WindowEvent, window::Window};

pub const WINDOW_TITLE: &str = "Point Cloud Viewer";

pub struct App {
    pub renderer: Renderer,
    pub viewer: Viewer<ViewerSession>,
    pub config: ViewerConfig,
    pub egui_ctx: egui::Context,
    pub egui_state: egui_winit::State,
    title: String,
}

impl App {
    pub async fn new(
        window: Arc<Window>,
        config: ViewerConfig,
        fetcher: Arc<dyn Fetch>,
    ) -> Result<Self, ViewerError> {
        let renderer = Renderer::new(window.clone()).await?;

        let egui_ctx = egui::Context::default();
        // Dark text on the white background.
        egui_ctx.set_visuals(egui::Visuals::light());
        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui_ctx.viewport_id(),
            &*window,
            None,
            None,
        );

        Ok(Self {
            renderer,
            viewer: Viewer::new(fetcher),
            config,
            egui_ctx,
            egui_state,
            title: WINDOW_TITLE.to_string(),
        })
    }

    /// Shows `reference`; see [`Viewer::display`].
    pub fn display(&mut self, reference: &str) -> bool {
        self.viewer.display(reference)
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.renderer.resize(new_size);
            if let Some(session) = self.viewer.session_mut() {
                session.resize(new_size);
            }
        }
    }

    /// Routes a window event. Returns true when it was consumed.
    pub fn handle_event(&mut self, window: &Window, event: &WindowEvent) -> bool {
        let response = self.egui_state.on_window_event(window, event);
        if response.consumed {
            return true;
        }

        match event {
            WindowEvent::Resized(physical_size) => {
                self.resize(*physical_size);
                false
            }
            WindowEvent::DroppedFile(path) => {
                let path = path.to_string_lossy();
                if !path.to_ascii_lowercase().ends_with(".ply") {
                    log::warn!("Ignoring dropped file {} (not .ply)", path);
                } else {
                    self.display(&path);
                }
                true
            }
            _ => match self.viewer.session_mut() {
                Some(session) => session.handle_event(event),
                None => false,
            },
        }
    }

    /// Takes finished loads on the UI thread and keeps the title current.
    pub fn update(&mut self, window: &Window) {
        let renderer = &self.renderer;
        let config = &self.config;

        self.viewer.poll(|source, points| {
            ViewerSession::start(
                &renderer.gfx.device,
                &renderer.points,
                renderer.gfx.size,
                source,
                points,
                config,
            )
        });

        let title = match self.viewer.source() {
            Some(src) => format!("{} - {}", WINDOW_TITLE, src),
            None => WINDOW_TITLE.to_string(),
        };
        if title != self.title {
            window.set_title(&title);
            self.title = title;
        }
    }

    pub fn render(&mut self, window: &Window) -> Result<(), wgpu::SurfaceError> {
        let frame = self.renderer.gfx.surface.get_current_texture()?;
        let swap_view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .renderer
            .gfx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        self.renderer.render_scene(
            &mut encoder,
            &swap_view,
            self.viewer.session_mut(),
            self.config.background,
        );

        let egui_input = self.egui_state.take_egui_input(window);
        self.egui_ctx.begin_frame(egui_input);

        let source = self.viewer.source().map(|s| s.as_str());
        ui::draw_hud(
            &self.egui_ctx,
            &HudState {
                source,
                loading: self.viewer.is_loading(),
                points: self.viewer.session().map(ViewerSession::point_count),
                error: self.viewer.error(),
            },
        );

        let egui_output = self.egui_ctx.end_frame();
        self.egui_state
            .handle_platform_output(window, egui_output.platform_output);
        let shapes = self
            .egui_ctx
            .tessellate(egui_output.shapes, self.egui_ctx.pixels_per_point());

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [
                self.renderer.gfx.config.width,
                self.renderer.gfx.config.height,
            ],
            pixels_per_point: self.egui_ctx.pixels_per_point(),
        };

        for (id, delta) in &egui_output.textures_delta.set {
            self.renderer.egui_renderer.update_texture(
                &self.renderer.gfx.device,
                &self.renderer.gfx.queue,
                *id,
                delta,
            );
        }

        self.renderer.egui_renderer.update_buffers(
            &self.renderer.gfx.device,
            &self.renderer.gfx.queue,
            &mut encoder,
            &shapes,
            &screen_descriptor,
        );

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("EGUI Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &swap_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            self.renderer
                .egui_renderer
                .render(&mut render_pass, &shapes, &screen_descriptor);
        }

        for id in &egui_output.textures_delta.free {
            self.renderer.egui_renderer.free_texture(id);
        }

        self.renderer
            .gfx
            .queue
            .submit(std::iter::once(encoder.finish()));
        frame.present();

        Ok(())
    }
}
