//! The rendering orchestrator. Owns the GPU context, the depth target, the
//! point pipeline and the egui renderer.

pub mod context;
pub mod pipelines;
pub mod targets;

use self::{context::GfxContext, pipelines::points::PointsPipeline, targets::Targets};
use crate::error::ViewerError;
use crate::session::{viewport, ViewerSession};
use std::sync::Arc;
use winit::window::Window;

/// Owns all rendering-related state.
pub struct Renderer {
    pub gfx: GfxContext,
    pub targets: Targets,
    pub points: PointsPipeline,
    pub egui_renderer: egui_wgpu::Renderer,
}

impl Renderer {
    pub async fn new(window: Arc<Window>) -> Result<Self, ViewerError> {
        let gfx = GfxContext::new(window).await?;
        let targets = Targets::new(&gfx.device, gfx.size);
        let points = PointsPipeline::new(&gfx.device, gfx.config.format, targets.depth_fmt);

        let egui_renderer = egui_wgpu::Renderer::new(&gfx.device, gfx.config.format, None, 1);

        Ok(Self {
            gfx,
            targets,
            points,
            egui_renderer,
        })
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.gfx.resize(new_size);
            self.targets.resize(&self.gfx.device, new_size);
        }
    }

    /// Clears to `background` and draws the session's cloud, if any.
    pub fn render_scene(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        swap_view: &wgpu::TextureView,
        session: Option<&mut ViewerSession>,
        background: [f64; 3],
    ) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Point Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: swap_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color {
                        r: background[0],
                        g: background[1],
                        b: background[2],
                        a: 1.0,
                    }),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.targets.depth,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        if let Some(session) = session {
            session.draw(&self.gfx.queue, &self.points, &mut pass, viewport(self.gfx.size));
        }
    }
}
