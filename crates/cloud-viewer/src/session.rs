use crate::camera::{Camera, CameraController};
use crate::config::ViewerConfig;
use crate::data::{fits_in_buffer, instance_buffer_size, BoundingSphere, SceneData, SceneGpu, SceneUniform};
use crate::error::ViewerError;
use crate::render_loop::RenderLoop;
use crate::renderer::pipelines::points::PointsPipeline;
use crate::source::SourceRef;
use ply_text::PointSet;
use winit::event::WindowEvent;

/// One displayed cloud: its GPU buffers, the camera orbiting it and the loop
/// that draws it. Dropping the session stops the loop and frees the buffers.
pub struct ViewerSession {
    source: SourceRef,
    scene: SceneGpu,
    sphere: BoundingSphere,
    camera: Camera,
    controller: CameraController,
    render_loop: RenderLoop,

    point_count: usize,
    vertex_colors: bool,
    point_size: f32,
    min_point_px: f32,
}

impl ViewerSession {
    /// Builds the scene, uploads it and frames the camera. Clouds too large
    /// for one vertex buffer and GPU errors raised during the upload come
    /// back as `RenderSetup` with nothing left allocated.
    pub fn start(
        device: &wgpu::Device,
        pipeline: &PointsPipeline,
        size: winit::dpi::PhysicalSize<u32>,
        source: &SourceRef,
        points: PointSet,
        cfg: &ViewerConfig,
    ) -> Result<Self, ViewerError> {
        // Mapped-at-creation buffers over the limit abort inside wgpu instead
        // of reaching the error scope below.
        let max_buffer_size = device.limits().max_buffer_size;
        if !fits_in_buffer(points.position_count(), max_buffer_size) {
            return Err(ViewerError::RenderSetup(format!(
                "{} points need {} bytes of vertex data, the device allows {}",
                points.position_count(),
                instance_buffer_size(points.position_count()),
                max_buffer_size
            )));
        }

        let data = SceneData::build(points, cfg);
        let sphere = data.sphere;

        let mut camera = Camera::new(cfg.fov_y_rad, 1.0);
        camera.set_aspect(size.width, size.height);
        camera.frame(&sphere, cfg.frame_margin);

        let initial = scene_uniform(&camera, viewport(size), cfg.point_size, cfg.min_point_px);

        device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let scene = data.upload(device, &pipeline.scene_layout, &initial);
        let validation = pollster::block_on(device.pop_error_scope());
        let oom = pollster::block_on(device.pop_error_scope());

        if let Some(err) = validation.or(oom) {
            scene.release();
            return Err(ViewerError::RenderSetup(err.to_string()));
        }

        let mut render_loop = RenderLoop::new();
        render_loop.start();

        log::info!(
            "Session started for {}: {} points ({}), center=({:.3}, {:.3}, {:.3}) radius={:.4}, camera distance={:.4}",
            source,
            data.point_count(),
            if data.uses_vertex_colors() { "vertex colors" } else { "flat color" },
            sphere.center.x,
            sphere.center.y,
            sphere.center.z,
            sphere.radius,
            camera.distance
        );

        Ok(Self {
            source: source.clone(),
            scene,
            sphere,
            camera,
            controller: CameraController::new(cfg.drag_sensitivity, cfg.pitch_epsilon),
            render_loop,
            point_count: data.point_count(),
            vertex_colors: data.uses_vertex_colors(),
            point_size: cfg.point_size,
            min_point_px: cfg.min_point_px,
        })
    }

    /// Pointer input; only ever touches the camera. Returns true when the
    /// camera moved.
    pub fn handle_event(&mut self, event: &WindowEvent) -> bool {
        self.controller.handle_event(event, &mut self.camera)
    }

    pub fn resize(&mut self, size: winit::dpi::PhysicalSize<u32>) {
        self.camera.set_aspect(size.width, size.height);
    }

    /// Writes this frame's uniforms and records one draw, if the loop runs.
    pub fn draw<'a>(
        &'a mut self,
        queue: &wgpu::Queue,
        pipeline: &'a PointsPipeline,
        pass: &mut wgpu::RenderPass<'a>,
        viewport_size: [f32; 2],
    ) -> bool {
        let uniform = scene_uniform(&self.camera, viewport_size, self.point_size, self.min_point_px);

        let Self {
            render_loop, scene, ..
        } = self;
        let scene: &'a SceneGpu = scene;

        render_loop.tick(move || {
            queue.write_buffer(&scene.ubo, 0, bytemuck::bytes_of(&uniform));
            pipeline.draw(pass, scene);
        })
    }

    pub fn source(&self) -> &SourceRef {
        &self.source
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn sphere(&self) -> &BoundingSphere {
        &self.sphere
    }

    pub fn point_count(&self) -> usize {
        self.point_count
    }

    pub fn uses_vertex_colors(&self) -> bool {
        self.vertex_colors
    }

    pub fn frames(&self) -> u64 {
        self.render_loop.frames()
    }
}

impl Drop for ViewerSession {
    fn drop(&mut self) {
        self.render_loop.stop();
        self.scene.release();
        log::info!(
            "Session for {} released after {} frames",
            self.source,
            self.render_loop.frames()
        );
    }
}

pub fn viewport(size: winit::dpi::PhysicalSize<u32>) -> [f32; 2] {
    [size.width.max(1) as f32, size.height.max(1) as f32]
}

/// Per-frame uniform block from the current camera.
pub fn scene_uniform(
    camera: &Camera,
    viewport_size: [f32; 2],
    point_size: f32,
    min_point_px: f32,
) -> SceneUniform {
    SceneUniform {
        view: camera.view().to_cols_array_2d(),
        proj: camera.proj().to_cols_array_2d(),
        viewport_size,
        point_size,
        min_point_px,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    #[test]
    fn viewport_never_degenerates() {
        assert_eq!(viewport(winit::dpi::PhysicalSize::new(0, 0)), [1.0, 1.0]);
        assert_eq!(viewport(winit::dpi::PhysicalSize::new(920, 560)), [920.0, 560.0]);
    }

    #[test]
    fn uniform_places_the_center_mid_screen() {
        let mut cam = Camera::new(60f32.to_radians(), 920.0 / 560.0);
        cam.frame(
            &BoundingSphere {
                center: glam::Vec3::new(4.0, 5.0, 6.0),
                radius: 2.0,
            },
            1.2,
        );

        let u = scene_uniform(&cam, [920.0, 560.0], 0.008, 1.0);
        let view = glam::Mat4::from_cols_array_2d(&u.view);
        let proj = glam::Mat4::from_cols_array_2d(&u.proj);
        let clip = proj * view * Vec4::new(4.0, 5.0, 6.0, 1.0);
        let ndc = clip.truncate() / clip.w;

        assert!(ndc.x.abs() < 1e-4 && ndc.y.abs() < 1e-4);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
        assert_eq!(u.viewport_size, [920.0, 560.0]);
        assert_eq!(u.point_size, 0.008);
    }
}
