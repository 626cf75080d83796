//! GPU-facing data layouts for the point renderer.

/// Per-instance data uploaded to the GPU vertex buffer.
/// Must match the instance inputs in `points.wgsl`.
#[repr(C)]
#[derive(Clone, Copy, Default, bytemuck::Pod, bytemuck::Zeroable, Debug)]
pub struct PointInstance {
    /// World-space position.
    pub position: [f32; 3],
    /// Linear RGB in [0, 1].
    pub color: [f32; 3],
}

/// Per-scene uniform buffer, std140-compatible.
/// Must match `SceneUniform` in `points.wgsl`.
#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SceneUniform {
    pub view: [[f32; 4]; 4],
    pub proj: [[f32; 4]; 4],
    /// Surface size in physical pixels.
    pub viewport_size: [f32; 2],
    /// Sprite edge in world units.
    pub point_size: f32,
    /// Lower bound on the projected sprite edge, pixels.
    pub min_point_px: f32,
}

const _: [(); 144] = [(); core::mem::size_of::<SceneUniform>()];

/// GPU resources of the scene owned by one session.
#[derive(Debug)]
pub struct SceneGpu {
    pub instances_len: u32,

    /// Vertex buffer containing `PointInstance` data.
    pub vtx: wgpu::Buffer,
    /// Uniform buffer containing `SceneUniform` data.
    pub ubo: wgpu::Buffer,
    /// Bind group connecting the UBO to the pipeline.
    pub bind: wgpu::BindGroup,
}

impl SceneGpu {
    /// Frees the buffers now rather than when the last handle drops.
    pub fn release(&self) {
        self.vtx.destroy();
        self.ubo.destroy();
    }
}
