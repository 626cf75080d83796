use crate::config::ViewerConfig;
use crate::data::types::{PointInstance, SceneGpu, SceneUniform};
use glam::Vec3;
use ply_text::PointSet;
use rayon::prelude::*;
use wgpu::util::DeviceExt;

/// Radius floor so single-point or coincident clouds still frame.
pub const MIN_RADIUS: f32 = 1e-6;

/// Sphere enclosing every position of a point set. Center is the bounding-box
/// center; radius the largest distance from it to any point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingSphere {
    pub center: Vec3,
    pub radius: f32,
}

impl BoundingSphere {
    pub fn from_positions(positions: &[f32]) -> Self {
        if positions.len() < 3 {
            return Self {
                center: Vec3::ZERO,
                radius: MIN_RADIUS,
            };
        }

        let (min, max) = positions
            .par_chunks_exact(3)
            .map(|p| {
                let v = Vec3::new(p[0], p[1], p[2]);
                (v, v)
            })
            .reduce(
                || (Vec3::splat(f32::INFINITY), Vec3::splat(f32::NEG_INFINITY)),
                |(a_min, a_max), (b_min, b_max)| (a_min.min(b_min), a_max.max(b_max)),
            );

        let center = (min + max) * 0.5;

        let r2_max = positions
            .par_chunks_exact(3)
            .map(|p| Vec3::new(p[0], p[1], p[2]).distance_squared(center))
            .reduce(|| 0.0f32, f32::max);

        Self {
            center,
            radius: r2_max.sqrt().max(MIN_RADIUS),
        }
    }
}

/// CPU side of a renderable cloud: positions as given, colors normalized to
/// [0, 1] when present, plus derived bounds.
#[derive(Debug, Clone)]
pub struct SceneData {
    pub positions: Vec<f32>,
    pub colors: Option<Vec<f32>>,
    pub sphere: BoundingSphere,
    pub flat_color: [f32; 3],
    pub point_size: f32,
}

impl SceneData {
    pub fn build(points: PointSet, cfg: &ViewerConfig) -> Self {
        let sphere = BoundingSphere::from_positions(&points.positions);
        let colors = points.colors.as_deref().map(normalize_colors);

        Self {
            positions: points.positions,
            colors,
            sphere,
            flat_color: cfg.flat_color,
            point_size: cfg.point_size,
        }
    }

    #[inline]
    pub fn point_count(&self) -> usize {
        self.positions.len() / 3
    }

    #[inline]
    pub fn uses_vertex_colors(&self) -> bool {
        self.colors.is_some()
    }

    /// Interleaves position and color per point; the flat color fills in when
    /// the cloud has none.
    pub fn instances(&self) -> Vec<PointInstance> {
        let flat = self.flat_color;
        match self.colors.as_deref() {
            Some(colors) => self
                .positions
                .par_chunks_exact(3)
                .zip(colors.par_chunks_exact(3))
                .map(|(p, c)| PointInstance {
                    position: [p[0], p[1], p[2]],
                    color: [c[0], c[1], c[2]],
                })
                .collect(),
            None => self
                .positions
                .par_chunks_exact(3)
                .map(|p| PointInstance {
                    position: [p[0], p[1], p[2]],
                    color: flat,
                })
                .collect(),
        }
    }

    /// Uploads the instance buffer and a per-scene uniform buffer.
    pub fn upload(
        &self,
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        uniform: &SceneUniform,
    ) -> SceneGpu {
        let mut instances = self.instances();
        let instances_len = instances.len() as u32;

        // wgpu rejects empty vertex buffer slices; keep one inert element.
        if instances.is_empty() {
            instances.push(PointInstance::default());
        }

        let vtx = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Point Instances"),
            contents: bytemuck::cast_slice(&instances),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let ubo = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Scene UBO"),
            contents: bytemuck::bytes_of(uniform),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Scene BindGroup"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: ubo.as_entire_binding(),
            }],
        });

        SceneGpu {
            instances_len,
            vtx,
            ubo,
            bind,
        }
    }
}

/// Bytes of the instance buffer `upload` creates for `count` points. Empty
/// clouds still get one inert element.
pub fn instance_buffer_size(count: usize) -> u64 {
    count.max(1) as u64 * std::mem::size_of::<PointInstance>() as u64
}

/// Whether `count` points fit in one vertex buffer under `max_buffer_size`
/// and in a single instanced draw.
pub fn fits_in_buffer(count: usize, max_buffer_size: u64) -> bool {
    count <= u32::MAX as usize && instance_buffer_size(count) <= max_buffer_size
}

/// Maps 8-bit channels onto [0, 1].
pub fn normalize_colors(colors: &[u8]) -> Vec<f32> {
    colors.iter().map(|&c| c as f32 / 255.0).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(positions: Vec<f32>, colors: Option<Vec<u8>>) -> PointSet {
        PointSet { positions, colors }
    }

    #[test]
    fn sphere_of_a_box_is_centered() {
        let s = BoundingSphere::from_positions(&[-1.0, -2.0, -3.0, 1.0, 2.0, 3.0, 0.0, 0.0, 0.0]);
        assert!(s.center.abs_diff_eq(Vec3::ZERO, 1e-6));
        assert!((s.radius - 14f32.sqrt()).abs() < 1e-5);
    }

    #[test]
    fn sphere_encloses_every_point() {
        let pts = [5.0, 1.0, 1.0, 6.0, 1.5, 0.0, 5.2, 3.0, 2.0, 7.0, 2.0, 1.0];
        let s = BoundingSphere::from_positions(&pts);
        for p in pts.chunks_exact(3) {
            let d = Vec3::new(p[0], p[1], p[2]).distance(s.center);
            assert!(d <= s.radius + 1e-5);
        }
    }

    #[test]
    fn degenerate_clouds_keep_a_positive_radius() {
        let single = BoundingSphere::from_positions(&[3.0, 4.0, 5.0]);
        assert_eq!(single.center, Vec3::new(3.0, 4.0, 5.0));
        assert!(single.radius > 0.0);

        let same = BoundingSphere::from_positions(&[1.0, 1.0, 1.0, 1.0, 1.0, 1.0]);
        assert_eq!(same.radius, MIN_RADIUS);

        let empty = BoundingSphere::from_positions(&[]);
        assert!(empty.radius > 0.0);
    }

    #[test]
    fn buffer_fit_respects_the_device_limit() {
        let limit = 256 * 1024 * 1024u64;
        let per_point = std::mem::size_of::<PointInstance>() as u64;
        assert_eq!(per_point, 24);

        let max_points = (limit / per_point) as usize;
        assert!(fits_in_buffer(max_points, limit));
        assert!(!fits_in_buffer(max_points + 1, limit));
        assert!(!fits_in_buffer(max_points + 16, limit));

        assert_eq!(instance_buffer_size(0), per_point);
        assert!(fits_in_buffer(0, per_point));
        assert!(!fits_in_buffer(0, per_point - 1));
        #[cfg(target_pointer_width = "64")]
        assert!(!fits_in_buffer(u32::MAX as usize + 1, u64::MAX));
    }

    #[test]
    fn colors_are_normalized() {
        assert_eq!(normalize_colors(&[0, 255, 51]), vec![0.0, 1.0, 0.2]);
    }

    #[test]
    fn instances_use_vertex_colors_when_present() {
        let cfg = ViewerConfig::default();
        let scene = SceneData::build(
            set(vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0], Some(vec![255, 0, 0, 0, 0, 255])),
            &cfg,
        );
        assert!(scene.uses_vertex_colors());

        let inst = scene.instances();
        assert_eq!(inst.len(), 2);
        assert_eq!(inst[0].color, [1.0, 0.0, 0.0]);
        assert_eq!(inst[1].position, [1.0, 1.0, 1.0]);
        assert_eq!(inst[1].color, [0.0, 0.0, 1.0]);
    }

    #[test]
    fn instances_fall_back_to_flat_color() {
        let cfg = ViewerConfig::default();
        let scene = SceneData::build(set(vec![0.0, 1.0, 2.0], None), &cfg);
        assert!(!scene.uses_vertex_colors());
        assert_eq!(scene.point_count(), 1);
        assert_eq!(scene.instances()[0].color, cfg.flat_color);
        assert_eq!(scene.point_size, cfg.point_size);
    }
}
