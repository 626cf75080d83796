use crate::data::BoundingSphere;
use glam::{Mat4, Vec3};
use std::f32::consts::FRAC_PI_2;
use winit::event::{ElementState, MouseButton, WindowEvent};

#[derive(Debug, Clone)]
pub struct Camera {
    // --- Orbital Parameters (Primary State) ---
    /// The point the camera orbits and looks at.
    pub target: Vec3,
    /// Distance from the camera to the target. Fixed after framing.
    pub distance: f32,
    /// Rotation around the world Y axis (radians).
    pub yaw: f32,
    /// Elevation above the XZ plane (radians), kept strictly inside (-π/2, π/2).
    pub pitch: f32,

    // --- Derived Properties (Updated by `update()`) ---
    position: Vec3,

    // --- Projection ---
    /// Vertical field of view (radians).
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    /// Camera two units in front of the origin, looking at it.
    pub fn new(fov_y: f32, aspect: f32) -> Self {
        let mut camera = Self {
            target: Vec3::ZERO,
            distance: 2.0,
            yaw: 0.0,
            pitch: 0.0,
            position: Vec3::ZERO, // placeholder
            fov_y,
            aspect,
            near: 0.01,
            far: 5000.0,
        };

        camera.update();
        camera
    }

    /// Distance at which a sphere of `radius` fills the vertical field of view,
    /// scaled by `margin`.
    pub fn fit_distance(radius: f32, fov_y: f32, margin: f32) -> f32 {
        radius / (fov_y * 0.5).tan() * margin
    }

    /// Looks at the sphere center from the initial direction (+Z) at a
    /// distance where the whole sphere is visible.
    pub fn frame(&mut self, sphere: &BoundingSphere, margin: f32) {
        self.target = sphere.center;
        self.distance = Self::fit_distance(sphere.radius, self.fov_y, margin);
        self.yaw = 0.0;
        self.pitch = 0.0;

        // Depth range only has to cover the sphere, at any orbit angle.
        self.near = ((self.distance - sphere.radius) * 0.5).max(self.distance * 1e-4);
        self.far = (self.distance + sphere.radius) * 2.0;

        self.update();
    }

    /// Applies a drag delta (pixels) to yaw and pitch and re-places the camera
    /// on its orbit. The target never moves.
    pub fn orbit(&mut self, dx: f32, dy: f32, sensitivity: f32, pitch_epsilon: f32) {
        if dx == 0.0 && dy == 0.0 {
            return;
        }

        self.yaw += dx * sensitivity;
        self.pitch += dy * sensitivity;

        let limit = FRAC_PI_2 - pitch_epsilon.max(f32::EPSILON);
        self.pitch = self.pitch.clamp(-limit, limit);

        self.update();
    }

    /// Recalculates the position from the orbital parameters. Must be called
    /// after any orbital parameter changes.
    pub fn update(&mut self) {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();

        self.position = self.target
            + Vec3::new(
                self.distance * cos_pitch * sin_yaw,
                self.distance * sin_pitch,
                self.distance * cos_pitch * cos_yaw,
            );
    }

    #[inline]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn set_aspect(&mut self, width: u32, height: u32) {
        self.aspect = width.max(1) as f32 / height.max(1) as f32;
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    /// Right-handed perspective with wgpu's [0, 1] depth.
    pub fn proj(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far)
    }

    pub fn view_proj(&self) -> Mat4 {
        self.proj() * self.view()
    }
}

pub struct CameraController {
    mouse_down: bool,
    last_mouse: Option<(f64, f64)>,
    sensitivity: f32,
    pitch_epsilon: f32,
}

impl CameraController {
    pub fn new(sensitivity: f32, pitch_epsilon: f32) -> Self {
        Self {
            mouse_down: false,
            last_mouse: None,
            sensitivity,
            pitch_epsilon,
        }
    }

    /// Handles window events and updates the camera. Returns true when the
    /// camera changed.
    pub fn handle_event(&mut self, event: &WindowEvent, camera: &mut Camera) -> bool {
        match event {
            WindowEvent::MouseInput { button, state, .. } => {
                if *button == MouseButton::Left {
                    self.mouse_down = *state == ElementState::Pressed;
                }
                false
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.handle_cursor_orbit((position.x, position.y), camera)
            }
            WindowEvent::CursorLeft { .. } | WindowEvent::Focused(false) => {
                self.mouse_down = false;
                self.last_mouse = None;
                false
            }
            _ => false,
        }
    }

    /// Rotates the camera around the target while the left mouse button is held.
    pub fn handle_cursor_orbit(&mut self, xy: (f64, f64), camera: &mut Camera) -> bool {
        let mut moved = false;
        if let Some(last) = self.last_mouse {
            if self.mouse_down {
                let dx = (xy.0 - last.0) as f32;
                let dy = (xy.1 - last.1) as f32;
                camera.orbit(dx, dy, self.sensitivity, self.pitch_epsilon);
                moved = dx != 0.0 || dy != 0.0;
            }
        }
        self.last_mouse = Some(xy);
        moved
    }

    pub fn set_pressed(&mut self, pressed: bool) {
        self.mouse_down = pressed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SENS: f32 = 0.005;
    const EPS: f32 = 0.01;

    fn framed(radius: f32, fov: f32) -> Camera {
        let mut cam = Camera::new(fov, 920.0 / 560.0);
        cam.frame(
            &BoundingSphere {
                center: Vec3::new(1.0, -2.0, 3.0),
                radius,
            },
            1.2,
        );
        cam
    }

    #[test]
    fn framing_distance_matches_fov() {
        for &radius in &[1e-6f32, 0.5, 1.0, 37.0, 1200.0] {
            for &fov_deg in &[30.0f32, 45.0, 60.0, 90.0] {
                let fov = fov_deg.to_radians();
                let cam = framed(radius, fov);
                let expected = radius / (fov / 2.0).tan() * 1.2;
                assert!(
                    (cam.distance - expected).abs() <= expected * 1e-5,
                    "r={radius} fov={fov_deg}: {} vs {}",
                    cam.distance,
                    expected
                );
                let live = cam.position().distance(cam.target);
                assert!((live - cam.distance).abs() <= expected * 1e-4 + 1e-6);
            }
        }
    }

    #[test]
    fn initial_position_is_in_front_of_center() {
        let cam = framed(2.0, 60f32.to_radians());
        let p = cam.position();
        assert!((p.x - 1.0).abs() < 1e-5);
        assert!((p.y + 2.0).abs() < 1e-5);
        assert!((p.z - (3.0 + cam.distance)).abs() < 1e-4);
        assert!(cam.near > 0.0 && cam.near < cam.distance - 2.0);
        assert!(cam.far > cam.distance + 2.0);
    }

    #[test]
    fn zero_drag_is_a_no_op() {
        let mut cam = framed(1.0, 1.0);
        cam.orbit(40.0, -25.0, SENS, EPS);
        let (yaw, pitch, pos) = (cam.yaw, cam.pitch, cam.position());

        cam.orbit(0.0, 0.0, SENS, EPS);
        assert_eq!(cam.yaw, yaw);
        assert_eq!(cam.pitch, pitch);
        assert_eq!(cam.position(), pos);
    }

    #[test]
    fn orbit_follows_spherical_coordinates() {
        let mut cam = framed(1.0, 1.0);
        let target = cam.target;
        cam.orbit(100.0, 50.0, SENS, EPS);

        assert!((cam.yaw - 0.5).abs() < 1e-6);
        assert!((cam.pitch - 0.25).abs() < 1e-6);
        let r = cam.distance;
        let expected = target
            + Vec3::new(
                r * 0.25f32.cos() * 0.5f32.sin(),
                r * 0.25f32.sin(),
                r * 0.25f32.cos() * 0.5f32.cos(),
            );
        assert!(cam.position().abs_diff_eq(expected, 1e-4));
        assert_eq!(cam.target, target);
        assert!((cam.position().distance(target) - r).abs() < 1e-4);
    }

    #[test]
    fn pitch_stays_inside_the_poles() {
        let mut cam = framed(1.0, 1.0);
        let deltas = [1e6f32, -1e6, 3e4, 3e4, -7e5, 1e9, -1e9, 0.5, -0.5];
        for (i, &dy) in deltas.iter().cycle().take(200).enumerate() {
            cam.orbit(i as f32, dy, SENS, EPS);
            assert!(cam.pitch > -FRAC_PI_2 && cam.pitch < FRAC_PI_2);
            assert!(cam.position().is_finite());
        }
        cam.orbit(0.0, 1e9, SENS, EPS);
        assert!((cam.pitch - (FRAC_PI_2 - EPS)).abs() < 1e-6);
    }

    #[test]
    fn view_looks_at_target() {
        let mut cam = framed(3.0, 1.0);
        cam.orbit(-300.0, 120.0, SENS, EPS);
        let target_in_view = cam.view().transform_point3(cam.target);
        assert!(target_in_view.x.abs() < 1e-3);
        assert!(target_in_view.y.abs() < 1e-3);
        assert!(target_in_view.z < 0.0);
    }

    #[test]
    fn controller_only_orbits_while_pressed() {
        let mut cam = framed(1.0, 1.0);
        let mut ctl = CameraController::new(SENS, EPS);

        assert!(!ctl.handle_cursor_orbit((10.0, 10.0), &mut cam));
        assert!(!ctl.handle_cursor_orbit((50.0, 10.0), &mut cam));
        assert_eq!(cam.yaw, 0.0);

        ctl.set_pressed(true);
        assert!(ctl.handle_cursor_orbit((70.0, 30.0), &mut cam));
        assert!((cam.yaw - 20.0 * SENS).abs() < 1e-6);
        assert!((cam.pitch - 20.0 * SENS).abs() < 1e-6);

        ctl.set_pressed(false);
        assert!(!ctl.handle_cursor_orbit((90.0, 90.0), &mut cam));
        assert!((cam.yaw - 20.0 * SENS).abs() < 1e-6);
    }

    #[test]
    fn fresh_controller_waits_for_its_own_press() {
        let mut cam = framed(1.0, 1.0);
        let mut old = CameraController::new(SENS, EPS);
        old.set_pressed(true);
        old.handle_cursor_orbit((0.0, 0.0), &mut cam);

        // Button still held when the next session's controller takes over.
        let mut cam = framed(1.0, 1.0);
        let mut ctl = CameraController::new(SENS, EPS);
        assert!(!ctl.handle_cursor_orbit((10.0, 10.0), &mut cam));
        assert!(!ctl.handle_cursor_orbit((60.0, 40.0), &mut cam));
        assert_eq!((cam.yaw, cam.pitch), (0.0, 0.0));

        ctl.handle_event(
            &WindowEvent::MouseInput {
                device_id: unsafe { winit::event::DeviceId::dummy() },
                state: ElementState::Pressed,
                button: MouseButton::Left,
            },
            &mut cam,
        );
        assert!(ctl.handle_cursor_orbit((70.0, 40.0), &mut cam));
        assert!((cam.yaw - 10.0 * SENS).abs() < 1e-6);
    }
}
