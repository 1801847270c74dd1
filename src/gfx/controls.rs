//! Orbit camera controls: drag to rotate, wheel to zoom.
//!
//! Pointer events accumulate pending deltas; `update` integrates them by one
//! fixed logical step per frame, keeping interaction speed independent of
//! where in the frame the events landed.

use glam::Vec3;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};

const ROTATE_SENS: f32 = 0.005; // radians per pixel
const ZOOM_SENS: f32 = 0.1;
const PITCH_LIMIT: f32 = 1.54; // just under 90 degrees
const MIN_RADIUS: f32 = 2.0;
const MAX_RADIUS: f32 = 400.0;
const AUTO_ROTATE_RATE: f32 = 0.004; // radians per step

pub struct OrbitControls {
    pub target: Vec3,
    pub auto_rotate: bool,
    yaw: f32,
    pitch: f32,
    radius: f32,
    dragging: bool,
    last_cursor: Option<(f64, f64)>,
    pending_yaw: f32,
    pending_pitch: f32,
    pending_zoom: f32,
}

impl OrbitControls {
    /// Derive the orbit pose from an initial eye position and target.
    pub fn from_eye(eye: Vec3, target: Vec3) -> Self {
        let offset = eye - target;
        let radius = offset.length().max(MIN_RADIUS);
        let yaw = offset.x.atan2(offset.z);
        let pitch = (offset.y / radius).clamp(-1.0, 1.0).asin();
        Self {
            target,
            auto_rotate: false,
            yaw,
            pitch,
            radius,
            dragging: false,
            last_cursor: None,
            pending_yaw: 0.0,
            pending_pitch: 0.0,
            pending_zoom: 0.0,
        }
    }

    /// Feed a window event; returns true if the event was used.
    pub fn handle_window_event(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::MouseInput {
                button: MouseButton::Left,
                state,
                ..
            } => {
                self.dragging = *state == ElementState::Pressed;
                if !self.dragging {
                    self.last_cursor = None;
                }
                true
            }
            WindowEvent::CursorMoved { position, .. } => {
                if self.dragging {
                    if let Some((lx, ly)) = self.last_cursor {
                        self.pending_yaw -= (position.x - lx) as f32 * ROTATE_SENS;
                        self.pending_pitch += (position.y - ly) as f32 * ROTATE_SENS;
                    }
                    self.last_cursor = Some((position.x, position.y));
                    true
                } else {
                    false
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let amount = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(p) => p.y as f32 / 40.0,
                };
                self.pending_zoom -= amount * ZOOM_SENS;
                true
            }
            _ => false,
        }
    }

    /// Advance the controls by one fixed logical step.
    pub fn update(&mut self, step: f32) {
        let mut yaw_delta = self.pending_yaw;
        if self.auto_rotate {
            yaw_delta += AUTO_ROTATE_RATE;
        }
        self.yaw += yaw_delta * step;
        self.pitch = (self.pitch + self.pending_pitch * step).clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.radius =
            (self.radius * (1.0 + self.pending_zoom * step)).clamp(MIN_RADIUS, MAX_RADIUS);
        self.pending_yaw = 0.0;
        self.pending_pitch = 0.0;
        self.pending_zoom = 0.0;
    }

    pub fn eye(&self) -> Vec3 {
        let (sy, cy) = self.yaw.sin_cos();
        let (sp, cp) = self.pitch.sin_cos();
        self.target + Vec3::new(sy * cp, sp, cy * cp) * self.radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_eye_round_trips_the_pose() {
        let eye = Vec3::new(10.0, 20.0, 100.0);
        let c = OrbitControls::from_eye(eye, Vec3::ZERO);
        assert!((c.eye() - eye).length() < 1e-3, "eye drifted: {:?}", c.eye());
    }

    #[test]
    fn update_without_input_is_stable() {
        let mut c = OrbitControls::from_eye(Vec3::new(10.0, 20.0, 100.0), Vec3::ZERO);
        let before = c.eye();
        for _ in 0..100 {
            c.update(1.0);
        }
        assert!((c.eye() - before).length() < 1e-3);
    }

    #[test]
    fn zoom_clamps_to_limits() {
        // positive pending zoom grows the radius, negative shrinks it
        let mut c = OrbitControls::from_eye(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO);
        for _ in 0..1000 {
            c.pending_zoom = 10.0;
            c.update(1.0);
        }
        assert!((c.eye().length() - MAX_RADIUS).abs() < 1e-2);
        for _ in 0..1000 {
            c.pending_zoom = -10.0;
            c.update(1.0);
        }
        assert!((c.eye().length() - MIN_RADIUS).abs() < 1e-2);
    }

    #[test]
    fn pitch_never_reaches_the_pole() {
        let mut c = OrbitControls::from_eye(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO);
        for _ in 0..10_000 {
            c.pending_pitch = 1.0;
            c.update(1.0);
        }
        let up = c.eye().normalize().y;
        assert!(up < 1.0, "eye collapsed onto the pole");
    }
}
