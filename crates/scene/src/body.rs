//! A single celestial body: fixed orbital parameters plus the phase
//! accumulators advanced every frame.

use glam::{Mat4, Vec3};
use std::f32::consts::FRAC_PI_2;

/// One body of the system. The sun is a body with `orbit_radius = 0`,
/// which pins its position to the origin no matter how far its (unused)
/// orbit angle advances; update and draw treat all bodies uniformly.
///
/// All angles and angular speeds are in degrees; conversion to radians
/// happens only at the trigonometric/matrix call sites. The phase
/// accumulators grow without bound rather than wrapping modulo 360;
/// sine and cosine are periodic, so nothing downstream cares.
#[derive(Debug, Clone, PartialEq)]
pub struct CelestialBody {
    /// World position, derived. Recomputed from orbital state each
    /// update; `y` is never touched, so orbits stay in the XZ plane.
    pub position: Vec3,
    /// Distance from the system origin. Immutable after construction.
    pub orbit_radius: f32,
    /// Orbital angular speed in degrees/second. Immutable.
    pub orbit_speed: f32,
    /// Self-rotation speed in degrees/second. Immutable.
    pub rotation_speed: f32,
    /// Uniform mesh scale. Immutable.
    pub scale: f32,
    /// Accumulated orbital phase in degrees. Unbounded.
    pub orbit_angle: f32,
    /// Accumulated spin phase in degrees. Unbounded.
    pub rotation_angle: f32,
    /// World transform, derived. Recomputed every update.
    pub model_matrix: Mat4,
}

impl CelestialBody {
    /// The sun: pinned to the origin, spinning in place.
    pub fn sun(rotation_speed: f32, scale: f32) -> Self {
        Self::with_orbit(0.0, 0.0, rotation_speed, scale, 0.0)
    }

    /// An orbiting body starting at `orbit_angle` degrees along its circle.
    pub fn with_orbit(
        orbit_radius: f32,
        orbit_speed: f32,
        rotation_speed: f32,
        scale: f32,
        orbit_angle: f32,
    ) -> Self {
        let mut body = Self {
            position: Vec3::ZERO,
            orbit_radius,
            orbit_speed,
            rotation_speed,
            scale,
            orbit_angle,
            rotation_angle: 0.0,
            model_matrix: Mat4::IDENTITY,
        };
        // First update overwrites these; keep construction consistent anyway.
        body.advance(0.0);
        body
    }

    /// Advance orbital and spin phase by `dt` seconds and recompute the
    /// derived position and model matrix.
    ///
    /// `dt` is trusted as non-negative: no clamping or NaN guarding, so
    /// a frame-time spike visibly jumps the orbit. Accepted behavior.
    pub fn advance(&mut self, dt: f32) {
        self.orbit_angle += self.orbit_speed * dt;
        let orbit = self.orbit_angle.to_radians();
        self.position.x = self.orbit_radius * orbit.cos();
        self.position.z = self.orbit_radius * orbit.sin();

        self.rotation_angle += self.rotation_speed * dt;

        // Translation outermost so the body orbits the system origin,
        // then its own spin about local Y, then a fixed 90-degree Z
        // correction (the source plane mesh lies flat), innermost scale.
        self.model_matrix = Mat4::from_translation(self.position)
            * Mat4::from_rotation_y(self.rotation_angle.to_radians())
            * Mat4::from_rotation_z(FRAC_PI_2)
            * Mat4::from_scale(Vec3::splat(self.scale));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sun_stays_at_origin() {
        let mut sun = CelestialBody::sun(15.0, 1.5);
        for _ in 0..100 {
            sun.advance(0.37);
        }
        assert_eq!(sun.position, Vec3::ZERO);
    }

    #[test]
    fn phase_accumulates_linearly() {
        let mut body = CelestialBody::with_orbit(10.0, 40.0, 50.0, 1.0, 0.0);
        let steps = [0.1_f32, 0.25, 0.016, 1.0];
        for dt in steps {
            body.advance(dt);
        }
        let total: f32 = steps.iter().sum();
        assert!((body.orbit_angle - 40.0 * total).abs() < 1e-4);
        assert!((body.rotation_angle - 50.0 * total).abs() < 1e-4);
    }

    #[test]
    fn orbit_stays_on_its_circle() {
        let mut body = CelestialBody::with_orbit(20.0, 33.0, 10.0, 1.0, 72.0);
        for _ in 0..50 {
            body.advance(0.2);
        }
        let r2 = body.position.x * body.position.x + body.position.z * body.position.z;
        assert!((r2 - 400.0).abs() < 1e-2);
        assert_eq!(body.position.y, 0.0);
    }

    #[test]
    fn zero_step_changes_nothing() {
        let mut body = CelestialBody::with_orbit(5.0, 40.0, 50.0, 0.3, 144.0);
        body.advance(1.0);
        let before = body.clone();
        body.advance(0.0);
        assert_eq!(body, before);
    }

    #[test]
    fn one_second_step_matches_reference() {
        // orbit_radius=5, orbit_speed=40, starting at angle 0.
        let mut body = CelestialBody::with_orbit(5.0, 40.0, 50.0, 0.3, 0.0);
        body.advance(1.0);
        assert!((body.orbit_angle - 40.0).abs() < 1e-5);
        assert!((body.position.x - 3.830).abs() < 1e-2);
        assert_eq!(body.position.y, 0.0);
        assert!((body.position.z - 3.214).abs() < 1e-2);
    }

    #[test]
    fn model_matrix_places_mesh_at_orbit_position() {
        let mut body = CelestialBody::with_orbit(5.0, 40.0, 0.0, 2.0, 0.0);
        body.advance(1.0);
        let origin = body.model_matrix.transform_point3(Vec3::ZERO);
        assert!((origin - body.position).length() < 1e-4);
        // Uniform scale survives the rotation stack.
        let unit = body.model_matrix.transform_vector3(Vec3::X);
        assert!((unit.length() - 2.0).abs() < 1e-4);
    }
}
