//! The fixed sun-plus-planets topology and its per-frame update.

use crate::body::CelestialBody;
use glam::Mat4;

/// Construction-time parameters for the system topology. Defaults
/// reproduce the demo scene: five planets spreading outward with slower
/// orbits, faster spins, and larger scales per index.
#[derive(Debug, Clone)]
pub struct SystemConfig {
    pub planet_count: usize,
    pub base_radius: f32,
    pub radius_increment: f32,
    /// Innermost orbital speed in degrees/second; falls off as
    /// `base_speed / (1 + i * 0.5)` with planet index. Deliberately not
    /// Kepler's law.
    pub base_speed: f32,
    pub base_rotation: f32,
    pub rotation_increment: f32,
    pub base_scale: f32,
    pub scale_increment: f32,
    pub sun_rotation_speed: f32,
    pub sun_scale: f32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            planet_count: 5,
            base_radius: 5.0,
            radius_increment: 15.0,
            base_speed: 40.0,
            base_rotation: 50.0,
            rotation_increment: 15.0,
            base_scale: 0.3,
            scale_increment: 0.15,
            sun_rotation_speed: 15.0,
            sun_scale: 1.5,
        }
    }
}

/// One sun and a fixed number of planets. The topology is established
/// at construction and never changes; bodies mutate only inside
/// [`SolarSystem::update`].
#[derive(Debug, Clone)]
pub struct SolarSystem {
    sun: CelestialBody,
    planets: Vec<CelestialBody>,
    /// Planet model matrices in construction order, rebuilt every
    /// update for the single instanced draw.
    instance_matrices: Vec<Mat4>,
}

impl SolarSystem {
    pub fn new(config: &SystemConfig) -> Self {
        log::info!(
            "initializing solar system with {} bodies",
            config.planet_count + 1
        );

        let sun = CelestialBody::sun(config.sun_rotation_speed, config.sun_scale);

        let spread = 360.0 / config.planet_count.max(1) as f32;
        let planets: Vec<CelestialBody> = (0..config.planet_count)
            .map(|i| {
                let i_f = i as f32;
                CelestialBody::with_orbit(
                    config.base_radius + i_f * config.radius_increment,
                    config.base_speed / (1.0 + i_f * 0.5),
                    config.base_rotation + i_f * config.rotation_increment,
                    config.base_scale + i_f * config.scale_increment,
                    i_f * spread,
                )
            })
            .collect();

        let instance_matrices = planets.iter().map(|p| p.model_matrix).collect();

        Self {
            sun,
            planets,
            instance_matrices,
        }
    }

    /// Advance the whole system by `dt` seconds: sun spin, then each
    /// planet in construction order, then the instance batch rebuilt in
    /// the same order. After this returns every model matrix reflects
    /// state exactly `dt` seconds later.
    pub fn update(&mut self, dt: f32) {
        self.sun.advance(dt);
        for (planet, slot) in self.planets.iter_mut().zip(&mut self.instance_matrices) {
            planet.advance(dt);
            *slot = planet.model_matrix;
        }
    }

    pub fn sun(&self) -> &CelestialBody {
        &self.sun
    }

    pub fn planets(&self) -> &[CelestialBody] {
        &self.planets
    }

    /// The per-planet model matrices for the instanced draw, in
    /// construction order.
    pub fn instance_matrices(&self) -> &[Mat4] {
        &self.instance_matrices
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_topology_matches_demo_constants() {
        let system = SolarSystem::new(&SystemConfig::default());
        assert_eq!(system.planets().len(), 5);

        let inner = &system.planets()[0];
        assert_eq!(inner.orbit_radius, 5.0);
        assert_eq!(inner.orbit_speed, 40.0);
        assert_eq!(inner.rotation_speed, 50.0);
        assert_eq!(inner.scale, 0.3);

        let outer = &system.planets()[4];
        assert_eq!(outer.orbit_radius, 65.0);
        assert!((outer.orbit_speed - 40.0 / 3.0).abs() < 1e-5);
    }

    #[test]
    fn initial_orbit_angles_evenly_spaced() {
        let system = SolarSystem::new(&SystemConfig::default());
        let angles: Vec<f32> = system.planets().iter().map(|p| p.orbit_angle).collect();
        assert_eq!(angles, vec![0.0, 72.0, 144.0, 216.0, 288.0]);
    }

    #[test]
    fn sun_pinned_to_origin_through_updates() {
        let mut system = SolarSystem::new(&SystemConfig::default());
        for _ in 0..60 {
            system.update(0.123);
        }
        assert_eq!(system.sun().position, glam::Vec3::ZERO);
        assert_eq!(system.sun().orbit_radius, 0.0);
    }

    #[test]
    fn update_accumulates_phases_additively() {
        let mut a = SolarSystem::new(&SystemConfig::default());
        let mut b = SolarSystem::new(&SystemConfig::default());
        a.update(0.5);
        a.update(0.5);
        b.update(1.0);
        for (pa, pb) in a.planets().iter().zip(b.planets()) {
            assert!((pa.orbit_angle - pb.orbit_angle).abs() < 1e-4);
            assert!((pa.rotation_angle - pb.rotation_angle).abs() < 1e-4);
        }
    }

    #[test]
    fn zero_update_is_identity() {
        let mut system = SolarSystem::new(&SystemConfig::default());
        system.update(1.7);
        let before: Vec<_> = system.planets().to_vec();
        let sun_before = system.sun().clone();
        system.update(0.0);
        assert_eq!(system.planets(), &before[..]);
        assert_eq!(*system.sun(), sun_before);
    }

    #[test]
    fn instance_batch_mirrors_planets_in_order() {
        let mut system = SolarSystem::new(&SystemConfig::default());
        system.update(0.42);
        let batch = system.instance_matrices();
        assert_eq!(batch.len(), system.planets().len());
        for (matrix, planet) in batch.iter().zip(system.planets()) {
            assert_eq!(*matrix, planet.model_matrix);
        }
    }

    #[test]
    fn planets_hold_their_radii() {
        let mut system = SolarSystem::new(&SystemConfig::default());
        for _ in 0..30 {
            system.update(0.05);
        }
        for planet in system.planets() {
            let r = (planet.position.x * planet.position.x
                + planet.position.z * planet.position.z)
                .sqrt();
            assert!((r - planet.orbit_radius).abs() < 1e-3);
        }
    }
}
