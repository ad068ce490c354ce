use glam::Vec3;

use crate::camera::{Camera, CameraController};
use crate::transform::Transform;

/// Fixed capacity of the light array; the UI selects how many are active.
pub const MAX_LIGHTS: usize = 4;

/// Scale applied to the unlit marker sphere drawn at each light.
pub const LIGHT_MARKER_SCALE: f32 = 0.35;

/// Colored point light. Its world position lives in the paired transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    pub color: Vec3,
}

impl Default for Light {
    fn default() -> Self {
        Self { color: Vec3::ONE }
    }
}

/// Global shading parameters shared by every lit shape in the scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub ambient_k: f32,
    pub diffuse_k: f32,
    pub specular_k: f32,
    pub shininess: f32,
    pub light_tint: Vec3,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            ambient_k: 0.2,
            diffuse_k: 0.5,
            specular_k: 0.5,
            shininess: 2.0,
            light_tint: Vec3::ONE,
        }
    }
}

/// Position of orbiting light `index` at `time`, on a circle of `radius` in
/// the XZ plane. Lights sit at quarter-turn phase offsets regardless of how
/// many are active, and complete one orbit every 2*pi time units. The height
/// is whatever the light already had.
pub fn orbit_position(index: usize, time: f32, radius: f32, prior_y: f32) -> Vec3 {
    let angle = index as f32 * (std::f32::consts::TAU / 4.0) + time;
    Vec3::new(angle.cos() * radius, prior_y, -angle.sin() * radius)
}

/// Everything the frame loop mutates, gathered into one value passed by
/// reference to the renderer and the settings panel.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneState {
    pub camera: Camera,
    pub controller: CameraController,
    pub background: Vec3,

    pub cube: Transform,
    pub plane: Transform,
    pub sphere: Transform,
    pub cylinder: Transform,

    pub lights: [Light; MAX_LIGHTS],
    pub light_transforms: [Transform; MAX_LIGHTS],
    pub light_count: usize,
    pub lights_orbit: bool,
    pub orbit_radius: f32,

    pub material: Material,

    pub emit_particles: bool,
    pub particles_per_second: f32,
    pub emitter_position: Vec3,
}

impl Default for SceneState {
    fn default() -> Self {
        Self {
            camera: Camera::default(),
            controller: CameraController::default(),
            background: Vec3::splat(0.1),

            cube: Transform::default(),
            plane: Transform::from_position(Vec3::new(0.0, -1.0, 0.0)),
            sphere: Transform::from_position(Vec3::new(-1.5, 0.0, 0.0)),
            cylinder: Transform::from_position(Vec3::new(1.5, 0.0, 0.0)),

            lights: [Light::default(); MAX_LIGHTS],
            light_transforms: [Transform::default(); MAX_LIGHTS],
            light_count: 1,
            lights_orbit: true,
            orbit_radius: 2.0,

            material: Material::default(),

            emit_particles: false,
            particles_per_second: 60.0,
            emitter_position: Vec3::new(0.0, 1.0, 0.0),
        }
    }
}

impl SceneState {
    /// Active lights as (transform, light) pairs, in index order.
    pub fn active_lights(&self) -> impl Iterator<Item = (&Transform, &Light)> {
        self.light_transforms
            .iter()
            .zip(self.lights.iter())
            .take(self.light_count.min(MAX_LIGHTS))
    }

    /// Recomputes the active lights' positions for `time` when orbiting is
    /// enabled, and pins the marker scale either way.
    pub fn advance_lights(&mut self, time: f32) {
        let count = self.light_count.min(MAX_LIGHTS);
        for index in 0..count {
            let transform = &mut self.light_transforms[index];
            if self.lights_orbit {
                transform.position =
                    orbit_position(index, time, self.orbit_radius, transform.position.y);
            }
            transform.scale = Vec3::splat(LIGHT_MARKER_SCALE);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn assert_vec3_near(actual: Vec3, expected: Vec3) {
        assert!(
            (actual - expected).length() < 1e-5,
            "{actual:?} != {expected:?}"
        );
    }

    #[test]
    fn orbit_formula_matches_reference() {
        let r = 2.0;
        for index in 0..MAX_LIGHTS {
            for time in [0.0, PI / 2.0, PI] {
                let position = orbit_position(index, time, r, 0.75);
                let angle = index as f32 * PI / 2.0 + time;
                assert_vec3_near(
                    position,
                    Vec3::new(r * angle.cos(), 0.75, -r * angle.sin()),
                );
            }
        }
    }

    #[test]
    fn boot_scenario_two_lights_at_time_zero() {
        let mut scene = SceneState {
            light_count: 2,
            lights_orbit: true,
            orbit_radius: 2.0,
            ..SceneState::default()
        };
        scene.advance_lights(0.0);

        assert_vec3_near(scene.light_transforms[0].position, Vec3::new(2.0, 0.0, 0.0));
        assert_vec3_near(
            scene.light_transforms[1].position,
            Vec3::new(0.0, 0.0, -2.0),
        );
    }

    #[test]
    fn orbit_preserves_height() {
        let mut scene = SceneState::default();
        scene.light_transforms[0].position.y = 1.5;
        scene.advance_lights(PI / 3.0);
        assert_eq!(scene.light_transforms[0].position.y, 1.5);
    }

    #[test]
    fn disabled_orbit_leaves_positions_but_pins_scale() {
        let mut scene = SceneState {
            lights_orbit: false,
            ..SceneState::default()
        };
        scene.light_transforms[0].position = Vec3::new(9.0, 9.0, 9.0);
        scene.advance_lights(1.0);
        assert_eq!(scene.light_transforms[0].position, Vec3::new(9.0, 9.0, 9.0));
        assert_eq!(
            scene.light_transforms[0].scale,
            Vec3::splat(LIGHT_MARKER_SCALE)
        );
    }

    #[test]
    fn inactive_lights_are_untouched() {
        let mut scene = SceneState {
            light_count: 1,
            ..SceneState::default()
        };
        scene.advance_lights(2.0);
        assert_eq!(scene.light_transforms[3].position, Vec3::ZERO);
        assert_eq!(scene.light_transforms[3].scale, Vec3::ONE);
    }

    #[test]
    fn defaults_match_boot_state() {
        let scene = SceneState::default();
        assert_eq!(scene.light_count, 1);
        assert!(scene.lights_orbit);
        assert_eq!(scene.orbit_radius, 2.0);
        assert_eq!(scene.background, Vec3::splat(0.1));
        assert_eq!(scene.plane.position, Vec3::new(0.0, -1.0, 0.0));
        assert_eq!(scene.sphere.position, Vec3::new(-1.5, 0.0, 0.0));
        assert_eq!(scene.cylinder.position, Vec3::new(1.5, 0.0, 0.0));
        assert_eq!(scene.material.shininess, 2.0);
    }
}
