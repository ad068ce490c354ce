//! End-to-end checks of the library surface the frame loop is built on:
//! scene boot state, orbit updates, uniform staging and shader source
//! loading, all without a GPU.

use std::f32::consts::PI;
use std::io::Write;

use glam::Vec3;
use orbitview::render::{globals_layout, load_shader_source, stage_globals};
use orbitview::{SceneState, ShaderStage, UniformBlock};

#[test]
fn boot_scene_matches_documented_defaults() {
    let scene = SceneState::default();
    assert_eq!(scene.camera.position, Vec3::new(0.0, 0.0, 5.0));
    assert_eq!(scene.camera.target, Vec3::ZERO);
    assert_eq!(scene.camera.fov_degrees, 60.0);
    assert_eq!(scene.light_count, 1);
    assert!(scene.lights_orbit);
    assert_eq!(scene.orbit_radius, 2.0);
}

#[test]
fn two_light_boot_scenario_positions() {
    let mut scene = SceneState {
        light_count: 2,
        lights_orbit: true,
        orbit_radius: 2.0,
        ..SceneState::default()
    };

    scene.advance_lights(0.0);
    assert!((scene.light_transforms[0].position - Vec3::new(2.0, 0.0, 0.0)).length() < 1e-5);
    assert!((scene.light_transforms[1].position - Vec3::new(0.0, 0.0, -2.0)).length() < 1e-5);

    // A quarter period later both lights have advanced a quarter turn.
    scene.advance_lights(PI / 2.0);
    assert!((scene.light_transforms[0].position - Vec3::new(0.0, 0.0, -2.0)).length() < 1e-5);
    assert!((scene.light_transforms[1].position - Vec3::new(-2.0, 0.0, 0.0)).length() < 1e-5);
}

#[test]
fn staged_uniforms_follow_the_scene() {
    let mut scene = SceneState {
        light_count: 2,
        ..SceneState::default()
    };
    scene.advance_lights(0.0);

    let mut block = UniformBlock::new(globals_layout());
    stage_globals(&mut block, &scene);

    // Light slot 0 sits right after the camera/tint header.
    let light0: &[f32] = bytemuck::cast_slice(&block.bytes()[96..108]);
    assert!((light0[0] - 2.0).abs() < 1e-5);
    assert_eq!(&block.bytes()[240..244], &2u32.to_le_bytes());

    // A typo in a uniform name must neither crash nor disturb anything.
    let before = block.bytes().to_vec();
    block.set_f32("ambiant", 0.9);
    assert_eq!(block.bytes(), before.as_slice());
}

#[test]
fn shader_sources_load_from_disk() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "@fragment fn fs_main() -> @location(0) vec4<f32> {{").unwrap();
    writeln!(file, "    return vec4<f32>(1.0);").unwrap();
    writeln!(file, "}}").unwrap();

    let source = load_shader_source(ShaderStage::Fragment, file.path()).unwrap();
    assert!(source.contains("fs_main"));

    let missing = load_shader_source(ShaderStage::Vertex, std::path::Path::new("missing.wgsl"));
    assert!(missing.is_err());
}

#[test]
fn repo_shader_sources_are_present() {
    let shader_dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("assets/shaders");
    for name in [
        "lit.vert.wgsl",
        "lit.frag.wgsl",
        "unlit.vert.wgsl",
        "unlit.frag.wgsl",
    ] {
        let source = load_shader_source(ShaderStage::Vertex, &shader_dir.join(name)).unwrap();
        assert!(!source.is_empty(), "{name} is empty");
    }
}
