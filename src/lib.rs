//! Core modules for the orbitview scene viewer.
//!
//! The crate exposes the scene state, procedural meshes, camera math and
//! renderer as a library so the pieces stay testable without a window or a
//! GPU.  Windowing, device setup and the frame loop live in the binary.

pub mod camera;
pub mod input;
pub mod mesh;
pub mod particles;
pub mod render;
pub mod scene;
pub mod transform;
pub mod ui;
pub mod uniform;

pub use camera::{Camera, CameraController};
pub use input::{InputState, Key};
pub use mesh::{
    create_cube, create_cylinder, create_plane, create_sphere, GeometryError, MeshData, Vertex,
};
pub use particles::{Particle, ParticlePool};
pub use render::{Renderer, ShaderError, ShaderProgram, ShaderStage};
pub use scene::{Light, Material, SceneState, LIGHT_MARKER_SCALE, MAX_LIGHTS};
pub use transform::Transform;
pub use uniform::{UniformBlock, UniformKind, UniformLayout};
