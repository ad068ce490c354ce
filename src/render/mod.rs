mod shader;
mod texture;

pub use shader::{link_pipeline, load_shader_source, ShaderError, ShaderProgram, ShaderStage};
pub use texture::Texture;

use std::num::NonZeroU64;
use std::path::Path;

use anyhow::{Context, Result};
use bytemuck::{Pod, Zeroable};
use glam::{Mat3, Mat4, Vec4};
use log::warn;
use wgpu::util::DeviceExt;

use crate::mesh::{create_cube, create_cylinder, create_plane, create_sphere, MeshData, Vertex};
use crate::particles::ParticlePool;
use crate::scene::{SceneState, MAX_LIGHTS};
use crate::uniform::{UniformBlock, UniformKind, UniformLayout};

/// Byte size of the lit program's global uniform block.
const GLOBALS_SIZE: usize = 256;

/// Scale of the unlit marker drawn for each live particle.
const PARTICLE_SCALE: f32 = 0.05;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth24Plus;

/// Name-to-offset interface of the global uniform block, mirroring the
/// `Globals` struct in the lit shader sources. Built once and cached inside
/// the renderer's staging block.
pub fn globals_layout() -> UniformLayout {
    let mut layout = UniformLayout::with_size(GLOBALS_SIZE)
        .slot("view_proj", UniformKind::Mat4, 0)
        .slot("camera_position", UniformKind::Vec3, 64)
        .slot("light_tint", UniformKind::Vec3, 80);
    for index in 0..MAX_LIGHTS {
        let base = 96 + index * 32;
        layout = layout
            .slot(format!("lights[{index}].position"), UniformKind::Vec3, base)
            .slot(format!("lights[{index}].color"), UniformKind::Vec3, base + 16);
    }
    layout
        .slot("ambient", UniformKind::F32, 224)
        .slot("diffuse", UniformKind::F32, 228)
        .slot("specular", UniformKind::F32, 232)
        .slot("shininess", UniformKind::F32, 236)
        .slot("light_count", UniformKind::U32, 240)
}

/// Stages the camera, light and material state into the uniform block.
/// Light slots beyond the active count keep their previous contents; the
/// shader never reads past `light_count`.
pub fn stage_globals(block: &mut UniformBlock, scene: &SceneState) {
    block.set_mat4("view_proj", scene.camera.view_projection());
    block.set_vec3("camera_position", scene.camera.position);
    block.set_vec3("light_tint", scene.material.light_tint);
    let mut active = 0;
    for (index, (transform, light)) in scene.active_lights().enumerate() {
        block.set_vec3(&format!("lights[{index}].position"), transform.position);
        block.set_vec3(&format!("lights[{index}].color"), light.color);
        active += 1;
    }
    block.set_f32("ambient", scene.material.ambient_k);
    block.set_f32("diffuse", scene.material.diffuse_k);
    block.set_f32("specular", scene.material.specular_k);
    block.set_f32("shininess", scene.material.shininess);
    block.set_u32("light_count", active as u32);
}

/// Draws the scene: lit shapes first, then unlit light markers and
/// particles, all into one pass over an externally acquired surface view.
pub struct Renderer {
    lit_pipeline: wgpu::RenderPipeline,
    unlit_pipeline: wgpu::RenderPipeline,
    globals_buffer: wgpu::Buffer,
    globals_block: UniformBlock,
    globals_bind_group: wgpu::BindGroup,
    object_layout: wgpu::BindGroupLayout,
    texture_bind_group: wgpu::BindGroup,
    _diffuse: Texture,
    depth: DepthBuffer,
    cube: MeshBuffers,
    plane: MeshBuffers,
    sphere: MeshBuffers,
    cylinder: MeshBuffers,
    light_marker: MeshBuffers,
}

impl Renderer {
    /// Compiles both shader programs, builds the shape meshes and uploads
    /// the diffuse texture. Any shader or geometry failure aborts
    /// construction; a missing texture degrades to a checkerboard with a
    /// warning.
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
        asset_dir: &Path,
    ) -> Result<Self> {
        let shader_dir = asset_dir.join("shaders");
        let lit = ShaderProgram::from_files(
            device,
            &shader_dir.join("lit.vert.wgsl"),
            &shader_dir.join("lit.frag.wgsl"),
        )
        .context("lit shader program")?;
        let unlit = ShaderProgram::from_files(
            device,
            &shader_dir.join("unlit.vert.wgsl"),
            &shader_dir.join("unlit.frag.wgsl"),
        )
        .context("unlit shader program")?;

        let globals_layout_gpu =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("globals-bind-layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: NonZeroU64::new(GLOBALS_SIZE as u64),
                    },
                    count: None,
                }],
            });

        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("texture-bind-layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let object_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("object-bind-layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: NonZeroU64::new(
                        std::mem::size_of::<ObjectConstants>() as u64
                    ),
                },
                count: None,
            }],
        });

        let lit_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("lit-pipeline-layout"),
                bind_group_layouts: &[&globals_layout_gpu, &texture_layout, &object_layout],
                push_constant_ranges: &[],
            });
        let unlit_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("unlit-pipeline-layout"),
                bind_group_layouts: &[&globals_layout_gpu, &object_layout],
                push_constant_ranges: &[],
            });

        let lit_pipeline =
            build_pipeline(device, "lit-pipeline", &lit_pipeline_layout, &lit, surface_format)
                .context("lit shader program")?;
        let unlit_pipeline = build_pipeline(
            device,
            "unlit-pipeline",
            &unlit_pipeline_layout,
            &unlit,
            surface_format,
        )
        .context("unlit shader program")?;

        let globals_block = UniformBlock::new(globals_layout());
        let globals_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("globals-uniform"),
            size: GLOBALS_SIZE as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let globals_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("globals-bind-group"),
            layout: &globals_layout_gpu,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: globals_buffer.as_entire_binding(),
            }],
        });

        let diffuse_path = asset_dir.join("textures").join("brick_color.jpg");
        let diffuse = match Texture::from_path(device, queue, &diffuse_path) {
            Ok(texture) => texture,
            Err(err) => {
                warn!("{err:#}; falling back to a checkerboard");
                Texture::checkerboard(device, queue)
            }
        };
        let texture_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("diffuse-bind-group"),
            layout: &texture_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&diffuse.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&diffuse.sampler),
                },
            ],
        });

        let cube = MeshBuffers::from_mesh(device, &create_cube(1.0)?, "cube");
        let plane = MeshBuffers::from_mesh(device, &create_plane(5.0, 5.0, 10)?, "plane");
        let sphere = MeshBuffers::from_mesh(device, &create_sphere(0.5, 64)?, "sphere");
        let cylinder = MeshBuffers::from_mesh(device, &create_cylinder(0.5, 1.0, 32)?, "cylinder");
        let light_marker = MeshBuffers::from_mesh(device, &create_sphere(0.5, 16)?, "light-marker");

        let depth = DepthBuffer::create(device, width, height);

        Ok(Self {
            lit_pipeline,
            unlit_pipeline,
            globals_buffer,
            globals_block,
            globals_bind_group,
            object_layout,
            texture_bind_group,
            _diffuse: diffuse,
            depth,
            cube,
            plane,
            sphere,
            cylinder,
            light_marker,
        })
    }

    /// Recreates the depth buffer for a new surface size.
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.depth = DepthBuffer::create(device, width, height);
    }

    /// Stages and uploads the frame's camera/light/material uniforms. Called
    /// before `advance_lights` so shading sees the pre-orbit positions, as
    /// the frame order requires.
    pub fn upload_globals(&mut self, queue: &wgpu::Queue, scene: &SceneState) {
        stage_globals(&mut self.globals_block, scene);
        queue.write_buffer(&self.globals_buffer, 0, self.globals_block.bytes());
    }

    /// Records and submits the scene pass.
    pub fn render(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        view: &wgpu::TextureView,
        scene: &SceneState,
        particles: &ParticlePool,
    ) {
        // Per-object bind groups are created up front so the pass can borrow
        // them for its whole lifetime.
        let shapes = [
            (&self.cube, &scene.cube),
            (&self.plane, &scene.plane),
            (&self.sphere, &scene.sphere),
            (&self.cylinder, &scene.cylinder),
        ];
        let shape_binds: Vec<wgpu::BindGroup> = shapes
            .iter()
            .map(|(_, transform)| {
                self.object_bind_group(device, transform.model_matrix(), Vec4::ONE)
            })
            .collect();

        let mut marker_binds: Vec<wgpu::BindGroup> = scene
            .active_lights()
            .map(|(transform, light)| {
                self.object_bind_group(device, transform.model_matrix(), light.color.extend(1.0))
            })
            .collect();
        for particle in particles.alive() {
            let model = Mat4::from_translation(particle.position)
                * Mat4::from_scale(glam::Vec3::splat(PARTICLE_SCALE));
            marker_binds.push(self.object_bind_group(device, model, particle.color));
        }

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("scene-encoder"),
        });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene-pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: f64::from(scene.background.x),
                            g: f64::from(scene.background.y),
                            b: f64::from(scene.background.z),
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            pass.set_pipeline(&self.lit_pipeline);
            pass.set_bind_group(0, &self.globals_bind_group, &[]);
            pass.set_bind_group(1, &self.texture_bind_group, &[]);
            for ((mesh, _), bind_group) in shapes.iter().zip(shape_binds.iter()) {
                pass.set_bind_group(2, bind_group, &[]);
                mesh.draw(&mut pass);
            }

            pass.set_pipeline(&self.unlit_pipeline);
            pass.set_bind_group(0, &self.globals_bind_group, &[]);
            for bind_group in &marker_binds {
                pass.set_bind_group(1, bind_group, &[]);
                self.light_marker.draw(&mut pass);
            }
        }
        queue.submit(std::iter::once(encoder.finish()));
    }

    fn object_bind_group(
        &self,
        device: &wgpu::Device,
        model: Mat4,
        color: Vec4,
    ) -> wgpu::BindGroup {
        let normal = Mat3::from_mat4(model).inverse().transpose();
        let constants = ObjectConstants {
            model: model.to_cols_array_2d(),
            normal: mat3_to_3x4(normal),
            color: color.to_array(),
        };
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("object-uniform"),
            contents: bytemuck::bytes_of(&constants),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("object-bind-group"),
            layout: &self.object_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        })
    }
}

/// Links one render pipeline; both programs share the vertex layout, alpha
/// blending and depth setup.
fn build_pipeline(
    device: &wgpu::Device,
    label: &str,
    layout: &wgpu::PipelineLayout,
    program: &ShaderProgram,
    surface_format: wgpu::TextureFormat,
) -> Result<wgpu::RenderPipeline, ShaderError> {
    let targets = [Some(wgpu::ColorTargetState {
        format: surface_format,
        blend: Some(wgpu::BlendState::ALPHA_BLENDING),
        write_mask: wgpu::ColorWrites::ALL,
    })];
    link_pipeline(
        device,
        &wgpu::RenderPipelineDescriptor {
            label: Some(label),
            layout: Some(layout),
            vertex: wgpu::VertexState {
                module: &program.vertex,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &VERTEX_LAYOUT,
            },
            fragment: Some(wgpu::FragmentState {
                module: &program.fragment,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &targets,
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: Default::default(),
                bias: Default::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        },
    )
}

const VERTEX_ATTRIBUTES: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
    0 => Float32x3,
    1 => Float32x3,
    2 => Float32x2,
];

const VERTEX_LAYOUT: [wgpu::VertexBufferLayout<'static>; 1] = [wgpu::VertexBufferLayout {
    array_stride: std::mem::size_of::<Vertex>() as u64,
    step_mode: wgpu::VertexStepMode::Vertex,
    attributes: &VERTEX_ATTRIBUTES,
}];

struct MeshBuffers {
    vertex: wgpu::Buffer,
    index: wgpu::Buffer,
    index_count: u32,
}

impl MeshBuffers {
    fn from_mesh(device: &wgpu::Device, mesh: &MeshData, label: &str) -> Self {
        let vertex = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label}-vertices")),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label}-indices")),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            vertex,
            index,
            index_count: mesh.indices.len() as u32,
        }
    }

    fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_vertex_buffer(0, self.vertex.slice(..));
        pass.set_index_buffer(self.index.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..self.index_count, 0, 0..1);
    }
}

struct DepthBuffer {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
}

impl DepthBuffer {
    fn create(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth-texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            _texture: texture,
            view,
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct ObjectConstants {
    model: [[f32; 4]; 4],
    normal: [[f32; 4]; 3],
    color: [f32; 4],
}

fn mat3_to_3x4(matrix: Mat3) -> [[f32; 4]; 3] {
    let cols = matrix.to_cols_array();
    [
        [cols[0], cols[1], cols[2], 0.0],
        [cols[3], cols[4], cols[5], 0.0],
        [cols[6], cols[7], cols[8], 0.0],
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::SceneState;
    use glam::Vec3;

    #[test]
    fn layout_declares_every_shader_slot() {
        let layout = globals_layout();
        assert_eq!(layout.size(), GLOBALS_SIZE);
        for name in [
            "view_proj",
            "camera_position",
            "light_tint",
            "ambient",
            "diffuse",
            "specular",
            "shininess",
            "light_count",
        ] {
            assert!(layout.contains(name), "missing slot {name}");
        }
        for index in 0..MAX_LIGHTS {
            assert!(layout.contains(&format!("lights[{index}].position")));
            assert!(layout.contains(&format!("lights[{index}].color")));
        }
    }

    #[test]
    fn staging_writes_active_lights_and_count() {
        let mut scene = SceneState {
            light_count: 2,
            ..SceneState::default()
        };
        scene.light_transforms[0].position = Vec3::new(2.0, 0.5, 0.0);
        scene.light_transforms[1].position = Vec3::new(0.0, 0.5, -2.0);
        scene.lights[1].color = Vec3::new(1.0, 0.0, 0.0);

        let mut block = UniformBlock::new(globals_layout());
        stage_globals(&mut block, &scene);
        let bytes = block.bytes();

        let light0: &[f32] = bytemuck::cast_slice(&bytes[96..108]);
        assert_eq!(light0, &[2.0, 0.5, 0.0]);
        let light1: &[f32] = bytemuck::cast_slice(&bytes[128..140]);
        assert_eq!(light1, &[0.0, 0.5, -2.0]);
        let light1_color: &[f32] = bytemuck::cast_slice(&bytes[144..156]);
        assert_eq!(light1_color, &[1.0, 0.0, 0.0]);
        assert_eq!(&bytes[240..244], &2u32.to_le_bytes());
    }

    #[test]
    fn staging_an_unknown_slot_is_harmless() {
        let mut block = UniformBlock::new(globals_layout());
        stage_globals(&mut block, &SceneState::default());
        let before = block.bytes().to_vec();

        block.set_f32("misspelled_uniform", 1.0);

        assert_eq!(block.bytes(), before.as_slice());
    }

    #[test]
    fn object_constants_match_wgsl_size() {
        // model (64) + normal as mat3x4 (48) + color (16).
        assert_eq!(std::mem::size_of::<ObjectConstants>(), 128);
    }
}
