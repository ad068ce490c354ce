use std::f32::consts::{PI, TAU};

use bytemuck::{Pod, Zeroable};
use thiserror::Error;

/// Minimum radial/latitudinal segment count for a non-degenerate surface.
pub const MIN_SEGMENTS: u32 = 3;

/// Interleaved vertex layout shared by every generated mesh.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

/// CPU-side triangle mesh produced by the procedural generators.
///
/// Immutable after creation; the renderer uploads it once and only ever
/// binds and draws it afterwards.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

/// Rejected generator input that would produce degenerate triangles.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("{shape} needs at least {min} segments, got {got}")]
    TooFewSegments {
        shape: &'static str,
        min: u32,
        got: u32,
    },
    #[error("{shape} {param} must be positive and finite, got {got}")]
    BadDimension {
        shape: &'static str,
        param: &'static str,
        got: f32,
    },
}

fn check_dimension(shape: &'static str, param: &'static str, got: f32) -> Result<(), GeometryError> {
    if got.is_finite() && got > 0.0 {
        Ok(())
    } else {
        Err(GeometryError::BadDimension { shape, param, got })
    }
}

fn check_segments(shape: &'static str, min: u32, got: u32) -> Result<(), GeometryError> {
    if got >= min {
        Ok(())
    } else {
        Err(GeometryError::TooFewSegments { shape, min, got })
    }
}

/// Axis-aligned cube centered at the origin with edge length `size`.
pub fn create_cube(size: f32) -> Result<MeshData, GeometryError> {
    check_dimension("cube", "size", size)?;
    let h = size * 0.5;

    // Four vertices per face so each face keeps its own normal.
    // (normal, tangent toward +u, bitangent toward +v)
    let faces: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
        ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
        ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
        ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
        ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
    ];

    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);
    for (normal, tangent, bitangent) in faces {
        let n = glam::Vec3::from(normal);
        let t = glam::Vec3::from(tangent);
        let b = glam::Vec3::from(bitangent);
        let base = vertices.len() as u32;
        for (u, v) in [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)] {
            let position = n * h + t * (u - 0.5) * size + b * (v - 0.5) * size;
            vertices.push(Vertex {
                position: position.to_array(),
                normal,
                uv: [u, v],
            });
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    Ok(MeshData { vertices, indices })
}

/// Flat XZ plane centered at the origin, facing +Y, split into
/// `subdivisions`^2 quads.
pub fn create_plane(width: f32, depth: f32, subdivisions: u32) -> Result<MeshData, GeometryError> {
    check_dimension("plane", "width", width)?;
    check_dimension("plane", "depth", depth)?;
    check_segments("plane", 1, subdivisions)?;

    let cells = subdivisions;
    let stride = cells + 1;
    let mut vertices = Vec::with_capacity((stride * stride) as usize);
    for row in 0..stride {
        let v = row as f32 / cells as f32;
        let z = (v - 0.5) * depth;
        for col in 0..stride {
            let u = col as f32 / cells as f32;
            let x = (u - 0.5) * width;
            vertices.push(Vertex {
                position: [x, 0.0, z],
                normal: [0.0, 1.0, 0.0],
                uv: [u, 1.0 - v],
            });
        }
    }

    let mut indices = Vec::with_capacity((cells * cells * 6) as usize);
    for row in 0..cells {
        for col in 0..cells {
            let v0 = row * stride + col;
            let v1 = v0 + 1;
            let v2 = v0 + stride;
            let v3 = v2 + 1;
            indices.extend_from_slice(&[v0, v2, v1, v1, v2, v3]);
        }
    }

    Ok(MeshData { vertices, indices })
}

/// UV sphere built from `segments` latitude rings by `segments` longitude
/// slices.
pub fn create_sphere(radius: f32, segments: u32) -> Result<MeshData, GeometryError> {
    check_dimension("sphere", "radius", radius)?;
    check_segments("sphere", MIN_SEGMENTS, segments)?;

    let stride = segments + 1;
    let mut vertices = Vec::with_capacity((stride * stride) as usize);
    for ring in 0..stride {
        let v = ring as f32 / segments as f32;
        // Latitude sweeps pole to pole.
        let theta = v * PI;
        let y = -radius * theta.cos();
        let ring_radius = radius * theta.sin();
        for slice in 0..stride {
            let u = slice as f32 / segments as f32;
            let phi = u * TAU;
            let x = -ring_radius * phi.cos();
            let z = ring_radius * phi.sin();
            vertices.push(Vertex {
                position: [x, y, z],
                normal: [x / radius, y / radius, z / radius],
                uv: [u, 1.0 - v],
            });
        }
    }

    let mut indices = Vec::with_capacity((segments * segments * 6) as usize);
    for ring in 0..segments {
        for slice in 0..segments {
            let v0 = ring * stride + slice;
            let v1 = v0 + 1;
            let v2 = v0 + stride;
            let v3 = v2 + 1;
            indices.extend_from_slice(&[v0, v1, v2, v1, v3, v2]);
        }
    }

    Ok(MeshData { vertices, indices })
}

/// Capped cylinder around the Y axis with the given radius and height.
pub fn create_cylinder(radius: f32, height: f32, segments: u32) -> Result<MeshData, GeometryError> {
    check_dimension("cylinder", "radius", radius)?;
    check_dimension("cylinder", "height", height)?;
    check_segments("cylinder", MIN_SEGMENTS, segments)?;

    let half = height * 0.5;
    let stride = segments + 1;
    let mut vertices = Vec::new();
    let mut indices = Vec::new();

    // Side wall: two rings sharing outward normals.
    let side_base = vertices.len() as u32;
    for ring in 0..2 {
        let y = if ring == 0 { -half } else { half };
        for slice in 0..stride {
            let u = slice as f32 / segments as f32;
            let phi = u * TAU;
            let (sin, cos) = phi.sin_cos();
            vertices.push(Vertex {
                position: [radius * cos, y, radius * sin],
                normal: [cos, 0.0, sin],
                uv: [u, ring as f32],
            });
        }
    }
    for slice in 0..segments {
        let v0 = side_base + slice;
        let v1 = v0 + 1;
        let v2 = v0 + stride;
        let v3 = v2 + 1;
        indices.extend_from_slice(&[v0, v2, v1, v1, v2, v3]);
    }

    // Caps: a center vertex fanned out to its own ring so the normals stay
    // flat.
    for (y, ny) in [(half, 1.0f32), (-half, -1.0f32)] {
        let center = vertices.len() as u32;
        vertices.push(Vertex {
            position: [0.0, y, 0.0],
            normal: [0.0, ny, 0.0],
            uv: [0.5, 0.5],
        });
        let ring_base = vertices.len() as u32;
        for slice in 0..stride {
            let phi = slice as f32 / segments as f32 * TAU;
            let (sin, cos) = phi.sin_cos();
            vertices.push(Vertex {
                position: [radius * cos, y, radius * sin],
                normal: [0.0, ny, 0.0],
                uv: [cos * 0.5 + 0.5, sin * 0.5 + 0.5],
            });
        }
        for slice in 0..segments {
            let a = ring_base + slice;
            let b = a + 1;
            if ny > 0.0 {
                indices.extend_from_slice(&[center, b, a]);
            } else {
                indices.extend_from_slice(&[center, a, b]);
            }
        }
    }

    Ok(MeshData { vertices, indices })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_normals_unit(mesh: &MeshData) {
        for vertex in &mesh.vertices {
            let n = glam::Vec3::from(vertex.normal);
            assert!(
                (n.length() - 1.0).abs() < 1e-4,
                "non-unit normal {:?}",
                vertex.normal
            );
        }
    }

    fn assert_indices_in_range(mesh: &MeshData) {
        let count = mesh.vertices.len() as u32;
        assert_eq!(mesh.indices.len() % 3, 0);
        for &index in &mesh.indices {
            assert!(index < count);
        }
    }

    #[test]
    fn cube_has_per_face_vertices() {
        let mesh = create_cube(1.0).unwrap();
        assert_eq!(mesh.vertices.len(), 24);
        assert_eq!(mesh.indices.len(), 36);
        assert_normals_unit(&mesh);
        assert_indices_in_range(&mesh);
        for vertex in &mesh.vertices {
            for coord in vertex.position {
                assert!(coord.abs() <= 0.5 + 1e-6);
            }
        }
    }

    #[test]
    fn plane_vertex_and_index_counts() {
        let mesh = create_plane(5.0, 5.0, 10).unwrap();
        assert_eq!(mesh.vertices.len(), 11 * 11);
        assert_eq!(mesh.indices.len(), 10 * 10 * 6);
        assert_normals_unit(&mesh);
        assert_indices_in_range(&mesh);
    }

    #[test]
    fn sphere_vertex_and_index_counts() {
        let mesh = create_sphere(0.5, 8).unwrap();
        assert_eq!(mesh.vertices.len(), 9 * 9);
        assert_eq!(mesh.indices.len(), 8 * 8 * 6);
        assert_normals_unit(&mesh);
        assert_indices_in_range(&mesh);
        for vertex in &mesh.vertices {
            let r = glam::Vec3::from(vertex.position).length();
            assert!((r - 0.5).abs() < 1e-4);
        }
    }

    #[test]
    fn cylinder_counts_and_extents() {
        let segments = 16;
        let mesh = create_cylinder(0.5, 1.0, segments).unwrap();
        let stride = segments as usize + 1;
        // Two side rings plus two caps (center + ring each).
        assert_eq!(mesh.vertices.len(), 2 * stride + 2 * (stride + 1));
        assert_eq!(
            mesh.indices.len(),
            (segments as usize * 6) + 2 * (segments as usize * 3)
        );
        assert_normals_unit(&mesh);
        assert_indices_in_range(&mesh);
        for vertex in &mesh.vertices {
            assert!(vertex.position[1].abs() <= 0.5 + 1e-6);
        }
    }

    #[test]
    fn degenerate_segment_counts_are_rejected() {
        assert_eq!(
            create_sphere(1.0, 2),
            Err(GeometryError::TooFewSegments {
                shape: "sphere",
                min: MIN_SEGMENTS,
                got: 2
            })
        );
        assert!(create_cylinder(1.0, 1.0, 0).is_err());
        assert!(create_plane(1.0, 1.0, 0).is_err());
    }

    #[test]
    fn bad_dimensions_are_rejected() {
        assert!(create_cube(0.0).is_err());
        assert!(create_cube(f32::NAN).is_err());
        assert!(create_sphere(-1.0, 8).is_err());
        assert!(create_cylinder(0.5, -2.0, 8).is_err());
        assert!(create_plane(0.0, 1.0, 4).is_err());
    }
}
