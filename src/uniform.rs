use std::collections::HashMap;

use glam::{Mat4, Vec2, Vec3, Vec4};
use log::debug;

/// Scalar/vector/matrix classes a uniform slot can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniformKind {
    F32,
    I32,
    U32,
    Vec2,
    Vec3,
    Vec4,
    Mat4,
}

impl UniformKind {
    pub fn size(self) -> usize {
        match self {
            UniformKind::F32 | UniformKind::I32 | UniformKind::U32 => 4,
            UniformKind::Vec2 => 8,
            UniformKind::Vec3 => 12,
            UniformKind::Vec4 => 16,
            UniformKind::Mat4 => 64,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Slot {
    offset: usize,
    kind: UniformKind,
}

/// Name-to-offset map for one uniform buffer, built once per shader program.
///
/// Offsets are declared explicitly by the renderer so they always mirror the
/// WGSL struct layout; the map is the cache that replaces a by-name GPU
/// lookup on every set call.
#[derive(Debug, Clone, Default)]
pub struct UniformLayout {
    slots: HashMap<String, Slot>,
    size: usize,
}

impl UniformLayout {
    pub fn with_size(size: usize) -> Self {
        assert!(size % 16 == 0, "uniform block size must be 16-byte aligned");
        Self {
            slots: HashMap::new(),
            size,
        }
    }

    /// Registers `name` at `offset`. Panics if the slot overruns the block;
    /// layouts are fixed at startup so this is a programming error, not a
    /// runtime condition.
    pub fn slot(mut self, name: impl Into<String>, kind: UniformKind, offset: usize) -> Self {
        assert!(
            offset + kind.size() <= self.size,
            "uniform slot past end of block"
        );
        self.slots.insert(name.into(), Slot { offset, kind });
        self
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn contains(&self, name: &str) -> bool {
        self.slots.contains_key(name)
    }
}

/// CPU staging copy of a uniform buffer with GL-style setters by name.
///
/// Setting a name the layout does not declare is a silent no-op (surfaced at
/// debug level only) and leaves every other slot untouched.
#[derive(Debug, Clone)]
pub struct UniformBlock {
    layout: UniformLayout,
    bytes: Vec<u8>,
}

impl UniformBlock {
    pub fn new(layout: UniformLayout) -> Self {
        let bytes = vec![0; layout.size()];
        Self { layout, bytes }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn set_f32(&mut self, name: &str, value: f32) {
        self.write(name, UniformKind::F32, &value.to_le_bytes());
    }

    pub fn set_i32(&mut self, name: &str, value: i32) {
        self.write(name, UniformKind::I32, &value.to_le_bytes());
    }

    pub fn set_u32(&mut self, name: &str, value: u32) {
        self.write(name, UniformKind::U32, &value.to_le_bytes());
    }

    pub fn set_vec2(&mut self, name: &str, value: Vec2) {
        self.write(name, UniformKind::Vec2, bytemuck::bytes_of(&value.to_array()));
    }

    pub fn set_vec3(&mut self, name: &str, value: Vec3) {
        self.write(name, UniformKind::Vec3, bytemuck::bytes_of(&value.to_array()));
    }

    pub fn set_vec4(&mut self, name: &str, value: Vec4) {
        self.write(name, UniformKind::Vec4, bytemuck::bytes_of(&value.to_array()));
    }

    pub fn set_mat4(&mut self, name: &str, value: Mat4) {
        self.write(name, UniformKind::Mat4, bytemuck::bytes_of(&value.to_cols_array()));
    }

    fn write(&mut self, name: &str, kind: UniformKind, data: &[u8]) {
        match self.layout.slots.get(name) {
            Some(slot) if slot.kind == kind => {
                self.bytes[slot.offset..slot.offset + data.len()].copy_from_slice(data);
            }
            Some(slot) => {
                debug!(
                    "uniform {name} holds {:?}, ignoring {:?} write",
                    slot.kind, kind
                );
            }
            None => {
                debug!("uniform {name} not declared in this block, ignoring write");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_layout() -> UniformLayout {
        UniformLayout::with_size(96)
            .slot("view_proj", UniformKind::Mat4, 0)
            .slot("tint", UniformKind::Vec3, 64)
            .slot("intensity", UniformKind::F32, 76)
            .slot("count", UniformKind::U32, 80)
    }

    #[test]
    fn writes_land_at_declared_offsets() {
        let mut block = UniformBlock::new(test_layout());
        block.set_vec3("tint", Vec3::new(1.0, 0.5, 0.25));
        block.set_f32("intensity", 2.0);
        block.set_u32("count", 3);

        let bytes = block.bytes();
        assert_eq!(&bytes[64..68], &1.0f32.to_le_bytes());
        assert_eq!(&bytes[68..72], &0.5f32.to_le_bytes());
        assert_eq!(&bytes[72..76], &0.25f32.to_le_bytes());
        assert_eq!(&bytes[76..80], &2.0f32.to_le_bytes());
        assert_eq!(&bytes[80..84], &3u32.to_le_bytes());
    }

    #[test]
    fn unknown_name_is_inert() {
        let mut block = UniformBlock::new(test_layout());
        block.set_vec3("tint", Vec3::ONE);
        let before = block.bytes().to_vec();

        block.set_f32("does_not_exist", 42.0);
        block.set_mat4("also_missing", Mat4::IDENTITY);

        assert_eq!(block.bytes(), before.as_slice());
    }

    #[test]
    fn kind_mismatch_is_inert() {
        let mut block = UniformBlock::new(test_layout());
        block.set_f32("intensity", 5.0);
        let before = block.bytes().to_vec();

        // "tint" is a Vec3 slot; a matrix write must not clobber anything.
        block.set_mat4("tint", Mat4::IDENTITY);

        assert_eq!(block.bytes(), before.as_slice());
    }

    #[test]
    fn matrix_roundtrip() {
        let mut block = UniformBlock::new(test_layout());
        let m = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
        block.set_mat4("view_proj", m);
        let stored: &[f32] = bytemuck::cast_slice(&block.bytes()[0..64]);
        assert_eq!(stored, m.to_cols_array().as_slice());
    }

    #[test]
    #[should_panic]
    fn overflowing_slot_panics_at_build_time() {
        let _ = UniformLayout::with_size(16).slot("m", UniformKind::Mat4, 0);
    }
}
