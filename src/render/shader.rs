use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Pipeline stage a shader source belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

/// Tagged shader failure. Construction fails instead of leaving an invalid
/// program around, so a failed stage can never be bound.
#[derive(Debug, Error)]
pub enum ShaderError {
    #[error("failed to read {stage} shader source {path}")]
    Io {
        stage: ShaderStage,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{stage} shader failed to compile:\n{log}")]
    Compile { stage: ShaderStage, log: String },
    #[error("shader program failed to link:\n{log}")]
    Link { log: String },
}

/// Reads one plain-text WGSL source file.
pub fn load_shader_source(stage: ShaderStage, path: &Path) -> Result<String, ShaderError> {
    std::fs::read_to_string(path).map_err(|source| ShaderError::Io {
        stage,
        path: path.to_path_buf(),
        source,
    })
}

/// A compiled vertex/fragment module pair ready for pipeline linking.
pub struct ShaderProgram {
    pub vertex: wgpu::ShaderModule,
    pub fragment: wgpu::ShaderModule,
}

impl ShaderProgram {
    /// Loads and compiles both stages from their source files.
    pub fn from_files(
        device: &wgpu::Device,
        vertex_path: &Path,
        fragment_path: &Path,
    ) -> Result<Self, ShaderError> {
        let vertex_source = load_shader_source(ShaderStage::Vertex, vertex_path)?;
        let fragment_source = load_shader_source(ShaderStage::Fragment, fragment_path)?;
        let vertex = compile_stage(
            device,
            ShaderStage::Vertex,
            &vertex_source,
            &vertex_path.display().to_string(),
        )?;
        let fragment = compile_stage(
            device,
            ShaderStage::Fragment,
            &fragment_source,
            &fragment_path.display().to_string(),
        )?;
        Ok(Self { vertex, fragment })
    }
}

/// Compiles one stage inside a validation error scope so a bad source
/// surfaces as a `Compile` error instead of a device panic.
fn compile_stage(
    device: &wgpu::Device,
    stage: ShaderStage,
    source: &str,
    label: &str,
) -> Result<wgpu::ShaderModule, ShaderError> {
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    });
    match pollster::block_on(device.pop_error_scope()) {
        Some(error) => Err(ShaderError::Compile {
            stage,
            log: error.to_string(),
        }),
        None => Ok(module),
    }
}

/// Creates a render pipeline inside a validation error scope; mismatched
/// stage interfaces or layouts surface as a `Link` error.
pub fn link_pipeline(
    device: &wgpu::Device,
    descriptor: &wgpu::RenderPipelineDescriptor<'_>,
) -> Result<wgpu::RenderPipeline, ShaderError> {
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let pipeline = device.create_render_pipeline(descriptor);
    match pollster::block_on(device.pop_error_scope()) {
        Some(error) => Err(ShaderError::Link {
            log: error.to_string(),
        }),
        None => Ok(pipeline),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_source_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "@vertex fn vs_main() {{}}").unwrap();
        let source = load_shader_source(ShaderStage::Vertex, file.path()).unwrap();
        assert!(source.contains("vs_main"));
    }

    #[test]
    fn missing_file_reports_stage_and_path() {
        let error =
            load_shader_source(ShaderStage::Fragment, Path::new("no/such/shader.wgsl"))
                .unwrap_err();
        match &error {
            ShaderError::Io { stage, path, .. } => {
                assert_eq!(*stage, ShaderStage::Fragment);
                assert!(path.ends_with("shader.wgsl"));
            }
            other => panic!("expected Io error, got {other:?}"),
        }
        let message = error.to_string();
        assert!(message.contains("fragment"));
    }
}
