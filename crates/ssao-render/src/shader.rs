//! Shader compilation.
//!
//! Every pass combines the shared full-screen or geometry vertex stage with
//! its own fragment stage. Validation runs inside an error scope so a bad
//! shader is reported through `log` and the pass is skipped, instead of
//! aborting the process.

use crate::error::{RenderError, RenderResult};

/// Full-screen triangle vertex stage shared by the SSAO, blur and lighting passes.
pub const FULLSCREEN_WGSL: &str = include_str!("shaders/fullscreen.wgsl");

/// Runs `create` inside a validation error scope.
///
/// Returns the created object, or the validation message if wgpu rejected it.
pub fn validated<T>(device: &wgpu::Device, create: impl FnOnce() -> T) -> Result<T, String> {
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let value = create();
    match pollster::block_on(device.pop_error_scope()) {
        Some(error) => Err(error.to_string()),
        None => Ok(value),
    }
}

/// A validated shader module and its entry points.
pub struct ShaderProgram {
    module: wgpu::ShaderModule,
    label: String,
    vertex_entry: String,
    fragment_entry: String,
}

impl ShaderProgram {
    /// The compiled module.
    #[must_use]
    pub fn module(&self) -> &wgpu::ShaderModule {
        &self.module
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub fn vertex_entry(&self) -> &str {
        &self.vertex_entry
    }

    #[must_use]
    pub fn fragment_entry(&self) -> &str {
        &self.fragment_entry
    }
}

/// Builder for creating shader programs.
pub struct ShaderBuilder {
    vertex_source: Option<String>,
    fragment_source: Option<String>,
    vertex_entry: String,
    fragment_entry: String,
    label: Option<String>,
}

impl ShaderBuilder {
    /// Creates a new shader builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            vertex_source: None,
            fragment_source: None,
            vertex_entry: "vs_main".to_string(),
            fragment_entry: "fs_main".to_string(),
            label: None,
        }
    }

    /// Sets the vertex shader source (WGSL).
    #[must_use]
    pub fn with_vertex(mut self, source: impl Into<String>) -> Self {
        self.vertex_source = Some(source.into());
        self
    }

    /// Sets the fragment shader source (WGSL).
    #[must_use]
    pub fn with_fragment(mut self, source: impl Into<String>) -> Self {
        self.fragment_source = Some(source.into());
        self
    }

    /// Uses the shared full-screen triangle as the vertex stage.
    #[must_use]
    pub fn with_fullscreen_vertex(self) -> Self {
        self.with_vertex(FULLSCREEN_WGSL)
    }

    /// Sets the shader label for debugging.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Compiles and validates the combined source.
    ///
    /// Missing stages and validation failures both yield
    /// [`RenderError::ShaderCompilationFailed`] carrying the diagnostic text.
    pub fn build(self, device: &wgpu::Device) -> RenderResult<ShaderProgram> {
        let source = self.combined_source()?;
        let label = self.label.unwrap_or_else(|| "shader".to_string());

        let module = validated(device, || {
            device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(label.as_str()),
                source: wgpu::ShaderSource::Wgsl(source.into()),
            })
        })
        .map_err(|message| RenderError::ShaderCompilationFailed(format!("{label}: {message}")))?;

        Ok(ShaderProgram {
            module,
            label,
            vertex_entry: self.vertex_entry,
            fragment_entry: self.fragment_entry,
        })
    }

    fn combined_source(&self) -> RenderResult<String> {
        let vertex = self
            .vertex_source
            .as_ref()
            .ok_or_else(|| RenderError::ShaderCompilationFailed("missing vertex shader".into()))?;

        let fragment = self.fragment_source.as_ref().ok_or_else(|| {
            RenderError::ShaderCompilationFailed("missing fragment shader".into())
        })?;

        if vertex == fragment {
            return Ok(vertex.clone());
        }

        Ok(format!("{vertex}\n\n{fragment}"))
    }
}

impl Default for ShaderBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Compiles a vertex/fragment pair, logging the diagnostic on failure.
///
/// `None` means the program is unusable and the owning pass must skip its draw.
pub fn compile(
    device: &wgpu::Device,
    label: &str,
    vertex_source: &str,
    fragment_source: &str,
) -> Option<ShaderProgram> {
    let result = ShaderBuilder::new()
        .with_label(label)
        .with_vertex(vertex_source)
        .with_fragment(fragment_source)
        .build(device);
    match result {
        Ok(program) => Some(program),
        Err(err) => {
            log::error!("{err}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_uses_shared_entry_points() {
        let builder = ShaderBuilder::new();
        assert_eq!(builder.vertex_entry, "vs_main");
        assert_eq!(builder.fragment_entry, "fs_main");
        assert!(FULLSCREEN_WGSL.contains("fn vs_main"));
    }

    #[test]
    fn test_combined_source_requires_both_stages() {
        let builder = ShaderBuilder::new().with_vertex("fn a() {}");
        assert!(builder.combined_source().is_err());
    }

    #[test]
    fn test_combined_source_concatenates() {
        let builder = ShaderBuilder::new()
            .with_fullscreen_vertex()
            .with_fragment("@fragment fn fs_main() {}");
        let source = builder.combined_source().unwrap();
        assert!(source.starts_with(FULLSCREEN_WGSL));
        assert!(source.ends_with("@fragment fn fs_main() {}"));
    }

    #[test]
    fn test_same_source_is_not_duplicated() {
        let src = "@vertex fn vs_main() {}";
        let builder = ShaderBuilder::new().with_vertex(src).with_fragment(src);
        assert_eq!(builder.combined_source().unwrap(), src);
    }

    #[test]
    fn test_default_entry_points() {
        let builder = ShaderBuilder::default();
        assert_eq!(builder.vertex_entry, "vs_main");
        assert_eq!(builder.fragment_entry, "fs_main");
    }
}
