//! Shader program loading
//!
//! A program is a pair of WGSL files, `<name>.vert.wgsl` (entry `vs_main`)
//! and `<name>.frag.wgsl` (entry `fs_main`). When a `common.wgsl` sits next
//! to them it is prepended to both, so shared uniform blocks are declared
//! once.

use std::path::{Path, PathBuf};

use crate::error::ShaderError;

/// File prepended to every stage when present
pub const COMMON_SOURCE: &str = "common.wgsl";

/// Compiled vertex and fragment modules of one program
pub struct ShaderProgram {
    pub name: String,
    pub vertex: wgpu::ShaderModule,
    pub fragment: wgpu::ShaderModule,
}

/// Paths of the vertex and fragment sources of `name` under `dir`
pub fn stage_paths(dir: &Path, name: &str) -> (PathBuf, PathBuf) {
    (
        dir.join(format!("{name}.vert.wgsl")),
        dir.join(format!("{name}.frag.wgsl")),
    )
}

fn read_source(path: &Path) -> Result<String, ShaderError> {
    std::fs::read_to_string(path).map_err(|source| ShaderError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Joins the shared prelude and a stage source
pub fn assemble_source(common: Option<&str>, stage: &str) -> String {
    match common {
        Some(common) => format!("{common}\n{stage}"),
        None => stage.to_string(),
    }
}

/// Compiles a WGSL module, reporting validation errors instead of panicking
pub fn compile_module(
    device: &wgpu::Device,
    label: &str,
    source: &str,
) -> Result<wgpu::ShaderModule, ShaderError> {
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    });

    match pollster::block_on(device.pop_error_scope()) {
        None => Ok(module),
        Some(error) => Err(ShaderError::Compile {
            name: label.to_string(),
            message: error.to_string(),
        }),
    }
}

impl ShaderProgram {
    /// Reads and compiles both stages of `name` from `dir`
    ///
    /// # Arguments
    /// * `verbose` - Log the full compiler output on failure
    pub fn load(
        device: &wgpu::Device,
        dir: &Path,
        name: &str,
        verbose: bool,
    ) -> Result<Self, ShaderError> {
        let common_path = dir.join(COMMON_SOURCE);
        let common = if common_path.is_file() {
            Some(read_source(&common_path)?)
        } else {
            None
        };

        let (vertex_path, fragment_path) = stage_paths(dir, name);
        let vertex_source = assemble_source(common.as_deref(), &read_source(&vertex_path)?);
        let fragment_source = assemble_source(common.as_deref(), &read_source(&fragment_path)?);

        let compile = |stage: &str, source: &str| {
            compile_module(device, &format!("{name}.{stage}"), source).inspect_err(|err| {
                if verbose {
                    log::error!("{err}");
                } else {
                    log::error!("shader '{name}.{stage}' failed to compile (run with --verbose-shaders for details)");
                }
            })
        };

        let vertex = compile("vert", &vertex_source)?;
        let fragment = compile("frag", &fragment_source)?;
        log::info!("loaded shader program '{}'", name);

        Ok(Self {
            name: name.to_string(),
            vertex,
            fragment,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_paths() {
        let (vert, frag) = stage_paths(Path::new("resources/shaders"), "water");
        assert_eq!(vert, PathBuf::from("resources/shaders/water.vert.wgsl"));
        assert_eq!(frag, PathBuf::from("resources/shaders/water.frag.wgsl"));
    }

    #[test]
    fn test_assemble_source() {
        assert_eq!(assemble_source(None, "fn a() {}"), "fn a() {}");
        assert_eq!(assemble_source(Some("const X = 1;"), "fn a() {}"), "const X = 1;\nfn a() {}");
    }

    #[test]
    fn test_missing_source_is_io_error() {
        let result = read_source(Path::new("no/such/shader.vert.wgsl"));
        assert!(matches!(result, Err(ShaderError::Io { .. })));
    }
}
