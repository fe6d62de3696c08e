//! C header generator for sexp-probe
//!
//! Reads the tag numbering from `core/src/types.rs` and the exported symbols
//! from `core/src/ffi.rs`, and writes `include/debug.h`.

pub mod generator;
pub mod model;
pub mod parser;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use model::HeaderModel;

/// Workspace-relative source of the `SEXPTYPE` numbering
pub const TYPES_SOURCE: &str = "core/src/types.rs";
/// Workspace-relative source of the exported functions
pub const FFI_SOURCE: &str = "core/src/ffi.rs";
/// Workspace-relative output path
pub const HEADER_OUTPUT: &str = "include/debug.h";

/// Parse both sources under `root` into a model
pub fn build_model(root: &Path) -> Result<HeaderModel> {
    let types_path = root.join(TYPES_SOURCE);
    let types = std::fs::read_to_string(&types_path)
        .with_context(|| format!("Failed to read {}", types_path.display()))?;
    let ffi_path = root.join(FFI_SOURCE);
    let ffi = std::fs::read_to_string(&ffi_path)
        .with_context(|| format!("Failed to read {}", ffi_path.display()))?;

    Ok(HeaderModel {
        sources: vec![TYPES_SOURCE.to_string(), FFI_SOURCE.to_string()],
        type_tags: parser::parse_type_tags(&types)
            .with_context(|| format!("Failed to parse {}", types_path.display()))?,
        functions: parser::parse_exports(&ffi)
            .with_context(|| format!("Failed to parse {}", ffi_path.display()))?,
    })
}

/// Generated header text for the workspace at `root`
pub fn render_header(root: &Path) -> Result<String> {
    let model = build_model(root)?;
    generator::generate_c_header(&model).context("Failed to generate C header")
}

/// Write `include/debug.h`
pub fn generate(root: &Path) -> Result<PathBuf> {
    let header = render_header(root)?;
    let output = root.join(HEADER_OUTPUT);
    if let Some(dir) = output.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }
    std::fs::write(&output, header)
        .with_context(|| format!("Failed to write C header to {}", output.display()))?;
    Ok(output)
}

/// Whether `include/debug.h` matches what would be generated
pub fn check(root: &Path) -> Result<bool> {
    let fresh = render_header(root)?;
    let output = root.join(HEADER_OUTPUT);
    let existing = std::fs::read_to_string(&output)
        .with_context(|| format!("Failed to read {}", output.display()))?;
    Ok(fresh == existing)
}

/// Find the workspace root: the nearest ancestor with a `[workspace]`
/// Cargo.toml
pub fn find_workspace_root(start: &Path) -> Result<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        let cargo_toml = current.join("Cargo.toml");
        if let Ok(content) = std::fs::read_to_string(&cargo_toml) {
            if content.contains("[workspace]") {
                return Ok(current);
            }
        }
        if !current.pop() {
            anyhow::bail!("Could not find workspace root from {}", start.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn workspace_root() -> PathBuf {
        find_workspace_root(Path::new(env!("CARGO_MANIFEST_DIR"))).unwrap()
    }

    #[test]
    fn test_model_from_crate_sources() {
        let model = build_model(&workspace_root()).unwrap();

        assert_eq!(model.type_tags.len(), 27);
        assert_eq!(model.type_tags[0].name, "NILSXP");
        let free = model.type_tags.iter().find(|tag| tag.name == "FREESXP").unwrap();
        assert_eq!(free.value, 31);
        assert!(model.type_tags.iter().all(|tag| tag.value != 11 && tag.value != 12));

        let names: Vec<_> = model.functions.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["print", "inspect", "display"]);
        for func in &model.functions {
            assert_eq!(func.return_type.c_type, "const char*");
            assert_eq!(func.params.len(), 1);
            assert_eq!(func.params[0].ty.c_type, "SEXP");
        }
    }

    #[test]
    fn test_checked_in_header_is_current() {
        assert!(check(&workspace_root()).unwrap(), "run `header-gen generate`");
    }
}
