use std::path::Path;
use std::path::PathBuf;

use tracing::debug;
use tracing::warn;

use crate::backend::ShaderSource;
use crate::backend::ShaderStage;

pub const VERTEX_SHADER_FILE: &str = "default_vs.hlsl";
pub const PIXEL_SHADER_FILE: &str = "default_ps.hlsl";
const SHADER_DIR: &str = "shaders";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShaderPaths {
    pub vertex: PathBuf,
    pub pixel: PathBuf,
}

impl ShaderPaths {
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            vertex: dir.join(VERTEX_SHADER_FILE),
            pixel: dir.join(PIXEL_SHADER_FILE),
        }
    }

    /// Looks for `shaders/` under the working directory, then next to the
    /// executable, then in the crate sources.
    pub fn locate() -> Self {
        let mut roots = vec![PathBuf::from(SHADER_DIR)];
        if let Some(exe_dir) = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
        {
            roots.push(exe_dir.join(SHADER_DIR));
        }
        roots.push(Path::new(env!("CARGO_MANIFEST_DIR")).join(SHADER_DIR));
        Self::locate_in(&roots)
    }

    /// First root holding both shader files. Falls back to the first root so
    /// the compile step reports the missing file.
    pub fn locate_in(roots: &[PathBuf]) -> Self {
        for root in roots {
            let candidate = Self::in_dir(root);
            if candidate.vertex.is_file() && candidate.pixel.is_file() {
                debug!(root = %root.display(), "Found shaders");
                return candidate;
            }
        }
        let fallback = roots
            .first()
            .cloned()
            .unwrap_or_else(|| PathBuf::from(SHADER_DIR));
        warn!(
            root = %fallback.display(),
            "Shaders not found in any search root"
        );
        Self::in_dir(fallback)
    }

    pub fn sources(&self) -> [ShaderSource; 2] {
        [
            ShaderSource::new(&self.vertex, ShaderStage::Vertex),
            ShaderSource::new(&self.pixel, ShaderStage::Pixel),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_shaders(dir: &Path) {
        std::fs::write(dir.join(VERTEX_SHADER_FILE), "float4 main() : SV_POSITION { return 0; }")
            .unwrap();
        std::fs::write(dir.join(PIXEL_SHADER_FILE), "float4 main() : SV_TARGET { return 1; }")
            .unwrap();
    }

    #[test]
    fn picks_the_first_root_with_both_files() {
        let empty = tempfile::tempdir().unwrap();
        let half = tempfile::tempdir().unwrap();
        let full = tempfile::tempdir().unwrap();
        std::fs::write(half.path().join(VERTEX_SHADER_FILE), "").unwrap();
        write_shaders(full.path());

        let paths = ShaderPaths::locate_in(&[
            empty.path().to_path_buf(),
            half.path().to_path_buf(),
            full.path().to_path_buf(),
        ]);
        assert_eq!(paths, ShaderPaths::in_dir(full.path()));
    }

    #[test]
    fn falls_back_to_the_first_root() {
        let empty = tempfile::tempdir().unwrap();
        let paths = ShaderPaths::locate_in(&[empty.path().to_path_buf()]);
        assert_eq!(paths.vertex, empty.path().join(VERTEX_SHADER_FILE));
    }

    #[test]
    fn sources_use_main_and_shader_model_5() {
        let [vertex, pixel] = ShaderPaths::in_dir("x").sources();
        assert_eq!(vertex.entry_point, "main");
        assert_eq!(vertex.stage.target(), "vs_5_0");
        assert_eq!(pixel.stage.target(), "ps_5_0");
    }
}
