use anyhow::{Context, Result};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use spinegraph_core::Guide;
use std::path::Path;

/// Bounding box of the guide model, as exported next to the mesh.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GuideBounds {
    pub min: [f32; 3],
    pub max: [f32; 3],
    #[serde(default = "default_target_height")]
    pub target_height: f32,
}

fn default_target_height() -> f32 {
    Guide::REFERENCE_HEIGHT
}

impl GuideBounds {
    pub fn fit(&self) -> Result<Guide> {
        Guide::fit(Vec3::from(self.min), Vec3::from(self.max), self.target_height)
            .context("failed to fit guide bounds")
    }
}

pub async fn load_bounds(path: &Path) -> Result<GuideBounds> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read guide {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("failed to parse guide {}", path.display()))
}

/// Never fails: any problem falls back to the default guide.
pub async fn load_guide(path: Option<&Path>) -> Guide {
    let Some(path) = path else {
        return Guide::default();
    };
    match load_bounds(path).await.and_then(|b| b.fit()) {
        Ok(guide) => {
            tracing::info!(path = %path.display(), scale = guide.scale, "guide loaded");
            guide
        }
        Err(err) => {
            tracing::warn!(error = ?err, "using default guide");
            Guide::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn fits_bounds_from_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "min = [-1.0, 0.0, -1.0]\nmax = [1.0, 5.0, 1.0]").unwrap();
        let guide = load_guide(Some(file.path())).await;
        assert!((guide.scale - 0.5).abs() < 1e-6);
        assert_eq!(guide.height, 2.5);
    }

    #[tokio::test]
    async fn bad_or_missing_guide_is_default() {
        assert_eq!(load_guide(None).await, Guide::default());
        assert_eq!(
            load_guide(Some(Path::new("/nonexistent/guide.toml"))).await,
            Guide::default()
        );

        let mut flat = tempfile::NamedTempFile::new().unwrap();
        writeln!(flat, "min = [0.0, 1.0, 0.0]\nmax = [1.0, 1.0, 1.0]").unwrap();
        assert_eq!(load_guide(Some(flat.path())).await, Guide::default());
    }
}
