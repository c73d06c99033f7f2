use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

use crate::error::{Result, StackError};
use crate::pixels::PixelKind;
use crate::stack::{thread_pool, Executor, Sequential};

/// How slices of a volume are rendered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Storage kind of rendered slices.
    pub pixel_kind: PixelKind,
    /// Display range mapped linearly onto the full scale of `pixel_kind`. Without it,
    /// values are clamped into the target range.
    pub range: Option<[f64; 2]>,
    /// Worker threads per slice; 1 renders on the calling thread, 0 uses one per core.
    pub threads: usize,
    pub writable: bool,
}
impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            pixel_kind: PixelKind::U8,
            range: None,
            threads: 1,
            writable: false,
        }
    }
}
impl RenderConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()
    }
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
    /// Convenience for CLI arguments: parses inline JSON if it starts with `{`, otherwise reads a file.
    pub fn from_json_or_path(json_or_path: &str) -> Result<Self> {
        let json_or_path = json_or_path.trim();
        if json_or_path.starts_with('{') {
            Self::from_json(json_or_path)
        } else {
            Self::from_json_file(Path::new(json_or_path))
        }
    }

    /// Worker pool matching `threads`.
    pub fn executor(&self) -> Result<Arc<dyn Executor>> {
        Ok(match self.threads {
            1 => Arc::new(Sequential),
            n => Arc::new(thread_pool(n)?),
        })
    }

    pub fn validate(self) -> Result<Self> {
        if self.pixel_kind == PixelKind::Rgb {
            return Err(StackError::UnsupportedPixelKind(self.pixel_kind));
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_fields() {
        let config = RenderConfig::from_json(r#"{ "pixel_kind": "u16" }"#).unwrap();
        assert_eq!(
            config,
            RenderConfig {
                pixel_kind: PixelKind::U16,
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_full_config() {
        let config =
            RenderConfig::from_json_or_path(r#"{ "pixel_kind": "f32", "range": [0, 4096], "threads": 4, "writable": true }"#)
                .unwrap();
        assert_eq!(config.range, Some([0.0, 4096.0]));
        assert_eq!(config.threads, 4);
        assert!(config.writable);
        assert_eq!(config.executor().unwrap().parallelism(), 4);
        assert_eq!(RenderConfig::default().executor().unwrap().parallelism(), 1);
    }

    #[test]
    fn test_rejects_rgb_and_garbage() {
        assert!(matches!(
            RenderConfig::from_json(r#"{ "pixel_kind": "rgb" }"#),
            Err(StackError::UnsupportedPixelKind(PixelKind::Rgb))
        ));
        assert!(matches!(RenderConfig::from_json("{ nope"), Err(StackError::Config(_))));
    }

    #[test]
    fn test_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("render.json");
        std::fs::write(&path, r#"{ "threads": 2 }"#).unwrap();
        let config = RenderConfig::from_json_or_path(path.to_str().unwrap()).unwrap();
        assert_eq!(config.threads, 2);
        assert_eq!(config.pixel_kind, PixelKind::U8);
    }
}
