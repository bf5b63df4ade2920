//! Screen manager configuration.

use crate::error::{Result, ScreenError};
use crate::resize::ResizeMode;
use panekit_layout::LayoutKind;
use serde::{Deserialize, Serialize};

/// Configuration for a [`ScreenManager`](crate::ScreenManager).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerConfig {
    /// Mode used when the manager resizes a screen on its own
    /// (explicit viewport assignment).
    pub resize_mode: ResizeMode,
    /// Z-index magnitude at which front/back moves recompress first.
    pub z_normalize_threshold: i32,
    /// Initial layout strategy.
    pub layout: LayoutKind,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            resize_mode: ResizeMode::PreserveContent,
            z_normalize_threshold: 1_000_000,
            layout: LayoutKind::Single,
        }
    }
}

impl ManagerConfig {
    /// Grid of `rows` x `cols` panes.
    #[must_use]
    pub fn tiled(rows: u16, cols: u16) -> Self {
        Self {
            layout: LayoutKind::grid(rows, cols),
            ..Default::default()
        }
    }

    /// Full-area tabs, switched with `set_active_screen`.
    #[must_use]
    pub fn tabbed() -> Self {
        Self {
            layout: LayoutKind::Tabbed,
            ..Default::default()
        }
    }

    /// Parse and validate a TOML document.
    ///
    /// ```
    /// use panekit_terminal::{LayoutKind, ManagerConfig};
    ///
    /// let config = ManagerConfig::from_toml_str(
    ///     "resize_mode = \"clear_content\"\n[layout]\ntype = \"grid\"\nrows = 2\ncols = 3\n",
    /// )
    /// .unwrap();
    /// assert_eq!(config.layout, LayoutKind::grid(2, 3));
    /// ```
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(source).map_err(|e| ScreenError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check the layout parameters and threshold.
    pub fn validate(&self) -> Result<()> {
        self.layout.validate()?;
        if self.z_normalize_threshold <= 0 {
            return Err(ScreenError::Config(format!(
                "z_normalize_threshold must be positive, got {}",
                self.z_normalize_threshold
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = ManagerConfig::default();
        assert_eq!(config.layout, LayoutKind::Single);
        assert_eq!(config.resize_mode, ResizeMode::PreserveContent);
        assert_eq!(config.z_normalize_threshold, 1_000_000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_presets() {
        assert_eq!(ManagerConfig::tiled(2, 2).layout, LayoutKind::grid(2, 2));
        assert_eq!(ManagerConfig::tabbed().layout, LayoutKind::Tabbed);
        assert_eq!(
            ManagerConfig::tabbed().resize_mode,
            ResizeMode::PreserveContent
        );
    }

    #[test]
    fn test_from_toml_empty_is_default() {
        let config = ManagerConfig::from_toml_str("").unwrap();
        assert_eq!(config, ManagerConfig::default());
    }

    #[test]
    fn test_from_toml_split() {
        let config = ManagerConfig::from_toml_str(
            r#"
            z_normalize_threshold = 64

            [layout]
            type = "split_vertical"
            ratio = 0.25
            spacing = 1
            "#,
        )
        .unwrap();
        assert_eq!(config.layout, LayoutKind::split_vertical(0.25, 1));
        assert_eq!(config.z_normalize_threshold, 64);
    }

    #[test]
    fn test_from_toml_grid_spacing_defaults() {
        let config = ManagerConfig::from_toml_str(
            r#"
            resize_mode = "scale_content"
            [layout]
            type = "grid"
            rows = 3
            cols = 1
            "#,
        )
        .unwrap();
        assert_eq!(config.layout, LayoutKind::grid(3, 1));
        assert_eq!(config.resize_mode, ResizeMode::ScaleContent);
    }

    #[test]
    fn test_from_toml_rejects_bad_layout() {
        let err = ManagerConfig::from_toml_str("[layout]\ntype = \"grid\"\nrows = 0\ncols = 2\n");
        assert!(matches!(err, Err(ScreenError::InvalidLayout(_))));

        let err = ManagerConfig::from_toml_str(
            "[layout]\ntype = \"split_horizontal\"\nratio = 1.5\n",
        );
        assert!(matches!(err, Err(ScreenError::InvalidLayout(_))));
    }

    #[test]
    fn test_from_toml_rejects_syntax_and_unknown_values() {
        assert!(matches!(
            ManagerConfig::from_toml_str("layout = ["),
            Err(ScreenError::Config(_))
        ));
        assert!(matches!(
            ManagerConfig::from_toml_str("resize_mode = \"stretch\""),
            Err(ScreenError::Config(_))
        ));
        assert!(matches!(
            ManagerConfig::from_toml_str("z_normalize_threshold = 0"),
            Err(ScreenError::Config(_))
        ));
    }

    #[test]
    fn test_toml_roundtrip_tabbed() {
        let text = toml::to_string(&ManagerConfig::tabbed()).unwrap();
        assert_eq!(ManagerConfig::from_toml_str(&text).unwrap(), ManagerConfig::tabbed());
    }
}
