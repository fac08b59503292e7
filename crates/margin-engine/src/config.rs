//! Engine configuration

use crate::error::ConfigError;
use margin_document::OverlayStyle;
use margin_overlay::{RenderOptions, RenderOrder};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Engine configuration
///
/// Missing keys take their defaults when loaded from TOML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Delay between the applying and applied phases, in milliseconds
    pub commit_delay_ms: u64,
    /// Time allowed for the analysis collaborator, in seconds
    pub analysis_timeout_secs: u64,
    /// Reject ordinary edits while analysis mode is active
    pub lock_edits_while_active: bool,
    /// Highlight order of decorated views
    pub render_order: RenderOrder,
    /// Overlay class lists
    pub style: OverlayStyle,
}

impl EngineConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With commit delay
    #[inline]
    #[must_use]
    pub fn with_commit_delay(mut self, delay: Duration) -> Self {
        self.commit_delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// With analysis timeout
    #[inline]
    #[must_use]
    pub fn with_analysis_timeout(mut self, timeout: Duration) -> Self {
        self.analysis_timeout_secs = timeout.as_secs();
        self
    }

    /// With edit lock while active
    #[inline]
    #[must_use]
    pub fn with_edit_lock(mut self, lock: bool) -> Self {
        self.lock_edits_while_active = lock;
        self
    }

    /// With render order
    #[inline]
    #[must_use]
    pub fn with_render_order(mut self, order: RenderOrder) -> Self {
        self.render_order = order;
        self
    }

    /// With overlay style
    #[inline]
    #[must_use]
    pub fn with_style(mut self, style: OverlayStyle) -> Self {
        self.style = style;
        self
    }

    /// Commit delay as a duration
    #[inline]
    #[must_use]
    pub fn commit_delay(&self) -> Duration {
        Duration::from_millis(self.commit_delay_ms)
    }

    /// Analysis timeout as a duration
    #[inline]
    #[must_use]
    pub fn analysis_timeout(&self) -> Duration {
        Duration::from_secs(self.analysis_timeout_secs)
    }

    /// Options for the annotation renderer
    #[must_use]
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions::default()
            .with_order(self.render_order)
            .with_style(self.style.clone())
    }

    /// Parse from TOML
    ///
    /// # Errors
    /// Returns [`ConfigError::Parse`] for invalid TOML or unknown values.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Load from a TOML file
    ///
    /// # Errors
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            commit_delay_ms: 800,
            analysis_timeout_secs: 30,
            lock_edits_while_active: true,
            render_order: RenderOrder::EndPosDescending,
            style: OverlayStyle::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults() {
        let config = EngineConfig::new();
        assert_eq!(config.commit_delay(), Duration::from_millis(800));
        assert_eq!(config.analysis_timeout(), Duration::from_secs(30));
        assert!(config.lock_edits_while_active);
        assert_eq!(config.render_order, RenderOrder::EndPosDescending);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = EngineConfig::from_toml_str(
            r#"
            commit_delay_ms = 250
            render_order = "registry"

            [style]
            applied = "suggestion-applied bg-blue-100"
            "#,
        )
        .unwrap();
        assert_eq!(config.commit_delay_ms, 250);
        assert_eq!(config.render_order, RenderOrder::Registry);
        assert_eq!(config.style.applied, "suggestion-applied bg-blue-100");
        assert_eq!(config.style.applying, OverlayStyle::default().applying);
        assert_eq!(config.analysis_timeout_secs, 30);
    }

    #[test]
    fn invalid_toml_is_rejected() {
        assert!(matches!(
            EngineConfig::from_toml_str("commit_delay_ms = \"soon\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "lock_edits_while_active = false").unwrap();
        let config = EngineConfig::load(file.path()).unwrap();
        assert!(!config.lock_edits_while_active);

        let missing = EngineConfig::load(file.path().with_extension("missing"));
        assert!(matches!(missing, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn builders() {
        let config = EngineConfig::new()
            .with_commit_delay(Duration::from_millis(5))
            .with_analysis_timeout(Duration::from_secs(2))
            .with_edit_lock(false)
            .with_render_order(RenderOrder::Registry);
        assert_eq!(config.commit_delay_ms, 5);
        assert_eq!(config.analysis_timeout_secs, 2);
        assert_eq!(config.render_options().order, RenderOrder::Registry);
    }
}
