//! Engine configuration.
//!
//! Defaults reproduce the two charting host views: the compact canvas inside the tooth detail
//! modal and the larger standalone illustration dialog. A JSON file with the same shape can
//! override any of it.

use std::path::Path;

use anyhow::Context as _;

use crate::foundation::core::LogicalSize;
use crate::foundation::error::{AnnotateError, AnnotateResult};
use crate::geometry::layout::MaxSize;
use crate::history::DEFAULT_MAX_ENTRIES;
use crate::render::stroke::{StrokeColor, StrokeStyle, THICKNESS_MAX, THICKNESS_MIN};

/// Canonical export box. Composites are resampled to the largest size of the session's aspect
/// ratio that fits inside it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ExportConfig {
    /// Export box width in pixels.
    pub width: u32,
    /// Export box height in pixels.
    pub height: u32,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            width: 600,
            height: 1200,
        }
    }
}

/// Per-host-view layout and brush defaults.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct HostProfile {
    /// Taken off both container axes before fitting.
    pub padding: f64,
    /// Optional cap on the fitted logical size.
    #[serde(default)]
    pub max_size: Option<MaxSize>,
    /// Logical size used when the base image cannot be loaded.
    pub fallback_size: LogicalSize,
    /// Initial brush thickness.
    pub default_thickness: u32,
}

impl HostProfile {
    /// The inline canvas in the tooth detail modal.
    pub fn modal() -> Self {
        Self {
            padding: 16.0,
            max_size: None,
            fallback_size: LogicalSize {
                width: 300.0,
                height: 600.0,
            },
            default_thickness: 5,
        }
    }

    /// The standalone illustration dialog.
    pub fn dialog() -> Self {
        Self {
            padding: 20.0,
            max_size: Some(MaxSize {
                width: 800.0,
                height: 1000.0,
            }),
            fallback_size: LogicalSize {
                width: 400.0,
                height: 800.0,
            },
            default_thickness: 8,
        }
    }

    /// Initial brush for sessions opened in this host.
    pub fn default_style(&self, color: StrokeColor) -> StrokeStyle {
        StrokeStyle::new(color, self.default_thickness)
    }

    fn validate(&self, name: &str) -> AnnotateResult<()> {
        if !self.padding.is_finite() || self.padding < 0.0 {
            return Err(AnnotateError::validation(format!(
                "{name}.padding must be finite and >= 0"
            )));
        }
        LogicalSize::new(self.fallback_size.width, self.fallback_size.height).map_err(|e| {
            AnnotateError::validation(format!("{name}.fallback_size: {e}"))
        })?;
        if let Some(m) = self.max_size
            && (!m.width.is_finite() || !m.height.is_finite() || m.width <= 0.0 || m.height <= 0.0)
        {
            return Err(AnnotateError::validation(format!(
                "{name}.max_size must be finite and > 0"
            )));
        }
        if !(THICKNESS_MIN..=THICKNESS_MAX).contains(&self.default_thickness) {
            return Err(AnnotateError::validation(format!(
                "{name}.default_thickness must be within {THICKNESS_MIN}..={THICKNESS_MAX}"
            )));
        }
        Ok(())
    }
}

/// Which host view a session is opened in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostKind {
    /// Inline canvas in the tooth detail modal.
    Modal,
    /// Standalone illustration dialog.
    #[default]
    Dialog,
}

/// Top-level engine configuration.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Canonical export box.
    pub export: ExportConfig,
    /// Tooth detail modal profile.
    pub modal: HostProfile,
    /// Illustration dialog profile.
    pub dialog: HostProfile,
    /// Initial brush color for new sessions.
    pub default_color: StrokeColor,
    /// Snapshot cap per session, floor included.
    pub history_limit: usize,
    /// Pointer events retained while a session waits for its surface; later ones are dropped.
    pub pending_input_limit: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            export: ExportConfig::default(),
            modal: HostProfile::modal(),
            dialog: HostProfile::dialog(),
            default_color: StrokeColor::Blue,
            history_limit: DEFAULT_MAX_ENTRIES,
            pending_input_limit: 256,
        }
    }
}

impl EngineConfig {
    /// Load and validate a JSON configuration file. Missing fields take their defaults.
    pub fn from_path(path: impl AsRef<Path>) -> AnnotateResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        Self::from_json_str(&text)
    }

    /// Parse and validate configuration JSON.
    pub fn from_json_str(text: &str) -> AnnotateResult<Self> {
        let cfg: Self = serde_json::from_str(text)
            .map_err(|e| AnnotateError::validation(format!("config JSON: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Profile for a host view.
    pub fn profile(&self, host: HostKind) -> &HostProfile {
        match host {
            HostKind::Modal => &self.modal,
            HostKind::Dialog => &self.dialog,
        }
    }

    /// Check every field for usable values.
    pub fn validate(&self) -> AnnotateResult<()> {
        if self.export.width == 0 || self.export.height == 0 {
            return Err(AnnotateError::validation("export size must be > 0"));
        }
        if self.export.width > u32::from(u16::MAX) || self.export.height > u32::from(u16::MAX) {
            return Err(AnnotateError::validation("export size exceeds u16"));
        }
        if self.history_limit < 2 {
            return Err(AnnotateError::validation("history_limit must be >= 2"));
        }
        self.modal.validate("modal")?;
        self.dialog.validate("dialog")?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
