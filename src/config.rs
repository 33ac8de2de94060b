use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::SqlContextError;

/// Marker that introduces a placeholder in SQL text.
pub const DEFAULT_MARKER: char = '@';

/// How positional binding reacts when placeholders and supplied values disagree in count.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum BindingMode {
    /// Bind pairwise up to the shorter side; extra names stay unbound, extra values are dropped.
    #[default]
    Permissive,
    /// Reject any count mismatch before binding anything.
    Strict,
}

/// Per-context options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextOptions {
    pub marker: char,
    pub binding: BindingMode,
}

impl Default for ContextOptions {
    fn default() -> Self {
        Self {
            marker: DEFAULT_MARKER,
            binding: BindingMode::Permissive,
        }
    }
}

impl ContextOptions {
    #[must_use]
    pub fn builder() -> ContextOptionsBuilder {
        ContextOptionsBuilder::default()
    }

    #[must_use]
    pub fn with_binding(mut self, binding: BindingMode) -> Self {
        self.binding = binding;
        self
    }
}

/// Fluent builder for [`ContextOptions`].
#[derive(Debug, Clone, Default)]
pub struct ContextOptionsBuilder {
    opts: ContextOptions,
}

impl ContextOptionsBuilder {
    #[must_use]
    pub fn marker(mut self, marker: char) -> Self {
        self.opts.marker = marker;
        self
    }

    #[must_use]
    pub fn binding(mut self, binding: BindingMode) -> Self {
        self.opts.binding = binding;
        self
    }

    /// Validate and return the options.
    ///
    /// # Errors
    ///
    /// Returns `SqlContextError::ConfigError` if the marker could itself be part of a
    /// placeholder name.
    pub fn finish(self) -> Result<ContextOptions, SqlContextError> {
        let marker = self.opts.marker;
        if marker.is_alphanumeric() || marker == '_' || marker == '-' || marker.is_whitespace() {
            return Err(SqlContextError::ConfigError(format!(
                "'{marker}' cannot be used as a placeholder marker"
            )));
        }
        Ok(self.opts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_permissive_at_sign() {
        let opts = ContextOptions::default();
        assert_eq!(opts.marker, '@');
        assert_eq!(opts.binding, BindingMode::Permissive);
    }

    #[test]
    fn builder_rejects_name_characters() {
        let err = ContextOptions::builder().marker('_').finish().unwrap_err();
        assert!(matches!(err, SqlContextError::ConfigError(_)));
        let opts = ContextOptions::builder()
            .marker(':')
            .binding(BindingMode::Strict)
            .finish()
            .unwrap();
        assert_eq!(opts.marker, ':');
        assert_eq!(opts.binding, BindingMode::Strict);
    }

    #[test]
    fn binding_mode_reads_from_json() {
        let opts: ContextOptions =
            serde_json::from_str(r#"{"marker":"$","binding":"strict"}"#).unwrap();
        assert_eq!(opts.binding, BindingMode::Strict);
        assert_eq!(opts.marker, '$');
    }
}
