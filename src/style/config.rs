//! Engine configuration.

/// Settings for a [`StyleEngine`](crate::style::StyleEngine).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Attribute holding an element's inline declarations.
    pub style_attribute: String,
    /// Recompute from the parent when a sibling-dependent rule is registered.
    pub sibling_invalidation: bool,
    /// Name attached to the engine's log events.
    pub source_name: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            style_attribute: "style".to_owned(),
            sibling_invalidation: true,
            source_name: None,
        }
    }
}

impl EngineConfig {
    /// Create a new default config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the inline style attribute name (builder).
    pub fn with_style_attribute(mut self, name: impl Into<String>) -> Self {
        self.style_attribute = name.into();
        self
    }

    /// Enable or disable sibling invalidation (builder).
    pub fn with_sibling_invalidation(mut self, enabled: bool) -> Self {
        self.sibling_invalidation = enabled;
        self
    }

    /// Set the diagnostic source name (builder).
    pub fn with_source_name(mut self, name: impl Into<String>) -> Self {
        self.source_name = Some(name.into());
        self
    }

    pub(crate) fn source(&self) -> &str {
        self.source_name.as_deref().unwrap_or("<engine>")
    }
}
