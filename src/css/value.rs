//! Declared values: the `Value<T>` wrapper with its keyword kinds, plus the
//! primitive value types that are not scalars (`Color`, `DisplayType`).
//!
//! Values arrive from the expression evaluator already computed; this module
//! only tags them with the cascade keywords (`inherit`, `initial`, `unset`,
//! `auto`) and the `!important` flag.

use std::fmt;
use std::sync::Arc;

// ---------------------------------------------------------------------------
// Value
// ---------------------------------------------------------------------------

/// What a declaration says about a property.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueKind<T> {
    /// A concrete value.
    Explicit(T),
    /// `auto`: left for the layout engine to decide.
    Auto,
    /// `inherit`: take the parent's resolved value.
    Inherit,
    /// `initial`: take the value the default stylesheet gives this element.
    Initial,
    /// `unset`: take the property's declared default.
    Unset,
}

/// A declared property value with its importance flag.
///
/// The optional source text is kept for diagnostics only and does not take
/// part in equality.
#[derive(Debug, Clone)]
pub struct Value<T> {
    kind: ValueKind<T>,
    important: bool,
    source: Option<Arc<str>>,
}

impl<T> Value<T> {
    /// Wrap a value of the given kind.
    pub fn new(kind: ValueKind<T>) -> Self {
        Self {
            kind,
            important: false,
            source: None,
        }
    }

    /// An explicit value.
    pub fn explicit(value: T) -> Self {
        Self::new(ValueKind::Explicit(value))
    }

    /// `auto`
    pub fn auto() -> Self {
        Self::new(ValueKind::Auto)
    }

    /// `inherit`
    pub fn inherit() -> Self {
        Self::new(ValueKind::Inherit)
    }

    /// `initial`
    pub fn initial() -> Self {
        Self::new(ValueKind::Initial)
    }

    /// `unset`
    pub fn unset() -> Self {
        Self::new(ValueKind::Unset)
    }

    /// Mark this value `!important` (builder).
    pub fn important(mut self) -> Self {
        self.important = true;
        self
    }

    /// Set the importance flag (builder).
    pub fn with_important(mut self, important: bool) -> Self {
        self.important = important;
        self
    }

    /// Attach the source text this value was evaluated from (builder).
    pub fn with_source(mut self, source: impl Into<Arc<str>>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn kind(&self) -> &ValueKind<T> {
        &self.kind
    }

    pub fn is_important(&self) -> bool {
        self.important
    }

    /// The source text, if the evaluator recorded it.
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// The explicit value, if this is [`ValueKind::Explicit`].
    pub fn explicit_value(&self) -> Option<&T> {
        match &self.kind {
            ValueKind::Explicit(value) => Some(value),
            _ => None,
        }
    }

    /// `true` for `inherit`, `initial` and `unset`, which must be resolved
    /// against the style tree before they can be used.
    pub fn needs_resolution(&self) -> bool {
        matches!(
            self.kind,
            ValueKind::Inherit | ValueKind::Initial | ValueKind::Unset
        )
    }

    /// Convert the explicit payload, keeping kind, importance and source.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Value<U> {
        let kind = match self.kind {
            ValueKind::Explicit(value) => ValueKind::Explicit(f(value)),
            ValueKind::Auto => ValueKind::Auto,
            ValueKind::Inherit => ValueKind::Inherit,
            ValueKind::Initial => ValueKind::Initial,
            ValueKind::Unset => ValueKind::Unset,
        };
        Value {
            kind,
            important: self.important,
            source: self.source,
        }
    }

    /// Fallible variant of [`Value::map`].
    pub fn try_map<U>(self, f: impl FnOnce(T) -> Option<U>) -> Option<Value<U>> {
        let kind = match self.kind {
            ValueKind::Explicit(value) => ValueKind::Explicit(f(value)?),
            ValueKind::Auto => ValueKind::Auto,
            ValueKind::Inherit => ValueKind::Inherit,
            ValueKind::Initial => ValueKind::Initial,
            ValueKind::Unset => ValueKind::Unset,
        };
        Some(Value {
            kind,
            important: self.important,
            source: self.source,
        })
    }
}

impl<T: PartialEq> PartialEq for Value<T> {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.important == other.important
    }
}

impl<T: fmt::Display> fmt::Display for Value<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ValueKind::Explicit(value) => write!(f, "{value}")?,
            ValueKind::Auto => f.write_str("auto")?,
            ValueKind::Inherit => f.write_str("inherit")?,
            ValueKind::Initial => f.write_str("initial")?,
            ValueKind::Unset => f.write_str("unset")?,
        }
        if self.important {
            f.write_str(" !important")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Color
// ---------------------------------------------------------------------------

/// A packed ARGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    argb: u32,
}

impl Color {
    pub const TRANSPARENT: Color = Color::from_argb(0x0000_0000);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const GREEN: Color = Color::rgb(0, 128, 0);
    pub const BLUE: Color = Color::rgb(0, 0, 255);
    pub const YELLOW: Color = Color::rgb(255, 255, 0);
    pub const GRAY: Color = Color::rgb(128, 128, 128);

    /// Create a color from a packed `0xAARRGGBB` value.
    pub const fn from_argb(argb: u32) -> Self {
        Self { argb }
    }

    /// Create an opaque color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::argb(255, r, g, b)
    }

    /// Create a color from all four channels.
    pub const fn argb(a: u8, r: u8, g: u8, b: u8) -> Self {
        Self {
            argb: (a as u32) << 24 | (r as u32) << 16 | (g as u32) << 8 | b as u32,
        }
    }

    pub const fn packed(self) -> u32 {
        self.argb
    }

    pub const fn alpha(self) -> u8 {
        (self.argb >> 24) as u8
    }

    pub const fn red(self) -> u8 {
        (self.argb >> 16) as u8
    }

    pub const fn green(self) -> u8 {
        (self.argb >> 8) as u8
    }

    pub const fn blue(self) -> u8 {
        self.argb as u8
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.alpha() == 255 {
            write!(f, "#{:06x}", self.argb & 0x00ff_ffff)
        } else {
            write!(f, "#{:08x}", self.argb)
        }
    }
}

// ---------------------------------------------------------------------------
// DisplayType
// ---------------------------------------------------------------------------

/// The `display` property's keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DisplayType {
    Inline,
    Block,
    InlineBlock,
    Flex,
    None,
}

impl DisplayType {
    pub fn keyword(self) -> &'static str {
        match self {
            DisplayType::Inline => "inline",
            DisplayType::Block => "block",
            DisplayType::InlineBlock => "inline-block",
            DisplayType::Flex => "flex",
            DisplayType::None => "none",
        }
    }

    /// Look up a keyword, case-insensitively.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        [
            DisplayType::Inline,
            DisplayType::Block,
            DisplayType::InlineBlock,
            DisplayType::Flex,
            DisplayType::None,
        ]
        .into_iter()
        .find(|d| d.keyword().eq_ignore_ascii_case(keyword))
    }
}

impl fmt::Display for DisplayType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}
