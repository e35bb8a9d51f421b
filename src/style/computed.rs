//! ComputedStyle: a typed, default-filled view of a resolved property set.
//!
//! Layout and rendering read styles through this struct instead of probing a
//! [`PropertySet`] property by property. Absent properties take the
//! registry default; `auto` becomes [`Scalar::AUTO`] for scalar properties.

use crate::css::property::{self, Property, PropertyType, RectProperty};
use crate::css::property_set::PropertySet;
use crate::css::scalar::{Scalar, ScalarBox};
use crate::css::value::{Color, DisplayType, ValueKind};

/// Text decoration flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextFlags {
    pub shadow: bool,
    pub bold: bool,
    pub italic: bool,
    pub underlined: bool,
    pub strikethrough: bool,
    pub obfuscated: bool,
}

/// Every registry property with a concrete value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComputedStyle {
    pub color: Color,
    pub background_color: Color,
    pub border_color: Color,
    pub outline_color: Color,
    pub text: TextFlags,
    pub display: DisplayType,
    pub scale: Scalar,
    pub z_index: i32,
    pub width: Scalar,
    pub height: Scalar,
    pub min_width: Scalar,
    pub min_height: Scalar,
    pub max_width: Scalar,
    pub max_height: Scalar,
    pub border: ScalarBox,
    pub outline: ScalarBox,
    pub padding: ScalarBox,
    pub margin: ScalarBox,
}

impl ComputedStyle {
    /// Build from a resolved set.
    pub fn from_set(set: &PropertySet) -> Self {
        Self {
            color: value_or_default(set, &property::TEXT_COLOR),
            background_color: value_or_default(set, &property::BACKGROUND_COLOR),
            border_color: value_or_default(set, &property::BORDER_COLOR),
            outline_color: value_or_default(set, &property::OUTLINE_COLOR),
            text: TextFlags {
                shadow: value_or_default(set, &property::TEXT_SHADOW),
                bold: value_or_default(set, &property::BOLD),
                italic: value_or_default(set, &property::ITALIC),
                underlined: value_or_default(set, &property::UNDERLINED),
                strikethrough: value_or_default(set, &property::STRIKETHROUGH),
                obfuscated: value_or_default(set, &property::OBFUSCATED),
            },
            display: value_or_default(set, &property::DISPLAY),
            scale: scalar(set, &property::SCALE),
            z_index: value_or_default(set, &property::Z_INDEX),
            width: scalar(set, &property::WIDTH),
            height: scalar(set, &property::HEIGHT),
            min_width: scalar(set, &property::MIN_WIDTH),
            min_height: scalar(set, &property::MIN_HEIGHT),
            max_width: scalar(set, &property::MAX_WIDTH),
            max_height: scalar(set, &property::MAX_HEIGHT),
            border: rect(set, &property::BORDER),
            outline: rect(set, &property::OUTLINE),
            padding: rect(set, &property::PADDING),
            margin: rect(set, &property::MARGIN),
        }
    }

    /// `display: none`
    pub fn is_hidden(&self) -> bool {
        self.display == DisplayType::None
    }
}

impl Default for ComputedStyle {
    fn default() -> Self {
        Self::from_set(&PropertySet::new())
    }
}

impl From<&PropertySet> for ComputedStyle {
    fn from(set: &PropertySet) -> Self {
        Self::from_set(set)
    }
}

fn value_or_default<T: PropertyType + Copy>(set: &PropertySet, property: &Property<T>) -> T {
    set.explicit(property)
        .unwrap_or_else(|| property.default_value())
}

fn scalar(set: &PropertySet, property: &Property<Scalar>) -> Scalar {
    match set.get(property).as_ref().map(|v| v.kind()) {
        Some(ValueKind::Explicit(value)) => *value,
        Some(ValueKind::Auto) => Scalar::AUTO,
        _ => property.default_value(),
    }
}

fn rect(set: &PropertySet, rect: &RectProperty) -> ScalarBox {
    ScalarBox::new(
        scalar(set, &rect.top),
        scalar(set, &rect.right),
        scalar(set, &rect.bottom),
        scalar(set, &rect.left),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::css::property::{BOLD, DISPLAY, MARGIN, TEXT_COLOR, WIDTH};
    use crate::css::value::Value;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_set_gives_defaults() {
        let style = ComputedStyle::default();
        assert_eq!(style.color, Color::BLACK);
        assert_eq!(style.background_color, Color::TRANSPARENT);
        assert_eq!(style.display, DisplayType::Inline);
        assert_eq!(style.scale, Scalar::ONE);
        assert!(style.width.is_auto());
        assert_eq!(style.max_width, Scalar::MAX);
        assert_eq!(style.margin, ScalarBox::ZERO);
        assert_eq!(style.text, TextFlags::default());
    }

    #[test]
    fn reads_explicit_and_auto() {
        let mut set = PropertySet::new();
        set.set(&TEXT_COLOR, Value::explicit(Color::RED));
        set.set(&BOLD, Value::explicit(true).important());
        set.set(&WIDTH, Value::auto());
        set.set(&DISPLAY, Value::explicit(DisplayType::None));
        let margin = ScalarBox::symmetric(Scalar::px(1.0), Scalar::px(2.0));
        set.set_rect(&MARGIN, Value::explicit(margin));

        let style = ComputedStyle::from(&set);
        assert_eq!(style.color, Color::RED);
        assert!(style.text.bold);
        assert!(style.width.is_auto());
        assert!(style.is_hidden());
        assert_eq!(style.margin.left, Scalar::px(2.0));
        assert_eq!(style.margin.top, Scalar::px(1.0));
    }
}
