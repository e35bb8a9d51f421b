//! Property identities and the static property registry.
//!
//! A [`Property<T>`] is a typed handle: its value type `T` is fixed at compile
//! time, so a `Value<T>` can only ever be stored against a property declared
//! with the same type. Storage inside a [`crate::css::property_set::PropertySet`]
//! is type-erased to [`PropertyValue`] and keyed by [`PropertyId`].

use std::fmt;

use crate::css::scalar::Scalar;
use crate::css::value::{Color, DisplayType};

// ---------------------------------------------------------------------------
// PropertyId / PropertyValue
// ---------------------------------------------------------------------------

/// Stable numeric identity of a registered property (its registration index).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PropertyId(u16);

impl PropertyId {
    /// The registry index of this property.
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Look up an id by registry index.
    pub fn from_index(index: usize) -> Option<Self> {
        REGISTRY.get(index).map(|info| info.id)
    }

    /// The registry entry for this id.
    pub fn info(self) -> &'static PropertyInfo {
        // Ids are only minted by the registry itself.
        &REGISTRY[self.index()]
    }

    /// Kebab-case key, e.g. `background-color`.
    pub fn key(self) -> &'static str {
        self.info().key
    }
}

impl fmt::Display for PropertyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A type-erased property payload, as produced by the value evaluator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PropertyValue {
    Color(Color),
    Bool(bool),
    Int(i32),
    Scalar(Scalar),
    Display(DisplayType),
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Color(c) => write!(f, "{c}"),
            PropertyValue::Bool(b) => write!(f, "{b}"),
            PropertyValue::Int(i) => write!(f, "{i}"),
            PropertyValue::Scalar(s) => write!(f, "{s}"),
            PropertyValue::Display(d) => write!(f, "{d}"),
        }
    }
}

/// Types that can be stored as a property value.
pub trait PropertyType: Clone + PartialEq + fmt::Debug + 'static {
    /// Erase into the registry's storage type.
    fn into_value(self) -> PropertyValue;

    /// Recover the typed value; `None` if the payload has another type.
    fn from_value(value: &PropertyValue) -> Option<Self>;
}

macro_rules! impl_property_type {
    ($ty:ty, $variant:ident) => {
        impl PropertyType for $ty {
            fn into_value(self) -> PropertyValue {
                PropertyValue::$variant(self)
            }

            fn from_value(value: &PropertyValue) -> Option<Self> {
                match value {
                    PropertyValue::$variant(v) => Some(*v),
                    _ => None,
                }
            }
        }
    };
}

impl_property_type!(Color, Color);
impl_property_type!(bool, Bool);
impl_property_type!(i32, Int);
impl_property_type!(Scalar, Scalar);
impl_property_type!(DisplayType, Display);

// ---------------------------------------------------------------------------
// Property / PropertyInfo
// ---------------------------------------------------------------------------

/// A typed property handle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Property<T> {
    id: PropertyId,
    key: &'static str,
    default: T,
    cascading: bool,
}

impl<T: Copy> Property<T> {
    const fn new(id: PropertyId, key: &'static str, default: T, cascading: bool) -> Self {
        Self {
            id,
            key,
            default,
            cascading,
        }
    }

    pub const fn id(&self) -> PropertyId {
        self.id
    }

    pub const fn key(&self) -> &'static str {
        self.key
    }

    /// The value used by `unset` and by consumers when the property is absent.
    pub const fn default_value(&self) -> T {
        self.default
    }

    /// Whether children inherit this property without declaring it.
    pub const fn is_cascading(&self) -> bool {
        self.cascading
    }
}

/// Type-erased registry entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PropertyInfo {
    pub id: PropertyId,
    pub key: &'static str,
    pub default: PropertyValue,
    pub cascading: bool,
}

/// The four longhands a rectangle shorthand (`margin: 1px 2px`) expands to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectProperty {
    pub key: &'static str,
    pub top: Property<Scalar>,
    pub right: Property<Scalar>,
    pub bottom: Property<Scalar>,
    pub left: Property<Scalar>,
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

macro_rules! properties {
    ($(
        $(#[$doc:meta])*
        $name:ident: $ty:ty [$variant:ident] = $default:expr, $key:literal,
            cascading = $cascading:literal;
    )*) => {
        #[allow(non_camel_case_types, clippy::upper_case_acronyms)]
        #[repr(u16)]
        enum Slot {
            $($name,)*
        }

        $(
            $(#[$doc])*
            pub const $name: Property<$ty> =
                Property::new(PropertyId(Slot::$name as u16), $key, $default, $cascading);
        )*

        static REGISTRY: &[PropertyInfo] = &[
            $(
                PropertyInfo {
                    id: PropertyId(Slot::$name as u16),
                    key: $key,
                    default: PropertyValue::$variant($default),
                    cascading: $cascading,
                },
            )*
        ];
    };
}

properties! {
    /// Text color.
    TEXT_COLOR: Color [Color] = Color::BLACK, "color", cascading = true;
    BACKGROUND_COLOR: Color [Color] = Color::TRANSPARENT, "background-color", cascading = false;
    BORDER_COLOR: Color [Color] = Color::BLACK, "border-color", cascading = false;
    OUTLINE_COLOR: Color [Color] = Color::BLACK, "outline-color", cascading = false;

    TEXT_SHADOW: bool [Bool] = false, "text-shadow", cascading = false;
    BOLD: bool [Bool] = false, "bold", cascading = false;
    ITALIC: bool [Bool] = false, "italic", cascading = false;
    UNDERLINED: bool [Bool] = false, "underlined", cascading = false;
    STRIKETHROUGH: bool [Bool] = false, "strikethrough", cascading = false;
    /// Minecraft's scrambled-glyph text effect.
    OBFUSCATED: bool [Bool] = false, "obfuscated", cascading = false;

    DISPLAY: DisplayType [Display] = DisplayType::Inline, "display", cascading = true;
    /// Uniform scale applied to the element and its content.
    SCALE: Scalar [Scalar] = Scalar::ONE, "scale", cascading = true;
    Z_INDEX: i32 [Int] = 0, "z-index", cascading = true;

    WIDTH: Scalar [Scalar] = Scalar::AUTO, "width", cascading = false;
    HEIGHT: Scalar [Scalar] = Scalar::AUTO, "height", cascading = false;
    MIN_WIDTH: Scalar [Scalar] = Scalar::ZERO, "min-width", cascading = false;
    MIN_HEIGHT: Scalar [Scalar] = Scalar::ZERO, "min-height", cascading = false;
    MAX_WIDTH: Scalar [Scalar] = Scalar::MAX, "max-width", cascading = false;
    MAX_HEIGHT: Scalar [Scalar] = Scalar::MAX, "max-height", cascading = false;

    BORDER_TOP: Scalar [Scalar] = Scalar::ZERO, "border-top", cascading = false;
    BORDER_RIGHT: Scalar [Scalar] = Scalar::ZERO, "border-right", cascading = false;
    BORDER_BOTTOM: Scalar [Scalar] = Scalar::ZERO, "border-bottom", cascading = false;
    BORDER_LEFT: Scalar [Scalar] = Scalar::ZERO, "border-left", cascading = false;

    OUTLINE_TOP: Scalar [Scalar] = Scalar::ZERO, "outline-top", cascading = false;
    OUTLINE_RIGHT: Scalar [Scalar] = Scalar::ZERO, "outline-right", cascading = false;
    OUTLINE_BOTTOM: Scalar [Scalar] = Scalar::ZERO, "outline-bottom", cascading = false;
    OUTLINE_LEFT: Scalar [Scalar] = Scalar::ZERO, "outline-left", cascading = false;

    PADDING_TOP: Scalar [Scalar] = Scalar::ZERO, "padding-top", cascading = false;
    PADDING_RIGHT: Scalar [Scalar] = Scalar::ZERO, "padding-right", cascading = false;
    PADDING_BOTTOM: Scalar [Scalar] = Scalar::ZERO, "padding-bottom", cascading = false;
    PADDING_LEFT: Scalar [Scalar] = Scalar::ZERO, "padding-left", cascading = false;

    MARGIN_TOP: Scalar [Scalar] = Scalar::ZERO, "margin-top", cascading = false;
    MARGIN_RIGHT: Scalar [Scalar] = Scalar::ZERO, "margin-right", cascading = false;
    MARGIN_BOTTOM: Scalar [Scalar] = Scalar::ZERO, "margin-bottom", cascading = false;
    MARGIN_LEFT: Scalar [Scalar] = Scalar::ZERO, "margin-left", cascading = false;
}

pub const MARGIN: RectProperty = RectProperty {
    key: "margin",
    top: MARGIN_TOP,
    right: MARGIN_RIGHT,
    bottom: MARGIN_BOTTOM,
    left: MARGIN_LEFT,
};

pub const PADDING: RectProperty = RectProperty {
    key: "padding",
    top: PADDING_TOP,
    right: PADDING_RIGHT,
    bottom: PADDING_BOTTOM,
    left: PADDING_LEFT,
};

pub const BORDER: RectProperty = RectProperty {
    key: "border",
    top: BORDER_TOP,
    right: BORDER_RIGHT,
    bottom: BORDER_BOTTOM,
    left: BORDER_LEFT,
};

pub const OUTLINE: RectProperty = RectProperty {
    key: "outline",
    top: OUTLINE_TOP,
    right: OUTLINE_RIGHT,
    bottom: OUTLINE_BOTTOM,
    left: OUTLINE_LEFT,
};

const RECTS: [RectProperty; 4] = [MARGIN, PADDING, BORDER, OUTLINE];

/// Every registered property, in id order.
pub fn all() -> &'static [PropertyInfo] {
    REGISTRY
}

/// Registry entry for an id.
pub fn info(id: PropertyId) -> &'static PropertyInfo {
    id.info()
}

/// Look up a longhand property by its key.
pub fn by_key(key: &str) -> Option<&'static PropertyInfo> {
    REGISTRY.iter().find(|info| info.key == key)
}

/// Look up a rectangle shorthand by its key.
pub fn rect_by_key(key: &str) -> Option<RectProperty> {
    RECTS.iter().find(|rect| rect.key == key).copied()
}
