//! Chimera scalar values: Scalar, Unit (plain numbers, px, ch, vw, vh, m, %, auto).

use std::fmt;

/// A length unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Unit {
    /// Unitless number, used as-is (e.g. `scale: 1.5`).
    None,
    /// Screen pixels.
    Px,
    /// Width of the `0` glyph.
    Ch,
    /// Percentage of the screen width.
    Vw,
    /// Percentage of the screen height.
    Vh,
    /// One world block.
    M,
    /// Percentage of the parent dimension.
    Percent,
    /// Auto-size (content-based).
    Auto,
}

impl Unit {
    /// The suffix written after the number in Chimera source.
    pub fn suffix(self) -> &'static str {
        match self {
            Unit::None | Unit::Auto => "",
            Unit::Px => "px",
            Unit::Ch => "ch",
            Unit::Vw => "vw",
            Unit::Vh => "vh",
            Unit::M => "m",
            Unit::Percent => "%",
        }
    }
}

/// A scalar value with a unit, e.g. `10px`, `1.5`, `50%`, `auto`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scalar {
    pub value: f32,
    pub unit: Unit,
}

impl Scalar {
    /// `0`
    pub const ZERO: Scalar = Scalar::number(0.0);
    /// `1`
    pub const ONE: Scalar = Scalar::number(1.0);
    /// The largest representable pixel length; used as an "unbounded" maximum.
    pub const MAX: Scalar = Scalar::px(f32::MAX);
    /// `auto`
    pub const AUTO: Scalar = Scalar {
        value: 0.0,
        unit: Unit::Auto,
    };

    /// Create a unitless scalar.
    pub const fn number(value: f32) -> Self {
        Self {
            value,
            unit: Unit::None,
        }
    }

    /// Create a scalar in pixels.
    pub const fn px(value: f32) -> Self {
        Self {
            value,
            unit: Unit::Px,
        }
    }

    /// Create a scalar in `ch` units.
    pub const fn ch(value: f32) -> Self {
        Self {
            value,
            unit: Unit::Ch,
        }
    }

    /// Create a scalar as a percentage.
    pub const fn percent(value: f32) -> Self {
        Self {
            value,
            unit: Unit::Percent,
        }
    }

    /// Create a scalar in viewport-width units.
    pub const fn vw(value: f32) -> Self {
        Self {
            value,
            unit: Unit::Vw,
        }
    }

    /// Create a scalar in viewport-height units.
    pub const fn vh(value: f32) -> Self {
        Self {
            value,
            unit: Unit::Vh,
        }
    }

    /// Create a scalar in world blocks.
    pub const fn m(value: f32) -> Self {
        Self {
            value,
            unit: Unit::M,
        }
    }

    /// Create an auto scalar.
    pub const fn auto() -> Self {
        Self::AUTO
    }

    /// Returns `true` if this scalar is auto-sized.
    pub fn is_auto(&self) -> bool {
        self.unit == Unit::Auto
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.unit == Unit::Auto {
            return write!(f, "auto");
        }
        if self.value.fract() == 0.0 && self.value.abs() < i64::MAX as f32 {
            write!(f, "{}{}", self.value as i64, self.unit.suffix())
        } else {
            write!(f, "{}{}", self.value, self.unit.suffix())
        }
    }
}

/// Four-sided scalar values (top, right, bottom, left) like `margin`/`padding`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScalarBox {
    pub top: Scalar,
    pub right: Scalar,
    pub bottom: Scalar,
    pub left: Scalar,
}

impl ScalarBox {
    /// A box with zero on all four sides.
    pub const ZERO: ScalarBox = ScalarBox::all(Scalar::ZERO);

    /// Create a box with the same scalar on all four sides.
    pub const fn all(v: Scalar) -> Self {
        Self {
            top: v,
            right: v,
            bottom: v,
            left: v,
        }
    }

    /// Create a box with symmetric vertical and horizontal values.
    pub const fn symmetric(vertical: Scalar, horizontal: Scalar) -> Self {
        Self {
            top: vertical,
            right: horizontal,
            bottom: vertical,
            left: horizontal,
        }
    }

    /// Create a box with explicit values for all four sides.
    pub const fn new(top: Scalar, right: Scalar, bottom: Scalar, left: Scalar) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }
}

impl fmt::Display for ScalarBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} {}", self.top, self.right, self.bottom, self.left)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_px() {
        let s = Scalar::px(10.0);
        assert_eq!(s.value, 10.0);
        assert_eq!(s.unit, Unit::Px);
        assert!(!s.is_auto());
        assert_eq!(s.to_string(), "10px");
    }

    #[test]
    fn test_scalar_fractional() {
        assert_eq!(Scalar::ch(2.5).to_string(), "2.5ch");
        assert_eq!(Scalar::number(1.5).to_string(), "1.5");
    }

    #[test]
    fn test_scalar_percent() {
        let s = Scalar::percent(50.0);
        assert_eq!(s.unit, Unit::Percent);
        assert_eq!(s.to_string(), "50%");
    }

    #[test]
    fn test_scalar_viewport_units() {
        assert_eq!(Scalar::vw(100.0).to_string(), "100vw");
        assert_eq!(Scalar::vh(80.0).to_string(), "80vh");
        assert_eq!(Scalar::m(3.0).to_string(), "3m");
    }

    #[test]
    fn test_scalar_auto() {
        let s = Scalar::auto();
        assert!(s.is_auto());
        assert_eq!(s.to_string(), "auto");
    }

    #[test]
    fn test_scalar_negative_and_zero() {
        assert_eq!(Scalar::px(-3.0).to_string(), "-3px");
        assert_eq!(Scalar::ZERO.to_string(), "0");
    }

    #[test]
    fn test_scalar_max_does_not_overflow_display() {
        let text = Scalar::MAX.to_string();
        assert!(text.ends_with("px"));
    }

    #[test]
    fn test_scalar_box_symmetric() {
        let b = ScalarBox::symmetric(Scalar::px(1.0), Scalar::px(2.0));
        assert_eq!(b.top, Scalar::px(1.0));
        assert_eq!(b.right, Scalar::px(2.0));
        assert_eq!(b.bottom, Scalar::px(1.0));
        assert_eq!(b.left, Scalar::px(2.0));
        assert_eq!(b.to_string(), "1px 2px 1px 2px");
    }

    #[test]
    fn test_scalar_box_new() {
        let b = ScalarBox::new(
            Scalar::px(1.0),
            Scalar::percent(50.0),
            Scalar::ch(2.0),
            Scalar::auto(),
        );
        assert_eq!(b.right, Scalar::percent(50.0));
        assert!(b.left.is_auto());
    }
}
