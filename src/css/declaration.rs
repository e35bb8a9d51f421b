//! Inline declaration lists: `color: #ff0000; bold: true !important`.
//!
//! This is the text of an element's style attribute, in the form
//! [`PropertySet::to_inline_string`] writes it. Values are read according to
//! the declared type of their property; rectangle shorthands (`margin: 1px 2px`)
//! expand to their four longhands. A bad declaration is reported and skipped,
//! the rest of the list still applies.

use logos::Logos;

use crate::css::property::{self, PropertyValue, RectProperty};
use crate::css::property_set::PropertySet;
use crate::css::scalar::{Scalar, ScalarBox, Unit};
use crate::css::value::{Color, DisplayType, Value};

/// Errors from declaration parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeclarationError {
    #[error("unrecognized input {text:?} at byte {offset}")]
    InvalidToken { offset: usize, text: String },
    #[error("expected `name: value` at byte {offset}")]
    Malformed { offset: usize },
    #[error("unknown property `{0}`")]
    UnknownProperty(String),
    #[error("invalid value `{value}` for `{property}`")]
    InvalidValue { property: String, value: String },
}

/// Declaration token.
///
/// `#ff0000` lexes as [`Token::HexColor`] and `10px` as [`Token::Dimension`]
/// because the longest match wins.
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
#[logos(skip r"[ \t\n\r\f]+")]
enum Token {
    #[token("!important")]
    Important,

    /// `#rrggbb` or `#aarrggbb`.
    #[regex(r"#[0-9a-fA-F]{6}([0-9a-fA-F]{2})?")]
    HexColor,

    #[regex(r"-?[0-9]+(\.[0-9]+)?(px|ch|vw|vh|m|%)")]
    Dimension,

    #[regex(r"-?[0-9]+(\.[0-9]+)?")]
    Number,

    #[regex(r"[a-zA-Z_][a-zA-Z0-9_-]*")]
    Ident,

    #[token(":")]
    Colon,

    #[token(";")]
    Semicolon,
}

/// A token with its source slice.
#[derive(Debug, Clone, Copy)]
struct Lexeme<'a> {
    token: Option<Token>,
    text: &'a str,
    offset: usize,
}

impl Lexeme<'_> {
    fn is(&self, token: Token) -> bool {
        self.token == Some(token)
    }
}

/// Parse a declaration list. Returns every declaration that parsed, plus
/// one error per declaration that did not.
pub fn parse_declarations(text: &str) -> (PropertySet, Vec<DeclarationError>) {
    let mut set = PropertySet::new();
    let mut errors = Vec::new();
    let mut declaration: Vec<Lexeme<'_>> = Vec::new();

    let end = std::iter::once((Ok(Token::Semicolon), text.len()..text.len()));
    for (token, span) in Token::lexer(text).spanned().chain(end) {
        let lexeme = Lexeme {
            token: token.ok(),
            text: &text[span.clone()],
            offset: span.start,
        };
        if !lexeme.is(Token::Semicolon) {
            declaration.push(lexeme);
            continue;
        }
        if !declaration.is_empty() {
            if let Err(err) = apply(&mut set, &declaration) {
                errors.push(err);
            }
            declaration.clear();
        }
    }
    (set, errors)
}

fn apply(set: &mut PropertySet, lexemes: &[Lexeme<'_>]) -> Result<(), DeclarationError> {
    if let Some(bad) = lexemes.iter().find(|l| l.token.is_none()) {
        return Err(DeclarationError::InvalidToken {
            offset: bad.offset,
            text: bad.text.to_string(),
        });
    }
    let (name, rest) = match lexemes {
        [name, colon, rest @ ..] if name.is(Token::Ident) && colon.is(Token::Colon) => {
            (name.text, rest)
        }
        _ => {
            return Err(DeclarationError::Malformed {
                offset: lexemes.first().map_or(0, |l| l.offset),
            })
        }
    };
    let (important, values) = match rest {
        [values @ .., last] if last.is(Token::Important) => (true, values),
        _ => (false, rest),
    };
    let invalid = || DeclarationError::InvalidValue {
        property: name.to_string(),
        value: values.iter().map(|l| l.text).collect::<Vec<_>>().join(" "),
    };

    if let Some(info) = property::by_key(name) {
        let [lexeme] = values else {
            return Err(invalid());
        };
        let value = parse_value(info.default, lexeme).ok_or_else(invalid)?;
        set.set_value(info.id, value.with_important(important));
        Ok(())
    } else if let Some(rect) = property::rect_by_key(name) {
        apply_rect(set, &rect, values, important).ok_or_else(invalid)
    } else {
        Err(DeclarationError::UnknownProperty(name.to_string()))
    }
}

/// `margin: 1px`, `margin: 1px 2px`, `margin: 1px 2px 3px`,
/// `margin: 1px 2px 3px 4px`, or one keyword for all four sides.
fn apply_rect(
    set: &mut PropertySet,
    rect: &RectProperty,
    values: &[Lexeme<'_>],
    important: bool,
) -> Option<()> {
    if let [lexeme] = values {
        if let Some(keyword) = keyword(lexeme) {
            for side in [rect.top, rect.right, rect.bottom, rect.left] {
                set.set_value(side.id(), keyword.clone().with_important(important));
            }
            return Some(());
        }
    }

    let scalars = values
        .iter()
        .map(|l| match l.token {
            Some(Token::Number | Token::Dimension) => parse_scalar(l.text),
            _ => None,
        })
        .collect::<Option<Vec<_>>>()?;
    let sides = match scalars.as_slice() {
        [all] => ScalarBox::all(*all),
        [vertical, horizontal] => ScalarBox::symmetric(*vertical, *horizontal),
        [top, horizontal, bottom] => ScalarBox::new(*top, *horizontal, *bottom, *horizontal),
        [top, right, bottom, left] => ScalarBox::new(*top, *right, *bottom, *left),
        _ => return None,
    };
    set.set_rect(rect, Value::explicit(sides).with_important(important));
    Some(())
}

fn keyword(lexeme: &Lexeme<'_>) -> Option<Value<PropertyValue>> {
    if !lexeme.is(Token::Ident) {
        return None;
    }
    match lexeme.text {
        "auto" => Some(Value::auto()),
        "inherit" => Some(Value::inherit()),
        "initial" => Some(Value::initial()),
        "unset" => Some(Value::unset()),
        _ => None,
    }
}

/// Read one value of the same type as `default`.
fn parse_value(default: PropertyValue, lexeme: &Lexeme<'_>) -> Option<Value<PropertyValue>> {
    if let Some(keyword) = keyword(lexeme) {
        return Some(keyword.with_source(lexeme.text));
    }
    let payload = match (default, lexeme.token?) {
        (PropertyValue::Color(_), Token::HexColor) => {
            PropertyValue::Color(parse_hex(lexeme.text)?)
        }
        (PropertyValue::Bool(_), Token::Ident) => PropertyValue::Bool(lexeme.text.parse().ok()?),
        (PropertyValue::Int(_), Token::Number) => PropertyValue::Int(lexeme.text.parse().ok()?),
        (PropertyValue::Scalar(_), Token::Number | Token::Dimension) => {
            PropertyValue::Scalar(parse_scalar(lexeme.text)?)
        }
        (PropertyValue::Display(_), Token::Ident) => {
            PropertyValue::Display(DisplayType::from_keyword(lexeme.text)?)
        }
        _ => return None,
    };
    Some(Value::explicit(payload).with_source(lexeme.text))
}

/// `#rrggbb` (opaque) or `#aarrggbb`.
fn parse_hex(text: &str) -> Option<Color> {
    let digits = text.strip_prefix('#')?;
    let packed = u32::from_str_radix(digits, 16).ok()?;
    match digits.len() {
        6 => Some(Color::from_argb(0xff00_0000 | packed)),
        8 => Some(Color::from_argb(packed)),
        _ => None,
    }
}

fn parse_scalar(text: &str) -> Option<Scalar> {
    let split = text
        .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == '-'))
        .unwrap_or(text.len());
    let (number, suffix) = text.split_at(split);
    let unit = match suffix {
        "" => Unit::None,
        "px" => Unit::Px,
        "ch" => Unit::Ch,
        "vw" => Unit::Vw,
        "vh" => Unit::Vh,
        "m" => Unit::M,
        "%" => Unit::Percent,
        _ => return None,
    };
    Some(Scalar {
        value: number.parse().ok()?,
        unit,
    })
}
