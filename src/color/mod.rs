//! Colors.
//!
//! The neutral style uses hex colors with a separate opacity while native
//! styles fold the opacity into an `rgba()` string. This module converts
//! between the two.

use std::fmt;
use std::num::ParseIntError;
use nom::IResult;
use nom::branch::alt;
use nom::bytes::complete::tag;
use nom::character::complete::{char as tag_char, multispace0};
use nom::combinator::all_consuming;
use nom::multi::separated_list1;
use nom::number::complete::double;
use nom::sequence::{delimited, pair};
use crate::eval::number_to_string;

pub mod names;


//------------ Rgba ----------------------------------------------------------

/// A color with an opacity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgba {
    red: u8,
    green: u8,
    blue: u8,
    alpha: f64,
}

impl Rgba {
    pub const fn rgb(red: u8, green: u8, blue: u8) -> Self {
        Rgba { red, green, blue, alpha: 1. }
    }

    pub fn with_alpha(self, alpha: f64) -> Self {
        Rgba { alpha: normalize_opacity(alpha), .. self }
    }

    /// Parses a hex color with three or six digits.
    pub fn hex(hex: &str) -> Result<Self, InvalidColor> {
        let hex = hex.strip_prefix('#').ok_or(InvalidColor)?;
        if !hex.is_ascii() {
            return Err(InvalidColor)
        }
        match hex.len() {
            3 => {
                let digit = |idx: usize| -> Result<u8, InvalidColor> {
                    Ok(u8::from_str_radix(&hex[idx..idx + 1], 16)? * 0x11)
                };
                Ok(Rgba::rgb(digit(0)?, digit(1)?, digit(2)?))
            }
            6 => {
                Ok(Rgba::rgb(
                    u8::from_str_radix(&hex[0..2], 16)?,
                    u8::from_str_radix(&hex[2..4], 16)?,
                    u8::from_str_radix(&hex[4..6], 16)?,
                ))
            }
            _ => Err(InvalidColor)
        }
    }

    /// Parses an `rgb()` or `rgba()` color.
    pub fn function(src: &str) -> Result<Self, InvalidColor> {
        let (_, components) = all_consuming(
            rgb_function
        )(src.trim()).map_err(|_| InvalidColor)?;
        let channel = |value: f64| value.clamp(0., 255.).trunc() as u8;
        match components.as_slice() {
            [r, g, b] => Ok(Rgba::rgb(channel(*r), channel(*g), channel(*b))),
            [r, g, b, a] => {
                Ok(Rgba::rgb(channel(*r), channel(*g), channel(*b))
                    .with_alpha(*a))
            }
            _ => Err(InvalidColor)
        }
    }

    /// Parses any color we understand: hex, rgb(a), or a CSS name.
    pub fn parse(src: &str) -> Result<Self, InvalidColor> {
        let src = src.trim();
        if src.starts_with('#') {
            Self::hex(src)
        }
        else if src.starts_with("rgb") {
            Self::function(src)
        }
        else {
            names::lookup(src).map(|[r, g, b]| Rgba::rgb(r, g, b))
                .ok_or(InvalidColor)
        }
    }

    pub fn alpha(self) -> f64 {
        self.alpha
    }

    /// Returns the lowercase six digit hex representation.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.red, self.green, self.blue)
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f, "rgba({}, {}, {}, {})",
            self.red, self.green, self.blue, number_to_string(self.alpha)
        )
    }
}

fn rgb_function(input: &str) -> IResult<&str, Vec<f64>> {
    delimited(
        pair(alt((tag("rgba"), tag("rgb"))), ws(tag_char('('))),
        separated_list1(ws(tag_char(',')), ws(double)),
        ws(tag_char(')'))
    )(input)
}

fn ws<'a, O, F>(
    inner: F
) -> impl FnMut(&'a str) -> IResult<&'a str, O>
where F: FnMut(&'a str) -> IResult<&'a str, O> {
    delimited(multispace0, inner, multispace0)
}


//------------ Conversion Functions ------------------------------------------

/// Combines a hex color and an opacity into an `rgba()` string.
///
/// A color that already is an `rgba()` string is returned unchanged.
/// Returns `None` if the color is not a valid hex color.
pub fn rgba_color(color: &str, opacity: f64) -> Option<String> {
    if color.starts_with("rgba(") {
        return Some(color.into())
    }
    Rgba::hex(color).ok().map(|rgba| rgba.with_alpha(opacity).to_string())
}

/// Converts a color into its hex representation.
///
/// Hex colors are returned as they are. Returns `None` for colors that
/// can't be parsed.
pub fn hex_color(color: &str) -> Option<String> {
    if color.starts_with('#') {
        return Some(color.into())
    }
    Rgba::parse(color).ok().map(Rgba::to_hex)
}

/// Returns the opacity of an `rgba()` color.
///
/// Alpha values outside the valid range are normalized.
pub fn opacity(color: &str) -> Option<f64> {
    if !color.starts_with("rgba(") {
        return None
    }
    let (_, components) = all_consuming(rgb_function)(color.trim()).ok()?;
    components.get(3).copied().map(normalize_opacity)
}

/// Returns a valid opacity.
///
/// Negative and undefined opacities become fully opaque, values above one
/// are clamped.
pub fn normalize_opacity(opacity: f64) -> f64 {
    if opacity.is_nan() || opacity < 0. {
        1.
    }
    else {
        opacity.min(1.)
    }
}

/// Returns whether a value is a valid opacity.
pub fn check_opacity(opacity: f64) -> bool {
    opacity.is_finite() && (0. ..=1.).contains(&opacity)
}


//------------ InvalidColor --------------------------------------------------

#[derive(Clone, Copy, Debug)]
pub struct InvalidColor;

impl From<ParseIntError> for InvalidColor {
    fn from(_: ParseIntError) -> Self {
        InvalidColor
    }
}

impl fmt::Display for InvalidColor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("invalid color")
    }
}


//============ Tests =========================================================
