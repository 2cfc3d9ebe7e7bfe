//! Font strings.
//!
//! Native text styles describe their font with a single CSS font shorthand
//! such as `bold italic 12px Arial, sans-serif`. The neutral model keeps
//! weight, style, size, and families apart.
//!
//! Marks drawn from a font glyph are written as text styles, too. They are
//! recognised on the way back by a sentinel family at the end of the font.
//!
//! ```text
//! font      ::= *(keyword WS) size ["/" line-height] WS families
//! keyword   ::= "normal" | "italic" | "oblique" | "bold" | "bolder"
//!             | "lighter" | "small-caps" | digits
//! size      ::= number "px"
//! families  ::= family *("," family)
//! ```

use std::fmt;
use nom::IResult;
use nom::branch::alt;
use nom::bytes::complete::{tag, tag_no_case, take_till, take_till1};
use nom::character::complete::{
    char as tag_char, digit1, multispace0, multispace1
};
use nom::combinator::{map, opt};
use nom::multi::{many0, separated_list1};
use nom::number::complete::double;
use nom::sequence::{delimited, preceded, terminated};
use crate::eval::number_to_string;
use crate::style::{FontStyle, FontWeight};


/// The family name marking a text style as a font glyph mark.
pub const MARK_FONT_SENTINEL: &str = "geostyler-mark-symbolizer";


//------------ Font ----------------------------------------------------------

/// A decomposed font shorthand.
#[derive(Clone, Debug, PartialEq)]
pub struct Font {
    pub weight: FontWeight,
    pub style: FontStyle,
    pub size: f64,
    pub families: Vec<String>,
}

impl Font {
    pub fn new(
        weight: FontWeight, style: FontStyle, size: f64, families: Vec<String>
    ) -> Self {
        Font { weight, style, size, families }
    }

    /// Parses a font shorthand.
    ///
    /// Returns `None` if the string is not a font shorthand we understand.
    pub fn parse(src: &str) -> Option<Self> {
        Self::parse_font(src.trim()).ok().and_then(|(rest, font)| {
            if rest.trim().is_empty() { Some(font) } else { None }
        })
    }

    fn parse_font(input: &str) -> IResult<&str, Self> {
        let (input, keywords) = many0(
            terminated(keyword, multispace1)
        )(input)?;
        let (input, size) = terminated(double, tag_no_case("px"))(input)?;
        let (input, _) = opt(preceded(
            tag_char('/'), take_till1(|ch: char| ch.is_whitespace())
        ))(input)?;
        let (input, _) = multispace1(input)?;
        let (input, families) = separated_list1(
            delimited(multispace0, tag_char(','), multispace0), family
        )(input)?;

        let mut weight = FontWeight::Normal;
        let mut style = FontStyle::Normal;
        for keyword in keywords {
            match keyword {
                Keyword::Style(value) => style = value,
                Keyword::Weight(value) => weight = value,
                Keyword::Other => { }
            }
        }
        Ok((input, Font {
            weight, style, size,
            families: families.into_iter().map(Into::into).collect()
        }))
    }

    /// Returns the first family that isn't the glyph mark sentinel.
    pub fn family(&self) -> Option<&str> {
        self.families.iter().map(String::as_str).find(|family| {
            *family != MARK_FONT_SENTINEL
        })
    }
}

impl fmt::Display for Font {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f, "{} {} {}px {}",
            self.weight.as_str(), self.style.as_str(),
            number_to_string(self.size), self.families.join(", ")
        )
    }
}


//------------ Keyword -------------------------------------------------------

enum Keyword {
    Style(FontStyle),
    Weight(FontWeight),
    Other,
}

fn keyword(input: &str) -> IResult<&str, Keyword> {
    alt((
        map(tag_no_case("italic"), |_| Keyword::Style(FontStyle::Italic)),
        map(tag_no_case("oblique"), |_| Keyword::Style(FontStyle::Oblique)),
        map(tag_no_case("bolder"), |_| Keyword::Weight(FontWeight::Bold)),
        map(tag_no_case("bold"), |_| Keyword::Weight(FontWeight::Bold)),
        map(tag_no_case("lighter"), |_| Keyword::Other),
        map(tag_no_case("normal"), |_| Keyword::Other),
        map(tag_no_case("small-caps"), |_| Keyword::Other),
        map(digit1, |digits: &str| {
            match digits.parse::<u16>() {
                Ok(weight) if weight >= 600 => {
                    Keyword::Weight(FontWeight::Bold)
                }
                _ => Keyword::Other
            }
        }),
    ))(input)
}

fn family(input: &str) -> IResult<&str, &str> {
    alt((
        delimited(
            tag_char('\''), take_till(|ch: char| ch == '\''), tag_char('\'')
        ),
        delimited(
            tag_char('"'), take_till(|ch: char| ch == '"'), tag_char('"')
        ),
        map(take_till1(|ch: char| ch == ','), str::trim),
    ))(input)
}


//------------ Mark fonts ----------------------------------------------------

/// Returns the font string for a glyph mark of the given family and radius.
pub fn mark_font(family: &str, radius: f64) -> String {
    format!(
        "Normal {}px '{}', {}",
        number_to_string(radius), family, MARK_FONT_SENTINEL
    )
}

/// Returns whether a font string was written for a glyph mark.
pub fn is_mark_font(font: &str) -> bool {
    font.ends_with(MARK_FONT_SENTINEL)
}


//------------ Glyph ---------------------------------------------------------

/// A font glyph referenced by a well-known name `ttf://<family>#<code>`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Glyph {
    pub family: String,
    pub code: u32,
}

impl Glyph {
    pub fn new(family: impl Into<String>, ch: char) -> Self {
        Glyph { family: family.into(), code: ch as u32 }
    }

    /// Parses a glyph well-known name.
    ///
    /// The code is hexadecimal with an optional `0x` prefix.
    pub fn parse(name: &str) -> Option<Self> {
        let (_, (family, code)) = Self::parse_name(name).ok()?;
        let code = code.trim_start_matches("0x").trim_start_matches("0X");
        Some(Glyph {
            family: family.into(),
            code: u32::from_str_radix(code, 16).ok()?,
        })
    }

    fn parse_name(input: &str) -> IResult<&str, (&str, &str)> {
        let (input, _) = tag("ttf://")(input)?;
        let split = input.rfind('#').filter(|&idx| {
            idx > 0 && idx + 1 < input.len()
        });
        match split {
            Some(idx) => Ok(("", (&input[..idx], &input[idx + 1..]))),
            None => Err(nom::Err::Error(nom::error::Error::new(
                input, nom::error::ErrorKind::Char
            )))
        }
    }

    /// Returns whether a well-known name refers to a font glyph.
    pub fn is_glyph_name(name: &str) -> bool {
        Self::parse_name(name).is_ok()
    }

    pub fn character(&self) -> Option<char> {
        char::from_u32(self.code)
    }
}

impl fmt::Display for Glyph {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "ttf://{}#0x{:x}", self.family, self.code)
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn compose() {
        let font = Font::new(
            FontWeight::Bold, FontStyle::Italic, 12.,
            vec!["Arial".into(), "sans-serif".into()]
        );
        assert_eq!(font.to_string(), "bold italic 12px Arial, sans-serif");
    }

    #[test]
    fn decompose() {
        assert_eq!(
            Font::parse("bold italic 12px Arial, sans-serif").unwrap(),
            Font::new(
                FontWeight::Bold, FontStyle::Italic, 12.,
                vec!["Arial".into(), "sans-serif".into()]
            )
        );
        assert_eq!(
            Font::parse("10px sans-serif").unwrap(),
            Font::new(
                FontWeight::Normal, FontStyle::Normal, 10.,
                vec!["sans-serif".into()]
            )
        );
        assert_eq!(
            Font::parse("700 14.5px/18px \"Open Sans\"").unwrap(),
            Font::new(
                FontWeight::Bold, FontStyle::Normal, 14.5,
                vec!["Open Sans".into()]
            )
        );
        assert!(Font::parse("Arial").is_none());
        assert!(Font::parse("12pt Arial").is_none());
    }

    #[test]
    fn mark_fonts() {
        let font = mark_font("My Font", 6.);
        assert_eq!(font, "Normal 6px 'My Font', geostyler-mark-symbolizer");
        assert!(is_mark_font(&font));
        let parsed = Font::parse(&font).unwrap();
        assert_eq!(parsed.size, 6.);
        assert_eq!(parsed.family(), Some("My Font"));
        assert!(!is_mark_font("12px Arial"));
    }

    #[test]
    fn glyphs() {
        let glyph = Glyph::parse("ttf://MyFont#0x41").unwrap();
        assert_eq!(glyph.family, "MyFont");
        assert_eq!(glyph.character(), Some('A'));
        assert_eq!(Glyph::new("MyFont", 'A').to_string(), "ttf://MyFont#0x41");
        assert_eq!(Glyph::parse("ttf://Webdings#f0").unwrap().code, 0xf0);
        assert!(Glyph::is_glyph_name("ttf://a#b"));
        assert!(!Glyph::is_glyph_name("circle"));
        assert!(Glyph::parse("ttf://#41").is_none());
        assert!(Glyph::parse("ttf://Font#zz").is_none());
    }
}
