//! The table of shapes.
//!
//! All shapes are drawn in coordinates between (-10, -10) and (10, 10).

use std::collections::HashMap;
use lazy_static::lazy_static;


//------------ Shape ---------------------------------------------------------

/// The geometry of a shape.
#[derive(Clone, Copy, Debug)]
pub enum Shape {
    /// A closed polygon given as a points list.
    Polygon(&'static str),

    /// An area given as path data.
    Path(&'static str),

    /// Lines given as path data. These are never filled.
    Lines(&'static str),

    /// A circle with the given radius.
    Circle(f64),

    /// A square with rounded corners of the given radius.
    RoundedSquare(f64),
}

impl Shape {
    pub fn is_filled(self) -> bool {
        !matches!(self, Shape::Lines(_))
    }

    /// Returns the SVG element name and geometry attributes.
    pub fn element(self) -> (&'static str, String) {
        match self {
            Shape::Polygon(points) => {
                ("polygon", format!("points=\"{}\"", points))
            }
            Shape::Path(data) | Shape::Lines(data) => {
                ("path", format!("d=\"{}\"", data))
            }
            Shape::Circle(radius) => {
                ("circle", format!("cx=\"0\" cy=\"0\" r=\"{}\"", radius))
            }
            Shape::RoundedSquare(corner) => {
                (
                    "rect",
                    format!(
                        "x=\"-10\" y=\"-10\" width=\"20\" height=\"20\" \
                         rx=\"{0}\" ry=\"{0}\"",
                        corner
                    )
                )
            }
        }
    }
}


//------------ Lookup --------------------------------------------------------

/// Returns the shape for a canonical well-known name.
pub fn lookup(name: &str) -> Option<Shape> {
    SHAPES.get(name).copied()
}

/// Returns an iterator over the names of all shapes.
pub fn names() -> impl Iterator<Item = &'static str> {
    let mut names: Vec<_> = SHAPES.keys().copied().collect();
    names.sort_unstable();
    names.into_iter()
}

/// Returns the canonical name for a well-known name.
///
/// Resolves aliases. Names without an entry are returned unchanged.
pub fn canonical_name(name: &str) -> String {
    let lower = name.to_ascii_lowercase();
    match lower.as_str() {
        "x" | "shape://times" => "cross2".into(),
        "shape://plus" => "cross".into(),
        "shape://dot" => "circle".into(),
        "shape://oarrow" => "arrowhead".into(),
        "shape://carrow" => "filled_arrowhead".into(),
        _ => lower
    }
}

/// Returns whether a well-known name denotes a line shape.
///
/// Line shapes are joined up when used as a pattern.
pub fn is_line(name: &str) -> bool {
    matches!(
        name,
        "shape://vertline" | "shape://horline" | "shape://slash"
        | "shape://backslash" | "line"
    )
}

macro_rules! shapes {
    ( $( $name:expr => $shape:expr ),* $(,)? ) => {
        lazy_static! {
            static ref SHAPES: HashMap<&'static str, Shape> = {
                let mut set = HashMap::new();
                $(
                    set.insert($name, $shape);
                )*
                set
            };
        }
    }
}


//------------ Actual Shapes -------------------------------------------------

shapes! {
    "arrow" => Shape::Path(
        "M 0,-10 L 5,-5 L 2.5,-5 L 2.5,10 L -2.5,10 L -2.5,-5 L -5,-5 \
         L 0,-10 Z"
    ),
    "arrowhead" => Shape::Lines("M -10 -10 L 0 0 L -10 10"),
    "asterisk_fill" => Shape::Path(
        "M -1.5,-10 L 1.5,-10L 1.5,-3.939 L 6.011,-8.132 L 8.132,-6.011 \
         L 3.939,-1.5 L 10,-1.5 L 10,1.5 L 3.939,1.5 L 8.132,6.011 \
         L 6.011,8.132 L 1.5,3.939 L 1.5,10 L -1.5,10 L -1.5,3.939 \
         L -6.011,8.132 L -8.132,6.011 L -3.939,1.5 L -10,1.5 L -10,-1.5 \
         L -3.939,-1.5 L -8.132,-6.011 L -6.011,-8.132 L -1.5,-3.939 \
         L -1.5,-10 Z"
    ),
    "circle" => Shape::Circle(10.),
    "cross" => Shape::Lines("M -10 0 L 10 0 M 0 -10 L 0 10"),
    "cross2" => Shape::Lines("M -10 -10 L 10 10 M 10 -10 L -10 10"),
    "cross_fill" => Shape::Path(
        "M -10,-2 L -10,-2 L -10,2 L -2,2 L -2,10 L 2,10 L 2,2 L 10,2 \
         L 10,-2 L 2,-2 L 2,-10 L -2,-10 L -2,-2 L -10,-2 Z"
    ),
    "decagon" => Shape::Polygon(
        "5.878,8.09 9.511,3.09 9.511,-3.09 5.878,-8.09 0,-10 -5.878,-8.09 \
         -9.511,-3.09 -9.511,3.09 -5.878,8.09 0,10 5.878,8.09"
    ),
    "diagonal_half_square" => Shape::Polygon("-10,-10 10,10 -10,10 -10,-10"),
    "diamond" => Shape::Polygon("-10,0 0,10 10,0 0,-10 -10,0"),
    "equilateral_triangle" => Shape::Polygon("-8.66,5 8.66,5 0,-10 -8.66,5"),
    "filled_arrowhead" => Shape::Path("M 0,0 L -10,10 L -10,-10 L 0,0 Z"),
    "half_arc" => Shape::Lines("M -10 0 A -10 -10 0 0 1 10 0"),
    "half_square" => Shape::Polygon("-10,-10 0,-10 0,10 -10,10 -10,-10"),
    "heart" => Shape::Path(
        "M -9.5 -2 A 1 1 0 0 1 0 -7.5 A 1 1 0 0 1 9.5 -2 L 0 10 Z"
    ),
    "hexagon" => Shape::Polygon(
        "-8.66,-5 -8.66,5 0,10 8.66,5 8.66,-5 0,-10 -8.66,-5"
    ),
    "left_half_triangle" => Shape::Polygon("0,10 10,10 0,-10 0,10"),
    "line" => Shape::Lines("M 0 -10 L 0 10"),
    "octagon" => Shape::Polygon(
        "-4.142,10 4.142,10 10,4.142 10,-4.142 4.142,-10 -4.142,-10 \
         -10,-4.142 -10,4.142 -4.142,10"
    ),
    "parallelogram_left" => Shape::Polygon("10,5 5,-5 -10,-5 -5,5 10,5"),
    "parallelogram_right" => Shape::Polygon("5,5 10,-5 -5,-5 -10,5 5,5"),
    "pentagon" => Shape::Polygon(
        "-9.511,-3.09 -5.878,8.09 5.878,8.09 9.511,-3.09 0,-10 -9.511,-3.09"
    ),
    "quarter_arc" => Shape::Lines("M 0 -10 A 10 10 0 0 0 -10 0"),
    "quarter_circle" => Shape::Path("M 0 -10 A 10 10 0 0 0 -10 0 L 0 0 Z"),
    "quarter_square" => Shape::Polygon("-10,-10 0,-10 0,0 -10,0 -10,-10"),
    "right_half_triangle" => Shape::Polygon("-10,10 0,10 0,-10 -10,10"),
    "rounded_square" => Shape::RoundedSquare(2.5),
    "semi_circle" => Shape::Path("M -10 0 A -10 -10 0 0 1 10 0 L 0 0 Z"),
    "shield" => Shape::Polygon("10,5 10,-10 -10,-10 -10,5 0,10 10,5"),
    "square" => Shape::Polygon("-10,-10 10,-10 10,10 -10,10"),
    "square_with_corners" => Shape::Polygon(
        "-6.072,10 6.072,10 10,6.072 10,-6.072 6.072,-10 -6.072,-10 \
         -10,-6.072 -10,6.072 -6.072,10"
    ),
    "star" => Shape::Path(
        "M -2.24514,-3.09017 -9.51057,-3.09017 -3.63271,1.18034 \
         -5.87785,8.09017 0,3.81966 5.87785,8.09017 3.63271,1.18034 \
         9.51057,-3.09017 2.24514,-3.09017 0,-10 -2.24514,-3.09017 Z"
    ),
    "star_diamond" => Shape::Path(
        "M -2.70091,-2.70091 -10,0 -2.70091,2.70091 0,10 2.70091,2.70091 \
         10,0 2.70091,-2.70091 0,-10 Z"
    ),
    "third_arc" => Shape::Lines("M 0 -10 A 10 10 0 0 0 -5 8.66"),
    "third_circle" => Shape::Path("M 0 -10 A 10 10 0 0 0 -5 8.66 L 0 0 Z"),
    "trapezoid" => Shape::Polygon("5,-5 10,5 -10,5 -5,-5 5,-5"),
    "triangle" => Shape::Polygon("-10,10 10,10 0,-10 -10,10"),

    "shape://vertline" => Shape::Lines("M 0 -10 L 0 10"),
    "shape://horline" => Shape::Lines("M -10 0 L 10 0"),
    "shape://slash" => Shape::Lines("M -10 10 L 10 -10"),
    "shape://backslash" => Shape::Lines("M -10 -10 L 10 10"),
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn aliases() {
        assert_eq!(canonical_name("x"), "cross2");
        assert_eq!(canonical_name("shape://times"), "cross2");
        assert_eq!(canonical_name("shape://carrow"), "filled_arrowhead");
        assert_eq!(canonical_name("Circle"), "circle");
        assert_eq!(canonical_name("shape://slash"), "shape://slash");
        assert!(lookup(&canonical_name("shape://dot")).is_some());
        assert!(lookup("shape://times").is_none());
    }

    #[test]
    fn table() {
        assert_eq!(names().count(), 41);
        assert!(!lookup("cross").unwrap().is_filled());
        assert!(lookup("square").unwrap().is_filled());
        assert!(is_line("shape://horline"));
        assert!(!is_line("cross"));
        let (name, attrs) = lookup("rounded_square").unwrap().element();
        assert_eq!(name, "rect");
        assert!(attrs.ends_with("rx=\"2.5\" ry=\"2.5\""));
    }
}
