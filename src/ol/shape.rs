//! Identifying regular shapes.
//!
//! Native regular shapes are described by their number of points and an
//! angle. Only a few combinations correspond to a well-known name.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};
use crate::error::TranslationError;
use super::RegularShape;


/// Returns the well-known name of a regular shape.
pub fn well_known_name(
    shape: &RegularShape
) -> Result<&'static str, TranslationError> {
    let angle = shape.angle;
    let name = match shape.points {
        2 => {
            if is_angle(angle, 0.) {
                Some("shape://vertline")
            }
            else if is_angle(angle, FRAC_PI_2) {
                Some("shape://horline")
            }
            else if is_angle(angle, FRAC_PI_4) {
                Some("shape://slash")
            }
            else if is_angle(angle, 2. * PI - FRAC_PI_4) {
                Some("shape://backslash")
            }
            else {
                None
            }
        }
        3 => {
            if is_angle(angle, 0.) {
                Some("triangle")
            }
            else if is_angle(angle, FRAC_PI_2) {
                Some("shape://carrow")
            }
            else {
                None
            }
        }
        4 => {
            if shape.radius2.is_some() {
                if is_angle(angle, 0.) { Some("cross") } else { Some("x") }
            }
            else {
                Some("square")
            }
        }
        5 => Some("star"),
        _ => None
    };
    name.ok_or_else(|| {
        TranslationError::new(format!(
            "regular shape with {} points and angle {} has no well-known name",
            shape.points, angle
        ))
    })
}

fn is_angle(angle: f64, expected: f64) -> bool {
    (angle - expected).abs() < 1e-9
}


//============ Tests =========================================================
