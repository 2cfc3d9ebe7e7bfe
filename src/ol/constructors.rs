//! Hooks for creating native style parts.
//!
//! Every native part the translator creates passes through one of these
//! methods. An application can substitute its own implementation to adjust
//! or record the parts. The translation itself stays the same.

use std::fmt;
use std::sync::Arc;
use super::{Circle, Fill, Icon, OlStyle, RegularShape, Stroke, Text};


//------------ StyleConstructors ---------------------------------------------

pub trait StyleConstructors: Send + Sync {
    fn style(&self, style: OlStyle) -> OlStyle {
        style
    }

    fn fill(&self, fill: Fill) -> Fill {
        fill
    }

    fn stroke(&self, stroke: Stroke) -> Stroke {
        stroke
    }

    fn text(&self, text: Text) -> Text {
        text
    }

    fn circle(&self, circle: Circle) -> Circle {
        circle
    }

    fn regular_shape(&self, shape: RegularShape) -> RegularShape {
        shape
    }

    fn icon(&self, icon: Icon) -> Arc<Icon> {
        Arc::new(icon)
    }
}


//------------ DefaultConstructors -------------------------------------------

/// The constructors that create parts unchanged.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultConstructors;

impl StyleConstructors for DefaultConstructors { }

impl fmt::Debug for dyn StyleConstructors {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("StyleConstructors")
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;

    struct Thick;

    impl StyleConstructors for Thick {
        fn stroke(&self, stroke: Stroke) -> Stroke {
            Stroke { width: Some(10.), .. stroke }
        }
    }

    #[test]
    fn substitute_constructor() {
        let constructors: Arc<dyn StyleConstructors> = Arc::new(Thick);
        let stroke = constructors.stroke(Stroke {
            color: Some("#000000".into()), .. Default::default()
        });
        assert_eq!(stroke.width, Some(10.));
        assert_eq!(
            DefaultConstructors.fill(Fill::color("#fff")),
            Fill::color("#fff")
        );
    }
}
