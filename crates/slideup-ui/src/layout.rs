//! Minimal measurement/layout vocabulary for the panel's single child.

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const ZERO: Self = Self {
        width: 0.0,
        height: 0.0,
    };

    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Upper bounds handed down by the host during the measure pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Constraints {
    pub max_width: f32,
    pub max_height: f32,
}

impl Constraints {
    pub fn new(max_width: f32, max_height: f32) -> Self {
        Self {
            max_width,
            max_height,
        }
    }

    pub fn constrain(&self, size: Size) -> Size {
        Size {
            width: size.width.min(self.max_width),
            height: size.height.min(self.max_height),
        }
    }
}
