//! Text measurement collaborator.
//!
//! Socket sizes depend on the width of their label. The scene never lays out
//! text itself; it asks a [`TextMeasure`] implementation supplied by the host.

use crate::geometry::Size;

/// Measures the logical size of a single line of text.
pub trait TextMeasure {
    fn measure(&self, text: &str) -> Size;
}

impl<F> TextMeasure for F
where
    F: Fn(&str) -> Size,
{
    fn measure(&self, text: &str) -> Size {
        self(text)
    }
}

/// Fixed-advance metrics: every character is `char_width` wide and every
/// line (including an empty one) is `line_height` tall.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MonospaceMetrics {
    pub char_width: f32,
    pub line_height: f32,
}

impl Default for MonospaceMetrics {
    fn default() -> Self {
        Self { char_width: 7.0, line_height: 14.0 }
    }
}

impl TextMeasure for MonospaceMetrics {
    fn measure(&self, text: &str) -> Size {
        Size::new(text.chars().count() as f32 * self.char_width, self.line_height)
    }
}
