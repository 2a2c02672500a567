use std::fmt;

use crate::coords::LogicalSize;

/// Error returned by [`TextFactory::load_font`].
#[derive(Debug, Clone)]
pub struct FontLoadError(pub String);

impl fmt::Display for FontLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "font load error: {}", self.0)
    }
}

impl std::error::Error for FontLoadError {}

/// Handle to a font registered with a [`TextFactory`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct FontId(usize);

/// Font registry and text measurement, shared by all 2D drawing code.
///
/// Fonts hold no GPU state, so the factory survives device loss unchanged.
#[derive(Default)]
pub struct TextFactory {
    fonts: Vec<fontdue::Font>,
}

impl TextFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a TrueType or OpenType font from raw bytes.
    pub fn load_font(&mut self, bytes: &[u8]) -> Result<FontId, FontLoadError> {
        let font = fontdue::Font::from_bytes(bytes, fontdue::FontSettings::default())
            .map_err(|e| FontLoadError(e.to_string()))?;
        let id = FontId(self.fonts.len());
        self.fonts.push(font);
        log::debug!("loaded font {:?} as {id:?}", font_name(&self.fonts[id.0]));
        Ok(id)
    }

    pub fn font_count(&self) -> usize {
        self.fonts.len()
    }

    pub fn font(&self, id: FontId) -> Option<&fontdue::Font> {
        self.fonts.get(id.0)
    }

    /// Lays out `text` and returns its extent in device-independent units.
    ///
    /// Layout runs at `size * dpi / 96` so the result matches what a
    /// rasterizer at that DPI produces, then is scaled back.
    #[must_use]
    pub fn measure(&self, text: &str, id: FontId, size: f32, max_width: Option<f32>, dpi: f32) -> LogicalSize {
        use fontdue::layout::{CoordinateSystem, Layout, LayoutSettings, TextStyle};

        let line_height = size * 1.2;
        let Some(font) = self.font(id) else {
            return LogicalSize::new(0.0, line_height);
        };

        let scale = (dpi / 96.0).max(0.01);
        let px = size * scale;

        let mut layout: Layout<()> = Layout::new(CoordinateSystem::PositiveYDown);
        layout.reset(&LayoutSettings { max_width: max_width.map(|w| w * scale), ..LayoutSettings::default() });
        layout.append(&[font], &TextStyle::new(text, px, 0));

        let glyphs = layout.glyphs();
        if glyphs.is_empty() {
            return LogicalSize::new(0.0, line_height);
        }

        // Pen position after each glyph, not the bitmap edge, so the width is
        // a valid wrap width for the same string.
        let width = glyphs
            .iter()
            .map(|g| {
                let m = font.metrics_indexed(g.key.glyph_index, px);
                (g.x - m.xmin as f32 + m.advance_width).max(0.0)
            })
            .fold(0.0f32, f32::max);
        let height = glyphs.iter().map(|g| g.y + g.height as f32).fold(px, f32::max);

        LogicalSize::new(width / scale, height / scale)
    }
}

fn font_name(font: &fontdue::Font) -> &str {
    font.name().unwrap_or("<unnamed>")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_garbage_font_bytes() {
        let mut factory = TextFactory::new();
        assert!(factory.load_font(b"not a font").is_err());
        assert_eq!(factory.font_count(), 0);
    }

    #[test]
    fn unknown_font_measures_one_empty_line() {
        let factory = TextFactory::new();
        let size = factory.measure("hello", FontId(3), 10.0, None, 96.0);
        assert_eq!(size, LogicalSize::new(0.0, 12.0));
    }
}
