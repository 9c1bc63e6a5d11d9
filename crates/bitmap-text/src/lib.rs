#![no_std]

//! `bitmap-text` is a library for drawing variable pitch bitmap text onto
//! displays that only understand "select a window" and "write pixels".
//!
//! This is the typical situation with SPI TFT controllers such as the
//! ILI9341: any backend implementing [Surface] can be drawn on, and an
//! in-memory [FrameBuffer] is included for off-screen rendering and tests.
//!
//! The library supports `no_std` environments but requires an allocator.
//!
//! The pieces are:
//! - [FontTable], a validated view over a packed font, via [bitmap_text_font]
//! - [GlyphRasterizer], which draws one glyph, via [bitmap_text_raster]
//! - [TextCursor], which lays out strings with wrapping, clipping and
//!   clear-on-overflow
//!
//! ```
//! use bitmap_text::{BuiltinFont, FrameBuffer, Rgb565, Surface, TextCursor};
//!
//! let font = BuiltinFont::Glcd5x7.load().unwrap();
//! let mut display = FrameBuffer::new(240, 320);
//!
//! let mut cursor = TextCursor::new(font).with_text_color(Rgb565::CYAN);
//! let x = (i32::from(display.width()) - cursor.stringlen("PICO CLOCK") as i32) / 2;
//! cursor.set_position(x, 10);
//! cursor.print_str(&mut display, "PICO CLOCK").unwrap();
//! ```

extern crate alloc;
#[cfg(test)]
extern crate std;

mod cursor;

pub use bitmap_text_core::{
    ClipPolicy, FrameBuffer, FrameBufferError, Orientation, Rgb565, Surface, color565,
};
pub use bitmap_text_font::{BuiltinFont, FontError, FontTable, Glyph, IndexMode};
pub use bitmap_text_raster::GlyphRasterizer;
pub use cursor::{TextCursor, TextStyle};

/// Render `text` on a single line into a frame buffer sized to fit it exactly.
///
/// Fails with [FrameBufferError::TooLarge] when the line is wider than a
/// surface can address.
///
/// ```
/// use bitmap_text::{render_text, BuiltinFont, Surface, TextStyle};
///
/// let font = BuiltinFont::Glcd5x7.load().unwrap();
/// let image = render_text("12:30", font, TextStyle::default()).unwrap();
/// assert_eq!(image.height(), 8);
/// ```
///
/// Text is always laid out upright; the style's orientation is ignored.
pub fn render_text(
    text: &str,
    font: FontTable<'_>,
    style: TextStyle,
) -> Result<FrameBuffer, FrameBufferError> {
    let style = TextStyle {
        orientation: Orientation::Normal,
        ..style
    };
    let mut cursor = TextCursor::with_style(font, style);

    let length = cursor.stringlen(text);
    let Ok(width) = u16::try_from(length) else {
        return Err(FrameBufferError::TooLarge {
            width: length,
            height: u32::from(font.height()),
        });
    };
    let mut image = FrameBuffer::new(width, u16::from(font.height()));

    if let Some(background) = style.background {
        image.fill(background)?;
    }
    cursor.print_str(&mut image, text)?;

    Ok(image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::String;

    #[test]
    fn render_text_fits_exactly() {
        let font = BuiltinFont::Glcd5x7.load().unwrap();
        let image = render_text("AB 1", font, TextStyle::default()).unwrap();

        // 'A' and 'B' are 6 wide, the space maps to '0' (6), '1' is 4
        assert_eq!((image.width(), image.height()), (22, 8));
        assert!(image.pixels().iter().any(|&p| p == Rgb565::WHITE));
    }

    #[test]
    fn render_text_rejects_overlong_lines() {
        let font = BuiltinFont::Glcd5x7.load().unwrap();
        let text: String = core::iter::repeat_n('A', 11_000).collect();

        // 11000 glyphs of 6 pixels
        let err = render_text(&text, font, TextStyle::default()).unwrap_err();
        assert_eq!(err, FrameBufferError::TooLarge { width: 66_000, height: 8 });

        let fits: String = core::iter::repeat_n('A', 10_922).collect();
        let image = render_text(&fits, font, TextStyle::default()).unwrap();
        assert_eq!(image.width(), 65_532);
        assert_eq!(image.pixel(65_526, 1), Some(Rgb565::WHITE));
    }

    #[test]
    fn render_text_empty() {
        let font = BuiltinFont::Glcd5x7.load().unwrap();
        let image = render_text("", font, TextStyle::default()).unwrap();
        assert_eq!(image.width(), 0);
        assert!(image.pixels().is_empty());
    }
}
