#![no_std]

//! `bitmap-text-raster` draws single glyphs of a packed bitmap font onto any
//! [Surface].
//!
//! Glyph bits are read from the font table in the traversal order of the
//! requested [Orientation]:
//!
//! - [Orientation::Normal]: bit `col * height + row` lands on `(x + col, y + row)`.
//! - [Orientation::Rotated]: bit `row * width + col` lands on `(x + row, y + width - col - 1)`.
//!
//! The rasterizer never clips; keeping glyphs on screen is the caller's job.

extern crate alloc;

use bitmap_text_core::{Orientation, Rgb565, Surface};
use bitmap_text_font::{FontTable, Glyph};
use log::trace;

/// Pixels buffered per window write on the opaque path.
const ROW_CHUNK: usize = 64;

fn bit(bitmap: &[u8], index: usize) -> bool {
    bitmap[index / 8] & (1 << (index % 8)) != 0
}

/// Colors and orientation used to draw glyphs.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct GlyphRasterizer {
    /// Color of set bits.
    pub foreground: Rgb565,
    /// Color of unset bits. `None` leaves those pixels untouched.
    pub background: Option<Rgb565>,
    pub orientation: Orientation,
}

impl GlyphRasterizer {
    pub fn new(foreground: Rgb565, background: Option<Rgb565>, orientation: Orientation) -> Self {
        Self {
            foreground,
            background,
            orientation,
        }
    }

    /// Draw the glyph for `code` with its top-left corner at `(x, y)`.
    ///
    /// Returns the glyph width, which is 0 for empty glyphs. Empty glyphs make
    /// no surface calls at all.
    pub fn draw<S: Surface + ?Sized>(
        &self,
        surface: &mut S,
        font: &FontTable<'_>,
        code: u32,
        x: i32,
        y: i32,
    ) -> Result<u8, S::Error> {
        self.draw_glyph(surface, font, font.glyph_for(code), x, y)
    }

    /// Draw an already resolved glyph.
    pub fn draw_glyph<S: Surface + ?Sized>(
        &self,
        surface: &mut S,
        font: &FontTable<'_>,
        glyph: Glyph,
        x: i32,
        y: i32,
    ) -> Result<u8, S::Error> {
        if glyph.is_empty() {
            return Ok(0);
        }

        trace!("glyph {}px at ({}, {}) {:?}", glyph.width, x, y, self.orientation);

        let bitmap = font.bitmap(glyph);
        let w = usize::from(glyph.width);
        let h = usize::from(font.height());

        match self.background {
            Some(background) if self.fits(surface, w, h, x, y) => {
                self.stream(surface, bitmap, w, h, x, y, background)?
            }
            _ => self.plot(surface, bitmap, w, h, x, y)?,
        }

        Ok(glyph.width)
    }

    /// Size of the drawn box on the surface.
    fn extent(&self, w: usize, h: usize) -> (usize, usize) {
        match self.orientation {
            Orientation::Normal => (w, h),
            Orientation::Rotated => (h, w),
        }
    }

    fn fits<S: Surface + ?Sized>(&self, surface: &S, w: usize, h: usize, x: i32, y: i32) -> bool {
        let (bw, bh) = self.extent(w, h);
        surface.contains(x, y) && surface.contains(x + bw as i32 - 1, y + bh as i32 - 1)
    }

    /// Pixel-by-pixel path, used for transparent backgrounds and glyphs that
    /// straddle the surface edge.
    fn plot<S: Surface + ?Sized>(
        &self,
        surface: &mut S,
        bitmap: &[u8],
        w: usize,
        h: usize,
        x: i32,
        y: i32,
    ) -> Result<(), S::Error> {
        for row in 0..h {
            for col in 0..w {
                let (index, px, py) = match self.orientation {
                    Orientation::Normal => (col * h + row, x + col as i32, y + row as i32),
                    Orientation::Rotated => {
                        (row * w + col, x + row as i32, y + (w - col - 1) as i32)
                    }
                };

                if bit(bitmap, index) {
                    surface.write_pixel(px, py, self.foreground)?;
                } else if let Some(background) = self.background {
                    surface.write_pixel(px, py, background)?;
                }
            }
        }

        Ok(())
    }

    /// Opaque path: one window covering the glyph box, filled in row-major order.
    #[allow(clippy::too_many_arguments)]
    fn stream<S: Surface + ?Sized>(
        &self,
        surface: &mut S,
        bitmap: &[u8],
        w: usize,
        h: usize,
        x: i32,
        y: i32,
        background: Rgb565,
    ) -> Result<(), S::Error> {
        let (bw, bh) = self.extent(w, h);
        surface.set_window(
            x as u16,
            y as u16,
            (x + bw as i32 - 1) as u16,
            (y + bh as i32 - 1) as u16,
        )?;

        let mut buf = [background; ROW_CHUNK];
        let mut len = 0;

        for dy in 0..bh {
            for dx in 0..bw {
                let index = match self.orientation {
                    Orientation::Normal => dx * h + dy,
                    Orientation::Rotated => dx * w + (w - 1 - dy),
                };

                buf[len] = if bit(bitmap, index) {
                    self.foreground
                } else {
                    background
                };
                len += 1;

                if len == ROW_CHUNK {
                    surface.write_pixels(&buf)?;
                    len = 0;
                }
            }
        }

        if len > 0 {
            surface.write_pixels(&buf[..len])?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;
    use bitmap_text_core::FrameBuffer;
    use bitmap_text_font::BuiltinFont;

    /// Counts calls while forwarding them to a frame buffer.
    struct Recorder {
        fb: FrameBuffer,
        windows: usize,
        writes: usize,
    }

    impl Recorder {
        fn new(width: u16, height: u16) -> Self {
            Self {
                fb: FrameBuffer::new(width, height),
                windows: 0,
                writes: 0,
            }
        }
    }

    impl Surface for Recorder {
        type Error = bitmap_text_core::FrameBufferError;

        fn width(&self) -> u16 {
            self.fb.width()
        }

        fn height(&self) -> u16 {
            self.fb.height()
        }

        fn set_window(&mut self, x0: u16, y0: u16, x1: u16, y1: u16) -> Result<(), Self::Error> {
            self.windows += 1;
            self.fb.set_window(x0, y0, x1, y1)
        }

        fn write_pixels(&mut self, pixels: &[Rgb565]) -> Result<(), Self::Error> {
            self.writes += 1;
            self.fb.write_pixels(pixels)
        }
    }

    /// A surface whose bus always fails.
    struct Broken;

    impl Surface for Broken {
        type Error = &'static str;

        fn width(&self) -> u16 {
            32
        }

        fn height(&self) -> u16 {
            32
        }

        fn set_window(&mut self, _: u16, _: u16, _: u16, _: u16) -> Result<(), Self::Error> {
            Err("bus fault")
        }

        fn write_pixels(&mut self, _: &[Rgb565]) -> Result<(), Self::Error> {
            Err("bus fault")
        }
    }

    /// Expected `(x, y, set)` for every glyph cell, straight from the packing rules.
    fn expected(font: &FontTable, glyph: Glyph, orientation: Orientation, x: i32, y: i32) -> Vec<(i32, i32, bool)> {
        let bitmap = font.bitmap(glyph);
        let w = glyph.width as usize;
        let h = font.height() as usize;
        let mut out = Vec::new();

        for row in 0..h {
            for col in 0..w {
                let cell = match orientation {
                    Orientation::Normal => (x + col as i32, y + row as i32, bit(bitmap, col * h + row)),
                    Orientation::Rotated => (
                        x + row as i32,
                        y + w as i32 - col as i32 - 1,
                        bit(bitmap, row * w + col),
                    ),
                };
                out.push(cell);
            }
        }

        out
    }

    // Height 7, one 5px glyph 'A' with only bit 0 set
    const SINGLE_BIT: [u8; 19] = [
        12, 0, 1, 1, 7, 5, 0x00, 0x41, 0x00, 0x41, 0x00, 0x42, // header
        0, // directory
        5, 0x01, 0x00, 0x00, 0x00, 0x00, // 'A'
    ];

    #[test]
    fn empty_glyph_touches_nothing() {
        let font = BuiltinFont::Glcd5x7.load().unwrap();
        let mut surface = Recorder::new(16, 16);

        for background in [None, Some(Rgb565::BLUE)] {
            for orientation in [Orientation::Normal, Orientation::Rotated] {
                let rasterizer = GlyphRasterizer::new(Rgb565::WHITE, background, orientation);
                assert_eq!(rasterizer.draw(&mut surface, &font, ' ' as u32, 0, 0).unwrap(), 0);
            }
        }

        assert_eq!(surface.windows, 0);
        assert_eq!(surface.writes, 0);
    }

    #[test]
    fn returns_glyph_width() {
        let font = BuiltinFont::Glcd5x7.load().unwrap();
        let mut fb = FrameBuffer::new(16, 16);
        let rasterizer = GlyphRasterizer::new(Rgb565::WHITE, None, Orientation::Normal);

        assert_eq!(rasterizer.draw(&mut fb, &font, '0' as u32, 0, 0).unwrap(), 6);
        assert_eq!(rasterizer.draw(&mut fb, &font, '1' as u32, 0, 0).unwrap(), 4);
    }

    #[test]
    fn rotated_origin_bit() {
        let font = FontTable::new(&SINGLE_BIT).unwrap();
        let mut fb = FrameBuffer::new(32, 32);
        let rasterizer = GlyphRasterizer::new(Rgb565::RED, None, Orientation::Rotated);

        rasterizer.draw(&mut fb, &font, 'A' as u32, 10, 10).unwrap();

        assert_eq!(fb.pixel(10, 14), Some(Rgb565::RED));
        assert_eq!(fb.pixels().iter().filter(|&&p| p == Rgb565::RED).count(), 1);
    }

    #[test]
    fn rotated_origin_bit_opaque() {
        let font = FontTable::new(&SINGLE_BIT).unwrap();
        let mut fb = FrameBuffer::new(32, 32);
        let rasterizer = GlyphRasterizer::new(Rgb565::RED, Some(Rgb565::BLUE), Orientation::Rotated);

        rasterizer.draw(&mut fb, &font, 'A' as u32, 10, 10).unwrap();

        assert_eq!(fb.pixel(10, 14), Some(Rgb565::RED));
        // Rotated box is height wide and width tall
        assert_eq!(fb.pixels().iter().filter(|&&p| p == Rgb565::BLUE).count(), 7 * 5 - 1);
        assert_eq!(fb.pixel(16, 10), Some(Rgb565::BLUE));
        assert_eq!(fb.pixel(17, 10), Some(Rgb565::BLACK));
        assert_eq!(fb.pixel(10, 15), Some(Rgb565::BLACK));
    }

    #[test]
    fn transparent_background_preserves_surface() {
        let font = BuiltinFont::Glcd5x7.load().unwrap();

        for orientation in [Orientation::Normal, Orientation::Rotated] {
            let mut fb = FrameBuffer::new(20, 20);
            fb.fill(Rgb565::RED).unwrap();

            let rasterizer = GlyphRasterizer::new(Rgb565::WHITE, None, orientation);
            let glyph = font.glyph_for('A' as u32);
            rasterizer.draw_glyph(&mut fb, &font, glyph, 3, 4).unwrap();

            let cells = expected(&font, glyph, orientation, 3, 4);
            for &(x, y, set) in &cells {
                let want = if set { Rgb565::WHITE } else { Rgb565::RED };
                assert_eq!(fb.pixel(x, y), Some(want), "({x}, {y}) {orientation:?}");
            }

            let lit = cells.iter().filter(|c| c.2).count();
            assert_eq!(fb.pixels().iter().filter(|&&p| p == Rgb565::WHITE).count(), lit);
        }
    }

    #[test]
    fn opaque_paths_agree() {
        let font = BuiltinFont::Glcd5x7.load().unwrap();

        for orientation in [Orientation::Normal, Orientation::Rotated] {
            let rasterizer = GlyphRasterizer::new(Rgb565::WHITE, Some(Rgb565::BLUE), orientation);
            let glyph = font.glyph_for('g' as u32);

            // Fully on screen takes the window path, straddling the edge plots pixels
            for (x, y) in [(2, 2), (-3, 2), (2, -4), (17, 15)] {
                let mut fb = FrameBuffer::new(20, 20);
                rasterizer.draw_glyph(&mut fb, &font, glyph, x, y).unwrap();

                for (px, py, set) in expected(&font, glyph, orientation, x, y) {
                    if !fb.contains(px, py) {
                        continue;
                    }
                    let want = if set { Rgb565::WHITE } else { Rgb565::BLUE };
                    assert_eq!(fb.pixel(px, py), Some(want), "({px}, {py}) from ({x}, {y})");
                }
            }
        }
    }

    #[test]
    fn opaque_glyph_uses_one_window() {
        let font = BuiltinFont::Glcd5x7.load().unwrap();
        let mut surface = Recorder::new(16, 16);
        let rasterizer = GlyphRasterizer::new(Rgb565::WHITE, Some(Rgb565::BLACK), Orientation::Normal);

        rasterizer.draw(&mut surface, &font, 'W' as u32, 0, 0).unwrap();
        assert_eq!(surface.windows, 1);
    }

    #[test]
    fn surface_errors_propagate() {
        let font = BuiltinFont::Glcd5x7.load().unwrap();

        for background in [None, Some(Rgb565::BLACK)] {
            let rasterizer = GlyphRasterizer::new(Rgb565::WHITE, background, Orientation::Normal);
            assert_eq!(rasterizer.draw(&mut Broken, &font, 'A' as u32, 0, 0), Err("bus fault"));
        }
    }
}
