#![no_std]

//! `bitmap-text-core` provides core primitives for the `bitmap-text` crate:
//! the RGB565 color type, the [Surface] capability trait that every display
//! backend implements, and the small configuration enums shared by the
//! rasterizer and the text cursor.

extern crate alloc;

mod framebuffer;

pub use framebuffer::{FrameBuffer, FrameBufferError};

/// Number of pixels pushed per [Surface::write_pixels] call by the provided fills.
const FILL_CHUNK: usize = 256;

/// A 16-bit color packed as 5 bits red, 6 bits green, 5 bits blue.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct Rgb565(pub u16);

impl Rgb565 {
    pub const BLACK: Rgb565 = Rgb565(0x0000);
    pub const BLUE: Rgb565 = Rgb565(0x001F);
    pub const RED: Rgb565 = Rgb565(0xF800);
    pub const GREEN: Rgb565 = Rgb565(0x07E0);
    pub const CYAN: Rgb565 = Rgb565(0x07FF);
    pub const MAGENTA: Rgb565 = Rgb565(0xF81F);
    pub const YELLOW: Rgb565 = Rgb565(0xFFE0);
    pub const WHITE: Rgb565 = Rgb565(0xFFFF);

    /// Pack 8-bit channels, dropping the low bits of each.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb565(((r as u16 & 0xF8) << 8) | ((g as u16 & 0xFC) << 3) | (b as u16 >> 3))
    }

    /// Expand back to 8-bit channels by replicating the high bits.
    pub const fn to_rgb888(self) -> (u8, u8, u8) {
        let r = ((self.0 >> 11) & 0x1F) as u8;
        let g = ((self.0 >> 5) & 0x3F) as u8;
        let b = (self.0 & 0x1F) as u8;
        ((r << 3) | (r >> 2), (g << 2) | (g >> 4), (b << 3) | (b >> 2))
    }

    /// Big-endian wire representation, as clocked out to the controller.
    pub const fn to_be_bytes(self) -> [u8; 2] {
        self.0.to_be_bytes()
    }
}

impl From<u16> for Rgb565 {
    fn from(raw: u16) -> Self {
        Rgb565(raw)
    }
}

impl From<Rgb565> for u16 {
    fn from(color: Rgb565) -> Self {
        color.0
    }
}

/// Convert an RGB888 triple to a packed RGB565 color.
pub const fn color565(r: u8, g: u8, b: u8) -> Rgb565 {
    Rgb565::new(r, g, b)
}

/// Direction in which glyphs are laid onto the surface.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Orientation {
    /// Glyph columns map to surface columns.
    #[default]
    Normal,
    /// Glyphs are turned 90 degrees so text reads top-to-bottom on a sideways display.
    Rotated,
}

/// What happens when a character falls entirely outside the surface vertically.
///
/// Clipped characters are never drawn; the policy only controls whether a
/// diagnostic is emitted through `log`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum ClipPolicy {
    #[default]
    Warn,
    Silent,
}

/// Minimal capability contract of a pixel display.
///
/// A backend only needs to provide its dimensions, a way to select a
/// rectangular addressing window and a way to stream colors into it. Pixels
/// written through [Surface::write_pixels] fill the active window in row-major
/// order and wrap back to its top-left corner once it is full.
///
/// Coordinates have their origin at the top-left, x grows to the right and
/// y grows downwards.
pub trait Surface {
    /// Transport error reported by the backend.
    type Error;

    /// Addressable width in pixels.
    fn width(&self) -> u16;

    /// Addressable height in pixels.
    fn height(&self) -> u16;

    /// Select the inclusive rectangle `(x0, y0)..=(x1, y1)` that subsequent
    /// pixel writes target.
    fn set_window(&mut self, x0: u16, y0: u16, x1: u16, y1: u16) -> Result<(), Self::Error>;

    /// Write the next pixels of the active window.
    fn write_pixels(&mut self, pixels: &[Rgb565]) -> Result<(), Self::Error>;

    /// Returns true when `(x, y)` addresses a pixel of this surface.
    fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x < i32::from(self.width()) && y < i32::from(self.height())
    }

    /// Write a single pixel through a 1x1 window. Coordinates off the surface are ignored.
    fn write_pixel(&mut self, x: i32, y: i32, color: Rgb565) -> Result<(), Self::Error> {
        if !self.contains(x, y) {
            return Ok(());
        }

        let (x, y) = (x as u16, y as u16);
        self.set_window(x, y, x, y)?;
        self.write_pixels(&[color])
    }

    /// Fill a rectangle with one color. The rectangle is clipped to the
    /// surface; nothing is written when the intersection is empty.
    fn fill_rect(&mut self, x: i32, y: i32, w: u16, h: u16, color: Rgb565) -> Result<(), Self::Error> {
        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = (x + i32::from(w)).min(i32::from(self.width()));
        let y1 = (y + i32::from(h)).min(i32::from(self.height()));

        if x0 >= x1 || y0 >= y1 {
            return Ok(());
        }

        self.set_window(x0 as u16, y0 as u16, (x1 - 1) as u16, (y1 - 1) as u16)?;

        let chunk = [color; FILL_CHUNK];
        let mut remaining = ((x1 - x0) * (y1 - y0)) as usize;
        while remaining > 0 {
            let n = remaining.min(FILL_CHUNK);
            self.write_pixels(&chunk[..n])?;
            remaining -= n;
        }

        Ok(())
    }

    /// Fill the whole surface with one color.
    fn fill(&mut self, color: Rgb565) -> Result<(), Self::Error> {
        let (w, h) = (self.width(), self.height());
        self.fill_rect(0, 0, w, h, color)
    }

    /// Horizontal line `w` pixels long starting at `(x, y)`, clipped like [Surface::fill_rect].
    fn hline(&mut self, x: i32, y: i32, w: u16, color: Rgb565) -> Result<(), Self::Error> {
        self.fill_rect(x, y, w, 1, color)
    }

    /// Vertical line `h` pixels long starting at `(x, y)`, clipped like [Surface::fill_rect].
    fn vline(&mut self, x: i32, y: i32, h: u16, color: Rgb565) -> Result<(), Self::Error> {
        self.fill_rect(x, y, 1, h, color)
    }
}

impl<S: Surface + ?Sized> Surface for &mut S {
    type Error = S::Error;

    fn width(&self) -> u16 {
        (**self).width()
    }

    fn height(&self) -> u16 {
        (**self).height()
    }

    fn set_window(&mut self, x0: u16, y0: u16, x1: u16, y1: u16) -> Result<(), Self::Error> {
        (**self).set_window(x0, y0, x1, y1)
    }

    fn write_pixels(&mut self, pixels: &[Rgb565]) -> Result<(), Self::Error> {
        (**self).write_pixels(pixels)
    }

    fn contains(&self, x: i32, y: i32) -> bool {
        (**self).contains(x, y)
    }

    fn write_pixel(&mut self, x: i32, y: i32, color: Rgb565) -> Result<(), Self::Error> {
        (**self).write_pixel(x, y, color)
    }

    fn fill_rect(&mut self, x: i32, y: i32, w: u16, h: u16, color: Rgb565) -> Result<(), Self::Error> {
        (**self).fill_rect(x, y, w, h, color)
    }

    fn fill(&mut self, color: Rgb565) -> Result<(), Self::Error> {
        (**self).fill(color)
    }

    fn hline(&mut self, x: i32, y: i32, w: u16, color: Rgb565) -> Result<(), Self::Error> {
        (**self).hline(x, y, w, color)
    }

    fn vline(&mut self, x: i32, y: i32, h: u16, color: Rgb565) -> Result<(), Self::Error> {
        (**self).vline(x, y, h, color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color565_matches_named_colors() {
        assert_eq!(color565(255, 0, 0), Rgb565::RED);
        assert_eq!(color565(0, 255, 0), Rgb565::GREEN);
        assert_eq!(color565(0, 0, 255), Rgb565::BLUE);
        assert_eq!(color565(255, 255, 255), Rgb565::WHITE);
        assert_eq!(color565(0, 255, 255), Rgb565::CYAN);
    }

    #[test]
    fn rgb888_expansion_saturates() {
        assert_eq!(Rgb565::WHITE.to_rgb888(), (255, 255, 255));
        assert_eq!(Rgb565::BLACK.to_rgb888(), (0, 0, 0));
        assert_eq!(Rgb565::RED.to_rgb888(), (255, 0, 0));
    }

    #[test]
    fn wire_bytes_are_big_endian() {
        assert_eq!(Rgb565::RED.to_be_bytes(), [0xF8, 0x00]);
        assert_eq!(Rgb565::BLUE.to_be_bytes(), [0x00, 0x1F]);
        assert_eq!(color565(0x12, 0x34, 0x56).to_be_bytes(), [0x11, 0xAA]);
    }

    #[test]
    fn write_pixel_ignores_off_surface() {
        let mut fb = FrameBuffer::new(4, 4);
        fb.write_pixel(-1, 0, Rgb565::RED).unwrap();
        fb.write_pixel(0, 4, Rgb565::RED).unwrap();
        fb.write_pixel(4, 0, Rgb565::RED).unwrap();
        assert!(fb.pixels().iter().all(|&p| p == Rgb565::BLACK));

        fb.write_pixel(3, 3, Rgb565::RED).unwrap();
        assert_eq!(fb.pixel(3, 3), Some(Rgb565::RED));
    }

    #[test]
    fn fill_rect_is_clipped() {
        let mut fb = FrameBuffer::new(4, 4);
        fb.fill_rect(-2, 2, 4, 10, Rgb565::GREEN).unwrap();

        for y in 0..4 {
            for x in 0..4 {
                let expected = if x < 2 && y >= 2 {
                    Rgb565::GREEN
                } else {
                    Rgb565::BLACK
                };
                assert_eq!(fb.pixel(x, y), Some(expected), "pixel ({x}, {y})");
            }
        }
    }

    #[test]
    fn fill_rect_outside_is_noop() {
        let mut fb = FrameBuffer::new(4, 4);
        fb.fill_rect(10, 10, 4, 4, Rgb565::GREEN).unwrap();
        fb.fill_rect(0, 0, 0, 4, Rgb565::GREEN).unwrap();
        assert!(fb.pixels().iter().all(|&p| p == Rgb565::BLACK));
    }

    #[test]
    fn lines_are_clipped() {
        let mut fb = FrameBuffer::new(4, 4);
        fb.hline(-1, 1, 3, Rgb565::RED).unwrap();
        fb.vline(3, 2, 10, Rgb565::BLUE).unwrap();
        fb.hline(0, 4, 4, Rgb565::RED).unwrap();

        for y in 0..4 {
            for x in 0..4 {
                let expected = match (x, y) {
                    (0 | 1, 1) => Rgb565::RED,
                    (3, 2 | 3) => Rgb565::BLUE,
                    _ => Rgb565::BLACK,
                };
                assert_eq!(fb.pixel(x, y), Some(expected), "pixel ({x}, {y})");
            }
        }
    }

    /// A backend with its own fill, as hardware with a fill command would have.
    struct FastFill {
        fb: FrameBuffer,
        fills: usize,
    }

    impl Surface for FastFill {
        type Error = FrameBufferError;

        fn width(&self) -> u16 {
            self.fb.width()
        }

        fn height(&self) -> u16 {
            self.fb.height()
        }

        fn set_window(&mut self, x0: u16, y0: u16, x1: u16, y1: u16) -> Result<(), Self::Error> {
            self.fb.set_window(x0, y0, x1, y1)
        }

        fn write_pixels(&mut self, pixels: &[Rgb565]) -> Result<(), Self::Error> {
            self.fb.write_pixels(pixels)
        }

        fn fill_rect(&mut self, x: i32, y: i32, w: u16, h: u16, color: Rgb565) -> Result<(), Self::Error> {
            self.fills += 1;
            self.fb.fill_rect(x, y, w, h, color)
        }
    }

    fn paint<S: Surface>(mut surface: S) -> Result<(), S::Error> {
        surface.fill(Rgb565::GREEN)?;
        surface.hline(0, 0, 2, Rgb565::RED)?;
        surface.vline(0, 0, 2, Rgb565::RED)
    }

    #[test]
    fn mutable_references_keep_overrides() {
        let mut surface = FastFill {
            fb: FrameBuffer::new(4, 4),
            fills: 0,
        };

        paint(&mut surface).unwrap();
        paint(&mut &mut surface).unwrap();

        assert_eq!(surface.fills, 6);
        assert_eq!(surface.fb.pixel(1, 0), Some(Rgb565::RED));
        assert_eq!(surface.fb.pixel(1, 1), Some(Rgb565::GREEN));
    }

    #[test]
    fn fill_covers_large_surfaces() {
        let mut fb = FrameBuffer::new(40, 30);
        fb.fill(Rgb565::YELLOW).unwrap();
        assert!(fb.pixels().iter().all(|&p| p == Rgb565::YELLOW));
    }
}
