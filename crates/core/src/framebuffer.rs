use alloc::vec;
use alloc::vec::Vec;

use thiserror::Error;

use crate::{Rgb565, Surface};

/// Errors reported by [FrameBuffer].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FrameBufferError {
    #[error("window ({x0}, {y0})-({x1}, {y1}) does not fit a {width}x{height} surface")]
    InvalidWindow {
        x0: u16,
        y0: u16,
        x1: u16,
        y1: u16,
        width: u16,
        height: u16,
    },
    #[error("{width}x{height} pixels exceed the largest addressable surface")]
    TooLarge { width: u32, height: u32 },
}

#[derive(Debug, Clone, Copy)]
struct Window {
    x0: u16,
    y0: u16,
    x1: u16,
    y1: u16,
}

/// An in-memory [Surface] which behaves like a windowed display controller.
///
/// Useful as an off-screen target and for inspecting rendered output.
#[derive(Debug, Clone)]
pub struct FrameBuffer {
    width: u16,
    height: u16,
    pixels: Vec<Rgb565>,
    window: Window,
    // Next pixel to be written inside the window
    cursor: (u16, u16),
}

impl FrameBuffer {
    /// Create a black frame buffer. The initial window covers the whole surface.
    pub fn new(width: u16, height: u16) -> Self {
        let window = Window {
            x0: 0,
            y0: 0,
            x1: width.saturating_sub(1),
            y1: height.saturating_sub(1),
        };

        Self {
            width,
            height,
            pixels: vec![Rgb565::BLACK; usize::from(width) * usize::from(height)],
            window,
            cursor: (0, 0),
        }
    }

    /// Color at `(x, y)`, or `None` when off the surface.
    pub fn pixel(&self, x: i32, y: i32) -> Option<Rgb565> {
        if !self.contains(x, y) {
            return None;
        }
        Some(self.pixels[y as usize * usize::from(self.width) + x as usize])
    }

    /// All pixels in row-major order.
    pub fn pixels(&self) -> &[Rgb565] {
        &self.pixels
    }

    /// One row of pixels, or `None` below the last row.
    pub fn row(&self, y: u16) -> Option<&[Rgb565]> {
        if y >= self.height {
            return None;
        }
        let start = usize::from(y) * usize::from(self.width);
        Some(&self.pixels[start..start + usize::from(self.width)])
    }

    /// Swap width and height, as a controller does when its scan direction is
    /// rotated by 90 degrees. Contents are cleared.
    pub fn rotate(&mut self) {
        *self = Self::new(self.height, self.width);
    }
}

impl Surface for FrameBuffer {
    type Error = FrameBufferError;

    fn width(&self) -> u16 {
        self.width
    }

    fn height(&self) -> u16 {
        self.height
    }

    fn set_window(&mut self, x0: u16, y0: u16, x1: u16, y1: u16) -> Result<(), Self::Error> {
        if x0 > x1 || y0 > y1 || x1 >= self.width || y1 >= self.height {
            return Err(FrameBufferError::InvalidWindow {
                x0,
                y0,
                x1,
                y1,
                width: self.width,
                height: self.height,
            });
        }

        self.window = Window { x0, y0, x1, y1 };
        self.cursor = (x0, y0);
        Ok(())
    }

    fn write_pixels(&mut self, pixels: &[Rgb565]) -> Result<(), Self::Error> {
        if self.pixels.is_empty() {
            return Ok(());
        }

        let w = self.window;
        for &color in pixels {
            let (x, y) = self.cursor;
            self.pixels[usize::from(y) * usize::from(self.width) + usize::from(x)] = color;

            self.cursor = if x < w.x1 {
                (x + 1, y)
            } else if y < w.y1 {
                (w.x0, y + 1)
            } else {
                (w.x0, w.y0)
            };
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_writes_are_row_major() {
        let mut fb = FrameBuffer::new(5, 5);
        fb.set_window(1, 1, 2, 2).unwrap();
        fb.write_pixels(&[Rgb565(1), Rgb565(2), Rgb565(3), Rgb565(4)])
            .unwrap();

        assert_eq!(fb.pixel(1, 1), Some(Rgb565(1)));
        assert_eq!(fb.pixel(2, 1), Some(Rgb565(2)));
        assert_eq!(fb.pixel(1, 2), Some(Rgb565(3)));
        assert_eq!(fb.pixel(2, 2), Some(Rgb565(4)));
        assert_eq!(fb.pixel(3, 1), Some(Rgb565::BLACK));
    }

    #[test]
    fn window_wraps_when_full() {
        let mut fb = FrameBuffer::new(3, 3);
        fb.set_window(0, 0, 1, 0).unwrap();
        fb.write_pixels(&[Rgb565(1), Rgb565(2), Rgb565(3)]).unwrap();

        // Third pixel wraps back to the window origin
        assert_eq!(fb.pixel(0, 0), Some(Rgb565(3)));
        assert_eq!(fb.pixel(1, 0), Some(Rgb565(2)));
        assert_eq!(fb.pixel(0, 1), Some(Rgb565::BLACK));
    }

    #[test]
    fn invalid_windows_are_rejected() {
        let mut fb = FrameBuffer::new(3, 3);
        assert!(fb.set_window(2, 0, 1, 0).is_err());
        assert!(fb.set_window(0, 0, 3, 0).is_err());
        assert!(fb.set_window(0, 0, 0, 3).is_err());
    }

    #[test]
    fn rotate_swaps_dimensions() {
        let mut fb = FrameBuffer::new(240, 320);
        fb.rotate();
        assert_eq!((fb.width(), fb.height()), (320, 240));
        assert_eq!(fb.row(239).map(<[Rgb565]>::len), Some(320));
    }

    #[test]
    fn row_past_the_bottom_is_none() {
        let mut fb = FrameBuffer::new(3, 2);
        fb.write_pixel(2, 1, Rgb565::RED).unwrap();

        assert_eq!(fb.row(1), Some(&[Rgb565::BLACK, Rgb565::BLACK, Rgb565::RED][..]));
        assert_eq!(fb.row(2), None);
        assert_eq!(FrameBuffer::new(0, 0).row(0), None);
    }
}
