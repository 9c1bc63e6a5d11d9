use bitmap_text_core::{ClipPolicy, Orientation, Rgb565, Surface};
use bitmap_text_font::FontTable;
use bitmap_text_raster::GlyphRasterizer;
use log::{debug, warn};

/// Color used to clear the surface when the background is transparent.
const DEFAULT_CLEAR: Rgb565 = Rgb565::BLACK;

/// Drawing parameters of a [TextCursor].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TextStyle {
    pub text_color: Rgb565,
    /// `None` draws text without touching the pixels around the glyph bits.
    pub background: Option<Rgb565>,
    pub orientation: Orientation,
    /// Swap text and background colors. Has no effect on a transparent background.
    pub reverse: bool,
    pub clip: ClipPolicy,
    /// Give a literal space the width of `'0'`, so variable pitch fonts with
    /// an empty space glyph still separate words.
    pub map_space: bool,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            text_color: Rgb565::WHITE,
            background: Some(Rgb565::BLACK),
            orientation: Orientation::Normal,
            reverse: false,
            clip: ClipPolicy::Warn,
            map_space: true,
        }
    }
}

/// Where the next character goes.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Placement {
    Draw,
    ClippedTop,
    ClippedBottom,
}

/// Pen position plus style, laying text out one character at a time.
///
/// Text that does not fit the remaining width wraps onto the next line. A
/// wrap below the last line clears the surface and restarts at the top left,
/// so a display that is redrawn forever never accumulates stale text.
/// Characters entirely above or below the surface are skipped.
#[derive(Debug, Copy, Clone)]
pub struct TextCursor<'a> {
    font: FontTable<'a>,
    style: TextStyle,
    x: i32,
    y: i32,
}

impl<'a> TextCursor<'a> {
    /// A cursor at the origin with the default [TextStyle].
    pub fn new(font: FontTable<'a>) -> Self {
        Self::with_style(font, TextStyle::default())
    }

    pub fn with_style(font: FontTable<'a>, style: TextStyle) -> Self {
        Self {
            font,
            style,
            x: 0,
            y: 0,
        }
    }

    pub fn with_text_color(mut self, color: Rgb565) -> Self {
        self.style.text_color = color;
        self
    }

    pub fn with_background(mut self, color: Option<Rgb565>) -> Self {
        self.style.background = color;
        self
    }

    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.style.orientation = orientation;
        self
    }

    pub fn with_reverse(mut self, reverse: bool) -> Self {
        self.style.reverse = reverse;
        self
    }

    pub fn with_clip_policy(mut self, clip: ClipPolicy) -> Self {
        self.style.clip = clip;
        self
    }

    pub fn with_map_space(mut self, map_space: bool) -> Self {
        self.style.map_space = map_space;
        self
    }

    pub fn style(&self) -> &TextStyle {
        &self.style
    }

    pub fn style_mut(&mut self) -> &mut TextStyle {
        &mut self.style
    }

    pub fn font(&self) -> &FontTable<'a> {
        &self.font
    }

    /// Font height in pixels, i.e. the line advance.
    pub fn height(&self) -> u8 {
        self.font.height()
    }

    pub fn position(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    pub fn set_position(&mut self, x: i32, y: i32) {
        self.x = x;
        self.y = y;
    }

    /// Move the pen. A missing coordinate defaults to the centre of the surface.
    pub fn set_textpos<S: Surface + ?Sized>(&mut self, surface: &S, x: Option<i32>, y: Option<i32>) {
        self.x = x.unwrap_or(i32::from(surface.width()) / 2);
        self.y = y.unwrap_or(i32::from(surface.height()) / 2);
    }

    /// Advance width of a single character code, honoring `map_space`.
    pub fn char_width(&self, code: u32) -> u8 {
        let code = if self.style.map_space && code == u32::from(' ') {
            u32::from('0')
        } else {
            code
        };
        self.font.char_width(code)
    }

    /// Width of `text` in pixels if printed on one line. Does not move the pen.
    pub fn stringlen(&self, text: &str) -> u32 {
        text.chars().map(|c| u32::from(self.char_width(c as u32))).sum()
    }

    /// For fixed pitch fonts: how many characters fit on one line.
    pub fn chars_per_row<S: Surface + ?Sized>(&self, surface: &S) -> u16 {
        match self.font.max_width() {
            0 => 0,
            w => surface.width() / u16::from(w),
        }
    }

    /// For fixed pitch fonts: pen position of a text cell. With rotated text
    /// rows advance along x.
    pub fn charpos(&self, row: i32, col: i32) -> (i32, i32) {
        let height = i32::from(self.font.height());
        let width = i32::from(self.font.max_width());
        match self.style.orientation {
            Orientation::Normal => (col * width, row * height),
            Orientation::Rotated => (row * height, col * width),
        }
    }

    /// Fill the surface with the background color and return to the origin.
    pub fn clear_screen<S: Surface + ?Sized>(&mut self, surface: &mut S) -> Result<(), S::Error> {
        surface.fill(self.style.background.unwrap_or(DEFAULT_CLEAR))?;
        self.x = 0;
        self.y = 0;
        Ok(())
    }

    /// Print `text` at the pen position, wrapping as needed.
    pub fn print_str<S: Surface + ?Sized>(&mut self, surface: &mut S, text: &str) -> Result<(), S::Error> {
        for c in text.chars() {
            self.print_char(surface, c)?;
        }
        Ok(())
    }

    /// Print one character. Control characters are looked up in the font like
    /// any other code.
    pub fn print_char<S: Surface + ?Sized>(&mut self, surface: &mut S, c: char) -> Result<(), S::Error> {
        let code = c as u32;
        let width = self.char_width(code);
        if width == 0 {
            return Ok(());
        }

        match self.place(surface, width)? {
            Placement::Draw => {}
            Placement::ClippedTop => {
                if self.style.clip == ClipPolicy::Warn {
                    warn!("{:?} clipped: above the surface at y = {}", c, self.y);
                }
                return Ok(());
            }
            Placement::ClippedBottom => {
                if self.style.clip == ClipPolicy::Warn {
                    warn!("{:?} clipped: below the surface at y = {}", c, self.y);
                }
                return Ok(());
            }
        }

        let (foreground, background) = self.colors();
        let rasterizer = GlyphRasterizer::new(foreground, background, self.style.orientation);
        let drawn = rasterizer.draw(surface, &self.font, code, self.x, self.y)?;

        // A mapped space has no bits of its own
        if drawn == 0 {
            if let Some(background) = background {
                let (w, h) = match self.style.orientation {
                    Orientation::Normal => (width, self.font.height()),
                    Orientation::Rotated => (self.font.height(), width),
                };
                surface.fill_rect(self.x, self.y, u16::from(w), u16::from(h), background)?;
            }
        }

        self.x += i32::from(width);
        Ok(())
    }

    /// Run the wrap, scroll-clear and clip rules for a character `width` wide.
    fn place<S: Surface + ?Sized>(&mut self, surface: &mut S, width: u8) -> Result<Placement, S::Error> {
        let height = i32::from(self.font.height());
        let mut cleared = false;

        if self.x + i32::from(width) > i32::from(surface.width()) {
            self.x = 0;
            self.y += height;

            if self.y >= i32::from(surface.height()) {
                debug!("text wrapped past the bottom edge, clearing surface");
                self.clear_screen(surface)?;
                cleared = true;
            }
        }

        if self.y + height < 0 {
            return Ok(Placement::ClippedTop);
        }

        if !cleared && self.y >= i32::from(surface.height()) {
            return Ok(Placement::ClippedBottom);
        }

        Ok(Placement::Draw)
    }

    fn colors(&self) -> (Rgb565, Option<Rgb565>) {
        match (self.style.reverse, self.style.background) {
            (true, Some(background)) => (background, Some(self.style.text_color)),
            (_, background) => (self.style.text_color, background),
        }
    }
}
