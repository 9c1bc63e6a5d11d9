#![no_std]

//! `bitmap-text-font` is a read-only accessor over compact, byte-packed
//! bitmap font tables.
//!
//! A table is a flat byte array made of a fixed header, a glyph directory
//! and the packed glyph bitmaps. All lookups are plain offset arithmetic, so a
//! table can live in flash and be shared by any number of readers.
//!
//! | offset | size | field |
//! |---|---|---|
//! | 0 | 1 | header length, i.e. the offset of the directory |
//! | 1 | 1 | format version (0) |
//! | 2 | 1 | index mode: 0 = two-byte directory, 1 = one-byte directory |
//! | 3 | 1 | declared maximum character count |
//! | 4 | 1 | font height in pixels |
//! | 5 | 1 | maximum glyph width in pixels |
//! | 6 | 2 | code of the substitute ("missing") glyph, big-endian |
//! | 8 | 2 | first character code, big-endian |
//! | 10 | 2 | last character code (exclusive), big-endian |
//!
//! The directory holds one entry per code in `first..last`: a big-endian
//! `u16` or a `u8` offset into the bitmap region that immediately follows the
//! directory. Each glyph record is a width byte followed by
//! `ceil(width * height / 8)` packed bitmap bytes.
//!
//! The crate also ships a few tables compiled from `data/` at build time, see
//! [BuiltinFont].

use bitmap_text_core::Orientation;
use log::debug;
use thiserror::Error;

include!(concat!(env!("OUT_DIR"), "/builtin_fonts.rs"));

/// Byte offsets of the header fields.
pub mod header {
    pub const HEADER_LEN: usize = 0;
    pub const VERSION: usize = 1;
    pub const INDEX_MODE: usize = 2;
    pub const MAX_CHARS: usize = 3;
    pub const HEIGHT: usize = 4;
    pub const WIDTH: usize = 5;
    pub const MISSING: usize = 6;
    pub const FIRST_CHAR: usize = MISSING + 2;
    pub const LAST_CHAR: usize = 10;
    /// Size of the fixed part of the header.
    pub const SIZE: usize = 12;
}

/// Width of the entries in the glyph directory.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum IndexMode {
    TwoByte,
    OneByte,
}

impl IndexMode {
    fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(Self::TwoByte),
            1 => Some(Self::OneByte),
            _ => None,
        }
    }

    /// Bytes per directory entry.
    pub fn entry_size(self) -> usize {
        match self {
            Self::TwoByte => 2,
            Self::OneByte => 1,
        }
    }
}

/// Reasons a font table is rejected at load time.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Error)]
pub enum FontError {
    #[error("font table is {len} bytes, shorter than the {needed} byte header")]
    TruncatedHeader { len: usize, needed: usize },
    #[error("header length {0} is shorter than the fixed header")]
    BadHeaderLength(u8),
    #[error("unsupported font format version {0}")]
    UnsupportedVersion(u8),
    #[error("unknown index mode {0}")]
    UnknownIndexMode(u8),
    #[error("font height is zero")]
    ZeroHeight,
    #[error("character range {first:#x}..{last:#x} is empty")]
    EmptyRange { first: u16, last: u16 },
    #[error("missing glyph code {missing:#x} is outside {first:#x}..{last:#x}")]
    MissingOutOfRange { missing: u16, first: u16, last: u16 },
    #[error("glyph directory ends at byte {end}, past the {len} byte table")]
    TruncatedDirectory { end: usize, len: usize },
    #[error("glyph {code:#x} ends at byte {end}, past the {len} byte table")]
    TruncatedGlyph { code: u16, end: usize, len: usize },
    #[error("glyph {code:#x} is {width}px wide, above the declared maximum of {max_width}px")]
    GlyphTooWide { code: u16, width: u8, max_width: u8 },
    #[error("missing glyph {0:#x} is empty")]
    EmptyMissingGlyph(u16),
}

/// Metadata of one resolved glyph.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Glyph {
    /// Width in pixels. Zero marks an intentionally empty glyph.
    pub width: u8,
    /// Absolute byte offset of the first packed bitmap byte.
    pub offset: usize,
}

impl Glyph {
    /// Empty glyphs draw nothing and advance by nothing.
    pub fn is_empty(&self) -> bool {
        self.width == 0
    }
}

/// Number of bytes holding the bitmap of a `width` x `height` glyph.
pub const fn bitmap_len(width: u8, height: u8) -> usize {
    (width as usize * height as usize).div_ceil(8)
}

/// Map `code` onto the covered range, substituting `missing` for anything
/// outside `first..last`.
pub const fn substitute(code: u32, first: u16, last: u16, missing: u16) -> u16 {
    if code >= first as u32 && code < last as u32 {
        code as u16
    } else {
        missing
    }
}

fn read_u16(bytes: &[u8], at: usize) -> u16 {
    u16::from_be_bytes([bytes[at], bytes[at + 1]])
}

/// A validated, borrowed font table.
#[derive(Debug, Copy, Clone)]
pub struct FontTable<'a> {
    bytes: &'a [u8],
    mode: IndexMode,
    max_chars: u8,
    height: u8,
    max_width: u8,
    missing: u16,
    first: u16,
    last: u16,
    directory: usize,
    bitmaps: usize,
}

impl<'a> FontTable<'a> {
    /// Parse and validate a table. Every glyph record is bounds-checked here so
    /// that lookups never fail later.
    pub fn new(bytes: &'a [u8]) -> Result<Self, FontError> {
        if bytes.len() < header::SIZE {
            return Err(FontError::TruncatedHeader {
                len: bytes.len(),
                needed: header::SIZE,
            });
        }

        let header_len = bytes[header::HEADER_LEN];
        if usize::from(header_len) < header::SIZE {
            return Err(FontError::BadHeaderLength(header_len));
        }

        let version = bytes[header::VERSION];
        if version != 0 {
            return Err(FontError::UnsupportedVersion(version));
        }

        let mode = IndexMode::from_byte(bytes[header::INDEX_MODE])
            .ok_or(FontError::UnknownIndexMode(bytes[header::INDEX_MODE]))?;

        let height = bytes[header::HEIGHT];
        if height == 0 {
            return Err(FontError::ZeroHeight);
        }

        let missing = read_u16(bytes, header::MISSING);
        let first = read_u16(bytes, header::FIRST_CHAR);
        let last = read_u16(bytes, header::LAST_CHAR);

        if first >= last {
            return Err(FontError::EmptyRange { first, last });
        }
        if !(first..last).contains(&missing) {
            return Err(FontError::MissingOutOfRange {
                missing,
                first,
                last,
            });
        }

        let directory = usize::from(header_len);
        let bitmaps = directory + usize::from(last - first) * mode.entry_size();
        if bitmaps > bytes.len() {
            return Err(FontError::TruncatedDirectory {
                end: bitmaps,
                len: bytes.len(),
            });
        }

        let table = Self {
            bytes,
            mode,
            max_chars: bytes[header::MAX_CHARS],
            height,
            max_width: bytes[header::WIDTH],
            missing,
            first,
            last,
            directory,
            bitmaps,
        };

        for code in first..last {
            table.check_record(code)?;
        }

        if table.glyph_for(u32::from(missing)).is_empty() {
            return Err(FontError::EmptyMissingGlyph(missing));
        }

        debug!(
            "loaded {}px font, codes {:#x}..{:#x}, {:?} index",
            height, first, last, mode
        );

        Ok(table)
    }

    fn check_record(&self, code: u16) -> Result<(), FontError> {
        let len = self.bytes.len();

        let address = self.record_address(usize::from(code - self.first));
        if address >= len {
            return Err(FontError::TruncatedGlyph {
                code,
                end: address + 1,
                len,
            });
        }

        let width = self.bytes[address];
        if width > self.max_width {
            return Err(FontError::GlyphTooWide {
                code,
                width,
                max_width: self.max_width,
            });
        }

        let end = address + 1 + bitmap_len(width, self.height);
        if end > len {
            return Err(FontError::TruncatedGlyph { code, end, len });
        }

        Ok(())
    }

    /// Address of the width byte of the record at directory `index`.
    fn record_address(&self, index: usize) -> usize {
        let entry = self.directory + index * self.mode.entry_size();
        let offset = match self.mode {
            IndexMode::TwoByte => usize::from(read_u16(self.bytes, entry)),
            IndexMode::OneByte => usize::from(self.bytes[entry]),
        };
        self.bitmaps + offset
    }

    /// Resolve a character code. Codes the font does not cover resolve to the
    /// missing glyph.
    pub fn glyph_for(&self, code: u32) -> Glyph {
        let code = substitute(code, self.first, self.last, self.missing);
        let address = self.record_address(usize::from(code - self.first));

        Glyph {
            width: self.bytes[address],
            offset: address + 1,
        }
    }

    /// Width in pixels of the glyph `code` resolves to.
    pub fn char_width(&self, code: u32) -> u8 {
        self.glyph_for(code).width
    }

    /// Packed bitmap bytes of a glyph returned by [FontTable::glyph_for].
    pub fn bitmap(&self, glyph: Glyph) -> &'a [u8] {
        &self.bytes[glyph.offset..glyph.offset + bitmap_len(glyph.width, self.height)]
    }

    /// True when `code` has its own entry, i.e. is not substituted.
    pub fn contains(&self, code: u32) -> bool {
        code >= u32::from(self.first) && code < u32::from(self.last)
    }

    pub fn height(&self) -> u8 {
        self.height
    }

    pub fn max_width(&self) -> u8 {
        self.max_width
    }

    /// Character count declared in the header. Informational only.
    pub fn max_chars(&self) -> u8 {
        self.max_chars
    }

    pub fn index_mode(&self) -> IndexMode {
        self.mode
    }

    pub fn missing_code(&self) -> u16 {
        self.missing
    }

    pub fn first_char(&self) -> u16 {
        self.first
    }

    pub fn last_char(&self) -> u16 {
        self.last
    }

    /// The raw table.
    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }
}

impl BuiltinFont {
    /// Validate and wrap the compiled table.
    pub fn load(self) -> Result<FontTable<'static>, FontError> {
        FontTable::new(self.bytes())
    }
}
