use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::PathBuf,
};

const HEIGHT: u8 = 8;
const HEADER_LEN: usize = 12;

#[derive(Debug, Copy, Clone, PartialEq)]
enum IndexMode {
    TwoByte,
    OneByte,
}

/// Bit traversal order of the packed glyph bitmaps.
#[derive(Debug, Copy, Clone, PartialEq)]
enum Layout {
    /// Bit index `col * height + row`, drawn upright.
    Columns,
    /// Bit index `row * width + col`, drawn on sideways displays.
    Rows,
}

struct FontDef {
    variant: &'static str,
    doc: &'static str,
    first: u16,
    last: u16,
    missing: u16,
    mode: IndexMode,
    layout: Layout,
}

impl FontDef {
    fn static_name(&self) -> String {
        let mut out = String::new();
        for (i, c) in self.variant.chars().enumerate() {
            if i > 0 && c.is_ascii_uppercase() {
                out.push('_');
            }
            out.push(c.to_ascii_uppercase());
        }
        out.push_str("_FONT");
        out
    }
}

#[derive(Debug, Clone)]
struct Glyph {
    code: u16,
    // Trimmed columns, including the trailing spacing column
    columns: Vec<u8>,
}

fn parse_hexfile(input: &str) -> Vec<Glyph> {
    let mut glyphs = Vec::new();

    for (lineno, line) in input.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let bytes: Vec<u8> = line
            .split_whitespace()
            .map(|b| {
                u8::from_str_radix(b, 16)
                    .unwrap_or_else(|_| panic!("Bad hex byte {:?} on line {}", b, lineno + 1))
            })
            .collect();

        if bytes.len() != 6 {
            panic!("Expected a code and 5 columns on line {}", lineno + 1);
        }

        glyphs.push(Glyph {
            code: bytes[0] as u16,
            columns: trim_columns(&bytes[1..]),
        });
    }

    glyphs
}

/// Strip blank columns from both sides, then append one blank column of spacing.
/// Blank glyphs (space) end up with no columns at all.
fn trim_columns(columns: &[u8]) -> Vec<u8> {
    let Some(first) = columns.iter().position(|&c| c != 0) else {
        return Vec::new();
    };
    let last = columns.iter().rposition(|&c| c != 0).unwrap();

    let mut out = columns[first..=last].to_vec();
    out.push(0);
    out
}

fn pack(glyph: &Glyph, layout: Layout) -> Vec<u8> {
    let w = glyph.columns.len();
    let h = HEIGHT as usize;
    let mut out = vec![0u8; (w * h).div_ceil(8)];

    for (col, &column) in glyph.columns.iter().enumerate() {
        for row in 0..h {
            if column & (1 << row) == 0 {
                continue;
            }
            let bit = match layout {
                Layout::Columns => col * h + row,
                Layout::Rows => row * w + col,
            };
            out[bit / 8] |= 1 << (bit % 8);
        }
    }

    out
}

fn generate_table(def: &FontDef, glyphs: &[Glyph]) -> Vec<u8> {
    let entries = (def.last - def.first) as usize;

    let mut directory = Vec::new();
    let mut bitmaps = Vec::new();
    let mut max_width = 0;

    for code in def.first..def.last {
        let glyph = glyphs
            .iter()
            .find(|g| g.code == code)
            .unwrap_or_else(|| panic!("No glyph for code {:#04x} in {}", code, def.variant));

        let offset = bitmaps.len();
        match def.mode {
            IndexMode::TwoByte => {
                let offset = u16::try_from(offset)
                    .unwrap_or_else(|_| panic!("{} does not fit a two-byte index", def.variant));
                directory.extend_from_slice(&offset.to_be_bytes());
            }
            IndexMode::OneByte => {
                let offset = u8::try_from(offset)
                    .unwrap_or_else(|_| panic!("{} does not fit a one-byte index", def.variant));
                directory.push(offset);
            }
        }

        bitmaps.push(glyph.columns.len() as u8);
        bitmaps.extend(pack(glyph, def.layout));
        max_width = max_width.max(glyph.columns.len());
    }

    let mut out = Vec::with_capacity(HEADER_LEN + directory.len() + bitmaps.len());
    out.push(HEADER_LEN as u8);
    out.push(0); // format version
    out.push(match def.mode {
        IndexMode::TwoByte => 0,
        IndexMode::OneByte => 1,
    });
    out.push(entries.min(255) as u8);
    out.push(HEIGHT);
    out.push(max_width as u8);
    out.extend_from_slice(&def.missing.to_be_bytes());
    out.extend_from_slice(&def.first.to_be_bytes());
    out.extend_from_slice(&def.last.to_be_bytes());
    assert_eq!(out.len(), HEADER_LEN);

    out.extend(directory);
    out.extend(bitmaps);
    out
}

fn generate_rust(def: &FontDef, table: &[u8]) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "static {}: [u8; {}] = [\n",
        def.static_name(),
        table.len()
    ));

    for chunk in table.chunks(16) {
        out.push_str("   ");
        for b in chunk {
            out.push_str(&format!(" {:#04x},", b));
        }
        out.push('\n');
    }

    out.push_str("];\n\n");
    out
}

fn generate_enum(defs: &[FontDef]) -> String {
    let mut out = String::new();

    out.push_str("/// A font table compiled into the crate at build time.\n");
    out.push_str("#[derive(Debug, Copy, Clone, PartialEq, Eq)]\n");
    out.push_str("pub enum BuiltinFont {\n");
    for def in defs {
        out.push_str(&format!("    /// {}\n", def.doc));
        out.push_str(&format!("    {},\n", def.variant));
    }
    out.push_str("}\n");

    out.push_str("impl BuiltinFont {\n");

    out.push_str("    /// Every built-in font.\n");
    out.push_str(&format!(
        "    pub const ALL: [BuiltinFont; {}] = [\n",
        defs.len()
    ));
    for def in defs {
        out.push_str(&format!("        Self::{},\n", def.variant));
    }
    out.push_str("    ];\n");

    out.push_str("    /// Raw packed table.\n");
    out.push_str("    pub fn bytes(self) -> &'static [u8] {\n");
    out.push_str("        match self {\n");
    for def in defs {
        out.push_str(&format!(
            "            Self::{} => &{},\n",
            def.variant,
            def.static_name()
        ));
    }
    out.push_str("        }\n");
    out.push_str("    }\n");

    out.push_str("    /// Orientation the bitmaps were packed for.\n");
    out.push_str("    pub fn orientation(self) -> Orientation {\n");
    out.push_str("        match self {\n");
    for def in defs {
        let orientation = match def.layout {
            Layout::Columns => "Normal",
            Layout::Rows => "Rotated",
        };
        out.push_str(&format!(
            "            Self::{} => Orientation::{},\n",
            def.variant, orientation
        ));
    }
    out.push_str("        }\n");
    out.push_str("    }\n");

    out.push_str("}\n\n");
    out
}

fn main() {
    let fonts = [
        FontDef {
            variant: "Glcd5x7",
            doc: "Printable ASCII, two-byte directory, upright.",
            first: 0x20,
            last: 0x7F,
            missing: '?' as u16,
            mode: IndexMode::TwoByte,
            layout: Layout::Columns,
        },
        FontDef {
            variant: "Glcd5x7Rotated",
            doc: "Printable ASCII, two-byte directory, for sideways displays.",
            first: 0x20,
            last: 0x7F,
            missing: '?' as u16,
            mode: IndexMode::TwoByte,
            layout: Layout::Rows,
        },
        FontDef {
            variant: "Glcd5x7Numerals",
            doc: "Space through `:` for clock faces, one-byte directory, upright.",
            first: 0x20,
            last: 0x3B,
            missing: '-' as u16,
            mode: IndexMode::OneByte,
            layout: Layout::Columns,
        },
    ];

    let glyphs = parse_hexfile(&fs::read_to_string("data/glcd5x7.hex").unwrap());
    println!("cargo:rerun-if-changed=data/glcd5x7.hex");

    let out_dir = PathBuf::from(std::env::var("OUT_DIR").unwrap());
    let out_path = out_dir.join("builtin_fonts.rs");

    let mut output = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&out_path)
        .unwrap();

    output.write_all(generate_enum(&fonts).as_bytes()).unwrap();

    for font in &fonts {
        let table = generate_table(font, &glyphs);
        output
            .write_all(generate_rust(font, &table).as_bytes())
            .unwrap();
    }
}
