use core::convert::Infallible;

use svg::Document;
use svg::node::element::Rectangle;

use bitmap_text::{BuiltinFont, FrameBuffer, Rgb565, Surface, TextCursor};
use bitmap_text_rtc::{Ds3231, RegisterBus, Temperature};

/// A DS3231 register file captured from a running clock.
struct Snapshot([u8; 0x13]);

impl RegisterBus for Snapshot {
    type Error = Infallible;

    fn read_registers(&mut self, start: u8, buf: &mut [u8]) -> Result<(), Self::Error> {
        let start = usize::from(start);
        buf.copy_from_slice(&self.0[start..start + buf.len()]);
        Ok(())
    }

    fn write_registers(&mut self, start: u8, data: &[u8]) -> Result<(), Self::Error> {
        let start = usize::from(start);
        self.0[start..start + data.len()].copy_from_slice(data);
        Ok(())
    }
}

fn centred(cursor: &TextCursor, display: &FrameBuffer, text: &str) -> i32 {
    (i32::from(display.width()) - cursor.stringlen(text) as i32) / 2
}

fn line(
    cursor: &mut TextCursor,
    display: &mut FrameBuffer,
    y: i32,
    text: &str,
) -> Result<(), bitmap_text::FrameBufferError> {
    cursor.set_position(centred(cursor, display, text), y);
    cursor.print_str(display, text)
}

fn draw_clock(
    display: &mut FrameBuffer,
    rtc: &mut Ds3231<Snapshot>,
    min: Temperature,
    max: Temperature,
) -> Result<(), Box<dyn std::error::Error>> {
    let text = BuiltinFont::Glcd5x7.load()?;
    let numerals = BuiltinFont::Glcd5x7Numerals.load()?;

    let now = rtc.datetime()?;
    let temperature = rtc.temperature()?;

    let mut cursor = TextCursor::new(text);
    cursor.clear_screen(display)?;

    cursor.style_mut().text_color = Rgb565::CYAN;
    line(&mut cursor, display, 10, "PICO CLOCK")?;

    cursor.style_mut().text_color = Rgb565::WHITE;
    let date = format!(
        "{} {:04}-{:02}-{:02}",
        now.weekday_name(),
        now.year,
        now.month,
        now.day
    );
    line(&mut cursor, display, 60, &date)?;

    let mut digits = TextCursor::new(numerals).with_text_color(Rgb565::YELLOW);
    let time = format!("{:02}:{:02}:{:02}", now.hour, now.minute, now.second);
    line(&mut digits, display, 80, &time)?;

    cursor.style_mut().text_color = Rgb565::GREEN;
    line(&mut cursor, display, 140, "Temperature")?;
    let reading = format!("{:.2} C", temperature.celsius());
    line(&mut cursor, display, 160, &reading)?;

    cursor.style_mut().text_color = Rgb565::RED;
    cursor.set_position(4, 200);
    cursor.print_str(display, &format!("Max {:.2}", max.celsius()))?;

    cursor.style_mut().text_color = Rgb565::BLUE;
    let low = format!("Min {:.2}", min.celsius());
    cursor.set_position(i32::from(display.width()) - 4 - cursor.stringlen(&low) as i32, 200);
    cursor.print_str(display, &low)?;

    Ok(())
}

fn to_svg(display: &FrameBuffer, scale: u32) -> Document {
    let width = u32::from(display.width()) * scale;
    let height = u32::from(display.height()) * scale;

    let mut document = Document::new().add(
        Rectangle::new()
            .set("x", 0)
            .set("y", 0)
            .set("width", width)
            .set("height", height)
            .set("fill", "black"),
    );

    for y in 0..display.height() {
        let Some(row) = display.row(y) else {
            break;
        };
        for (x, &pixel) in row.iter().enumerate() {
            if pixel == Rgb565::BLACK {
                continue;
            }
            let (r, g, b) = pixel.to_rgb888();
            document = document.add(
                Rectangle::new()
                    .set("x", x as u32 * scale)
                    .set("y", u32::from(y) * scale)
                    .set("width", scale)
                    .set("height", scale)
                    .set("fill", format!("#{r:02x}{g:02x}{b:02x}")),
            );
        }
    }

    document
        .set("viewBox", (0, 0, width, height))
        .set("width", format!("{width}px"))
        .set("height", format!("{height}px"))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut registers = [0; 0x13];
    // Thursday 2024-07-04 21:05:59, 12-hour mode 9 PM
    registers[..7].copy_from_slice(&[0x59, 0x05, 0x69, 0x04, 0x04, 0x07, 0x24]);
    registers[0x11] = 0x19;
    registers[0x12] = 0x40;

    let mut rtc = Ds3231::new(Snapshot(registers))?;
    rtc.start_temperature_conversion()?;

    let min = Temperature::from_registers(0xFF, 0xC0);
    let max = Temperature::from_registers(0x1B, 0x80);

    let mut display = FrameBuffer::new(240, 320);
    draw_clock(&mut display, &mut rtc, min, max)?;

    let document = to_svg(&display, 2);
    svg::save("output_clock.svg", &document)?;
    println!("Wrote output_clock.svg");

    Ok(())
}
