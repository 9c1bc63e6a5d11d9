#![no_std]

//! `bitmap-text-rtc` decodes and encodes the register file of the DS3231
//! real-time clock, and drives the chip over any [RegisterBus].
//!
//! Dates are kept in 24-hour form with weekdays numbered 1 (Monday) to
//! 7 (Sunday). The century bit extends the two-digit year register to
//! 2000..=2199. Temperatures are the sensor's signed quarter degrees.

use core::fmt;

use log::debug;
use thiserror::Error;

/// 7-bit I2C address of the DS3231.
pub const I2C_ADDRESS: u8 = 0x68;

/// Register addresses.
pub mod register {
    pub const SECONDS: u8 = 0x00;
    pub const MINUTES: u8 = 0x01;
    pub const HOURS: u8 = 0x02;
    pub const WEEKDAY: u8 = 0x03;
    pub const DAY: u8 = 0x04;
    pub const MONTH: u8 = 0x05;
    pub const YEAR: u8 = 0x06;
    pub const CONTROL: u8 = 0x0E;
    pub const STATUS: u8 = 0x0F;
    pub const TEMP_MSB: u8 = 0x11;
    pub const TEMP_LSB: u8 = 0x12;
}

// Control register
const EOSC: u8 = 1 << 7;
const CONV: u8 = 1 << 5;
// Status register
const OSF: u8 = 1 << 7;
// Hours register
const HOUR_12: u8 = 1 << 6;
const HOUR_PM: u8 = 1 << 5;
// Month register
const CENTURY: u8 = 1 << 7;

const WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

pub const fn bcd_to_dec(bcd: u8) -> u8 {
    (bcd >> 4) * 10 + (bcd & 0x0F)
}

/// Only meaningful for values below 100.
pub const fn dec_to_bcd(dec: u8) -> u8 {
    ((dec / 10) << 4) | (dec % 10)
}

/// Byte-level access to the chip's register file.
pub trait RegisterBus {
    type Error;

    /// Read consecutive registers starting at `start`.
    fn read_registers(&mut self, start: u8, buf: &mut [u8]) -> Result<(), Self::Error>;

    /// Write consecutive registers starting at `start`.
    fn write_registers(&mut self, start: u8, data: &[u8]) -> Result<(), Self::Error>;
}

/// A date/time field outside what the chip can store.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Error)]
#[error("{field} out of range: {value}")]
pub struct InvalidDateTime {
    pub field: &'static str,
    pub value: u16,
}

#[derive(Debug, Error)]
pub enum RtcError<E> {
    #[error("register bus transfer failed")]
    Bus(E),
    #[error(transparent)]
    InvalidDateTime(#[from] InvalidDateTime),
}

/// Calendar date and 24-hour time of day.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct DateTime {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    /// 1 = Monday ... 7 = Sunday
    pub weekday: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl DateTime {
    /// Decode registers `0x00..=0x06`. Both 12 and 24-hour register modes are understood.
    pub fn from_registers(regs: &[u8; 7]) -> Self {
        let hours = regs[2];
        let hour = if hours & HOUR_12 != 0 {
            let hour = bcd_to_dec(hours & 0x1F);
            match (hours & HOUR_PM != 0, hour) {
                (false, 12) => 0,
                (true, 12) => 12,
                (true, h) => h + 12,
                (false, h) => h,
            }
        } else {
            bcd_to_dec(hours & 0x3F)
        };

        let century = if regs[5] & CENTURY != 0 { 100 } else { 0 };

        Self {
            year: 2000 + century + u16::from(bcd_to_dec(regs[6])),
            month: bcd_to_dec(regs[5] & 0x1F),
            day: bcd_to_dec(regs[4] & 0x3F),
            weekday: bcd_to_dec(regs[3] & 0x07),
            hour,
            minute: bcd_to_dec(regs[1] & 0x7F),
            second: bcd_to_dec(regs[0] & 0x7F),
        }
    }

    /// Encode into registers `0x00..=0x06`, always in 24-hour mode.
    pub fn to_registers(&self) -> Result<[u8; 7], InvalidDateTime> {
        self.validate()?;

        let mut month = dec_to_bcd(self.month);
        if self.year >= 2100 {
            month |= CENTURY;
        }

        Ok([
            dec_to_bcd(self.second),
            dec_to_bcd(self.minute),
            dec_to_bcd(self.hour),
            dec_to_bcd(self.weekday),
            dec_to_bcd(self.day),
            month,
            dec_to_bcd((self.year % 100) as u8),
        ])
    }

    pub fn validate(&self) -> Result<(), InvalidDateTime> {
        let checks = [
            ("year", self.year, 2000..=2199),
            ("month", u16::from(self.month), 1..=12),
            ("day", u16::from(self.day), 1..=31),
            ("weekday", u16::from(self.weekday), 1..=7),
            ("hour", u16::from(self.hour), 0..=23),
            ("minute", u16::from(self.minute), 0..=59),
            ("second", u16::from(self.second), 0..=59),
        ];

        for (field, value, range) in checks {
            if !range.contains(&value) {
                return Err(InvalidDateTime { field, value });
            }
        }

        Ok(())
    }

    /// English name of the weekday, `"?"` when the register held garbage.
    pub fn weekday_name(&self) -> &'static str {
        match self.weekday {
            1..=7 => WEEKDAYS[usize::from(self.weekday - 1)],
            _ => "?",
        }
    }
}

impl fmt::Display for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

/// Die temperature in signed quarter degrees Celsius.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Temperature(i16);

impl Temperature {
    /// Decode the two temperature registers: a two's complement integer part
    /// in `msb` and two fraction bits at the top of `lsb`.
    pub fn from_registers(msb: u8, lsb: u8) -> Self {
        Self(i16::from_be_bytes([msb, lsb]) >> 6)
    }

    pub fn from_quarter_degrees(quarters: i16) -> Self {
        Self(quarters)
    }

    pub fn quarter_degrees(self) -> i16 {
        self.0
    }

    pub fn celsius(self) -> f32 {
        f32::from(self.0) / 4.0
    }

    pub fn fahrenheit(self) -> f32 {
        self.celsius() * 1.8 + 32.0
    }
}

/// DS3231 driver over a register bus.
#[derive(Debug)]
pub struct Ds3231<B> {
    bus: B,
}

impl<B: RegisterBus> Ds3231<B> {
    /// Take over the chip, making sure the oscillator runs and clearing the
    /// oscillator-stop flag.
    pub fn new(bus: B) -> Result<Self, RtcError<B::Error>> {
        let mut rtc = Self { bus };
        rtc.update(register::CONTROL, |v| v & !EOSC)?;
        rtc.update(register::STATUS, |v| v & !OSF)?;
        Ok(rtc)
    }

    /// Give the bus back.
    pub fn release(self) -> B {
        self.bus
    }

    fn read(&mut self, reg: u8) -> Result<u8, RtcError<B::Error>> {
        let mut buf = [0];
        self.bus
            .read_registers(reg, &mut buf)
            .map_err(RtcError::Bus)?;
        Ok(buf[0])
    }

    fn update(&mut self, reg: u8, f: impl FnOnce(u8) -> u8) -> Result<(), RtcError<B::Error>> {
        let value = f(self.read(reg)?);
        self.bus
            .write_registers(reg, &[value])
            .map_err(RtcError::Bus)
    }

    pub fn datetime(&mut self) -> Result<DateTime, RtcError<B::Error>> {
        let mut regs = [0; 7];
        self.bus
            .read_registers(register::SECONDS, &mut regs)
            .map_err(RtcError::Bus)?;
        Ok(DateTime::from_registers(&regs))
    }

    /// Set the clock and clear the oscillator-stop flag.
    pub fn set_datetime(&mut self, datetime: &DateTime) -> Result<(), RtcError<B::Error>> {
        let regs = datetime.to_registers()?;
        debug!("setting clock to {}", datetime);

        self.bus
            .write_registers(register::SECONDS, &regs)
            .map_err(RtcError::Bus)?;
        self.update(register::STATUS, |v| v & !OSF)
    }

    /// True if the oscillator stopped since the flag was last cleared, i.e.
    /// the time can not be trusted.
    pub fn oscillator_stopped(&mut self) -> Result<bool, RtcError<B::Error>> {
        Ok(self.read(register::STATUS)? & OSF != 0)
    }

    /// Last converted temperature. The chip converts on its own every 64 seconds.
    pub fn temperature(&mut self) -> Result<Temperature, RtcError<B::Error>> {
        let mut regs = [0; 2];
        self.bus
            .read_registers(register::TEMP_MSB, &mut regs)
            .map_err(RtcError::Bus)?;
        Ok(Temperature::from_registers(regs[0], regs[1]))
    }

    /// Request an immediate conversion. The CONV bit clears itself once the
    /// registers hold the new reading.
    pub fn start_temperature_conversion(&mut self) -> Result<(), RtcError<B::Error>> {
        self.update(register::CONTROL, |v| v | CONV)
    }
}
