//! Steering output lines

use std::io::{self, Write};

/// Team tag prefixed to every output line
pub const DEFAULT_TAG: &str = "Group_05";

/// Significant digits of the default stream formatting of a double
const SIGNIFICANT_DIGITS: i32 = 6;

/// Receives one steering value per emission, in order
pub trait OutputSink {
    fn emit(&mut self, timestamp_us: i64, steering: f64) -> io::Result<()>;
}

/// Writes `<tag>;<timestamp>;<steering>` lines, flushed one at a time
pub struct LineSink<W: Write> {
    writer: W,
    tag: String,
}

impl<W: Write> LineSink<W> {
    pub fn new(writer: W, tag: impl Into<String>) -> Self {
        Self {
            writer,
            tag: tag.into(),
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> OutputSink for LineSink<W> {
    fn emit(&mut self, timestamp_us: i64, steering: f64) -> io::Result<()> {
        writeln!(
            self.writer,
            "{}",
            format_line(&self.tag, timestamp_us, steering)
        )?;
        self.writer.flush()
    }
}

pub fn format_line(tag: &str, timestamp_us: i64, steering: f64) -> String {
    format!("{};{};{}", tag, timestamp_us, format_steering(steering))
}

/// Shortest of fixed or scientific notation with six significant digits,
/// trailing zeros removed (`0.07716`, `-0.3`, `1.23457e+06`, `inf`).
pub fn format_steering(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    // The exponent after rounding to the significant digits decides the notation.
    let scientific = format!("{:.*e}", (SIGNIFICANT_DIGITS - 1) as usize, value);
    let (mantissa, exponent) = match scientific.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (scientific.as_str(), 0),
    };

    if (-4..SIGNIFICANT_DIGITS).contains(&exponent) {
        let decimals = (SIGNIFICANT_DIGITS - 1 - exponent) as usize;
        trim_fraction(&format!("{:.*}", decimals, value)).to_string()
    } else {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!(
            "{}e{}{:02}",
            trim_fraction(mantissa),
            sign,
            exponent.unsigned_abs()
        )
    }
}

fn trim_fraction(digits: &str) -> &str {
    if digits.contains('.') {
        digits.trim_end_matches('0').trim_end_matches('.')
    } else {
        digits
    }
}
