//! Rendering parsed directives against a guest argument buffer.

use std::fmt::Write as _;

use linmem_core::{Address, FormatError};
use linmem_region::{read_fixed, read_null_terminated, Cursor, Region};

use crate::directive::{parse, Directive};

/// Read the format string at `fmt` and render it with the arguments at
/// `args`.
///
/// The argument cursor is only created once a conversion needs it, so
/// a format string without conversions accepts a null `args`.
pub fn format(region: &Region, fmt: Address, args: Address) -> Result<String, FormatError> {
    let text = read_null_terminated(region, fmt)?;
    render(region, text.as_str(), args)
}

/// [`format`] followed by a newline.
pub fn format_line(region: &Region, fmt: Address, args: Address) -> Result<String, FormatError> {
    let mut out = format(region, fmt, args)?;
    out.push('\n');
    Ok(out)
}

/// Render host-side format text with the arguments at `args`.
pub fn render(region: &Region, fmt: &str, args: Address) -> Result<String, FormatError> {
    let directives = parse(fmt)?;
    let mut out = String::with_capacity(fmt.len());
    let mut cursor: Option<Cursor<'_>> = None;

    for directive in directives {
        if let Directive::Literal(text) = directive {
            out.push_str(text);
            continue;
        }
        let cursor = match &mut cursor {
            Some(c) => c,
            slot @ None => slot.insert(Cursor::new(region, args)?),
        };
        match directive {
            Directive::Literal(_) => {}
            Directive::Unsigned => {
                let _ = write!(out, "{}", cursor.shift_u32()?);
            }
            Directive::Signed => {
                let _ = write!(out, "{}", cursor.shift_i32()?);
            }
            Directive::Str => {
                let ptr = cursor.shift_ptr()?;
                out.push_str(read_null_terminated(region, ptr)?.as_str());
            }
            Directive::Char => {
                out.push(char::from(cursor.shift_i8()? as u8));
            }
            Directive::StrPrecision => {
                let len = cursor.shift_u32()?;
                let ptr = cursor.shift_ptr()?;
                out.push_str(read_fixed(region, ptr, len)?.as_str());
            }
            Directive::Fixed(places) => {
                push_fixed(&mut out, cursor.shift_f64()?, places);
            }
        }
    }

    Ok(out)
}

/// Fixed-point rendering with ties rounded away from zero.
///
/// Infinities are spelled out and negative zero prints as zero.
fn push_fixed(out: &mut String, value: f64, places: usize) {
    if value.is_infinite() {
        out.push_str(if value > 0.0 { "Infinity" } else { "-Infinity" });
        return;
    }
    let value = if value == 0.0 { 0.0 } else { value };
    // Only a value with exactly one binary digit more than `places`
    // can sit halfway between two outputs; its last decimal digit is 5.
    if value.is_finite() && fractional_bits(value) == places as u32 + 1 {
        let exact = format!("{:.*}", places + 1, value.abs());
        let mut kept = &exact[..exact.len() - 1];
        if places == 0 {
            kept = kept.trim_end_matches('.');
        }
        if value < 0.0 {
            out.push('-');
        }
        out.push_str(&round_up_magnitude(kept));
        return;
    }
    let _ = write!(out, "{value:.places$}");
}

/// Number of binary digits after the point in the exact value of `value`.
fn fractional_bits(value: f64) -> u32 {
    let bits = value.to_bits();
    let biased = ((bits >> 52) & 0x7ff) as i32;
    let fraction = bits & ((1 << 52) - 1);
    let (mantissa, exponent) = if biased == 0 {
        (fraction, -1074)
    } else {
        (fraction | (1 << 52), biased - 1075)
    };
    if mantissa == 0 {
        return 0;
    }
    let exponent = exponent + mantissa.trailing_zeros() as i32;
    if exponent >= 0 {
        0
    } else {
        exponent.unsigned_abs()
    }
}

/// Add one unit in the last place to a non-negative decimal string.
fn round_up_magnitude(digits: &str) -> String {
    let mut chars: Vec<char> = digits.chars().collect();
    let mut carry = true;
    for c in chars.iter_mut().rev() {
        match *c {
            '.' => {}
            '9' => *c = '0',
            d => {
                *c = char::from(d as u8 + 1);
                carry = false;
                break;
            }
        }
    }
    let mut out = String::with_capacity(chars.len() + 1);
    if carry {
        out.push('1');
    }
    out.extend(chars);
    out
}
