//! Format string tokenizer.

use linmem_core::FormatError;
use smallvec::SmallVec;

/// One piece of a parsed format string.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Directive<'a> {
    /// Text copied verbatim.
    Literal(&'a str),
    /// `%zu`
    Unsigned,
    /// `%d`
    Signed,
    /// `%s`
    Str,
    /// `%c`
    Char,
    /// `%.*s`
    StrPrecision,
    /// `%.Nf` with the digit count taken from the format text.
    Fixed(usize),
}

impl Directive<'_> {
    /// Number of argument slots this directive consumes.
    pub fn arity(&self) -> usize {
        match self {
            Self::Literal(_) => 0,
            Self::StrPrecision => 2,
            _ => 1,
        }
    }
}

/// Largest digit count accepted by `%.Nf`.
pub const MAX_PRECISION: usize = 100;

/// Parsed format string. Most guest format strings fit inline.
pub type Directives<'a> = SmallVec<[Directive<'a>; 8]>;

/// The first `chars` characters of `text`, for error messages.
fn leading(text: &str, chars: usize) -> String {
    let end = text
        .char_indices()
        .nth(chars)
        .map_or(text.len(), |(i, _)| i);
    text[..end].to_string()
}

fn unsupported(rest: &str, chars: usize) -> FormatError {
    FormatError::Unsupported {
        specifier: leading(rest, chars),
    }
}

/// Split `fmt` into literals and conversions.
///
/// Conversions are matched in a fixed order, so `%zu` is recognised
/// before `%d`. The first unrecognised conversion aborts parsing.
pub fn parse(fmt: &str) -> Result<Directives<'_>, FormatError> {
    let mut out = Directives::new();
    let mut rest = fmt;

    while !rest.is_empty() {
        let Some(at) = rest.find('%') else {
            out.push(Directive::Literal(rest));
            break;
        };
        if at > 0 {
            out.push(Directive::Literal(&rest[..at]));
        }
        rest = &rest[at..];

        let (directive, consumed) = if rest.starts_with("%zu") {
            (Directive::Unsigned, 3)
        } else if rest.starts_with("%d") {
            (Directive::Signed, 2)
        } else if rest.starts_with("%s") {
            (Directive::Str, 2)
        } else if rest.starts_with("%c") {
            (Directive::Char, 2)
        } else if let Some(precision) = rest.strip_prefix("%.") {
            parse_precision(rest, precision)?
        } else {
            return Err(unsupported(rest, 2));
        };
        out.push(directive);
        rest = &rest[consumed..];
    }

    Ok(out)
}

/// Parse the part of a `%.` conversion after the dot.
fn parse_precision<'a>(
    whole: &'a str,
    precision: &'a str,
) -> Result<(Directive<'a>, usize), FormatError> {
    if let Some(after) = precision.strip_prefix('*') {
        if after.starts_with('s') {
            return Ok((Directive::StrPrecision, 4));
        }
        return Err(FormatError::PrecisionRequiresString {
            specifier: leading(whole, 4),
        });
    }

    let digits = precision.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return Err(unsupported(whole, 3));
    }
    let spec_len = 2 + digits;
    if !precision[digits..].starts_with('f') {
        return Err(FormatError::PrecisionRequiresFloat {
            specifier: leading(whole, spec_len + 1),
        });
    }
    // Overlong digit runs fail to parse and are out of range too.
    let places = precision[..digits]
        .parse::<usize>()
        .ok()
        .filter(|&places| places <= MAX_PRECISION)
        .ok_or_else(|| FormatError::PrecisionOutOfRange {
            specifier: leading(whole, spec_len + 1),
            max: MAX_PRECISION,
        })?;
    Ok((Directive::Fixed(places), spec_len + 1))
}
