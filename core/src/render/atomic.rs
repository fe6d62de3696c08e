//! Atomic vectors and `CHARSXP` scalars

use std::fmt::Write;

use super::layout::{self, Align};
use super::{Ctx, Mode, Renderer, Result};
use crate::handle::Handle;
use crate::runtime::Complex;
use crate::types::{NA_INTEGER, SexpType, is_na_real};

impl Renderer<'_> {
    pub(super) fn atomic(&self, out: &mut String, x: Handle<'_>, ty: SexpType, ctx: Ctx) -> Result {
        let len = self.runtime.length(x);
        let limits = *self.limits(ctx.mode);

        match ctx.mode {
            Mode::Print => {
                self.print_class_prefix(out, x)?;
                if len == 0 {
                    out.push_str(empty_vector(ty));
                    return Ok(());
                }
                let names = self.names(x)?;
                let shown = len.min(limits.max_elements.max(1));
                let elements = self.elements(x, ty, shown, Mode::Print)?;
                if len == 1 && names.is_none() {
                    out.push_str(&elements[0]);
                    return Ok(());
                }

                out.push('[');
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    if let Some(names) = names {
                        let name = self.name_at(names, i)?;
                        if !name.is_empty() {
                            write!(out, "{} = ", super::language::quote_symbol(&name))?;
                        }
                    }
                    out.push_str(element);
                }
                if shown < len {
                    out.push_str(", ...");
                }
                out.push(']');
                Ok(())
            }
            Mode::Display => {
                if len == 0 {
                    out.push_str(empty_vector(ty));
                } else {
                    let shown = len.min(limits.max_elements.max(1));
                    let elements = self.elements(x, ty, shown, Mode::Display)?;
                    match self.names(x)? {
                        Some(names) => {
                            let names = (0..shown)
                                .map(|i| self.name_at(names, i))
                                .collect::<Result<Vec<_>>>()?;
                            out.push_str(&layout::named(&names, &elements, limits.width));
                        }
                        None => {
                            let align = match ty {
                                SexpType::String => Align::Left,
                                _ => Align::Right,
                            };
                            out.push_str(&layout::indexed(&elements, limits.width, align));
                        }
                    }
                    layout::omitted(out, len - shown);
                }
                self.display_attributes(out, x, ctx)
            }
            Mode::Inspect => {
                if len == 0 {
                    return Ok(());
                }
                if !self.can_descend(ctx) {
                    out.push_str(" ...");
                    return Ok(());
                }
                let shown = len.min(limits.max_elements);
                if ty == SexpType::String {
                    for i in 0..shown {
                        self.inspect_line(out, ctx, &format!("[{}] ", i + 1));
                        self.child_value(out, x, self.runtime.string_elt(x, i), "STRING_ELT", ctx.deeper())?;
                    }
                } else {
                    let elements = self.elements(x, ty, shown, Mode::Inspect)?;
                    for (i, element) in elements.iter().enumerate() {
                        self.inspect_line(out, ctx, &format!("[{}] {element}", i + 1));
                    }
                }
                self.inspect_omitted(out, ctx, len - shown);
                Ok(())
            }
        }
    }

    pub(super) fn char(&self, out: &mut String, x: Handle<'_>, ctx: Ctx) -> Result {
        let text = match self.runtime.char_bytes(x) {
            Some(bytes) => quote(&String::from_utf8_lossy(bytes)),
            None => "NA".to_string(),
        };
        match ctx.mode {
            Mode::Print => out.push_str(&text),
            Mode::Display => write!(out, "<CHARSXP: {text}>")?,
            Mode::Inspect => write!(out, " {text}")?,
        }
        Ok(())
    }

    /// Format the first `n` elements of an atomic vector
    pub(super) fn elements(&self, x: Handle<'_>, ty: SexpType, n: usize, mode: Mode) -> Result<Vec<String>> {
        let rt = self.runtime;
        let elements = match ty {
            SexpType::Logical => (0..n).map(|i| format_logical(rt.logical_elt(x, i))).collect(),
            SexpType::Integer => (0..n)
                .map(|i| format_integer(rt.integer_elt(x, i), mode == Mode::Print))
                .collect(),
            SexpType::Real => {
                let values: Vec<f64> = (0..n).map(|i| rt.real_elt(x, i)).collect();
                if mode == Mode::Display {
                    format_reals(&values)
                } else {
                    values.into_iter().map(format_real).collect()
                }
            }
            SexpType::Complex => (0..n).map(|i| format_complex(rt.complex_elt(x, i))).collect(),
            SexpType::Raw => (0..n).map(|i| format!("{:02x}", rt.raw_elt(x, i))).collect(),
            SexpType::String => {
                let mut elements = Vec::with_capacity(n);
                for i in 0..n {
                    self.visit()?;
                    let mut element = String::new();
                    self.guarded(&mut element, |element| {
                        let ptr = self.child(x, rt.string_elt(x, i), "STRING_ELT")?;
                        match self.char_text(ptr)? {
                            Some(text) => element.push_str(&quote(&text)),
                            None => element.push_str("NA"),
                        }
                        Ok(())
                    })?;
                    elements.push(element);
                }
                elements
            }
            _ => Vec::new(),
        };
        Ok(elements)
    }
}

/// `character(0)` and friends
pub(super) fn empty_vector(ty: SexpType) -> &'static str {
    match ty {
        SexpType::Logical => "logical(0)",
        SexpType::Integer => "integer(0)",
        SexpType::Real => "numeric(0)",
        SexpType::Complex => "complex(0)",
        SexpType::String => "character(0)",
        SexpType::Raw => "raw(0)",
        _ => "NULL",
    }
}

pub(super) fn format_logical(value: i32) -> String {
    let text = match value {
        NA_INTEGER => "NA",
        0 => "FALSE",
        _ => "TRUE",
    };
    text.to_string()
}

pub(super) fn format_integer(value: i32, suffix: bool) -> String {
    match value {
        NA_INTEGER => "NA".to_string(),
        v if suffix => format!("{v}L"),
        v => v.to_string(),
    }
}

pub(super) fn format_real(value: f64) -> String {
    format_reals(&[value]).pop().unwrap_or_default()
}

/// Format doubles with a shared notation and precision, at most 7
/// significant digits each
///
/// Fixed notation is used unless scientific notation is narrower.
pub(super) fn format_reals(values: &[f64]) -> Vec<String> {
    let finite: Vec<(f64, Digits)> = values
        .iter()
        .filter(|v| v.is_finite())
        .map(|&v| (if v == 0.0 { 0.0 } else { v }, Digits::of(v)))
        .collect();

    let mut fixed_decimals = 0;
    let mut sci_decimals = 0;
    for (_, digits) in &finite {
        let decimals = digits.sig as i32 - 1 - digits.exp;
        fixed_decimals = fixed_decimals.max(decimals.clamp(0, 15) as usize);
        sci_decimals = sci_decimals.max(digits.sig - 1);
    }

    let fixed_width = finite
        .iter()
        .map(|(v, _)| format!("{v:.fixed_decimals$}").len())
        .max()
        .unwrap_or(0);
    let sci_width = finite
        .iter()
        .map(|(v, _)| scientific(*v, sci_decimals).len())
        .max()
        .unwrap_or(0);
    let use_fixed = fixed_width <= sci_width;

    values
        .iter()
        .map(|&v| {
            if is_na_real(v) {
                "NA".to_string()
            } else if v.is_nan() {
                "NaN".to_string()
            } else if v.is_infinite() {
                let inf = if v > 0.0 { "Inf" } else { "-Inf" };
                inf.to_string()
            } else {
                let v = if v == 0.0 { 0.0 } else { v };
                if use_fixed {
                    format!("{v:.fixed_decimals$}")
                } else {
                    scientific(v, sci_decimals)
                }
            }
        })
        .collect()
}

/// Significant digits and decimal exponent after rounding to 7 digits
struct Digits {
    sig: usize,
    exp: i32,
}

impl Digits {
    fn of(value: f64) -> Self {
        if value == 0.0 {
            return Self { sig: 1, exp: 0 };
        }
        let formatted = format!("{:.6e}", value.abs());
        let (mantissa, exp) = formatted.split_once('e').unwrap_or((&formatted, "0"));
        let sig = mantissa
            .chars()
            .filter(char::is_ascii_digit)
            .collect::<String>()
            .trim_end_matches('0')
            .len();
        Self {
            sig: sig.max(1),
            exp: exp.parse().unwrap_or(0),
        }
    }
}

/// `1.5e+20`, with at least two exponent digits
fn scientific(value: f64, decimals: usize) -> String {
    let formatted = format!("{value:.decimals$e}");
    match formatted.split_once('e') {
        Some((mantissa, exp)) => {
            let exp: i32 = exp.parse().unwrap_or(0);
            let sign = if exp < 0 { '-' } else { '+' };
            format!("{mantissa}e{sign}{:02}", exp.abs())
        }
        None => formatted,
    }
}

pub(super) fn format_complex(value: Complex) -> String {
    if is_na_real(value.re) || is_na_real(value.im) {
        return "NA".to_string();
    }
    let sign = if value.im.is_sign_negative() && !value.im.is_nan() { '-' } else { '+' };
    format!("{}{sign}{}i", format_real(value.re), format_real(value.im.abs()))
}

/// Double-quote a string, escaping quotes, backslashes and control characters
pub(super) fn quote(text: &str) -> String {
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('"');
    for c in text.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\t' => quoted.push_str("\\t"),
            '\r' => quoted.push_str("\\r"),
            c if c.is_control() => {
                let _ = write!(quoted, "\\u{{{:x}}}", c as u32);
            }
            c => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::na_real;

    #[test]
    fn test_format_real_significant_digits() {
        assert_eq!(format_real(1.0), "1");
        assert_eq!(format_real(0.1 + 0.2), "0.3");
        assert_eq!(format_real(1.0 / 3.0), "0.3333333");
        assert_eq!(format_real(-2.5), "-2.5");
        assert_eq!(format_real(123456789.0), "123456789");
        assert_eq!(format_real(0.0), "0");
        assert_eq!(format_real(-0.0), "0");
    }

    #[test]
    fn test_format_real_scientific_when_narrower() {
        assert_eq!(format_real(100000.0), "1e+05");
        assert_eq!(format_real(1e20), "1e+20");
        assert_eq!(format_real(1234567890123.0), "1.234568e+12");
        assert_eq!(format_real(0.0001), "1e-04");
        assert_eq!(format_real(0.001), "0.001");
        assert_eq!(format_real(1e-300), "1e-300");
    }

    #[test]
    fn test_format_real_special_values() {
        assert_eq!(format_real(na_real()), "NA");
        assert_eq!(format_real(f64::NAN), "NaN");
        assert_eq!(format_real(f64::INFINITY), "Inf");
        assert_eq!(format_real(f64::NEG_INFINITY), "-Inf");
    }

    #[test]
    fn test_format_reals_share_precision() {
        assert_eq!(format_reals(&[1.0, 2.5]), vec!["1.0", "2.5"]);
        assert_eq!(format_reals(&[1.0, na_real(), 3.25]), vec!["1.00", "NA", "3.25"]);
        assert_eq!(format_reals(&[1.0, 1e10]), vec!["1e+00", "1e+10"]);
    }

    #[test]
    fn test_format_integer_and_logical() {
        assert_eq!(format_integer(3, true), "3L");
        assert_eq!(format_integer(-3, false), "-3");
        assert_eq!(format_integer(NA_INTEGER, true), "NA");
        assert_eq!(format_logical(1), "TRUE");
        assert_eq!(format_logical(0), "FALSE");
        assert_eq!(format_logical(NA_INTEGER), "NA");
    }

    #[test]
    fn test_format_complex() {
        assert_eq!(format_complex(Complex { re: 1.0, im: 2.0 }), "1+2i");
        assert_eq!(format_complex(Complex { re: 0.5, im: -1.0 }), "0.5-1i");
        assert_eq!(format_complex(Complex { re: na_real(), im: 0.0 }), "NA");
    }

    #[test]
    fn test_quote_escapes() {
        assert_eq!(quote("abc"), "\"abc\"");
        assert_eq!(quote("a\"b"), "\"a\\\"b\"");
        assert_eq!(quote("line\nbreak"), "\"line\\nbreak\"");
        assert_eq!(quote("back\\slash"), "\"back\\\\slash\"");
        assert_eq!(quote("\u{7}"), "\"\\u{7}\"");
    }
}
