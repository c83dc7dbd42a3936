use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// A number paired with the exact literal it was read from
///
/// Text numeric VRs (DS, IS) carry formatting that is not recoverable from
/// the parsed value: `"70"` and `"70.0"` parse to the same `f64`, and so do
/// `"1.0e-012"` and `"1e-12"`. Keeping the literal next to the value lets
/// the recombiner write back exactly what was read.
#[derive(Debug, Clone, PartialEq)]
pub struct FormattedNumber {
    pub value: f64,
    pub literal: String,
}

/// Pieces of a numeric literal needed to format another value the same way
#[derive(Debug, Clone, PartialEq, Eq)]
struct LiteralStyle {
    has_point: bool,
    fraction_digits: usize,
    exponent: Option<ExponentStyle>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ExponentStyle {
    upper: bool,
    explicit_plus: bool,
    width: usize,
}

fn literal_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(r"^\s*[-+]?(\d*)(?:\.(\d*))?(?:([eE])([-+]?)(\d+))?\s*$")
            .expect("Failed to compile regex")
    })
}

impl FormattedNumber {
    /// Creates a formatted number from a value and its literal
    pub fn new(value: f64, literal: impl Into<String>) -> Self {
        Self {
            value,
            literal: literal.into(),
        }
    }

    /// Parses a literal, keeping it verbatim
    ///
    /// Returns `None` if the trimmed literal is not a number.
    pub fn parse(literal: &str) -> Option<Self> {
        let value: f64 = literal.trim().parse().ok()?;
        Some(Self::new(value, literal))
    }

    /// Renders the number as DICOM text
    ///
    /// The literal is returned unchanged when it still denotes `value`, or
    /// when there is no number to format (a blank component such as the
    /// second value of `40\`). Otherwise `value` is formatted in the
    /// literal's style: whole numbers lose the `.0` when the literal has no
    /// decimal point, and scientific notation keeps the literal's exponent
    /// padding.
    pub fn render(&self) -> String {
        if !self.value.is_finite() || self.literal_matches_value() {
            return self.literal.clone();
        }
        match self.style() {
            Some(style) => format_with_style(self.value, &style),
            None => format_plain(self.value),
        }
    }

    fn literal_matches_value(&self) -> bool {
        match self.literal.trim().parse::<f64>() {
            Ok(parsed) => parsed == self.value || (parsed.is_nan() && self.value.is_nan()),
            Err(_) => false,
        }
    }

    fn style(&self) -> Option<LiteralStyle> {
        let caps = literal_regex().captures(&self.literal)?;
        let has_point = self.literal.contains('.');
        let fraction_digits = caps.get(2).map(|m| m.as_str().len()).unwrap_or(0);
        let exponent = caps.get(3).map(|e| ExponentStyle {
            upper: e.as_str() == "E",
            explicit_plus: caps.get(4).map(|s| s.as_str() == "+").unwrap_or(false),
            width: caps.get(5).map(|d| d.as_str().len()).unwrap_or(1),
        });
        Some(LiteralStyle {
            has_point,
            fraction_digits,
            exponent,
        })
    }
}

impl fmt::Display for FormattedNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render())
    }
}

/// Shortest round-trip text for a value, without a trailing `.0`
fn format_plain(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

fn format_with_style(value: f64, style: &LiteralStyle) -> String {
    if !value.is_finite() {
        return format!("{}", value);
    }

    if let Some(exp) = &style.exponent {
        // Rust renders `1e-12` / `1.5e3`; rebuild mantissa and exponent
        let rendered = format!("{:.*e}", style.fraction_digits, value);
        let (mantissa, exponent) = rendered.split_once('e').unwrap_or((rendered.as_str(), "0"));
        let (negative, digits) = match exponent.strip_prefix('-') {
            Some(d) => (true, d),
            None => (false, exponent),
        };
        let mut mantissa = mantissa.to_string();
        if style.has_point && !mantissa.contains('.') {
            mantissa.push('.');
        }
        let sign = if negative {
            "-"
        } else if exp.explicit_plus {
            "+"
        } else {
            ""
        };
        let marker = if exp.upper { 'E' } else { 'e' };
        return format!(
            "{}{}{}{:0>width$}",
            mantissa,
            marker,
            sign,
            digits,
            width = exp.width
        );
    }

    if !style.has_point {
        return format_plain(value);
    }

    let mut text = format!("{}", value);
    match text.find('.') {
        Some(pos) => {
            let current = text.len() - pos - 1;
            if current < style.fraction_digits {
                text.extend(std::iter::repeat('0').take(style.fraction_digits - current));
            }
        }
        None => {
            text.push('.');
            text.extend(std::iter::repeat('0').take(style.fraction_digits.max(1)));
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_integral_literal_round_trips() {
        let n = FormattedNumber::parse("70").unwrap();
        assert_eq!(n.value, 70.0);
        assert_eq!(n.render(), "70");
    }

    #[test]
    fn test_exponent_padding_round_trips() {
        let n = FormattedNumber::parse("1.0e-012").unwrap();
        assert_eq!(n.value, 1.0e-12);
        assert_eq!(n.render(), "1.0e-012");
    }

    #[test]
    fn test_literal_kept_verbatim_with_padding() {
        let n = FormattedNumber::parse("0.5 ").unwrap();
        assert_eq!(n.render(), "0.5 ");
    }

    #[rstest]
    #[case(71.0, "70", "71")]
    #[case(2.5e-12, "1.0e-012", "2.5e-012")]
    #[case(3.0, "1.50", "3.00")]
    #[case(3.25, "1.5", "3.25")]
    #[case(1.0e5, "1E+03", "1E+05")]
    fn test_value_formatted_in_literal_style(
        #[case] value: f64,
        #[case] literal: &str,
        #[case] expected: &str,
    ) {
        let n = FormattedNumber::new(value, literal);
        assert_eq!(n.render(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("  ")]
    #[case("n/a")]
    fn test_missing_value_keeps_literal(#[case] literal: &str) {
        let n = FormattedNumber::new(f64::NAN, literal);
        assert_eq!(n.render(), literal);
    }

    #[test]
    fn test_unparsable_literal_falls_back_to_plain() {
        let n = FormattedNumber::new(12.0, "n/a");
        assert_eq!(n.render(), "12");
        assert!(FormattedNumber::parse("n/a").is_none());
    }
}
