//! Shared pieces of the PEP algebra: the operator enum, number formatting and the helpers
//! used to print linear combinations.

use strum_macros::{Display, EnumIter, EnumString};

/// Binary operator stored in a composite Parameter, Vector or Scalar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Op {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

/// Prefix of gradient tags: the gradient at the point tagged `x_1` is `grad_x_1`.
pub const GRADIENT: &str = "grad";

/// Gradient tag for the base tag (the function value typically).
pub fn grad_tag(base_tag: &str) -> String {
    format!("{}_{}", GRADIENT, base_tag)
}

/// Formats a float with 4 significant digits, like C's `%.4g`.
///
/// ```rust, ignore
/// assert_eq!(numerical_str(0.1), "0.1");
/// assert_eq!(numerical_str(123456.0), "1.235e+05");
/// ```
pub fn numerical_str(val: f64) -> String {
    if val.is_nan() {
        return "nan".to_string();
    }
    if val.is_infinite() {
        return if val > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    // rounding to 4 significant digits decides the exponent
    let sci = format!("{:.3e}", val);
    let (mantissa, exponent) = match sci.split_once('e') {
        Some((m, e)) => (m.to_string(), e.parse::<i32>().unwrap_or(0)),
        None => (sci.clone(), 0),
    };
    if !(-4..4).contains(&exponent) {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!(
            "{}e{}{:02}",
            strip_trailing_zeros(&mantissa),
            sign,
            exponent.abs()
        )
    } else {
        let decimals = (3 - exponent) as usize;
        strip_trailing_zeros(&format!("{:.*}", decimals, val))
    }
}

fn strip_trailing_zeros(s: &str) -> String {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        s.to_string()
    }
}

/// Joins terms of the form `"+ 2*x "`, `"- y "` into `2*x - y`; nothing left prints as `0`.
pub fn join_terms<I, S>(terms: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let joined: String = terms.into_iter().map(|t| t.as_ref().to_string()).collect();
    let trimmed = joined.trim();
    if let Some(rest) = trimmed.strip_prefix("+ ") {
        rest.to_string()
    } else if let Some(rest) = trimmed.strip_prefix("- ") {
        format!("-{}", rest)
    } else if trimmed.is_empty() {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}
