/// Parses a floating point number from user input
///
/// Besides the usual notation, this function accepts:
///
/// * Fortran double precision exponents, e.g., `1.5D+03` or `1.5d-3`
/// * Three-digit exponents written without the exponent letter, as produced by
///   Fortran formatted output when the exponent overflows the field, e.g.,
///   `1.0+100` meaning `1.0E+100` and `2.5-120` meaning `2.5E-120`
///
/// Returns `None` if the token cannot be converted or if the value is not finite,
/// e.g., `nan`, `inf` or `1.0E+400`.
pub fn parse_number(token: &str) -> Option<f64> {
    convert_number(token).filter(|value| value.is_finite())
}

fn convert_number(token: &str) -> Option<f64> {
    let token = token.trim();
    if token.is_empty() {
        return None;
    }
    if let Ok(value) = token.parse::<f64>() {
        return Some(value);
    }
    let fixed = token.replace(['d', 'D'], "E");
    if let Ok(value) = fixed.parse::<f64>() {
        return Some(value);
    }
    if fixed.contains(['e', 'E']) {
        return None;
    }
    // mantissa followed by a signed three-digit exponent
    let bytes = fixed.as_bytes();
    let n = bytes.len();
    if n > 4 && (bytes[n - 4] == b'+' || bytes[n - 4] == b'-') && bytes[n - 3..].iter().all(u8::is_ascii_digit) {
        let (mantissa, exponent) = fixed.split_at(n - 4);
        if mantissa.is_empty() || mantissa.ends_with(['+', '-']) {
            return None;
        }
        return format!("{}E{}", mantissa, exponent).parse::<f64>().ok();
    }
    None
}

/// Parses a leg or table number, returning a descriptive message on failure
pub(crate) fn parse_leg_number(token: &str) -> Result<f64, String> {
    parse_number(token).ok_or_else(|| format!("cannot convert '{}' to a number", token))
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
