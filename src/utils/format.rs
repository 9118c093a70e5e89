/// Render a float in shortest round-trip form, keeping a trailing `.0` for
/// integral values (`45.0`, `23.457`, `-1.25`).
pub fn format_float(value: f64) -> String {
    format!("{:?}", value)
}

/// Render an optional value, missing or NaN as an empty field
pub fn format_optional(value: Option<f64>) -> String {
    match value {
        Some(v) if !v.is_nan() => format_float(v),
        _ => String::new(),
    }
}

/// Round to `decimals` places, ties to even
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round_ties_even() / factor
}
