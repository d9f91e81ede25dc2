/// Linear interpolation between a and b at t in [0, 1]
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Null-tolerant linear interpolation for optional sensor values.
///
/// Contract: returns the present operand if the other is absent, returns
/// absent only if both are absent, otherwise the standard linear blend.
pub fn lerp_opt(a: Option<f64>, b: Option<f64>, t: f64) -> Option<f64> {
    match (a, b) {
        (Some(a), Some(b)) => Some(lerp(a, b, t)),
        (Some(a), None) => Some(a),
        (None, Some(b)) => Some(b),
        (None, None) => None,
    }
}
