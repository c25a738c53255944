/// Computes the arithmetic mean of a slice of values. Returns 0.0 for empty input.
///
/// Finite inputs give a finite mean even when their sum overflows.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let sum = values.iter().sum::<f64>();
    if sum.is_finite() {
        sum / n
    } else {
        values.iter().map(|v| v / n).sum()
    }
}

/// `part / total` as a whole percentage, rounding halves away from zero
/// (half-up, since both inputs are counts). Returns 0 when `total` is 0.
pub fn round_pct(part: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (part as f64 / total as f64 * 100.0).round() as u32
}
