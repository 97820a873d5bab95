//! Small numeric helpers shared by the detection passes.
//!
//! Every ratio here has a defined value for degenerate input (empty
//! slices, zero means, zero-width histograms) so detectors never emit
//! NaN.

/// Arithmetic mean. Returns 0.0 for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation. Returns 0.0 for an empty slice.
pub fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Coefficient of variation (std / mean), the engine's dimensionless
/// spread measure. Defaults to 1.0 when the mean is zero.
pub fn coefficient_of_variation(values: &[f64]) -> f64 {
    let m = mean(values);
    if m == 0.0 {
        return 1.0;
    }
    std_dev(values) / m
}

/// Shannon entropy (bits) of a value distribution, computed over an
/// equal-width histogram with `clamp(n/5, 5, 50)` bins.
///
/// Zero-probability bins are dropped before summing, so a set of
/// identical values (zero-width range, one occupied bin) has entropy 0.
pub fn shannon_entropy(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n_bins = (values.len() / 5).clamp(5, 50);

    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    if !(max > min) {
        return 0.0;
    }

    let width = (max - min) / n_bins as f64;
    let mut counts = vec![0usize; n_bins];
    for &v in values {
        let bin = (((v - min) / width) as usize).min(n_bins - 1);
        counts[bin] += 1;
    }

    let total = values.len() as f64;
    counts
        .iter()
        .filter(|&&c| c > 0)
        .map(|&c| {
            let p = c as f64 / total;
            -p * p.log2()
        })
        .sum()
}

/// Round to `places` decimal places.
pub fn round_dp(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    (value * factor).round() / factor
}
