//! Human-readable durations and percentages.

const UNITS: [&str; 4] = ["d", "h", "m", "s"];
const CLOCK_RADICES: [u64; 3] = [60, 60, 24];

/// Splits `source` into mixed-radix digits, most significant first.
///
/// `radices` are listed least significant first, so `[60, 60, 24]` turns a
/// second count into days, hours, minutes and seconds. The result has one more
/// element than `radices`; zero radices are ignored.
pub fn radix_transform(source: u64, radices: &[u64]) -> Vec<u64> {
    let mut digits = Vec::with_capacity(radices.len() + 1);
    let mut rest = source;
    for &radix in radices {
        if radix == 0 {
            continue;
        }
        digits.push(rest % radix);
        rest /= radix;
    }
    digits.push(rest);
    digits.reverse();
    digits
}

/// Formats a second count as `1d3h46m40s`.
///
/// The sign is ignored. Leading zero components are dropped; inner and
/// trailing zeros are kept, so a whole day is `1d0h0m0s`.
pub fn format_duration(seconds: i64) -> String {
    let digits = radix_transform(seconds.unsigned_abs(), &CLOCK_RADICES);

    let mut out = String::new();
    for (value, unit) in digits
        .iter()
        .zip(UNITS)
        .skip_while(|(value, _)| **value == 0)
    {
        out.push_str(&value.to_string());
        out.push_str(unit);
    }

    if out.is_empty() {
        return "0s".to_string();
    }
    out
}

/// Formats a fraction as a percentage, e.g. `0.125` with two decimals is `12.50%`.
pub fn format_percentage(fraction: f64, decimals: usize) -> String {
    format!("{:.*}%", decimals, fraction * 100.0)
}
