/// Minimum and maximum of a sequence of finite values.
///
/// Returns `(INFINITY, NEG_INFINITY)` for an empty input.
#[inline]
#[must_use]
pub fn find_min_max<'a>(values: impl IntoIterator<Item = &'a f64>) -> (f64, f64) {
    values
        .into_iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), &val| {
            (min.min(val), max.max(val))
        })
}

/// Map `value` from `[min, min + range]` onto `0..=255`
#[inline]
#[must_use]
pub fn normalize_to_u8(value: f64, min: f64, range: f64) -> u8 {
    let scaled = ((value - min) / range) * 255.0;
    // Saturating cast: guards against rounding just outside [0, 255]
    scaled.round() as u8
}
