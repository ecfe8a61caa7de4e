/// City used when a request does not name one.
pub const DEFAULT_CITY: &str = "New York";

/// Polynomial rolling hash (multiplier 31) over the city's UTF-16 code
/// units, returned as its absolute value.
///
/// Only the shifted term wraps to 32 bits; the running sum keeps its full
/// width, so the seed can exceed `i32::MAX`.
pub fn city_seed(city: &str) -> u64 {
    let hash = city.encode_utf16().fold(0i64, |hash, unit| {
        let shifted = i64::from((hash as i32) << 5);
        i64::from(unit).wrapping_add(shifted.wrapping_sub(hash))
    });
    hash.unsigned_abs()
}

/// Stable "current AQI" for a city, always in `20..=199`.
pub fn current_aqi(city: &str) -> u32 {
    // < 200, fits
    (city_seed(city) % 180) as u32 + 20
}
