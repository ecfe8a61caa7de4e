use rand::Rng;
use serde::Serialize;
use time::{Date, Duration};

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DailyOutlook {
    pub day: u32,
    pub aqi: u32,
    /// `YYYY-MM-DD`
    pub date: String,
}

/// Random walk of daily AQI for a week starting `today`, bounded to `0..=200`.
pub fn seven_day_outlook<R: Rng + ?Sized>(
    current_aqi: u32,
    today: Date,
    rng: &mut R,
) -> Vec<DailyOutlook> {
    let mut aqi = f64::from(current_aqi);
    (0..7u32)
        .map(|offset| {
            aqi = (aqi + rng.gen_range(-10.0..10.0)).clamp(0.0, 200.0);
            DailyOutlook {
                day: offset + 1,
                aqi: aqi.round() as u32,
                date: (today + Duration::days(i64::from(offset))).to_string(),
            }
        })
        .collect()
}
