//! Turns the provider's 3-hour forecast steps into a dense hourly series.

use chrono::{DateTime, Duration, DurationRound, TimeZone, Utc};

use crate::{
    error::WeatherError,
    model::{ForecastSeries, ObservationPoint},
};

/// Number of points in the dense series.
pub const HOURLY_POINTS: usize = 24;

/// Resample `raw` into [`HOURLY_POINTS`] hourly points starting at the top of the
/// wall-clock hour containing `anchor`, in `anchor`'s own time zone.
///
/// Temperature and feels-like are linearly interpolated between the surrounding
/// raw points; every other field is taken from whichever of the two is closer in
/// time (ties go to the earlier one). Target hours outside the raw range clamp to
/// the nearest edge.
pub fn resample<Tz: TimeZone>(
    raw: &[ObservationPoint],
    anchor: DateTime<Tz>,
) -> Result<ForecastSeries, WeatherError> {
    if raw.is_empty() {
        return Err(WeatherError::InvalidInput(
            "Cannot build an hourly forecast from an empty series".to_string(),
        ));
    }

    let start = anchor
        .duration_trunc(Duration::hours(1))
        .map_err(|e| WeatherError::InvalidInput(format!("Invalid anchor time: {e}")))?
        .with_timezone(&Utc);

    (0..HOURLY_POINTS as i64)
        .map(|i| point_at(raw, start + Duration::hours(i)))
        .collect::<Option<ForecastSeries>>()
        .ok_or_else(|| {
            WeatherError::InvalidInput("Forecast series has no usable points".to_string())
        })
}

fn point_at(raw: &[ObservationPoint], t: DateTime<Utc>) -> Option<ObservationPoint> {
    let before = raw
        .iter()
        .filter(|p| p.time <= t)
        .fold(None::<&ObservationPoint>, |best, p| match best {
            Some(b) if b.time >= p.time => Some(b),
            _ => Some(p),
        });
    let after = raw
        .iter()
        .filter(|p| p.time >= t)
        .fold(None::<&ObservationPoint>, |best, p| match best {
            Some(b) if b.time <= p.time => Some(b),
            _ => Some(p),
        });

    let (before, after) = match (before, after) {
        (Some(b), Some(a)) => (b, a),
        (Some(b), None) => (b, b),
        (None, Some(a)) => (a, a),
        (None, None) => return None,
    };

    if before.time == after.time {
        return Some(ObservationPoint { time: t, ..before.clone() });
    }

    let span = (after.time - before.time).num_seconds() as f64;
    let w = (t - before.time).num_seconds() as f64 / span;

    let closest = if (t - before.time) <= (after.time - t) { before } else { after };

    Some(ObservationPoint {
        time: t,
        temperature: lerp(before.temperature, after.temperature, w),
        feels_like: lerp(before.feels_like, after.feels_like, w),
        ..closest.clone()
    })
}

fn lerp(from: f64, to: f64, w: f64) -> f64 {
    from + (to - from) * w
}
