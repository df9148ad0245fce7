use chrono::{FixedOffset, NaiveDate, Timelike};

use crate::model::{DailySummary, ObservationPoint};

/// Days shown in the multi-day forecast.
pub const FORECAST_DAYS: usize = 5;

/// Group forecast points by local calendar day (in first-seen order) and summarise
/// at most `max_days` of them.
pub fn daily_summaries(
    series: &[ObservationPoint],
    offset: FixedOffset,
    max_days: usize,
) -> Vec<DailySummary> {
    let mut days: Vec<(NaiveDate, Vec<&ObservationPoint>)> = Vec::new();

    for point in series {
        let date = point.time.with_timezone(&offset).date_naive();
        match days.iter_mut().find(|(d, _)| *d == date) {
            Some((_, points)) => points.push(point),
            None => days.push((date, vec![point])),
        }
    }

    days.into_iter()
        .take(max_days)
        .filter_map(|(date, points)| summarise(date, &points, offset))
        .collect()
}

fn summarise(
    date: NaiveDate,
    points: &[&ObservationPoint],
    offset: FixedOffset,
) -> Option<DailySummary> {
    let first = points.first()?;

    let sum: f64 = points.iter().map(|p| p.temperature).sum();
    let max = points.iter().map(|p| p.temperature).fold(f64::NEG_INFINITY, f64::max);
    let min = points.iter().map(|p| p.temperature).fold(f64::INFINITY, f64::min);

    // Most frequent condition; the earliest one wins a tie.
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for p in points {
        match counts.iter_mut().find(|(c, _)| *c == p.condition) {
            Some((_, n)) => *n += 1,
            None => counts.push((&p.condition, 1)),
        }
    }
    let condition = counts
        .iter()
        .fold(None::<(&str, usize)>, |best, &(c, n)| match best {
            Some((_, best_n)) if best_n >= n => best,
            _ => Some((c, n)),
        })
        .map(|(c, _)| c.to_string())
        .unwrap_or_default();

    let icon = points
        .iter()
        .find(|p| (11..=13).contains(&p.time.with_timezone(&offset).hour()))
        .unwrap_or(first)
        .icon
        .clone();

    Some(DailySummary {
        date,
        avg_temperature: sum / points.len() as f64,
        max_temperature: max,
        min_temperature: min,
        condition,
        icon,
        description: first.description.clone(),
    })
}
