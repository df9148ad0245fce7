use std::fmt::{self, Write};

use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};
use weatherdash_core::{
    AggregatedWeather, Alert, DailySummary, DashboardView, ObservationPoint, RecentPlaces,
    funfacts::{METEOR_VIEWING_TIPS, next_meteor_shower, solar_term},
};

const COMPASS: [&str; 8] = ["N", "NE", "E", "SE", "S", "SW", "W", "NW"];

pub fn render_view(view: &DashboardView) -> String {
    match (view.weather(), view.error()) {
        (Some(weather), _) => render_weather(weather),
        (None, Some(message)) => format!("{message}\n"),
        (None, None) => "Search for a city to see the weather.\n".to_string(),
    }
}

pub fn render_weather(weather: &AggregatedWeather) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_weather(&mut out, weather);
    out
}

pub fn render_recent(places: &RecentPlaces) -> String {
    if places.is_empty() {
        return "No recent searches.\n".to_string();
    }

    places
        .entries()
        .iter()
        .enumerate()
        .map(|(i, place)| format!("{}. {place}\n", i + 1))
        .collect()
}

pub fn render_fun_facts(date: NaiveDate) -> String {
    let mut out = String::new();
    let _ = write_fun_facts(&mut out, date);
    out
}

fn write_weather(out: &mut impl Write, weather: &AggregatedWeather) -> fmt::Result {
    let offset = local_offset(weather.current.utc_offset_secs);
    let current = &weather.current;
    let place = match &current.country {
        Some(country) => format!("{}, {country}", current.name),
        None => current.name.clone(),
    };

    writeln!(out, "{} ({place})", weather.display_name)?;
    writeln!(out, "{}", "=".repeat(40))?;
    write_current(out, &current.observation, offset)?;

    if !weather.alerts.is_empty() {
        writeln!(out, "\nAlerts")?;
        for alert in &weather.alerts {
            write_alert(out, alert, offset)?;
        }
    }

    if !weather.hourly.is_empty() {
        writeln!(out, "\nNext 24 hours")?;
        for point in &weather.hourly {
            write_hour(out, point, offset)?;
        }
    }

    if !weather.daily.is_empty() {
        writeln!(out, "\n{}-day forecast", weather.daily.len())?;
        for day in &weather.daily {
            write_day(out, day)?;
        }
    }

    Ok(())
}

fn write_fun_facts(out: &mut impl Write, date: NaiveDate) -> fmt::Result {
    let term = solar_term(date);
    let shower = next_meteor_shower(date);

    writeln!(out, "Solar term: {}", term.name)?;
    writeln!(out, "  \"{}\"", term.proverb)?;
    writeln!(out, "  {}", term.weather)?;
    writeln!(out, "Next meteor shower: {} ({})", shower.name, shower.peak)?;
    writeln!(out, "  Up to {} from {}", shower.rate, shower.constellation)?;
    writeln!(out, "  {METEOR_VIEWING_TIPS}")
}

fn write_current(out: &mut impl Write, obs: &ObservationPoint, offset: FixedOffset) -> fmt::Result {
    writeln!(out, "As of {}", local_time(obs.time, offset).format("%Y-%m-%d %H:%M"))?;
    writeln!(
        out,
        "{:.1}°C (feels like {:.1}°C), {}",
        obs.temperature,
        obs.feels_like,
        capitalize(&obs.description)
    )?;
    writeln!(
        out,
        "Humidity {}%  Pressure {} hPa  Wind {:.1} m/s {}  Clouds {}%",
        obs.humidity,
        obs.pressure,
        obs.wind_speed,
        compass(obs.wind_direction),
        obs.cloud_cover
    )
}

fn write_alert(out: &mut impl Write, alert: &Alert, offset: FixedOffset) -> fmt::Result {
    writeln!(
        out,
        "! {} ({}) {} to {}",
        alert.event,
        alert.source,
        local_time(alert.start, offset).format("%a %H:%M"),
        local_time(alert.end, offset).format("%a %H:%M"),
    )?;
    if !alert.description.is_empty() {
        writeln!(out, "  {}", alert.description.trim())?;
    }
    Ok(())
}

fn write_hour(out: &mut impl Write, point: &ObservationPoint, offset: FixedOffset) -> fmt::Result {
    let pop = point
        .precipitation_probability
        .map(|p| format!("{:>3.0}%", p * 100.0))
        .unwrap_or_else(|| "   -".to_string());

    writeln!(
        out,
        "{}  {:>5.1}°C  {pop}  {}",
        local_time(point.time, offset).format("%H:%M"),
        point.temperature,
        point.description
    )
}

fn write_day(out: &mut impl Write, day: &DailySummary) -> fmt::Result {
    writeln!(
        out,
        "{}  {:>5.1}°C / {:>5.1}°C  avg {:>5.1}°C  {}",
        day.date.format("%a %m-%d"),
        day.max_temperature,
        day.min_temperature,
        day.avg_temperature,
        day.condition
    )
}

fn local_offset(secs: i32) -> FixedOffset {
    FixedOffset::east_opt(secs).unwrap_or_else(|| Utc.fix())
}

fn local_time(time: DateTime<Utc>, offset: FixedOffset) -> DateTime<FixedOffset> {
    time.with_timezone(&offset)
}

fn compass(degrees: u16) -> &'static str {
    let sector = ((f64::from(degrees % 360) + 22.5) / 45.0) as usize % COMPASS.len();
    COMPASS[sector]
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
