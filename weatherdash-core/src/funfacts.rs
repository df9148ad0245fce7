//! Calendar trivia shown next to the forecast: solar terms and meteor showers.

use std::{future::Future, time::Duration};

use chrono::{Datelike, NaiveDate};
use tokio::{
    task::JoinHandle,
    time::{Instant, MissedTickBehavior},
};

/// How often the fun facts are refreshed.
pub const FUN_FACTS_REFRESH: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolarTerm {
    pub name: &'static str,
    /// (month, day) the term approximately begins.
    pub starts: (u32, u32),
    pub proverb: &'static str,
    pub weather: &'static str,
}

const fn term(
    name: &'static str,
    starts: (u32, u32),
    proverb: &'static str,
    weather: &'static str,
) -> SolarTerm {
    SolarTerm { name, starts, proverb, weather }
}

/// The 24 solar terms in calendar order from January.
pub static SOLAR_TERMS: [SolarTerm; 24] = [
    term(
        "Minor Cold (Xiaohan)",
        (1, 5),
        "Minor Cold brings ice to rivers and lakes.",
        "Extremely cold temperatures. Lakes and rivers may freeze in northern regions.",
    ),
    term(
        "Major Cold (Dahan)",
        (1, 20),
        "During Major Cold, stay indoors and keep warm.",
        "The coldest period of winter. Extreme cold with heavy snow possible in many regions.",
    ),
    term(
        "Beginning of Spring (Lichun)",
        (2, 3),
        "Spring rain is as precious as oil.",
        "Temperatures begin to rise, though cold spells may still occur. Plants start to show signs of new growth.",
    ),
    term(
        "Rain Water (Yushui)",
        (2, 18),
        "Rain brings a hundred kinds of blessings.",
        "Precipitation increases, with temperatures gradually warming. Melting snow and ice contribute to increased humidity.",
    ),
    term(
        "Awakening of Insects (Jingzhe)",
        (3, 5),
        "When the Awakening of Insects comes, thunder will be heard.",
        "Thunderstorms may begin to appear. The weather becomes noticeably warmer, encouraging insects to emerge.",
    ),
    term(
        "Spring Equinox (Chunfen)",
        (3, 20),
        "If it's sunny on Spring Equinox, the hundred days that follow will bring favorable weather.",
        "Day and night are of equal length. Weather is mild with moderate temperatures and occasional spring showers.",
    ),
    term(
        "Pure Brightness (Qingming)",
        (4, 4),
        "Qingming time, plant melons and beans.",
        "Clear and bright weather with occasional light rain. Perfect time for planting crops.",
    ),
    term(
        "Grain Rain (Guyu)",
        (4, 19),
        "Grain Rain brings enough moisture to wet the ground.",
        "Increased rainfall that nourishes growing crops. Temperatures continue to rise with higher humidity.",
    ),
    term(
        "Beginning of Summer (Lixia)",
        (5, 5),
        "Summer heat comes, and the earth is filled with life.",
        "Temperatures rise significantly. Days become longer and nights shorter. Increased chance of thunderstorms.",
    ),
    term(
        "Grain Buds (Xiaoman)",
        (5, 20),
        "Xiaoman, Xiaoman, grains are filling the fields.",
        "Warm and humid with increasing rainfall. Temperatures continue to rise as summer progresses.",
    ),
    term(
        "Grain in Ear (Mangzhong)",
        (6, 5),
        "Planting at Grain in Ear will still yield a harvest.",
        "Hot and humid with frequent rainfall. The rainy season begins in many regions.",
    ),
    term(
        "Summer Solstice (Xiazhi)",
        (6, 21),
        "The Summer Solstice brings the longest day and shortest night.",
        "Hot temperatures with the longest daylight hours of the year. High humidity and occasional thunderstorms.",
    ),
    term(
        "Minor Heat (Xiaoshu)",
        (7, 6),
        "Minor Heat brings sweat to the brow.",
        "Very hot and humid. Frequent thunderstorms and heavy rainfall in many regions.",
    ),
    term(
        "Major Heat (Dashu)",
        (7, 22),
        "During Major Heat, even the nights are hot.",
        "Extreme heat and humidity. The hottest period of summer with frequent thunderstorms and occasional droughts.",
    ),
    term(
        "Beginning of Autumn (Liqiu)",
        (8, 7),
        "Autumn begins, yet summer heat remains.",
        "Still hot but with occasional cool breezes. Humidity begins to decrease slightly.",
    ),
    term(
        "End of Heat (Chushu)",
        (8, 23),
        "End of Heat brings relief from summer's fury.",
        "Temperatures begin to moderate. Days remain warm but nights become cooler.",
    ),
    term(
        "White Dew (Bailu)",
        (9, 7),
        "White Dew on grass shows autumn's arrival.",
        "Cooler temperatures, especially at night. Morning dew becomes common as humidity condenses in the cooler air.",
    ),
    term(
        "Autumn Equinox (Qiufen)",
        (9, 23),
        "Equal day and night, cool winds arrive.",
        "Day and night are of equal length. Weather becomes cooler with clear skies and lower humidity.",
    ),
    term(
        "Cold Dew (Hanlu)",
        (10, 8),
        "Cold Dew brings frost to high mountains.",
        "Significantly cooler temperatures. Morning dew feels cold, and frost may appear in northern regions.",
    ),
    term(
        "Frost's Descent (Shuangjiang)",
        (10, 23),
        "When frost descends, winter is not far behind.",
        "Cold temperatures with frost appearing in many regions. Trees begin to lose their leaves rapidly.",
    ),
    term(
        "Beginning of Winter (Lidong)",
        (11, 7),
        "Winter begins, store food for the cold days ahead.",
        "Cold temperatures become the norm. Northern regions may see first snowfall.",
    ),
    term(
        "Minor Snow (Xiaoxue)",
        (11, 22),
        "Minor Snow brings the first flakes of winter.",
        "Very cold with light snowfall in northern regions. Southern regions experience cold rain.",
    ),
    term(
        "Major Snow (Daxue)",
        (12, 7),
        "Major Snow covers the world in white.",
        "Heavy snowfall in northern regions. Very cold temperatures throughout most areas.",
    ),
    term(
        "Winter Solstice (Dongzhi)",
        (12, 22),
        "After Winter Solstice, each day brings more light.",
        "The shortest daylight hours of the year. Extremely cold with snow common in northern regions.",
    ),
];

/// Solar term in effect on `date`. Dates before the first term of the year fall
/// in the previous year's last term.
pub fn solar_term(date: NaiveDate) -> &'static SolarTerm {
    let today = (date.month(), date.day());

    SOLAR_TERMS
        .iter()
        .rev()
        .find(|t| t.starts <= today)
        .unwrap_or(&SOLAR_TERMS[SOLAR_TERMS.len() - 1])
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeteorShower {
    pub name: &'static str,
    /// (month, day) the peak begins.
    pub peak_start: (u32, u32),
    pub peak: &'static str,
    pub rate: &'static str,
    pub constellation: &'static str,
}

const fn shower(
    name: &'static str,
    peak_start: (u32, u32),
    peak: &'static str,
    rate: &'static str,
    constellation: &'static str,
) -> MeteorShower {
    MeteorShower { name, peak_start, peak, rate, constellation }
}

pub static METEOR_SHOWERS: [MeteorShower; 9] = [
    shower("Quadrantids", (1, 3), "January 3-4", "40 per hour", "Bootes"),
    shower("Lyrids", (4, 22), "April 22-23", "20 per hour", "Lyra"),
    shower("Eta Aquariids", (5, 5), "May 5-6", "30 per hour", "Aquarius"),
    shower("Delta Aquariids", (7, 28), "July 28-29", "20 per hour", "Aquarius"),
    shower("Perseids", (8, 11), "August 11-13", "100 per hour", "Perseus"),
    shower("Orionids", (10, 21), "October 21-22", "20 per hour", "Orion"),
    shower("Leonids", (11, 17), "November 17-18", "15 per hour", "Leo"),
    shower("Geminids", (12, 13), "December 13-14", "150 per hour", "Gemini"),
    shower("Ursids", (12, 21), "December 21-22", "10 per hour", "Ursa Minor"),
];

pub const METEOR_VIEWING_TIPS: &str = "Best viewed after midnight in areas with minimal light \
     pollution. Allow 20 minutes for your eyes to adjust to the darkness.";

/// First shower peaking strictly after `date`, wrapping into next year.
pub fn next_meteor_shower(date: NaiveDate) -> &'static MeteorShower {
    let today = (date.month(), date.day());

    METEOR_SHOWERS
        .iter()
        .find(|s| s.peak_start > today)
        .unwrap_or(&METEOR_SHOWERS[0])
}

/// Periodic background refresh; the task stops when the handle is dropped.
#[derive(Debug)]
pub struct DailyRefresh {
    handle: JoinHandle<()>,
}

impl DailyRefresh {
    /// Run `task` every `period`, starting one period from now.
    pub fn spawn<F, Fut>(period: Duration, mut task: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                tracing::debug!("Refreshing fun facts");
                task().await;
            }
        });

        Self { handle }
    }
}

impl Drop for DailyRefresh {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
