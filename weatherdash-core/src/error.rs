use thiserror::Error;

/// Errors surfaced by the provider gateway, the place resolver and the aggregator.
///
/// The `Display` output is meant to be shown to the user as-is.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("Place \"{place}\" not found. Please check the spelling or try another city.")]
    NotFound { place: String },

    #[error("API key is invalid. Please check your configuration.")]
    Unauthorized,

    #[error("API rate limit exceeded. Please try again later.")]
    RateLimited,

    #[error(
        "No internet connection while fetching data for {target}. Please check your network and try again."
    )]
    NetworkUnavailable { target: String },

    #[error("{0}")]
    InvalidInput(String),

    #[error("Unable to fetch {what} for {target}. Please try again later. ({detail})")]
    Unknown {
        what: &'static str,
        target: String,
        detail: String,
    },
}

impl WeatherError {
    /// Replace the place named in a `NotFound` error, leaving other variants untouched.
    pub fn relabel_place(self, place: &str) -> Self {
        match self {
            WeatherError::NotFound { .. } => WeatherError::NotFound { place: place.to_string() },
            other => other,
        }
    }
}

/// Device location errors.
#[derive(Debug, Error)]
pub enum LocationError {
    #[error("Location service unavailable: {0}")]
    Unavailable(String),
    #[error("Location request timed out after {0} seconds")]
    Timeout(u64),
    #[error("Location service returned an invalid coordinate")]
    InvalidCoordinate,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_embeds_place() {
        let err = WeatherError::NotFound { place: "Atlantis".into() };
        assert!(err.to_string().contains("\"Atlantis\" not found"));
    }

    #[test]
    fn relabel_only_touches_not_found() {
        let err = WeatherError::NotFound { place: "Xi'an,CN".into() }.relabel_place("xian");
        assert!(matches!(err, WeatherError::NotFound { ref place } if place == "xian"));

        let err = WeatherError::RateLimited.relabel_place("xian");
        assert!(matches!(err, WeatherError::RateLimited));
    }
}
