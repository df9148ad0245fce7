//! Maps user-typed place names onto identifiers the provider recognises.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::{error::WeatherError, model::Coordinate, provider::WeatherProvider};

/// Names that the provider resolves poorly on their own, keyed by lowercase form
/// without internal whitespace.
static PLACE_TABLE: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    [
        ("xiamen", "Xiamen,CN"),
        ("fuzhou", "Fuzhou,CN"),
        ("quanzhou", "Quanzhou,CN"),
        ("beijing", "Beijing,CN"),
        ("shanghai", "Shanghai,CN"),
        ("guangzhou", "Guangzhou,CN"),
        ("shenzhen", "Shenzhen,CN"),
        ("hangzhou", "Hangzhou,CN"),
        ("chengdu", "Chengdu,CN"),
        ("nanjing", "Nanjing,CN"),
        ("wuhan", "Wuhan,CN"),
        ("xian", "Xi'an,CN"),
        ("xi'an", "Xi'an,CN"),
        ("tianjin", "Tianjin,CN"),
        ("chongqing", "Chongqing,CN"),
        ("suzhou", "Suzhou,CN"),
        ("dalian", "Dalian,CN"),
        ("qingdao", "Qingdao,CN"),
        ("shenyang", "Shenyang,CN"),
        ("ningbo", "Ningbo,CN"),
        ("changsha", "Changsha,CN"),
        ("kunming", "Kunming,CN"),
        ("harbin", "Harbin,CN"),
        ("jinan", "Jinan,CN"),
        ("nanchang", "Nanchang,CN"),
        ("hefei", "Hefei,CN"),
        ("zhengzhou", "Zhengzhou,CN"),
        ("dongguan", "Dongguan,CN"),
        ("wuxi", "Wuxi,CN"),
        ("newyork", "New York,US"),
        ("losangeles", "Los Angeles,US"),
        ("sanfrancisco", "San Francisco,US"),
        ("chicago", "Chicago,US"),
        ("houston", "Houston,US"),
        ("philadelphia", "Philadelphia,US"),
        ("phoenix", "Phoenix,US"),
        ("sandiego", "San Diego,US"),
        ("dallas", "Dallas,US"),
        ("austin", "Austin,US"),
        ("seattle", "Seattle,US"),
        ("boston", "Boston,US"),
        ("lasvegas", "Las Vegas,US"),
        ("miami", "Miami,US"),
        ("london", "London,GB"),
        ("manchester", "Manchester,GB"),
        ("liverpool", "Liverpool,GB"),
        ("birmingham", "Birmingham,GB"),
        ("glasgow", "Glasgow,GB"),
        ("paris", "Paris,FR"),
        ("marseille", "Marseille,FR"),
        ("lyon", "Lyon,FR"),
        ("toulouse", "Toulouse,FR"),
        ("nice", "Nice,FR"),
        ("tokyo", "Tokyo,JP"),
        ("osaka", "Osaka,JP"),
        ("kyoto", "Kyoto,JP"),
        ("sapporo", "Sapporo,JP"),
        ("yokohama", "Yokohama,JP"),
        ("seoul", "Seoul,KR"),
        ("busan", "Busan,KR"),
        ("incheon", "Incheon,KR"),
        ("singapore", "Singapore,SG"),
        ("sydney", "Sydney,AU"),
        ("melbourne", "Melbourne,AU"),
        ("brisbane", "Brisbane,AU"),
        ("perth", "Perth,AU"),
        ("adelaide", "Adelaide,AU"),
        ("toronto", "Toronto,CA"),
        ("vancouver", "Vancouver,CA"),
        ("montreal", "Montreal,CA"),
        ("calgary", "Calgary,CA"),
        ("ottawa", "Ottawa,CA"),
        ("dubai", "Dubai,AE"),
        ("abudhabi", "Abu Dhabi,AE"),
        ("moscow", "Moscow,RU"),
        ("saintpetersburg", "Saint Petersburg,RU"),
        ("berlin", "Berlin,DE"),
        ("munich", "Munich,DE"),
        ("hamburg", "Hamburg,DE"),
        ("frankfurt", "Frankfurt,DE"),
        ("cologne", "Cologne,DE"),
        ("rome", "Rome,IT"),
        ("milan", "Milan,IT"),
        ("naples", "Naples,IT"),
        ("turin", "Turin,IT"),
        ("florence", "Florence,IT"),
        ("madrid", "Madrid,ES"),
        ("barcelona", "Barcelona,ES"),
        ("valencia", "Valencia,ES"),
        ("seville", "Seville,ES"),
        ("amsterdam", "Amsterdam,NL"),
        ("rotterdam", "Rotterdam,NL"),
        ("bangkok", "Bangkok,TH"),
        ("phuket", "Phuket,TH"),
        ("mumbai", "Mumbai,IN"),
        ("delhi", "Delhi,IN"),
        ("bangalore", "Bangalore,IN"),
        ("hyderabad", "Hyderabad,IN"),
        ("chennai", "Chennai,IN"),
        ("cairo", "Cairo,EG"),
        ("alexandria", "Alexandria,EG"),
        ("riodejaneiro", "Rio de Janeiro,BR"),
        ("saopaulo", "Sao Paulo,BR"),
        ("brasilia", "Brasilia,BR"),
        ("mexicocity", "Mexico City,MX"),
        ("cancun", "Cancun,MX"),
        ("buenosaires", "Buenos Aires,AR"),
        ("lima", "Lima,PE"),
        ("santiago", "Santiago,CL"),
        ("bogota", "Bogota,CO"),
        ("caracas", "Caracas,VE"),
        ("lisbon", "Lisbon,PT"),
        ("porto", "Porto,PT"),
        ("athens", "Athens,GR"),
        ("istanbul", "Istanbul,TR"),
        ("antalya", "Antalya,TR"),
        ("vienna", "Vienna,AT"),
        ("zurich", "Zurich,CH"),
        ("geneva", "Geneva,CH"),
        ("brussels", "Brussels,BE"),
        ("copenhagen", "Copenhagen,DK"),
        ("oslo", "Oslo,NO"),
        ("stockholm", "Stockholm,SE"),
        ("helsinki", "Helsinki,FI"),
        ("warsaw", "Warsaw,PL"),
        ("prague", "Prague,CZ"),
        ("budapest", "Budapest,HU"),
        ("dublin", "Dublin,IE"),
        ("auckland", "Auckland,NZ"),
        ("wellington", "Wellington,NZ"),
        ("johannesburg", "Johannesburg,ZA"),
        ("capetown", "Cape Town,ZA"),
        ("casablanca", "Casablanca,MA"),
        ("nairobi", "Nairobi,KE"),
        ("lagos", "Lagos,NG"),
        ("tehran", "Tehran,IR"),
        ("jerusalem", "Jerusalem,IL"),
        ("telaviv", "Tel Aviv,IL"),
        ("beirut", "Beirut,LB"),
        ("doha", "Doha,QA"),
        ("kuwait", "Kuwait City,KW"),
        ("riyadh", "Riyadh,SA"),
        ("jeddah", "Jeddah,SA"),
        ("manila", "Manila,PH"),
        ("jakarta", "Jakarta,ID"),
        ("kualalumpur", "Kuala Lumpur,MY"),
        ("hanoi", "Hanoi,VN"),
        ("hochiminhcity", "Ho Chi Minh City,VN"),
        ("taipei", "Taipei,TW"),
        ("kaohsiung", "Kaohsiung,TW"),
        ("dhaka", "Dhaka,BD"),
        ("colombo", "Colombo,LK"),
        ("kathmandu", "Kathmandu,NP"),
        ("yangon", "Yangon,MM"),
        ("phnompenh", "Phnom Penh,KH"),
        ("vientiane", "Vientiane,LA"),
        ("ulaanbaatar", "Ulaanbaatar,MN"),
    ]
    .into_iter()
    .collect()
});

/// Resolve a free-form place name.
///
/// A name carrying an explicit region qualifier (`"Paris,FR"`) passes through
/// trimmed. Otherwise the lowercase name is looked up both as typed and with
/// whitespace removed, falling back to the trimmed input so the provider can
/// attempt its own matching.
pub fn resolve(name: &str) -> Result<String, WeatherError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(WeatherError::InvalidInput("City name is required".to_string()));
    }

    if trimmed.contains(',') {
        return Ok(trimmed.to_string());
    }

    let lower = trimmed.to_lowercase();
    let compact: String = lower.chars().filter(|c| !c.is_whitespace()).collect();

    let resolved = PLACE_TABLE
        .get(lower.as_str())
        .or_else(|| PLACE_TABLE.get(compact.as_str()))
        .map(|id| id.to_string())
        .unwrap_or_else(|| trimmed.to_string());

    tracing::debug!(input = name, resolved, "Resolved place name");
    Ok(resolved)
}

/// Display name for a coordinate, via the provider's reverse geocoding.
pub async fn reverse(
    provider: &dyn WeatherProvider,
    coordinate: Coordinate,
) -> Result<String, WeatherError> {
    provider
        .reverse_geocode(coordinate)
        .await?
        .filter(|name| !name.trim().is_empty())
        .ok_or_else(|| WeatherError::NotFound { place: coordinate.to_string() })
}
