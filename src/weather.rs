//! Weather snapshots from weatherapi.com.
//!
//! A weather-type question triggers one fetch: `forecast.json` when
//! the reference date is today, `history.json` for past dates. The
//! snapshot is immutable and carries everything both renderers need —
//! the hourly samples feed only the Markdown table and are never
//! persisted; the history file gets the reduced form from
//! [`WeatherSnapshot::to_record`].

use jiff::Zoned;
use serde::Deserialize;
use serde_json::{Value, json};

#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("weather request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("missing {0} in weather response")]
    MissingSection(&'static str),

    #[error("malformed weather response: {0}")]
    Malformed(String),

    #[error("weather_api and zip must be set in the config to use weather questions")]
    NotConfigured,
}

/// Temperature unit, from the config's `weather_deg` (default F).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Units {
    Fahrenheit,
    Celsius,
}

impl Units {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some(s) if s.to_lowercase().starts_with('c') => Self::Celsius,
            _ => Self::Fahrenheit,
        }
    }
}

/// The hours sampled for the forecast table, and their labels.
const SAMPLE_HOURS: [usize; 7] = [8, 10, 12, 14, 16, 18, 20];
const HOUR_LABELS: [&str; 7] = ["8am", "10am", "12pm", "2pm", "4pm", "6pm", "8pm"];

/// One hourly sample feeding the forecast table.
#[derive(Debug, Clone, PartialEq)]
pub struct HourSample {
    pub temp: f64,
    pub condition: String,
}

/// Immutable weather data for one reference date.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherSnapshot {
    pub day: String,
    pub high: f64,
    pub low: f64,
    pub temp: f64,
    pub condition: String,
    pub current_condition: String,
    pub hourly: Vec<HourSample>,
    pub moon_phase: String,
}

impl WeatherSnapshot {
    /// Daily forecast line: "Sunny 80/65".
    pub fn forecast(&self) -> String {
        format!("{} {}/{}", self.condition, fmt_temp(self.high), fmt_temp(self.low))
    }

    /// Current conditions line: "72 and Sunny".
    pub fn current(&self) -> String {
        format!("{} and {}", fmt_temp(self.temp), self.current_condition)
    }

    pub fn moon(&self) -> String {
        format!("Moon phase: {}", self.moon_phase)
    }

    /// One-line summary used when echoing a captured answer.
    pub fn brief(&self) -> String {
        format!(
            "{} and {} ({}/{})",
            fmt_temp(self.temp),
            self.current_condition,
            fmt_temp(self.high),
            fmt_temp(self.low)
        )
    }

    /// The reduced form persisted to the history file. Hourly samples
    /// never make it to disk.
    pub fn to_record(&self) -> Value {
        json!({
            "high": self.high,
            "low": self.low,
            "condition": self.current_condition,
            "moon_phase": self.moon_phase,
        })
    }

    /// Full Markdown rendering: summary lines plus the hourly table.
    ///
    /// Each table column is padded to that hour's condition text, so
    /// column widths vary per column.
    pub fn to_markdown(&self) -> String {
        let mut out = Vec::new();

        out.push(format!("Forecast for {}: {}  ", self.day, self.forecast()));
        out.push(format!("Currently: {}  ", self.current()));
        out.push(format!("Moon Phase: {}  ", self.moon_phase));
        out.push(String::new());

        let widths: Vec<usize> = self.hourly.iter().map(|h| h.condition.len() + 1).collect();

        let mut row = String::from("|");
        for (label, width) in HOUR_LABELS.iter().zip(&widths) {
            row.push_str(&format!("{label:>width$} |"));
        }
        out.push(row);

        let mut row = String::from("|");
        for width in &widths {
            row.push_str(&format!("{}-|", "-".repeat(*width)));
        }
        out.push(row);

        let mut row = String::from("|");
        for hour in &self.hourly {
            row.push_str(&format!(" {} |", hour.condition));
        }
        out.push(row);

        let mut row = String::from("|");
        for (hour, width) in self.hourly.iter().zip(&widths) {
            row.push_str(&format!("{:>width$} |", fmt_temp(hour.temp)));
        }
        out.push(row);

        out.join("\n")
    }
}

/// Format a temperature without a trailing ".0" for whole values.
fn fmt_temp(t: f64) -> String {
    if t.fract() == 0.0 {
        format!("{t:.0}")
    } else {
        format!("{t}")
    }
}

/// Source of weather snapshots. Swappable so tests never touch the
/// network.
pub trait WeatherProvider {
    fn fetch(&self, as_of: &Zoned) -> Result<WeatherSnapshot, WeatherError>;
}

/// The live weatherapi.com client.
pub struct WeatherApi {
    key: Option<String>,
    location: Option<String>,
    units: Units,
}

impl WeatherApi {
    pub fn new(key: Option<String>, location: Option<String>, units: Units) -> Self {
        Self { key, location, units }
    }
}

impl WeatherProvider for WeatherApi {
    fn fetch(&self, as_of: &Zoned) -> Result<WeatherSnapshot, WeatherError> {
        let (Some(key), Some(location)) = (self.key.as_deref(), self.location.as_deref()) else {
            return Err(WeatherError::NotConfigured);
        };

        let today = as_of.date() == Zoned::now().date();
        let url = if today {
            format!("http://api.weatherapi.com/v1/forecast.json?key={key}&q={location}&aqi=no")
        } else {
            format!(
                "http://api.weatherapi.com/v1/history.json?key={key}&q={location}&aqi=no&dt={}",
                as_of.strftime("%Y-%m-%d")
            )
        };

        let response: ApiResponse = reqwest::blocking::get(url)?.error_for_status()?.json()?;
        snapshot_from(&response, as_of, today, self.units)
    }
}

// ── Response shape ──

#[derive(Debug, Deserialize)]
struct ApiResponse {
    current: Option<ApiCurrent>,
    forecast: Option<ApiForecast>,
}

#[derive(Debug, Deserialize)]
struct ApiCurrent {
    temp_f: f64,
    temp_c: f64,
    condition: ApiCondition,
}

#[derive(Debug, Deserialize)]
struct ApiCondition {
    text: String,
}

#[derive(Debug, Deserialize)]
struct ApiForecast {
    forecastday: Vec<ApiDay>,
}

#[derive(Debug, Deserialize)]
struct ApiDay {
    date: String,
    day: ApiDaySummary,
    astro: ApiAstro,
    hour: Vec<ApiHour>,
}

#[derive(Debug, Deserialize)]
struct ApiDaySummary {
    maxtemp_f: f64,
    maxtemp_c: f64,
    mintemp_f: f64,
    mintemp_c: f64,
    condition: ApiCondition,
}

#[derive(Debug, Deserialize)]
struct ApiAstro {
    moon_phase: String,
}

#[derive(Debug, Deserialize)]
struct ApiHour {
    time: String,
    temp_f: f64,
    temp_c: f64,
    condition: ApiCondition,
}

impl ApiHour {
    fn temp(&self, units: Units) -> f64 {
        match units {
            Units::Fahrenheit => self.temp_f,
            Units::Celsius => self.temp_c,
        }
    }
}

fn snapshot_from(
    response: &ApiResponse,
    as_of: &Zoned,
    today: bool,
    units: Units,
) -> Result<WeatherSnapshot, WeatherError> {
    let forecast = response
        .forecast
        .as_ref()
        .ok_or(WeatherError::MissingSection("forecast"))?;
    let day = forecast
        .forecastday
        .first()
        .ok_or(WeatherError::MissingSection("forecastday"))?;

    let (temp, current_condition) = if today {
        let current = response
            .current
            .as_ref()
            .ok_or(WeatherError::MissingSection("current"))?;
        let temp = match units {
            Units::Fahrenheit => current.temp_f,
            Units::Celsius => current.temp_c,
        };
        (temp, current.condition.text.clone())
    } else {
        // Historical: the hour matching the reference time stands in
        // for "current".
        let wanted = as_of.strftime("%Y-%m-%d %H:00").to_string();
        let hour = day
            .hour
            .iter()
            .find(|h| h.time == wanted)
            .ok_or_else(|| WeatherError::Malformed(format!("no hour entry for {wanted}")))?;
        (hour.temp(units), hour.condition.text.clone())
    };

    let hourly = SAMPLE_HOURS
        .iter()
        .map(|&i| {
            day.hour
                .get(i)
                .map(|h| HourSample {
                    temp: h.temp(units),
                    condition: h.condition.text.clone(),
                })
                .ok_or_else(|| WeatherError::Malformed(format!("missing hour {i}")))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let (high, low) = match units {
        Units::Fahrenheit => (day.day.maxtemp_f, day.day.mintemp_f),
        Units::Celsius => (day.day.maxtemp_c, day.day.mintemp_c),
    };

    Ok(WeatherSnapshot {
        day: day.date.clone(),
        high,
        low,
        temp,
        condition: day.day.condition.text.clone(),
        current_condition,
        hourly,
        moon_phase: day.astro.moon_phase.clone(),
    })
}


#[cfg(test)]
mod tests {
    use super::testing::sample_snapshot;
    use super::*;

    use jiff::civil::date;

    fn sample_response() -> ApiResponse {
        let mut hours = Vec::new();
        for h in 0..24 {
            hours.push(serde_json::json!({
                "time": format!("2025-06-15 {h:02}:00"),
                "temp_f": 60.0 + f64::from(h),
                "temp_c": 15.0 + f64::from(h),
                "condition": { "text": if h < 12 { "Mist" } else { "Sunny" } },
            }));
        }
        serde_json::from_value(serde_json::json!({
            "current": {
                "temp_f": 72.0,
                "temp_c": 22.0,
                "condition": { "text": "Partly cloudy" },
            },
            "forecast": {
                "forecastday": [{
                    "date": "2025-06-15",
                    "day": {
                        "maxtemp_f": 80.0, "maxtemp_c": 27.0,
                        "mintemp_f": 65.0, "mintemp_c": 18.0,
                        "condition": { "text": "Sunny" },
                    },
                    "astro": { "moon_phase": "Waxing Gibbous" },
                    "hour": hours,
                }],
            },
        }))
        .unwrap()
    }

    fn as_of() -> Zoned {
        date(2025, 6, 15)
            .at(14, 0, 0, 0)
            .to_zoned(jiff::tz::TimeZone::UTC)
            .unwrap()
    }

    #[test]
    fn units_parse_defaults_to_fahrenheit() {
        assert_eq!(Units::parse(None), Units::Fahrenheit);
        assert_eq!(Units::parse(Some("F")), Units::Fahrenheit);
        assert_eq!(Units::parse(Some("celsius")), Units::Celsius);
        assert_eq!(Units::parse(Some("C")), Units::Celsius);
    }

    #[test]
    fn snapshot_today_uses_current_section() {
        let snapshot = snapshot_from(&sample_response(), &as_of(), true, Units::Fahrenheit).unwrap();
        assert_eq!(snapshot.temp, 72.0);
        assert_eq!(snapshot.current_condition, "Partly cloudy");
        assert_eq!(snapshot.high, 80.0);
        assert_eq!(snapshot.low, 65.0);
        assert_eq!(snapshot.moon_phase, "Waxing Gibbous");
        assert_eq!(snapshot.hourly.len(), 7);
        assert_eq!(snapshot.hourly[0].temp, 68.0); // hour 8
        assert_eq!(snapshot.hourly[6].temp, 80.0); // hour 20
    }

    #[test]
    fn snapshot_historical_uses_matching_hour() {
        let snapshot = snapshot_from(&sample_response(), &as_of(), false, Units::Fahrenheit).unwrap();
        assert_eq!(snapshot.temp, 74.0); // hour 14
        assert_eq!(snapshot.current_condition, "Sunny");
    }

    #[test]
    fn snapshot_celsius_picks_celsius_fields() {
        let snapshot = snapshot_from(&sample_response(), &as_of(), true, Units::Celsius).unwrap();
        assert_eq!(snapshot.temp, 22.0);
        assert_eq!(snapshot.high, 27.0);
        assert_eq!(snapshot.low, 18.0);
    }

    #[test]
    fn missing_sections_are_errors() {
        let mut response = sample_response();
        response.current = None;
        let err = snapshot_from(&response, &as_of(), true, Units::Fahrenheit).unwrap_err();
        assert!(matches!(err, WeatherError::MissingSection("current")));

        response.forecast = None;
        let err = snapshot_from(&response, &as_of(), true, Units::Fahrenheit).unwrap_err();
        assert!(matches!(err, WeatherError::MissingSection("forecast")));
    }

    #[test]
    fn record_form_drops_hourly_data() {
        let record = sample_snapshot().to_record();
        assert_eq!(
            record,
            serde_json::json!({
                "high": 80.0,
                "low": 65.0,
                "condition": "Partly cloudy",
                "moon_phase": "Waxing Gibbous",
            })
        );
    }

    #[test]
    fn summary_lines() {
        let snapshot = sample_snapshot();
        assert_eq!(snapshot.forecast(), "Sunny 80/65");
        assert_eq!(snapshot.current(), "72 and Partly cloudy");
        assert_eq!(snapshot.brief(), "72 and Partly cloudy (80/65)");
    }

    #[test]
    fn markdown_table_pads_each_column_to_its_condition() {
        let markdown = sample_snapshot().to_markdown();
        let lines: Vec<&str> = markdown.lines().collect();

        assert_eq!(lines[0], "Forecast for 2025-06-15: Sunny 80/65  ");
        assert_eq!(lines[1], "Currently: 72 and Partly cloudy  ");
        assert_eq!(lines[2], "Moon Phase: Waxing Gibbous  ");
        assert_eq!(lines[3], "");

        // Header, separator, conditions, and temps rows all share
        // per-column widths derived from the condition text.
        let rows = &lines[4..8];
        let cell_counts: Vec<usize> = rows.iter().map(|r| r.matches('|').count()).collect();
        assert_eq!(cell_counts, [8, 8, 8, 8]);

        // "Mist" column: width 5 → header cell "  8am |".
        assert!(rows[0].starts_with("|  8am |"));
        assert!(rows[1].starts_with("|------|"));
        assert!(rows[2].starts_with("| Mist |"));
        assert!(rows[3].starts_with("|   66 |"));

        // Every row in a column is the same width.
        for row in rows {
            let cells: Vec<&str> = row.split('|').collect();
            let widths: Vec<usize> = cells[1..cells.len() - 1].iter().map(|c| c.len()).collect();
            let expected: Vec<usize> =
                sample_snapshot().hourly.iter().map(|h| h.condition.len() + 2).collect();
            assert_eq!(widths, expected);
        }
    }
}
