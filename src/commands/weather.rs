//! Current-conditions weather lookup via OpenWeather.

use super::CommandError;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

const API_URL: &str = "https://api.openweathermap.org/data/2.5/weather";

/// Current conditions for one city, units already converted for display.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherReport {
    /// Resolved city name.
    pub city: String,
    /// Short condition description ("light rain").
    pub description: String,
    /// Temperature in °C.
    pub temperature_c: f64,
    /// Feels-like temperature in °C.
    pub feels_like_c: f64,
    /// Relative humidity in percent.
    pub humidity: u8,
    /// Wind speed in km/h.
    pub wind_kmh: f64,
    /// Pressure in hPa, when reported.
    pub pressure_hpa: Option<u32>,
    /// Visibility in km, when reported.
    pub visibility_km: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    name: String,
    weather: Vec<ApiCondition>,
    main: ApiMain,
    wind: ApiWind,
    visibility: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ApiCondition {
    description: String,
}

#[derive(Debug, Deserialize)]
struct ApiMain {
    temp: f64,
    feels_like: f64,
    humidity: u8,
    pressure: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ApiWind {
    speed: f64,
}

/// Fetches current weather for a city.
///
/// # Errors
///
/// Returns [`CommandError`] for network failures, unknown cities, and
/// malformed responses.
#[instrument(skip(http, api_key))]
pub async fn current(
    http: &reqwest::Client,
    api_key: &str,
    city: &str,
) -> Result<WeatherReport, CommandError> {
    debug!("Requesting weather");
    let response = http
        .get(API_URL)
        .query(&[("q", city), ("appid", api_key), ("units", "metric")])
        .send()
        .await
        .map_err(|e| {
            warn!(error = %e, "Weather request failed");
            CommandError::new(format!("Weather request failed: {e}"))
        })?;

    if response.status() == reqwest::StatusCode::NOT_FOUND {
        return Err(CommandError::new(format!("City not found: {city}")));
    }
    if !response.status().is_success() {
        return Err(CommandError::new(format!(
            "Weather API error: {}",
            response.status()
        )));
    }

    let body: ApiResponse = response.json().await.map_err(|e| {
        warn!(error = %e, "Failed to parse weather response");
        CommandError::new(format!("Failed to parse weather response: {e}"))
    })?;

    Ok(report_from(body))
}

fn report_from(body: ApiResponse) -> WeatherReport {
    WeatherReport {
        city: body.name,
        description: body
            .weather
            .first()
            .map(|c| c.description.clone())
            .unwrap_or_else(|| "unknown".to_string()),
        temperature_c: body.main.temp,
        feels_like_c: body.main.feels_like,
        humidity: body.main.humidity,
        // OpenWeather reports m/s in metric mode.
        wind_kmh: body.wind.speed * 3.6,
        pressure_hpa: body.main.pressure,
        visibility_km: body.visibility.map(|m| m / 1000.0),
    }
}

/// Formats a report as a short multi-line summary.
pub fn summarize(report: &WeatherReport) -> String {
    let mut out = format!(
        "Weather in {}: {}\nTemperature: {:.1}°C (feels like {:.1}°C)\nHumidity: {}%\nWind: {:.1} km/h",
        report.city,
        report.description,
        report.temperature_c,
        report.feels_like_c,
        report.humidity,
        report.wind_kmh,
    );
    if let Some(pressure) = report.pressure_hpa {
        out.push_str(&format!("\nPressure: {pressure} hPa"));
    }
    if let Some(visibility) = report.visibility_km {
        out.push_str(&format!("\nVisibility: {visibility:.1} km"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ApiResponse {
        ApiResponse {
            name: "Oslo".to_string(),
            weather: vec![ApiCondition {
                description: "light rain".to_string(),
            }],
            main: ApiMain {
                temp: 12.3,
                feels_like: 10.8,
                humidity: 82,
                pressure: Some(1012),
            },
            wind: ApiWind { speed: 5.0 },
            visibility: Some(8000.0),
        }
    }

    #[test]
    fn converts_wind_and_visibility_units() {
        let report = report_from(sample());
        assert!((report.wind_kmh - 18.0).abs() < 1e-9);
        assert_eq!(report.visibility_km, Some(8.0));
    }

    #[test]
    fn summary_includes_optional_fields_when_present() {
        let summary = summarize(&report_from(sample()));
        assert!(summary.contains("Oslo"));
        assert!(summary.contains("light rain"));
        assert!(summary.contains("Pressure: 1012 hPa"));
        assert!(summary.contains("Visibility: 8.0 km"));
    }

    #[test]
    fn summary_omits_missing_optionals() {
        let mut body = sample();
        body.main.pressure = None;
        body.visibility = None;
        let summary = summarize(&report_from(body));
        assert!(!summary.contains("Pressure"));
        assert!(!summary.contains("Visibility"));
    }
}
