//! Current conditions for the left panel.
//!
//! One fetch at startup, no retries. Temperature and weather code come from
//! open-meteo, the place name from nominatim's reverse geocoder.

use std::thread;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use reqwest::blocking::Client;
use serde::Deserialize;

use crate::config::WeatherConfig;
use crate::worker::Request;

const FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";
const GEOCODE_URL: &str = "https://nominatim.openstreetmap.org/reverse";

/// Human wording for a WMO weather interpretation code.
pub fn wmo_condition(code: i64) -> &'static str {
    match code {
        0 => "clear sky",
        c if c <= 2 => "partly cloudy",
        3 => "overcast",
        c if c <= 48 => "foggy",
        c if c <= 55 => "drizzle",
        c if c <= 65 => "rain",
        c if c <= 75 => "snow",
        c if c <= 82 => "showers",
        c if c <= 95 => "thunderstorm",
        _ => "—",
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Weather {
    pub temperature: i64,
    pub condition: &'static str,
    pub location: String,
}

#[derive(Deserialize)]
struct Forecast {
    current: Current,
}

#[derive(Deserialize)]
struct Current {
    temperature_2m: f64,
    weather_code: i64,
}

#[derive(Deserialize)]
struct Place {
    #[serde(default)]
    address: Address,
}

#[derive(Deserialize, Default)]
struct Address {
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    county: Option<String>,
}

impl Address {
    fn best_name(self) -> String {
        [self.city, self.town, self.village, self.county]
            .into_iter()
            .flatten()
            .find(|name| !name.is_empty())
            .unwrap_or_else(|| "—".to_string())
    }
}

pub struct WeatherClient {
    client: Client,
    forecast_url: String,
    geocode_url: String,
}

impl WeatherClient {
    pub fn new() -> Result<Self> {
        Self::with_endpoints(FORECAST_URL, GEOCODE_URL)
    }

    pub fn with_endpoints(forecast_url: &str, geocode_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .user_agent(concat!("tick/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            client,
            forecast_url: forecast_url.to_string(),
            geocode_url: geocode_url.to_string(),
        })
    }

    /// Fetch conditions and place name concurrently. Either failing fails
    /// the whole lookup.
    pub fn fetch(&self, latitude: f64, longitude: f64) -> Result<Weather> {
        let (forecast, place) = thread::scope(|s| {
            let forecast = s.spawn(|| self.forecast(latitude, longitude));
            let place = self.place(latitude, longitude);
            let forecast = forecast
                .join()
                .map_err(|_| anyhow!("forecast lookup panicked"))
                .and_then(|r| r);
            (forecast, place)
        });
        let forecast = forecast?;
        let place = place?;

        Ok(Weather {
            temperature: forecast.current.temperature_2m.round() as i64,
            condition: wmo_condition(forecast.current.weather_code),
            location: place.address.best_name(),
        })
    }

    fn forecast(&self, latitude: f64, longitude: f64) -> Result<Forecast> {
        self.client
            .get(&self.forecast_url)
            .query(&[
                ("latitude", latitude.to_string()),
                ("longitude", longitude.to_string()),
                ("current", "temperature_2m,weather_code".to_string()),
            ])
            .send()
            .context("forecast request failed")?
            .error_for_status()
            .context("forecast service refused")?
            .json()
            .context("malformed forecast")
    }

    fn place(&self, latitude: f64, longitude: f64) -> Result<Place> {
        self.client
            .get(&self.geocode_url)
            .query(&[
                ("lat", latitude.to_string()),
                ("lon", longitude.to_string()),
                ("format", "json".to_string()),
            ])
            .send()
            .context("reverse geocode request failed")?
            .error_for_status()
            .context("geocoder refused")?
            .json()
            .context("malformed geocoder response")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeatherStatus {
    Idle,
    Loading,
    Ok,
    /// No location to ask about: weather is disabled or unconfigured.
    Denied,
    Error,
}

#[derive(Debug)]
pub struct WeatherPanel {
    status: WeatherStatus,
    weather: Option<Weather>,
}

impl Default for WeatherPanel {
    fn default() -> Self {
        Self {
            status: WeatherStatus::Idle,
            weather: None,
        }
    }
}

impl WeatherPanel {
    /// Move out of `Idle`, returning the fetch to issue if there is a
    /// location to fetch for.
    pub fn start(&mut self, config: &WeatherConfig) -> Option<Request> {
        if let Some((latitude, longitude)) = config.coordinates() {
            self.status = WeatherStatus::Loading;
            Some(Request::FetchWeather {
                latitude,
                longitude,
            })
        } else {
            self.status = WeatherStatus::Denied;
            None
        }
    }

    pub fn apply(&mut self, result: Result<Weather>) {
        match result {
            Ok(weather) => {
                self.status = WeatherStatus::Ok;
                self.weather = Some(weather);
            }
            Err(e) => {
                tracing::warn!("weather lookup failed: {e:#}");
                self.status = WeatherStatus::Error;
            }
        }
    }

    pub fn status(&self) -> WeatherStatus {
        self.status
    }

    pub fn weather(&self) -> Option<&Weather> {
        self.weather.as_ref()
    }
}
