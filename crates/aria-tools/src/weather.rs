use std::time::Duration;

use aria_core::Tool;
use aria_llm::{Describe, Property, Schema};
use serde::Deserialize;

const DEFAULT_BASE_URL: &str = "http://api.weatherapi.com/v1";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Deserialize)]
pub struct WeatherInput {
    /// The name of the city (e.g. "London", "Tokyo").
    pub city: String,
}

impl Describe for WeatherInput {
    fn describe() -> Schema {
        Schema::Object {
            description: None,
            properties: vec![Property {
                name: "city".into(),
                schema: Schema::String {
                    description: Some("The name of the city (e.g. \"London\", \"Tokyo\")".into()),
                    enumeration: None,
                },
            }],
            required: vec!["city".into()],
        }
    }
}

/// Tool that fetches current conditions from weatherapi.com.
///
/// Lookup failures (missing key, unknown city, service errors) are returned
/// as readable text in the `Ok` value so the model can react to them
/// conversationally instead of the turn failing.
#[derive(Clone)]
pub struct WeatherTool {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

impl WeatherTool {
    /// Create the tool reading `WEATHER_API_KEY` from the environment.
    pub fn from_env() -> Self {
        Self::new(std::env::var("WEATHER_API_KEY").ok())
    }

    pub fn new(api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.filter(|k| !k.is_empty()),
            base_url: DEFAULT_BASE_URL.into(),
        }
    }

    /// Point the tool at a different endpoint (used by tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn lookup(&self, city: &str, api_key: &str) -> Result<String, String> {
        let url = format!("{}/current.json", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("key", api_key), ("q", city)])
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| format!("Error: {e}"))?;

        if !response.status().is_success() {
            return Err(format!("Could not find weather for '{city}'"));
        }

        let data: CurrentWeather = response
            .json()
            .await
            .map_err(|e| format!("Error: {e}"))?;

        Ok(format!(
            "Weather for {}, {}:\n\
             🌡️ Temperature: {}°C\n\
             ☁️ Condition: {}\n\
             💧 Humidity: {}%",
            data.location.name,
            data.location.country,
            data.current.temp_c,
            data.current.condition.text,
            data.current.humidity,
        ))
    }
}

impl Tool for WeatherTool {
    type Input = WeatherInput;

    fn name(&self) -> &str {
        "get_weather"
    }

    fn description(&self) -> &str {
        "Get the current weather for a city. Returns temperature, condition, and humidity."
    }

    async fn call(&self, input: WeatherInput) -> Result<String, aria_llm::Error> {
        let Some(api_key) = self.api_key.clone() else {
            return Ok("Error: WEATHER_API_KEY not set in .env".into());
        };

        // Both arms are Ok: failures are tool output, not turn failures.
        match self.lookup(&input.city, &api_key).await {
            Ok(report) => Ok(report),
            Err(message) => Ok(message),
        }
    }
}

// ---------------------------------------------------------------------------
// weatherapi.com response shapes (the fields we read)
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct CurrentWeather {
    location: Location,
    current: Current,
}

#[derive(Deserialize)]
struct Location {
    name: String,
    country: String,
}

#[derive(Deserialize)]
struct Current {
    temp_c: f64,
    humidity: u32,
    condition: Condition,
}

#[derive(Deserialize)]
struct Condition {
    text: String,
}
