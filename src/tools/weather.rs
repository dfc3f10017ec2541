use super::{schema::decode_params, Tool};
use serde::{Deserialize, Serialize};
use std::pin::Pin;

/// Parameters for weather queries
#[derive(Debug, Serialize, Deserialize, schemars::JsonSchema)]
pub struct WeatherParams {
    /// Name of the city
    pub city: String,
}

/// (names the city is known by, report)
const WEATHER_TABLE: &[(&[&str], &str)] = &[
    (&["القاهرة", "cairo"], "Sunny, 28°C"),
    (&["الرياض", "riyadh"], "Hot, 35°C"),
    (&["دبي", "dubai"], "Sunny, 32°C"),
    (&["بيروت", "beirut"], "Partly cloudy, 25°C"),
];

/// Look up the canned weather report for `city`.
///
/// Matching ignores surrounding whitespace and ASCII case. Unknown cities get a
/// fixed fallback message rather than an error.
pub fn weather_report(city: &str) -> String {
    let wanted = city.trim().to_lowercase();
    WEATHER_TABLE
        .iter()
        .find(|(names, _)| names.iter().any(|name| *name == wanted))
        .map(|(_, report)| report.to_string())
        .unwrap_or_else(|| format!("No weather data available for {}", city))
}

/// A mock weather tool backed by a fixed table
#[derive(Debug, Clone, Copy, Default)]
pub struct WeatherTool;

impl WeatherTool {
    pub fn new() -> Self {
        Self
    }
}

impl Tool for WeatherTool {
    fn name(&self) -> &'static str {
        "get_weather_info"
    }

    fn description(&self) -> &'static str {
        "Get weather information for a city (Cairo, Riyadh, Dubai, Beirut; mock data)"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "city": {
                    "type": "string",
                    "description": "Name of the city"
                }
            },
            "required": ["city"]
        })
    }

    fn execute(
        &self,
        parameters: serde_json::Value,
    ) -> Pin<
        Box<
            dyn std::future::Future<Output = Result<serde_json::Value, crate::AgentError>>
                + Send
                + '_,
        >,
    > {
        Box::pin(async move {
            let params: WeatherParams = decode_params(self.name(), parameters)?;
            Ok(serde_json::Value::String(weather_report(&params.city)))
        })
    }
}
