//! Prompt construction for LLM activity advice and forecast summaries.

use serde::{Deserialize, Serialize};

/// Completion budget for activity advice
pub const ACTIVITY_ADVICE_MAX_TOKENS: u32 = 400;

/// Completion budget for forecast summaries
pub const FORECAST_INSIGHT_MAX_TOKENS: u32 = 200;

/// Current conditions plus the activity the user is planning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityAdviceRequest {
    pub temperature: f64,
    pub wind_speed: f64,
    pub precipitation: f64,
    pub humidity: f64,
    pub uv_index: f64,
    pub activity_name: String,
    pub location_name: String,
    pub location_country: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastDay {
    pub date: String,
    pub temperature: f64,
    pub condition: String,
    pub precipitation: f64,
    pub wind_speed: f64,
    pub humidity: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastInsightRequest {
    pub location_name: String,
    pub location_country: String,
    pub forecast: Vec<ForecastDay>,
}

pub fn activity_prompt(req: &ActivityAdviceRequest) -> String {
    format!(
        r#"You are WeatherWise Pro AI, an elite outdoor activity planning assistant.

Weather Data for {location}, {country}:
- Temperature: {temperature}°F
- Wind Speed: {wind} mph
- Precipitation: {precipitation} inches
- Humidity: {humidity}%
- UV Index: {uv}

Planned Activity: {activity}

Provide expert analysis with:
1. Activity rating (EXCELLENT/GREAT/GOOD/FAIR/POOR)
2. Key insights about conditions (2-3 sentences)
3. One pro tip specific to this activity
4. Risk mitigation advice
5. Best timing recommendation

Write 4-5 concise sentences total. Be confident and use meteorological terminology. Format like the example:
"**Beach rating: GREAT** Today's conditions are favorable for the beach. With a temperature around 73°F, it's comfortable..."

Keep response under 300 words."#,
        location = req.location_name,
        country = req.location_country,
        temperature = req.temperature,
        wind = req.wind_speed,
        precipitation = req.precipitation,
        humidity = req.humidity,
        uv = req.uv_index,
        activity = req.activity_name,
    )
}

pub fn forecast_prompt(req: &ForecastInsightRequest) -> String {
    let mut days = String::new();
    for day in &req.forecast {
        days.push_str(&format!(
            "\n- {}: {}, {}°F, Precipitation: {}%, Wind: {} mph, Humidity: {}%",
            day.date, day.condition, day.temperature, day.precipitation, day.wind_speed, day.humidity
        ));
    }

    format!(
        r#"You are a weather forecasting assistant. Analyze this forecast for {}, {}:
{}

Provide a friendly 2-3 sentence summary that:
1. Highlights key weather patterns or changes
2. Mentions precipitation or extreme conditions
3. Gives practical advice

Start naturally like "Expect..." or "This week brings...". Keep under 100 words."#,
        req.location_name, req.location_country, days
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activity_prompt_contains_conditions() {
        let req: ActivityAdviceRequest = serde_json::from_value(serde_json::json!({
            "temperature": 84.2,
            "windSpeed": 6.5,
            "precipitation": 0.1,
            "humidity": 70,
            "uvIndex": 9,
            "activityName": "Beach",
            "locationName": "Kochi",
            "locationCountry": "India",
            "extraField": "ignored"
        }))
        .unwrap();

        let prompt = activity_prompt(&req);
        assert!(prompt.contains("Weather Data for Kochi, India:"));
        assert!(prompt.contains("- Temperature: 84.2°F"));
        assert!(prompt.contains("- UV Index: 9"));
        assert!(prompt.contains("Planned Activity: Beach"));
    }

    #[test]
    fn test_forecast_prompt_lists_days() {
        let req = ForecastInsightRequest {
            location_name: "Munnar".to_string(),
            location_country: "India".to_string(),
            forecast: vec![
                ForecastDay {
                    date: "Sat, Jun 01".to_string(),
                    condition: "rainy".to_string(),
                    temperature: 72.5,
                    precipitation: 0.4,
                    wind_speed: 8.0,
                    humidity: 65.0,
                },
                ForecastDay {
                    date: "Sun, Jun 02".to_string(),
                    condition: "clear".to_string(),
                    temperature: 75.0,
                    precipitation: 0.0,
                    wind_speed: 4.1,
                    humidity: 65.0,
                },
            ],
        };

        let prompt = forecast_prompt(&req);
        assert!(prompt.starts_with("You are a weather forecasting assistant. Analyze this forecast for Munnar, India:"));
        assert!(prompt.contains("\n- Sat, Jun 01: rainy, 72.5°F, Precipitation: 0.4%, Wind: 8 mph, Humidity: 65%"));
        assert!(prompt.contains("\n- Sun, Jun 02: clear, 75°F"));
    }
}
