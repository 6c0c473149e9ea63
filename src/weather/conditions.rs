//! WMO weather code interpretation.

use serde::{Deserialize, Serialize};

/// Condition buckets reported to the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum WeatherCondition {
    #[default]
    #[serde(rename = "clear")]
    Clear,
    #[serde(rename = "mainly clear")]
    MainlyClear,
    #[serde(rename = "partly cloudy")]
    PartlyCloudy,
    #[serde(rename = "overcast")]
    Overcast,
    #[serde(rename = "foggy")]
    Foggy,
    #[serde(rename = "drizzly")]
    Drizzly,
    #[serde(rename = "freezing drizzle")]
    FreezingDrizzle,
    #[serde(rename = "rainy")]
    Rainy,
    #[serde(rename = "freezing rain")]
    FreezingRain,
    #[serde(rename = "snowy")]
    Snowy,
    #[serde(rename = "stormy")]
    Stormy,
}

impl WeatherCondition {
    /// Convert WMO weather code to WeatherCondition
    /// See: https://open-meteo.com/en/docs#weathervariables
    pub fn from_wmo_code(code: i32) -> Self {
        match code {
            0 => Self::Clear,
            1 => Self::MainlyClear,
            2 => Self::PartlyCloudy,
            3 => Self::Overcast,
            45 | 48 => Self::Foggy,
            51 | 53 | 55 => Self::Drizzly,
            56 | 57 => Self::FreezingDrizzle,
            61 | 63 | 65 | 80 | 81 | 82 => Self::Rainy,
            66 | 67 => Self::FreezingRain,
            71 | 73 | 75 | 77 | 85 | 86 => Self::Snowy,
            95 | 96 | 99 => Self::Stormy,
            _ => Self::Clear, // Unknown codes default to clear
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Clear => "clear",
            Self::MainlyClear => "mainly clear",
            Self::PartlyCloudy => "partly cloudy",
            Self::Overcast => "overcast",
            Self::Foggy => "foggy",
            Self::Drizzly => "drizzly",
            Self::FreezingDrizzle => "freezing drizzle",
            Self::Rainy => "rainy",
            Self::FreezingRain => "freezing rain",
            Self::Snowy => "snowy",
            Self::Stormy => "stormy",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Self::Clear => "☀️",
            Self::MainlyClear => "🌤️",
            Self::PartlyCloudy => "⛅",
            Self::Overcast => "☁️",
            Self::Foggy => "🌫️",
            Self::Drizzly | Self::Rainy => "🌧️",
            Self::Snowy => "❄️",
            Self::Stormy => "⛈️",
            Self::FreezingDrizzle | Self::FreezingRain => "🌤️",
        }
    }

    /// Each word capitalised, e.g. "Partly Cloudy"
    pub fn title(&self) -> String {
        self.as_str()
            .split(' ')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                    None => String::new(),
                }
            })
            .collect::<Vec<String>>()
            .join(" ")
    }
}

impl std::fmt::Display for WeatherCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Rough cloud cover percentage implied by a weather code
pub fn estimate_cloud_cover(code: i32) -> u8 {
    match code {
        0 => 0,
        1 => 25,
        2 => 50,
        3 => 85,
        _ => 70, // precipitation or fog
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wmo_code_table() {
        assert_eq!(WeatherCondition::from_wmo_code(0), WeatherCondition::Clear);
        assert_eq!(WeatherCondition::from_wmo_code(1), WeatherCondition::MainlyClear);
        assert_eq!(WeatherCondition::from_wmo_code(48), WeatherCondition::Foggy);
        assert_eq!(WeatherCondition::from_wmo_code(57), WeatherCondition::FreezingDrizzle);
        assert_eq!(WeatherCondition::from_wmo_code(82), WeatherCondition::Rainy);
        assert_eq!(WeatherCondition::from_wmo_code(67), WeatherCondition::FreezingRain);
        assert_eq!(WeatherCondition::from_wmo_code(86), WeatherCondition::Snowy);
        assert_eq!(WeatherCondition::from_wmo_code(99), WeatherCondition::Stormy);
    }

    #[test]
    fn test_unknown_code_defaults_to_clear() {
        assert_eq!(WeatherCondition::from_wmo_code(4), WeatherCondition::Clear);
        assert_eq!(WeatherCondition::from_wmo_code(-1), WeatherCondition::Clear);
    }

    #[test]
    fn test_freezing_conditions_use_default_emoji() {
        assert_eq!(WeatherCondition::FreezingRain.emoji(), "🌤️");
        assert_eq!(WeatherCondition::Rainy.emoji(), "🌧️");
    }

    #[test]
    fn test_title_and_serialization() {
        assert_eq!(WeatherCondition::PartlyCloudy.title(), "Partly Cloudy");
        assert_eq!(WeatherCondition::Clear.title(), "Clear");
        assert_eq!(
            serde_json::to_string(&WeatherCondition::FreezingDrizzle).unwrap(),
            "\"freezing drizzle\""
        );
    }

    #[test]
    fn test_cloud_cover() {
        assert_eq!(estimate_cloud_cover(0), 0);
        assert_eq!(estimate_cloud_cover(3), 85);
        assert_eq!(estimate_cloud_cover(61), 70);
    }
}
