//! Display-time formatting. Nothing here touches storage.

use crate::model::{TemperatureUnit, Weather};

/// Convert a Celsius reading into `unit`.
pub fn convert_temperature(celsius: f64, unit: TemperatureUnit) -> f64 {
    match unit {
        TemperatureUnit::Celsius => celsius,
        TemperatureUnit::Fahrenheit => celsius * 9.0 / 5.0 + 32.0,
    }
}

/// One decimal place plus unit suffix, e.g. `86.0°F`.
pub fn format_temperature(celsius: f64, unit: TemperatureUnit) -> String {
    format!("{:.1}°{}", convert_temperature(celsius, unit), unit)
}

/// Multi-line summary of a weather record.
pub fn render_card(weather: &Weather, unit: TemperatureUnit, favorite: bool) -> String {
    let heart = if favorite { "♥" } else { "♡" };

    format!(
        "{city} {heart}\n\
         [{icon}] {temp}\n\
         {label}\n\
         Wind Speed: {wind} km/h\n\
         Humidity: {humidity} %",
        city = weather.city,
        icon = weather.condition().icon_name(),
        temp = format_temperature(weather.temperature, unit),
        label = weather.weather,
        wind = weather.wind_speed,
        humidity = weather.humidity,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lahore() -> Weather {
        Weather {
            city: "Lahore".into(),
            temperature: 30.0,
            weather: "Sunny".into(),
            wind_speed: 10.0,
            humidity: 40.0,
        }
    }

    #[test]
    fn fahrenheit_display() {
        assert_eq!(format_temperature(30.0, TemperatureUnit::Fahrenheit), "86.0°F");
        assert_eq!(format_temperature(-40.0, TemperatureUnit::Fahrenheit), "-40.0°F");
    }

    #[test]
    fn celsius_display_keeps_one_decimal() {
        assert_eq!(format_temperature(21.456, TemperatureUnit::Celsius), "21.5°C");
        assert_eq!(format_temperature(30.0, TemperatureUnit::Celsius), "30.0°C");
    }

    #[test]
    fn card_contains_all_fields() {
        let card = render_card(&lahore(), TemperatureUnit::Fahrenheit, true);

        assert!(card.starts_with("Lahore ♥"));
        assert!(card.contains("[sunny] 86.0°F"));
        assert!(card.contains("Wind Speed: 10 km/h"));
        assert!(card.contains("Humidity: 40 %"));
    }
}
