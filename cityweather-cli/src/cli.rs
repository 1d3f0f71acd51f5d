use anyhow::{Context, anyhow};
use chrono::Local;
use clap::{Parser, Subcommand};
use cityweather_core::{
    Config, Error, LookupState, TemperatureUnit, Weather, WeatherApp, config::DEFAULT_BASE_URL,
    display::render_card,
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "cityweather", version, about = "City weather lookup")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Set the backend address interactively.
    Configure,

    /// Look up a city and add it to the recent searches.
    Search {
        /// City name, matched exactly as typed.
        city: String,

        /// Display unit: C or F.
        #[arg(long, short, default_value = "C")]
        unit: TemperatureUnit,
    },

    /// Show the most recent search again, followed by the recent searches.
    Home {
        #[arg(long, short, default_value = "C")]
        unit: TemperatureUnit,
    },

    /// List recent searches, most recent first.
    Recent {
        /// Forget all recent searches.
        #[arg(long)]
        clear: bool,
    },

    /// List favorite cities.
    Favorites,

    /// Add a city to favorites, or remove it if already there.
    Favorite {
        city: String,
    },

    /// Look up a favorite city without recording a search.
    ShowFavorite {
        city: String,

        #[arg(long, short, default_value = "C")]
        unit: TemperatureUnit,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let config = Config::load()?;

        let command = match self.command {
            Command::Configure => return configure(config),
            other => other,
        };

        let app = WeatherApp::from_config(&config).await?;

        match command {
            // Already handled; configuring needs no app.
            Command::Configure => {}
            Command::Search { city, unit } => {
                let weather = app.search(&city).await.map_err(report)?;
                println!("{}", card_text(&app, &weather, unit));
            }
            Command::Home { unit } => {
                let restored = app.restore().await;
                println!("{}", home_text(&app, restored, unit));
            }
            Command::Recent { clear } => {
                if clear {
                    app.lists().clear_recents().await.map_err(report)?;
                    println!("Recent searches cleared.");
                } else {
                    println!("{}", recents_text(&app));
                }
            }
            Command::Favorites => {
                let favorites = app.lists().favorites();
                if favorites.is_empty() {
                    println!("No favorite cities added yet.");
                }
                for city in favorites {
                    println!("♥ {city}");
                }
            }
            Command::Favorite { city } => {
                let now_favorite = app.toggle_favorite(&city).await.map_err(report)?;
                let city = city.trim();
                if now_favorite {
                    println!("Added {city} to favorites.");
                } else {
                    println!("Removed {city} from favorites.");
                }
            }
            Command::ShowFavorite { city, unit } => {
                let weather = app.lookup_favorite(&city).await.map_err(report)?;
                let favorite = app.lists().is_favorite(&weather.city);
                println!("{}", render_card(&weather, unit, favorite));
            }
        }

        Ok(())
    }
}

fn configure(mut config: Config) -> anyhow::Result<()> {
    let current = config
        .base_url
        .clone()
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

    let answer = inquire::Text::new("Weather backend base URL:")
        .with_default(&current)
        .with_help_message("The app requests <base>/weatherData?city=<name>")
        .prompt()
        .context("Failed to read backend base URL")?;

    config.set_base_url(&answer)?;
    config.save()?;

    let path = Config::config_file_path()?;
    println!("Saved configuration to {}", path.display());
    Ok(())
}

/// Turn a lookup error into the inline message shown to the user.
fn report(err: Error) -> anyhow::Error {
    tracing::debug!(error = %err, "command failed");
    anyhow!(err.user_message())
}

fn card_text(app: &WeatherApp, weather: &Weather, unit: TemperatureUnit) -> String {
    let mut text = render_card(weather, unit, app.lists().is_favorite(&weather.city));

    if let LookupState::Success { fetched_at, .. } = app.state() {
        text.push_str(&format!("\nUpdated {}", fetched_at.with_timezone(&Local).format("%H:%M")));
    }
    text
}

fn recents_text(app: &WeatherApp) -> String {
    let recents = app.lists().recents();
    let mut text = String::from("Recent Searches");
    if recents.is_empty() {
        text.push_str("\n  (none)");
    }
    for (i, city) in recents.iter().enumerate() {
        text.push_str(&format!("\n  {}. {city}", i + 1));
    }
    text
}

/// Home view: the restored lookup, or its inline error, then the recent searches.
fn home_text(
    app: &WeatherApp,
    restored: cityweather_core::Result<Option<Weather>>,
    unit: TemperatureUnit,
) -> String {
    let head = match restored {
        Ok(Some(weather)) => card_text(app, &weather, unit),
        Ok(None) => "No recent searches yet. Try `cityweather search <city>`.".to_string(),
        Err(err) => {
            tracing::debug!(error = %err, "restoring last search failed");
            err.user_message().to_string()
        }
    };

    format!("{head}\n\n{}", recents_text(app))
}
