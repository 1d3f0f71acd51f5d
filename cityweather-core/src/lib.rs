//! Core library for the `cityweather` CLI.
//!
//! This crate defines:
//! - Key-value persistence for small JSON documents
//! - Recent searches and favorites, kept in sync with the store
//! - The weather backend client and the lookup state machine
//! - Configuration and display helpers
//!
//! It is used by `cityweather-cli`, but can also be reused by other front ends.

pub mod app;
pub mod config;
pub mod display;
pub mod error;
pub mod lists;
pub mod lookup;
pub mod model;
pub mod provider;
pub mod store;

pub use app::WeatherApp;
pub use config::Config;
pub use error::{Error, Result, StoreError};
pub use lists::{CityListManager, MAX_RECENTS};
pub use lookup::{LookupState, LookupTracker};
pub use model::{Condition, TemperatureUnit, Weather};
pub use provider::{WeatherClient, WeatherProvider};
pub use store::{FileStore, KeyValueStore, MemoryStore};
