//! User flows built from the store, the list manager and a weather provider.

use std::sync::Arc;

use crate::{
    config::Config,
    error::{Error, Result},
    lists::CityListManager,
    lookup::{LookupState, LookupTracker},
    model::{Weather, normalize_city},
    provider::{WeatherClient, WeatherProvider},
    store::{self, FileStore, KeyValueStore, LAST_SEARCHED_KEY},
};

#[derive(Debug)]
pub struct WeatherApp {
    provider: Arc<dyn WeatherProvider>,
    store: Arc<dyn KeyValueStore>,
    lists: CityListManager,
    lookup: LookupTracker,
}

impl WeatherApp {
    /// Build an app over `store` and load both lists from it.
    pub async fn new(
        provider: Arc<dyn WeatherProvider>,
        store: Arc<dyn KeyValueStore>,
    ) -> Result<Self> {
        let lists = CityListManager::load(store.clone()).await?;

        Ok(Self {
            provider,
            store,
            lists,
            lookup: LookupTracker::new(),
        })
    }

    /// Wire up the HTTP client and file store described by `config`.
    pub async fn from_config(config: &Config) -> anyhow::Result<Self> {
        let base_url = config.base_url()?;
        let data_dir = config.data_dir()?;
        tracing::debug!(%base_url, data_dir = %data_dir.display(), "starting app");

        let provider = Arc::new(WeatherClient::new(&base_url)?);
        let store = Arc::new(FileStore::new(data_dir));

        Ok(Self::new(provider, store).await?)
    }

    pub fn lists(&self) -> &CityListManager {
        &self.lists
    }

    pub fn lookup(&self) -> &LookupTracker {
        &self.lookup
    }

    pub fn state(&self) -> LookupState {
        self.lookup.state()
    }

    /// Home screen search.
    ///
    /// On success the city is recorded in the recent searches and the record
    /// is written to `lastSearched`. If a newer search started while this one
    /// was in flight the response is returned to the caller but otherwise
    /// ignored.
    pub async fn search(&self, input: &str) -> Result<Weather> {
        let city = match normalize_city(input) {
            Ok(city) => city,
            Err(e) => {
                self.lookup.reject(&e);
                return Err(e);
            }
        };

        let ticket = self.lookup.begin(&city);
        let outcome = self.provider.fetch_weather(&city).await;

        if !self.lookup.complete(ticket, &outcome) {
            tracing::warn!(%city, "discarding response from superseded search");
            return outcome;
        }

        let weather = outcome?;
        self.lists.record_search(&city).await?;
        store::save_json(&*self.store, LAST_SEARCHED_KEY, &weather).await?;

        Ok(weather)
    }

    /// Home screen mount: reload both lists and, if there is a recent search,
    /// look up the most recent city again.
    pub async fn restore(&self) -> Result<Option<Weather>> {
        let recents = self.lists.load_recents().await?;
        self.lists.load_favorites().await?;

        match recents.first() {
            Some(city) => self.search(city).await.map(Some),
            None => Ok(None),
        }
    }

    /// Favorites screen lookup. Does not touch the recent searches, the
    /// lookup state or `lastSearched`.
    pub async fn lookup_favorite(&self, input: &str) -> Result<Weather> {
        let city = normalize_city(input)?;
        self.provider.fetch_weather(&city).await
    }

    pub async fn toggle_favorite(&self, city: &str) -> Result<bool> {
        self.lists.toggle_favorite(city).await
    }

    /// Whether the city shown by the last successful search is a favorite.
    pub fn current_is_favorite(&self) -> bool {
        match self.lookup.state() {
            LookupState::Success { weather, .. } => self.lists.is_favorite(&weather.city),
            _ => false,
        }
    }
}
