use crate::models::{CatalogEntry, EntryDetail, Stat};
use crate::observe::{FetchObserver, LogObserver};
use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "https://pokeapi.co/api/v2";

/// Why a catalog request did not produce a value. None of these are retried.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("server responded with status {code}")]
    HttpStatus { code: u16 },

    #[error("unexpected response: {0}")]
    Decode(String),
}

// Upstream payload shapes. Nothing outside this module sees them.

#[derive(Deserialize)]
struct ApiList {
    results: Vec<CatalogEntry>,
}

#[derive(Deserialize)]
struct ApiDetail {
    name: String,
    sprites: ApiSprites,
    types: Vec<ApiTypeSlot>,
    height: u32,
    weight: u32,
    abilities: Vec<ApiAbilitySlot>,
    base_experience: u32,
    stats: Vec<ApiStat>,
}

#[derive(Deserialize)]
struct ApiSprites {
    other: ApiSpritesOther,
}

#[derive(Deserialize)]
struct ApiSpritesOther {
    #[serde(rename = "official-artwork")]
    official_artwork: ApiOfficialArtwork,
}

#[derive(Deserialize)]
struct ApiOfficialArtwork {
    front_default: String,
}

#[derive(Deserialize)]
struct ApiNamed {
    name: String,
}

#[derive(Deserialize)]
struct ApiTypeSlot {
    #[serde(rename = "type")]
    kind: ApiNamed,
}

#[derive(Deserialize)]
struct ApiAbilitySlot {
    ability: ApiNamed,
}

#[derive(Deserialize)]
struct ApiStat {
    stat: ApiNamed,
    base_stat: u32,
}

impl From<ApiDetail> for EntryDetail {
    fn from(api: ApiDetail) -> Self {
        Self {
            name: api.name,
            primary_image_url: api.sprites.other.official_artwork.front_default,
            types: api.types.into_iter().map(|t| t.kind.name).collect(),
            height_decimeters: api.height,
            weight_decigrams: api.weight,
            abilities: api.abilities.into_iter().map(|a| a.ability.name).collect(),
            base_experience: api.base_experience,
            stats: api
                .stats
                .into_iter()
                .map(|s| Stat {
                    name: s.stat.name,
                    value: s.base_stat,
                })
                .collect(),
        }
    }
}

fn decode_list(body: &[u8]) -> Result<Vec<CatalogEntry>, FetchError> {
    let list: ApiList =
        serde_json::from_slice(body).map_err(|e| FetchError::Decode(e.to_string()))?;
    Ok(list.results)
}

fn decode_detail(body: &[u8]) -> Result<EntryDetail, FetchError> {
    let api: ApiDetail =
        serde_json::from_slice(body).map_err(|e| FetchError::Decode(e.to_string()))?;
    Ok(api.into())
}

/// Thin wrapper over the PokeAPI endpoints the views need.
#[derive(Clone)]
pub struct CatalogClient {
    http: reqwest::Client,
    base_url: String,
    limit: Option<usize>,
    observer: Arc<dyn FetchObserver>,
}

impl CatalogClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            limit: None,
            observer: Arc::new(LogObserver),
        }
    }

    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn FetchObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn list_address(&self) -> String {
        match self.limit {
            Some(n) => format!("{}/pokemon?limit={}", self.base_url, n),
            None => format!("{}/pokemon", self.base_url),
        }
    }

    /// Fetch the collection endpoint and return its `results` in response order.
    pub async fn fetch_entry_list(&self) -> Result<Vec<CatalogEntry>, FetchError> {
        let address = self.list_address();
        self.observer.request_started(&address);
        let result = match self.get_bytes(&address).await {
            Ok(body) => decode_list(&body),
            Err(e) => Err(e),
        };
        self.report(&address, result)
    }

    /// Fetch one detail record. `address` is used verbatim.
    pub async fn fetch_entry_detail(&self, address: &str) -> Result<EntryDetail, FetchError> {
        self.observer.request_started(address);
        let result = match self.get_bytes(address).await {
            Ok(body) => decode_detail(&body),
            Err(e) => Err(e),
        };
        self.report(address, result)
    }

    /// Raw bytes of an image (artwork or thumbnail).
    pub async fn fetch_image(&self, address: &str) -> Result<Vec<u8>, FetchError> {
        self.observer.request_started(address);
        let result = self.get_bytes(address).await;
        self.report(address, result)
    }

    async fn get_bytes(&self, address: &str) -> Result<Vec<u8>, FetchError> {
        let res = self.http.get(address).send().await?;
        let status = res.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                code: status.as_u16(),
            });
        }
        Ok(res.bytes().await?.to_vec())
    }

    fn report<T>(&self, address: &str, result: Result<T, FetchError>) -> Result<T, FetchError> {
        match &result {
            Ok(_) => self.observer.request_succeeded(address),
            Err(e) => self.observer.request_failed(address, e),
        }
        result
    }
}
