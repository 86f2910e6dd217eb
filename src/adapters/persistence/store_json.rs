//! Implements PriceStorePort and CatalogStorePort on one JSON data file.
//!
//! Layout: `{ "rates": { "Xbox": 100, ... }, "catalog": [ { "id": ..., ... } ] }`.
//! Missing or corrupt files fall back to built-in defaults; loading never fails.
//! Mutations are applied to a copy, written atomically, then swapped in, all under
//! the write lock, so a failed write leaves the in-memory state untouched.

use crate::adapters::persistence::atomic_file::write_atomic;
use crate::domain::{CatalogItem, Category, DomainError, Platform, PriceEntry, Rate};
use crate::ports::{CatalogStorePort, PriceStorePort};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{info, warn};

/// In-memory state, also the on-disk shape when serialized.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
struct StoreData {
    rates: BTreeMap<Platform, Rate>,
    catalog: Vec<CatalogItem>,
}

/// On-disk shape as read. Entries are validated one by one so a single bad
/// entry does not discard the whole file.
#[derive(Debug, Deserialize)]
struct StoreFile {
    #[serde(default)]
    rates: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    catalog: Vec<serde_json::Value>,
}

/// How `load()` obtained its state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Read from the data file.
    Loaded,
    /// No file yet; defaults were used and written out.
    CreatedDefaults,
    /// File unreadable or corrupt; defaults are in use and the file was left as is.
    RecoveredDefaults,
}

/// JSON file-backed price and catalog store.
pub struct JsonStore {
    path: PathBuf,
    default_rate: Rate,
    cache: RwLock<StoreData>,
}

impl JsonStore {
    pub fn new(path: impl AsRef<Path>, default_rate: Rate) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            default_rate,
            cache: RwLock::new(Self::defaults(default_rate)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load state from disk. Call once after construction.
    pub async fn load(&self) -> LoadOutcome {
        let (data, outcome) = match fs::read_to_string(&self.path).await {
            Ok(s) => match serde_json::from_str::<StoreFile>(&s) {
                Ok(file) => (self.parse_file(file), LoadOutcome::Loaded),
                Err(e) => {
                    warn!(path = %self.path.display(), error = %e, "store file is corrupt; using built-in defaults");
                    (Self::defaults(self.default_rate), LoadOutcome::RecoveredDefaults)
                }
            },
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!(path = %self.path.display(), "no store file; writing built-in defaults");
                (Self::defaults(self.default_rate), LoadOutcome::CreatedDefaults)
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "store file unreadable; using built-in defaults");
                (Self::defaults(self.default_rate), LoadOutcome::RecoveredDefaults)
            }
        };
        info!(
            rates = data.rates.len(),
            catalog_items = data.catalog.len(),
            "store loaded"
        );
        *self.cache.write().await = data;

        if outcome == LoadOutcome::CreatedDefaults {
            if let Err(e) = self.save().await {
                warn!(path = %self.path.display(), error = %e, "could not write default store file");
            }
        }
        outcome
    }

    /// Persist the current in-memory state atomically.
    pub async fn save(&self) -> Result<(), DomainError> {
        let data = self.cache.read().await;
        Self::write(&self.path, &data).await
    }

    fn defaults(default_rate: Rate) -> StoreData {
        StoreData {
            rates: Platform::ALL.iter().map(|&p| (p, default_rate)).collect(),
            catalog: default_catalog(),
        }
    }

    fn parse_file(&self, file: StoreFile) -> StoreData {
        let mut rates = BTreeMap::new();
        for (key, value) in file.rates {
            let Ok(platform) = key.parse::<Platform>() else {
                warn!(platform = %key, "ignoring rate for unknown platform");
                continue;
            };
            match serde_json::from_value::<Rate>(value) {
                Ok(rate) => {
                    rates.insert(platform, rate);
                }
                Err(e) => warn!(%platform, error = %e, "ignoring invalid rate"),
            }
        }
        for platform in Platform::ALL {
            rates.entry(platform).or_insert_with(|| {
                warn!(%platform, "no rate in store file; using default");
                self.default_rate
            });
        }

        let mut catalog: Vec<CatalogItem> = Vec::with_capacity(file.catalog.len());
        for value in file.catalog {
            let item = match serde_json::from_value::<CatalogItem>(value) {
                Ok(item) => item,
                Err(e) => {
                    warn!(error = %e, "ignoring malformed catalog entry");
                    continue;
                }
            };
            if let Err(e) = item.validate() {
                warn!(id = %item.id, error = %e, "ignoring invalid catalog entry");
                continue;
            }
            match catalog.iter().position(|c| c.id == item.id) {
                Some(i) => catalog[i] = item,
                None => catalog.push(item),
            }
        }

        StoreData { rates, catalog }
    }

    async fn write(path: &Path, data: &StoreData) -> Result<(), DomainError> {
        let json =
            serde_json::to_string_pretty(data).map_err(|e| DomainError::Store(e.to_string()))?;
        write_atomic(path, json.as_bytes())
            .await
            .map_err(|e| DomainError::Store(format!("write {}: {}", path.display(), e)))
    }

    /// Apply `f` to a copy, persist it, then publish it. Holds the write lock throughout
    /// so mutations are serialized.
    async fn mutate<R: Send>(
        &self,
        f: impl FnOnce(&mut StoreData) -> R + Send,
    ) -> Result<R, DomainError> {
        let mut guard = self.cache.write().await;
        let mut next = guard.clone();
        let out = f(&mut next);
        Self::write(&self.path, &next).await?;
        *guard = next;
        Ok(out)
    }
}

#[async_trait::async_trait]
impl PriceStorePort for JsonStore {
    async fn get_rate(&self, platform: Platform) -> Option<Rate> {
        self.cache.read().await.rates.get(&platform).copied()
    }

    async fn rates(&self) -> Vec<PriceEntry> {
        self.cache
            .read()
            .await
            .rates
            .iter()
            .map(|(&platform, &rate)| PriceEntry { platform, rate })
            .collect()
    }

    async fn set_rate(&self, platform: Platform, rate: Rate) -> Result<(), DomainError> {
        self.mutate(|data| {
            data.rates.insert(platform, rate);
        })
        .await?;
        info!(%platform, %rate, "rate updated");
        Ok(())
    }
}

#[async_trait::async_trait]
impl CatalogStorePort for JsonStore {
    async fn items(&self) -> Vec<CatalogItem> {
        self.cache.read().await.catalog.clone()
    }

    async fn item(&self, id: &str) -> Option<CatalogItem> {
        self.cache
            .read()
            .await
            .catalog
            .iter()
            .find(|c| c.id == id)
            .cloned()
    }

    async fn upsert_item(&self, item: CatalogItem) -> Result<(), DomainError> {
        item.validate().map_err(|e| DomainError::Store(e.to_string()))?;
        let id = item.id.clone();
        self.mutate(move |data| match data.catalog.iter().position(|c| c.id == item.id) {
            Some(i) => data.catalog[i] = item,
            None => data.catalog.push(item),
        })
        .await?;
        info!(%id, "catalog item saved");
        Ok(())
    }

    async fn remove_item(&self, id: &str) -> Result<bool, DomainError> {
        if !self.cache.read().await.catalog.iter().any(|c| c.id == id) {
            return Ok(false);
        }
        let removed = self
            .mutate(|data| {
                let before = data.catalog.len();
                data.catalog.retain(|c| c.id != id);
                data.catalog.len() != before
            })
            .await?;
        if removed {
            info!(%id, "catalog item removed");
        }
        Ok(removed)
    }
}

fn default_catalog() -> Vec<CatalogItem> {
    vec![
        CatalogItem {
            id: "fc25".into(),
            name: "EA SPORTS FC 25".into(),
            category: Category::Game,
            price: 4999,
            platform: None,
        },
        CatalogItem {
            id: "gta5-ps".into(),
            name: "Grand Theft Auto V".into(),
            category: Category::Game,
            price: 1999,
            platform: Some(Platform::PlayStation),
        },
        CatalogItem {
            id: "gp-ultimate-1m".into(),
            name: "Xbox Game Pass Ultimate, 1 month".into(),
            category: Category::Subscription,
            price: 1500,
            platform: Some(Platform::Xbox),
        },
        CatalogItem {
            id: "ps-plus-3m".into(),
            name: "PlayStation Plus Essential, 3 months".into(),
            category: Category::Subscription,
            price: 2500,
            platform: Some(Platform::PlayStation),
        },
    ]
}
