//! Taxonomic classification and vernacular names from WoRMS.
//!
//! The World Register of Marine Species exposes a REST service keyed by
//! Aphia ID. Two endpoints are used:
//!
//! - `AphiaClassificationByAphiaID/{id}`: a nested rank chain
//!   (`{"rank": "Kingdom", "scientificname": "Animalia", "child": {...}}`)
//! - `AphiaVernacularsByAphiaID/{id}`: a list of `{vernacular, language}`
//!
//! The service answers `204 No Content` when nothing matches; that is
//! reported and treated as an empty result.

use crate::constants::{APP_NAME, TAXON_RANKS, fields};
use crate::error::{KrmError, Result};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// One vernacular name entry as returned by WoRMS
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vernacular {
    pub vernacular: String,
    #[serde(default)]
    pub language_code: Option<String>,
    pub language: String,
}

/// Taxonomy fields for one Aphia ID
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaxonomyRecord {
    pub aphia_id: i64,
    /// Lowercase rank name to scientific name, restricted to the kept ranks
    pub ranks: BTreeMap<String, String>,
    /// Vernacular names in the requested language; `None` when not looked up
    pub vernaculars: Option<Vec<String>>,
}

impl TaxonomyRecord {
    /// Record carrying only the identifier, used when lookups are skipped
    pub fn offline(aphia_id: i64) -> Self {
        Self {
            aphia_id,
            ..Self::default()
        }
    }

    /// Build a record from the two service responses
    pub fn from_responses(
        aphia_id: i64,
        classification: Option<&Value>,
        vernaculars: &[Vernacular],
        language: &str,
    ) -> Self {
        let ranks = classification
            .map(flatten_classification)
            .unwrap_or_default()
            .into_iter()
            .filter(|(rank, _)| TAXON_RANKS.contains(&rank.as_str()))
            .collect();

        let names = group_vernaculars(vernaculars)
            .remove(language)
            .unwrap_or_else(|| {
                warn!("No {} vernacular names for Aphia ID {}", language, aphia_id);
                Vec::new()
            });

        Self {
            aphia_id,
            ranks,
            vernaculars: Some(names),
        }
    }

    /// Flatten into the merge layer: `aphia_id`, `specimen_<rank>` and
    /// `specimen_vernaculars`
    pub fn to_layer(&self) -> Map<String, Value> {
        let mut layer = Map::new();
        layer.insert(fields::APHIA_ID.to_string(), Value::from(self.aphia_id));

        for rank in TAXON_RANKS {
            if let Some(name) = self.ranks.get(*rank) {
                layer.insert(
                    format!("{}{}", fields::SPECIMEN_PREFIX, rank),
                    Value::String(name.clone()),
                );
            }
        }

        if let Some(names) = &self.vernaculars {
            layer.insert(
                format!("{}{}", fields::SPECIMEN_PREFIX, fields::VERNACULARS),
                Value::from(names.clone()),
            );
        }

        layer
    }
}

/// Walk the nested classification chain into rank -> scientific name
pub fn flatten_classification(root: &Value) -> BTreeMap<String, String> {
    let mut ranks = BTreeMap::new();
    let mut node = root.as_object();

    while let Some(entry) = node {
        if let (Some(rank), Some(name)) = (
            entry.get("rank").and_then(Value::as_str),
            entry.get("scientificname").and_then(Value::as_str),
        ) {
            ranks.insert(rank.to_lowercase(), name.to_string());
        }
        node = entry.get("child").and_then(Value::as_object);
    }

    ranks
}

/// Group vernacular names by language, keeping service order
pub fn group_vernaculars(entries: &[Vernacular]) -> BTreeMap<String, Vec<String>> {
    let mut grouped: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for entry in entries {
        grouped
            .entry(entry.language.clone())
            .or_default()
            .push(entry.vernacular.clone());
    }
    grouped
}

/// HTTP client for the WoRMS REST service
#[derive(Debug, Clone)]
pub struct WormsClient {
    client: Client,
    base_url: String,
}

impl WormsClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(format!("{}/{}", APP_NAME, env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| KrmError::Configuration {
                message: format!("Failed to build HTTP client: {}", e),
            })?;

        Ok(Self::with_client(client, base_url))
    }

    /// Use an already configured HTTP client
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Classification and vernacular names for an Aphia ID
    pub async fn lookup(&self, aphia_id: i64, language: &str) -> Result<TaxonomyRecord> {
        info!("Looking up Aphia ID {} in WoRMS", aphia_id);

        let classification = self.classification(aphia_id).await?;
        let vernaculars = self.vernaculars(aphia_id).await?;

        let record = TaxonomyRecord::from_responses(
            aphia_id,
            classification.as_ref(),
            &vernaculars,
            language,
        );

        debug!(
            "Taxonomy for {}: {} ranks, {:?} vernaculars",
            aphia_id,
            record.ranks.len(),
            record.vernaculars.as_ref().map(Vec::len)
        );
        Ok(record)
    }

    pub async fn classification(&self, aphia_id: i64) -> Result<Option<Value>> {
        let url = format!("{}/AphiaClassificationByAphiaID/{}", self.base_url, aphia_id);
        let value = self.get_json::<Value>(aphia_id, &url).await?;

        if value.is_none() {
            warn!("Aphia ID {} has no classification in WoRMS", aphia_id);
        }
        Ok(value)
    }

    pub async fn vernaculars(&self, aphia_id: i64) -> Result<Vec<Vernacular>> {
        let url = format!("{}/AphiaVernacularsByAphiaID/{}", self.base_url, aphia_id);
        let entries = self.get_json::<Vec<Vernacular>>(aphia_id, &url).await?;

        Ok(entries.unwrap_or_else(|| {
            warn!("Vernaculars for Aphia ID {} were not found in WoRMS", aphia_id);
            Vec::new()
        }))
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        aphia_id: i64,
        url: &str,
    ) -> Result<Option<T>> {
        debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| KrmError::Taxonomy { aphia_id, source })?;

        let status = response.status();
        if status == StatusCode::NO_CONTENT || status == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let response = response
            .error_for_status()
            .map_err(|source| KrmError::Taxonomy { aphia_id, source })?;

        let body = response
            .json::<T>()
            .await
            .map_err(|source| KrmError::Taxonomy { aphia_id, source })?;

        Ok(Some(body))
    }
}
