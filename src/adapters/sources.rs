use crate::domain::model::{specs_from_map, Amount, Category, PartCandidate, PartId, Specs};
use crate::domain::ports::CatalogSource;
use crate::utils::error::{AdvisorError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// A snapshot is either a bare array or wrapped as `{"parts": [...]}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Snapshot {
    Bare(Vec<PartCandidate>),
    Wrapped { parts: Vec<PartCandidate> },
}

impl Snapshot {
    fn into_parts(self) -> Vec<PartCandidate> {
        match self {
            Snapshot::Bare(parts) | Snapshot::Wrapped { parts } => parts,
        }
    }
}

pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CatalogSource for JsonFileSource {
    async fn load(&self) -> Result<Vec<PartCandidate>> {
        let raw = tokio::fs::read_to_string(&self.path).await?;
        let snapshot: Snapshot = serde_json::from_str(&raw)?;
        Ok(snapshot.into_parts())
    }

    fn describe(&self) -> String {
        format!("json file {}", self.path.display())
    }
}

/// One CSV line. `specs` holds a JSON object of scalar values.
#[derive(Debug, Deserialize)]
struct CsvRow {
    id: PartId,
    name: String,
    category: Category,
    price: Amount,
    manufacturer: Option<String>,
    star_rating: Option<f64>,
    review_count: Option<u32>,
    warranty_info: Option<String>,
    specs: Option<String>,
}

impl CsvRow {
    fn into_part(self) -> PartCandidate {
        let specs = match self.specs.as_deref().map(str::trim) {
            None | Some("") => Specs::new(),
            Some(raw) => serde_json::from_str(raw).map(specs_from_map).unwrap_or_else(|e| {
                tracing::warn!("⚠️ Part {} has unreadable specs, ignoring them: {}", self.id, e);
                Specs::new()
            }),
        };
        PartCandidate {
            id: self.id,
            name: self.name,
            category: self.category,
            price: self.price,
            manufacturer: self.manufacturer.filter(|m| !m.trim().is_empty()),
            star_rating: self.star_rating,
            review_count: self.review_count,
            warranty_info: self.warranty_info.filter(|w| !w.trim().is_empty()),
            specs,
        }
    }
}

pub struct CsvFileSource {
    path: PathBuf,
}

impl CsvFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CatalogSource for CsvFileSource {
    async fn load(&self) -> Result<Vec<PartCandidate>> {
        let bytes = tokio::fs::read(&self.path).await?;
        let mut reader = csv::Reader::from_reader(bytes.as_slice());
        let mut parts = Vec::new();
        for row in reader.deserialize::<CsvRow>() {
            parts.push(row?.into_part());
        }
        Ok(parts)
    }

    fn describe(&self) -> String {
        format!("csv file {}", self.path.display())
    }
}

pub struct HttpCatalogSource {
    client: Client,
    endpoint: String,
    timeout: Option<Duration>,
}

impl HttpCatalogSource {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

#[async_trait]
impl CatalogSource for HttpCatalogSource {
    async fn load(&self) -> Result<Vec<PartCandidate>> {
        tracing::debug!("Requesting catalog from: {}", self.endpoint);
        let mut request = self.client.get(&self.endpoint);
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await?;
        tracing::debug!("Catalog response status: {}", response.status());
        if !response.status().is_success() {
            return Err(AdvisorError::CatalogError {
                message: format!(
                    "catalog endpoint {} returned {}",
                    self.endpoint,
                    response.status()
                ),
            });
        }

        let snapshot: Snapshot = response.json().await?;
        Ok(snapshot.into_parts())
    }

    fn describe(&self) -> String {
        format!("http endpoint {}", self.endpoint)
    }
}
