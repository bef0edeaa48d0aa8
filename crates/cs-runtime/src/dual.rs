//! Dual-artifact production: keep the human-readable text next to its
//! minified twin and record how much the minified one costs to run.

use crate::memory::{measure_or_zero, MemoryMeter, PythonMemoryMeter};
use chrono::{DateTime, Utc};
use cs_core::{CodeslimConfig, Result, SourceText, StorageConfig};
use cs_optimizer::Pipeline;
use cs_storage::ArtifactStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DualArtifactReport {
    pub name: String,
    pub hr_key: String,
    pub mr_key: String,
    /// Where the store put the human-readable variant.
    pub hr_path: String,
    /// Where the store put the minified variant.
    pub mr_path: String,
    pub hr_bytes: usize,
    pub mr_bytes: usize,
    /// Peak resident memory of running the minified variant, in MiB.
    /// 0.0 when no measurement was possible.
    pub memory_usage: f64,
    pub produced_at: DateTime<Utc>,
}

impl DualArtifactReport {
    pub fn reduction_pct(&self) -> f64 {
        if self.hr_bytes == 0 {
            return 0.0;
        }
        (self.hr_bytes.saturating_sub(self.mr_bytes)) as f64 / self.hr_bytes as f64 * 100.0
    }
}

pub struct DualArtifactProducer {
    pipeline: Arc<Pipeline>,
    store: Arc<dyn ArtifactStore>,
    meter: Option<Arc<dyn MemoryMeter>>,
    storage: StorageConfig,
}

impl DualArtifactProducer {
    pub fn new(pipeline: Arc<Pipeline>, store: Arc<dyn ArtifactStore>) -> Self {
        Self {
            pipeline,
            store,
            meter: None,
            storage: StorageConfig::default(),
        }
    }

    /// Pipeline, naming and Python measurement all taken from `config`.
    pub fn from_config(config: &CodeslimConfig, store: Arc<dyn ArtifactStore>) -> Result<Self> {
        let pipeline = Arc::new(Pipeline::new(config)?);
        Ok(Self::new(pipeline, store)
            .with_meter(Arc::new(PythonMemoryMeter::from_config(&config.measurement)))
            .with_storage(config.storage.clone()))
    }

    pub fn with_meter(mut self, meter: Arc<dyn MemoryMeter>) -> Self {
        self.meter = Some(meter);
        self
    }

    pub fn with_storage(mut self, storage: StorageConfig) -> Self {
        self.storage = storage;
        self
    }

    /// Transform `hr_code` once, store both variants under `name`, then
    /// measure the minified one. Nothing is stored if the transform fails.
    pub async fn produce(&self, hr_code: &SourceText, name: &str) -> Result<DualArtifactReport> {
        let artifact = self.pipeline.transform(hr_code)?;
        let mr_code = artifact.text();

        let hr_key = self.storage.hr_key(name);
        let mr_key = self.storage.mr_key(name);
        let hr_path = self.store.put(&hr_key, hr_code.as_str()).await?;
        let mr_path = self.store.put(&mr_key, mr_code.as_str()).await?;

        let memory_usage = match &self.meter {
            Some(meter) => measure_or_zero(meter.as_ref(), mr_code).await,
            None => 0.0,
        };

        let report = DualArtifactReport {
            name: name.to_string(),
            hr_key,
            mr_key,
            hr_path,
            mr_path,
            hr_bytes: hr_code.len(),
            mr_bytes: mr_code.len(),
            memory_usage,
            produced_at: Utc::now(),
        };
        tracing::info!(
            name,
            hr_bytes = report.hr_bytes,
            mr_bytes = report.mr_bytes,
            memory_mib = report.memory_usage,
            "dual artifacts produced"
        );
        Ok(report)
    }
}
