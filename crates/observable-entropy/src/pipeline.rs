//! The Pipeline: cleanup, collect, combine, sign, publish.
//!
//! Collection is best-effort: a source that fails every retry is logged and
//! left out of the aggregate. Signing is all-or-nothing: any error aborts
//! the run before anything is written or published.

use std::sync::Arc;

use tracing::{debug, error, info};

use observable_entropy_core::{
    combine, parse_source_record, sign_artifact, AggregateDocument, PrivateKey, SignedArtifact,
};
use observable_entropy_store::{
    read_aggregate, write_aggregate, write_artifact, ArtifactPublisher, FsSourceStore, Published,
    SourceStore,
};

use crate::collect::Collector;
use crate::config::EntropyConfig;
use crate::error::{CollectionError, Result};
use crate::retry::retry_async;

/// Outcome of a collection pass.
#[derive(Debug, Default)]
pub struct CollectionReport {
    /// Sources stored, in collection order.
    pub captured: Vec<String>,
    /// Sources left out of the aggregate.
    pub omitted: Vec<CollectionError>,
}

impl CollectionReport {
    pub fn is_complete(&self) -> bool {
        self.omitted.is_empty()
    }
}

/// Outcome of a full run.
#[derive(Debug)]
pub struct RunOutcome {
    pub report: CollectionReport,
    pub artifact: SignedArtifact,
}

/// Orchestrates one entropy run over a source store.
///
/// [`Pipeline::from_config`] stores records under `config.entropy_dir`.
/// [`Pipeline::new`] takes any store and ignores that field.
pub struct Pipeline<S: SourceStore> {
    config: EntropyConfig,
    store: Arc<S>,
    collectors: Vec<Box<dyn Collector>>,
}

impl Pipeline<FsSourceStore> {
    /// A pipeline over one `{source}.json` file per source in
    /// `config.entropy_dir`.
    pub fn from_config(config: EntropyConfig) -> Self {
        let store = FsSourceStore::new(&config.entropy_dir);
        Self::new(store, config)
    }
}

impl<S: SourceStore> Pipeline<S> {
    pub fn new(store: S, config: EntropyConfig) -> Self {
        Self {
            config,
            store: Arc::new(store),
            collectors: Vec::new(),
        }
    }

    /// Register a collector. Collectors run in registration order.
    pub fn with_collector(mut self, collector: impl Collector + 'static) -> Self {
        self.collectors.push(Box::new(collector));
        self
    }

    pub fn register(&mut self, collector: Box<dyn Collector>) {
        self.collectors.push(collector);
    }

    pub fn config(&self) -> &EntropyConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Collection
    // ─────────────────────────────────────────────────────────────────────────

    /// Remove all source records from the previous run.
    pub async fn cleanup(&self) -> Result<()> {
        self.store.clear().await?;
        debug!("source records cleared");
        Ok(())
    }

    /// Run every collector with retries and store what succeeds.
    ///
    /// Never fails as a whole; failures are reported per source.
    pub async fn collect(&self) -> CollectionReport {
        let mut report = CollectionReport::default();

        for collector in &self.collectors {
            let name = collector.name().to_string();
            match self.collect_one(collector.as_ref()).await {
                Ok(()) => {
                    debug!(source = %name, "source captured");
                    report.captured.push(name);
                }
                Err(e) => {
                    error!(source = %name, error = %e, "source omitted");
                    report.omitted.push(e);
                }
            }
        }

        info!(
            captured = report.captured.len(),
            omitted = report.omitted.len(),
            "collection finished"
        );
        report
    }

    async fn collect_one(
        &self,
        collector: &dyn Collector,
    ) -> std::result::Result<(), CollectionError> {
        let source_name = collector.name().to_string();

        let payload = retry_async(&self.config.retry, move || collector.collect())
            .await
            .map_err(|error| CollectionError::Exhausted {
                source_name: source_name.clone(),
                error,
            })?;

        let record = parse_source_record(&source_name, payload).map_err(|error| {
            CollectionError::InvalidPayload {
                source_name: source_name.clone(),
                error,
            }
        })?;

        self.store
            .put(&record)
            .await
            .map_err(|error| CollectionError::Store { source_name, error })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Combine & Sign
    // ─────────────────────────────────────────────────────────────────────────

    /// Merge stored records into one document and write it to the
    /// artifact file.
    pub async fn combine(&self) -> Result<AggregateDocument> {
        let records = self.store.list().await?;
        let doc = combine(records);
        write_aggregate(&self.config.artifact_file, &doc).await?;
        info!(sources = doc.len(), path = %self.config.artifact_file.display(), "combined");
        Ok(doc)
    }

    /// Sign a document and write the artifact over the artifact file.
    pub async fn sign(
        &self,
        doc: &AggregateDocument,
        private_key: &PrivateKey,
    ) -> Result<SignedArtifact> {
        let artifact = sign_artifact(doc, private_key)?;
        write_artifact(&self.config.artifact_file, &artifact).await?;
        info!(hash = %artifact.hash, "signed");
        Ok(artifact)
    }

    /// Sign the combined document previously written to the artifact file.
    pub async fn sign_file(&self, private_key: &PrivateKey) -> Result<SignedArtifact> {
        let doc = read_aggregate(&self.config.artifact_file).await?;
        self.sign(&doc, private_key).await
    }

    /// cleanup, collect, combine, sign.
    pub async fn run(&self, private_key: &PrivateKey) -> Result<RunOutcome> {
        self.cleanup().await?;
        let report = self.collect().await;
        let doc = self.combine().await?;
        let artifact = self.sign(&doc, private_key).await?;
        Ok(RunOutcome { report, artifact })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Publish
    // ─────────────────────────────────────────────────────────────────────────

    pub async fn publish<P: ArtifactPublisher + ?Sized>(
        &self,
        artifact: &SignedArtifact,
        publisher: &P,
    ) -> Result<Published> {
        Ok(publisher.publish(artifact).await?)
    }
}
