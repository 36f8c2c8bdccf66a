//! Dataset Cache
//!
//! Process-wide memoization of loaded datasets, keyed by the row cap.
//! Entries live until they are explicitly invalidated or reloaded.
//!
//! No lock is held while a load is in flight. Two loads racing on the same
//! key both hit the source and the last one to finish is kept.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::columns::ColumnMapping;
use super::dataset::CaseDataset;
use super::error::PipelineResult;
use super::loader::CaseLoader;
use super::source::CaseSource;

/// Memoization map from `max_rows` to a loaded dataset
pub struct DatasetCache {
    source: Arc<dyn CaseSource>,
    mapping: ColumnMapping,
    entries: RwLock<HashMap<usize, Arc<CaseDataset>>>,
}

impl DatasetCache {
    pub fn new(source: Arc<dyn CaseSource>) -> Self {
        Self::with_mapping(source, ColumnMapping::default())
    }

    pub fn with_mapping(source: Arc<dyn CaseSource>, mapping: ColumnMapping) -> Self {
        Self {
            source,
            mapping,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Description of the backing source
    pub fn source_description(&self) -> String {
        self.source.describe()
    }

    /// Return the cached dataset for `max_rows`, loading it on a miss
    pub async fn get_or_load(&self, max_rows: usize) -> PipelineResult<Arc<CaseDataset>> {
        if let Some(dataset) = self.get(max_rows).await {
            tracing::debug!(max_rows, "Dataset cache hit");
            return Ok(dataset);
        }

        tracing::debug!(max_rows, "Dataset cache miss");
        self.load_and_insert(max_rows).await
    }

    /// Cached dataset for `max_rows`, without loading
    pub async fn get(&self, max_rows: usize) -> Option<Arc<CaseDataset>> {
        self.entries.read().await.get(&max_rows).cloned()
    }

    /// Drop the entry for `max_rows`. Returns whether one was present.
    pub async fn invalidate(&self, max_rows: usize) -> bool {
        let removed = self.entries.write().await.remove(&max_rows).is_some();
        if removed {
            tracing::info!(max_rows, "Dataset cache entry invalidated");
        }
        removed
    }

    /// Drop every entry
    pub async fn clear(&self) {
        let mut entries = self.entries.write().await;
        let count = entries.len();
        entries.clear();
        tracing::info!(entries = count, "Dataset cache cleared");
    }

    /// Invalidate and load again from the source
    ///
    /// If the fetch fails the entry stays invalidated.
    pub async fn reload(&self, max_rows: usize) -> PipelineResult<Arc<CaseDataset>> {
        self.invalidate(max_rows).await;
        self.load_and_insert(max_rows).await
    }

    /// Row caps currently cached, ascending
    pub async fn cached_keys(&self) -> Vec<usize> {
        let mut keys: Vec<usize> = self.entries.read().await.keys().copied().collect();
        keys.sort_unstable();
        keys
    }

    async fn load_and_insert(&self, max_rows: usize) -> PipelineResult<Arc<CaseDataset>> {
        let loader = CaseLoader::new(max_rows).with_mapping(self.mapping.clone());
        let outcome = loader.load(self.source.as_ref()).await?;
        let dataset = Arc::new(CaseDataset::from_outcome(outcome));

        self.entries
            .write()
            .await
            .insert(max_rows, Arc::clone(&dataset));

        Ok(dataset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::error::DataSourceError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const SAMPLE: &str = "cluster_local,latitude,longitude,gender,nationality
A,1.0,1.0,f,singapore
A,1.0,1.0,m,japan
B,2.0,2.0,f,singapore";

    /// Serves the sample and counts fetches
    struct CountingSource {
        fetches: AtomicUsize,
        fail: bool,
    }

    impl CountingSource {
        fn new(fail: bool) -> Self {
            Self {
                fetches: AtomicUsize::new(0),
                fail,
            }
        }
    }

    #[async_trait]
    impl CaseSource for CountingSource {
        fn describe(&self) -> String {
            "counting".to_string()
        }

        async fn fetch(&self) -> PipelineResult<String> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(DataSourceError::HttpStatus {
                    status: 503,
                    url: "counting".to_string(),
                });
            }
            Ok(SAMPLE.to_string())
        }
    }

    #[tokio::test]
    async fn test_second_load_hits_cache() {
        let source = Arc::new(CountingSource::new(false));
        let cache = DatasetCache::new(source.clone());

        let first = cache.get_or_load(3200).await.unwrap();
        let second = cache.get_or_load(3200).await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(source.fetches.load(Ordering::SeqCst), 1);
        assert_eq!(first.view().len(), 2);
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let source = Arc::new(CountingSource::new(false));
        let cache = DatasetCache::new(source.clone());

        let capped = cache.get_or_load(1).await.unwrap();
        let full = cache.get_or_load(3200).await.unwrap();

        assert_eq!(capped.records().len(), 1);
        assert_eq!(full.records().len(), 3);
        assert_eq!(cache.cached_keys().await, vec![1, 3200]);
        assert_eq!(source.fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_invalidate_and_reload() {
        let source = Arc::new(CountingSource::new(false));
        let cache = DatasetCache::new(source.clone());

        let first = cache.get_or_load(10).await.unwrap();
        assert!(cache.invalidate(10).await);
        assert!(!cache.invalidate(10).await);
        assert!(cache.get(10).await.is_none());

        let reloaded = cache.reload(10).await.unwrap();
        assert!(!Arc::ptr_eq(&first, &reloaded));
        assert_eq!(source.fetches.load(Ordering::SeqCst), 2);

        cache.clear().await;
        assert!(cache.cached_keys().await.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_failure_is_not_cached() {
        let source = Arc::new(CountingSource::new(true));
        let cache = DatasetCache::new(source.clone());

        assert!(cache.get_or_load(10).await.is_err());
        assert!(cache.get_or_load(10).await.is_err());
        assert_eq!(source.fetches.load(Ordering::SeqCst), 2);
        assert!(cache.cached_keys().await.is_empty());
    }
}
