use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Extracted text remembered for a caller-chosen document id.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedDocument {
    pub text: String,
    pub pages: usize,
    pub filename: String,
}

/// Process-lifetime document cache. Writes to the same id are last-write-wins;
/// entries are never evicted.
#[derive(Clone, Default)]
pub struct DocumentCache {
    inner: Arc<RwLock<HashMap<String, CachedDocument>>>,
}

impl DocumentCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, document_id: impl Into<String>, document: CachedDocument) {
        let mut guard = self.inner.write().await;
        guard.insert(document_id.into(), document);
    }

    pub async fn get(&self, document_id: &str) -> Option<CachedDocument> {
        let guard = self.inner.read().await;
        guard.get(document_id).cloned()
    }

    pub async fn text(&self, document_id: &str) -> Option<String> {
        let guard = self.inner.read().await;
        guard.get(document_id).map(|doc| doc.text.clone())
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}
