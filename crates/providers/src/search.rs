use anyhow::Result;
use async_trait::async_trait;
use tracing::{debug, warn};

use crate::ledger::{SearchLedger, SearchOutcome};

/// Ledger name for the disclaimer default at the end of the chain.
pub const DEFAULT_PROVIDER_NAME: &str = "default";

pub const SEARCH_DISCLAIMER: &str = "No live search results were available for this topic. \
The guidance below is based on general travel knowledge; verify dates, prices, and \
availability before booking.";

/// A single interchangeable search backend. Provider identity is
/// configuration, never branched on by the orchestration core.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn search(&self, query: &str) -> Result<String>;
}

/// Ordered chain of search providers, first non-empty success wins.
///
/// Individual provider failures are absorbed; when every provider is
/// exhausted the chain answers with a disclaimer-bearing default instead of
/// failing the request.
pub struct FallbackSearch {
    providers: Vec<Box<dyn SearchProvider>>,
}

impl FallbackSearch {
    pub fn new(providers: Vec<Box<dyn SearchProvider>>) -> Self {
        Self { providers }
    }

    pub async fn search(&self, query: &str, ledger: &SearchLedger) -> String {
        for provider in &self.providers {
            match provider.search(query).await {
                Ok(text) if !text.trim().is_empty() => {
                    debug!(provider = provider.name(), query, "search hit");
                    ledger.record(provider.name(), query, SearchOutcome::Hit);
                    return text;
                }
                Ok(_) => {
                    ledger.record(provider.name(), query, SearchOutcome::Empty);
                }
                Err(error) => {
                    warn!(provider = provider.name(), query, %error, "search provider failed");
                    ledger.record(provider.name(), query, SearchOutcome::Failed);
                }
            }
        }

        ledger.record(DEFAULT_PROVIDER_NAME, query, SearchOutcome::Hit);
        format!("{SEARCH_DISCLAIMER}\n\n(topic: {query})")
    }
}

/// In-memory keyword index, the offline stand-in for a real search backend.
pub struct MemoryIndexProvider {
    name: &'static str,
    docs: Vec<IndexedDoc>,
}

struct IndexedDoc {
    keywords: Vec<String>,
    body: String,
}

impl MemoryIndexProvider {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            docs: Vec::new(),
        }
    }

    pub fn with_doc(mut self, keywords: &[&str], body: &str) -> Self {
        self.docs.push(IndexedDoc {
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
            body: body.to_string(),
        });
        self
    }
}

#[async_trait]
impl SearchProvider for MemoryIndexProvider {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn search(&self, query: &str) -> Result<String> {
        let lower = query.to_lowercase();
        let hits: Vec<&str> = self
            .docs
            .iter()
            .filter(|doc| doc.keywords.iter().any(|keyword| lower.contains(keyword)))
            .map(|doc| doc.body.as_str())
            .collect();

        Ok(hits.join("\n\n"))
    }
}
