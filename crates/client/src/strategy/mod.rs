//! Per-class caching strategies.
//!
//! | class               | policy                                   | when all sources fail          |
//! |---------------------|------------------------------------------|--------------------------------|
//! | `ShellAsset`        | store, then network (populate on miss)   | degraded stylesheet / empty 200 |
//! | `DynamicApi`        | network only, store untouched            | offline search payload         |
//! | `ExternalResource`  | network, then store                      | 503 plain text                 |
//!
//! Network and store errors stop here. [`StrategyEngine::handle`] always
//! produces a response.

pub mod fallback;

use std::fmt;
use std::sync::Arc;

use appshell_core::{Classifier, Network, Request, ResourceClass, Response, ShellStore};
use serde::Serialize;

pub use fallback::{
    Fallbacks, OFFLINE_CSS_HEADER, OFFLINE_DRINK_ID, OFFLINE_RESPONSE_HEADER, UNAVAILABLE_BODY, is_offline_payload,
};

/// Where a response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    Cache,
    Network,
    Fallback,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Source::Cache => "cache",
            Source::Network => "network",
            Source::Fallback => "fallback",
        })
    }
}

/// Result of handling one request.
#[derive(Debug, Clone)]
pub struct Handled {
    pub class: ResourceClass,
    pub source: Source,
    pub response: Response,
}

/// Routes each request to the policy of its class.
#[derive(Clone)]
pub struct StrategyEngine {
    classifier: Classifier,
    store: ShellStore,
    network: Arc<dyn Network>,
    fallbacks: Fallbacks,
}

impl StrategyEngine {
    pub fn new(classifier: Classifier, store: ShellStore, network: Arc<dyn Network>, fallbacks: Fallbacks) -> Self {
        Self { classifier, store, network, fallbacks }
    }

    pub fn store(&self) -> &ShellStore {
        &self.store
    }

    pub fn network(&self) -> &dyn Network {
        self.network.as_ref()
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    /// Handle one request end to end.
    pub async fn handle(&self, request: &Request) -> Handled {
        let class = self.classifier.classify(request.url());
        tracing::debug!(url = %request, %class, "intercepted request");

        let (source, response) = match class {
            ResourceClass::ShellAsset => self.cache_only(request).await,
            ResourceClass::DynamicApi => self.network_only(request).await,
            ResourceClass::ExternalResource => self.network_first(request).await,
        };

        tracing::debug!(url = %request, %class, %source, status = response.status, "responding");
        Handled { class, source, response }
    }

    /// Shell policy: store hit wins; a miss goes to the network and the
    /// successful response is written back in the background.
    async fn cache_only(&self, request: &Request) -> (Source, Response) {
        match self.store.get(request).await {
            Ok(Some(entry)) => return (Source::Cache, entry.into_response()),
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(url = %request, error = %e, kind = e.kind(), "store unavailable for shell asset");
                return (Source::Fallback, self.fallbacks.empty_shell());
            }
        }

        tracing::debug!(url = %request, "shell asset not in store, fetching");
        match self.network.fetch(request).await {
            Ok(response) => {
                if response.is_success() {
                    self.populate(request.clone(), response.clone());
                }
                (Source::Network, response)
            }
            Err(e) if self.classifier.wants_stylesheet_fallback(request.url()) => {
                tracing::warn!(
                    url = %request, error = %e, kind = e.kind(),
                    "stylesheet unreachable, serving degraded stylesheet"
                );
                (Source::Fallback, self.fallbacks.degraded_stylesheet())
            }
            Err(e) => {
                tracing::warn!(
                    url = %request, error = %e, kind = e.kind(),
                    "shell asset unreachable, serving empty response"
                );
                (Source::Fallback, self.fallbacks.empty_shell())
            }
        }
    }

    /// API policy: the store is never read nor written.
    async fn network_only(&self, request: &Request) -> (Source, Response) {
        match self.network.fetch(request).await {
            Ok(response) => (Source::Network, response),
            Err(e) => {
                tracing::info!(url = %request, error = %e, kind = e.kind(), "API unreachable, serving offline payload");
                (Source::Fallback, self.fallbacks.offline_search())
            }
        }
    }

    /// External policy: network first; a stored snapshot only when offline.
    async fn network_first(&self, request: &Request) -> (Source, Response) {
        let error = match self.network.fetch(request).await {
            Ok(response) => return (Source::Network, response),
            Err(e) => e,
        };

        tracing::debug!(url = %request, error = %error, kind = error.kind(), "external fetch failed, trying store");
        match self.store.get(request).await {
            Ok(Some(entry)) => (Source::Cache, entry.into_response()),
            Ok(None) => (Source::Fallback, self.fallbacks.unavailable()),
            Err(e) => {
                tracing::warn!(url = %request, error = %e, kind = e.kind(), "store unavailable for external resource");
                (Source::Fallback, self.fallbacks.unavailable())
            }
        }
    }

    /// Write a response into the store on a detached task.
    ///
    /// The task handle is dropped on purpose: the response goes back
    /// immediately and the write outlives the request. A failed write is
    /// logged and discarded.
    fn populate(&self, request: Request, response: Response) {
        let store = self.store.clone();
        tokio::spawn(async move {
            match store.put(&request, &response).await {
                Ok(()) => tracing::debug!(url = %request, "populated store"),
                Err(e) => tracing::warn!(url = %request, error = %e, kind = e.kind(), "background store write failed"),
            }
        });
    }
}
