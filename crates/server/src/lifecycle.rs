//! Interceptor lifecycle: install, activate, request and message hooks.
//!
//! States advance `parsed -> installing -> installed -> activating -> activated`.
//! Install always asks to skip waiting, so [`Interceptor::start`] runs both
//! phases back to back. Without that request an installed interceptor waits
//! until a `SKIP_WAITING` message arrives.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Context;
use appshell_client::{Fallbacks, Handled, SearchEndpoint, SearchOutcome, StrategyEngine, read_search_response};
use appshell_core::{
    AppConfig, CacheDb, CacheVersion, Classifier, Error, InstallReport, Network, Request, ShellManifest, ShellStore,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use url::Url;

/// Lifecycle phase of the interceptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    Parsed,
    Installing,
    Installed,
    Activating,
    Activated,
}

/// Inbound control messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlMessage {
    SkipWaiting,
}

impl ControlMessage {
    /// Parse the wire `type` of a message. Unknown kinds yield `None`.
    pub fn parse(kind: &str) -> Option<Self> {
        match kind {
            "SKIP_WAITING" => Some(ControlMessage::SkipWaiting),
            _ => None,
        }
    }
}

/// Snapshot of the lifecycle for reporting.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct LifecycleStatus {
    pub state: LifecycleState,
    pub cache_version: String,
    pub stored_versions: Vec<String>,
    pub shell_entries: u64,
    pub clients_claimed: bool,
    pub last_install: Option<InstallReport>,
}

/// Host of the strategy engine.
pub struct Interceptor {
    engine: StrategyEngine,
    manifest: ShellManifest,
    app_origin: Url,
    search: SearchEndpoint,
    state: RwLock<LifecycleState>,
    skip_waiting: AtomicBool,
    clients_claimed: AtomicBool,
    last_install: RwLock<Option<InstallReport>>,
}

impl Interceptor {
    pub fn new(engine: StrategyEngine, manifest: ShellManifest, app_origin: Url, search: SearchEndpoint) -> Self {
        Self {
            engine,
            manifest,
            app_origin,
            search,
            state: RwLock::new(LifecycleState::Parsed),
            skip_waiting: AtomicBool::new(false),
            clients_claimed: AtomicBool::new(false),
            last_install: RwLock::new(None),
        }
    }

    /// Wire the engine and lifecycle from configuration.
    pub fn from_config(config: &AppConfig, db: CacheDb, network: Arc<dyn Network>) -> anyhow::Result<Self> {
        let app_origin = config.app_origin_url()?;
        let classifier = Classifier::from_config(config)?;
        let store = ShellStore::new(db, CacheVersion::new(&config.cache_version), &config.vendor_marker);
        let fallbacks = Fallbacks::from_config(config).context("building fallback responses")?;
        let manifest = ShellManifest::resolve(&config.shell_manifest, &app_origin).context("resolving shell manifest")?;
        let search = SearchEndpoint::from_config(config)?;

        let engine = StrategyEngine::new(classifier, store, network, fallbacks);
        Ok(Self::new(engine, manifest, app_origin, search))
    }

    pub fn engine(&self) -> &StrategyEngine {
        &self.engine
    }

    pub async fn state(&self) -> LifecycleState {
        *self.state.read().await
    }

    pub fn clients_claimed(&self) -> bool {
        self.clients_claimed.load(Ordering::SeqCst)
    }

    /// Install, then activate right away if waiting was skipped.
    pub async fn start(&self) -> InstallReport {
        let report = self.on_install().await;
        if self.skip_waiting.load(Ordering::SeqCst)
            && let Err(e) = self.on_activate().await
        {
            tracing::error!(error = %e, "activation failed");
        }
        report
    }

    /// Cache the shell manifest and request immediate activation.
    pub async fn on_install(&self) -> InstallReport {
        tracing::info!(version = %self.engine.store().version(), "installing");
        *self.state.write().await = LifecycleState::Installing;

        let report = self.engine.store().install(&self.manifest, self.engine.network()).await;

        *self.last_install.write().await = Some(report.clone());
        *self.state.write().await = LifecycleState::Installed;
        self.skip_waiting.store(true, Ordering::SeqCst);
        report
    }

    /// Purge stale generations, then take over every client.
    ///
    /// On store failure the interceptor falls back to `installed` so a later
    /// `SKIP_WAITING` can retry.
    pub async fn on_activate(&self) -> Result<Vec<String>, Error> {
        tracing::info!(version = %self.engine.store().version(), "activating");
        *self.state.write().await = LifecycleState::Activating;

        let deleted = match self.engine.store().activate().await {
            Ok(deleted) => deleted,
            Err(e) => {
                *self.state.write().await = LifecycleState::Installed;
                return Err(e);
            }
        };

        self.clients_claimed.store(true, Ordering::SeqCst);
        *self.state.write().await = LifecycleState::Activated;
        tracing::info!(deleted = deleted.len(), "activated and controlling all clients");
        Ok(deleted)
    }

    /// Route a request through the engine. Always yields a response.
    pub async fn on_request(&self, request: &Request) -> Handled {
        if !self.clients_claimed() {
            tracing::debug!(url = %request, "handling request before activation");
        }
        self.engine.handle(request).await
    }

    /// Handle a control message. Returns whether it was recognized.
    pub async fn on_message(&self, kind: &str) -> bool {
        tracing::debug!(kind, "control message");
        match ControlMessage::parse(kind) {
            Some(ControlMessage::SkipWaiting) => {
                self.skip_waiting.store(true, Ordering::SeqCst);
                if self.state().await == LifecycleState::Installed
                    && let Err(e) = self.on_activate().await
                {
                    tracing::error!(error = %e, "activation after skip-waiting failed");
                }
                true
            }
            None => {
                tracing::warn!(kind, "ignoring unknown control message");
                false
            }
        }
    }

    /// Resolve a request target against the application origin.
    pub fn resolve(&self, target: &str) -> Result<Request, Error> {
        Request::parse(target, Some(&self.app_origin))
    }

    /// Search drinks through the engine.
    pub async fn search(&self, query: &str) -> Result<SearchOutcome, Error> {
        let request = self.search.request(query)?;
        let handled = self.on_request(&request).await;
        read_search_response(&handled.response)
    }

    pub async fn status(&self) -> Result<LifecycleStatus, Error> {
        let store = self.engine.store();
        Ok(LifecycleStatus {
            state: self.state().await,
            cache_version: store.version().to_string(),
            stored_versions: store.versions().await?,
            shell_entries: store.db().count_entries(store.version().as_str()).await?,
            clients_claimed: self.clients_claimed(),
            last_install: self.last_install.read().await.clone(),
        })
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use appshell_core::Response;
    use async_trait::async_trait;
    use std::collections::HashMap;

    /// Known URLs answer; everything else is unreachable.
    pub struct StaticNetwork {
        routes: HashMap<String, Response>,
    }

    impl StaticNetwork {
        pub fn new(routes: &[(&str, Response)]) -> Self {
            Self { routes: routes.iter().map(|(u, r)| (u.to_string(), r.clone())).collect() }
        }
    }

    #[async_trait]
    impl Network for StaticNetwork {
        async fn fetch(&self, request: &Request) -> Result<Response, Error> {
            self.routes
                .get(request.key())
                .cloned()
                .ok_or_else(|| Error::Network(format!("unreachable: {request}")))
        }
    }

    pub fn config() -> AppConfig {
        AppConfig {
            shell_manifest: vec!["/".into(), "/index.html".into(), "/assets/placeholder.jpg".into()],
            offline_label: "Offline Special".into(),
            ..Default::default()
        }
    }

    pub async fn interceptor_with(db: CacheDb, routes: &[(&str, Response)]) -> Interceptor {
        Interceptor::from_config(&config(), db, Arc::new(StaticNetwork::new(routes))).unwrap()
    }

    pub async fn interceptor(routes: &[(&str, Response)]) -> Interceptor {
        interceptor_with(CacheDb::open_in_memory().await.unwrap(), routes).await
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use appshell_core::{ResourceClass, Response};
    use appshell_client::Source;

    fn shell_routes() -> Vec<(&'static str, Response)> {
        vec![
            ("http://localhost:8080/", Response::new(200).with_body("root")),
            ("http://localhost:8080/index.html", Response::new(200).with_body("index")),
        ]
    }

    #[test]
    fn test_control_message_parse() {
        assert_eq!(ControlMessage::parse("SKIP_WAITING"), Some(ControlMessage::SkipWaiting));
        assert_eq!(ControlMessage::parse("skip_waiting"), None);
        assert_eq!(ControlMessage::parse("CLAIM"), None);
    }

    #[tokio::test]
    async fn test_start_installs_and_activates() {
        let interceptor = interceptor(&shell_routes()).await;
        assert_eq!(interceptor.state().await, LifecycleState::Parsed);

        let report = interceptor.start().await;

        assert_eq!(report.cached.len(), 2);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(interceptor.state().await, LifecycleState::Activated);
        assert!(interceptor.clients_claimed());
    }

    #[tokio::test]
    async fn test_install_alone_waits() {
        let interceptor = interceptor(&shell_routes()).await;
        interceptor.on_install().await;

        assert_eq!(interceptor.state().await, LifecycleState::Installed);
        assert!(!interceptor.clients_claimed());
    }

    #[tokio::test]
    async fn test_skip_waiting_message_activates() {
        let interceptor = interceptor(&shell_routes()).await;
        interceptor.on_install().await;

        assert!(interceptor.on_message("SKIP_WAITING").await);
        assert_eq!(interceptor.state().await, LifecycleState::Activated);
    }

    #[tokio::test]
    async fn test_unknown_message_ignored() {
        let interceptor = interceptor(&shell_routes()).await;
        interceptor.on_install().await;

        assert!(!interceptor.on_message("REFRESH").await);
        assert_eq!(interceptor.state().await, LifecycleState::Installed);
    }

    #[tokio::test]
    async fn test_activation_purges_previous_generation() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.put_entry("cocktail-finder-v2-appshell", "http://localhost:8080/", &Response::new(200))
            .await
            .unwrap();
        let interceptor = interceptor_with(db, &shell_routes()).await;

        interceptor.start().await;
        let status = interceptor.status().await.unwrap();

        assert_eq!(status.stored_versions, vec!["cocktail-finder-v3-appshell".to_string()]);
        assert_eq!(status.shell_entries, 2);
        assert!(status.last_install.is_some());
    }

    #[tokio::test]
    async fn test_activation_twice_is_stable() {
        let interceptor = interceptor(&shell_routes()).await;
        interceptor.start().await;
        let first = interceptor.status().await.unwrap().stored_versions;

        assert!(interceptor.on_activate().await.unwrap().is_empty());
        assert_eq!(interceptor.status().await.unwrap().stored_versions, first);
    }

    #[tokio::test]
    async fn test_request_served_from_installed_shell() {
        let interceptor = interceptor(&shell_routes()).await;
        interceptor.start().await;

        let handled = interceptor.on_request(&interceptor.resolve("/index.html").unwrap()).await;

        assert_eq!(handled.class, ResourceClass::ShellAsset);
        assert_eq!(handled.source, Source::Cache);
        assert_eq!(handled.response.text(), "index");
    }

    #[tokio::test]
    async fn test_request_before_activation_is_still_handled() {
        let interceptor = interceptor(&[]).await;
        let handled = interceptor.on_request(&interceptor.resolve("/main.js").unwrap()).await;
        assert_eq!(handled.response.status, 200);
    }

    #[tokio::test]
    async fn test_search_offline() {
        let interceptor = interceptor(&[]).await;
        let outcome = interceptor.search("margarita").await.unwrap();

        assert!(outcome.offline);
        assert_eq!(outcome.drinks[0].name, "Offline Special");
    }

    #[tokio::test]
    async fn test_search_online() {
        let body = r#"{"drinks":[{"idDrink":"11007","strDrink":"Margarita","strDrinkThumb":null}]}"#;
        let interceptor = interceptor(&[(
            "https://www.thecocktaildb.com/api/json/v1/1/search.php?s=margarita",
            Response::new(200).with_body(body),
        )])
        .await;

        let outcome = interceptor.search("margarita").await.unwrap();

        assert!(!outcome.offline);
        assert_eq!(outcome.drinks[0].id, "11007");
    }
}
