//! Live capability catalog.
//!
//! Holds the current [`SwitchyardServer`] snapshot behind a watch channel.
//! A refresh rebuilds the server from the store and swaps the snapshot in;
//! sessions already running keep the snapshot they started with.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::builder::ServerBuilder;
use crate::server::SwitchyardServer;

/// Cheap-to-clone handle to the current server snapshot.
#[derive(Clone)]
pub struct Catalog {
    inner: Arc<CatalogInner>,
}

struct CatalogInner {
    builder: ServerBuilder,
    tx: watch::Sender<SwitchyardServer>,
}

impl Catalog {
    /// Build the first snapshot. Fails if the initial build fails.
    pub async fn load(builder: ServerBuilder) -> switchyard_core::Result<Self> {
        let server = builder.build().await?;
        let (tx, _rx) = watch::channel(server);
        Ok(Self {
            inner: Arc::new(CatalogInner { builder, tx }),
        })
    }

    /// The current server snapshot.
    pub fn current(&self) -> SwitchyardServer {
        self.inner.tx.borrow().clone()
    }

    /// Subscribe to snapshot replacements.
    pub fn subscribe(&self) -> watch::Receiver<SwitchyardServer> {
        self.inner.tx.subscribe()
    }

    /// Rebuild from the store and publish the result.
    ///
    /// On failure the previous snapshot stays in place.
    pub async fn refresh(&self) -> switchyard_core::Result<()> {
        let server = self.inner.builder.build().await?;
        log::debug!(
            "Catalog refreshed: {} tool(s), {} prompt(s), {} resource(s)",
            server.tool_count(),
            server.prompt_count(),
            server.resource_count()
        );
        self.inner.tx.send_replace(server);
        Ok(())
    }

    /// Refresh every `every` on a background task. `None` when `every` is zero.
    pub fn spawn_refresh(&self, every: Duration) -> Option<JoinHandle<()>> {
        if every.is_zero() {
            return None;
        }

        let catalog = self.clone();
        Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // The first tick completes immediately; the initial snapshot is already built.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if let Err(e) = catalog.refresh().await {
                    log::warn!("Catalog refresh failed, keeping previous snapshot: {e}");
                }
            }
        }))
    }
}

impl std::fmt::Debug for Catalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Catalog")
            .field("current", &*self.inner.tx.borrow())
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;
    use switchyard_core::testing::StaticInvoker;
    use switchyard_core::{ConfigEntry, ConfigPage, ConfigStore, Error};

    use crate::builder::Prefixes;

    /// A store whose contents and health can change between reads.
    #[derive(Default)]
    struct MutableStore {
        entries: Mutex<Vec<ConfigEntry>>,
        down: Mutex<bool>,
    }

    impl MutableStore {
        fn add_tool(&self, name: &str) {
            self.entries.lock().unwrap().push(ConfigEntry::new(
                format!("/app/tools/{name}"),
                json!({"name": name}).to_string(),
            ));
        }

        fn set_down(&self, down: bool) {
            *self.down.lock().unwrap() = down;
        }
    }

    #[async_trait]
    impl ConfigStore for MutableStore {
        async fn list_entries(
            &self,
            _namespace: &str,
            _next_token: Option<&str>,
        ) -> switchyard_core::Result<ConfigPage> {
            if *self.down.lock().unwrap() {
                return Err(Error::store("store unavailable"));
            }
            Ok(ConfigPage {
                entries: self.entries.lock().unwrap().clone(),
                next_token: None,
            })
        }
    }

    fn builder(store: Arc<MutableStore>) -> ServerBuilder {
        ServerBuilder::new(store, Arc::new(StaticInvoker::json(json!({"content": []}))))
            .with_namespace("/app")
            .with_prefixes(Prefixes {
                tools: Some("/app/tools/".to_string()),
                ..Default::default()
            })
    }

    #[tokio::test]
    async fn test_refresh_picks_up_new_entries() {
        let store = Arc::new(MutableStore::default());
        store.add_tool("first");
        let catalog = Catalog::load(builder(store.clone())).await.unwrap();
        assert_eq!(catalog.current().tool_count(), 1);

        store.add_tool("second");
        catalog.refresh().await.unwrap();
        assert_eq!(catalog.current().tool_count(), 2);
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_snapshot() {
        let store = Arc::new(MutableStore::default());
        store.add_tool("first");
        let catalog = Catalog::load(builder(store.clone())).await.unwrap();

        store.set_down(true);
        assert!(catalog.refresh().await.is_err());
        assert_eq!(catalog.current().tool_count(), 1);
    }

    #[tokio::test]
    async fn test_initial_failure_is_fatal() {
        let store = Arc::new(MutableStore::default());
        store.set_down(true);
        assert!(Catalog::load(builder(store)).await.is_err());
    }

    #[tokio::test]
    async fn test_subscribers_see_replacements() {
        let store = Arc::new(MutableStore::default());
        let catalog = Catalog::load(builder(store.clone())).await.unwrap();
        let mut rx = catalog.subscribe();

        store.add_tool("late");
        catalog.refresh().await.unwrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().tool_count(), 1);
    }

    #[tokio::test]
    async fn test_spawn_refresh_disabled_at_zero() {
        let store = Arc::new(MutableStore::default());
        let catalog = Catalog::load(builder(store)).await.unwrap();
        assert!(catalog.spawn_refresh(Duration::ZERO).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_spawn_refresh_runs_periodically() {
        let store = Arc::new(MutableStore::default());
        let catalog = Catalog::load(builder(store.clone())).await.unwrap();
        let handle = catalog.spawn_refresh(Duration::from_secs(60)).unwrap();

        store.add_tool("later");
        tokio::time::sleep(Duration::from_secs(61)).await;
        assert_eq!(catalog.current().tool_count(), 1);
        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_spawn_refresh_survives_failures() {
        let store = Arc::new(MutableStore::default());
        store.add_tool("first");
        let catalog = Catalog::load(builder(store.clone())).await.unwrap();
        let handle = catalog.spawn_refresh(Duration::from_secs(60)).unwrap();

        store.set_down(true);
        store.add_tool("second");
        tokio::time::sleep(Duration::from_secs(61)).await;
        assert_eq!(catalog.current().tool_count(), 1);
        assert!(!handle.is_finished());

        store.set_down(false);
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(catalog.current().tool_count(), 2);
        handle.abort();
    }
}
