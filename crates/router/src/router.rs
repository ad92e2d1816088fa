//! The fetch policy router.

use std::sync::Arc;

use fetchwork_client::{CacheMode, FetchResponse, Upstream};
use fetchwork_core::{AppConfig, CacheStore, Error, RequestDescriptor};

use crate::activate::{self, ActivateReport};
use crate::fetch;
use crate::install::{self, InstallReport};
use crate::route::{RouteClass, classify};

/// Classifies requests and answers them from cache, network, or both,
/// against one current cache generation.
///
/// The router never synthesizes responses: everything it returns came
/// from the network or from a stored snapshot, and a request that both
/// layers fail surfaces the network error.
pub struct FetchRouter<S, U> {
    store: Arc<S>,
    upstream: Arc<U>,
    config: AppConfig,
}

impl<S, U> FetchRouter<S, U>
where
    S: CacheStore + Send + Sync + 'static,
    U: Upstream + 'static,
{
    pub fn new(store: S, upstream: U, config: AppConfig) -> Self {
        Self { store: Arc::new(store), upstream: Arc::new(upstream), config }
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Prepare the current generation: create it and pre-warm the
    /// configured URL list. Safe to call again; pre-warm entries are
    /// simply overwritten.
    pub async fn install(&self) -> Result<InstallReport, Error> {
        install::run(&self.store, &self.upstream, &self.config).await
    }

    /// Promote the current generation by deleting every other one.
    pub async fn activate(&self) -> Result<ActivateReport, Error> {
        activate::run(&self.store, &self.config.cache_generation).await
    }

    /// Answer one request according to its route class.
    pub async fn handle_fetch(&self, req: &RequestDescriptor) -> Result<FetchResponse, Error> {
        let class = classify(req, &self.config.api_prefix);
        tracing::debug!(url = %req.url, class = %class, "routing fetch");

        let generation = self.config.cache_generation.as_str();
        match class {
            RouteClass::Stream => fetch::passthrough(self.upstream.as_ref(), req).await,
            RouteClass::Api => {
                fetch::network_first(&self.store, self.upstream.as_ref(), req, generation, CacheMode::NoStore, false)
                    .await
            }
            RouteClass::Navigation => {
                fetch::network_first(&self.store, self.upstream.as_ref(), req, generation, CacheMode::Default, true)
                    .await
            }
            RouteClass::Asset => fetch::cache_first(&self.store, self.upstream.as_ref(), req, generation).await,
        }
    }
}
