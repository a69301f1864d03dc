//! Dashboard demo
//!
//! A dashboard is a set of panels, each backed by one fetched resource.
//! Panels are declared in JSON; refreshing the dashboard runs every panel's
//! fetch through a [`MockMiddleware`], so the cache and in-flight bailouts
//! decide which panels actually hit the transport.

use anyhow::Context;
use fetch_lifecycle_core::{
    ActionDescriptor, ApiCall, FetchOptions, Resource, ResourceState, ResourceStore,
};
use fetch_lifecycle_testing::{MockMiddleware, MockOutcome};
use serde::Deserialize;

/// One panel as declared in configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PanelConfig {
    /// Resource identifier
    pub id: String,
    /// Endpoint to fetch
    pub url: String,
    /// Request options
    #[serde(default)]
    pub options: FetchOptions,
}

/// Dashboard configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DashboardConfig {
    /// Panels, in display order
    pub panels: Vec<PanelConfig>,
}

impl DashboardConfig {
    /// Parse a JSON configuration document
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not valid configuration JSON.
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        serde_json::from_str(json).context("invalid dashboard configuration")
    }
}

#[derive(Debug)]
struct Panel {
    resource: Resource,
    call: ApiCall,
    forced: ApiCall,
}

/// Panels that were fetched and panels that bailed out during a refresh
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshReport {
    /// Store nodes whose fetch ran
    pub fetched: Vec<String>,
    /// Store nodes whose fetch was suppressed
    pub skipped: Vec<String>,
}

/// Live dashboard state
#[derive(Debug)]
pub struct Dashboard {
    panels: Vec<Panel>,
    middleware: MockMiddleware,
}

impl Dashboard {
    /// Build every panel's resource and fetch actions.
    ///
    /// # Errors
    ///
    /// Returns an error if a panel has an empty id or url, or if two panels
    /// share a store node or an action type prefix.
    pub fn from_config(config: DashboardConfig) -> anyhow::Result<Self> {
        let mut store = ResourceStore::new();
        let mut panels = Vec::with_capacity(config.panels.len());

        for PanelConfig { id, url, options } in config.panels {
            let resource =
                Resource::new(id.as_str()).with_context(|| format!("panel {id:?}"))?;
            anyhow::ensure!(
                store.register(&resource),
                "panel {id:?} collides with a registered panel (store node {:?}, prefix {:?})",
                resource.store_node(),
                resource.prefix()
            );

            let forced = resource
                .fetch_action(url.as_str(), options.clone().with_force(true))
                .with_context(|| format!("panel {id:?}"))?;
            let call = resource
                .fetch_action(url, options)
                .with_context(|| format!("panel {id:?}"))?;

            tracing::debug!(panel = %resource, "Panel configured");
            panels.push(Panel {
                resource,
                call,
                forced,
            });
        }

        Ok(Self {
            panels,
            middleware: MockMiddleware::new(store),
        })
    }

    /// Fetch every panel, answering requests with `transport`.
    pub fn refresh<F>(&mut self, transport: F) -> RefreshReport
    where
        F: FnMut(&ActionDescriptor) -> MockOutcome,
    {
        self.run(false, transport)
    }

    /// Fetch every panel, ignoring cached payloads.
    ///
    /// Panels with a request in flight are still skipped.
    pub fn force_refresh<F>(&mut self, transport: F) -> RefreshReport
    where
        F: FnMut(&ActionDescriptor) -> MockOutcome,
    {
        self.run(true, transport)
    }

    fn run<F>(&mut self, force: bool, mut transport: F) -> RefreshReport
    where
        F: FnMut(&ActionDescriptor) -> MockOutcome,
    {
        let mut report = RefreshReport::default();
        for panel in &self.panels {
            let call = if force { &panel.forced } else { &panel.call };
            let store_node = panel.resource.store_node().to_owned();

            match self.middleware.begin(call) {
                Some(in_flight) => {
                    let outcome = transport(in_flight.descriptor());
                    self.middleware.complete(in_flight, outcome);
                    report.fetched.push(store_node);
                },
                None => report.skipped.push(store_node),
            }
        }

        tracing::info!(
            fetched = report.fetched.len(),
            skipped = report.skipped.len(),
            "Dashboard refreshed"
        );
        report
    }

    /// State behind the panel mounted at `store_node`
    #[must_use]
    pub fn panel(&self, store_node: &str) -> Option<&ResourceState> {
        self.panels
            .iter()
            .find(|panel| panel.resource.store_node() == store_node)
            .and_then(|panel| self.middleware.store().get(&panel.resource))
    }

    /// One status line per panel, in display order
    #[must_use]
    pub fn status_lines(&self) -> Vec<String> {
        self.panels
            .iter()
            .filter_map(|panel| {
                let state = self.middleware.store().get(&panel.resource)?;
                let status = if state.loading {
                    "loading".to_owned()
                } else if let Some(message) = state.error_message() {
                    format!("failed ({message})")
                } else if state.payload.is_some() {
                    "ready".to_owned()
                } else {
                    "empty".to_owned()
                };
                Some(format!("{:<10} {status}", panel.resource.store_node()))
            })
            .collect()
    }

    /// The underlying store
    #[must_use]
    pub const fn store(&self) -> &ResourceStore {
        self.middleware.store()
    }

    /// Dispatched action types, oldest first
    #[must_use]
    pub fn history(&self) -> Vec<&str> {
        self.middleware.history_types()
    }
}
