use crate::{CoreError, DeploymentKey, Result as CoreErrorResult, Tab, TabBinding};

use std::panic::Location;
use std::sync::Arc;

use error_location::ErrorLocation;

/// Immutable tab configuration loaded once at startup
#[derive(Debug, Clone)]
pub struct TabCatalog {
    tabs: Arc<[Tab]>,
}

impl TabCatalog {
    /// Build a catalog, normalizing every tab. At least one tab is required.
    #[track_caller]
    pub fn new(tabs: Vec<Tab>) -> CoreErrorResult<Self> {
        if tabs.is_empty() {
            return Err(CoreError::Validation {
                message: "configuration must define at least one tab".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let tabs = tabs
            .into_iter()
            .map(Tab::normalized)
            .collect::<CoreErrorResult<Vec<_>>>()?;

        Ok(Self { tabs: tabs.into() })
    }

    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    pub fn tabs(&self) -> &[Tab] {
        &self.tabs
    }

    #[track_caller]
    pub fn tab(&self, index: usize) -> CoreErrorResult<&Tab> {
        self.tabs.get(index).ok_or_else(|| CoreError::TabNotFound {
            index,
            location: ErrorLocation::from(Location::caller()),
        })
    }

    /// Resolve the deployment binding for a tab index
    #[track_caller]
    pub fn get(&self, index: usize) -> CoreErrorResult<TabBinding> {
        let tab = self.tab(index)?;
        Ok(TabBinding {
            index,
            deployment_key: tab.k8s.clone(),
        })
    }

    /// Resolve a binding that is guaranteed to carry a deployment
    #[track_caller]
    pub fn assert_restartable(&self, index: usize) -> CoreErrorResult<TabBinding> {
        let binding = self.get(index)?;
        if !binding.is_restartable() {
            return Err(CoreError::TabNotRestartable {
                index,
                location: ErrorLocation::from(Location::caller()),
            });
        }
        Ok(binding)
    }

    /// Distinct deployments referenced by the catalog
    pub fn deployments(&self) -> Vec<DeploymentKey> {
        let mut keys: Vec<DeploymentKey> = Vec::new();
        for key in self.tabs.iter().filter_map(|t| t.k8s.as_ref()) {
            if !keys.contains(key) {
                keys.push(key.clone());
            }
        }
        keys
    }
}
