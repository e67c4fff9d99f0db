use crate::{CoreError, DeploymentKey, Result as CoreErrorResult};

use std::panic::Location;

use error_location::ErrorLocation;
use serde::{Deserialize, Serialize};

/// One dashboard entry as declared in the tabs file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tab {
    pub text: String,
    pub icon_url: String,
    pub iframe_url: String,
    #[serde(default)]
    pub tab_color: Option<String>,
    /// Deployment restarted from this tab. Absent means not restartable.
    #[serde(default)]
    pub k8s: Option<DeploymentKey>,
}

impl Tab {
    /// Trim every text field and reject blanks.
    #[track_caller]
    pub fn normalized(mut self) -> CoreErrorResult<Self> {
        self.text = required("text", &self.text)?;
        self.icon_url = required("icon_url", &self.icon_url)?;
        self.iframe_url = required("iframe_url", &self.iframe_url)?;
        self.tab_color = self
            .tab_color
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());

        if let Some(key) = self.k8s.take() {
            self.k8s = Some(DeploymentKey::new(
                required("k8s.namespace", &key.namespace)?,
                required("k8s.deployment", &key.deployment)?,
            ));
        }

        Ok(self)
    }
}

#[track_caller]
fn required(field: &str, value: &str) -> CoreErrorResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation {
            message: format!("{field} must not be empty"),
            location: ErrorLocation::from(Location::caller()),
        });
    }
    Ok(trimmed.to_string())
}
