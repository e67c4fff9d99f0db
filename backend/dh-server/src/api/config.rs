//! Tab configuration handler

use crate::AppState;

use axum::{Json, extract::State};
use dh_core::Tab;
use serde::Serialize;

/// One tab as rendered by the dashboard
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TabDto {
    pub text: String,
    pub icon_url: String,
    pub iframe_url: String,
    pub restartable: bool,
    pub tab_color: Option<String>,
}

impl From<&Tab> for TabDto {
    fn from(tab: &Tab) -> Self {
        Self {
            text: tab.text.clone(),
            icon_url: tab.icon_url.clone(),
            iframe_url: tab.iframe_url.clone(),
            restartable: tab.k8s.is_some(),
            tab_color: tab.tab_color.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ConfigResponse {
    pub tabs: Vec<TabDto>,
}

/// GET /api/config
pub async fn get_config(State(state): State<AppState>) -> Json<ConfigResponse> {
    Json(ConfigResponse {
        tabs: state.catalog.tabs().iter().map(TabDto::from).collect(),
    })
}
