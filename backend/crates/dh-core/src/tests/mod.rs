mod tab_catalog;

use crate::{DeploymentKey, Tab};

pub(crate) fn tab(text: &str, k8s: Option<(&str, &str)>) -> Tab {
    Tab {
        text: text.to_string(),
        icon_url: format!("https://example.com/{text}.svg"),
        iframe_url: format!("https://example.com/{text}"),
        tab_color: None,
        k8s: k8s.map(|(ns, name)| DeploymentKey::new(ns, name)),
    }
}
