use serde::Deserialize;

/// `Status` object returned by the API server on failures and ERROR watch events
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
#[serde(default)]
pub struct ApiStatus {
    pub code: Option<u16>,
    pub reason: Option<String>,
    pub message: Option<String>,
}

impl ApiStatus {
    pub fn describe(&self) -> String {
        match (&self.reason, &self.message) {
            (Some(reason), Some(message)) => format!("{reason}: {message}"),
            (Some(text), None) | (None, Some(text)) => text.clone(),
            (None, None) => match self.code {
                Some(code) => format!("watch error (code {code})"),
                None => "watch error".to_string(),
            },
        }
    }
}
