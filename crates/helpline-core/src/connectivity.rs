use serde::{Deserialize, Serialize};

/// Backend reachability as last observed by the health probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectivityState {
    /// No probe has completed yet.
    #[default]
    Unknown,
    Online,
    Offline,
}

impl ConnectivityState {
    pub fn label(self) -> &'static str {
        match self {
            Self::Unknown => "connecting",
            Self::Online => "online",
            Self::Offline => "offline",
        }
    }
}
