use serde::{Deserialize, Deserializer, Serialize};

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.filter(|value| !value.trim().is_empty()))
}

/// Connection state reported by the remote service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionStatus {
    #[serde(default)]
    pub is_connected: bool,
    #[serde(default)]
    pub is_polling: bool,
    #[serde(default)]
    pub organizations: Vec<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub selected_org: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub default_org: Option<String>,
}

impl ConnectionStatus {
    pub fn disconnected() -> Self {
        Self::default()
    }
}

/// Partial status update. `Some("")` clears an org field; `None` leaves it alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionStatusUpdate {
    pub is_connected: Option<bool>,
    pub is_polling: Option<bool>,
    pub organizations: Option<Vec<String>>,
    pub selected_org: Option<String>,
    pub default_org: Option<String>,
}

impl ConnectionStatusUpdate {
    pub fn merge_into(self, status: &mut ConnectionStatus) {
        if let Some(is_connected) = self.is_connected {
            status.is_connected = is_connected;
        }
        if let Some(is_polling) = self.is_polling {
            status.is_polling = is_polling;
        }
        if let Some(organizations) = self.organizations {
            status.organizations = organizations;
        }
        if let Some(selected_org) = self.selected_org {
            status.selected_org = Some(selected_org).filter(|org| !org.is_empty());
        }
        if let Some(default_org) = self.default_org {
            status.default_org = Some(default_org).filter(|org| !org.is_empty());
        }
    }
}

impl From<ConnectionStatus> for ConnectionStatusUpdate {
    fn from(status: ConnectionStatus) -> Self {
        Self {
            is_connected: Some(status.is_connected),
            is_polling: Some(status.is_polling),
            organizations: Some(status.organizations),
            selected_org: Some(status.selected_org.unwrap_or_default()),
            default_org: Some(status.default_org.unwrap_or_default()),
        }
    }
}
