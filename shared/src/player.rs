use serde::{Deserialize, Serialize};

/// Canonical player identity returned by the Mojang resolver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerIdentity {
    pub uuid: String,
    pub username: String,
    #[serde(
        default,
        rename = "skin_showcase_b64",
        skip_serializing_if = "Option::is_none"
    )]
    pub skin_image_base64: Option<String>,
}

impl PlayerIdentity {
    /// Data URI for the rendered skin, when the resolver returned one.
    pub fn skin_data_uri(&self) -> Option<String> {
        self.skin_image_base64
            .as_deref()
            .map(|b64| format!("data:image/png;base64,{b64}"))
    }
}

/// Online/activity status across tracked servers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerStatus {
    pub wynncraft_restricted: bool,
    pub wynncraft_online: bool,
    pub wynncraft_server: Option<String>,
    pub wynncraft_character: Option<String>,
    pub hypixel_online: bool,
    pub hypixel_game_type: Option<String>,
    pub hypixel_mode: Option<String>,
}

impl PlayerStatus {
    pub fn is_online(&self) -> bool {
        self.wynncraft_online || self.hypixel_online
    }

    /// Short human-readable location, e.g. "Wynncraft WC12" or "Hypixel BEDWARS".
    pub fn location(&self) -> Option<String> {
        if self.wynncraft_online {
            return Some(match &self.wynncraft_server {
                Some(server) => format!("Wynncraft {server}"),
                None => "Wynncraft".to_string(),
            });
        }
        if self.hypixel_online {
            return Some(match &self.hypixel_game_type {
                Some(game) => format!("Hypixel {game}"),
                None => "Hypixel".to_string(),
            });
        }
        None
    }
}

/// One cape a player owns on some provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cape {
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_reads_backend_field_names() {
        let identity: PlayerIdentity = serde_json::from_str(
            r#"{"uuid":"069a79f444e94726a5befca90e38aaf5","username":"Notch","skin_showcase_b64":"AAAA","source":"cache"}"#,
        )
        .expect("identity payload should parse");
        assert_eq!(identity.username, "Notch");
        assert_eq!(
            identity.skin_data_uri().as_deref(),
            Some("data:image/png;base64,AAAA")
        );
    }

    #[test]
    fn status_location_prefers_wynncraft() {
        let status = PlayerStatus {
            wynncraft_online: true,
            wynncraft_server: Some("WC12".into()),
            hypixel_online: true,
            ..PlayerStatus::default()
        };
        assert_eq!(status.location().as_deref(), Some("Wynncraft WC12"));
        assert!(PlayerStatus::default().location().is_none());
    }
}
