use std::path::PathBuf;

pub const DEFAULT_SERVER_PORT: u16 = 3000;
pub const DEFAULT_STATIC_DIR: &str = "client/dist";

pub fn server_port() -> u16 {
    std::env::var("PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(DEFAULT_SERVER_PORT)
}

pub fn static_dir() -> PathBuf {
    std::env::var_os("ASPEXIS_STATIC_DIR")
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_STATIC_DIR))
}

/// Backend base URL handed to the browser. `None` means same-origin.
pub fn api_base_url() -> Option<String> {
    std::env::var("ASPEXIS_API_URL")
        .ok()
        .map(|value| value.trim().trim_end_matches('/').to_owned())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_falls_back_on_invalid_values() {
        temp_env::with_var("PORT", Some("8080"), || {
            assert_eq!(server_port(), 8080);
        });
        temp_env::with_var("PORT", Some("0"), || {
            assert_eq!(server_port(), DEFAULT_SERVER_PORT);
        });
        temp_env::with_var("PORT", Some("http"), || {
            assert_eq!(server_port(), DEFAULT_SERVER_PORT);
        });
    }

    #[test]
    fn api_base_url_is_trimmed_or_absent() {
        temp_env::with_var("ASPEXIS_API_URL", Some(" https://api.aspexis.test/ "), || {
            assert_eq!(api_base_url().as_deref(), Some("https://api.aspexis.test"));
        });
        temp_env::with_var("ASPEXIS_API_URL", Some(""), || {
            assert_eq!(api_base_url(), None);
        });
        temp_env::with_var_unset("ASPEXIS_API_URL", || {
            assert_eq!(api_base_url(), None);
        });
    }

    #[test]
    fn static_dir_defaults_to_client_bundle() {
        temp_env::with_var_unset("ASPEXIS_STATIC_DIR", || {
            assert_eq!(static_dir(), PathBuf::from(DEFAULT_STATIC_DIR));
        });
    }
}
