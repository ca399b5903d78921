use crate::identity::HostUser;
use std::{env, path::PathBuf};
use tracing::warn;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_DATA_PATH: &str = "data/tips.json";

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// HTTP port to listen on.
    pub port: u16,

    /// JSON file backing the key-value store.
    pub data_path: PathBuf,

    /// Identity tips are attributed to. Falls back to a placeholder.
    pub host_user: HostUser,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_vars(
            env::var("PORT").ok(),
            env::var("TIP_DATA_PATH").ok(),
            env::var("TIP_HOST_USER").ok(),
        )
    }

    pub fn from_vars(port: Option<String>, data_path: Option<String>, host_user: Option<String>) -> Self {
        let port = match port {
            Some(value) => value.parse::<u16>().unwrap_or_else(|_| {
                warn!("invalid PORT {value:?}, using {DEFAULT_PORT}");
                DEFAULT_PORT
            }),
            None => DEFAULT_PORT,
        };

        let data_path = data_path
            .filter(|path| !path.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_PATH));

        let host_user = match host_user {
            Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|err| {
                warn!("invalid TIP_HOST_USER ({err}), using placeholder identity");
                HostUser::placeholder()
            }),
            None => HostUser::placeholder(),
        };

        Self {
            port,
            data_path,
            host_user,
        }
    }
}
