//! Settings read from the environment at startup.
//!
//! - `PORT` / `HOST`: listen address (default `0.0.0.0:8080`)
//! - `APP_DATA_PATH`: JSON file for the local store (default `data/store.json`)
//! - `SUPABASE_URL` + `SUPABASE_ANON_KEY`: use Supabase instead of the local store
//! - `ADMIN_TOKEN`: when set, admin routes require it
//! - `SITE_NAME`: product name shown on the pages (default `Bookwell`)

use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use thiserror::Error;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DATA_PATH: &str = "data/store.json";
const DEFAULT_SITE_NAME: &str = "Bookwell";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid environment variable {0}: {1}")]
    Invalid(&'static str, String),
    #[error("{0} is set but {1} is missing")]
    Incomplete(&'static str, &'static str),
}

#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    pub url: String,
    pub anon_key: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub data_path: PathBuf,
    pub supabase: Option<SupabaseConfig>,
    pub admin_token: Option<String>,
    pub site_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            supabase: None,
            admin_token: None,
            site_name: DEFAULT_SITE_NAME.to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        let port = match get("PORT") {
            Some(value) => value
                .parse::<u16>()
                .map_err(|err| ConfigError::Invalid("PORT", err.to_string()))?,
            None => defaults.port,
        };

        let host = match get("HOST") {
            Some(value) => value
                .parse::<IpAddr>()
                .map_err(|err| ConfigError::Invalid("HOST", err.to_string()))?,
            None => defaults.host,
        };

        let supabase = match (get("SUPABASE_URL"), get("SUPABASE_ANON_KEY")) {
            (Some(url), Some(anon_key)) => {
                if !url.starts_with("http://") && !url.starts_with("https://") {
                    return Err(ConfigError::Invalid("SUPABASE_URL", "must start with http(s)://".into()));
                }
                Some(SupabaseConfig {
                    url: url.trim_end_matches('/').to_string(),
                    anon_key,
                })
            }
            (Some(_), None) => return Err(ConfigError::Incomplete("SUPABASE_URL", "SUPABASE_ANON_KEY")),
            (None, Some(_)) => return Err(ConfigError::Incomplete("SUPABASE_ANON_KEY", "SUPABASE_URL")),
            (None, None) => None,
        };

        Ok(Self {
            host,
            port,
            data_path: get("APP_DATA_PATH").map(PathBuf::from).unwrap_or(defaults.data_path),
            supabase,
            admin_token: get("ADMIN_TOKEN"),
            site_name: get("SITE_NAME").unwrap_or(defaults.site_name),
        })
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.data_path, PathBuf::from("data/store.json"));
        assert!(config.supabase.is_none());
        assert!(config.admin_token.is_none());
        assert_eq!(config.site_name, "Bookwell");
    }

    #[test]
    fn supabase_requires_both_values() {
        let err = Config::from_lookup(lookup(&[("SUPABASE_URL", "https://x.supabase.co")])).unwrap_err();
        assert!(matches!(err, ConfigError::Incomplete("SUPABASE_URL", _)));

        let config = Config::from_lookup(lookup(&[
            ("SUPABASE_URL", "https://x.supabase.co/"),
            ("SUPABASE_ANON_KEY", "anon"),
        ]))
        .unwrap();
        let supabase = config.supabase.unwrap();
        assert_eq!(supabase.url, "https://x.supabase.co");
        assert_eq!(supabase.anon_key, "anon");
    }

    #[test]
    fn bad_port_is_rejected_and_blank_token_ignored() {
        assert!(Config::from_lookup(lookup(&[("PORT", "http")])).is_err());
        let config = Config::from_lookup(lookup(&[("ADMIN_TOKEN", "  ")])).unwrap();
        assert!(config.admin_token.is_none());
    }
}
