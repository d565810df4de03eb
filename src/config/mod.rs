//! Configuration module for Carnet.
//!
//! All configuration is loaded from environment variables with sensible defaults.
//! Credentials saved through the Local Store take precedence over the values
//! read here (see [`crate::sync::SyncCoordinator::start`]).

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::models::NotebookInfo;
use crate::remote::RemoteConfig;
use crate::sync::SyncOptions;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Owner of the repository holding the notebook
    pub owner: String,
    /// Repository holding the notebook
    pub repo: String,
    /// Write credential (also the credential the bundled store accepts)
    pub token: Option<String>,
    /// Path of the notebook file inside the repository
    pub path: String,
    /// Branch the notebook lives on
    pub branch: String,
    /// Base URL of the content API
    pub api_url: String,
    /// Base URL of the anonymous raw-file host
    pub raw_url: String,
    /// Identity recorded as `metadata.updatedBy`
    pub editor: Option<String>,
    /// Title block written to the document's `config` on every save
    pub notebook: Option<NotebookInfo>,
    /// Interval between remote revision checks
    pub poll_interval: Duration,
    /// Path to the Local Store SQLite file
    pub cache_path: PathBuf,
    /// Page budget for the Local Store (`max_page_count`); unlimited if unset
    pub cache_max_pages: Option<u32>,
    /// Search endpoint of the geocoder; geocoding is disabled if unset
    pub geocoder_url: Option<String>,
    /// Path to the content store's SQLite database
    pub store_db_path: PathBuf,
    /// Address to bind the content store to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let owner = env::var("CARNET_OWNER").unwrap_or_else(|_| "carnet".to_string());
        let repo = env::var("CARNET_REPO").unwrap_or_else(|_| "carnet-data".to_string());
        let token = env::var("CARNET_TOKEN").ok().filter(|t| !t.trim().is_empty());
        let path = env::var("CARNET_PATH").unwrap_or_else(|_| "restaurants.json".to_string());
        let branch = env::var("CARNET_BRANCH").unwrap_or_else(|_| "main".to_string());

        let api_url =
            env::var("CARNET_API_URL").unwrap_or_else(|_| "https://api.github.com".to_string());
        let raw_url = env::var("CARNET_RAW_URL")
            .unwrap_or_else(|_| "https://raw.githubusercontent.com".to_string());

        let editor = env::var("CARNET_EDITOR").ok();

        let notebook = NotebookInfo {
            title: env::var("CARNET_NOTEBOOK_TITLE").ok(),
            author: env::var("CARNET_NOTEBOOK_AUTHOR").ok(),
            location: env::var("CARNET_NOTEBOOK_LOCATION").ok(),
        };
        let notebook = (notebook != NotebookInfo::default()).then_some(notebook);

        let poll_interval = env::var("CARNET_POLL_INTERVAL_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(60));

        let cache_path = env::var("CARNET_CACHE_PATH")
            .unwrap_or_else(|_| "./data/cache.sqlite".to_string())
            .into();

        let cache_max_pages = env::var("CARNET_CACHE_MAX_PAGES")
            .ok()
            .and_then(|v| v.parse().ok());

        let geocoder_url = env::var("CARNET_GEOCODER_URL").ok();

        let store_db_path = env::var("CARNET_STORE_DB_PATH")
            .unwrap_or_else(|_| "./data/store.sqlite".to_string())
            .into();

        let bind_addr = env::var("CARNET_BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8080".to_string())
            .parse()
            .expect("Invalid CARNET_BIND_ADDR format");

        let log_level = env::var("CARNET_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Self {
            owner,
            repo,
            token,
            path,
            branch,
            api_url,
            raw_url,
            editor,
            notebook,
            poll_interval,
            cache_path,
            cache_max_pages,
            geocoder_url,
            store_db_path,
            bind_addr,
            log_level,
        }
    }

    /// Settings for the remote document client.
    pub fn remote(&self) -> RemoteConfig {
        RemoteConfig {
            api_url: self.api_url.clone(),
            raw_url: self.raw_url.clone(),
            owner: self.owner.clone(),
            repo: self.repo.clone(),
            path: self.path.clone(),
            branch: self.branch.clone(),
            ..RemoteConfig::default()
        }
    }

    /// Settings for the sync coordinator.
    pub fn sync_options(&self) -> SyncOptions {
        SyncOptions {
            poll_interval: self.poll_interval,
            editor: self.editor.clone(),
            notebook: self.notebook.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use once_cell::sync::Lazy;
    use std::sync::Mutex;

    static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

    const VARS: &[&str] = &[
        "CARNET_OWNER",
        "CARNET_REPO",
        "CARNET_TOKEN",
        "CARNET_PATH",
        "CARNET_BRANCH",
        "CARNET_API_URL",
        "CARNET_RAW_URL",
        "CARNET_EDITOR",
        "CARNET_NOTEBOOK_TITLE",
        "CARNET_NOTEBOOK_AUTHOR",
        "CARNET_NOTEBOOK_LOCATION",
        "CARNET_POLL_INTERVAL_SECS",
        "CARNET_CACHE_PATH",
        "CARNET_CACHE_MAX_PAGES",
        "CARNET_GEOCODER_URL",
        "CARNET_STORE_DB_PATH",
        "CARNET_BIND_ADDR",
        "CARNET_LOG_LEVEL",
    ];

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_default_config() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_env();

        let config = Config::from_env();

        assert!(config.token.is_none());
        assert_eq!(config.path, "restaurants.json");
        assert_eq!(config.branch, "main");
        assert_eq!(config.api_url, "https://api.github.com");
        assert_eq!(config.raw_url, "https://raw.githubusercontent.com");
        assert_eq!(config.poll_interval, Duration::from_secs(60));
        assert_eq!(config.cache_path, PathBuf::from("./data/cache.sqlite"));
        assert!(config.cache_max_pages.is_none());
        assert!(config.geocoder_url.is_none());
        assert!(config.notebook.is_none());
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:8080");
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_overrides_from_env() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_env();
        env::set_var("CARNET_OWNER", "gianni");
        env::set_var("CARNET_REPO", "carnet-gastro");
        env::set_var("CARNET_TOKEN", "ghp_secret");
        env::set_var("CARNET_POLL_INTERVAL_SECS", "15");
        env::set_var("CARNET_CACHE_MAX_PAGES", "64");

        let config = Config::from_env();
        clear_env();

        assert_eq!(config.owner, "gianni");
        assert_eq!(config.token.as_deref(), Some("ghp_secret"));
        assert_eq!(config.poll_interval, Duration::from_secs(15));
        assert_eq!(config.cache_max_pages, Some(64));

        let remote = config.remote();
        assert_eq!(remote.repo, "carnet-gastro");
        assert_eq!(remote.path, "restaurants.json");
    }

    #[test]
    fn test_notebook_info_from_env() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_env();
        env::set_var("CARNET_NOTEBOOK_TITLE", "Mon Carnet Gastro");
        env::set_var("CARNET_NOTEBOOK_LOCATION", "Paris, France");

        let config = Config::from_env();
        clear_env();

        let notebook = config.sync_options().notebook.unwrap();
        assert_eq!(notebook.title.as_deref(), Some("Mon Carnet Gastro"));
        assert!(notebook.author.is_none());
        assert_eq!(notebook.location.as_deref(), Some("Paris, France"));
    }

    #[test]
    fn test_blank_token_is_ignored() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_env();
        env::set_var("CARNET_TOKEN", "   ");

        let config = Config::from_env();
        clear_env();

        assert!(config.token.is_none());
    }
}
