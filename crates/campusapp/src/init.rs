//! # Initialization
//!
//! Resolves where campus keeps its state, loads configuration, restores the
//! session and builds the [`FsCampusApi`].
//!
//! ## Data Directory
//!
//! One directory holds everything campus persists:
//!
//! ```text
//! <data dir>/
//!   campus.toml    # optional configuration
//!   session.json   # token, user, sign-in time
//!   admins.json    # the admin list
//! ```
//!
//! Resolution order:
//! 1. `data_override` (the CLI's `--data-dir`)
//! 2. `CAMPUS_DATA_DIR` environment variable (primarily for testing)
//! 3. The OS data directory via the `directories` crate
//!
//! ## API URL
//!
//! `api_url_override` (the CLI's `--api-url`) beats `CAMPUS_API_URL`, which
//! beats `campus.toml`, which beats the compiled default.

use crate::api::{CampusApi, FsCampusApi};
use crate::client::ApiClient;
use crate::config::CampusConfig;
use crate::error::{CampusError, Result};
use crate::session::Session;
use crate::store::fs_backend::FsBackend;
use crate::store::local::LocalRepository;
use clapfig::{Clapfig, SearchMode, SearchPath};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const DATA_DIR_ENV: &str = "CAMPUS_DATA_DIR";
pub const API_URL_ENV: &str = "CAMPUS_API_URL";

pub struct CampusContext {
    pub api: FsCampusApi,
    pub config: CampusConfig,
    pub data_dir: PathBuf,
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("com", "campus", "campus")
        .ok_or_else(|| CampusError::Config("could not determine a home directory".to_string()))
}

/// Where campus keeps its state.
pub fn resolve_data_dir(data_override: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(path) = data_override {
        return Ok(path);
    }
    if let Some(path) = std::env::var_os(DATA_DIR_ENV).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(path));
    }
    Ok(project_dirs()?.data_dir().to_path_buf())
}

/// Load `campus.toml` from the global config dir and the data dir, merged,
/// then apply the URL overrides.
pub fn load_config(data_dir: &Path, api_url_override: Option<String>) -> CampusConfig {
    let mut search_paths = Vec::new();
    if let Ok(dirs) = project_dirs() {
        search_paths.push(SearchPath::Path(dirs.config_dir().to_path_buf()));
    }
    search_paths.push(SearchPath::Path(data_dir.to_path_buf()));

    let mut config: CampusConfig = Clapfig::builder()
        .app_name("campus")
        .file_name("campus.toml")
        .search_paths(search_paths)
        .search_mode(SearchMode::Merge)
        .load()
        .unwrap_or_default();

    let env_url = std::env::var(API_URL_ENV).ok().filter(|v| !v.trim().is_empty());
    if let Some(url) = api_url_override.or(env_url) {
        config.api_url = url;
    }
    config
}

/// Build the campus context.
///
/// # Environment Variables
///
/// * `CAMPUS_DATA_DIR` - overrides the default data directory.
/// * `CAMPUS_API_URL` - overrides the configured API URL.
pub fn initialize(
    data_override: Option<PathBuf>,
    api_url_override: Option<String>,
) -> Result<CampusContext> {
    let data_dir = resolve_data_dir(data_override)?;
    let config = load_config(&data_dir, api_url_override);
    debug!(data_dir = %data_dir.display(), api_url = %config.api_url(), "initializing");

    let client = ApiClient::new(config.api_url(), config.timeout(), &config.user_agent())?;
    let session = Session::init_from_storage(FsBackend::new(data_dir.clone()))?;
    let admins = LocalRepository::new(FsBackend::new(data_dir.clone()));
    let api = CampusApi::new(client, session, admins);

    Ok(CampusContext {
        api,
        config,
        data_dir,
    })
}
