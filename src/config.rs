// nrcq - CLI for the NagRestConf REST API
// Copyright (C) 2014  Mark Clarkson
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use anyhow::Result;
use dirs::config_dir;
use serde::Deserialize;
use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_FOLDER: &str = "local";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Defaults read from `.nrcq.yaml` files. Command-line flags win.
#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub username: Option<String>,
    pub password: Option<String>,
    pub folder: Option<String>,
    pub timeout_secs: Option<u64>,
    pub insecure: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Local,
    User,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("timeout_secs must be greater than zero")]
    ZeroTimeout,
    #[error("reading {path:?}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing {path:?}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

#[derive(Debug)]
pub struct EffectiveConfig {
    pub username: Option<String>,
    pub password: Option<String>,
    pub folder: String,
    pub timeout: Duration,
    pub insecure: bool,
}

/// `None` when the platform has no per-user config directory.
pub fn config_path(scope: Scope, cwd: &Path) -> Option<PathBuf> {
    match scope {
        Scope::Local => Some(cwd.join(".nrcq.yaml")),
        Scope::User => {
            if let Ok(custom) = env::var("NRCQ_CONFIG_DIR") {
                return Some(PathBuf::from(custom).join("config.yaml"));
            }
            config_dir().map(|base| base.join("nrcq").join("config.yaml"))
        }
    }
}

pub fn load(cwd: &Path) -> Result<Config> {
    let user = load_scope(Scope::User, cwd)?;
    let local = load_scope(Scope::Local, cwd)?;
    Ok(merge(user, local))
}

pub fn load_scope(scope: Scope, cwd: &Path) -> Result<Config> {
    match config_path(scope, cwd) {
        Some(path) => Ok(read_if_exists(&path)?.unwrap_or_default()),
        None => Ok(Config::default()),
    }
}

/// Layer `overrides` (from the command line) over the config files.
pub fn resolve(cwd: &Path, overrides: Config) -> Result<EffectiveConfig> {
    let merged = merge(load(cwd)?, overrides);

    let timeout_secs = merged.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS);
    if timeout_secs == 0 {
        return Err(ConfigError::ZeroTimeout.into());
    }

    Ok(EffectiveConfig {
        username: merged.username.filter(|u| !u.is_empty()),
        password: merged.password,
        folder: merged
            .folder
            .unwrap_or_else(|| DEFAULT_FOLDER.to_string()),
        timeout: Duration::from_secs(timeout_secs),
        insecure: merged.insecure.unwrap_or(false),
    })
}

fn read_if_exists(path: &Path) -> Result<Option<Config>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }

    debug!(path = %path.display(), "reading config");
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config = serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Some(config))
}

fn merge(base: Config, over: Config) -> Config {
    Config {
        username: over.username.or(base.username),
        password: over.password.or(base.password),
        folder: over.folder.or(base.folder),
        timeout_secs: over.timeout_secs.or(base.timeout_secs),
        insecure: over.insecure.or(base.insecure),
    }
}
