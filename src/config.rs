// Copyright 2025 Simo Sorce
// See LICENSE.txt file for terms

//! Configuration of the mechanism core.
//!
//! The configuration is a small TOML file that can restrict the set of
//! registered mechanisms and choose how `CKH_HEDGE_PREFERRED` signatures
//! are produced.

use std::env;
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};
use crate::mechanism::name_to_mech_type;
use crate::pkcs11::*;

use serde::de;
use serde::{Deserialize, Serialize};

#[cfg(not(test))]
const DEFAULT_CONF_DIR: &str = {
    match option_env!("CONFDIR") {
        Some(p) => p,
        None => "/usr/local/etc",
    }
};
#[cfg(test)]
const DEFAULT_CONF_DIR: &str = "test";

pub const DEFAULT_CONF_NAME: &str = "core.conf";

/// How signatures are produced when the caller leaves the choice to
/// the implementation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HedgePreference {
    #[default]
    Randomized,
    Deterministic,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Restricts the registry to these mechanism names, all registered
    /// mechanisms are available when unset
    #[serde(default)]
    pub mechanisms: Option<Vec<String>>,
    /// Signature mode used for `CKH_HEDGE_PREFERRED`
    #[serde(default)]
    pub hedge_preferred: HedgePreference,
}

fn config_error<E: de::Error + Send + Sync + 'static>(error: E) -> Error {
    Error::ck_rv_from_error(CKR_ARGUMENTS_BAD, error)
}

impl Config {
    pub fn new() -> Config {
        Config::default()
    }

    /// Finds the configuration file
    pub fn find_conf() -> Result<String> {
        /* First check for our own env var,
         * this has the highest precedence */
        if let Ok(var) = env::var("P11CORE_CONF") {
            return Ok(var);
        }
        /* Freedesktop specification for config dirs first
         * then fallback to use $HOME/.config, if that is also not
         * available see if we have a system wide file */
        let datafile = match env::var("XDG_CONFIG_HOME") {
            Ok(xdg) => format!("{}/p11core/{}", xdg, DEFAULT_CONF_NAME),
            Err(_) => match env::var("HOME") {
                Ok(home) => {
                    format!("{}/.config/p11core/{}", home, DEFAULT_CONF_NAME)
                }
                Err(_) => format!(
                    "{}/p11core/{}",
                    DEFAULT_CONF_DIR, DEFAULT_CONF_NAME
                ),
            },
        };
        if Path::new(&datafile).is_file() {
            Ok(datafile)
        } else {
            Err(CKR_ARGUMENTS_BAD)?
        }
    }

    /// Loads and checks the configuration from a file
    pub fn from_file(filename: &str) -> Result<Config> {
        let config_str = match fs::read_to_string(filename) {
            Ok(s) => s,
            Err(e) => return Err(Error::ck_rv_from_error(CKR_ARGUMENTS_BAD, e)),
        };
        Config::from_toml(&config_str)
    }

    /// Parses and checks the configuration from a TOML string
    pub fn from_toml(config_str: &str) -> Result<Config> {
        let conf: Config = toml::from_str(config_str).map_err(config_error)?;
        /* reject unknown names early */
        conf.allowed_mechanisms()?;
        Ok(conf)
    }

    /// Returns the list of allowed mechanism ids, None means all
    pub fn allowed_mechanisms(&self) -> Result<Option<Vec<CK_MECHANISM_TYPE>>> {
        let names = match &self.mechanisms {
            Some(n) => n,
            None => return Ok(None),
        };
        let mut ids = Vec::with_capacity(names.len());
        for name in names {
            match name_to_mech_type(name) {
                Ok(id) => ids.push(id),
                Err(_) => {
                    return Err(Error::ck_rv_with_errmsg(
                        CKR_ARGUMENTS_BAD,
                        format!("unknown mechanism name {}", name),
                    ))
                }
            }
        }
        Ok(Some(ids))
    }
}
