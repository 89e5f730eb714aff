// SPDX-FileCopyrightText: 2025 Alexandre Gomes Gaigalas <alganet@gmail.com>
//
// SPDX-License-Identifier: ISC

//! Configuration loading: server settings and the caller-facing validator
//! options.

use serde::Deserialize;
use std::path::PathBuf;

/// Default request/response header that exempts a response from validation.
pub const DEFAULT_EXEMPTION_HEADER: &str = "Partial";

/// Default render-model key that exempts a response from validation.
pub const DEFAULT_MODEL_FLAG_KEY: &str = "_disableValidator";

#[derive(Debug, Clone, Deserialize)]
pub struct GeneralConfig {
    /// Listen address, e.g. 127.0.0.1:3000
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Base URI of the application being validated, e.g. http://127.0.0.1:8080
    #[serde(default)]
    pub upstream: Option<String>,

    /// Directory searched for `.htmlValidate.json` (default: current directory)
    #[serde(default)]
    pub root: Option<PathBuf>,
}

fn default_listen() -> String {
    "127.0.0.1:3000".to_string()
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            upstream: None,
            root: None,
        }
    }
}

/// Exemption settings as supplied by the caller. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ExceptionsConfig {
    /// Route globs that are never validated.
    #[serde(default)]
    pub routes: Vec<String>,

    /// Header name that exempts a response (default: `Partial`).
    #[serde(default)]
    pub header: Option<String>,

    /// Render-model key that exempts a response (default: `_disableValidator`).
    #[serde(default, alias = "model_value")]
    pub model_value: Option<String>,
}

impl ExceptionsConfig {
    /// Lowercased exemption header name; empty values fall back to the default.
    pub fn header_name(&self) -> String {
        self.header
            .as_deref()
            .filter(|h| !h.is_empty())
            .unwrap_or(DEFAULT_EXEMPTION_HEADER)
            .to_ascii_lowercase()
    }

    pub fn model_flag_key(&self) -> String {
        self.model_value
            .as_deref()
            .filter(|k| !k.is_empty())
            .unwrap_or(DEFAULT_MODEL_FLAG_KEY)
            .to_string()
    }
}

/// Options accepted by [`crate::validator::Validator::from_options`].
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ValidatorOptions {
    #[serde(default)]
    pub exceptions: ExceptionsConfig,

    /// Rule-engine configuration; empty or absent means "discover".
    #[serde(default, alias = "validator_config")]
    pub validator_config: Option<serde_json::Map<String, serde_json::Value>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(flatten)]
    pub options: ValidatorOptions,
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// ```toml
    /// [general]
    /// listen = "127.0.0.1:3000"
    /// upstream = "http://127.0.0.1:8080"
    ///
    /// [exceptions]
    /// routes = ["/partials/*"]
    /// header = "Partial"
    ///
    /// [validatorConfig]
    /// extends = ["html-validate:standard"]
    /// ```
    pub async fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let s = tokio::fs::read_to_string(path_ref).await?;
        let cfg: Self = toml::from_str(&s)
            .map_err(|e| anyhow::anyhow!("Invalid config {}: {}", path_ref.display(), e))?;
        Ok(cfg)
    }

    /// Directory holding the project's `.htmlValidate.json`.
    pub fn project_root(&self) -> anyhow::Result<PathBuf> {
        match &self.general.root {
            Some(root) => Ok(root.clone()),
            None => Ok(std::env::current_dir()?),
        }
    }
}
