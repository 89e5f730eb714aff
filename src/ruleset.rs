// SPDX-FileCopyrightText: 2025 Alexandre Gomes Gaigalas <alganet@gmail.com>
//
// SPDX-License-Identifier: ISC

//! Rule-engine configuration: presets, per-rule severities, and discovery of
//! the project configuration file.

use crate::lint::Severity;
use crate::rules::{Rule, RULES};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};

/// Name of the project-level rule-engine configuration file.
pub const CONFIG_FILE_NAME: &str = ".htmlValidate.json";

/// Preset used when neither the caller nor the project provides a config.
pub const DEFAULT_PRESET: &str = "html-validate:standard";

/// Rule-engine configuration as written in `.htmlValidate.json`.
///
/// Unknown top-level keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RulesetConfig {
    #[serde(default)]
    pub extends: Vec<String>,
    #[serde(default)]
    pub rules: BTreeMap<String, serde_json::Value>,
}

impl RulesetConfig {
    pub fn standard() -> Self {
        Self {
            extends: vec![DEFAULT_PRESET.to_string()],
            rules: BTreeMap::new(),
        }
    }
}

/// Pick the rule-engine configuration.
///
/// Order: a non-empty `explicit` object, then [`CONFIG_FILE_NAME`] under
/// `project_root`, then the standard preset. A present but malformed file is
/// an error.
pub fn resolve_ruleset_config(
    explicit: Option<&serde_json::Map<String, serde_json::Value>>,
    project_root: &Path,
) -> anyhow::Result<RulesetConfig> {
    if let Some(map) = explicit.filter(|m| !m.is_empty()) {
        debug!("using caller-supplied validator config");
        return Ok(serde_json::from_value(serde_json::Value::Object(
            map.clone(),
        ))?);
    }

    let path = project_root.join(CONFIG_FILE_NAME);
    if path.exists() {
        let s = std::fs::read_to_string(&path)?;
        let cfg: RulesetConfig = serde_json::from_str(&s)
            .map_err(|e| anyhow::anyhow!("Invalid {}: {}", path.display(), e))?;
        info!(path = %path.display(), "loaded validator config");
        return Ok(cfg);
    }

    debug!(preset = DEFAULT_PRESET, "no validator config found, using defaults");
    Ok(RulesetConfig::standard())
}

fn preset_rules(preset: &str) -> anyhow::Result<Vec<&'static str>> {
    match preset {
        "html-validate:standard" | "html-validate:recommended" => {
            Ok(RULES.iter().map(|r| r.id()).collect())
        }
        "html-validate:document" => Ok(vec![
            "parser-error",
            "missing-doctype",
            "element-required-content",
        ]),
        other => Err(anyhow::anyhow!(
            "Unknown preset '{}' in 'extends', must be one of: html-validate:standard, html-validate:recommended, html-validate:document",
            other
        )),
    }
}

/// Parse a rule severity: `"off" | "warn" | "error"`, `0 | 1 | 2`, or an
/// array whose first element is one of those. `None` means off.
fn parse_severity(rule: &str, value: &serde_json::Value) -> anyhow::Result<Option<Severity>> {
    use serde_json::Value;
    match value {
        Value::String(s) => match s.as_str() {
            "off" => Ok(None),
            "warn" => Ok(Some(Severity::Warn)),
            "error" => Ok(Some(Severity::Error)),
            _ => Err(anyhow::anyhow!(
                "Invalid severity for rule '{}': '{}' must be one of: off, warn, error",
                rule,
                s
            )),
        },
        Value::Number(n) => match n.as_u64() {
            Some(0) => Ok(None),
            Some(1) => Ok(Some(Severity::Warn)),
            Some(2) => Ok(Some(Severity::Error)),
            _ => Err(anyhow::anyhow!(
                "Invalid severity for rule '{}': {} must be one of: 0, 1, 2",
                rule,
                n
            )),
        },
        Value::Array(items) => match items.first() {
            Some(first) if !first.is_array() => parse_severity(rule, first),
            _ => Err(anyhow::anyhow!(
                "Invalid severity for rule '{}': array must start with a severity",
                rule
            )),
        },
        other => Err(anyhow::anyhow!(
            "Invalid severity for rule '{}': {}",
            rule,
            other
        )),
    }
}

/// Enabled rules with their severities, in registry order.
#[derive(Clone)]
pub struct Ruleset {
    enabled: Vec<(&'static dyn Rule, Severity)>,
}

impl std::fmt::Debug for Ruleset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(self.enabled.iter().map(|(r, s)| (r.id(), s)))
            .finish()
    }
}

impl Ruleset {
    pub fn from_config(config: &RulesetConfig) -> anyhow::Result<Self> {
        let mut levels: BTreeMap<&'static str, Option<Severity>> = BTreeMap::new();

        for preset in &config.extends {
            for id in preset_rules(preset)? {
                levels.insert(id, Some(Severity::Error));
            }
        }

        for (name, value) in &config.rules {
            let rule = crate::rules::find_rule(name)
                .ok_or_else(|| anyhow::anyhow!("Unknown rule '{}' in validator config", name))?;
            levels.insert(rule.id(), parse_severity(name, value)?);
        }

        let enabled = RULES
            .iter()
            .filter_map(|rule| match levels.get(rule.id()) {
                Some(Some(severity)) => Some((*rule, *severity)),
                _ => None,
            })
            .collect();

        Ok(Self { enabled })
    }

    pub fn enabled(&self) -> impl Iterator<Item = (&'static dyn Rule, Severity)> + '_ {
        self.enabled.iter().copied()
    }

    pub fn severity(&self, rule: &str) -> Option<Severity> {
        self.enabled
            .iter()
            .find(|(r, _)| r.id() == rule)
            .map(|(_, s)| *s)
    }
}
