use crate::input::read_text;
use anyhow::Context;
use log::{debug, info};
use serde::Deserialize;
use spinsight_core::{ChannelEquivalence, CommunicationMatcher};
use spinsight_sim::SimConfig;
use std::{collections::BTreeMap, path::Path};

fn default_ordinal_templates() -> Vec<String> {
    SimConfig::default().ordinal_templates
}

/// Run configuration, read from a JSON file and completed by command-line flags.
///
/// ```json
/// {
///   "aliases": { "f": "2", "you": "4" },
///   "equivalences": [["4", "me"]],
///   "ordinal_templates": ["calc"]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct RunConfig {
    /// Channel names to replace before matching.
    #[serde(default)]
    pub(crate) aliases: BTreeMap<String, String>,
    /// Channel names known to be equivalent before matching.
    #[serde(default)]
    pub(crate) equivalences: Vec<(String, String)>,
    /// Proctypes whose instances are numbered.
    #[serde(default = "default_ordinal_templates")]
    pub(crate) ordinal_templates: Vec<String>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            aliases: BTreeMap::new(),
            equivalences: Vec::new(),
            ordinal_templates: default_ordinal_templates(),
        }
    }
}

impl RunConfig {
    /// Reads the configuration file at `path`.
    pub(crate) fn load(path: &Path) -> anyhow::Result<Self> {
        info!(target: "config", "reading configuration file '{}'", path.display());
        let text = read_text(path)?;
        serde_json::from_str(&text)
            .with_context(|| format!("failed to parse configuration in '{}'", path.display()))
    }

    /// Adds aliases and equivalences given as flags, overriding the file for repeated aliases.
    pub(crate) fn extend(
        &mut self,
        aliases: impl IntoIterator<Item = (String, String)>,
        equivalences: impl IntoIterator<Item = (String, String)>,
    ) {
        self.aliases.extend(aliases);
        self.equivalences.extend(equivalences);
        debug!(
            "{} channel aliases, {} seed equivalences",
            self.aliases.len(),
            self.equivalences.len()
        );
    }

    pub(crate) fn sim_config(&self) -> SimConfig {
        SimConfig {
            aliases: self.aliases.clone(),
            ordinal_templates: self.ordinal_templates.clone(),
        }
    }

    pub(crate) fn matcher(&self) -> CommunicationMatcher {
        CommunicationMatcher::with_equivalence(ChannelEquivalence::with_seeds(
            self.equivalences.iter().map(|(a, b)| (a, b)),
        ))
    }
}

/// Parses a `NAME=VALUE` command-line argument.
pub(crate) fn parse_pair(arg: &str) -> Result<(String, String), String> {
    let (name, value) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, found '{arg}'"))?;
    let (name, value) = (name.trim(), value.trim());
    if name.is_empty() || value.is_empty() {
        return Err(format!("expected NAME=VALUE, found '{arg}'"));
    }
    Ok((name.to_owned(), value.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config: RunConfig = serde_json::from_str("{}").expect("config");
        assert_eq!(config, RunConfig::default());
        assert_eq!(config.sim_config(), SimConfig::default());
    }

    #[test]
    fn full_config() {
        let config: RunConfig = serde_json::from_str(
            r#"{ "aliases": { "f": "2" }, "equivalences": [["4", "me"]], "ordinal_templates": ["calc", "user"] }"#,
        )
        .expect("config");
        assert_eq!(config.aliases["f"], "2");
        assert_eq!(config.equivalences, vec![("4".to_string(), "me".to_string())]);
        assert_eq!(config.ordinal_templates, vec!["calc", "user"]);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(serde_json::from_str::<RunConfig>(r#"{ "alias": {} }"#).is_err());
    }

    #[test]
    fn flags_override_file() {
        let mut config = RunConfig::default();
        config.aliases.insert("f".to_string(), "2".to_string());
        config.extend(
            [("f".to_string(), "3".to_string())],
            [("4".to_string(), "me".to_string())],
        );
        assert_eq!(config.aliases["f"], "3");
        assert_eq!(config.equivalences.len(), 1);
    }

    #[test]
    fn pairs() {
        assert_eq!(parse_pair("f=2"), Ok(("f".to_string(), "2".to_string())));
        assert!(parse_pair("f").is_err());
        assert!(parse_pair("=2").is_err());
    }
}
