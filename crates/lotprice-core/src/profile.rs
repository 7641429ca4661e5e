use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::pricing::{FeeSchedule, RoundingPolicy};
use crate::ConfigError;

const BUILTIN_PROFILE_YAML: &str = include_str!("../../../config/profiles/johnpye.yaml");

/// One way of locating the minimum bid on a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BidSourceConfig {
    /// CSS selector for the element holding the figure.
    pub selector: String,
    /// Amount pattern for this source. Falls back to the profile's
    /// `currency_pattern` when unset.
    #[serde(default)]
    pub pattern: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryRegionConfig {
    /// Selectors for the shipping table, most specific first.
    pub region: Vec<String>,
    #[serde(default = "default_row_selector")]
    pub row_selector: String,
    #[serde(default = "default_cell_selector")]
    pub cell_selector: String,
}

fn default_row_selector() -> String {
    "tr".to_string()
}

fn default_cell_selector() -> String {
    "td, th".to_string()
}

fn default_exclusion_keywords() -> Vec<String> {
    vec!["collection".to_string()]
}

/// Everything the extraction engine needs to know about one site layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteProfile {
    pub name: String,
    pub currency_pattern: String,
    pub delivery_keyword_pattern: String,
    /// Case-insensitive keywords marking a shipping row as a pickup option.
    #[serde(default = "default_exclusion_keywords")]
    pub exclusion_keywords: Vec<String>,
    pub min_bid: Vec<BidSourceConfig>,
    pub delivery: DeliveryRegionConfig,
    #[serde(default)]
    pub fees: FeeSchedule,
    #[serde(default)]
    pub rounding: RoundingPolicy,
}

/// Load and validate a site profile from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_profile(path: &Path) -> Result<SiteProfile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ProfileFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_profile(&content)
}

/// The embedded John Pye lot-details profile.
///
/// # Errors
///
/// Returns `ConfigError` only if the embedded YAML is broken, which the
/// crate's tests guard against.
pub fn builtin_profile() -> Result<SiteProfile, ConfigError> {
    parse_profile(BUILTIN_PROFILE_YAML)
}

fn parse_profile(content: &str) -> Result<SiteProfile, ConfigError> {
    let profile: SiteProfile = serde_yaml::from_str(content)?;
    validate_profile(&profile)?;
    Ok(profile)
}

fn validate_profile(profile: &SiteProfile) -> Result<(), ConfigError> {
    if profile.name.trim().is_empty() {
        return Err(ConfigError::Validation(
            "profile name must be non-empty".to_string(),
        ));
    }

    if profile.currency_pattern.trim().is_empty() {
        return Err(ConfigError::Validation(format!(
            "profile '{}' has an empty currency_pattern",
            profile.name
        )));
    }

    if profile.delivery_keyword_pattern.trim().is_empty() {
        return Err(ConfigError::Validation(format!(
            "profile '{}' has an empty delivery_keyword_pattern",
            profile.name
        )));
    }

    if profile.min_bid.is_empty() {
        return Err(ConfigError::Validation(format!(
            "profile '{}' must list at least one min_bid source",
            profile.name
        )));
    }

    if let Some(source) = profile
        .min_bid
        .iter()
        .find(|s| s.selector.trim().is_empty())
    {
        return Err(ConfigError::Validation(format!(
            "profile '{}' has a min_bid source with an empty selector (pattern: {:?})",
            profile.name, source.pattern
        )));
    }

    if profile.delivery.region.is_empty()
        || profile.delivery.region.iter().any(|s| s.trim().is_empty())
    {
        return Err(ConfigError::Validation(format!(
            "profile '{}' must list non-empty delivery region selectors",
            profile.name
        )));
    }

    if profile
        .exclusion_keywords
        .iter()
        .any(|k| k.trim().is_empty())
    {
        return Err(ConfigError::Validation(format!(
            "profile '{}' has an empty exclusion keyword",
            profile.name
        )));
    }

    Ok(())
}

#[cfg(test)]
#[path = "profile_test.rs"]
mod tests;
