//! Validation settings with hierarchical merge
//!
//! Settings are loaded from up to two layers, later layers overriding
//! scalar fields and extending the ignore lists:
//! 1. Global defaults (`<config_dir>/srvcfg/settings.toml`)
//! 2. Server settings (`<server_dir>/.srvcfg.toml`)
//!
//! ```toml
//! threshold = 80
//! report_overrides = false
//! ignore_attributes = ["httpEndpoint.legacyFlag", "*.xmlns"]
//! ignore_elements = ["customFeatureConfig"]
//! ```

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use srvcfg_fs::{ConfigStore, NormalizedPath};

use crate::{Error, Result};

/// Default fuzzy-match threshold, in percent.
pub const DEFAULT_THRESHOLD: u8 = 70;

const SETTINGS_FILE: &str = ".srvcfg.toml";
const GLOBAL_SETTINGS_FILE: &str = "settings.toml";
const GLOBAL_DIR_NAME: &str = "srvcfg";

/// Suppresses "unrecognized attribute" diagnostics for `element.attribute`.
///
/// Either side may be `*`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct IgnoreRule {
    pub element: String,
    pub attribute: String,
}

impl IgnoreRule {
    pub fn new(element: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self {
            element: element.into(),
            attribute: attribute.into(),
        }
    }

    pub fn matches(&self, element: &str, attribute: &str) -> bool {
        (self.element == "*" || self.element == element)
            && (self.attribute == "*" || self.attribute == attribute)
    }
}

impl FromStr for IgnoreRule {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidIgnoreRule {
            rule: s.to_string(),
        };
        let (element, attribute) = s.trim().split_once('.').ok_or_else(invalid)?;
        if element.is_empty() || attribute.is_empty() {
            return Err(invalid());
        }
        Ok(Self::new(element, attribute))
    }
}

impl fmt::Display for IgnoreRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.element, self.attribute)
    }
}

impl TryFrom<String> for IgnoreRule {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<IgnoreRule> for String {
    fn from(value: IgnoreRule) -> Self {
        value.to_string()
    }
}

/// User-tunable validation behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationSettings {
    /// Minimum similarity, in percent, for a quick-fix suggestion
    pub threshold: u8,

    /// Emit informational override diagnostics
    pub report_overrides: bool,

    /// Attributes never reported as unrecognized
    pub ignore_attributes: Vec<IgnoreRule>,

    /// Elements never reported as unrecognized or unavailable
    pub ignore_elements: Vec<String>,
}

impl Default for ValidationSettings {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            report_overrides: true,
            ignore_attributes: Vec::new(),
            ignore_elements: Vec::new(),
        }
    }
}

impl ValidationSettings {
    pub fn is_attribute_ignored(&self, element: &str, attribute: &str) -> bool {
        self.ignore_attributes
            .iter()
            .any(|rule| rule.matches(element, attribute))
    }

    pub fn is_element_ignored(&self, element: &str) -> bool {
        self.ignore_elements.iter().any(|e| e == element || e == "*")
    }

    /// Apply one layer on top of these settings.
    pub fn merge(&mut self, layer: SettingsLayer) {
        if let Some(threshold) = layer.threshold {
            self.threshold = threshold.min(100);
        }
        if let Some(report) = layer.report_overrides {
            self.report_overrides = report;
        }
        for rule in layer.ignore_attributes {
            if !self.ignore_attributes.contains(&rule) {
                self.ignore_attributes.push(rule);
            }
        }
        for element in layer.ignore_elements {
            if !self.ignore_elements.contains(&element) {
                self.ignore_elements.push(element);
            }
        }
    }
}

/// One settings file; absent fields leave lower layers untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SettingsLayer {
    pub threshold: Option<u8>,
    pub report_overrides: Option<bool>,
    pub ignore_attributes: Vec<IgnoreRule>,
    pub ignore_elements: Vec<String>,
}

/// Loads [`ValidationSettings`] for a server directory.
pub struct SettingsResolver {
    server_dir: NormalizedPath,

    /// Override for the global config directory (used for testing).
    global_config_dir_override: Option<PathBuf>,
}

impl SettingsResolver {
    pub fn new(server_dir: NormalizedPath) -> Self {
        Self {
            server_dir,
            global_config_dir_override: None,
        }
    }

    /// Create a resolver with a custom global config directory.
    pub fn with_global_config_dir(server_dir: NormalizedPath, global_config_dir: PathBuf) -> Self {
        Self {
            server_dir,
            global_config_dir_override: Some(global_config_dir),
        }
    }

    fn global_config_dir(&self) -> Option<PathBuf> {
        if let Some(ref override_dir) = self.global_config_dir_override {
            return Some(override_dir.clone());
        }
        dirs::config_dir().map(|d| d.join(GLOBAL_DIR_NAME))
    }

    /// Merge all layers. Missing layers are skipped; a malformed layer is
    /// an error.
    pub fn resolve(&self) -> Result<ValidationSettings> {
        let store = ConfigStore::new();
        let mut settings = ValidationSettings::default();

        // Layer 1 - global defaults
        if let Some(global_dir) = self.global_config_dir() {
            let path = NormalizedPath::new(global_dir.join(GLOBAL_SETTINGS_FILE));
            if let Some(layer) = store.load_optional::<SettingsLayer>(&path)? {
                tracing::debug!(%path, "Loaded global settings (layer 1)");
                settings.merge(layer);
            }
        }

        // Layer 2 - server settings
        let path = self.server_dir.join(SETTINGS_FILE);
        if let Some(layer) = store.load_optional::<SettingsLayer>(&path)? {
            tracing::debug!(%path, "Loaded server settings (layer 2)");
            settings.merge(layer);
        }

        Ok(settings)
    }
}
