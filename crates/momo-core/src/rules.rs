//! # Validation Rules
//!
//! Country/operator specific settings used by the request validator.
//! Loaded once at startup, either from a TOML file or from the
//! built-in defaults (Benin: `229` + 8 digits, Moov and MTN).
//!
//! ```toml
//! phone_prefix = "229"
//! phone_digits = 8
//! providers = ["Moov", "MTN"]
//! ```

use crate::error::{SimulatorError, SimulatorResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Rules applied to every payment request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationRules {
    /// Digits every phone number must start with
    #[serde(default = "default_phone_prefix")]
    pub phone_prefix: String,

    /// Number of digits required after the prefix
    #[serde(default = "default_phone_digits")]
    pub phone_digits: usize,

    /// Accepted provider names (case-sensitive)
    #[serde(default = "default_providers")]
    pub providers: Vec<String>,
}

fn default_phone_prefix() -> String {
    "229".to_string()
}

fn default_phone_digits() -> usize {
    8
}

fn default_providers() -> Vec<String> {
    vec!["Moov".to_string(), "MTN".to_string()]
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self {
            phone_prefix: default_phone_prefix(),
            phone_digits: default_phone_digits(),
            providers: default_providers(),
        }
    }
}

impl ValidationRules {
    /// Parse and check rules from TOML text
    pub fn from_toml_str(content: &str) -> SimulatorResult<Self> {
        let rules: ValidationRules = toml::from_str(content)
            .map_err(|e| SimulatorError::Configuration(format!("invalid rules: {}", e)))?;
        rules.check()?;
        Ok(rules)
    }

    /// Load rules from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> SimulatorResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            SimulatorError::Configuration(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Reject rule sets that could never accept a request
    pub fn check(&self) -> SimulatorResult<()> {
        if !self.phone_prefix.chars().all(|c| c.is_ascii_digit()) {
            return Err(SimulatorError::Configuration(
                "phone_prefix must contain digits only".to_string(),
            ));
        }
        if self.phone_digits == 0 {
            return Err(SimulatorError::Configuration(
                "phone_digits must be greater than 0".to_string(),
            ));
        }
        if self.providers.is_empty() || self.providers.iter().any(|p| p.trim().is_empty()) {
            return Err(SimulatorError::Configuration(
                "providers must list at least one non-empty name".to_string(),
            ));
        }
        Ok(())
    }

    /// Check a (trimmed) phone number against prefix and length
    pub fn phone_matches(&self, phone: &str) -> bool {
        match phone.strip_prefix(self.phone_prefix.as_str()) {
            Some(rest) => rest.len() == self.phone_digits && rest.bytes().all(|b| b.is_ascii_digit()),
            None => false,
        }
    }

    /// Check a provider name against the allow-list
    pub fn provider_allowed(&self, provider: &str) -> bool {
        self.providers.iter().any(|p| p == provider)
    }

    pub fn phone_message(&self) -> String {
        format!(
            "Phone number must start with {} followed by {} digits.",
            self.phone_prefix, self.phone_digits
        )
    }

    pub fn provider_message(&self) -> String {
        let names = match self.providers.split_last() {
            Some((last, [])) => last.clone(),
            Some((last, rest)) => format!("{} or {}", rest.join(", "), last),
            None => String::new(),
        };
        format!("Invalid provider ({}).", names)
    }
}
