use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;

use crate::error::{Result, UpdaterError};

/// Environment variable holding the GitHub API bearer token.
pub const TOKEN_ENV: &str = "GITHUB_TOKEN";

/// Default GitHub GraphQL endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://api.github.com/graphql";

const LOCAL_CONFIG: &str = "./swift-updater.toml";
const USER_CONFIG: &str = ".swift-updater.toml";

/// Represents the complete configuration for the updater.
///
/// Contains the upstream repository, build settings, version naming patterns and behavior options.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub upstream: UpstreamConfig,

    #[serde(default)]
    pub build: BuildConfig,

    #[serde(default)]
    pub patterns: PatternsConfig,

    #[serde(default)]
    pub behavior: BehaviorConfig,
}

fn default_owner() -> String {
    "apple".to_string()
}

fn default_name() -> String {
    "swift".to_string()
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

/// The remote repository whose tags are watched for new releases.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct UpstreamConfig {
    #[serde(default = "default_owner")]
    pub owner: String,

    #[serde(default = "default_name")]
    pub name: String,

    #[serde(default = "default_endpoint")]
    pub endpoint: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        UpstreamConfig {
            owner: default_owner(),
            name: default_name(),
            endpoint: default_endpoint(),
        }
    }
}

fn default_recipe() -> String {
    "Dockerfile".to_string()
}

fn default_image_tag() -> String {
    "updater".to_string()
}

/// Where the recipe lives in the working copy and how the image is tagged.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct BuildConfig {
    #[serde(default = "default_recipe")]
    pub recipe: String,

    #[serde(default = "default_image_tag")]
    pub image_tag: String,
}

impl Default for BuildConfig {
    fn default() -> Self {
        BuildConfig {
            recipe: default_recipe(),
            image_tag: default_image_tag(),
        }
    }
}

/// Development snapshot patterns, most specific first.
///
/// Capture group 1 is the prefix shared by related snapshots; every later group
/// contributes to the identifier.
fn default_prefix_patterns() -> Vec<String> {
    vec![
        r"^(swift-([.\d]+)-DEVELOPMENT-SNAPSHOT-)(.*)$".to_string(),
        r"^(swift-DEVELOPMENT-SNAPSHOT-)(.*)$".to_string(),
    ]
}

/// Release patterns. Group 1 is the version number, group 2 the suffix.
fn default_suffix_patterns() -> Vec<String> {
    vec![r"^swift-([.\d]+)(-RELEASE)$".to_string()]
}

/// Regular expressions recognizing the two version naming schemes.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct PatternsConfig {
    #[serde(default = "default_prefix_patterns")]
    pub prefix: Vec<String>,

    #[serde(default = "default_suffix_patterns")]
    pub suffix: Vec<String>,
}

impl Default for PatternsConfig {
    fn default() -> Self {
        PatternsConfig {
            prefix: default_prefix_patterns(),
            suffix: default_suffix_patterns(),
        }
    }
}

/// Configuration for behavior customization.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct BehaviorConfig {
    /// Echo every executed command and its standard output
    #[serde(default)]
    pub verbose: bool,
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `swift-updater.toml` in current directory
/// 3. `.swift-updater.toml` in user config directory
/// 4. Default configuration if no file found
pub fn load_config(config_path: Option<&str>) -> Result<Config> {
    let config_str = if let Some(path) = config_path {
        fs::read_to_string(path)?
    } else if Path::new(LOCAL_CONFIG).exists() {
        fs::read_to_string(LOCAL_CONFIG)?
    } else if let Some(config_dir) = dirs::config_dir() {
        let config_path = config_dir.join(USER_CONFIG);
        if config_path.exists() {
            fs::read_to_string(config_path)?
        } else {
            return Ok(Config::default());
        }
    } else {
        return Ok(Config::default());
    };

    toml::from_str(&config_str).map_err(|e| UpdaterError::config(e.to_string()))
}

/// Bearer credential for the GitHub API.
///
/// Read once at startup and handed to the client that needs it.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wrap an explicit token
    pub fn new(token: impl Into<String>) -> Self {
        Credential(token.into())
    }

    /// Read the token from [`TOKEN_ENV`]
    pub fn from_env() -> Result<Self> {
        Self::from_var(TOKEN_ENV)
    }

    /// Read the token from the named environment variable; absent or empty is an error
    pub fn from_var(name: &str) -> Result<Self> {
        match std::env::var(name) {
            Ok(token) if !token.trim().is_empty() => Ok(Credential(token)),
            _ => Err(UpdaterError::MissingCredential(name.to_string())),
        }
    }

    /// Value for the `Authorization` header
    pub fn authorization(&self) -> String {
        format!("bearer {}", self.0)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_default_upstream() {
        let config = Config::default();
        assert_eq!(config.upstream.owner, "apple");
        assert_eq!(config.upstream.name, "swift");
        assert_eq!(config.upstream.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.build.recipe, "Dockerfile");
        assert_eq!(config.build.image_tag, "updater");
        assert!(!config.behavior.verbose);
    }

    #[test]
    fn test_default_patterns_order() {
        let patterns = PatternsConfig::default();
        assert_eq!(patterns.prefix.len(), 2);
        assert!(patterns.prefix[0].contains(r"[.\d]+"));
        assert_eq!(patterns.suffix.len(), 1);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
[upstream]
owner = "swiftlang"

[behavior]
verbose = true
"#,
        )
        .unwrap();
        assert_eq!(config.upstream.owner, "swiftlang");
        assert_eq!(config.upstream.name, "swift");
        assert!(config.behavior.verbose);
        assert_eq!(config.patterns, PatternsConfig::default());
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = toml::from_str::<Config>("upstream = 3")
            .map_err(|e| UpdaterError::config(e.to_string()))
            .unwrap_err();
        assert!(matches!(err, UpdaterError::Config(_)));
    }

    #[test]
    #[serial]
    fn test_credential_from_var() {
        std::env::set_var("SWIFT_UPDATER_TEST_TOKEN", "secret");
        let credential = Credential::from_var("SWIFT_UPDATER_TEST_TOKEN").unwrap();
        assert_eq!(credential.authorization(), "bearer secret");
        std::env::remove_var("SWIFT_UPDATER_TEST_TOKEN");
    }

    #[test]
    #[serial]
    fn test_credential_missing() {
        std::env::remove_var("SWIFT_UPDATER_TEST_TOKEN");
        let err = Credential::from_var("SWIFT_UPDATER_TEST_TOKEN").unwrap_err();
        assert!(matches!(err, UpdaterError::MissingCredential(ref name) if name == "SWIFT_UPDATER_TEST_TOKEN"));
    }

    #[test]
    #[serial]
    fn test_credential_empty_is_missing() {
        std::env::set_var("SWIFT_UPDATER_TEST_TOKEN", "  ");
        assert!(Credential::from_var("SWIFT_UPDATER_TEST_TOKEN").is_err());
        std::env::remove_var("SWIFT_UPDATER_TEST_TOKEN");
    }

    #[test]
    fn test_credential_debug_is_redacted() {
        let credential = Credential::new("secret");
        assert!(!format!("{:?}", credential).contains("secret"));
    }
}
