//! Profile configuration file.
//!
//! A TOML file where each top-level table is a named profile holding an API
//! token plus optional per-profile defaults:
//!
//! ```toml
//! [default]
//! token = "..."
//! region = "us-1"
//!
//! [staging]
//! token = "..."
//! output = "json"
//! ```
//!
//! The default path is `~/.stratusrc`, falling back to `~/.stratusrc.toml`
//! when only that exists.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use stratus_api::types::{AvailabilityZone, Region};

use crate::error::CliError;
use crate::output::Format;

/// The profile used when `--profile` is not given.
pub const DEFAULT_PROFILE: &str = "default";

const CONFIG_FILE_NAME: &str = ".stratusrc";

/// One named profile.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Profile {
    /// API token.
    pub token: Option<String>,
    /// Default region for resources created with this profile.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// Default availability zone.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone: Option<String>,
    /// Default output format (`default|raw|json|yaml`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

impl Profile {
    /// Parse the profile's region, if set.
    pub fn region(&self) -> Result<Option<Region>, CliError> {
        self.region
            .as_deref()
            .map(|s| Region::from_str(s).map_err(|e| CliError::Config(e.to_string())))
            .transpose()
    }

    /// Parse the profile's availability zone, if set.
    pub fn zone(&self) -> Result<Option<AvailabilityZone>, CliError> {
        self.zone
            .as_deref()
            .map(|s| AvailabilityZone::from_str(s).map_err(|e| CliError::Config(e.to_string())))
            .transpose()
    }

    /// Parse the profile's output format, if set.
    pub fn output(&self) -> Result<Option<Format>, CliError> {
        self.output.as_deref().map(Format::from_str).transpose()
    }
}

/// The loaded configuration file.
#[derive(Debug, Clone)]
pub struct Config {
    path: PathBuf,
    profiles: BTreeMap<String, Profile>,
}

impl Config {
    /// Load and validate a configuration file.
    pub fn load(path: &Path) -> Result<Self, CliError> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            CliError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        let profiles: BTreeMap<String, Profile> = toml::from_str(&text).map_err(|e| {
            CliError::Config(format!("cannot parse {}: {e}", path.display()))
        })?;
        let config = Self {
            path: path.to_path_buf(),
            profiles,
        };
        // Surface bad region/zone/output values at load time, with the
        // allowed values in the message.
        for profile in config.profiles.values() {
            profile.region()?;
            profile.zone()?;
            profile.output()?;
        }
        Ok(config)
    }

    /// Path the config was loaded from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Look up a profile by name.
    pub fn profile(&self, name: &str) -> Result<&Profile, CliError> {
        self.profiles.get(name).ok_or_else(|| {
            CliError::Config(format!(
                "no such profile '{}' in {}",
                name,
                self.path.display()
            ))
        })
    }

    /// All profiles with tokens masked, for `config dump`.
    #[must_use]
    pub fn masked(&self) -> BTreeMap<String, Profile> {
        self.profiles
            .iter()
            .map(|(name, profile)| {
                let mut masked = profile.clone();
                masked.token = masked.token.map(|t| mask_token(&t));
                (name.clone(), masked)
            })
            .collect()
    }
}

/// Mask a token for display, keeping the last four characters.
fn mask_token(token: &str) -> String {
    if token.len() <= 4 {
        "*".repeat(token.len())
    } else {
        format!("{}{}", "*".repeat(token.len() - 4), &token[token.len() - 4..])
    }
}

/// Resolve the config file path: the explicit path when given, otherwise
/// `~/.stratusrc`, falling back to `~/.stratusrc.toml` when only the
/// latter exists.
pub fn config_path(explicit: Option<&Path>) -> Result<PathBuf, CliError> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    let home = dirs::home_dir()
        .ok_or_else(|| CliError::Config("cannot locate home directory".into()))?;
    let primary = home.join(CONFIG_FILE_NAME);
    if primary.exists() {
        return Ok(primary);
    }
    let fallback = home.join(format!("{CONFIG_FILE_NAME}.toml"));
    if fallback.exists() {
        return Ok(fallback);
    }
    Ok(primary)
}

/// Write a fresh config file with one profile. Refuses to overwrite.
pub fn init_file(path: &Path, profile_name: &str, token: &str) -> Result<(), CliError> {
    if path.exists() {
        return Err(CliError::Config(format!(
            "{} already exists, refusing to overwrite",
            path.display()
        )));
    }
    let mut profiles = BTreeMap::new();
    profiles.insert(
        profile_name.to_string(),
        Profile {
            token: Some(token.to_string()),
            ..Profile::default()
        },
    );
    let text = toml::to_string_pretty(&profiles)
        .map_err(|e| CliError::Config(format!("cannot serialize config: {e}")))?;
    std::fs::write(path, text)
        .map_err(|e| CliError::Config(format!("cannot write {}: {e}", path.display())))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).expect("write config");
        path
    }

    #[test]
    fn loads_profiles() {
        let dir = TempDir::new().expect("tempdir");
        let path = write_config(
            &dir,
            ".stratusrc",
            r#"
[default]
token = "tok-default"
region = "us-1"

[staging]
token = "tok-staging"
output = "json"
"#,
        );

        let config = Config::load(&path).expect("load");
        let default = config.profile("default").expect("profile");
        assert_eq!(default.token.as_deref(), Some("tok-default"));
        assert_eq!(default.region().expect("region"), Some(Region::Us1));

        let staging = config.profile("staging").expect("profile");
        assert_eq!(staging.output().expect("output"), Some(Format::Json));
    }

    #[test]
    fn unknown_profile_is_an_error() {
        let dir = TempDir::new().expect("tempdir");
        let path = write_config(&dir, ".stratusrc", "[default]\ntoken = \"t\"\n");
        let config = Config::load(&path).expect("load");
        let err = config.profile("prod").unwrap_err();
        assert!(err.to_string().contains("no such profile 'prod'"));
    }

    #[test]
    fn invalid_region_aborts_load_with_allowed_values() {
        let dir = TempDir::new().expect("tempdir");
        let path = write_config(
            &dir,
            ".stratusrc",
            "[default]\ntoken = \"t\"\nregion = \"mars-1\"\n",
        );
        let err = Config::load(&path).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("invalid region"));
        assert!(msg.contains("us-1"));
    }

    #[test]
    fn invalid_toml_is_a_config_error() {
        let dir = TempDir::new().expect("tempdir");
        let path = write_config(&dir, ".stratusrc", "not [valid toml");
        assert!(matches!(Config::load(&path), Err(CliError::Config(_))));
    }

    #[test]
    fn masked_dump_hides_tokens() {
        let dir = TempDir::new().expect("tempdir");
        let path = write_config(&dir, ".stratusrc", "[default]\ntoken = \"secret-token-1234\"\n");
        let config = Config::load(&path).expect("load");
        let masked = config.masked();
        let token = masked["default"].token.as_deref().expect("token");
        assert!(token.ends_with("1234"));
        assert!(!token.contains("secret"));
        assert!(token.starts_with('*'));
    }

    #[test]
    fn mask_short_tokens_entirely() {
        assert_eq!(mask_token("abc"), "***");
        assert_eq!(mask_token("abcdefgh"), "****efgh");
    }

    #[test]
    fn explicit_path_wins() {
        let path = config_path(Some(Path::new("/tmp/custom.toml"))).expect("path");
        assert_eq!(path, Path::new("/tmp/custom.toml"));
    }

    #[test]
    fn init_refuses_to_overwrite() {
        let dir = TempDir::new().expect("tempdir");
        let path = write_config(&dir, ".stratusrc", "[default]\ntoken = \"t\"\n");
        let err = init_file(&path, DEFAULT_PROFILE, "new-token").unwrap_err();
        assert!(err.to_string().contains("refusing to overwrite"));
    }

    #[test]
    fn init_writes_readable_config() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join(".stratusrc");
        init_file(&path, DEFAULT_PROFILE, "my-token").expect("init");

        let config = Config::load(&path).expect("load");
        let profile = config.profile(DEFAULT_PROFILE).expect("profile");
        assert_eq!(profile.token.as_deref(), Some("my-token"));
    }
}
