//! Configuration file commands. These run without an API client.

use std::io::Write;
use std::path::PathBuf;

use clap::Subcommand;

use crate::config::{self, Config};
use crate::error::CliError;
use crate::output::Format;

/// Config subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommands {
    /// Create a config file with the active profile.
    Init {
        /// API token; prompted for when omitted.
        #[arg(long)]
        token: Option<String>,
    },

    /// Print the config file path.
    File,

    /// Print the config with tokens masked.
    Dump,
}

/// Config command executor.
pub struct ConfigCommand {
    path: PathBuf,
    profile_name: String,
}

impl ConfigCommand {
    /// Create a new config command bound to a file path and profile name.
    #[must_use]
    pub fn new(path: PathBuf, profile_name: String) -> Self {
        Self { path, profile_name }
    }

    /// Execute a config subcommand.
    pub fn execute<W: Write>(
        &self,
        writer: &mut W,
        format: Format,
        command: &ConfigCommands,
    ) -> Result<(), CliError> {
        match command {
            ConfigCommands::Init { token } => {
                let token = match token {
                    Some(token) => token.clone(),
                    None => prompt_token()?,
                };
                config::init_file(&self.path, &self.profile_name, &token)?;
                writeln!(writer, "{}", self.path.display())?;
            }
            ConfigCommands::File => {
                writeln!(writer, "{}", self.path.display())?;
            }
            ConfigCommands::Dump => {
                let config = Config::load(&self.path)?;
                let masked = config.masked();
                let text = match format {
                    Format::Json => serde_json::to_string_pretty(&masked)
                        .map_err(|e| CliError::Config(e.to_string()))?,
                    Format::Yaml => serde_yaml::to_string(&masked)
                        .map_err(|e| CliError::Config(e.to_string()))?,
                    Format::Default | Format::Raw => toml::to_string_pretty(&masked)
                        .map_err(|e| CliError::Config(e.to_string()))?,
                };
                writeln!(writer, "{}", text.trim_end())?;
            }
        }
        Ok(())
    }
}

fn prompt_token() -> Result<String, CliError> {
    eprint!("API token: ");
    let mut line = String::new();
    std::io::stdin()
        .read_line(&mut line)
        .map_err(|e| CliError::Config(format!("cannot read token: {e}")))?;
    let token = line.trim();
    if token.is_empty() {
        return Err(CliError::Config("empty token".into()));
    }
    Ok(token.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn init_writes_file_and_prints_path() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join(".stratusrc");
        let command = ConfigCommand::new(path.clone(), "default".into());
        let mut buf = Vec::new();
        command
            .execute(
                &mut buf,
                Format::Default,
                &ConfigCommands::Init {
                    token: Some("tok-1234".into()),
                },
            )
            .expect("init");
        assert!(path.exists());
        let output = String::from_utf8(buf).expect("utf8");
        assert!(output.contains(".stratusrc"));
    }

    #[test]
    fn dump_masks_tokens() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join(".stratusrc");
        std::fs::write(&path, "[default]\ntoken = \"secret-token-1234\"\n").expect("write");
        let command = ConfigCommand::new(path, "default".into());
        let mut buf = Vec::new();
        command
            .execute(&mut buf, Format::Default, &ConfigCommands::Dump)
            .expect("dump");
        let output = String::from_utf8(buf).expect("utf8");
        assert!(output.contains("1234"));
        assert!(!output.contains("secret-token"));
    }

    #[test]
    fn dump_as_json() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join(".stratusrc");
        std::fs::write(&path, "[default]\ntoken = \"secret-token-1234\"\n").expect("write");
        let command = ConfigCommand::new(path, "default".into());
        let mut buf = Vec::new();
        command
            .execute(&mut buf, Format::Json, &ConfigCommands::Dump)
            .expect("dump");
        let parsed: serde_json::Value =
            serde_json::from_slice(&buf).expect("json");
        assert!(parsed["default"]["token"].is_string());
    }

    #[test]
    fn file_prints_path() {
        let command = ConfigCommand::new(PathBuf::from("/home/u/.stratusrc"), "default".into());
        let mut buf = Vec::new();
        command
            .execute(&mut buf, Format::Default, &ConfigCommands::File)
            .expect("file");
        assert_eq!(
            String::from_utf8(buf).expect("utf8").trim(),
            "/home/u/.stratusrc"
        );
    }
}
