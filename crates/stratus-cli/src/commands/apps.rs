//! App platform commands.

use std::io::Write;
use std::path::{Path, PathBuf};

use clap::Subcommand;
use serde_json::Value;
use stratus_api::ApiClient;

use super::confirm;
use crate::error::CliError;
use crate::output::{gs, list, lookup, Printer, Table};

/// App subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum AppsCommands {
    /// List apps.
    #[command(visible_alias = "ls")]
    List,

    /// Show one app.
    Get {
        /// App ID.
        app_id: i64,
    },

    /// Deploy an app from a YAML manifest.
    #[command(visible_aliases = ["new", "add"])]
    Create {
        /// Path to the deployment manifest.
        file: PathBuf,
    },

    /// Remove apps.
    #[command(visible_alias = "rm")]
    Remove {
        /// App IDs.
        #[arg(required = true)]
        app_ids: Vec<i64>,
        /// Do not ask for confirmation.
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// List app tariff presets.
    ListPresets,

    /// Manage VCS providers.
    Vcs {
        /// VCS subcommand to execute.
        #[command(subcommand)]
        command: VcsCommands,
    },
}

/// VCS provider subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum VcsCommands {
    /// List connected VCS providers.
    #[command(visible_alias = "ls")]
    List,

    /// List repositories available through a provider.
    Repositories {
        /// VCS provider ID.
        provider_id: String,
    },
}

/// App command executor.
pub struct AppsCommand<'a> {
    client: &'a ApiClient,
}

impl<'a> AppsCommand<'a> {
    /// Create a new app command.
    #[must_use]
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Execute an app subcommand.
    pub async fn execute<W: Write>(
        &self,
        writer: &mut W,
        printer: &Printer,
        command: &AppsCommands,
    ) -> Result<(), CliError> {
        match command {
            AppsCommands::List => {
                let response = self.client.get_apps().await?;
                printer.print(writer, &response, render_apps)?;
            }
            AppsCommands::Get { app_id } => {
                let response = self.client.get_app(*app_id).await?;
                printer.print(writer, &response, render_app)?;
            }
            AppsCommands::Create { file } => {
                let payload = read_manifest(file)?;
                let response = self.client.create_app(payload).await?;
                printer.print_id(writer, &response, "app.id")?;
            }
            AppsCommands::Remove { app_ids, yes } => {
                confirm(&format!("Remove app(s) {app_ids:?}?"), *yes)?;
                for app_id in app_ids {
                    self.client.delete_app(*app_id).await?;
                    writeln!(writer, "{app_id}")?;
                }
            }
            AppsCommands::ListPresets => {
                let response = self.client.get_apps_presets().await?;
                printer.print(writer, &response, render_presets)?;
            }
            AppsCommands::Vcs { command } => match command {
                VcsCommands::List => {
                    let response = self.client.get_vcs_providers().await?;
                    printer.print(writer, &response, render_providers)?;
                }
                VcsCommands::Repositories { provider_id } => {
                    let response = self.client.get_repositories(provider_id).await?;
                    printer.print(writer, &response, render_repositories)?;
                }
            },
        }
        Ok(())
    }
}

/// Read a YAML deployment manifest into a JSON payload.
fn read_manifest(path: &Path) -> Result<Value, CliError> {
    let text = std::fs::read_to_string(path)
        .map_err(|err| CliError::InvalidArgument(format!("cannot read {}: {err}", path.display())))?;
    serde_yaml::from_str(&text)
        .map_err(|err| CliError::InvalidArgument(format!("invalid manifest {}: {err}", path.display())))
}

const APP_HEADER: [&str; 5] = ["ID", "NAME", "STATUS", "TYPE", "IPV4"];

fn app_row(app: &Value, table: &mut Table) -> Result<(), CliError> {
    table.row([
        gs(app, "id")?,
        gs(app, "name").unwrap_or_default(),
        gs(app, "status").unwrap_or_default(),
        gs(app, "type").unwrap_or_default(),
        gs(app, "ip").unwrap_or_default(),
    ]);
    Ok(())
}

fn render_apps(value: &Value, table: &mut Table) -> Result<(), CliError> {
    table.header(APP_HEADER);
    for app in list(value, "apps")? {
        app_row(app, table)?;
    }
    Ok(())
}

fn render_app(value: &Value, table: &mut Table) -> Result<(), CliError> {
    table.header(APP_HEADER);
    let app = lookup(value, "app").ok_or_else(|| CliError::MissingField("app".into()))?;
    app_row(app, table)
}

fn render_presets(value: &Value, table: &mut Table) -> Result<(), CliError> {
    table.header(["ID", "TYPE", "CPU", "RAM", "DISK", "PRICE"]);
    for preset in list(value, "presets")? {
        table.row([
            gs(preset, "id")?,
            gs(preset, "type").unwrap_or_default(),
            gs(preset, "cpu").unwrap_or_default(),
            gs(preset, "ram").unwrap_or_default(),
            gs(preset, "disk").unwrap_or_default(),
            gs(preset, "price").unwrap_or_default(),
        ]);
    }
    Ok(())
}

fn render_providers(value: &Value, table: &mut Table) -> Result<(), CliError> {
    table.header(["LOGIN", "PROVIDER", "PROVIDER_ID"]);
    for provider in list(value, "providers")? {
        table.row([
            gs(provider, "login").unwrap_or_default(),
            gs(provider, "provider").unwrap_or_default(),
            gs(provider, "provider_id").unwrap_or_default(),
        ]);
    }
    Ok(())
}

fn render_repositories(value: &Value, table: &mut Table) -> Result<(), CliError> {
    table.header(["ID", "NAME", "URL"]);
    for repository in list(value, "repositories")? {
        table.row([
            gs(repository, "id")?,
            gs(repository, "name").unwrap_or_default(),
            gs(repository, "url").unwrap_or_default(),
        ]);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use serde_json::json;

    fn apps_command(cli: Cli) -> AppsCommands {
        match cli.command {
            Commands::Apps { command } => command,
            _ => panic!("expected apps command"),
        }
    }

    #[test]
    fn parses_vcs_repositories() {
        let cli = Cli::parse_from(["stratus", "apps", "vcs", "repositories", "gh-1"]);
        match apps_command(cli) {
            AppsCommands::Vcs {
                command: VcsCommands::Repositories { provider_id },
            } => assert_eq!(provider_id, "gh-1"),
            _ => panic!("expected vcs repositories"),
        }
    }

    #[test]
    fn manifest_yaml_becomes_json_payload() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        writeln!(file, "name: blog\ntype: backend\nenvs:\n  PORT: '8080'").expect("write");
        let payload = read_manifest(file.path()).expect("manifest");
        assert_eq!(payload["name"], "blog");
        assert_eq!(payload["envs"]["PORT"], "8080");
    }

    #[test]
    fn missing_manifest_is_an_argument_error() {
        let err = read_manifest(Path::new("/nonexistent/deploy.yaml")).unwrap_err();
        assert!(matches!(err, CliError::InvalidArgument(_)));
    }

    #[test]
    fn apps_table_shows_status() {
        let value = json!({
            "apps": [{
                "id": 7,
                "name": "blog",
                "status": "running",
                "type": "backend",
                "ip": "203.0.113.20",
            }]
        });
        let mut table = Table::new();
        render_apps(&value, &mut table).expect("render");
        let mut buf = Vec::new();
        table.write(&mut buf).expect("write");
        let output = String::from_utf8(buf).expect("utf8");
        assert!(output.contains("running"));
        assert!(output.contains("203.0.113.20"));
    }
}
