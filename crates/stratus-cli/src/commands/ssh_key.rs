//! SSH key commands.

use std::io::Write;
use std::path::{Path, PathBuf};

use clap::Subcommand;
use serde_json::Value;
use stratus_api::ApiClient;

use super::confirm;
use crate::error::CliError;
use crate::output::{gs, list, lookup, Printer, Table};

/// SSH key subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum SshKeyCommands {
    /// List SSH keys.
    #[command(visible_alias = "ls")]
    List,

    /// Show one SSH key.
    Get {
        /// SSH key ID.
        id: i64,
    },

    /// Upload a public key file.
    #[command(visible_aliases = ["add", "create", "upload"])]
    New {
        /// Public key file, e.g. `~/.ssh/id_ed25519.pub`.
        file: PathBuf,
        /// Key name; the file name when omitted.
        #[arg(long)]
        name: Option<String>,
        /// Add this key to every new server.
        #[arg(long)]
        default: bool,
    },

    /// Change key name, body or default flag.
    #[command(visible_aliases = ["set", "update", "upd"])]
    Edit {
        /// SSH key ID.
        id: i64,
        /// Key name.
        #[arg(long)]
        name: Option<String>,
        /// Replace the key body from a public key file.
        #[arg(long, value_name = "FILE")]
        file: Option<PathBuf>,
        /// Add this key to every new server.
        #[arg(long)]
        default: bool,
    },

    /// Copy SSH keys to a running server.
    Copy {
        /// Target server ID.
        server_id: i64,
        /// SSH key IDs to copy.
        #[arg(required = true)]
        ssh_key_ids: Vec<i64>,
    },

    /// Remove SSH keys, or detach one key from one server.
    #[command(visible_alias = "rm")]
    Remove {
        /// SSH key IDs.
        #[arg(required = true)]
        ids: Vec<i64>,
        /// Only remove the key from this server, keep the key itself.
        #[arg(long, value_name = "SERVER_ID")]
        from_server: Option<i64>,
        /// Do not ask for confirmation.
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

/// SSH key command executor.
pub struct SshKeyCommand<'a> {
    client: &'a ApiClient,
}

impl<'a> SshKeyCommand<'a> {
    /// Create a new SSH key command.
    #[must_use]
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Execute an SSH key subcommand.
    pub async fn execute<W: Write>(
        &self,
        writer: &mut W,
        printer: &Printer,
        command: &SshKeyCommands,
    ) -> Result<(), CliError> {
        match command {
            SshKeyCommands::List => {
                let response = self.client.get_ssh_keys().await?;
                printer.print(writer, &response, render_keys)?;
            }
            SshKeyCommands::Get { id } => {
                let response = self.client.get_ssh_key(*id).await?;
                printer.print(writer, &response, render_key)?;
            }
            SshKeyCommands::New {
                file,
                name,
                default,
            } => {
                let body = read_public_key(file)?;
                let name = match name {
                    Some(name) => name.clone(),
                    None => file
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .ok_or_else(|| {
                            CliError::InvalidArgument(format!(
                                "cannot derive a key name from {}",
                                file.display()
                            ))
                        })?,
                };
                let response = self.client.add_ssh_key(&name, &body, *default).await?;
                printer.print_id(writer, &response, "ssh_key.id")?;
            }
            SshKeyCommands::Edit {
                id,
                name,
                file,
                default,
            } => {
                let body = file.as_ref().map(|f| read_public_key(f)).transpose()?;
                let response = self
                    .client
                    .update_ssh_key(
                        *id,
                        name.as_deref(),
                        body.as_deref(),
                        default.then_some(true),
                    )
                    .await?;
                printer.print_id(writer, &response, "ssh_key.id")?;
            }
            SshKeyCommands::Copy {
                server_id,
                ssh_key_ids,
            } => {
                self.client
                    .add_ssh_keys_to_server(*server_id, ssh_key_ids)
                    .await?;
                for id in ssh_key_ids {
                    writeln!(writer, "{id}")?;
                }
            }
            SshKeyCommands::Remove {
                ids,
                from_server,
                yes,
            } => {
                if let Some(server_id) = from_server {
                    confirm(
                        &format!("Remove SSH key(s) {ids:?} from server {server_id}?"),
                        *yes,
                    )?;
                    for id in ids {
                        self.client.delete_ssh_key_from_server(*server_id, *id).await?;
                        writeln!(writer, "{id}")?;
                    }
                } else {
                    confirm(&format!("Remove SSH key(s) {ids:?}?"), *yes)?;
                    for id in ids {
                        self.client.delete_ssh_key(*id).await?;
                        writeln!(writer, "{id}")?;
                    }
                }
            }
        }
        Ok(())
    }
}

fn read_public_key(path: &Path) -> Result<String, CliError> {
    let body = std::fs::read_to_string(path)
        .map_err(|e| CliError::InvalidArgument(format!("cannot read {}: {e}", path.display())))?;
    Ok(body.trim().to_string())
}

const KEY_HEADER: [&str; 4] = ["ID", "NAME", "DEFAULT", "SERVERS"];

fn key_row(key: &Value, table: &mut Table) -> Result<(), CliError> {
    let servers = lookup(key, "used_by")
        .and_then(Value::as_array)
        .map(Vec::len)
        .unwrap_or(0);
    table.row([
        gs(key, "id")?,
        gs(key, "name")?,
        gs(key, "is_default").unwrap_or_default(),
        servers.to_string(),
    ]);
    Ok(())
}

fn render_keys(value: &Value, table: &mut Table) -> Result<(), CliError> {
    table.header(KEY_HEADER);
    for key in list(value, "ssh_keys")? {
        key_row(key, table)?;
    }
    Ok(())
}

fn render_key(value: &Value, table: &mut Table) -> Result<(), CliError> {
    table.header(KEY_HEADER);
    let key = lookup(value, "ssh_key").ok_or_else(|| CliError::MissingField("ssh_key".into()))?;
    key_row(key, table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use serde_json::json;

    fn ssh_key_command(cli: Cli) -> SshKeyCommands {
        match cli.command {
            Commands::SshKey { command } => command,
            _ => panic!("expected ssh-key command"),
        }
    }

    #[test]
    fn parses_new_with_file() {
        let cli = Cli::parse_from(["stratus", "ssh-key", "new", "id_ed25519.pub", "--default"]);
        match ssh_key_command(cli) {
            SshKeyCommands::New {
                file,
                name,
                default,
            } => {
                assert_eq!(file, PathBuf::from("id_ed25519.pub"));
                assert!(name.is_none());
                assert!(default);
            }
            _ => panic!("expected new command"),
        }
    }

    #[test]
    fn parses_remove_from_server() {
        let cli = Cli::parse_from([
            "stratus",
            "ssh-key",
            "remove",
            "7",
            "--from-server",
            "42",
            "-y",
        ]);
        assert!(matches!(
            ssh_key_command(cli),
            SshKeyCommands::Remove {
                from_server: Some(42),
                yes: true,
                ..
            }
        ));
    }

    #[test]
    fn reads_and_trims_public_key() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        writeln!(file, "ssh-ed25519 AAAAC3Nza... user@host").expect("write");
        let body = read_public_key(file.path()).expect("read");
        assert_eq!(body, "ssh-ed25519 AAAAC3Nza... user@host");
    }

    #[test]
    fn key_table_counts_servers() {
        let value = json!({
            "ssh_keys": [{
                "id": 7,
                "name": "laptop",
                "is_default": true,
                "used_by": [{"id": 1}, {"id": 2}],
            }]
        });
        let mut table = Table::new();
        render_keys(&value, &mut table).expect("render");
        let mut buf = Vec::new();
        table.write(&mut buf).expect("write");
        let output = String::from_utf8(buf).expect("utf8");
        assert!(output.contains("laptop"));
        assert!(output.contains('2'));
    }
}
