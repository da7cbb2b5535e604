//! Object storage commands.
//!
//! Bucket verbs follow s3 tool conventions (`mb`/`rb`), plus the `user`
//! and `subdomain` subgroups.

use std::io::Write;

use clap::Subcommand;
use serde_json::Value;
use stratus_api::ApiClient;

use super::confirm;
use crate::error::CliError;
use crate::output::{gs, list, lookup, Printer, Table};

/// Storage subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum StorageCommands {
    /// List buckets.
    #[command(visible_alias = "ls")]
    List,

    /// Make a bucket.
    Mb {
        /// Bucket name.
        name: String,
        /// Preset ID; see `storage list-presets`.
        #[arg(long)]
        preset_id: i64,
        /// Make the bucket publicly readable.
        #[arg(long)]
        public: bool,
    },

    /// Remove buckets.
    Rb {
        /// Bucket IDs.
        #[arg(required = true)]
        ids: Vec<i64>,
        /// Do not ask for confirmation.
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Update bucket preset or access policy.
    #[command(visible_aliases = ["edit", "update", "upd"])]
    Set {
        /// Bucket ID.
        id: i64,
        /// Preset to resize to.
        #[arg(long)]
        preset_id: Option<i64>,
        /// Make the bucket publicly readable.
        #[arg(long, conflicts_with = "private")]
        public: bool,
        /// Make the bucket private.
        #[arg(long)]
        private: bool,
    },

    /// List storage presets.
    ListPresets,

    /// Show the file transfer status for a bucket.
    TransferStatus {
        /// Bucket ID.
        id: i64,
    },

    /// Manage storage users.
    User {
        /// User subcommand to execute.
        #[command(subcommand)]
        command: StorageUserCommands,
    },

    /// Manage bucket subdomains.
    Subdomain {
        /// Subdomain subcommand to execute.
        #[command(subcommand)]
        command: StorageSubdomainCommands,
    },
}

/// Storage user subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum StorageUserCommands {
    /// List storage users.
    #[command(visible_alias = "ls")]
    List,

    /// Reset a user's secret key.
    SetSecret {
        /// Storage user ID.
        user_id: i64,
        /// New secret key.
        #[arg(long)]
        secret: String,
    },
}

/// Bucket subdomain subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum StorageSubdomainCommands {
    /// List subdomains attached to a bucket.
    #[command(visible_alias = "ls")]
    List {
        /// Bucket ID.
        bucket_id: i64,
    },

    /// Attach subdomains to a bucket.
    Add {
        /// Bucket ID.
        bucket_id: i64,
        /// Subdomain FQDNs.
        #[arg(required = true)]
        subdomains: Vec<String>,
    },

    /// Detach subdomains from a bucket.
    #[command(visible_alias = "rm")]
    Remove {
        /// Bucket ID.
        bucket_id: i64,
        /// Subdomain FQDNs.
        #[arg(required = true)]
        subdomains: Vec<String>,
        /// Do not ask for confirmation.
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Issue a TLS certificate for a subdomain.
    GenCert {
        /// Subdomain FQDN.
        subdomain: String,
    },
}

/// Storage command executor.
pub struct StorageCommand<'a> {
    client: &'a ApiClient,
}

impl<'a> StorageCommand<'a> {
    /// Create a new storage command.
    #[must_use]
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Execute a storage subcommand.
    pub async fn execute<W: Write>(
        &self,
        writer: &mut W,
        printer: &Printer,
        command: &StorageCommands,
    ) -> Result<(), CliError> {
        match command {
            StorageCommands::List => {
                let response = self.client.get_buckets().await?;
                printer.print(writer, &response, render_buckets)?;
            }
            StorageCommands::Mb {
                name,
                preset_id,
                public,
            } => {
                let response = self.client.create_bucket(name, *preset_id, *public).await?;
                printer.print_id(writer, &response, "bucket.id")?;
            }
            StorageCommands::Rb { ids, yes } => {
                confirm(&format!("Remove bucket(s) {ids:?}?"), *yes)?;
                for id in ids {
                    self.client.delete_bucket(*id).await?;
                    writeln!(writer, "{id}")?;
                }
            }
            StorageCommands::Set {
                id,
                preset_id,
                public,
                private,
            } => {
                let access = if *public {
                    Some(true)
                } else if *private {
                    Some(false)
                } else {
                    None
                };
                let response = self.client.update_bucket(*id, *preset_id, access).await?;
                printer.print_id(writer, &response, "bucket.id")?;
            }
            StorageCommands::ListPresets => {
                let response = self.client.get_storage_presets().await?;
                printer.print(writer, &response, render_presets)?;
            }
            StorageCommands::TransferStatus { id } => {
                let response = self.client.get_storage_transfer_status(*id).await?;
                printer.print(writer, &response, render_transfer_status)?;
            }
            StorageCommands::User { command } => {
                self.execute_user(writer, printer, command).await?;
            }
            StorageCommands::Subdomain { command } => {
                self.execute_subdomain(writer, printer, command).await?;
            }
        }
        Ok(())
    }

    async fn execute_user<W: Write>(
        &self,
        writer: &mut W,
        printer: &Printer,
        command: &StorageUserCommands,
    ) -> Result<(), CliError> {
        match command {
            StorageUserCommands::List => {
                let response = self.client.get_storage_users().await?;
                printer.print(writer, &response, render_users)?;
            }
            StorageUserCommands::SetSecret { user_id, secret } => {
                let response = self
                    .client
                    .update_storage_user_secret(*user_id, secret)
                    .await?;
                printer.print_id(writer, &response, "user.id")?;
            }
        }
        Ok(())
    }

    async fn execute_subdomain<W: Write>(
        &self,
        writer: &mut W,
        printer: &Printer,
        command: &StorageSubdomainCommands,
    ) -> Result<(), CliError> {
        match command {
            StorageSubdomainCommands::List { bucket_id } => {
                let response = self.client.get_bucket_subdomains(*bucket_id).await?;
                printer.print(writer, &response, render_subdomains)?;
            }
            StorageSubdomainCommands::Add {
                bucket_id,
                subdomains,
            } => {
                self.client.add_bucket_subdomains(*bucket_id, subdomains).await?;
                for subdomain in subdomains {
                    writeln!(writer, "{subdomain}")?;
                }
            }
            StorageSubdomainCommands::Remove {
                bucket_id,
                subdomains,
                yes,
            } => {
                confirm(&format!("Remove subdomain(s) {subdomains:?}?"), *yes)?;
                self.client
                    .delete_bucket_subdomains(*bucket_id, subdomains)
                    .await?;
                for subdomain in subdomains {
                    writeln!(writer, "{subdomain}")?;
                }
            }
            StorageSubdomainCommands::GenCert { subdomain } => {
                let response = self.client.gen_cert_for_bucket_subdomain(subdomain).await?;
                printer.print(writer, &response, render_gen_cert)?;
            }
        }
        Ok(())
    }
}

fn render_buckets(value: &Value, table: &mut Table) -> Result<(), CliError> {
    table.header(["ID", "NAME", "REGION", "STATUS", "TYPE"]);
    for bucket in list(value, "buckets")? {
        table.row([
            gs(bucket, "id")?,
            gs(bucket, "name")?,
            gs(bucket, "location").unwrap_or_default(),
            gs(bucket, "status").unwrap_or_default(),
            gs(bucket, "type").unwrap_or_default(),
        ]);
    }
    Ok(())
}

fn render_presets(value: &Value, table: &mut Table) -> Result<(), CliError> {
    table.header(["ID", "REGION", "PRICE", "DISK (MB)"]);
    for preset in list(value, "storages_presets")? {
        table.row([
            gs(preset, "id")?,
            gs(preset, "location").unwrap_or_default(),
            gs(preset, "price").unwrap_or_default(),
            gs(preset, "disk").unwrap_or_default(),
        ]);
    }
    Ok(())
}

fn render_users(value: &Value, table: &mut Table) -> Result<(), CliError> {
    table.header(["ID", "ACCESS KEY"]);
    for user in list(value, "users")? {
        table.row([gs(user, "id")?, gs(user, "access_key").unwrap_or_default()]);
    }
    Ok(())
}

fn render_subdomains(value: &Value, table: &mut Table) -> Result<(), CliError> {
    table.header(["ID", "SUBDOMAIN", "CERT RELEASED", "STATUS"]);
    for subdomain in list(value, "subdomains")? {
        table.row([
            gs(subdomain, "id")?,
            gs(subdomain, "subdomain").unwrap_or_default(),
            gs(subdomain, "cert_released").unwrap_or_default(),
            gs(subdomain, "status").unwrap_or_default(),
        ]);
    }
    Ok(())
}

fn render_transfer_status(value: &Value, table: &mut Table) -> Result<(), CliError> {
    let status = lookup(value, "file_transfer_status")
        .ok_or_else(|| CliError::MissingField("file_transfer_status".into()))?;
    table.row(["Started", gs(status, "is_started").unwrap_or_default().as_str()]);
    table.row(["Transferred", gs(status, "files_transfered").unwrap_or_default().as_str()]);
    table.row(["Total", gs(status, "files_total").unwrap_or_default().as_str()]);
    Ok(())
}

fn render_gen_cert(value: &Value, table: &mut Table) -> Result<(), CliError> {
    table.header(["SUBDOMAIN", "STATUS"]);
    for subdomain in list(value, "subdomains")? {
        table.row([
            gs(subdomain, "subdomain")?,
            gs(subdomain, "status").unwrap_or_default(),
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

    fn storage_command(cli: Cli) -> StorageCommands {
        match cli.command {
            Commands::Storage { command } => command,
            _ => panic!("expected storage command"),
        }
    }

    #[test]
    fn parses_mb_with_s3_alias() {
        let cli = Cli::parse_from([
            "stratus", "s3", "mb", "assets", "--preset-id", "3", "--public",
        ]);
        match storage_command(cli) {
            StorageCommands::Mb {
                name,
                preset_id,
                public,
            } => {
                assert_eq!(name, "assets");
                assert_eq!(preset_id, 3);
                assert!(public);
            }
            _ => panic!("expected mb command"),
        }
    }

    #[test]
    fn set_rejects_public_and_private_together() {
        let result = Cli::try_parse_from([
            "stratus", "storage", "set", "1", "--public", "--private",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn parses_subdomain_add() {
        let cli = Cli::parse_from([
            "stratus",
            "storage",
            "subdomain",
            "add",
            "7",
            "cdn.example.com",
            "img.example.com",
        ]);
        match storage_command(cli) {
            StorageCommands::Subdomain {
                command:
                    StorageSubdomainCommands::Add {
                        bucket_id,
                        subdomains,
                    },
            } => {
                assert_eq!(bucket_id, 7);
                assert_eq!(subdomains, vec!["cdn.example.com", "img.example.com"]);
            }
            _ => panic!("expected subdomain add"),
        }
    }

    #[test]
    fn bucket_table_renders_access_type() {
        let value = json!({
            "buckets": [{
                "id": 7,
                "name": "assets",
                "location": "us-1",
                "status": "created",
                "type": "public",
            }]
        });
        let mut table = Table::new();
        render_buckets(&value, &mut table).expect("render");
        let mut buf = Vec::new();
        table.write(&mut buf).expect("write");
        assert!(String::from_utf8(buf).expect("utf8").contains("public"));
    }
}
