//! Managed database commands.

use std::io::Write;

use clap::{Args, Subcommand};
use serde_json::Value;
use stratus_api::client::{AutoBackupSettings, CreateDatabase, UpdateDatabase};
use stratus_api::types::{BackupInterval, DatabaseEngine};
use stratus_api::ApiClient;

use super::{confirm, parse_key_value_params};
use crate::error::CliError;
use crate::output::{gs, list, lookup, Printer, Table};

/// Database subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum DatabaseCommands {
    /// List managed databases.
    #[command(visible_alias = "ls")]
    List {
        /// Maximum number of items to return.
        #[arg(long, default_value_t = 500)]
        limit: u32,
        /// Number of items to skip.
        #[arg(long, default_value_t = 0)]
        offset: u32,
    },

    /// Show one database.
    Get {
        /// Database ID.
        id: i64,
    },

    /// Create a managed database.
    #[command(visible_aliases = ["new", "add"])]
    Create {
        /// Database name.
        #[arg(long)]
        name: String,
        /// Database engine: mysql5, mysql8, postgres, redis or mongodb.
        #[arg(long = "type")]
        engine: DatabaseEngine,
        /// Preset ID; see `database list-presets`.
        #[arg(long)]
        preset_id: i64,
        /// Admin password.
        #[arg(long)]
        password: String,
        /// Admin login; engine default when omitted.
        #[arg(long)]
        login: Option<String>,
        /// Engine tunable as `KEY=VALUE`; may be given multiple times.
        #[arg(long = "param", value_name = "KEY=VALUE")]
        params: Vec<String>,
    },

    /// Update database properties.
    #[command(visible_aliases = ["edit", "update", "upd"])]
    Set {
        /// Database ID.
        id: i64,
        /// Database name.
        #[arg(long)]
        name: Option<String>,
        /// Admin password.
        #[arg(long)]
        password: Option<String>,
        /// Preset to resize to.
        #[arg(long)]
        preset_id: Option<i64>,
        /// Engine tunable as `KEY=VALUE`; may be given multiple times.
        #[arg(long = "param", value_name = "KEY=VALUE")]
        params: Vec<String>,
        /// Expose on a public IP (`true`/`false`).
        #[arg(long)]
        external_ip: Option<bool>,
    },

    /// Remove databases.
    #[command(visible_alias = "rm")]
    Remove {
        /// Database IDs.
        #[arg(required = true)]
        ids: Vec<i64>,
        /// Do not ask for confirmation.
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// List database presets.
    ListPresets,

    /// List available database engine versions.
    ListTypes,

    /// Manage database backups.
    Backup {
        /// Backup subcommand to execute.
        #[command(subcommand)]
        command: DatabaseBackupCommands,
    },
}

/// Database backup subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum DatabaseBackupCommands {
    /// List backups of a database.
    #[command(visible_alias = "ls")]
    List {
        /// Database ID.
        db_id: i64,
        /// Maximum number of items to return.
        #[arg(long, default_value_t = 500)]
        limit: u32,
        /// Number of items to skip.
        #[arg(long, default_value_t = 0)]
        offset: u32,
    },

    /// Create a backup.
    Create {
        /// Database ID.
        db_id: i64,
    },

    /// Remove a backup.
    #[command(visible_alias = "rm")]
    Remove {
        /// Database ID.
        db_id: i64,
        /// Backup ID.
        backup_id: i64,
        /// Do not ask for confirmation.
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Restore a database from a backup.
    Restore {
        /// Database ID.
        db_id: i64,
        /// Backup ID.
        backup_id: i64,
        /// Do not ask for confirmation.
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Show or change the auto-backup schedule.
    Schedule(DatabaseScheduleArgs),
}

/// Arguments for `database backup schedule`. Without change flags the
/// current settings are shown.
#[derive(Args, Debug, Clone)]
pub struct DatabaseScheduleArgs {
    /// Database ID.
    pub db_id: i64,

    /// Enable the schedule.
    #[arg(long, conflicts_with = "disable")]
    pub enable: bool,

    /// Disable the schedule.
    #[arg(long)]
    pub disable: bool,

    /// Number of retained copies.
    #[arg(long)]
    pub copy_count: Option<u32>,

    /// Day of month (1-31) to start on.
    #[arg(long)]
    pub start_day: Option<u32>,

    /// Backup interval: day, week or month.
    #[arg(long)]
    pub interval: Option<BackupInterval>,

    /// Day of week (1-7) for weekly schedules.
    #[arg(long)]
    pub day_of_week: Option<u32>,
}

impl DatabaseScheduleArgs {
    fn is_update(&self) -> bool {
        self.enable
            || self.disable
            || self.copy_count.is_some()
            || self.start_day.is_some()
            || self.interval.is_some()
            || self.day_of_week.is_some()
    }
}

/// Database command executor.
pub struct DatabaseCommand<'a> {
    client: &'a ApiClient,
}

impl<'a> DatabaseCommand<'a> {
    /// Create a new database command.
    #[must_use]
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Execute a database subcommand.
    pub async fn execute<W: Write>(
        &self,
        writer: &mut W,
        printer: &Printer,
        command: &DatabaseCommands,
    ) -> Result<(), CliError> {
        match command {
            DatabaseCommands::List { limit, offset } => {
                let response = self.client.get_databases(*limit, *offset).await?;
                printer.print(writer, &response, render_databases)?;
            }
            DatabaseCommands::Get { id } => {
                let response = self.client.get_database(*id).await?;
                printer.print(writer, &response, render_database)?;
            }
            DatabaseCommands::Create {
                name,
                engine,
                preset_id,
                password,
                login,
                params,
            } => {
                let config_parameters = if params.is_empty() {
                    None
                } else {
                    Some(Value::Object(parse_key_value_params(params)?))
                };
                let spec = CreateDatabase {
                    name,
                    engine: *engine,
                    preset_id: *preset_id,
                    password,
                    login: login.as_deref(),
                    config_parameters,
                };
                let response = self.client.create_database(&spec).await?;
                printer.print_id(writer, &response, "db.id")?;
            }
            DatabaseCommands::Set {
                id,
                name,
                password,
                preset_id,
                params,
                external_ip,
            } => {
                let config_parameters = if params.is_empty() {
                    None
                } else {
                    Some(Value::Object(parse_key_value_params(params)?))
                };
                let spec = UpdateDatabase {
                    name: name.as_deref(),
                    password: password.as_deref(),
                    preset_id: *preset_id,
                    config_parameters,
                    external_ip: *external_ip,
                };
                let response = self.client.update_database(*id, &spec).await?;
                printer.print_id(writer, &response, "db.id")?;
            }
            DatabaseCommands::Remove { ids, yes } => {
                confirm(&format!("Remove database(s) {ids:?}?"), *yes)?;
                for id in ids {
                    self.client.delete_database(*id).await?;
                    writeln!(writer, "{id}")?;
                }
            }
            DatabaseCommands::ListPresets => {
                let response = self.client.get_database_presets().await?;
                printer.print(writer, &response, render_presets)?;
            }
            DatabaseCommands::ListTypes => {
                let response = self.client.get_database_types().await?;
                printer.print(writer, &response, render_types)?;
            }
            DatabaseCommands::Backup { command } => {
                self.execute_backup(writer, printer, command).await?;
            }
        }
        Ok(())
    }

    async fn execute_backup<W: Write>(
        &self,
        writer: &mut W,
        printer: &Printer,
        command: &DatabaseBackupCommands,
    ) -> Result<(), CliError> {
        match command {
            DatabaseBackupCommands::List {
                db_id,
                limit,
                offset,
            } => {
                let response = self
                    .client
                    .get_database_backups(*db_id, *limit, *offset)
                    .await?;
                printer.print(writer, &response, render_backups)?;
            }
            DatabaseBackupCommands::Create { db_id } => {
                let response = self.client.create_database_backup(*db_id).await?;
                printer.print_id(writer, &response, "backup.id")?;
            }
            DatabaseBackupCommands::Remove {
                db_id,
                backup_id,
                yes,
            } => {
                confirm(&format!("Remove backup {backup_id}?"), *yes)?;
                self.client.delete_database_backup(*db_id, *backup_id).await?;
                writeln!(writer, "{backup_id}")?;
            }
            DatabaseBackupCommands::Restore {
                db_id,
                backup_id,
                yes,
            } => {
                confirm(
                    &format!("Restore database {db_id} from backup {backup_id}? Current data will be lost"),
                    *yes,
                )?;
                self.client.restore_database_backup(*db_id, *backup_id).await?;
                writeln!(writer, "{backup_id}")?;
            }
            DatabaseBackupCommands::Schedule(args) => {
                let response = if args.is_update() {
                    let settings = AutoBackupSettings {
                        is_enabled: if args.enable {
                            Some(true)
                        } else if args.disable {
                            Some(false)
                        } else {
                            None
                        },
                        copy_count: args.copy_count,
                        creation_start_at: args.start_day,
                        interval: args.interval,
                        day_of_week: args.day_of_week,
                    };
                    self.client
                        .update_database_autobackup_settings(args.db_id, &settings)
                        .await?
                } else {
                    self.client
                        .get_database_autobackup_settings(args.db_id)
                        .await?
                };
                printer.print(writer, &response, render_autobackup_settings)?;
            }
        }
        Ok(())
    }
}

const DATABASE_HEADER: [&str; 6] = ["ID", "NAME", "STATUS", "TYPE", "IPV4", "INTERNAL IP"];

fn database_row(db: &Value, table: &mut Table) -> Result<(), CliError> {
    table.row([
        gs(db, "id")?,
        gs(db, "name")?,
        gs(db, "status").unwrap_or_default(),
        gs(db, "type").unwrap_or_default(),
        gs(db, "ip").unwrap_or_default(),
        gs(db, "local_ip").unwrap_or_default(),
    ]);
    Ok(())
}

fn render_databases(value: &Value, table: &mut Table) -> Result<(), CliError> {
    table.header(DATABASE_HEADER);
    for db in list(value, "dbs")? {
        database_row(db, table)?;
    }
    Ok(())
}

fn render_database(value: &Value, table: &mut Table) -> Result<(), CliError> {
    table.header(DATABASE_HEADER);
    let db = lookup(value, "db").ok_or_else(|| CliError::MissingField("db".into()))?;
    database_row(db, table)
}

fn render_presets(value: &Value, table: &mut Table) -> Result<(), CliError> {
    table.header(["ID", "REGION", "PRICE", "CPU", "RAM (MB)", "DISK (MB)", "TYPE"]);
    for preset in list(value, "databases_presets")? {
        table.row([
            gs(preset, "id")?,
            gs(preset, "location").unwrap_or_default(),
            gs(preset, "price").unwrap_or_default(),
            gs(preset, "cpu").unwrap_or_default(),
            gs(preset, "ram").unwrap_or_default(),
            gs(preset, "disk").unwrap_or_default(),
            gs(preset, "type").unwrap_or_default(),
        ]);
    }
    Ok(())
}

fn render_types(value: &Value, table: &mut Table) -> Result<(), CliError> {
    table.header(["TYPE"]);
    for item in list(value, "types")? {
        match item {
            Value::String(s) => table.row([s.as_str()]),
            other => table.row([gs(other, "type")?]),
        }
    }
    Ok(())
}

fn render_backups(value: &Value, table: &mut Table) -> Result<(), CliError> {
    table.header(["ID", "NAME", "CREATED", "STATUS"]);
    for backup in list(value, "backups")? {
        table.row([
            gs(backup, "id")?,
            gs(backup, "name").unwrap_or_default(),
            gs(backup, "created_at").unwrap_or_default(),
            gs(backup, "status").unwrap_or_default(),
        ]);
    }
    Ok(())
}

fn render_autobackup_settings(value: &Value, table: &mut Table) -> Result<(), CliError> {
    let settings = lookup(value, "auto_backups_settings")
        .ok_or_else(|| CliError::MissingField("auto_backups_settings".into()))?;
    table.row(["Enabled", gs(settings, "is_enabled").unwrap_or_default().as_str()]);
    table.row(["Copies", gs(settings, "copy_count").unwrap_or_default().as_str()]);
    table.row(["Interval", gs(settings, "interval").unwrap_or_default().as_str()]);
    table.row(["Start day", gs(settings, "creation_start_at").unwrap_or_default().as_str()]);
    table.row(["Day of week", gs(settings, "day_of_week").unwrap_or_default().as_str()]);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use serde_json::json;

    fn database_command(cli: Cli) -> DatabaseCommands {
        match cli.command {
            Commands::Database { command } => command,
            _ => panic!("expected database command"),
        }
    }

    #[test]
    fn parses_create_with_params() {
        let cli = Cli::parse_from([
            "stratus",
            "database",
            "create",
            "--name",
            "pg-main",
            "--type",
            "postgres",
            "--preset-id",
            "5",
            "--password",
            "secret",
            "--param",
            "max_connections=100",
            "--param",
            "autovacuum=true",
        ]);
        match database_command(cli) {
            DatabaseCommands::Create { engine, params, .. } => {
                assert_eq!(engine, DatabaseEngine::Postgres);
                assert_eq!(params.len(), 2);
            }
            _ => panic!("expected create command"),
        }
    }

    #[test]
    fn db_alias_resolves() {
        let cli = Cli::parse_from(["stratus", "db", "list"]);
        assert!(matches!(
            database_command(cli),
            DatabaseCommands::List { .. }
        ));
    }

    #[test]
    fn parses_backup_schedule_update() {
        let cli = Cli::parse_from([
            "stratus", "database", "backup", "schedule", "9", "--enable", "--copy-count", "3",
        ]);
        let DatabaseCommands::Backup {
            command: DatabaseBackupCommands::Schedule(args),
        } = database_command(cli)
        else {
            panic!("expected schedule");
        };
        assert!(args.is_update());
        assert_eq!(args.copy_count, Some(3));
    }

    #[test]
    fn database_table_shows_both_ips() {
        let value = json!({
            "dbs": [{
                "id": 9,
                "name": "pg-main",
                "status": "started",
                "type": "postgres",
                "ip": "192.0.2.20",
                "local_ip": "10.0.0.5",
            }]
        });
        let mut table = Table::new();
        render_databases(&value, &mut table).expect("render");
        let mut buf = Vec::new();
        table.write(&mut buf).expect("write");
        let output = String::from_utf8(buf).expect("utf8");
        assert!(output.contains("192.0.2.20"));
        assert!(output.contains("10.0.0.5"));
    }

    #[test]
    fn types_render_accepts_strings_and_objects() {
        let value = json!({"types": ["mysql8", {"type": "postgres"}]});
        let mut table = Table::new();
        render_types(&value, &mut table).expect("render");
        let mut buf = Vec::new();
        table.write(&mut buf).expect("write");
        let output = String::from_utf8(buf).expect("utf8");
        assert!(output.contains("mysql8"));
        assert!(output.contains("postgres"));
    }
}
