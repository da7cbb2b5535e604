//! Project commands.

use std::io::Write;

use clap::Subcommand;
use serde_json::Value;
use stratus_api::types::ResourceType;
use stratus_api::ApiClient;

use super::confirm;
use crate::error::CliError;
use crate::output::{gs, list, lookup, Printer, Table};

/// Project subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum ProjectCommands {
    /// List projects.
    #[command(visible_alias = "ls")]
    List,

    /// Show one project.
    Get {
        /// Project ID.
        id: i64,
    },

    /// Create a project.
    #[command(visible_aliases = ["new", "add"])]
    Create {
        /// Project name.
        #[arg(long)]
        name: String,
        /// Project description.
        #[arg(long)]
        desc: Option<String>,
        /// Avatar ID.
        #[arg(long)]
        avatar_id: Option<String>,
    },

    /// Update project properties.
    #[command(visible_aliases = ["edit", "update", "upd"])]
    Set {
        /// Project ID.
        id: i64,
        /// Project name.
        #[arg(long)]
        name: Option<String>,
        /// Project description.
        #[arg(long)]
        desc: Option<String>,
        /// Avatar ID.
        #[arg(long)]
        avatar_id: Option<String>,
    },

    /// Remove projects. Their resources move to the default project.
    #[command(visible_alias = "rm")]
    Remove {
        /// Project IDs.
        #[arg(required = true)]
        ids: Vec<i64>,
        /// Do not ask for confirmation.
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// List resources in a project.
    Resources {
        /// Project ID.
        id: i64,
    },

    /// Move a resource between projects.
    Move {
        /// Source project ID.
        #[arg(long)]
        from: i64,
        /// Destination project ID.
        #[arg(long)]
        to: i64,
        /// Resource type, e.g. `server`, `database`, `balancer`.
        #[arg(long = "type")]
        resource_type: ResourceType,
        /// Resource ID.
        #[arg(long = "id")]
        resource_id: i64,
    },
}

/// Project command executor.
pub struct ProjectCommand<'a> {
    client: &'a ApiClient,
}

impl<'a> ProjectCommand<'a> {
    /// Create a new project command.
    #[must_use]
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Execute a project subcommand.
    pub async fn execute<W: Write>(
        &self,
        writer: &mut W,
        printer: &Printer,
        command: &ProjectCommands,
    ) -> Result<(), CliError> {
        match command {
            ProjectCommands::List => {
                let response = self.client.get_projects().await?;
                printer.print(writer, &response, render_projects)?;
            }
            ProjectCommands::Get { id } => {
                let response = self.client.get_project(*id).await?;
                printer.print(writer, &response, render_project)?;
            }
            ProjectCommands::Create {
                name,
                desc,
                avatar_id,
            } => {
                let response = self
                    .client
                    .create_project(name, desc.as_deref(), avatar_id.as_deref())
                    .await?;
                printer.print_id(writer, &response, "project.id")?;
            }
            ProjectCommands::Set {
                id,
                name,
                desc,
                avatar_id,
            } => {
                let response = self
                    .client
                    .update_project(*id, name.as_deref(), desc.as_deref(), avatar_id.as_deref())
                    .await?;
                printer.print_id(writer, &response, "project.id")?;
            }
            ProjectCommands::Remove { ids, yes } => {
                confirm(&format!("Remove project(s) {ids:?}?"), *yes)?;
                for id in ids {
                    self.client.delete_project(*id).await?;
                    writeln!(writer, "{id}")?;
                }
            }
            ProjectCommands::Resources { id } => {
                let response = self.client.get_project_resources(*id).await?;
                printer.print(writer, &response, render_resources)?;
            }
            ProjectCommands::Move {
                from,
                to,
                resource_type,
                resource_id,
            } => {
                let response = self
                    .client
                    .move_resource_to_project(*from, *to, *resource_id, *resource_type)
                    .await?;
                if let Ok(value) = response.json() {
                    if lookup(&value, "resource.id").is_some() {
                        printer.print_id(writer, &response, "resource.id")?;
                        return Ok(());
                    }
                }
                writeln!(writer, "{resource_id}")?;
            }
        }
        Ok(())
    }
}

const PROJECT_HEADER: [&str; 4] = ["ID", "NAME", "DEFAULT", "DESCRIPTION"];

fn project_row(project: &Value, table: &mut Table) -> Result<(), CliError> {
    table.row([
        gs(project, "id")?,
        gs(project, "name")?,
        gs(project, "is_default").unwrap_or_default(),
        gs(project, "description").unwrap_or_default(),
    ]);
    Ok(())
}

fn render_projects(value: &Value, table: &mut Table) -> Result<(), CliError> {
    table.header(PROJECT_HEADER);
    for project in list(value, "projects")? {
        project_row(project, table)?;
    }
    Ok(())
}

fn render_project(value: &Value, table: &mut Table) -> Result<(), CliError> {
    table.header(PROJECT_HEADER);
    let project =
        lookup(value, "project").ok_or_else(|| CliError::MissingField("project".into()))?;
    project_row(project, table)
}

/// The resources response groups items by type, one top-level array per
/// resource kind. Flatten them into one table with a TYPE column.
fn render_resources(value: &Value, table: &mut Table) -> Result<(), CliError> {
    table.header(["ID", "NAME", "REGION", "TYPE"]);
    let Value::Object(map) = value else {
        return Err(CliError::MissingField("resources".into()));
    };
    for (kind, entry) in map {
        let Value::Array(items) = entry else { continue };
        for item in items {
            table.row([
                gs(item, "id")?,
                gs(item, "name").unwrap_or_default(),
                gs(item, "location").unwrap_or_default(),
                kind.clone(),
            ]);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use serde_json::json;

    fn project_command(cli: Cli) -> ProjectCommands {
        match cli.command {
            Commands::Project { command } => command,
            _ => panic!("expected project command"),
        }
    }

    #[test]
    fn parses_move_with_resource_type() {
        let cli = Cli::parse_from([
            "stratus", "project", "move", "--from", "1", "--to", "2", "--type", "server", "--id",
            "42",
        ]);
        match project_command(cli) {
            ProjectCommands::Move {
                from,
                to,
                resource_type,
                resource_id,
            } => {
                assert_eq!((from, to, resource_id), (1, 2, 42));
                assert_eq!(resource_type, ResourceType::Server);
            }
            _ => panic!("expected move command"),
        }
    }

    #[test]
    fn move_rejects_unknown_resource_type() {
        let result = Cli::try_parse_from([
            "stratus", "project", "move", "--from", "1", "--to", "2", "--type", "teapot", "--id",
            "42",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn resources_table_flattens_groups() {
        let value = json!({
            "servers": [{"id": 1, "name": "web", "location": "us-1"}],
            "databases": [{"id": 9, "name": "pg", "location": "eu-1"}],
        });
        let mut table = Table::new();
        render_resources(&value, &mut table).expect("render");
        let mut buf = Vec::new();
        table.write(&mut buf).expect("write");
        let output = String::from_utf8(buf).expect("utf8");
        assert!(output.contains("servers"));
        assert!(output.contains("databases"));
        assert!(output.contains("web"));
    }
}
