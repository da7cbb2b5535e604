//! Floating IP commands.

use std::io::Write;

use clap::Subcommand;
use serde_json::Value;
use stratus_api::types::{AvailabilityZone, ResourceType};
use stratus_api::ApiClient;

use super::confirm;
use crate::error::CliError;
use crate::output::{gs, list, lookup, Printer, Table};

/// Floating IP subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum IpCommands {
    /// List floating IPs.
    #[command(visible_alias = "ls")]
    List,

    /// Show one floating IP.
    Get {
        /// Floating IP ID.
        id: String,
    },

    /// Allocate a floating IP.
    #[command(visible_aliases = ["new", "add"])]
    Create {
        /// Availability zone to allocate the address in.
        #[arg(long)]
        zone: AvailabilityZone,
        /// Enable DDoS protection.
        #[arg(long)]
        ddos_guard: bool,
    },

    /// Update floating IP comment or reverse DNS.
    #[command(visible_aliases = ["edit", "update", "upd"])]
    Set {
        /// Floating IP ID.
        id: String,
        /// Comment.
        #[arg(long)]
        comment: Option<String>,
        /// Reverse DNS pointer.
        #[arg(long)]
        ptr: Option<String>,
    },

    /// Release floating IPs.
    #[command(visible_alias = "rm")]
    Remove {
        /// Floating IP IDs.
        #[arg(required = true)]
        ids: Vec<String>,
        /// Do not ask for confirmation.
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Attach a floating IP to a resource.
    Attach {
        /// Floating IP ID.
        id: String,
        /// Resource type, e.g. `server`, `balancer`, `database`.
        #[arg(long = "type")]
        resource_type: ResourceType,
        /// Resource ID.
        #[arg(long = "id", value_name = "RESOURCE_ID")]
        resource_id: i64,
    },

    /// Detach a floating IP from its resource.
    Detach {
        /// Floating IP ID.
        id: String,
    },
}

/// Floating IP command executor.
pub struct IpCommand<'a> {
    client: &'a ApiClient,
}

impl<'a> IpCommand<'a> {
    /// Create a new floating IP command.
    #[must_use]
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Execute a floating IP subcommand.
    pub async fn execute<W: Write>(
        &self,
        writer: &mut W,
        printer: &Printer,
        command: &IpCommands,
    ) -> Result<(), CliError> {
        match command {
            IpCommands::List => {
                let response = self.client.get_floating_ips().await?;
                printer.print(writer, &response, render_ips)?;
            }
            IpCommands::Get { id } => {
                let response = self.client.get_floating_ip(id).await?;
                printer.print(writer, &response, render_ip)?;
            }
            IpCommands::Create { zone, ddos_guard } => {
                let response = self.client.create_floating_ip(*zone, *ddos_guard).await?;
                printer.print_id(writer, &response, "ip.id")?;
            }
            IpCommands::Set { id, comment, ptr } => {
                let response = self
                    .client
                    .update_floating_ip(id, comment.as_deref(), ptr.as_deref())
                    .await?;
                printer.print_id(writer, &response, "ip.id")?;
            }
            IpCommands::Remove { ids, yes } => {
                confirm(&format!("Release floating IP(s) {ids:?}?"), *yes)?;
                for id in ids {
                    self.client.delete_floating_ip(id).await?;
                    writeln!(writer, "{id}")?;
                }
            }
            IpCommands::Attach {
                id,
                resource_type,
                resource_id,
            } => {
                self.client
                    .attach_floating_ip(id, *resource_type, *resource_id)
                    .await?;
                writeln!(writer, "{id}")?;
            }
            IpCommands::Detach { id } => {
                self.client.detach_floating_ip(id).await?;
                writeln!(writer, "{id}")?;
            }
        }
        Ok(())
    }
}

const IP_HEADER: [&str; 5] = ["IP", "PTR", "ZONE", "ANTI_DDOS", "USED_ON"];

/// Resource a floating IP is bound to, as `type/id`.
fn used_on(ip: &Value) -> String {
    let Some(resource) = lookup(ip, "resource") else {
        return String::new();
    };
    let kind = gs(resource, "type").unwrap_or_default();
    let id = gs(resource, "id").unwrap_or_default();
    if kind.is_empty() && id.is_empty() {
        return String::new();
    }
    format!("{kind}/{id}")
}

fn ip_row(ip: &Value, table: &mut Table) -> Result<(), CliError> {
    table.row([
        gs(ip, "ip")?,
        gs(ip, "ptr").unwrap_or_default(),
        gs(ip, "availability_zone").unwrap_or_default(),
        gs(ip, "is_ddos_guard").unwrap_or_default(),
        used_on(ip),
    ]);
    Ok(())
}

fn render_ips(value: &Value, table: &mut Table) -> Result<(), CliError> {
    table.header(IP_HEADER);
    for ip in list(value, "ips")? {
        ip_row(ip, table)?;
    }
    Ok(())
}

fn render_ip(value: &Value, table: &mut Table) -> Result<(), CliError> {
    table.header(IP_HEADER);
    let ip = lookup(value, "ip").ok_or_else(|| CliError::MissingField("ip".into()))?;
    ip_row(ip, table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use serde_json::json;

    fn ip_command(cli: Cli) -> IpCommands {
        match cli.command {
            Commands::Ip { command } => command,
            _ => panic!("expected ip command"),
        }
    }

    #[test]
    fn parses_create_with_zone() {
        let cli = Cli::parse_from(["stratus", "ip", "create", "--zone", "fra-1", "--ddos-guard"]);
        match ip_command(cli) {
            IpCommands::Create { zone, ddos_guard } => {
                assert_eq!(zone, AvailabilityZone::Fra1);
                assert!(ddos_guard);
            }
            _ => panic!("expected create command"),
        }
    }

    #[test]
    fn parses_attach_to_server() {
        let cli = Cli::parse_from([
            "stratus", "ip", "attach", "ip-1", "--type", "server", "--id", "42",
        ]);
        match ip_command(cli) {
            IpCommands::Attach {
                id,
                resource_type,
                resource_id,
            } => {
                assert_eq!(id, "ip-1");
                assert_eq!(resource_type, ResourceType::Server);
                assert_eq!(resource_id, 42);
            }
            _ => panic!("expected attach command"),
        }
    }

    #[test]
    fn ip_table_shows_bound_resource() {
        let value = json!({
            "ips": [{
                "ip": "203.0.113.10",
                "ptr": "mail.example.com",
                "availability_zone": "fra-1",
                "is_ddos_guard": false,
                "resource": { "type": "server", "id": 42 },
            }]
        });
        let mut table = Table::new();
        render_ips(&value, &mut table).expect("render");
        let mut buf = Vec::new();
        table.write(&mut buf).expect("write");
        let output = String::from_utf8(buf).expect("utf8");
        assert!(output.contains("203.0.113.10"));
        assert!(output.contains("server/42"));
    }

    #[test]
    fn unbound_ip_has_empty_used_on() {
        let ip = json!({ "ip": "203.0.113.10" });
        assert_eq!(used_on(&ip), "");
    }
}
