//! Firewall commands: groups, rules and resource links.

use std::io::Write;

use clap::Subcommand;
use serde_json::Value;
use stratus_api::client::FirewallRule;
use stratus_api::types::{FirewallDirection, FirewallProto, ResourceType};
use stratus_api::ApiClient;

use super::confirm;
use crate::error::CliError;
use crate::output::{gs, list, lookup, Printer, Table};

/// Firewall subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum FirewallCommands {
    /// Manage firewall groups.
    Group {
        /// Group subcommand to execute.
        #[command(subcommand)]
        command: GroupCommands,
    },

    /// Manage firewall rules.
    Rule {
        /// Rule subcommand to execute.
        #[command(subcommand)]
        command: RuleCommands,
    },

    /// Link a resource to a firewall group.
    Link {
        /// Firewall group ID.
        group_id: String,
        /// Resource type, e.g. `server`, `database`, `balancer`.
        #[arg(long = "type")]
        resource_type: ResourceType,
        /// Resource ID.
        #[arg(long = "id")]
        resource_id: i64,
    },

    /// Unlink a resource from a firewall group.
    Unlink {
        /// Firewall group ID.
        group_id: String,
        /// Resource type, e.g. `server`, `database`, `balancer`.
        #[arg(long = "type")]
        resource_type: ResourceType,
        /// Resource ID.
        #[arg(long = "id")]
        resource_id: i64,
    },

    /// List firewall groups a resource is linked to.
    GroupsForResource {
        /// Resource type, e.g. `server`, `database`, `balancer`.
        #[arg(long = "type")]
        resource_type: ResourceType,
        /// Resource ID.
        #[arg(long = "id")]
        resource_id: i64,
    },
}

/// Firewall group subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum GroupCommands {
    /// List firewall groups.
    #[command(visible_alias = "ls")]
    List {
        /// Maximum number of items to return.
        #[arg(long, default_value_t = 500)]
        limit: u32,
        /// Number of items to skip.
        #[arg(long, default_value_t = 0)]
        offset: u32,
    },

    /// Show one firewall group.
    Get {
        /// Firewall group ID.
        group_id: String,
    },

    /// Create a firewall group.
    #[command(visible_aliases = ["new", "add"])]
    Create {
        /// Group name.
        #[arg(long)]
        name: String,
        /// Group description.
        #[arg(long)]
        desc: Option<String>,
    },

    /// Update a firewall group.
    #[command(visible_aliases = ["edit", "update", "upd"])]
    Set {
        /// Firewall group ID.
        group_id: String,
        /// Group name.
        #[arg(long)]
        name: Option<String>,
        /// Group description.
        #[arg(long)]
        desc: Option<String>,
    },

    /// Remove firewall groups.
    #[command(visible_alias = "rm")]
    Remove {
        /// Firewall group IDs.
        #[arg(required = true)]
        group_ids: Vec<String>,
        /// Do not ask for confirmation.
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// List resources linked to a firewall group.
    Resources {
        /// Firewall group ID.
        group_id: String,
    },
}

/// Firewall rule subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum RuleCommands {
    /// List rules in a firewall group.
    #[command(visible_alias = "ls")]
    List {
        /// Firewall group ID.
        group_id: String,
        /// Maximum number of items to return.
        #[arg(long, default_value_t = 500)]
        limit: u32,
        /// Number of items to skip.
        #[arg(long, default_value_t = 0)]
        offset: u32,
    },

    /// Show one rule.
    Get {
        /// Firewall group ID.
        group_id: String,
        /// Rule ID.
        rule_id: String,
    },

    /// Create a rule.
    #[command(visible_aliases = ["new", "add"])]
    Create {
        /// Firewall group ID.
        group_id: String,
        /// Traffic direction: ingress or egress.
        #[arg(long, default_value = "ingress")]
        direction: FirewallDirection,
        /// Protocol: tcp, udp or icmp.
        #[arg(long)]
        proto: FirewallProto,
        /// Port or port range, e.g. `80` or `3000-4000`; not for ICMP.
        #[arg(long)]
        port: Option<String>,
        /// Source/destination network in CIDR notation.
        #[arg(long, default_value = "0.0.0.0/0")]
        cidr: String,
        /// Rule description.
        #[arg(long)]
        desc: Option<String>,
    },

    /// Replace a rule.
    #[command(visible_aliases = ["edit", "update", "upd"])]
    Set {
        /// Firewall group ID.
        group_id: String,
        /// Rule ID.
        rule_id: String,
        /// Traffic direction: ingress or egress.
        #[arg(long, default_value = "ingress")]
        direction: FirewallDirection,
        /// Protocol: tcp, udp or icmp.
        #[arg(long)]
        proto: FirewallProto,
        /// Port or port range, e.g. `80` or `3000-4000`; not for ICMP.
        #[arg(long)]
        port: Option<String>,
        /// Source/destination network in CIDR notation.
        #[arg(long, default_value = "0.0.0.0/0")]
        cidr: String,
        /// Rule description.
        #[arg(long)]
        desc: Option<String>,
    },

    /// Remove rules.
    #[command(visible_alias = "rm")]
    Remove {
        /// Firewall group ID.
        group_id: String,
        /// Rule IDs.
        #[arg(required = true)]
        rule_ids: Vec<String>,
        /// Do not ask for confirmation.
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

/// Firewall command executor.
pub struct FirewallCommand<'a> {
    client: &'a ApiClient,
}

impl<'a> FirewallCommand<'a> {
    /// Create a new firewall command.
    #[must_use]
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Execute a firewall subcommand.
    pub async fn execute<W: Write>(
        &self,
        writer: &mut W,
        printer: &Printer,
        command: &FirewallCommands,
    ) -> Result<(), CliError> {
        match command {
            FirewallCommands::Group { command } => {
                self.execute_group(writer, printer, command).await?;
            }
            FirewallCommands::Rule { command } => {
                self.execute_rule(writer, printer, command).await?;
            }
            FirewallCommands::Link {
                group_id,
                resource_type,
                resource_id,
            } => {
                self.client
                    .link_resource_to_firewall(group_id, *resource_id, *resource_type)
                    .await?;
                writeln!(writer, "{resource_id}")?;
            }
            FirewallCommands::Unlink {
                group_id,
                resource_type,
                resource_id,
            } => {
                self.client
                    .unlink_resource_from_firewall(group_id, *resource_id, *resource_type)
                    .await?;
                writeln!(writer, "{resource_id}")?;
            }
            FirewallCommands::GroupsForResource {
                resource_type,
                resource_id,
            } => {
                let response = self
                    .client
                    .get_resource_firewall_groups(*resource_type, *resource_id)
                    .await?;
                printer.print(writer, &response, render_groups)?;
            }
        }
        Ok(())
    }

    async fn execute_group<W: Write>(
        &self,
        writer: &mut W,
        printer: &Printer,
        command: &GroupCommands,
    ) -> Result<(), CliError> {
        match command {
            GroupCommands::List { limit, offset } => {
                let response = self.client.get_firewall_groups(*limit, *offset).await?;
                printer.print(writer, &response, render_groups)?;
            }
            GroupCommands::Get { group_id } => {
                let response = self.client.get_firewall_group(group_id).await?;
                printer.print(writer, &response, render_group)?;
            }
            GroupCommands::Create { name, desc } => {
                let response = self
                    .client
                    .create_firewall_group(name, desc.as_deref())
                    .await?;
                printer.print_id(writer, &response, "group.id")?;
            }
            GroupCommands::Set {
                group_id,
                name,
                desc,
            } => {
                let response = self
                    .client
                    .update_firewall_group(group_id, name.as_deref(), desc.as_deref())
                    .await?;
                printer.print_id(writer, &response, "group.id")?;
            }
            GroupCommands::Remove { group_ids, yes } => {
                confirm(&format!("Remove firewall group(s) {group_ids:?}?"), *yes)?;
                for group_id in group_ids {
                    self.client.delete_firewall_group(group_id).await?;
                    writeln!(writer, "{group_id}")?;
                }
            }
            GroupCommands::Resources { group_id } => {
                let response = self.client.get_firewall_group_resources(group_id).await?;
                printer.print(writer, &response, render_linked_resources)?;
            }
        }
        Ok(())
    }

    async fn execute_rule<W: Write>(
        &self,
        writer: &mut W,
        printer: &Printer,
        command: &RuleCommands,
    ) -> Result<(), CliError> {
        match command {
            RuleCommands::List {
                group_id,
                limit,
                offset,
            } => {
                let response = self
                    .client
                    .get_firewall_rules(group_id, *limit, *offset)
                    .await?;
                printer.print(writer, &response, render_rules)?;
            }
            RuleCommands::Get { group_id, rule_id } => {
                let response = self.client.get_firewall_rule(group_id, rule_id).await?;
                printer.print(writer, &response, render_rule)?;
            }
            RuleCommands::Create {
                group_id,
                direction,
                proto,
                port,
                cidr,
                desc,
            } => {
                validate_icmp_port(*proto, port.as_deref())?;
                let rule = FirewallRule {
                    direction: *direction,
                    protocol: *proto,
                    port: port.as_deref(),
                    cidr,
                    description: desc.as_deref(),
                };
                let response = self.client.create_firewall_rule(group_id, &rule).await?;
                printer.print_id(writer, &response, "rule.id")?;
            }
            RuleCommands::Set {
                group_id,
                rule_id,
                direction,
                proto,
                port,
                cidr,
                desc,
            } => {
                validate_icmp_port(*proto, port.as_deref())?;
                let rule = FirewallRule {
                    direction: *direction,
                    protocol: *proto,
                    port: port.as_deref(),
                    cidr,
                    description: desc.as_deref(),
                };
                let response = self
                    .client
                    .update_firewall_rule(group_id, rule_id, &rule)
                    .await?;
                printer.print_id(writer, &response, "rule.id")?;
            }
            RuleCommands::Remove {
                group_id,
                rule_ids,
                yes,
            } => {
                confirm(&format!("Remove rule(s) {rule_ids:?}?"), *yes)?;
                for rule_id in rule_ids {
                    self.client.delete_firewall_rule(group_id, rule_id).await?;
                    writeln!(writer, "{rule_id}")?;
                }
            }
        }
        Ok(())
    }
}

fn validate_icmp_port(proto: FirewallProto, port: Option<&str>) -> Result<(), CliError> {
    if proto == FirewallProto::Icmp && port.is_some() {
        return Err(CliError::InvalidArgument(
            "--port cannot be set for ICMP rules".into(),
        ));
    }
    Ok(())
}

const GROUP_HEADER: [&str; 3] = ["ID", "NAME", "DESCRIPTION"];

fn group_row(group: &Value, table: &mut Table) -> Result<(), CliError> {
    table.row([
        gs(group, "id")?,
        gs(group, "name")?,
        gs(group, "description").unwrap_or_default(),
    ]);
    Ok(())
}

fn render_groups(value: &Value, table: &mut Table) -> Result<(), CliError> {
    table.header(GROUP_HEADER);
    for group in list(value, "groups")? {
        group_row(group, table)?;
    }
    Ok(())
}

fn render_group(value: &Value, table: &mut Table) -> Result<(), CliError> {
    table.header(GROUP_HEADER);
    let group = lookup(value, "group").ok_or_else(|| CliError::MissingField("group".into()))?;
    group_row(group, table)
}

const RULE_HEADER: [&str; 5] = ["ID", "DIRECTION", "PROTO", "PORTS", "CIDR"];

fn rule_row(rule: &Value, table: &mut Table) -> Result<(), CliError> {
    table.row([
        gs(rule, "id")?,
        gs(rule, "direction").unwrap_or_default(),
        gs(rule, "protocol").unwrap_or_default(),
        gs(rule, "port").unwrap_or_default(),
        gs(rule, "cidr").unwrap_or_default(),
    ]);
    Ok(())
}

fn render_rules(value: &Value, table: &mut Table) -> Result<(), CliError> {
    table.header(RULE_HEADER);
    for rule in list(value, "rules")? {
        rule_row(rule, table)?;
    }
    Ok(())
}

fn render_rule(value: &Value, table: &mut Table) -> Result<(), CliError> {
    table.header(RULE_HEADER);
    let rule = lookup(value, "rule").ok_or_else(|| CliError::MissingField("rule".into()))?;
    rule_row(rule, table)
}

fn render_linked_resources(value: &Value, table: &mut Table) -> Result<(), CliError> {
    table.header(["ID", "TYPE"]);
    for resource in list(value, "resources")? {
        table.row([
            gs(resource, "id")?,
            gs(resource, "type").unwrap_or_default(),
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

    fn firewall_command(cli: Cli) -> FirewallCommands {
        match cli.command {
            Commands::Firewall { command } => command,
            _ => panic!("expected firewall command"),
        }
    }

    #[test]
    fn parses_rule_create_with_defaults() {
        let cli = Cli::parse_from([
            "stratus", "fw", "rule", "create", "fw-group-1", "--proto", "tcp", "--port", "443",
        ]);
        match firewall_command(cli) {
            FirewallCommands::Rule {
                command:
                    RuleCommands::Create {
                        group_id,
                        direction,
                        proto,
                        port,
                        cidr,
                        ..
                    },
            } => {
                assert_eq!(group_id, "fw-group-1");
                assert_eq!(direction, FirewallDirection::Ingress);
                assert_eq!(proto, FirewallProto::Tcp);
                assert_eq!(port.as_deref(), Some("443"));
                assert_eq!(cidr, "0.0.0.0/0");
            }
            _ => panic!("expected rule create"),
        }
    }

    #[test]
    fn icmp_rules_cannot_take_a_port() {
        assert!(validate_icmp_port(FirewallProto::Icmp, Some("80")).is_err());
        assert!(validate_icmp_port(FirewallProto::Icmp, None).is_ok());
        assert!(validate_icmp_port(FirewallProto::Tcp, Some("80")).is_ok());
    }

    #[test]
    fn parses_link_with_resource_type() {
        let cli = Cli::parse_from([
            "stratus", "firewall", "link", "fw-group-1", "--type", "server", "--id", "42",
        ]);
        match firewall_command(cli) {
            FirewallCommands::Link {
                group_id,
                resource_type,
                resource_id,
            } => {
                assert_eq!(group_id, "fw-group-1");
                assert_eq!(resource_type, ResourceType::Server);
                assert_eq!(resource_id, 42);
            }
            _ => panic!("expected link command"),
        }
    }

    #[test]
    fn rules_table_shows_direction_and_cidr() {
        let value = json!({
            "rules": [{
                "id": "rule-1",
                "direction": "ingress",
                "protocol": "tcp",
                "port": "443",
                "cidr": "0.0.0.0/0",
            }]
        });
        let mut table = Table::new();
        render_rules(&value, &mut table).expect("render");
        let mut buf = Vec::new();
        table.write(&mut buf).expect("write");
        let output = String::from_utf8(buf).expect("utf8");
        assert!(output.contains("ingress"));
        assert!(output.contains("0.0.0.0/0"));
    }
}
