//! Load balancer commands, including the `rule` and `backend` subgroups.

use std::io::Write;

use clap::{Args, Subcommand};
use serde_json::json;
use serde_json::Value;
use stratus_api::client::{BalancerRule, CreateBalancer, UpdateBalancer};
use stratus_api::types::{BalancerAlgo, BalancerProto};
use stratus_api::ApiClient;

use super::confirm;
use crate::error::CliError;
use crate::output::{gs, list, lookup, Printer, Table};

/// Balancer subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum BalancerCommands {
    /// List load balancers.
    #[command(visible_alias = "ls")]
    List,

    /// Show one load balancer.
    Get {
        /// Balancer ID.
        id: i64,
    },

    /// Create a load balancer.
    #[command(visible_aliases = ["new", "add"])]
    Create(CreateBalancerArgs),

    /// Update load balancer properties.
    #[command(visible_aliases = ["edit", "update", "upd"])]
    Set(SetBalancerArgs),

    /// Remove load balancers.
    #[command(visible_alias = "rm")]
    Remove {
        /// Balancer IDs.
        #[arg(required = true)]
        ids: Vec<i64>,
        /// Do not ask for confirmation.
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// List balancer presets.
    ListPresets,

    /// Manage forwarding rules.
    Rule {
        /// Rule subcommand to execute.
        #[command(subcommand)]
        command: RuleCommands,
    },

    /// Manage backend addresses.
    Backend {
        /// Backend subcommand to execute.
        #[command(subcommand)]
        command: BackendCommands,
    },
}

/// Arguments for `balancer create`.
#[derive(Args, Debug, Clone)]
pub struct CreateBalancerArgs {
    /// Balancer display name.
    #[arg(long)]
    pub name: String,

    /// Preset ID; see `balancer list-presets`.
    #[arg(long)]
    pub preset_id: i64,

    /// Balancing algorithm: roundrobin or leastconn.
    #[arg(long, default_value = "roundrobin")]
    pub algo: BalancerAlgo,

    /// Frontend protocol: http, http2, https or tcp.
    #[arg(long, default_value = "http")]
    pub proto: BalancerProto,

    /// Health check port.
    #[arg(long, default_value_t = 80)]
    pub port: u16,

    /// Health check path.
    #[arg(long, default_value = "/")]
    pub path: String,

    /// Health check interval in seconds.
    #[arg(long, default_value_t = 10)]
    pub inter: u32,

    /// Health check timeout in seconds.
    #[arg(long, default_value_t = 5)]
    pub timeout: u32,

    /// Checks failed before marking a backend down.
    #[arg(long, default_value_t = 3)]
    pub fall: u32,

    /// Checks passed before marking a backend up.
    #[arg(long, default_value_t = 2)]
    pub rise: u32,

    /// Enable sticky sessions.
    #[arg(long)]
    pub sticky: bool,

    /// Send PROXY protocol headers to backends.
    #[arg(long)]
    pub proxy_protocol: bool,

    /// Redirect HTTP to HTTPS.
    #[arg(long)]
    pub force_https: bool,

    /// Keep backend connections alive.
    #[arg(long)]
    pub backend_keepalive: bool,

    /// Attach to a VPC by ID.
    #[arg(long, value_name = "VPC_ID")]
    pub network: Option<String>,

    /// Private address in the attached VPC.
    #[arg(long, requires = "network")]
    pub private_ip: Option<String>,

    /// Free-form comment.
    #[arg(long)]
    pub comment: Option<String>,

    /// Project to place the balancer into.
    #[arg(long)]
    pub project_id: Option<i64>,

    /// Connection cap.
    #[arg(long)]
    pub max_connections: Option<u32>,
}

/// Arguments for `balancer set`.
#[derive(Args, Debug, Clone)]
pub struct SetBalancerArgs {
    /// Balancer ID.
    pub id: i64,

    /// Balancer display name.
    #[arg(long)]
    pub name: Option<String>,

    /// Preset to resize to.
    #[arg(long)]
    pub preset_id: Option<i64>,

    /// Balancing algorithm: roundrobin or leastconn.
    #[arg(long)]
    pub algo: Option<BalancerAlgo>,

    /// Frontend protocol: http, http2, https or tcp.
    #[arg(long)]
    pub proto: Option<BalancerProto>,

    /// Health check port.
    #[arg(long)]
    pub port: Option<u16>,

    /// Health check path.
    #[arg(long)]
    pub path: Option<String>,

    /// Enable or disable sticky sessions (`true`/`false`).
    #[arg(long)]
    pub sticky: Option<bool>,

    /// Enable or disable PROXY protocol headers (`true`/`false`).
    #[arg(long)]
    pub proxy_protocol: Option<bool>,

    /// Enable or disable HTTP to HTTPS redirect (`true`/`false`).
    #[arg(long)]
    pub force_https: Option<bool>,

    /// Enable or disable backend keepalive (`true`/`false`).
    #[arg(long)]
    pub backend_keepalive: Option<bool>,
}

/// Forwarding rule subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum RuleCommands {
    /// List forwarding rules on a balancer.
    #[command(visible_alias = "ls")]
    List {
        /// Balancer ID.
        balancer_id: i64,
    },

    /// Create a forwarding rule.
    #[command(visible_aliases = ["new", "add"])]
    Create {
        /// Balancer ID.
        balancer_id: i64,
        /// Frontend port.
        #[arg(long)]
        port: u16,
        /// Frontend protocol.
        #[arg(long, default_value = "http")]
        proto: BalancerProto,
        /// Backend port.
        #[arg(long)]
        server_port: u16,
        /// Backend protocol.
        #[arg(long, default_value = "http")]
        server_proto: BalancerProto,
    },

    /// Replace a forwarding rule.
    #[command(visible_aliases = ["edit", "update", "upd"])]
    Set {
        /// Balancer ID.
        balancer_id: i64,
        /// Rule ID.
        rule_id: i64,
        /// Frontend port.
        #[arg(long)]
        port: u16,
        /// Frontend protocol.
        #[arg(long, default_value = "http")]
        proto: BalancerProto,
        /// Backend port.
        #[arg(long)]
        server_port: u16,
        /// Backend protocol.
        #[arg(long, default_value = "http")]
        server_proto: BalancerProto,
    },

    /// Remove a forwarding rule.
    #[command(visible_alias = "rm")]
    Remove {
        /// Balancer ID.
        balancer_id: i64,
        /// Rule ID.
        rule_id: i64,
        /// Do not ask for confirmation.
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

/// Backend address subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum BackendCommands {
    /// List backend addresses behind a balancer.
    #[command(visible_alias = "ls")]
    List {
        /// Balancer ID.
        balancer_id: i64,
    },

    /// Add backend addresses.
    Add {
        /// Balancer ID.
        balancer_id: i64,
        /// Backend IP addresses.
        #[arg(required = true)]
        ips: Vec<String>,
    },

    /// Remove backend addresses.
    #[command(visible_alias = "rm")]
    Remove {
        /// Balancer ID.
        balancer_id: i64,
        /// Backend IP addresses.
        #[arg(required = true)]
        ips: Vec<String>,
        /// Do not ask for confirmation.
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

/// Balancer command executor.
pub struct BalancerCommand<'a> {
    client: &'a ApiClient,
}

impl<'a> BalancerCommand<'a> {
    /// Create a new balancer command.
    #[must_use]
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Execute a balancer subcommand.
    pub async fn execute<W: Write>(
        &self,
        writer: &mut W,
        printer: &Printer,
        command: &BalancerCommands,
    ) -> Result<(), CliError> {
        match command {
            BalancerCommands::List => {
                let response = self.client.get_balancers().await?;
                printer.print(writer, &response, render_balancers)?;
            }
            BalancerCommands::Get { id } => {
                let response = self.client.get_balancer(*id).await?;
                printer.print(writer, &response, render_balancer)?;
            }
            BalancerCommands::Create(args) => {
                let network = args.network.as_ref().map(|id| match &args.private_ip {
                    Some(ip) => json!({ "id": id, "ip": ip }),
                    None => json!({ "id": id }),
                });
                let spec = CreateBalancer {
                    name: &args.name,
                    preset_id: args.preset_id,
                    algo: args.algo,
                    proto: args.proto,
                    port: args.port,
                    path: &args.path,
                    inter: args.inter,
                    timeout: args.timeout,
                    fall: args.fall,
                    rise: args.rise,
                    sticky: args.sticky,
                    proxy_protocol: args.proxy_protocol,
                    force_https: args.force_https,
                    backend_keepalive: args.backend_keepalive,
                    network,
                    comment: args.comment.as_deref(),
                    project_id: args.project_id,
                    max_connections: args.max_connections,
                };
                let response = self.client.create_balancer(&spec).await?;
                printer.print_id(writer, &response, "balancer.id")?;
            }
            BalancerCommands::Set(args) => {
                let spec = UpdateBalancer {
                    name: args.name.as_deref(),
                    preset_id: args.preset_id,
                    algo: args.algo,
                    proto: args.proto,
                    port: args.port,
                    path: args.path.as_deref(),
                    sticky: args.sticky,
                    proxy_protocol: args.proxy_protocol,
                    force_https: args.force_https,
                    backend_keepalive: args.backend_keepalive,
                };
                let response = self.client.update_balancer(args.id, &spec).await?;
                printer.print_id(writer, &response, "balancer.id")?;
            }
            BalancerCommands::Remove { ids, yes } => {
                confirm(&format!("Remove balancer(s) {ids:?}?"), *yes)?;
                for id in ids {
                    self.client.delete_balancer(*id).await?;
                    writeln!(writer, "{id}")?;
                }
            }
            BalancerCommands::ListPresets => {
                let response = self.client.get_balancer_presets().await?;
                printer.print(writer, &response, render_presets)?;
            }
            BalancerCommands::Rule { command } => {
                self.execute_rule(writer, printer, command).await?;
            }
            BalancerCommands::Backend { command } => {
                self.execute_backend(writer, printer, command).await?;
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
            RuleCommands::List { balancer_id } => {
                let response = self.client.get_balancer_rules(*balancer_id).await?;
                printer.print(writer, &response, render_rules)?;
            }
            RuleCommands::Create {
                balancer_id,
                port,
                proto,
                server_port,
                server_proto,
            } => {
                let rule = BalancerRule {
                    balancer_port: *port,
                    balancer_proto: *proto,
                    server_port: *server_port,
                    server_proto: *server_proto,
                };
                let response = self.client.create_balancer_rule(*balancer_id, &rule).await?;
                printer.print_id(writer, &response, "rule.id")?;
            }
            RuleCommands::Set {
                balancer_id,
                rule_id,
                port,
                proto,
                server_port,
                server_proto,
            } => {
                let rule = BalancerRule {
                    balancer_port: *port,
                    balancer_proto: *proto,
                    server_port: *server_port,
                    server_proto: *server_proto,
                };
                let response = self
                    .client
                    .update_balancer_rule(*balancer_id, *rule_id, &rule)
                    .await?;
                printer.print_id(writer, &response, "rule.id")?;
            }
            RuleCommands::Remove {
                balancer_id,
                rule_id,
                yes,
            } => {
                confirm(&format!("Remove rule {rule_id}?"), *yes)?;
                self.client.delete_balancer_rule(*balancer_id, *rule_id).await?;
                writeln!(writer, "{rule_id}")?;
            }
        }
        Ok(())
    }

    async fn execute_backend<W: Write>(
        &self,
        writer: &mut W,
        printer: &Printer,
        command: &BackendCommands,
    ) -> Result<(), CliError> {
        match command {
            BackendCommands::List { balancer_id } => {
                let response = self.client.get_balancer_ips(*balancer_id).await?;
                printer.print(writer, &response, render_backends)?;
            }
            BackendCommands::Add { balancer_id, ips } => {
                self.client.add_ips_to_balancer(*balancer_id, ips).await?;
                for ip in ips {
                    writeln!(writer, "{ip}")?;
                }
            }
            BackendCommands::Remove {
                balancer_id,
                ips,
                yes,
            } => {
                confirm(&format!("Remove backend(s) {ips:?}?"), *yes)?;
                self.client.delete_ips_from_balancer(*balancer_id, ips).await?;
                for ip in ips {
                    writeln!(writer, "{ip}")?;
                }
            }
        }
        Ok(())
    }
}

const BALANCER_HEADER: [&str; 5] = ["ID", "NAME", "STATUS", "ALGO", "PROTO"];

fn balancer_row(balancer: &Value, table: &mut Table) -> Result<(), CliError> {
    table.row([
        gs(balancer, "id")?,
        gs(balancer, "name")?,
        gs(balancer, "status").unwrap_or_default(),
        gs(balancer, "algo").unwrap_or_default(),
        gs(balancer, "proto").unwrap_or_default(),
    ]);
    Ok(())
}

fn render_balancers(value: &Value, table: &mut Table) -> Result<(), CliError> {
    table.header(BALANCER_HEADER);
    for balancer in list(value, "balancers")? {
        balancer_row(balancer, table)?;
    }
    Ok(())
}

fn render_balancer(value: &Value, table: &mut Table) -> Result<(), CliError> {
    table.header(BALANCER_HEADER);
    let balancer =
        lookup(value, "balancer").ok_or_else(|| CliError::MissingField("balancer".into()))?;
    balancer_row(balancer, table)
}

fn render_presets(value: &Value, table: &mut Table) -> Result<(), CliError> {
    table.header(["ID", "REGION", "PRICE", "REQUESTS/S"]);
    for preset in list(value, "balancers_presets")? {
        table.row([
            gs(preset, "id")?,
            gs(preset, "location").unwrap_or_default(),
            gs(preset, "price").unwrap_or_default(),
            gs(preset, "replica_count").unwrap_or_default(),
        ]);
    }
    Ok(())
}

fn render_rules(value: &Value, table: &mut Table) -> Result<(), CliError> {
    table.header(["ID", "PORT", "PROTO", "SERVER PORT", "SERVER PROTO"]);
    for rule in list(value, "rules")? {
        table.row([
            gs(rule, "id")?,
            gs(rule, "balancer_port").unwrap_or_default(),
            gs(rule, "balancer_proto").unwrap_or_default(),
            gs(rule, "server_port").unwrap_or_default(),
            gs(rule, "server_proto").unwrap_or_default(),
        ]);
    }
    Ok(())
}

fn render_backends(value: &Value, table: &mut Table) -> Result<(), CliError> {
    table.header(["IP"]);
    for ip in list(value, "ips")? {
        match ip {
            Value::String(s) => table.row([s.as_str()]),
            other => table.row([gs(other, "ip")?]),
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

    fn balancer_command(cli: Cli) -> BalancerCommands {
        match cli.command {
            Commands::Balancer { command } => command,
            _ => panic!("expected balancer command"),
        }
    }

    #[test]
    fn parses_create_with_defaults() {
        let cli = Cli::parse_from([
            "stratus", "lb", "create", "--name", "edge", "--preset-id", "1",
        ]);
        let BalancerCommands::Create(args) = balancer_command(cli) else {
            panic!("expected create");
        };
        assert_eq!(args.algo, BalancerAlgo::RoundRobin);
        assert_eq!(args.proto, BalancerProto::Http);
        assert_eq!(args.port, 80);
        assert_eq!(args.path, "/");
        assert_eq!((args.inter, args.timeout, args.fall, args.rise), (10, 5, 3, 2));
    }

    #[test]
    fn create_spec_uses_wire_names() {
        let spec = CreateBalancer {
            name: "edge",
            preset_id: 1,
            algo: BalancerAlgo::LeastConnections,
            proto: BalancerProto::Tcp,
            port: 80,
            path: "/",
            inter: 10,
            timeout: 5,
            fall: 3,
            rise: 2,
            sticky: true,
            proxy_protocol: false,
            force_https: false,
            backend_keepalive: true,
            network: None,
            comment: None,
            project_id: None,
            max_connections: Some(1000),
        };
        let value = serde_json::to_value(spec).expect("json");
        assert_eq!(value["algo"], "leastconn");
        assert_eq!(value["is_sticky"], true);
        assert_eq!(value["is_keepalive"], true);
        assert_eq!(value["maxconn"], 1000);
    }

    #[test]
    fn parses_rule_create() {
        let cli = Cli::parse_from([
            "stratus",
            "balancer",
            "rule",
            "create",
            "5",
            "--port",
            "443",
            "--proto",
            "https",
            "--server-port",
            "8080",
        ]);
        match balancer_command(cli) {
            BalancerCommands::Rule {
                command:
                    RuleCommands::Create {
                        balancer_id,
                        port,
                        proto,
                        server_port,
                        server_proto,
                    },
            } => {
                assert_eq!((balancer_id, port, server_port), (5, 443, 8080));
                assert_eq!(proto, BalancerProto::Https);
                assert_eq!(server_proto, BalancerProto::Http);
            }
            _ => panic!("expected rule create"),
        }
    }

    #[test]
    fn backends_render_accepts_strings_and_objects() {
        let value = json!({"ips": ["10.0.0.2", {"ip": "10.0.0.3"}]});
        let mut table = Table::new();
        render_backends(&value, &mut table).expect("render");
        let mut buf = Vec::new();
        table.write(&mut buf).expect("write");
        let output = String::from_utf8(buf).expect("utf8");
        assert!(output.contains("10.0.0.2"));
        assert!(output.contains("10.0.0.3"));
    }
}
