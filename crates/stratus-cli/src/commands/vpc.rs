//! VPC network commands.

use std::io::Write;

use clap::Subcommand;
use serde_json::Value;
use stratus_api::regions;
use stratus_api::types::{AvailabilityZone, Region};
use stratus_api::ApiClient;

use super::confirm;
use crate::error::CliError;
use crate::output::{gs, list, lookup, Printer, Table};

/// VPC subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum VpcCommands {
    /// List VPCs.
    #[command(visible_alias = "ls")]
    List,

    /// Show one VPC.
    Get {
        /// VPC ID.
        id: String,
    },

    /// Create a VPC.
    #[command(visible_aliases = ["new", "add"])]
    Create {
        /// VPC name.
        #[arg(long)]
        name: String,
        /// IPv4 subnet in CIDR notation, e.g. `10.0.0.0/24`.
        #[arg(long)]
        subnet: String,
        /// Region; profile default when omitted.
        #[arg(long)]
        region: Option<Region>,
        /// VPC description.
        #[arg(long)]
        desc: Option<String>,
        /// Availability zone.
        #[arg(long)]
        zone: Option<AvailabilityZone>,
    },

    /// Update VPC name or description.
    #[command(visible_aliases = ["edit", "update", "upd"])]
    Set {
        /// VPC ID.
        id: String,
        /// VPC name.
        #[arg(long)]
        name: Option<String>,
        /// VPC description.
        #[arg(long)]
        desc: Option<String>,
    },

    /// Remove VPCs.
    #[command(visible_alias = "rm")]
    Remove {
        /// VPC IDs.
        #[arg(required = true)]
        ids: Vec<String>,
        /// Do not ask for confirmation.
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// List services attached to a VPC.
    Services {
        /// VPC ID.
        id: String,
    },

    /// List ports in a VPC.
    Ports {
        /// VPC ID.
        id: String,
    },
}

/// VPC command executor.
pub struct VpcCommand<'a> {
    client: &'a ApiClient,
    default_region: Option<Region>,
}

impl<'a> VpcCommand<'a> {
    /// Create a new VPC command.
    #[must_use]
    pub fn new(client: &'a ApiClient) -> Self {
        Self {
            client,
            default_region: None,
        }
    }

    /// Region to use when `--region` is omitted.
    #[must_use]
    pub fn with_default_region(mut self, region: Option<Region>) -> Self {
        self.default_region = region;
        self
    }

    /// Execute a VPC subcommand.
    pub async fn execute<W: Write>(
        &self,
        writer: &mut W,
        printer: &Printer,
        command: &VpcCommands,
    ) -> Result<(), CliError> {
        match command {
            VpcCommands::List => {
                let response = self.client.get_vpcs().await?;
                printer.print(writer, &response, render_vpcs)?;
            }
            VpcCommands::Get { id } => {
                let response = self.client.get_vpc(id).await?;
                printer.print(writer, &response, render_vpc)?;
            }
            VpcCommands::Create {
                name,
                subnet,
                region,
                desc,
                zone,
            } => {
                let region = region.or(self.default_region).ok_or_else(|| {
                    CliError::InvalidArgument(
                        "--region is required; no region in the active profile".into(),
                    )
                })?;
                validate_lan_region(region)?;
                let response = self
                    .client
                    .create_vpc(name, subnet, region, desc.as_deref(), *zone)
                    .await?;
                printer.print_id(writer, &response, "vpc.id")?;
            }
            VpcCommands::Set { id, name, desc } => {
                let response = self
                    .client
                    .update_vpc(id, name.as_deref(), desc.as_deref())
                    .await?;
                printer.print_id(writer, &response, "vpc.id")?;
            }
            VpcCommands::Remove { ids, yes } => {
                confirm(&format!("Remove VPC(s) {ids:?}?"), *yes)?;
                for id in ids {
                    self.client.delete_vpc(id).await?;
                    writeln!(writer, "{id}")?;
                }
            }
            VpcCommands::Services { id } => {
                let response = self.client.get_vpc_services(id).await?;
                printer.print(writer, &response, render_services)?;
            }
            VpcCommands::Ports { id } => {
                let response = self.client.get_vpc_ports(id).await?;
                printer.print(writer, &response, render_ports)?;
            }
        }
        Ok(())
    }
}

/// Private networks exist only in LAN-capable regions.
fn validate_lan_region(region: Region) -> Result<(), CliError> {
    if regions::REGIONS_WITH_LAN.contains(&region) {
        Ok(())
    } else {
        Err(CliError::InvalidArgument(format!(
            "private networks are not available in {region}; supported regions: {}",
            super::region_names(regions::REGIONS_WITH_LAN)
        )))
    }
}

const VPC_HEADER: [&str; 4] = ["ID", "NAME", "REGION", "SUBNET"];

fn vpc_row(vpc: &Value, table: &mut Table) -> Result<(), CliError> {
    table.row([
        gs(vpc, "id")?,
        gs(vpc, "name").unwrap_or_default(),
        gs(vpc, "location").unwrap_or_default(),
        gs(vpc, "subnet_v4").unwrap_or_default(),
    ]);
    Ok(())
}

fn render_vpcs(value: &Value, table: &mut Table) -> Result<(), CliError> {
    table.header(VPC_HEADER);
    for vpc in list(value, "vpcs")? {
        vpc_row(vpc, table)?;
    }
    Ok(())
}

fn render_vpc(value: &Value, table: &mut Table) -> Result<(), CliError> {
    table.header(VPC_HEADER);
    let vpc = lookup(value, "vpc").ok_or_else(|| CliError::MissingField("vpc".into()))?;
    vpc_row(vpc, table)
}

fn render_services(value: &Value, table: &mut Table) -> Result<(), CliError> {
    table.header(["ID", "NAME", "TYPE", "PRIVATE IP", "PUBLIC IP"]);
    for service in list(value, "services")? {
        table.row([
            gs(service, "id")?,
            gs(service, "name").unwrap_or_default(),
            gs(service, "type").unwrap_or_default(),
            gs(service, "local_ip").unwrap_or_default(),
            gs(service, "public_ip").unwrap_or_default(),
        ]);
    }
    Ok(())
}

fn render_ports(value: &Value, table: &mut Table) -> Result<(), CliError> {
    table.header(["ID", "NAT", "IP"]);
    for port in list(value, "vpc_ports")? {
        table.row([
            gs(port, "id")?,
            gs(port, "nat_mode").unwrap_or_default(),
            gs(port, "ipv4").unwrap_or_default(),
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

    fn vpc_command(cli: Cli) -> VpcCommands {
        match cli.command {
            Commands::Vpc { command } => command,
            _ => panic!("expected vpc command"),
        }
    }

    #[test]
    fn parses_create_with_network_alias() {
        let cli = Cli::parse_from([
            "stratus", "network", "create", "--name", "backend", "--subnet", "10.0.0.0/24",
            "--region", "eu-1",
        ]);
        match vpc_command(cli) {
            VpcCommands::Create {
                name,
                subnet,
                region,
                ..
            } => {
                assert_eq!(name, "backend");
                assert_eq!(subnet, "10.0.0.0/24");
                assert_eq!(region, Some(Region::Eu1));
            }
            _ => panic!("expected create command"),
        }
    }

    #[test]
    fn create_rejects_unknown_region() {
        let result = Cli::try_parse_from([
            "stratus", "vpc", "create", "--name", "backend", "--subnet", "10.0.0.0/24",
            "--region", "mars-1",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn create_rejects_region_without_lan_support() {
        let err = validate_lan_region(Region::Ap1).unwrap_err();
        assert!(err.to_string().contains("ap-1"));
        assert!(validate_lan_region(Region::Us1).is_ok());
    }

    #[test]
    fn vpc_table_shows_subnet() {
        let value = json!({
            "vpcs": [{
                "id": "vpc-1",
                "name": "backend",
                "location": "us-1",
                "subnet_v4": "10.0.0.0/24",
            }]
        });
        let mut table = Table::new();
        render_vpcs(&value, &mut table).expect("render");
        let mut buf = Vec::new();
        table.write(&mut buf).expect("write");
        assert!(String::from_utf8(buf).expect("utf8").contains("10.0.0.0/24"));
    }
}
