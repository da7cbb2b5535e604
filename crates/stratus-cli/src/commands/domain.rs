//! Domain and DNS record commands.

use std::io::Write;

use clap::Subcommand;
use serde_json::Value;
use stratus_api::client::DnsRecord;
use stratus_api::types::DnsRecordType;
use stratus_api::ApiClient;

use super::confirm;
use crate::error::CliError;
use crate::output::{gs, list, lookup, Printer, Table};

/// Domain subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum DomainCommands {
    /// List domains.
    #[command(visible_alias = "ls")]
    List {
        /// Maximum number of items to return.
        #[arg(long, default_value_t = 500)]
        limit: u32,
        /// Number of items to skip.
        #[arg(long, default_value_t = 0)]
        offset: u32,
    },

    /// Show one domain.
    Get {
        /// Domain name.
        fqdn: String,
    },

    /// Add a domain to the account.
    Add {
        /// Domain name.
        fqdn: String,
    },

    /// Remove domains from the account.
    #[command(visible_alias = "rm")]
    Remove {
        /// Domain names.
        #[arg(required = true)]
        fqdns: Vec<String>,
        /// Do not ask for confirmation.
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Toggle domain auto-prolong.
    #[command(visible_aliases = ["edit", "update", "upd"])]
    Set {
        /// Domain name.
        fqdn: String,
        /// Enable or disable auto-prolong (`true`/`false`).
        #[arg(long, action = clap::ArgAction::Set)]
        autoprolong: bool,
    },

    /// Manage DNS records.
    Record {
        /// Record subcommand to execute.
        #[command(subcommand)]
        command: RecordCommands,
    },

    /// Manage subdomains.
    Subdomain {
        /// Subdomain subcommand to execute.
        #[command(subcommand)]
        command: SubdomainCommands,
    },
}

/// DNS record subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum RecordCommands {
    /// List DNS records on a domain.
    #[command(visible_alias = "ls")]
    List {
        /// Domain name.
        fqdn: String,
        /// Maximum number of items to return.
        #[arg(long, default_value_t = 500)]
        limit: u32,
        /// Number of items to skip.
        #[arg(long, default_value_t = 0)]
        offset: u32,
    },

    /// Add a DNS record.
    #[command(visible_aliases = ["new", "create"])]
    Add {
        /// Domain name.
        fqdn: String,
        /// Record type: a, aaaa, cname, mx, srv or txt.
        #[arg(long = "type")]
        record_type: DnsRecordType,
        /// Record value (address, target host, text).
        #[arg(long)]
        value: String,
        /// Subdomain the record applies to; the apex when omitted.
        #[arg(long)]
        subdomain: Option<String>,
        /// Priority for MX/SRV records.
        #[arg(long)]
        priority: Option<u32>,
        /// Time to live in seconds.
        #[arg(long)]
        ttl: Option<u32>,
    },

    /// Replace a DNS record.
    #[command(visible_aliases = ["edit", "update", "upd"])]
    Set {
        /// Domain name.
        fqdn: String,
        /// Record ID.
        record_id: i64,
        /// Record type: a, aaaa, cname, mx, srv or txt.
        #[arg(long = "type")]
        record_type: DnsRecordType,
        /// Record value (address, target host, text).
        #[arg(long)]
        value: String,
        /// Subdomain the record applies to; the apex when omitted.
        #[arg(long)]
        subdomain: Option<String>,
        /// Priority for MX/SRV records.
        #[arg(long)]
        priority: Option<u32>,
        /// Time to live in seconds.
        #[arg(long)]
        ttl: Option<u32>,
    },

    /// Remove a DNS record.
    #[command(visible_alias = "rm")]
    Remove {
        /// Domain name.
        fqdn: String,
        /// Record ID.
        record_id: i64,
        /// Do not ask for confirmation.
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

/// Subdomain subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum SubdomainCommands {
    /// Create a subdomain.
    Add {
        /// Parent domain name.
        fqdn: String,
        /// Subdomain FQDN, e.g. `blog.example.com`.
        subdomain: String,
    },

    /// Remove a subdomain along with its DNS records.
    #[command(visible_alias = "rm")]
    Remove {
        /// Parent domain name.
        fqdn: String,
        /// Subdomain FQDN.
        subdomain: String,
        /// Do not ask for confirmation.
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

/// Domain command executor.
pub struct DomainCommand<'a> {
    client: &'a ApiClient,
}

impl<'a> DomainCommand<'a> {
    /// Create a new domain command.
    #[must_use]
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Execute a domain subcommand.
    pub async fn execute<W: Write>(
        &self,
        writer: &mut W,
        printer: &Printer,
        command: &DomainCommands,
    ) -> Result<(), CliError> {
        match command {
            DomainCommands::List { limit, offset } => {
                let response = self.client.get_domains(*limit, *offset).await?;
                printer.print(writer, &response, render_domains)?;
            }
            DomainCommands::Get { fqdn } => {
                let response = self.client.get_domain(fqdn).await?;
                printer.print(writer, &response, render_domain)?;
            }
            DomainCommands::Add { fqdn } => {
                self.client.add_domain(fqdn).await?;
                writeln!(writer, "{fqdn}")?;
            }
            DomainCommands::Remove { fqdns, yes } => {
                confirm(&format!("Remove domain(s) {fqdns:?}?"), *yes)?;
                for fqdn in fqdns {
                    self.client.delete_domain(fqdn).await?;
                    writeln!(writer, "{fqdn}")?;
                }
            }
            DomainCommands::Set { fqdn, autoprolong } => {
                self.client.set_domain_autoprolong(fqdn, *autoprolong).await?;
                writeln!(writer, "{fqdn}")?;
            }
            DomainCommands::Record { command } => {
                self.execute_record(writer, printer, command).await?;
            }
            DomainCommands::Subdomain { command } => {
                self.execute_subdomain(writer, command).await?;
            }
        }
        Ok(())
    }

    async fn execute_record<W: Write>(
        &self,
        writer: &mut W,
        printer: &Printer,
        command: &RecordCommands,
    ) -> Result<(), CliError> {
        match command {
            RecordCommands::List {
                fqdn,
                limit,
                offset,
            } => {
                let response = self
                    .client
                    .get_domain_dns_records(fqdn, *limit, *offset)
                    .await?;
                printer.print(writer, &response, render_records)?;
            }
            RecordCommands::Add {
                fqdn,
                record_type,
                value,
                subdomain,
                priority,
                ttl,
            } => {
                let record = DnsRecord {
                    record_type: *record_type,
                    value,
                    subdomain: subdomain.as_deref(),
                    priority: *priority,
                    ttl: *ttl,
                };
                let response = self.client.add_domain_dns_record(fqdn, &record).await?;
                printer.print_id(writer, &response, "dns_record.id")?;
            }
            RecordCommands::Set {
                fqdn,
                record_id,
                record_type,
                value,
                subdomain,
                priority,
                ttl,
            } => {
                let record = DnsRecord {
                    record_type: *record_type,
                    value,
                    subdomain: subdomain.as_deref(),
                    priority: *priority,
                    ttl: *ttl,
                };
                let response = self
                    .client
                    .update_domain_dns_record(fqdn, *record_id, &record)
                    .await?;
                printer.print_id(writer, &response, "dns_record.id")?;
            }
            RecordCommands::Remove {
                fqdn,
                record_id,
                yes,
            } => {
                confirm(&format!("Remove DNS record {record_id}?"), *yes)?;
                self.client.delete_domain_dns_record(fqdn, *record_id).await?;
                writeln!(writer, "{record_id}")?;
            }
        }
        Ok(())
    }

    async fn execute_subdomain<W: Write>(
        &self,
        writer: &mut W,
        command: &SubdomainCommands,
    ) -> Result<(), CliError> {
        match command {
            SubdomainCommands::Add { fqdn, subdomain } => {
                self.client.add_subdomain(fqdn, subdomain).await?;
                writeln!(writer, "{subdomain}")?;
            }
            SubdomainCommands::Remove {
                fqdn,
                subdomain,
                yes,
            } => {
                confirm(
                    &format!("Remove subdomain {subdomain} and its DNS records?"),
                    *yes,
                )?;
                self.client.delete_subdomain(fqdn, subdomain).await?;
                writeln!(writer, "{subdomain}")?;
            }
        }
        Ok(())
    }
}

const DOMAIN_HEADER: [&str; 4] = ["FQDN", "ID", "STATUS", "EXPIRATION"];

fn domain_row(domain: &Value, table: &mut Table) -> Result<(), CliError> {
    table.row([
        gs(domain, "fqdn")?,
        gs(domain, "id")?,
        gs(domain, "domain_status").unwrap_or_default(),
        gs(domain, "expiration").unwrap_or_default(),
    ]);
    Ok(())
}

fn render_domains(value: &Value, table: &mut Table) -> Result<(), CliError> {
    table.header(DOMAIN_HEADER);
    for domain in list(value, "domains")? {
        domain_row(domain, table)?;
    }
    Ok(())
}

fn render_domain(value: &Value, table: &mut Table) -> Result<(), CliError> {
    table.header(DOMAIN_HEADER);
    let domain = lookup(value, "domain").ok_or_else(|| CliError::MissingField("domain".into()))?;
    domain_row(domain, table)
}

fn render_records(value: &Value, table: &mut Table) -> Result<(), CliError> {
    table.header(["ID", "TYPE", "VALUE", "SUBDOMAIN", "TTL"]);
    for record in list(value, "dns_records")? {
        table.row([
            gs(record, "id")?,
            gs(record, "type").unwrap_or_default(),
            gs(record, "data.value").unwrap_or_default(),
            gs(record, "data.subdomain").unwrap_or_default(),
            gs(record, "ttl").unwrap_or_default(),
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

    fn domain_command(cli: Cli) -> DomainCommands {
        match cli.command {
            Commands::Domain { command } => command,
            _ => panic!("expected domain command"),
        }
    }

    #[test]
    fn parses_record_add() {
        let cli = Cli::parse_from([
            "stratus",
            "domain",
            "record",
            "add",
            "example.com",
            "--type",
            "mx",
            "--value",
            "mail.example.com",
            "--priority",
            "10",
        ]);
        match domain_command(cli) {
            DomainCommands::Record {
                command:
                    RecordCommands::Add {
                        fqdn,
                        record_type,
                        value,
                        priority,
                        ..
                    },
            } => {
                assert_eq!(fqdn, "example.com");
                assert_eq!(record_type, DnsRecordType::Mx);
                assert_eq!(value, "mail.example.com");
                assert_eq!(priority, Some(10));
            }
            _ => panic!("expected record add"),
        }
    }

    #[test]
    fn record_type_is_uppercased_on_the_wire() {
        let record = DnsRecord {
            record_type: DnsRecordType::Cname,
            value: "www.example.com",
            subdomain: None,
            priority: None,
            ttl: Some(300),
        };
        let value = serde_json::to_value(record).expect("json");
        assert_eq!(value["type"], "CNAME");
        assert_eq!(value["ttl"], 300);
    }

    #[test]
    fn parses_set_autoprolong() {
        let cli = Cli::parse_from([
            "stratus",
            "domain",
            "set",
            "example.com",
            "--autoprolong",
            "true",
        ]);
        match domain_command(cli) {
            DomainCommands::Set { fqdn, autoprolong } => {
                assert_eq!(fqdn, "example.com");
                assert!(autoprolong);
            }
            _ => panic!("expected set command"),
        }
    }

    #[test]
    fn domain_table_leads_with_fqdn() {
        let value = json!({
            "domains": [{
                "fqdn": "example.com",
                "id": 11,
                "domain_status": "active",
                "expiration": "2027-01-01",
            }]
        });
        let mut table = Table::new();
        render_domains(&value, &mut table).expect("render");
        let mut buf = Vec::new();
        table.write(&mut buf).expect("write");
        let output = String::from_utf8(buf).expect("utf8");
        assert!(output.starts_with("FQDN"));
        assert!(output.contains("example.com"));
    }
}
