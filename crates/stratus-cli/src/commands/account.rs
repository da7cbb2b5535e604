//! Account commands: status, finances, access restrictions, whoami.

use std::io::Write;

use clap::Subcommand;
use serde_json::Value;
use stratus_api::ApiClient;

use crate::error::CliError;
use crate::output::{gs, Format, Printer, Table};

/// Account subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum AccountCommands {
    /// Show account status.
    Status,

    /// Show account balance and monthly costs.
    Finances,

    /// Show account access restrictions.
    Access,
}

/// Account command executor.
pub struct AccountCommand<'a> {
    client: &'a ApiClient,
}

impl<'a> AccountCommand<'a> {
    /// Create a new account command.
    #[must_use]
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Execute an account subcommand.
    pub async fn execute<W: Write>(
        &self,
        writer: &mut W,
        printer: &Printer,
        command: &AccountCommands,
    ) -> Result<(), CliError> {
        match command {
            AccountCommands::Status => {
                let response = self.client.get_account_status().await?;
                printer.print(writer, &response, render_status)?;
            }
            AccountCommands::Finances => {
                let response = self.client.get_account_finances().await?;
                printer.print(writer, &response, render_finances)?;
            }
            AccountCommands::Access => {
                let response = self.client.get_account_restrictions().await?;
                printer.print(writer, &response, render_access)?;
            }
        }
        Ok(())
    }
}

fn render_status(value: &Value, table: &mut Table) -> Result<(), CliError> {
    table.row(["Login", gs(value, "status.login")?.as_str()]);
    table.row(["Company", gs(value, "status.company_info.name")?.as_str()]);
    table.row(["Blocked", gs(value, "status.is_blocked")?.as_str()]);
    table.row(["Permanently blocked", gs(value, "status.is_permanent_blocked")?.as_str()]);
    Ok(())
}

fn render_finances(value: &Value, table: &mut Table) -> Result<(), CliError> {
    table.row(["Balance", gs(value, "finances.balance")?.as_str()]);
    table.row(["Currency", gs(value, "finances.currency")?.as_str()]);
    table.row(["Monthly cost", gs(value, "finances.monthly_cost")?.as_str()]);
    table.row(["Hours left", gs(value, "finances.hours_left")?.as_str()]);
    Ok(())
}

fn render_access(value: &Value, table: &mut Table) -> Result<(), CliError> {
    table.row([
        "IP restrictions",
        gs(value, "is_ip_restrictions_enabled")?.as_str(),
    ]);
    table.row([
        "Country restrictions",
        gs(value, "is_country_restrictions_enabled")?.as_str(),
    ]);
    Ok(())
}

/// Whoami command executor.
pub struct WhoamiCommand<'a> {
    client: &'a ApiClient,
}

impl<'a> WhoamiCommand<'a> {
    /// Create a new whoami command.
    #[must_use]
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Print the account login. Other formats print the full status body.
    pub async fn execute<W: Write>(
        &self,
        writer: &mut W,
        printer: &Printer,
    ) -> Result<(), CliError> {
        let response = self.client.get_account_status().await?;
        if printer.format() == Format::Default {
            let value = response.json()?;
            writeln!(writer, "{}", gs(&value, "status.login")?)?;
            Ok(())
        } else {
            printer.print(writer, &response, |_, _| Ok(()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use serde_json::json;

    #[test]
    fn parses_account_subcommands() {
        let cli = Cli::parse_from(["stratus", "account", "status"]);
        match cli.command {
            Commands::Account { command } => {
                assert!(matches!(command, AccountCommands::Status));
            }
            _ => panic!("expected account command"),
        }

        let cli = Cli::parse_from(["stratus", "account", "finances"]);
        assert!(matches!(
            cli.command,
            Commands::Account {
                command: AccountCommands::Finances
            }
        ));
    }

    #[test]
    fn status_table_renders_selected_fields() {
        let value = json!({
            "status": {
                "login": "alice@example.com",
                "company_info": {"name": "Example Corp"},
                "is_blocked": false,
                "is_permanent_blocked": false,
            }
        });
        let mut table = Table::new();
        render_status(&value, &mut table).expect("render");

        let mut buf = Vec::new();
        table.write(&mut buf).expect("write");
        let output = String::from_utf8(buf).expect("utf8");
        assert!(output.contains("alice@example.com"));
        assert!(output.contains("Example Corp"));
    }

    #[test]
    fn finances_render_needs_expected_schema() {
        let err = render_finances(&json!({"oops": {}}), &mut Table::new()).unwrap_err();
        assert!(matches!(err, CliError::MissingField(_)));
    }
}
