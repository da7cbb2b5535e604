//! Command implementations, one module per resource family.
//!
//! Each module defines a clap subcommand enum plus an executor struct in
//! the same shape: `new()` takes what the command needs (usually a borrowed
//! [`stratus_api::ApiClient`]), `execute()` builds one API call from the
//! parsed flags and prints the response through a [`crate::output::Printer`].

use std::io::Write;

use crate::error::CliError;

pub mod account;
pub mod apps;
pub mod balancer;
pub mod cluster;
pub mod config;
pub mod database;
pub mod domain;
pub mod firewall;
pub mod image;
pub mod ip;
pub mod project;
pub mod server;
pub mod ssh_key;
pub mod storage;
pub mod vpc;

pub use account::{AccountCommand, WhoamiCommand};
pub use apps::AppsCommand;
pub use balancer::BalancerCommand;
pub use cluster::ClusterCommand;
pub use config::ConfigCommand;
pub use database::DatabaseCommand;
pub use domain::DomainCommand;
pub use firewall::FirewallCommand;
pub use image::ImageCommand;
pub use ip::IpCommand;
pub use project::ProjectCommand;
pub use server::ServerCommand;
pub use ssh_key::SshKeyCommand;
pub use storage::StorageCommand;
pub use vpc::VpcCommand;

/// Ask for confirmation on stderr unless `assume_yes` is set. Anything but
/// `y`/`yes` aborts.
pub(crate) fn confirm(what: &str, assume_yes: bool) -> Result<(), CliError> {
    if assume_yes {
        return Ok(());
    }
    let mut stderr = std::io::stderr().lock();
    write!(stderr, "{what} [y/N]: ")?;
    stderr.flush()?;

    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    match line.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" => Ok(()),
        _ => Err(CliError::Aborted),
    }
}

/// Join region wire names for capability error messages.
pub(crate) fn region_names(regions: &[stratus_api::types::Region]) -> String {
    regions
        .iter()
        .map(|r| r.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse `KEY=VALUE` pairs into a JSON object, keeping numeric and boolean
/// values typed. Used for database `config_parameters`.
pub(crate) fn parse_key_value_params(
    params: &[String],
) -> Result<serde_json::Map<String, serde_json::Value>, CliError> {
    let mut map = serde_json::Map::new();
    for param in params {
        let (key, value) = param.split_once('=').ok_or_else(|| {
            CliError::InvalidArgument(format!("invalid parameter '{param}', expected KEY=VALUE"))
        })?;
        let value = if let Ok(n) = value.parse::<i64>() {
            serde_json::Value::from(n)
        } else if let Ok(b) = value.parse::<bool>() {
            serde_json::Value::from(b)
        } else {
            serde_json::Value::from(value)
        };
        map.insert(key.to_string(), value);
    }
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confirm_with_assume_yes_does_not_prompt() {
        confirm("Delete everything?", true).expect("should pass");
    }

    #[test]
    fn key_value_params_keep_types() {
        let params = vec![
            "max_connections=100".to_string(),
            "autovacuum=true".to_string(),
            "wal_level=replica".to_string(),
        ];
        let map = parse_key_value_params(&params).expect("parse");
        assert_eq!(map["max_connections"], 100);
        assert_eq!(map["autovacuum"], true);
        assert_eq!(map["wal_level"], "replica");
    }

    #[test]
    fn key_value_params_reject_missing_equals() {
        let err = parse_key_value_params(&["oops".to_string()]).unwrap_err();
        assert!(err.to_string().contains("KEY=VALUE"));
    }
}
