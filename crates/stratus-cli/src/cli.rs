//! Command-line argument parsing with clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::account::AccountCommands;
use crate::commands::apps::AppsCommands;
use crate::commands::balancer::BalancerCommands;
use crate::commands::cluster::ClusterCommands;
use crate::commands::config::ConfigCommands;
use crate::commands::database::DatabaseCommands;
use crate::commands::domain::DomainCommands;
use crate::commands::firewall::FirewallCommands;
use crate::commands::image::ImageCommands;
use crate::commands::ip::IpCommands;
use crate::commands::project::ProjectCommands;
use crate::commands::server::ServerCommands;
use crate::commands::ssh_key::SshKeyCommands;
use crate::commands::storage::StorageCommands;
use crate::commands::vpc::VpcCommands;
use crate::config::DEFAULT_PROFILE;
use crate::output::Format;

/// Stratus Cloud command-line client.
#[derive(Parser, Debug, Clone)]
#[command(name = "stratus")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Config file path.
    #[arg(
        short = 'c',
        long,
        global = true,
        env = "STRATUS_CONFIG_FILE",
        value_name = "FILE"
    )]
    pub config: Option<PathBuf>,

    /// Profile from the config file.
    #[arg(
        short = 'p',
        long,
        global = true,
        env = "STRATUS_PROFILE",
        default_value = DEFAULT_PROFILE
    )]
    pub profile: String,

    /// Output format.
    #[arg(short = 'o', long, global = true, env = "STRATUS_OUTPUT_FORMAT", value_enum)]
    pub output: Option<Format>,

    /// Filter list output, e.g. `status:on,location:us-1`.
    #[arg(short = 'f', long, global = true, value_name = "KEY:VALUE[,...]")]
    pub filter: Option<String>,

    /// Enable debug logging to stderr.
    #[arg(short = 'v', long, global = true, env = "STRATUS_DEBUG")]
    pub verbose: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Account status, finances and access restrictions.
    Account {
        /// Account subcommand to execute.
        #[command(subcommand)]
        command: AccountCommands,
    },

    /// App platform deployments.
    Apps {
        /// Apps subcommand to execute.
        #[command(subcommand)]
        command: AppsCommands,
    },

    /// Load balancers.
    #[command(visible_aliases = ["balancers", "lb"])]
    Balancer {
        /// Balancer subcommand to execute.
        #[command(subcommand)]
        command: BalancerCommands,
    },

    /// Kubernetes clusters.
    #[command(visible_aliases = ["clusters", "kubernetes", "k8s"])]
    Cluster {
        /// Cluster subcommand to execute.
        #[command(subcommand)]
        command: ClusterCommands,
    },

    /// Manage CLI configuration.
    Config {
        /// Config subcommand to execute.
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Managed databases.
    #[command(visible_aliases = ["databases", "db"])]
    Database {
        /// Database subcommand to execute.
        #[command(subcommand)]
        command: DatabaseCommands,
    },

    /// Domains and DNS records.
    #[command(visible_aliases = ["domains", "d"])]
    Domain {
        /// Domain subcommand to execute.
        #[command(subcommand)]
        command: DomainCommands,
    },

    /// Firewall groups and rules.
    #[command(visible_alias = "fw")]
    Firewall {
        /// Firewall subcommand to execute.
        #[command(subcommand)]
        command: FirewallCommands,
    },

    /// Customer images.
    #[command(visible_aliases = ["images", "i"])]
    Image {
        /// Image subcommand to execute.
        #[command(subcommand)]
        command: ImageCommands,
    },

    /// Floating IP addresses.
    #[command(visible_alias = "ips")]
    Ip {
        /// Floating IP subcommand to execute.
        #[command(subcommand)]
        command: IpCommands,
    },

    /// Projects.
    #[command(visible_aliases = ["projects", "p"])]
    Project {
        /// Project subcommand to execute.
        #[command(subcommand)]
        command: ProjectCommands,
    },

    /// Cloud Servers.
    #[command(visible_aliases = ["servers", "s"])]
    Server {
        /// Server subcommand to execute.
        #[command(subcommand)]
        command: ServerCommands,
    },

    /// SSH keys.
    #[command(visible_aliases = ["ssh-keys", "k"])]
    SshKey {
        /// SSH key subcommand to execute.
        #[command(subcommand)]
        command: SshKeyCommands,
    },

    /// Object storage buckets.
    #[command(visible_alias = "s3")]
    Storage {
        /// Storage subcommand to execute.
        #[command(subcommand)]
        command: StorageCommands,
    },

    /// VPC networks.
    #[command(visible_aliases = ["vpcs", "network"])]
    Vpc {
        /// VPC subcommand to execute.
        #[command(subcommand)]
        command: VpcCommands,
    },

    /// Show the current account identity.
    Whoami,

    /// Print the CLI version.
    Version,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn cli_parses_whoami() {
        let cli = Cli::parse_from(["stratus", "whoami"]);
        assert!(matches!(cli.command, Commands::Whoami));
    }

    #[test]
    fn cli_respects_output_flag() {
        let cli = Cli::parse_from(["stratus", "-o", "json", "whoami"]);
        assert_eq!(cli.output, Some(Format::Json));
    }

    #[test]
    fn cli_default_profile() {
        let cli = Cli::parse_from(["stratus", "whoami"]);
        assert_eq!(cli.profile, "default");
    }

    #[test]
    fn cli_profile_flag() {
        let cli = Cli::parse_from(["stratus", "-p", "staging", "whoami"]);
        assert_eq!(cli.profile, "staging");
    }

    #[test]
    fn cli_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["stratus", "server", "list", "-o", "yaml"]);
        assert_eq!(cli.output, Some(Format::Yaml));
    }

    #[test]
    fn cli_resource_aliases() {
        let cli = Cli::parse_from(["stratus", "s", "list"]);
        assert!(matches!(cli.command, Commands::Server { .. }));

        let cli = Cli::parse_from(["stratus", "k8s", "list"]);
        assert!(matches!(cli.command, Commands::Cluster { .. }));

        let cli = Cli::parse_from(["stratus", "lb", "list"]);
        assert!(matches!(cli.command, Commands::Balancer { .. }));

        let cli = Cli::parse_from(["stratus", "s3", "list"]);
        assert!(matches!(cli.command, Commands::Storage { .. }));

        let cli = Cli::parse_from(["stratus", "fw", "group", "list"]);
        assert!(matches!(cli.command, Commands::Firewall { .. }));
    }

    #[test]
    fn cli_filter_flag() {
        let cli = Cli::parse_from(["stratus", "server", "list", "-f", "status:on"]);
        assert_eq!(cli.filter.as_deref(), Some("status:on"));
    }
}
