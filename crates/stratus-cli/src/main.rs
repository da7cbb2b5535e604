//! `stratus` binary entry point.
//!
//! Resolves configuration (flags > environment > profile), builds the API
//! client and dispatches to one command executor. All network work runs on
//! a current-thread tokio runtime; command output goes to stdout, prompts
//! and diagnostics to stderr.

use std::io::Write;
use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use stratus_api::ApiClient;
use stratus_cli::cli::{Cli, Commands};
use stratus_cli::commands::{
    AccountCommand, AppsCommand, BalancerCommand, ClusterCommand, ConfigCommand, DatabaseCommand,
    DomainCommand, FirewallCommand, ImageCommand, IpCommand, ProjectCommand, ServerCommand,
    SshKeyCommand, StorageCommand, VpcCommand, WhoamiCommand,
};
use stratus_cli::config::{self, Config, Profile};
use stratus_cli::error::CliError;
use stratus_cli::output::{Format, Printer};

/// Environment variable holding the API token, overriding the profile.
const TOKEN_ENV: &str = "STRATUS_TOKEN";
/// Environment variable overriding the API endpoint.
const ENDPOINT_ENV: &str = "STRATUS_ENDPOINT";

fn main() -> ExitCode {
    let cli = Cli::parse();
    if cli.verbose {
        init_tracing();
    }
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report(&err);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("stratus=debug,stratus_cli=debug,stratus_api=debug"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), CliError> {
    let stdout = std::io::stdout();
    let mut writer = stdout.lock();

    if matches!(cli.command, Commands::Version) {
        writeln!(writer, "{}", env!("CARGO_PKG_VERSION"))?;
        return Ok(());
    }

    let config_file = config::config_path(cli.config.as_deref())?;
    debug!(config = %config_file.display(), profile = %cli.profile, "resolved config path");

    // Config commands run without a client or token.
    if let Commands::Config { ref command } = cli.command {
        let format = cli.output.unwrap_or_default();
        let executor = ConfigCommand::new(config_file, cli.profile.clone());
        return executor.execute(&mut writer, format, command);
    }

    let profile = load_profile(&config_file, &cli.profile)?;
    let token = resolve_token(profile.as_ref())?;
    let client = match std::env::var(ENDPOINT_ENV) {
        Ok(endpoint) => {
            eprintln!("Warning: {ENDPOINT_ENV} is set, using API endpoint {endpoint}");
            ApiClient::with_base_url(token, endpoint)?
        }
        Err(_) => ApiClient::new(token)?,
    };

    let format = resolve_format(cli.output, profile.as_ref())?;
    debug!(?format, filter = ?cli.filter, "resolved output settings");
    let printer = Printer::new(format).with_filters(cli.filter.clone())?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(dispatch(&cli, &client, profile.as_ref(), &mut writer, &printer))
}

/// Load the requested profile, if the config file exists. A missing file
/// is fine as long as the token comes from the environment.
fn load_profile(path: &Path, name: &str) -> Result<Option<Profile>, CliError> {
    if !path.exists() {
        return Ok(None);
    }
    let config = Config::load(path)?;
    Ok(Some(config.profile(name)?.clone()))
}

/// Token resolution order: `STRATUS_TOKEN`, then the active profile.
fn resolve_token(profile: Option<&Profile>) -> Result<String, CliError> {
    if let Ok(token) = std::env::var(TOKEN_ENV) {
        if !token.is_empty() {
            return Ok(token);
        }
    }
    profile
        .and_then(|p| p.token.clone())
        .ok_or_else(|| {
            CliError::Config(format!(
                "no API token found; run 'stratus config init' or set {TOKEN_ENV}"
            ))
        })
}

/// Format resolution order: `--output`/`STRATUS_OUTPUT_FORMAT` (both land
/// in the flag), then the profile, then the default table format.
fn resolve_format(flag: Option<Format>, profile: Option<&Profile>) -> Result<Format, CliError> {
    if let Some(format) = flag {
        return Ok(format);
    }
    if let Some(profile) = profile {
        if let Some(format) = profile.output()? {
            return Ok(format);
        }
    }
    Ok(Format::Default)
}

async fn dispatch<W: Write>(
    cli: &Cli,
    client: &ApiClient,
    profile: Option<&Profile>,
    writer: &mut W,
    printer: &Printer,
) -> Result<(), CliError> {
    match &cli.command {
        Commands::Account { command } => {
            AccountCommand::new(client)
                .execute(writer, printer, command)
                .await
        }
        Commands::Apps { command } => {
            AppsCommand::new(client)
                .execute(writer, printer, command)
                .await
        }
        Commands::Balancer { command } => {
            BalancerCommand::new(client)
                .execute(writer, printer, command)
                .await
        }
        Commands::Cluster { command } => {
            ClusterCommand::new(client)
                .execute(writer, printer, command)
                .await
        }
        Commands::Database { command } => {
            DatabaseCommand::new(client)
                .execute(writer, printer, command)
                .await
        }
        Commands::Domain { command } => {
            DomainCommand::new(client)
                .execute(writer, printer, command)
                .await
        }
        Commands::Firewall { command } => {
            FirewallCommand::new(client)
                .execute(writer, printer, command)
                .await
        }
        Commands::Image { command } => {
            ImageCommand::new(client)
                .execute(writer, printer, command)
                .await
        }
        Commands::Ip { command } => {
            IpCommand::new(client)
                .execute(writer, printer, command)
                .await
        }
        Commands::Project { command } => {
            ProjectCommand::new(client)
                .execute(writer, printer, command)
                .await
        }
        Commands::Server { command } => {
            // Profile zone wins; a profile with only a region falls back to
            // that region's default zone.
            let zone = match profile.map(Profile::zone).transpose()?.flatten() {
                Some(zone) => Some(zone),
                None => profile
                    .map(Profile::region)
                    .transpose()?
                    .flatten()
                    .map(stratus_api::regions::default_zone),
            };
            ServerCommand::new(client)
                .with_default_zone(zone)
                .execute(writer, printer, command)
                .await
        }
        Commands::SshKey { command } => {
            SshKeyCommand::new(client)
                .execute(writer, printer, command)
                .await
        }
        Commands::Storage { command } => {
            StorageCommand::new(client)
                .execute(writer, printer, command)
                .await
        }
        Commands::Vpc { command } => {
            let region = profile.map(Profile::region).transpose()?.flatten();
            VpcCommand::new(client)
                .with_default_region(region)
                .execute(writer, printer, command)
                .await
        }
        Commands::Whoami => WhoamiCommand::new(client).execute(writer, printer).await,
        // Handled before the client is built.
        Commands::Config { .. } | Commands::Version => Ok(()),
    }
}

/// Print an error to stderr, with a hint where one helps.
fn report(err: &CliError) {
    match err {
        CliError::Api(stratus_api::Error::Unauthorized) => {
            eprintln!("Error: 401 Unauthorized");
            eprintln!("Check the API token, or run 'stratus config init' to set one.");
        }
        CliError::Api(api_err @ (stratus_api::Error::MalformedResponse(_)
        | stratus_api::Error::Unexpected { .. })) => {
            eprintln!("Error: {api_err}");
            eprintln!("Re-run with --verbose for request details.");
        }
        CliError::Api(stratus_api::Error::Api {
            kind,
            status_code,
            error_code,
            message,
            response_id,
        }) => {
            eprintln!("Error: {kind}: {message}");
            if let Some(status) = status_code {
                eprintln!("  status_code: {status}");
            }
            if let Some(code) = error_code {
                eprintln!("  error_code: {code}");
            }
            if let Some(id) = response_id {
                eprintln!("  response_id: {id}");
            }
        }
        CliError::Aborted => eprintln!("Aborted."),
        other => eprintln!("Error: {other}"),
    }
}
