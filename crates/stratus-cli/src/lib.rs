//! # stratus-cli
//!
//! Stratus Cloud command-line interface.
//!
//! Provides commands for:
//! - Cloud Servers, disks and backups
//! - Managed databases
//! - Kubernetes clusters
//! - Object storage, load balancers, domains and DNS
//! - VPCs, firewalls, floating IPs and the app platform
//!
//! # Architecture
//!
//! The CLI talks to the Stratus Cloud REST API through the
//! [`stratus_api::ApiClient`]. Each resource family has one module under
//! [`commands`] translating flags into a single API call, and the response
//! is rendered by the [`output`] layer as a table, JSON, YAML, or raw text.
//!
//! ```text
//! ┌──────────┐      REST (HTTPS)      ┌─────────────────┐
//! │ stratus  │◄──────────────────────►│ api.stratus.cloud│
//! └──────────┘                        └─────────────────┘
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;

pub use cli::{Cli, Commands};
pub use config::Config;
pub use error::CliError;
pub use output::{Format, Printer, Table};
