//! Kubernetes cluster commands, including the `group` and `node` subgroups.

use std::io::Write;
use std::path::PathBuf;

use clap::{Args, Subcommand};
use serde_json::{json, Value};
use stratus_api::client::CreateCluster;
use stratus_api::ApiClient;

use super::confirm;
use crate::error::CliError;
use crate::output::{gs, list, lookup, Printer, Table};

/// Cluster subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum ClusterCommands {
    /// List Kubernetes clusters.
    #[command(visible_alias = "ls")]
    List {
        /// Maximum number of items to return.
        #[arg(long, default_value_t = 500)]
        limit: u32,
        /// Number of items to skip.
        #[arg(long, default_value_t = 0)]
        offset: u32,
    },

    /// Show one cluster.
    Get {
        /// Cluster ID.
        id: i64,
    },

    /// Create a Kubernetes cluster.
    #[command(visible_aliases = ["new", "add"])]
    Create(CreateClusterArgs),

    /// Update the cluster description.
    #[command(visible_aliases = ["edit", "update", "upd"])]
    Set {
        /// Cluster ID.
        id: i64,
        /// Cluster description.
        #[arg(long)]
        desc: String,
    },

    /// Remove clusters.
    #[command(visible_alias = "rm")]
    Remove {
        /// Cluster IDs.
        #[arg(required = true)]
        ids: Vec<i64>,
        /// Do not ask for confirmation.
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Print or save the cluster kubeconfig.
    Kubeconfig {
        /// Cluster ID.
        id: i64,
        /// Write the kubeconfig to a file instead of stdout.
        #[arg(long, value_name = "FILE")]
        save: Option<PathBuf>,
    },

    /// Show requested, allocatable and capacity resources.
    Resources {
        /// Cluster ID.
        id: i64,
    },

    /// List node presets.
    ListPresets,

    /// List supported Kubernetes versions.
    ListK8sVersions,

    /// List supported network drivers.
    ListNetworkDrivers,

    /// Manage worker node groups.
    Group {
        /// Group subcommand to execute.
        #[command(subcommand)]
        command: GroupCommands,
    },

    /// Manage worker nodes.
    Node {
        /// Node subcommand to execute.
        #[command(subcommand)]
        command: NodeCommands,
    },
}

/// Arguments for `cluster create`.
#[derive(Args, Debug, Clone)]
pub struct CreateClusterArgs {
    /// Cluster display name.
    #[arg(long)]
    pub name: String,

    /// Cluster description.
    #[arg(long, default_value = "")]
    pub desc: String,

    /// Kubernetes version; see `cluster list-k8s-versions`.
    #[arg(long)]
    pub k8s_version: String,

    /// Network driver; see `cluster list-network-drivers`.
    #[arg(long, default_value = "canal")]
    pub network_driver: String,

    /// Deploy an ingress controller.
    #[arg(long)]
    pub ingress: bool,

    /// Master node preset; see `cluster list-presets`.
    #[arg(long)]
    pub preset_id: i64,

    /// Worker group preset.
    #[arg(long, requires = "worker_count")]
    pub worker_preset_id: Option<i64>,

    /// Worker node count.
    #[arg(long, requires = "worker_preset_id")]
    pub worker_count: Option<u32>,

    /// Worker group name.
    #[arg(long, default_value = "default")]
    pub worker_group_name: String,
}

/// Worker node group subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum GroupCommands {
    /// List node groups in a cluster.
    #[command(visible_alias = "ls")]
    List {
        /// Cluster ID.
        cluster_id: i64,
    },

    /// Create a worker node group.
    #[command(visible_aliases = ["new", "add"])]
    Create {
        /// Cluster ID.
        cluster_id: i64,
        /// Group name.
        #[arg(long)]
        name: String,
        /// Node preset; see `cluster list-presets`.
        #[arg(long)]
        preset_id: i64,
        /// Initial node count.
        #[arg(long, default_value_t = 1)]
        nodes: u32,
    },

    /// Remove a worker node group.
    #[command(visible_alias = "rm")]
    Remove {
        /// Cluster ID.
        cluster_id: i64,
        /// Group ID.
        group_id: i64,
        /// Do not ask for confirmation.
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

/// Worker node subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum NodeCommands {
    /// List worker nodes, either all in a cluster or one group's.
    #[command(visible_alias = "ls")]
    List {
        /// Cluster ID.
        cluster_id: i64,
        /// Only list nodes in this group.
        #[arg(long)]
        group_id: Option<i64>,
    },

    /// Scale a node group up.
    Add {
        /// Cluster ID.
        cluster_id: i64,
        /// Group to scale.
        #[arg(long)]
        group_id: i64,
        /// Nodes to add.
        #[arg(long, default_value_t = 1)]
        count: u32,
    },

    /// Remove worker nodes: one by ID, or scale a group down.
    #[command(visible_alias = "rm")]
    Remove {
        /// Cluster ID.
        cluster_id: i64,
        /// Node ID to remove.
        #[arg(conflicts_with = "group_id")]
        node_id: Option<i64>,
        /// Group to scale down instead of removing one node.
        #[arg(long)]
        group_id: Option<i64>,
        /// Nodes to remove when scaling a group down.
        #[arg(long, default_value_t = 1, requires = "group_id")]
        count: u32,
        /// Do not ask for confirmation.
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

/// Cluster command executor.
pub struct ClusterCommand<'a> {
    client: &'a ApiClient,
}

impl<'a> ClusterCommand<'a> {
    /// Create a new cluster command.
    #[must_use]
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Execute a cluster subcommand.
    pub async fn execute<W: Write>(
        &self,
        writer: &mut W,
        printer: &Printer,
        command: &ClusterCommands,
    ) -> Result<(), CliError> {
        match command {
            ClusterCommands::List { limit, offset } => {
                let response = self.client.get_clusters(*limit, *offset).await?;
                printer.print(writer, &response, render_clusters)?;
            }
            ClusterCommands::Get { id } => {
                let response = self.client.get_cluster(*id).await?;
                printer.print(writer, &response, render_cluster)?;
            }
            ClusterCommands::Create(args) => {
                let worker_groups = match (args.worker_preset_id, args.worker_count) {
                    (Some(preset_id), Some(node_count)) => Some(json!([{
                        "name": args.worker_group_name,
                        "preset_id": preset_id,
                        "node_count": node_count,
                    }])),
                    _ => None,
                };
                let spec = CreateCluster {
                    name: &args.name,
                    description: &args.desc,
                    ha: false,
                    k8s_version: &args.k8s_version,
                    network_driver: &args.network_driver,
                    ingress: args.ingress,
                    preset_id: args.preset_id,
                    worker_groups,
                };
                let response = self.client.create_cluster(&spec).await?;
                printer.print_id(writer, &response, "cluster.id")?;
            }
            ClusterCommands::Set { id, desc } => {
                let response = self.client.update_cluster(*id, desc).await?;
                printer.print_id(writer, &response, "cluster.id")?;
            }
            ClusterCommands::Remove { ids, yes } => {
                confirm(&format!("Remove cluster(s) {ids:?}?"), *yes)?;
                for id in ids {
                    self.client.delete_cluster(*id).await?;
                    writeln!(writer, "{id}")?;
                }
            }
            ClusterCommands::Kubeconfig { id, save } => {
                let response = self.client.get_cluster_kubeconfig(*id).await?;
                match save {
                    Some(path) => {
                        std::fs::write(path, response.text())?;
                        writeln!(writer, "{}", path.display())?;
                    }
                    None => writeln!(writer, "{}", response.text())?,
                }
            }
            ClusterCommands::Resources { id } => {
                let response = self.client.get_cluster_resources(*id).await?;
                printer.print(writer, &response, render_resources)?;
            }
            ClusterCommands::ListPresets => {
                let response = self.client.get_k8s_presets().await?;
                printer.print(writer, &response, render_presets)?;
            }
            ClusterCommands::ListK8sVersions => {
                let response = self.client.get_k8s_versions().await?;
                printer.print(writer, &response, render_versions)?;
            }
            ClusterCommands::ListNetworkDrivers => {
                let response = self.client.get_k8s_network_drivers().await?;
                printer.print(writer, &response, render_network_drivers)?;
            }
            ClusterCommands::Group { command } => {
                self.execute_group(writer, printer, command).await?;
            }
            ClusterCommands::Node { command } => {
                self.execute_node(writer, printer, command).await?;
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
            GroupCommands::List { cluster_id } => {
                let response = self.client.get_node_groups(*cluster_id).await?;
                printer.print(writer, &response, render_groups)?;
            }
            GroupCommands::Create {
                cluster_id,
                name,
                preset_id,
                nodes,
            } => {
                let response = self
                    .client
                    .create_node_group(*cluster_id, name, *preset_id, *nodes)
                    .await?;
                printer.print_id(writer, &response, "node_group.id")?;
            }
            GroupCommands::Remove {
                cluster_id,
                group_id,
                yes,
            } => {
                confirm(&format!("Remove node group {group_id}?"), *yes)?;
                self.client.delete_node_group(*cluster_id, *group_id).await?;
                writeln!(writer, "{group_id}")?;
            }
        }
        Ok(())
    }

    async fn execute_node<W: Write>(
        &self,
        writer: &mut W,
        printer: &Printer,
        command: &NodeCommands,
    ) -> Result<(), CliError> {
        match command {
            NodeCommands::List {
                cluster_id,
                group_id,
            } => {
                let response = match group_id {
                    Some(group_id) => self.client.get_nodes_in_group(*cluster_id, *group_id).await?,
                    None => self.client.get_cluster_nodes(*cluster_id).await?,
                };
                printer.print(writer, &response, render_nodes)?;
            }
            NodeCommands::Add {
                cluster_id,
                group_id,
                count,
            } => {
                let response = self
                    .client
                    .add_nodes_to_group(*cluster_id, *group_id, *count)
                    .await?;
                printer.print(writer, &response, render_nodes)?;
            }
            NodeCommands::Remove {
                cluster_id,
                node_id,
                group_id,
                count,
                yes,
            } => match (node_id, group_id) {
                (Some(node_id), _) => {
                    confirm(&format!("Remove node {node_id}?"), *yes)?;
                    self.client.delete_cluster_node(*cluster_id, *node_id).await?;
                    writeln!(writer, "{node_id}")?;
                }
                (None, Some(group_id)) => {
                    confirm(
                        &format!("Remove {count} node(s) from group {group_id}?"),
                        *yes,
                    )?;
                    self.client
                        .delete_nodes_from_group(*cluster_id, *group_id, *count)
                        .await?;
                    writeln!(writer, "{group_id}")?;
                }
                (None, None) => {
                    return Err(CliError::InvalidArgument(
                        "either NODE_ID or --group-id is required".into(),
                    ));
                }
            },
        }
        Ok(())
    }
}

const CLUSTER_HEADER: [&str; 4] = ["ID", "NAME", "STATUS", "VERSION"];

fn cluster_row(cluster: &Value, table: &mut Table) -> Result<(), CliError> {
    table.row([
        gs(cluster, "id")?,
        gs(cluster, "name")?,
        gs(cluster, "status").unwrap_or_default(),
        gs(cluster, "k8s_version").unwrap_or_default(),
    ]);
    Ok(())
}

fn render_clusters(value: &Value, table: &mut Table) -> Result<(), CliError> {
    table.header(CLUSTER_HEADER);
    for cluster in list(value, "clusters")? {
        cluster_row(cluster, table)?;
    }
    Ok(())
}

fn render_cluster(value: &Value, table: &mut Table) -> Result<(), CliError> {
    table.header(CLUSTER_HEADER);
    let cluster =
        lookup(value, "cluster").ok_or_else(|| CliError::MissingField("cluster".into()))?;
    cluster_row(cluster, table)
}

/// The resources response is a map of resource name to
/// requested/allocatable/capacity/used figures.
fn render_resources(value: &Value, table: &mut Table) -> Result<(), CliError> {
    table.header(["RESOURCE", "REQUESTED", "ALLOCATABLE", "CAPACITY", "USED"]);
    let resources = lookup(value, "resources")
        .ok_or_else(|| CliError::MissingField("resources".into()))?;
    let Value::Object(map) = resources else {
        return Err(CliError::MissingField("resources".into()));
    };
    for (name, figures) in map {
        table.row([
            name.clone(),
            gs(figures, "requested").unwrap_or_default(),
            gs(figures, "allocatable").unwrap_or_default(),
            gs(figures, "capacity").unwrap_or_default(),
            gs(figures, "used").unwrap_or_default(),
        ]);
    }
    Ok(())
}

fn render_presets(value: &Value, table: &mut Table) -> Result<(), CliError> {
    table.header(["ID", "PRICE", "CPU", "RAM (MB)", "DISK (MB)", "TYPE"]);
    for preset in list(value, "k8s_presets")? {
        table.row([
            gs(preset, "id")?,
            gs(preset, "price").unwrap_or_default(),
            gs(preset, "cpu").unwrap_or_default(),
            gs(preset, "ram").unwrap_or_default(),
            gs(preset, "disk").unwrap_or_default(),
            gs(preset, "type").unwrap_or_default(),
        ]);
    }
    Ok(())
}

fn render_versions(value: &Value, table: &mut Table) -> Result<(), CliError> {
    table.header(["VERSION"]);
    for version in list(value, "k8s_versions")? {
        match version {
            Value::String(s) => table.row([s.as_str()]),
            other => table.row([gs(other, "version")?]),
        }
    }
    Ok(())
}

fn render_network_drivers(value: &Value, table: &mut Table) -> Result<(), CliError> {
    table.header(["DRIVER"]);
    for driver in list(value, "network_drivers")? {
        match driver {
            Value::String(s) => table.row([s.as_str()]),
            other => table.row([gs(other, "name")?]),
        }
    }
    Ok(())
}

fn render_groups(value: &Value, table: &mut Table) -> Result<(), CliError> {
    table.header(["ID", "NAME", "CREATED", "PRESET", "NODES"]);
    for group in list(value, "node_groups")? {
        table.row([
            gs(group, "id")?,
            gs(group, "name").unwrap_or_default(),
            gs(group, "created_at").unwrap_or_default(),
            gs(group, "preset_id").unwrap_or_default(),
            gs(group, "node_count").unwrap_or_default(),
        ]);
    }
    Ok(())
}

fn render_nodes(value: &Value, table: &mut Table) -> Result<(), CliError> {
    table.header(["ID", "GROUP", "TYPE", "STATUS", "CREATED", "CPU", "RAM (MB)", "DISK (MB)"]);
    for node in list(value, "nodes")? {
        table.row([
            gs(node, "id")?,
            gs(node, "group_id").unwrap_or_default(),
            gs(node, "type").unwrap_or_default(),
            gs(node, "status").unwrap_or_default(),
            gs(node, "created_at").unwrap_or_default(),
            gs(node, "cpu").unwrap_or_default(),
            gs(node, "ram").unwrap_or_default(),
            gs(node, "disk").unwrap_or_default(),
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

    fn cluster_command(cli: Cli) -> ClusterCommands {
        match cli.command {
            Commands::Cluster { command } => command,
            _ => panic!("expected cluster command"),
        }
    }

    #[test]
    fn parses_create_with_worker_group() {
        let cli = Cli::parse_from([
            "stratus",
            "k8s",
            "create",
            "--name",
            "prod",
            "--k8s-version",
            "1.30.1",
            "--preset-id",
            "399",
            "--worker-preset-id",
            "400",
            "--worker-count",
            "3",
        ]);
        let ClusterCommands::Create(args) = cluster_command(cli) else {
            panic!("expected create");
        };
        assert_eq!(args.worker_preset_id, Some(400));
        assert_eq!(args.worker_count, Some(3));
        assert_eq!(args.network_driver, "canal");
    }

    #[test]
    fn worker_preset_requires_count() {
        let result = Cli::try_parse_from([
            "stratus",
            "cluster",
            "create",
            "--name",
            "prod",
            "--k8s-version",
            "1.30.1",
            "--preset-id",
            "399",
            "--worker-preset-id",
            "400",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn parses_node_remove_by_group() {
        let cli = Cli::parse_from([
            "stratus", "cluster", "node", "rm", "1", "--group-id", "2", "--count", "3", "-y",
        ]);
        assert!(matches!(
            cluster_command(cli),
            ClusterCommands::Node {
                command: NodeCommands::Remove {
                    cluster_id: 1,
                    node_id: None,
                    group_id: Some(2),
                    count: 3,
                    yes: true
                }
            }
        ));
    }

    #[test]
    fn resources_table_lists_each_resource() {
        let value = json!({
            "resources": {
                "cpu": {"requested": 2, "allocatable": 4, "capacity": 4, "used": 1},
                "memory": {"requested": 1024, "allocatable": 4096, "capacity": 4096, "used": 512},
            }
        });
        let mut table = Table::new();
        render_resources(&value, &mut table).expect("render");
        let mut buf = Vec::new();
        table.write(&mut buf).expect("write");
        let output = String::from_utf8(buf).expect("utf8");
        assert!(output.contains("cpu"));
        assert!(output.contains("memory"));
    }
}
