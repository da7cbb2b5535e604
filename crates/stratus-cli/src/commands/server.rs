//! Cloud Server commands.
//!
//! Covers the server lifecycle (create/set/remove, power actions, clone,
//! boot and NAT mode, event history), the catalog listings (presets, OS
//! images, software, configurators), and the `disk` and `backup` subgroups.

use std::io::Write;
use std::path::PathBuf;

use clap::{Args, Subcommand};
use serde_json::{json, Value};
use stratus_api::client::{AutoBackupSettings, CreateServer, UpdateServer};
use stratus_api::types::{
    AvailabilityZone, BackupAction, BackupInterval, BootMode, IpVersion, LogOrder, NatMode,
    ServerAction, ServerConfiguration,
};
use stratus_api::ApiClient;

use super::confirm;
use crate::error::CliError;
use crate::output::{gs, list, lookup, Printer, Table};

/// Server subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum ServerCommands {
    /// List Cloud Servers.
    #[command(visible_alias = "ls")]
    List {
        /// Maximum number of items to return.
        #[arg(long, default_value_t = 500)]
        limit: u32,
        /// Number of items to skip.
        #[arg(long, default_value_t = 0)]
        offset: u32,
    },

    /// Show one Cloud Server.
    Get {
        /// Server ID.
        id: i64,
    },

    /// Create a Cloud Server.
    #[command(visible_aliases = ["new", "add"])]
    Create(CreateArgs),

    /// Update Cloud Server properties.
    #[command(visible_aliases = ["edit", "update", "upd"])]
    Set(SetArgs),

    /// Remove Cloud Servers.
    #[command(visible_alias = "rm")]
    Remove {
        /// Server IDs.
        #[arg(required = true)]
        ids: Vec<i64>,
        /// Do not ask for confirmation.
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Start a Cloud Server.
    Start {
        /// Server ID.
        id: i64,
    },

    /// Shut a Cloud Server down.
    #[command(visible_alias = "shutdown")]
    Stop {
        /// Server ID.
        id: i64,
        /// Power off without a graceful shutdown.
        #[arg(long)]
        hard: bool,
    },

    /// Reboot a Cloud Server.
    Reboot {
        /// Server ID.
        id: i64,
        /// Reset instead of a graceful reboot.
        #[arg(long)]
        hard: bool,
    },

    /// Clone a Cloud Server with its disks.
    Clone {
        /// Server ID.
        id: i64,
    },

    /// Reset the root password.
    ResetPassword {
        /// Server ID.
        id: i64,
        /// Do not ask for confirmation.
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Select the server boot mode.
    BootMode {
        /// Server ID.
        id: i64,
        /// Boot mode: default, single or recovery.
        mode: BootMode,
    },

    /// Select the NAT mode for a LAN-attached server.
    NatMode {
        /// Server ID.
        id: i64,
        /// NAT mode: dnat_and_snat, snat or no_nat.
        mode: NatMode,
    },

    /// Show the server event history.
    History {
        /// Server ID.
        id: i64,
        /// Maximum number of events.
        #[arg(long, default_value_t = 100)]
        limit: u32,
        /// Sort order: asc or desc.
        #[arg(long, default_value = "asc")]
        order: LogOrder,
    },

    /// List fixed server presets.
    ListPresets,

    /// List installable operating system images.
    ListOsImages,

    /// List installable software bundles.
    ListSoftware,

    /// List custom sizing configurators.
    ListConfigurators,

    /// Manage attached IP addresses.
    Ip {
        /// IP subcommand to execute.
        #[command(subcommand)]
        command: ServerIpCommands,
    },

    /// Manage server disks.
    Disk {
        /// Disk subcommand to execute.
        #[command(subcommand)]
        command: DiskCommands,
    },

    /// Manage server disk backups.
    Backup {
        /// Backup subcommand to execute.
        #[command(subcommand)]
        command: BackupCommands,
    },
}

/// Arguments for `server create`.
#[derive(Args, Debug, Clone)]
pub struct CreateArgs {
    /// Server display name.
    #[arg(long)]
    pub name: String,

    /// Fixed preset ID; see `server list-presets`.
    #[arg(long, conflicts_with_all = ["cpu", "ram", "disk", "configurator_id"])]
    pub preset_id: Option<i64>,

    /// CPU cores for a custom configuration.
    #[arg(long, requires_all = ["ram", "disk", "configurator_id"])]
    pub cpu: Option<i64>,

    /// RAM in megabytes for a custom configuration.
    #[arg(long)]
    pub ram: Option<i64>,

    /// Disk size in megabytes for a custom configuration.
    #[arg(long)]
    pub disk: Option<i64>,

    /// Configurator ID; see `server list-configurators`.
    #[arg(long)]
    pub configurator_id: Option<i64>,

    /// Operating system image ID; see `server list-os-images`.
    #[arg(long, conflicts_with = "image")]
    pub os: Option<i64>,

    /// Customer image ID.
    #[arg(long)]
    pub image: Option<String>,

    /// Network bandwidth in Mbit/s.
    #[arg(long, default_value_t = 200)]
    pub bandwidth: u32,

    /// Free-form comment.
    #[arg(long)]
    pub comment: Option<String>,

    /// Software bundle ID; see `server list-software`.
    #[arg(long)]
    pub software_id: Option<i64>,

    /// SSH key to install; may be given multiple times.
    #[arg(long = "ssh-key", value_name = "ID")]
    pub ssh_keys: Vec<i64>,

    /// Enable DDoS protection.
    #[arg(long)]
    pub ddos_guard: bool,

    /// Attach to a VPC by ID.
    #[arg(long, value_name = "VPC_ID")]
    pub network: Option<String>,

    /// Private address in the attached VPC.
    #[arg(long, requires = "network")]
    pub private_ip: Option<String>,

    /// Availability zone; profile default when omitted.
    #[arg(long)]
    pub availability_zone: Option<AvailabilityZone>,

    /// Ask for a root password even when SSH keys are installed.
    #[arg(long)]
    pub root_password: bool,

    /// Project to place the server into.
    #[arg(long)]
    pub project_id: Option<i64>,

    /// Read cloud-init user data from a file.
    #[arg(long, value_name = "FILE")]
    pub user_data: Option<PathBuf>,
}

/// Arguments for `server set`.
#[derive(Args, Debug, Clone)]
pub struct SetArgs {
    /// Server ID.
    pub id: i64,

    /// Server display name.
    #[arg(long)]
    pub name: Option<String>,

    /// Free-form comment.
    #[arg(long)]
    pub comment: Option<String>,

    /// Fixed preset ID to resize to.
    #[arg(long, conflicts_with_all = ["cpu", "ram", "disk", "configurator_id"])]
    pub preset_id: Option<i64>,

    /// CPU cores for a custom configuration.
    #[arg(long, requires_all = ["ram", "disk", "configurator_id"])]
    pub cpu: Option<i64>,

    /// RAM in megabytes for a custom configuration.
    #[arg(long)]
    pub ram: Option<i64>,

    /// Disk size in megabytes for a custom configuration.
    #[arg(long)]
    pub disk: Option<i64>,

    /// Configurator ID.
    #[arg(long)]
    pub configurator_id: Option<i64>,

    /// Reinstall from an operating system image.
    #[arg(long, conflicts_with = "image")]
    pub os: Option<i64>,

    /// Reinstall from a customer image.
    #[arg(long)]
    pub image: Option<String>,

    /// Software bundle ID.
    #[arg(long)]
    pub software_id: Option<i64>,

    /// Network bandwidth in Mbit/s.
    #[arg(long)]
    pub bandwidth: Option<u32>,
}

/// Attached IP subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum ServerIpCommands {
    /// List IP addresses attached to a server.
    #[command(visible_alias = "ls")]
    List {
        /// Server ID.
        server_id: i64,
    },

    /// Attach a new IP address.
    Add {
        /// Server ID.
        server_id: i64,
        /// IP version: ipv4 or ipv6.
        #[arg(long, default_value = "ipv4")]
        version: IpVersion,
        /// PTR record for the new address.
        #[arg(long)]
        ptr: Option<String>,
    },

    /// Update the PTR record of an attached address.
    #[command(visible_aliases = ["edit", "update", "upd"])]
    Set {
        /// Server ID.
        server_id: i64,
        /// Attached IP address.
        ip: String,
        /// New PTR record.
        #[arg(long)]
        ptr: String,
    },

    /// Detach an IP address.
    #[command(visible_alias = "rm")]
    Remove {
        /// Server ID.
        server_id: i64,
        /// Attached IP address.
        ip: String,
        /// Do not ask for confirmation.
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

/// Disk subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum DiskCommands {
    /// List server disks.
    #[command(visible_alias = "ls")]
    List {
        /// Server ID.
        server_id: i64,
    },

    /// Show one disk.
    Get {
        /// Server ID.
        server_id: i64,
        /// Disk ID.
        disk_id: i64,
    },

    /// Add a secondary disk.
    Add {
        /// Server ID.
        server_id: i64,
        /// Disk size in megabytes.
        #[arg(long)]
        size: i64,
    },

    /// Grow a disk.
    Resize {
        /// Server ID.
        server_id: i64,
        /// Disk ID.
        disk_id: i64,
        /// New size in megabytes.
        #[arg(long)]
        size: i64,
    },

    /// Remove a disk.
    #[command(visible_alias = "rm")]
    Remove {
        /// Server ID.
        server_id: i64,
        /// Disk ID.
        disk_id: i64,
        /// Do not ask for confirmation.
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

/// Disk backup subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum BackupCommands {
    /// List backups of a disk.
    #[command(visible_alias = "ls")]
    List {
        /// Server ID.
        server_id: i64,
        /// Disk ID.
        disk_id: i64,
    },

    /// Show one backup.
    Get {
        /// Server ID.
        server_id: i64,
        /// Disk ID.
        disk_id: i64,
        /// Backup ID.
        backup_id: i64,
    },

    /// Create a backup.
    Create {
        /// Server ID.
        server_id: i64,
        /// Disk ID.
        disk_id: i64,
        /// Backup comment.
        #[arg(long)]
        comment: Option<String>,
    },

    /// Update a backup comment.
    #[command(visible_aliases = ["edit", "update", "upd"])]
    Set {
        /// Server ID.
        server_id: i64,
        /// Disk ID.
        disk_id: i64,
        /// Backup ID.
        backup_id: i64,
        /// Backup comment.
        #[arg(long)]
        comment: String,
    },

    /// Remove a backup.
    #[command(visible_alias = "rm")]
    Remove {
        /// Server ID.
        server_id: i64,
        /// Disk ID.
        disk_id: i64,
        /// Backup ID.
        backup_id: i64,
        /// Do not ask for confirmation.
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Restore a disk from a backup.
    Restore {
        /// Server ID.
        server_id: i64,
        /// Disk ID.
        disk_id: i64,
        /// Backup ID.
        backup_id: i64,
        /// Do not ask for confirmation.
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Mount a backup as a secondary disk.
    Mount {
        /// Server ID.
        server_id: i64,
        /// Disk ID.
        disk_id: i64,
        /// Backup ID.
        backup_id: i64,
    },

    /// Unmount a mounted backup.
    Unmount {
        /// Server ID.
        server_id: i64,
        /// Disk ID.
        disk_id: i64,
        /// Backup ID.
        backup_id: i64,
    },

    /// Show or change the auto-backup schedule of a disk.
    Schedule(ScheduleArgs),
}

/// Arguments for `server backup schedule`. Without change flags the current
/// settings are shown.
#[derive(Args, Debug, Clone)]
pub struct ScheduleArgs {
    /// Server ID.
    pub server_id: i64,

    /// Disk ID.
    pub disk_id: i64,

    /// Enable the schedule.
    #[arg(long, conflicts_with = "disable")]
    pub enable: bool,

    /// Disable the schedule.
    #[arg(long)]
    pub disable: bool,

    /// Number of retained copies.
    #[arg(long)]
    pub copy_count: Option<u32>,

    /// Day of month (1-31) to start on.
    #[arg(long)]
    pub start_day: Option<u32>,

    /// Backup interval: day, week or month.
    #[arg(long)]
    pub interval: Option<BackupInterval>,

    /// Day of week (1-7) for weekly schedules.
    #[arg(long)]
    pub day_of_week: Option<u32>,
}

impl ScheduleArgs {
    fn is_update(&self) -> bool {
        self.enable
            || self.disable
            || self.copy_count.is_some()
            || self.start_day.is_some()
            || self.interval.is_some()
            || self.day_of_week.is_some()
    }
}

/// Server command executor.
pub struct ServerCommand<'a> {
    client: &'a ApiClient,
    default_zone: Option<AvailabilityZone>,
}

impl<'a> ServerCommand<'a> {
    /// Create a new server command.
    #[must_use]
    pub fn new(client: &'a ApiClient) -> Self {
        Self {
            client,
            default_zone: None,
        }
    }

    /// Availability zone to use when `--availability-zone` is omitted.
    #[must_use]
    pub fn with_default_zone(mut self, zone: Option<AvailabilityZone>) -> Self {
        self.default_zone = zone;
        self
    }

    /// Execute a server subcommand.
    pub async fn execute<W: Write>(
        &self,
        writer: &mut W,
        printer: &Printer,
        command: &ServerCommands,
    ) -> Result<(), CliError> {
        match command {
            ServerCommands::List { limit, offset } => {
                let response = self.client.get_servers(*limit, *offset).await?;
                printer.print(writer, &response, render_servers)?;
            }
            ServerCommands::Get { id } => {
                let response = self.client.get_server(*id).await?;
                printer.print(writer, &response, render_server)?;
            }
            ServerCommands::Create(args) => {
                let spec = self.build_create_spec(args)?;
                let response = self.client.create_server(&spec).await?;
                printer.print_id(writer, &response, "server.id")?;
            }
            ServerCommands::Set(args) => {
                let spec = build_update_spec(args)?;
                let response = self.client.update_server(args.id, &spec).await?;
                printer.print_id(writer, &response, "server.id")?;
            }
            ServerCommands::Remove { ids, yes } => {
                confirm(&format!("Remove server(s) {ids:?}?"), *yes)?;
                for id in ids {
                    self.client.delete_server(*id).await?;
                    writeln!(writer, "{id}")?;
                }
            }
            ServerCommands::Start { id } => {
                self.action(writer, *id, ServerAction::Start).await?;
            }
            ServerCommands::Stop { id, hard } => {
                let action = if *hard {
                    ServerAction::HardShutdown
                } else {
                    ServerAction::Shutdown
                };
                self.action(writer, *id, action).await?;
            }
            ServerCommands::Reboot { id, hard } => {
                let action = if *hard {
                    ServerAction::HardReboot
                } else {
                    ServerAction::Reboot
                };
                self.action(writer, *id, action).await?;
            }
            ServerCommands::Clone { id } => {
                let response = self.client.clone_server(*id).await?;
                printer.print_id(writer, &response, "server.id")?;
            }
            ServerCommands::ResetPassword { id, yes } => {
                confirm(&format!("Reset root password on server {id}?"), *yes)?;
                self.action(writer, *id, ServerAction::ResetPassword).await?;
            }
            ServerCommands::BootMode { id, mode } => {
                self.client.set_server_boot_mode(*id, *mode).await?;
                writeln!(writer, "{id}")?;
            }
            ServerCommands::NatMode { id, mode } => {
                self.client.set_server_nat_mode(*id, *mode).await?;
                writeln!(writer, "{id}")?;
            }
            ServerCommands::History { id, limit, order } => {
                let response = self.client.get_server_logs(*id, *limit, *order).await?;
                printer.print(writer, &response, render_logs)?;
            }
            ServerCommands::ListPresets => {
                let response = self.client.get_server_presets().await?;
                printer.print(writer, &response, render_presets)?;
            }
            ServerCommands::ListOsImages => {
                let response = self.client.get_server_os_images().await?;
                printer.print(writer, &response, render_os_images)?;
            }
            ServerCommands::ListSoftware => {
                let response = self.client.get_server_software().await?;
                printer.print(writer, &response, render_software)?;
            }
            ServerCommands::ListConfigurators => {
                let response = self.client.get_server_configurators().await?;
                printer.print(writer, &response, render_configurators)?;
            }
            ServerCommands::Ip { command } => {
                self.execute_ip(writer, printer, command).await?;
            }
            ServerCommands::Disk { command } => {
                self.execute_disk(writer, printer, command).await?;
            }
            ServerCommands::Backup { command } => {
                self.execute_backup(writer, printer, command).await?;
            }
        }
        Ok(())
    }

    async fn action<W: Write>(
        &self,
        writer: &mut W,
        id: i64,
        action: ServerAction,
    ) -> Result<(), CliError> {
        self.client.do_server_action(id, action).await?;
        writeln!(writer, "{id}")?;
        Ok(())
    }

    fn build_create_spec(&self, args: &CreateArgs) -> Result<CreateServer, CliError> {
        if args.preset_id.is_none() && args.cpu.is_none() {
            return Err(CliError::InvalidArgument(
                "either --preset-id or --cpu/--ram/--disk/--configurator-id is required".into(),
            ));
        }
        if args.os.is_none() && args.image.is_none() {
            return Err(CliError::InvalidArgument(
                "either --os or --image is required".into(),
            ));
        }

        let configuration = match (args.cpu, args.ram, args.disk, args.configurator_id) {
            (Some(cpu), Some(ram), Some(disk), Some(configurator_id)) => {
                Some(ServerConfiguration {
                    configurator_id,
                    disk,
                    cpu,
                    ram,
                })
            }
            _ => None,
        };

        let cloud_init = args
            .user_data
            .as_ref()
            .map(|path| {
                std::fs::read_to_string(path).map_err(|e| {
                    CliError::InvalidArgument(format!("cannot read {}: {e}", path.display()))
                })
            })
            .transpose()?;

        let network = args.network.as_ref().map(|id| match &args.private_ip {
            Some(ip) => json!({ "id": id, "ip": ip }),
            None => json!({ "id": id }),
        });

        Ok(CreateServer {
            name: args.name.clone(),
            bandwidth: args.bandwidth,
            configuration,
            preset_id: args.preset_id,
            os_id: args.os,
            image_id: args.image.clone(),
            comment: args.comment.clone(),
            software_id: args.software_id,
            ssh_keys_ids: if args.ssh_keys.is_empty() {
                None
            } else {
                Some(args.ssh_keys.clone())
            },
            is_ddos_guard: args.ddos_guard,
            network,
            availability_zone: args.availability_zone.or(self.default_zone),
            is_root_password_required: args.root_password.then_some(true),
            project_id: args.project_id,
            cloud_init,
        })
    }

    async fn execute_ip<W: Write>(
        &self,
        writer: &mut W,
        printer: &Printer,
        command: &ServerIpCommands,
    ) -> Result<(), CliError> {
        match command {
            ServerIpCommands::List { server_id } => {
                let response = self.client.get_server_ips(*server_id).await?;
                printer.print(writer, &response, render_server_ips)?;
            }
            ServerIpCommands::Add {
                server_id,
                version,
                ptr,
            } => {
                let response = self
                    .client
                    .add_server_ip(*server_id, *version, ptr.as_deref())
                    .await?;
                printer.print_id(writer, &response, "server_ip.ip")?;
            }
            ServerIpCommands::Set { server_id, ip, ptr } => {
                let response = self.client.update_server_ip(*server_id, ip, ptr).await?;
                printer.print_id(writer, &response, "server_ip.ip")?;
            }
            ServerIpCommands::Remove { server_id, ip, yes } => {
                confirm(&format!("Detach IP {ip} from server {server_id}?"), *yes)?;
                self.client.delete_server_ip(*server_id, ip).await?;
                writeln!(writer, "{ip}")?;
            }
        }
        Ok(())
    }

    async fn execute_disk<W: Write>(
        &self,
        writer: &mut W,
        printer: &Printer,
        command: &DiskCommands,
    ) -> Result<(), CliError> {
        match command {
            DiskCommands::List { server_id } => {
                let response = self.client.get_disks(*server_id).await?;
                printer.print(writer, &response, render_disks)?;
            }
            DiskCommands::Get { server_id, disk_id } => {
                let response = self.client.get_disk(*server_id, *disk_id).await?;
                printer.print(writer, &response, render_disk)?;
            }
            DiskCommands::Add { server_id, size } => {
                let response = self.client.add_disk(*server_id, *size).await?;
                printer.print_id(writer, &response, "server_disk.id")?;
            }
            DiskCommands::Resize {
                server_id,
                disk_id,
                size,
            } => {
                let response = self.client.update_disk(*server_id, *disk_id, *size).await?;
                printer.print_id(writer, &response, "server_disk.id")?;
            }
            DiskCommands::Remove {
                server_id,
                disk_id,
                yes,
            } => {
                confirm(&format!("Remove disk {disk_id}?"), *yes)?;
                self.client.delete_disk(*server_id, *disk_id).await?;
                writeln!(writer, "{disk_id}")?;
            }
        }
        Ok(())
    }

    async fn execute_backup<W: Write>(
        &self,
        writer: &mut W,
        printer: &Printer,
        command: &BackupCommands,
    ) -> Result<(), CliError> {
        match command {
            BackupCommands::List { server_id, disk_id } => {
                let response = self.client.get_disk_backups(*server_id, *disk_id).await?;
                printer.print(writer, &response, render_backups)?;
            }
            BackupCommands::Get {
                server_id,
                disk_id,
                backup_id,
            } => {
                let response = self
                    .client
                    .get_disk_backup(*server_id, *disk_id, *backup_id)
                    .await?;
                printer.print(writer, &response, render_backup)?;
            }
            BackupCommands::Create {
                server_id,
                disk_id,
                comment,
            } => {
                let response = self
                    .client
                    .create_disk_backup(*server_id, *disk_id, comment.as_deref())
                    .await?;
                printer.print_id(writer, &response, "backup.id")?;
            }
            BackupCommands::Set {
                server_id,
                disk_id,
                backup_id,
                comment,
            } => {
                let response = self
                    .client
                    .update_disk_backup(*server_id, *disk_id, *backup_id, comment)
                    .await?;
                printer.print_id(writer, &response, "backup.id")?;
            }
            BackupCommands::Remove {
                server_id,
                disk_id,
                backup_id,
                yes,
            } => {
                confirm(&format!("Remove backup {backup_id}?"), *yes)?;
                self.client
                    .delete_disk_backup(*server_id, *disk_id, *backup_id)
                    .await?;
                writeln!(writer, "{backup_id}")?;
            }
            BackupCommands::Restore {
                server_id,
                disk_id,
                backup_id,
                yes,
            } => {
                confirm(
                    &format!("Restore disk {disk_id} from backup {backup_id}? Current data will be lost"),
                    *yes,
                )?;
                self.backup_action(writer, *server_id, *disk_id, *backup_id, BackupAction::Restore)
                    .await?;
            }
            BackupCommands::Mount {
                server_id,
                disk_id,
                backup_id,
            } => {
                self.backup_action(writer, *server_id, *disk_id, *backup_id, BackupAction::Mount)
                    .await?;
            }
            BackupCommands::Unmount {
                server_id,
                disk_id,
                backup_id,
            } => {
                self.backup_action(writer, *server_id, *disk_id, *backup_id, BackupAction::Unmount)
                    .await?;
            }
            BackupCommands::Schedule(args) => {
                if args.is_update() {
                    let settings = AutoBackupSettings {
                        is_enabled: if args.enable {
                            Some(true)
                        } else if args.disable {
                            Some(false)
                        } else {
                            None
                        },
                        copy_count: args.copy_count,
                        creation_start_at: args.start_day,
                        interval: args.interval,
                        day_of_week: args.day_of_week,
                    };
                    let response = self
                        .client
                        .update_disk_autobackup_settings(args.server_id, args.disk_id, &settings)
                        .await?;
                    printer.print(writer, &response, render_autobackup_settings)?;
                } else {
                    let response = self
                        .client
                        .get_disk_autobackup_settings(args.server_id, args.disk_id)
                        .await?;
                    printer.print(writer, &response, render_autobackup_settings)?;
                }
            }
        }
        Ok(())
    }

    async fn backup_action<W: Write>(
        &self,
        writer: &mut W,
        server_id: i64,
        disk_id: i64,
        backup_id: i64,
        action: BackupAction,
    ) -> Result<(), CliError> {
        self.client
            .do_disk_backup_action(server_id, disk_id, backup_id, action)
            .await?;
        writeln!(writer, "{backup_id}")?;
        Ok(())
    }
}

fn build_update_spec(args: &SetArgs) -> Result<UpdateServer, CliError> {
    let configuration = match (args.cpu, args.ram, args.disk, args.configurator_id) {
        (Some(cpu), Some(ram), Some(disk), Some(configurator_id)) => Some(ServerConfiguration {
            configurator_id,
            disk,
            cpu,
            ram,
        }),
        _ => None,
    };
    Ok(UpdateServer {
        name: args.name.clone(),
        bandwidth: args.bandwidth,
        configuration,
        preset_id: args.preset_id,
        os_id: args.os,
        image_id: args.image.clone(),
        software_id: args.software_id,
        comment: args.comment.clone(),
    })
}

/// Value at a path rendered for a cell, empty when absent.
fn opt(value: &Value, path: &str) -> String {
    gs(value, path).unwrap_or_default()
}

/// The main public IPv4 address of a server, if any.
fn main_ipv4(server: &Value) -> String {
    let Some(networks) = lookup(server, "networks").and_then(Value::as_array) else {
        return String::new();
    };
    for network in networks {
        let Some(ips) = lookup(network, "ips").and_then(Value::as_array) else {
            continue;
        };
        for ip in ips {
            let is_main = lookup(ip, "is_main").and_then(Value::as_bool).unwrap_or(false);
            let is_v4 = lookup(ip, "type").and_then(Value::as_str) == Some("ipv4");
            if is_main && is_v4 {
                return opt(ip, "ip");
            }
        }
    }
    String::new()
}

const SERVER_HEADER: [&str; 5] = ["ID", "NAME", "REGION", "STATUS", "IPV4"];

fn server_row(server: &Value, table: &mut Table) -> Result<(), CliError> {
    table.row([
        gs(server, "id")?,
        gs(server, "name")?,
        opt(server, "location"),
        opt(server, "status"),
        main_ipv4(server),
    ]);
    Ok(())
}

fn render_servers(value: &Value, table: &mut Table) -> Result<(), CliError> {
    table.header(SERVER_HEADER);
    for server in list(value, "servers")? {
        server_row(server, table)?;
    }
    Ok(())
}

fn render_server(value: &Value, table: &mut Table) -> Result<(), CliError> {
    table.header(SERVER_HEADER);
    let server = lookup(value, "server").ok_or_else(|| CliError::MissingField("server".into()))?;
    server_row(server, table)
}

fn render_server_ips(value: &Value, table: &mut Table) -> Result<(), CliError> {
    table.header(["ADDRESS", "VERSION", "PTR", "PRIMARY"]);
    for network in list(value, "server_ips")? {
        table.row([
            gs(network, "ip")?,
            opt(network, "type"),
            opt(network, "ptr"),
            opt(network, "is_main"),
        ]);
    }
    Ok(())
}

fn render_logs(value: &Value, table: &mut Table) -> Result<(), CliError> {
    table.header(["ID", "LOGGED AT", "EVENT"]);
    for event in list(value, "server_logs")? {
        table.row([
            gs(event, "id")?,
            opt(event, "logged_at"),
            opt(event, "event"),
        ]);
    }
    Ok(())
}

fn render_presets(value: &Value, table: &mut Table) -> Result<(), CliError> {
    table.header(["ID", "REGION", "PRICE", "CPU", "FREQ", "RAM", "DISK", "BANDWIDTH"]);
    for preset in list(value, "server_presets")? {
        table.row([
            gs(preset, "id")?,
            opt(preset, "location"),
            opt(preset, "price"),
            opt(preset, "cpu"),
            opt(preset, "cpu_frequency"),
            opt(preset, "ram"),
            opt(preset, "disk"),
            opt(preset, "bandwidth"),
        ]);
    }
    Ok(())
}

fn render_os_images(value: &Value, table: &mut Table) -> Result<(), CliError> {
    table.header(["ID", "FAMILY", "NAME", "VERSION"]);
    for os in list(value, "servers_os")? {
        table.row([
            gs(os, "id")?,
            opt(os, "family"),
            opt(os, "name"),
            opt(os, "version"),
        ]);
    }
    Ok(())
}

fn render_software(value: &Value, table: &mut Table) -> Result<(), CliError> {
    table.header(["ID", "NAME", "OS"]);
    for software in list(value, "servers_software")? {
        let os_ids = lookup(software, "os_ids")
            .and_then(Value::as_array)
            .map(|ids| {
                ids.iter()
                    .map(|id| id.to_string())
                    .collect::<Vec<_>>()
                    .join(",")
            })
            .unwrap_or_default();
        table.row([gs(software, "id")?, opt(software, "name"), os_ids]);
    }
    Ok(())
}

fn render_configurators(value: &Value, table: &mut Table) -> Result<(), CliError> {
    table.header(["ID", "REGION", "CPU", "RAM (MB)", "DISK (MB)"]);
    for configurator in list(value, "server_configurators")? {
        let range = |what: &str| {
            format!(
                "{}-{}",
                opt(configurator, &format!("requirements.{what}_min")),
                opt(configurator, &format!("requirements.{what}_max"))
            )
        };
        table.row([
            gs(configurator, "id")?,
            opt(configurator, "location"),
            range("cpu"),
            range("ram"),
            range("disk"),
        ]);
    }
    Ok(())
}

const DISK_HEADER: [&str; 6] = ["ID", "NAME", "SYSTEM", "TYPE", "STATUS", "SIZE (MB)"];

fn disk_row(disk: &Value, table: &mut Table) -> Result<(), CliError> {
    table.row([
        gs(disk, "id")?,
        opt(disk, "system_name"),
        opt(disk, "is_system"),
        opt(disk, "type"),
        opt(disk, "status"),
        opt(disk, "size"),
    ]);
    Ok(())
}

fn render_disks(value: &Value, table: &mut Table) -> Result<(), CliError> {
    table.header(DISK_HEADER);
    for disk in list(value, "server_disks")? {
        disk_row(disk, table)?;
    }
    Ok(())
}

fn render_disk(value: &Value, table: &mut Table) -> Result<(), CliError> {
    table.header(DISK_HEADER);
    let disk =
        lookup(value, "server_disk").ok_or_else(|| CliError::MissingField("server_disk".into()))?;
    disk_row(disk, table)
}

const BACKUP_HEADER: [&str; 6] = ["ID", "STATUS", "CREATED", "SIZE (MB)", "TYPE", "COMMENT"];

fn backup_row(backup: &Value, table: &mut Table) -> Result<(), CliError> {
    table.row([
        gs(backup, "id")?,
        opt(backup, "status"),
        opt(backup, "created_at"),
        opt(backup, "size"),
        opt(backup, "type"),
        opt(backup, "comment"),
    ]);
    Ok(())
}

fn render_backups(value: &Value, table: &mut Table) -> Result<(), CliError> {
    table.header(BACKUP_HEADER);
    for backup in list(value, "backups")? {
        backup_row(backup, table)?;
    }
    Ok(())
}

fn render_backup(value: &Value, table: &mut Table) -> Result<(), CliError> {
    table.header(BACKUP_HEADER);
    let backup = lookup(value, "backup").ok_or_else(|| CliError::MissingField("backup".into()))?;
    backup_row(backup, table)
}

fn render_autobackup_settings(value: &Value, table: &mut Table) -> Result<(), CliError> {
    let settings = lookup(value, "auto_backups_settings")
        .ok_or_else(|| CliError::MissingField("auto_backups_settings".into()))?;
    table.row(["Enabled", opt(settings, "is_enabled").as_str()]);
    table.row(["Copies", opt(settings, "copy_count").as_str()]);
    table.row(["Interval", opt(settings, "interval").as_str()]);
    table.row(["Start day", opt(settings, "creation_start_at").as_str()]);
    table.row(["Day of week", opt(settings, "day_of_week").as_str()]);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use serde_json::json;

    fn server_command(cli: Cli) -> ServerCommands {
        match cli.command {
            Commands::Server { command } => command,
            _ => panic!("expected server command"),
        }
    }

    #[test]
    fn parses_list_with_alias() {
        let cli = Cli::parse_from(["stratus", "server", "ls"]);
        assert!(matches!(
            server_command(cli),
            ServerCommands::List { limit: 500, offset: 0 }
        ));
    }

    #[test]
    fn parses_create_with_preset() {
        let cli = Cli::parse_from([
            "stratus", "server", "create", "--name", "web-1", "--preset-id", "10", "--os", "79",
        ]);
        match server_command(cli) {
            ServerCommands::Create(args) => {
                assert_eq!(args.name, "web-1");
                assert_eq!(args.preset_id, Some(10));
                assert_eq!(args.os, Some(79));
                assert_eq!(args.bandwidth, 200);
            }
            _ => panic!("expected create command"),
        }
    }

    #[test]
    fn create_rejects_preset_with_configurator() {
        let result = Cli::try_parse_from([
            "stratus", "server", "create", "--name", "web", "--preset-id", "10", "--cpu", "2",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn create_cpu_requires_full_configuration() {
        let result = Cli::try_parse_from([
            "stratus", "server", "create", "--name", "web", "--cpu", "2", "--os", "79",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn create_spec_requires_sizing() {
        let cli = Cli::parse_from(["stratus", "server", "create", "--name", "web", "--os", "79"]);
        let ServerCommands::Create(args) = server_command(cli) else {
            panic!("expected create");
        };
        let client = ApiClient::new("t").expect("client");
        let err = ServerCommand::new(&client)
            .build_create_spec(&args)
            .unwrap_err();
        assert!(err.to_string().contains("--preset-id"));
    }

    #[test]
    fn create_spec_uses_profile_zone_default() {
        let cli = Cli::parse_from([
            "stratus", "server", "create", "--name", "web", "--preset-id", "10", "--os", "79",
        ]);
        let ServerCommands::Create(args) = server_command(cli) else {
            panic!("expected create");
        };
        let client = ApiClient::new("t").expect("client");
        let spec = ServerCommand::new(&client)
            .with_default_zone(Some(AvailabilityZone::Fra1))
            .build_create_spec(&args)
            .expect("spec");
        assert_eq!(spec.availability_zone, Some(AvailabilityZone::Fra1));
    }

    #[test]
    fn parses_stop_hard_and_shutdown_alias() {
        let cli = Cli::parse_from(["stratus", "server", "stop", "42", "--hard"]);
        assert!(matches!(
            server_command(cli),
            ServerCommands::Stop { id: 42, hard: true }
        ));

        let cli = Cli::parse_from(["stratus", "server", "shutdown", "42"]);
        assert!(matches!(
            server_command(cli),
            ServerCommands::Stop { id: 42, hard: false }
        ));
    }

    #[test]
    fn parses_boot_mode_value() {
        let cli = Cli::parse_from(["stratus", "server", "boot-mode", "42", "recovery"]);
        assert!(matches!(
            server_command(cli),
            ServerCommands::BootMode {
                id: 42,
                mode: BootMode::Recovery
            }
        ));

        let result = Cli::try_parse_from(["stratus", "server", "boot-mode", "42", "fastboot"]);
        assert!(result.is_err());
    }

    #[test]
    fn parses_disk_and_backup_subgroups() {
        let cli = Cli::parse_from(["stratus", "server", "disk", "add", "42", "--size", "10240"]);
        assert!(matches!(
            server_command(cli),
            ServerCommands::Disk {
                command: DiskCommands::Add {
                    server_id: 42,
                    size: 10240
                }
            }
        ));

        let cli = Cli::parse_from(["stratus", "server", "backup", "restore", "1", "2", "3", "-y"]);
        assert!(matches!(
            server_command(cli),
            ServerCommands::Backup {
                command: BackupCommands::Restore {
                    server_id: 1,
                    disk_id: 2,
                    backup_id: 3,
                    yes: true
                }
            }
        ));
    }

    #[test]
    fn schedule_without_flags_is_a_read() {
        let cli = Cli::parse_from(["stratus", "server", "backup", "schedule", "1", "2"]);
        let ServerCommands::Backup {
            command: BackupCommands::Schedule(args),
        } = server_command(cli)
        else {
            panic!("expected schedule");
        };
        assert!(!args.is_update());

        let cli = Cli::parse_from([
            "stratus", "server", "backup", "schedule", "1", "2", "--enable", "--interval", "week",
        ]);
        let ServerCommands::Backup {
            command: BackupCommands::Schedule(args),
        } = server_command(cli)
        else {
            panic!("expected schedule");
        };
        assert!(args.is_update());
        assert_eq!(args.interval, Some(BackupInterval::Week));
    }

    #[test]
    fn server_table_includes_main_ipv4() {
        let value = json!({
            "servers": [{
                "id": 42,
                "name": "web-1",
                "location": "us-1",
                "status": "on",
                "networks": [{
                    "type": "public",
                    "ips": [
                        {"type": "ipv6", "ip": "2001:db8::1", "is_main": true},
                        {"type": "ipv4", "ip": "192.0.2.10", "is_main": true},
                        {"type": "ipv4", "ip": "192.0.2.11", "is_main": false},
                    ]
                }]
            }]
        });
        let mut table = Table::new();
        render_servers(&value, &mut table).expect("render");
        let mut buf = Vec::new();
        table.write(&mut buf).expect("write");
        let output = String::from_utf8(buf).expect("utf8");
        assert!(output.contains("192.0.2.10"));
        assert!(!output.contains("192.0.2.11"));
        assert!(!output.contains("2001:db8::1"));
    }

    #[test]
    fn server_list_render_requires_servers_key() {
        let err = render_servers(&json!({"oops": []}), &mut Table::new()).unwrap_err();
        assert!(matches!(err, CliError::MissingField(_)));
    }

    #[test]
    fn update_spec_builds_configurator_payload() {
        let cli = Cli::parse_from([
            "stratus",
            "server",
            "set",
            "42",
            "--cpu",
            "2",
            "--ram",
            "4096",
            "--disk",
            "20480",
            "--configurator-id",
            "11",
        ]);
        let ServerCommands::Set(args) = server_command(cli) else {
            panic!("expected set");
        };
        let spec = build_update_spec(&args).expect("spec");
        let value = serde_json::to_value(&spec).expect("json");
        assert_eq!(value["configurator"]["cpu"], 2);
        assert!(value.get("name").is_none());
    }
}
