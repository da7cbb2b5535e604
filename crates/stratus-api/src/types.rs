//! Provider vocabulary for Stratus Cloud API entities.
//!
//! Every enum serializes to the exact wire string the API expects and parses
//! back from it, so the CLI can accept these values directly as flag input.

use serde::{Deserialize, Serialize};

/// Shared error for enum parsing from CLI/wire strings.
#[derive(Debug, Clone)]
pub struct ParseEnumError {
    what: &'static str,
    allowed: &'static [&'static str],
}

impl std::fmt::Display for ParseEnumError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid {}, expected one of: {}", self.what, self.allowed.join(", "))
    }
}

impl std::error::Error for ParseEnumError {}

macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $what:literal {
            $($(#[$vmeta:meta])* $variant:ident => $wire:literal,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        pub enum $name {
            $($(#[$vmeta])* #[serde(rename = $wire)] $variant,)+
        }

        impl $name {
            /// All wire values, in declaration order.
            pub const ALL: &'static [&'static str] = &[$($wire),+];

            /// The wire string for this value.
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $wire,)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.to_ascii_lowercase().as_str() {
                    $($wire => Ok(Self::$variant),)+
                    _ => Err(ParseEnumError { what: $what, allowed: Self::ALL }),
                }
            }
        }
    };
}

wire_enum! {
    /// Locations where Stratus Cloud services are available.
    Region, "region" {
        /// US East.
        Us1 => "us-1",
        /// US West.
        Us2 => "us-2",
        /// Frankfurt.
        Eu1 => "eu-1",
        /// Amsterdam.
        Eu2 => "eu-2",
        /// Singapore.
        Ap1 => "ap-1",
        /// Dubai.
        Me1 => "me-1",
    }
}

wire_enum! {
    /// Availability zones.
    AvailabilityZone, "availability zone" {
        /// US East, zone 1.
        Iad1 => "iad-1",
        /// US West, zone 1.
        Sfo1 => "sfo-1",
        /// Frankfurt, zone 1.
        Fra1 => "fra-1",
        /// Amsterdam, zone 1.
        Ams1 => "ams-1",
        /// Singapore, zone 1.
        Sin1 => "sin-1",
        /// Dubai, zone 1.
        Dxb1 => "dxb-1",
    }
}

wire_enum! {
    /// Available actions on a Cloud Server.
    ServerAction, "server action" {
        /// Reset without a graceful reboot.
        HardReboot => "hard_reboot",
        /// Power off without a graceful shutdown.
        HardShutdown => "hard_shutdown",
        /// Reinstall the operating system.
        Install => "install",
        /// Graceful reboot.
        Reboot => "reboot",
        /// Delete the server.
        Remove => "remove",
        /// Reset the root password.
        ResetPassword => "reset_password",
        /// Graceful shutdown.
        Shutdown => "shutdown",
        /// Power on.
        Start => "start",
        /// Clone the server with its disks.
        Clone => "clone",
    }
}

wire_enum! {
    /// Cloud Server event log ordering.
    LogOrder, "log order" {
        /// Oldest events first.
        Asc => "asc",
        /// Newest events first.
        Desc => "desc",
    }
}

wire_enum! {
    /// Cloud Server boot modes: normal boot from the system disk, single
    /// user mode, or boot from a rescue live image.
    BootMode, "boot mode" {
        /// Boot from the system disk.
        Default => "default",
        /// Single user mode.
        Single => "single",
        /// Wire name is `recovery_disk`; `recovery` is the CLI shortcut.
        Recovery => "recovery",
    }
}

wire_enum! {
    /// NAT options for a Cloud Server attached to a LAN.
    NatMode, "NAT mode" {
        /// Port forwarding in both directions.
        DnatAndSnat => "dnat_and_snat",
        /// Outbound translation only.
        Snat => "snat",
        /// No translation.
        NoNat => "no_nat",
    }
}

wire_enum! {
    /// IP protocol versions.
    IpVersion, "IP version" {
        /// IPv4.
        Ipv4 => "ipv4",
        /// IPv6.
        Ipv6 => "ipv6",
    }
}

wire_enum! {
    /// Operating system families, used for customer image metadata.
    OsType, "OS type" {
        /// AlmaLinux.
        AlmaLinux => "almalinux",
        /// Arch Linux.
        ArchLinux => "archlinux",
        /// CentOS.
        CentOs => "centos",
        /// A custom operating system.
        CustomOs => "custom_os",
        /// Debian.
        Debian => "debian",
        /// Any other operating system.
        Other => "other",
        /// Ubuntu.
        Ubuntu => "ubuntu",
        /// Windows.
        Windows => "windows",
    }
}

wire_enum! {
    /// Actions on a Cloud Server disk backup.
    BackupAction, "backup action" {
        /// Restore the disk from the backup.
        Restore => "restore",
        /// Attach the backup as a secondary disk.
        Mount => "mount",
        /// Detach a mounted backup.
        Unmount => "unmount",
    }
}

wire_enum! {
    /// Auto-backup schedule intervals.
    BackupInterval, "backup interval" {
        /// Daily.
        Day => "day",
        /// Weekly, on a configurable day of week.
        Week => "week",
        /// Monthly, starting on a configurable day.
        Month => "month",
    }
}

wire_enum! {
    /// Resource types, as used in project transfers and firewall links.
    ResourceType, "resource type" {
        /// Cloud Server.
        Server => "server",
        /// Load balancer.
        Balancer => "balancer",
        /// Managed database.
        Database => "database",
        /// Kubernetes cluster.
        Cluster => "kubernetes",
        /// Object storage bucket.
        Bucket => "storage",
        /// Dedicated server.
        DedicatedServer => "dedicated",
    }
}

wire_enum! {
    /// Engines available in the managed database service.
    DatabaseEngine, "database engine" {
        /// MySQL 5.7.
        Mysql5 => "mysql5",
        /// MySQL 8.
        Mysql8 => "mysql8",
        /// PostgreSQL.
        Postgres => "postgres",
        /// Redis.
        Redis => "redis",
        /// MongoDB.
        Mongodb => "mongodb",
    }
}

wire_enum! {
    /// Bucket access policies.
    BucketAccess, "bucket access policy" {
        /// World-readable bucket.
        Public => "public",
        /// Key-holder access only.
        Private => "private",
    }
}

wire_enum! {
    /// Protocols supported by the load balancer service.
    BalancerProto, "balancer protocol" {
        /// Plain HTTP.
        Http => "http",
        /// HTTP/2.
        Http2 => "http2",
        /// HTTP with TLS termination.
        Https => "https",
        /// Raw TCP passthrough.
        Tcp => "tcp",
    }
}

wire_enum! {
    /// Balancing algorithms.
    BalancerAlgo, "balancer algorithm" {
        /// Rotate across backends in order.
        RoundRobin => "roundrobin",
        /// Prefer the backend with the fewest open connections.
        LeastConnections => "leastconn",
    }
}

wire_enum! {
    /// DNS record types.
    DnsRecordType, "DNS record type" {
        /// Free-form text.
        Txt => "txt",
        /// Service locator.
        Srv => "srv",
        /// Canonical name alias.
        Cname => "cname",
        /// IPv6 address.
        Aaaa => "aaaa",
        /// Mail exchanger.
        Mx => "mx",
        /// IPv4 address.
        A => "a",
    }
}

wire_enum! {
    /// Protocols supported by the firewall service.
    FirewallProto, "firewall protocol" {
        /// TCP.
        Tcp => "tcp",
        /// UDP.
        Udp => "udp",
        /// ICMP; rules carry no ports.
        Icmp => "icmp",
    }
}

wire_enum! {
    /// Traffic directions for firewall rules.
    FirewallDirection, "firewall direction" {
        /// Incoming traffic.
        Ingress => "ingress",
        /// Outgoing traffic.
        Egress => "egress",
    }
}

/// Custom server sizing against a configurator. `disk` and `ram` are in
/// megabytes and must satisfy the configurator constraints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfiguration {
    /// Configurator to size against; see `get_server_configurators()`.
    pub configurator_id: i64,
    /// Disk size in megabytes.
    pub disk: i64,
    /// CPU core count.
    pub cpu: i64,
    /// RAM in megabytes.
    pub ram: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn region_round_trips_wire_string() {
        for &wire in Region::ALL {
            let region = Region::from_str(wire).expect("parse");
            assert_eq!(region.to_string(), wire);
        }
    }

    #[test]
    fn parsing_is_case_insensitive() {
        assert_eq!(Region::from_str("EU-1").expect("parse"), Region::Eu1);
        assert_eq!(
            ServerAction::from_str("Hard_Reboot").expect("parse"),
            ServerAction::HardReboot
        );
    }

    #[test]
    fn unknown_value_lists_alternatives() {
        let err = BootMode::from_str("fastboot").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("boot mode"));
        assert!(msg.contains("default"));
        assert!(msg.contains("recovery"));
    }

    #[test]
    fn enums_serialize_to_wire_names() {
        assert_eq!(
            serde_json::to_string(&ServerAction::HardShutdown).expect("json"),
            "\"hard_shutdown\""
        );
        assert_eq!(
            serde_json::to_string(&ResourceType::Cluster).expect("json"),
            "\"kubernetes\""
        );
        assert_eq!(
            serde_json::to_string(&BalancerAlgo::LeastConnections).expect("json"),
            "\"leastconn\""
        );
    }

    #[test]
    fn server_configuration_serializes_flat() {
        let config = ServerConfiguration {
            configurator_id: 11,
            disk: 10240,
            cpu: 2,
            ram: 4096,
        };
        let json = serde_json::to_value(config).expect("json");
        assert_eq!(json["configurator_id"], 11);
        assert_eq!(json["ram"], 4096);
    }
}
