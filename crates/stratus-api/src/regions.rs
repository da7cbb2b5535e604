//! Location-specific capability tables.
//!
//! These depend on Stratus Cloud products and may change as capacity is
//! added in new locations.

use crate::types::{AvailabilityZone, Region};

/// Console URL for interactive management.
pub const CONTROL_PANEL_URL: &str = "https://stratus.cloud/console";

/// Regions where public IPv6 addresses can be ordered.
pub const REGIONS_WITH_IPV6: &[Region] = &[Region::Us1, Region::Eu1, Region::Eu2, Region::Ap1];

/// Regions where custom images are supported.
pub const REGIONS_WITH_IMAGES: &[Region] = &[Region::Us1, Region::Us2, Region::Eu1, Region::Eu2];

/// Regions with local network (LAN) support.
pub const REGIONS_WITH_LAN: &[Region] = &[Region::Us1, Region::Eu1, Region::Eu2];

/// Availability zones with local network (LAN) support.
pub const ZONES_WITH_LAN: &[AvailabilityZone] = &[
    AvailabilityZone::Iad1,
    AvailabilityZone::Fra1,
    AvailabilityZone::Ams1,
];

/// The default availability zone for a region.
pub fn default_zone(region: Region) -> AvailabilityZone {
    match region {
        Region::Us1 => AvailabilityZone::Iad1,
        Region::Us2 => AvailabilityZone::Sfo1,
        Region::Eu1 => AvailabilityZone::Fra1,
        Region::Eu2 => AvailabilityZone::Ams1,
        Region::Ap1 => AvailabilityZone::Sin1,
        Region::Me1 => AvailabilityZone::Dxb1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_region_has_a_default_zone() {
        use std::str::FromStr;
        for &wire in Region::ALL {
            let region = Region::from_str(wire).expect("parse");
            // Must not panic; the zone must belong to the known set.
            let zone = default_zone(region);
            assert!(AvailabilityZone::ALL.contains(&zone.as_str()));
        }
    }

    #[test]
    fn lan_zones_are_subset_of_known_zones() {
        for zone in ZONES_WITH_LAN {
            assert!(AvailabilityZone::ALL.contains(&zone.as_str()));
        }
    }
}
