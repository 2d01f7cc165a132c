/// Sentinel for an absent monthly value.
pub const MISSING: f64 = 9999.0;

/// Earth radius in kilometres, used to convert the combining radius into an
/// angle of arc.
pub const EARTH_RADIUS_KM: f64 = 6378.136;

/// First year of the fixed global timeline.
pub const BASE_YEAR: i32 = 1880;

/// Number of boxes in each of the 8 latitude bands, in box-stream order.
/// The bands partition the 80 boxes of the equal-area grid exactly.
pub const BOXES_IN_BAND: [usize; 8] = [4, 8, 12, 16, 16, 12, 8, 4];

/// Human-readable titles for the 16 zonal series: 8 latitude bands followed
/// by 8 compound zones.
pub const ZONE_TITLES: [&str; 16] = [
    "64N-90N", "44N-64N", "24N-44N", "EQU-24N", "24S-EQU", "44S-24S",
    "64S-44S", "90S-64S", "24N-90N", "24S-24N", "90S-24S", "24N-64N",
    "64S-24S", "NHEM", "SHEM", "GLOBAL",
];

/// Role tags used to separate the audit logs of the different analyses.
pub const CELLTYPE_LAND: &str = "LND";
pub const CELLTYPE_MIXED: &str = "MIX";
pub const CELLTYPE_BOX: &str = "BOX";

/// Returns true when a monthly value is present.
#[inline]
pub fn valid(v: f64) -> bool {
    v != MISSING
}

/// Returns true when a monthly value is the MISSING sentinel.
#[inline]
pub fn invalid(v: f64) -> bool {
    v == MISSING
}
