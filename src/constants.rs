use lazy_static::lazy_static;
use regex::Regex;

/// Rows per explorer page unless overridden by configuration.
pub const DEFAULT_PAGE_LIMIT: u64 = 50;

/// Hard cap on rows fetched for a clustering run.
pub const CLUSTER_SAMPLE_CAP: u64 = 500;

/// At most this many numeric columns take part in clustering.
pub const MAX_CLUSTER_FEATURES: usize = 3;

pub const MIN_CLUSTERS: usize = 2;
pub const MAX_CLUSTERS: usize = 10;
pub const DEFAULT_CLUSTERS: usize = 3;

/// Sample records reported per cluster.
pub const CLUSTER_SAMPLE_ROWS: usize = 5;

/// Inclusive k range swept by the elbow analysis.
pub const ELBOW_K_START: usize = 2;
pub const ELBOW_K_END: usize = 8;

/// Statistics are only surfaced for columns with more observations than this.
pub const MIN_DISPLAY_COUNT: u64 = 10;

pub const DEFAULT_SAMPLE_LIMIT: u64 = 10;
pub const MAX_SAMPLE_LIMIT: u64 = 100;

/// Pages shown on either side of the current page in navigation.
pub const PAGINATION_WINDOW: u64 = 2;

/// MySQL rejects identifiers longer than this.
pub const MAX_IDENTIFIER_LEN: usize = 64;

/// Values matching this pattern are treated as numeric by the store-side probe.
/// Leading/trailing whitespace, a sign, a missing integer part and exponents are tolerated.
pub const NUMERIC_PATTERN: &str =
    r"^[[:space:]]*[-+]?([0-9]+\.?[0-9]*|\.[0-9]+)([eE][-+]?[0-9]+)?[[:space:]]*$";

lazy_static! {
    /// In-process form of [`NUMERIC_PATTERN`].
    pub static ref NUMERIC_REGEX: Regex = Regex::new(NUMERIC_PATTERN).expect("numeric pattern compiles");

    pub static ref DEFAULT_TABLE_PREFIXES: Vec<&'static str> = vec!["staging_", "dw_"];

    pub static ref DEFAULT_CLUSTER_TABLES: Vec<&'static str> = vec![
        "dw_roster_composition",
        "staging_war_bat",
        "staging_war_pitch",
    ];

    pub static ref DEFAULT_CLUSTER_TABLE: &'static str = "staging_war_bat";

    /// Display-name rewrites applied before word capitalisation.
    pub static ref DISPLAY_PREFIXES: Vec<(&'static str, &'static str)> = vec![
        ("staging_", "Staging: "),
        ("dw_", "DW: "),
    ];
}
