/// Shared configuration for the role-info backend lookup

/// Global timeout applied to every info lookup request (seconds).
/// The observed backend has no documented latency bound; a missed deadline
/// falls back to static metadata rather than retrying.
pub const INFO_LOOKUP_TIMEOUT_SECS: u64 = 5;

/// Route template on the info backend, keyed by organisational role
pub const INFO_ROUTE: &str = "info-building";
