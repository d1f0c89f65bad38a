/// Number of rows returned by `query_table` when the caller omits `limit`.
pub const DEFAULT_QUERY_LIMIT: usize = 5;

/// Connection string used when none is configured; targets the local Azurite emulator.
pub const DEVELOPMENT_CONNECTION_STRING: &str = "UseDevelopmentStorage=true";
