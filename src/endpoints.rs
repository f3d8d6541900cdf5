//! The API endpoint URIs.

/// The root route, which lists the API's endpoints.
pub const ROOT: &str = "/";
/// The route for submitting a transaction entry.
pub const EXPENSE: &str = "/expense";
/// The route for the health check.
pub const HEALTH: &str = "/health";
/// The route for external cron services to trigger maintenance checks.
pub const CRONJOB: &str = "/cronjob";
