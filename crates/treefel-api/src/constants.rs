//! API constants

/// Versioned prefix for every API route
pub const API_PREFIX: &str = "/api/v1";

/// Where the OpenAPI document is served
pub const OPENAPI_PATH: &str = "/api/openapi.json";

/// Slack added to the request body limit for multipart boundaries and headers
pub const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Key probed by the readiness check; it does not need to exist
pub const HEALTH_PROBE_KEY: &str = "health/probe.jpg";
