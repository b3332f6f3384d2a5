//! Per-request context header names.
//!
//! Header names are lowercase so they can be fed straight into
//! `HeaderName::from_static`.

/// Tenant scoping: the facility the request acts on behalf of.
pub const FACILITY_ID: &str = "x-facility-id";

/// Client-side send time, RFC 3339 UTC with millisecond precision.
pub const REQUEST_TIME: &str = "x-request-time";
