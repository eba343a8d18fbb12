//! API endpoint catalog.
//!
//! Endpoints are relative paths joined onto the configured base URL.

pub const LOGIN: &str = "login";
pub const LOGOUT: &str = "logout";
pub const PROFILE: &str = "profile";

pub const BRANDS: &str = "brands";
pub const UNITS: &str = "units";
pub const MERCHANTS: &str = "merchants";
pub const TEAMS: &str = "teams";
pub const USERS: &str = "users";
pub const ROLES: &str = "roles";
pub const PERMISSIONS: &str = "permissions";
pub const LEADS: &str = "leads";
pub const INVOICES: &str = "invoices";
pub const COMPANIES: &str = "companies";

/// Permissions granted to one user.
pub fn user_permissions(user_id: u64) -> String {
    format!("users/{user_id}/permissions")
}

/// Map a resource name (as typed on the command line) to its endpoint.
pub fn resource_endpoint(resource: &str) -> Option<&'static str> {
    match resource.to_lowercase().as_str() {
        "brand" | "brands" => Some(BRANDS),
        "unit" | "units" => Some(UNITS),
        "merchant" | "merchants" => Some(MERCHANTS),
        "team" | "teams" => Some(TEAMS),
        "user" | "users" => Some(USERS),
        "role" | "roles" => Some(ROLES),
        "permission" | "permissions" => Some(PERMISSIONS),
        "lead" | "leads" => Some(LEADS),
        "invoice" | "invoices" => Some(INVOICES),
        "company" | "companies" => Some(COMPANIES),
        _ => None,
    }
}

/// Join an endpoint onto the base URL, normalizing slashes.
pub fn join(base_url: &str, endpoint: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        endpoint.trim_start_matches('/')
    )
}
