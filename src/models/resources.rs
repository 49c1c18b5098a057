//! Resource names
//!
//! Every record lives in exactly one named resource. These are the names the
//! register's hook-sets, CLI and seed data agree on.

pub const BATCHES: &str = "batches";
pub const ITEMS: &str = "items";
pub const USERS: &str = "users";
pub const PROJECTS: &str = "projects";
pub const PLATFORMS: &str = "platforms";
pub const AUDIT: &str = "audit";
pub const DESTRUCTIONS: &str = "destruction";

pub const VAULT_LOCATIONS: &str = "vaultLocation";
pub const ORGANISATIONS: &str = "organisation";
pub const PLATFORM_ORIGINATORS: &str = "platformOriginator";
pub const PROTECTIVE_MARKINGS: &str = "protectiveMarking";
pub const MEDIA_TYPES: &str = "mediaType";
pub const PROTECTIVE_MARKING_AUTHORITIES: &str = "protectiveMarkingAuthority";
pub const DEPARTMENTS: &str = "department";

/// Reference-data resources: simple named lookup lists
pub const REFERENCE_DATA: [&str; 7] = [
    VAULT_LOCATIONS,
    ORGANISATIONS,
    PLATFORM_ORIGINATORS,
    PROTECTIVE_MARKINGS,
    MEDIA_TYPES,
    PROTECTIVE_MARKING_AUTHORITIES,
    DEPARTMENTS,
];

/// Singular noun for messages ("batches" -> "batch")
pub fn singular(resource: &str) -> &str {
    match resource {
        BATCHES => "batch",
        ITEMS => "item",
        USERS => "user",
        PROJECTS => "project",
        PLATFORMS => "platform",
        AUDIT => "audit entry",
        other => other,
    }
}
