//! Envelope conventions shared by every RPC response.

/// `status` field of every successful envelope.
pub const STATUS_SUCCESS: &str = "success";

/// `status` field of every error payload.
pub const STATUS_ERROR: &str = "error";

/// Success message for a single-entity fetch, e.g. `"Successfully fetched product"`.
pub fn fetched(entity: &str) -> String {
    format!("Successfully fetched {entity}")
}

pub fn fetched_many(entity: &str) -> String {
    format!("Successfully fetched {entity}s")
}

pub fn created(entity: &str) -> String {
    format!("Successfully created {entity}")
}

pub fn updated(entity: &str) -> String {
    format!("Successfully updated {entity}")
}

pub fn trashed(entity: &str) -> String {
    format!("Successfully trashed {entity}")
}

pub fn restored(entity: &str) -> String {
    format!("Successfully restored {entity}")
}

pub fn deleted(entity: &str) -> String {
    format!("Successfully deleted {entity} permanently")
}

pub fn restored_all(entity: &str, affected: u64) -> String {
    format!("Successfully restored {affected} {entity}(s)")
}

pub fn deleted_all(entity: &str, affected: u64) -> String {
    format!("Successfully deleted {affected} {entity}(s) permanently")
}
