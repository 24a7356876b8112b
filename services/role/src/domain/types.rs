use crate::error::RoleServiceError;

/// Roles every deployment starts with when seeding is enabled.
pub const DEFAULT_ROLES: [&str; 2] = ["admin", "user"];

const MAX_NAME_LEN: usize = 50;

pub fn validate_role_name(name: &str) -> Result<(), RoleServiceError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(RoleServiceError::Validation("role name is required".into()));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(RoleServiceError::Validation(format!(
            "role name must be at most {MAX_NAME_LEN} characters"
        )));
    }
    Ok(())
}

pub fn validate_assignment(user_id: i32, role_id: i32) -> Result<(), RoleServiceError> {
    if user_id <= 0 {
        return Err(RoleServiceError::Validation("user id is required".into()));
    }
    if role_id <= 0 {
        return Err(RoleServiceError::Validation("role id is required".into()));
    }
    Ok(())
}
