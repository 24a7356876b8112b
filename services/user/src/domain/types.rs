use rand::RngExt;

use crate::error::UserServiceError;

/// Role assigned to every new account unless `DEFAULT_USER_ROLE` overrides it.
pub const DEFAULT_USER_ROLE: &str = "user";

const MIN_PASSWORD_LEN: usize = 6;
const VERIFICATION_CODE_LEN: usize = 32;
const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

pub fn generate_verification_code() -> String {
    let mut rng = rand::rng();
    (0..VERIFICATION_CODE_LEN)
        .map(|_| CHARSET[rng.random_range(0..CHARSET.len())] as char)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateUser {
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

/// Profile update. An empty `password` keeps the stored hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateUser {
    pub id: i32,
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

/// Row written by the repository on create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub password_hash: String,
    pub verification_code: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserChanges {
    pub id: i32,
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub password_hash: Option<String>,
}

impl CreateUser {
    pub fn validate(&self) -> Result<(), UserServiceError> {
        validate_profile(&self.firstname, &self.lastname, &self.email)?;
        validate_password(&self.password, &self.confirm_password)
    }
}

impl UpdateUser {
    pub fn validate(&self) -> Result<(), UserServiceError> {
        if self.id <= 0 {
            return Err(UserServiceError::Validation("user id is required".into()));
        }
        validate_profile(&self.firstname, &self.lastname, &self.email)?;
        if self.changes_password() {
            validate_password(&self.password, &self.confirm_password)?;
        }
        Ok(())
    }

    pub fn changes_password(&self) -> bool {
        !self.password.is_empty() || !self.confirm_password.is_empty()
    }
}

fn validate_profile(firstname: &str, lastname: &str, email: &str) -> Result<(), UserServiceError> {
    if firstname.trim().is_empty() {
        return Err(UserServiceError::Validation("firstname is required".into()));
    }
    if lastname.trim().is_empty() {
        return Err(UserServiceError::Validation("lastname is required".into()));
    }
    let email = email.trim();
    let well_formed = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
    if !well_formed {
        return Err(UserServiceError::Validation("email is invalid".into()));
    }
    Ok(())
}

fn validate_password(password: &str, confirm: &str) -> Result<(), UserServiceError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(UserServiceError::Validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    if password != confirm {
        return Err(UserServiceError::PasswordMismatch);
    }
    Ok(())
}
