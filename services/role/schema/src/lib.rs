pub mod roles;
pub mod user_roles;
