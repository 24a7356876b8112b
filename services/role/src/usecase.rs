pub mod role;
pub mod seed;
pub mod user_role;
