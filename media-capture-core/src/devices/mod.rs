pub mod inventory;
pub mod permissions;
