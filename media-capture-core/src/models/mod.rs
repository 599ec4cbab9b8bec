pub mod artifact;
pub mod config;
pub mod constraints;
pub mod device;
pub mod error;
pub mod mode;
pub mod permission;
pub mod snapshot;
pub mod state;
pub mod stream;
