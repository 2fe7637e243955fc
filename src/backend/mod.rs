pub mod backend_model;
pub mod client;
pub mod error;
pub mod validate;
