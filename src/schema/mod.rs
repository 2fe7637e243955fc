pub mod parser;
pub mod schema_model;
