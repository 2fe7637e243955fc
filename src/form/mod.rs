pub mod builder;
pub mod control;
pub mod error;
pub mod form_model;
pub mod serializer;
pub mod visibility;
