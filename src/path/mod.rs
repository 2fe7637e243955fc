pub mod codec;
pub mod path_model;
