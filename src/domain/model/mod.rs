pub mod class_model;
pub mod registry;
