pub mod collection;
pub mod entity;
pub mod language;
pub mod translatable_value;
