pub mod translatable;
