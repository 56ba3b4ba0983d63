pub mod class_metadata;
pub mod detached_proxy;
pub mod translatable_chain;
pub mod translation_listener;
pub mod translation_proxy;
