pub mod entities;
pub mod errors;
pub mod model;
pub mod ports;
pub mod services;
