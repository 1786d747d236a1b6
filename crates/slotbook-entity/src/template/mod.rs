//! Session template domain entities.

pub mod model;

pub use model::SessionTemplate;
