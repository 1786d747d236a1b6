//! Session materialization.

pub mod materializer;

pub use materializer::SessionMaterializer;
