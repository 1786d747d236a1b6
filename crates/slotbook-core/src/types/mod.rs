//! Core type definitions used across the SlotBook workspace.

pub mod id;

pub use id::*;
