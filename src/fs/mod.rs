//! Filesystem inventory for the packaging stage.

pub mod walker;
