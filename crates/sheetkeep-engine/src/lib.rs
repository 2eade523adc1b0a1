//! SheetKeep Engine - Orchestration layer
//!
//! Turns loosely typed client requests into store calls, applies the
//! validation policy and owns lifecycle logging for every operation.

pub mod commands;
