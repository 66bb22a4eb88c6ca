//! # Anthill Runtime
//!
//! Colony coordination, agent scheduling and observation.
//!
//! The runtime is the colony itself: it places ants on the grid, runs one
//! tokio task per ant, keeps every position in a single locked registry
//! so no two live ants ever share a cell, and lets observers take frames
//! on their own cadence.

pub mod agent;
pub mod colony;
pub mod config;
pub mod event;
pub mod observer;
pub mod prelude;
pub mod registry;
pub mod rng;
