//! HTTP Route Handlers

pub mod data;
pub mod evaluation;
pub mod predict;
