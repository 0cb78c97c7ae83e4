//! # Workflows Module
//!
//! Headless entry points that drive a [`ScatteringModel`](crate::engine::model::ScatteringModel)
//! without a render loop.
//!
//! - **Simulation Workflow** ([`simulate`]) - Builds a model from a configuration, fires the
//!   gun for a fixed number of frames and summarises the outcome as a serialisable report.

pub mod simulate;
