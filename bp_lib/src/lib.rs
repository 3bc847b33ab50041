// Warning groups (as of rust 1.55)
#![deny(
    future_incompatible,
    nonstandard_style,
    rust_2018_compatibility,
    rust_2021_compatibility,
    rust_2018_idioms
)]

//! Per-sample pipelines of external bioinformatics tools.
//!
//! Each stage is an idempotent [`step::Step`]: it declares the files that
//! prove it ran, and only runs its tool when they are absent. Stages are
//! chained and applied to a validated batch of samples by
//! [`pipeline::Pipeline`].

/// Recognise which stage produced an existing folder.
pub mod classifier;

pub mod errors;

/// Raw or trimmed reads as pipeline input.
pub mod normalize;

/// The artifacts written by each stage.
pub mod outputs;

/// Batch validation and per-sample sequencing.
pub mod pipeline;

pub mod step;

/// Command lines of the external tools.
pub mod tools;

#[cfg(test)]
mod testing;
