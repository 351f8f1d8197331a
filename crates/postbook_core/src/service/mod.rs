//! Use-case services built on the repositories.
//!
//! # Responsibility
//! - Orchestrate repository calls into end-to-end flows.
//! - Stay storage-agnostic: services only see repository traits.

pub mod walkthrough;
