//! cd-dynamics: stellar dynamics and stellar evolution collaborators.
//!
//! The cluster loop only sees the [`GravityCode`] and [`StellarCode`] traits.
//! This crate also ships the implementations used for production runs and
//! tests, plus initial-condition generators:
//! - [`DirectGravity`]: softened direct summation with encounter detection
//! - [`ZamsStellar`]: fixed zero-age main-sequence masses and radii
//! - [`initial`]: Kroupa masses, Plummer and uniform spheres, virial scaling

pub mod direct;
pub mod error;
pub mod gravity;
pub mod initial;
pub mod potential;
pub mod stellar;

pub use direct::{DirectGravity, DirectGravityParams};
pub use error::{DynamicsError, DynamicsResult};
pub use gravity::{GravityCode, GravityParticle};
pub use initial::{Body, Distribution};
pub use potential::BackgroundPotential;
pub use stellar::{StellarCode, StellarParticle, ZamsStellar};
