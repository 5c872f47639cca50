//! cd-core: shared foundation for clusterdisk.
//!
//! Contains:
//! - ids (star keys and integrator backend ids)
//! - numeric (Real, 3-vectors, finiteness check, log spacing)
//! - units (uom-backed conversions between cgs, SI and astronomical units)
//! - timing (per-phase wall clock accounting)
//! - error (shared error types)

pub mod error;
pub mod ids;
pub mod numeric;
pub mod timing;
pub mod units;

pub use error::{CoreError, CoreResult};
pub use ids::*;
pub use numeric::*;
