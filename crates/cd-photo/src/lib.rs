//! cd-photo: external photoevaporation of disks by the cluster's bright stars.
//!
//! Provides:
//! - A ten-segment FUV luminosity fit for bright stars
//! - The radiation-field evaluator (summed FUV flux in G0, EUV eligibility)
//! - The FRIED mass-loss grid and the `MassLossTable` lookup trait
//! - The mass-loss evaluator combining tabulated FUV and analytic EUV rates
//!
//! Both evaluators are embarrassingly parallel and run on a caller-supplied
//! rayon pool; output order always matches input order.

pub mod error;
pub mod fried;
pub mod luminosity;
pub mod mass_loss;
pub mod radiation;

pub use error::{PhotoError, PhotoResult};
pub use fried::FriedGrid;
pub use luminosity::luminosity_fit;
pub use mass_loss::{MassLossTable, PhotoevapTarget, euv_mass_loss, photoevaporation_mass_loss};
pub use radiation::{IrradiatedDisk, Irradiation, RadiationSource, radiation_at, total_radiation};
