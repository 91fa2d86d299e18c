//! License presentation and persistence.
//!
//! - [`label`] — maps provider license keys to short display names and colors.
//! - [`writer`] — writes decoded license texts next to the scanned module.

pub mod label;
pub mod writer;
