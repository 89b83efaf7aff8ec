//! Kurve core: error taxonomy, tolerances, and shared traits.

pub mod error;
pub mod tolerance;
pub mod traits;

pub use error::{KurveError, Result};
pub use tolerance::Tolerance;
