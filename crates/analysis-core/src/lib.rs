pub mod error;
pub mod indicators;
pub mod sanitize;
pub mod scorecard;
pub mod signal;
pub mod tier;
pub mod traits;
pub mod types;

pub use error::*;
pub use indicators::*;
pub use sanitize::{sanitize, sanitize_or, RawValue};
pub use scorecard::*;
pub use signal::*;
pub use tier::*;
pub use traits::*;
pub use types::*;
