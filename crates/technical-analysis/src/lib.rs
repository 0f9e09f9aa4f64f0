pub mod indicators;
pub mod timing;


pub use indicators::*;
pub use timing::*;
