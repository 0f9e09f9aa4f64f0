//! CSV-backed purchase logs.
//!
//! [`PurchaseLedger`] records share purchases and rolls them up into
//! positions that can be fed to the sell evaluation; [`FundLedger`] records
//! amount-based fund purchases and summarizes their performance.

pub mod error;
pub mod fund;
pub mod models;
pub mod purchases;
mod storage;

pub use error::{LedgerError, LedgerResult};
pub use fund::FundLedger;
pub use models::*;
pub use purchases::PurchaseLedger;
