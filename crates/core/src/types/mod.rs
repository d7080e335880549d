//! Core types for Bosco Clothings.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod price;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use price::{AmountError, CurrencyCode, MAX_AMOUNT, Price, add_amounts, checked_amount};
pub use status::*;
