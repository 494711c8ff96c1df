//! Adapters for external financial-data services
//!
//! All knowledge of provider response shapes lives here; the rest of the
//! crate only sees the types in `core::quote` and `core::currency`.

pub mod yahoo_finance;
