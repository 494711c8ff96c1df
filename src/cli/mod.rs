//! Command orchestration and terminal rendering

pub mod history;
pub mod search;
pub mod setup;
pub mod summary;
pub mod trade;
pub mod ui;
