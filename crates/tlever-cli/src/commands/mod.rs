//! Command handlers grouped by label family.

pub(crate) mod category;
pub(crate) mod clog;
pub(crate) mod label;
pub(crate) mod tag;
pub(crate) mod tier;
pub(crate) mod tui;
