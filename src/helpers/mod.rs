//! Helper functions shared by the loader and the template filters

mod date;

pub use date::*;
