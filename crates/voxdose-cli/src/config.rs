//! Default locations and resolution of the paths a command works on.

pub mod builder;
pub mod defaults;
pub mod models;
