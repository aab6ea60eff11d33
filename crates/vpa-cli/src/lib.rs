//! Library components of the `vpa` command-line pipeline.

pub mod logging;
pub mod pipeline;
pub mod types;
