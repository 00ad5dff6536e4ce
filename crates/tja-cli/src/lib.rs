//! Library side of the target inheritance analyzer CLI.

pub mod logging;
pub mod pipeline;
