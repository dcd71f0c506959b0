//! CLI support module

mod logging;

pub use logging::init_logging;
