pub mod config;
pub mod installed;
pub mod logging;
pub mod release;
