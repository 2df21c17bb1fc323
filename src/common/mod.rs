pub mod config;
pub mod error;
pub(crate) mod tensor;

pub use config::Config;
