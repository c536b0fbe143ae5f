pub mod aggregate;
pub mod dataset;
pub mod engine;
pub mod filter;
pub mod format;
pub mod pages;
pub mod pipeline;
pub mod session;
pub mod wordfreq;

pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
