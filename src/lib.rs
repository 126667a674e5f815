pub mod canvas;
pub mod catalog;
pub mod config;
pub mod error;
pub mod games;
pub mod host;
pub mod install;

pub use error::{FrostError, Result};
