//! Shared text-layout factory.

mod factory;

pub use factory::{FontId, FontLoadError, TextFactory};
