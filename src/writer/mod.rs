//! Component 3 – output artifacts.
pub mod cpp;
pub mod json;
