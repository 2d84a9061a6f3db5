//! Classifier inference components

pub mod inference;
pub mod loader;

pub use inference::ClassifierEngine;
pub use loader::ModelLoader;
