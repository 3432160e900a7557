/// Network module
///
/// This module handles:
/// - Fetching a random dog document from the API (client.rs)
/// - Downloading and decoding the dog picture (image_loader.rs)

pub mod client;
pub mod image_loader;

pub use client::{DogSource, ReqwestDogSource};
