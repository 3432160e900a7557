/// State management module
///
/// This module handles all application state, including:
/// - The dog document returned by the API (data.rs)
/// - Observable value holders (observable.rs)
/// - The view model that owns and publishes the current dog and caption (view_model.rs)

pub mod data;
pub mod observable;
pub mod view_model;
