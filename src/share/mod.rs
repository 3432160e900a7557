/// Share module
///
/// This module turns what's on screen into something another app can open:
/// - Rasterizing caption text (text.rs)
/// - Composing picture + caption into one bitmap (compose.rs)
/// - Writing the bitmap to the shared PNG in the cache (persist.rs)
/// - Handing the PNG to the platform (dispatch.rs)

pub mod compose;
pub mod dispatch;
pub mod persist;
pub mod text;
