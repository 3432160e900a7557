/// UI module
///
/// - Image renderer: loads the published dog and pairs it with its caption (renderer.rs)
/// - Loading animation drawn on a canvas (spinner.rs)
/// - Transient error messages (toast.rs)

pub mod renderer;
pub mod spinner;
pub mod toast;
