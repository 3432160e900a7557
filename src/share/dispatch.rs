//! Hands the shared PNG to the platform

use std::borrow::Cow;
use std::sync::Mutex;
use thiserror::Error;
use tracing::{info, warn};

use super::persist::FileReference;
use crate::config::ShareMode;

pub const PNG_MIME: &str = "image/png";

/// Everything a share target needs to know about one share
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareRequest {
    pub reference: FileReference,
    pub mime: &'static str,
    /// The receiving app may read the file
    pub grant_read: bool,
    pub chooser_title: String,
}

impl ShareRequest {
    /// Share a PNG with read access granted
    pub fn png(reference: FileReference) -> Self {
        Self {
            reference,
            mime: PNG_MIME,
            grant_read: true,
            chooser_title: "Share".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShareError {
    #[error("no handler could open the file: {0}")]
    Open(String),

    #[error("clipboard unavailable: {0}")]
    Clipboard(String),

    #[error("could not read shared file: {0}")]
    Read(String),
}

/// A place the composed PNG can be sent to
pub trait ShareTarget: Send {
    fn name(&self) -> &'static str;

    fn share(&self, request: &ShareRequest) -> Result<(), ShareError>;
}

/// Opens the file with the desktop's default handler
#[derive(Debug, Default)]
pub struct SystemShare;

impl ShareTarget for SystemShare {
    fn name(&self) -> &'static str {
        "system"
    }

    fn share(&self, request: &ShareRequest) -> Result<(), ShareError> {
        open::that_detached(&request.reference.path).map_err(|e| ShareError::Open(e.to_string()))
    }
}

/// Puts the pixels on the clipboard.
///
/// The clipboard handle is kept alive for the app's lifetime; on X11 the
/// contents disappear with it.
#[derive(Default)]
pub struct ClipboardShare {
    clipboard: Mutex<Option<arboard::Clipboard>>,
}

impl ShareTarget for ClipboardShare {
    fn name(&self) -> &'static str {
        "clipboard"
    }

    fn share(&self, request: &ShareRequest) -> Result<(), ShareError> {
        let pixels = image::open(&request.reference.path)
            .map_err(|e| ShareError::Read(e.to_string()))?
            .into_rgba8();
        let (width, height) = pixels.dimensions();

        let mut guard = self
            .clipboard
            .lock()
            .map_err(|_| ShareError::Clipboard("clipboard lock poisoned".to_string()))?;
        if guard.is_none() {
            *guard = Some(arboard::Clipboard::new().map_err(|e| ShareError::Clipboard(e.to_string()))?);
        }
        let Some(clipboard) = guard.as_mut() else {
            return Err(ShareError::Clipboard("clipboard not initialized".to_string()));
        };

        clipboard
            .set_image(arboard::ImageData {
                width: width as usize,
                height: height as usize,
                bytes: Cow::Owned(pixels.into_raw()),
            })
            .map_err(|e| ShareError::Clipboard(e.to_string()))
    }
}

impl std::fmt::Debug for ClipboardShare {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClipboardShare").finish_non_exhaustive()
    }
}

/// Build the share target selected in config
pub fn target_for(mode: ShareMode) -> Box<dyn ShareTarget> {
    match mode {
        ShareMode::System => Box::new(SystemShare),
        ShareMode::Clipboard => Box::new(ClipboardShare::default()),
    }
}

/// Send the request. Failures are logged and otherwise dropped.
pub fn dispatch(target: &dyn ShareTarget, request: &ShareRequest) {
    match target.share(request) {
        Ok(()) => info!(
            target_name = target.name(),
            uri = %request.reference.uri(),
            mime = request.mime,
            grant_read = request.grant_read,
            "📤 {}", request.chooser_title
        ),
        Err(err) => warn!(target_name = target.name(), error = %err, "share failed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::Arc;

    /// Records every request it receives
    struct RecordingShare {
        seen: Arc<Mutex<Vec<ShareRequest>>>,
        fail: bool,
    }

    impl ShareTarget for RecordingShare {
        fn name(&self) -> &'static str {
            "recording"
        }

        fn share(&self, request: &ShareRequest) -> Result<(), ShareError> {
            self.seen.lock().unwrap().push(request.clone());
            if self.fail {
                Err(ShareError::Open("nobody home".into()))
            } else {
                Ok(())
            }
        }
    }

    fn reference() -> FileReference {
        FileReference {
            path: PathBuf::from("/cache/images/shared_image.png"),
            relative: PathBuf::from("images/shared_image.png"),
            authority: "dogvacional.fileprovider".to_string(),
        }
    }

    #[test]
    fn test_png_request_grants_read() {
        let request = ShareRequest::png(reference());
        assert_eq!(request.mime, "image/png");
        assert!(request.grant_read);
        assert_eq!(request.chooser_title, "Share");
    }

    #[test]
    fn test_dispatch_reaches_target() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let target = RecordingShare {
            seen: Arc::clone(&seen),
            fail: false,
        };

        dispatch(&target, &ShareRequest::png(reference()));

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].reference, reference());
    }

    #[test]
    fn test_dispatch_swallows_failures() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let target = RecordingShare {
            seen: Arc::clone(&seen),
            fail: true,
        };

        // Must not panic
        dispatch(&target, &ShareRequest::png(reference()));
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_target_selection() {
        assert_eq!(target_for(ShareMode::System).name(), "system");
        assert_eq!(target_for(ShareMode::Clipboard).name(), "clipboard");
    }

    #[test]
    fn test_clipboard_share_missing_file() {
        let mut request = ShareRequest::png(reference());
        request.reference.path = PathBuf::from("/definitely/not/here.png");
        let result = ClipboardShare::default().share(&request);
        assert!(matches!(result, Err(ShareError::Read(_))));
    }
}
