//! Image renderer
//!
//! Listens to the view model, turns every published dog into a load
//! request, and swaps picture and caption together once the picture has
//! loaded. View model publications arrive over a channel and are drained
//! on the UI thread.

use iced::widget::image::Handle;
use image::RgbaImage;
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tracing::{debug, error};

use crate::error::FetchError;
use crate::state::data::DogObject;
use crate::state::view_model::ViewModel;

/// What the view model published, in publish order
#[derive(Debug, Clone)]
enum RendererEvent {
    Caption(String),
    Dog(DogObject),
    FetchFailed,
}

/// A dog to load, paired with the caption published alongside it
#[derive(Debug, Clone, PartialEq)]
pub struct LoadRequest {
    pub dog: DogObject,
    pub caption: String,
}

/// The picture currently on the image surface
#[derive(Debug, Clone)]
pub struct DisplayedImage {
    pub dog: DogObject,
    pub pixels: Arc<RgbaImage>,
    pub handle: Handle,
}

/// Where the current fetch cycle stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Nothing requested yet
    Idle,
    /// Waiting on the API or the picture
    Loading,
    /// A picture and its caption are on screen
    Displayed,
    /// The last cycle failed; whatever was shown before stays
    Failed,
}

pub struct ImageRenderer {
    events: UnboundedReceiver<RendererEvent>,
    pending_caption: String,
    displayed: Option<DisplayedImage>,
    caption: String,
    phase: Phase,
}

impl ImageRenderer {
    /// Subscribe to `view_model` and start with an empty surface
    pub fn attach(view_model: &mut ViewModel) -> Self {
        let (tx, events) = mpsc::unbounded_channel();

        let caption_tx = tx.clone();
        view_model.subscribe_caption(move |caption| {
            let _ = caption_tx.send(RendererEvent::Caption(caption.clone()));
        });
        let dog_tx = tx.clone();
        view_model.subscribe_dog(move |dog| {
            if let Some(dog) = dog {
                let _ = dog_tx.send(RendererEvent::Dog(dog.clone()));
            }
        });
        view_model.subscribe_errors(move |err| {
            if err.is_some() {
                let _ = tx.send(RendererEvent::FetchFailed);
            }
        });

        Self {
            events,
            pending_caption: String::new(),
            displayed: None,
            caption: String::new(),
            phase: Phase::Idle,
        }
    }

    /// A fetch cycle started: show the spinner and withhold the caption
    pub fn begin_loading(&mut self) {
        self.phase = Phase::Loading;
        self.caption.clear();
    }

    /// Drain view model publications into load requests.
    /// A failed fetch ends the loading phase here.
    pub fn take_requests(&mut self) -> Vec<LoadRequest> {
        let mut requests = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            match event {
                RendererEvent::Caption(caption) => self.pending_caption = caption,
                RendererEvent::FetchFailed => self.phase = Phase::Failed,
                RendererEvent::Dog(dog) => {
                    debug!(url = %dog.img_url, "queueing image load");
                    requests.push(LoadRequest {
                        dog,
                        caption: self.pending_caption.clone(),
                    });
                }
            }
        }
        requests
    }

    /// Apply the outcome of loading `request`.
    ///
    /// On success the picture is swapped in and only then is the paired
    /// caption revealed. On failure nothing on screen changes and the error
    /// is handed back for the toast.
    pub fn finish_load(
        &mut self,
        request: LoadRequest,
        result: Result<Arc<RgbaImage>, FetchError>,
    ) -> Result<(), FetchError> {
        match result {
            Ok(pixels) => {
                let handle = Handle::from_rgba(pixels.width(), pixels.height(), pixels.as_raw().clone());
                self.displayed = Some(DisplayedImage {
                    dog: request.dog,
                    pixels,
                    handle,
                });
                self.caption = request.caption;
                self.phase = Phase::Displayed;
                Ok(())
            }
            Err(err) => {
                error!(url = %request.dog.img_url, error = %err, "Image loading error!");
                self.phase = Phase::Failed;
                Err(err)
            }
        }
    }

    #[cfg(test)]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_loading(&self) -> bool {
        self.phase == Phase::Loading
    }

    /// Caption currently shown to the user
    pub fn caption(&self) -> &str {
        &self.caption
    }

    pub fn displayed(&self) -> Option<&DisplayedImage> {
        self.displayed.as_ref()
    }
}

impl std::fmt::Debug for ImageRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageRenderer")
            .field("phase", &self.phase)
            .field("caption", &self.caption)
            .field("displayed", &self.displayed.as_ref().map(|d| &d.dog.img_url))
            .finish()
    }
}
