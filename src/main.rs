use iced::widget::image as picture;
use iced::widget::{button, canvas, column, container, row, text, Column, Space, Stack};
use iced::{Alignment, Color, ContentFit, Element, Length, Size, Subscription, Task, Theme};
use image::{Rgba, RgbaImage};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod error;
mod net;
mod share;
mod state;
mod ui;

use config::Config;
use error::{ComposeError, ErrorKind, FetchError, PersistError};
use net::image_loader::load_image;
use net::{DogSource, ReqwestDogSource};
use share::compose::{compose, CaptionSurface, ImageSurface};
use share::dispatch::{dispatch, ShareRequest, ShareTarget};
use share::persist::{persist, FileReference};
use share::text::{FontdueRasterizer, TextRasterizer};
use state::data::DogObject;
use state::view_model::ViewModel;
use ui::renderer::{ImageRenderer, LoadRequest};
use ui::spinner::Spinner;
use ui::toast::Toasts;

/// Card background, painted under the picture on screen and in shared images
const CARD_BACKGROUND: Rgba<u8> = Rgba([32, 32, 36, 255]);

/// Translucent strip behind the caption
const CAPTION_BAND: Rgba<u8> = Rgba([0, 0, 0, 115]);

/// Inset around the caption text, on screen and in shared images
const CAPTION_PADDING: u32 = 8;

/// Animation and toast expiry tick
const TICK: Duration = Duration::from_millis(50);

/// Outcome of one picture download
#[derive(Debug, Clone)]
struct ImageLoad {
    request: LoadRequest,
    result: Result<Arc<RgbaImage>, FetchError>,
}

/// Main application state
struct Dogvacional {
    config: Config,
    /// Shared by the API fetcher and picture downloads
    http: reqwest::Client,
    view_model: ViewModel,
    renderer: ImageRenderer,
    spinner: Spinner,
    toasts: Toasts,
    /// Caption font for shared images, if one could be loaded
    text: Option<FontdueRasterizer>,
    share_target: Box<dyn ShareTarget>,
}

/// Application messages (events)
#[derive(Debug, Clone)]
enum Message {
    /// User clicked "new dog"
    NewDog,
    /// Background API call finished
    DogFetched(Result<DogObject, FetchError>),
    /// Background picture download finished
    ImageLoaded(ImageLoad),
    /// User clicked "share"
    Share,
    /// Background PNG write finished
    Persisted(Result<FileReference, PersistError>),
    /// Animation frame / toast expiry
    Tick(Instant),
}

impl Dogvacional {
    /// Create the app and kick off the first fetch
    fn new(config: Config) -> (Self, Task<Message>) {
        let http = reqwest::Client::new();
        let source = ReqwestDogSource::new(http.clone(), config.api_url.clone());
        info!("🐕 Dogvacional starting, api: {}", source.endpoint());

        let share_target = share::dispatch::target_for(config.share_mode);
        Self::with_parts(config, http, Arc::new(source), share_target)
    }

    /// Assemble the app around an explicit dog source and share target
    fn with_parts(
        config: Config,
        http: reqwest::Client,
        source: Arc<dyn DogSource>,
        share_target: Box<dyn ShareTarget>,
    ) -> (Self, Task<Message>) {
        let mut view_model = ViewModel::new(source);
        let renderer = ImageRenderer::attach(&mut view_model);
        let text = load_caption_font(&config);

        let mut app = Dogvacional {
            config,
            http,
            view_model,
            renderer,
            spinner: Spinner::default(),
            toasts: Toasts::default(),
            text,
            share_target,
        };
        let task = app.start_fetch();

        (app, task)
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::NewDog => self.start_fetch(),
            Message::DogFetched(result) => {
                if let Err(err) = &result {
                    self.toast(err.kind());
                }
                self.view_model.apply(result);
                self.load_published_images()
            }
            Message::ImageLoaded(load) => {
                if let Err(err) = self.renderer.finish_load(load.request, load.result) {
                    self.toast(err.kind());
                }
                Task::none()
            }
            Message::Share => self.share(),
            Message::Persisted(Ok(reference)) => {
                dispatch(self.share_target.as_ref(), &ShareRequest::png(reference));
                Task::none()
            }
            Message::Persisted(Err(err)) => {
                error!(error = %err, "IOException while saving the file");
                self.toast(err.kind());
                Task::none()
            }
            Message::Tick(now) => {
                if self.renderer.is_loading() {
                    self.spinner.advance();
                }
                self.toasts.prune(now);
                Task::none()
            }
        }
    }

    /// Start the loading animation and ask the view model for a new dog
    fn start_fetch(&mut self) -> Task<Message> {
        self.renderer.begin_loading();
        Task::perform(self.view_model.request_new_dog(), Message::DogFetched)
    }

    /// Turn whatever the view model just published into picture downloads
    fn load_published_images(&mut self) -> Task<Message> {
        let loads = self.renderer.take_requests().into_iter().map(|request| {
            let client = self.http.clone();
            let url = request.dog.img_url.clone();
            Task::perform(
                async move {
                    let result = load_image(client, url).await;
                    ImageLoad { request, result }
                },
                Message::ImageLoaded,
            )
        });

        Task::batch(loads)
    }

    /// Compose the card on the UI thread, write it in the background
    fn share(&mut self) -> Task<Message> {
        let Some(composed) = self.compose_card() else {
            return Task::none();
        };

        match composed {
            Ok(buffer) => Task::perform(
                persist(
                    buffer,
                    self.config.cache_root(),
                    self.config.share_authority.clone(),
                ),
                Message::Persisted,
            ),
            Err(err) => {
                warn!(error = %err, "could not compose share image");
                self.toast(err.kind());
                Task::none()
            }
        }
    }

    /// Rasterize the card as laid out in `view`; `None` until a picture is shown
    fn compose_card(&self) -> Option<Result<RgbaImage, ComposeError>> {
        let displayed = self.renderer.displayed()?;
        let surface = self.config.surface;
        let image_surface = ImageSurface {
            width: surface.width,
            height: surface.height,
            background: CARD_BACKGROUND,
            content: Some(&*displayed.pixels),
        };
        let caption = self.renderer.caption();
        let caption_surface = CaptionSurface {
            text: caption,
            x: 0,
            y: surface.height.saturating_sub(surface.caption_height) as i64,
            width: surface.width,
            height: surface.caption_height.min(surface.height),
            font_px: surface.font_size,
            color: Rgba([255, 255, 255, 255]),
            padding: CAPTION_PADDING,
            band: (!caption.is_empty()).then_some(CAPTION_BAND),
        };
        let rasterizer = self.text.as_ref().map(|t| t as &dyn TextRasterizer);
        Some(compose(&image_surface, &caption_surface, rasterizer))
    }

    fn toast(&mut self, kind: ErrorKind) {
        self.toasts.push(kind.user_message(), Instant::now());
    }

    /// Tick only while something is animating or waiting to expire
    fn subscription(&self) -> Subscription<Message> {
        if self.renderer.is_loading() || !self.toasts.is_empty() {
            iced::time::every(TICK).map(Message::Tick)
        } else {
            Subscription::none()
        }
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        let surface = self.config.surface;
        let card_width = surface.width as f32;
        let card_height = surface.height as f32;
        let caption_height = surface.caption_height.min(surface.height) as f32;

        let mut layers: Vec<Element<Message>> = Vec::new();
        if self.renderer.is_loading() {
            layers.push(
                canvas(self.spinner)
                    .width(Length::Fill)
                    .height(Length::Fill)
                    .into(),
            );
        } else if let Some(displayed) = self.renderer.displayed() {
            layers.push(
                picture::Image::new(displayed.handle.clone())
                    .width(Length::Fill)
                    .height(Length::Fill)
                    .content_fit(ContentFit::Cover)
                    .into(),
            );
        }

        // Caption sits in the same rectangle the composer draws it in
        let caption = self.renderer.caption();
        let band = container(text(caption).size(surface.font_size).color(Color::WHITE))
            .padding(CAPTION_PADDING as f32)
            .center_x(Length::Fill)
            .center_y(Length::Fixed(caption_height));
        let band = if caption.is_empty() {
            band
        } else {
            band.style(|_theme| container::Style {
                background: Some(Color::from_rgba8(0, 0, 0, 0.45).into()),
                ..container::Style::default()
            })
        };
        layers.push(
            column![
                Space::with_height(Length::Fixed(card_height - caption_height)),
                band
            ]
            .into(),
        );

        let card = container(Stack::with_children(layers))
            .width(Length::Fixed(card_width))
            .height(Length::Fixed(card_height))
            .style(|_theme| container::Style {
                background: Some(Color::from_rgb8(CARD_BACKGROUND[0], CARD_BACKGROUND[1], CARD_BACKGROUND[2]).into()),
                ..container::Style::default()
            });

        let buttons = row![
            button("Novo Coachorro")
                .on_press(Message::NewDog)
                .padding(10),
            button("Compartilhar")
                .on_press_maybe(self.renderer.displayed().map(|_| Message::Share))
                .padding(10),
        ]
        .spacing(20);

        let toasts: Column<Message> = self
            .toasts
            .iter()
            .fold(Column::new().spacing(8), |col, toast| {
                col.push(
                    container(text(&toast.message).size(14))
                        .padding(10)
                        .max_width(card_width)
                        .style(container::rounded_box),
                )
            });

        let content: Column<Message> = column![
            text("Dogvacional").size(36),
            card,
            buttons,
            toasts,
        ]
        .spacing(20)
        .padding(40)
        .align_x(Alignment::Center);

        container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .center_x(Length::Fill)
            .center_y(Length::Fill)
            .into()
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

/// Load the caption font for shared images.
/// Missing fonts only cost the caption text, so this never fails.
fn load_caption_font(config: &Config) -> Option<FontdueRasterizer> {
    let Some(path) = config.resolve_font() else {
        warn!("no caption font found, shared images will carry no caption text");
        return None;
    };

    match FontdueRasterizer::from_file(&path) {
        Ok(rasterizer) => {
            info!("🔤 Caption font: {}", path.display());
            Some(rasterizer)
        }
        Err(err) => {
            warn!(error = %err, "caption font unusable, shared images will carry no caption text");
            None
        }
    }
}

/// Install the fmt subscriber. `RUST_LOG` wins over the config value.
fn init_tracing(fallback: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() -> iced::Result {
    let (config, config_error) = match Config::load() {
        Ok(config) => (config, None),
        Err(err) => (Config::default(), Some(err)),
    };

    init_tracing(&config.log_filter);
    if let Some(err) = config_error {
        warn!(error = %err, "config not loaded, using defaults");
    }

    let window = Size::new(
        config.surface.width as f32 + 160.0,
        config.surface.height as f32 + 320.0,
    );

    iced::application("Dogvacional", Dogvacional::update, Dogvacional::view)
        .subscription(Dogvacional::subscription)
        .theme(Dogvacional::theme)
        .window_size(window)
        .centered()
        .run_with(move || Dogvacional::new(config))
}
