//! Applies UI actions and backend events to the lookup screen state.

use client_core::{ImagePanel, ImageSource, LookupController, LookupError, LookupPhase};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiEvent};
use crate::media::PreviewImage;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ImageState {
    #[default]
    None,
    Loading {
        seq: u64,
    },
    Ready {
        seq: u64,
        image: PreviewImage,
    },
}

#[derive(Debug)]
pub struct LookupScreen {
    pub controller: LookupController,
    pub product_id_input: String,
    pub image: ImageState,
    pub status: Option<String>,
}

impl LookupScreen {
    pub fn new(controller: LookupController) -> Self {
        Self {
            controller,
            product_id_input: String::new(),
            image: ImageState::None,
            status: None,
        }
    }

    pub fn can_submit(&self) -> bool {
        !self.product_id_input.trim().is_empty()
    }

    pub fn has_work_in_flight(&self) -> bool {
        self.controller.phase() == LookupPhase::Loading
            || matches!(self.image, ImageState::Loading { .. })
    }

    pub fn submit(&mut self) -> Result<BackendCommand, LookupError> {
        let ticket = self.controller.submit(&self.product_id_input)?;
        self.image = ImageState::None;
        Ok(BackendCommand::FetchProduct { ticket })
    }

    pub fn report(&mut self, err: &UiError) {
        tracing::warn!(context = ?err.context(), "{}", err.message());
        self.status = Some(err.status_text());
    }

    /// Settles whatever was waiting on a command the backend never received.
    pub fn dispatch_failed(&mut self, cmd: BackendCommand, err: &UiError) {
        self.report(err);
        match cmd {
            BackendCommand::FetchProduct { ticket } => {
                self.controller.complete(
                    &ticket,
                    Err(LookupError::Transport(err.message().to_string())),
                );
            }
            BackendCommand::FetchImage { seq, .. } => {
                self.controller.image_failed(seq);
                if self.image == (ImageState::Loading { seq }) {
                    self.image = ImageState::None;
                }
            }
        }
    }

    /// Returns a follow-up command when the event calls for one.
    pub fn apply(&mut self, event: UiEvent) -> Option<BackendCommand> {
        match event {
            UiEvent::Info(message) => {
                self.status = Some(message);
                None
            }
            UiEvent::Error(err) => {
                self.report(&err);
                None
            }
            UiEvent::ProductLoaded { ticket, outcome } => {
                if !self.controller.complete(&ticket, outcome) {
                    return None;
                }
                self.image = ImageState::None;
                match self.controller.render().image {
                    Some(ImagePanel {
                        source: ImageSource::Remote(url),
                        ..
                    }) => {
                        self.image = ImageState::Loading { seq: ticket.seq() };
                        Some(BackendCommand::FetchImage {
                            seq: ticket.seq(),
                            url,
                        })
                    }
                    _ => None,
                }
            }
            UiEvent::ImageLoaded { seq, image } => {
                if self.image == (ImageState::Loading { seq }) {
                    self.image = ImageState::Ready { seq, image };
                }
                None
            }
            UiEvent::ImageFailed { seq, reason } => {
                if self.controller.image_failed(seq) {
                    tracing::debug!(seq, "product image unavailable: {reason}");
                    self.image = ImageState::None;
                }
                None
            }
        }
    }
}
