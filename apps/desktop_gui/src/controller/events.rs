//! UI/backend events and error modeling for desktop GUI controller.

use client_core::{LookupError, LookupTicket};
use shared::domain::Product;

use crate::media::PreviewImage;

#[derive(Debug)]
pub enum UiEvent {
    Info(String),
    Error(UiError),
    ProductLoaded {
        ticket: LookupTicket,
        outcome: Result<Product, LookupError>,
    },
    ImageLoaded {
        seq: u64,
        image: PreviewImage,
    },
    ImageFailed {
        seq: u64,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    BackendStartup,
    Dispatch,
}

/// Failures of the GUI plumbing itself. Lookup failures never take this path;
/// they become the error banner through the lookup controller.
#[derive(Debug, Clone)]
pub struct UiError {
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn new(context: UiErrorContext, message: impl Into<String>) -> Self {
        Self {
            context,
            message: message.into(),
        }
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Status line text. Startup failures get a hint about what to do next.
    pub fn status_text(&self) -> String {
        match self.context {
            UiErrorContext::BackendStartup => {
                format!("{}; restart the app to retry.", self.message)
            }
            UiErrorContext::Dispatch => self.message.clone(),
        }
    }
}
