//! Lookup lifecycle: one owner of the display state, driven by submissions and
//! lookup outcomes.
//!
//! Every submission issues a [`LookupTicket`] tagged with a sequence number.
//! The caller runs the remote lookup however it likes (inline, on a task, on
//! another thread) and hands the outcome back through
//! [`LookupController::complete`] together with the ticket.

use shared::domain::{Product, ProductId};
use tracing::{debug, info, warn};

use crate::{
    config::{ResponseOrdering, Settings},
    view::{render, RenderedView},
    LookupError, ProductApi,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupPhase {
    Idle,
    Loading,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    Remote(String),
    /// Local stand-in shown after the remote image failed to load.
    Placeholder,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePanel {
    pub source: ImageSource,
    pub alt: String,
}

/// Display-ready text for each product field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductDisplay {
    pub name: String,
    pub category: String,
    pub style: String,
    pub price: String,
    pub stock: String,
    pub gender_affinity: String,
    pub where_visible: String,
    pub description: String,
}

impl ProductDisplay {
    pub fn from_product(product: &Product, currency_symbol: &str) -> Self {
        Self {
            name: product.name.clone(),
            category: product.category.clone(),
            style: product.style.clone(),
            price: format!("{currency_symbol}{}", product.price.as_str()),
            stock: product.current_stock.as_str().to_string(),
            gender_affinity: product.gender_affinity.clone(),
            where_visible: product.where_visible.clone(),
            description: product.description.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DisplayState {
    #[default]
    Idle,
    Loading {
        product_id: ProductId,
    },
    Success {
        product: ProductDisplay,
        image: Option<ImagePanel>,
    },
    Error {
        message: String,
    },
}

impl DisplayState {
    pub fn phase(&self) -> LookupPhase {
        match self {
            Self::Idle => LookupPhase::Idle,
            Self::Loading { .. } => LookupPhase::Loading,
            Self::Success { .. } => LookupPhase::Success,
            Self::Error { .. } => LookupPhase::Error,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupTicket {
    seq: u64,
    product_id: ProductId,
}

impl LookupTicket {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn product_id(&self) -> &ProductId {
        &self.product_id
    }
}

#[derive(Debug)]
pub struct LookupController {
    state: DisplayState,
    currency_symbol: String,
    ordering: ResponseOrdering,
    latest_seq: u64,
    displayed_seq: Option<u64>,
}

impl Default for LookupController {
    fn default() -> Self {
        Self::new(&Settings::default())
    }
}

impl LookupController {
    pub fn new(settings: &Settings) -> Self {
        Self {
            state: DisplayState::Idle,
            currency_symbol: settings.currency_symbol.clone(),
            ordering: settings.response_ordering,
            latest_seq: 0,
            displayed_seq: None,
        }
    }

    pub fn state(&self) -> &DisplayState {
        &self.state
    }

    pub fn phase(&self) -> LookupPhase {
        self.state.phase()
    }

    pub fn render(&self) -> RenderedView {
        render(&self.state)
    }

    pub fn latest_seq(&self) -> u64 {
        self.latest_seq
    }

    /// Sequence number of the lookup whose outcome is on screen.
    pub fn displayed_seq(&self) -> Option<u64> {
        self.displayed_seq
    }

    /// Starts a lookup. Prior error and product content is cleared immediately.
    pub fn submit(&mut self, raw_id: &str) -> Result<LookupTicket, LookupError> {
        let product_id = ProductId::new(raw_id);
        if product_id.is_blank() {
            return Err(LookupError::EmptyProductId);
        }

        self.latest_seq += 1;
        self.displayed_seq = None;
        self.state = DisplayState::Loading {
            product_id: product_id.clone(),
        };
        info!(seq = self.latest_seq, product_id = %product_id, "lookup submitted");

        Ok(LookupTicket {
            seq: self.latest_seq,
            product_id,
        })
    }

    /// Applies a lookup outcome. Returns false when the outcome was discarded.
    pub fn complete(
        &mut self,
        ticket: &LookupTicket,
        outcome: Result<Product, LookupError>,
    ) -> bool {
        if self.ordering == ResponseOrdering::LatestOnly
            && (ticket.seq != self.latest_seq || self.phase() != LookupPhase::Loading)
        {
            debug!(
                seq = ticket.seq,
                latest = self.latest_seq,
                "discarding superseded lookup result"
            );
            return false;
        }

        self.state = match outcome {
            Ok(product) => {
                let image = product.visible_image_url().map(|url| ImagePanel {
                    source: ImageSource::Remote(url.to_string()),
                    alt: product.name.clone(),
                });
                DisplayState::Success {
                    product: ProductDisplay::from_product(&product, &self.currency_symbol),
                    image,
                }
            }
            Err(err) => {
                warn!(
                    seq = ticket.seq,
                    product_id = %ticket.product_id,
                    "lookup failed: {err}"
                );
                DisplayState::Error {
                    message: err.user_message().to_string(),
                }
            }
        };
        self.displayed_seq = Some(ticket.seq);
        true
    }

    /// Swaps a failed remote image for the placeholder. Happens at most once
    /// per displayed product; returns whether the swap took place.
    pub fn image_failed(&mut self, seq: u64) -> bool {
        if self.displayed_seq != Some(seq) {
            return false;
        }
        let DisplayState::Success {
            image: Some(panel), ..
        } = &mut self.state
        else {
            return false;
        };
        if panel.source == ImageSource::Placeholder {
            return false;
        }
        debug!(seq, "product image failed to load; showing placeholder");
        panel.source = ImageSource::Placeholder;
        true
    }

    /// Submit, fetch and complete in one go.
    pub async fn lookup<A>(&mut self, api: &A, raw_id: &str) -> Result<&DisplayState, LookupError>
    where
        A: ProductApi + ?Sized,
    {
        let ticket = self.submit(raw_id)?;
        let outcome = api.fetch_product(ticket.product_id()).await;
        self.complete(&ticket, outcome);
        Ok(&self.state)
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
