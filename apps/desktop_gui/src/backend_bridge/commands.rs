//! Backend commands queued from UI to backend worker.

use client_core::LookupTicket;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCommand {
    FetchProduct { ticket: LookupTicket },
    FetchImage { seq: u64, url: String },
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::FetchProduct { .. } => "fetch_product",
            Self::FetchImage { .. } => "fetch_image",
        }
    }
}
