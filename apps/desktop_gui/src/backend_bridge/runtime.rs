//! Runtime bridge between UI command queue and backend event intake.
//!
//! Each command becomes its own tokio task, so a lookup submitted while an
//! earlier one is still in flight really does overlap with it. Ordering of
//! the results is left to the controller.

use std::thread;

use client_core::{ProductApi, ProductClient};
use crossbeam_channel::{Receiver, Sender};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorContext, UiEvent};
use crate::media::decode_preview_image;

pub fn launch(cmd_rx: Receiver<BackendCommand>, ui_tx: Sender<UiEvent>, client: ProductClient) {
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::Error(UiError::new(
                    UiErrorContext::BackendStartup,
                    format!("backend worker startup failure: failed to build runtime: {err}"),
                )));
                tracing::error!("failed to build backend runtime: {err}");
                return;
            }
        };

        runtime.block_on(async move {
            tracing::info!(server_url = %client.server_url(), "backend worker ready");
            let _ = ui_tx.try_send(UiEvent::Info(format!(
                "Product service: {}",
                client.server_url()
            )));
            while let Ok(cmd) = cmd_rx.recv() {
                let client = client.clone();
                let ui_tx = ui_tx.clone();
                match cmd {
                    BackendCommand::FetchProduct { ticket } => {
                        tokio::spawn(async move {
                            let outcome = client.fetch_product(ticket.product_id()).await;
                            deliver(&ui_tx, UiEvent::ProductLoaded { ticket, outcome });
                        });
                    }
                    BackendCommand::FetchImage { seq, url } => {
                        tokio::spawn(async move {
                            let event = match client.fetch_image(&url).await {
                                Ok(bytes) => match decode_preview_image(&bytes) {
                                    Ok(image) => UiEvent::ImageLoaded { seq, image },
                                    Err(reason) => UiEvent::ImageFailed { seq, reason },
                                },
                                Err(err) => UiEvent::ImageFailed {
                                    seq,
                                    reason: err.to_string(),
                                },
                            };
                            deliver(&ui_tx, event);
                        });
                    }
                }
            }
            tracing::debug!("ui command channel closed; backend worker exiting");
        });
    });
}

/// Hands a result to the UI, waiting for room in the queue. The UI drains the
/// queue every frame while a lookup is outstanding, so the wait is short.
fn deliver(ui_tx: &Sender<UiEvent>, event: UiEvent) {
    if tokio::task::block_in_place(|| ui_tx.send(event)).is_err() {
        tracing::warn!("ui event dropped; window closed");
    }
}
