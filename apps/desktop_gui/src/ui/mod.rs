//! UI layer for desktop GUI: the lookup form and result panels.

pub mod app;

pub use app::LookupApp;
