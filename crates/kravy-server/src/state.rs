//! Shared application state for the Kravy server.
//!
//! A single [`AppState`] is built at startup and shared across all Axum
//! handlers via `Arc`. Handlers never mutate it.

use std::sync::Arc;

use kravy_core::store::EnquiryStore;
use kravy_widgets::chat_link::ChatLink;

use crate::config::LandingConfig;

/// Shared application state passed to all HTTP handlers.
pub struct AppState {
    /// Validation and persistence of enquiries.
    pub enquiries: Arc<EnquiryStore>,
    /// Landing page settings.
    pub landing: LandingConfig,
    /// Floating chat link rendered on every page.
    pub chat_link: ChatLink,
}

impl AppState {
    #[must_use]
    pub fn new(enquiries: Arc<EnquiryStore>, landing: LandingConfig) -> Self {
        let chat_link = ChatLink::new(&landing.whatsapp_number, landing.whatsapp_message.clone());
        Self {
            enquiries,
            landing,
            chat_link,
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("landing", &self.landing)
            .finish_non_exhaustive()
    }
}
