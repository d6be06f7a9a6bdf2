//! Behavioural core of the Kravy site widgets.
//!
//! The widgets are modelled as plain Rust components that produce view
//! state instead of markup, so they can be driven and tested without a
//! browser:
//!
//! - [`dialog::LeadDialog`]: the lead-capture popup, an async state machine
//!   with cancellable auto-open and auto-close timers
//! - [`phone`]: the client-side mobile number guard
//! - [`submitter`]: the [`submitter::EnquirySubmitter`] seam and its
//!   `reqwest` implementation
//! - [`theme::ThemeToggle`]: light/dark toggle over an injected preference
//! - [`chat_link::ChatLink`]: the floating WhatsApp link

pub mod chat_link;
pub mod dialog;
pub mod phone;
pub mod session;
pub mod submitter;
pub mod theme;
