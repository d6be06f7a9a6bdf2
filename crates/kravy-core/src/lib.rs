//! Core library for Kravy lead capture.
//!
//! Contains the persisted [`enquiry::Enquiry`] record, the JSON wire types
//! shared by the HTTP endpoint and its clients, presence validation, and the
//! [`store::EnquiryStore`] that writes records through a
//! `kravy-storage` document store. This crate knows nothing about HTTP
//! servers or UI.

pub mod enquiry;
pub mod error;
pub mod store;
