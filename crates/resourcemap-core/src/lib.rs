// SPDX-License-Identifier: AGPL-3.0
// ResourceMap Core - Shared logic for all frontends
//
// This crate provides:
// - AppError, User and ClientSettings types
// - SettingsStore and FileKeyValueStore for local persistence
// - ApiClient and SessionManager for the authentication lifecycle
// - ListingStore for the donations and requests tabs
// - Shell and boot() for deciding what an app shows at start-up
//
// Frontend-specific code lives in separate crates.

pub mod client;
pub mod donations;
pub mod fixtures;
pub mod forms;
pub mod listing;
pub mod requests;
pub mod session;
pub mod settings;
pub mod shell;
pub mod storage;
pub mod types;

#[cfg(test)]
mod test_support;

// Re-export commonly used items
pub use client::ApiClient;
pub use donations::{Donation, DonationCategory, DonationDraft, DonationStatus, DonationStore};
pub use forms::{ChangePasswordForm, RegisterForm};
pub use listing::{
    Choice, Confirmation, FixtureSource, ListingFilter, ListingRecord, ListingSource,
    ListingStore, RemoteSource, Workflow,
};
pub use requests::{
    AidRequest, AidRequestDraft, Organization, RequestCategory, RequestStatus, RequestStore,
    Urgency,
};
pub use session::{Session, SessionManager, SessionStatus};
pub use settings::SettingsStore;
pub use shell::{boot, ListingBackend, Overview, Route, Shell};
pub use storage::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore};
pub use types::{AppError, AuthResponse, ClientSettings, Role, User};
