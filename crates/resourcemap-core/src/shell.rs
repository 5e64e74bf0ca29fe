// SPDX-License-Identifier: AGPL-3.0
// ResourceMap Core - Boot flow and the authenticated shell
//
// The shell only exists for an authenticated session. Each tab's store is
// owned by the shell; nothing is shared between stores.

use crate::donations::{Donation, DonationStatus, DonationStore};
use crate::fixtures;
use crate::listing::{ListingSource, RemoteSource};
use crate::requests::{AidRequest, Organization, RequestStatus, RequestStore};
use crate::session::{SessionManager, SessionStatus};
use crate::types::{AppError, User};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Attribution used when the profile is not known
const UNKNOWN_USER: &str = "Usuário Atual";

/// Where listing stores load their records from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListingBackend {
    /// Built-in sample data
    #[default]
    Fixtures,
    /// `GET /Donations` and `GET /Requests`
    Remote,
}

/// What the app shows after boot
pub enum Route {
    SignedOut,
    SignedIn(Shell),
}

/// Check the stored session and build the shell if it is still valid
pub async fn boot(session: Arc<SessionManager>, backend: ListingBackend) -> Route {
    match session.restore().await {
        SessionStatus::Authenticated(active) => {
            Route::SignedIn(Shell::new(session, active.user.as_ref(), backend))
        }
        SessionStatus::Unauthenticated => Route::SignedOut,
    }
}

/// Counters shown on the home tab
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Overview {
    pub active_donations: usize,
    pub open_requests: usize,
    pub partner_organizations: usize,
    pub matches: usize,
}

/// Authenticated part of the app: session plus one store per listing tab
pub struct Shell {
    session: Arc<SessionManager>,
    pub donations: DonationStore,
    pub requests: RequestStore,
}

impl Shell {
    pub fn new(session: Arc<SessionManager>, user: Option<&User>, backend: ListingBackend) -> Self {
        let donor_name = user
            .map(|u| u.name.clone())
            .unwrap_or_else(|| UNKNOWN_USER.to_string());
        let organization = Organization {
            name: donor_name.clone(),
            contact_info: user
                .map(|u| u.phone.clone().unwrap_or_else(|| u.email.clone()))
                .unwrap_or_default(),
        };

        let (donation_source, request_source): (
            Arc<dyn ListingSource<Donation>>,
            Arc<dyn ListingSource<AidRequest>>,
        ) = match backend {
            ListingBackend::Fixtures => (
                Arc::new(fixtures::donation_source()),
                Arc::new(fixtures::aid_request_source()),
            ),
            ListingBackend::Remote => (
                Arc::new(RemoteSource::<Donation>::new(session.api())),
                Arc::new(RemoteSource::<AidRequest>::new(session.api())),
            ),
        };

        Self {
            session,
            donations: DonationStore::new(donation_source, donor_name),
            requests: RequestStore::new(request_source, organization),
        }
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    /// Load both listing tabs
    pub async fn refresh(&self) -> Result<(), AppError> {
        let (donations, requests) = tokio::join!(self.donations.load(), self.requests.load());
        donations?;
        requests?;
        Ok(())
    }

    pub fn overview(&self) -> Overview {
        let donations = self.donations.list();
        let requests = self.requests.list();

        let partner_organizations = requests
            .iter()
            .map(|r| r.organization.as_str())
            .collect::<BTreeSet<_>>()
            .len();

        Overview {
            active_donations: donations
                .iter()
                .filter(|d| d.status == DonationStatus::Available)
                .count(),
            open_requests: requests
                .iter()
                .filter(|r| r.status == RequestStatus::Open)
                .count(),
            partner_organizations,
            matches: requests
                .iter()
                .filter(|r| r.status != RequestStatus::Open)
                .count(),
        }
    }

    /// Log out and tear the shell down
    pub async fn sign_out(self) -> Route {
        self.session.logout().await;
        Route::SignedOut
    }
}
