// SPDX-License-Identifier: AGPL-3.0
// ResourceMap Core - Aid requests posted by organizations

use crate::forms::{parse_quantity, require};
use crate::listing::{keyed_enum, ListingRecord, ListingStore, Workflow};
use crate::types::AppError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

keyed_enum! {
    pub enum RequestCategory {
        Food => ("food", "Alimentos"),
        Clothing => ("clothing", "Roupas"),
        Medicine => ("medicine", "Medicamentos"),
        Hygiene => ("hygiene", "Higiene"),
        Shelter => ("shelter", "Abrigo"),
        Education => ("education", "Educação"),
        Other => ("other", "Outros"),
    }
}

keyed_enum! {
    /// Request workflow: open -> matched -> fulfilled
    pub enum RequestStatus {
        Open => ("open", "Aberto"),
        Matched => ("matched", "Matched"),
        Fulfilled => ("fulfilled", "Atendido"),
    }
}

keyed_enum! {
    /// How pressing a request is. Set by the organization, never escalated.
    pub enum Urgency {
        Low => ("low", "Baixa"),
        Medium => ("medium", "Média"),
        High => ("high", "Alta"),
    }
}

impl Workflow for RequestStatus {
    const INITIAL: Self = Self::Open;

    fn stages() -> &'static [Self] {
        Self::ALL
    }
}

/// Organization a request is attributed to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Organization {
    pub name: String,
    pub contact_info: String,
}

/// Need posted by an organization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AidRequest {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: RequestCategory,
    pub quantity: u32,
    pub urgency: Urgency,
    pub location: String,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
    pub organization: String,
    pub contact_info: String,
}

/// Request form input; quantity is kept as typed
#[derive(Debug, Clone)]
pub struct AidRequestDraft {
    pub title: String,
    pub description: String,
    pub category: RequestCategory,
    pub quantity: String,
    pub urgency: Urgency,
    pub location: String,
}

impl Default for AidRequestDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            category: RequestCategory::Food,
            quantity: "1".to_string(),
            urgency: Urgency::Medium,
            location: String::new(),
        }
    }
}

impl AidRequestDraft {
    fn validate(&self) -> Result<(String, String, String, u32), AppError> {
        Ok((
            require("Title", &self.title)?,
            require("Description", &self.description)?,
            require("Location", &self.location)?,
            parse_quantity(&self.quantity),
        ))
    }
}

impl ListingRecord for AidRequest {
    type Status = RequestStatus;
    type Category = RequestCategory;
    type Draft = AidRequestDraft;
    type Attribution = Organization;

    const COLLECTION: &'static str = "Requests";

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn status(&self) -> RequestStatus {
        self.status
    }

    fn set_status(&mut self, status: RequestStatus) {
        self.status = status;
    }

    fn category(&self) -> RequestCategory {
        self.category
    }

    fn urgency(&self) -> Option<Urgency> {
        Some(self.urgency)
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.title.as_str(),
            self.description.as_str(),
            self.organization.as_str(),
        ]
    }

    fn from_draft(
        draft: &AidRequestDraft,
        id: String,
        created_at: DateTime<Utc>,
        organization: &Organization,
    ) -> Result<Self, AppError> {
        let (title, description, location, quantity) = draft.validate()?;
        Ok(Self {
            id,
            title,
            description,
            category: draft.category,
            quantity,
            urgency: draft.urgency,
            location,
            status: RequestStatus::INITIAL,
            created_at,
            organization: organization.name.clone(),
            contact_info: organization.contact_info.clone(),
        })
    }

    fn apply_draft(&mut self, draft: &AidRequestDraft) -> Result<(), AppError> {
        let (title, description, location, quantity) = draft.validate()?;
        self.title = title;
        self.description = description;
        self.category = draft.category;
        self.quantity = quantity;
        self.urgency = draft.urgency;
        self.location = location;
        Ok(())
    }
}

/// Store backing the requests screen
pub type RequestStore = ListingStore<AidRequest>;

impl ListingStore<AidRequest> {
    /// Commit to an open request
    pub fn match_request(&self, id: &str) -> Result<AidRequest, AppError> {
        self.transition_status(id, RequestStatus::Matched)
    }

    pub fn mark_fulfilled(&self, id: &str) -> Result<AidRequest, AppError> {
        self.transition_status(id, RequestStatus::Fulfilled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::listing::{Choice, FixtureSource, ListingFilter};
    use std::sync::Arc;

    async fn loaded_store() -> RequestStore {
        let store = RequestStore::new(
            Arc::new(FixtureSource::new(fixtures::aid_requests())),
            Organization {
                name: "ONG Esperança".to_string(),
                contact_info: "contato@esperanca.org.br".to_string(),
            },
        );
        store.load().await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_search_includes_organization() {
        let store = loaded_store().await;
        let found = store.filter(&ListingFilter::text("mãos solidárias"));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "Produtos de higiene pessoal");
    }

    #[tokio::test]
    async fn test_filters_compose() {
        let store = loaded_store().await;

        let high = ListingFilter {
            urgency: Choice::Only(Urgency::High),
            ..ListingFilter::default()
        };
        assert_eq!(store.filter(&high).len(), 2);

        let high_food = ListingFilter {
            category: Choice::Only(RequestCategory::Food),
            ..high.clone()
        };
        let found = store.filter(&high_food);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].organization, "ONG Esperança");

        let high_education = ListingFilter {
            category: Choice::Only(RequestCategory::Education),
            ..high
        };
        assert!(store.filter(&high_education).is_empty());
    }

    #[tokio::test]
    async fn test_match_open_request() {
        let store = loaded_store().await;

        let matched = store.match_request("1").unwrap();
        assert_eq!(matched.status, RequestStatus::Matched);

        // Already matched
        assert!(matches!(
            store.match_request("3"),
            Err(AppError::InvalidTransition { .. })
        ));
        assert_eq!(store.mark_fulfilled("3").unwrap().status, RequestStatus::Fulfilled);
    }

    #[tokio::test]
    async fn test_create_and_update_keep_organization() {
        let store = loaded_store().await;
        let draft = AidRequestDraft {
            title: "Colchões".to_string(),
            description: "Colchões para abrigo temporário".to_string(),
            category: RequestCategory::Shelter,
            quantity: "40".to_string(),
            urgency: Urgency::High,
            location: "Canoas, RS".to_string(),
        };

        let created = store.create(&draft).unwrap();
        assert_eq!(created.status, RequestStatus::Open);
        assert_eq!(created.organization, "ONG Esperança");
        assert_eq!(store.list()[0].id, created.id);

        let updated = store
            .update(
                &created.id,
                &AidRequestDraft {
                    urgency: Urgency::Low,
                    ..draft
                },
            )
            .unwrap();
        assert_eq!(updated.urgency, Urgency::Low);
        assert_eq!(updated.contact_info, "contato@esperanca.org.br");
        assert_eq!(updated.created_at, created.created_at);
    }

    #[test]
    fn test_urgency_parsing() {
        assert_eq!("HIGH".parse::<Urgency>().unwrap(), Urgency::High);
        assert_eq!(Urgency::Medium.label(), "Média");
        assert!("critical".parse::<Urgency>().is_err());
    }
}
