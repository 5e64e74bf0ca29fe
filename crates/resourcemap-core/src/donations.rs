// SPDX-License-Identifier: AGPL-3.0
// ResourceMap Core - Donations

use crate::forms::{parse_quantity, require};
use crate::listing::{keyed_enum, ListingRecord, ListingStore, Workflow};
use crate::types::AppError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

keyed_enum! {
    /// What kind of goods a donation offers
    pub enum DonationCategory {
        Food => ("food", "Alimentos"),
        Clothing => ("clothing", "Roupas"),
        Medicine => ("medicine", "Medicamentos"),
        Hygiene => ("hygiene", "Higiene"),
        Other => ("other", "Outros"),
    }
}

keyed_enum! {
    /// Donation workflow: available -> reserved -> delivered
    pub enum DonationStatus {
        Available => ("available", "Disponível"),
        Reserved => ("reserved", "Reservado"),
        Delivered => ("delivered", "Entregue"),
    }
}

impl Workflow for DonationStatus {
    const INITIAL: Self = Self::Available;

    fn stages() -> &'static [Self] {
        Self::ALL
    }
}

/// Goods offered by a donor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Donation {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: DonationCategory,
    pub quantity: u32,
    pub location: String,
    pub status: DonationStatus,
    pub created_at: DateTime<Utc>,
    pub donor_name: String,
}

/// Donation form input; quantity is kept as typed
#[derive(Debug, Clone)]
pub struct DonationDraft {
    pub title: String,
    pub description: String,
    pub category: DonationCategory,
    pub quantity: String,
    pub location: String,
}

impl Default for DonationDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            category: DonationCategory::Food,
            quantity: "1".to_string(),
            location: String::new(),
        }
    }
}

impl From<&Donation> for DonationDraft {
    /// Prefill the edit form from an existing donation
    fn from(donation: &Donation) -> Self {
        Self {
            title: donation.title.clone(),
            description: donation.description.clone(),
            category: donation.category,
            quantity: donation.quantity.to_string(),
            location: donation.location.clone(),
        }
    }
}

struct ValidDonation {
    title: String,
    description: String,
    location: String,
    quantity: u32,
}

impl DonationDraft {
    fn validate(&self) -> Result<ValidDonation, AppError> {
        Ok(ValidDonation {
            title: require("Title", &self.title)?,
            description: require("Description", &self.description)?,
            location: require("Location", &self.location)?,
            quantity: parse_quantity(&self.quantity),
        })
    }
}

impl ListingRecord for Donation {
    type Status = DonationStatus;
    type Category = DonationCategory;
    type Draft = DonationDraft;
    /// Donor name
    type Attribution = String;

    const COLLECTION: &'static str = "Donations";

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn status(&self) -> DonationStatus {
        self.status
    }

    fn set_status(&mut self, status: DonationStatus) {
        self.status = status;
    }

    fn category(&self) -> DonationCategory {
        self.category
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![self.title.as_str(), self.description.as_str()]
    }

    fn from_draft(
        draft: &DonationDraft,
        id: String,
        created_at: DateTime<Utc>,
        donor_name: &String,
    ) -> Result<Self, AppError> {
        let valid = draft.validate()?;
        Ok(Self {
            id,
            title: valid.title,
            description: valid.description,
            category: draft.category,
            quantity: valid.quantity,
            location: valid.location,
            status: DonationStatus::INITIAL,
            created_at,
            donor_name: donor_name.clone(),
        })
    }

    fn apply_draft(&mut self, draft: &DonationDraft) -> Result<(), AppError> {
        let valid = draft.validate()?;
        self.title = valid.title;
        self.description = valid.description;
        self.category = draft.category;
        self.quantity = valid.quantity;
        self.location = valid.location;
        Ok(())
    }
}

/// Store backing the donations screen
pub type DonationStore = ListingStore<Donation>;

impl ListingStore<Donation> {
    /// Reserve an available donation
    pub fn reserve(&self, id: &str) -> Result<Donation, AppError> {
        self.transition_status(id, DonationStatus::Reserved)
    }

    /// Mark a reserved donation as delivered
    pub fn mark_delivered(&self, id: &str) -> Result<Donation, AppError> {
        self.transition_status(id, DonationStatus::Delivered)
    }
}
