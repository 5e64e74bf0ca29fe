// SPDX-License-Identifier: AGPL-3.0
// ResourceMap Core - Listing stores
//
// One in-memory store per screen, generic over the record kind.
// Collections are kept newest-first. Mutations are local; only `load`
// talks to a source, and only the most recently requested load may
// replace the snapshot.

use crate::client::ApiClient;
use crate::requests::Urgency;
use crate::types::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use uuid::Uuid;

/// Closed enum with a wire key, a display label and parsing from the key
macro_rules! keyed_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($variant:ident => ($key:literal, $label:literal)),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        $vis enum $name {
            $(#[serde(rename = $key)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn key(&self) -> &'static str {
                match self {
                    $(Self::$variant => $key),+
                }
            }

            pub fn label(&self) -> &'static str {
                match self {
                    $(Self::$variant => $label),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.key())
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::types::AppError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let key = s.trim().to_ascii_lowercase();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.key() == key)
                    .ok_or_else(|| {
                        $crate::types::AppError::Validation(format!(
                            "Unknown {}: {}",
                            stringify!($name),
                            s
                        ))
                    })
            }
        }
    };
}

pub(crate) use keyed_enum;

/// Ordered status progression of a record kind
pub trait Workflow: Copy + Eq + fmt::Display + Send + Sync + 'static {
    /// Status of a newly created record
    const INITIAL: Self;

    /// All statuses in workflow order
    fn stages() -> &'static [Self];

    /// The only status a record may move to from `self`
    fn next(self) -> Option<Self> {
        let stages = Self::stages();
        let position = stages.iter().position(|s| *s == self)?;
        stages.get(position + 1).copied()
    }
}

/// A record held by a [`ListingStore`]
pub trait ListingRecord: Clone + Send + Sync + Serialize + DeserializeOwned + 'static {
    type Status: Workflow;
    type Category: Copy + Eq + Send + Sync + 'static;
    /// Form input used to create or edit a record
    type Draft;
    /// Who the record is attributed to; fixed at creation
    type Attribution: Clone + Send + Sync + 'static;

    /// API collection name, e.g. `Donations`
    const COLLECTION: &'static str;

    fn id(&self) -> &str;
    fn created_at(&self) -> DateTime<Utc>;
    fn status(&self) -> Self::Status;
    fn set_status(&mut self, status: Self::Status);
    fn category(&self) -> Self::Category;

    fn urgency(&self) -> Option<Urgency> {
        None
    }

    /// Fields matched by free-text search
    fn search_fields(&self) -> Vec<&str>;

    /// Validate a draft and build a new record from it
    fn from_draft(
        draft: &Self::Draft,
        id: String,
        created_at: DateTime<Utc>,
        attribution: &Self::Attribution,
    ) -> Result<Self, AppError>;

    /// Validate a draft and overwrite the mutable fields; untouched on error
    fn apply_draft(&mut self, draft: &Self::Draft) -> Result<(), AppError>;
}

/// Filter value that is either the `all` sentinel or one exact value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Choice<T> {
    #[default]
    All,
    Only(T),
}

impl<T: PartialEq> Choice<T> {
    pub fn matches(&self, value: &T) -> bool {
        match self {
            Self::All => true,
            Self::Only(expected) => expected == value,
        }
    }

    fn matches_optional(&self, value: Option<&T>) -> bool {
        match (self, value) {
            (Self::All, _) => true,
            (Self::Only(expected), Some(value)) => expected == value,
            (Self::Only(_), None) => false,
        }
    }
}

impl<T: FromStr> FromStr for Choice<T> {
    type Err = T::Err;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(Self::All)
        } else {
            s.parse().map(Self::Only)
        }
    }
}

/// Search text plus category and urgency choices, combined with AND
#[derive(Debug, Clone)]
pub struct ListingFilter<C> {
    pub text: String,
    pub category: Choice<C>,
    pub urgency: Choice<Urgency>,
}

impl<C> Default for ListingFilter<C> {
    fn default() -> Self {
        Self {
            text: String::new(),
            category: Choice::All,
            urgency: Choice::All,
        }
    }
}

impl<C> ListingFilter<C> {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }
}

impl<C: PartialEq> ListingFilter<C> {
    pub fn matches<R: ListingRecord<Category = C>>(&self, record: &R) -> bool {
        let needle = self.text.trim().to_lowercase();
        let text_match = needle.is_empty()
            || record
                .search_fields()
                .iter()
                .any(|field| field.to_lowercase().contains(&needle));

        text_match
            && self.category.matches(&record.category())
            && self.urgency.matches_optional(record.urgency().as_ref())
    }
}

/// Explicit answer to a destructive-action prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed,
    Declined,
}

/// Where a store's records come from
#[async_trait]
pub trait ListingSource<R>: Send + Sync {
    async fn fetch(&self) -> Result<Vec<R>, AppError>;
}

/// In-memory source, seeded by the caller
pub struct FixtureSource<R> {
    records: RwLock<Vec<R>>,
    failure: RwLock<Option<String>>,
}

impl<R: Clone> FixtureSource<R> {
    pub fn new(records: Vec<R>) -> Self {
        Self {
            records: RwLock::new(records),
            failure: RwLock::new(None),
        }
    }

    pub fn set_records(&self, records: Vec<R>) {
        *self.records.write().unwrap() = records;
    }

    /// Make every following fetch fail with a network error
    pub fn fail_with(&self, message: impl Into<String>) {
        *self.failure.write().unwrap() = Some(message.into());
    }

    pub fn recover(&self) {
        *self.failure.write().unwrap() = None;
    }
}

#[async_trait]
impl<R: Clone + Send + Sync> ListingSource<R> for FixtureSource<R> {
    async fn fetch(&self) -> Result<Vec<R>, AppError> {
        if let Some(message) = self.failure.read().unwrap().clone() {
            return Err(AppError::Network(message));
        }
        Ok(self.records.read().unwrap().clone())
    }
}

/// Source reading `GET /{collection}` through the API client
pub struct RemoteSource<R> {
    api: Arc<ApiClient>,
    _record: PhantomData<fn() -> R>,
}

impl<R> RemoteSource<R> {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self {
            api,
            _record: PhantomData,
        }
    }
}

#[async_trait]
impl<R: ListingRecord> ListingSource<R> for RemoteSource<R> {
    async fn fetch(&self) -> Result<Vec<R>, AppError> {
        let path = format!("/{}", R::COLLECTION);
        let fallback = format!("Failed to load {}", R::COLLECTION.to_lowercase());
        self.api.get_collection(&path, &fallback).await
    }
}

/// In-memory collection backing one screen
pub struct ListingStore<R: ListingRecord> {
    records: RwLock<Vec<R>>,
    generation: AtomicU64,
    source: Arc<dyn ListingSource<R>>,
    attribution: R::Attribution,
}

fn newest_first<R: ListingRecord>(records: &mut [R]) {
    records.sort_by_key(|r| std::cmp::Reverse(r.created_at()));
}

impl<R: ListingRecord> ListingStore<R> {
    /// Create an empty store; `attribution` is stamped on records created here
    pub fn new(source: Arc<dyn ListingSource<R>>, attribution: R::Attribution) -> Self {
        Self {
            records: RwLock::new(Vec::new()),
            generation: AtomicU64::new(0),
            source,
            attribution,
        }
    }

    /// Reload from the source.
    ///
    /// The snapshot is replaced only once the new data is in, and only if no
    /// newer load was requested meanwhile. On failure the old snapshot stays.
    pub async fn load(&self) -> Result<Vec<R>, AppError> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let mut fetched = self.source.fetch().await.map_err(|e| {
            tracing::warn!("Failed to load {}: {}", R::COLLECTION, e);
            e
        })?;
        newest_first(&mut fetched);

        let mut records = self.records.write().unwrap();
        if self.generation.load(Ordering::SeqCst) != generation {
            tracing::debug!(
                "Discarding stale {} load (generation {})",
                R::COLLECTION,
                generation
            );
            return Ok(records.clone());
        }

        *records = fetched;
        tracing::info!("Loaded {} {}", records.len(), R::COLLECTION);
        Ok(records.clone())
    }

    pub fn list(&self) -> Vec<R> {
        self.records.read().unwrap().clone()
    }

    pub fn get(&self, id: &str) -> Option<R> {
        self.records
            .read()
            .unwrap()
            .iter()
            .find(|r| r.id() == id)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.records.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Validate the draft and prepend a new record
    pub fn create(&self, draft: &R::Draft) -> Result<R, AppError> {
        let record = R::from_draft(
            draft,
            Uuid::now_v7().to_string(),
            Utc::now(),
            &self.attribution,
        )?;

        self.records.write().unwrap().insert(0, record.clone());
        tracing::info!("Created {} record {}", R::COLLECTION, record.id());
        Ok(record)
    }

    /// Overwrite the mutable fields of an existing record
    pub fn update(&self, id: &str, draft: &R::Draft) -> Result<R, AppError> {
        let mut records = self.records.write().unwrap();
        let record = records
            .iter_mut()
            .find(|r| r.id() == id)
            .ok_or_else(|| AppError::NotFound(format!("{} record {}", R::COLLECTION, id)))?;

        record.apply_draft(draft)?;
        Ok(record.clone())
    }

    /// Remove a record after explicit confirmation.
    ///
    /// Returns whether anything was removed; an unknown id is not an error.
    pub fn delete(&self, id: &str, confirmation: Confirmation) -> bool {
        if confirmation == Confirmation::Declined {
            return false;
        }

        let mut records = self.records.write().unwrap();
        let original_len = records.len();
        records.retain(|r| r.id() != id);

        let removed = records.len() != original_len;
        if removed {
            tracing::info!("Deleted {} record {}", R::COLLECTION, id);
        }
        removed
    }

    pub fn filter(&self, filter: &ListingFilter<R::Category>) -> Vec<R> {
        self.records
            .read()
            .unwrap()
            .iter()
            .filter(|r| filter.matches(*r))
            .cloned()
            .collect()
    }

    /// Move a record one step forward in its workflow
    pub fn transition_status(&self, id: &str, next: R::Status) -> Result<R, AppError> {
        let mut records = self.records.write().unwrap();
        let record = records
            .iter_mut()
            .find(|r| r.id() == id)
            .ok_or_else(|| AppError::NotFound(format!("{} record {}", R::COLLECTION, id)))?;

        let current = record.status();
        if current.next() != Some(next) {
            return Err(AppError::InvalidTransition {
                from: current.to_string(),
                to: next.to_string(),
            });
        }

        record.set_status(next);
        Ok(record.clone())
    }

    /// Record count per status, in workflow order
    pub fn summary(&self) -> Vec<(R::Status, usize)> {
        let records = self.records.read().unwrap();
        R::Status::stages()
            .iter()
            .map(|stage| (*stage, records.iter().filter(|r| r.status() == *stage).count()))
            .collect()
    }
}
