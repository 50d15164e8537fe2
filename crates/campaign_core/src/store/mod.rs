//! Aggregate store contract and implementations.
//!
//! # Responsibility
//! - Define the fetch/create/full-replace contract every UI surface writes
//!   through.
//! - Report not-found distinctly from transport failures.
//!
//! # Invariants
//! - Writes replace the whole document; there is no field-level patch.
//! - `replace` is unconditional last-write-wins.
//! - `replace_if_revision` rejects writes based on a stale revision.
//! - Every successful write bumps the stored revision by one and echoes
//!   the persisted document.

mod memory_store;
mod sqlite_store;

pub use memory_store::MemoryCampaignStore;
pub use sqlite_store::SqliteCampaignStore;

use crate::db::DbError;
use crate::model::campaign::{Campaign, CampaignId, CampaignValidationError};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Aggregate store failures.
#[derive(Debug)]
pub enum StoreError {
    NotFound(CampaignId),
    AlreadyExists(CampaignId),
    /// Document id does not match the id it was submitted under.
    IdMismatch {
        path_id: CampaignId,
        document_id: CampaignId,
    },
    /// Conditional write lost against a newer stored revision.
    Conflict {
        id: CampaignId,
        expected: u64,
        actual: u64,
    },
    Validation(CampaignValidationError),
    Db(DbError),
    Serialization(serde_json::Error),
    InvalidData(String),
    Unavailable(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "campaign not found: {id}"),
            Self::AlreadyExists(id) => write!(f, "campaign already exists: {id}"),
            Self::IdMismatch {
                path_id,
                document_id,
            } => write!(
                f,
                "campaign document id {document_id} does not match target {path_id}"
            ),
            Self::Conflict {
                id,
                expected,
                actual,
            } => write!(
                f,
                "campaign {id} changed concurrently: expected revision {expected}, found {actual}"
            ),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::Serialization(err) => write!(f, "campaign document serialization failed: {err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted campaign data: {message}"),
            Self::Unavailable(message) => write!(f, "campaign store unavailable: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::Serialization(err) => Some(err),
            _ => None,
        }
    }
}

impl From<CampaignValidationError> for StoreError {
    fn from(value: CampaignValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value)
    }
}

/// Persistence contract for campaign aggregates.
pub trait CampaignStore {
    /// Loads one aggregate; missing ids return `StoreError::NotFound`.
    fn fetch(&self, id: CampaignId) -> StoreResult<Campaign>;
    /// Lists aggregates the user owns or plays in, ordered by name.
    fn fetch_all_for_user(&self, username: &str) -> StoreResult<Vec<Campaign>>;
    /// Persists a new aggregate at revision 1 and echoes it.
    fn create(&self, campaign: &Campaign) -> StoreResult<Campaign>;
    /// Overwrites the whole stored document and echoes it.
    fn replace(&self, id: CampaignId, campaign: &Campaign) -> StoreResult<Campaign>;
    /// Overwrites only when the stored revision equals `expected_revision`.
    fn replace_if_revision(
        &self,
        id: CampaignId,
        campaign: &Campaign,
        expected_revision: u64,
    ) -> StoreResult<Campaign>;
}

impl<T: CampaignStore + ?Sized> CampaignStore for &T {
    fn fetch(&self, id: CampaignId) -> StoreResult<Campaign> {
        (**self).fetch(id)
    }

    fn fetch_all_for_user(&self, username: &str) -> StoreResult<Vec<Campaign>> {
        (**self).fetch_all_for_user(username)
    }

    fn create(&self, campaign: &Campaign) -> StoreResult<Campaign> {
        (**self).create(campaign)
    }

    fn replace(&self, id: CampaignId, campaign: &Campaign) -> StoreResult<Campaign> {
        (**self).replace(id, campaign)
    }

    fn replace_if_revision(
        &self,
        id: CampaignId,
        campaign: &Campaign,
        expected_revision: u64,
    ) -> StoreResult<Campaign> {
        (**self).replace_if_revision(id, campaign, expected_revision)
    }
}

/// Shared pre-write checks for every store implementation.
fn check_write(id: CampaignId, campaign: &Campaign) -> StoreResult<()> {
    if campaign.id != id {
        return Err(StoreError::IdMismatch {
            path_id: id,
            document_id: campaign.id,
        });
    }
    campaign.validate()?;
    Ok(())
}
