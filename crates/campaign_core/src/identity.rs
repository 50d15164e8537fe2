//! Caller identity supplied by the external session layer.
//!
//! Core never authenticates; it only consumes the username and derives the
//! owner/non-owner role against a campaign.

use crate::model::campaign::Campaign;

/// Authenticated user issuing a request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Caller {
    username: String,
}

impl Caller {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Owner (campaign creator) role check.
    pub fn is_owner_of(&self, campaign: &Campaign) -> bool {
        campaign.is_owner(&self.username)
    }

    /// Whether this caller may open the campaign at all.
    pub fn can_open(&self, campaign: &Campaign) -> bool {
        campaign.is_member(&self.username)
    }
}
