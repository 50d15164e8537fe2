//! SQLite-backed aggregate store.
//!
//! # Invariants
//! - The `document` column holds the full JSON aggregate.
//! - The `revision` column is authoritative over any revision in JSON.
//! - `campaign_members` mirrors owner + players after every write.

use super::{check_write, CampaignStore, StoreError, StoreResult};
use crate::model::campaign::{Campaign, CampaignId};
use log::{error, info};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction};
use std::time::Instant;
use uuid::Uuid;

const CAMPAIGN_SELECT_SQL: &str = "SELECT uuid, document, revision FROM campaigns";

/// Aggregate store over a migrated SQLite connection.
pub struct SqliteCampaignStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCampaignStore<'conn> {
    /// Wraps a connection returned by `open_db` / `open_db_in_memory`.
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn write(
        &self,
        id: CampaignId,
        campaign: &Campaign,
        expected_revision: Option<u64>,
    ) -> StoreResult<Campaign> {
        let started_at = Instant::now();
        let result = self.write_inner(id, campaign, expected_revision);
        match &result {
            Ok(stored) => info!(
                "event=campaign_replace module=store status=ok campaign_id={id} revision={} conditional={} duration_ms={}",
                stored.revision,
                expected_revision.is_some(),
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=campaign_replace module=store status=error campaign_id={id} conditional={} duration_ms={} error={err}",
                expected_revision.is_some(),
                started_at.elapsed().as_millis()
            ),
        }
        result
    }

    fn write_inner(
        &self,
        id: CampaignId,
        campaign: &Campaign,
        expected_revision: Option<u64>,
    ) -> StoreResult<Campaign> {
        check_write(id, campaign)?;
        let tx = self.conn.unchecked_transaction()?;

        let stored_revision = tx
            .query_row(
                "SELECT revision FROM campaigns WHERE uuid = ?1;",
                [id.to_string()],
                |row| row.get::<_, i64>(0),
            )
            .optional()?
            .ok_or(StoreError::NotFound(id))
            .and_then(revision_from_db)?;

        if let Some(expected) = expected_revision {
            if stored_revision != expected {
                return Err(StoreError::Conflict {
                    id,
                    expected,
                    actual: stored_revision,
                });
            }
        }

        let mut next = campaign.clone();
        next.revision = stored_revision + 1;
        let document = serde_json::to_string(&next)?;

        tx.execute(
            "UPDATE campaigns
             SET
                owner = ?2,
                name = ?3,
                document = ?4,
                revision = ?5,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1;",
            params![
                id.to_string(),
                next.owner.as_str(),
                next.name.as_str(),
                document,
                revision_to_db(next.revision)?,
            ],
        )?;
        replace_members(&tx, &next)?;
        tx.commit()?;

        Ok(next)
    }
}

impl CampaignStore for SqliteCampaignStore<'_> {
    fn fetch(&self, id: CampaignId) -> StoreResult<Campaign> {
        let mut stmt = self
            .conn
            .prepare(&format!("{CAMPAIGN_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => parse_campaign_row(row),
            None => Err(StoreError::NotFound(id)),
        }
    }

    fn fetch_all_for_user(&self, username: &str) -> StoreResult<Vec<Campaign>> {
        let mut stmt = self.conn.prepare(&format!(
            "{CAMPAIGN_SELECT_SQL}
             WHERE uuid IN (
                SELECT campaign_uuid FROM campaign_members WHERE username = ?1
             )
             ORDER BY name ASC, uuid ASC;"
        ))?;
        let mut rows = stmt.query([username])?;
        let mut campaigns = Vec::new();
        while let Some(row) = rows.next()? {
            campaigns.push(parse_campaign_row(row)?);
        }
        Ok(campaigns)
    }

    fn create(&self, campaign: &Campaign) -> StoreResult<Campaign> {
        check_write(campaign.id, campaign)?;
        let tx = self.conn.unchecked_transaction()?;

        let exists: bool = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM campaigns WHERE uuid = ?1);",
            [campaign.id.to_string()],
            |row| row.get(0),
        )?;
        if exists {
            return Err(StoreError::AlreadyExists(campaign.id));
        }

        let mut created = campaign.clone();
        created.revision = 1;
        let document = serde_json::to_string(&created)?;
        tx.execute(
            "INSERT INTO campaigns (uuid, owner, name, document, revision)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                created.id.to_string(),
                created.owner.as_str(),
                created.name.as_str(),
                document,
                revision_to_db(created.revision)?,
            ],
        )?;
        replace_members(&tx, &created)?;
        tx.commit()?;

        info!(
            "event=campaign_create module=store status=ok campaign_id={} owner={}",
            created.id, created.owner
        );
        Ok(created)
    }

    fn replace(&self, id: CampaignId, campaign: &Campaign) -> StoreResult<Campaign> {
        self.write(id, campaign, None)
    }

    fn replace_if_revision(
        &self,
        id: CampaignId,
        campaign: &Campaign,
        expected_revision: u64,
    ) -> StoreResult<Campaign> {
        self.write(id, campaign, Some(expected_revision))
    }
}

fn replace_members(tx: &Transaction<'_>, campaign: &Campaign) -> StoreResult<()> {
    let id = campaign.id.to_string();
    tx.execute(
        "DELETE FROM campaign_members WHERE campaign_uuid = ?1;",
        [id.as_str()],
    )?;
    let mut insert = tx.prepare(
        "INSERT OR IGNORE INTO campaign_members (campaign_uuid, username) VALUES (?1, ?2);",
    )?;
    for username in campaign.members() {
        insert.execute(params![id.as_str(), username])?;
    }
    Ok(())
}

fn parse_campaign_row(row: &Row<'_>) -> StoreResult<Campaign> {
    let uuid_text: String = row.get("uuid")?;
    let id = Uuid::parse_str(&uuid_text).map_err(|_| {
        StoreError::InvalidData(format!("invalid uuid value `{uuid_text}` in campaigns.uuid"))
    })?;

    let document: String = row.get("document")?;
    let mut campaign: Campaign = serde_json::from_str(&document).map_err(|err| {
        StoreError::InvalidData(format!("unreadable document for campaign {id}: {err}"))
    })?;
    if campaign.id != id {
        return Err(StoreError::InvalidData(format!(
            "document id {} stored under campaign {id}",
            campaign.id
        )));
    }

    campaign.revision = revision_from_db(row.get("revision")?)?;
    Ok(campaign)
}

fn revision_to_db(revision: u64) -> StoreResult<i64> {
    i64::try_from(revision)
        .map_err(|_| StoreError::InvalidData(format!("revision {revision} exceeds storage range")))
}

fn revision_from_db(value: i64) -> StoreResult<u64> {
    u64::try_from(value)
        .map_err(|_| StoreError::InvalidData(format!("invalid revision `{value}` in campaigns.revision")))
}

#[cfg(test)]
mod tests {
    use super::SqliteCampaignStore;
    use crate::db::open_db_in_memory;
    use crate::model::campaign::Campaign;
    use crate::store::{CampaignStore, StoreError};

    #[test]
    fn create_then_fetch_roundtrip() {
        let conn = open_db_in_memory().unwrap();
        let store = SqliteCampaignStore::new(&conn);
        let created = store.create(&Campaign::new("dm", "Curse of Strahd")).unwrap();

        let loaded = store.fetch(created.id).unwrap();
        assert_eq!(loaded, created);
        assert_eq!(loaded.revision, 1);
    }

    #[test]
    fn create_twice_is_rejected() {
        let conn = open_db_in_memory().unwrap();
        let store = SqliteCampaignStore::new(&conn);
        let campaign = Campaign::new("dm", "Curse of Strahd");
        store.create(&campaign).unwrap();
        assert!(matches!(
            store.create(&campaign),
            Err(StoreError::AlreadyExists(_))
        ));
    }

    #[test]
    fn replace_assigns_stored_revision_plus_one() {
        let conn = open_db_in_memory().unwrap();
        let store = SqliteCampaignStore::new(&conn);
        let created = store.create(&Campaign::new("dm", "Curse of Strahd")).unwrap();

        let mut ahead = created.clone();
        ahead.revision = 500;
        let echoed = store.replace(created.id, &ahead).unwrap();

        assert_eq!(echoed.revision, 2);
        assert_eq!(store.fetch(created.id).unwrap().revision, 2);
    }

    #[test]
    fn invalid_document_is_not_written() {
        let conn = open_db_in_memory().unwrap();
        let store = SqliteCampaignStore::new(&conn);
        let created = store.create(&Campaign::new("dm", "Curse of Strahd")).unwrap();

        let mut broken = created.clone();
        broken.calendar_settings.months_per_year = 0;
        assert!(matches!(
            store.replace(created.id, &broken),
            Err(StoreError::Validation(_))
        ));
        assert_eq!(store.fetch(created.id).unwrap().revision, 1);
    }

    #[test]
    fn replace_under_foreign_id_is_rejected() {
        let conn = open_db_in_memory().unwrap();
        let store = SqliteCampaignStore::new(&conn);
        let first = store.create(&Campaign::new("dm", "First")).unwrap();
        let second = store.create(&Campaign::new("dm", "Second")).unwrap();
        assert!(matches!(
            store.replace(first.id, &second),
            Err(StoreError::IdMismatch { .. })
        ));
    }
}
