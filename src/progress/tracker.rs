// Readerly - Reading Shelves and Club Progress
// Copyright (C) 2026 Readerly contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.


//! Per-club reading progress
//!
//! Each (club, edition) pair tracks a status and a page position that have to
//! stay consistent with each other. The status field does not enforce its own
//! transitions, so resolution happens here before anything is persisted:
//!
//! - the page is clamped to `[0, total_pages]` when the total is known
//! - a clamped page that meets the total forces `Completed`, whatever status
//!   was selected in the same update
//! - a page update on a `NotStarted` record with no explicit status promotes
//!   it to `Reading` (a page position is evidence that reading started)
//! - otherwise an explicit status wins, including an explicit `Completed`
//!   before the last page
//!
//! Records are created implicitly by the first update and are never deleted
//! here; their lifecycle belongs to club membership.

use crate::api::remote::RemoteCollection;
use crate::api::wire::{ProgressRecord, ProgressUpdateRecord};
use crate::error::{Result, ShelfError};
use crate::model::{ClubId, EditionId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Reading status within a club
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadingStatus {
    NotStarted,
    Reading,
    OnHold,
    Completed,
}

impl ReadingStatus {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "not_started" => Some(ReadingStatus::NotStarted),
            "reading" => Some(ReadingStatus::Reading),
            "on_hold" => Some(ReadingStatus::OnHold),
            "completed" => Some(ReadingStatus::Completed),
            _ => None,
        }
    }

    pub fn as_tag(&self) -> &'static str {
        match self {
            ReadingStatus::NotStarted => "not_started",
            ReadingStatus::Reading => "reading",
            ReadingStatus::OnHold => "on_hold",
            ReadingStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for ReadingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}

/// Persisted progress of one member for one edition within a club
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReadingProgress {
    pub club: ClubId,
    pub edition: EditionId,
    pub status: ReadingStatus,
    pub current_page: u32,

    /// Total page count when book metadata supplied one
    pub total_pages: Option<u32>,

    pub updated_at: DateTime<Utc>,
}

impl ReadingProgress {
    /// The implicit starting point before any update was persisted
    pub fn not_started(club: ClubId, edition: EditionId) -> Self {
        Self {
            club,
            edition,
            status: ReadingStatus::NotStarted,
            current_page: 0,
            total_pages: None,
            updated_at: Utc::now(),
        }
    }

    fn from_record(club: ClubId, record: ProgressRecord, total_pages: Option<u32>) -> Self {
        Self {
            club,
            // an unknown status tag from a newer server is shown as Reading
            // rather than failing the whole view
            status: ReadingStatus::from_tag(&record.status).unwrap_or(ReadingStatus::Reading),
            current_page: record.current_page,
            total_pages: total_pages.or(record.total_pages),
            updated_at: record.updated_at.unwrap_or_else(Utc::now),
            edition: record.edition_id,
        }
    }
}

/// One requested change: an optional explicit status and a page position.
///
/// The page is a signed integer so out-of-range input can be rejected with
/// `ValidationError` instead of being silently reinterpreted.
#[derive(Debug, Clone, Deserialize)]
pub struct ProgressUpdate {
    #[serde(default)]
    pub status: Option<ReadingStatus>,
    pub current_page: i64,
}

impl ProgressUpdate {
    pub fn page(current_page: i64) -> Self {
        Self {
            status: None,
            current_page,
        }
    }

    pub fn with_status(status: ReadingStatus, current_page: i64) -> Self {
        Self {
            status: Some(status),
            current_page,
        }
    }
}

/// Resolve the status/page pair an update should persist.
///
/// Pure so the transition rules can be tested without a remote.
fn resolve(
    current_status: ReadingStatus,
    update: &ProgressUpdate,
    total_pages: Option<u32>,
) -> Result<(ReadingStatus, u32)> {
    if update.current_page < 0 {
        return Err(ShelfError::validation(format!(
            "page number must be non-negative, got {}",
            update.current_page
        )));
    }
    let mut page = u32::try_from(update.current_page)
        .map_err(|_| ShelfError::validation("page number out of range"))?;

    if let Some(total) = total_pages {
        page = page.min(total);
    }

    // crossing the total always means finished, whatever was selected
    if matches!(total_pages, Some(total) if total > 0 && page >= total) {
        return Ok((ReadingStatus::Completed, page));
    }

    let status = match update.status {
        Some(explicit) => explicit,
        None if current_status == ReadingStatus::NotStarted && page > 0 => ReadingStatus::Reading,
        None => current_status,
    };
    Ok((status, page))
}

/// Reads and persists club-scoped reading progress
pub struct ProgressTracker {
    remote: Arc<dyn RemoteCollection>,
    cache: RwLock<HashMap<(ClubId, EditionId), ReadingProgress>>,
}

impl ProgressTracker {
    pub fn new(remote: Arc<dyn RemoteCollection>) -> Self {
        Self {
            remote,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Current progress for one edition in one club. Absence of a remote
    /// record means reading has not started.
    ///
    /// # Errors
    /// `AuthRequired`, `RemoteUnavailable`.
    pub async fn fetch(&self, club: &ClubId, edition: &EditionId) -> Result<ReadingProgress> {
        let record = self.remote.fetch_progress(club, edition).await?;
        let progress = match record {
            Some(record) => ReadingProgress::from_record(club.clone(), record, None),
            None => ReadingProgress::not_started(club.clone(), edition.clone()),
        };
        self.cache
            .write()
            .await
            .insert((club.clone(), edition.clone()), progress.clone());
        Ok(progress)
    }

    /// Apply an update and persist the resolved progress.
    ///
    /// `total_pages` comes from book metadata when the caller has it; passing
    /// `None` leaves the page unclamped and disables completion forcing.
    ///
    /// # Errors
    /// `ValidationError` before any network call for out-of-range input;
    /// `AuthRequired`/`RemoteUnavailable` from persistence. A failed persist
    /// leaves the cached progress untouched.
    pub async fn update(
        &self,
        club: &ClubId,
        edition: &EditionId,
        update: ProgressUpdate,
        total_pages: Option<u32>,
    ) -> Result<ReadingProgress> {
        let cached = self
            .cache
            .read()
            .await
            .get(&(club.clone(), edition.clone()))
            .cloned();
        let current = match cached {
            Some(progress) => progress,
            None => self.fetch(club, edition).await?,
        };
        let total_pages = total_pages.or(current.total_pages);

        let (status, page) = resolve(current.status, &update, total_pages)?;

        let record = ProgressUpdateRecord {
            edition_id: edition.clone(),
            status: status.as_tag().to_string(),
            current_page: page,
        };
        let persisted = self.remote.update_progress(club, &record).await?;
        debug!(club = %club, edition = %edition, status = %status, page, "progress persisted");

        let progress = ReadingProgress::from_record(club.clone(), persisted, total_pages);
        self.cache
            .write()
            .await
            .insert((club.clone(), edition.clone()), progress.clone());
        Ok(progress)
    }
}

// ===== TESTS =====

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex as StdMutex;

    #[test]
    fn test_negative_page_is_rejected() {
        let err = resolve(
            ReadingStatus::Reading,
            &ProgressUpdate::page(-1),
            Some(300),
        )
        .unwrap_err();
        assert!(matches!(err, ShelfError::ValidationError(_)));
    }

    #[test]
    fn test_page_clamped_to_total() {
        let (status, page) = resolve(
            ReadingStatus::Reading,
            &ProgressUpdate::page(450),
            Some(300),
        )
        .unwrap();
        assert_eq!(page, 300);
        assert_eq!(status, ReadingStatus::Completed);
    }

    #[test]
    fn test_unknown_total_leaves_page_unclamped() {
        let (status, page) =
            resolve(ReadingStatus::Reading, &ProgressUpdate::page(450), None).unwrap();
        assert_eq!(page, 450);
        assert_eq!(status, ReadingStatus::Reading);
    }

    #[test]
    fn test_completion_overrides_explicit_status() {
        let (status, _) = resolve(
            ReadingStatus::Reading,
            &ProgressUpdate::with_status(ReadingStatus::OnHold, 300),
            Some(300),
        )
        .unwrap();
        assert_eq!(status, ReadingStatus::Completed);
    }

    #[test]
    fn test_zero_total_never_forces_completion() {
        let (status, page) =
            resolve(ReadingStatus::NotStarted, &ProgressUpdate::page(0), Some(0)).unwrap();
        assert_eq!(status, ReadingStatus::NotStarted);
        assert_eq!(page, 0);
    }

    #[test]
    fn test_page_update_promotes_not_started_to_reading() {
        let (status, page) = resolve(
            ReadingStatus::NotStarted,
            &ProgressUpdate::page(5),
            Some(300),
        )
        .unwrap();
        assert_eq!(status, ReadingStatus::Reading);
        assert_eq!(page, 5);
    }

    #[test]
    fn test_explicit_status_wins_over_promotion() {
        let (status, _) = resolve(
            ReadingStatus::NotStarted,
            &ProgressUpdate::with_status(ReadingStatus::NotStarted, 5),
            Some(300),
        )
        .unwrap();
        assert_eq!(status, ReadingStatus::NotStarted);
    }

    #[test]
    fn test_explicit_completed_before_last_page() {
        let (status, page) = resolve(
            ReadingStatus::Reading,
            &ProgressUpdate::with_status(ReadingStatus::Completed, 120),
            Some(300),
        )
        .unwrap();
        assert_eq!(status, ReadingStatus::Completed);
        assert_eq!(page, 120);
    }

    #[test]
    fn test_on_hold_round_trip() {
        let (status, _) = resolve(
            ReadingStatus::Reading,
            &ProgressUpdate::with_status(ReadingStatus::OnHold, 42),
            Some(300),
        )
        .unwrap();
        assert_eq!(status, ReadingStatus::OnHold);

        let (status, _) = resolve(
            ReadingStatus::OnHold,
            &ProgressUpdate::with_status(ReadingStatus::Reading, 43),
            Some(300),
        )
        .unwrap();
        assert_eq!(status, ReadingStatus::Reading);
    }

    #[test]
    fn test_status_tag_round_trip() {
        for status in [
            ReadingStatus::NotStarted,
            ReadingStatus::Reading,
            ReadingStatus::OnHold,
            ReadingStatus::Completed,
        ] {
            assert_eq!(ReadingStatus::from_tag(status.as_tag()), Some(status));
        }
        assert_eq!(ReadingStatus::from_tag("paused"), None);
    }

    // ===== Tracker round trips over a fake remote =====

    /// Club-scoped progress store; echoes what a real backend would persist
    #[derive(Default)]
    struct FakeProgressRemote {
        records: StdMutex<HashMap<(ClubId, EditionId), ProgressRecord>>,
        fail_update: StdMutex<Option<ShelfError>>,
    }

    #[async_trait]
    impl RemoteCollection for FakeProgressRemote {
        async fn list_shelves(&self) -> Result<Vec<crate::api::wire::ShelfRecord>> {
            unimplemented!("not used by tracker tests")
        }

        async fn shelf_editions(&self, _: &crate::model::ShelfId) -> Result<Vec<EditionId>> {
            unimplemented!("not used by tracker tests")
        }

        async fn add_edition(&self, _: &crate::model::ShelfId, _: &EditionId) -> Result<()> {
            unimplemented!("not used by tracker tests")
        }

        async fn remove_edition(&self, _: &crate::model::ShelfId, _: &EditionId) -> Result<()> {
            unimplemented!("not used by tracker tests")
        }

        async fn fetch_progress(
            &self,
            club: &ClubId,
            edition: &EditionId,
        ) -> Result<Option<ProgressRecord>> {
            Ok(self
                .records
                .lock()
                .unwrap()
                .get(&(club.clone(), edition.clone()))
                .cloned())
        }

        async fn update_progress(
            &self,
            club: &ClubId,
            update: &ProgressUpdateRecord,
        ) -> Result<ProgressRecord> {
            if let Some(e) = self.fail_update.lock().unwrap().take() {
                return Err(e);
            }
            let record = ProgressRecord {
                edition_id: update.edition_id.clone(),
                status: update.status.clone(),
                current_page: update.current_page,
                total_pages: None,
                updated_at: Some(Utc::now()),
            };
            self.records
                .lock()
                .unwrap()
                .insert((club.clone(), update.edition_id.clone()), record.clone());
            Ok(record)
        }
    }

    #[tokio::test]
    async fn test_first_update_creates_record_implicitly() {
        let remote = Arc::new(FakeProgressRemote::default());
        let tracker = ProgressTracker::new(Arc::clone(&remote) as Arc<dyn RemoteCollection>);
        let club = ClubId::from("club-1");
        let edition = EditionId::from("ed-1");

        let progress = tracker
            .update(&club, &edition, ProgressUpdate::page(5), Some(300))
            .await
            .unwrap();

        assert_eq!(progress.status, ReadingStatus::Reading);
        assert_eq!(progress.current_page, 5);
        assert!(remote
            .records
            .lock()
            .unwrap()
            .contains_key(&(club, edition)));
    }

    #[tokio::test]
    async fn test_fetch_absent_record_is_not_started() {
        let remote = Arc::new(FakeProgressRemote::default());
        let tracker = ProgressTracker::new(remote);
        let progress = tracker
            .fetch(&"club-1".into(), &"ed-9".into())
            .await
            .unwrap();
        assert_eq!(progress.status, ReadingStatus::NotStarted);
        assert_eq!(progress.current_page, 0);
    }

    #[tokio::test]
    async fn test_finishing_the_book_completes() {
        let remote = Arc::new(FakeProgressRemote::default());
        let tracker = ProgressTracker::new(remote);
        let club = ClubId::from("club-1");
        let edition = EditionId::from("ed-2");

        tracker
            .update(&club, &edition, ProgressUpdate::page(150), Some(300))
            .await
            .unwrap();
        let progress = tracker
            .update(
                &club,
                &edition,
                ProgressUpdate::with_status(ReadingStatus::OnHold, 300),
                Some(300),
            )
            .await
            .unwrap();

        assert_eq!(progress.status, ReadingStatus::Completed);
        assert_eq!(progress.current_page, 300);
    }

    #[tokio::test]
    async fn test_failed_persist_keeps_cached_progress() {
        let remote = Arc::new(FakeProgressRemote::default());
        let tracker = ProgressTracker::new(Arc::clone(&remote) as Arc<dyn RemoteCollection>);
        let club = ClubId::from("club-1");
        let edition = EditionId::from("ed-3");

        tracker
            .update(&club, &edition, ProgressUpdate::page(40), Some(300))
            .await
            .unwrap();

        *remote.fail_update.lock().unwrap() =
            Some(ShelfError::remote("down", Some(503), None, true));
        let err = tracker
            .update(&club, &edition, ProgressUpdate::page(60), Some(300))
            .await
            .unwrap_err();
        assert!(err.is_transient());

        let cached = tracker.fetch(&club, &edition).await.unwrap();
        assert_eq!(cached.current_page, 40);
    }

    #[tokio::test]
    async fn test_validation_happens_before_any_network_call() {
        let remote = Arc::new(FakeProgressRemote::default());
        let tracker = ProgressTracker::new(Arc::clone(&remote) as Arc<dyn RemoteCollection>);
        let club = ClubId::from("club-1");
        let edition = EditionId::from("ed-4");

        // seed the cache so resolution does not need a fetch
        tracker.fetch(&club, &edition).await.unwrap();

        let err = tracker
            .update(&club, &edition, ProgressUpdate::page(-7), Some(300))
            .await
            .unwrap_err();
        assert!(matches!(err, ShelfError::ValidationError(_)));
        assert!(remote.records.lock().unwrap().is_empty());
    }
}
