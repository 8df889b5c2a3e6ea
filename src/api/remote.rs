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


//! The remote collection seam
//!
//! Scanner, coordinator and tracker talk to the remote side exclusively
//! through this trait, so deterministic in-memory implementations can stand
//! in during tests. [`crate::api::client::RemoteClient`] is the HTTP
//! implementation used in production.
//!
//! The remote offers no multi-resource transaction: each method is one
//! independent call, and consistency across calls is the caller's problem
//! (read-repair via reconciliation).

use crate::api::wire::{ProgressRecord, ProgressUpdateRecord, ShelfRecord};
use crate::error::Result;
use crate::model::{ClubId, EditionId, ShelfId};
use async_trait::async_trait;

/// Operations the remote collection exposes to the core
#[async_trait]
pub trait RemoteCollection: Send + Sync {
    /// List the signed-in user's shelves, in server order
    async fn list_shelves(&self) -> Result<Vec<ShelfRecord>>;

    /// Full content list of one shelf, for membership probing
    async fn shelf_editions(&self, shelf: &ShelfId) -> Result<Vec<EditionId>>;

    /// Add an edition to a shelf. Adding an existing member is a no-op
    /// server-side.
    async fn add_edition(&self, shelf: &ShelfId, edition: &EditionId) -> Result<()>;

    /// Remove an edition from a shelf. Removing a non-member is a no-op
    /// server-side.
    async fn remove_edition(&self, shelf: &ShelfId, edition: &EditionId) -> Result<()>;

    /// Read one member's progress for an edition within a club; `None` when
    /// no record exists yet
    async fn fetch_progress(
        &self,
        club: &ClubId,
        edition: &EditionId,
    ) -> Result<Option<ProgressRecord>>;

    /// Persist a progress update to the club-scoped resource, creating the
    /// record implicitly on first write
    async fn update_progress(
        &self,
        club: &ClubId,
        update: &ProgressUpdateRecord,
    ) -> Result<ProgressRecord>;
}
