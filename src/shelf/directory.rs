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


//! The signed-in user's shelf collection
//!
//! Populated by a single list call and read-only afterwards; shelf creation
//! and deletion happen in shelf-management screens outside this core. Server
//! order is preserved because it is the order the user arranged.

use crate::api::remote::RemoteCollection;
use crate::error::Result;
use crate::model::{Shelf, ShelfId, ShelfKind};
use tracing::debug;

/// Ordered collection of the user's shelves with id/kind lookups
#[derive(Debug, Clone, Default)]
pub struct ShelfDirectory {
    shelves: Vec<Shelf>,
}

impl ShelfDirectory {
    /// Fetch the user's shelves from the remote collection
    ///
    /// # Errors
    /// `AuthRequired` without a valid session, `RemoteUnavailable` on
    /// transport failure.
    pub async fn load(remote: &dyn RemoteCollection) -> Result<Self> {
        let records = remote.list_shelves().await?;
        let shelves: Vec<Shelf> = records.into_iter().map(|r| r.into_shelf()).collect();
        debug!(count = shelves.len(), "loaded shelf directory");
        Ok(Self { shelves })
    }

    /// Build a directory from already-materialized shelves
    pub fn from_shelves(shelves: Vec<Shelf>) -> Self {
        Self { shelves }
    }

    /// All shelves, in server order
    pub fn shelves(&self) -> &[Shelf] {
        &self.shelves
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Shelf> {
        self.shelves.iter()
    }

    pub fn len(&self) -> usize {
        self.shelves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shelves.is_empty()
    }

    /// Look up one shelf by id
    pub fn get(&self, id: &ShelfId) -> Option<&Shelf> {
        self.shelves.iter().find(|s| &s.id == id)
    }

    /// First shelf with the given kind. Canonical kinds appear at most once
    /// per user; custom shelves may repeat and should be looked up by id.
    pub fn shelf_of_kind(&self, kind: ShelfKind) -> Option<&Shelf> {
        self.shelves.iter().find(|s| s.kind == kind)
    }

    /// The shelves participating in canonical exclusivity
    pub fn reading_status_shelves(&self) -> impl Iterator<Item = &Shelf> {
        self.shelves.iter().filter(|s| s.kind.is_reading_status())
    }
}

// ===== TESTS =====
