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


//! Wire models for the shelf and progress endpoints
//!
//! These structures match the JSON bodies of the remote collection API.
//! Field names use snake_case to match the wire format, with serde defaults
//! for everything the server may omit. Conversion into domain types is
//! tolerant: an unknown shelf kind tag becomes a custom shelf rather than a
//! decode failure, so a server-side addition never breaks existing clients.

use crate::model::{EditionId, Shelf, ShelfKind, Visibility};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One shelf record from `GET /shelves`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShelfRecord {
    /// Remote shelf identifier
    pub id: String,

    /// Display name
    pub name: String,

    /// Kind tag ("want_to_read", "reading", "read", "owned", or custom)
    #[serde(default)]
    pub kind: Option<String>,

    /// Visibility tag ("private" or "public")
    #[serde(default)]
    pub visibility: Option<String>,
}

impl ShelfRecord {
    /// Convert into the domain type; unknown tags degrade gracefully
    pub fn into_shelf(self) -> Shelf {
        Shelf {
            id: self.id.into(),
            name: self.name,
            kind: self
                .kind
                .as_deref()
                .map(ShelfKind::from_tag)
                .unwrap_or(ShelfKind::Custom),
            visibility: self
                .visibility
                .as_deref()
                .map(Visibility::from_tag)
                .unwrap_or(Visibility::Private),
        }
    }
}

/// Response container for `GET /shelves`
#[derive(Debug, Clone, Deserialize)]
pub struct ShelfListResponse {
    #[serde(default)]
    pub shelves: Vec<ShelfRecord>,
}

/// Response container for `GET /shelves/{id}/editions`.
///
/// The probe returns the shelf's full content list; membership is tested
/// client-side against it.
#[derive(Debug, Clone, Deserialize)]
pub struct ShelfEditionsResponse {
    #[serde(default)]
    pub editions: Vec<EditionId>,

    /// Total count when the server reports one (informational)
    #[serde(default)]
    pub total: Option<i64>,
}

/// Request body for `POST /shelves/{id}/add_edition`
#[derive(Debug, Clone, Serialize)]
pub struct AddEditionRequest {
    pub edition_id: EditionId,
}

/// One reading-progress record from the club-scoped progress resource
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressRecord {
    /// Edition the progress applies to
    pub edition_id: EditionId,

    /// Status tag ("not_started", "reading", "on_hold", "completed")
    pub status: String,

    /// Current page position
    #[serde(default)]
    pub current_page: u32,

    /// Total page count when book metadata supplied one
    #[serde(default)]
    pub total_pages: Option<u32>,

    /// Last persisted at
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Response container for `GET /clubs/{id}/progress`.
///
/// The club-scoped resource returns every progress record the member holds in
/// that club; callers pick out the edition they care about.
#[derive(Debug, Clone, Deserialize)]
pub struct ProgressListResponse {
    #[serde(default)]
    pub progress: Vec<ProgressRecord>,
}

/// Request body for `POST /clubs/{id}/progress/update`
#[derive(Debug, Clone, Serialize)]
pub struct ProgressUpdateRecord {
    pub edition_id: EditionId,

    /// Resolved status tag; the client always sends the final value
    pub status: String,

    pub current_page: u32,
}

// ===== TESTS =====
