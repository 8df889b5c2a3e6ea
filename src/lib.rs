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


//! Readerly core: shelf membership and reading-progress reconciliation
//!
//! This crate is the stateful heart of the Readerly book-club product. The
//! surrounding screens are plain fetch-and-render; what lives here is the
//! logic that has to stay *consistent*:
//!
//! - which of a user's shelves currently contain a given edition, probed
//!   shelf-by-shelf against a remote collection with no transactions
//!   ([`shelf::MembershipScanner`])
//! - the rule that at most one of Want-to-Read / Reading / Read may hold an
//!   edition at a time, enforced optimistically and repaired by
//!   reconciliation ([`shelf::ToggleCoordinator`])
//! - per-club reading status and page position, with the transitions the
//!   status field itself does not enforce ([`progress::ProgressTracker`])
//!
//! Remote access goes through the [`api::RemoteCollection`] trait
//! (HTTP implementation: [`api::RemoteClient`]); credentials come from an
//! injected [`auth::CredentialProvider`]. Every operation returns a
//! [`error::ShelfError`] whose [`error::FailureKind`] is one of the four
//! categories presentation code renders.

pub mod api;
pub mod auth;
pub mod error;
pub mod model;
pub mod progress;
pub mod shelf;

pub use api::{RemoteClient, RemoteCollection};
pub use auth::{BearerToken, CredentialProvider, SessionCredentials};
pub use error::{FailureKind, Result, ShelfError};
pub use model::{ClubId, EditionId, Shelf, ShelfId, ShelfKind, Visibility};
pub use progress::{ProgressTracker, ProgressUpdate, ReadingProgress, ReadingStatus};
pub use shelf::{
    MembershipScanner, MembershipView, ScanReport, ShelfDirectory, ShelfTarget, ToggleCoordinator,
};
