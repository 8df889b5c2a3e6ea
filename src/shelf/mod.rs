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


//! Shelf membership and reconciliation
//!
//! A book-detail view loads the [`directory::ShelfDirectory`], paints initial
//! toggle state from a [`scanner::MembershipScanner`] pass, and routes every
//! user action through the [`toggle::ToggleCoordinator`], which keeps the
//! rendered state and the remote collection consistent by read-repair.

pub mod directory;
pub mod membership;
pub mod scanner;
pub mod toggle;

// Re-export commonly used types
pub use directory::ShelfDirectory;
pub use membership::{MembershipView, ScanReport, UnconfirmedShelf};
pub use scanner::{MembershipScanner, ProbeCallback, ProbeOutcome, ProbeResult};
pub use toggle::{ShelfTarget, ToggleCoordinator};
