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


//! Observed and rendered membership state
//!
//! Membership is a derived relation: which shelves currently contain one
//! edition, as last observed from the remote side. Nothing here is stored
//! durably. A [`ScanReport`] is the raw result of one scan pass; a
//! [`MembershipView`] is the state a book-detail view renders, patched
//! optimistically by toggles and replaced by reconciled truth.
//!
//! A shelf whose probe failed is *unconfirmed*, never a member: rendering
//! "not on this shelf" for an unreachable shelf is safe (no false positive),
//! and the flag lets callers offer a retry.

use crate::model::ShelfId;
use serde::Serialize;
use std::collections::HashSet;

/// A shelf whose probe failed or timed out during a scan
#[derive(Debug, Clone, Serialize)]
pub struct UnconfirmedShelf {
    pub shelf_id: ShelfId,

    /// Human-readable failure reason, for diagnostics and retry affordances
    pub reason: String,

    /// Whether a retry might succeed
    pub transient: bool,
}

/// Result of one membership scan over a set of shelves
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanReport {
    members: HashSet<ShelfId>,
    unconfirmed: Vec<UnconfirmedShelf>,
    probed: usize,
}

impl ScanReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_member(&mut self, shelf: ShelfId) {
        self.members.insert(shelf);
        self.probed += 1;
    }

    pub(crate) fn record_absent(&mut self) {
        self.probed += 1;
    }

    pub(crate) fn record_unconfirmed(&mut self, unconfirmed: UnconfirmedShelf) {
        self.unconfirmed.push(unconfirmed);
        self.probed += 1;
    }

    /// Shelves confirmed to contain the edition
    pub fn members(&self) -> &HashSet<ShelfId> {
        &self.members
    }

    pub fn contains(&self, shelf: &ShelfId) -> bool {
        self.members.contains(shelf)
    }

    /// Shelves the scan could not confirm either way
    pub fn unconfirmed(&self) -> &[UnconfirmedShelf] {
        &self.unconfirmed
    }

    /// Number of shelves probed (confirmed + unconfirmed)
    pub fn probed(&self) -> usize {
        self.probed
    }

    /// Number of probes that settled with a definite answer
    pub fn confirmed(&self) -> usize {
        self.probed - self.unconfirmed.len()
    }

    /// True when every probe settled with a definite answer
    pub fn is_complete(&self) -> bool {
        self.unconfirmed.is_empty()
    }
}

/// The membership state a view renders for one edition.
///
/// Starts from the last [`ScanReport`], is patched optimistically by the
/// toggle coordinator, and is overwritten by reconciled probe results
/// (reconciled truth always wins over the optimistic guess).
#[derive(Debug, Clone, Default, Serialize)]
pub struct MembershipView {
    members: HashSet<ShelfId>,
    unconfirmed: Vec<UnconfirmedShelf>,
}

impl MembershipView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_report(report: &ScanReport) -> Self {
        Self {
            members: report.members().clone(),
            unconfirmed: report.unconfirmed().to_vec(),
        }
    }

    pub fn contains(&self, shelf: &ShelfId) -> bool {
        self.members.contains(shelf)
    }

    pub fn members(&self) -> &HashSet<ShelfId> {
        &self.members
    }

    pub fn unconfirmed(&self) -> &[UnconfirmedShelf] {
        &self.unconfirmed
    }

    /// Optimistically mark a shelf as containing the edition
    pub fn set_member(&mut self, shelf: ShelfId) {
        self.unconfirmed.retain(|u| u.shelf_id != shelf);
        self.members.insert(shelf);
    }

    /// Optimistically mark a shelf as not containing the edition
    pub fn clear_member(&mut self, shelf: &ShelfId) {
        self.members.remove(shelf);
    }

    /// Apply a reconciled probe result for one shelf; the confirmed value
    /// replaces whatever the view currently shows
    pub fn apply_probe(&mut self, shelf: &ShelfId, is_member: bool) {
        self.unconfirmed.retain(|u| &u.shelf_id != shelf);
        if is_member {
            self.members.insert(shelf.clone());
        } else {
            self.members.remove(shelf);
        }
    }
}

// ===== TESTS =====
