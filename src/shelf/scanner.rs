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


//! Concurrent membership probing
//!
//! Given the shelf directory and one edition id, the scanner probes every
//! shelf's content list concurrently and reports which shelves contain the
//! edition. Probes are joined independently: one unreachable shelf (say, a
//! very large custom shelf) cannot stall the initial paint of the toggle UI.
//!
//! Failure handling per probe:
//! - a failed or timed-out probe flags its shelf as unconfirmed and is
//!   omitted from the member set (safe: no false positive), siblings keep
//!   running
//! - the failure is logged and carried in the report so callers can retry
//! - only when *every* probe failed and at least one failure was an auth
//!   failure does the scan itself fail `AuthRequired`; an all-failure report
//!   would otherwise render a signed-out user as having empty shelves
//!
//! The probe futures are owned by the scan future, so dropping the scan (the
//! user navigated away) cancels every outstanding probe.

use crate::api::remote::RemoteCollection;
use crate::error::{Result, ShelfError};
use crate::model::{EditionId, Shelf, ShelfId};
use crate::shelf::membership::{ScanReport, UnconfirmedShelf};
use futures_util::stream::{FuturesUnordered, StreamExt};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, warn};

/// Default bound on a single probe
const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 10;

/// Definite or flagged result of one shelf probe
#[derive(Debug, Clone, Serialize)]
pub enum ProbeResult {
    Member,
    NotMember,
    Unconfirmed { reason: String, transient: bool },
}

/// One settled probe, delivered to the progress callback as it lands
#[derive(Debug, Clone, Serialize)]
pub struct ProbeOutcome {
    pub shelf_id: ShelfId,
    pub result: ProbeResult,
}

/// Callback invoked per settled probe, so callers can paint partial results
/// before the full scan completes
pub type ProbeCallback = Arc<dyn Fn(ProbeOutcome) + Send + Sync>;

/// Scans shelves for membership of a single edition
pub struct MembershipScanner {
    remote: Arc<dyn RemoteCollection>,
    probe_timeout: Duration,
}

impl MembershipScanner {
    pub fn new(remote: Arc<dyn RemoteCollection>) -> Self {
        Self {
            remote,
            probe_timeout: Duration::from_secs(DEFAULT_PROBE_TIMEOUT_SECS),
        }
    }

    /// Override the per-probe timeout
    pub fn with_probe_timeout(mut self, probe_timeout: Duration) -> Self {
        self.probe_timeout = probe_timeout;
        self
    }

    /// Probe every shelf for the edition and collect a report.
    ///
    /// # Errors
    /// `AuthRequired` when no probe succeeded and at least one failed for
    /// authentication. Individual probe failures never fail the scan.
    pub async fn scan(&self, shelves: &[Shelf], edition: &EditionId) -> Result<ScanReport> {
        self.scan_with_progress(shelves, edition, None).await
    }

    /// Like [`scan`](Self::scan), additionally invoking `on_probe` as each
    /// probe settles
    pub async fn scan_with_progress(
        &self,
        shelves: &[Shelf],
        edition: &EditionId,
        on_probe: Option<ProbeCallback>,
    ) -> Result<ScanReport> {
        let mut probes = FuturesUnordered::new();
        for shelf in shelves {
            let remote = Arc::clone(&self.remote);
            let shelf_id = shelf.id.clone();
            let probe_timeout = self.probe_timeout;
            probes.push(async move {
                let outcome = timeout(probe_timeout, remote.shelf_editions(&shelf_id)).await;
                (shelf_id, outcome)
            });
        }

        let mut report = ScanReport::new();
        let mut auth_failures = 0usize;
        let mut successes = 0usize;

        while let Some((shelf_id, outcome)) = probes.next().await {
            let result = match outcome {
                Ok(Ok(editions)) => {
                    successes += 1;
                    if editions.contains(edition) {
                        report.record_member(shelf_id.clone());
                        ProbeResult::Member
                    } else {
                        report.record_absent();
                        ProbeResult::NotMember
                    }
                }
                Ok(Err(e)) => {
                    if e.is_auth_error() {
                        auth_failures += 1;
                    }
                    warn!(shelf = %shelf_id, error = %e, "membership probe failed");
                    let unconfirmed = UnconfirmedShelf {
                        shelf_id: shelf_id.clone(),
                        reason: e.to_string(),
                        transient: e.is_transient(),
                    };
                    report.record_unconfirmed(unconfirmed.clone());
                    ProbeResult::Unconfirmed {
                        reason: unconfirmed.reason,
                        transient: unconfirmed.transient,
                    }
                }
                Err(_) => {
                    warn!(shelf = %shelf_id, timeout_secs = self.probe_timeout.as_secs(), "membership probe timed out");
                    let reason = format!(
                        "probe timed out after {}s",
                        self.probe_timeout.as_secs()
                    );
                    report.record_unconfirmed(UnconfirmedShelf {
                        shelf_id: shelf_id.clone(),
                        reason: reason.clone(),
                        transient: true,
                    });
                    ProbeResult::Unconfirmed {
                        reason,
                        transient: true,
                    }
                }
            };

            if let Some(ref callback) = on_probe {
                callback(ProbeOutcome {
                    shelf_id,
                    result,
                });
            }
        }

        if !shelves.is_empty() && successes == 0 && auth_failures > 0 {
            return Err(ShelfError::auth_required(
                "every membership probe was rejected",
            ));
        }

        debug!(
            edition = %edition,
            probed = report.probed(),
            members = report.members().len(),
            unconfirmed = report.unconfirmed().len(),
            "membership scan settled"
        );
        Ok(report)
    }
}

// ===== TESTS =====
