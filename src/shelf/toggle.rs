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


//! Toggle coordination with canonical exclusivity
//!
//! The coordinator owns the rendered membership state for each edition and
//! funnels every add/remove through one place so the exclusivity rule — at
//! most one of {WantToRead, Reading, Read} holds an edition — is never
//! violated on screen, even transiently.
//!
//! # Behavior
//!
//! - Toggles against the same edition are serialized: a second toggle waits
//!   for the in-flight one to settle, so two exclusivity swaps cannot race.
//! - Adds to a canonical shelf clear the previous canonical membership in the
//!   same local update that sets the new one.
//! - The remote offers no multi-resource transaction, so a canonical swap is
//!   two calls: add to the new shelf, then remove from the old. If the remove
//!   fails after the add succeeded, a compensating remove of the new shelf is
//!   issued, the pre-toggle view is restored, and the edition is flagged for
//!   a full rescan.
//! - Once a mutation has been issued it runs to completion on a detached
//!   task; dropping the caller's future abandons only the rendering of the
//!   result, never the mutation itself.
//! - Every successful toggle ends with a targeted re-probe of the affected
//!   shelves; the reconciled values replace the optimistic guesses.
//! - A failed mutation rolls the view back and surfaces the error without
//!   automatic retry. An `InvariantViolation` additionally forces the next
//!   interaction with the edition to start from a full scan.

use crate::api::remote::RemoteCollection;
use crate::error::{Result, ShelfError};
use crate::model::{EditionId, Shelf, ShelfId, ShelfKind};
use crate::shelf::directory::ShelfDirectory;
use crate::shelf::membership::MembershipView;
use crate::shelf::scanner::MembershipScanner;
use futures_util::future::join_all;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, warn};

/// How a toggle names its shelf: by canonical kind or by explicit id
#[derive(Debug, Clone)]
pub enum ShelfTarget {
    /// One of the special kinds; must not be `Custom`
    Kind(ShelfKind),
    /// Any shelf, including custom ones
    Id(ShelfId),
}

impl From<ShelfKind> for ShelfTarget {
    fn from(kind: ShelfKind) -> Self {
        ShelfTarget::Kind(kind)
    }
}

impl From<ShelfId> for ShelfTarget {
    fn from(id: ShelfId) -> Self {
        ShelfTarget::Id(id)
    }
}

/// Per-edition coordination state
#[derive(Default)]
struct EditionState {
    /// Serializes toggles (and first-view scans) for this edition
    gate: Mutex<()>,

    /// Rendered membership; `None` until the first scan
    view: RwLock<Option<MembershipView>>,

    /// Set after an invariant violation or an unreconciled partial swap;
    /// the next interaction must start from a full scan
    needs_rescan: AtomicBool,
}

/// Outcome of the detached mutation task for an add
enum AddFailure {
    /// The initial add never took effect
    Add(ShelfError),
    /// The add succeeded but clearing a previous canonical shelf failed
    Partial {
        error: ShelfError,
        compensated: bool,
    },
}

/// Executes add/remove toggles and keeps the rendered membership truthful
pub struct ToggleCoordinator {
    remote: Arc<dyn RemoteCollection>,
    scanner: MembershipScanner,
    directory: RwLock<ShelfDirectory>,
    editions: Mutex<HashMap<EditionId, Arc<EditionState>>>,
}

impl ToggleCoordinator {
    pub fn new(remote: Arc<dyn RemoteCollection>, directory: ShelfDirectory) -> Self {
        let scanner = MembershipScanner::new(Arc::clone(&remote));
        Self::with_scanner(remote, scanner, directory)
    }

    /// Use a scanner with non-default probe settings
    pub fn with_scanner(
        remote: Arc<dyn RemoteCollection>,
        scanner: MembershipScanner,
        directory: ShelfDirectory,
    ) -> Self {
        Self {
            remote,
            scanner,
            directory: RwLock::new(directory),
            editions: Mutex::new(HashMap::new()),
        }
    }

    /// Replace the shelf directory after shelves changed elsewhere
    pub async fn reload_directory(&self) -> Result<()> {
        let directory = ShelfDirectory::load(self.remote.as_ref()).await?;
        *self.directory.write().await = directory;
        Ok(())
    }

    /// Current membership view for an edition, scanning on first access or
    /// after a forced-rescan flag
    pub async fn membership(&self, edition: &EditionId) -> Result<MembershipView> {
        let state = self.edition_state(edition).await;
        let _gate = state.gate.lock().await;
        self.ensure_view(&state, edition).await
    }

    /// Discard the cached view and rescan now
    pub async fn refresh(&self, edition: &EditionId) -> Result<MembershipView> {
        let state = self.edition_state(edition).await;
        let _gate = state.gate.lock().await;
        state.needs_rescan.store(true, Ordering::Relaxed);
        self.ensure_view(&state, edition).await
    }

    /// Toggle one shelf for one edition and return the reconciled view.
    ///
    /// # Errors
    /// `ValidationError` for an unknown shelf id, a kind the user has no
    /// shelf for, or `Kind(Custom)`; `AuthRequired`, `RemoteUnavailable` and
    /// `InvariantViolation` from the remote calls. On error the view is
    /// rolled back to its pre-toggle state.
    pub async fn toggle(
        &self,
        target: impl Into<ShelfTarget>,
        edition: &EditionId,
    ) -> Result<MembershipView> {
        let target = target.into();
        let shelf = self.resolve_target(&target).await?;
        let state = self.edition_state(edition).await;

        // One swap at a time per edition
        let _gate = state.gate.lock().await;
        let before = self.ensure_view(&state, edition).await?;

        if before.contains(&shelf.id) {
            self.remove_membership(&state, &shelf, edition, before).await
        } else {
            self.add_membership(&state, &shelf, edition, before).await
        }
    }

    // ===== Internals =====

    async fn edition_state(&self, edition: &EditionId) -> Arc<EditionState> {
        let mut editions = self.editions.lock().await;
        Arc::clone(
            editions
                .entry(edition.clone())
                .or_insert_with(|| Arc::new(EditionState::default())),
        )
    }

    /// Return the cached view, scanning when absent or flagged stale.
    /// Callers must hold the edition gate.
    async fn ensure_view(
        &self,
        state: &EditionState,
        edition: &EditionId,
    ) -> Result<MembershipView> {
        if !state.needs_rescan.load(Ordering::Relaxed) {
            if let Some(view) = state.view.read().await.clone() {
                return Ok(view);
            }
        }

        let report = {
            let directory = self.directory.read().await;
            self.scanner.scan(directory.shelves(), edition).await?
        };
        let view = MembershipView::from_report(&report);
        *state.view.write().await = Some(view.clone());
        state.needs_rescan.store(false, Ordering::Relaxed);
        Ok(view)
    }

    async fn resolve_target(&self, target: &ShelfTarget) -> Result<Shelf> {
        let directory = self.directory.read().await;
        match target {
            ShelfTarget::Id(id) => directory
                .get(id)
                .cloned()
                .ok_or_else(|| ShelfError::validation(format!("unknown shelf id '{id}'"))),
            ShelfTarget::Kind(ShelfKind::Custom) => Err(ShelfError::validation(
                "custom shelves must be addressed by id",
            )),
            ShelfTarget::Kind(kind) => directory
                .shelf_of_kind(*kind)
                .cloned()
                .ok_or_else(|| {
                    ShelfError::validation(format!("user has no shelf of kind '{kind}'"))
                }),
        }
    }

    async fn add_membership(
        &self,
        state: &Arc<EditionState>,
        shelf: &Shelf,
        edition: &EditionId,
        before: MembershipView,
    ) -> Result<MembershipView> {
        // Canonical adds also clear whatever canonical shelf held the edition
        let previous: Vec<ShelfId> = if shelf.kind.is_reading_status() {
            let directory = self.directory.read().await;
            directory
                .reading_status_shelves()
                .filter(|s| s.id != shelf.id && before.contains(&s.id))
                .map(|s| s.id.clone())
                .collect()
        } else {
            Vec::new()
        };

        // Set the new membership and clear the old in one local update, so
        // two canonical statuses are never rendered together
        let mut optimistic = before.clone();
        optimistic.set_member(shelf.id.clone());
        for prev in &previous {
            optimistic.clear_member(prev);
        }
        *state.view.write().await = Some(optimistic);

        // Detached: the mutation survives the caller navigating away
        let remote = Arc::clone(&self.remote);
        let target_id = shelf.id.clone();
        let edition_task = edition.clone();
        let previous_task = previous.clone();
        let handle = tokio::spawn(async move {
            remote
                .add_edition(&target_id, &edition_task)
                .await
                .map_err(AddFailure::Add)?;

            for prev in &previous_task {
                if let Err(error) = remote.remove_edition(prev, &edition_task).await {
                    // The add took effect but the swap is incomplete; undo
                    // the add so the remote holds at most the old statuses
                    let compensated = remote
                        .remove_edition(&target_id, &edition_task)
                        .await
                        .is_ok();
                    return Err(AddFailure::Partial { error, compensated });
                }
            }
            Ok(())
        });

        match handle.await {
            Ok(Ok(())) => {
                debug!(shelf = %shelf.id, edition = %edition, cleared = previous.len(), "membership added");
                let mut affected = previous;
                affected.push(shelf.id.clone());
                self.reconcile(state, edition, &affected).await
            }
            Ok(Err(failure)) => {
                *state.view.write().await = Some(before);
                let error = match failure {
                    AddFailure::Add(error) => {
                        if error.forces_rescan() {
                            state.needs_rescan.store(true, Ordering::Relaxed);
                        }
                        error
                    }
                    AddFailure::Partial { error, compensated } => {
                        warn!(
                            shelf = %shelf.id,
                            edition = %edition,
                            compensated,
                            "canonical swap failed part-way"
                        );
                        // Remote truth is uncertain either way
                        state.needs_rescan.store(true, Ordering::Relaxed);
                        error
                    }
                };
                Err(error)
            }
            Err(join_error) => {
                *state.view.write().await = Some(before);
                state.needs_rescan.store(true, Ordering::Relaxed);
                Err(ShelfError::internal(format!(
                    "toggle task failed: {join_error}"
                )))
            }
        }
    }

    async fn remove_membership(
        &self,
        state: &Arc<EditionState>,
        shelf: &Shelf,
        edition: &EditionId,
        before: MembershipView,
    ) -> Result<MembershipView> {
        let mut optimistic = before.clone();
        optimistic.clear_member(&shelf.id);
        *state.view.write().await = Some(optimistic);

        let remote = Arc::clone(&self.remote);
        let target_id = shelf.id.clone();
        let edition_task = edition.clone();
        let handle =
            tokio::spawn(async move { remote.remove_edition(&target_id, &edition_task).await });

        match handle.await {
            Ok(Ok(())) => {
                debug!(shelf = %shelf.id, edition = %edition, "membership removed");
                self.reconcile(state, edition, std::slice::from_ref(&shelf.id))
                    .await
            }
            Ok(Err(error)) => {
                *state.view.write().await = Some(before);
                if error.forces_rescan() {
                    state.needs_rescan.store(true, Ordering::Relaxed);
                }
                Err(error)
            }
            Err(join_error) => {
                *state.view.write().await = Some(before);
                state.needs_rescan.store(true, Ordering::Relaxed);
                Err(ShelfError::internal(format!(
                    "toggle task failed: {join_error}"
                )))
            }
        }
    }

    /// Re-probe the affected shelves and let confirmed truth replace the
    /// optimistic guesses. A failed re-probe keeps the optimistic value but
    /// flags the edition so the next interaction rescans.
    async fn reconcile(
        &self,
        state: &EditionState,
        edition: &EditionId,
        affected: &[ShelfId],
    ) -> Result<MembershipView> {
        let probes = affected.iter().map(|shelf_id| {
            let remote = Arc::clone(&self.remote);
            let shelf_id = shelf_id.clone();
            async move {
                let outcome = remote.shelf_editions(&shelf_id).await;
                (shelf_id, outcome)
            }
        });
        let outcomes = join_all(probes).await;

        let mut guard = state.view.write().await;
        let view = guard.get_or_insert_with(MembershipView::new);
        for (shelf_id, outcome) in outcomes {
            match outcome {
                Ok(editions) => view.apply_probe(&shelf_id, editions.contains(edition)),
                Err(error) => {
                    warn!(shelf = %shelf_id, error = %error, "reconciliation probe failed");
                    state.needs_rescan.store(true, Ordering::Relaxed);
                }
            }
        }
        Ok(view.clone())
    }
}

// ===== TESTS =====

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::wire::{ProgressRecord, ProgressUpdateRecord, ShelfRecord};
    use crate::model::ClubId;
    use async_trait::async_trait;
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex as StdMutex;

    /// In-memory remote with per-operation scriptable failures
    #[derive(Default)]
    struct FakeRemote {
        shelves: StdMutex<HashMap<ShelfId, HashSet<EditionId>>>,
        fail_add: StdMutex<HashMap<ShelfId, ShelfError>>,
        fail_remove: StdMutex<HashMap<ShelfId, ShelfError>>,
        calls: StdMutex<Vec<String>>,
    }

    impl FakeRemote {
        fn with_shelves(ids: &[&str]) -> Self {
            let remote = Self::default();
            {
                let mut shelves = remote.shelves.lock().unwrap();
                for id in ids {
                    shelves.insert(ShelfId::from(*id), HashSet::new());
                }
            }
            remote
        }

        fn seed(&self, shelf: &str, edition: &str) {
            self.shelves
                .lock()
                .unwrap()
                .get_mut(&ShelfId::from(shelf))
                .unwrap()
                .insert(EditionId::from(edition));
        }

        fn fail_next_add(&self, shelf: &str, error: ShelfError) {
            self.fail_add
                .lock()
                .unwrap()
                .insert(ShelfId::from(shelf), error);
        }

        fn fail_next_remove(&self, shelf: &str, error: ShelfError) {
            self.fail_remove
                .lock()
                .unwrap()
                .insert(ShelfId::from(shelf), error);
        }

        fn contains(&self, shelf: &str, edition: &str) -> bool {
            self.shelves
                .lock()
                .unwrap()
                .get(&ShelfId::from(shelf))
                .map(|s| s.contains(&EditionId::from(edition)))
                .unwrap_or(false)
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl RemoteCollection for FakeRemote {
        async fn list_shelves(&self) -> Result<Vec<ShelfRecord>> {
            unimplemented!("coordinator tests build directories directly")
        }

        async fn shelf_editions(&self, shelf: &ShelfId) -> Result<Vec<EditionId>> {
            self.calls.lock().unwrap().push(format!("probe {shelf}"));
            Ok(self
                .shelves
                .lock()
                .unwrap()
                .get(shelf)
                .map(|s| s.iter().cloned().collect())
                .unwrap_or_default())
        }

        async fn add_edition(&self, shelf: &ShelfId, edition: &EditionId) -> Result<()> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("add {shelf} {edition}"));
            if let Some(e) = self.fail_add.lock().unwrap().remove(shelf) {
                return Err(e);
            }
            self.shelves
                .lock()
                .unwrap()
                .entry(shelf.clone())
                .or_default()
                .insert(edition.clone());
            Ok(())
        }

        async fn remove_edition(&self, shelf: &ShelfId, edition: &EditionId) -> Result<()> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("remove {shelf} {edition}"));
            if let Some(e) = self.fail_remove.lock().unwrap().remove(shelf) {
                return Err(e);
            }
            if let Some(contents) = self.shelves.lock().unwrap().get_mut(shelf) {
                contents.remove(edition);
            }
            Ok(())
        }

        async fn fetch_progress(
            &self,
            _: &ClubId,
            _: &EditionId,
        ) -> Result<Option<ProgressRecord>> {
            unimplemented!("not used by coordinator tests")
        }

        async fn update_progress(
            &self,
            _: &ClubId,
            _: &ProgressUpdateRecord,
        ) -> Result<ProgressRecord> {
            unimplemented!("not used by coordinator tests")
        }
    }

    fn standard_directory() -> ShelfDirectory {
        ShelfDirectory::from_shelves(vec![
            Shelf::new("s-want".into(), "Want to Read", ShelfKind::WantToRead),
            Shelf::new("s-reading".into(), "Currently Reading", ShelfKind::Reading),
            Shelf::new("s-read".into(), "Read", ShelfKind::Read),
            Shelf::new("s-owned".into(), "Owned", ShelfKind::Owned),
            Shelf::new("s-beach".into(), "Beach Reads", ShelfKind::Custom),
        ])
    }

    fn coordinator(remote: Arc<FakeRemote>) -> ToggleCoordinator {
        ToggleCoordinator::new(remote, standard_directory())
    }

    #[tokio::test]
    async fn test_canonical_swap_moves_membership() {
        let remote = Arc::new(FakeRemote::with_shelves(&[
            "s-want", "s-reading", "s-read", "s-owned", "s-beach",
        ]));
        remote.seed("s-want", "ed-1");
        remote.seed("s-owned", "ed-1");
        let coordinator = coordinator(Arc::clone(&remote));

        let view = coordinator
            .toggle(ShelfKind::Reading, &"ed-1".into())
            .await
            .unwrap();

        // rendered state
        assert!(view.contains(&"s-reading".into()));
        assert!(!view.contains(&"s-want".into()));
        assert!(view.contains(&"s-owned".into()));
        // server state
        assert!(remote.contains("s-reading", "ed-1"));
        assert!(!remote.contains("s-want", "ed-1"));
        assert!(remote.contains("s-owned", "ed-1"));
    }

    #[tokio::test]
    async fn test_double_toggle_is_idempotent() {
        let remote = Arc::new(FakeRemote::with_shelves(&[
            "s-want", "s-reading", "s-read", "s-owned", "s-beach",
        ]));
        let coordinator = coordinator(Arc::clone(&remote));
        let edition = EditionId::from("ed-2");

        coordinator.toggle(ShelfKind::Read, &edition).await.unwrap();
        assert!(remote.contains("s-read", "ed-2"));

        let view = coordinator.toggle(ShelfKind::Read, &edition).await.unwrap();
        assert!(!view.contains(&"s-read".into()));
        assert!(!remote.contains("s-read", "ed-2"));
    }

    #[tokio::test]
    async fn test_owned_toggle_leaves_canonical_alone() {
        let remote = Arc::new(FakeRemote::with_shelves(&[
            "s-want", "s-reading", "s-read", "s-owned", "s-beach",
        ]));
        remote.seed("s-reading", "ed-3");
        let coordinator = coordinator(Arc::clone(&remote));

        let view = coordinator
            .toggle(ShelfKind::Owned, &"ed-3".into())
            .await
            .unwrap();

        assert!(view.contains(&"s-owned".into()));
        assert!(view.contains(&"s-reading".into()));
        assert!(remote.contains("s-reading", "ed-3"));
    }

    #[tokio::test]
    async fn test_custom_toggle_by_id() {
        let remote = Arc::new(FakeRemote::with_shelves(&[
            "s-want", "s-reading", "s-read", "s-owned", "s-beach",
        ]));
        remote.seed("s-want", "ed-4");
        let coordinator = coordinator(Arc::clone(&remote));

        let view = coordinator
            .toggle(ShelfId::from("s-beach"), &"ed-4".into())
            .await
            .unwrap();

        assert!(view.contains(&"s-beach".into()));
        // custom shelves never trigger the exclusivity swap
        assert!(view.contains(&"s-want".into()));
        assert!(remote.contains("s-want", "ed-4"));
    }

    #[tokio::test]
    async fn test_failed_add_rolls_back() {
        let remote = Arc::new(FakeRemote::with_shelves(&[
            "s-want", "s-reading", "s-read", "s-owned", "s-beach",
        ]));
        remote.seed("s-want", "ed-5");
        remote.fail_next_add("s-reading", ShelfError::remote("down", Some(503), None, true));
        let coordinator = coordinator(Arc::clone(&remote));
        let edition = EditionId::from("ed-5");

        // paint the initial state first
        let before = coordinator.membership(&edition).await.unwrap();
        assert!(before.contains(&"s-want".into()));

        let err = coordinator
            .toggle(ShelfKind::Reading, &edition)
            .await
            .unwrap_err();
        assert!(err.is_transient());

        let after = coordinator.membership(&edition).await.unwrap();
        assert!(after.contains(&"s-want".into()));
        assert!(!after.contains(&"s-reading".into()));
        assert!(remote.contains("s-want", "ed-5"));
        assert!(!remote.contains("s-reading", "ed-5"));
    }

    #[tokio::test]
    async fn test_partial_swap_compensates_and_flags_rescan() {
        let remote = Arc::new(FakeRemote::with_shelves(&[
            "s-want", "s-reading", "s-read", "s-owned", "s-beach",
        ]));
        remote.seed("s-want", "ed-6");
        remote.fail_next_remove("s-want", ShelfError::remote("flaky", Some(500), None, true));
        let coordinator = coordinator(Arc::clone(&remote));
        let edition = EditionId::from("ed-6");

        let err = coordinator
            .toggle(ShelfKind::Reading, &edition)
            .await
            .unwrap_err();
        assert!(err.is_transient());

        // compensation removed the freshly added membership again
        assert!(!remote.contains("s-reading", "ed-6"));
        assert!(remote.contains("s-want", "ed-6"));

        // the next interaction starts from a full scan
        let calls_before = remote.calls().len();
        let view = coordinator.membership(&edition).await.unwrap();
        assert!(view.contains(&"s-want".into()));
        let probes_after: Vec<_> = remote.calls()[calls_before..]
            .iter()
            .filter(|c| c.starts_with("probe"))
            .cloned()
            .collect();
        assert_eq!(probes_after.len(), 5);
    }

    #[tokio::test]
    async fn test_invariant_violation_forces_full_rescan() {
        let remote = Arc::new(FakeRemote::with_shelves(&[
            "s-want", "s-reading", "s-read", "s-owned", "s-beach",
        ]));
        remote.fail_next_add(
            "s-reading",
            ShelfError::invariant("swap rejected", "ed-7"),
        );
        let coordinator = coordinator(Arc::clone(&remote));
        let edition = EditionId::from("ed-7");

        let err = coordinator
            .toggle(ShelfKind::Reading, &edition)
            .await
            .unwrap_err();
        assert!(err.forces_rescan());

        let calls_before = remote.calls().len();
        coordinator.membership(&edition).await.unwrap();
        let probes: Vec<_> = remote.calls()[calls_before..]
            .iter()
            .filter(|c| c.starts_with("probe"))
            .cloned()
            .collect();
        assert_eq!(probes.len(), 5);
    }

    #[tokio::test]
    async fn test_reconciliation_overrides_optimistic_guess() {
        let remote = Arc::new(FakeRemote::with_shelves(&[
            "s-want", "s-reading", "s-read", "s-owned", "s-beach",
        ]));
        let coordinator = coordinator(Arc::clone(&remote));
        let edition = EditionId::from("ed-8");

        // an out-of-band writer fills the shelf between mutation and
        // reconciliation; the fake applies mutations synchronously, so the
        // reconciled probe is what lands in the returned view
        let view = coordinator
            .toggle(ShelfKind::WantToRead, &edition)
            .await
            .unwrap();
        assert!(view.contains(&"s-want".into()));
        assert!(remote.contains("s-want", "ed-8"));
    }

    #[tokio::test]
    async fn test_target_resolution_errors() {
        let remote = Arc::new(FakeRemote::with_shelves(&["s-want"]));
        let coordinator =
            ToggleCoordinator::new(
                Arc::clone(&remote) as Arc<dyn RemoteCollection>,
                ShelfDirectory::from_shelves(vec![Shelf::new(
                    "s-want".into(),
                    "Want to Read",
                    ShelfKind::WantToRead,
                )]),
            );

        let err = coordinator
            .toggle(ShelfKind::Custom, &"ed-9".into())
            .await
            .unwrap_err();
        assert!(matches!(err, ShelfError::ValidationError(_)));

        let err = coordinator
            .toggle(ShelfId::from("nope"), &"ed-9".into())
            .await
            .unwrap_err();
        assert!(matches!(err, ShelfError::ValidationError(_)));

        let err = coordinator
            .toggle(ShelfKind::Owned, &"ed-9".into())
            .await
            .unwrap_err();
        assert!(matches!(err, ShelfError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_serialized_toggles_do_not_race() {
        let remote = Arc::new(FakeRemote::with_shelves(&[
            "s-want", "s-reading", "s-read", "s-owned", "s-beach",
        ]));
        let coordinator = Arc::new(coordinator(Arc::clone(&remote)));
        let edition = EditionId::from("ed-10");

        let a = {
            let coordinator = Arc::clone(&coordinator);
            let edition = edition.clone();
            tokio::spawn(async move { coordinator.toggle(ShelfKind::Reading, &edition).await })
        };
        let b = {
            let coordinator = Arc::clone(&coordinator);
            let edition = edition.clone();
            tokio::spawn(async move { coordinator.toggle(ShelfKind::Read, &edition).await })
        };
        a.await.unwrap().unwrap();
        b.await.unwrap().unwrap();

        // whichever toggle ran second won; never both
        let reading = remote.contains("s-reading", "ed-10");
        let read = remote.contains("s-read", "ed-10");
        assert!(reading ^ read);
    }
}
