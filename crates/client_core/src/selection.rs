//! Exclusive target selection over the candidate group list.

use shared::{
    domain::{Group, GroupId, PathContext, TransferMode},
    protocol::Dataset,
};
use tracing::debug;

use crate::error::TransferError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub group: Group,
    pub checked: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateList {
    entries: Vec<Candidate>,
}

impl CandidateList {
    pub fn new(groups: Vec<Group>) -> Self {
        Self {
            entries: groups
                .into_iter()
                .map(|group| Candidate {
                    group,
                    checked: false,
                })
                .collect(),
        }
    }

    pub fn from_dataset(dataset: Dataset<Group>) -> Self {
        Self::new(dataset.results)
    }

    pub fn entries(&self) -> &[Candidate] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: GroupId) -> bool {
        self.entries.iter().any(|entry| entry.group.id == id)
    }

    pub fn checked(&self) -> impl Iterator<Item = &Candidate> {
        self.entries.iter().filter(|entry| entry.checked)
    }

    /// Checks the entry matching `id` and clears every other entry. Scans the
    /// whole list so stale markers never survive a re-selection.
    pub fn mark_exclusive(&mut self, id: GroupId) -> Option<Group> {
        let mut selected = None;
        for entry in &mut self.entries {
            entry.checked = entry.group.id == id;
            if entry.checked {
                selected = Some(entry.group.clone());
            }
        }
        selected
    }

    pub fn clear_checked(&mut self) {
        for entry in &mut self.entries {
            entry.checked = false;
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Selection {
    #[default]
    None,
    Candidate(Group),
    RootTarget,
}

impl Selection {
    pub fn is_root_target(&self) -> bool {
        matches!(self, Selection::RootTarget)
    }

    pub fn candidate(&self) -> Option<&Group> {
        match self {
            Selection::Candidate(group) => Some(group),
            _ => None,
        }
    }
}

/// Tracks the single selected target together with the transfer mode it
/// implies. Root targeting pins the mode to `Move` and disables row
/// selection for the rendering layer; releasing it falls back to the mode
/// derived from the path context, not to an earlier explicit choice.
#[derive(Debug, Clone)]
pub struct SelectionTracker {
    selection: Selection,
    mode: TransferMode,
    path_mode: TransferMode,
    candidate_selection_enabled: bool,
}

impl SelectionTracker {
    pub fn new(path: &PathContext) -> Self {
        let path_mode = TransferMode::initial_for(path);
        Self {
            selection: Selection::None,
            mode: path_mode,
            path_mode,
            candidate_selection_enabled: true,
        }
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn mode(&self) -> TransferMode {
        self.mode
    }

    pub fn candidate_selection_enabled(&self) -> bool {
        self.candidate_selection_enabled
    }

    pub fn select_candidate(
        &mut self,
        list: &mut CandidateList,
        target: GroupId,
    ) -> Result<Group, TransferError> {
        if !list.contains(target) {
            return Err(TransferError::UnknownCandidate(target));
        }

        if self.selection.is_root_target() {
            self.release_root();
        }

        let group = list
            .mark_exclusive(target)
            .ok_or(TransferError::UnknownCandidate(target))?;
        debug!(candidate = %group.id, "candidate selected");
        self.selection = Selection::Candidate(group.clone());
        Ok(group)
    }

    pub fn select_root(&mut self, list: &mut CandidateList) {
        list.clear_checked();
        self.selection = Selection::RootTarget;
        self.mode = TransferMode::Move;
        self.candidate_selection_enabled = false;
        debug!("root level targeted");
    }

    /// Flips root targeting. Returns whether the root is targeted afterwards.
    pub fn toggle_root_target(&mut self, list: &mut CandidateList) -> bool {
        if self.selection.is_root_target() {
            self.release_root();
            self.selection = Selection::None;
            false
        } else {
            self.select_root(list);
            true
        }
    }

    pub fn set_mode(&mut self, mode: TransferMode) -> Result<(), TransferError> {
        if mode == TransferMode::Copy && self.selection.is_root_target() {
            return Err(TransferError::CopyToRoot);
        }
        self.mode = mode;
        Ok(())
    }

    fn release_root(&mut self) {
        self.candidate_selection_enabled = true;
        self.mode = self.path_mode;
    }
}

#[cfg(test)]
#[path = "tests/selection_tests.rs"]
mod tests;
