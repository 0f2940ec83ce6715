//! The board -- an explicit registry of UI elements keyed by commit and
//! configuration.
//!
//! Each element carries a [`Role`] (what it is, and how events find it) and
//! a [`ViewState`] (the projection target). Lookup is by key, never by
//! selector string: what an element is called on a page is a rendering
//! concern, not an addressing one.

pub mod layout;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::projector::{Patch, PatchOp};
use crate::status::Status;

#[derive(Debug, Error)]
pub enum BoardError {
    #[error("duplicate element id: {0}")]
    DuplicateElement(String),
    #[error("unknown element id: {0}")]
    UnknownElement(String),
}

/// What a board element is, and the key events use to find it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Role {
    /// Live percent/status cell for one commit+config pair.
    ProgressBox { sha: String, config: String },
    /// One commit+config row. `big_list` marks rows that live in the full
    /// commit list (commit-level status events only touch those).
    ConfigRow {
        sha: String,
        config: String,
        #[serde(default)]
        big_list: bool,
    },
    /// Commit identifier label within a commit+config row.
    ShaLabel { sha: String, config: String },
    /// Branch-list entry for a commit.
    BranchEntry { sha: String },
    /// The test/retest control in the full commit list.
    RetestControl { sha: String },
}

impl Role {
    /// The commit this element belongs to.
    pub fn sha(&self) -> &str {
        match self {
            Role::ProgressBox { sha, .. }
            | Role::ConfigRow { sha, .. }
            | Role::ShaLabel { sha, .. }
            | Role::BranchEntry { sha }
            | Role::RetestControl { sha } => sha,
        }
    }
}

/// One-way affordance on a retest control: a commit can be tested once, then
/// only re-tested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Affordance {
    Testable,
    Retestable,
}

/// Mutable projection target of an element.
///
/// `status` holds at most one vocabulary value; assignment replaces the
/// previous one, so mutual exclusion holds by construction. `text == None`
/// is the blank marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    pub status: Option<Status>,
    pub tooltip: Option<String>,
    pub text: Option<String>,
    pub affordance: Option<Affordance>,
}

impl ViewState {
    /// Initial view for a freshly registered element of the given role.
    fn for_role(role: &Role) -> Self {
        let affordance = match role {
            Role::RetestControl { .. } => Some(Affordance::Testable),
            _ => None,
        };
        ViewState {
            status: None,
            tooltip: None,
            text: None,
            affordance,
        }
    }
}

/// A registered element: role plus current view state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub role: Role,
    pub view: ViewState,
}

/// The element registry. Ids are caller-supplied tokens (the markup
/// generator's contract); iteration order is the id order, which keeps
/// projection output deterministic.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Board {
    elements: BTreeMap<String, Element>,
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an element. Ids are unique per board.
    pub fn insert(&mut self, id: &str, role: Role) -> Result<(), BoardError> {
        if self.elements.contains_key(id) {
            return Err(BoardError::DuplicateElement(id.to_string()));
        }
        let view = ViewState::for_role(&role);
        self.elements.insert(id.to_string(), Element { role, view });
        Ok(())
    }

    /// Unregister an element.
    pub fn remove(&mut self, id: &str) -> Result<(), BoardError> {
        self.elements
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| BoardError::UnknownElement(id.to_string()))
    }

    pub fn get(&self, id: &str) -> Option<&Element> {
        self.elements.get(id)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// All elements in id order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Element)> {
        self.elements.iter().map(|(id, el)| (id.as_str(), el))
    }

    /// All elements belonging to a commit, in id order.
    pub fn commit_elements<'a>(
        &'a self,
        sha: &'a str,
    ) -> impl Iterator<Item = (&'a str, &'a Element)> + 'a {
        self.iter().filter(move |(_, el)| el.role.sha() == sha)
    }

    /// Apply one patch. Patches addressed to an unregistered element are a
    /// silent no-op: the registry and the patch stream may race, and a
    /// missing target is not a failure.
    pub fn apply(&mut self, patch: &Patch) {
        let Some(element) = self.elements.get_mut(&patch.element) else {
            return;
        };
        match &patch.op {
            PatchOp::SetStatus { status } => element.view.status = Some(*status),
            PatchOp::SetTooltip { tooltip } => element.view.tooltip = Some(tooltip.clone()),
            PatchOp::SetText { text } => element.view.text = Some(text.clone()),
            PatchOp::ClearText => element.view.text = None,
            PatchOp::MarkRetestable => element.view.affordance = Some(Affordance::Retestable),
        }
    }
}
