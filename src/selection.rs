//! Feature selection bookkeeping under a single- or multi-select policy.
//!
//! Selection holds no visual state. Every mutation returns the `SelectionEvent`s it
//! caused, in order, and the view layer decides what to (un)highlight from them.

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::boundary::FeatureHandle;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionPolicy {
    /// Selecting a feature replaces the previous selection.
    #[default]
    Single,
    /// Clicking toggles membership; any number of features may be selected.
    Multi,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "handle", rename_all = "lowercase")]
pub enum SelectionEvent {
    Select(FeatureHandle),
    Unselect(FeatureHandle),
}

pub type SelectionEvents = SmallVec<[SelectionEvent; 2]>;

#[derive(Debug, Clone, Default)]
pub struct Selection {
    policy: SelectionPolicy,
    selected: Vec<FeatureHandle>, // in selection order
}

impl Selection {
    pub fn new(policy: SelectionPolicy) -> Self {
        Self { policy, selected: Vec::new() }
    }

    #[inline]
    pub fn policy(&self) -> SelectionPolicy { self.policy }

    #[inline]
    pub fn selected(&self) -> &[FeatureHandle] { &self.selected }

    #[inline]
    pub fn is_selected(&self, handle: FeatureHandle) -> bool { self.selected.contains(&handle) }

    #[inline]
    pub fn is_empty(&self) -> bool { self.selected.is_empty() }

    /// Single: replace the current holder, emitting `Unselect(prev)` before `Select(handle)`.
    /// Re-selecting the current holder emits both and leaves it selected.
    /// Multi: append, or do nothing if already selected.
    pub fn select(&mut self, handle: FeatureHandle) -> SelectionEvents {
        let mut events = SelectionEvents::new();
        match self.policy {
            SelectionPolicy::Single => {
                if let Some(prev) = self.selected.pop() {
                    events.push(SelectionEvent::Unselect(prev));
                }
                self.selected.push(handle);
                events.push(SelectionEvent::Select(handle));
            }
            SelectionPolicy::Multi => {
                if !self.is_selected(handle) {
                    self.selected.push(handle);
                    events.push(SelectionEvent::Select(handle));
                }
            }
        }
        events
    }

    /// Multi-select only: select if absent, unselect if present.
    pub fn toggle(&mut self, handle: FeatureHandle) -> Result<SelectionEvents> {
        if self.policy != SelectionPolicy::Multi {
            bail!("[selection] toggle is only available under the multi-select policy");
        }
        Ok(if self.is_selected(handle) { self.unselect(handle) } else { self.select(handle) })
    }

    /// Remove `handle` if selected; otherwise a no-op.
    pub fn unselect(&mut self, handle: FeatureHandle) -> SelectionEvents {
        let mut events = SelectionEvents::new();
        if let Some(pos) = self.selected.iter().position(|&h| h == handle) {
            self.selected.remove(pos);
            events.push(SelectionEvent::Unselect(handle));
        }
        events
    }

    /// Unselect every selected handle matching `pred`, in selection order.
    pub fn clear_where(&mut self, mut pred: impl FnMut(FeatureHandle) -> bool) -> SelectionEvents {
        let mut events = SelectionEvents::new();
        self.selected.retain(|&h| {
            let drop = pred(h);
            if drop { events.push(SelectionEvent::Unselect(h)) }
            !drop
        });
        events
    }
}
