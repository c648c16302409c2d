use std::fmt;

use super::Patch;

/// Stable handle to a patch in a `PatchBank`.
///
/// Channels remember the handle, not the patch contents, so two bank entries
/// with identical parameters are still different instruments. Handles are
/// never reused, even after `remove`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PatchId(u32);

impl PatchId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for PatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "patch #{}", self.0)
    }
}

/// Anything the dispatcher can look patches up in.
pub trait PatchSource {
    fn patch(&self, id: PatchId) -> Option<&Patch>;
}

/// Arena of patches owned by the caller.
#[derive(Debug, Default, Clone)]
pub struct PatchBank {
    slots: Vec<Option<Patch>>,
}

impl PatchBank {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, patch: Patch) -> PatchId {
        let id = PatchId(self.slots.len() as u32);
        self.slots.push(Some(patch));
        id
    }

    pub fn get(&self, id: PatchId) -> Option<&Patch> {
        self.slots.get(id.index()).and_then(Option::as_ref)
    }

    /// Edit a patch in place. Call `patch_update` afterwards to push the edit
    /// to the channels playing it.
    pub fn get_mut(&mut self, id: PatchId) -> Option<&mut Patch> {
        self.slots.get_mut(id.index()).and_then(Option::as_mut)
    }

    /// Remove a patch. Channels still holding the id stop receiving updates.
    pub fn remove(&mut self, id: PatchId) -> Option<Patch> {
        self.slots.get_mut(id.index()).and_then(Option::take)
    }

    pub fn contains(&self, id: PatchId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (PatchId, &Patch)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|p| (PatchId(i as u32), p)))
    }
}

impl PatchSource for PatchBank {
    fn patch(&self, id: PatchId) -> Option<&Patch> {
        self.get(id)
    }
}
