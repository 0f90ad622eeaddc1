//! Spatial layers: one arena of `(cell, payload)` entries per entity kind.

use std::marker::PhantomData;

use dragon_tiles_core::{Cell, LayerKey, Slot};

/// Single occupant of a layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LayerEntry<T> {
    /// Cell the entity stands on.
    pub cell: Cell,
    /// Kind-specific data carried by the entity.
    pub payload: T,
}

#[derive(Clone, Debug)]
struct SlotEntry<T> {
    generation: u32,
    entry: Option<LayerEntry<T>>,
}

/// Generation-counted arena of entities keyed by `K`.
///
/// Removing an entry vacates its slot and bumps the slot generation, so keys
/// handed out for other entries stay valid and the removed key turns stale.
/// Vacated slots are reused by later pushes. Iteration follows slot order,
/// which matches insertion order until a slot is reused. Lookups by cell are
/// linear scans; boards hold tens of cells.
#[derive(Clone, Debug)]
pub struct Layer<K, T> {
    slots: Vec<SlotEntry<T>>,
    vacant: Vec<u32>,
    len: usize,
    _key: PhantomData<fn() -> K>,
}

impl<K, T> Default for Layer<K, T> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            vacant: Vec::new(),
            len: 0,
            _key: PhantomData,
        }
    }
}

impl<K: LayerKey, T> Layer<K, T> {
    /// Creates an empty layer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Reports whether the layer holds no live entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Appends an entry and returns its key.
    pub fn push(&mut self, cell: Cell, payload: T) -> K {
        let entry = Some(LayerEntry { cell, payload });
        self.len += 1;

        if let Some(index) = self.vacant.pop() {
            let slot = &mut self.slots[index as usize];
            slot.entry = entry;
            return K::from_slot(Slot::new(index, slot.generation));
        }

        let index = u32::try_from(self.slots.len()).unwrap_or(u32::MAX);
        self.slots.push(SlotEntry {
            generation: 0,
            entry,
        });
        K::from_slot(Slot::new(index, 0))
    }

    /// Resolves a key to its live entry.
    #[must_use]
    pub fn get(&self, key: K) -> Option<&LayerEntry<T>> {
        let slot = key.slot();
        self.slots
            .get(slot.index() as usize)
            .filter(|entry| entry.generation == slot.generation())
            .and_then(|entry| entry.entry.as_ref())
    }

    /// Resolves a key to its live entry for in-place mutation.
    #[must_use]
    pub fn get_mut(&mut self, key: K) -> Option<&mut LayerEntry<T>> {
        let slot = key.slot();
        self.slots
            .get_mut(slot.index() as usize)
            .filter(|entry| entry.generation == slot.generation())
            .and_then(|entry| entry.entry.as_mut())
    }

    /// Reports whether the key still refers to a live entry.
    #[must_use]
    pub fn contains(&self, key: K) -> bool {
        self.get(key).is_some()
    }

    /// Cell of the entry behind `key`.
    #[must_use]
    pub fn cell_of(&self, key: K) -> Option<Cell> {
        self.get(key).map(|entry| entry.cell)
    }

    /// First live entry standing on `cell`, in slot order.
    #[must_use]
    pub fn index_of_cell(&self, cell: Cell) -> Option<K> {
        self.iter()
            .find(|(_, entry)| entry.cell == cell)
            .map(|(key, _)| key)
    }

    /// Reports whether any live entry stands on `cell`.
    #[must_use]
    pub fn has_cell(&self, cell: Cell) -> bool {
        self.iter().any(|(_, entry)| entry.cell == cell)
    }

    /// Relocates the entry behind `key`.
    ///
    /// Does not look for collisions; callers validate the destination. Stale
    /// keys are ignored.
    pub fn set_cell(&mut self, key: K, cell: Cell) {
        if let Some(entry) = self.get_mut(key) {
            entry.cell = cell;
        }
    }

    /// Removes the entry behind `key`, returning it when the key was live.
    pub fn remove(&mut self, key: K) -> Option<LayerEntry<T>> {
        let slot = key.slot();
        let index = slot.index();
        let entry = self.slots.get_mut(index as usize)?;
        if entry.generation != slot.generation() {
            return None;
        }

        let removed = entry.entry.take()?;
        entry.generation = entry.generation.wrapping_add(1);
        self.vacant.push(index);
        self.len -= 1;
        Some(removed)
    }

    /// Iterates over live entries in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (K, &LayerEntry<T>)> + '_ {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            let entry = slot.entry.as_ref()?;
            let index = u32::try_from(index).ok()?;
            Some((K::from_slot(Slot::new(index, slot.generation)), entry))
        })
    }

    /// Keys of every live entry in slot order.
    pub fn keys(&self) -> impl Iterator<Item = K> + '_ {
        self.iter().map(|(key, _)| key)
    }

    /// Cells of every live entry in slot order.
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        self.iter().map(|(_, entry)| entry.cell)
    }
}
