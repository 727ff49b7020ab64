// Copyright (C) 2025 Ryan Daum <ryan.daum@gmail.com> This program is free
// software: you can redistribute it and/or modify it under the terms of the GNU
// General Public License as published by the Free Software Foundation, version
// 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

//! Row-indexed side tables that follow the buffer's line structure.
//!
//! The buffer journals every line-level mutation as a [`LineEvent`]. Each
//! cache that holds one entry per row (highlighter facts, layout metrics)
//! owns a [`RowTable`] and replays the same events in the same order, so
//! entry `i` always describes buffer row `i`. Replaying only marks entries
//! stale; the owner decides whether to recompute them eagerly
//! ([`RowTable::refresh`]) or on first use ([`RowTable::get_or_compute`]).

/// A single change to the buffer's line sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEvent {
    /// The line at `row` was replaced in place.
    Set(usize),
    /// A line was inserted at `row`; rows at and after it shift down.
    Insert(usize),
    /// The line at `row` was removed; rows after it shift up.
    Remove(usize),
}

#[derive(Debug, Clone)]
struct Slot<T> {
    value: Option<T>,
    stale: bool,
}

impl<T> Slot<T> {
    fn stale() -> Self {
        Self {
            value: None,
            stale: true,
        }
    }
}

/// Side table with one entry per buffer row.
#[derive(Debug, Clone)]
pub struct RowTable<T> {
    slots: Vec<Slot<T>>,
    /// Set when rows were inserted or removed since the last refresh
    reshaped: bool,
}

impl<T> Default for RowTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> RowTable<T> {
    /// A table for a fresh buffer, which always has exactly one empty line.
    pub fn new() -> Self {
        Self::with_rows(1)
    }

    pub fn with_rows(rows: usize) -> Self {
        Self {
            slots: (0..rows).map(|_| Slot::stale()).collect(),
            reshaped: true,
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Replay one buffer event. Out-of-range rows are a broken invariant.
    pub fn apply(&mut self, event: LineEvent) {
        match event {
            LineEvent::Set(row) => {
                let len = self.slots.len();
                let slot = self
                    .slots
                    .get_mut(row)
                    .unwrap_or_else(|| panic!("row table: set row {row} out of {len}"));
                slot.stale = true;
            }
            LineEvent::Insert(row) => {
                assert!(
                    row <= self.slots.len(),
                    "row table: insert row {row} beyond {}",
                    self.slots.len()
                );
                self.slots.insert(row, Slot::stale());
                self.reshaped = true;
            }
            LineEvent::Remove(row) => {
                assert!(
                    row < self.slots.len(),
                    "row table: remove row {row} out of {}",
                    self.slots.len()
                );
                self.slots.remove(row);
                self.reshaped = true;
            }
        }
    }

    /// Mark every entry stale, e.g. after a viewport resize.
    pub fn invalidate_all(&mut self) {
        for slot in &mut self.slots {
            slot.stale = true;
        }
    }

    pub fn is_stale(&self, row: usize) -> bool {
        self.slots.get(row).map_or(true, |slot| slot.stale)
    }

    /// Entry for `row` if it has been computed and is still current.
    pub fn get(&self, row: usize) -> Option<&T> {
        self.slots
            .get(row)
            .filter(|slot| !slot.stale)
            .and_then(|slot| slot.value.as_ref())
    }

    /// Entry for `row`, even if it is stale. Used by whole-document passes
    /// that run right after a refresh.
    pub fn entry(&self, row: usize) -> &T {
        self.slots[row]
            .value
            .as_ref()
            .unwrap_or_else(|| panic!("row table: row {row} was never computed"))
    }

    /// Lazily (re)compute the entry for a single row.
    pub fn get_or_compute(&mut self, row: usize, compute: impl FnOnce() -> T) -> &T {
        let slot = &mut self.slots[row];
        if slot.stale || slot.value.is_none() {
            slot.stale = false;
            return slot.value.insert(compute());
        }
        slot.value
            .as_ref()
            .unwrap_or_else(|| unreachable!("row table: row {row} has a value"))
    }
}

impl<T: PartialEq> RowTable<T> {
    /// Recompute every stale entry from `compute(row)`.
    ///
    /// Returns true when the table's contents changed in a way a
    /// whole-document pass has to see: rows were inserted or removed, or a
    /// recomputed entry differs from its previous value.
    pub fn refresh(&mut self, mut compute: impl FnMut(usize) -> T) -> bool {
        let mut changed = std::mem::take(&mut self.reshaped);
        for (row, slot) in self.slots.iter_mut().enumerate() {
            if !slot.stale {
                continue;
            }
            let value = compute(row);
            if slot.value.as_ref() != Some(&value) {
                changed = true;
                slot.value = Some(value);
            }
            slot.stale = false;
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_events_keep_rows_aligned() {
        let mut table: RowTable<usize> = RowTable::with_rows(3);
        table.refresh(|row| row * 10);
        assert_eq!(table.get(2), Some(&20));

        table.apply(LineEvent::Insert(1));
        assert_eq!(table.len(), 4);
        assert_eq!(table.get(2), Some(&10));
        assert_eq!(table.get(1), None);

        table.apply(LineEvent::Remove(0));
        assert_eq!(table.len(), 3);
        assert_eq!(table.get(1), Some(&10));
    }

    #[test]
    fn test_refresh_reports_changes() {
        let mut table: RowTable<usize> = RowTable::with_rows(2);
        assert!(table.refresh(|_| 7));
        // Nothing stale, nothing reshaped
        assert!(!table.refresh(|_| 9));

        table.apply(LineEvent::Set(1));
        // Recomputed to the same value
        assert!(!table.refresh(|_| 7));

        table.apply(LineEvent::Set(1));
        assert!(table.refresh(|_| 8));
        assert_eq!(table.get(1), Some(&8));
    }

    #[test]
    fn test_lazy_compute() {
        let mut table: RowTable<String> = RowTable::new();
        assert!(table.is_stale(0));
        assert_eq!(table.get_or_compute(0, || "a".to_string()), "a");
        // Fresh entries are not recomputed
        assert_eq!(table.get_or_compute(0, || "b".to_string()), "a");
        table.invalidate_all();
        assert_eq!(table.get_or_compute(0, || "b".to_string()), "b");
    }

    #[test]
    #[should_panic]
    fn test_remove_out_of_range_is_fatal() {
        let mut table: RowTable<u8> = RowTable::with_rows(1);
        table.apply(LineEvent::Remove(1));
    }
}
