/* This file is part of DarkFi (https://dark.fi)
 *
 * Copyright (C) 2020-2026 Dyne.org foundation
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU Affero General Public License as
 * published by the Free Software Foundation, either version 3 of the
 * License, or (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU Affero General Public License for more details.
 *
 * You should have received a copy of the GNU Affero General Public License
 * along with this program.  If not, see <https://www.gnu.org/licenses/>.
 */

use std::{marker::PhantomData, ops::Bound};

use darkfi_serial::{serialize, Decodable, Encodable};
use sled_overlay::{sled, SledDbOverlay};

use crate::{Error, Result};

use super::parse_record;

/// A record stored in a [`Table`].
pub trait TableRow: Encodable + Decodable {
    /// Unique key of the row
    fn primary_key(&self) -> Vec<u8>;

    /// Key of the row under the secondary index `index`, or `None` if
    /// the row is not part of that index.
    fn index_key(&self, index: &str) -> Option<Vec<u8>>;
}

/// Scan direction of a range query
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Direction {
    /// Ascending key order
    Forward,
    /// Descending key order
    Backward,
}

/// Multi-index table living in a namespace of a `sled` tree.
///
/// Layout, with `<name>` the table namespace:
/// * `<name>/row/<pk>`: serialized row
/// * `<name>/<index>/<index key>`: primary key of the indexed row
///
/// Reads go to the committed tree. Mutations are staged into a
/// caller-provided [`SledDbOverlay`], so the caller decides when they
/// land on disk.
pub struct Table<R> {
    tree: sled::Tree,
    tree_name: &'static [u8],
    name: String,
    indexes: &'static [&'static str],
    _row: PhantomData<R>,
}

impl<R: TableRow> Table<R> {
    /// `tree` must be the tree the overlay knows as `tree_name`.
    pub fn new(
        tree: &sled::Tree,
        tree_name: &'static [u8],
        name: &str,
        indexes: &'static [&'static str],
    ) -> Self {
        Self {
            tree: tree.clone(),
            tree_name,
            name: name.to_string(),
            indexes,
            _row: PhantomData,
        }
    }

    fn row_key(&self, pk: &[u8]) -> Vec<u8> {
        self.entry_key("row", pk)
    }

    fn entry_key(&self, index: &str, key: &[u8]) -> Vec<u8> {
        let mut k = Vec::with_capacity(self.name.len() + index.len() + key.len() + 2);
        k.extend_from_slice(self.name.as_bytes());
        k.push(b'/');
        k.extend_from_slice(index.as_bytes());
        k.push(b'/');
        k.extend_from_slice(key);
        k
    }

    /// Fetch a row by its primary key.
    pub fn get(&self, pk: &[u8]) -> Result<Option<R>> {
        let key = self.row_key(pk);
        match self.tree.get(&key)? {
            Some(bytes) => Ok(Some(parse_record(&key, &bytes)?)),
            None => Ok(None),
        }
    }

    /// Stage the insertion of `row` and all of its index entries.
    pub fn insert(&self, overlay: &mut SledDbOverlay, row: &R) -> Result<()> {
        let pk = row.primary_key();
        overlay.insert(self.tree_name, &self.row_key(&pk), &serialize(row))?;
        for index in self.indexes {
            if let Some(key) = row.index_key(index) {
                overlay.insert(self.tree_name, &self.entry_key(index, &key), &pk)?;
            }
        }
        Ok(())
    }

    /// Stage the removal of `row` and all of its index entries. Every
    /// entry must be present.
    pub fn delete(&self, overlay: &mut SledDbOverlay, row: &R) -> Result<()> {
        overlay.remove(self.tree_name, &self.row_key(&row.primary_key()))?;
        for index in self.indexes {
            if let Some(key) = row.index_key(index) {
                overlay.remove(self.tree_name, &self.entry_key(index, &key))?;
            }
        }
        Ok(())
    }

    /// Stage the replacement of `prev` (if any) by `current`. Entries
    /// shared by both rows end up present.
    pub fn replace(
        &self,
        overlay: &mut SledDbOverlay,
        prev: Option<&R>,
        current: &R,
    ) -> Result<()> {
        if let Some(prev) = prev {
            self.delete(overlay, prev)?;
        }
        self.insert(overlay, current)
    }

    /// Return up to `count` rows whose key under `index` starts with
    /// `prefix`, in `direction` order. When `cursor` is given, only
    /// keys strictly after (forward) or strictly before (backward)
    /// `prefix ++ cursor` are returned.
    pub fn list(
        &self,
        index: &str,
        prefix: &[u8],
        cursor: Option<&[u8]>,
        direction: Direction,
        count: usize,
    ) -> Result<Vec<R>> {
        let base = self.entry_key(index, prefix);

        let iter = match cursor {
            None => self.tree.scan_prefix(&base),
            Some(cursor) => {
                let mut from = base.clone();
                from.extend_from_slice(cursor);
                match direction {
                    Direction::Forward => {
                        self.tree.range::<Vec<u8>, _>((Bound::Excluded(from), Bound::Unbounded))
                    }
                    Direction::Backward => self.tree.range(base.clone()..from),
                }
            }
        };

        let iter: Box<dyn Iterator<Item = sled::Result<(sled::IVec, sled::IVec)>>> =
            match direction {
                Direction::Forward => Box::new(iter),
                Direction::Backward => Box::new(iter.rev()),
            };

        let mut rows = Vec::with_capacity(count.min(64));
        for record in iter {
            if rows.len() >= count {
                break
            }
            let (key, pk) = record?;
            if !key.starts_with(&base) {
                break
            }
            let Some(row) = self.get(&pk)? else {
                return Err(Error::CorruptedRecord {
                    key: String::from_utf8_lossy(&key).into_owned(),
                    reason: "index entry points to a missing row".to_string(),
                })
            };
            rows.push(row);
        }

        Ok(rows)
    }
}
