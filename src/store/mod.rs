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

use darkfi_serial::{deserialize, Decodable};

use crate::{Error, Result};

/// Consensus state store and its transaction-local overlay
pub mod state;
pub use state::{StateOverlay, StateRead, StateStore};

/// Generic multi-index table over a `sled` tree
pub mod table;
pub use table::{Direction, Table, TableRow};

/// Proposal tables and the index maintainer
pub mod index;
pub use index::IndexStore;

/// Read-only query surface
pub mod query;
pub use query::ListRequest;

/// Decode a persisted record, reporting failures as corruption of the
/// record stored under `key`.
pub fn parse_record<T: Decodable>(key: &[u8], value: &[u8]) -> Result<T> {
    deserialize(value).map_err(|e| Error::CorruptedRecord {
        key: String::from_utf8_lossy(key).into_owned(),
        reason: e.to_string(),
    })
}
