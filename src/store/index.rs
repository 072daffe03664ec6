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

use log::debug;
use sled_overlay::sled;

use crate::{
    model::{Proposal, ProposalKind, ProposalStatus},
    receipt::ProposalLog,
    Result,
};

use super::{StateOverlay, Table, TableRow};

pub const SLED_INDEX_TREE: &[u8] = b"_autonomy_index";

/// Secondary indices maintained for every proposal kind
pub const PROPOSAL_INDEXES: &[&str] = &[STATUS_INDEX, ADDR_INDEX, ADDR_STATUS_INDEX];

pub const STATUS_INDEX: &str = "status";
pub const ADDR_INDEX: &str = "addr";
pub const ADDR_STATUS_INDEX: &str = "addr_status";

/// Key prefix of the `status` index for the given status
pub fn status_prefix(status: ProposalStatus) -> Vec<u8> {
    vec![status as u8]
}

/// Key prefix of the `addr` index for the given proposer
pub fn addr_prefix(addr: &str) -> Vec<u8> {
    let mut key = addr.as_bytes().to_vec();
    key.push(0x00);
    key
}

/// Key prefix of the `addr_status` index for the given proposer and status
pub fn addr_status_prefix(addr: &str, status: ProposalStatus) -> Vec<u8> {
    let mut key = addr_prefix(addr);
    key.push(status as u8);
    key
}

impl TableRow for Proposal {
    fn primary_key(&self) -> Vec<u8> {
        self.id.as_bytes().to_vec()
    }

    // Every index key ends with the big-endian cursor, so the rows
    // sharing a prefix sort by (height, index).
    fn index_key(&self, index: &str) -> Option<Vec<u8>> {
        let mut key = match index {
            STATUS_INDEX => status_prefix(self.status),
            ADDR_INDEX => addr_prefix(&self.proposer),
            ADDR_STATUS_INDEX => addr_status_prefix(&self.proposer, self.status),
            _ => return None,
        };
        key.extend_from_slice(&(self.cursor() as u64).to_be_bytes());
        Some(key)
    }
}

/// The `IndexStore` is the query side of the engine: a `sled` tree
/// holding one [`Table`] of proposals per kind. Its entries are staged
/// into the same overlay as the consensus state, so both trees commit
/// and roll back together.
#[derive(Clone)]
pub struct IndexStore(pub sled::Tree);

impl IndexStore {
    /// Opens a new or existing `IndexStore` on the given sled database.
    pub fn new(db: &sled::Db) -> Result<Self> {
        let tree = db.open_tree(SLED_INDEX_TREE)?;
        Ok(Self(tree))
    }

    pub fn table(&self, kind: ProposalKind) -> Table<Proposal> {
        Table::new(&self.0, SLED_INDEX_TREE, kind.as_str(), PROPOSAL_INDEXES)
    }

    /// Fetch the indexed copy of a proposal.
    pub fn get(&self, kind: ProposalKind, id: &str) -> Result<Option<Proposal>> {
        self.table(kind).get(id.as_bytes())
    }

    /// Stage the index update of the transition described by `log`:
    /// entries of the previous snapshot are dropped and those of the
    /// current one inserted.
    pub fn stage(&self, overlay: &mut StateOverlay, log: &ProposalLog) -> Result<()> {
        let table = self.table(log.current.kind());
        table.replace(&mut overlay.0, log.prev.as_ref(), &log.current)?;

        debug!(
            target: "autonomy::store::index",
            "Indexed {:?} of {} proposal {}: {:?} -> {}",
            log.action,
            log.current.kind(),
            log.current.id,
            log.prev.as_ref().map(|p| p.status),
            log.current.status,
        );
        Ok(())
    }
}
