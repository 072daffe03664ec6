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

use std::{
    collections::BTreeMap,
    io::{Read, Result as IoResult, Write},
};

use darkfi_serial::{Decodable, Encodable, SerialDecodable, SerialEncodable};
use sled_overlay::{sled::IVec, SledDbOverlayStateDiff, SledTreeOverlayStateDiff};

use crate::model::{Account, Proposal};

/// Inserted keys with their previous value, and removed keys with the
/// value they held.
type TreeChanges = (BTreeMap<Vec<u8>, (Option<Vec<u8>>, Vec<u8>)>, BTreeMap<Vec<u8>, Vec<u8>>);

/// Per-tree changes along with the drop or restore flag of the tree
type TreeSet = BTreeMap<Vec<u8>, (TreeChanges, bool)>;

/// Mutations of the state and index trees made by one transaction, as
/// recorded by its [`StateOverlay`](crate::store::StateOverlay).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StateDiff(pub SledDbOverlayStateDiff);

impl StateDiff {
    /// Diff undoing this one
    pub fn inverse(&self) -> Self {
        Self(self.0.inverse())
    }

    /// Number of keys written or removed
    pub fn len(&self) -> usize {
        self.0.caches.values().map(|(tree, _)| tree.cache.len() + tree.removed.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn tree_changes(diff: &SledTreeOverlayStateDiff) -> TreeChanges {
    let cache = diff
        .cache
        .iter()
        .map(|(k, (prev, current))| {
            (k.to_vec(), (prev.as_ref().map(|v| v.to_vec()), current.to_vec()))
        })
        .collect();
    let removed = diff.removed.iter().map(|(k, v)| (k.to_vec(), v.to_vec())).collect();
    (cache, removed)
}

fn tree_diff(changes: TreeChanges) -> SledTreeOverlayStateDiff {
    let (cache, removed) = changes;
    SledTreeOverlayStateDiff {
        cache: cache
            .into_iter()
            .map(|(k, (prev, current))| (k.into(), (prev.map(IVec::from), current.into())))
            .collect(),
        removed: removed.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
    }
}

fn encode_trees(trees: &BTreeMap<IVec, (SledTreeOverlayStateDiff, bool)>) -> TreeSet {
    trees.iter().map(|(k, (diff, flag))| (k.to_vec(), (tree_changes(diff), *flag))).collect()
}

fn decode_trees(trees: TreeSet) -> BTreeMap<IVec, (SledTreeOverlayStateDiff, bool)> {
    trees.into_iter().map(|(k, (changes, flag))| (k.into(), (tree_diff(changes), flag))).collect()
}

impl Encodable for StateDiff {
    fn encode<W: Write>(&self, s: &mut W) -> IoResult<usize> {
        let names: Vec<Vec<u8>> = self.0.initial_tree_names.iter().map(|n| n.to_vec()).collect();
        let mut len = names.encode(s)?;
        len += encode_trees(&self.0.caches).encode(s)?;
        len += encode_trees(&self.0.dropped_trees).encode(s)?;
        Ok(len)
    }
}

impl Decodable for StateDiff {
    fn decode<D: Read>(d: &mut D) -> IoResult<Self> {
        let names: Vec<Vec<u8>> = Decodable::decode(d)?;
        let caches: TreeSet = Decodable::decode(d)?;
        let dropped_trees: TreeSet = Decodable::decode(d)?;
        Ok(Self(SledDbOverlayStateDiff {
            initial_tree_names: names.into_iter().map(IVec::from).collect(),
            caches: decode_trees(caches),
            dropped_trees: decode_trees(dropped_trees),
        }))
    }
}

/// Ledger primitive operations
#[derive(Copy, Clone, Debug, Eq, PartialEq, SerialEncodable, SerialDecodable)]
pub enum LedgerOp {
    Deposit,
    Frozen,
    Active,
    Transfer,
    TransferFrozen,
}

/// Balance change of one account under one custody address
#[derive(Clone, Debug, Eq, PartialEq, SerialEncodable, SerialDecodable)]
pub struct AccountLog {
    pub op: LedgerOp,
    pub owner: String,
    pub custody: String,
    pub prev: Account,
    pub current: Account,
}

/// Proposal actions, mirrored into receipts
#[derive(Copy, Clone, Debug, Eq, PartialEq, SerialEncodable, SerialDecodable)]
pub enum ProposalAction {
    Propose,
    Revoke,
    Vote,
    PublicVote,
    Terminate,
}

/// Before/after snapshot of the proposal touched by a transaction.
/// `prev` is `None` only for `Propose`.
#[derive(Clone, Debug, Eq, PartialEq, SerialEncodable, SerialDecodable)]
pub struct ProposalLog {
    pub action: ProposalAction,
    pub prev: Option<Proposal>,
    pub current: Proposal,
}

/// Everything a successfully executed transaction changes. Applying
/// the receipt commits it, and the same receipt is the only input
/// needed to undo it.
#[derive(Clone, Debug, PartialEq, SerialEncodable, SerialDecodable)]
pub struct Receipt {
    pub tx_hash: String,
    pub height: u64,
    pub index: u32,
    /// State and index mutations
    pub diff: StateDiff,
    /// Ledger deltas in execution order
    pub accounts: Vec<AccountLog>,
    pub proposal: ProposalLog,
}
