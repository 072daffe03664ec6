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

use darkfi_serial::{serialize, Decodable, Encodable};
use log::debug;
use sled_overlay::{sled, SledDbOverlay};

use crate::{
    model::{Account, ActiveBoard, Proposal, ProposalKind, RuleConfig, VotePhase, VotesRecord},
    receipt::StateDiff,
    Result,
};

use super::{index::SLED_INDEX_TREE, parse_record};

pub const SLED_STATE_TREE: &[u8] = b"_autonomy_state";

const ACTIVE_BOARD_KEY: &[u8] = b"active_board";
const ACTIVE_RULE_KEY: &[u8] = b"active_rule";

/// State key of a proposal record. Each kind lives in its own namespace.
pub fn proposal_key(kind: ProposalKind, id: &str) -> Vec<u8> {
    format!("proposal/{}/{id}", kind.as_str()).into_bytes()
}

/// State key of the votes record of one phase of one proposal.
pub fn votes_key(kind: ProposalKind, id: &str, phase: VotePhase) -> Vec<u8> {
    format!("votes/{}/{}/{id}", kind.as_str(), phase.as_str()).into_bytes()
}

/// State key of the account of `owner` under `custody`.
pub fn account_key(owner: &str, custody: &str) -> Vec<u8> {
    format!("account/{custody}/{owner}").into_bytes()
}

/// Typed read access shared by the committed store and the pending
/// overlay.
pub trait StateRead {
    /// Fetch the raw value stored under `key`.
    fn get_raw(&self, key: &[u8]) -> Result<Option<Vec<u8>>>;

    /// Fetch and decode the record stored under `key`. A record that
    /// fails to decode is reported as corrupted, never as missing.
    fn get_record<T: Decodable>(&self, key: &[u8]) -> Result<Option<T>> {
        match self.get_raw(key)? {
            Some(bytes) => Ok(Some(parse_record(key, &bytes)?)),
            None => Ok(None),
        }
    }

    fn get_proposal(&self, kind: ProposalKind, id: &str) -> Result<Option<Proposal>> {
        self.get_record(&proposal_key(kind, id))
    }

    fn get_active_board(&self) -> Result<Option<ActiveBoard>> {
        self.get_record(ACTIVE_BOARD_KEY)
    }

    fn get_active_rule(&self) -> Result<Option<RuleConfig>> {
        self.get_record(ACTIVE_RULE_KEY)
    }

    /// Votes record of a proposal phase, empty if nobody voted yet.
    fn get_votes(&self, kind: ProposalKind, id: &str, phase: VotePhase) -> Result<VotesRecord> {
        Ok(self.get_record(&votes_key(kind, id, phase))?.unwrap_or_default())
    }

    /// Account of `owner` under `custody`, zeroed if it never existed.
    fn get_account(&self, owner: &str, custody: &str) -> Result<Account> {
        Ok(self.get_record(&account_key(owner, custody))?.unwrap_or_default())
    }
}

/// The `StateStore` is a `sled` tree holding the consensus state of the
/// governance engine:
/// * `proposal/<kind>/<id>`: serialized [`Proposal`]
/// * `votes/<kind>/<phase>/<id>`: serialized [`VotesRecord`]
/// * `account/<custody>/<owner>`: serialized [`Account`]
/// * `active_board`, `active_rule`: the singletons
///
/// It also commits transaction diffs, which span this tree and the
/// index tree.
#[derive(Clone)]
pub struct StateStore {
    db: sled::Db,
    pub tree: sled::Tree,
}

impl StateStore {
    /// Opens a new or existing `StateStore` on the given sled database.
    pub fn new(db: &sled::Db) -> Result<Self> {
        let tree = db.open_tree(SLED_STATE_TREE)?;
        Ok(Self { db: db.clone(), tree })
    }

    /// Create a transaction overlay on top of the committed state and
    /// index trees.
    pub fn overlay(&self) -> Result<StateOverlay> {
        // Both trees must exist before the overlay records the tree names
        self.db.open_tree(SLED_INDEX_TREE)?;

        let mut overlay = SledDbOverlay::new(&self.db, vec![]);
        overlay.open_tree(SLED_STATE_TREE, true)?;
        overlay.open_tree(SLED_INDEX_TREE, true)?;
        Ok(StateOverlay(overlay))
    }

    /// Write `diff` to both trees in one sled transaction.
    pub fn apply(&self, diff: &StateDiff) -> Result<()> {
        let mut overlay = SledDbOverlay::new(&self.db, vec![]);
        overlay.apply_diff(&diff.0)?;
        debug!(target: "autonomy::store::state", "Applied diff of {} keys", diff.len());
        Ok(())
    }

    /// Undo a previously applied `diff` in one sled transaction.
    pub fn revert(&self, diff: &StateDiff) -> Result<()> {
        let mut overlay = SledDbOverlay::new(&self.db, vec![]);
        overlay.apply_diff(&diff.inverse().0)?;
        debug!(target: "autonomy::store::state", "Reverted diff of {} keys", diff.len());
        Ok(())
    }

    /// Write a record outside of any transaction. Used to seed the
    /// store with genesis values.
    pub fn insert_record<T: Encodable>(&self, key: &[u8], record: &T) -> Result<()> {
        self.tree.insert(key, serialize(record))?;
        Ok(())
    }

    pub fn insert_active_board(&self, board: &ActiveBoard) -> Result<()> {
        self.insert_record(ACTIVE_BOARD_KEY, board)
    }
}

impl StateRead for StateStore {
    fn get_raw(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        Ok(self.tree.get(key)?.map(|v| v.to_vec()))
    }
}

/// Transaction-local overlay over the state and index trees. Reads see
/// the transaction's own writes, nothing reaches the trees until the
/// resulting [`StateDiff`] is applied, and dropping the overlay
/// discards everything.
pub struct StateOverlay(pub SledDbOverlay);

impl StateOverlay {
    pub fn put_record<T: Encodable>(&mut self, key: &[u8], record: &T) -> Result<()> {
        self.0.insert(SLED_STATE_TREE, key, &serialize(record))?;
        Ok(())
    }

    pub fn put_proposal(&mut self, proposal: &Proposal) -> Result<()> {
        self.put_record(&proposal_key(proposal.kind(), &proposal.id), proposal)
    }

    pub fn put_active_board(&mut self, board: &ActiveBoard) -> Result<()> {
        self.put_record(ACTIVE_BOARD_KEY, board)
    }

    pub fn put_active_rule(&mut self, rule: &RuleConfig) -> Result<()> {
        self.put_record(ACTIVE_RULE_KEY, rule)
    }

    pub fn put_votes(
        &mut self,
        kind: ProposalKind,
        id: &str,
        phase: VotePhase,
        votes: &VotesRecord,
    ) -> Result<()> {
        self.put_record(&votes_key(kind, id, phase), votes)
    }

    pub fn put_account(&mut self, owner: &str, custody: &str, account: &Account) -> Result<()> {
        self.put_record(&account_key(owner, custody), account)
    }

    /// Consume the overlay, returning everything it changed against
    /// the committed trees.
    pub fn into_diff(self) -> Result<StateDiff> {
        Ok(StateDiff(self.0.diff(&[])?))
    }
}

impl StateRead for StateOverlay {
    fn get_raw(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        Ok(self.0.get(SLED_STATE_TREE, key)?.map(|v| v.to_vec()))
    }
}
