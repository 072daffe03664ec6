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

use std::sync::Arc;

use log::{debug, info};
use sled_overlay::sled;

use crate::{
    config::AutonomyConfig,
    context::{BalanceOracle, TxContext},
    engine::Action,
    ledger::Ledger,
    model::{
        validate_address, Account, ActiveBoard, Proposal, ProposalKind, RuleConfig, VotePhase,
        VotesRecord, MAX_TX_PER_BLOCK,
    },
    receipt::Receipt,
    store::{IndexStore, ListRequest, StateRead, StateStore},
    tx::Transaction,
    Error, Result,
};

/// Atomic pointer to the governance executor.
pub type AutonomyPtr = Arc<Autonomy>;

/// Governance executor.
///
/// Transactions must be fed in `(height, index)` order by a single
/// writer. [`Autonomy::execute`] never writes: it returns a [`Receipt`]
/// that [`Autonomy::apply`] commits and [`Autonomy::rollback`] undoes.
/// Queries only read the index store and may run concurrently.
#[derive(Clone)]
pub struct Autonomy {
    pub config: AutonomyConfig,
    pub state: StateStore,
    pub index: IndexStore,
}

impl Autonomy {
    /// Open the executor on `db`. If no committee is installed yet, the
    /// configured genesis committee is.
    pub fn new(db: &sled::Db, config: AutonomyConfig) -> Result<Self> {
        config.validate()?;
        let state = StateStore::new(db)?;
        let index = IndexStore::new(db)?;

        if state.get_active_board()?.is_none() && !config.genesis_board.is_empty() {
            for addr in &config.genesis_board {
                validate_address(addr)?;
            }
            let board = ActiveBoard { boards: config.genesis_board.clone(), ..Default::default() };
            state.insert_active_board(&board)?;
            info!(
                target: "autonomy::executor",
                "Installed genesis committee of {} members", board.boards.len(),
            );
        }

        Ok(Self { config, state, index })
    }

    /// Execute `tx` at position `(height, index)` against the committed
    /// state. Nothing is written, whatever the result. `index` must be
    /// below [`MAX_TX_PER_BLOCK`], which keeps index cursors unique.
    pub fn execute(
        &self,
        tx: &Transaction,
        height: u64,
        index: u32,
        oracle: &dyn BalanceOracle,
    ) -> Result<Receipt> {
        if u64::from(index) >= MAX_TX_PER_BLOCK {
            return Err(Error::InvalidParam(format!(
                "transaction index {index} not below {MAX_TX_PER_BLOCK}"
            )))
        }

        let ctx = TxContext::new(tx, height, index);
        debug!(
            target: "autonomy::executor",
            "Executing {:?} tx {} at {height}:{index}", tx.call.function(), ctx.tx_hash,
        );
        let overlay = self.state.overlay()?;
        Action::new(&self.config, &ctx, oracle, &self.index, overlay).execute(&tx.call)
    }

    /// Decode and execute a transaction in wire format.
    pub fn execute_encoded(
        &self,
        bytes: &[u8],
        height: u64,
        index: u32,
        oracle: &dyn BalanceOracle,
    ) -> Result<Receipt> {
        let tx = Transaction::decode(bytes)?;
        self.execute(&tx, height, index, oracle)
    }

    /// Commit a receipt. Consensus state and index land in the same
    /// sled transaction.
    pub fn apply(&self, receipt: &Receipt) -> Result<()> {
        self.state.apply(&receipt.diff)
    }

    pub fn execute_and_apply(
        &self,
        tx: &Transaction,
        height: u64,
        index: u32,
        oracle: &dyn BalanceOracle,
    ) -> Result<Receipt> {
        let receipt = self.execute(tx, height, index, oracle)?;
        self.apply(&receipt)?;
        Ok(receipt)
    }

    /// Undo an applied receipt. Receipts must be rolled back in reverse
    /// order of application.
    pub fn rollback(&self, receipt: &Receipt) -> Result<()> {
        self.state.revert(&receipt.diff)?;
        info!(
            target: "autonomy::executor",
            "Rolled back tx {} at {}:{}", receipt.tx_hash, receipt.height, receipt.index,
        );
        Ok(())
    }

    /// Credit `amount` to `owner` under the contract custody. This is how
    /// funds enter the contract, including the treasury when `owner` is
    /// the contract address itself.
    pub fn deposit(&self, owner: &str, amount: u64) -> Result<()> {
        validate_address(owner)?;
        let mut state = self.state.overlay()?;
        let mut logs = vec![];
        Ledger::new(&mut state, &mut logs).deposit(owner, &self.config.autonomy_address, amount)?;
        self.state.apply(&state.into_diff()?)
    }

    /// Account of `owner` under the contract custody
    pub fn account(&self, owner: &str) -> Result<Account> {
        self.state.get_account(owner, &self.config.autonomy_address)
    }

    /// Free balance of the treasury
    pub fn treasury(&self) -> Result<u64> {
        Ok(self.account(&self.config.autonomy_address)?.balance)
    }

    pub fn get_proposal(&self, kind: ProposalKind, id: &str) -> Result<Proposal> {
        self.index.get(kind, id)?.ok_or_else(|| Error::ProposalNotFound(kind, id.to_string()))
    }

    pub fn list_proposals(&self, kind: ProposalKind, req: &ListRequest) -> Result<Vec<Proposal>> {
        self.index.list(kind, req)
    }

    pub fn active_board(&self) -> Result<ActiveBoard> {
        self.state.get_active_board()?.ok_or(Error::NoActiveBoard)
    }

    pub fn active_rule(&self) -> Result<RuleConfig> {
        Ok(self.state.get_active_rule()?.unwrap_or_else(|| self.config.rule.clone()))
    }

    pub fn votes_record(
        &self,
        kind: ProposalKind,
        id: &str,
        phase: VotePhase,
    ) -> Result<VotesRecord> {
        self.state.get_votes(kind, id, phase)
    }
}
