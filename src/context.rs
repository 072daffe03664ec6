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

//! Execution context handed to every action: where in the chain the
//! transaction sits, who sent it, and a view of historical balances.

use crate::{tx::Transaction, Result};

/// Position and origin of the transaction being executed
#[derive(Clone, Debug)]
pub struct TxContext {
    pub height: u64,
    pub index: u32,
    pub tx_hash: blake3::Hash,
    pub sender: String,
}

impl TxContext {
    pub fn new(tx: &Transaction, height: u64, index: u32) -> Self {
        Self { height, index, tx_hash: tx.hash(), sender: tx.sender.clone() }
    }

    /// ID given to a proposal created by this transaction
    pub fn proposal_id(&self) -> String {
        self.tx_hash.to_hex().to_string()
    }
}

/// Chain queries the engine needs but does not own.
pub trait BalanceOracle {
    /// Voting balance of `addr` as of block `height`, in base units.
    fn balance_at(&self, addr: &str, height: u64) -> Result<u64>;

    /// Miner address `addr` delegated its tickets to, if any.
    fn miner_binding(&self, addr: &str) -> Result<Option<String>>;
}
