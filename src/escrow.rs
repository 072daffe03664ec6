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

use log::info;

use crate::{ledger::Ledger, Error, Result};

/// Bond and treasury rules on top of the [`Ledger`].
///
/// All accounts live under the contract custody address. Bonds are
/// frozen in the proposer's own account until they are either released
/// (revoke) or moved into the pool, which is the free balance of the
/// contract address itself. The treasury is that same account: project
/// funds are frozen there at creation and either paid out or unfrozen
/// when the proposal resolves.
pub struct Escrow<'a> {
    ledger: Ledger<'a>,
    custody: &'a str,
}

impl<'a> Escrow<'a> {
    pub fn new(ledger: Ledger<'a>, custody: &'a str) -> Self {
        Self { ledger, custody }
    }

    pub fn freeze_bond(&mut self, proposer: &str, amount: u64) -> Result<()> {
        self.ledger.exec_frozen(proposer, self.custody, amount)
    }

    /// Return the bond to the proposer. Only a revoke does this.
    pub fn release_bond(&mut self, proposer: &str, amount: u64) -> Result<()> {
        self.ledger.exec_active(proposer, self.custody, amount)
    }

    /// Move the frozen bond into the pool. Happens once per proposal,
    /// on first vote or at termination of a never-voted proposal.
    pub fn lock_bond(&mut self, proposer: &str, amount: u64) -> Result<()> {
        self.ledger.exec_transfer_frozen(proposer, self.custody, self.custody, amount)
    }

    /// Free balance of the treasury
    pub fn treasury_balance(&self) -> Result<u64> {
        Ok(self.ledger.load(self.custody, self.custody)?.balance)
    }

    /// Reserve project funds in the treasury.
    pub fn freeze_funds(&mut self, amount: u64) -> Result<()> {
        if self.treasury_balance()? < amount {
            return Err(Error::NotEnoughFund)
        }
        self.ledger.exec_frozen(self.custody, self.custody, amount)
    }

    /// Pay reserved project funds to `to`.
    pub fn pay_funds(&mut self, to: &str, amount: u64) -> Result<()> {
        self.ledger.exec_transfer_frozen(self.custody, to, self.custody, amount)?;
        info!(target: "autonomy::escrow", "Paid {amount} project funds to {to}");
        Ok(())
    }

    /// Return reserved project funds to the treasury.
    pub fn refund_funds(&mut self, amount: u64) -> Result<()> {
        self.ledger.exec_active(self.custody, self.custody, amount)?;
        info!(target: "autonomy::escrow", "Returned {amount} project funds to the treasury");
        Ok(())
    }
}
