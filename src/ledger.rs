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

//! Balance primitive. Every account is identified by an owner and the
//! custody address holding it, and splits into a free `balance` and a
//! `frozen` part. Each operation writes through the transaction overlay
//! and records an [`AccountLog`] per touched account.

use log::debug;

use crate::{
    model::Account,
    receipt::{AccountLog, LedgerOp},
    store::{StateOverlay, StateRead},
    Error, Result,
};

pub struct Ledger<'a> {
    state: &'a mut StateOverlay,
    logs: &'a mut Vec<AccountLog>,
}

impl<'a> Ledger<'a> {
    pub fn new(state: &'a mut StateOverlay, logs: &'a mut Vec<AccountLog>) -> Self {
        Self { state, logs }
    }

    pub fn load(&self, owner: &str, custody: &str) -> Result<Account> {
        self.state.get_account(owner, custody)
    }

    fn store(
        &mut self,
        op: LedgerOp,
        owner: &str,
        custody: &str,
        prev: Account,
        current: Account,
    ) -> Result<()> {
        self.state.put_account(owner, custody, &current)?;
        debug!(
            target: "autonomy::ledger",
            "{op:?} {owner}@{custody}: {}/{} -> {}/{}",
            prev.balance, prev.frozen, current.balance, current.frozen,
        );
        self.logs.push(AccountLog {
            op,
            owner: owner.to_string(),
            custody: custody.to_string(),
            prev,
            current,
        });
        Ok(())
    }

    fn debit(owner: &str, available: u64, amount: u64) -> Result<u64> {
        available.checked_sub(amount).ok_or_else(|| Error::InsufficientBalance {
            owner: owner.to_string(),
            needed: amount,
            available,
        })
    }

    fn debit_frozen(owner: &str, available: u64, amount: u64) -> Result<u64> {
        available.checked_sub(amount).ok_or_else(|| Error::InsufficientFrozen {
            owner: owner.to_string(),
            needed: amount,
            available,
        })
    }

    fn credit(available: u64, amount: u64) -> Result<u64> {
        available.checked_add(amount).ok_or(Error::AmountOverflow)
    }

    /// Credit `amount` to the free balance of `owner`.
    pub fn deposit(&mut self, owner: &str, custody: &str, amount: u64) -> Result<()> {
        let prev = self.load(owner, custody)?;
        let current = Account { balance: Self::credit(prev.balance, amount)?, ..prev };
        self.store(LedgerOp::Deposit, owner, custody, prev, current)
    }

    /// Move `amount` of `owner` from free to frozen.
    pub fn exec_frozen(&mut self, owner: &str, custody: &str, amount: u64) -> Result<()> {
        let prev = self.load(owner, custody)?;
        let current = Account {
            balance: Self::debit(owner, prev.balance, amount)?,
            frozen: Self::credit(prev.frozen, amount)?,
        };
        self.store(LedgerOp::Frozen, owner, custody, prev, current)
    }

    /// Move `amount` of `owner` from frozen back to free.
    pub fn exec_active(&mut self, owner: &str, custody: &str, amount: u64) -> Result<()> {
        let prev = self.load(owner, custody)?;
        let current = Account {
            balance: Self::credit(prev.balance, amount)?,
            frozen: Self::debit_frozen(owner, prev.frozen, amount)?,
        };
        self.store(LedgerOp::Active, owner, custody, prev, current)
    }

    /// Move `amount` from the free balance of `from` to the free balance of `to`.
    pub fn exec_transfer(
        &mut self,
        from: &str,
        to: &str,
        custody: &str,
        amount: u64,
    ) -> Result<()> {
        let prev = self.load(from, custody)?;
        let current = Account { balance: Self::debit(from, prev.balance, amount)?, ..prev };
        self.store(LedgerOp::Transfer, from, custody, prev, current)?;

        let prev = self.load(to, custody)?;
        let current = Account { balance: Self::credit(prev.balance, amount)?, ..prev };
        self.store(LedgerOp::Transfer, to, custody, prev, current)
    }

    /// Move `amount` from the frozen balance of `from` to the free balance of `to`.
    pub fn exec_transfer_frozen(
        &mut self,
        from: &str,
        to: &str,
        custody: &str,
        amount: u64,
    ) -> Result<()> {
        let prev = self.load(from, custody)?;
        let current = Account { frozen: Self::debit_frozen(from, prev.frozen, amount)?, ..prev };
        self.store(LedgerOp::TransferFrozen, from, custody, prev, current)?;

        let prev = self.load(to, custody)?;
        let current = Account { balance: Self::credit(prev.balance, amount)?, ..prev };
        self.store(LedgerOp::TransferFrozen, to, custody, prev, current)
    }
}
