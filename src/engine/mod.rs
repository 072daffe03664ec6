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

//! Proposal lifecycle state machine.
//!
//! A single [`Action`] executes one transaction against a pending
//! overlay of the state and index trees. Every action yields a
//! [`Receipt`] or an error; on error the overlay is dropped and
//! nothing is persisted.

use log::{debug, error, warn};

use crate::{
    config::AutonomyConfig,
    context::{BalanceOracle, TxContext},
    escrow::Escrow,
    ledger::Ledger,
    model::{validate_address, ActiveBoard, Proposal, ProposalKind, RuleConfig},
    policy::{Policy, Weighting},
    receipt::{AccountLog, ProposalLog, Receipt},
    store::{IndexStore, StateOverlay, StateRead},
    tally,
    tx::AutonomyCall,
    Error, Result,
};

/// Committee arithmetic for Board and Change proposals
mod committee;

/// Propose
mod propose;

/// Revoke
mod revoke;

/// Vote
mod vote;

/// PublicVote
mod pubvote;

/// Terminate
mod terminate;

/// Settlement of resolved proposals
mod settle;

pub struct Action<'a> {
    config: &'a AutonomyConfig,
    ctx: &'a TxContext,
    oracle: &'a dyn BalanceOracle,
    index: &'a IndexStore,
    state: StateOverlay,
    accounts: Vec<AccountLog>,
}

impl<'a> Action<'a> {
    pub fn new(
        config: &'a AutonomyConfig,
        ctx: &'a TxContext,
        oracle: &'a dyn BalanceOracle,
        index: &'a IndexStore,
        state: StateOverlay,
    ) -> Self {
        Self { config, ctx, oracle, index, state, accounts: vec![] }
    }

    /// Execute `call`, returning the receipt of everything it changed.
    pub fn execute(mut self, call: &AutonomyCall) -> Result<Receipt> {
        let function = call.function();
        let kind = call.kind();

        let result = match call {
            AutonomyCall::Propose(params) => self.propose(params),
            AutonomyCall::Revoke(params) => self.revoke(params),
            AutonomyCall::Vote(params) => self.vote(params),
            AutonomyCall::PublicVote(params) => self.public_vote(params),
            AutonomyCall::Terminate(params) => self.terminate(params),
        };

        let log = match result {
            Ok(log) => log,
            Err(e) => {
                let id = match call {
                    AutonomyCall::Propose(_) => self.ctx.proposal_id(),
                    AutonomyCall::Revoke(r) | AutonomyCall::Terminate(r) => r.proposal_id.clone(),
                    AutonomyCall::Vote(v) => v.proposal_id.clone(),
                    AutonomyCall::PublicVote(v) => v.proposal_id.clone(),
                };
                if e.is_fatal() {
                    error!(
                        target: "autonomy::engine",
                        "[{function:?}] {kind} proposal {id} failed at height {}: {e}",
                        self.ctx.height,
                    );
                } else {
                    warn!(
                        target: "autonomy::engine",
                        "[{function:?}] {kind} proposal {id} rejected for {}: {e}",
                        self.ctx.sender,
                    );
                }
                return Err(e)
            }
        };

        self.state.put_proposal(&log.current)?;
        self.index.stage(&mut self.state, &log)?;

        debug!(
            target: "autonomy::engine",
            "[{function:?}] {kind} proposal {} is now {} at height {}",
            log.current.id, log.current.status, self.ctx.height,
        );

        Ok(Receipt {
            tx_hash: self.ctx.tx_hash.to_hex().to_string(),
            height: self.ctx.height,
            index: self.ctx.index,
            diff: self.state.into_diff()?,
            accounts: self.accounts,
            proposal: log,
        })
    }

    fn escrow(&mut self) -> Escrow<'_> {
        let ledger = Ledger::new(&mut self.state, &mut self.accounts);
        Escrow::new(ledger, &self.config.autonomy_address)
    }

    fn load_proposal(&self, kind: ProposalKind, id: &str) -> Result<Proposal> {
        self.state
            .get_proposal(kind, id)?
            .ok_or_else(|| Error::ProposalNotFound(kind, id.to_string()))
    }

    /// Rule in force: the last one installed by a Rule proposal, or the
    /// configured default.
    fn active_rule(&self) -> Result<RuleConfig> {
        Ok(self.state.get_active_rule()?.unwrap_or_else(|| self.config.rule.clone()))
    }

    fn active_board(&self) -> Result<ActiveBoard> {
        self.state.get_active_board()?.ok_or(Error::NoActiveBoard)
    }

    /// Compute `totalVotes` on first use. Ticket-weighted proposals read
    /// the anchor balance at the start height, committee proposals count
    /// the seats of their snapshot. Once set it never changes.
    fn ensure_total_votes(&self, proposal: &mut Proposal) -> Result<()> {
        if proposal.vote_result.total_votes != 0 {
            return Ok(())
        }

        proposal.vote_result.total_votes = match Policy::of(proposal.kind()).weighting {
            Weighting::Committee => proposal.boards.len() as u64,
            Weighting::Ticket => tally::anchor_total(
                self.oracle,
                &self.config.total_address,
                proposal.window.start,
                self.config.ticket_unit(),
            )?,
        };
        Ok(())
    }

    /// Addresses a ticket-weighted ballot speaks for: the sender alone,
    /// or the holders that delegated their tickets to it.
    fn ticket_voters(&self, origin_addrs: &[String]) -> Result<Vec<String>> {
        if origin_addrs.is_empty() {
            return Ok(vec![self.ctx.sender.clone()])
        }

        let mut voters: Vec<String> = Vec::with_capacity(origin_addrs.len());
        for addr in origin_addrs {
            validate_address(addr)?;
            match self.oracle.miner_binding(addr)? {
                None => return Err(Error::MinerAddress(addr.clone())),
                Some(miner) if miner != self.ctx.sender => {
                    return Err(Error::BindAddress(addr.clone()))
                }
                Some(_) => {}
            }
            if voters.contains(addr) {
                return Err(Error::RepeatedAddress(addr.clone()))
            }
            voters.push(addr.clone());
        }
        Ok(voters)
    }
}
