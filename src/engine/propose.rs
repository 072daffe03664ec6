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

use crate::{
    config::RuleLimits,
    model::{
        validate_address, ActiveBoard, HeightWindow, ProjectPayload, Proposal, ProposalPayload,
        ProposalStatus, PublicVote, RuleConfig, VoteResult,
    },
    policy::Policy,
    receipt::{ProposalAction, ProposalLog},
    store::StateRead,
    tx::ProposeParams,
    Error, Result,
};

use super::{committee, Action};

impl Action<'_> {
    pub(super) fn propose(&mut self, params: &ProposeParams) -> Result<ProposalLog> {
        let height = self.ctx.height;
        let kind = params.payload.kind();
        let policy = Policy::of(kind);

        self.check_window(params.start_height, params.end_height)?;

        let rule = self.active_rule()?;

        let mut proposal = Proposal {
            id: self.ctx.proposal_id(),
            proposer: self.ctx.sender.clone(),
            height,
            index: self.ctx.index,
            window: HeightWindow {
                start: params.start_height,
                end: params.end_height,
                real_end: 0,
            },
            rule,
            status: ProposalStatus::Proposed,
            payload: params.payload.clone(),
            boards: vec![],
            next_board: None,
            vote_result: VoteResult::default(),
            public_vote: None,
        };

        if self.state.get_proposal(kind, &proposal.id)?.is_some() {
            return Err(Error::InvalidParam(format!("proposal {} already exists", proposal.id)))
        }

        if policy.snapshots_committee {
            let board = self.active_board()?;
            if committee::check_size(self.config, board.boards.len()).is_err() {
                return Err(Error::NoActiveBoard)
            }
            proposal.boards = board.boards;
        }

        match &params.payload {
            ProposalPayload::Board(_) => {}

            ProposalPayload::Change(_) => {
                if !self.active_board()?.is_member(&self.ctx.sender) {
                    return Err(Error::AddressNotInBoard(self.ctx.sender.clone()))
                }
            }

            ProposalPayload::Project(payload) => {
                check_project(payload)?;
            }

            ProposalPayload::Rule(payload) => {
                check_rule_overrides(
                    &payload.overrides,
                    &self.config.rule_limits,
                    self.config.coin_precision,
                )?;
            }

            ProposalPayload::Item(payload) => {
                if payload.item_tx_hash.is_empty() {
                    return Err(Error::InvalidParam("empty item transaction hash".to_string()))
                }
            }
        }

        if policy.updates_committee {
            proposal.next_board = Some(self.next_board(&params.payload)?);
        }

        self.escrow().freeze_bond(&proposal.proposer, proposal.rule.proposal_amount)?;

        if let ProposalPayload::Project(payload) = &params.payload {
            self.reserve_project_funds(payload.amount)?;
        }

        if policy.public_phase {
            let publicity = match &params.payload {
                ProposalPayload::Project(payload) => {
                    payload.amount >= proposal.rule.large_project_amount
                }
                _ => false,
            };
            proposal.public_vote = Some(PublicVote { publicity, ..Default::default() });
        }

        debug!(
            target: "autonomy::engine::propose",
            "New {kind} proposal {} by {} for [{}, {}]",
            proposal.id, proposal.proposer, proposal.window.start, proposal.window.end,
        );

        Ok(ProposalLog { action: ProposalAction::Propose, prev: None, current: proposal })
    }

    /// Committee installed when a committee-updating proposal passes
    fn next_board(&self, payload: &ProposalPayload) -> Result<ActiveBoard> {
        match payload {
            ProposalPayload::Board(payload) => {
                // A Whole replacement does not need a committee in place
                let board = self.state.get_active_board()?.unwrap_or_default();
                committee::board_update(self.config, &board, payload)
            }
            ProposalPayload::Change(payload) => {
                committee::change_update(self.config, &self.active_board()?, payload)
            }
            _ => Err(Error::InvalidParam(format!(
                "{} proposals do not update the committee",
                payload.kind()
            ))),
        }
    }

    /// Reject windows that already started, ended, are too narrow, or
    /// end too far in the future.
    fn check_window(&self, start: u64, end: u64) -> Result<()> {
        let height = self.ctx.height;
        if start < height ||
            end < height ||
            start.saturating_add(self.config.start_end_block_period) > end ||
            end > height.saturating_add(self.config.prop_end_block_period)
        {
            return Err(Error::InvalidHeightWindow { start, end, height })
        }
        Ok(())
    }

    /// Restart the committee spend period if it elapsed, enforce the
    /// per-period cap and freeze `amount` in the treasury.
    fn reserve_project_funds(&mut self, amount: u64) -> Result<()> {
        let height = self.ctx.height;
        let mut board = self.active_board()?;

        if height > board.start_height.saturating_add(self.config.board_period) {
            board.start_height = height;
            board.amount = 0;
            self.state.put_active_board(&board)?;
        }

        let spent = board.amount.checked_add(amount).ok_or(Error::AmountOverflow)?;
        if spent > self.config.period_amount_cap() {
            return Err(Error::PeriodAmountExceeded)
        }

        self.escrow().freeze_funds(amount)
    }
}

fn check_project(payload: &ProjectPayload) -> Result<()> {
    if payload.amount == 0 {
        return Err(Error::InvalidParam("project amount must be positive".to_string()))
    }
    validate_address(&payload.to_addr)?;
    Ok(())
}

/// Every non-zero override must fall inside its configured range, and
/// at least one field must be set.
fn check_rule_overrides(rule: &RuleConfig, limits: &RuleLimits, precision: u64) -> Result<()> {
    if rule.is_empty() {
        return Err(Error::InvalidParam("rule proposal changes nothing".to_string()))
    }

    fn within<T: PartialOrd + Default + std::fmt::Display>(
        name: &str,
        value: T,
        (min, max): (T, T),
    ) -> Result<()> {
        if value != T::default() && (value < min || value > max) {
            return Err(Error::InvalidParam(format!("{name} {value} outside [{min}, {max}]")))
        }
        Ok(())
    }

    let coins =
        |(min, max): (u64, u64)| (min.saturating_mul(precision), max.saturating_mul(precision));

    within("board_attend_ratio", rule.board_attend_ratio, (0, 100))?;
    within("board_approve_ratio", rule.board_approve_ratio, limits.board_approve_ratio)?;
    within("pub_oppose_ratio", rule.pub_oppose_ratio, limits.pub_oppose_ratio)?;
    within("pub_attend_ratio", rule.pub_attend_ratio, limits.pub_attend_ratio)?;
    within("pub_approve_ratio", rule.pub_approve_ratio, limits.pub_approve_ratio)?;
    within("public_period", rule.public_period, limits.public_period)?;
    within("large_project_amount", rule.large_project_amount, coins(limits.large_project_amount))?;
    within("proposal_amount", rule.proposal_amount, coins(limits.proposal_amount))?;
    Ok(())
}
