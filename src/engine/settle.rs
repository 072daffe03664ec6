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

use crate::{
    model::{ActiveBoard, BoardUpdate, Proposal, ProposalPayload},
    store::StateRead,
    Error, Result,
};

use super::Action;

/// Final outcome of a resolved proposal. Large projects also need the
/// public phase to have stayed unopposed.
pub fn outcome(proposal: &Proposal) -> bool {
    match &proposal.public_vote {
        Some(public) if public.publicity => proposal.vote_result.pass && public.pub_pass,
        _ => proposal.vote_result.pass,
    }
}

impl Action<'_> {
    /// Apply the effects of a resolved proposal. Runs exactly once per
    /// proposal, on its transition to `Terminated`.
    pub(super) fn settle(&mut self, proposal: &Proposal) -> Result<()> {
        let height = self.ctx.height;
        let pass = outcome(proposal);

        match &proposal.payload {
            ProposalPayload::Board(payload) => {
                if !pass {
                    return Ok(())
                }
                let next = snapshot(proposal)?;
                let live = self.state.get_active_board()?.unwrap_or_default();
                let board = match payload.update {
                    BoardUpdate::Whole => ActiveBoard {
                        boards: next.boards.clone(),
                        revboards: vec![],
                        amount: 0,
                        start_height: height,
                    },
                    BoardUpdate::Add | BoardUpdate::Remove => ActiveBoard {
                        boards: next.boards.clone(),
                        revboards: next.revboards.clone(),
                        ..live
                    },
                };
                self.state.put_active_board(&board)?;
                info!(
                    target: "autonomy::engine::settle",
                    "Board proposal {} installed a committee of {}",
                    proposal.id,
                    board.boards.len(),
                );
            }

            ProposalPayload::Change(_) => {
                if !pass {
                    return Ok(())
                }
                let next = snapshot(proposal)?;
                let live = self.active_board()?;
                let board = ActiveBoard {
                    boards: next.boards.clone(),
                    revboards: next.revboards.clone(),
                    ..live
                };
                self.state.put_active_board(&board)?;
                info!(
                    target: "autonomy::engine::settle",
                    "Change proposal {} updated the committee", proposal.id,
                );
            }

            ProposalPayload::Project(payload) => {
                if !pass {
                    return self.escrow().refund_funds(payload.amount)
                }

                self.escrow().pay_funds(&payload.to_addr, payload.amount)?;

                let mut board = self.active_board()?;
                if height > board.start_height.saturating_add(self.config.board_period) {
                    board.start_height = height;
                    board.amount = 0;
                }
                board.amount =
                    board.amount.checked_add(payload.amount).ok_or(Error::AmountOverflow)?;
                self.state.put_active_board(&board)?;
            }

            ProposalPayload::Rule(payload) => {
                if !pass {
                    return Ok(())
                }
                let rule = proposal.rule.upgrade(&payload.overrides);
                self.state.put_active_rule(&rule)?;
                info!(
                    target: "autonomy::engine::settle",
                    "Rule proposal {} installed a new rule: {rule:?}", proposal.id,
                );
            }

            ProposalPayload::Item(_) => {}
        }

        Ok(())
    }
}

fn snapshot(proposal: &Proposal) -> Result<&ActiveBoard> {
    proposal.next_board.as_ref().ok_or_else(|| Error::CorruptedRecord {
        key: proposal.id.clone(),
        reason: "committee proposal without a committee snapshot".to_string(),
    })
}
