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

use log::{debug, info};

use crate::{
    model::ProposalStatus,
    policy::{Policy, Weighting},
    receipt::{ProposalAction, ProposalLog},
    store::StateRead,
    tally,
    tx::VoteParams,
    Error, Result,
};

use super::Action;

impl Action<'_> {
    pub(super) fn vote(&mut self, params: &VoteParams) -> Result<ProposalLog> {
        let height = self.ctx.height;
        let policy = Policy::of(params.kind);
        let prev = self.load_proposal(params.kind, &params.proposal_id)?;

        match prev.status {
            ProposalStatus::Proposed | ProposalStatus::Voted => {}
            status => return Err(Error::ProposalStatus(status)),
        }

        let window = &prev.window;
        if height < window.start || height > window.end || window.real_end != 0 {
            return Err(Error::VotePeriod)
        }

        if !policy.accepts(params.option) {
            return Err(Error::InvalidVoteOption(params.kind))
        }

        let voters = match policy.weighting {
            Weighting::Committee => {
                if !params.origin_addrs.is_empty() {
                    return Err(Error::InvalidParam(
                        "committee votes cannot be delegated".to_string(),
                    ))
                }
                if !prev.boards.contains(&self.ctx.sender) {
                    return Err(Error::NotBoardMember(self.ctx.sender.clone()))
                }
                vec![self.ctx.sender.clone()]
            }
            Weighting::Ticket => self.ticket_voters(&params.origin_addrs)?,
        };

        let phase = policy.vote_phase();
        let mut votes = self.state.get_votes(params.kind, &prev.id, phase)?;
        if let Some(voter) = voters.iter().find(|v| votes.contains(v)) {
            return Err(Error::RepeatedVote(voter.clone()))
        }

        let mut proposal = prev.clone();
        self.ensure_total_votes(&mut proposal)?;

        let weight = match policy.weighting {
            Weighting::Committee => 1,
            Weighting::Ticket => tally::ticket_weight(
                self.oracle,
                &voters,
                proposal.window.start,
                self.config.ticket_unit(),
            )?,
        };
        tally::add_vote(&mut proposal.vote_result, params.option, weight)?;

        // The first ballot makes the proposal irrevocable
        if proposal.status == ProposalStatus::Proposed {
            self.escrow().lock_bond(&proposal.proposer, proposal.rule.proposal_amount)?;
        }

        votes.addresses.extend(voters);
        self.state.put_votes(params.kind, &proposal.id, phase, &votes)?;

        proposal.status = ProposalStatus::Voted;

        if policy.passes(&proposal.vote_result, &proposal.rule) {
            proposal.vote_result.pass = true;
            proposal.window.real_end = height;

            match proposal.public_vote.as_mut() {
                Some(public) if public.publicity => {
                    public.pub_pass = true;
                    proposal.status = ProposalStatus::PublicVoted;
                    info!(
                        target: "autonomy::engine::vote",
                        "{} proposal {} passed the committee, public phase open until {}",
                        params.kind,
                        proposal.id,
                        height.saturating_add(proposal.rule.public_period),
                    );
                }
                _ => {
                    proposal.status = ProposalStatus::Terminated;
                    self.settle(&proposal)?;
                    info!(
                        target: "autonomy::engine::vote",
                        "{} proposal {} passed at height {height}", params.kind, proposal.id,
                    );
                }
            }
        }

        debug!(
            target: "autonomy::engine::vote",
            "{:?} x{weight} on {} proposal {}: {}/{}/{} of {}",
            params.option,
            params.kind,
            proposal.id,
            proposal.vote_result.approve_votes,
            proposal.vote_result.oppose_votes,
            proposal.vote_result.quit_votes,
            proposal.vote_result.total_votes,
        );

        Ok(ProposalLog { action: ProposalAction::Vote, prev: Some(prev), current: proposal })
    }
}
