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
    model::{ProposalKind, ProposalStatus, VotePhase},
    receipt::{ProposalAction, ProposalLog},
    store::StateRead,
    tally,
    tx::PublicVoteParams,
    Error, Result,
};

use super::Action;

impl Action<'_> {
    /// Ticket-weighted opposition vote on a large Project that passed
    /// its committee. A proposal flipped to failing keeps its status
    /// until it is terminated.
    pub(super) fn public_vote(&mut self, params: &PublicVoteParams) -> Result<ProposalLog> {
        let height = self.ctx.height;
        let kind = ProposalKind::Project;
        let prev = self.load_proposal(kind, &params.proposal_id)?;

        if prev.status != ProposalStatus::PublicVoted {
            return Err(Error::ProposalStatus(prev.status))
        }
        let Some(public) = prev.public_vote.as_ref() else {
            return Err(Error::CorruptedRecord {
                key: prev.id.clone(),
                reason: "publicly voted project without a public tally".to_string(),
            })
        };

        let deadline = prev.window.real_end.saturating_add(prev.rule.public_period);
        if height < prev.window.start || height > deadline || !public.pub_pass {
            return Err(Error::VotePeriod)
        }

        let voters = self.ticket_voters(&params.origin_addrs)?;

        let mut votes = self.state.get_votes(kind, &prev.id, VotePhase::Public)?;
        if let Some(voter) = voters.iter().find(|v| votes.contains(v)) {
            return Err(Error::RepeatedVote(voter.clone()))
        }

        let mut proposal = prev.clone();
        let start = proposal.window.start;
        let ticket_unit = self.config.ticket_unit();

        let mut public = public.clone();
        if public.total_votes == 0 {
            public.total_votes =
                tally::anchor_total(self.oracle, &self.config.total_address, start, ticket_unit)?;
        }

        let weight = tally::ticket_weight(self.oracle, &voters, start, ticket_unit)?;
        if params.oppose {
            public.oppose_votes =
                public.oppose_votes.checked_add(weight).ok_or(Error::AmountOverflow)?;
        }

        if tally::public_opposed(&public, &proposal.rule) {
            public.pub_pass = false;
            info!(
                target: "autonomy::engine::pubvote",
                "Project {} rejected by public opposition at height {height}", proposal.id,
            );
        }

        debug!(
            target: "autonomy::engine::pubvote",
            "Public ballot x{weight} (oppose={}) on project {}: {} of {}",
            params.oppose, proposal.id, public.oppose_votes, public.total_votes,
        );

        proposal.public_vote = Some(public);
        votes.addresses.extend(voters);
        self.state.put_votes(kind, &proposal.id, VotePhase::Public, &votes)?;

        Ok(ProposalLog { action: ProposalAction::PublicVote, prev: Some(prev), current: proposal })
    }
}
