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
    model::ProposalStatus,
    policy::Policy,
    receipt::{ProposalAction, ProposalLog},
    tx::ProposalRef,
    Error, Result,
};

use super::Action;

impl Action<'_> {
    pub(super) fn terminate(&mut self, params: &ProposalRef) -> Result<ProposalLog> {
        let height = self.ctx.height;
        let policy = Policy::of(params.kind);
        let prev = self.load_proposal(params.kind, &params.proposal_id)?;

        if prev.status.is_terminal() {
            return Err(Error::ProposalStatus(prev.status))
        }

        if !prev.vote_result.pass && height <= prev.window.end {
            return Err(Error::TerminatePeriod)
        }

        // An unopposed public phase runs to its deadline
        if let Some(public) = &prev.public_vote {
            let deadline = prev.window.real_end.saturating_add(prev.rule.public_period);
            if public.publicity && public.pub_pass && height <= deadline {
                return Err(Error::TerminatePeriod)
            }
        }

        let mut proposal = prev.clone();
        self.ensure_total_votes(&mut proposal)?;
        if !proposal.vote_result.pass {
            proposal.vote_result.pass = policy.passes(&proposal.vote_result, &proposal.rule);
        }
        if proposal.window.real_end == 0 {
            proposal.window.real_end = height;
        }

        // Nobody voted, so the bond is still frozen in the proposer account
        if proposal.status == ProposalStatus::Proposed {
            self.escrow().lock_bond(&proposal.proposer, proposal.rule.proposal_amount)?;
        }

        self.settle(&proposal)?;
        proposal.status = ProposalStatus::Terminated;

        info!(
            target: "autonomy::engine::terminate",
            "{} proposal {} terminated at height {height}, pass={}",
            params.kind, proposal.id, proposal.vote_result.pass,
        );

        Ok(ProposalLog { action: ProposalAction::Terminate, prev: Some(prev), current: proposal })
    }
}
