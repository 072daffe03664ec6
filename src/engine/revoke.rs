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
    model::ProposalStatus,
    receipt::{ProposalAction, ProposalLog},
    tx::ProposalRef,
    Error, Result,
};

use super::Action;

impl Action<'_> {
    pub(super) fn revoke(&mut self, params: &ProposalRef) -> Result<ProposalLog> {
        let prev = self.load_proposal(params.kind, &params.proposal_id)?;

        if prev.status != ProposalStatus::Proposed {
            return Err(Error::ProposalStatus(prev.status))
        }
        if self.ctx.height >= prev.window.start {
            return Err(Error::RevokePeriod)
        }
        if self.ctx.sender != prev.proposer {
            return Err(Error::RevokePower)
        }

        let mut proposal = prev.clone();
        self.escrow().release_bond(&proposal.proposer, proposal.rule.proposal_amount)?;
        if let Some(project) = prev.project() {
            self.escrow().refund_funds(project.amount)?;
        }
        proposal.status = ProposalStatus::Revoked;

        debug!(
            target: "autonomy::engine::revoke",
            "{} proposal {} revoked by its proposer", params.kind, proposal.id,
        );

        Ok(ProposalLog { action: ProposalAction::Revoke, prev: Some(prev), current: proposal })
    }
}
