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

use crate::{
    model::{ProposalKind, RuleConfig, VoteOption, VotePhase, VoteResult},
    tally,
};

/// How ballots of a proposal are weighted
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Weighting {
    /// One vote per seat of the snapshotted committee
    Committee,
    /// Ticket-weighted vote of all holders, anchored on the total
    /// supply address
    Ticket,
}

/// Behaviour that differs between proposal kinds. The lifecycle engine
/// is shared and consults the policy of the proposal's kind wherever
/// the kinds diverge.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Policy {
    pub kind: ProposalKind,
    pub weighting: Weighting,
    /// Whether `Quit` ballots are accepted
    pub allows_quit: bool,
    /// Whether the committee is snapshotted at creation and votes on
    /// the proposal
    pub snapshots_committee: bool,
    /// Whether the proposal computes the committee it installs on pass
    pub updates_committee: bool,
    /// Whether a passing proposal may enter a public opposition phase
    pub public_phase: bool,
}

impl Policy {
    pub const fn of(kind: ProposalKind) -> Self {
        match kind {
            ProposalKind::Board => Self {
                kind,
                weighting: Weighting::Ticket,
                allows_quit: false,
                snapshots_committee: false,
                updates_committee: true,
                public_phase: false,
            },
            ProposalKind::Change => Self {
                kind,
                weighting: Weighting::Committee,
                allows_quit: true,
                snapshots_committee: true,
                updates_committee: true,
                public_phase: false,
            },
            ProposalKind::Project => Self {
                kind,
                weighting: Weighting::Committee,
                allows_quit: true,
                snapshots_committee: true,
                updates_committee: false,
                public_phase: true,
            },
            ProposalKind::Rule => Self {
                kind,
                weighting: Weighting::Ticket,
                allows_quit: false,
                snapshots_committee: false,
                updates_committee: false,
                public_phase: false,
            },
            ProposalKind::Item => Self {
                kind,
                weighting: Weighting::Committee,
                allows_quit: true,
                snapshots_committee: true,
                updates_committee: false,
                public_phase: false,
            },
        }
    }

    /// Votes record a `Vote` action is deduplicated against
    pub fn vote_phase(&self) -> VotePhase {
        match self.weighting {
            Weighting::Committee => VotePhase::Committee,
            Weighting::Ticket => VotePhase::Public,
        }
    }

    pub fn accepts(&self, option: VoteOption) -> bool {
        option != VoteOption::Quit || self.allows_quit
    }

    /// Pass predicate of the `Vote` phase
    pub fn passes(&self, result: &VoteResult, rule: &RuleConfig) -> bool {
        match self.weighting {
            Weighting::Committee => tally::committee_quorum(result, rule),
            Weighting::Ticket => tally::ticket_quorum(result, rule),
        }
    }
}
