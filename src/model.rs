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

use std::fmt;

use darkfi_serial::{SerialDecodable, SerialEncodable};
use serde::Deserialize;

use crate::{Error, Result};

/// Multiplier turning a `(height, index)` pair into a single ordered
/// pagination cursor.
pub const MAX_TX_PER_BLOCK: u64 = 100_000;

/// Accepted decoded length range for addresses.
const ADDRESS_MIN_LEN: usize = 20;
const ADDRESS_MAX_LEN: usize = 64;

/// Verify that `addr` is a base58 encoded address of a sane length.
pub fn validate_address(addr: &str) -> Result<()> {
    let Ok(decoded) = bs58::decode(addr).into_vec() else {
        return Err(Error::InvalidAddress(addr.to_string()))
    };
    if decoded.len() < ADDRESS_MIN_LEN || decoded.len() > ADDRESS_MAX_LEN {
        return Err(Error::InvalidAddress(addr.to_string()))
    }
    Ok(())
}

/// The five proposal families
#[derive(
    Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, SerialEncodable, SerialDecodable,
)]
#[repr(u8)]
pub enum ProposalKind {
    Board = 0x00,
    Change = 0x01,
    Project = 0x02,
    Rule = 0x03,
    Item = 0x04,
}

impl ProposalKind {
    pub const ALL: [ProposalKind; 5] =
        [Self::Board, Self::Change, Self::Project, Self::Rule, Self::Item];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Board => "board",
            Self::Change => "change",
            Self::Project => "project",
            Self::Rule => "rule",
            Self::Item => "item",
        }
    }
}

impl TryFrom<u8> for ProposalKind {
    type Error = Error;

    fn try_from(b: u8) -> Result<Self> {
        match b {
            0x00 => Ok(Self::Board),
            0x01 => Ok(Self::Change),
            0x02 => Ok(Self::Project),
            0x03 => Ok(Self::Rule),
            0x04 => Ok(Self::Item),
            _ => Err(Error::InvalidParam(format!("proposal kind {b}"))),
        }
    }
}

impl fmt::Display for ProposalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lifecycle states shared by every proposal kind.
///
/// `Proposed -> Revoked`, or `Proposed -> Voted -> [PublicVoted ->] Terminated`.
/// `PublicVoted` is only reachable by large Project proposals.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, SerialEncodable, SerialDecodable)]
#[repr(u8)]
pub enum ProposalStatus {
    Proposed = 0x01,
    Revoked = 0x02,
    Voted = 0x03,
    PublicVoted = 0x04,
    Terminated = 0x05,
}

impl ProposalStatus {
    /// Terminal states accept no further action
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Revoked | Self::Terminated)
    }
}

impl TryFrom<u8> for ProposalStatus {
    type Error = Error;

    fn try_from(b: u8) -> Result<Self> {
        match b {
            0x01 => Ok(Self::Proposed),
            0x02 => Ok(Self::Revoked),
            0x03 => Ok(Self::Voted),
            0x04 => Ok(Self::PublicVoted),
            0x05 => Ok(Self::Terminated),
            _ => Err(Error::InvalidParam(format!("proposal status {b}"))),
        }
    }
}

impl fmt::Display for ProposalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Proposed => "proposed",
            Self::Revoked => "revoked",
            Self::Voted => "voted",
            Self::PublicVoted => "public-voted",
            Self::Terminated => "terminated",
        };
        write!(f, "{s}")
    }
}

/// Ballot choice
#[derive(Copy, Clone, Debug, Eq, PartialEq, SerialEncodable, SerialDecodable)]
pub enum VoteOption {
    Approve,
    Oppose,
    Quit,
}

/// Which votes record a ballot is deduplicated against.
#[derive(Copy, Clone, Debug, Eq, PartialEq, SerialEncodable, SerialDecodable)]
pub enum VotePhase {
    /// Seat-weighted committee vote
    Committee,
    /// Ticket-weighted vote of all holders
    Public,
}

impl VotePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Committee => "committee",
            Self::Public => "public",
        }
    }
}

/// Effective governance policy. A copy is stored in each proposal at
/// creation time. Ratios are integer percentages, amounts are base units.
#[derive(Clone, Debug, Default, Eq, PartialEq, Deserialize, SerialEncodable, SerialDecodable)]
#[serde(default)]
pub struct RuleConfig {
    pub board_attend_ratio: u32,
    pub board_approve_ratio: u32,
    pub pub_attend_ratio: u32,
    pub pub_approve_ratio: u32,
    pub pub_oppose_ratio: u32,
    /// Bond frozen from the proposer
    pub proposal_amount: u64,
    /// Project amount at or above which a public phase is required
    pub large_project_amount: u64,
    /// Public phase duration in blocks
    pub public_period: u64,
}

impl RuleConfig {
    /// Default rule with amounts scaled to `coin_precision`.
    pub fn with_precision(coin_precision: u64) -> Self {
        Self {
            board_attend_ratio: 0,
            board_approve_ratio: 51,
            pub_attend_ratio: 66,
            pub_approve_ratio: 66,
            pub_oppose_ratio: 33,
            proposal_amount: 500 * coin_precision,
            large_project_amount: 1_000_000 * coin_precision,
            public_period: 17280 * 7,
        }
    }

    /// Returns `true` if every field is zero.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Returns a copy of `self` where every non-zero field of `overrides`
    /// replaces the current value.
    pub fn upgrade(&self, overrides: &RuleConfig) -> Self {
        fn pick<T: Copy + Default + PartialEq>(cur: T, new: T) -> T {
            if new == T::default() {
                cur
            } else {
                new
            }
        }

        Self {
            board_attend_ratio: pick(self.board_attend_ratio, overrides.board_attend_ratio),
            board_approve_ratio: pick(self.board_approve_ratio, overrides.board_approve_ratio),
            pub_attend_ratio: pick(self.pub_attend_ratio, overrides.pub_attend_ratio),
            pub_approve_ratio: pick(self.pub_approve_ratio, overrides.pub_approve_ratio),
            pub_oppose_ratio: pick(self.pub_oppose_ratio, overrides.pub_oppose_ratio),
            proposal_amount: pick(self.proposal_amount, overrides.proposal_amount),
            large_project_amount: pick(self.large_project_amount, overrides.large_project_amount),
            public_period: pick(self.public_period, overrides.public_period),
        }
    }
}

/// Voting window of a proposal. `real_end` stays 0 until the outcome is
/// known.
#[derive(Clone, Debug, Default, Eq, PartialEq, SerialEncodable, SerialDecodable)]
pub struct HeightWindow {
    pub start: u64,
    pub end: u64,
    pub real_end: u64,
}

/// Tally of a committee or ticket-weighted vote
#[derive(Clone, Debug, Default, Eq, PartialEq, SerialEncodable, SerialDecodable)]
pub struct VoteResult {
    pub total_votes: u64,
    pub approve_votes: u64,
    pub oppose_votes: u64,
    pub quit_votes: u64,
    pub pass: bool,
}

/// Tally of a Project's public opposition phase
#[derive(Clone, Debug, Default, Eq, PartialEq, SerialEncodable, SerialDecodable)]
pub struct PublicVote {
    pub publicity: bool,
    pub total_votes: u64,
    pub oppose_votes: u64,
    pub pub_pass: bool,
}

/// The committee currently entitled to cast seat-weighted votes, along
/// with its rolling project spend counter.
#[derive(Clone, Debug, Default, Eq, PartialEq, SerialEncodable, SerialDecodable)]
pub struct ActiveBoard {
    pub boards: Vec<String>,
    /// Retired members, eligible to be restored by a Change proposal
    pub revboards: Vec<String>,
    /// Project funds paid out in the current period
    pub amount: u64,
    /// Height at which the current spend period started
    pub start_height: u64,
}

impl ActiveBoard {
    pub fn is_member(&self, addr: &str) -> bool {
        self.boards.iter().any(|b| b == addr)
    }

    pub fn is_retired(&self, addr: &str) -> bool {
        self.revboards.iter().any(|b| b == addr)
    }
}

/// How a Board proposal modifies the committee
#[derive(Copy, Clone, Debug, Eq, PartialEq, SerialEncodable, SerialDecodable)]
pub enum BoardUpdate {
    Whole,
    Add,
    Remove,
}

#[derive(Clone, Debug, Eq, PartialEq, SerialEncodable, SerialDecodable)]
pub struct BoardPayload {
    pub update: BoardUpdate,
    pub boards: Vec<String>,
}

/// Retire (`cancel`) or restore a single committee member
#[derive(Clone, Debug, Eq, PartialEq, SerialEncodable, SerialDecodable)]
pub struct MemberChange {
    pub cancel: bool,
    pub addr: String,
}

#[derive(Clone, Debug, Eq, PartialEq, SerialEncodable, SerialDecodable)]
pub struct ChangePayload {
    pub changes: Vec<MemberChange>,
}

#[derive(Clone, Debug, Eq, PartialEq, SerialEncodable, SerialDecodable)]
pub struct ProjectPayload {
    pub title: String,
    pub description: String,
    pub contractor: String,
    pub amount: u64,
    pub to_addr: String,
}

#[derive(Clone, Debug, Eq, PartialEq, SerialEncodable, SerialDecodable)]
pub struct RulePayload {
    /// Zero fields are left unchanged
    pub overrides: RuleConfig,
}

#[derive(Clone, Debug, Eq, PartialEq, SerialEncodable, SerialDecodable)]
pub struct ItemPayload {
    pub item_tx_hash: String,
}

/// Kind-specific proposal body
#[derive(Clone, Debug, Eq, PartialEq, SerialEncodable, SerialDecodable)]
pub enum ProposalPayload {
    Board(BoardPayload),
    Change(ChangePayload),
    Project(ProjectPayload),
    Rule(RulePayload),
    Item(ItemPayload),
}

impl ProposalPayload {
    pub fn kind(&self) -> ProposalKind {
        match self {
            Self::Board(_) => ProposalKind::Board,
            Self::Change(_) => ProposalKind::Change,
            Self::Project(_) => ProposalKind::Project,
            Self::Rule(_) => ProposalKind::Rule,
            Self::Item(_) => ProposalKind::Item,
        }
    }
}

/// On-chain record of a governance proposal
#[derive(Clone, Debug, Eq, PartialEq, SerialEncodable, SerialDecodable)]
pub struct Proposal {
    /// Hex encoded hash of the proposing transaction
    pub id: String,
    pub proposer: String,
    pub height: u64,
    pub index: u32,
    pub window: HeightWindow,
    /// Rule in effect when the proposal was created
    pub rule: RuleConfig,
    pub status: ProposalStatus,
    pub payload: ProposalPayload,
    /// Committee allowed to vote (Change, Project, Item)
    pub boards: Vec<String>,
    /// Committee installed if the proposal passes (Board, Change)
    pub next_board: Option<ActiveBoard>,
    pub vote_result: VoteResult,
    /// Public opposition phase (Project only)
    pub public_vote: Option<PublicVote>,
}

impl Proposal {
    pub fn kind(&self) -> ProposalKind {
        self.payload.kind()
    }

    /// Pagination cursor of this record
    pub fn cursor(&self) -> i64 {
        (self.height * MAX_TX_PER_BLOCK + self.index as u64) as i64
    }

    pub fn project(&self) -> Option<&ProjectPayload> {
        match &self.payload {
            ProposalPayload::Project(p) => Some(p),
            _ => None,
        }
    }
}

/// Addresses that already voted in one phase of one proposal
#[derive(Clone, Debug, Default, Eq, PartialEq, SerialEncodable, SerialDecodable)]
pub struct VotesRecord {
    pub addresses: Vec<String>,
}

impl VotesRecord {
    pub fn contains(&self, addr: &str) -> bool {
        self.addresses.iter().any(|a| a == addr)
    }
}

/// Balance of an owner under one custody address
#[derive(Clone, Debug, Default, Eq, PartialEq, SerialEncodable, SerialDecodable)]
pub struct Account {
    pub balance: u64,
    pub frozen: u64,
}
