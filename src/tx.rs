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

use darkfi_serial::{deserialize, serialize, SerialDecodable, SerialEncodable};

use crate::{
    model::{ProposalKind, ProposalPayload, VoteOption},
    Error, Result,
};

/// Functions available in the autonomy contract
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u8)]
pub enum AutonomyFunction {
    Propose = 0x00,
    Revoke = 0x01,
    Vote = 0x02,
    PublicVote = 0x03,
    Terminate = 0x04,
}

impl TryFrom<u8> for AutonomyFunction {
    type Error = Error;

    fn try_from(b: u8) -> Result<Self> {
        match b {
            0x00 => Ok(Self::Propose),
            0x01 => Ok(Self::Revoke),
            0x02 => Ok(Self::Vote),
            0x03 => Ok(Self::PublicVote),
            0x04 => Ok(Self::Terminate),
            _ => Err(Error::MalformedTransaction(format!("unknown function {b:#04x}"))),
        }
    }
}

/// Parameters for `AutonomyFunction::Propose`
#[derive(Clone, Debug, Eq, PartialEq, SerialEncodable, SerialDecodable)]
pub struct ProposeParams {
    pub start_height: u64,
    pub end_height: u64,
    pub payload: ProposalPayload,
}

/// Reference to an existing proposal, used by Revoke and Terminate
#[derive(Clone, Debug, Eq, PartialEq, SerialEncodable, SerialDecodable)]
pub struct ProposalRef {
    pub kind: ProposalKind,
    pub proposal_id: String,
}

/// Parameters for `AutonomyFunction::Vote`
#[derive(Clone, Debug, Eq, PartialEq, SerialEncodable, SerialDecodable)]
pub struct VoteParams {
    pub kind: ProposalKind,
    pub proposal_id: String,
    pub option: VoteOption,
    /// Ticket holders whose miner address is the sender. Only used by
    /// ticket-weighted votes; empty means the sender votes for itself.
    pub origin_addrs: Vec<String>,
}

/// Parameters for `AutonomyFunction::PublicVote`, Project only
#[derive(Clone, Debug, Eq, PartialEq, SerialEncodable, SerialDecodable)]
pub struct PublicVoteParams {
    pub proposal_id: String,
    pub oppose: bool,
    pub origin_addrs: Vec<String>,
}

/// A single contract call
#[derive(Clone, Debug, Eq, PartialEq, SerialEncodable, SerialDecodable)]
pub enum AutonomyCall {
    Propose(ProposeParams),
    Revoke(ProposalRef),
    Vote(VoteParams),
    PublicVote(PublicVoteParams),
    Terminate(ProposalRef),
}

impl AutonomyCall {
    pub fn function(&self) -> AutonomyFunction {
        match self {
            Self::Propose(_) => AutonomyFunction::Propose,
            Self::Revoke(_) => AutonomyFunction::Revoke,
            Self::Vote(_) => AutonomyFunction::Vote,
            Self::PublicVote(_) => AutonomyFunction::PublicVote,
            Self::Terminate(_) => AutonomyFunction::Terminate,
        }
    }

    /// Proposal kind the call operates on
    pub fn kind(&self) -> ProposalKind {
        match self {
            Self::Propose(p) => p.payload.kind(),
            Self::Revoke(r) | Self::Terminate(r) => r.kind,
            Self::Vote(v) => v.kind,
            Self::PublicVote(_) => ProposalKind::Project,
        }
    }
}

/// A transaction as handed over by the submission layer. Signatures
/// are verified upstream, so `sender` is trusted here.
#[derive(Clone, Debug, Eq, PartialEq, SerialEncodable, SerialDecodable)]
pub struct Transaction {
    pub sender: String,
    pub call: AutonomyCall,
    /// Disambiguates otherwise identical transactions
    pub nonce: u64,
}

impl Transaction {
    pub fn new(sender: &str, call: AutonomyCall, nonce: u64) -> Self {
        Self { sender: sender.to_string(), call, nonce }
    }

    /// Compute the transaction hash
    pub fn hash(&self) -> blake3::Hash {
        blake3::hash(&serialize(self))
    }

    /// Decode a transaction from its wire encoding.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        deserialize(bytes).map_err(|e| Error::MalformedTransaction(e.to_string()))
    }

    pub fn encode(&self) -> Vec<u8> {
        serialize(self)
    }
}
