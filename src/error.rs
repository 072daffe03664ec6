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

// Hello developer. Please add your error to the according subsection
// that is commented, or make a new subsection. Keep it clean.

use sled_overlay::sled;

use crate::model::{ProposalKind, ProposalStatus};

/// Main result type used throughout the codebase.
pub type Result<T> = std::result::Result<T, Error>;

/// General library errors used throughout the codebase.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    // ==============
    // Payload errors
    // ==============
    #[error("Invalid parameter: {0}")]
    InvalidParam(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Address {0} repeated in proposal")]
    RepeatedAddress(String),

    #[error("Invalid board member count: {0}")]
    BoardNumber(usize),

    #[error("Address {0} is not an active board member")]
    AddressNotInBoard(String),

    #[error("Address {0} is not a retired board member")]
    AddressNotRetired(String),

    #[error("Malformed transaction: {0}")]
    MalformedTransaction(String),

    // =============
    // Height errors
    // =============
    #[error("Invalid height window: start={start} end={end} at height {height}")]
    InvalidHeightWindow { start: u64, end: u64, height: u64 },

    #[error("Revoke period has passed")]
    RevokePeriod,

    #[error("Proposal is not inside its voting period")]
    VotePeriod,

    #[error("Proposal cannot be terminated yet")]
    TerminatePeriod,

    // ================
    // Lifecycle errors
    // ================
    #[error("{0} proposal not found: {1}")]
    ProposalNotFound(ProposalKind, String),

    #[error("Action not allowed in proposal status {0}")]
    ProposalStatus(ProposalStatus),

    #[error("No active board")]
    NoActiveBoard,

    // ====================
    // Authorization errors
    // ====================
    #[error("Only the proposer may revoke a proposal")]
    RevokePower,

    #[error("Address {0} is not a voting board member")]
    NotBoardMember(String),

    #[error("Address {0} has no miner binding")]
    MinerAddress(String),

    #[error("Address {0} is not bound to the sender")]
    BindAddress(String),

    // ===========
    // Vote errors
    // ===========
    #[error("Address {0} already voted")]
    RepeatedVote(String),

    #[error("Vote option not accepted for {0} proposals")]
    InvalidVoteOption(ProposalKind),

    // ===================
    // Escrow/ledger errors
    // ===================
    #[error("Insufficient balance for {owner}: needed {needed}, available {available}")]
    InsufficientBalance { owner: String, needed: u64, available: u64 },

    #[error("Insufficient frozen balance for {owner}: needed {needed}, available {available}")]
    InsufficientFrozen { owner: String, needed: u64, available: u64 },

    #[error("Not enough funds in the treasury")]
    NotEnoughFund,

    #[error("Board period spending cap exceeded")]
    PeriodAmountExceeded,

    #[error("Amount overflow")]
    AmountOverflow,

    // ==============
    // Storage errors
    // ==============
    #[error("Corrupted record under key {key}: {reason}")]
    CorruptedRecord { key: String, reason: String },

    #[error(transparent)]
    SledError(#[from] sled::Error),

    #[error("IO error: {0}")]
    Io(std::io::ErrorKind),

    // =============
    // Config errors
    // =============
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl Error {
    /// Returns `true` for errors that are not local to the transaction
    /// being processed and must halt block processing.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::CorruptedRecord { .. } | Self::SledError(_) | Self::Io(_))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.kind())
    }
}

impl From<sled::transaction::TransactionError<sled::Error>> for Error {
    fn from(err: sled::transaction::TransactionError<sled::Error>) -> Self {
        match err {
            sled::transaction::TransactionError::Abort(e) => Self::SledError(e),
            sled::transaction::TransactionError::Storage(e) => Self::SledError(e),
        }
    }
}
