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

//! Governance engine for an on-chain autonomous organisation.
//!
//! Five proposal kinds share one lifecycle: committee elections (Board),
//! committee membership changes (Change), treasury funded projects
//! (Project), rule edits (Rule) and external item certification (Item).
//! Execution is deterministic and every committed transaction can be
//! rolled back exactly from its receipt.

/// Error types
pub mod error;
pub use error::{Error, Result};

/// Engine configuration
pub mod config;

/// Persisted data model
pub mod model;

/// Transaction payloads
pub mod tx;

/// Execution context and balance oracle
pub mod context;

/// Execution receipts
pub mod receipt;

/// Balance primitive
pub mod ledger;

/// Bond and treasury escrow
pub mod escrow;

/// Vote weights and pass predicates
pub mod tally;

/// Per-kind policy
pub mod policy;

/// Proposal lifecycle state machine
pub mod engine;

/// Consensus state and query index storage
pub mod store;

/// Governance executor
pub mod executor;
pub use executor::{Autonomy, AutonomyPtr};
