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
    model::{validate_address, Proposal, ProposalKind, ProposalStatus},
    Error, Result,
};

use super::{
    index::{
        addr_prefix, addr_status_prefix, status_prefix, ADDR_INDEX, ADDR_STATUS_INDEX,
        STATUS_INDEX,
    },
    Direction, IndexStore,
};

/// Upper bound on the number of records returned by a single list call
pub const MAX_LIST_COUNT: usize = 100;

/// Cursor value meaning "start from the edge of the index"
pub const CURSOR_EDGE: i64 = -1;

/// Filter and pagination parameters of a proposal listing.
///
/// Results are ordered by `(height, index)`. To page through a listing,
/// pass the [`Proposal::cursor`] of the last returned record as the
/// next request's `cursor`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ListRequest {
    pub status: Option<ProposalStatus>,
    /// Proposer address
    pub address: Option<String>,
    pub direction: Direction,
    pub count: usize,
    /// `height * MAX_TX_PER_BLOCK + index` of the last seen record,
    /// or [`CURSOR_EDGE`]
    pub cursor: i64,
}

impl ListRequest {
    /// Newest-first listing of proposals in `status`
    pub fn by_status(status: ProposalStatus, count: usize) -> Self {
        Self {
            status: Some(status),
            address: None,
            direction: Direction::Backward,
            count,
            cursor: CURSOR_EDGE,
        }
    }

    /// Newest-first listing of proposals created by `address`
    pub fn by_address(address: &str, count: usize) -> Self {
        Self {
            status: None,
            address: Some(address.to_string()),
            direction: Direction::Backward,
            count,
            cursor: CURSOR_EDGE,
        }
    }

    pub fn with_status(mut self, status: ProposalStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_cursor(mut self, cursor: i64) -> Self {
        self.cursor = cursor;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.count == 0 || self.count > MAX_LIST_COUNT {
            return Err(Error::InvalidParam(format!(
                "list count {} outside [1, {MAX_LIST_COUNT}]",
                self.count
            )))
        }
        if self.cursor < CURSOR_EDGE {
            return Err(Error::InvalidParam(format!("list cursor {}", self.cursor)))
        }
        if let Some(addr) = &self.address {
            validate_address(addr)?;
        }
        Ok(())
    }
}

impl IndexStore {
    /// List proposals of `kind` matching `req`.
    pub fn list(&self, kind: ProposalKind, req: &ListRequest) -> Result<Vec<Proposal>> {
        req.validate()?;

        let (index, prefix) = match (&req.address, req.status) {
            (Some(addr), Some(status)) => (ADDR_STATUS_INDEX, addr_status_prefix(addr, status)),
            (Some(addr), None) => (ADDR_INDEX, addr_prefix(addr)),
            (None, Some(status)) => (STATUS_INDEX, status_prefix(status)),
            (None, None) => {
                return Err(Error::InvalidParam("list needs a status or an address".to_string()))
            }
        };

        let cursor = (req.cursor != CURSOR_EDGE).then(|| (req.cursor as u64).to_be_bytes());
        let rows = self.table(kind).list(
            index,
            &prefix,
            cursor.as_ref().map(|c| c.as_slice()),
            req.direction,
            req.count,
        )?;

        debug!(
            target: "autonomy::store::query",
            "Listed {} {kind} proposals on index {index} from cursor {}",
            rows.len(),
            req.cursor,
        );
        Ok(rows)
    }
}
