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

use std::collections::HashSet;

use crate::{
    config::AutonomyConfig,
    model::{validate_address, ActiveBoard, BoardPayload, BoardUpdate, ChangePayload},
    Error, Result,
};

/// Check that every address is well formed and appears only once.
pub fn check_addresses<'a>(addrs: impl IntoIterator<Item = &'a String>) -> Result<()> {
    let mut seen = HashSet::new();
    for addr in addrs {
        validate_address(addr)?;
        if !seen.insert(addr) {
            return Err(Error::RepeatedAddress(addr.clone()))
        }
    }
    Ok(())
}

pub fn check_size(config: &AutonomyConfig, size: usize) -> Result<()> {
    if size < config.min_boards || size > config.max_boards {
        return Err(Error::BoardNumber(size))
    }
    Ok(())
}

/// Committee resulting from a Board proposal applied to `board`.
pub fn board_update(
    config: &AutonomyConfig,
    board: &ActiveBoard,
    payload: &BoardPayload,
) -> Result<ActiveBoard> {
    if payload.boards.is_empty() {
        return Err(Error::InvalidParam("empty board list".to_string()))
    }
    check_addresses(&payload.boards)?;

    let mut next = board.clone();
    match payload.update {
        BoardUpdate::Whole => {
            next.boards = payload.boards.clone();
            next.revboards.clear();
        }

        BoardUpdate::Add => {
            for addr in &payload.boards {
                if board.is_member(addr) || board.is_retired(addr) {
                    return Err(Error::RepeatedAddress(addr.clone()))
                }
            }
            next.boards.extend(payload.boards.iter().cloned());
        }

        BoardUpdate::Remove => {
            for addr in &payload.boards {
                if !board.is_member(addr) {
                    return Err(Error::AddressNotInBoard(addr.clone()))
                }
            }
            next.boards.retain(|b| !payload.boards.contains(b));
        }
    }

    check_size(config, next.boards.len())?;
    Ok(next)
}

/// Committee resulting from a Change proposal applied to `board`.
pub fn change_update(
    config: &AutonomyConfig,
    board: &ActiveBoard,
    payload: &ChangePayload,
) -> Result<ActiveBoard> {
    if payload.changes.is_empty() {
        return Err(Error::InvalidParam("empty change list".to_string()))
    }
    check_addresses(payload.changes.iter().map(|c| &c.addr))?;

    let mut next = board.clone();
    for change in &payload.changes {
        if change.cancel {
            if !board.is_member(&change.addr) {
                return Err(Error::AddressNotInBoard(change.addr.clone()))
            }
            next.boards.retain(|b| b != &change.addr);
            next.revboards.push(change.addr.clone());
        } else {
            if !board.is_retired(&change.addr) {
                return Err(Error::AddressNotRetired(change.addr.clone()))
            }
            next.revboards.retain(|b| b != &change.addr);
            next.boards.push(change.addr.clone());
        }
    }

    check_size(config, next.boards.len())?;
    Ok(next)
}
