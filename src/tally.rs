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

//! Vote weights, tallies and pass predicates.
//!
//! All ratios are integer percentages and every predicate compares
//! cross-multiplied integers, never rounded quotients.

use log::debug;

use crate::{
    context::BalanceOracle,
    model::{PublicVote, RuleConfig, VoteOption, VoteResult},
    Error, Result,
};

/// Tickets held by a balance
pub fn ticket_votes(balance: u64, ticket_unit: u64) -> u64 {
    balance.checked_div(ticket_unit).unwrap_or(0)
}

/// Ticket weight of the total-supply anchor address at `height`. This
/// is the denominator of every ticket-weighted phase.
pub fn anchor_total(
    oracle: &dyn BalanceOracle,
    anchor: &str,
    height: u64,
    ticket_unit: u64,
) -> Result<u64> {
    let balance = oracle.balance_at(anchor, height)?;
    let total = ticket_votes(balance, ticket_unit);
    debug!(target: "autonomy::tally", "Anchor {anchor} holds {total} tickets at height {height}");
    Ok(total)
}

/// Combined ticket weight of `voters` at `height`. Each address is
/// floored to whole tickets on its own before summing.
pub fn ticket_weight(
    oracle: &dyn BalanceOracle,
    voters: &[String],
    height: u64,
    ticket_unit: u64,
) -> Result<u64> {
    let mut weight = 0u64;
    for voter in voters {
        let votes = ticket_votes(oracle.balance_at(voter, height)?, ticket_unit);
        weight = weight.checked_add(votes).ok_or(Error::AmountOverflow)?;
    }
    Ok(weight)
}

/// Add a ballot of `weight` to the tally.
pub fn add_vote(result: &mut VoteResult, option: VoteOption, weight: u64) -> Result<()> {
    let counter = match option {
        VoteOption::Approve => &mut result.approve_votes,
        VoteOption::Oppose => &mut result.oppose_votes,
        VoteOption::Quit => &mut result.quit_votes,
    };
    *counter = counter.checked_add(weight).ok_or(Error::AmountOverflow)?;
    Ok(())
}

fn pct(value: u64) -> u128 {
    value as u128 * 100
}

fn times(ratio: u32, value: u64) -> u128 {
    ratio as u128 * value as u128
}

/// Pass predicate of ticket-weighted votes: attendance must exceed
/// `pub_attend_ratio` of the total, and approvals `pub_approve_ratio`
/// of the cast approve and oppose weight.
pub fn ticket_quorum(result: &VoteResult, rule: &RuleConfig) -> bool {
    let decided = result.approve_votes as u128 + result.oppose_votes as u128;
    let attend = decided + result.quit_votes as u128;

    result.total_votes != 0 &&
        attend != 0 &&
        attend * 100 > rule.pub_attend_ratio as u128 * result.total_votes as u128 &&
        pct(result.approve_votes) > rule.pub_approve_ratio as u128 * decided
}

/// Pass predicate of committee votes: approvals must reach
/// `board_approve_ratio` of the seats, not counting members who quit.
pub fn committee_quorum(result: &VoteResult, rule: &RuleConfig) -> bool {
    result.total_votes != 0 &&
        result.total_votes > result.quit_votes &&
        pct(result.approve_votes) >=
            times(rule.board_approve_ratio, result.total_votes - result.quit_votes)
}

/// Returns `true` once the public opposition reaches `pub_oppose_ratio`
/// of the total, failing the proposal.
pub fn public_opposed(vote: &PublicVote, rule: &RuleConfig) -> bool {
    vote.total_votes != 0 &&
        pct(vote.oppose_votes) >= times(rule.pub_oppose_ratio, vote.total_votes)
}
