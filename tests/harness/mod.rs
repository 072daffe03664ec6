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

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};

use autonomy::{
    config::AutonomyConfig,
    context::BalanceOracle,
    model::{
        BoardPayload, BoardUpdate, ItemPayload, ProjectPayload, Proposal, ProposalKind,
        ProposalPayload, RuleConfig, VoteOption,
    },
    receipt::Receipt,
    tx::{AutonomyCall, ProposalRef, ProposeParams, PublicVoteParams, Transaction, VoteParams},
    Autonomy, Result,
};
use log::warn;
use sled_overlay::sled;

/// Bond frozen per proposal
pub const BOND: u64 = 100;
/// Base units per ticket
pub const TICKET: u64 = 10;
/// Projects at or above this amount go through the public phase
pub const LARGE_PROJECT: u64 = 5_000;
/// Length of the public phase
pub const PUBLIC_PERIOD: u64 = 50;
/// Committee spending cap per period
pub const PERIOD_CAP: u64 = 10_000;
/// Length of a committee spending period
pub const BOARD_PERIOD: u64 = 100;
/// Minimum voting window
pub const MIN_WINDOW: u64 = 10;

pub fn init_logger() {
    let mut cfg = simplelog::ConfigBuilder::new();
    cfg.add_filter_ignore("sled".to_string());

    // We check this error so we can execute same file tests in parallel,
    // otherwise second one fails to init logger here.
    if simplelog::TermLogger::init(
        simplelog::LevelFilter::Info,
        //simplelog::LevelFilter::Debug,
        //simplelog::LevelFilter::Trace,
        cfg.build(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )
    .is_err()
    {
        warn!(target: "autonomy::test", "Logger already initialized");
    }
}

/// Deterministic address derived from `name`
pub fn addr(name: &str) -> String {
    bs58::encode(blake3::hash(name.as_bytes()).as_bytes()).into_string()
}

/// Configuration with one-unit coins and small periods
pub fn test_config() -> AutonomyConfig {
    let defaults = AutonomyConfig::default();
    AutonomyConfig {
        coin_precision: 1,
        ticket_price: TICKET,
        min_boards: 2,
        max_boards: 5,
        start_end_block_period: MIN_WINDOW,
        prop_end_block_period: 1_000,
        board_period: BOARD_PERIOD,
        max_board_period_amount: PERIOD_CAP,
        rule: RuleConfig {
            board_attend_ratio: 0,
            board_approve_ratio: 51,
            pub_attend_ratio: 66,
            pub_approve_ratio: 66,
            pub_oppose_ratio: 33,
            proposal_amount: BOND,
            large_project_amount: LARGE_PROJECT,
            public_period: PUBLIC_PERIOD,
        },
        genesis_board: vec![addr("board-0"), addr("board-1"), addr("board-2")],
        ..defaults
    }
}

/// In-memory [`BalanceOracle`] keeping a balance history per address.
#[derive(Clone, Debug, Default)]
pub struct HistoricalBalances {
    history: HashMap<String, BTreeMap<u64, u64>>,
    bindings: HashMap<String, String>,
}

impl HistoricalBalances {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `addr` holds `balance` from `height` onwards.
    pub fn set_balance(&mut self, addr: &str, height: u64, balance: u64) {
        self.history.entry(addr.to_string()).or_default().insert(height, balance);
    }

    /// Bind the tickets of `addr` to `miner`.
    pub fn bind(&mut self, addr: &str, miner: &str) {
        self.bindings.insert(addr.to_string(), miner.to_string());
    }
}

impl BalanceOracle for HistoricalBalances {
    fn balance_at(&self, addr: &str, height: u64) -> Result<u64> {
        let Some(history) = self.history.get(addr) else { return Ok(0) };
        Ok(history.range(..=height).next_back().map(|(_, b)| *b).unwrap_or(0))
    }

    fn miner_binding(&self, addr: &str) -> Result<Option<String>> {
        Ok(self.bindings.get(addr).cloned())
    }
}

pub struct Harness {
    pub db: sled::Db,
    pub autonomy: Autonomy,
    pub oracle: HistoricalBalances,
    nonce: u64,
}

impl Harness {
    pub fn new() -> Result<Self> {
        Self::with_config(test_config())
    }

    pub fn with_config(config: AutonomyConfig) -> Result<Self> {
        init_logger();
        let db = sled::Config::new().temporary(true).open()?;
        let autonomy = Autonomy::new(&db, config)?;
        Ok(Self { db, autonomy, oracle: HistoricalBalances::new(), nonce: 0 })
    }

    pub fn config(&self) -> &AutonomyConfig {
        &self.autonomy.config
    }

    /// Members of the genesis committee
    pub fn board(&self) -> Vec<String> {
        self.autonomy.config.genesis_board.clone()
    }

    /// Fund the treasury
    pub fn fund_treasury(&self, amount: u64) -> Result<()> {
        let custody = self.autonomy.config.autonomy_address.clone();
        self.autonomy.deposit(&custody, amount)
    }

    /// Anchor balance such that the ticket-weighted total is `tickets`
    pub fn set_total_tickets(&mut self, height: u64, tickets: u64) {
        let anchor = self.autonomy.config.total_address.clone();
        self.oracle.set_balance(&anchor, height, tickets * TICKET);
    }

    pub fn set_tickets(&mut self, addr: &str, height: u64, tickets: u64) {
        self.oracle.set_balance(addr, height, tickets * TICKET);
    }

    /// Every key and value of both trees, in key order
    pub fn dump(&self) -> Vec<(Vec<u8>, Vec<u8>)> {
        let mut records = vec![];
        for tree in [&self.autonomy.state.tree, &self.autonomy.index.0] {
            for record in tree.iter() {
                let (k, v) = record.unwrap();
                records.push((k.to_vec(), v.to_vec()));
            }
        }
        records
    }

    pub fn tx(&mut self, sender: &str, call: AutonomyCall) -> Transaction {
        self.nonce += 1;
        Transaction::new(sender, call, self.nonce)
    }

    /// Execute and apply `call`. Each transaction gets its own position
    /// inside the block.
    pub fn exec(&mut self, sender: &str, call: AutonomyCall, height: u64) -> Result<Receipt> {
        let tx = self.tx(sender, call);
        self.autonomy.execute_and_apply(&tx, height, self.nonce as u32, &self.oracle)
    }

    /// Submit a proposal and return its stored record.
    pub fn propose(
        &mut self,
        sender: &str,
        payload: ProposalPayload,
        height: u64,
        start: u64,
        end: u64,
    ) -> Result<Proposal> {
        let call = AutonomyCall::Propose(ProposeParams {
            start_height: start,
            end_height: end,
            payload,
        });
        Ok(self.exec(sender, call, height)?.proposal.current)
    }

    pub fn revoke(
        &mut self,
        sender: &str,
        kind: ProposalKind,
        id: &str,
        height: u64,
    ) -> Result<Proposal> {
        let call = AutonomyCall::Revoke(ProposalRef { kind, proposal_id: id.to_string() });
        Ok(self.exec(sender, call, height)?.proposal.current)
    }

    pub fn vote(
        &mut self,
        sender: &str,
        kind: ProposalKind,
        id: &str,
        option: VoteOption,
        height: u64,
    ) -> Result<Proposal> {
        self.vote_for(sender, kind, id, option, vec![], height)
    }

    pub fn vote_for(
        &mut self,
        sender: &str,
        kind: ProposalKind,
        id: &str,
        option: VoteOption,
        origin_addrs: Vec<String>,
        height: u64,
    ) -> Result<Proposal> {
        let call = AutonomyCall::Vote(VoteParams {
            kind,
            proposal_id: id.to_string(),
            option,
            origin_addrs,
        });
        Ok(self.exec(sender, call, height)?.proposal.current)
    }

    pub fn public_vote(
        &mut self,
        sender: &str,
        id: &str,
        oppose: bool,
        height: u64,
    ) -> Result<Proposal> {
        let call = AutonomyCall::PublicVote(PublicVoteParams {
            proposal_id: id.to_string(),
            oppose,
            origin_addrs: vec![],
        });
        Ok(self.exec(sender, call, height)?.proposal.current)
    }

    pub fn terminate(
        &mut self,
        sender: &str,
        kind: ProposalKind,
        id: &str,
        height: u64,
    ) -> Result<Proposal> {
        let call = AutonomyCall::Terminate(ProposalRef { kind, proposal_id: id.to_string() });
        Ok(self.exec(sender, call, height)?.proposal.current)
    }
}

pub fn item(tag: &str) -> ProposalPayload {
    let item_tx_hash = blake3::hash(tag.as_bytes()).to_hex().to_string();
    ProposalPayload::Item(ItemPayload { item_tx_hash })
}

pub fn project(amount: u64, to: &str) -> ProposalPayload {
    ProposalPayload::Project(ProjectPayload {
        title: "relay".to_string(),
        description: "Relay node maintenance".to_string(),
        contractor: "relay-team".to_string(),
        amount,
        to_addr: to.to_string(),
    })
}

pub fn whole_board(members: &[String]) -> ProposalPayload {
    ProposalPayload::Board(BoardPayload { update: BoardUpdate::Whole, boards: members.to_vec() })
}
