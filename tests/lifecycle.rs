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

use autonomy::{
    model::{
        Account, ChangePayload, ItemPayload, MemberChange, ProposalKind, ProposalPayload,
        ProposalStatus, RuleConfig, RulePayload, VoteOption, VotePhase,
    },
    tx::{AutonomyCall, ProposalRef},
    Error, Result,
};

use rand::{seq::SliceRandom, thread_rng};

mod harness;
use harness::{addr, item, test_config, whole_board, Harness, BOND};

#[test]
fn board_proposal_installs_committee() -> Result<()> {
    let mut th = Harness::new()?;
    let alice = addr("alice");
    th.autonomy.deposit(&alice, 1000)?;

    // Four tickets in total, one per voter
    th.set_total_tickets(0, 4);
    let voters: Vec<String> = (0..3).map(|i| addr(&format!("holder-{i}"))).collect();
    for voter in &voters {
        th.set_tickets(voter, 0, 1);
    }

    let members: Vec<String> = (0..3).map(|i| addr(&format!("new-board-{i}"))).collect();
    let proposal = th.propose(&alice, whole_board(&members), 10, 20, 40)?;
    assert_eq!(proposal.status, ProposalStatus::Proposed);
    assert_eq!(proposal.next_board.as_ref().unwrap().boards, members);
    assert_eq!(th.autonomy.account(&alice)?, Account { balance: 900, frozen: BOND });

    let id = proposal.id.clone();
    let kind = ProposalKind::Board;

    let p = th.vote(&voters[0], kind, &id, VoteOption::Approve, 25)?;
    assert_eq!(p.status, ProposalStatus::Voted);
    assert_eq!(p.vote_result.total_votes, 4);
    // First ballot moves the bond into the pool
    assert_eq!(th.autonomy.account(&alice)?, Account { balance: 900, frozen: 0 });
    assert_eq!(th.autonomy.treasury()?, BOND);

    let p = th.vote(&voters[1], kind, &id, VoteOption::Approve, 26)?;
    assert_eq!(p.status, ProposalStatus::Voted);
    assert!(!p.vote_result.pass);

    // 3 of 4 attend, 2 of 3 approve
    let p = th.vote(&voters[2], kind, &id, VoteOption::Oppose, 27)?;
    assert_eq!(p.status, ProposalStatus::Terminated);
    assert!(p.vote_result.pass);
    assert_eq!(p.window.real_end, 27);
    assert_eq!(
        (p.vote_result.approve_votes, p.vote_result.oppose_votes, p.vote_result.quit_votes),
        (2, 1, 0)
    );

    let board = th.autonomy.active_board()?;
    assert_eq!(board.boards, members);
    assert!(board.revboards.is_empty());
    assert_eq!(board.amount, 0);
    assert_eq!(board.start_height, 27);

    let stored = th.autonomy.get_proposal(kind, &id)?;
    assert_eq!(stored, p);

    assert!(matches!(
        th.vote(&voters[0], kind, &id, VoteOption::Approve, 28),
        Err(Error::ProposalStatus(ProposalStatus::Terminated))
    ));
    Ok(())
}

#[test]
fn vote_rejections() -> Result<()> {
    let mut th = Harness::new()?;
    let alice = addr("alice");
    th.autonomy.deposit(&alice, 1000)?;
    th.set_total_tickets(0, 100);
    let holder = addr("holder");
    th.set_tickets(&holder, 0, 1);

    let members: Vec<String> = (0..3).map(|i| addr(&format!("new-board-{i}"))).collect();
    let id = th.propose(&alice, whole_board(&members), 10, 20, 40)?.id;
    let kind = ProposalKind::Board;

    assert!(matches!(
        th.vote(&holder, kind, &id, VoteOption::Approve, 19),
        Err(Error::VotePeriod)
    ));
    assert!(matches!(
        th.vote(&holder, kind, &id, VoteOption::Approve, 41),
        Err(Error::VotePeriod)
    ));
    assert!(matches!(
        th.vote(&holder, kind, &id, VoteOption::Quit, 25),
        Err(Error::InvalidVoteOption(ProposalKind::Board))
    ));
    assert!(matches!(
        th.vote(&holder, ProposalKind::Rule, &id, VoteOption::Approve, 25),
        Err(Error::ProposalNotFound(ProposalKind::Rule, _))
    ));

    th.vote(&holder, kind, &id, VoteOption::Approve, 25)?;
    assert!(matches!(
        th.vote(&holder, kind, &id, VoteOption::Oppose, 26),
        Err(Error::RepeatedVote(_))
    ));

    // Seat-weighted kinds only accept the snapshotted committee
    let item_id = th.propose(&alice, item("release"), 10, 20, 40)?.id;
    assert!(matches!(
        th.vote(&holder, ProposalKind::Item, &item_id, VoteOption::Approve, 25),
        Err(Error::NotBoardMember(_))
    ));
    let member = th.board()[0].clone();
    assert!(matches!(
        th.vote_for(
            &member,
            ProposalKind::Item,
            &item_id,
            VoteOption::Approve,
            vec![holder.clone()],
            25
        ),
        Err(Error::InvalidParam(_))
    ));
    Ok(())
}

#[test]
fn rule_total_is_read_at_start_height() -> Result<()> {
    let mut th = Harness::new()?;
    let alice = addr("alice");
    th.autonomy.deposit(&alice, 1000)?;
    th.set_total_tickets(0, 100);

    let overrides = RuleConfig { pub_oppose_ratio: 40, ..Default::default() };
    let payload = ProposalPayload::Rule(RulePayload { overrides });
    let id = th.propose(&alice, payload, 10, 20, 40)?.id;
    let kind = ProposalKind::Rule;

    // Supply changes between creation and start count, later ones do not
    th.set_total_tickets(15, 10);
    th.set_total_tickets(25, 1000);

    let (v1, v2) = (addr("voter-1"), addr("voter-2"));
    th.set_tickets(&v1, 0, 5);
    th.set_tickets(&v2, 0, 3);
    // Balance gained after the start does not weigh
    th.set_tickets(&v2, 22, 300);

    let p = th.vote(&v1, kind, &id, VoteOption::Approve, 30)?;
    assert_eq!(p.vote_result.total_votes, 10);
    assert_eq!(p.vote_result.approve_votes, 5);
    assert!(!p.vote_result.pass);

    let p = th.vote(&v2, kind, &id, VoteOption::Approve, 31)?;
    assert_eq!(p.vote_result.total_votes, 10);
    assert_eq!(p.vote_result.approve_votes, 8);
    assert_eq!(p.status, ProposalStatus::Terminated);

    let rule = th.autonomy.active_rule()?;
    assert_eq!(rule.pub_oppose_ratio, 40);
    assert_eq!(rule.pub_attend_ratio, th.config().rule.pub_attend_ratio);
    assert_eq!(rule.proposal_amount, BOND);

    // Proposals created afterwards carry the new rule
    let next = th.propose(&alice, item("after-rule"), 40, 50, 70)?;
    assert_eq!(next.rule.pub_oppose_ratio, 40);
    Ok(())
}

#[test]
fn rule_override_out_of_range() -> Result<()> {
    let mut th = Harness::new()?;
    let alice = addr("alice");
    th.autonomy.deposit(&alice, 1000)?;

    let overrides = RuleConfig { pub_oppose_ratio: 90, ..Default::default() };
    let payload = ProposalPayload::Rule(RulePayload { overrides });
    assert!(matches!(th.propose(&alice, payload, 10, 20, 40), Err(Error::InvalidParam(_))));

    let payload = ProposalPayload::Rule(RulePayload { overrides: RuleConfig::default() });
    assert!(matches!(th.propose(&alice, payload, 10, 20, 40), Err(Error::InvalidParam(_))));
    Ok(())
}

#[test]
fn delegated_ticket_votes() -> Result<()> {
    let mut th = Harness::new()?;
    let alice = addr("alice");
    th.autonomy.deposit(&alice, 1000)?;
    th.set_total_tickets(0, 100);

    let overrides = RuleConfig { pub_attend_ratio: 70, ..Default::default() };
    let id = th.propose(&alice, ProposalPayload::Rule(RulePayload { overrides }), 10, 20, 40)?.id;
    let kind = ProposalKind::Rule;

    let miner = addr("miner");
    let (o1, o2, unbound, foreign) =
        (addr("origin-1"), addr("origin-2"), addr("unbound"), addr("foreign"));
    th.oracle.bind(&o1, &miner);
    th.oracle.bind(&o2, &miner);
    th.oracle.bind(&foreign, &addr("other-miner"));
    th.set_tickets(&o1, 0, 7);
    th.set_tickets(&o2, 0, 2);

    assert!(matches!(
        th.vote_for(&miner, kind, &id, VoteOption::Approve, vec![unbound], 25),
        Err(Error::MinerAddress(_))
    ));
    assert!(matches!(
        th.vote_for(&miner, kind, &id, VoteOption::Approve, vec![foreign], 25),
        Err(Error::BindAddress(_))
    ));
    assert!(matches!(
        th.vote_for(&miner, kind, &id, VoteOption::Approve, vec![o1.clone(), o1.clone()], 25),
        Err(Error::RepeatedAddress(_))
    ));
    assert!(matches!(
        th.vote_for(&miner, kind, &id, VoteOption::Approve, vec!["bad".to_string()], 25),
        Err(Error::InvalidAddress(_))
    ));

    let origins = vec![o1.clone(), o2.clone()];
    let p = th.vote_for(&miner, kind, &id, VoteOption::Approve, origins.clone(), 25)?;
    assert_eq!(p.vote_result.approve_votes, 9);
    assert_eq!(th.autonomy.votes_record(kind, &id, VotePhase::Public)?.addresses, origins);

    assert!(matches!(
        th.vote(&o1, kind, &id, VoteOption::Oppose, 26),
        Err(Error::RepeatedVote(_))
    ));
    Ok(())
}

#[test]
fn change_proposal_retires_and_restores() -> Result<()> {
    let mut th = Harness::new()?;
    let board = th.board();
    th.autonomy.deposit(&board[0], 1000)?;
    th.autonomy.deposit(&board[1], 1000)?;

    let outsider = addr("outsider");
    th.autonomy.deposit(&outsider, 1000)?;
    let retire = ProposalPayload::Change(ChangePayload {
        changes: vec![MemberChange { cancel: true, addr: board[2].clone() }],
    });
    assert!(matches!(
        th.propose(&outsider, retire.clone(), 10, 20, 40),
        Err(Error::AddressNotInBoard(_))
    ));

    let p = th.propose(&board[0], retire, 10, 20, 40)?;
    assert_eq!(p.boards, board);
    let kind = ProposalKind::Change;

    let p = th.vote(&board[0], kind, &p.id, VoteOption::Approve, 25)?;
    assert_eq!(p.vote_result.total_votes, 3);
    let p = th.vote(&board[1], kind, &p.id, VoteOption::Approve, 26)?;
    assert_eq!(p.status, ProposalStatus::Terminated);

    let active = th.autonomy.active_board()?;
    assert_eq!(active.boards, board[..2].to_vec());
    assert_eq!(active.revboards, vec![board[2].clone()]);

    // Retired members lose their seat on new proposals
    let item_id = th.propose(&board[0], item("after-retire"), 30, 40, 60)?.id;
    assert!(matches!(
        th.vote(&board[2], ProposalKind::Item, &item_id, VoteOption::Approve, 45),
        Err(Error::NotBoardMember(_))
    ));

    let restore = ProposalPayload::Change(ChangePayload {
        changes: vec![MemberChange { cancel: false, addr: board[2].clone() }],
    });
    let p = th.propose(&board[1], restore, 30, 40, 60)?;
    let p = th.vote(&board[0], kind, &p.id, VoteOption::Approve, 45)?;
    // One seat of two is not a majority
    assert_eq!(p.status, ProposalStatus::Voted);
    let p = th.vote(&board[1], kind, &p.id, VoteOption::Approve, 46)?;
    assert_eq!(p.status, ProposalStatus::Terminated);

    let active = th.autonomy.active_board()?;
    assert_eq!(active.boards, board);
    assert!(active.revboards.is_empty());
    Ok(())
}

#[test]
fn unvoted_item_forfeits_bond() -> Result<()> {
    let mut th = Harness::new()?;
    let alice = addr("alice");
    th.autonomy.deposit(&alice, 1000)?;

    let id = th.propose(&alice, item("idle"), 10, 20, 40)?.id;
    let kind = ProposalKind::Item;

    assert!(matches!(th.terminate(&alice, kind, &id, 40), Err(Error::TerminatePeriod)));

    let p = th.terminate(&alice, kind, &id, 41)?;
    assert_eq!(p.status, ProposalStatus::Terminated);
    assert!(!p.vote_result.pass);
    assert_eq!(p.vote_result.total_votes, 3);
    assert_eq!(p.window.real_end, 41);

    assert_eq!(th.autonomy.account(&alice)?, Account { balance: 900, frozen: 0 });
    assert_eq!(th.autonomy.treasury()?, BOND);

    assert!(matches!(
        th.terminate(&alice, kind, &id, 42),
        Err(Error::ProposalStatus(ProposalStatus::Terminated))
    ));
    Ok(())
}

#[test]
fn item_passes_with_committee_majority() -> Result<()> {
    let mut th = Harness::new()?;
    let board = th.board();
    let alice = addr("alice");
    th.autonomy.deposit(&alice, 1000)?;

    let id = th.propose(&alice, item("upgrade"), 10, 20, 40)?.id;
    let kind = ProposalKind::Item;

    // Quit seats are not counted: 1 approve of 2 remaining is short of 51%
    th.vote(&board[0], kind, &id, VoteOption::Quit, 21)?;
    let p = th.vote(&board[1], kind, &id, VoteOption::Approve, 22)?;
    assert_eq!(p.status, ProposalStatus::Voted);
    let p = th.vote(&board[2], kind, &id, VoteOption::Approve, 23)?;
    assert_eq!(p.status, ProposalStatus::Terminated);
    assert!(p.vote_result.pass);
    assert_eq!(p.vote_result.quit_votes, 1);
    Ok(())
}

#[test]
fn revoke_rules() -> Result<()> {
    let mut th = Harness::new()?;
    let alice = addr("alice");
    th.autonomy.deposit(&alice, 1000)?;

    let id = th.propose(&alice, item("revocable"), 10, 20, 40)?.id;
    let kind = ProposalKind::Item;

    assert!(matches!(th.revoke(&addr("mallory"), kind, &id, 15), Err(Error::RevokePower)));
    assert!(matches!(th.revoke(&alice, kind, &id, 20), Err(Error::RevokePeriod)));

    let p = th.revoke(&alice, kind, &id, 19)?;
    assert_eq!(p.status, ProposalStatus::Revoked);
    assert_eq!(th.autonomy.account(&alice)?, Account { balance: 1000, frozen: 0 });

    assert!(matches!(
        th.revoke(&alice, kind, &id, 19),
        Err(Error::ProposalStatus(ProposalStatus::Revoked))
    ));
    let member = th.board()[0].clone();
    assert!(matches!(
        th.vote(&member, kind, &id, VoteOption::Approve, 25),
        Err(Error::ProposalStatus(ProposalStatus::Revoked))
    ));
    assert!(matches!(
        th.terminate(&alice, kind, &id, 50),
        Err(Error::ProposalStatus(ProposalStatus::Revoked))
    ));

    // A voted proposal cannot be revoked anymore
    let id = th.propose(&alice, item("voted"), 10, 12, 40)?.id;
    th.vote(&member, kind, &id, VoteOption::Approve, 12)?;
    assert!(matches!(
        th.revoke(&alice, kind, &id, 11),
        Err(Error::ProposalStatus(ProposalStatus::Voted))
    ));
    Ok(())
}

#[test]
fn propose_rejections() -> Result<()> {
    let mut th = Harness::new()?;
    let alice = addr("alice");

    // No bond available
    assert!(matches!(
        th.propose(&alice, item("poor"), 10, 20, 40),
        Err(Error::InsufficientBalance { .. })
    ));
    th.autonomy.deposit(&alice, 1000)?;

    for (start, end) in [(9, 40), (20, 29), (20, 1011), (20, 9)] {
        assert!(matches!(
            th.propose(&alice, item("window"), 10, start, end),
            Err(Error::InvalidHeightWindow { .. })
        ));
    }
    // Window bounds are inclusive
    th.propose(&alice, item("narrow"), 10, 10, 20)?;
    th.propose(&alice, item("far"), 10, 20, 1010)?;

    let empty = ProposalPayload::Item(ItemPayload { item_tx_hash: String::new() });
    assert!(matches!(th.propose(&alice, empty, 10, 20, 40), Err(Error::InvalidParam(_))));
    Ok(())
}

#[test]
fn rejected_transaction_leaves_no_trace() -> Result<()> {
    let mut th = Harness::new()?;
    let alice = addr("alice");
    th.autonomy.deposit(&alice, 1000)?;
    let id = th.propose(&alice, item("trace"), 10, 20, 40)?.id;

    let before = th.dump();

    let stranger = addr("stranger");
    assert!(th.vote(&stranger, ProposalKind::Item, &id, VoteOption::Approve, 25).is_err());
    assert!(th.terminate(&alice, ProposalKind::Item, &id, 30).is_err());
    assert_eq!(th.dump(), before);

    // Execution alone never writes
    let call = AutonomyCall::Terminate(ProposalRef { kind: ProposalKind::Item, proposal_id: id });
    let tx = th.tx(&alice, call);
    let receipt = th.autonomy.execute(&tx, 41, 0, &th.oracle)?;
    assert_eq!(receipt.proposal.current.status, ProposalStatus::Terminated);
    assert_eq!(th.dump(), before);

    let bytes = tx.encode();
    assert!(matches!(
        th.autonomy.execute_encoded(&bytes[..bytes.len() - 2], 41, 0, &th.oracle),
        Err(Error::MalformedTransaction(_))
    ));
    assert_eq!(th.autonomy.execute_encoded(&bytes, 41, 0, &th.oracle)?, receipt);
    Ok(())
}

/// Cast `ballots` on a fresh unanimous five-seat committee, one per
/// height, then terminate after the window if still undecided.
fn cast_in_order(ballots: &[VoteOption]) -> Result<(bool, ProposalStatus, u64)> {
    let mut config = test_config();
    config.genesis_board = (0..5).map(|i| addr(&format!("seat-{i}"))).collect();
    config.rule.board_approve_ratio = 100;
    let mut th = Harness::with_config(config)?;
    let board = th.board();
    let alice = addr("alice");
    th.autonomy.deposit(&alice, 1000)?;

    let kind = ProposalKind::Item;
    let id = th.propose(&alice, item("ordering"), 10, 20, 40)?.id;

    let mut p = None;
    for (i, (member, option)) in board.iter().zip(ballots).enumerate() {
        p = Some(th.vote(member, kind, &id, *option, 21 + i as u64)?);
    }
    let mut p = p.unwrap();
    if p.status != ProposalStatus::Terminated {
        p = th.terminate(&alice, kind, &id, 41)?;
    }
    Ok((p.vote_result.pass, p.status, p.window.real_end))
}

#[test]
fn ballot_order_does_not_change_outcome() -> Result<()> {
    use VoteOption::{Approve, Oppose, Quit};

    let cases = [
        (vec![Approve, Approve, Approve, Quit, Quit], (true, ProposalStatus::Terminated, 25)),
        (vec![Approve, Approve, Oppose, Quit, Quit], (false, ProposalStatus::Terminated, 41)),
        (vec![Approve, Quit, Quit, Quit, Quit], (true, ProposalStatus::Terminated, 25)),
    ];

    let mut rng = thread_rng();
    for (mut ballots, expected) in cases {
        for _ in 0..8 {
            ballots.shuffle(&mut rng);
            assert_eq!(cast_in_order(&ballots)?, expected, "ballots {ballots:?}");
        }
    }
    Ok(())
}
