use quadvote_governance::{
    credits, GovernanceConfig, GovernanceError, GovernanceLedger, MemoryBalanceOracle,
};
use quadvote_storage::{AccountStore, FileStore, MemoryStore};
use quadvote_types::Address;
use std::collections::HashSet;
use std::sync::{Arc, Barrier};
use std::thread;
use tempfile::TempDir;

const CREDENTIAL: Address = Address::from_bytes([0xcc; 32]);

fn identity(seed: u8) -> Address {
    Address::from_bytes([seed; 32])
}

fn ledger_with(store: Arc<dyn AccountStore>) -> (GovernanceLedger, Arc<MemoryBalanceOracle>) {
    let oracle = Arc::new(MemoryBalanceOracle::new());
    let ledger = GovernanceLedger::new(store, oracle.clone(), GovernanceConfig::default()).unwrap();
    (ledger, oracle)
}

fn ledger() -> (GovernanceLedger, Arc<MemoryBalanceOracle>) {
    ledger_with(Arc::new(MemoryStore::new()))
}

#[test]
fn full_voting_flow() {
    let (ledger, oracle) = ledger();
    let creator = identity(1);

    let (dao, record) = ledger.initialize_dao("Test DAO", creator, CREDENTIAL).unwrap();
    assert_eq!(record.proposal_count, 0);
    assert_eq!(record.authority, creator);

    let (proposal, _) = ledger
        .initialize_proposal(&dao, creator, "Increase the grants budget")
        .unwrap();
    assert_eq!(ledger.get_dao(&dao).unwrap().proposal_count, 1);

    oracle.set_balance(identity(2), CREDENTIAL, 100_000_000_000);
    oracle.set_balance(identity(3), CREDENTIAL, 10_000);
    oracle.set_balance(identity(4), CREDENTIAL, 9);

    let (_, vote) = ledger.cast_vote(identity(2), &dao, &proposal, 1).unwrap();
    assert_eq!(vote.credits, 316_227);
    ledger.cast_vote(identity(3), &dao, &proposal, 0).unwrap();
    ledger.cast_vote(identity(4), &dao, &proposal, 1).unwrap();

    let tallied = ledger.get_proposal(&proposal).unwrap();
    assert_eq!(tallied.yes_vote_count, 316_227 + 3);
    assert_eq!(tallied.no_vote_count, 100);
}

#[test]
fn credits_table() {
    let table = [(1, 1), (4, 2), (9, 3), (16, 4), (25, 5), (100, 10), (10_000, 100)];
    let (ledger, oracle) = ledger();
    let (dao, _) = ledger.initialize_dao("Table", identity(1), CREDENTIAL).unwrap();
    let (proposal, _) = ledger.initialize_proposal(&dao, identity(1), "").unwrap();

    let mut expected_yes = 0;
    for (i, (balance, want)) in table.into_iter().enumerate() {
        assert_eq!(credits(balance), want);

        let voter = identity(10 + i as u8);
        oracle.set_balance(voter, CREDENTIAL, balance);
        let (_, vote) = ledger.cast_vote(voter, &dao, &proposal, 1).unwrap();
        assert_eq!(vote.credits, want);
        expected_yes += want;
    }
    assert_eq!(ledger.get_proposal(&proposal).unwrap().yes_vote_count, expected_yes);
}

#[test]
fn votes_on_different_proposals_are_independent() {
    let (ledger, oracle) = ledger();
    let (dao, _) = ledger.initialize_dao("Test DAO", identity(1), CREDENTIAL).unwrap();
    let (first, _) = ledger.initialize_proposal(&dao, identity(1), "first").unwrap();
    let (second, _) = ledger.initialize_proposal(&dao, identity(1), "second").unwrap();

    oracle.set_balance(identity(2), CREDENTIAL, 49);
    ledger.cast_vote(identity(2), &dao, &first, 1).unwrap();
    ledger.cast_vote(identity(2), &dao, &second, 0).unwrap();

    assert_eq!(ledger.get_proposal(&first).unwrap().yes_vote_count, 7);
    assert_eq!(ledger.get_proposal(&second).unwrap().no_vote_count, 7);
    assert!(matches!(
        ledger.cast_vote(identity(2), &dao, &first, 0),
        Err(GovernanceError::AlreadyVoted { .. })
    ));
}

#[test]
fn concurrent_proposals_get_consecutive_indices() {
    const THREADS: usize = 8;
    let (ledger, _) = ledger();
    let creator = identity(1);
    let (dao, _) = ledger.initialize_dao("Busy DAO", creator, CREDENTIAL).unwrap();
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|i| {
            let ledger = ledger.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                ledger
                    .initialize_proposal(&dao, creator, &format!("proposal from thread {i}"))
                    .unwrap()
            })
        })
        .collect();

    let indices: HashSet<u64> = handles
        .into_iter()
        .map(|h| h.join().unwrap().1.sequence_index)
        .collect();

    assert_eq!(indices, (0..THREADS as u64).collect());
    assert_eq!(ledger.get_dao(&dao).unwrap().proposal_count, THREADS as u64);
    assert_eq!(ledger.proposals(&dao).unwrap().len(), THREADS);
}

#[test]
fn concurrent_double_vote_has_one_winner() {
    const THREADS: usize = 8;
    let (ledger, oracle) = ledger();
    let (dao, _) = ledger.initialize_dao("Test DAO", identity(1), CREDENTIAL).unwrap();
    let (proposal, _) = ledger.initialize_proposal(&dao, identity(1), "race").unwrap();
    oracle.set_balance(identity(2), CREDENTIAL, 400);
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|i| {
            let ledger = ledger.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                ledger.cast_vote(identity(2), &dao, &proposal, (i % 2) as u8)
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let winners: Vec<_> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
    assert_eq!(winners.len(), 1);
    assert!(results
        .iter()
        .filter_map(|r| r.as_ref().err())
        .all(|e| matches!(e, GovernanceError::AlreadyVoted { .. })));

    let tallied = ledger.get_proposal(&proposal).unwrap();
    assert_eq!(tallied.total_credits(), 20);
    let (_, vote) = winners[0];
    assert_eq!(ledger.get_vote(&identity(2), &proposal).unwrap().as_ref(), Some(vote));
}

#[test]
fn concurrent_voters_tally_sums() {
    const THREADS: u8 = 8;
    let (ledger, oracle) = ledger();
    let (dao, _) = ledger.initialize_dao("Test DAO", identity(1), CREDENTIAL).unwrap();
    let (proposal, _) = ledger.initialize_proposal(&dao, identity(1), "sum").unwrap();

    let mut expected_yes = 0;
    let mut expected_no = 0;
    for i in 0..THREADS {
        let balance = (i as u64 + 1) * 1_000;
        oracle.set_balance(identity(100 + i), CREDENTIAL, balance);
        if i % 2 == 0 {
            expected_yes += credits(balance);
        } else {
            expected_no += credits(balance);
        }
    }

    let barrier = Arc::new(Barrier::new(THREADS as usize));
    let handles: Vec<_> = (0..THREADS)
        .map(|i| {
            let ledger = ledger.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                let vote_type = if i % 2 == 0 { 1 } else { 0 };
                ledger.cast_vote(identity(100 + i), &dao, &proposal, vote_type)
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap().unwrap();
    }

    let tallied = ledger.get_proposal(&proposal).unwrap();
    assert_eq!(tallied.yes_vote_count, expected_yes);
    assert_eq!(tallied.no_vote_count, expected_no);
}

#[test]
fn ledger_state_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let (dao, proposal) = {
        let (ledger, oracle) = ledger_with(Arc::new(FileStore::open(dir.path()).unwrap()));
        let (dao, _) = ledger.initialize_dao("Durable", identity(1), CREDENTIAL).unwrap();
        let (proposal, _) = ledger.initialize_proposal(&dao, identity(1), "persist me").unwrap();
        oracle.set_balance(identity(2), CREDENTIAL, 144);
        ledger.cast_vote(identity(2), &dao, &proposal, 1).unwrap();
        (dao, proposal)
    };

    let (ledger, oracle) = ledger_with(Arc::new(FileStore::open(dir.path()).unwrap()));
    assert_eq!(ledger.get_dao(&dao).unwrap().proposal_count, 1);
    assert_eq!(ledger.get_proposal(&proposal).unwrap().yes_vote_count, 12);

    oracle.set_balance(identity(2), CREDENTIAL, 144);
    assert!(matches!(
        ledger.cast_vote(identity(2), &dao, &proposal, 1),
        Err(GovernanceError::AlreadyVoted { .. })
    ));
    let (_, next) = ledger.initialize_proposal(&dao, identity(1), "second").unwrap();
    assert_eq!(next.sequence_index, 1);
}
