use std::collections::BTreeMap;

use crate::distributor::allocate_to_holders;
use crate::invariants::assert_distribution_exact;
use crate::testutils::*;
use crate::{Error, Identity, RevenueSplit};

#[test]
fn test_configure_requires_exact_total() {
    assert!(RevenueSplit::configure(500, 2_000, 7_500).is_ok());
    assert_eq!(
        RevenueSplit::configure(500, 2_000, 7_000),
        Err(Error::InvalidPercentages(9_500))
    );
    assert_eq!(
        RevenueSplit::configure(500, 2_000, 8_000),
        Err(Error::InvalidPercentages(10_500))
    );
    assert_eq!(
        RevenueSplit::configure(u32::MAX, u32::MAX, 2),
        Err(Error::InvalidPercentages(2 * u32::MAX as u64 + 2))
    );
}

#[test]
fn test_distribute_scenario() {
    let split = RevenueSplit::configure(500, 2_000, 7_500).unwrap();
    let shares = split.distribute(10_000);
    assert_eq!(shares.platform, 500);
    assert_eq!(shares.creator, 2_000);
    assert_eq!(shares.investor, 7_500);
    assert_distribution_exact(10_000, &shares);
}

#[test]
fn test_distribute_truncation_goes_to_investors() {
    let split = RevenueSplit::configure(3_333, 3_333, 3_334).unwrap();
    let shares = split.distribute(10);
    assert_eq!(shares.platform, 3);
    assert_eq!(shares.creator, 3);
    assert_eq!(shares.investor, 4);

    let shares = split.distribute(1);
    assert_eq!((shares.platform, shares.creator, shares.investor), (0, 0, 1));
    assert_distribution_exact(0, &split.distribute(0));
}

#[test]
fn test_distribute_handles_huge_amounts() {
    let split = RevenueSplit::configure(500, 2_000, 7_500).unwrap();
    let total = u128::MAX;
    let shares = split.distribute(total);
    assert_distribution_exact(total, &shares);
    assert_eq!(shares.platform, total / 10_000 * 500 + (total % 10_000) * 500 / 10_000);
}

#[test]
fn test_with_investor_remainder() {
    let split = RevenueSplit::with_investor_remainder(500, 2_000).unwrap();
    assert_eq!(split.investor_bps(), 7_500);
    assert_eq!(
        RevenueSplit::with_investor_remainder(2_500, 8_000),
        Err(Error::InvalidPercentages(10_500))
    );
}

#[test]
fn test_allocation_remainder_goes_to_first_holder() {
    let mut holdings = BTreeMap::new();
    holdings.insert(Identity::new("0xcc"), 1);
    holdings.insert(Identity::new("0xaa"), 1);
    holdings.insert(Identity::new("0xbb"), 1);

    let allocations = allocate_to_holders(100, &holdings).unwrap();
    assert_eq!(allocations[&Identity::new("0xaa")], 34);
    assert_eq!(allocations[&Identity::new("0xbb")], 33);
    assert_eq!(allocations[&Identity::new("0xcc")], 33);
    assert_eq!(allocations.values().sum::<u128>(), 100);
}

#[test]
fn test_allocation_skips_empty_holders() {
    let mut holdings = BTreeMap::new();
    holdings.insert(Identity::new("0xaa"), 0);
    holdings.insert(Identity::new("0xbb"), 3);
    holdings.insert(Identity::new("0xcc"), 1);

    let allocations = allocate_to_holders(10, &holdings).unwrap();
    assert!(!allocations.contains_key(&Identity::new("0xaa")));
    assert_eq!(allocations[&Identity::new("0xbb")], 8);
    assert_eq!(allocations[&Identity::new("0xcc")], 2);

    assert!(allocate_to_holders(10, &BTreeMap::new()).unwrap().is_empty());
}

#[test]
fn test_distribute_revenue_by_token_holdings() {
    let (engine, sink) = setup();
    let id = create_campaign(&engine);
    engine.invest(id, &investor(1), 100, START + 1).unwrap();
    engine.invest(id, &investor(2), 300, START + 2).unwrap();

    let distribution = engine
        .distribute_revenue(id, &creator(), 10_000, START + 3)
        .unwrap();
    assert_distribution_exact(10_000, &distribution.shares);
    assert_eq!(distribution.shares.investor, 7_500);
    assert_eq!(distribution.investor_allocations[&investor(1)], 1_875);
    assert_eq!(distribution.investor_allocations[&investor(2)], 5_625);
    assert_eq!(distribution.creator_total, 2_000);
    assert_eq!(sink.kinds().last(), Some(&"revenue_distributed"));
}

#[test]
fn test_distribute_revenue_without_investors_goes_to_creator() {
    let (engine, _) = setup();
    let id = create_campaign(&engine);

    let distribution = engine
        .distribute_revenue(id, &creator(), 1_000, START + 1)
        .unwrap();
    assert!(distribution.investor_allocations.is_empty());
    assert_eq!(distribution.creator_total, 950);
    assert_eq!(distribution.shares.platform, 50);
}

#[test]
fn test_distribute_revenue_requires_manager_and_amount() {
    let (engine, _) = setup();
    let id = create_campaign(&engine);
    let stranger = Identity::new("0xstranger");

    let err = engine
        .distribute_revenue(id, &stranger, 1_000, START + 1)
        .unwrap_err();
    assert_eq!(err, Error::NotAuthorized { caller: stranger });

    let err = engine
        .distribute_revenue(id, &creator(), 0, START + 1)
        .unwrap_err();
    assert!(matches!(err, Error::InvalidAmount(_)));
}

#[test]
fn test_distribute_revenue_rejected_on_failed_campaign() {
    let (engine, _) = setup();
    let id = create_campaign(&engine);
    engine.invest(id, &investor(1), 300, START + 1).unwrap();

    // Already failed at the deadline, before close_expired records it.
    let err = engine
        .distribute_revenue(id, &creator(), 1_000, DEADLINE)
        .unwrap_err();
    assert!(matches!(err, Error::InvalidState(_)));

    engine.close_expired(id, DEADLINE).unwrap();
    engine.refund(id, &investor(1), DEADLINE + 1).unwrap();
    let err = engine
        .distribute_revenue(id, &creator(), 1_000, DEADLINE + 2)
        .unwrap_err();
    assert!(matches!(err, Error::InvalidState(_)));
}
