//! End-to-end auction lifecycles through `LedgerHost`.
//!
//! Construct → approve → start → bid → end → withdraw, with real inventory
//! and currency ledgers underneath, and the custody audit run after every
//! step that moves value.

use gavel_custody::{LedgerHost, verify_custody};
use gavel_engine::{Auction, Host};
use gavel_types::*;

const OWNER: u128 = 1_000;
const T0: Timestamp = Timestamp(1_700_000_000);

fn acct(n: u128) -> AccountId {
    AccountId::from_u128(n)
}

/// Helper: one auction and the world it lives in.
struct Sale {
    host: LedgerHost,
    auction: Auction,
}

impl Sale {
    /// Owner holds `inventory` units and approves all of them.
    fn new(starting: Amount, reserve: Amount, duration: u64, inventory: Amount) -> Self {
        let mut host = LedgerHost::new("AXL", T0);
        host.inventory_ledger_mut()
            .mint(acct(OWNER), inventory)
            .expect("mint");
        let auction = Auction::new(
            &host,
            acct(OWNER),
            AuctionParams::new(starting, reserve, duration, "AXL"),
        )
        .expect("valid params");
        let escrow = auction.account();
        host.inventory_ledger_mut()
            .approve(acct(OWNER), escrow, inventory);
        Self { host, auction }
    }

    fn started(starting: Amount, reserve: Amount, duration: u64, inventory: Amount) -> Self {
        let mut sale = Self::new(starting, reserve, duration, inventory);
        sale.auction
            .start(&mut sale.host, acct(OWNER))
            .expect("start");
        sale
    }

    fn fund(&mut self, who: u128, amount: Amount) {
        self.host.treasury_mut().fund(acct(who), amount).expect("fund");
    }

    fn bid(&mut self, who: u128, amount: Amount) -> Result<Amount> {
        self.auction.place_bid(&mut self.host, acct(who), amount)
    }

    fn audit(&self) {
        verify_custody(&self.auction, &self.host).expect("custody balanced");
    }
}

#[test]
fn reference_sale_single_bidder_at_reserve() {
    let mut sale = Sale::started(10_000, 5_000, 1_200, 100);
    sale.fund(1, 10_000);
    assert_eq!(sale.bid(1, 10_000).unwrap(), 10_000);
    sale.audit();

    sale.host.advance(1_200);
    assert_eq!(sale.auction.get_stage(&sale.host), Stage::Ended);
    assert_eq!(sale.auction.get_price(&sale.host).unwrap(), 5_000);
    assert_eq!(sale.auction.get_tokens(&sale.host, acct(1)).unwrap(), 2);
    assert_eq!(sale.auction.get_refund(&sale.host, acct(1)).unwrap(), 0);
    assert_eq!(sale.auction.get_owner_revenue(&sale.host).unwrap(), 10_000);
    sale.audit();

    let claim = sale.auction.withdraw_tokens(&mut sale.host, acct(1)).unwrap();
    assert_eq!(claim, Claim { tokens: 2, refund: 0 });
    assert_eq!(sale.host.inventory_balance(acct(1)), 2);
    sale.audit();

    let payout = sale
        .auction
        .withdraw_owner_revenue(&mut sale.host, acct(OWNER))
        .unwrap();
    assert_eq!(payout.revenue, 10_000);
    assert_eq!(payout.destroyed, 98);
    assert_eq!(sale.auction.get_owner_revenue(&sale.host).unwrap(), 0);
    assert_eq!(sale.host.currency_balance(acct(OWNER)), 10_000);
    assert_eq!(sale.host.inventory_ledger().total_supply(), 2);
    sale.audit();

    assert_eq!(sale.host.currency_balance(sale.auction.account()), 0);
    assert_eq!(sale.host.inventory_balance(sale.auction.account()), 0);
}

#[test]
fn constructor_rejects_invalid_inputs() {
    let mut host = LedgerHost::new("AXL", T0);
    // no supply yet
    let err = Auction::new(&host, acct(OWNER), AuctionParams::new(100, 50, 20, "AXL")).unwrap_err();
    assert!(matches!(err, AuctionError::InvalidAuctionInput { .. }));

    host.inventory_ledger_mut().mint(acct(OWNER), 10).unwrap();
    for params in [
        AuctionParams::new(0, 0, 20, "AXL"),
        AuctionParams::new(50, 100, 20, "AXL"),
        AuctionParams::new(100, 50, 0, "AXL"),
        AuctionParams::new(100, 0, 20, "AXL"),
    ] {
        assert!(matches!(
            Auction::new(&host, acct(OWNER), params),
            Err(AuctionError::InvalidAuctionInput { .. })
        ));
    }
}

#[test]
fn params_load_from_json() {
    let params = AuctionParams::from_json_str(
        r#"{"starting_price":10000,"reserve_price":5000,"inventory_asset":"AXL"}"#,
    )
    .unwrap();
    assert_eq!(params.duration_secs, constants::DEFAULT_DURATION_SECS);
    let mut host = LedgerHost::new("AXL", T0);
    host.inventory_ledger_mut().mint(acct(OWNER), 1).unwrap();
    let auction = Auction::new(&host, acct(OWNER), params).unwrap();
    assert_eq!(auction.curve().rate(), 4);
}

#[test]
fn owner_only_operations() {
    let mut sale = Sale::new(100, 50, 20, 10);
    assert!(matches!(
        sale.auction.start(&mut sale.host, acct(1)),
        Err(AuctionError::OnlyOwnerCanCallFunction)
    ));
    sale.auction.start(&mut sale.host, acct(OWNER)).unwrap();
    sale.host.advance(20);
    assert!(matches!(
        sale.auction.withdraw_owner_revenue(&mut sale.host, acct(1)),
        Err(AuctionError::OnlyOwnerCanCallFunction)
    ));
}

#[test]
fn start_without_approval_fails_cleanly() {
    let mut host = LedgerHost::new("AXL", T0);
    host.inventory_ledger_mut().mint(acct(OWNER), 10).unwrap();
    let mut auction =
        Auction::new(&host, acct(OWNER), AuctionParams::new(100, 50, 20, "AXL")).unwrap();
    assert!(auction.start(&mut host, acct(OWNER)).is_err());
    assert_eq!(auction.get_stage(&host), Stage::NotYetStarted);
    assert_eq!(host.inventory_balance(acct(OWNER)), 10);
}

#[test]
fn stage_gates() {
    let mut sale = Sale::new(100, 50, 20, 10);
    sale.fund(1, 1_000);
    assert!(matches!(
        sale.bid(1, 100),
        Err(AuctionError::FunctionInvalidAtThisStage { stage: Stage::NotYetStarted })
    ));
    assert!(sale.auction.withdraw_tokens(&mut sale.host, acct(1)).is_err());

    sale.auction.start(&mut sale.host, acct(OWNER)).unwrap();
    sale.bid(1, 100).unwrap();
    assert!(matches!(
        sale.auction.withdraw_tokens(&mut sale.host, acct(1)),
        Err(AuctionError::FunctionInvalidAtThisStage { stage: Stage::Started })
    ));
    assert!(matches!(
        sale.auction.start(&mut sale.host, acct(OWNER)),
        Err(AuctionError::FunctionInvalidAtThisStage { stage: Stage::Started })
    ));
}

#[test]
fn exhaustion_boundary() {
    // 10 units at price 100: implied demand 9 keeps the sale open.
    let mut sale = Sale::started(100, 50, 20, 10);
    sale.fund(1, 10_000);
    sale.fund(2, 10_000);
    sale.fund(3, 10_000);
    sale.bid(1, 800).unwrap();
    sale.bid(2, 199).unwrap();
    assert_eq!(sale.auction.get_stage(&sale.host), Stage::Started);
    assert_eq!(sale.auction.get_token_left(&sale.host).unwrap(), 1);
    assert!(matches!(
        sale.bid(3, 99),
        Err(AuctionError::InvalidBidValue { .. })
    ));

    // 349 buys 3, demand 11 ≥ 10: bidder 2 ends it and gets what is left.
    sale.bid(2, 150).unwrap();
    assert_eq!(sale.auction.get_stage(&sale.host), Stage::Ended);
    let outcome = sale.auction.outcome().unwrap();
    assert_eq!(outcome.trigger, EndTrigger::BidExhausted(acct(2)));
    assert_eq!(outcome.clearing_price, 100);
    assert_eq!(outcome.tokens_sold, 10);
    assert_eq!(sale.auction.get_tokens(&sale.host, acct(1)).unwrap(), 8);
    assert_eq!(sale.auction.get_tokens(&sale.host, acct(2)).unwrap(), 2);
    assert_eq!(sale.auction.get_refund(&sale.host, acct(2)).unwrap(), 149);
    sale.audit();
}

#[test]
fn late_bids_only_refund() {
    let mut sale = Sale::started(100, 50, 20, 10);
    sale.fund(1, 1_000);
    sale.bid(1, 100).unwrap();
    sale.host.advance(21);
    assert_eq!(sale.bid(1, 75).unwrap(), 175);
    assert_eq!(sale.auction.get_tokens(&sale.host, acct(1)).unwrap(), 2);
    assert_eq!(sale.auction.get_refund(&sale.host, acct(1)).unwrap(), 75);
    let late = sale.auction.events().last().unwrap();
    assert_eq!(late.kind.to_string(), "LATE_BID_PLACED");
    sale.audit();

    sale.auction.withdraw_tokens(&mut sale.host, acct(1)).unwrap();
    assert_eq!(sale.host.currency_balance(acct(1)), 900);
    sale.audit();
}

#[test]
fn withdraw_is_idempotent() {
    let mut sale = Sale::started(100, 50, 20, 10);
    sale.fund(1, 1_000);
    sale.bid(1, 130).unwrap();
    sale.host.advance(20);
    let first = sale.auction.withdraw_tokens(&mut sale.host, acct(1)).unwrap();
    assert_eq!(first, Claim { tokens: 2, refund: 30 });
    for _ in 0..3 {
        assert!(matches!(
            sale.auction.withdraw_tokens(&mut sale.host, acct(1)),
            Err(AuctionError::InvalidWithdrawer)
        ));
    }
    assert_eq!(sale.host.currency_balance(acct(1)), 900);
    assert_eq!(sale.host.inventory_balance(acct(1)), 2);
}

#[test]
fn owner_distributes_then_participants_pull_refunds() {
    let mut sale = Sale::started(100, 50, 20, 10);
    for who in 1..=3 {
        sale.fund(who, 1_000);
    }
    sale.bid(1, 250).unwrap();
    sale.bid(2, 310).unwrap();
    sale.bid(3, 120).unwrap();
    sale.host.advance(20);

    let dist = sale
        .auction
        .distribute_tokens(&mut sale.host, acct(OWNER))
        .unwrap();
    // at 50: 5 + 6 + 2 = 13 > 10 → 5, 5 (capped), 0
    assert_eq!(dist.tokens, 10);
    assert_eq!(dist.recipients, 2);
    assert_eq!(sale.host.inventory_balance(acct(1)), 5);
    assert_eq!(sale.host.inventory_balance(acct(2)), 5);
    sale.audit();

    assert_eq!(sale.auction.get_refund(&sale.host, acct(2)).unwrap(), 60);
    assert_eq!(sale.auction.get_refund(&sale.host, acct(3)).unwrap(), 120);
    sale.auction.withdraw_tokens(&mut sale.host, acct(3)).unwrap();
    assert_eq!(sale.host.currency_balance(acct(3)), 1_000);
    sale.audit();
}

#[test]
fn replayed_bids_clear_identically() {
    let run = || {
        let mut sale = Sale::started(100, 50, 20, 10);
        sale.fund(1, 1_000);
        sale.fund(2, 1_000);
        sale.bid(1, 300).unwrap();
        sale.host.advance(3);
        sale.bid(2, 400).unwrap();
        sale.host.advance(30);
        sale.auction.get_stage(&sale.host);
        let outcome = sale.auction.outcome().cloned().unwrap();
        assert!(gavel_engine::verify_settlement_root(
            sale.auction.id(),
            outcome.clearing_price,
            outcome.trigger,
            &outcome.allocations,
            &outcome.settlement_root,
        ));
        outcome
    };
    let a = run();
    let b = run();
    assert_eq!(a.allocations, b.allocations);
    assert_eq!(a.clearing_price, 50);
    // at 50: 6 + 8 = 14 over 10 units
    assert_eq!(a.allocations[0].tokens, 6);
    assert_eq!(a.allocations[1].tokens, 4);
}

#[test]
fn snapshot_serializes() {
    let sale = Sale::started(100, 50, 20, 10);
    let snap = sale.auction.snapshot();
    let json = serde_json::to_string(&snap).unwrap();
    let back: gavel_engine::AuctionSnapshot = serde_json::from_str(&json).unwrap();
    assert_eq!(back, snap);
    assert_eq!(back.total_inventory, 10);
}

#[test]
fn inventory_snapshot_ignores_later_owner_moves() {
    let mut sale = Sale::started(100, 50, 20, 10);
    sale.host
        .inventory_ledger_mut()
        .mint(acct(OWNER), 50)
        .unwrap();
    sale.host
        .inventory_ledger_mut()
        .approve(acct(OWNER), sale.auction.account(), 50);
    assert_eq!(sale.auction.total_inventory(), 10);
    assert_eq!(sale.auction.get_token_left(&sale.host).unwrap(), 10);
    assert_eq!(sale.host.inventory().balance_of(acct(OWNER)), 50);
}
