//! Integration tests for ledger-reconcile

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use ledger_reconcile::{
    utils::{MemoryStorage, StrictViewValidator},
    AccountId, Balance, Config, ExhaustiveChunk, ImportDetails, LedgerMutation, LedgerView,
    ReconcileError, Reconciler,
};

const OWN: &str = "iban:NL01ASNB0123456789";

fn date(month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, month, day).unwrap()
}

fn eur(amount: i64) -> Balance {
    Balance::new(BigDecimal::from(amount), "EUR")
}

fn payment(month: u32, day: u32, amount: i64, counterparty: &str) -> LedgerMutation {
    let (from, to) = if amount < 0 {
        (OWN, counterparty)
    } else {
        (counterparty, OWN)
    };
    LedgerMutation::new(from, to, date(month, day), BigDecimal::from(amount), "EUR")
}

fn statement(
    file_id: &str,
    start: NaiveDate,
    end: NaiveDate,
    start_balance: Option<Balance>,
    mutations: Vec<LedgerMutation>,
) -> LedgerView {
    let imported_from = vec![ImportDetails::new(
        file_id,
        "asn-bank-csv",
        "0.1.0",
        0,
        mutations.len() - 1,
    )];
    LedgerView::from_chunk(
        ExhaustiveChunk::new(AccountId::iban("NL01ASNB0123456789"), start, end, start_balance),
        mutations,
        imported_from,
    )
}

/// January statement: 100 EUR opening balance, three mutations, ends at 120
fn statement_a() -> LedgerView {
    statement(
        "a.csv",
        date(1, 1),
        date(1, 31),
        Some(eur(100)),
        vec![
            payment(1, 5, -20, "iban:NL10SHOP0000000001"),
            payment(1, 10, 50, "iban:NL20EMPL0000000002"),
            payment(1, 20, -10, "iban:NL30CAFE0000000003").with_data("description", "lunch"),
        ],
    )
}

/// Mid-January to mid-February statement overlapping the last January mutation
fn statement_b() -> LedgerView {
    statement(
        "b.csv",
        date(1, 15),
        date(2, 15),
        Some(eur(130)),
        vec![
            payment(1, 20, -10, "iban:NL30CAFE0000000003").with_data("volgnummer", "90043054"),
            payment(2, 3, 15, "iban:NL40FRND0000000004"),
            payment(2, 10, -5, "iban:NL10SHOP0000000001"),
        ],
    )
}

#[test]
fn test_overlapping_statements_scenario() {
    let mut a = statement_a();
    a.add_data(statement_b()).unwrap();

    assert_eq!(a.start_date(), date(1, 1));
    assert_eq!(a.end_date(), date(2, 15));
    assert_eq!(a.mutations().len(), 5);
    assert_eq!(a.start_balance(), Some(&eur(100)));
    assert_eq!(a.end_balance().unwrap(), BigDecimal::from(130));

    // The shared mutation was enriched by both sources.
    let shared = &a.mutations()[2];
    assert_eq!(shared.data["description"], "lunch");
    assert_eq!(shared.data["volgnummer"], "90043054");

    let files: Vec<&str> = a.imported_from().iter().map(|d| d.file_id.as_str()).collect();
    assert!(files.contains(&"a.csv"));
    assert!(files.contains(&"b.csv"));
    for details in a.imported_from() {
        assert!(details.first_affected <= details.last_affected);
        assert!(details.last_affected < a.mutations().len());
    }

    let b_slices: Vec<(usize, usize)> = a
        .imported_from()
        .iter()
        .filter(|d| d.file_id == "b.csv")
        .map(|d| (d.first_affected, d.last_affected))
        .collect();
    assert!(b_slices.contains(&(3, 4)));
    assert!(b_slices.contains(&(2, 2)));
}

#[test]
fn test_reimport_is_idempotent() {
    let original = statement_a();
    let mut merged = original.clone();

    merged.add_data(original.clone()).unwrap();

    assert_eq!(merged.mutations(), original.mutations());
    assert_eq!(merged.imported_from(), original.imported_from());
    assert_eq!(merged.end_balance().unwrap(), original.end_balance().unwrap());
}

#[test]
fn test_earlier_statement_is_prepended() {
    let mut b = statement_b();
    b.add_data(statement_a()).unwrap();

    assert_eq!(b.start_date(), date(1, 1));
    assert_eq!(b.end_date(), date(2, 15));
    assert_eq!(b.mutations().len(), 5);
    assert_eq!(b.start_balance(), Some(&eur(100)));
    assert_eq!(b.end_balance().unwrap(), BigDecimal::from(130));
}

#[test]
fn test_inconsistent_overlap_is_rejected_atomically() {
    let mut a = statement_a();
    let before = a.clone();

    let mut b_mutations = statement_b().mutations().to_vec();
    b_mutations[0] = payment(1, 20, -12, "iban:NL30CAFE0000000003");
    let b = statement("b.csv", date(1, 15), date(2, 15), Some(eur(130)), b_mutations);

    let err = a.add_data(b).unwrap_err();

    assert!(matches!(err, ReconcileError::BalanceContinuity { .. }));
    assert_eq!(a, before);
}

#[test]
fn test_missing_transaction_in_overlap() {
    let mut a = statement_a();
    let sparse = statement(
        "sparse.csv",
        date(1, 1),
        date(1, 15),
        Some(eur(100)),
        vec![payment(1, 10, 50, "iban:NL20EMPL0000000002")],
    );

    assert!(matches!(
        a.add_data(sparse),
        Err(ReconcileError::RangeUnderflow {
            expected: 2,
            supplied: 1,
            ..
        })
    ));
}

#[test]
fn test_serde_snapshot_preserves_view() {
    let mut a = statement_a();
    a.add_data(statement_b()).unwrap();

    let json = serde_json::to_string(&a).unwrap();
    let restored: LedgerView = serde_json::from_str(&json).unwrap();

    assert_eq!(restored, a);
}

#[tokio::test]
async fn test_reconciler_folds_imports_per_account() {
    let mut reconciler =
        Reconciler::with_validator(MemoryStorage::new(), Box::new(StrictViewValidator));

    let created = reconciler.import(statement_b()).await.unwrap();
    assert!(created.created);

    let merged = reconciler.import(statement_a()).await.unwrap();
    assert!(!merged.created);
    assert_eq!(merged.mutation_count, 5);
    assert_eq!(merged.end_balance, Some(BigDecimal::from(130)));

    let savings = AccountId::iban("NL99ASNB0000000099");
    let savings_view = LedgerView::from_chunk(
        ExhaustiveChunk::new(savings.clone(), date(1, 1), date(2, 1), Some(eur(5000))),
        vec![LedgerMutation::new(
            OWN,
            "iban:NL99ASNB0000000099",
            date(1, 25),
            BigDecimal::from(250),
            "EUR",
        )],
        vec![ImportDetails::new("savings.csv", "asn-bank-csv", "0.1.0", 0, 0)],
    );
    reconciler.import(savings_view).await.unwrap();

    let accounts = reconciler.accounts().await.unwrap();
    assert_eq!(accounts.len(), 2);
    assert_eq!(
        reconciler.end_balance(&savings).await.unwrap(),
        BigDecimal::from(5250)
    );
    assert_eq!(
        reconciler
            .end_balance(&AccountId::iban("NL01ASNB0123456789"))
            .await
            .unwrap(),
        BigDecimal::from(130)
    );
}

#[tokio::test]
async fn test_reconciler_rejects_disjoint_import() {
    let mut reconciler = Reconciler::with_config(MemoryStorage::new(), &Config::default());
    reconciler.import(statement_a()).await.unwrap();

    let april = statement(
        "apr.csv",
        date(4, 1),
        date(4, 30),
        None,
        vec![payment(4, 2, -1, "iban:NL10SHOP0000000001")],
    );
    let result = reconciler.import(april).await;

    assert!(matches!(result, Err(ReconcileError::DisjointRange { .. })));
    let stored = reconciler
        .view(&AccountId::iban("NL01ASNB0123456789"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored, statement_a());
}

#[test]
fn test_half_trade_export_of_merged_view() {
    let mut a = statement_a();
    a.add_data(statement_b()).unwrap();

    let config = Config::default();
    let trades = a.half_trades(&config.vocabulary);

    assert_eq!(trades.len(), 5);
    assert_eq!(trades[2].description.as_deref(), Some("lunch"));
    assert_eq!(trades[4].unit, config.vocabulary.money("EUR"));
}
