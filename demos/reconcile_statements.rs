//! Reconciling overlapping bank statement downloads

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use ledger_reconcile::utils::MemoryStorage;
use ledger_reconcile::{
    AccountId, Balance, Config, ExhaustiveChunk, ImportDetails, LedgerMutation, LedgerView,
    Reconciler,
};

fn day(month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, month, day).expect("valid calendar date")
}

fn mutation(
    month: u32,
    d: u32,
    amount: i64,
    counterparty: &str,
    description: &str,
) -> LedgerMutation {
    LedgerMutation::new(
        "iban:NL01ASNB0123456789",
        counterparty,
        day(month, d),
        BigDecimal::from(amount),
        "EUR",
    )
    .with_data("description", description)
}

fn statement(
    file_id: &str,
    start: NaiveDate,
    end: NaiveDate,
    opening: i64,
    mutations: Vec<LedgerMutation>,
) -> LedgerView {
    let imported_from = match mutations.len() {
        0 => vec![],
        n => vec![ImportDetails::new(file_id, "asn-bank-csv", "0.1.0", 0, n - 1)],
    };
    LedgerView::from_chunk(
        ExhaustiveChunk::new(
            AccountId::iban("NL01ASNB0123456789"),
            start,
            end,
            Some(Balance::new(BigDecimal::from(opening), "EUR")),
        ),
        mutations,
        imported_from,
    )
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::DEBUG.into()),
        )
        .init();

    println!("🧾 Ledger Reconcile - Overlapping Statements Example\n");

    let config = Config::from_env()?;
    let mut reconciler = Reconciler::with_config(MemoryStorage::new(), &config);

    // 1. January download
    let january = statement(
        "asn-2024-01.csv",
        day(1, 1),
        day(1, 31),
        100,
        vec![
            mutation(1, 5, -20, "iban:NL10SHOP0000000001", "groceries"),
            mutation(1, 10, 50, "iban:NL20EMPL0000000002", "salary advance"),
            mutation(1, 20, -10, "iban:NL30CAFE0000000003", "lunch"),
        ],
    );
    let report = reconciler.import(january).await?;
    println!(
        "  ✓ Imported January: {} mutations, [{}, {})",
        report.mutation_count, report.start_date, report.end_date
    );

    // 2. A later download that overlaps the second half of January
    let february = statement(
        "asn-2024-02.csv",
        day(1, 15),
        day(2, 15),
        130,
        vec![
            mutation(1, 20, -10, "iban:NL30CAFE0000000003", "lunch"),
            mutation(2, 3, 15, "iban:NL40FRND0000000004", "dinner refund"),
            mutation(2, 10, -5, "iban:NL10SHOP0000000001", "groceries"),
        ],
    );
    let report = reconciler.import(february).await?;
    println!(
        "  ✓ Merged February: {} mutations, [{}, {})",
        report.mutation_count, report.start_date, report.end_date
    );

    // 3. A download with a wrong opening balance is rejected
    let broken = statement("asn-broken.csv", day(2, 15), day(2, 28), 999, vec![]);
    match reconciler.import(broken).await {
        Ok(_) => println!("  ✗ Broken statement was accepted"),
        Err(e) => println!("  ✓ Rejected broken statement: {}", e),
    }

    // 4. Final timeline
    let account = AccountId::iban("NL01ASNB0123456789");
    let view = reconciler.view_required(&account).await?;
    println!("\n📊 Timeline for {}:", account);
    for (mutation, (_, balance)) in view.mutations().iter().zip(view.running_balances()?) {
        println!(
            "  {}  {:>6} {}  → {:>6}  {}",
            mutation.date,
            mutation.amount,
            mutation.unit,
            balance,
            mutation.data.get("description").map(String::as_str).unwrap_or("")
        );
    }

    println!("\n📎 Provenance:");
    for details in view.imported_from() {
        println!(
            "  {} ({} {}) → mutations {}..={}",
            details.file_id,
            details.parser_name,
            details.parser_version,
            details.first_affected,
            details.last_affected
        );
    }

    println!("\n🔗 Half-trade export of the first mutation:");
    if let Some(trade) = view.half_trades(&config.vocabulary).first() {
        for (predicate, value) in trade.fields(&config.vocabulary) {
            println!("  <{}> <{}> \"{}\"", trade.subject, predicate, value);
        }
    }

    Ok(())
}
