//! Basic debt simplification example.
//!
//! Demonstrates how the settlement engine collapses a household's
//! transaction history into the minimal set of payments.

use settle_engine::core::member::MemberId;
use settle_engine::core::transaction::{Transaction, TransactionSet};
use settle_engine::settlement::settle::Settle;
use settle_engine::settlement::summary::SettlementSummary;

fn main() {
    println!("╔══════════════════════════════════════════╗");
    println!("║  settle-engine: Basic Settlement Example ║");
    println!("╚══════════════════════════════════════════╝\n");

    let ayla = MemberId::new("ayla");
    let ben = MemberId::new("ben");
    let caro = MemberId::new("caro");

    // A month of shared spending, amounts in pence
    let mut set = TransactionSet::new();
    set.add(Transaction::new(ayla.clone(), ben.clone(), 32_00).with_reference("rent share"));
    set.add(Transaction::new(ayla.clone(), ben.clone(), 18_50).with_reference("groceries"));
    set.add(Transaction::new(ben.clone(), caro.clone(), 40_00).with_reference("utilities"));
    set.add(Transaction::new(caro.clone(), ayla.clone(), 25_00).with_reference("takeaway"));

    println!("━━━ Transactions ━━━\n");
    for tx in set.transactions() {
        println!(
            "  {:<6} owes {:<6} {:>6}  ({})",
            tx.debtor().to_string(),
            tx.creditor().to_string(),
            tx.amount(),
            tx.reference().unwrap_or("-")
        );
    }
    println!();

    let debts = set.to_debt_graph().expect("transactions form a valid graph");
    let simplified = Settle::simplify_debt(&debts).expect("this network simplifies");

    println!("━━━ Simplified Debts ━━━\n");
    for (debtor, edge) in simplified.edges() {
        println!(
            "  {:<6} owes {:<6} {:>6}",
            debtor.to_string(),
            edge.target().to_string(),
            edge.unused_capacity()
        );
    }
    println!();

    println!("{}", SettlementSummary::compare(&debts, &simplified));
}
