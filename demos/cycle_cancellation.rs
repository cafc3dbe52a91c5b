//! Cycle cancellation example.
//!
//! Demonstrates that circular debt carries no net obligation: a cycle
//! of equal debts settles to nothing, and an unequal cycle settles to
//! the residual amounts only.

use settle_engine::core::member::MemberId;
use settle_engine::graph::flow_graph::{Edge, FlowGraph};
use settle_engine::settlement::settle::Settle;
use settle_engine::settlement::summary::SettlementSummary;

fn main() {
    println!("╔═══════════════════════════════════════════╗");
    println!("║  settle-engine: Cycle Cancellation Demo   ║");
    println!("╚═══════════════════════════════════════════╝\n");

    let ayla = MemberId::new("ayla");
    let ben = MemberId::new("ben");
    let caro = MemberId::new("caro");

    // --- Scenario 1: a perfect cycle ---
    println!("━━━ Scenario 1: Perfect Cycle ━━━\n");
    println!("  ayla → ben:  1000");
    println!("  ben  → caro: 1000");
    println!("  caro → ayla: 1000\n");

    let mut debts = FlowGraph::new();
    debts
        .add_edge(ayla.clone(), Edge::new(ben.clone(), 1_000))
        .expect("fresh graph accepts the edge");
    debts
        .add_edge(ben.clone(), Edge::new(caro.clone(), 1_000))
        .expect("fresh graph accepts the edge");
    debts
        .add_edge(caro.clone(), Edge::new(ayla.clone(), 1_000))
        .expect("fresh graph accepts the edge");

    let simplified = Settle::simplify_debt(&debts).expect("a cycle always simplifies");
    println!("  Remaining edges: {}", simplified.edge_count());
    println!("  Everyone is square.\n");

    // --- Scenario 2: an unequal cycle ---
    println!("━━━ Scenario 2: Unequal Cycle ━━━\n");
    println!("  ayla → ben:  1000");
    println!("  ben  → caro: 1000");
    println!("  caro → ayla:  400\n");

    let mut debts = FlowGraph::new();
    debts
        .add_edge(ayla.clone(), Edge::new(ben.clone(), 1_000))
        .expect("fresh graph accepts the edge");
    debts
        .add_edge(ben.clone(), Edge::new(caro.clone(), 1_000))
        .expect("fresh graph accepts the edge");
    debts
        .add_edge(caro.clone(), Edge::new(ayla.clone(), 400))
        .expect("fresh graph accepts the edge");

    let simplified = Settle::simplify_debt(&debts).expect("an unequal cycle simplifies");
    println!("  Remaining debts:");
    for (debtor, edge) in simplified.edges() {
        println!(
            "    {} owes {}: {}",
            debtor,
            edge.target(),
            edge.unused_capacity()
        );
    }
    println!();
    println!("{}", SettlementSummary::compare(&debts, &simplified));

    println!("━━━ Interpretation ━━━\n");
    println!("  The 400 that circulates through the cycle cancels without any");
    println!("  money moving. Only the residual 600 per leg needs an actual");
    println!("  payment to settle.");
}
