//! settle-engine CLI
//!
//! Simplify a household debt network from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Simplify transactions from a JSON file
//! settle-engine simplify --input transactions.json
//!
//! # Output as JSON
//! settle-engine simplify --input transactions.json --format json
//!
//! # Generate a random network for testing
//! settle-engine generate --members 8 --transactions 24
//! ```

use settle_engine::core::member::MemberId;
use settle_engine::core::transaction::{Transaction, TransactionSet};
use settle_engine::graph::flow_graph::FlowGraph;
use settle_engine::settlement::settle::{Settle, SettleError};
use settle_engine::settlement::summary::SettlementSummary;
use settle_engine::simulation::stress_test::{generate_transactions, NetworkConfig};
use std::fs;
use std::process;

fn print_usage() {
    eprintln!(
        r#"settle-engine — household debt-network simplification via maximum flow

USAGE:
    settle-engine <COMMAND> [OPTIONS]

COMMANDS:
    simplify    Simplify a debt network built from a transaction file
    generate    Generate a random transaction network (for testing)
    help        Show this message

OPTIONS (simplify):
    --input <FILE>       Path to JSON transactions file
    --format <FORMAT>    Output format: text (default) or json

OPTIONS (generate):
    --members <N>        Number of members (default: 8)
    --transactions <N>   Number of transactions (default: 24)
    --seed <N>           Fixed RNG seed (default: entropy)
    --output <FILE>      Write to file instead of stdout

EXAMPLES:
    settle-engine simplify --input transactions.json
    settle-engine simplify --input transactions.json --format json
    settle-engine generate --members 5 --transactions 15 --seed 42
    settle-engine generate --members 20 --output test.json"#
    );
}

/// JSON schema for input transactions. Amounts are integer minor units.
#[derive(serde::Deserialize)]
struct TransactionInput {
    from: String,
    to: String,
    amount: u64,
    #[serde(default)]
    reference: Option<String>,
}

#[derive(serde::Deserialize)]
struct TransactionsFile {
    transactions: Vec<TransactionInput>,
}

/// JSON output schema for simplification results.
#[derive(serde::Serialize)]
struct SettleOutput {
    members: usize,
    edges_before: usize,
    edges_after: usize,
    gross_before: u64,
    gross_after: u64,
    debt_cleared: u64,
    reduction_percent: f64,
    debts: Vec<DebtOutput>,
}

#[derive(serde::Serialize)]
struct DebtOutput {
    from: String,
    to: String,
    amount: u64,
}

fn load_transactions(path: &str) -> TransactionSet {
    let content = fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading file '{}': {}", path, e);
        process::exit(1);
    });

    let file: TransactionsFile = serde_json::from_str(&content).unwrap_or_else(|e| {
        eprintln!("Error parsing JSON: {}", e);
        eprintln!("Expected format:");
        eprintln!(
            r#"{{
  "transactions": [
    {{ "from": "ayla", "to": "ben", "amount": 1250, "reference": "groceries" }}
  ]
}}"#
        );
        process::exit(1);
    });

    let mut set = TransactionSet::new();
    for tx in file.transactions {
        if tx.amount == 0 {
            eprintln!("Invalid transaction {} -> {}: amount must be positive", tx.from, tx.to);
            process::exit(1);
        }
        if tx.from == tx.to {
            eprintln!("Invalid transaction: '{}' cannot owe themselves", tx.from);
            process::exit(1);
        }
        let mut transaction =
            Transaction::new(MemberId::new(&tx.from), MemberId::new(&tx.to), tx.amount);
        if let Some(reference) = tx.reference {
            transaction = transaction.with_reference(reference);
        }
        set.add(transaction);
    }
    set
}

fn debts_of(graph: &FlowGraph) -> Vec<DebtOutput> {
    let mut debts: Vec<DebtOutput> = graph
        .edges()
        .into_iter()
        .map(|(src, edge)| DebtOutput {
            from: src.to_string(),
            to: edge.target().to_string(),
            amount: edge.unused_capacity(),
        })
        .collect();
    debts.sort_by(|a, b| (&a.from, &a.to).cmp(&(&b.from, &b.to)));
    debts
}

fn cmd_simplify(args: &[String]) {
    let mut input_path = None;
    let mut format = "text".to_string();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--input" => {
                i += 1;
                input_path = Some(args.get(i).cloned().unwrap_or_else(|| {
                    eprintln!("--input requires a file path");
                    process::exit(1);
                }));
            }
            "--format" => {
                i += 1;
                format = args.get(i).cloned().unwrap_or_else(|| {
                    eprintln!("--format requires 'text' or 'json'");
                    process::exit(1);
                });
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
        i += 1;
    }

    let path = input_path.unwrap_or_else(|| {
        eprintln!("Error: --input <FILE> is required");
        process::exit(1);
    });

    let set = load_transactions(&path);
    let debts = set.to_debt_graph().unwrap_or_else(|e| {
        eprintln!("Error building debt graph: {}", e);
        process::exit(1);
    });

    let simplified = match Settle::simplify_debt(&debts) {
        Ok(graph) => graph,
        Err(SettleError::NoSimplification) => {
            // nothing to net; report the input unchanged
            println!("The debt network is already minimal; no simplifications were made.");
            debts.clone()
        }
        Err(e) => {
            eprintln!("Settlement failed: {}", e);
            process::exit(1);
        }
    };

    let summary = SettlementSummary::compare(&debts, &simplified);

    if format == "json" {
        let output = SettleOutput {
            members: summary.member_count,
            edges_before: summary.edges_before,
            edges_after: summary.edges_after,
            gross_before: summary.gross_before,
            gross_after: summary.gross_after,
            debt_cleared: summary.debt_cleared(),
            reduction_percent: summary.reduction_percent(),
            debts: debts_of(&simplified),
        };
        match serde_json::to_string_pretty(&output) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error encoding output: {}", e);
                process::exit(1);
            }
        }
    } else {
        let debts_out = debts_of(&simplified);
        if debts_out.is_empty() {
            println!("All debts settled — nobody owes anything.");
        } else {
            println!("Remaining debts:");
            for debt in &debts_out {
                println!("  {} owes {}: {}", debt.from, debt.to, debt.amount);
            }
        }
        println!();
        println!("{}", summary);
    }
}

fn cmd_generate(args: &[String]) {
    let mut members = 8usize;
    let mut transaction_count = 24usize;
    let mut seed: Option<u64> = None;
    let mut output_path: Option<String> = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--members" => {
                i += 1;
                members = args.get(i).and_then(|s| s.parse().ok()).unwrap_or_else(|| {
                    eprintln!("--members requires a number");
                    process::exit(1);
                });
            }
            "--transactions" => {
                i += 1;
                transaction_count =
                    args.get(i).and_then(|s| s.parse().ok()).unwrap_or_else(|| {
                        eprintln!("--transactions requires a number");
                        process::exit(1);
                    });
            }
            "--seed" => {
                i += 1;
                seed = Some(args.get(i).and_then(|s| s.parse().ok()).unwrap_or_else(|| {
                    eprintln!("--seed requires a number");
                    process::exit(1);
                }));
            }
            "--output" => {
                i += 1;
                output_path = Some(args.get(i).cloned().unwrap_or_else(|| {
                    eprintln!("--output requires a file path");
                    process::exit(1);
                }));
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
        i += 1;
    }

    if members < 2 {
        eprintln!("--members must be at least 2");
        process::exit(1);
    }

    let config = NetworkConfig {
        member_count: members,
        seed,
        ..Default::default()
    };

    let set = generate_transactions(&config, transaction_count);

    #[derive(serde::Serialize)]
    struct OutputTransaction {
        from: String,
        to: String,
        amount: u64,
    }

    #[derive(serde::Serialize)]
    struct OutputFile {
        transactions: Vec<OutputTransaction>,
    }

    let output = OutputFile {
        transactions: set
            .transactions()
            .iter()
            .map(|tx| OutputTransaction {
                from: tx.debtor().to_string(),
                to: tx.creditor().to_string(),
                amount: tx.amount(),
            })
            .collect(),
    };

    let json = match serde_json::to_string_pretty(&output) {
        Ok(json) => json,
        Err(e) => {
            eprintln!("Error encoding output: {}", e);
            process::exit(1);
        }
    };

    if let Some(path) = output_path {
        fs::write(&path, &json).unwrap_or_else(|e| {
            eprintln!("Error writing to '{}': {}", path, e);
            process::exit(1);
        });
        eprintln!(
            "Generated {} transactions across {} members → {}",
            set.len(),
            members,
            path
        );
    } else {
        println!("{}", json);
    }
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let command = args[1].as_str();
    let rest = &args[2..];

    match command {
        "simplify" => cmd_simplify(rest),
        "generate" => cmd_generate(rest),
        "help" | "--help" | "-h" => print_usage(),
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            process::exit(1);
        }
    }
}
