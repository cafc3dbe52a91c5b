use crate::core::member::MemberId;
use crate::graph::flow_graph::{Amount, Edge, FlowGraph, GraphError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// A single ledger row: `debtor` owes `creditor` an `amount` in minor units.
///
/// Transactions are immutable once created. The settlement engine never reads
/// them directly; a [`TransactionSet`] aggregates them into the debt graph the
/// engine operates on.
///
/// # Examples
///
/// ```
/// use settle_engine::core::member::MemberId;
/// use settle_engine::core::transaction::Transaction;
///
/// let tx = Transaction::new(MemberId::new("ayla"), MemberId::new("ben"), 1_250)
///     .with_reference("groceries");
///
/// assert_eq!(tx.amount(), 1_250);
/// assert_eq!(tx.reference(), Some("groceries"));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique identifier for this transaction.
    id: Uuid,
    /// The member that owes the amount.
    debtor: MemberId,
    /// The member that is owed the amount.
    creditor: MemberId,
    /// The amount owed, in minor units (pence). Must be positive.
    amount: Amount,
    /// When this transaction was recorded.
    created_at: DateTime<Utc>,
    /// Optional reference or memo.
    reference: Option<String>,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// # Panics
    ///
    /// Panics if `amount` is zero or if `debtor` equals `creditor`.
    pub fn new(debtor: MemberId, creditor: MemberId, amount: Amount) -> Self {
        assert!(amount > 0, "Transaction amount must be positive");
        assert!(
            debtor != creditor,
            "Transaction debtor and creditor must differ, got {} for both",
            debtor
        );
        Self {
            id: Uuid::new_v4(),
            debtor,
            creditor,
            amount,
            created_at: Utc::now(),
            reference: None,
        }
    }

    /// Create a transaction with a specific ID (useful for testing / determinism).
    pub fn with_id(id: Uuid, debtor: MemberId, creditor: MemberId, amount: Amount) -> Self {
        assert!(amount > 0, "Transaction amount must be positive");
        assert!(debtor != creditor, "Transaction debtor and creditor must differ");
        Self {
            id,
            debtor,
            creditor,
            amount,
            created_at: Utc::now(),
            reference: None,
        }
    }

    /// Set a reference string.
    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    // --- Accessors ---

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn debtor(&self) -> &MemberId {
        &self.debtor
    }

    pub fn creditor(&self) -> &MemberId {
        &self.creditor
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn reference(&self) -> Option<&str> {
        self.reference.as_deref()
    }
}

/// A collection of ledger transactions for one household.
///
/// This is the aggregation boundary between raw ledger rows and the flow
/// graph: [`TransactionSet::to_debt_graph`] nets every row for an ordered
/// `(debtor, creditor)` pair into a single edge capacity.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransactionSet {
    transactions: Vec<Transaction>,
}

impl TransactionSet {
    pub fn new() -> Self {
        Self {
            transactions: Vec::new(),
        }
    }

    pub fn add(&mut self, transaction: Transaction) {
        self.transactions.push(transaction);
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Total gross value of all transactions, in minor units.
    pub fn gross_total(&self) -> Amount {
        self.transactions.iter().map(|t| t.amount()).sum()
    }

    /// All unique members referenced in this set, sorted.
    pub fn members(&self) -> Vec<MemberId> {
        let mut members: Vec<MemberId> = self
            .transactions
            .iter()
            .flat_map(|t| vec![t.debtor().clone(), t.creditor().clone()])
            .collect();
        members.sort();
        members.dedup();
        members
    }

    /// Aggregate this set into a debt graph.
    ///
    /// All rows for the same ordered `(debtor, creditor)` pair sum into one
    /// edge capacity. Opposite-direction debt is deliberately kept as two
    /// separate edges; netting those against each other is the settlement
    /// engine's job. Vertices are registered in sorted member order and edges
    /// in sorted pair order, so the resulting graph is deterministic.
    pub fn to_debt_graph(&self) -> Result<FlowGraph, GraphError> {
        let mut totals: BTreeMap<(MemberId, MemberId), Amount> = BTreeMap::new();
        for tx in &self.transactions {
            *totals
                .entry((tx.debtor().clone(), tx.creditor().clone()))
                .or_insert(0) += tx.amount();
        }

        let mut graph = FlowGraph::with_vertices(self.members());
        for ((debtor, creditor), amount) in totals {
            graph.add_edge(debtor, Edge::new(creditor, amount))?;
        }
        Ok(graph)
    }
}

impl FromIterator<Transaction> for TransactionSet {
    fn from_iter<T: IntoIterator<Item = Transaction>>(iter: T) -> Self {
        Self {
            transactions: iter.into_iter().collect(),
        }
    }
}
