use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Split method as it appears on the wire.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SplitMethod {
    #[default]
    Equal,
    ExactAmounts,
    Percentages,
    Shares,
}

pub mod ledger {
    use super::*;

    /// A whole group ledger as exported by the storage layer.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct GroupLedger {
        pub name: Option<String>,
        /// ISO currency code, informational only.
        pub currency: Option<String>,
        pub members: Vec<MemberRecord>,
        #[serde(default)]
        pub expenses: Vec<ExpenseRecord>,
        #[serde(default)]
        pub settlements: Vec<SettlementRecord>,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct MemberRecord {
        pub id: String,
        pub name: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseRecord {
        pub id: Option<String>,
        pub description: Option<String>,
        pub paid_by: String,
        /// Decimal string, e.g. `"45.00"`.
        pub total: String,
        #[serde(default)]
        pub split_method: SplitMethod,
        pub participants: Vec<ParticipantRecord>,
        pub expense_date: Option<NaiveDate>,
        /// Soft-deleted expenses are kept in exports but never counted.
        #[serde(default)]
        pub deleted: bool,
    }

    /// Loose participant shape: at most one of the optional fields should be
    /// set, matching the expense's split method.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ParticipantRecord {
        pub member: String,
        /// Decimal string, for `EXACT_AMOUNTS`.
        pub amount: Option<String>,
        pub percent: Option<u8>,
        pub shares: Option<u32>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SettlementRecord {
        pub from: String,
        pub to: String,
        /// Decimal string, e.g. `"15.00"`.
        pub amount: String,
        pub settled_on: Option<NaiveDate>,
    }
}

pub mod report {
    use super::*;

    #[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct SplitLineView {
        pub member: String,
        pub owed_minor: i64,
    }

    #[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct SplitView {
        pub split_method: SplitMethod,
        pub total_minor: i64,
        pub lines: Vec<SplitLineView>,
    }

    #[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct BalanceView {
        pub member: String,
        /// Display name, when the member is declared with one.
        pub name: Option<String>,
        /// Positive: the group owes this member.
        pub net_minor: i64,
    }

    #[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct SuggestionView {
        pub from: String,
        pub to: String,
        pub amount_minor: i64,
    }

    #[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct LedgerReport {
        pub name: Option<String>,
        pub currency: Option<String>,
        pub as_of: Option<NaiveDate>,
        pub balances: Vec<BalanceView>,
        /// Absent when only balances were requested.
        #[serde(skip_serializing_if = "Option::is_none")]
        pub suggestions: Option<Vec<SuggestionView>>,
    }
}
