use std::collections::HashSet;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::balance::checked_balance_from_group;
use crate::error::ValidationError;
use crate::exchange::settle_group;

pub type MemberId = String;

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Member {
    pub id: MemberId,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: String,
    pub description: String,
    pub amount: Decimal,
    pub paid_by: MemberId,
    pub split_between: Vec<MemberId>,
    pub currency: String,
    pub date: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: String,
    pub name: String,
    pub members: Vec<Member>,
    #[serde(default)]
    pub expenses: Vec<Expense>,
    pub created_at: DateTime<Utc>,
}

/// A single settling payment: `from` owes `to` the given amount.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Balance {
    pub from: MemberId,
    pub from_name: String,
    pub to: MemberId,
    pub to_name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupSummary {
    pub group_id: String,
    pub expense_count: usize,
    pub last_activity: DateTime<Utc>,
    pub currency: Option<String>,
    pub transactions: Vec<Balance>,
}

impl Group {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        members: Vec<Member>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Group {
            id: id.into(),
            name: name.into(),
            members,
            expenses: vec![],
            created_at,
        }
    }

    pub fn has_member(&self, id: &str) -> bool {
        self.members.iter().any(|member| member.id == id)
    }

    pub fn member_name(&self, id: &str) -> Option<&str> {
        self.members
            .iter()
            .find(|member| member.id == id)
            .map(|member| member.name.as_str())
    }

    pub fn add_member(&mut self, member: Member) -> Result<(), ValidationError> {
        if self.has_member(&member.id) {
            return Err(ValidationError::DuplicateMember(member.id));
        }
        self.members.push(member);
        Ok(())
    }

    pub fn add_expense(&mut self, expense: Expense) -> Result<(), ValidationError> {
        if self.expenses.iter().any(|e| e.id == expense.id) {
            return Err(ValidationError::DuplicateExpense(expense.id));
        }
        self.validate_expense(&expense)?;
        self.expenses.push(expense);
        if let Err(err) = checked_balance_from_group(self) {
            self.expenses.pop();
            return Err(err);
        }
        Ok(())
    }

    pub fn remove_expense(&mut self, expense_id: &str) -> Option<Expense> {
        let position = self.expenses.iter().position(|e| e.id == expense_id)?;
        Some(self.expenses.remove(position))
    }

    /// Checks that every expense only references members of this group, can
    /// actually be split, and keeps every balance representable.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut member_ids = HashSet::new();
        for member in &self.members {
            if !member_ids.insert(member.id.as_str()) {
                return Err(ValidationError::DuplicateMember(member.id.clone()));
            }
        }
        let mut expense_ids = HashSet::new();
        for expense in &self.expenses {
            if !expense_ids.insert(expense.id.as_str()) {
                return Err(ValidationError::DuplicateExpense(expense.id.clone()));
            }
            self.validate_expense(expense)?;
        }
        checked_balance_from_group(self)?;
        Ok(())
    }

    fn validate_expense(&self, expense: &Expense) -> Result<(), ValidationError> {
        if expense.description.trim().is_empty() {
            return Err(ValidationError::EmptyDescription {
                expense_id: expense.id.clone(),
            });
        }
        if expense.amount <= Decimal::ZERO {
            return Err(ValidationError::NonPositiveAmount {
                expense_id: expense.id.clone(),
            });
        }
        if !self.has_member(&expense.paid_by) {
            return Err(ValidationError::UnknownPayer {
                expense_id: expense.id.clone(),
                member_id: expense.paid_by.clone(),
            });
        }
        if expense.split_between.is_empty() {
            return Err(ValidationError::EmptySplit {
                expense_id: expense.id.clone(),
            });
        }
        if let Some(unknown) = expense
            .split_between
            .iter()
            .find(|id| !self.has_member(id))
        {
            return Err(ValidationError::UnknownSplitMember {
                expense_id: expense.id.clone(),
                member_id: unknown.clone(),
            });
        }
        Ok(())
    }

    pub fn expenses_newest_first(&self) -> Vec<&Expense> {
        let mut expenses: Vec<&Expense> = self.expenses.iter().collect();
        expenses.sort_by(|a, b| b.date.cmp(&a.date));
        expenses
    }

    pub fn last_activity(&self) -> DateTime<Utc> {
        self.expenses
            .iter()
            .map(|expense| expense.date)
            .max()
            .unwrap_or(self.created_at)
    }

    // Label only, amounts of different currencies are never converted
    pub fn currency(&self) -> Option<&str> {
        self.expenses.first().map(|expense| expense.currency.as_str())
    }

    pub fn summary(&self) -> Result<GroupSummary, ValidationError> {
        self.validate()?;
        Ok(GroupSummary {
            group_id: self.id.clone(),
            expense_count: self.expenses.len(),
            last_activity: self.last_activity(),
            currency: self.currency().map(str::to_owned),
            transactions: settle_group(self),
        })
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    #[test]
    fn deserializes_camel_case_group_with_numeric_amounts() {
        let json = r#"{
            "id": "g1",
            "name": "Trip",
            "members": [{"id": "a", "name": "Ann"}, {"id": "b", "name": "Bob"}],
            "expenses": [{
                "id": "e1",
                "description": "Dinner",
                "amount": 33.33,
                "paidBy": "a",
                "splitBetween": ["a", "b"],
                "currency": "EUR",
                "date": "2024-03-01T12:00:00Z"
            }],
            "createdAt": "2024-02-01T00:00:00Z"
        }"#;
        let group: Group = serde_json::from_str(json).unwrap();
        assert_eq!(group.expenses[0].amount, dec!(33.33));
        assert_eq!(group.expenses[0].paid_by, "a");
        assert_eq!(group.member_name("b"), Some("Bob"));
        assert!(group.validate().is_ok());
    }

    #[test]
    fn rejects_duplicate_member() {
        let mut group = group(&["a"]);
        assert_eq!(
            group.add_member(member("a")),
            Err(ValidationError::DuplicateMember("a".to_owned()))
        );
        group.add_member(member("b")).unwrap();
        assert_eq!(group.members.len(), 2);
    }

    #[test]
    fn add_expense_checks_references() {
        let mut group = group(&["a", "b"]);
        let err = group
            .add_expense(expense("e1", dec!(10), "z", &["a"]))
            .unwrap_err();
        assert!(matches!(err, ValidationError::UnknownPayer { .. }));

        let err = group
            .add_expense(expense("e1", dec!(10), "a", &["a", "y"]))
            .unwrap_err();
        assert_eq!(
            err,
            ValidationError::UnknownSplitMember {
                expense_id: "e1".to_owned(),
                member_id: "y".to_owned()
            }
        );

        let err = group
            .add_expense(expense("e1", dec!(10), "a", &[]))
            .unwrap_err();
        assert!(matches!(err, ValidationError::EmptySplit { .. }));

        let err = group
            .add_expense(expense("e1", dec!(0), "a", &["b"]))
            .unwrap_err();
        assert!(matches!(err, ValidationError::NonPositiveAmount { .. }));

        group
            .add_expense(expense("e1", dec!(10), "a", &["b"]))
            .unwrap();
        let err = group
            .add_expense(expense("e1", dec!(5), "b", &["a"]))
            .unwrap_err();
        assert_eq!(err, ValidationError::DuplicateExpense("e1".to_owned()));
        assert_eq!(group.expenses.len(), 1);
    }

    #[test]
    fn rejects_totals_that_overflow() {
        let mut group = group(&["a", "b"]);
        group
            .add_expense(expense("e1", Decimal::MAX, "a", &["b"]))
            .unwrap();
        assert_eq!(
            group.add_expense(expense("e2", Decimal::MAX, "a", &["b"])),
            Err(ValidationError::AmountTooLarge {
                expense_id: "e2".to_owned()
            })
        );
        assert_eq!(group.expenses.len(), 1);

        group.expenses.push(expense("e3", dec!(1), "a", &["b"]));
        assert!(matches!(
            group.validate(),
            Err(ValidationError::AmountTooLarge { .. })
        ));
    }

    #[test]
    fn remove_expense_by_id() {
        let mut group = group(&["a", "b"]);
        group
            .add_expense(expense("e1", dec!(10), "a", &["b"]))
            .unwrap();
        assert!(group.remove_expense("missing").is_none());
        let removed = group.remove_expense("e1").unwrap();
        assert_eq!(removed.id, "e1");
        assert!(group.expenses.is_empty());
    }

    #[test]
    fn last_activity_falls_back_to_creation() {
        let mut group = group(&["a", "b"]);
        assert_eq!(group.last_activity(), group.created_at);
        assert_eq!(group.currency(), None);

        let mut late = expense("e2", dec!(4), "b", &["a"]);
        late.date = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        late.currency = "EUR".to_owned();
        group
            .add_expense(expense("e1", dec!(10), "a", &["b"]))
            .unwrap();
        group.add_expense(late.clone()).unwrap();

        assert_eq!(group.last_activity(), late.date);
        assert_eq!(group.currency(), Some("USD"));
        let ids: Vec<&str> = group
            .expenses_newest_first()
            .iter()
            .map(|e| e.id.as_str())
            .collect();
        assert_eq!(ids, vec!["e2", "e1"]);
    }

    #[test]
    fn summary_includes_transactions() {
        let mut group = group(&["a", "b"]);
        group
            .add_expense(expense("e1", dec!(100), "a", &["a", "b"]))
            .unwrap();
        let summary = group.summary().unwrap();
        assert_eq!(summary.expense_count, 1);
        assert_eq!(summary.currency.as_deref(), Some("USD"));
        assert_eq!(summary.transactions.len(), 1);
        assert_eq!(summary.transactions[0].amount, dec!(50));
    }
}
