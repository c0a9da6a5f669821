use std::collections::HashMap;

use rust_decimal::Decimal;

use crate::error::ValidationError;
use crate::schemas::{Group, MemberId};

#[derive(Clone, Debug, PartialEq)]
pub struct PersonalBalance {
    pub id: MemberId,
    pub balance: Decimal,
}

/// Net balance (paid minus owed) per member, kept in member order.
///
/// Ids that are referenced by an expense but missing from the member list
/// are appended after the members in the order they are first seen.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NetBalances {
    balances: Vec<PersonalBalance>,
    index: HashMap<MemberId, usize>,
}

impl NetBalances {
    fn entry(&mut self, id: &str) -> &mut Decimal {
        let position = match self.index.get(id) {
            Some(&position) => position,
            None => {
                self.balances.push(PersonalBalance {
                    id: id.to_owned(),
                    balance: Decimal::ZERO,
                });
                self.index.insert(id.to_owned(), self.balances.len() - 1);
                self.balances.len() - 1
            }
        };
        &mut self.balances[position].balance
    }

    pub fn get(&self, id: &str) -> Option<Decimal> {
        self.index.get(id).map(|&position| self.balances[position].balance)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PersonalBalance> {
        self.balances.iter()
    }

    pub fn len(&self) -> usize {
        self.balances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.balances.is_empty()
    }

    pub fn total(&self) -> Decimal {
        self.balances.iter().map(|person| person.balance).sum()
    }
}

#[derive(Clone, Copy, PartialEq)]
enum Overflow {
    Saturate,
    Reject,
}

fn apply(slot: &mut Decimal, delta: Decimal, overflow: Overflow) -> bool {
    match (slot.checked_add(delta), overflow) {
        (Some(sum), _) => *slot = sum,
        (None, Overflow::Saturate) => *slot = slot.saturating_add(delta),
        (None, Overflow::Reject) => return false,
    }
    true
}

// Err carries the id of the expense whose amount did not fit
fn accumulate(group: &Group, overflow: Overflow) -> Result<NetBalances, String> {
    let mut balances = NetBalances::default();
    for member in &group.members {
        balances.entry(&member.id);
    }
    for expense in &group.expenses {
        let amount = expense.amount;
        if !apply(balances.entry(&expense.paid_by), amount, overflow) {
            return Err(expense.id.clone());
        }
        // An empty split has no one to charge
        let Some(amount_per_receiver) =
            amount.checked_div(Decimal::from(expense.split_between.len()))
        else {
            continue;
        };
        for receiver in &expense.split_between {
            if !apply(balances.entry(receiver), -amount_per_receiver, overflow) {
                return Err(expense.id.clone());
            }
        }
    }
    Ok(balances)
}

/// Net balances of the group. Totals that do not fit in a `Decimal`
/// saturate instead of panicking.
pub fn compute_balance_from_group(group: &Group) -> NetBalances {
    accumulate(group, Overflow::Saturate).unwrap_or_default()
}

pub fn checked_balance_from_group(group: &Group) -> Result<NetBalances, ValidationError> {
    accumulate(group, Overflow::Reject)
        .map_err(|expense_id| ValidationError::AmountTooLarge { expense_id })
}
