use std::collections::VecDeque;

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use tracing::debug;

use crate::balance::{compute_balance_from_group, PersonalBalance};
use crate::error::ValidationError;
use crate::schemas::{Balance, Group};

// Debts and credits below a cent are considered settled
const TOLERANCE: Decimal = dec!(0.01);

fn round_to_2_decimals(n: Decimal) -> Decimal {
    let mut rounded = n.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}

fn name_of(group: &Group, id: &str) -> String {
    group.member_name(id).unwrap_or(id).to_owned()
}

// Largest debtor pays the largest creditor first. Each creditor is dropped
// from the queue as soon as less than a cent is owed to them, and whatever
// residue is left is not carried over.
fn get_simplified_balances(
    group: &Group,
    mut payers: Vec<PersonalBalance>,
    mut receivers: Vec<PersonalBalance>,
) -> Vec<Balance> {
    // Stable sorts, so ties keep member order
    payers.sort_by(|a, b| b.balance.cmp(&a.balance));
    receivers.sort_by(|a, b| b.balance.cmp(&a.balance));
    let mut receivers = VecDeque::from(receivers);

    let mut exchanges = Vec::new();
    for payer in payers {
        let mut remaining_debt = payer.balance;
        while remaining_debt > TOLERANCE {
            let Some(receiver) = receivers.front_mut() else {
                break;
            };
            let amount = remaining_debt.min(receiver.balance);
            if amount > TOLERANCE {
                exchanges.push(Balance {
                    from: payer.id.clone(),
                    from_name: name_of(group, &payer.id),
                    to: receiver.id.clone(),
                    to_name: name_of(group, &receiver.id),
                    amount: round_to_2_decimals(amount),
                });
            }
            remaining_debt -= amount;
            receiver.balance -= amount;
            if receiver.balance < TOLERANCE {
                receivers.pop_front();
            }
        }
    }
    exchanges
}

/// Turns the group's expenses into the list of payments that settles
/// everyone's net balance.
///
/// Input is not validated: ids missing from the member list still take part
/// under their own id. Use [`calculate_balances`] for untrusted groups.
pub fn settle_group(group: &Group) -> Vec<Balance> {
    let people_balances = compute_balance_from_group(group);

    // Divide people into payers and receivers, zero balances take no part
    let mut payers = Vec::new();
    let mut receivers = Vec::new();
    for person in people_balances.iter() {
        if person.balance < Decimal::ZERO {
            payers.push(PersonalBalance {
                id: person.id.clone(),
                balance: person.balance.abs(),
            });
        } else if person.balance > Decimal::ZERO {
            receivers.push(person.clone());
        }
    }
    debug!(
        group = %group.id,
        members = people_balances.len(),
        debtors = payers.len(),
        creditors = receivers.len(),
        "Settling group"
    );

    let exchanges = get_simplified_balances(group, payers, receivers);
    debug!(group = %group.id, transactions = exchanges.len(), "Group settled");
    exchanges
}

pub fn calculate_balances(group: &Group) -> Result<Vec<Balance>, ValidationError> {
    group.validate()?;
    Ok(settle_group(group))
}
