//! Payment fulfillment allocation.
//!
//! Whole accounts are the unit of transfer — items cannot be split out of an
//! account mid-trade — so covering an asking price is a set-cover-style
//! decision, not a knapsack optimum. The engine runs a greedy first-fit pass
//! over the accounts **in the order supplied by the caller**: minimality of
//! the selected set is not guaranteed, and an adversarial ordering can select
//! a strict superset of a smaller feasible set. That trade-off buys a single
//! linear scan.
//!
//! Callers wanting determinism supply a deterministic order; the settlement
//! coordinator passes accounts ascending by id.

use std::collections::BTreeMap;

use realmtrade_types::{Account, AccountId, ItemType, MarketError, Price, Result};

/// The first per-item deficit found when a buyer's aggregate holdings are
/// checked against a price.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shortfall {
    pub item_type: ItemType,
    pub held: u32,
    pub required: u32,
}

/// Aggregate feasibility pre-check.
///
/// Counts each required item type across **all** supplied accounts and
/// returns the first deficit in price order, independent of how a later
/// greedy pass would walk the accounts. This is what makes the
/// insufficient-items error precise: it reports true aggregate shortage,
/// not a quirk of allocation order.
#[must_use]
pub fn aggregate_shortfall(accounts: &[Account], price: &Price) -> Option<Shortfall> {
    for required in price.iter() {
        let held: u32 = accounts
            .iter()
            .map(|a| a.count_of(&required.item_type))
            .sum();
        if held < required.quantity {
            return Some(Shortfall {
                item_type: required.item_type.clone(),
                held,
                required: required.quantity,
            });
        }
    }
    None
}

/// Greedy first-fit allocation of whole accounts against a price.
///
/// Walks the accounts in the supplied order, taking each account that
/// contributes at least one still-needed item, until nothing is owed. An
/// account's full relevant holdings count toward the requirement the moment
/// it is selected.
///
/// Feasibility is order-relative: a different ordering may cover a price
/// this one cannot. Returns the selected account ids in scan order; the set
/// is empty when the price requires no items.
///
/// # Errors
/// Returns [`MarketError::AllocationInfeasible`] if the scan exhausts every
/// account with requirements still open.
pub fn allocate(accounts: &[Account], price: &Price) -> Result<Vec<AccountId>> {
    let mut remaining: BTreeMap<ItemType, u32> = price.as_needs();
    remaining.retain(|_, qty| *qty > 0);

    let mut selected = Vec::new();
    for account in accounts {
        if remaining.is_empty() {
            break;
        }

        let mut contributed = false;
        for (item_type, needed) in &mut remaining {
            let held = account.count_of(item_type);
            if held > 0 {
                *needed = needed.saturating_sub(held);
                contributed = true;
            }
        }
        remaining.retain(|_, qty| *qty > 0);

        if contributed {
            selected.push(account.id);
        }
    }

    if remaining.is_empty() {
        Ok(selected)
    } else {
        Err(MarketError::AllocationInfeasible)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use realmtrade_types::{RequiredItem, UserId};

    fn price(lines: &[(&str, u32)]) -> Price {
        Price::new(
            lines
                .iter()
                .map(|&(t, q)| RequiredItem::new(t, q))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn single_account_covers_price() {
        let buyer = UserId::new();
        let y = Account::dummy(buyer, "Y", &["Potion of Attack", "Potion of Attack", "Sword"]);
        let selected = allocate(&[y.clone()], &price(&[("Potion of Attack", 2)])).unwrap();
        assert_eq!(selected, vec![y.id]);
    }

    #[test]
    fn requirement_spans_accounts() {
        let buyer = UserId::new();
        let y1 = Account::dummy(buyer, "Y1", &["Potion of Attack"]);
        let y2 = Account::dummy(buyer, "Y2", &["Potion of Attack"]);
        let selected =
            allocate(&[y1.clone(), y2.clone()], &price(&[("Potion of Attack", 2)])).unwrap();
        assert_eq!(selected, vec![y1.id, y2.id]);
    }

    #[test]
    fn non_contributing_accounts_skipped() {
        let buyer = UserId::new();
        let junk = Account::dummy(buyer, "Junk", &["Pebble"]);
        let useful = Account::dummy(buyer, "Useful", &["Sword"]);
        let selected = allocate(&[junk, useful.clone()], &price(&[("Sword", 1)])).unwrap();
        assert_eq!(selected, vec![useful.id]);
    }

    #[test]
    fn scan_stops_once_covered() {
        let buyer = UserId::new();
        let y1 = Account::dummy(buyer, "Y1", &["Sword"]);
        let y2 = Account::dummy(buyer, "Y2", &["Sword"]);
        let selected = allocate(&[y1.clone(), y2], &price(&[("Sword", 1)])).unwrap();
        assert_eq!(selected, vec![y1.id]);
    }

    #[test]
    fn empty_price_selects_nothing() {
        let buyer = UserId::new();
        let y = Account::dummy(buyer, "Y", &["Sword"]);
        let selected = allocate(&[y], &Price::free()).unwrap();
        assert!(selected.is_empty());
    }

    #[test]
    fn infeasible_when_aggregate_short() {
        let buyer = UserId::new();
        let y = Account::dummy(buyer, "Y", &["Potion of Attack"]);
        let err = allocate(&[y], &price(&[("Potion of Attack", 2)])).unwrap_err();
        assert!(matches!(err, MarketError::AllocationInfeasible));
    }

    #[test]
    fn greedy_can_overselect_but_still_covers() {
        // First account contributes one of each type, dragging it into the
        // selection even though the second account alone would suffice.
        let buyer = UserId::new();
        let mixed = Account::dummy(buyer, "Mixed", &["Sword", "Shield"]);
        let full = Account::dummy(buyer, "Full", &["Sword", "Sword", "Shield", "Shield"]);
        let selected = allocate(
            &[mixed.clone(), full.clone()],
            &price(&[("Sword", 2), ("Shield", 2)]),
        )
        .unwrap();
        assert_eq!(selected, vec![mixed.id, full.id]);
    }

    #[test]
    fn aggregate_shortfall_reports_first_deficit_in_price_order() {
        let buyer = UserId::new();
        let y = Account::dummy(buyer, "Y", &["Potion of Attack"]);
        let shortfall =
            aggregate_shortfall(&[y], &price(&[("Potion of Attack", 2), ("Sword", 1)])).unwrap();
        assert_eq!(shortfall.item_type, "Potion of Attack");
        assert_eq!(shortfall.held, 1);
        assert_eq!(shortfall.required, 2);
    }

    #[test]
    fn aggregate_shortfall_sums_across_accounts() {
        let buyer = UserId::new();
        let y1 = Account::dummy(buyer, "Y1", &["Potion of Attack"]);
        let y2 = Account::dummy(buyer, "Y2", &["Potion of Attack"]);
        assert!(aggregate_shortfall(&[y1, y2], &price(&[("Potion of Attack", 2)])).is_none());
    }

    #[test]
    fn selection_always_covers_price() {
        // Randomized coverage property: whenever allocate succeeds, the
        // selected accounts hold at least the required count of every item.
        use rand::Rng;
        let mut rng = rand::thread_rng();
        let types = ["A", "B", "C"];

        for _ in 0..200 {
            let buyer = UserId::new();
            let accounts: Vec<Account> = (0..rng.gen_range(1..5))
                .map(|i| {
                    let items: Vec<&str> = (0..rng.gen_range(0..6))
                        .map(|_| types[rng.gen_range(0..types.len())])
                        .collect();
                    Account::dummy(buyer, &format!("R{i}"), &items)
                })
                .collect();
            let price = price(&[("A", rng.gen_range(1..4)), ("B", rng.gen_range(1..3))]);

            if let Ok(selected) = allocate(&accounts, &price) {
                for required in price.iter() {
                    let covered: u32 = accounts
                        .iter()
                        .filter(|a| selected.contains(&a.id))
                        .map(|a| a.count_of(&required.item_type))
                        .sum();
                    assert!(
                        covered >= required.quantity,
                        "selected set under-covers {}",
                        required.item_type
                    );
                }
            }
        }
    }
}
