//! Merchant selector options derived from a fetched perk collection.

use std::collections::HashMap;

use serde::Serialize;

use crate::perks::{fold_key, PerkRecord};

/// One entry of the merchant selector.
///
/// `id` is the value a selector binds to and is always what
/// [`crate::FilterCriteria::merchant_id`] should be set to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MerchantOption {
    pub id: String,
    pub label: String,
}

/// Returns the distinct merchants present in `records`, in first-seen order.
///
/// Identity is the merchant id when the source carries one. A name-only
/// merchant (bare string, or an object with just a name) folds into an
/// option with the same name or id, and an option created from a name-only
/// reference adopts the real id and name of the first record whose name or
/// id equals that reference. Records without a usable merchant or title are
/// skipped.
#[must_use]
pub fn derive_options(records: &[PerkRecord]) -> Vec<MerchantOption> {
    let mut options: Vec<MerchantOption> = Vec::new();
    let mut by_id: HashMap<String, usize> = HashMap::new();
    let mut by_name: HashMap<String, usize> = HashMap::new();
    // Options still keyed by a name, waiting for a real id.
    let mut provisional: HashMap<String, usize> = HashMap::new();
    let mut skipped = 0usize;

    for record in records {
        let Some(merchant) = record.merchant().filter(|_| record.title().is_some()) else {
            skipped += 1;
            continue;
        };
        let id_key = fold_key(&merchant.id);
        let name_key = fold_key(&merchant.name);

        if merchant.is_name_only() {
            if by_name.contains_key(&name_key) || by_id.contains_key(&id_key) {
                continue;
            }
            let idx = options.len();
            options.push(MerchantOption {
                id: merchant.id,
                label: merchant.name,
            });
            by_name.insert(name_key.clone(), idx);
            provisional.insert(name_key, idx);
            continue;
        }

        if by_id.contains_key(&id_key) {
            continue;
        }

        // A name-only option may have been created from this merchant's name
        // or from a bare reference to its id.
        let adopted = provisional
            .remove(&name_key)
            .or_else(|| provisional.remove(&id_key));
        if let Some(idx) = adopted {
            let option = &mut options[idx];
            option.id = merchant.id;
            option.label = merchant.name;
            by_id.insert(id_key, idx);
            by_name.entry(name_key).or_insert(idx);
            continue;
        }

        let idx = options.len();
        options.push(MerchantOption {
            id: merchant.id,
            label: merchant.name,
        });
        by_id.insert(id_key, idx);
        by_name.entry(name_key).or_insert(idx);
    }

    if skipped > 0 {
        tracing::debug!(skipped, "records without a usable merchant left out of options");
    }

    options
}

/// Finds the option a merchant selection refers to, folding case and
/// surrounding whitespace the same way the filter engine does. An id match
/// wins over a label match.
#[must_use]
pub fn find_option<'a>(
    options: &'a [MerchantOption],
    selection: &str,
) -> Option<&'a MerchantOption> {
    let selection = fold_key(selection);
    options
        .iter()
        .find(|o| fold_key(&o.id) == selection)
        .or_else(|| options.iter().find(|o| fold_key(&o.label) == selection))
}

#[cfg(test)]
#[path = "merchants_test.rs"]
mod tests;
