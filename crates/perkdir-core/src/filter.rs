//! Client-side filtering of a fetched perk collection.
//!
//! [`apply`] is pure: the same records and criteria always produce the same
//! result, in the input's relative order, regardless of earlier calls.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::perks::{fold_key, PerkRecord};

/// User-controlled narrowing of the perk listing. Empty values mean
/// "no constraint".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriteria {
    pub name_query: String,
    pub merchant_id: Option<String>,
}

impl FilterCriteria {
    #[must_use]
    pub fn with_name_query(mut self, query: impl Into<String>) -> Self {
        self.name_query = query.into();
        self
    }

    #[must_use]
    pub fn with_merchant(mut self, merchant_id: impl Into<String>) -> Self {
        self.merchant_id = Some(merchant_id.into());
        self
    }

    /// True when neither constraint is active.
    #[must_use]
    pub fn is_unconstrained(&self) -> bool {
        self.name_needle().is_none() && self.merchant_selection().is_none()
    }

    fn name_needle(&self) -> Option<String> {
        let trimmed = self.name_query.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_lowercase())
    }

    fn merchant_selection(&self) -> Option<&str> {
        self.merchant_id
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// The visible subset of a collection for one set of criteria.
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredResult<'a> {
    pub visible: Vec<&'a PerkRecord>,
    pub total_matched: usize,
    pub total_fetched: usize,
}

impl FilteredResult<'_> {
    /// `"Showing {total_matched} of {total_fetched}"`.
    #[must_use]
    pub fn summary(&self) -> String {
        summary_text(self.total_matched, self.total_fetched)
    }
}

impl fmt::Display for FilteredResult<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}

#[must_use]
pub fn summary_text(matched: usize, fetched: usize) -> String {
    format!("Showing {matched} of {fetched}")
}

/// Filters `records` by `criteria`.
///
/// - Name: case-insensitive substring of the trimmed query in the title.
///   A blank query matches every record, including untitled ones; a
///   non-blank query never matches an untitled record.
/// - Merchant: see [`MerchantTarget`]. Records without a usable merchant
///   never match an active merchant selection.
///
/// Both constraints must hold. Order is the input order.
#[must_use]
pub fn apply<'a>(records: &'a [PerkRecord], criteria: &FilterCriteria) -> FilteredResult<'a> {
    let needle = criteria.name_needle();
    let target = criteria
        .merchant_selection()
        .map(|selection| MerchantTarget::resolve(records, selection));

    let visible: Vec<&PerkRecord> = records
        .iter()
        .filter(|record| matches_name(record, needle.as_deref()))
        .filter(|record| target.as_ref().is_none_or(|t| t.matches(record)))
        .collect();

    tracing::debug!(
        name_query = %criteria.name_query,
        merchant_id = ?criteria.merchant_id,
        matched = visible.len(),
        fetched = records.len(),
        "applied perk filters"
    );

    FilteredResult {
        total_matched: visible.len(),
        total_fetched: records.len(),
        visible,
    }
}

fn matches_name(record: &PerkRecord, needle: Option<&str>) -> bool {
    let Some(needle) = needle else {
        return true;
    };
    record
        .title()
        .is_some_and(|title| title.to_lowercase().contains(needle))
}

/// A merchant selection resolved against the collection it filters.
///
/// A record matches when its merchant id equals the selection, or its
/// merchant name equals the selection, or it is name-only and its name
/// belongs to a merchant whose id equals the selection. All comparisons
/// are case-insensitive. The last rule is what lets a record that stores
/// the merchant as a bare name match a selection made by id.
struct MerchantTarget {
    selection: String,
    names: HashSet<String>,
}

impl MerchantTarget {
    fn resolve(records: &[PerkRecord], selection: &str) -> Self {
        let selection = fold_key(selection);
        let names = records
            .iter()
            .filter_map(PerkRecord::merchant)
            .filter(|m| !m.is_name_only() && fold_key(&m.id) == selection)
            .map(|m| fold_key(&m.name))
            .collect();
        Self { selection, names }
    }

    fn matches(&self, record: &PerkRecord) -> bool {
        let Some(merchant) = record.merchant() else {
            return false;
        };
        let id = fold_key(&merchant.id);
        let name = fold_key(&merchant.name);
        id == self.selection
            || name == self.selection
            || (merchant.is_name_only() && self.names.contains(&name))
    }
}

#[cfg(test)]
#[path = "filter_test.rs"]
mod tests;
