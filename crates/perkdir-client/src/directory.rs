//! The perk directory page: one fetch, then synchronous filtering.
//!
//! `DirectoryView` owns a [`FetchController`], folds its state into a
//! [`DirectoryRender`], and recomputes the listing on every criteria change.
//! Criteria changes never touch the network and never move the page back to
//! loading.

use chrono::{DateTime, Utc};
use perkdir_core::{
    apply, derive_options, FilterCriteria, FilteredResult, MerchantOption, PerkRecord,
};
use serde::Serialize;

use crate::controller::{FetchController, FetchState, PerkSnapshot};
use crate::error::DirectoryError;
use crate::source::PerkSource;

const UNTITLED: &str = "Untitled perk";
const UNKNOWN_MERCHANT: &str = "Unknown merchant";
const NO_MATCHES: &str = "No perks match your filters.";
const NOTHING_FETCHED: &str = "No perks available.";

/// Page-level lifecycle. `Ready` is terminal; filter changes stay in it.
///
/// A view starts its fetch when mounted, so there is no state before
/// `Loading`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageState {
    Loading,
    Error,
    Ready,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerkCard {
    pub id: Option<String>,
    pub title: String,
    pub merchant: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl PerkCard {
    fn from_record(record: &PerkRecord) -> Self {
        Self {
            id: record.id.clone(),
            title: record.title().unwrap_or(UNTITLED).to_owned(),
            merchant: record
                .merchant()
                .map_or_else(|| UNKNOWN_MERCHANT.to_owned(), |m| m.name),
            description: record.description.clone(),
        }
    }
}

/// What the page shows once the collection is loaded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Listing {
    /// `"Showing {matched} of {fetched}"`.
    pub summary: String,
    pub total_matched: usize,
    pub total_fetched: usize,
    /// When the collection behind this listing was fetched.
    pub fetched_at: DateTime<Utc>,
    pub name_query: String,
    pub selected_merchant: Option<String>,
    /// Selector options; each option's `id` is the value to select.
    pub options: Vec<MerchantOption>,
    pub cards: Vec<PerkCard>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empty_message: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum DirectoryRender {
    Loading,
    Error { reason: String },
    Ready(Listing),
}

pub struct DirectoryView<S> {
    controller: FetchController<S>,
    criteria: FilterCriteria,
    snapshot: Option<PerkSnapshot>,
    options: Vec<MerchantOption>,
    render: DirectoryRender,
}

impl<S: PerkSource> DirectoryView<S> {
    /// Builds the view and starts the single fetch.
    ///
    /// Must be called from within a tokio runtime.
    pub fn mount(source: S) -> Self {
        let mut controller = FetchController::new(source);
        controller.activate();
        Self {
            controller,
            criteria: FilterCriteria::default(),
            snapshot: None,
            options: Vec::new(),
            render: DirectoryRender::Loading,
        }
    }
}

impl<S> DirectoryView<S> {
    /// Waits for the fetch to finish, then folds its result into the view.
    pub async fn settle(&mut self) -> &DirectoryRender {
        self.controller.settled().await;
        self.sync();
        &self.render
    }

    /// Folds the controller's current state into the view. Returns whether
    /// the rendered output changed.
    pub fn sync(&mut self) -> bool {
        if self.snapshot.is_some() {
            return false;
        }
        match self.controller.state() {
            FetchState::Idle | FetchState::Loading => false,
            FetchState::Error(reason) => {
                let next = DirectoryRender::Error { reason };
                let changed = self.render != next;
                self.render = next;
                changed
            }
            FetchState::Ready(snapshot) => {
                self.options = derive_options(snapshot.records());
                self.snapshot = Some(snapshot);
                self.recompute();
                true
            }
        }
    }

    /// State of the page as last synced, always in agreement with
    /// [`DirectoryView::render`].
    #[must_use]
    pub fn page_state(&self) -> PageState {
        match self.render {
            DirectoryRender::Loading => PageState::Loading,
            DirectoryRender::Error { .. } => PageState::Error,
            DirectoryRender::Ready(_) => PageState::Ready,
        }
    }

    #[must_use]
    pub fn render(&self) -> &DirectoryRender {
        &self.render
    }

    #[must_use]
    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    /// Merchant options; empty until the collection has loaded.
    #[must_use]
    pub fn options(&self) -> &[MerchantOption] {
        &self.options
    }

    /// Filters the loaded collection with the current criteria.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::NotReady`] before a successful fetch.
    pub fn filtered(&self) -> Result<FilteredResult<'_>, DirectoryError> {
        let snapshot = self.snapshot.as_ref().ok_or(DirectoryError::NotReady)?;
        Ok(apply(snapshot.records(), &self.criteria))
    }

    /// Sets the name filter and re-renders.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::NotReady`] before a successful fetch.
    pub fn set_name_query(&mut self, query: impl Into<String>) -> Result<(), DirectoryError> {
        self.ensure_ready()?;
        self.criteria.name_query = query.into();
        self.recompute();
        Ok(())
    }

    /// Selects a merchant by option id (`None` clears the selection) and
    /// re-renders.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::NotReady`] before a successful fetch.
    pub fn set_merchant(&mut self, merchant_id: Option<String>) -> Result<(), DirectoryError> {
        self.ensure_ready()?;
        self.criteria.merchant_id = merchant_id;
        self.recompute();
        Ok(())
    }

    /// Resets both filters and re-renders.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::NotReady`] before a successful fetch.
    pub fn clear_filters(&mut self) -> Result<(), DirectoryError> {
        self.ensure_ready()?;
        self.criteria = FilterCriteria::default();
        self.recompute();
        Ok(())
    }

    /// Stops the fetch if it is still pending. The view keeps whatever it
    /// last rendered.
    pub fn teardown(&mut self) {
        self.controller.teardown();
    }

    fn ensure_ready(&mut self) -> Result<(), DirectoryError> {
        self.sync();
        if self.snapshot.is_some() {
            Ok(())
        } else {
            Err(DirectoryError::NotReady)
        }
    }

    fn recompute(&mut self) {
        let Some(snapshot) = self.snapshot.as_ref() else {
            return;
        };
        let result = apply(snapshot.records(), &self.criteria);
        let cards: Vec<PerkCard> = result
            .visible
            .iter()
            .map(|record| PerkCard::from_record(record))
            .collect();

        let empty_message = match (cards.is_empty(), result.total_fetched) {
            (false, _) => None,
            (true, 0) => Some(NOTHING_FETCHED),
            (true, _) => Some(NO_MATCHES),
        };

        self.render = DirectoryRender::Ready(Listing {
            summary: result.summary(),
            total_matched: result.total_matched,
            total_fetched: result.total_fetched,
            fetched_at: snapshot.fetched_at(),
            name_query: self.criteria.name_query.clone(),
            selected_merchant: self.criteria.merchant_id.clone(),
            options: self.options.clone(),
            cards,
            empty_message,
        });
    }
}

#[cfg(test)]
#[path = "directory_test.rs"]
mod tests;
