//! Per-session list of properties the user has marked for follow-up.

use serde::{Deserialize, Serialize};

use crate::listing::{Listing, ListingId};
use crate::ShortlistError;

/// Ordered, id-unique list of listings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Shortlist {
    listings: Vec<Listing>,
}

impl Shortlist {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `listing` unless one with the same id is already present.
    ///
    /// Returns `Ok(true)` when the listing was added and `Ok(false)` when it
    /// was already on the list.
    ///
    /// # Errors
    ///
    /// Returns [`ShortlistError::MissingId`] if the listing has no id.
    pub fn add(&mut self, listing: Listing) -> Result<bool, ShortlistError> {
        let Some(id) = listing.id.as_ref() else {
            return Err(ShortlistError::MissingId);
        };
        if self.contains(id) {
            return Ok(false);
        }
        self.listings.push(listing);
        Ok(true)
    }

    /// Remove every entry with `id`. Returns whether anything was removed.
    pub fn remove(&mut self, id: &ListingId) -> bool {
        let before = self.listings.len();
        self.listings.retain(|l| l.id.as_ref() != Some(id));
        self.listings.len() != before
    }

    #[must_use]
    pub fn contains(&self, id: &ListingId) -> bool {
        self.listings.iter().any(|l| l.id.as_ref() == Some(id))
    }

    #[must_use]
    pub fn listings(&self) -> &[Listing] {
        &self.listings
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.listings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(id: &str, price: f64) -> Listing {
        Listing {
            id: Some(ListingId::from(id)),
            price: Some(price),
            ..Listing::default()
        }
    }

    #[test]
    fn add_keeps_insertion_order() {
        let mut list = Shortlist::new();
        assert_eq!(list.add(listing("b", 1.0)), Ok(true));
        assert_eq!(list.add(listing("a", 2.0)), Ok(true));
        let ids: Vec<_> = list.listings().iter().filter_map(|l| l.id.clone()).collect();
        assert_eq!(ids, vec![ListingId::from("b"), ListingId::from("a")]);
    }

    #[test]
    fn add_is_idempotent_by_id() {
        let mut list = Shortlist::new();
        assert_eq!(list.add(listing("42", 500_000.0)), Ok(true));
        assert_eq!(list.add(listing("42", 999_999.0)), Ok(false));
        assert_eq!(list.len(), 1);
        assert_eq!(list.listings()[0].price, Some(500_000.0));
    }

    #[test]
    fn add_without_id_is_rejected() {
        let mut list = Shortlist::new();
        let err = list.add(Listing::default()).unwrap_err();
        assert_eq!(err, ShortlistError::MissingId);
        assert!(list.is_empty());
    }

    #[test]
    fn remove_by_id() {
        let mut list = Shortlist::new();
        list.add(listing("1", 1.0)).expect("add");
        list.add(listing("2", 2.0)).expect("add");
        assert!(list.remove(&ListingId::from("1")));
        assert!(!list.remove(&ListingId::from("1")));
        assert!(!list.contains(&ListingId::from("1")));
        assert!(list.contains(&ListingId::from("2")));
    }

    #[test]
    fn serializes_as_plain_array() {
        let mut list = Shortlist::new();
        list.add(listing("7", 1.0)).expect("add");
        let value = serde_json::to_value(&list).expect("serialize");
        assert!(value.is_array());
        assert_eq!(value[0]["id"], "7");
    }
}
