//! # Baskets
//!
//! Caller-assembled lists of names for batched operations.
//!
//! Order matters: every batched read returns results in basket order, and
//! callers zip them back by index.

use serde::{Deserialize, Serialize};

use crate::domain::commitment::CommitmentRequest;
use crate::domain::value_objects::{Address, Secret, U256};

/// Default safety margin applied to rent estimates, in percent.
pub const DEFAULT_PRICE_BUFFER_PERCENT: u64 = 15;

/// Scales `price` by `(100 + buffer_percent) / 100`, rounding down.
///
/// Returns `None` if the intermediate product overflows 256 bits.
#[must_use]
pub fn apply_price_buffer(price: U256, buffer_percent: u64) -> Option<U256> {
    let factor = U256::from(100u64.saturating_add(buffer_percent));
    price
        .checked_mul(factor)
        .map(|scaled| scaled / U256::from(100u64))
}

// =============================================================================
// REGISTRATION BASKET
// =============================================================================

/// One name and the duration to register it for.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasketEntry {
    /// Name, with or without `.eth`.
    pub name: String,
    /// Registration duration in seconds.
    pub duration_secs: u64,
}

impl BasketEntry {
    /// Creates an entry.
    pub fn new(name: impl Into<String>, duration_secs: u64) -> Self {
        Self {
            name: name.into(),
            duration_secs,
        }
    }
}

/// Ordered list of names to register together.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationBasket {
    entries: Vec<BasketEntry>,
}

impl RegistrationBasket {
    /// Creates an empty basket.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry.
    pub fn push(&mut self, entry: BasketEntry) {
        self.entries.push(entry);
    }

    /// Entries in order.
    #[must_use]
    pub fn entries(&self) -> &[BasketEntry] {
        &self.entries
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the basket has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over the entries.
    pub fn iter(&self) -> std::slice::Iter<'_, BasketEntry> {
        self.entries.iter()
    }

    /// Names in basket order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.name.clone()).collect()
    }

    /// One commitment request per entry, all sharing `owner` and `secret`.
    #[must_use]
    pub fn commitment_requests(&self, owner: Address, secret: Secret) -> Vec<CommitmentRequest> {
        self.entries
            .iter()
            .map(|e| CommitmentRequest::new(e.name.clone(), owner, secret))
            .collect()
    }

    /// Reveal arguments for every entry.
    #[must_use]
    pub fn registration_inputs(
        &self,
        owner: Address,
        secret: Secret,
        resolver: Address,
    ) -> Vec<RegistrationInput> {
        self.entries
            .iter()
            .map(|e| RegistrationInput {
                name: e.name.clone(),
                owner,
                duration_secs: e.duration_secs,
                secret,
                resolver,
            })
            .collect()
    }
}

impl FromIterator<BasketEntry> for RegistrationBasket {
    fn from_iter<I: IntoIterator<Item = BasketEntry>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a RegistrationBasket {
    type Item = &'a BasketEntry;
    type IntoIter = std::slice::Iter<'a, BasketEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Fully resolved reveal arguments for one name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationInput {
    /// Name being registered.
    pub name: String,
    /// New owner; must match the commitment.
    pub owner: Address,
    /// Registration duration in seconds.
    pub duration_secs: u64,
    /// Secret used at commit time.
    pub secret: Secret,
    /// Resolver to set on the new name.
    pub resolver: Address,
}

impl RegistrationInput {
    /// The commitment this input reveals.
    #[must_use]
    pub fn commitment_request(&self) -> CommitmentRequest {
        CommitmentRequest::new(self.name.clone(), self.owner, self.secret)
    }
}

// =============================================================================
// CHECKOUT BASKET
// =============================================================================

/// What the caller is checking out.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CheckoutKind {
    /// Buying listed names with native currency.
    Purchase,
    /// Placing offers in the wrapped token.
    Offer,
    /// Registering available names.
    Registration,
}

/// One name in a checkout.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutItem {
    /// Name.
    pub name: String,
    /// Duration for registrations.
    pub registration_duration_secs: u64,
    /// Listing price in wei, for purchases.
    pub listing_price: Option<U256>,
    /// Offer amount in wrapped-token wei, for offers.
    pub offer_value: Option<U256>,
}

impl CheckoutItem {
    /// Item for a registration.
    pub fn registration(name: impl Into<String>, duration_secs: u64) -> Self {
        Self {
            name: name.into(),
            registration_duration_secs: duration_secs,
            ..Self::default()
        }
    }

    /// Item for a purchase at `price`.
    pub fn purchase(name: impl Into<String>, price: U256) -> Self {
        Self {
            name: name.into(),
            listing_price: Some(price),
            ..Self::default()
        }
    }

    /// Item for an offer of `value`.
    pub fn offer(name: impl Into<String>, value: U256) -> Self {
        Self {
            name: name.into(),
            offer_value: Some(value),
            ..Self::default()
        }
    }
}

/// Everything queued for one checkout.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutBasket {
    /// Items in order.
    pub items: Vec<CheckoutItem>,
    /// How long offers stay valid; required for offers.
    pub offer_duration_secs: Option<u64>,
}

impl CheckoutBasket {
    /// Basket with no offer duration.
    #[must_use]
    pub fn new(items: Vec<CheckoutItem>) -> Self {
        Self {
            items,
            offer_duration_secs: None,
        }
    }

    /// Sets the offer duration.
    #[must_use]
    pub fn with_offer_duration(mut self, secs: u64) -> Self {
        self.offer_duration_secs = Some(secs);
        self
    }

    /// Registration basket built from the items.
    #[must_use]
    pub fn to_registration_basket(&self) -> RegistrationBasket {
        self.items
            .iter()
            .map(|i| BasketEntry::new(i.name.clone(), i.registration_duration_secs))
            .collect()
    }
}

// =============================================================================
// TESTS
// =============================================================================
