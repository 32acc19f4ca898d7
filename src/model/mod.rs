//! Core data model shared by every component.
//!
//! These types are pure values: nothing in this module talks to the store,
//! the queue, or the network. C6 (`crate::store`) is the only place that
//! knows how a `ProductListing` or `Strategy` is serialized on the wire.

mod listing;
mod offer_change;
mod price;
mod strategy;

pub use listing::{B2bTier, FulfillmentChannel, ListingStatus, ProductListing};
pub use offer_change::{CompetitorOffer, OfferChange, Source};
pub use price::{CalculatedPrice, CalculatedPriceTier};
pub use strategy::{B2bCompeteFor, B2bPriceRule, CompeteWith, PriceBoundRule, Strategy};
