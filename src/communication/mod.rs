//! In-process publish/subscribe plumbing.

pub mod observers;

pub use observers::{Listener, ObserverRegistry, Subscription, SubscriptionId};
