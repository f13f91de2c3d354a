//! # Async event subscribers.
//!
//! Bus listeners ([`EventBus::on`](crate::EventBus::on)) run synchronously inside
//! `emit`. For observers that do I/O, this module provides the [`Subscribe`]
//! trait and [`SubscriberSet`], which feeds each subscriber from its own bounded
//! queue.
//!
//! ```text
//! EventBus (any node) ── wildcard listener ──► SubscriberSet
//!                                                ├──► LogWriter
//!                                                └──► custom (metrics, audit, ...)
//! ```

mod log;
mod subscribe;
mod subscriber_set;

pub use log::LogWriter;
pub use subscribe::Subscribe;
pub use subscriber_set::SubscriberSet;
