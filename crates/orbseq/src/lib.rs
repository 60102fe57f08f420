//! Named, block-allocated sequences with an optional bijective scrambling
//! transform.
//!
//! The crate is built from four layers, leaves first:
//!
//! - [`CounterStore`]: the authority holding the high-water mark of every
//!   named sequence. [`AtomicCounterStore`] and [`LockCounterStore`] are the
//!   in-process implementations; anything durable plugs in behind the trait.
//! - [`SequenceBlockCache`]: reserves blocks of values from a store and hands
//!   them out one at a time under a per-name lock.
//! - [`OrbOfConfusion`]: a keyed, deterministic permutation of
//!   `[0, upper_bound)`.
//! - [`NumberSequence`]: the facade. [`ScrambledSequence`] decorates any raw
//!   sequence with an [`OrbOfConfusion`].
//!
//! [`SequenceRegistry`] ties them together by name.
//!
//! # Example
//! ```
//! use orbseq::{AtomicCounterStore, NumberSequence, SequenceConfig, SequenceRegistry};
//!
//! let registry = SequenceRegistry::new(AtomicCounterStore::default(), SequenceConfig::default())?;
//!
//! let orders = registry.sequence("orders")?;
//! assert_eq!(orders.try_next_id()?, 0);
//! assert_eq!(orders.try_next_id()?, 1);
//!
//! let tickets = registry.scrambled("tickets", 1_000_000)?;
//! let id = tickets.try_next_id()?;
//! assert!(id < 1_000_000);
//! assert_eq!(tickets.unscramble(id)?, 0);
//! # Ok::<(), orbseq::Error>(())
//! ```
#![cfg_attr(docsrs, feature(doc_cfg))]

mod allocator;
mod config;
mod error;
mod mutex;
mod orb;
mod registry;
mod sequence;
mod store;

pub use crate::allocator::*;
pub use crate::config::*;
pub use crate::error::*;
pub use crate::orb::*;
pub use crate::registry::*;
pub use crate::sequence::*;
pub use crate::store::*;
