//! # Handler Registry
//!
//! Ordered, thread-safe storage for callback handlers and the capability used to
//! subscribe to it.
//!
//! ## Overview
//!
//! The registry holds no execution logic. Dispatchers take a [`Snapshot`] at the
//! start of every invocation, so handlers added or removed while a dispatch is in
//! flight only affect later invocations.
//!
//! ## Capabilities
//!
//! ```text
//! HandlerRegistry<P>
//! ├── HandlerRegistration<P>   (add / remove)
//! └── EventRegistration<P>     (restricted view handed to external subscribers)
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use multicast_callback::registry::HandlerRegistry;
//! use multicast_callback::Handler;
//!
//! let handler = Handler::action(|| Ok(()));
//! let registry = HandlerRegistry::add_to(None, handler.clone());
//! assert_eq!(registry.len(), 1);
//!
//! registry.remove(&handler);
//! assert!(registry.is_empty());
//! ```

pub mod handler_registry;
pub mod registration;

pub use handler_registry::{HandlerRegistry, Snapshot};
pub use registration::{EventRegistration, HandlerRegistration};
