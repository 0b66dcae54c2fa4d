//! Ingest Templates Core - polymorphic template resolution
//!
//! A collection document names its kind and carries an array of
//! discriminated elements. Each element is offered to an ordered chain of
//! candidates; the first candidate that claims the discriminator builds
//! the typed template or reports why it cannot.
//!
//! # Guarantees
//! 1. Structural problems with the root stop the call before any element is read.
//! 2. Element failures never stop the loop.
//! 3. First match wins, in registration order.
//! 4. Output preserves input order.

pub mod error;
pub mod config;
pub mod container;
pub mod chain;
pub mod factory;
pub mod templates;
pub mod validation;
pub mod content;

pub use error::{ElementError, ElementErrorKind, ResolverError};
pub use config::ResolverConfig;
pub use container::TemplateContainer;
pub use chain::{ElementFailure, KindCandidate, NotFoundHandler, Resolution, ResolutionChain, TemplateCandidate};
pub use factory::{validate_root, CollectionOutcome, CollectionTemplateFactory};
pub use templates::{ContentDefinition, ContentTemplate, IotJsonPathContentTemplate, JsonPathContentTemplate};
pub use validation::{ContentRule, ContentValidator};
pub use content::{CollectionContentTemplate, CollectionContentTemplateFactory, COLLECTION_CONTENT};

pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");
