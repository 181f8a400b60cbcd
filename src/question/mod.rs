//! Questions and where they come from
//!
//! This module contains the canonical question model, the normalization of
//! heterogeneous dataset records into it, and the source capability the
//! round state machine draws from.

pub mod model;
pub mod raw;
pub mod source;

pub use model::{Body, OptionKey, Question, QuestionKind};
pub use raw::{MalformedQuestion, RawQuestion, normalize};
pub use source::{Deck, Filter, LoadError, QuestionSource, SourceError};
