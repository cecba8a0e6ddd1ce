//! Dataset tooling for playlog.
//!
//! Downloads third-party trivia and word datasets (plain HTTP files, tar.gz
//! archives, git repositories) and maintains the word-data dictionaries:
//! expanding them with derived word forms and filling in missing definitions
//! from the Free Dictionary API.

pub mod definitions;
pub mod dictionary;
pub mod error;
pub mod sources;
pub mod wordforms;

pub use definitions::{DefinitionFetcher, FetchProgress};
pub use dictionary::{WordEntry, WordList};
pub use error::DatasetError;
pub use sources::{Dataset, DatasetFetcher, DatasetSource};
pub use wordforms::WordFormExpander;
