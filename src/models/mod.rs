//! Core data models shared across sources and the tool surface.

mod annotation;
mod article;
mod cell_line;
mod compound;
mod link;
mod query;
mod record;

pub use annotation::{Concept, EntityAnnotation, EntityMatch, PaperAnnotations, Section};
pub use article::{Article, Author, Journal};
pub use cell_line::{CellLine, Disease, Publication, SequenceVariation, StrProfile};
pub use compound::Compound;
pub use link::{EntrezDatabase, Link, LinkSet};
pub use query::{SearchQuery, DEFAULT_LIMIT};
pub use record::{select_fields, Record, SearchResult};
