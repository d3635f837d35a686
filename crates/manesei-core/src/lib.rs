//! Manesei Core Library
//!
//! This crate provides the core functionality for Manesei, a small wiki
//! whose notes are plain text files arranged into a tree by their headers.
//!
//! # Architecture
//!
//! Nothing is cached between requests. Every page view reads all note files
//! from the store and resolves them into a fresh [`DocumentMap`]:
//!
//! ```text
//! NoteStore::list -> DocFile -> Resolver::assemble -> Resolver::link
//!     -> DocumentMap -> render_viewer -> parse_document
//! ```
//!
//! # Quick Start
//!
//! ```text
//! let store = FileStore::open("notes")?;
//! store.write("a", b":home Home\n\n# Welcome")?;
//!
//! let documents = load_documents(&store)?;
//! let viewer = render_viewer(&documents, "home");
//! ```
//!
//! # Modules
//!
//! - `storage`: Note store contract and the filesystem store
//! - `header`: Note file format (first line, headers, body)
//! - `document`: Documents, the document map and path resolution
//! - `resolver`: Assembles note files into a linked document tree
//! - `markup`: Note markup to HTML
//! - `render`: Viewer, revision and history pages
//! - `form`: Editor form fields
//! - `config`: Application configuration

pub mod config;
pub mod document;
pub mod form;
pub mod header;
pub mod markup;
pub mod render;
pub mod resolver;
pub mod storage;

pub use config::Config;
pub use document::{Document, DocumentMap};
pub use form::{DocumentForm, FormError};
pub use header::{parse_note, serialize_note, ParsedNote};
pub use markup::parse_document;
pub use render::{render_history, render_revision, render_viewer, Viewer};
pub use resolver::{load_documents, load_files, resolve, DocFile, Resolver};
pub use storage::{
    FileStore, NoteMetadata, NoteStore, StorageError, StorageResult, CURRENT_GENERATION,
};
