//! Note graph resolver
//!
//! Turns an unordered bag of note files into a [`DocumentMap`] in two
//! phases:
//!
//! 1. **Assembly** parses each file and stores it under its slug, renaming
//!    slugs that another note already claimed and re-hosting self-cycles to
//!    the root.
//! 2. **Linking** fabricates placeholders for hosts no note defines, breaks
//!    host cycles that never reach the root, and fills in sorted children
//!    lists.
//!
//! The result is a tree rooted at the empty slug in which every document is
//! reachable from the root. The graph is rebuilt from the store on every
//! request; nothing is cached.

use std::collections::{BTreeSet, HashSet};

use tracing::{debug, warn};
use uuid::Uuid;

use crate::document::{Document, DocumentMap, ROOT_SLUG};
use crate::header::parse_note;
use crate::storage::{NoteStore, StorageResult, CURRENT_GENERATION};

/// Suffix appended to a slug that another note already claimed
pub const DUPLICATE_SUFFIX: &str = "-duplicate";

/// One raw note file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocFile {
    /// Store identifier
    pub id: String,
    /// File contents
    pub body: String,
}

impl DocFile {
    pub fn new(id: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            body: body.into(),
        }
    }
}

/// Source of the letters appended while a duplicate slug still collides
pub trait SuffixSource {
    fn next_letter(&mut self) -> char;
}

/// Random lowercase letters
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomSuffix;

impl SuffixSource for RandomSuffix {
    fn next_letter(&mut self) -> char {
        let byte = Uuid::new_v4().as_bytes()[0];
        char::from(b'a' + byte % 26)
    }
}

impl<F: FnMut() -> char> SuffixSource for F {
    fn next_letter(&mut self) -> char {
        self()
    }
}

/// Builds a [`DocumentMap`] from note files
pub struct Resolver<S = RandomSuffix> {
    documents: DocumentMap,
    suffix: S,
}

impl Resolver<RandomSuffix> {
    pub fn new() -> Self {
        Self::with_suffix_source(RandomSuffix)
    }
}

impl Default for Resolver<RandomSuffix> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: SuffixSource> Resolver<S> {
    /// Create a resolver drawing duplicate suffixes from `suffix`
    pub fn with_suffix_source(suffix: S) -> Self {
        Self {
            documents: DocumentMap::new(),
            suffix,
        }
    }

    /// Add one note file to the in-progress map
    pub fn assemble(&mut self, file: &DocFile) {
        if file.id.is_empty() {
            warn!("Skipping note file without an identifier");
            return;
        }

        let mut doc = parse_file(file);

        if self.collides(&doc.slug, &file.id) {
            warn!(
                "Slug {:?} of note {} is already taken, renaming",
                doc.slug, file.id
            );
            doc.is_duplicate = true;
            doc.duplicate_of = doc.slug.clone();
            doc.slug.push_str(DUPLICATE_SUFFIX);
            while self.collides(&doc.slug, &file.id) {
                doc.slug.push(self.suffix.next_letter());
            }
        }

        if doc.host == doc.slug {
            doc.host = ROOT_SLUG.to_string();
        }

        self.documents.insert(doc);
    }

    /// Finish the pass: fabricate placeholders, break cycles, link children
    pub fn link(self) -> DocumentMap {
        let mut documents = self.documents;

        let missing: BTreeSet<String> = documents
            .iter()
            .filter(|(_, doc)| !doc.is_root() && !documents.contains(&doc.host))
            .map(|(_, doc)| doc.host.clone())
            .collect();
        for host in missing {
            debug!("Fabricating placeholder for missing host {:?}", host);
            documents.insert(Document::placeholder(&host));
        }

        break_cycles(&mut documents);

        let edges: Vec<(String, String)> = documents
            .iter()
            .filter(|(_, doc)| !doc.is_root())
            .map(|(slug, doc)| (doc.host.clone(), slug.clone()))
            .collect();
        for doc in documents.values_mut() {
            doc.children.clear();
        }
        for (host, slug) in edges {
            if let Some(parent) = documents.get_mut(&host) {
                parent.add_child(&slug);
            }
        }
        for doc in documents.values_mut() {
            doc.children.sort();
        }

        documents
    }

    /// Whether `slug` belongs to a different, real note
    ///
    /// Placeholders have no id and give way to the note that defines them.
    fn collides(&self, slug: &str, id: &str) -> bool {
        self.documents
            .get(slug)
            .map_or(false, |existing| !existing.id.is_empty() && existing.id != id)
    }
}

/// Re-host to the root one member of every host cycle
///
/// After placeholder fabrication every host exists, so a host chain either
/// reaches the root or loops. The smallest slug on a loop is moved under the
/// root.
fn break_cycles(documents: &mut DocumentMap) {
    let slugs: Vec<String> = documents.iter().map(|(slug, _)| slug.clone()).collect();
    let mut grounded: HashSet<String> = HashSet::from([ROOT_SLUG.to_string()]);

    for start in slugs {
        let mut chain: Vec<String> = Vec::new();
        let mut current = start;

        while !grounded.contains(&current) {
            if let Some(pos) = chain.iter().position(|slug| *slug == current) {
                if let Some(victim) = chain[pos..].iter().min().cloned() {
                    warn!("Host cycle through {:?}, attaching it to the root", victim);
                    if let Some(doc) = documents.get_mut(&victim) {
                        doc.host = ROOT_SLUG.to_string();
                    }
                }
                break;
            }
            let host = documents
                .get(&current)
                .map_or_else(String::new, |doc| doc.host.clone());
            chain.push(current);
            current = host;
        }

        grounded.extend(chain);
    }
}

/// Parse one file on its own, without collision handling
pub fn parse_file(file: &DocFile) -> Document {
    Document::from_note(&file.id, parse_note(&file.id, &file.body))
}

/// Resolve a set of note files into a linked document map
pub fn resolve(files: &[DocFile]) -> DocumentMap {
    let mut resolver = Resolver::new();
    for file in files {
        resolver.assemble(file);
    }
    resolver.link()
}

/// Read the current generation of every note in the store
pub fn load_files(store: &dyn NoteStore) -> StorageResult<Vec<DocFile>> {
    let ids = store.list("/", false, true)?;

    let mut files = Vec::with_capacity(ids.len());
    for id in ids {
        let id = id.trim_start_matches('/').to_string();
        let body = store.read_to_string(&id, CURRENT_GENERATION)?;
        files.push(DocFile { id, body });
    }

    Ok(files)
}

/// Load every note from the store and resolve the graph
pub fn load_documents(store: &dyn NoteStore) -> StorageResult<DocumentMap> {
    let files = load_files(store)?;
    let documents = resolve(&files);
    debug!(
        "Resolved {} files into {} documents",
        files.len(),
        documents.len()
    );
    Ok(documents)
}
