//! Shared buffer storage for open documents
//!
//! [`Buffers`] holds the in-memory content of open files. The session owns
//! the document lifecycle while [`WorkspaceFileSystem`](crate::WorkspaceFileSystem)
//! reads from the same storage, so unsaved edits win over disk content.

use std::sync::Arc;

use dashmap::DashMap;
use url::Url;

use crate::document::TextDocument;

#[derive(Clone, Debug, Default)]
pub struct Buffers {
    inner: Arc<DashMap<Url, TextDocument>>,
}

impl Buffers {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&self, url: Url, document: TextDocument) {
        self.inner.insert(url, document);
    }

    /// Run `f` against an open document, returning `None` when it is not open.
    pub fn update<R>(&self, url: &Url, f: impl FnOnce(&mut TextDocument) -> R) -> Option<R> {
        self.inner.get_mut(url).map(|mut entry| f(entry.value_mut()))
    }

    pub fn close(&self, url: &Url) -> Option<TextDocument> {
        self.inner.remove(url).map(|(_, doc)| doc)
    }

    #[must_use]
    pub fn get(&self, url: &Url) -> Option<TextDocument> {
        self.inner.get(url).map(|entry| entry.clone())
    }

    #[must_use]
    pub fn contains(&self, url: &Url) -> bool {
        self.inner.contains_key(url)
    }

    /// URLs of every open buffer.
    #[must_use]
    pub fn urls(&self) -> Vec<Url> {
        self.inner.iter().map(|entry| entry.key().clone()).collect()
    }
}
