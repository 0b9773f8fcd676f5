//! Filesystem-backed document provider

use std::path::{Path, PathBuf};

use futures::future::BoxFuture;
use parking_lot::RwLock;

use super::DocumentProvider;
use crate::error::Result;
use crate::types::identifiers::FileIdentity;
use crate::types::snapshot::{ActiveDocument, DocumentSnapshot};

/// Treats one path on disk as the active document
///
/// The identity is the path as given; callers that want canonical
/// identities should canonicalize before calling [`set_active`](Self::set_active).
#[derive(Debug, Default)]
pub struct FsDocumentProvider {
    active: RwLock<Option<PathBuf>>,
}

impl FsDocumentProvider {
    /// Provider with `path` active
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            active: RwLock::new(Some(path.into())),
        }
    }

    /// Switch the active document, or clear it with `None`
    pub fn set_active(&self, path: Option<&Path>) {
        *self.active.write() = path.map(Path::to_path_buf);
    }
}

impl DocumentProvider for FsDocumentProvider {
    fn active_document(&self) -> BoxFuture<'_, Option<ActiveDocument>> {
        let document = self
            .active
            .read()
            .as_ref()
            .map(|path| ActiveDocument::new(path.to_string_lossy().into_owned()));
        Box::pin(async move { document })
    }

    fn stat_size<'a>(&'a self, identity: &'a FileIdentity) -> BoxFuture<'a, Result<u64>> {
        Box::pin(async move {
            let metadata = tokio::fs::metadata(identity.as_str()).await?;
            Ok(metadata.len())
        })
    }

    fn read_snapshot<'a>(
        &'a self,
        document: &'a ActiveDocument,
    ) -> BoxFuture<'a, Result<DocumentSnapshot>> {
        Box::pin(async move {
            let content = tokio::fs::read_to_string(document.identity.as_str()).await?;
            Ok(DocumentSnapshot::new(document.identity.clone(), content))
        })
    }
}
