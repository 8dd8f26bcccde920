//! Upload port: opaque blob storage for cover images.

use std::future::Future;

use labhub_domain::error::LabHubError;

/// Stores image bytes somewhere publicly served and returns the path under
/// which they can be fetched, e.g. `/uploads/laboratories/<uuid>.png`.
pub trait ImageStore {
    /// Store `bytes` in `folder` under a freshly generated name ending in
    /// `.{extension}`.
    fn store(
        &self,
        folder: &str,
        extension: &str,
        bytes: Vec<u8>,
    ) -> impl Future<Output = Result<String, LabHubError>> + Send;

    /// Remove a blob previously returned by [`ImageStore::store`]. Removing
    /// a blob that is already gone succeeds.
    fn discard(&self, public_path: &str) -> impl Future<Output = Result<(), LabHubError>> + Send;
}
