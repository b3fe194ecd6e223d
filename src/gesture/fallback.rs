//! Best-effort detector: wraps any [`GestureDetector`] and never fails.
//!
//! Polling must survive a flaky network without bothering the guest, so
//! every failure of the inner detector (`Request`, `Timeout`, `Parse`) is
//! logged at debug level and reported as "no wave".  A failed reset is
//! likewise swallowed.

use async_trait::async_trait;

use crate::media::StillImage;
use crate::remote::{GestureDetector, GestureError};

/// A transparent wrapper around any [`GestureDetector`] that never returns
/// an error.
pub struct BestEffortDetector<D: GestureDetector> {
    inner: D,
}

impl<D: GestureDetector> BestEffortDetector<D> {
    pub fn new(inner: D) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &D {
        &self.inner
    }
}

#[async_trait]
impl<D: GestureDetector> GestureDetector for BestEffortDetector<D> {
    /// This implementation **never** returns `Err(_)`.
    async fn detect(&self, image: &StillImage) -> Result<bool, GestureError> {
        match self.inner.detect(image).await {
            Ok(wave) => Ok(wave),
            Err(e) => {
                log::debug!("gesture: poll failed, treating as no wave: {e}");
                Ok(false)
            }
        }
    }

    async fn reset(&self) -> Result<(), GestureError> {
        if let Err(e) = self.inner.reset().await {
            log::debug!("gesture: wave reset failed (ignored): {e}");
        }
        Ok(())
    }
}
