//! Machine translation trait
//!
//! `MachineTranslator` abstracts the backend that turns one source string
//! into one translated string, so the batch runner can be driven by the HTTP
//! provider in production and by [`MockTranslator`](crate::mock::MockTranslator)
//! in tests.

use async_trait::async_trait;

use crate::error::MtResult;

/// Generic trait for machine translation providers
///
/// Target language, tone and any other instructions are part of the
/// provider's own configuration (for the chat provider, the prompt template),
/// so a call only carries the text itself.
#[async_trait]
pub trait MachineTranslator: Send + Sync {
    /// Translate a single source string
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - The translated text, never empty
    /// * `Err(MtError)` - Transport failure or non-success response
    ///
    /// Dropping the returned future abandons the request.
    async fn translate(&self, text: &str) -> MtResult<String>;

    /// Get the name of this translation provider
    ///
    /// Used for logging to identify which provider handled a run.
    fn provider_name(&self) -> &str;
}
