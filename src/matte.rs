//! Matte provider abstraction
//!
//! A matte provider is the external background-removal model. It is treated
//! as a black box: encoded bytes in, encoded RGBA bytes of the same size out.

use crate::{config::MatteOptions, error::Result};

/// Trait for background-removal collaborators
///
/// Implementations must be callable from several requests at once; the
/// processor shares one provider behind an `Arc` and never locks around the
/// call.
pub trait MatteProvider: Send + Sync {
    /// Short name used in logs and diagnostics
    fn name(&self) -> &str;

    /// Produce an RGBA matte for an encoded image
    ///
    /// The returned bytes must decode to a 4-channel image with the input's
    /// width and height. This call may block for a long time.
    ///
    /// # Errors
    /// - `CompositeError::Decode` if the input is not a decodable image
    /// - `CompositeError::MatteProvider` if the model cannot be invoked or fails
    fn extract_matte(&self, image: &[u8], options: &MatteOptions) -> Result<Vec<u8>>;
}

impl<P: MatteProvider + ?Sized> MatteProvider for Box<P> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn extract_matte(&self, image: &[u8], options: &MatteOptions) -> Result<Vec<u8>> {
        (**self).extract_matte(image, options)
    }
}

impl<P: MatteProvider + ?Sized> MatteProvider for std::sync::Arc<P> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn extract_matte(&self, image: &[u8], options: &MatteOptions) -> Result<Vec<u8>> {
        (**self).extract_matte(image, options)
    }
}
