//! Encoded result and the sink seam.

use crate::field::{FieldRole, TextField};

/// Filename stem used when the name field is blank.
pub const FALLBACK_STEM: &str = "recipient";

/// An encoded PNG plus the filename it should be saved under.
///
/// The filename embeds the user's name verbatim; sinks that write to a
/// filesystem are responsible for sanitizing it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutputImage {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub filename: String,
}

impl OutputImage {
    /// `certificate-<name>.png`, or `certificate-recipient.png` when the
    /// first name field is blank or missing.
    pub fn filename_for(fields: &[TextField]) -> String {
        let stem = fields
            .iter()
            .find(|f| f.role == FieldRole::Name)
            .filter(|f| !f.is_blank())
            .map(|f| f.content.as_str())
            .unwrap_or(FALLBACK_STEM);
        format!("certificate-{stem}.png")
    }
}

/// Receives finished images, e.g. by writing them to disk or serving them
/// as a download.
pub trait OutputSink {
    type Receipt;
    type Error;

    fn deliver(&mut self, output: &OutputImage) -> Result<Self::Receipt, Self::Error>;
}
