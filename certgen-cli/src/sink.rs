//! Writes finished certificates into a directory.

use std::fs;
use std::io;
use std::path::PathBuf;

use certgen_compose::{OutputImage, OutputSink, FALLBACK_STEM};

/// Saves each output under its suggested filename, made safe for the
/// local filesystem.
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl OutputSink for DirectorySink {
    type Receipt = PathBuf;
    type Error = io::Error;

    fn deliver(&mut self, output: &OutputImage) -> io::Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(sanitize_filename(&output.filename));
        fs::write(&path, &output.bytes)?;
        Ok(path)
    }
}

/// Replace path separators, reserved characters and control characters
/// with `_`, and refuse names that would resolve outside the directory.
pub fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let cleaned = cleaned.trim_start_matches(['.', ' ']).trim_end();

    if cleaned.is_empty() {
        format!("certificate-{FALLBACK_STEM}.png")
    } else {
        cleaned.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_names_pass_through() {
        assert_eq!(sanitize_filename("certificate-Jane Doe.png"), "certificate-Jane Doe.png");
        assert_eq!(sanitize_filename("certificate-Zoë.png"), "certificate-Zoë.png");
    }

    #[test]
    fn test_separators_are_replaced() {
        assert_eq!(sanitize_filename("certificate-../../etc.png"), "certificate-.._.._etc.png");
        assert_eq!(sanitize_filename("certificate-a\\b:c.png"), "certificate-a_b_c.png");
        assert_eq!(sanitize_filename("certificate-tab\there.png"), "certificate-tab_here.png");
    }

    #[test]
    fn test_leading_dots_are_stripped() {
        assert_eq!(sanitize_filename("..hidden.png"), "hidden.png");
        assert_eq!(sanitize_filename(" . "), "certificate-recipient.png");
    }

    #[test]
    fn test_deliver_writes_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = DirectorySink::new(dir.path().join("out"));
        let output = OutputImage {
            bytes: vec![1, 2, 3],
            width: 1,
            height: 1,
            filename: "certificate-a/b.png".into(),
        };
        let path = sink.deliver(&output).unwrap();
        assert_eq!(path, dir.path().join("out").join("certificate-a_b.png"));
        assert_eq!(fs::read(path).unwrap(), vec![1, 2, 3]);
    }
}
