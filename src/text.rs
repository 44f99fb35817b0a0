use include_dir::{include_dir, Dir};
use std::fs;
use std::path::Path;

use crate::error::Error;

static TEXT_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/text");

/// A text-bearing element: an optional explicit source plus whatever it already shows
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextSource {
    pub attribute: Option<String>,
    pub rendered: String,
}

impl TextSource {
    pub fn from_attribute(text: impl Into<String>) -> Self {
        Self {
            attribute: Some(text.into()),
            rendered: String::new(),
        }
    }

    pub fn from_rendered(text: impl Into<String>) -> Self {
        Self {
            attribute: None,
            rendered: text.into(),
        }
    }

    /// The explicit attribute when present, the rendered text otherwise
    pub fn source_text(&self) -> &str {
        self.attribute.as_deref().unwrap_or(&self.rendered)
    }
}

/// Blocks are separated by one or more blank lines
pub fn split_blocks(content: &str) -> Vec<TextSource> {
    let mut blocks = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in content.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                blocks.push(TextSource::from_rendered(current.join("\n")));
                current.clear();
            }
        } else {
            current.push(line.trim_end());
        }
    }
    if !current.is_empty() {
        blocks.push(TextSource::from_rendered(current.join("\n")));
    }

    blocks
}

pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Vec<TextSource>, Error> {
    let content = fs::read_to_string(path.as_ref())?;
    let blocks = split_blocks(&content);
    if blocks.is_empty() {
        return Err(Error::EmptyText(path.as_ref().display().to_string()));
    }
    Ok(blocks)
}

/// The bundled blocks, in file name order
pub fn builtin() -> Vec<TextSource> {
    let mut files: Vec<_> = TEXT_DIR.files().collect();
    files.sort_by(|a, b| a.path().cmp(b.path()));

    files
        .into_iter()
        .filter_map(|f| f.contents_utf8())
        .flat_map(split_blocks)
        .collect()
}
