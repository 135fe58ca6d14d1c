//! DocumentContents: the immutable author/title/body text of an
//! indexed document. See SPEC_FULL.md §3, §6.

use crate::error::{EngineError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DocumentContents {
    pub author: String,
    pub title: String,
    pub body: String,
}

impl DocumentContents {
    pub fn new(author: impl Into<String>, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            title: title.into(),
            body: body.into(),
        }
    }

    /// `i32 author_len ‖ i32 title_len ‖ i32 body_len ‖ author ‖ title ‖ body`.
    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(12 + self.author.len() + self.title.len() + self.body.len());
        out.extend((self.author.len() as i32).to_le_bytes());
        out.extend((self.title.len() as i32).to_le_bytes());
        out.extend((self.body.len() as i32).to_le_bytes());
        out.extend(self.author.as_bytes());
        out.extend(self.title.as_bytes());
        out.extend(self.body.as_bytes());
        out
    }

    pub fn deserialize(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < 12 {
            return Err(EngineError::corruption(
                "truncated document contents: missing length prefixes",
            ));
        }
        let author_len = i32::from_le_bytes(bytes[0..4].try_into().unwrap()) as usize;
        let title_len = i32::from_le_bytes(bytes[4..8].try_into().unwrap()) as usize;
        let body_len = i32::from_le_bytes(bytes[8..12].try_into().unwrap()) as usize;

        let mut offset = 12;
        let take_str = |bytes: &[u8], offset: &mut usize, len: usize| -> Result<String> {
            if *offset + len > bytes.len() {
                return Err(EngineError::corruption(
                    "truncated document contents: string runs past end of buffer",
                ));
            }
            let s = String::from_utf8(bytes[*offset..*offset + len].to_vec())
                .map_err(|e| EngineError::corruption(format!("invalid utf-8 in document contents: {e}")))?;
            *offset += len;
            Ok(s)
        };

        let author = take_str(bytes, &mut offset, author_len)?;
        let title = take_str(bytes, &mut offset, title_len)?;
        let body = take_str(bytes, &mut offset, body_len)?;

        Ok(Self { author, title, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_utf8_text() {
        let doc = DocumentContents::new("José Saramago", "Blindness", "In the middle of the crossing…");
        let bytes = doc.serialize();
        assert_eq!(DocumentContents::deserialize(&bytes).unwrap(), doc);
    }

    #[test]
    fn round_trips_empty_fields() {
        let doc = DocumentContents::default();
        let bytes = doc.serialize();
        assert_eq!(DocumentContents::deserialize(&bytes).unwrap(), doc);
    }
}
