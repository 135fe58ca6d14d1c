//! The field a token (or a posting's term-frequency count) belongs to.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Location {
    Query,
    Author,
    Title,
    Body,
}

impl Location {
    /// Index into a document's `[author, title, body]` length/occurrence
    /// arrays. `Query` has no such slot.
    pub fn field_index(self) -> Option<usize> {
        match self {
            Location::Author => Some(0),
            Location::Title => Some(1),
            Location::Body => Some(2),
            Location::Query => None,
        }
    }
}
