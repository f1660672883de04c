use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BitParseErr {
    /// Character at char index `pos` (not byte offset) is not a bit or a separator
    #[error("invalid character {found:?} at position {pos}, only '0' or '1' allowed")]
    InvalidChar { pos: usize, found: char },
}
