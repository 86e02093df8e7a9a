use thiserror::Error;

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Error)]
pub enum ContainerErrors {
    #[error("Expected a known group, got an unknown group")]
    NonexistentGroup,
    #[error("Expected an entry in the group, got none")]
    NonexistentEntry,
}
