pub mod directory;
pub mod token;

pub use directory::{DirectoryRepository, InMemoryDirectory};
pub use token::{MemoryTokenStore, PublishedMessage, TokenStore};
