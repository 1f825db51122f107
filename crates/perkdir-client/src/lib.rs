pub mod client;
pub mod controller;
pub mod directory;
pub mod error;
pub mod source;
pub mod types;

pub use client::PerksClient;
pub use controller::{FetchController, FetchState, PerkSnapshot};
pub use directory::{DirectoryRender, DirectoryView, Listing, PageState, PerkCard};
pub use error::{ClientError, DirectoryError};
pub use source::PerkSource;
