//! Static avatar assets.
//!
//! Avatars live as `{gender}_{attire}.png` in one directory.  Lookups that
//! miss fall back to a fixed default image and never fail;
//! [`generate_placeholders`] seeds a directory with simple drawn avatars
//! for every known combination.

pub mod catalog;
pub mod placeholder;

use std::path::PathBuf;

use thiserror::Error;

pub use catalog::AvatarCatalog;
pub use placeholder::generate_placeholders;

/// Errors from seeding the avatar directory.  Lookups never produce one.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to create avatar directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write avatar {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}
