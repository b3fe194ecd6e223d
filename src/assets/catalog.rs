//! [`AvatarCatalog`]: `gender_attire` lookup with default fallback.

use std::path::{Path, PathBuf};

use crate::config::AssetConfig;
use crate::remote::{Attire, Gender};

#[derive(Debug, Clone)]
pub struct AvatarCatalog {
    dir: PathBuf,
    default_avatar: PathBuf,
}

impl AvatarCatalog {
    pub fn new(dir: impl Into<PathBuf>, default_avatar: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            default_avatar: default_avatar.into(),
        }
    }

    pub fn from_config(config: &AssetConfig) -> Self {
        Self::new(&config.avatar_dir, &config.default_avatar)
    }

    /// File name for a combination, e.g. `female_suit.png`.
    pub fn file_name(gender: &Gender, attire: &Attire) -> String {
        format!("{}_{}.png", gender.as_str(), attire.as_str())
    }

    /// Path of the avatar to show.  A missing file, or a label that is not
    /// a plain `[a-z0-9_-]` word, yields the default image.
    pub fn resolve(&self, gender: &Gender, attire: &Attire) -> PathBuf {
        if !is_plain_label(gender.as_str()) || !is_plain_label(attire.as_str()) {
            log::warn!(
                "assets: unusable label {:?}/{:?}, using default avatar",
                gender.as_str(),
                attire.as_str()
            );
            return self.default_avatar.clone();
        }

        let candidate = self.dir.join(Self::file_name(gender, attire));
        if candidate.is_file() {
            candidate
        } else {
            log::debug!(
                "assets: {} not found, using default avatar",
                candidate.display()
            );
            self.default_avatar.clone()
        }
    }

    pub fn default_avatar(&self) -> &Path {
        &self.default_avatar
    }
}

fn is_plain_label(label: &str) -> bool {
    !label.is_empty()
        && label
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_' || b == b'-')
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn file_name_is_gender_underscore_attire() {
        assert_eq!(
            AvatarCatalog::file_name(&Gender::Female, &Attire::Suit),
            "female_suit.png"
        );
        assert_eq!(
            AvatarCatalog::file_name(&Gender::Other("nonbinary".into()), &Attire::Shirt),
            "nonbinary_shirt.png"
        );
    }

    #[test]
    fn resolves_existing_avatar() {
        let dir = tempdir().expect("temp dir");
        fs::write(dir.path().join("female_suit.png"), b"png").unwrap();
        let catalog = AvatarCatalog::new(dir.path(), dir.path().join("default.png"));

        assert_eq!(
            catalog.resolve(&Gender::Female, &Attire::Suit),
            dir.path().join("female_suit.png")
        );
    }

    #[test]
    fn missing_avatar_falls_back_to_default() {
        let dir = tempdir().expect("temp dir");
        let catalog = AvatarCatalog::new(dir.path(), dir.path().join("default.png"));

        assert_eq!(
            catalog.resolve(&Gender::Male, &Attire::Other("cape".into())),
            dir.path().join("default.png")
        );
    }

    #[test]
    fn directory_named_like_avatar_is_not_used() {
        let dir = tempdir().expect("temp dir");
        fs::create_dir(dir.path().join("male_shirt.png")).unwrap();
        let catalog = AvatarCatalog::new(dir.path(), "fallback.png");

        assert_eq!(
            catalog.resolve(&Gender::Male, &Attire::Shirt),
            PathBuf::from("fallback.png")
        );
    }

    #[test]
    fn labels_cannot_leave_the_avatar_dir() {
        let root = tempdir().expect("temp dir");
        let avatars = root.path().join("avatars");
        fs::create_dir(&avatars).unwrap();
        fs::write(root.path().join("x_suit.png"), b"png").unwrap();
        let catalog = AvatarCatalog::new(&avatars, avatars.join("default.png"));

        assert_eq!(
            catalog.resolve(&Gender::Other("../x".into()), &Attire::Suit),
            avatars.join("default.png")
        );
        assert_eq!(
            catalog.resolve(&Gender::Male, &Attire::Other("a/b".into())),
            avatars.join("default.png")
        );
        assert_eq!(
            catalog.resolve(&Gender::Other(String::new()), &Attire::Shirt),
            avatars.join("default.png")
        );
    }

    #[test]
    fn plain_other_labels_are_looked_up() {
        let dir = tempdir().expect("temp dir");
        fs::write(dir.path().join("non-binary_kurta_2.png"), b"png").unwrap();
        let catalog = AvatarCatalog::new(dir.path(), dir.path().join("default.png"));

        assert_eq!(
            catalog.resolve(
                &Gender::Other("non-binary".into()),
                &Attire::Other("kurta_2".into())
            ),
            dir.path().join("non-binary_kurta_2.png")
        );
    }
}
