//! The analysis result shown to a guest.

use serde::{Deserialize, Serialize};

/// Detected gender.  Unknown labels are kept verbatim (lower-cased).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Gender {
    Male,
    Female,
    Other(String),
}

impl Gender {
    pub fn as_str(&self) -> &str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Other(label) => label,
        }
    }
}

impl From<String> for Gender {
    fn from(label: String) -> Self {
        let label = label.trim().to_lowercase();
        match label.as_str() {
            "male" | "man" => Gender::Male,
            "female" | "woman" => Gender::Female,
            _ => Gender::Other(label),
        }
    }
}

impl From<Gender> for String {
    fn from(gender: Gender) -> Self {
        gender.as_str().to_string()
    }
}

/// Detected attire class.  Unknown labels are kept verbatim (lower-cased).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Attire {
    Suit,
    Traditional,
    Shirt,
    Other(String),
}

impl Attire {
    pub fn as_str(&self) -> &str {
        match self {
            Attire::Suit => "suit",
            Attire::Traditional => "traditional",
            Attire::Shirt => "shirt",
            Attire::Other(label) => label,
        }
    }
}

impl From<String> for Attire {
    fn from(label: String) -> Self {
        let label = label.trim().to_lowercase();
        match label.as_str() {
            "suit" => Attire::Suit,
            "traditional" => Attire::Traditional,
            "shirt" => Attire::Shirt,
            _ => Attire::Other(label),
        }
    }
}

impl From<Attire> for String {
    fn from(attire: Attire) -> Self {
        attire.as_str().to_string()
    }
}

/// One analysis outcome.  Immutable once built; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestResult {
    pub name: String,
    pub gender: Gender,
    pub attire: Attire,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl GuestResult {
    /// Greeting line rendered above the avatar.
    pub fn greeting(&self) -> String {
        format!("Hi {},", self.name)
    }
}
