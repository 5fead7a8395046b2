//! Records returned by the remote API.
//!
//! The remote service owns these schemas. We only deserialize the fields we
//! use, and we tolerate missing optional ones.

use serde::{Deserialize, Serialize};

/// Something that can be cloned to local disk.
pub trait Cloneable {
    /// The directory name to clone into (relative to the clone path).
    fn clone_name(&self) -> &str;

    /// The URL to clone from.
    fn clone_url(&self) -> &str;
}

/// A repository descriptor.
#[derive(Debug, Clone, Deserialize, Serialize, Eq, PartialEq)]
pub struct Repository {
    /// Numeric ID assigned by the service.
    pub id: u64,

    /// Short name, e.g. `repoyear`.
    pub name: String,

    /// Name including owner, e.g. `danielparks/repoyear`.
    #[serde(default)]
    pub full_name: String,

    /// HTTPS clone URL.
    pub clone_url: String,

    /// SSH clone URL.
    #[serde(default)]
    pub ssh_url: Option<String>,

    /// Description, if one was set.
    #[serde(default)]
    pub description: Option<String>,

    /// The default branch, e.g. `main`.
    #[serde(default)]
    pub default_branch: Option<String>,

    /// Whether the repository is private.
    #[serde(default)]
    pub private: bool,

    /// Whether the repository is a fork.
    #[serde(default)]
    pub fork: bool,
}

impl Cloneable for Repository {
    fn clone_name(&self) -> &str {
        &self.name
    }

    fn clone_url(&self) -> &str {
        &self.clone_url
    }
}

/// A gist descriptor.
#[derive(Debug, Clone, Deserialize, Serialize, Eq, PartialEq)]
pub struct Gist {
    /// Hex ID assigned by the service. Gists have no names.
    pub id: String,

    /// URL to clone from.
    pub git_pull_url: String,

    /// URL of the gist’s web page.
    #[serde(default)]
    pub html_url: Option<String>,

    /// Description, if one was set.
    #[serde(default)]
    pub description: Option<String>,

    /// Whether the gist is public.
    #[serde(default)]
    pub public: bool,
}

impl Cloneable for Gist {
    fn clone_name(&self) -> &str {
        &self.id
    }

    fn clone_url(&self) -> &str {
        &self.git_pull_url
    }
}
