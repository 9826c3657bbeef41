//! Export categories.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// The kind of configuration object a snapshot holds.
///
/// A category is named by its directory under the generation root, and that
/// name is what appears in change logs as `objectType`. Directories with no
/// known meaning are kept as `Other` rather than rejected.
///
/// Equality, hashing and ordering all go through [`Category::dir_name`], so
/// a hand-built `Other("Roles")` is the same category as `Role`.
#[derive(Debug, Clone)]
pub enum Category {
    CompliancePolicy,
    ConfigurationProfile,
    Application,
    Script,
    Role,
    Assignment,
    Other(String),
}

impl Category {
    /// Every category with a known directory name.
    pub const KNOWN: [Category; 6] = [
        Category::CompliancePolicy,
        Category::ConfigurationProfile,
        Category::Application,
        Category::Script,
        Category::Role,
        Category::Assignment,
    ];

    pub fn from_dir_name(name: &str) -> Self {
        match name {
            "CompliancePolicies" => Category::CompliancePolicy,
            "ConfigurationProfiles" => Category::ConfigurationProfile,
            "Applications" => Category::Application,
            "Scripts" => Category::Script,
            "Roles" => Category::Role,
            "Assignments" => Category::Assignment,
            other => Category::Other(other.to_string()),
        }
    }

    pub fn dir_name(&self) -> &str {
        match self {
            Category::CompliancePolicy => "CompliancePolicies",
            Category::ConfigurationProfile => "ConfigurationProfiles",
            Category::Application => "Applications",
            Category::Script => "Scripts",
            Category::Role => "Roles",
            Category::Assignment => "Assignments",
            Category::Other(name) => name,
        }
    }

    pub fn is_known(&self) -> bool {
        Self::KNOWN.contains(self)
    }
}

impl PartialEq for Category {
    fn eq(&self, other: &Self) -> bool {
        self.dir_name() == other.dir_name()
    }
}

impl Eq for Category {}

impl Hash for Category {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.dir_name().hash(state);
    }
}

// Ordered by directory name so change logs list categories alphabetically.
impl Ord for Category {
    fn cmp(&self, other: &Self) -> Ordering {
        self.dir_name().cmp(other.dir_name())
    }
}

impl PartialOrd for Category {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

impl Serialize for Category {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.dir_name())
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Category::from_dir_name(&name))
    }
}
