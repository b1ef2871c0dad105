use serde::{Deserialize, Serialize};

/// Read-only projection of a user, used for display purposes only.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct Profile {
    pub id: super::Id,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

impl Profile {
    pub fn initials(&self) -> String {
        crate::util::initials(&self.first_name, &self.last_name)
    }
}
