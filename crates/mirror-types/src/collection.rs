//! Collection names

use serde::{Deserialize, Serialize};

/// The three working collections owned by the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Users,
    Posts,
    Comments,
}

impl Collection {
    /// Parent-first order; reloads clear and fill collections in this order
    pub const ALL: [Collection; 3] = [Collection::Users, Collection::Posts, Collection::Comments];

    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Users => "users",
            Collection::Posts => "posts",
            Collection::Comments => "comments",
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
