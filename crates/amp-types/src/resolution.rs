use serde::{Deserialize, Serialize};

/// Resolution type tag owned by this system.
pub const RESOLUTION_TYPE: &str = "custom:automerge";

/// Value reported to the host as the resolver that produced a package.
pub const RESOLVED_VIA: &str = "automerge";

/// The record a host stores after `resolve` and later hands to `fetch`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resolution {
    /// Resolution type tag; fetchable iff equal to [`RESOLUTION_TYPE`].
    #[serde(rename = "type")]
    pub kind: String,
    /// Full package address including any subpath.
    pub automerge_url: String,
}

impl Resolution {
    /// A resolution of this system's type for the given address.
    pub fn automerge(address: impl Into<String>) -> Self {
        Self {
            kind: RESOLUTION_TYPE.to_string(),
            automerge_url: address.into(),
        }
    }

    /// Returns `true` if this resolution belongs to this system.
    pub fn is_automerge(&self) -> bool {
        self.kind == RESOLUTION_TYPE
    }
}
