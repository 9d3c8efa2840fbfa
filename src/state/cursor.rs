use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    #[serde(default)]
    pub href: String,
}

/// Pagination links returned with every readings page (`_links`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Links {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<Link>,
    #[serde(rename = "self", default, skip_serializing_if = "Option::is_none")]
    pub self_: Option<Link>,
}

impl Links {
    /// Next page to read, if the api told us one. An empty href counts as none.
    pub fn next_href(&self) -> Option<&str> {
        self.next
            .as_ref()
            .map(|link| link.href.as_str())
            .filter(|href| !href.is_empty())
    }

    pub fn self_href(&self) -> Option<&str> {
        self.self_
            .as_ref()
            .map(|link| link.href.as_str())
            .filter(|href| !href.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.next_href().is_none()
    }

    pub fn clear(&mut self) {
        *self = Links::default();
    }
}
