use std::sync::LazyLock;

use anyhow::Result;
use regex::Regex;

use crate::store::Quicklink;
use crate::worker::Request;

static SCHEME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^https?://").expect("scheme regex is valid"));

/// Prefix `https://` onto anything that does not already name a web scheme.
pub fn normalize_url(url: &str) -> String {
    let url = url.trim();
    if SCHEME.is_match(url) {
        url.to_string()
    } else {
        format!("https://{url}")
    }
}

/// The bookmark list on the right. Same confirm-first rules as tasks, but
/// no cursor: links are addressed by their 1-9 slot.
#[derive(Debug, Default)]
pub struct QuickShelf {
    links: Vec<Quicklink>,
}

impl QuickShelf {
    pub fn links(&self) -> &[Quicklink] {
        &self.links
    }

    /// The link in 1-based `slot`.
    pub fn slot(&self, slot: usize) -> Option<&Quicklink> {
        slot.checked_sub(1).and_then(|i| self.links.get(i))
    }

    pub fn refresh(&self) -> Request {
        Request::FetchQuicklinks
    }

    pub fn add(&self, name: &str, url: &str) -> Option<Request> {
        let name = name.trim();
        let url = url.trim();
        if name.is_empty() || url.is_empty() {
            return None;
        }
        Some(Request::CreateQuicklink {
            name: name.to_string(),
            url: normalize_url(url),
        })
    }

    pub fn remove(&self, id: i64) -> Request {
        Request::DeleteQuicklink(id)
    }

    pub fn apply_fetched(&mut self, result: Result<Vec<Quicklink>>) {
        match result {
            Ok(links) => self.links = links,
            Err(e) => tracing::warn!("failed to fetch quicklinks: {e:#}"),
        }
    }

    /// Returns the refetch to issue after a confirmed create.
    pub fn apply_created(&self, result: &Result<Quicklink>) -> Option<Request> {
        match result {
            Ok(link) => {
                tracing::info!("added quicklink {} -> {}", link.name, link.url);
                Some(self.refresh())
            }
            Err(e) => {
                tracing::warn!("failed to add quicklink: {e:#}");
                None
            }
        }
    }

    pub fn apply_deleted(&mut self, id: i64, result: Result<()>) {
        match result {
            Ok(()) => self.links.retain(|l| l.id != id),
            Err(e) => tracing::warn!("failed to delete quicklink {id}: {e:#}"),
        }
    }
}

/// Hand a URL to the system browser.
pub fn open_link(link: &Quicklink) {
    if let Err(e) = open::that_detached(&link.url) {
        tracing::warn!("failed to open {}: {e}", link.url);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    fn link(id: i64, name: &str) -> Quicklink {
        Quicklink {
            id,
            name: name.into(),
            url: format!("https://{name}.dev"),
            created_at: String::new(),
        }
    }

    #[test]
    fn normalize_adds_missing_scheme() {
        assert_eq!(normalize_url("docs.rs"), "https://docs.rs");
        assert_eq!(normalize_url("  docs.rs/tokio "), "https://docs.rs/tokio");
    }

    #[test]
    fn normalize_keeps_existing_scheme_any_case() {
        assert_eq!(normalize_url("http://localhost:3000"), "http://localhost:3000");
        assert_eq!(normalize_url("HTTPS://Example.com"), "HTTPS://Example.com");
    }

    #[test]
    fn add_requires_both_fields() {
        let shelf = QuickShelf::default();
        assert_eq!(shelf.add(" ", "docs.rs"), None);
        assert_eq!(shelf.add("docs", "  "), None);
        assert_eq!(
            shelf.add(" docs ", "docs.rs"),
            Some(Request::CreateQuicklink {
                name: "docs".into(),
                url: "https://docs.rs".into(),
            })
        );
    }

    #[test]
    fn slots_are_one_based() {
        let mut shelf = QuickShelf::default();
        shelf.apply_fetched(Ok(vec![link(4, "a"), link(5, "b")]));
        assert_eq!(shelf.slot(0), None);
        assert_eq!(shelf.slot(1).unwrap().id, 4);
        assert_eq!(shelf.slot(2).unwrap().id, 5);
        assert_eq!(shelf.slot(3), None);
    }

    #[test]
    fn failed_fetch_keeps_shelf() {
        let mut shelf = QuickShelf::default();
        shelf.apply_fetched(Ok(vec![link(1, "a")]));
        shelf.apply_fetched(Err(anyhow!("offline")));
        assert_eq!(shelf.links().len(), 1);
    }

    #[test]
    fn delete_only_on_success() {
        let mut shelf = QuickShelf::default();
        shelf.apply_fetched(Ok(vec![link(1, "a"), link(2, "b")]));
        shelf.apply_deleted(1, Err(anyhow!("500")));
        assert_eq!(shelf.links().len(), 2);
        shelf.apply_deleted(1, Ok(()));
        assert_eq!(shelf.links()[0].id, 2);
    }

    #[test]
    fn confirmed_create_refetches() {
        let shelf = QuickShelf::default();
        assert_eq!(shelf.apply_created(&Ok(link(3, "c"))), Some(Request::FetchQuicklinks));
        assert_eq!(shelf.apply_created(&Err(anyhow!("400"))), None);
    }
}
