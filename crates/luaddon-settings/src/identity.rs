//! Addon identity in enabled-path entries.
//!
//! An entry belongs to addon `name` when its path components contain the
//! consecutive segments `<namespace>`, `addons`, `<name>`. Matching is done
//! on whole components, so `foo` never claims `.../addons/foobar`.

use std::path::Path;

use indexmap::IndexMap;

/// Directory segment between the namespace and the addon name.
pub const ADDONS_SEGMENT: &str = "addons";

/// Extract the addon name an entry refers to, if any.
pub fn addon_name_in<'a>(entry: &'a str, namespace: &str) -> Option<&'a str> {
    let components: Vec<&str> = entry
        .split(['/', '\\'])
        .filter(|c| !c.is_empty())
        .collect();

    components
        .windows(3)
        .find(|w| w[0] == namespace && w[1] == ADDONS_SEGMENT)
        .map(|w| w[2])
}

/// Encode an addon location as an enabled-list entry.
///
/// The leading separator is dropped; matching is component based so the
/// stored form still identifies the addon.
pub fn encode_location(location: &Path) -> String {
    let text = location.to_string_lossy();
    text.strip_prefix(['/', '\\']).unwrap_or(text.as_ref()).to_string()
}

/// Keyed view of an enabled list: addon name to the entry positions naming it.
#[derive(Debug, Clone, Default)]
pub struct EnabledIndex {
    positions: IndexMap<String, Vec<usize>>,
}

impl EnabledIndex {
    /// Index the entries of an enabled list.
    pub fn build(entries: &[String], namespace: &str) -> Self {
        let mut positions: IndexMap<String, Vec<usize>> = IndexMap::new();
        for (i, entry) in entries.iter().enumerate() {
            if let Some(name) = addon_name_in(entry, namespace) {
                positions.entry(name.to_string()).or_default().push(i);
            }
        }
        Self { positions }
    }

    /// Whether any entry names this addon.
    pub fn contains(&self, name: &str) -> bool {
        self.positions.contains_key(name)
    }

    /// Positions of the entries naming this addon, in list order.
    pub fn positions(&self, name: &str) -> &[usize] {
        self.positions.get(name).map(Vec::as_slice).unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NS: &str = "sumneko.lua";

    #[test]
    fn test_segment_exact_matching() {
        assert_eq!(addon_name_in("/root/sumneko.lua/addons/foobar", NS), Some("foobar"));
        assert_ne!(addon_name_in("/root/sumneko.lua/addons/foobar", NS), Some("foo"));
        assert_eq!(addon_name_in("a/sumneko.lua/addons/foo/module/library", NS), Some("foo"));
        assert_eq!(addon_name_in("C:\\Users\\me\\sumneko.lua\\addons\\busted", NS), Some("busted"));
    }

    #[test]
    fn test_requires_namespace_and_addons_segment() {
        assert_eq!(addon_name_in("/root/other.ext/addons/foo", NS), None);
        assert_eq!(addon_name_in("/root/sumneko.lua/plugins/foo", NS), None);
        assert_eq!(addon_name_in("/root/sumneko.lua/addons", NS), None);
        assert_eq!(addon_name_in("/root/xsumneko.lua/addons/foo", NS), None);
        assert_eq!(addon_name_in("", NS), None);
    }

    #[test]
    fn test_encode_strips_leading_separator() {
        assert_eq!(
            encode_location(Path::new("/a/sumneko.lua/addons/foo")),
            "a/sumneko.lua/addons/foo"
        );
        assert_eq!(
            encode_location(Path::new("a/sumneko.lua/addons/foo")),
            "a/sumneko.lua/addons/foo"
        );
    }

    #[test]
    fn test_index_positions() {
        let entries = vec![
            "/x/sumneko.lua/addons/bar".to_string(),
            "/usr/share/lua/5.4".to_string(),
            "x/sumneko.lua/addons/foo".to_string(),
        ];
        let index = EnabledIndex::build(&entries, NS);

        assert!(index.contains("bar"));
        assert!(index.contains("foo"));
        assert!(!index.contains("fo"));
        assert_eq!(index.positions("foo"), &[2]);
        assert!(index.positions("missing").is_empty());
        assert_eq!(index.positions("bar"), &[0]);
    }
}
