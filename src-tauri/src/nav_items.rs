//! Sidebar / tab bar entries

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum NavIcon {
    QrCode,
    ScanLine,
    History,
    Settings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NavItem {
    pub href: &'static str,
    pub label: &'static str,
    pub icon: NavIcon,
}

pub const NAV_ITEMS: [NavItem; 4] = [
    NavItem { href: "/", label: "生成", icon: NavIcon::QrCode },
    NavItem { href: "/scan", label: "扫描", icon: NavIcon::ScanLine },
    NavItem { href: "/history", label: "历史", icon: NavIcon::History },
    NavItem { href: "/settings", label: "设置", icon: NavIcon::Settings },
];

impl NavItem {
    /// Whether this item should be highlighted for the route `path`.
    /// The root item only matches `/` itself.
    pub fn is_active(&self, path: &str) -> bool {
        if self.href == "/" {
            return path == "/";
        }
        path == self.href
            || path
                .strip_prefix(self.href)
                .is_some_and(|rest| rest.starts_with('/'))
    }
}

pub fn active_item(path: &str) -> Option<&'static NavItem> {
    NAV_ITEMS.iter().find(|item| item.is_active(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_only_matches_itself() {
        assert_eq!(active_item("/").map(|i| i.href), Some("/"));
        assert_eq!(active_item("/history").map(|i| i.href), Some("/history"));
        assert_eq!(active_item("/history/42").map(|i| i.href), Some("/history"));
    }

    #[test]
    fn prefix_must_end_at_segment() {
        assert_eq!(active_item("/scanner"), None);
        assert_eq!(active_item("/unknown"), None);
    }

    #[test]
    fn icons_serialize_kebab_case() {
        let json = serde_json::to_value(NAV_ITEMS[1]).unwrap();
        assert_eq!(json["icon"], "scan-line");
        assert_eq!(json["href"], "/scan");
    }
}
