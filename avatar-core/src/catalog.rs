//! The compiled-in catalog of overlay assets.

use serde::Serialize;

/// A decorative overlay offered to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Asset {
    /// Same-origin URL of the image.
    pub url: &'static str,
    /// Name shown in notifications.
    pub display_name: &'static str,
}

const BUILTIN: &[Asset] = &[
    Asset {
        url: "/0g_glasses.png",
        display_name: "Glasses",
    },
    Asset {
        url: "/0G_gradient_logo.png",
        display_name: "Gradient logo",
    },
    Asset {
        url: "/0g-Panda.png",
        display_name: "Panda",
    },
    Asset {
        url: "/panda_flying.png",
        display_name: "Flying panda",
    },
    Asset {
        url: "/0g_sticker_1.png",
        display_name: "0G sticker",
    },
    Asset {
        url: "/0g_sticker_2.png",
        display_name: "0G sticker",
    },
    Asset {
        url: "/0g_sticker_3.png",
        display_name: "0G sticker",
    },
    Asset {
        url: "/0g_sticker_4.png",
        display_name: "0G sticker",
    },
    Asset {
        url: "/0g_sticker_5.png",
        display_name: "0G sticker",
    },
];

/// Read-only list of overlay assets.
#[derive(Debug, Clone, Copy)]
pub struct AssetCatalog {
    assets: &'static [Asset],
}

impl AssetCatalog {
    /// The overlays shipped with the editor.
    #[must_use]
    pub fn builtin() -> Self {
        Self { assets: BUILTIN }
    }

    /// All assets in display order.
    #[must_use]
    pub fn assets(&self) -> &'static [Asset] {
        self.assets
    }

    /// Look an asset up by URL. A missing leading slash is tolerated.
    #[must_use]
    pub fn find(&self, url: &str) -> Option<&'static Asset> {
        let url = url.trim_start_matches('/');
        self.assets
            .iter()
            .find(|a| a.url.trim_start_matches('/') == url)
    }

    /// Number of assets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.assets.len()
    }

    /// Whether the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

impl Default for AssetCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog() {
        let catalog = AssetCatalog::builtin();
        assert_eq!(catalog.len(), 9);
        assert_eq!(catalog.assets()[0].display_name, "Glasses");
    }

    #[test]
    fn test_find_with_and_without_slash() {
        let catalog = AssetCatalog::builtin();
        assert_eq!(
            catalog.find("/0g_glasses.png").map(|a| a.display_name),
            Some("Glasses")
        );
        assert_eq!(
            catalog.find("panda_flying.png").map(|a| a.display_name),
            Some("Flying panda")
        );
        assert!(catalog.find("/missing.png").is_none());
    }

    #[test]
    fn test_urls_are_unique() {
        let catalog = AssetCatalog::builtin();
        let mut urls: Vec<_> = catalog.assets().iter().map(|a| a.url).collect();
        urls.sort_unstable();
        urls.dedup();
        assert_eq!(urls.len(), catalog.len());
    }
}
