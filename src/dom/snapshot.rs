//! Data-backed [`PageDom`] implementation
//!
//! A [`SnapshotDom`] holds a serialized capture of the page state the
//! generator cares about. The CLI loads one from JSON; tests build them
//! inline. Installed icon links are kept in memory so a test can assert
//! on what would have landed in the document head.

use std::collections::HashMap;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use super::{ElementColors, IconLink, PageDom, PageImage};
use crate::errors::FaviconError;

/// Serializable capture of a page's visually relevant state.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PageSnapshot {
    pub title: Option<String>,
    /// Text of the first `h1` element
    pub headline: Option<String>,
    /// `og:title` meta tag content
    pub og_title: Option<String>,
    /// `meta[name="title"]` content
    pub meta_title: Option<String>,
    pub url: Option<String>,
    /// Computed colors keyed by selector (`body`, `header`, `.navbar`, ...)
    pub elements: HashMap<String, ElementColors>,
    /// Root-element CSS custom properties (`--primary-color`, ...)
    pub custom_properties: HashMap<String, String>,
    pub images: Vec<PageImage>,
    pub icon_links: Vec<IconLink>,
}

/// [`PageDom`] over a [`PageSnapshot`].
#[derive(Debug, Default)]
pub struct SnapshotDom {
    snapshot: PageSnapshot,
    links: Mutex<Vec<IconLink>>,
}

impl SnapshotDom {
    pub fn new(snapshot: PageSnapshot) -> Self {
        let links = Mutex::new(snapshot.icon_links.clone());
        Self { snapshot, links }
    }

    /// Parse a snapshot from its JSON form.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        Ok(Self::new(serde_json::from_str(json)?))
    }

    /// Icon links currently installed, generated ones included.
    pub fn installed_links(&self) -> Vec<IconLink> {
        self.links.lock().expect("link state poisoned").clone()
    }
}

impl PageDom for SnapshotDom {
    fn title(&self) -> Option<String> {
        self.snapshot.title.clone()
    }

    fn headline(&self) -> Option<String> {
        self.snapshot.headline.clone()
    }

    fn meta_title(&self) -> Option<String> {
        self.snapshot
            .og_title
            .clone()
            .or_else(|| self.snapshot.meta_title.clone())
    }

    fn url(&self) -> Option<String> {
        self.snapshot.url.clone()
    }

    fn element_colors(&self, selector: &str) -> Option<ElementColors> {
        self.snapshot.elements.get(selector).cloned()
    }

    fn custom_property(&self, name: &str) -> Option<String> {
        self.snapshot.custom_properties.get(name).cloned()
    }

    fn images(&self) -> Vec<PageImage> {
        self.snapshot.images.clone()
    }

    fn icon_links(&self) -> Vec<IconLink> {
        self.links.lock().expect("link state poisoned").clone()
    }

    fn install_icon_link(&self, link: IconLink) -> Result<(), FaviconError> {
        self.links
            .lock()
            .map_err(|_| FaviconError::dom("link state poisoned"))?
            .push(link);
        Ok(())
    }

    fn remove_generated_icon_links(&self) -> Result<(), FaviconError> {
        self.links
            .lock()
            .map_err(|_| FaviconError::dom("link state poisoned"))?
            .retain(|link| link.manual || !link.rel.contains("icon"));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_round_trip() {
        let json = r##"{
            "title": "Acme Corp",
            "url": "https://acme.example/",
            "elements": {
                "body": { "background_color": "rgb(37, 99, 235)", "color": "#111111" }
            },
            "custom_properties": { "--primary-color": "#2563eb" },
            "images": [
                { "src": "/img/logo.png", "alt": "Acme logo", "container": "header" }
            ]
        }"##;

        let dom = SnapshotDom::from_json(json).unwrap();
        assert_eq!(dom.title().as_deref(), Some("Acme Corp"));
        assert_eq!(
            dom.element_colors("body").unwrap().background_color.as_deref(),
            Some("rgb(37, 99, 235)")
        );
        assert_eq!(
            dom.custom_property("--primary-color").as_deref(),
            Some("#2563eb")
        );
        assert_eq!(dom.images().len(), 1);
        assert!(dom.icon_links().is_empty());
    }

    #[test]
    fn test_meta_title_prefers_og_title() {
        let dom = SnapshotDom::new(PageSnapshot {
            og_title: Some("Acme Corp | Home".to_string()),
            meta_title: Some("Acme Corp".to_string()),
            ..Default::default()
        });
        assert_eq!(dom.meta_title().as_deref(), Some("Acme Corp | Home"));

        let meta_only = SnapshotDom::new(PageSnapshot {
            meta_title: Some("Acme Corp".to_string()),
            ..Default::default()
        });
        assert_eq!(meta_only.meta_title().as_deref(), Some("Acme Corp"));
    }

    #[test]
    fn test_remove_generated_keeps_manual_links() {
        let dom = SnapshotDom::new(PageSnapshot {
            icon_links: vec![
                IconLink {
                    rel: "icon".to_string(),
                    href: "data:image/png;base64,AAAA".to_string(),
                    auto_generated: true,
                    ..Default::default()
                },
                IconLink {
                    rel: "icon".to_string(),
                    href: "/pinned.ico".to_string(),
                    manual: true,
                    ..Default::default()
                },
            ],
            ..Default::default()
        });

        dom.remove_generated_icon_links().unwrap();
        let links = dom.installed_links();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].href, "/pinned.ico");
    }
}
