//! Narrow DOM capability interface
//!
//! The generator never talks to a real document tree. Everything it needs
//! from the page goes through [`PageDom`]: title and URL, computed color
//! properties for a selector, CSS custom properties, candidate images,
//! and the icon `<link>` elements in the document head. This keeps the
//! extraction pipeline testable against a plain data snapshot.

use serde::{Deserialize, Serialize};

use crate::errors::FaviconError;

pub mod snapshot;

pub use snapshot::SnapshotDom;

/// Computed color properties of a single element.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ElementColors {
    pub background_color: Option<String>,
    pub color: Option<String>,
    pub border_color: Option<String>,
}

/// Structural container an image was found in, used to rank logo
/// candidates when no attribute mentions "logo".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageContainer {
    Header,
    Nav,
    Brand,
    Other,
}

impl Default for ImageContainer {
    fn default() -> Self {
        Self::Other
    }
}

/// An `<img>` element as seen by the extractor.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PageImage {
    pub src: String,
    pub alt: String,
    pub class: String,
    pub id: String,
    pub container: ImageContainer,
}

/// An icon `<link>` element in the document head.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IconLink {
    pub rel: String,
    pub href: String,
    pub link_type: Option<String>,
    /// Installed by this generator on a previous pass
    pub auto_generated: bool,
    /// Explicitly pinned by the page author; never removed
    pub manual: bool,
}

/// Read and write access to the visually relevant parts of a page.
///
/// Read methods return `None`/empty on anything unreadable rather than
/// erroring; a missing element simply drops out of the pipeline.
pub trait PageDom: Send + Sync {
    /// Document title, if any.
    fn title(&self) -> Option<String>;

    /// Text of the page's first `h1`, consulted when the document title
    /// is missing. Backends without headings report `None`.
    fn headline(&self) -> Option<String> {
        None
    }

    /// Title carried by `og:title` or `meta[name="title"]` tags, the
    /// last resort before the fixed default.
    fn meta_title(&self) -> Option<String> {
        None
    }

    /// Full page URL, used for domain derivation.
    fn url(&self) -> Option<String>;

    /// Computed background/text/border colors for the first element
    /// matching the selector.
    fn element_colors(&self, selector: &str) -> Option<ElementColors>;

    /// Value of a CSS custom property on the root element.
    fn custom_property(&self, name: &str) -> Option<String>;

    /// All `<img>` elements on the page, in document order.
    fn images(&self) -> Vec<PageImage>;

    /// Icon `<link>` elements currently in the document head.
    fn icon_links(&self) -> Vec<IconLink>;

    /// Insert an icon link into the document head.
    fn install_icon_link(&self, link: IconLink) -> Result<(), FaviconError>;

    /// Remove previously generated icon links, leaving `manual` ones
    /// untouched.
    fn remove_generated_icon_links(&self) -> Result<(), FaviconError>;
}
