/// Document title.
pub const PAGE_TITLE: &str = "Skin Analyzer";

/// A `<meta name=... content=...>` entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetaTag {
    /// `name` attribute.
    pub name: &'static str,
    /// `content` attribute.
    pub content: &'static str,
}

/// Static page metadata written into the document head at startup.
pub const PAGE_METADATA: &[MetaTag] = &[
    MetaTag {
        name: "description",
        content: "Take or choose a photo and crop it around your face.",
    },
    MetaTag {
        name: "viewport",
        content: "width=device-width, initial-scale=1",
    },
    MetaTag {
        name: "theme-color",
        content: "#f3f4f6",
    },
];

/// Where head metadata is written, typically the host page's `<head>`.
pub trait HeadSink {
    /// Set the document title.
    fn set_title(&mut self, title: &str);

    /// Create or replace the meta tag called `name`.
    fn set_meta(&mut self, name: &str, content: &str);
}

/// Applies [`PAGE_METADATA`] once, however often startup code runs.
#[derive(Debug, Default)]
pub struct PageMetadata {
    applied: bool,
}

impl PageMetadata {
    /// Nothing applied yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Write the title and every tag to `sink`. Returns `false` if this was
    /// already done.
    pub fn apply_once(&mut self, sink: &mut dyn HeadSink) -> bool {
        if self.applied {
            return false;
        }
        sink.set_title(PAGE_TITLE);
        for tag in PAGE_METADATA {
            sink.set_meta(tag.name, tag.content);
        }
        self.applied = true;
        true
    }
}
