use cleaner_core::IMAGE_HOST_MARKER;
use scraper::{ElementRef, Html, Selector};

const DOWNLOAD_BUTTON_SELECTOR: &str =
    "download-generated-image-button button[data-test-id=\"download-generated-image-button\"]";
const CONTAINER_IMAGE_SELECTOR: &str =
    "generated-image img.image, single-image img.image, .generated-image-container img";

/// Finds generated-image URLs in the document, in document order.
///
/// Prefers images reachable from a per-image download button (the markers the
/// host page renders next to each generated image); when none are found that
/// way, falls back to scanning the generated-image containers directly. Only
/// sources on the known image host count.
pub fn discover_images(html: &str) -> Vec<String> {
    let doc = Html::parse_document(html);
    let via_buttons = from_download_buttons(&doc);
    if via_buttons.is_empty() {
        from_containers(&doc)
    } else {
        via_buttons
    }
}

fn from_download_buttons(doc: &Html) -> Vec<String> {
    let Ok(button_sel) = Selector::parse(DOWNLOAD_BUTTON_SELECTOR) else {
        return Vec::new();
    };
    doc.select(&button_sel)
        .filter_map(enclosing_container)
        .filter_map(|container| image_source(container))
        .collect()
}

fn from_containers(doc: &Html) -> Vec<String> {
    let Ok(img_sel) = Selector::parse(CONTAINER_IMAGE_SELECTOR) else {
        return Vec::new();
    };
    doc.select(&img_sel)
        .filter_map(|img| img.value().attr("src"))
        .filter(|src| src.contains(IMAGE_HOST_MARKER))
        .map(str::to_string)
        .collect()
}

/// Climbs from a download button to the element wrapping the image it controls.
fn enclosing_container(button: ElementRef<'_>) -> Option<ElementRef<'_>> {
    button.ancestors().filter_map(ElementRef::wrap).find(|el| {
        let name = el.value().name();
        name == "generated-image"
            || name == "single-image"
            || el.value().classes().any(|c| c == "generated-image-container")
    })
}

fn image_source(container: ElementRef<'_>) -> Option<String> {
    let img_sel = Selector::parse("img").ok()?;
    container.select(&img_sel).find_map(|img| {
        img.value()
            .attr("src")
            .filter(|src| src.contains(IMAGE_HOST_MARKER))
            .map(str::to_string)
    })
}

/// Last-computed discovery result, kept only for count display between scans.
/// Discovery itself is always recomputed from the document on demand.
#[derive(Debug, Clone, Default)]
pub struct DiscoverySnapshot {
    images: Vec<String>,
}

impl DiscoverySnapshot {
    pub fn refresh(&mut self, html: &str) -> &[String] {
        self.images = discover_images(html);
        &self.images
    }

    pub fn images(&self) -> &[String] {
        &self.images
    }

    pub fn count(&self) -> usize {
        self.images.len()
    }
}
