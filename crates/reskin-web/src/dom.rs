//! [`PageImage`] over a live `<img>` element.

use reskin_pipeline::{
    Bounds, DeclaredSize, ElementNode, ImageSnapshot, ImageState, Offsets, PageImage, Positioning,
    SwapPlan,
};
use wasm_bindgen::JsCast;
use web_sys::{CssStyleDeclaration, Element, HtmlImageElement, Node, NodeList};

use crate::event;

/// `dataset` key of the progress marker (`data-proxy-processed`).
const MARKER: &str = "proxyProcessed";

/// A handle to an `<img>` on the page.
#[derive(Debug, Clone)]
pub struct DomImage {
    element: HtmlImageElement,
}

impl DomImage {
    #[must_use]
    pub const fn new(element: HtmlImageElement) -> Self {
        Self { element }
    }

    #[must_use]
    pub const fn element(&self) -> &HtmlImageElement {
        &self.element
    }

    /// Every `<img>` at or below `node`.
    ///
    /// `node` itself is included when it is an image; text and comment
    /// nodes yield nothing.
    #[must_use]
    pub fn within(node: &Node) -> Vec<Self> {
        if let Some(img) = node.dyn_ref::<HtmlImageElement>() {
            return vec![Self::new(img.clone())];
        }
        node.dyn_ref::<Element>()
            .and_then(|el| el.query_selector_all("img").ok())
            .map(|list| images_in(&list))
            .unwrap_or_default()
    }

    fn set_style(&self, property: &str, value: &str) {
        if let Err(e) = self.element.style().set_property(property, value) {
            log::warn!("failed to set {property}: {e:?}");
        }
    }
}

fn images_in(list: &NodeList) -> Vec<DomImage> {
    (0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|node| node.dyn_into::<HtmlImageElement>().ok())
        .map(DomImage::new)
        .collect()
}

fn bounds_of(element: &Element) -> Bounds {
    let rect = element.get_bounding_client_rect();
    Bounds {
        x: rect.x(),
        y: rect.y(),
        width: rect.width(),
        height: rect.height(),
    }
}

fn node_of(element: &Element) -> ElementNode {
    ElementNode {
        tag: element.tag_name().to_ascii_lowercase(),
        class: element.class_name(),
        role: element.get_attribute("role"),
    }
}

fn lineage_of(element: &Element) -> Vec<ElementNode> {
    let mut lineage = vec![node_of(element)];
    let mut current = element.parent_element();
    while let Some(ancestor) = current {
        lineage.push(node_of(&ancestor));
        current = ancestor.parent_element();
    }
    lineage
}

fn non_empty(value: String) -> Option<String> {
    (!value.trim().is_empty()).then_some(value)
}

fn property(style: Option<&CssStyleDeclaration>, name: &str) -> String {
    style
        .and_then(|s| s.get_property_value(name).ok())
        .unwrap_or_default()
}

impl PageImage for DomImage {
    fn snapshot(&self) -> ImageSnapshot {
        let el = &self.element;
        let computed = web_sys::window().and_then(|w| w.get_computed_style(el).ok().flatten());
        let computed = computed.as_ref();
        let inline = el.style();

        ImageSnapshot {
            bounds: bounds_of(el),
            src: el.src(),
            srcset: non_empty(el.srcset()),
            has_sizes: el.has_attribute("sizes"),
            positioning: Positioning::from_css(&property(computed, "position")),
            offsets: Offsets::from_css(
                &property(computed, "top"),
                &property(computed, "right"),
                &property(computed, "bottom"),
                &property(computed, "left"),
            ),
            lineage: lineage_of(el),
            parent_bounds: el.parent_element().map(|p| bounds_of(&p)),
            declared_width: DeclaredSize {
                style: non_empty(property(Some(&inline), "width")),
                attribute: el.get_attribute("width"),
            },
            declared_height: DeclaredSize {
                style: non_empty(property(Some(&inline), "height")),
                attribute: el.get_attribute("height"),
            },
        }
    }

    fn state(&self) -> ImageState {
        ImageState::from_marker(self.element.dataset().get(MARKER).as_deref())
    }

    fn set_state(&self, state: ImageState) {
        let dataset = self.element.dataset();
        match state.marker() {
            Some(marker) => {
                if let Err(e) = dataset.set(MARKER, marker) {
                    log::warn!("failed to mark image: {e:?}");
                }
            }
            None => dataset.delete(MARKER),
        }
    }

    fn is_decoded(&self) -> bool {
        self.element.complete() && self.element.natural_width() > 0
    }

    async fn decoded(&self) {
        let settled = event::first_of(&self.element, &["load", "error"], &[], || Ok(())).await;
        if let Err(e) = settled {
            log::warn!("stopped waiting for {}: {e}", self.element.src());
        }
    }

    fn apply(&self, plan: &SwapPlan) {
        let el = &self.element;
        el.set_src(&plan.src);
        if let Some(srcset) = &plan.srcset {
            el.set_srcset(srcset);
        }
        if plan.remove_sizes
            && let Err(e) = el.remove_attribute("sizes")
        {
            log::warn!("failed to remove sizes: {e:?}");
        }

        self.set_style("width", &plan.width);
        self.set_style("height", &plan.height);
        self.set_style("object-fit", plan.object_fit.as_str());
        self.set_style("object-position", plan.object_position);
        self.set_style("transition", plan.transition);
        self.set_style("opacity", "0");
    }

    fn set_opacity(&self, opacity: f64) {
        self.set_style("opacity", &opacity.to_string());
    }
}
