//! Alpha-channel transparency detection.
//!
//! An image counts as transparent when more than 0.1% of its pixels have
//! an alpha below 255. The noise floor keeps anti-aliased edges and
//! compression artifacts in otherwise opaque images from flipping the
//! verdict.
//!
//! Detection is fail-closed: any error while resolving, fetching, or
//! decoding the source yields `false`.

use base64::Engine as _;
use serde::Serialize;

use crate::host::Host;
use crate::srcset;
use crate::types::{ImageSnapshot, ReskinError, RgbaImage};

/// Verdict threshold: transparent pixels must exceed this many per
/// thousand (0.1%). The comparison is strict.
pub const THRESHOLD_PER_MILLE: u64 = 1;

/// Counts of pixels by alpha bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct AlphaHistogram {
    /// Alpha 255.
    pub opaque: u64,
    /// Alpha 0.
    pub transparent: u64,
    /// Alpha 1-254.
    pub partial: u64,
}

impl AlphaHistogram {
    /// Bucket every pixel of an RGBA image.
    #[must_use]
    pub fn from_image(image: &RgbaImage) -> Self {
        Self::from_rgba_bytes(image.as_raw())
    }

    /// Bucket raw RGBA bytes (4 bytes per pixel, alpha last). A trailing
    /// partial pixel is ignored.
    #[must_use]
    pub fn from_rgba_bytes(data: &[u8]) -> Self {
        let mut hist = Self::default();
        for px in data.chunks_exact(4) {
            match px[3] {
                255 => hist.opaque += 1,
                0 => hist.transparent += 1,
                _ => hist.partial += 1,
            }
        }
        hist
    }

    /// Total pixel count.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.opaque + self.transparent + self.partial
    }

    /// Pixels that are not fully opaque.
    #[must_use]
    pub const fn non_opaque(&self) -> u64 {
        self.transparent + self.partial
    }

    /// Share of non-opaque pixels in percent. `0.0` for an empty image.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn transparency_percent(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        self.non_opaque() as f64 / total as f64 * 100.0
    }

    /// Whether the non-opaque share strictly exceeds 0.1%.
    ///
    /// Computed in integers so exactly 0.1% is reliably `false`.
    #[must_use]
    pub const fn has_significant_transparency(&self) -> bool {
        self.non_opaque() * 1000 > self.total() * THRESHOLD_PER_MILLE
    }
}

/// Where the detector should read pixels from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InspectionSource<'a> {
    /// A `data:` URL, decoded in place.
    Embedded(&'a str),
    /// A URL the host must load, already routed through the proxy origin.
    Remote(String),
}

/// Pick the URL to inspect: the first `srcset` candidate if there is one,
/// else `src`.
#[must_use]
pub fn inspection_source<'a>(snapshot: &'a ImageSnapshot, origin: &str) -> InspectionSource<'a> {
    let url = snapshot
        .srcset
        .as_deref()
        .and_then(srcset::first_url)
        .unwrap_or(&snapshot.src);
    if is_data_url(url) {
        InspectionSource::Embedded(url)
    } else {
        InspectionSource::Remote(proxied_url(url, origin))
    }
}

fn is_data_url(url: &str) -> bool {
    url.get(..5).is_some_and(|s| s.eq_ignore_ascii_case("data:"))
}

/// Route `url` through the proxy at `origin` so its pixels are readable
/// same-origin.
///
/// - same-origin URLs are returned unchanged
/// - other `http(s)` URLs become `origin/host/path?query`
/// - root-relative URLs become `origin/path`
/// - other relative URLs become `origin/url`
/// - any other scheme (`blob:`) is returned unchanged
#[must_use]
pub fn proxied_url(url: &str, origin: &str) -> String {
    let origin = origin.trim_end_matches('/');

    let absolute = if url.starts_with("//") {
        url::Url::parse(&format!("https:{url}"))
    } else {
        url::Url::parse(url)
    };

    match absolute {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {
            if parsed.origin().ascii_serialization() == origin {
                return url.to_owned();
            }
            let host = parsed.host_str().unwrap_or_default();
            let mut out = format!("{origin}/{host}{}", parsed.path());
            if let Some(query) = parsed.query() {
                out.push('?');
                out.push_str(query);
            }
            out
        }
        Ok(_) => url.to_owned(),
        Err(_) if url.starts_with('/') => format!("{origin}{url}"),
        Err(_) => format!("{origin}/{url}"),
    }
}

/// Decode the payload of a base64 `data:` URL.
///
/// # Errors
///
/// Returns [`ReskinError::InvalidDataUrl`] if the URL has no payload
/// separator, is not base64-encoded, or the payload is not valid base64.
pub fn decode_data_url(url: &str) -> Result<Vec<u8>, ReskinError> {
    if !is_data_url(url) {
        return Err(ReskinError::InvalidDataUrl("missing data: scheme".into()));
    }
    let (meta, payload) = url[5..]
        .split_once(',')
        .ok_or_else(|| ReskinError::InvalidDataUrl("missing ',' separator".into()))?;
    if !meta.to_ascii_lowercase().ends_with(";base64") {
        return Err(ReskinError::InvalidDataUrl(format!(
            "unsupported encoding in {meta:?}"
        )));
    }
    let compact: String = payload
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    base64::engine::general_purpose::STANDARD
        .decode(compact)
        .map_err(|e| ReskinError::InvalidDataUrl(e.to_string()))
}

/// Decode encoded image bytes into an RGBA surface at natural size.
///
/// # Errors
///
/// Returns [`ReskinError::EmptyInput`] if `bytes` is empty and
/// [`ReskinError::ImageDecode`] if the format is unrecognized or corrupt.
pub fn decode_rgba(bytes: &[u8]) -> Result<RgbaImage, ReskinError> {
    if bytes.is_empty() {
        return Err(ReskinError::EmptyInput);
    }
    Ok(image::load_from_memory(bytes)?.to_rgba8())
}

/// Histogram of an encoded image.
///
/// # Errors
///
/// Propagates [`decode_rgba`] errors.
pub fn histogram_of_bytes(bytes: &[u8]) -> Result<AlphaHistogram, ReskinError> {
    decode_rgba(bytes).map(|img| AlphaHistogram::from_image(&img))
}

/// Decide whether the image behind `snapshot` is materially transparent.
///
/// Embedded sources are decoded directly when they carry a base64 raster
/// payload. Anything else (`image/svg+xml`, percent-encoded payloads) is
/// handed to `host`, which rasterizes `data:` URLs without a fetch. Remote
/// sources are always loaded through `host`. Never fails: errors are
/// logged and produce `false`.
#[allow(clippy::future_not_send)] // hosts are single-threaded
pub async fn has_transparency<H: Host>(host: &H, snapshot: &ImageSnapshot) -> bool {
    let outcome = match inspection_source(snapshot, &host.origin()) {
        InspectionSource::Embedded(url) => {
            match decode_data_url(url).and_then(|bytes| histogram_of_bytes(&bytes)) {
                Err(ReskinError::InvalidDataUrl(_) | ReskinError::ImageDecode(_)) => {
                    log::debug!("rasterizing embedded source through the host");
                    host.load_pixels(url)
                        .await
                        .map(|img| AlphaHistogram::from_image(&img))
                }
                decoded => decoded,
            }
        }
        InspectionSource::Remote(url) => {
            log::debug!("loading {url} for transparency check");
            host.load_pixels(&url)
                .await
                .map(|img| AlphaHistogram::from_image(&img))
        }
    };

    match outcome {
        Ok(hist) => verdict(&hist),
        Err(e) => {
            log::warn!("transparency check failed for {}: {e}", snapshot.src);
            false
        }
    }
}

fn verdict(hist: &AlphaHistogram) -> bool {
    let significant = hist.has_significant_transparency();
    log::debug!(
        "alpha histogram opaque={} partial={} transparent={} ({:.4}%) -> {significant}",
        hist.opaque,
        hist.partial,
        hist.transparent,
        hist.transparency_percent(),
    );
    significant
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn encode_png(img: &RgbaImage) -> Vec<u8> {
        let mut buf = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut buf);
        image::ImageEncoder::write_image(
            encoder,
            img.as_raw(),
            img.width(),
            img.height(),
            image::ExtendedColorType::Rgba8,
        )
        .unwrap();
        buf
    }

    /// A `w`x`h` opaque image whose first `n` pixels (row-major) have `alpha`.
    fn with_clear_pixels(w: u32, h: u32, n: u32, alpha: u8) -> RgbaImage {
        RgbaImage::from_fn(w, h, |x, y| {
            let a = if y * w + x < n { alpha } else { 255 };
            image::Rgba([200, 10, 10, a])
        })
    }

    #[test]
    fn buckets_alpha_values() {
        let data = [0, 0, 0, 255, 0, 0, 0, 0, 0, 0, 0, 128, 0, 0, 0, 1];
        let hist = AlphaHistogram::from_rgba_bytes(&data);
        assert_eq!(
            hist,
            AlphaHistogram {
                opaque: 1,
                transparent: 1,
                partial: 2
            }
        );
        assert_eq!(hist.total(), 4);
        assert!((hist.transparency_percent() - 75.0).abs() < 1e-9);
    }

    #[test]
    fn fully_opaque_is_not_transparent() {
        let img = with_clear_pixels(50, 50, 0, 0);
        let hist = AlphaHistogram::from_image(&img);
        assert_eq!(hist.non_opaque(), 0);
        assert!(!hist.has_significant_transparency());
    }

    #[test]
    fn exactly_one_tenth_percent_is_not_transparent() {
        // 1 of 1000 pixels.
        let img = with_clear_pixels(100, 10, 1, 0);
        assert!(!AlphaHistogram::from_image(&img).has_significant_transparency());
    }

    #[test]
    fn just_over_one_tenth_percent_is_transparent() {
        // 2 of 1000 pixels, partially transparent.
        let img = with_clear_pixels(100, 10, 2, 200);
        assert!(AlphaHistogram::from_image(&img).has_significant_transparency());
    }

    #[test]
    fn empty_histogram_is_not_transparent() {
        let hist = AlphaHistogram::default();
        assert!(!hist.has_significant_transparency());
        assert!(hist.transparency_percent().abs() < f64::EPSILON);
    }

    #[test]
    fn png_bytes_round_trip_through_decoder() {
        let clear = encode_png(&with_clear_pixels(20, 20, 40, 0));
        assert!(histogram_of_bytes(&clear).unwrap().has_significant_transparency());
        let solid = encode_png(&with_clear_pixels(20, 20, 0, 0));
        assert!(!histogram_of_bytes(&solid).unwrap().has_significant_transparency());
    }

    #[test]
    fn decode_failures_are_reported() {
        assert!(histogram_of_bytes(&[0x89, 0x50, 0x00]).is_err());
        assert!(matches!(decode_rgba(&[]), Err(ReskinError::EmptyInput)));
        assert!(matches!(
            decode_rgba(&[1, 2, 3]),
            Err(ReskinError::ImageDecode(_))
        ));
    }

    #[test]
    fn data_url_decoding() {
        let png = encode_png(&with_clear_pixels(4, 4, 16, 0));
        let b64 = base64::engine::general_purpose::STANDARD.encode(&png);
        let url = format!("data:image/png;base64,{b64}");
        assert_eq!(decode_data_url(&url).unwrap(), png);
        assert!(matches!(
            decode_data_url("data:image/svg+xml,<svg/>"),
            Err(ReskinError::InvalidDataUrl(_))
        ));
        assert!(matches!(
            decode_data_url("data:image/png;base64"),
            Err(ReskinError::InvalidDataUrl(_))
        ));
        assert!(matches!(
            decode_data_url("data:image/png;base64,@@@"),
            Err(ReskinError::InvalidDataUrl(_))
        ));
    }

    #[test]
    fn source_prefers_first_srcset_candidate() {
        let snap = ImageSnapshot::new("https://proxy.test/a.com/small.jpg", 300.0, 300.0)
            .with_srcset("https://a.com/big.png 2x, https://a.com/huge.png 3x");
        assert_eq!(
            inspection_source(&snap, "https://proxy.test"),
            InspectionSource::Remote("https://proxy.test/a.com/big.png".into())
        );
    }

    #[test]
    fn data_sources_are_embedded() {
        let snap = ImageSnapshot::new("DATA:image/png;base64,AAAA", 300.0, 300.0);
        assert_eq!(
            inspection_source(&snap, "https://proxy.test"),
            InspectionSource::Embedded("DATA:image/png;base64,AAAA")
        );
    }

    #[test]
    fn proxy_routing() {
        let origin = "https://proxy.test";
        assert_eq!(
            proxied_url("https://proxy.test/site.com/a.png", origin),
            "https://proxy.test/site.com/a.png"
        );
        assert_eq!(
            proxied_url("http://cdn.site.com/img/a.png?v=2", origin),
            "https://proxy.test/cdn.site.com/img/a.png?v=2"
        );
        assert_eq!(
            proxied_url("//cdn.site.com/a.png", origin),
            "https://proxy.test/cdn.site.com/a.png"
        );
        assert_eq!(
            proxied_url("/site.com/a.png", "https://proxy.test/"),
            "https://proxy.test/site.com/a.png"
        );
        assert_eq!(
            proxied_url("img/a.png", origin),
            "https://proxy.test/img/a.png"
        );
        assert_eq!(
            proxied_url("blob:https://proxy.test/123", origin),
            "blob:https://proxy.test/123"
        );
    }
}
