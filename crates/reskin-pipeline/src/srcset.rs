//! `srcset` parsing and rewriting.
//!
//! A `srcset` is a comma-separated list of image candidates, each a URL
//! optionally followed by a descriptor (`2x`, `600w`). URLs may
//! themselves contain commas (`data:` URLs), so entries are split the
//! way browsers do it: the URL runs to the first whitespace, and the
//! descriptor runs to the next comma.

/// One candidate of a `srcset` attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SrcsetEntry<'a> {
    /// The candidate URL.
    pub url: &'a str,
    /// The descriptor text (`"2x"`, `"600w"`), if any.
    pub descriptor: Option<&'a str>,
}

/// Parse a `srcset` attribute into its candidates.
#[must_use]
pub fn parse(srcset: &str) -> Vec<SrcsetEntry<'_>> {
    let mut entries = Vec::new();
    let mut rest = srcset;

    loop {
        rest = rest.trim_start_matches(|c: char| c.is_ascii_whitespace() || c == ',');
        if rest.is_empty() {
            break;
        }

        let url_end = rest
            .find(|c: char| c.is_ascii_whitespace())
            .unwrap_or(rest.len());
        let raw_url = &rest[..url_end];
        rest = &rest[url_end..];

        // A URL ending in the separating comma ("a.jpg, b.jpg 2x") has
        // no descriptor.
        let url = raw_url.trim_end_matches(',');
        if url.len() != raw_url.len() {
            entries.push(SrcsetEntry {
                url,
                descriptor: None,
            });
            continue;
        }

        let desc_end = rest.find(',').unwrap_or(rest.len());
        let descriptor = rest[..desc_end].trim();
        rest = &rest[desc_end..];

        entries.push(SrcsetEntry {
            url,
            descriptor: (!descriptor.is_empty()).then_some(descriptor),
        });
    }

    entries
}

/// The URL of the first candidate, if any.
#[must_use]
pub fn first_url(srcset: &str) -> Option<&str> {
    parse(srcset).first().map(|e| e.url)
}

/// Point every candidate at `new_src`, keeping each descriptor and the
/// number of candidates.
#[must_use]
pub fn rewrite(srcset: &str, new_src: &str) -> String {
    parse(srcset)
        .iter()
        .map(|entry| match entry.descriptor {
            Some(d) => format!("{new_src} {d}"),
            None => new_src.to_owned(),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_density_descriptors() {
        let entries = parse("a.jpg 1x, b.jpg 2x");
        assert_eq!(
            entries,
            vec![
                SrcsetEntry {
                    url: "a.jpg",
                    descriptor: Some("1x")
                },
                SrcsetEntry {
                    url: "b.jpg",
                    descriptor: Some("2x")
                },
            ]
        );
    }

    #[test]
    fn parses_entry_without_descriptor() {
        let entries = parse("solo.jpg");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].descriptor, None);
    }

    #[test]
    fn trailing_comma_url_has_no_descriptor() {
        let entries = parse("a.jpg, b.jpg 600w");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].url, "a.jpg");
        assert_eq!(entries[0].descriptor, None);
        assert_eq!(entries[1].descriptor, Some("600w"));
    }

    #[test]
    fn data_url_commas_stay_in_the_url() {
        let srcset = "data:image/png;base64,iVBORw0KGgo= 1x, /b.png 2x";
        let entries = parse(srcset);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].url, "data:image/png;base64,iVBORw0KGgo=");
        assert_eq!(first_url(srcset), Some("data:image/png;base64,iVBORw0KGgo="));
    }

    #[test]
    fn tolerates_extra_whitespace_and_trailing_comma() {
        let entries = parse("  a.jpg   300w ,\n b.jpg 600w ,  ");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].descriptor, Some("300w"));
        assert_eq!(entries[1].url, "b.jpg");
    }

    #[test]
    fn empty_srcset() {
        assert!(parse("").is_empty());
        assert!(parse(" , ,").is_empty());
        assert_eq!(first_url(""), None);
    }

    #[test]
    fn rewrite_preserves_descriptors_and_count() {
        let out = rewrite("a.jpg 1x, b.jpg 2x, c.jpg 600w", "/images/wide/x.jpg");
        assert_eq!(
            out,
            "/images/wide/x.jpg 1x, /images/wide/x.jpg 2x, /images/wide/x.jpg 600w"
        );
        assert_eq!(parse(&out).len(), 3);
    }

    #[test]
    fn rewrite_keeps_bare_entries_bare() {
        assert_eq!(rewrite("a.jpg, b.jpg 2x", "/n.jpg"), "/n.jpg, /n.jpg 2x");
    }
}
