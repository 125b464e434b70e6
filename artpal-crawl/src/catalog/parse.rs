//! CSS-selector extraction from catalog listing pages

use crate::catalog::CatalogEntry;
use crate::error::NavigationError;
use artpal_common::db::or_anonymous;
use reqwest::Url;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

/// Selectors for the pagination control and the listing cards
#[derive(Debug, Clone)]
pub struct ListingSelectors {
    pagination: Selector,
    card: Selector,
    image: Selector,
    title: Selector,
    artist: Selector,
}

impl ListingSelectors {
    /// Selectors for the artvee catalog markup
    pub fn artvee() -> Result<Self, NavigationError> {
        Self::from_css(
            ".page-numbers a",
            ".product-grid-item",
            ".product-image-link img",
            ".product-title a",
            ".woodmart-product-brands-links",
        )
    }

    pub fn from_css(
        pagination: &str,
        card: &str,
        image: &str,
        title: &str,
        artist: &str,
    ) -> Result<Self, NavigationError> {
        Ok(Self {
            pagination: compile(pagination)?,
            card: compile(card)?,
            image: compile(image)?,
            title: compile(title)?,
            artist: compile(artist)?,
        })
    }
}

fn compile(css: &str) -> Result<Selector, NavigationError> {
    Selector::parse(css).map_err(|e| NavigationError::InvalidSelector {
        selector: css.to_string(),
        reason: e.to_string(),
    })
}

/// Visible text with runs of whitespace collapsed
fn inner_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Highest page number offered by the pagination control
///
/// Takes the last label that is numeric once thousands separators are
/// removed; the trailing "next" arrow is skipped that way.
pub fn last_page_number(html: &str, selectors: &ListingSelectors) -> Option<u32> {
    let document = Html::parse_document(html);
    let labels: Vec<String> = document
        .select(&selectors.pagination)
        .map(inner_text)
        .collect();

    labels
        .iter()
        .rev()
        .filter_map(|label| label.replace(',', "").trim().parse::<u32>().ok())
        .find(|&n| n >= 1)
}

/// Entries of one listing page, in document order
///
/// Each card yields one entry so links, titles and artists stay aligned.
/// Cards without an image are skipped.
pub fn listing_entries(html: &str, page_url: &Url, selectors: &ListingSelectors) -> Vec<CatalogEntry> {
    let document = Html::parse_document(html);
    let mut entries = Vec::new();

    for card in document.select(&selectors.card) {
        let Some(image_link) = card
            .select(&selectors.image)
            .next()
            .and_then(|img| {
                ["src", "data-src"]
                    .into_iter()
                    .filter_map(|attr| img.value().attr(attr))
                    .find(|src| !src.trim().is_empty())
            })
            .and_then(|src| page_url.join(src.trim()).ok())
        else {
            debug!("Skipping listing card without an image");
            continue;
        };

        let title = card.select(&selectors.title).next().map(inner_text);
        let artist = card
            .select(&selectors.artist)
            .next()
            .and_then(|brands| brands.children().find_map(ElementRef::wrap))
            .map(inner_text);

        entries.push(CatalogEntry {
            image_link: image_link.to_string(),
            title: or_anonymous(title.as_deref()),
            artist: or_anonymous(artist.as_deref()),
        });
    }

    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGINATION: &str = r#"
        <nav class="woocommerce-pagination">
          <ul class="page-numbers">
            <li><span class="page-numbers current">1</span></li>
            <li><a class="page-numbers" href="/page/2/">2</a></li>
            <li><a class="page-numbers" href="/page/3/">3</a></li>
            <li><span class="page-numbers dots">…</span></li>
            <li><a class="page-numbers" href="/page/1412/">1,412</a></li>
            <li><a class="next page-numbers" href="/page/2/">→</a></li>
          </ul>
        </nav>"#;

    fn card(src: &str, title: &str, brands: &str) -> String {
        format!(
            r#"<div class="product-grid-item">
                 <a class="product-image-link" href="/dl/x"><img src="{src}"></a>
                 <h3 class="product-title"><a href="/dl/x">{title}</a></h3>
                 {brands}
               </div>"#
        )
    }

    fn page_url() -> Url {
        Url::parse("https://artvee.com/c/figurative/page/7/").unwrap()
    }

    #[test]
    fn test_last_page_strips_thousands_separator() {
        let selectors = ListingSelectors::artvee().unwrap();
        assert_eq!(last_page_number(PAGINATION, &selectors), Some(1412));
    }

    #[test]
    fn test_last_page_missing_pagination() {
        let selectors = ListingSelectors::artvee().unwrap();
        assert_eq!(last_page_number("<html><body></body></html>", &selectors), None);
    }

    #[test]
    fn test_listing_entries_stay_aligned() {
        let selectors = ListingSelectors::artvee().unwrap();
        let html = format!(
            "<html><body>{}{}{}</body></html>",
            card(
                "https://mdl.artvee.com/a.jpg",
                "The Bathers",
                r#"<div class="woodmart-product-brands-links"><a href="/artist/c">Cézanne</a></div>"#
            ),
            card("https://mdl.artvee.com/b.jpg", "Untitled Sketch", ""),
            card(
                "/local/c.jpg",
                "  Portrait  of  a  Lady ",
                r#"<div class="woodmart-product-brands-links"><a href="/artist/x">  </a></div>"#
            ),
        );

        let entries = listing_entries(&html, &page_url(), &selectors);

        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].artist, "Cézanne");
        assert_eq!(entries[1].artist, "Anonymous");
        assert_eq!(entries[1].title, "Untitled Sketch");
        assert_eq!(entries[2].artist, "Anonymous");
        assert_eq!(entries[2].title, "Portrait of a Lady");
        assert_eq!(entries[2].image_link, "https://artvee.com/local/c.jpg");
    }

    #[test]
    fn test_card_without_image_is_skipped() {
        let selectors = ListingSelectors::artvee().unwrap();
        let html = r#"
            <div class="product-grid-item"><h3 class="product-title"><a>No image</a></h3></div>
            <div class="product-grid-item">
              <a class="product-image-link"><img data-src="https://mdl.artvee.com/lazy.jpg"></a>
            </div>"#;

        let entries = listing_entries(html, &page_url(), &selectors);

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].image_link, "https://mdl.artvee.com/lazy.jpg");
        assert_eq!(entries[0].title, "Anonymous");
    }

    #[test]
    fn test_invalid_selector_is_reported() {
        let result = ListingSelectors::from_css("a[", "b", "c", "d", "e");
        assert!(matches!(result, Err(NavigationError::InvalidSelector { .. })));
    }
}
