//! Notice fragment parsing.
//!
//! The portal renders notices as `div.post_notice` cards. Inside a card:
//!
//! - `div.AdmsnTxt` blocks hold the title (first) and the date (second)
//! - `a.modal-trigger` points at a modal (`href="#modalId"`) elsewhere in the
//!   document; its `div.modal-content` holds the description
//! - every `div.download_box` wraps one attachment anchor
//!
//! None of this is documented, so parsing never fails. Anything missing
//! degrades to the placeholders in [`crate::types::notice`].

use chrono::{DateTime, Utc};
use scraper::{ElementRef, Html, Selector};
use tracing::debug;
use url::Url;

use crate::types::notice::Notice;

const CARD: &str = "div.post_notice";
const INFO: &str = "div.AdmsnTxt";
const MODAL_TRIGGER: &str = "a.modal-trigger";
const MODAL_CONTENT: &str = "div.modal-content";
const DOWNLOAD_BOX: &str = "div.download_box";

/// Pre-compiled selectors for the notice markup.
pub struct NoticeParser {
    card: Selector,
    info: Selector,
    modal_trigger: Selector,
    modal_content: Selector,
    download_box: Selector,
    div: Selector,
    anchor: Selector,
}

impl Default for NoticeParser {
    fn default() -> Self {
        Self::new()
    }
}

impl NoticeParser {
    pub fn new() -> Self {
        Self {
            card: selector(CARD),
            info: selector(INFO),
            modal_trigger: selector(MODAL_TRIGGER),
            modal_content: selector(MODAL_CONTENT),
            download_box: selector(DOWNLOAD_BOX),
            div: selector("div"),
            anchor: selector("a"),
        }
    }

    /// Parse every card in `html`, stamping each notice with `fetched_at`.
    pub fn parse(&self, html: &str, base_url: &Url, fetched_at: DateTime<Utc>) -> Vec<Notice> {
        let document = Html::parse_document(html);

        let notices: Vec<Notice> = self
            .cards(&document)
            .map(|card| self.parse_card(&document, card, base_url, fetched_at))
            .collect();

        debug!(notices = notices.len(), "Parsed notice fragment");
        notices
    }

    /// All notice cards in document order.
    pub fn cards<'a>(&'a self, document: &'a Html) -> impl Iterator<Item = ElementRef<'a>> + 'a {
        document.select(&self.card)
    }

    /// Title of a card, if it has a first info block.
    pub fn card_title(&self, card: ElementRef<'_>) -> Option<String> {
        card.select(&self.info).next().map(stripped_text)
    }

    fn parse_card(
        &self,
        document: &Html,
        card: ElementRef<'_>,
        base_url: &Url,
        fetched_at: DateTime<Utc>,
    ) -> Notice {
        let mut notice = Notice::placeholder(fetched_at);

        let mut info = card.select(&self.info);
        if let Some(title) = info.next() {
            notice.title = stripped_text(title);
        }
        if let Some(date) = info.next() {
            notice.date = stripped_text(date);
        }

        if let Some(description) = self.description(document, card) {
            notice.description = description;
        }

        for link in self.download_links(card, base_url) {
            notice.push_download_link(link);
        }

        notice
    }

    /// Follow the card's modal trigger to its description text.
    ///
    /// The target is looked up by `id` among all `div`s of the document with
    /// no check that it really is a modal; a colliding id resolves to
    /// whatever `div` carries it first.
    fn description(&self, document: &Html, card: ElementRef<'_>) -> Option<String> {
        let trigger = card.select(&self.modal_trigger).next()?;
        let href = trigger.value().attr("href")?;
        if !href.starts_with('#') {
            return None;
        }
        let modal_id = href.trim_start_matches('#');

        let modal = document
            .select(&self.div)
            .find(|div| div.value().id() == Some(modal_id))?;
        let content = modal.select(&self.modal_content).next()?;

        let block = content.select(&self.div).next().unwrap_or(content);
        Some(lined_text(block))
    }

    fn download_links<'a>(
        &'a self,
        card: ElementRef<'a>,
        base_url: &'a Url,
    ) -> impl Iterator<Item = String> + 'a {
        card.select(&self.download_box).filter_map(move |download| {
            let href = download
                .select(&self.anchor)
                .next()?
                .value()
                .attr("href")
                .filter(|href| !href.is_empty())?;

            match base_url.join(href) {
                Ok(url) => Some(url.to_string()),
                Err(e) => {
                    debug!(href = %href, error = %e, "Skipping unresolvable download link");
                    None
                }
            }
        })
    }
}

/// Parse notices, stamping them with the current time.
pub fn parse_notices(html: &str, base_url: &Url) -> Vec<Notice> {
    parse_notices_at(html, base_url, Utc::now())
}

/// Parse notices with an explicit fetch timestamp.
pub fn parse_notices_at(html: &str, base_url: &Url, fetched_at: DateTime<Utc>) -> Vec<Notice> {
    NoticeParser::new().parse(html, base_url, fetched_at)
}

/// Text nodes trimmed and concatenated.
fn stripped_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect()
}

/// Text nodes trimmed and joined one per line.
fn lined_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn selector(css: &'static str) -> Selector {
    // Only called with the constants above.
    Selector::parse(css).unwrap_or_else(|e| panic!("invalid selector {css:?}: {e}"))
}
