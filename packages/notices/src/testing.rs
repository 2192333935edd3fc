//! HTML fixtures for tests.
//!
//! Builds fragments shaped like the portal's notice tab so tests in this
//! crate and downstream crates don't hand-write markup.

/// Builder for one `div.post_notice` card.
#[derive(Debug, Clone, Default)]
pub struct CardFixture {
    title: Option<String>,
    date: Option<String>,
    modal: Option<(String, String)>,
    link: Option<String>,
}

impl CardFixture {
    pub fn new(title: impl Into<String>, date: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            date: Some(date.into()),
            ..Default::default()
        }
    }

    /// A card with no info blocks at all.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Add a modal trigger pointing at `#id` plus the modal itself.
    pub fn with_modal(mut self, id: impl Into<String>, text: impl Into<String>) -> Self {
        self.modal = Some((id.into(), text.into()));
        self
    }

    /// Add a download box whose first anchor points at `href`.
    pub fn with_link(mut self, href: impl Into<String>) -> Self {
        self.link = Some(href.into());
        self
    }

    pub fn render(&self) -> String {
        let mut html = String::from(r#"<div class="post_notice">"#);
        for text in [&self.title, &self.date].into_iter().flatten() {
            html.push_str(&format!(r#"<div class="AdmsnTxt">{text}</div>"#));
        }
        if let Some((id, _)) = &self.modal {
            html.push_str(&format!(r##"<a class="modal-trigger" href="#{id}">Read more</a>"##));
        }
        if let Some(href) = &self.link {
            html.push_str(&format!(
                r#"<div class="download_box"><a href="{href}">Download</a></div>"#
            ));
        }
        html.push_str("</div>");

        if let Some((id, text)) = &self.modal {
            html.push_str(&format!(
                r#"<div id="{id}" class="modal"><div class="modal-content"><div>{text}</div></div></div>"#
            ));
        }
        html
    }
}

/// Wrap cards in a minimal page.
pub fn notice_page(cards: &[CardFixture]) -> String {
    let body: String = cards.iter().map(CardFixture::render).collect();
    format!("<html><body>{body}</body></html>")
}

/// A login form like the one the portal serves once the session expires.
pub fn login_page() -> String {
    r#"<html><body><h2>Please login to continue</h2>
        <form method="post"><input name="user_name"><input type="password" name="password"></form>
        </body></html>"#
        .to_string()
}
