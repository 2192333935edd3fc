//! Diagnostics for fetches that come back without notices.
//!
//! An expired cookie does not fail the request: the portal answers `200 OK`
//! with its login page. The probe re-runs the request (GET, POST or both),
//! keeps a snippet of what came back, looks for login-page vocabulary and
//! runs the card detector so the caller can tell which case it is in.

use scraper::Html;
use serde::Serialize;
use tracing::{debug, info};

use crate::pipeline::parse::NoticeParser;
use crate::traits::fetcher::{FetchMethod, FetchedPage, NoticeFetcher};

/// Phrases that suggest a login or expired-session page.
pub const LOGIN_KEYWORDS: [&str; 11] = [
    "login",
    "sign in",
    "please login",
    "session expired",
    "authentication",
    "please sign in",
    "invalid session",
    "please login to continue",
    "user name",
    "password",
    "<form",
];

/// Default number of characters kept in a probe snippet.
pub const DEFAULT_SNIPPET_CHARS: usize = 4000;

/// Warning attached to every probe report.
pub const SNIPPET_NOTE: &str = "Snippets may contain sensitive data. Do not share publicly.";

const LOGIN_HINT: &str =
    "Response looks like a login / session page; cookie might be insufficient for this endpoint.";
const STRUCTURE_HINT: &str = "200 OK but no .post_notice nodes found — server returned HTML without expected DOM structure.";

/// Result of scanning a page for login vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginDetection {
    pub login_like: bool,
    /// Matched keywords, in [`LOGIN_KEYWORDS`] order
    pub matches: Vec<String>,
}

/// Case-insensitive keyword scan.
pub fn detect_login_like(html: &str) -> LoginDetection {
    let lower = html.to_lowercase();
    let matches: Vec<String> = LOGIN_KEYWORDS
        .iter()
        .filter(|kw| lower.contains(*kw))
        .map(|kw| kw.to_string())
        .collect();

    LoginDetection {
        login_like: !matches.is_empty(),
        matches,
    }
}

/// Card count and titles, without resolving descriptions or links.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeParse {
    pub count: usize,
    pub titles: Vec<String>,
}

pub fn probe_parse(html: &str) -> ProbeParse {
    let parser = NoticeParser::new();
    let document = Html::parse_document(html);

    let mut count = 0;
    let mut titles = Vec::new();
    for card in parser.cards(&document) {
        count += 1;
        if let Some(title) = parser.card_title(card).filter(|t| !t.is_empty()) {
            titles.push(title);
        }
    }

    ProbeParse { count, titles }
}

/// First `max_chars` characters of `body`, with `...` appended when cut.
pub fn snippet(body: &str, max_chars: usize) -> String {
    match body.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}

/// Explain an empty parse, if there is an obvious reason.
pub fn hint(parsed: &ProbeParse, login: &LoginDetection, status: u16) -> Option<String> {
    if parsed.count > 0 {
        return None;
    }
    if login.login_like {
        Some(LOGIN_HINT.to_string())
    } else if status == 200 {
        Some(STRUCTURE_HINT.to_string())
    } else {
        None
    }
}

/// Which requests the probe sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeMethods {
    Get,
    Post,
    Both,
    /// Unrecognised selector; only the priming request is made
    Unknown,
}

impl ProbeMethods {
    /// Parse a query value (`get`, `post`, `both`), case-insensitively.
    pub fn from_param(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "get" => ProbeMethods::Get,
            "post" => ProbeMethods::Post,
            "both" => ProbeMethods::Both,
            _ => ProbeMethods::Unknown,
        }
    }

    pub fn methods(&self) -> Vec<FetchMethod> {
        match self {
            ProbeMethods::Get => vec![FetchMethod::Get],
            ProbeMethods::Post => vec![FetchMethod::Post],
            ProbeMethods::Both => vec![FetchMethod::Get, FetchMethod::Post],
            ProbeMethods::Unknown => vec![],
        }
    }
}

/// Probe settings.
#[derive(Debug, Clone, Copy)]
pub struct ProbeOptions {
    pub methods: ProbeMethods,
    pub snippet_chars: usize,
}

impl Default for ProbeOptions {
    fn default() -> Self {
        Self {
            methods: ProbeMethods::Both,
            snippet_chars: DEFAULT_SNIPPET_CHARS,
        }
    }
}

/// Diagnostics for one completed request.
#[derive(Debug, Clone, Serialize)]
pub struct AttemptReport {
    pub phase: String,
    pub method: FetchMethod,
    pub status_code: u16,
    pub reason: Option<String>,
    pub response_length: usize,
    pub session_cookie_names: Vec<String>,
    pub html_snippet: String,
    pub login_detection: LoginDetection,
    pub parsed_notices: ProbeParse,
    pub hint: Option<String>,
}

impl AttemptReport {
    pub fn from_page(method: FetchMethod, page: FetchedPage, snippet_chars: usize) -> Self {
        let login_detection = detect_login_like(&page.body);
        let parsed_notices = probe_parse(&page.body);
        let hint = hint(&parsed_notices, &login_detection, page.status);

        Self {
            phase: phase_name(method),
            method,
            status_code: page.status,
            reason: page.reason,
            response_length: page.body.chars().count(),
            session_cookie_names: page.cookie_names,
            html_snippet: snippet(&page.body, snippet_chars),
            login_detection,
            parsed_notices,
            hint,
        }
    }
}

/// A request that failed before any response arrived.
#[derive(Debug, Clone, Serialize)]
pub struct FailedAttempt {
    pub phase: String,
    pub ok: bool,
    pub error: String,
}

impl FailedAttempt {
    pub fn new(phase: impl Into<String>, error: impl ToString) -> Self {
        Self {
            phase: phase.into(),
            ok: false,
            error: error.to_string(),
        }
    }
}

/// One entry of the probe report.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ProbeAttempt {
    Completed(Box<AttemptReport>),
    Failed(FailedAttempt),
}

/// Full probe report.
#[derive(Debug, Clone, Serialize)]
pub struct ProbeReport {
    pub prime_page_fetched: bool,
    pub attempts: Vec<ProbeAttempt>,
    pub note: &'static str,
}

fn phase_name(method: FetchMethod) -> String {
    format!("action_layer_{}", method.as_str())
}

/// Prime the session, then send each selected request and diagnose it.
pub async fn run_probe<F>(fetcher: &F, options: ProbeOptions) -> ProbeReport
where
    F: NoticeFetcher + ?Sized,
{
    let mut attempts = Vec::new();

    let prime_page_fetched = match fetcher.prime().await {
        Ok(()) => true,
        Err(e) => {
            attempts.push(ProbeAttempt::Failed(FailedAttempt::new(
                "prime_announcement_page",
                e,
            )));
            false
        }
    };

    for method in options.methods.methods() {
        let attempt = match fetcher.request(method).await {
            Ok(page) => ProbeAttempt::Completed(Box::new(AttemptReport::from_page(
                method,
                page,
                options.snippet_chars,
            ))),
            Err(e) => {
                debug!(method = %method, error = %e, "Probe request failed");
                ProbeAttempt::Failed(FailedAttempt::new(phase_name(method), e))
            }
        };
        attempts.push(attempt);
    }

    info!(
        prime_page_fetched = prime_page_fetched,
        attempts = attempts.len(),
        "Probe finished"
    );

    ProbeReport {
        prime_page_fetched,
        attempts,
        note: SNIPPET_NOTE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetchers::{MockFetchCall, MockFetcher};

    #[test]
    fn test_detect_login_like_preserves_keyword_order() {
        let detection = detect_login_like("<FORM action=x>Please Login to continue. Password:</form>");
        assert!(detection.login_like);
        assert_eq!(
            detection.matches,
            vec!["login", "please login", "please login to continue", "password", "<form"]
        );
    }

    #[test]
    fn test_detect_login_like_on_notices() {
        let detection = detect_login_like(r#"<div class="post_notice">Holiday</div>"#);
        assert!(!detection.login_like);
        assert!(detection.matches.is_empty());
    }

    #[test]
    fn test_snippet_truncates_on_char_boundary() {
        assert_eq!(snippet("héllo world", 5), "héllo...");
        assert_eq!(snippet("short", 5), "short");
        assert_eq!(snippet("", 5), "");
    }

    #[test]
    fn test_probe_parse_skips_missing_titles() {
        let parsed = probe_parse(
            r#"<div class="post_notice"><div class="AdmsnTxt">Fees</div></div>
               <div class="post_notice"></div>"#,
        );
        assert_eq!(parsed.count, 2);
        assert_eq!(parsed.titles, vec!["Fees"]);
    }

    #[test]
    fn test_hints() {
        let empty = ProbeParse { count: 0, titles: vec![] };
        let login = detect_login_like("please sign in");
        let plain = detect_login_like("<div></div>");

        assert_eq!(hint(&empty, &login, 200).as_deref(), Some(LOGIN_HINT));
        assert_eq!(hint(&empty, &plain, 200).as_deref(), Some(STRUCTURE_HINT));
        assert_eq!(hint(&empty, &plain, 500), None);

        let found = ProbeParse { count: 1, titles: vec![] };
        assert_eq!(hint(&found, &login, 200), None);
    }

    #[test]
    fn test_probe_methods_from_param() {
        assert_eq!(ProbeMethods::from_param("GET"), ProbeMethods::Get);
        assert_eq!(ProbeMethods::from_param("both").methods().len(), 2);
        assert!(ProbeMethods::from_param("put").methods().is_empty());
    }

    #[tokio::test]
    async fn test_run_probe_reports_each_method() {
        let fetcher = MockFetcher::new()
            .with_html(FetchMethod::Get, "<html><form>Login</form></html>")
            .with_error(FetchMethod::Post, "connection reset")
            .with_prime_error("timed out");

        let report = run_probe(&fetcher, ProbeOptions::default()).await;

        assert!(!report.prime_page_fetched);
        assert_eq!(report.attempts.len(), 3);
        assert_eq!(
            fetcher.calls(),
            vec![
                MockFetchCall::Prime,
                MockFetchCall::Request(FetchMethod::Get),
                MockFetchCall::Request(FetchMethod::Post),
            ]
        );

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["attempts"][0]["phase"], "prime_announcement_page");
        assert_eq!(json["attempts"][0]["ok"], false);
        assert_eq!(json["attempts"][1]["phase"], "action_layer_get");
        assert_eq!(json["attempts"][1]["status_code"], 200);
        assert_eq!(json["attempts"][1]["login_detection"]["login_like"], true);
        assert_eq!(json["attempts"][1]["parsed_notices"]["count"], 0);
        assert_eq!(json["attempts"][1]["hint"], LOGIN_HINT);
        assert_eq!(json["attempts"][2]["phase"], "action_layer_post");
        assert!(json["attempts"][2]["error"]
            .as_str()
            .unwrap()
            .contains("connection reset"));
        assert_eq!(json["note"], SNIPPET_NOTE);
    }
}
