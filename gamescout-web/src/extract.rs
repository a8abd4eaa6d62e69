//! Selector-driven extraction of answer panels and organic results.
//!
//! Rules come from [`ExtractionRules`]; nothing in here names a selector.
//! The HTML parser never fails, so the only extraction error is a rule that
//! does not compile.

use gamescout_config::ExtractionRules;
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;

pub const NO_RESULTS: &str =
    "No results found. Google's HTML structure may have changed or the request was blocked.";

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("invalid selector `{selector}`: {reason}")]
    Selector { selector: String, reason: String },
}

/// One piece of text pulled from the result page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    /// A single-match panel such as the featured snippet.
    Labeled { label: String, text: String },
    /// The `rank`-th organic container (1-indexed) that carried a title.
    Organic {
        rank: usize,
        title: String,
        info: Option<String>,
    },
}

impl Fragment {
    fn write_lines(&self, lines: &mut Vec<String>) {
        match self {
            Fragment::Labeled { label, text } => lines.push(format!("{label}: {text}")),
            Fragment::Organic { rank, title, info } => {
                lines.push(format!("\nResult {rank}:"));
                lines.push(format!("  Title: {title}"));
                if let Some(info) = info {
                    lines.push(format!("  Info: {info}"));
                }
            }
        }
    }
}

/// Fragments in extraction order: answer rules first, then organic results.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchReport {
    pub fragments: Vec<Fragment>,
}

impl SearchReport {
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Newline-joined fragment lines, or [`NO_RESULTS`] when nothing matched.
    pub fn render(&self) -> String {
        if self.is_empty() {
            return NO_RESULTS.to_string();
        }
        let mut lines = Vec::with_capacity(self.fragments.len() * 3);
        for fragment in &self.fragments {
            fragment.write_lines(&mut lines);
        }
        lines.join("\n")
    }
}

/// [`ExtractionRules`] with every selector parsed.
#[derive(Debug)]
pub struct CompiledRules {
    answers: Vec<(String, Selector)>,
    container: Selector,
    title: Selector,
    snippet: Selector,
    limit: usize,
}

impl CompiledRules {
    pub fn compile(rules: &ExtractionRules) -> Result<Self, ExtractError> {
        let answers = rules
            .answers
            .iter()
            .map(|rule| Ok((rule.label.clone(), parse_selector(&rule.selector)?)))
            .collect::<Result<Vec<_>, ExtractError>>()?;

        Ok(Self {
            answers,
            container: parse_selector(&rules.organic.container)?,
            title: parse_selector(&rules.organic.title)?,
            snippet: parse_selector(&rules.organic.snippet)?,
            limit: rules.organic.limit,
        })
    }

    /// Walk a parsed page and collect every fragment the rules match.
    pub fn extract(&self, document: &Html) -> SearchReport {
        let mut fragments = Vec::new();

        for (label, selector) in &self.answers {
            let found = document
                .select(selector)
                .next()
                .map(visible_text)
                .filter(|text| !text.is_empty());
            if let Some(text) = found {
                fragments.push(Fragment::Labeled {
                    label: label.clone(),
                    text,
                });
            }
        }

        for (idx, container) in document.select(&self.container).take(self.limit).enumerate() {
            let Some(title) = first_text(container, &self.title) else {
                tracing::trace!(target: "web.extract", rank = idx + 1, "organic result without title");
                continue;
            };
            fragments.push(Fragment::Organic {
                rank: idx + 1,
                title,
                info: first_text(container, &self.snippet),
            });
        }

        SearchReport { fragments }
    }
}

/// Parse `html` leniently and apply `rules` to it.
///
/// ```
/// use gamescout_config::ExtractionRules;
/// use gamescout_web::extract::extract;
///
/// let html = r#"<div class="IZ6rdc"> 42 </div>"#;
/// let report = extract(html, &ExtractionRules::default()).unwrap();
/// assert_eq!(report.render(), "Answer: 42");
/// ```
pub fn extract(html: &str, rules: &ExtractionRules) -> Result<SearchReport, ExtractError> {
    let compiled = CompiledRules::compile(rules)?;
    let document = Html::parse_document(html);
    Ok(compiled.extract(&document))
}

fn parse_selector(css: &str) -> Result<Selector, ExtractError> {
    Selector::parse(css).map_err(|e| ExtractError::Selector {
        selector: css.to_string(),
        reason: e.to_string(),
    })
}

fn first_text(scope: ElementRef<'_>, selector: &Selector) -> Option<String> {
    scope
        .select(selector)
        .next()
        .map(visible_text)
        .filter(|text| !text.is_empty())
}

/// Every descendant text node trimmed, empty pieces dropped, no separator.
fn visible_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .collect()
}
