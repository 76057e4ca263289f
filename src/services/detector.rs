// src/services/detector.rs

//! Availability detection service.
//!
//! Classifies a product page through a prioritized sequence of heuristics:
//! structured fields from the storefront's embedded stock blob first, then
//! rendered-HTML fallbacks. The storefront's stock representation is not
//! consistent (sometimes a boolean flag, sometimes a variant list,
//! sometimes plain text), so no single signal is trusted on its own.

use regex::Regex;
use reqwest::Client;
use scraper::{Html, Selector};

use crate::error::{AppError, Result};
use crate::models::{DetectorConfig, MonitorConfig, Reading};
use crate::utils::http;

/// Purchasing message the storefront emits when the selected combination
/// cannot be bought.
const UNAVAILABLE_COMBINATION: &str =
    r#""purchasing_message":"The selected product combination is currently unavailable.""#;

/// Service for classifying the availability of a product page.
pub struct Detector {
    config: DetectorConfig,
    client: Client,
    script_selector: Selector,
    option_selector: Selector,
    modifier_values: Regex,
    variant_values: Regex,
}

impl Detector {
    /// Create a new detector with the given configuration.
    pub fn new(monitor: &MonitorConfig, config: DetectorConfig) -> Result<Self> {
        let client = http::create_client(monitor)?;
        Ok(Self {
            config,
            client,
            script_selector: parse_selector("script")?,
            option_selector: parse_selector("option")?,
            modifier_values: list_pattern("available_modifier_values"),
            variant_values: list_pattern("available_variant_values"),
        })
    }

    /// Check a product page, collapsing every failure into a reading.
    ///
    /// A check never fails: network and HTTP errors become `Unknown` so the
    /// poll loop keeps running and the previous confirmed state survives.
    pub async fn check(&self, url: &str) -> Reading {
        match http::fetch_page(&self.client, url).await {
            Ok(body) => self.classify(&body),
            Err(e) => Reading::unknown(format!("Network error: {e}")),
        }
    }

    /// Classify a fetched document.
    ///
    /// Heuristics run in priority order; the first confident one wins:
    /// 1. non-empty `available_variant_values` in the stock blob
    /// 2. explicit `"instock"` boolean in the stock blob
    /// 3. the "combination unavailable" purchasing message
    /// 4. (no blob only) `<option>` elements naming a known color
    /// 5. out-of-stock phrases anywhere in the page text
    /// 6. variants remembered from `available_modifier_values`
    /// 7. default: unavailable
    ///
    /// A non-empty `available_modifier_values` list is only remembered as a
    /// last-resort signal (6), never reported directly. That mirrors the
    /// observed storefront behavior; see DESIGN.md before changing it.
    pub fn classify(&self, body: &str) -> Reading {
        let document = Html::parse_document(body);
        let blob = self.find_stock_blob(&document);

        let mut candidates: Vec<String> = Vec::new();
        match &blob {
            Some(script) => {
                if let Some(values) = extract_list(&self.modifier_values, script) {
                    if values.is_empty() {
                        log::debug!("empty available_modifier_values, checking other indicators");
                    } else {
                        log::debug!("candidate variants from modifier values: {values:?}");
                        candidates = values;
                    }
                }

                if let Some(values) = extract_list(&self.variant_values, script) {
                    if !values.is_empty() {
                        return Reading::available(format!(
                            "Color variants are available: {values:?}"
                        ));
                    }
                }

                if script.contains(r#""instock":true"#) {
                    return Reading::available("Product is in stock");
                }
                if script.contains(r#""instock":false"#) {
                    return Reading::unavailable("Product is not in stock");
                }

                if script.contains(UNAVAILABLE_COMBINATION) {
                    return Reading::unavailable(
                        "Selected product combination is currently unavailable",
                    );
                }
            }
            None => {
                log::debug!("no stock blob found, falling back to HTML parsing");
                let colors = self.scan_color_options(&document);
                if !colors.is_empty() {
                    return Reading::available(format!("Color variants are available: {colors:?}"));
                }
            }
        }

        if let Some(phrase) = self.find_out_of_stock_phrase(&document) {
            return Reading::unavailable(format!("Product shows as {phrase}"));
        }

        if !candidates.is_empty() {
            return Reading::available(format!("Color variants are now available: {candidates:?}"));
        }

        Reading::unavailable("No color variants are currently available")
    }

    /// Find the first script block containing the stock blob marker.
    fn find_stock_blob(&self, document: &Html) -> Option<String> {
        document
            .select(&self.script_selector)
            .map(|script| script.text().collect::<String>())
            .find(|text| text.contains(&self.config.blob_marker))
    }

    /// Collect `<option>` texts mentioning a known color.
    fn scan_color_options(&self, document: &Html) -> Vec<String> {
        document
            .select(&self.option_selector)
            .filter_map(|option| {
                let text = option.text().collect::<String>();
                let lower = text.to_lowercase();
                let mentions_color = self
                    .config
                    .color_tokens
                    .iter()
                    .any(|token| lower.contains(token.as_str()));
                let trimmed = text.trim();
                (mentions_color && !trimmed.is_empty()).then(|| trimmed.to_string())
            })
            .collect()
    }

    /// Find the first configured out-of-stock phrase in the page text.
    fn find_out_of_stock_phrase(&self, document: &Html) -> Option<String> {
        let page_text = document
            .root_element()
            .text()
            .collect::<String>()
            .to_lowercase();
        self.config
            .out_of_stock_phrases
            .iter()
            .find(|phrase| page_text.contains(phrase.as_str()))
            .cloned()
    }
}

fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}

/// Build a regex capturing the raw contents of `"<key>":[...]`.
fn list_pattern(key: &str) -> Regex {
    Regex::new(&format!(r#""{}":\[(.*?)\]"#, regex::escape(key))).expect("valid list pattern")
}

/// Extract the literal entries of a JSON-like list matched by `pattern`.
///
/// Returns `None` when the key is absent, `Some(vec![])` when the list is
/// explicitly empty. Entries are split on commas with surrounding quotes
/// stripped; the blob is not parsed as JSON.
fn extract_list(pattern: &Regex, script: &str) -> Option<Vec<String>> {
    let inner = pattern.captures(script)?.get(1)?.as_str();
    Some(
        inner
            .split(',')
            .map(|value| value.trim().trim_matches('"'))
            .filter(|value| !value.is_empty())
            .map(String::from)
            .collect(),
    )
}
