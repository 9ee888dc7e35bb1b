//! arXiv gateway: free-text search against the export API.
//!
//! The arXiv API returns an Atom feed. The entries are shallow and
//! regular, so extraction is done with string scanning over the tags we
//! need rather than a full XML parser.

use crate::error::AppError;
use crate::models::ArxivPaper;
use regex::Regex;
use std::time::Duration;

pub const ARXIV_API_URL: &str = "https://export.arxiv.org/api/query";

// ============================================================================
// Search
// ============================================================================

/// Query the arXiv search API and parse the resulting feed.
pub async fn search(query: &str, start: u32, max_results: u32) -> Result<Vec<ArxivPaper>, AppError> {
    let url = format!(
        "{}?search_query=all:{}&start={}&max_results={}",
        ARXIV_API_URL,
        urlencoding::encode(query),
        start,
        max_results
    );

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()
        .map_err(|e| AppError::Download(format!("Failed to search arXiv: {}", e)))?;

    let response = client
        .get(&url)
        .send()
        .await
        .map_err(|e| AppError::Download(format!("Failed to search arXiv: {}", e)))?;

    let status = response.status();
    if !status.is_success() {
        return Err(AppError::Download(format!(
            "Failed to search arXiv: upstream returned {}",
            status
        )));
    }

    let body = response
        .text()
        .await
        .map_err(|e| AppError::Download(format!("Failed to read arXiv response: {}", e)))?;

    Ok(parse_feed(&body))
}

/// Split an Atom feed into entries and flatten each into an [`ArxivPaper`].
/// Entries missing an id or title are skipped.
pub fn parse_feed(xml: &str) -> Vec<ArxivPaper> {
    extract_all_xml_tags(xml, "entry")
        .iter()
        .filter_map(|entry| parse_entry(entry))
        .collect()
}

fn parse_entry(entry: &str) -> Option<ArxivPaper> {
    let id = extract_xml_tag(entry, "id")?.trim().to_string();

    // The feed's own <title> is "ArXiv Query: ..."; inside an entry the
    // title is the paper's. Error feeds put "Error" entries here.
    let title = extract_xml_tag(entry, "title")
        .map(|t| normalize_whitespace(&t))
        .filter(|t| !t.is_empty() && !t.starts_with("Error"))?;

    let summary = extract_xml_tag(entry, "summary")
        .map(|s| normalize_whitespace(&s))
        .unwrap_or_default();

    let published = extract_xml_tag(entry, "published")
        .map(|p| p.trim().to_string())
        .unwrap_or_default();

    let authors: Vec<String> = extract_all_xml_tags(entry, "name")
        .into_iter()
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect();

    let pdf_url = extract_pdf_link(entry).unwrap_or_else(|| id.replace("/abs/", "/pdf/"));
    let categories = extract_category_terms(entry);

    Some(ArxivPaper {
        arxiv_url: id.clone(),
        id,
        title,
        summary,
        published,
        authors,
        pdf_url,
        categories,
    })
}

/// Recover a bare arXiv id from an entry id URL or user input.
/// Formats: arxiv.org/abs/2301.00001, arxiv.org/pdf/2301.00001v2,
/// arXiv:2301.00001, or the bare id itself.
pub fn extract_arxiv_id(input: &str) -> Option<String> {
    let patterns = [
        r"arxiv\.org/(?:abs|pdf)/(\d{4}\.\d{4,5})",
        r"arxiv\.org/(?:abs|pdf)/([a-z-]+/\d{7})",
        r"arXiv:(\d{4}\.\d{4,5})",
        r"^(\d{4}\.\d{4,5})$",
    ];

    for pattern in patterns {
        if let Ok(re) = Regex::new(pattern) {
            if let Some(caps) = re.captures(input) {
                if let Some(m) = caps.get(1) {
                    return Some(m.as_str().to_string());
                }
            }
        }
    }
    None
}

// ============================================================================
// XML Helpers
// ============================================================================

fn extract_xml_tag(xml: &str, tag: &str) -> Option<String> {
    let start_tag = format!("<{}>", tag);
    let end_tag = format!("</{}>", tag);

    let start = xml.find(&start_tag)? + start_tag.len();
    let end = xml[start..].find(&end_tag)? + start;

    Some(xml[start..end].to_string())
}

fn extract_all_xml_tags(xml: &str, tag: &str) -> Vec<String> {
    let start_tag = format!("<{}>", tag);
    let end_tag = format!("</{}>", tag);
    let mut results = Vec::new();
    let mut search_start = 0;

    while let Some(start_pos) = xml[search_start..].find(&start_tag) {
        let abs_start = search_start + start_pos + start_tag.len();
        if let Some(end_pos) = xml[abs_start..].find(&end_tag) {
            results.push(xml[abs_start..abs_start + end_pos].to_string());
            search_start = abs_start + end_pos + end_tag.len();
        } else {
            break;
        }
    }

    results
}

/// Collect the raw text of every self-closing or attribute-bearing tag
/// occurrence, i.e. everything between `<tag` and the next `>`.
fn extract_tag_headers<'a>(xml: &'a str, tag: &str) -> Vec<&'a str> {
    let open = format!("<{}", tag);
    let mut results = Vec::new();
    let mut search_start = 0;

    while let Some(start_pos) = xml[search_start..].find(&open) {
        let abs_start = search_start + start_pos;
        match xml[abs_start..].find('>') {
            Some(end_pos) => {
                results.push(&xml[abs_start..abs_start + end_pos]);
                search_start = abs_start + end_pos + 1;
            }
            None => break,
        }
    }

    results
}

fn extract_attr(tag_header: &str, attr: &str) -> Option<String> {
    let needle = format!("{}=\"", attr);
    let start = tag_header.find(&needle)? + needle.len();
    let end = tag_header[start..].find('"')? + start;
    Some(tag_header[start..end].to_string())
}

/// Find the `<link title="pdf" href="..."/>` inside one entry.
fn extract_pdf_link(entry: &str) -> Option<String> {
    extract_tag_headers(entry, "link")
        .into_iter()
        .find(|header| extract_attr(header, "title").as_deref() == Some("pdf"))
        .and_then(|header| extract_attr(header, "href"))
}

fn extract_category_terms(entry: &str) -> Vec<String> {
    extract_tag_headers(entry, "category")
        .into_iter()
        .filter_map(|header| extract_attr(header, "term"))
        .collect()
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title type="html">ArXiv Query: search_query=all:attention</title>
  <id>http://arxiv.org/api/x</id>
  <entry>
    <id>http://arxiv.org/abs/1706.03762v7</id>
    <updated>2023-08-02T00:41:18Z</updated>
    <published>2017-06-12T17:57:34Z</published>
    <title>Attention Is All
  You Need</title>
    <summary>  The dominant sequence transduction models are based on complex
recurrent or convolutional neural networks.
</summary>
    <author><name>Ashish Vaswani</name></author>
    <author><name>Noam Shazeer</name></author>
    <link href="http://arxiv.org/abs/1706.03762v7" rel="alternate" type="text/html"/>
    <link title="pdf" href="http://arxiv.org/pdf/1706.03762v7" rel="related" type="application/pdf"/>
    <category term="cs.CL" scheme="http://arxiv.org/schemas/atom"/>
    <category term="cs.LG" scheme="http://arxiv.org/schemas/atom"/>
  </entry>
  <entry>
    <id>http://arxiv.org/abs/2301.00001v1</id>
    <published>2023-01-01T00:00:00Z</published>
    <title>Another Paper</title>
    <summary>Short.</summary>
    <author><name>A. Author</name></author>
    <link href="http://arxiv.org/abs/2301.00001v1" rel="alternate" type="text/html"/>
    <category term="cs.DB" scheme="http://arxiv.org/schemas/atom"/>
  </entry>
</feed>"#;

    #[test]
    fn test_parse_feed_extracts_entries() {
        let papers = parse_feed(FEED);
        assert_eq!(papers.len(), 2);

        let first = &papers[0];
        assert_eq!(first.id, "http://arxiv.org/abs/1706.03762v7");
        assert_eq!(first.title, "Attention Is All You Need");
        assert_eq!(first.authors, vec!["Ashish Vaswani", "Noam Shazeer"]);
        assert_eq!(first.pdf_url, "http://arxiv.org/pdf/1706.03762v7");
        assert_eq!(first.published, "2017-06-12T17:57:34Z");
        assert_eq!(first.categories, vec!["cs.CL", "cs.LG"]);
        assert!(first.summary.starts_with("The dominant sequence"));
        assert!(!first.summary.contains('\n'));
    }

    #[test]
    fn test_parse_feed_derives_pdf_url_when_link_missing() {
        let papers = parse_feed(FEED);
        assert_eq!(papers[1].pdf_url, "http://arxiv.org/pdf/2301.00001v1");
    }

    #[test]
    fn test_parse_feed_skips_error_entries() {
        let feed = r#"<feed><entry>
            <id>http://arxiv.org/api/errors#incorrect_id</id>
            <title>Error</title>
        </entry></feed>"#;
        assert!(parse_feed(feed).is_empty());
    }

    #[test]
    fn test_extract_arxiv_id() {
        assert_eq!(
            extract_arxiv_id("http://arxiv.org/abs/1706.03762v7"),
            Some("1706.03762".to_string())
        );
        assert_eq!(
            extract_arxiv_id("https://arxiv.org/pdf/2301.00001"),
            Some("2301.00001".to_string())
        );
        assert_eq!(
            extract_arxiv_id("arXiv:2301.00001"),
            Some("2301.00001".to_string())
        );
        assert_eq!(
            extract_arxiv_id("2301.00001"),
            Some("2301.00001".to_string())
        );
        assert_eq!(
            extract_arxiv_id("http://arxiv.org/abs/cs/0112017"),
            Some("cs/0112017".to_string())
        );
        assert_eq!(extract_arxiv_id("not an id"), None);
    }
}
