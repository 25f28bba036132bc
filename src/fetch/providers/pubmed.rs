// src/fetch/providers/pubmed.rs
// PubMed E-utilities provider: esearch for PMIDs, efetch for article detail.
// One provider instance per configured search expression.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use quick_xml::de::from_str;
use serde::Deserialize;
use std::time::Duration;

use crate::fetch::normalize_summary;
use crate::fetch::types::{ResearchItem, SearchProvider};

const ESEARCH_URL: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils/esearch.fcgi";
const EFETCH_URL: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils/efetch.fcgi";
const ARTICLE_URL_PREFIX: &str = "https://pubmed.ncbi.nlm.nih.gov/";

const NO_ABSTRACT: &str = "No abstract available.";

pub struct PubMedProvider {
    http: reqwest::Client,
    query: String,
    retmax: u32,
}

impl PubMedProvider {
    pub fn new(query: impl Into<String>, retmax: u32) -> Self {
        let http = reqwest::Client::builder()
            .user_agent("research-digest/0.1 (+github.com/lumlich/research-digest)")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(60))
            .build()
            .expect("reqwest client");
        Self {
            http,
            query: query.into(),
            retmax,
        }
    }
}

#[async_trait]
impl SearchProvider for PubMedProvider {
    async fn fetch_latest(&self) -> Result<Vec<ResearchItem>> {
        let retmax = self.retmax.to_string();
        let body = self
            .http
            .get(ESEARCH_URL)
            .query(&[
                ("db", "pubmed"),
                ("term", self.query.as_str()),
                ("retmax", retmax.as_str()),
                ("sort", "date"),
                ("retmode", "json"),
            ])
            .send()
            .await
            .context("pubmed esearch get")?
            .error_for_status()
            .context("pubmed esearch status")?
            .text()
            .await
            .context("pubmed esearch body")?;

        let pmids = parse_esearch(&body)?;
        if pmids.is_empty() {
            tracing::debug!(query = %self.query, "esearch returned no ids");
            return Ok(Vec::new());
        }

        let ids = pmids.join(",");
        let xml = self
            .http
            .get(EFETCH_URL)
            .query(&[
                ("db", "pubmed"),
                ("id", ids.as_str()),
                ("retmode", "xml"),
            ])
            .send()
            .await
            .context("pubmed efetch get")?
            .error_for_status()
            .context("pubmed efetch status")?
            .text()
            .await
            .context("pubmed efetch body")?;

        parse_efetch(&xml, Utc::now())
    }

    fn name(&self) -> &'static str {
        "PubMed"
    }
}

// ---- esearch (JSON) ----

#[derive(Debug, Deserialize)]
struct EsearchEnvelope {
    #[serde(rename = "esearchresult")]
    result: EsearchResult,
}

#[derive(Debug, Deserialize)]
struct EsearchResult {
    #[serde(rename = "idlist", default)]
    id_list: Vec<String>,
}

pub fn parse_esearch(body: &str) -> Result<Vec<String>> {
    let envelope: EsearchEnvelope =
        serde_json::from_str(body).context("parsing pubmed esearch json")?;
    Ok(envelope.result.id_list)
}

// ---- efetch (XML) ----

#[derive(Debug, Deserialize)]
struct PubmedArticleSetXml {
    #[serde(rename = "PubmedArticle", default)]
    articles: Vec<PubmedArticleXml>,
}

#[derive(Debug, Deserialize)]
struct PubmedArticleXml {
    #[serde(rename = "MedlineCitation")]
    citation: MedlineCitationXml,
}

#[derive(Debug, Deserialize)]
struct MedlineCitationXml {
    #[serde(rename = "PMID")]
    pmid: TextNode,
    #[serde(rename = "Article")]
    article: ArticleXml,
}

#[derive(Debug, Deserialize)]
struct ArticleXml {
    #[serde(rename = "ArticleTitle")]
    title: Option<String>,
    #[serde(rename = "Abstract")]
    abstract_block: Option<AbstractXml>,
    #[serde(rename = "Journal")]
    journal: Option<JournalXml>,
}

#[derive(Debug, Deserialize)]
struct AbstractXml {
    #[serde(rename = "AbstractText", default)]
    sections: Vec<TextNode>,
}

// Captures element text while tolerating attributes (e.g. AbstractText Label).
#[derive(Debug, Default, Deserialize)]
struct TextNode {
    #[serde(rename = "$text", default)]
    value: String,
}

#[derive(Debug, Deserialize)]
struct JournalXml {
    #[serde(rename = "JournalIssue")]
    issue: Option<JournalIssueXml>,
}

#[derive(Debug, Deserialize)]
struct JournalIssueXml {
    #[serde(rename = "PubDate")]
    pub_date: Option<PubDateXml>,
}

#[derive(Debug, Deserialize)]
struct PubDateXml {
    #[serde(rename = "Year")]
    year: Option<String>,
    #[serde(rename = "Month")]
    month: Option<String>,
    #[serde(rename = "Day")]
    day: Option<String>,
}

/// Parse an efetch response into research items. Articles without a PMID are
/// skipped; missing dates fall back to `now` so they sort as fresh.
pub fn parse_efetch(xml: &str, now: DateTime<Utc>) -> Result<Vec<ResearchItem>> {
    let set: PubmedArticleSetXml = from_str(xml).context("parsing pubmed efetch xml")?;

    let mut out = Vec::with_capacity(set.articles.len());
    for article in set.articles {
        let citation = article.citation;
        let pmid = citation.pmid.value.trim().to_string();
        if pmid.is_empty() {
            continue;
        }

        let title = normalize_summary(citation.article.title.as_deref().unwrap_or("Untitled study"));

        let summary = match &citation.article.abstract_block {
            Some(block) if !block.sections.is_empty() => {
                let joined = block
                    .sections
                    .iter()
                    .map(|s| s.value.as_str())
                    .collect::<Vec<_>>()
                    .join(" ");
                let normalized = normalize_summary(&joined);
                if normalized.is_empty() {
                    NO_ABSTRACT.to_string()
                } else {
                    normalized
                }
            }
            _ => NO_ABSTRACT.to_string(),
        };

        let pub_date = citation
            .article
            .journal
            .as_ref()
            .and_then(|j| j.issue.as_ref())
            .and_then(|i| i.pub_date.as_ref());

        out.push(ResearchItem {
            title,
            summary,
            source_link: format!("{ARTICLE_URL_PREFIX}{pmid}/"),
            published_at: parse_pub_date(pub_date, now),
        });
    }
    Ok(out)
}

fn parse_pub_date(pd: Option<&PubDateXml>, fallback: DateTime<Utc>) -> DateTime<Utc> {
    let Some(pd) = pd else { return fallback };
    let Some(year) = pd.year.as_deref().and_then(|y| y.trim().parse::<i32>().ok()) else {
        return fallback;
    };
    let month = pd.month.as_deref().and_then(month_number).unwrap_or(1);
    let day = pd
        .day
        .as_deref()
        .and_then(|d| d.trim().parse::<u32>().ok())
        .unwrap_or(1);

    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| Utc.from_utc_datetime(&dt))
        .unwrap_or(fallback)
}

fn month_number(s: &str) -> Option<u32> {
    let s = s.trim();
    if let Ok(n) = s.parse::<u32>() {
        return (1..=12).contains(&n).then_some(n);
    }
    let key = s.get(..3)?.to_ascii_lowercase();
    match key.as_str() {
        "jan" => Some(1),
        "feb" => Some(2),
        "mar" => Some(3),
        "apr" => Some(4),
        "may" => Some(5),
        "jun" => Some(6),
        "jul" => Some(7),
        "aug" => Some(8),
        "sep" => Some(9),
        "oct" => Some(10),
        "nov" => Some(11),
        "dec" => Some(12),
        _ => None,
    }
}
