// src/feed/document.rs
// The persisted feed: RSS 2.0 with iTunes tags, read, amended, and rewritten
// atomically each run. Channel metadata is re-rendered from config; entries
// are the append-only history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use time::format_description::well_known::Rfc2822;
use time::OffsetDateTime;

use crate::audio::AUDIO_MIME_TYPE;
use crate::config::ChannelConfig;
use crate::error::PipelineError;

const XML_DECL: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";
const ITUNES_NS: &str = "http://www.itunes.com/dtds/podcast-1.0.dtd";

/// One published episode as it appears in the feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEntry {
    /// Timestamp-derived id; also the entry guid.
    pub episode_id: String,
    pub title: String,
    pub description: String,
    pub pub_date: DateTime<Utc>,
    pub audio_url: String,
    pub byte_size: u64,
    pub duration_seconds: u64,
}

#[derive(Debug, Clone)]
pub struct FeedDocument {
    pub channel: ChannelConfig,
    pub entries: Vec<FeedEntry>,
}

impl FeedDocument {
    pub fn new(channel: ChannelConfig) -> Self {
        Self {
            channel,
            entries: Vec::new(),
        }
    }

    /// Read the persisted feed. Absent file means first run (empty history);
    /// a present but unparsable file is fatal, never "start fresh".
    pub fn load(path: &Path, channel: ChannelConfig) -> Result<Self, PipelineError> {
        match fs::read_to_string(path) {
            Ok(content) => {
                let entries = parse_entries(&content).map_err(|e| {
                    PipelineError::Persistence(format!(
                        "existing feed at {} is unreadable: {e:#}",
                        path.display()
                    ))
                })?;
                Ok(Self { channel, entries })
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::new(channel)),
            Err(e) => Err(PipelineError::Persistence(format!(
                "reading {}: {e}",
                path.display()
            ))),
        }
    }

    pub fn push_entry(&mut self, entry: FeedEntry) {
        self.entries.push(entry);
    }

    /// Render to XML with entries newest-first (stable, total order by
    /// pubDate regardless of insertion order).
    pub fn to_xml(&self, last_build: DateTime<Utc>) -> Result<String, PipelineError> {
        let mut sorted: Vec<&FeedEntry> = self.entries.iter().collect();
        sorted.sort_by(|a, b| b.pub_date.cmp(&a.pub_date));

        let rss = RssXml {
            version: "2.0".to_string(),
            itunes_ns: ITUNES_NS.to_string(),
            channel: ChannelXml {
                title: self.channel.title.clone(),
                link: self.channel.link.clone(),
                description: self.channel.description.clone(),
                language: self.channel.language.clone(),
                last_build_date: format_rfc2822(last_build)?,
                itunes_author: self.channel.author.clone(),
                itunes_summary: self.channel.summary.clone(),
                itunes_explicit: self.channel.explicit.clone(),
                itunes_category: CategoryXml {
                    text: self.channel.category.clone(),
                    sub: Some(Box::new(CategoryXml {
                        text: self.channel.subcategory.clone(),
                        sub: None,
                    })),
                },
                items: sorted.iter().map(|e| entry_to_item(e)).collect::<Result<_, _>>()?,
            },
        };

        let mut out = String::from(XML_DECL);
        let mut ser = quick_xml::se::Serializer::new(&mut out);
        ser.indent(' ', 2);
        rss.serialize(ser)
            .map_err(|e| PipelineError::Persistence(format!("serializing feed: {e}")))?;
        out.push('\n');
        Ok(out)
    }

    /// Serialize and replace the persisted feed via temp file + rename, so a
    /// crash mid-write cannot lose prior entries.
    pub fn write_atomic(&self, path: &Path, last_build: DateTime<Utc>) -> Result<(), PipelineError> {
        let xml = self.to_xml(last_build)?;
        let tmp = path.with_extension("xml.tmp");
        fs::write(&tmp, xml).map_err(|e| {
            PipelineError::Persistence(format!("writing {}: {e}", tmp.display()))
        })?;
        fs::rename(&tmp, path).map_err(|e| {
            PipelineError::Persistence(format!("renaming {} into place: {e}", tmp.display()))
        })?;
        Ok(())
    }
}

/// Extract entries from persisted feed XML.
pub fn parse_entries(content: &str) -> anyhow::Result<Vec<FeedEntry>> {
    use anyhow::Context;
    let rss: RssXml = quick_xml::de::from_str(content).context("parsing feed xml")?;
    rss.channel
        .items
        .into_iter()
        .map(item_to_entry)
        .collect::<anyhow::Result<Vec<_>>>()
}

// ---- XML mapping ----

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename = "rss")]
struct RssXml {
    #[serde(rename = "@version")]
    version: String,
    #[serde(rename = "@xmlns:itunes")]
    itunes_ns: String,
    channel: ChannelXml,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChannelXml {
    title: String,
    link: String,
    description: String,
    language: String,
    #[serde(rename = "lastBuildDate")]
    last_build_date: String,
    #[serde(rename = "itunes:author", alias = "author")]
    itunes_author: String,
    #[serde(rename = "itunes:summary", alias = "summary")]
    itunes_summary: String,
    #[serde(rename = "itunes:explicit", alias = "explicit")]
    itunes_explicit: String,
    #[serde(rename = "itunes:category", alias = "category")]
    itunes_category: CategoryXml,
    #[serde(rename = "item", default)]
    items: Vec<ItemXml>,
}

#[derive(Debug, Serialize, Deserialize)]
struct CategoryXml {
    #[serde(rename = "@text")]
    text: String,
    #[serde(rename = "itunes:category", alias = "category", skip_serializing_if = "Option::is_none")]
    sub: Option<Box<CategoryXml>>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ItemXml {
    title: String,
    description: String,
    #[serde(rename = "pubDate")]
    pub_date: String,
    guid: GuidXml,
    enclosure: EnclosureXml,
    #[serde(rename = "itunes:duration", alias = "duration")]
    itunes_duration: String,
    #[serde(rename = "itunes:summary", alias = "summary")]
    itunes_summary: String,
    #[serde(rename = "itunes:explicit", alias = "explicit")]
    itunes_explicit: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct GuidXml {
    #[serde(rename = "@isPermaLink")]
    is_perma_link: String,
    #[serde(rename = "$text")]
    value: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct EnclosureXml {
    #[serde(rename = "@url")]
    url: String,
    #[serde(rename = "@length")]
    length: u64,
    #[serde(rename = "@type")]
    mime: String,
}

fn entry_to_item(entry: &FeedEntry) -> Result<ItemXml, PipelineError> {
    Ok(ItemXml {
        title: entry.title.clone(),
        description: entry.description.clone(),
        pub_date: format_rfc2822(entry.pub_date)?,
        guid: GuidXml {
            is_perma_link: "false".to_string(),
            value: entry.episode_id.clone(),
        },
        enclosure: EnclosureXml {
            url: entry.audio_url.clone(),
            length: entry.byte_size,
            mime: AUDIO_MIME_TYPE.to_string(),
        },
        itunes_duration: format_duration(entry.duration_seconds),
        itunes_summary: entry.description.clone(),
        itunes_explicit: "no".to_string(),
    })
}

fn item_to_entry(item: ItemXml) -> anyhow::Result<FeedEntry> {
    let pub_date = parse_rfc2822(&item.pub_date)
        .ok_or_else(|| anyhow::anyhow!("bad pubDate: {:?}", item.pub_date))?;
    let duration_seconds = parse_duration(&item.itunes_duration)
        .ok_or_else(|| anyhow::anyhow!("bad itunes:duration: {:?}", item.itunes_duration))?;
    Ok(FeedEntry {
        episode_id: item.guid.value,
        title: item.title,
        description: item.description,
        pub_date,
        audio_url: item.enclosure.url,
        byte_size: item.enclosure.length,
        duration_seconds,
    })
}

// ---- field formats ----

fn format_rfc2822(dt: DateTime<Utc>) -> Result<String, PipelineError> {
    OffsetDateTime::from_unix_timestamp(dt.timestamp())
        .ok()
        .and_then(|t| t.format(&Rfc2822).ok())
        .ok_or_else(|| PipelineError::Persistence(format!("unformattable pubDate: {dt}")))
}

fn parse_rfc2822(s: &str) -> Option<DateTime<Utc>> {
    let ts = OffsetDateTime::parse(s, &Rfc2822)
        .ok()
        .map(|dt| dt.unix_timestamp())?;
    DateTime::from_timestamp(ts, 0)
}

/// `M:SS`, or `H:MM:SS` past the hour (the usual iTunes duration forms).
fn format_duration(total_secs: u64) -> String {
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes}:{seconds:02}")
    }
}

fn parse_duration(s: &str) -> Option<u64> {
    let parts: Vec<&str> = s.trim().split(':').collect();
    if parts.is_empty() || parts.len() > 3 {
        return None;
    }
    let mut total = 0u64;
    for part in &parts {
        total = total
            .checked_mul(60)?
            .checked_add(part.trim().parse::<u64>().ok()?)?;
    }
    Some(total)
}
