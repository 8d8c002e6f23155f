//! feed::entry
//!
//! Parsing feed responses into package metadata.
//!
//! # Format
//!
//! Feeds answer queries with Atom XML. Each `entry` element carries the
//! package id in `title`, the download location in `content@src`, and a
//! property bag with `PackageSize`, `PackageHash`,
//! `IsAbsoluteLatestVersion`, `Published`, `Version`, and (optionally)
//! `Dependencies` — a pipe-separated list of `name:version[:framework]`
//! tokens.
//!
//! # Tolerance
//!
//! Parsing is deliberately forgiving: a response that is not XML, or an
//! entry missing a required element, contributes nothing. Not-found must
//! stay a value-level result, so malformed responses never become
//! errors that would abort a multi-feed search. Elements are matched by
//! local name, ignoring namespaces.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use roxmltree::{Document, Node};

use crate::core::types::PackageName;

use super::traits::{PackageDependency, PackageMetadata};

/// Parse every well-formed entry out of a feed response.
///
/// Garbage input yields an empty list, never an error.
pub fn parse_feed_entries(xml: &str) -> Vec<PackageMetadata> {
    let Ok(doc) = Document::parse(xml) else {
        return Vec::new();
    };
    doc.descendants()
        .filter(|n| n.is_element() && n.tag_name().name() == "entry")
        .filter_map(parse_entry)
        .collect()
}

fn parse_entry(entry: Node<'_, '_>) -> Option<PackageMetadata> {
    let name = PackageName::new(child_text(entry, "title")?).ok()?;
    let content_url = entry
        .descendants()
        .find(|n| n.is_element() && n.tag_name().name() == "content")?
        .attribute("src")?
        .to_string();
    let size: u64 = child_text(entry, "PackageSize")?.trim().parse().ok()?;
    let hash = child_text(entry, "PackageHash")?;
    let is_latest = parse_bool(&child_text(entry, "IsAbsoluteLatestVersion")?)?;
    let published = parse_published(&child_text(entry, "Published")?)?;
    let version = child_text(entry, "Version")?;
    let dependencies = child_text(entry, "Dependencies")
        .map(|raw| parse_dependencies(&raw))
        .unwrap_or_default();

    Some(PackageMetadata {
        name,
        version,
        content_url,
        size,
        hash,
        is_latest,
        published,
        dependencies,
    })
}

fn child_text(entry: Node<'_, '_>, local_name: &str) -> Option<String> {
    entry
        .descendants()
        .find(|n| n.is_element() && n.tag_name().name() == local_name)
        .and_then(|n| n.text())
        .map(str::to_string)
}

fn parse_bool(s: &str) -> Option<bool> {
    let s = s.trim();
    if s.eq_ignore_ascii_case("true") {
        Some(true)
    } else if s.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// Publication timestamps arrive either with an offset
/// (`2015-01-18T10:00:00Z`) or bare (`2015-01-18T10:00:00.7533333`);
/// bare timestamps are taken as UTC.
fn parse_published(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Parse a pipe-separated dependency list.
///
/// Tokens look like `Castle.Core:3.3.3` or
/// `Zlib.Portable:1.10.0:portable-net40+sl50+wp80+win80`; a trailing
/// framework field is ignored. Tokens without both a name and a version
/// (e.g. the bare `::net40` framework pin) are skipped.
pub fn parse_dependencies(raw: &str) -> Vec<PackageDependency> {
    raw.split('|')
        .filter_map(|token| {
            let mut fields = token.split(':');
            let name = fields.next()?.trim();
            let version = fields.next()?.trim();
            if name.is_empty() || version.is_empty() {
                return None;
            }
            Some(PackageDependency {
                name: PackageName::new(name).ok()?,
                version: version.to_string(),
            })
        })
        .collect()
}
