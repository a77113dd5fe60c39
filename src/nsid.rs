//! NSIDs: `type:source/name` content identifiers, with an optional `|extra`.

use std::fmt;

use crate::error::{BuildError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Nsid {
    pub kind: String,
    pub source: String,
    pub name: String,
    pub extra: Option<String>,
}

impl Nsid {
    pub fn new(kind: &str, source: &str, name: &str) -> Self {
        Self {
            kind: kind.to_string(),
            source: source.to_string(),
            name: name.to_string(),
            extra: None,
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        let (base, extra) = match s.split_once('|') {
            Some((base, extra)) => (base, Some(extra.to_string())),
            None => (s, None),
        };
        let (kind, rest) = base
            .split_once(':')
            .ok_or_else(|| BuildError::InvalidNsid(s.to_string(), "missing ':'"))?;
        let (source, name) = rest
            .split_once('/')
            .ok_or_else(|| BuildError::InvalidNsid(s.to_string(), "missing '/'"))?;
        if kind.is_empty() {
            return Err(BuildError::InvalidNsid(s.to_string(), "empty type"));
        }
        if source.is_empty() {
            return Err(BuildError::InvalidNsid(s.to_string(), "empty source"));
        }
        if name.is_empty() {
            return Err(BuildError::InvalidNsid(s.to_string(), "empty name"));
        }
        Ok(Self {
            kind: kind.to_string(),
            source: source.to_string(),
            name: name.to_string(),
            extra,
        })
    }

    /// Permissive check for `[^:]+:[^/]+/.+` anywhere in the string.
    pub fn looks_like_nsid(s: &str) -> bool {
        s.char_indices().filter(|&(_, c)| c == ':').any(|(i, _)| {
            if i == 0 || s[..i].ends_with(':') {
                return false;
            }
            let rest = &s[i + 1..];
            match rest.find('/') {
                Some(slash) => slash > 0 && slash + 1 < rest.len(),
                None => false,
            }
        })
    }

    /// `type:source/name` without any `|extra`.
    pub fn base(&self) -> String {
        format!("{}:{}/{}", self.kind, self.source, self.name)
    }
}

impl fmt::Display for Nsid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.base())?;
        if let Some(extra) = &self.extra {
            write!(f, "|{}", extra)?;
        }
        Ok(())
    }
}

/// Strip a trailing `|extra` from a NSID string.
pub fn strip_extra(nsid: &str) -> &str {
    match nsid.split_once('|') {
        Some((base, _)) if !base.is_empty() => base,
        _ => nsid,
    }
}

/// Source part of a card NSID, in the form used for cardsheet filenames.
pub fn deck_source_key(nsid: &str) -> Result<String> {
    let nsid = nsid.replace('_', "-");
    let source = nsid
        .split([':', '/'])
        .nth(1)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| BuildError::InvalidNsid(nsid.clone(), "missing source in nsid"))?;
    Ok(source.replace('.', "-"))
}

/// Longest shared dot-delimited prefix. Leader cards always group as `card.leader`.
pub fn common_dot_prefix(items: &[&str]) -> String {
    let Some(first) = items.first() else {
        return String::new();
    };
    let first_parts: Vec<&str> = first.split('.').collect();
    let mut matching = first_parts.len();
    for item in items {
        let parts: Vec<&str> = item.split('.').collect();
        matching = matching.min(parts.len());
        for (i, part) in parts.iter().enumerate() {
            if first_parts.get(i) != Some(part) {
                matching = matching.min(i);
                break;
            }
        }
    }
    let result = first_parts[..matching].join(".");
    if result.starts_with("card.leader") {
        return "card.leader".to_string();
    }
    result
}
