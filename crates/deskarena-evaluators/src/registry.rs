//! Static getter/metric tables keyed by tag string, shaped after
//! `agtrace-providers::registry`'s `PROVIDERS` table (§4.5.1).

use crate::error::{Error, Result};
use crate::traits::{Getter, Metric};
use crate::{getters, metrics};

/// A getter tag, resolved once at task-load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GetterTag(pub &'static str);

/// A metric tag, resolved once at task-load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MetricTag(pub &'static str);

pub fn resolve_getter(tag: &str) -> Result<&'static dyn Getter> {
    getters::all()
        .into_iter()
        .find(|g| g.tag() == tag)
        .ok_or_else(|| Error::UnknownTag(tag.to_string()))
}

pub fn resolve_metric(tag: &str) -> Result<&'static dyn Metric> {
    metrics::all()
        .into_iter()
        .find(|m| m.tag() == tag)
        .ok_or_else(|| Error::UnknownTag(tag.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_getter_finds_registered_tag() {
        assert_eq!(resolve_getter("file_exists").unwrap().tag(), "file_exists");
    }

    #[test]
    fn resolve_getter_rejects_unknown_tag() {
        assert!(matches!(resolve_getter("made_up"), Err(Error::UnknownTag(_))));
    }

    #[test]
    fn resolve_metric_finds_registered_tag() {
        assert_eq!(resolve_metric("exact_match").unwrap().tag(), "exact_match");
    }

    #[test]
    fn resolve_metric_rejects_unknown_tag() {
        assert!(matches!(resolve_metric("made_up"), Err(Error::UnknownTag(_))));
    }
}
