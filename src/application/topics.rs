use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TopicMode {
    #[default]
    Add,
    Remove,
    Replace,
}

impl fmt::Display for TopicMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Add => write!(f, "add"),
            Self::Remove => write!(f, "remove"),
            Self::Replace => write!(f, "replace"),
        }
    }
}

impl FromStr for TopicMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "add" => Ok(Self::Add),
            "remove" => Ok(Self::Remove),
            "replace" => Ok(Self::Replace),
            other => Err(format!("invalid topic mode: {other}")),
        }
    }
}

/// Splits a comma separated topic list, dropping blanks.
pub fn parse_topic_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|topic| !topic.is_empty())
        .map(str::to_string)
        .collect()
}

/// Computes the topic list a repository ends up with. Existing order is kept;
/// added topics are appended once each.
pub fn apply_topic_mode(current: &[String], topics: &[String], mode: TopicMode) -> Vec<String> {
    let mut next: Vec<String> = match mode {
        TopicMode::Replace => Vec::new(),
        TopicMode::Add => current.to_vec(),
        TopicMode::Remove => current
            .iter()
            .filter(|topic| !topics.contains(topic))
            .cloned()
            .collect(),
    };

    if matches!(mode, TopicMode::Add | TopicMode::Replace) {
        for topic in topics {
            if !topic.is_empty() && !next.contains(topic) {
                next.push(topic.clone());
            }
        }
    }
    next
}

#[cfg(test)]
mod tests {
    use super::*;

    fn topics(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn modes_apply_to_existing_topics() {
        let current = topics(&["a", "b"]);
        assert_eq!(
            apply_topic_mode(&current, &topics(&["a"]), TopicMode::Remove),
            topics(&["b"])
        );
        assert_eq!(
            apply_topic_mode(&current, &topics(&["c"]), TopicMode::Add),
            topics(&["a", "b", "c"])
        );
        assert_eq!(
            apply_topic_mode(&current, &topics(&["x"]), TopicMode::Replace),
            topics(&["x"])
        );
    }

    #[test]
    fn add_is_idempotent_and_skips_blanks() {
        let current = topics(&["a", "b"]);
        assert_eq!(
            apply_topic_mode(&current, &topics(&["b", "", "c", "c"]), TopicMode::Add),
            topics(&["a", "b", "c"])
        );
    }

    #[test]
    fn parse_topic_list_trims_entries() {
        assert_eq!(parse_topic_list(" rust, ,cli ,"), topics(&["rust", "cli"]));
        assert!(parse_topic_list("  ").is_empty());
    }
}
