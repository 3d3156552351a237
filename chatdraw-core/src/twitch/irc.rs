//! Minimal IRC line parsing with IRCv3 message tags.
//!
//! Handles the subset Twitch chat sends:
//!
//! ```text
//! [@tag=value;tag2=value2] [:prefix] COMMAND [params...] [:trailing]
//! ```

use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IrcParseError {
    #[error("empty line")]
    Empty,
    #[error("missing command in line: {0}")]
    MissingCommand(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IrcMessage {
    /// Unescaped tag values; a tag without `=` has an empty value.
    pub tags: Vec<(String, String)>,
    pub prefix: Option<String>,
    pub command: String,
    /// Middle parameters followed by the trailing parameter, if any.
    pub params: Vec<String>,
}

impl IrcMessage {
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Nickname part of the prefix (`nick!user@host`).
    pub fn nick(&self) -> Option<&str> {
        let prefix = self.prefix.as_deref()?;
        let nick = prefix.split(['!', '@']).next().unwrap_or(prefix);
        (!nick.is_empty()).then_some(nick)
    }

    pub fn param(&self, index: usize) -> Option<&str> {
        self.params.get(index).map(String::as_str)
    }
}

impl FromStr for IrcMessage {
    type Err = IrcParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut rest = line.trim_end_matches(['\r', '\n']);
        if rest.trim().is_empty() {
            return Err(IrcParseError::Empty);
        }

        let mut tags = Vec::new();
        if let Some(stripped) = rest.strip_prefix('@') {
            let (raw_tags, tail) = stripped.split_once(' ').unwrap_or((stripped, ""));
            tags = parse_tags(raw_tags);
            rest = tail.trim_start_matches(' ');
        }

        let mut prefix = None;
        if let Some(stripped) = rest.strip_prefix(':') {
            let (raw_prefix, tail) = stripped.split_once(' ').unwrap_or((stripped, ""));
            prefix = Some(raw_prefix.to_string());
            rest = tail.trim_start_matches(' ');
        }

        let (command, mut rest) = rest.split_once(' ').unwrap_or((rest, ""));
        if command.is_empty() {
            return Err(IrcParseError::MissingCommand(line.to_string()));
        }

        let mut params = Vec::new();
        loop {
            rest = rest.trim_start_matches(' ');
            if rest.is_empty() {
                break;
            }
            if let Some(trailing) = rest.strip_prefix(':') {
                params.push(trailing.to_string());
                break;
            }
            let (param, tail) = rest.split_once(' ').unwrap_or((rest, ""));
            params.push(param.to_string());
            rest = tail;
        }

        Ok(IrcMessage {
            tags,
            prefix,
            command: command.to_ascii_uppercase(),
            params,
        })
    }
}

fn parse_tags(raw: &str) -> Vec<(String, String)> {
    raw.split(';')
        .filter(|s| !s.is_empty())
        .map(|tag| {
            let (key, value) = tag.split_once('=').unwrap_or((tag, ""));
            (key.to_string(), unescape_tag_value(value))
        })
        .collect()
}

/// Unescape a tag value from wire format.
pub fn unescape_tag_value(value: &str) -> String {
    let mut unescaped = String::with_capacity(value.len());
    let mut iter = value.chars();
    while let Some(c) = iter.next() {
        let r = if c == '\\' {
            match iter.next() {
                Some(':') => ';',
                Some('s') => ' ',
                Some('\\') => '\\',
                Some('r') => '\r',
                Some('n') => '\n',
                Some(c) => c,
                None => break,
            }
        } else {
            c
        };
        unescaped.push(r);
    }
    unescaped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> IrcMessage {
        match line.parse() {
            Ok(m) => m,
            Err(e) => unreachable!("failed to parse {line:?}: {e}"),
        }
    }

    #[test]
    fn test_parse_twitch_privmsg() {
        let m = parse(
            "@badge-info=;display-name=Bob\\sThe\\sGreat;user-id=42 :bob!bob@bob.tmi.twitch.tv PRIVMSG #streamer :!join now\r\n",
        );
        assert_eq!(m.command, "PRIVMSG");
        assert_eq!(m.tag("display-name"), Some("Bob The Great"));
        assert_eq!(m.tag("badge-info"), Some(""));
        assert_eq!(m.tag("missing"), None);
        assert_eq!(m.nick(), Some("bob"));
        assert_eq!(m.params, vec!["#streamer", "!join now"]);
    }

    #[test]
    fn test_parse_ping_without_prefix() {
        let m = parse("PING :tmi.twitch.tv");
        assert_eq!(m.command, "PING");
        assert_eq!(m.prefix, None);
        assert_eq!(m.param(0), Some("tmi.twitch.tv"));
    }

    #[test]
    fn test_parse_numeric_with_middle_params() {
        let m = parse(":tmi.twitch.tv 001 mybot :Welcome, GLHF!");
        assert_eq!(m.command, "001");
        assert_eq!(m.params, vec!["mybot", "Welcome, GLHF!"]);
        assert_eq!(m.nick(), Some("tmi.twitch.tv"));
    }

    #[test]
    fn test_trailing_keeps_inner_colons_and_spaces() {
        let m = parse(":a!a@a PRIVMSG #c :hello :: world  ");
        assert_eq!(m.param(1), Some("hello :: world  "));
    }

    #[test]
    fn test_empty_and_commandless_lines_fail() {
        assert_eq!("".parse::<IrcMessage>(), Err(IrcParseError::Empty));
        assert_eq!("\r\n".parse::<IrcMessage>(), Err(IrcParseError::Empty));
        assert!(matches!(
            ":prefix.only".parse::<IrcMessage>(),
            Err(IrcParseError::MissingCommand(_))
        ));
    }

    #[test]
    fn test_unescape_tag_value() {
        assert_eq!(unescape_tag_value("a\\:b\\sc\\\\d"), "a;b c\\d");
        assert_eq!(unescape_tag_value("test\\"), "test");
        assert_eq!(unescape_tag_value("a\\xb"), "axb");
    }
}
