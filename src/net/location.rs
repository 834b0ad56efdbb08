use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::net::query::QueryState;
use crate::utils::TokenIterator;

/// A router location: the path, query state, and fragment of an in-app URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location {
    pub path: String,
    pub query: QueryState,
    pub fragment: Option<String>,
}

impl Location {
    pub fn new(path: &str, query: QueryState) -> Self {
        Self {
            path: path.to_string(),
            query,
            fragment: None,
        }
    }

    pub fn with_query(&self, query: QueryState) -> Self {
        Self {
            query,
            ..self.clone()
        }
    }
}

impl FromStr for Location {
    type Err = Error;

    fn from_str(location: &str) -> Result<Self> {
        LocationParser::new(location).parse()
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.path)?;
        if !self.query.is_empty() {
            write!(f, "?{}", self.query.to_query_string())?;
        }
        if let Some(fragment) = &self.fragment {
            write!(f, "#{}", fragment)?;
        }
        Ok(())
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
enum LocationParsingState {
    #[default]
    PathStart,
    Path,
    Query,
    Fragment,
}

/// Splits an in-app location (`/loans?page=2#top`) into path, query, and fragment.
/// Only root-relative paths are accepted; routers never hand us a scheme or host.
#[derive(Debug)]
struct LocationParser {
    input: TokenIterator<char>,
    output: Location,
    state: LocationParsingState,
    buf: String,
}

impl LocationParser {
    fn new(location: &str) -> Self {
        Self {
            input: TokenIterator::new(
                &location
                    .trim()
                    .replace(['\t', '\n', '\r'], "")
                    .chars()
                    .collect::<Vec<char>>(),
            ),
            output: Location::default(),
            state: LocationParsingState::PathStart,
            buf: String::new(),
        }
    }

    fn parse(&mut self) -> Result<Location> {
        loop {
            match self.state {
                LocationParsingState::PathStart => self.parse_path_start()?,
                LocationParsingState::Path => self.parse_path(),
                LocationParsingState::Query => self.parse_query(),
                LocationParsingState::Fragment => self.parse_fragment(),
            }

            if self.input.next().is_none() {
                break;
            }
        }

        if self.output.path.is_empty() {
            self.output.path = "/".to_string();
        }
        Ok(self.output.clone())
    }

    fn parse_path_start(&mut self) -> Result<()> {
        match self.input.peek() {
            Some('/') => {
                self.buf.push('/');
                self.state = LocationParsingState::Path;
            }
            Some('?') => self.state = LocationParsingState::Query,
            Some('#') => {
                self.output.fragment = Some(String::new());
                self.state = LocationParsingState::Fragment;
            }
            None => {}
            Some(c) => {
                return Err(Error::LocationParse(format!(
                    "location must start with '/', '?' or '#', found {:?}",
                    c
                )));
            }
        }
        Ok(())
    }

    fn parse_path(&mut self) {
        let c = self.input.peek().copied();
        match c {
            None | Some('?' | '#') => {
                self.output.path = std::mem::take(&mut self.buf);
                if c == Some('?') {
                    self.state = LocationParsingState::Query;
                } else if c == Some('#') {
                    self.output.fragment = Some(String::new());
                    self.state = LocationParsingState::Fragment;
                }
            }
            Some(c) => self.buf.push(c),
        }
    }

    fn parse_query(&mut self) {
        let c = self.input.peek().copied();
        match c {
            None | Some('#') => {
                self.output.query = QueryState::parse(&self.buf);
                self.buf.clear();
                if c == Some('#') {
                    self.output.fragment = Some(String::new());
                    self.state = LocationParsingState::Fragment;
                }
            }
            Some(c) => self.buf.push(c),
        }
    }

    fn parse_fragment(&mut self) {
        if let Some(c) = self.input.peek().copied() {
            self.output.fragment.get_or_insert_with(String::new).push(c);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_only() {
        let location = "/loans".parse::<Location>().unwrap();
        assert_eq!(location.path, "/loans");
        assert!(location.query.is_empty());
        assert_eq!(location.fragment, None);
    }

    #[test]
    fn full_location_with_query_and_fragment() {
        let location = "/deposits?page=3&status=active#top"
            .parse::<Location>()
            .unwrap();
        assert_eq!(location.path, "/deposits");
        assert_eq!(location.query.get_str("page"), Some("3"));
        assert_eq!(location.query.get_str("status"), Some("active"));
        assert_eq!(location.fragment, Some("top".to_string()));
    }

    #[test]
    fn query_without_path() {
        let location = "?pageSize=20".parse::<Location>().unwrap();
        assert_eq!(location.path, "/");
        assert_eq!(location.query.get_str("pageSize"), Some("20"));
    }

    #[test]
    fn display_reencodes_query() {
        let location = "/wallets?lastEvaluatedKey=%7B%22id%22%3A4%7D&page=2"
            .parse::<Location>()
            .unwrap();
        assert_eq!(
            location.query.get_str("lastEvaluatedKey"),
            Some(r#"{"id":4}"#)
        );
        assert_eq!(
            location.to_string(),
            "/wallets?lastEvaluatedKey=%7B%22id%22%3A4%7D&page=2"
        );
    }

    #[test]
    fn rejects_absolute_url() {
        assert!("https://example.com/loans".parse::<Location>().is_err());
    }
}
