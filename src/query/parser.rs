//! Parser for the line-oriented command language.
//!
//! ```text
//! # comments and blank lines are skipped
//! SET 100 user1 name "Alice Smith"
//! CAS 200 user1 age NULL 30
//! SCAN_PREFIX 300 config app.
//! ```
//!
//! Tokens are separated by whitespace and may be double-quoted (`\"`, `\\`
//! and `\n` escapes). The bare word `NULL` stands for an absent expected
//! value; `"NULL"` is the literal string.

use crate::core::temporal::{Timestamp, Ttl};
use crate::error::{Error, Result};
use nom::branch::alt;
use nom::bytes::complete::{escaped_transform, is_not, tag};
use nom::character::complete::{char, multispace0, multispace1};
use nom::combinator::{all_consuming, map, value};
use nom::multi::separated_list0;
use nom::sequence::delimited;
use nom::IResult;

/// A parsed store command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Set {
        ts: Timestamp,
        key: String,
        field: String,
        value: String,
    },
    Get {
        ts: Timestamp,
        key: String,
        field: String,
    },
    CompareAndSet {
        ts: Timestamp,
        key: String,
        field: String,
        expected: Option<String>,
        new_value: String,
    },
    CompareAndDelete {
        ts: Timestamp,
        key: String,
        field: String,
        expected: Option<String>,
    },
    Scan {
        ts: Timestamp,
        key: String,
    },
    ScanByPrefix {
        ts: Timestamp,
        key: String,
        prefix: String,
    },
    SetWithTtl {
        ts: Timestamp,
        key: String,
        field: String,
        value: String,
        ttl: Ttl,
    },
    CompareAndSetWithTtl {
        ts: Timestamp,
        key: String,
        field: String,
        expected: Option<String>,
        new_value: String,
        ttl: Ttl,
    },
    SetAt {
        now: Timestamp,
        key: String,
        field: String,
        value: String,
        set_ts: Timestamp,
    },
    GetAt {
        now: Timestamp,
        key: String,
        field: String,
        query_ts: Timestamp,
    },
    History {
        key: String,
        field: String,
    },
    Keys,
    Stats,
}

/// One command together with the script line it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    /// 1-based line number
    pub line: usize,
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Token {
    text: String,
    quoted: bool,
}

fn quoted(input: &str) -> IResult<&str, String> {
    alt((
        value(String::new(), tag("\"\"")),
        delimited(
            char('"'),
            escaped_transform(
                is_not("\\\""),
                '\\',
                alt((
                    value("\\", tag("\\")),
                    value("\"", tag("\"")),
                    value("\n", tag("n")),
                )),
            ),
            char('"'),
        ),
    ))(input)
}

fn token(input: &str) -> IResult<&str, Token> {
    alt((
        map(quoted, |text| Token { text, quoted: true }),
        map(is_not(" \t\r\n\""), |text: &str| Token {
            text: text.to_string(),
            quoted: false,
        }),
    ))(input)
}

fn tokens(input: &str) -> IResult<&str, Vec<Token>> {
    all_consuming(delimited(
        multispace0,
        separated_list0(multispace1, token),
        multispace0,
    ))(input)
}

/// Cursor over the arguments of one command
struct Args<'a> {
    line: usize,
    name: &'a str,
    tokens: std::slice::Iter<'a, Token>,
}

impl<'a> Args<'a> {
    fn next(&mut self, what: &str) -> Result<&'a Token> {
        self.tokens
            .next()
            .ok_or_else(|| Error::parse(self.line, format!("{}: missing {what}", self.name)))
    }

    fn string(&mut self, what: &str) -> Result<String> {
        Ok(self.next(what)?.text.clone())
    }

    fn expected(&mut self) -> Result<Option<String>> {
        let token = self.next("expected value")?;
        if !token.quoted && token.text.eq_ignore_ascii_case("null") {
            Ok(None)
        } else {
            Ok(Some(token.text.clone()))
        }
    }

    fn timestamp(&mut self, what: &str) -> Result<Timestamp> {
        let token = self.next(what)?;
        let parsed: IResult<&str, i64> = all_consuming(nom::character::complete::i64)(token.text.as_str());
        parsed.map(|(_, ticks)| Timestamp::new(ticks)).map_err(|_| {
            Error::parse(
                self.line,
                format!("{}: {what} is not an integer: `{}`", self.name, token.text),
            )
        })
    }

    fn ttl(&mut self) -> Result<Ttl> {
        let token = self.next("ttl")?;
        if token.text.starts_with('-') {
            return Err(Error::InvalidTtl(format!(
                "line {}: negative ttl `{}`",
                self.line, token.text
            )));
        }
        let parsed: IResult<&str, u64> = all_consuming(nom::character::complete::u64)(token.text.as_str());
        parsed.map(|(_, ticks)| Ttl::new(ticks)).map_err(|_| {
            Error::parse(
                self.line,
                format!("{}: ttl is not an unsigned integer: `{}`", self.name, token.text),
            )
        })
    }

    fn finish(mut self) -> Result<()> {
        match self.tokens.next() {
            None => Ok(()),
            Some(extra) => Err(Error::parse(
                self.line,
                format!("{}: unexpected argument `{}`", self.name, extra.text),
            )),
        }
    }
}

/// Parse a single script line.
///
/// Returns `Ok(None)` for blank lines and `#` comments.
pub fn parse_line(line: usize, text: &str) -> Result<Option<Command>> {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }

    let (_, tokens) = tokens(trimmed)
        .map_err(|e| Error::parse(line, format!("malformed input: {e}")))?;
    let Some((head, rest)) = tokens.split_first() else {
        return Ok(None);
    };
    if head.quoted {
        return Err(Error::parse(line, "command name must not be quoted"));
    }

    let keyword = head.text.to_ascii_uppercase();
    let mut args = Args {
        line,
        name: &head.text,
        tokens: rest.iter(),
    };

    let command = match keyword.as_str() {
        "SET" => Command::Set {
            ts: args.timestamp("timestamp")?,
            key: args.string("key")?,
            field: args.string("field")?,
            value: args.string("value")?,
        },
        "GET" => Command::Get {
            ts: args.timestamp("timestamp")?,
            key: args.string("key")?,
            field: args.string("field")?,
        },
        "CAS" => Command::CompareAndSet {
            ts: args.timestamp("timestamp")?,
            key: args.string("key")?,
            field: args.string("field")?,
            expected: args.expected()?,
            new_value: args.string("new value")?,
        },
        "CAD" => Command::CompareAndDelete {
            ts: args.timestamp("timestamp")?,
            key: args.string("key")?,
            field: args.string("field")?,
            expected: args.expected()?,
        },
        "SCAN" => Command::Scan {
            ts: args.timestamp("timestamp")?,
            key: args.string("key")?,
        },
        "SCAN_PREFIX" => Command::ScanByPrefix {
            ts: args.timestamp("timestamp")?,
            key: args.string("key")?,
            prefix: args.string("prefix")?,
        },
        "SET_TTL" => Command::SetWithTtl {
            ts: args.timestamp("timestamp")?,
            key: args.string("key")?,
            field: args.string("field")?,
            value: args.string("value")?,
            ttl: args.ttl()?,
        },
        "CAS_TTL" => Command::CompareAndSetWithTtl {
            ts: args.timestamp("timestamp")?,
            key: args.string("key")?,
            field: args.string("field")?,
            expected: args.expected()?,
            new_value: args.string("new value")?,
            ttl: args.ttl()?,
        },
        "SET_AT" => Command::SetAt {
            now: args.timestamp("current timestamp")?,
            key: args.string("key")?,
            field: args.string("field")?,
            value: args.string("value")?,
            set_ts: args.timestamp("set timestamp")?,
        },
        "GET_AT" => Command::GetAt {
            now: args.timestamp("current timestamp")?,
            key: args.string("key")?,
            field: args.string("field")?,
            query_ts: args.timestamp("query timestamp")?,
        },
        "HISTORY" => Command::History {
            key: args.string("key")?,
            field: args.string("field")?,
        },
        "KEYS" => Command::Keys,
        "STATS" => Command::Stats,
        _ => {
            return Err(Error::parse(
                line,
                format!("unknown command `{}`", head.text),
            ))
        }
    };
    args.finish()?;
    Ok(Some(command))
}

/// Parse a whole script, stopping at the first malformed line
pub fn parse_script(text: &str) -> Result<Vec<ParsedCommand>> {
    let mut commands = Vec::new();
    for (index, raw) in text.lines().enumerate() {
        let line = index + 1;
        if let Some(command) = parse_line(line, raw)? {
            commands.push(ParsedCommand { line, command });
        }
    }
    Ok(commands)
}
