use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Duration, NaiveDateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Stored content stays visible to non-premium owners for this long.
pub const EXPIRATION_WINDOW_SECS: i64 = 60;

const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";
const TIMESTAMP_LEN: usize = 14;

/// `%Y` is only four characters wide inside this range.
const MAX_YEAR: i32 = 9999;

/// `<tag>@<timestamp14>|`
const PREFIX_LEN: usize = 1 + 1 + TIMESTAMP_LEN + 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferKind {
    Url,
    Text,
}

impl TransferKind {
    /// Single-character discriminator used in the persisted encoding.
    pub const fn tag(self) -> char {
        match self {
            TransferKind::Url => 'u',
            TransferKind::Text => 't',
        }
    }

    pub const fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            b'u' => Some(TransferKind::Url),
            b't' => Some(TransferKind::Text),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            TransferKind::Url => "url",
            TransferKind::Text => "text",
        }
    }
}

impl fmt::Display for TransferKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses the form tokens `url` and `text`.
impl FromStr for TransferKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "url" => Ok(TransferKind::Url),
            "text" => Ok(TransferKind::Text),
            other => Err(Error::UnknownKind(other.to_string())),
        }
    }
}

/// One saved piece of URL or text content plus its creation time.
///
/// Values are immutable; saving new content builds a new `Transfer` that
/// replaces the stored one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transfer {
    kind: TransferKind,
    created_at: DateTime<Utc>,
    content: String,
}

impl Transfer {
    /// Build a transfer stamped at `created_at`, truncated to whole seconds.
    ///
    /// Fails for timestamps whose year does not fit the fixed-width prefix.
    pub fn new(kind: TransferKind, created_at: DateTime<Utc>, content: impl Into<String>) -> Result<Self, Error> {
        if !(0..=MAX_YEAR).contains(&created_at.year()) {
            return Err(Error::MalformedRecord("timestamp year outside 0000-9999"));
        }
        Ok(Self {
            kind,
            created_at: created_at.trunc_subsecs(0),
            content: content.into(),
        })
    }

    pub fn kind(&self) -> TransferKind {
        self.kind
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn into_content(self) -> String {
        self.content
    }

    /// Persisted form: `<tag>@<YYYYMMDDHHmmss>|<content>`.
    ///
    /// The content is written verbatim; framing relies on the fixed-width
    /// prefix, so `@` and `|` inside the content need no escaping.
    pub fn encode(&self) -> String {
        let mut out = String::with_capacity(PREFIX_LEN + self.content.len());
        out.push(self.kind.tag());
        out.push('@');
        out.push_str(&self.created_at.format(TIMESTAMP_FORMAT).to_string());
        out.push('|');
        out.push_str(&self.content);
        out
    }

    pub fn decode(raw: &str) -> Result<Self, Error> {
        let bytes = raw.as_bytes();
        if bytes.len() < PREFIX_LEN {
            return Err(Error::MalformedRecord("shorter than the fixed prefix"));
        }

        let kind = TransferKind::from_tag(bytes[0])
            .ok_or(Error::MalformedRecord("unrecognized kind tag"))?;

        if bytes[1] != b'@' || bytes[PREFIX_LEN - 1] != b'|' {
            return Err(Error::MalformedRecord("missing separator"));
        }

        let stamp = &bytes[2..2 + TIMESTAMP_LEN];
        if !stamp.iter().all(u8::is_ascii_digit) {
            return Err(Error::MalformedRecord("non-numeric timestamp"));
        }

        // The prefix is all ASCII at this point, so both slices land on char boundaries.
        let created_at = NaiveDateTime::parse_from_str(&raw[2..2 + TIMESTAMP_LEN], TIMESTAMP_FORMAT)
            .map_err(|_| Error::MalformedRecord("invalid timestamp"))?
            .and_utc();

        Ok(Self {
            kind,
            created_at,
            content: raw[PREFIX_LEN..].to_string(),
        })
    }

    /// True once `now` is strictly past `created_at + 60s`.
    ///
    /// At exactly 60 seconds the transfer is still fresh. Premium accounts
    /// bypass this check in the access layer, not here.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.created_at + Duration::seconds(EXPIRATION_WINDOW_SECS)
    }
}
