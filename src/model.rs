use chrono::{DateTime, Utc};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Milliseconds between the Unix epoch and the Discord epoch (2015-01-01T00:00:00Z).
const DISCORD_EPOCH_MS: u64 = 1_420_070_400_000;

/// Discord sends snowflakes as JSON strings to avoid 53-bit float truncation,
/// but tolerates integers in some payloads. Accept both.
fn deserialize_snowflake<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    struct SnowflakeVisitor;

    impl Visitor<'_> for SnowflakeVisitor {
        type Value = u64;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a snowflake id as a string or integer")
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<u64, E> {
            Ok(v)
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<u64, E> {
            v.parse().map_err(de::Error::custom)
        }
    }

    deserializer.deserialize_any(SnowflakeVisitor)
}

macro_rules! snowflake_id {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub u64);

        impl $name {
            /// Creation instant embedded in the snowflake (Discord-epoch milliseconds
            /// in the top 42 bits).
            pub fn created_at(self) -> DateTime<Utc> {
                let ms = (self.0 >> 22) + DISCORD_EPOCH_MS;
                DateTime::from_timestamp_millis(ms as i64).unwrap_or(DateTime::UNIX_EPOCH)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.parse().map($name)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                deserialize_snowflake(deserializer).map($name)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(&self.0)
            }
        }
    };
}

snowflake_id!(ChannelId);
snowflake_id!(MessageId);

/// A channel as returned by `GET /channels/{id}`. Only the fields the
/// transcript needs; everything else in the payload is ignored.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Channel {
    pub id: ChannelId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub guild_id: Option<ChannelId>,
}

impl Channel {
    /// Human-readable label for headers and logs.
    pub fn label(&self) -> String {
        match &self.name {
            Some(name) => format!("#{name}"),
            None => self.id.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Author {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub global_name: Option<String>,
    #[serde(default)]
    pub bot: bool,
}

impl Author {
    pub fn display_name(&self) -> &str {
        self.global_name.as_deref().unwrap_or(&self.username)
    }
}

/// Attachments are passed through to rendering unmodified.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Attachment {
    pub id: String,
    pub filename: String,
    pub url: String,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub size: u64,
}

/// A read-only message snapshot. `timestamp` is the authoritative ordering
/// key; snowflake ids happen to be time-ordered too, but the range algorithm
/// sorts on the timestamp the service reports.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Message {
    pub id: MessageId,
    #[serde(default)]
    pub channel_id: Option<ChannelId>,
    pub author: Author,
    #[serde(default)]
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub edited_timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}
