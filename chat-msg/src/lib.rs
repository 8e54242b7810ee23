// https://github.com/Tyrrrz/DiscordChatExporter (json export format)

use chat_ref::{parse_message_date, AuthorId, EmojiKey, RefError};
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_with::{serde_as, DefaultOnError, DeserializeAs, VecSkipError};
use std::{
    cmp::Ordering,
    hash::{Hash, Hasher},
};

#[serde_as]
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Channel {
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub guild: Option<Guild>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub channel: Option<ChannelInfo>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub date_range: Option<DateRange>,
    /// An element that is not a message object decodes as an empty message, so
    /// ingestion still sees it and reports it as skipped.
    #[serde_as(deserialize_as = "DefaultOnError<Vec<DefaultOnError>>")]
    #[serde(default)]
    pub messages: Vec<Message>,
}

impl Channel {
    pub fn name(&self) -> &str {
        self.channel
            .as_ref()
            .map(|info| info.name.as_str())
            .unwrap_or("<unnamed>")
    }
}

#[serde_as]
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Guild {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub icon_url: Option<String>,
}

#[serde_as]
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelInfo {
    pub id: String,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(rename = "type")]
    #[serde(default)]
    pub channel_type: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub topic: Option<String>,
}

#[serde_as]
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct DateRange {
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub after: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub before: Option<String>,
}

#[serde_as]
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub id: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(rename = "type")]
    #[serde(default)]
    pub message_type: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub timestamp_edited: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub is_pinned: bool,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub content: String,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub author: Option<Author>,
    #[serde_as(deserialize_as = "DefaultOnError<VecSkipError<_>>")]
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde_as(deserialize_as = "DefaultOnError<VecSkipError<_>>")]
    #[serde(default)]
    pub embeds: Vec<Embed>,
    #[serde_as(deserialize_as = "DefaultOnError<VecSkipError<_>>")]
    #[serde(default)]
    pub reactions: Vec<Reaction>,
    #[serde_as(deserialize_as = "DefaultOnError<VecSkipError<_>>")]
    #[serde(default)]
    pub mentions: Vec<Mention>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub reference: Option<Reference>,
}

impl Message {
    /// Number of maximal runs of non-whitespace characters in the content.
    pub fn word_count(&self) -> u64 {
        self.content.split_whitespace().count() as u64
    }

    /// Calendar date of the message, taken from the date portion of the timestamp.
    pub fn date(&self) -> Option<Result<NaiveDate, RefError>> {
        self.timestamp.as_deref().map(parse_message_date)
    }
}

#[serde_as]
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub id: AuthorId,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub name: String,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub discriminator: Option<String>,
    #[serde(default, deserialize_with = "deserialize_escaped")]
    pub nickname: String,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub color: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub is_bot: bool,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub url: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub icon_url: Option<String>,
}

impl Author {
    pub fn new(id: AuthorId, name: String, nickname: String) -> Self {
        Author {
            id,
            name,
            discriminator: None,
            nickname: escape_backslashes(&nickname),
            color: None,
            is_bot: false,
            avatar_url: None,
            url: None,
            icon_url: None,
        }
    }

    /// Nickname when there is one, name otherwise.
    pub fn display_name(&self) -> &str {
        if self.nickname.trim().is_empty() {
            self.name.as_str()
        } else {
            self.nickname.as_str()
        }
    }

    /// System-wide output order: name, case-insensitively, then id.
    pub fn display_cmp(&self, other: &Author) -> Ordering {
        let lhs = self.name.chars().flat_map(char::to_lowercase);
        let rhs = other.name.chars().flat_map(char::to_lowercase);
        lhs.cmp(rhs).then_with(|| self.id.cmp(&other.id))
    }
}

// Two users can share a display name, so identity is the id alone.
impl PartialEq for Author {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Author {}

impl Hash for Author {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state)
    }
}

impl PartialOrd for Author {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Author {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

#[serde_as]
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Mention {
    pub id: AuthorId,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub name: String,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub discriminator: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub is_bot: bool,
}

#[serde_as]
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Reaction {
    pub emoji: Emoji,
    #[serde(default = "Reaction::default_count", deserialize_with = "deserialize_count")]
    pub count: u64,
}

impl Reaction {
    pub fn default_count() -> u64 {
        1
    }
}

#[serde_as]
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Emoji {
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub id: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub name: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub is_animated: bool,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub image_url: Option<String>,
}

impl Emoji {
    pub fn key(&self) -> EmojiKey {
        EmojiKey::from_parts(self.id.as_deref(), self.name.as_deref())
    }
}

#[serde_as]
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub id: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub url: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub file_size_bytes: Option<u64>,
}

#[serde_as]
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Embed {
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub title: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub url: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub description: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub color: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub thumbnail: Option<EmbedImage>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub image: Option<EmbedImage>,
    #[serde_as(deserialize_as = "DefaultOnError<VecSkipError<_>>")]
    #[serde(default)]
    pub fields: Vec<Field>,
}

#[serde_as]
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct EmbedImage {
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub url: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub width: Option<u64>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub height: Option<u64>,
}

#[serde_as]
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub value: String,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub is_inline: bool,
}

#[serde_as]
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reference {
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub message_id: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub channel_id: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    #[serde(default)]
    pub guild_id: Option<String>,
}

pub fn escape_backslashes(value: &str) -> String {
    value.replace('\\', "\\\\")
}

// A missing, null or malformed count all mean a single reaction.
fn deserialize_count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let count: Option<u64> =
        <DefaultOnError as DeserializeAs<'de, Option<u64>>>::deserialize_as(deserializer)?;
    Ok(count.unwrap_or_else(Reaction::default_count))
}

fn deserialize_escaped<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.map(|v| escape_backslashes(&v)).unwrap_or_default())
}
