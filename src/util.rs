use chrono::{DateTime, Duration, Utc};

use crate::message::model::Message;

const SUPPORTED_IMAGE_TYPES: [&str; 4] = ["image/jpeg", "image/png", "image/gif", "image/webp"];

const SUPPORTED_DOCUMENT_TYPES: [&str; 4] = [
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "text/plain",
];

/// First character of each name part, uppercased. Empty parts contribute nothing.
pub fn initials(first_name: &str, last_name: &str) -> String {
    first_name
        .chars()
        .next()
        .into_iter()
        .chain(last_name.chars().next())
        .flat_map(char::to_uppercase)
        .collect()
}

/// Today renders as time-only, yesterday as a literal, anything older as a short date.
pub fn format_timestamp(ts: DateTime<Utc>, now: DateTime<Utc>) -> String {
    if ts.date_naive() == now.date_naive() {
        return ts.format("%H:%M").to_string();
    }

    date_label(ts, now)
}

pub fn date_label(ts: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let date = ts.date_naive();

    if date == now.date_naive() {
        "Today".to_string()
    } else if date == (now - Duration::days(1)).date_naive() {
        "Yesterday".to_string()
    } else {
        ts.format("%b %d, %Y").to_string()
    }
}

pub struct MessageGroup {
    pub date: String,
    pub messages: Vec<Message>,
}

/// Splits an ordered message list into date sections, preserving order within each.
pub fn group_messages_by_date(messages: &[Message], now: DateTime<Utc>) -> Vec<MessageGroup> {
    let mut groups: Vec<MessageGroup> = Vec::new();

    for message in messages {
        let label = date_label(message.created_at(), now);
        match groups.last_mut() {
            Some(group) if group.date == label => group.messages.push(message.clone()),
            _ => groups.push(MessageGroup {
                date: label,
                messages: vec![message.clone()],
            }),
        }
    }

    groups
}

/// Two consecutive messages from the same sender merge visually when
/// less than 5 minutes apart.
pub fn should_group_messages(current: &Message, previous: Option<&Message>) -> bool {
    let Some(previous) = previous else {
        return false;
    };

    if current.sender_id() != previous.sender_id() {
        return false;
    }

    current.created_at() - previous.created_at() < Duration::minutes(5)
}

pub fn is_image(mime_type: &str) -> bool {
    SUPPORTED_IMAGE_TYPES.contains(&mime_type)
}

pub fn is_supported_file_type(mime_type: &str) -> bool {
    is_image(mime_type) || SUPPORTED_DOCUMENT_TYPES.contains(&mime_type)
}

/// Strips anything between angle brackets. Good enough for our own content,
/// not a security boundary.
pub fn sanitize_text(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut in_tag = false;

    for c in input.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            c if !in_tag => out.push(c),
            _ => {}
        }
    }

    out
}
