//! Private messages between users.

use crate::app_config;
use crate::error::{Error, Result};
use crate::orm::{messages, users};
use chrono::{NaiveDateTime, Utc};
use sea_orm::{entity::*, query::*, ConnectionTrait};
use serde::Serialize;
use std::collections::HashMap;

/// A message with both participants' usernames resolved.
#[derive(Clone, Debug, Serialize)]
pub struct MessageDisplay {
    pub id: i32,
    pub author_id: i32,
    pub author_name: String,
    pub addressee_id: i32,
    pub addressee_name: String,
    pub text: String,
    pub is_read: bool,
    pub created_at: NaiveDateTime,
}

impl MessageDisplay {
    pub fn created_str(&self) -> String {
        self.created_at.format("%Y-%m-%d %H:%M:%S").to_string()
    }

    /// The participant a reply from `user_id` goes to.
    pub fn counterpart(&self, user_id: i32) -> i32 {
        if self.author_id == user_id {
            self.addressee_id
        } else {
            self.author_id
        }
    }
}

async fn with_names<C: ConnectionTrait>(
    db: &C,
    rows: Vec<messages::Model>,
) -> Result<Vec<MessageDisplay>> {
    let mut ids: Vec<i32> = rows
        .iter()
        .flat_map(|m| [m.author_id, m.addressee_id])
        .collect();
    ids.sort_unstable();
    ids.dedup();

    let names: HashMap<i32, String> = if ids.is_empty() {
        HashMap::new()
    } else {
        users::Entity::find()
            .filter(users::Column::Id.is_in(ids))
            .all(db)
            .await?
            .into_iter()
            .map(|u| (u.id, u.username))
            .collect()
    };

    Ok(rows
        .into_iter()
        .map(|m| MessageDisplay {
            author_name: names.get(&m.author_id).cloned().unwrap_or_default(),
            addressee_name: names.get(&m.addressee_id).cloned().unwrap_or_default(),
            id: m.id,
            author_id: m.author_id,
            addressee_id: m.addressee_id,
            text: m.text,
            is_read: m.is_read,
            created_at: m.created_at,
        })
        .collect())
}

async fn with_name<C: ConnectionTrait>(db: &C, row: messages::Model) -> Result<MessageDisplay> {
    with_names(db, vec![row])
        .await?
        .pop()
        .ok_or(Error::NotFound("Message"))
}

fn validate_text(text: &str) -> Result<()> {
    let max = app_config::limits().max_message_length as usize;
    if text.trim().is_empty() {
        return Err(Error::invalid_field("text", "required", "This field is required."));
    }
    if text.chars().count() > max {
        return Err(Error::invalid_field("text", "length", "Message is too long."));
    }
    Ok(())
}

async fn validate_addressee<C: ConnectionTrait>(db: &C, author_id: i32, addressee_id: i32) -> Result<()> {
    if author_id == addressee_id {
        return Err(Error::invalid_field(
            "addressee",
            "self_message",
            "You cannot send a message to yourself.",
        ));
    }
    if users::Entity::find_by_id(addressee_id).one(db).await?.is_none() {
        return Err(Error::invalid_field(
            "addressee",
            "does_not_exist",
            "Select a valid addressee.",
        ));
    }
    Ok(())
}

pub async fn send_message<C: ConnectionTrait>(
    db: &C,
    author_id: i32,
    addressee_id: i32,
    text: &str,
) -> Result<MessageDisplay> {
    validate_addressee(db, author_id, addressee_id).await?;
    validate_text(text)?;

    let message = messages::ActiveModel {
        author_id: Set(author_id),
        addressee_id: Set(addressee_id),
        text: Set(text.to_owned()),
        is_read: Set(false),
        created_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    log::debug!("Message {} sent from {} to {}", message.id, author_id, addressee_id);
    with_name(db, message).await
}

/// Received messages, newest first.
pub async fn inbox<C: ConnectionTrait>(db: &C, user_id: i32) -> Result<Vec<MessageDisplay>> {
    let rows = messages::Entity::find()
        .filter(messages::Column::AddresseeId.eq(user_id))
        .order_by_desc(messages::Column::CreatedAt)
        .order_by_desc(messages::Column::Id)
        .all(db)
        .await?;
    with_names(db, rows).await
}

/// Sent messages, newest first.
pub async fn sent<C: ConnectionTrait>(db: &C, user_id: i32) -> Result<Vec<MessageDisplay>> {
    let rows = messages::Entity::find()
        .filter(messages::Column::AuthorId.eq(user_id))
        .order_by_desc(messages::Column::CreatedAt)
        .order_by_desc(messages::Column::Id)
        .all(db)
        .await?;
    with_names(db, rows).await
}

pub async fn all_messages<C: ConnectionTrait>(db: &C) -> Result<Vec<MessageDisplay>> {
    let rows = messages::Entity::find()
        .order_by_asc(messages::Column::Id)
        .all(db)
        .await?;
    with_names(db, rows).await
}

async fn find_row<C: ConnectionTrait>(db: &C, id: i32) -> Result<messages::Model> {
    messages::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(Error::NotFound("Message"))
}

/// Returns a message its author or addressee may read, without side effects.
pub async fn find_message<C: ConnectionTrait>(
    db: &C,
    id: i32,
    requester_id: i32,
) -> Result<MessageDisplay> {
    let row = find_row(db, id).await?;
    if row.author_id != requester_id && row.addressee_id != requester_id {
        return Err(Error::permission_denied(
            "You can only read your own messages.",
        ));
    }
    with_name(db, row).await
}

/// Reads a message. Opening it as the addressee marks it read.
pub async fn open_message<C: ConnectionTrait>(
    db: &C,
    id: i32,
    requester_id: i32,
) -> Result<MessageDisplay> {
    let mut message = find_message(db, id, requester_id).await?;

    if message.addressee_id == requester_id && !message.is_read {
        messages::Entity::update_many()
            .col_expr(messages::Column::IsRead, sea_orm::sea_query::Expr::value(true))
            .filter(messages::Column::Id.eq(id))
            .exec(db)
            .await?;
        message.is_read = true;
    }
    Ok(message)
}

/// Pre-filled body of a reply, quoting the original.
pub fn reply_quote(message: &MessageDisplay) -> String {
    format!(
        "\n{}\nreply to {}\n{}:\n{}",
        "-".repeat(20),
        message.author_name,
        message.created_str(),
        message.text
    )
}

/// Answers a message the requester took part in, addressed to the other
/// participant.
pub async fn reply_to<C: ConnectionTrait>(
    db: &C,
    message_id: i32,
    requester_id: i32,
    text: &str,
) -> Result<MessageDisplay> {
    let original = find_message(db, message_id, requester_id).await?;
    send_message(db, requester_id, original.counterpart(requester_id), text).await
}

pub async fn update_message<C: ConnectionTrait>(
    db: &C,
    id: i32,
    requester_id: i32,
    addressee_id: i32,
    text: &str,
) -> Result<MessageDisplay> {
    let row = find_row(db, id).await?;
    if row.author_id != requester_id {
        return Err(Error::permission_denied(
            "You can only edit your own messages.",
        ));
    }
    validate_addressee(db, requester_id, addressee_id).await?;
    validate_text(text)?;

    let mut message: messages::ActiveModel = row.into();
    message.addressee_id = Set(addressee_id);
    message.text = Set(text.to_owned());
    let message = message.update(db).await?;
    with_name(db, message).await
}

pub async fn delete_message<C: ConnectionTrait>(db: &C, id: i32, requester_id: i32) -> Result<()> {
    let row = find_row(db, id).await?;
    if row.author_id != requester_id {
        return Err(Error::permission_denied(
            "You can only delete your own messages.",
        ));
    }

    messages::Entity::delete_many()
        .filter(messages::Column::Id.eq(id))
        .exec(db)
        .await?;
    log::info!("User {} deleted message {}", requester_id, id);
    Ok(())
}

pub async fn unread_count<C: ConnectionTrait>(db: &C, user_id: i32) -> Result<u64> {
    Ok(messages::Entity::find()
        .filter(messages::Column::AddresseeId.eq(user_id))
        .filter(messages::Column::IsRead.eq(false))
        .count(db)
        .await? as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn message() -> MessageDisplay {
        MessageDisplay {
            id: 1,
            author_id: 1,
            author_name: "alice".to_owned(),
            addressee_id: 2,
            addressee_name: "bob".to_owned(),
            text: "See you at the cinema?".to_owned(),
            is_read: false,
            created_at: NaiveDate::from_ymd_opt(2024, 3, 9)
                .unwrap()
                .and_hms_opt(18, 5, 0)
                .unwrap(),
        }
    }

    #[test]
    fn test_reply_quote() {
        assert_eq!(
            reply_quote(&message()),
            "\n--------------------\nreply to alice\n2024-03-09 18:05:00:\nSee you at the cinema?"
        );
    }

    #[test]
    fn test_counterpart() {
        let m = message();
        assert_eq!(m.counterpart(1), 2);
        assert_eq!(m.counterpart(2), 1);
    }
}
