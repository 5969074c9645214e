use std::collections::BTreeMap;
use serde::{Serialize, Deserialize};

use crate::error::{PushError, Result};

/// 推送消息（构建后不可变）
///
/// 四种变体对应四个本地化键，`loc_args` 由字段按固定顺序推导，
/// `chat_id` 永远以文本形式序列化进 `custom` 字典。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// 单聊文本消息
    Text {
        sender: String,
        body: String,
        badge: i32,
        chat_id: i64,
    },
    /// 单聊图片消息
    Photo {
        sender: String,
        badge: i32,
        chat_id: i64,
    },
    /// 群聊文本消息
    GroupMessage {
        sender: String,
        group_name: String,
        body: String,
        badge: i32,
        chat_id: i64,
    },
    /// 群邀请
    GroupInvite {
        sender: String,
        group_name: String,
        badge: i32,
        chat_id: i64,
    },
}

fn check_badge(badge: i32) -> Result<()> {
    if badge < 0 {
        return Err(PushError::Validation(format!(
            "badge count must be >= 0, got {}",
            badge
        )));
    }
    Ok(())
}

fn check_group_name(group_name: &str) -> Result<()> {
    if group_name.is_empty() {
        return Err(PushError::Validation(
            "group name is required for group messages".to_string(),
        ));
    }
    Ok(())
}

impl Message {
    /// 构建单聊文本消息
    pub fn compose_text(sender: &str, body: &str, chat_id: i64, badge: i32) -> Result<Self> {
        check_badge(badge)?;
        Ok(Message::Text {
            sender: sender.to_string(),
            body: body.to_string(),
            badge,
            chat_id,
        })
    }

    /// 构建单聊图片消息
    pub fn compose_photo(sender: &str, chat_id: i64, badge: i32) -> Result<Self> {
        check_badge(badge)?;
        Ok(Message::Photo {
            sender: sender.to_string(),
            badge,
            chat_id,
        })
    }

    /// 构建群聊文本消息
    pub fn compose_group_message(
        sender: &str,
        group_name: &str,
        body: &str,
        chat_id: i64,
        badge: i32,
    ) -> Result<Self> {
        check_badge(badge)?;
        check_group_name(group_name)?;
        Ok(Message::GroupMessage {
            sender: sender.to_string(),
            group_name: group_name.to_string(),
            body: body.to_string(),
            badge,
            chat_id,
        })
    }

    /// 构建群邀请消息
    pub fn compose_group_invite(
        sender: &str,
        group_name: &str,
        chat_id: i64,
        badge: i32,
    ) -> Result<Self> {
        check_badge(badge)?;
        check_group_name(group_name)?;
        Ok(Message::GroupInvite {
            sender: sender.to_string(),
            group_name: group_name.to_string(),
            badge,
            chat_id,
        })
    }

    /// 本地化键（每个变体一个）
    pub fn loc_key(&self) -> &'static str {
        match self {
            Message::Text { .. } => "MESSAGE_TEXT",
            Message::Photo { .. } => "MESSAGE_PHOTO",
            Message::GroupMessage { .. } => "CHAT_MESSAGE_TEXT",
            Message::GroupInvite { .. } => "CHAT_ADD_YOU",
        }
    }

    /// 本地化参数（展示参数，顺序固定）
    pub fn loc_args(&self) -> Vec<String> {
        match self {
            Message::Text { sender, body, .. } => vec![sender.clone(), body.clone()],
            Message::Photo { sender, .. } => vec![sender.clone()],
            Message::GroupMessage {
                sender,
                group_name,
                body,
                ..
            } => vec![sender.clone(), group_name.clone(), body.clone()],
            Message::GroupInvite {
                sender, group_name, ..
            } => vec![sender.clone(), group_name.clone()],
        }
    }

    /// 角标计数
    pub fn badge(&self) -> i32 {
        match self {
            Message::Text { badge, .. }
            | Message::Photo { badge, .. }
            | Message::GroupMessage { badge, .. }
            | Message::GroupInvite { badge, .. } => *badge,
        }
    }

    /// 会话 ID
    pub fn chat_id(&self) -> i64 {
        match self {
            Message::Text { chat_id, .. }
            | Message::Photo { chat_id, .. }
            | Message::GroupMessage { chat_id, .. }
            | Message::GroupInvite { chat_id, .. } => *chat_id,
        }
    }

    /// 自定义字典：单聊用 `from_id`，群聊用 `chat_id`，值永远是文本
    pub fn custom(&self) -> BTreeMap<String, String> {
        let key = match self {
            Message::Text { .. } | Message::Photo { .. } => "from_id",
            Message::GroupMessage { .. } | Message::GroupInvite { .. } => "chat_id",
        };
        let mut custom = BTreeMap::new();
        custom.insert(key.to_string(), self.chat_id().to_string());
        custom
    }

    /// 转换为线上格式的 `data` 段
    pub fn to_wire(&self) -> WireData {
        WireData {
            message: WireMessage {
                loc_key: self.loc_key().to_string(),
                loc_args: self.loc_args(),
                badge: self.badge(),
                custom: self.custom(),
            },
        }
    }
}

/// 线上格式的 `data` 段（推送网关 JSON 体里 `"data"` 的内容）
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WireData {
    pub message: WireMessage,
}

/// 线上格式的消息体
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WireMessage {
    pub loc_key: String,
    pub loc_args: Vec<String>,
    pub badge: i32,
    pub custom: BTreeMap<String, String>,
}
