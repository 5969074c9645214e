use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde::{Serialize, Deserialize};

use crate::push::message::{Message, WireData};

/// 默认过期时间：24 小时
pub const DEFAULT_EXPIRY_HOURS: i64 = 24;

/// 投递选项（远程路径）
///
/// 只有两个被识别的键，默认值固定，不接受任意键值。
#[derive(Debug, Clone)]
pub struct DispatchOptions {
    /// 投递前清掉该设备上还在排队的旧通知（默认 true）
    pub clear_pending: bool,
    /// 替换标签：带同一标签的新通知会顶替之前显示的那条
    pub replace_tag: Option<String>,
}

impl Default for DispatchOptions {
    fn default() -> Self {
        Self {
            clear_pending: true,
            replace_tag: None,
        }
    }
}

/// 投递信封：一条消息一次性使用的外包装
#[derive(Debug, Clone)]
pub struct Envelope {
    pub app_id: String,
    pub expire_at: DateTime<Utc>,
    pub destination_token: String,
    pub clear_pending: bool,
    pub replace_tag: Option<String>,
    pub payload: Message,
}

impl Envelope {
    /// 包装一条消息，过期时间为当前时刻 + 24 小时
    pub fn wrap(
        app_id: &str,
        destination_token: &str,
        message: Message,
        options: &DispatchOptions,
    ) -> Self {
        Self {
            app_id: app_id.to_string(),
            expire_at: Utc::now() + Duration::hours(DEFAULT_EXPIRY_HOURS),
            destination_token: destination_token.to_string(),
            clear_pending: options.clear_pending,
            replace_tag: options.replace_tag.clone(),
            payload: message,
        }
    }

    /// 令牌的诊断前缀（令牌是敏感的，日志里只出现前 10 个字符）
    pub fn token_prefix(&self) -> String {
        redact_token(&self.destination_token)
    }

    /// 转换为网关线上格式
    pub fn to_wire(&self) -> WireEnvelope {
        WireEnvelope {
            appid: self.app_id.clone(),
            expire_on: self
                .expire_at
                .to_rfc3339_opts(SecondsFormat::Secs, true),
            token: self.destination_token.clone(),
            clear_pending: self.clear_pending,
            replace_tag: self.replace_tag.clone(),
            data: self.payload.to_wire(),
        }
    }
}

/// 令牌脱敏：只保留前 10 个字符
pub fn redact_token(token: &str) -> String {
    let prefix: String = token.chars().take(10).collect();
    format!("{}...", prefix)
}

/// 推送网关线上格式（HTTP POST 的 JSON 体）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireEnvelope {
    pub appid: String,
    /// ISO8601 UTC 时间戳
    pub expire_on: String,
    pub token: String,
    pub clear_pending: bool,
    pub replace_tag: Option<String>,
    pub data: WireData,
}
