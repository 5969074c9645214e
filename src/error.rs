use std::fmt;
use std::error::Error as StdError;
use serde::{Serialize, Deserialize};

/// 推送工具错误类型
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PushError {
    /// 验证错误（缺少必填字段、负数计数等，在发起调用之前报告）
    Validation(String),
    /// 超时错误（调用超过等待上限）
    Timeout(String),
    /// 设备通知总线错误（gdbus 调用失败）
    Bus(String),
}

impl fmt::Display for PushError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PushError::Validation(msg) => write!(f, "Validation error: {}", msg),
            PushError::Timeout(msg) => write!(f, "Timeout error: {}", msg),
            PushError::Bus(msg) => write!(f, "Notification bus error: {}", msg),
        }
    }
}

impl StdError for PushError {}

/// 结果类型别名
pub type Result<T> = std::result::Result<T, PushError>;
