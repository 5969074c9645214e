use serde::{Serialize, Deserialize};

/// 单次投递调用的统一结果（远程网关与本地总线共用）
///
/// 传输失败与服务端非成功响应都折叠为 `succeeded = false` 并附带诊断信息，
/// 不向调用者抛出异常，保证批量发送可以跨过单条失败继续执行。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchResult {
    /// 本次调用是否成功
    pub succeeded: bool,
    /// 诊断信息（失败时包含状态码/错误详情）
    pub diagnostic: Option<String>,
}

impl DispatchResult {
    /// 成功结果
    pub fn ok() -> Self {
        Self {
            succeeded: true,
            diagnostic: None,
        }
    }

    /// 失败结果（附带诊断信息）
    pub fn fail(diagnostic: impl Into<String>) -> Self {
        Self {
            succeeded: false,
            diagnostic: Some(diagnostic.into()),
        }
    }
}
