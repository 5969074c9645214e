use std::time::Duration;
use reqwest::Client;
use tracing::{info, error, debug};
use uuid::Uuid;

use crate::dispatch::DispatchResult;
use crate::push::envelope::{redact_token, DispatchOptions, Envelope};
use crate::push::message::Message;

/// 远程投递超时：30 秒
pub const DISPATCH_TIMEOUT: Duration = Duration::from_secs(30);

/// 连续发送之间的节流间隔：2 秒（尊重下游限流，不是正确性要求）
pub const SEQUENCE_PACING: Duration = Duration::from_secs(2);

/// 推送网关客户端
///
/// 一条消息对应一次出站 HTTP 调用，成功 = HTTP 200。
/// 不做自动重试：超时或非成功响应返回失败的 `DispatchResult`，
/// 是否重试由调用方决定。
pub struct GatewayClient {
    client: Client,
    push_url: String,
    app_id: String,
    auth_token: Option<String>,
    pacing: Duration,
}

impl GatewayClient {
    /// 创建网关客户端
    ///
    /// # 参数
    /// - push_url: 推送网关地址
    /// - app_id: 应用 ID
    /// - auth_token: 可选的 Bearer 认证令牌
    pub fn new(push_url: String, app_id: String, auth_token: Option<String>) -> Self {
        Self {
            client: Client::new(),
            push_url,
            app_id,
            auth_token,
            pacing: SEQUENCE_PACING,
        }
    }

    /// 覆盖节流间隔（测试里可以设为 0 跳过等待）
    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    /// 投递一条消息：包装信封、序列化、发起一次同步调用并报告结果
    pub async fn dispatch(
        &self,
        destination_token: &str,
        message: &Message,
        options: &DispatchOptions,
    ) -> DispatchResult {
        let request_id = Uuid::new_v4().to_string();
        let envelope = Envelope::wrap(&self.app_id, destination_token, message.clone(), options);
        let body = envelope.to_wire();

        info!(
            "[GATEWAY] Sending push: request_id={}, token={}, loc_key={}, badge={}",
            request_id,
            envelope.token_prefix(),
            message.loc_key(),
            message.badge()
        );

        let mut request = self
            .client
            .post(&self.push_url)
            .header("Content-Type", "application/json")
            .timeout(DISPATCH_TIMEOUT)
            .json(&body);

        if let Some(auth) = &self.auth_token {
            request = request.header("Authorization", format!("Bearer {}", auth));
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                error!(
                    "[GATEWAY] Push request failed: request_id={}, error={}",
                    request_id, e
                );
                return DispatchResult::fail(format!("gateway request failed: {}", e));
            }
        };

        let status = response.status();
        if status == reqwest::StatusCode::OK {
            info!("[GATEWAY] Push sent successfully: request_id={}", request_id);
            DispatchResult::ok()
        } else {
            let error_text = response.text().await.unwrap_or_default();
            error!(
                "[GATEWAY] Push failed: request_id={}, status={}, error={}",
                request_id, status, error_text
            );
            DispatchResult::fail(format!(
                "gateway returned status={}, body={}",
                status.as_u16(),
                error_text
            ))
        }
    }

    /// 按序投递一批消息
    ///
    /// 每条消息恰好尝试一次，连续两次调用之间等待固定的节流间隔；
    /// 单条失败不影响后续消息的尝试，返回与输入等长、同序的结果。
    pub async fn dispatch_sequence(
        &self,
        destination_token: &str,
        messages: &[Message],
        options: &DispatchOptions,
    ) -> Vec<DispatchResult> {
        let mut results = Vec::with_capacity(messages.len());

        for (index, message) in messages.iter().enumerate() {
            if index > 0 && !self.pacing.is_zero() {
                tokio::time::sleep(self.pacing).await;
            }

            let result = self.dispatch(destination_token, message, options).await;
            if !result.succeeded {
                debug!(
                    "[GATEWAY] Sequence item {} failed, continuing with remaining {}",
                    index,
                    messages.len() - index - 1
                );
            }
            results.push(result);
        }

        let succeeded = results.iter().filter(|r| r.succeeded).count();
        info!(
            "[GATEWAY] Sequence finished: token={}, attempted={}, succeeded={}",
            redact_token(destination_token),
            results.len(),
            succeeded
        );

        results
    }
}
