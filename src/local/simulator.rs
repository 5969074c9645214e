use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use chrono::Utc;
use serde::{Serialize, Deserialize};
use tracing::{info, warn, debug};

use crate::dispatch::DispatchResult;
use crate::error::{PushError, Result};
use crate::local::bus::{NotificationBus, NotifyRequest};
use crate::local::state::DeviceState;

/// 本地调用的等待上限：5 秒
pub const LOCAL_CALL_TIMEOUT: Duration = Duration::from_secs(5);

/// 套件里连续通知之间的节流间隔：1.5 秒
pub const SUITE_PACING: Duration = Duration::from_millis(1500);

/// 默认通知图标
pub const DEFAULT_ICON: &str = "notification-symbolic";

/// 套件里的一条测试用例
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteCase {
    pub title: String,
    pub body: String,
    pub tag: String,
}

impl SuiteCase {
    pub fn new(title: &str, body: &str, tag: &str) -> Self {
        Self {
            title: title.to_string(),
            body: body.to_string(),
            tag: tag.to_string(),
        }
    }
}

/// 套件执行汇总（只报告计数，不让单条失败拖垮整批）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuiteReport {
    pub attempted: usize,
    pub succeeded: usize,
}

/// 本地通知模拟器
///
/// 把每次总线调用的效果记录到设备状态里（角标值、可见性、常驻标签集合），
/// 与远程路径共用同一套调用/结果契约。状态只被本模拟器自己的调用修改。
pub struct LocalSimulator {
    bus: Arc<dyn NotificationBus>,
    state: DeviceState,
    pacing: Duration,
    call_timeout: Duration,
    tag_seq: AtomicU64,
}

impl LocalSimulator {
    pub fn new(bus: Arc<dyn NotificationBus>) -> Self {
        Self {
            bus,
            state: DeviceState::new(),
            pacing: SUITE_PACING,
            call_timeout: LOCAL_CALL_TIMEOUT,
            tag_seq: AtomicU64::new(0),
        }
    }

    /// 覆盖套件节流间隔（测试里可以设为 0 跳过等待）
    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    /// 覆盖本地调用的等待上限
    pub fn with_call_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = call_timeout;
        self
    }

    /// 当前设备状态
    pub fn state(&self) -> &DeviceState {
        &self.state
    }

    /// 生成本次调用独有的标签（由调用时刻派生，序号保证同一毫秒内不冲突）
    fn generate_tag(&self) -> String {
        let seq = self.tag_seq.fetch_add(1, Ordering::Relaxed);
        format!("test-{}-{}", Utc::now().timestamp_millis(), seq)
    }

    /// 发送一条本地通知
    ///
    /// 标签缺省时自动生成；成功后把标签记入常驻标签集合。
    pub async fn notify(
        &mut self,
        title: &str,
        body: &str,
        tag: Option<&str>,
        icon: Option<&str>,
    ) -> DispatchResult {
        let tag = match tag {
            Some(tag) if !tag.is_empty() => tag.to_string(),
            _ => self.generate_tag(),
        };

        let request = NotifyRequest {
            title: ascii_clean(title),
            body: ascii_clean(body),
            tag: tag.clone(),
            icon: icon.unwrap_or(DEFAULT_ICON).to_string(),
        };

        info!("[SIMULATOR] Notify: title={}, tag={}", request.title, tag);

        match self.bounded_call(self.bus.notify(&request)).await {
            Ok(()) => {
                self.state.add_tag(&tag);
                DispatchResult::ok()
            }
            Err(e) => DispatchResult::fail(e.to_string()),
        }
    }

    /// 设置角标计数
    ///
    /// 负数在发起调用之前就被拒绝；成功后重新派生可见性。
    pub async fn set_badge(&mut self, count: i32) -> Result<DispatchResult> {
        if count < 0 {
            return Err(PushError::Validation(format!(
                "badge count must be >= 0, got {}",
                count
            )));
        }

        let visible = count > 0;
        info!("[SIMULATOR] SetBadge: count={}, visible={}", count, visible);

        let result = match self.bounded_call(self.bus.set_counter(count, visible)).await {
            Ok(()) => {
                self.state.set_badge(count);
                DispatchResult::ok()
            }
            Err(e) => DispatchResult::fail(e.to_string()),
        };

        Ok(result)
    }

    /// 清除常驻通知
    ///
    /// 给定标签只清那一条，缺省/空标签清全部；清除不存在的标签同样成功。
    pub async fn clear_notifications(&mut self, tag: Option<&str>) -> DispatchResult {
        let tag = tag.unwrap_or("");
        info!("[SIMULATOR] Clear: tag={:?}", tag);

        match self.bounded_call(self.bus.clear_persistent(tag)).await {
            Ok(()) => {
                self.state.clear_tag(tag);
                DispatchResult::ok()
            }
            Err(e) => DispatchResult::fail(e.to_string()),
        }
    }

    /// 按序执行一批通知用例，最后把角标设为用例数
    ///
    /// 单条失败不会中止整批，返回尝试数与成功数。
    pub async fn run_suite(&mut self, cases: &[SuiteCase]) -> SuiteReport {
        info!("[SIMULATOR] Running suite: {} cases", cases.len());

        let mut succeeded = 0;
        for (index, case) in cases.iter().enumerate() {
            if index > 0 && !self.pacing.is_zero() {
                tokio::time::sleep(self.pacing).await;
            }

            let result = self
                .notify(&case.title, &case.body, Some(&case.tag), None)
                .await;
            if result.succeeded {
                succeeded += 1;
            } else {
                debug!(
                    "[SIMULATOR] Suite case {} failed: {:?}",
                    index, result.diagnostic
                );
            }
        }

        // 角标计数 = 用例总数（count >= 0 恒成立，验证不会失败）
        if let Ok(result) = self.set_badge(cases.len() as i32).await {
            if !result.succeeded {
                warn!(
                    "[SIMULATOR] Suite badge update failed: {:?}",
                    result.diagnostic
                );
            }
        }

        let report = SuiteReport {
            attempted: cases.len(),
            succeeded,
        };
        info!(
            "[SIMULATOR] Suite finished: attempted={}, succeeded={}",
            report.attempted, report.succeeded
        );
        report
    }

    async fn bounded_call<F>(&self, call: F) -> Result<()>
    where
        F: std::future::Future<Output = Result<()>>,
    {
        match tokio::time::timeout(self.call_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(PushError::Timeout(format!(
                "local call exceeded {:?}",
                self.call_timeout
            ))),
        }
    }
}

/// 内置的五条通知用例（suite 子命令和交互菜单共用）
pub fn default_suite() -> Vec<SuiteCase> {
    vec![
        SuiteCase::new("Welcome", "Push notification system is working", "test-1"),
        SuiteCase::new("Alice", "Hey there", "chat-001"),
        SuiteCase::new("Bob", "sent you a photo", "chat-002"),
        SuiteCase::new("Work Group", "Sarah: Meeting at 3pm tomorrow", "group-001"),
        SuiteCase::new("System Alert", "Your app is functioning correctly", "system-001"),
    ]
}

/// 把文本缩减到 ASCII（设备面板的最小文本编码）
///
/// 有损变换而不是错误：丢掉无法表示的字符并记一条警告，投递照常进行。
pub fn ascii_clean(text: &str) -> String {
    let cleaned: String = text.chars().filter(|c| c.is_ascii()).collect();
    if cleaned.len() != text.len() {
        warn!(
            "[SIMULATOR] Text reduced to ASCII for display: {:?} -> {:?}",
            text, cleaned
        );
    }
    cleaned
}
