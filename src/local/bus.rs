use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::process::Command;
use tracing::{info, debug, warn};

use crate::error::{PushError, Result};

/// freedesktop 通知服务
const NOTIFY_SERVICE: &str = "org.freedesktop.Notifications";
const NOTIFY_PATH: &str = "/org/freedesktop/Notifications";
const NOTIFY_METHOD: &str = "org.freedesktop.Notifications.Notify";

/// Lomiri Postal 服务（角标与常驻通知）
const POSTAL_SERVICE: &str = "com.lomiri.Postal";
const POSTAL_PATH: &str = "/com/lomiri/Postal";
const POSTAL_IFACE: &str = "com.lomiri.Postal";

/// 通知在面板上的停留时间（毫秒）
const NOTIFY_EXPIRE_MS: u32 = 5000;

/// 一次本地通知调用的参数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifyRequest {
    pub title: String,
    pub body: String,
    pub tag: String,
    pub icon: String,
}

/// 设备通知总线抽象
///
/// 三个远程风格的调用：通知展示、角标计数、常驻通知清除。
/// 每个调用的响应码直接映射到投递结果。
#[async_trait]
pub trait NotificationBus: Send + Sync {
    /// 展示一条通知
    async fn notify(&self, request: &NotifyRequest) -> Result<()>;

    /// 设置应用角标计数（可见性作为显式参数传给设备）
    async fn set_counter(&self, count: i32, visible: bool) -> Result<()>;

    /// 清除常驻通知（空标签表示全部清除）
    async fn clear_persistent(&self, tag: &str) -> Result<()>;
}

/// 把包名转义成 D-Bus 对象路径段
///
/// Postal 的对象路径是 `/com/lomiri/Postal/<pkg>`，包名取应用 ID
/// 第一个下划线之前的部分，`.` 和 `-` 分别转义为 `_2e` 和 `_2d`。
pub fn mangle_package_name(app_id: &str) -> String {
    let pkg = app_id.split('_').next().unwrap_or(app_id);
    pkg.replace('.', "_2e").replace('-', "_2d")
}

/// 基于 `gdbus` 命令行的真实总线实现
///
/// 会话总线地址在构造时显式传入，通过子进程环境变量生效，
/// 不修改本进程的全局环境。
pub struct GdbusBus {
    app_id: String,
    pkg_name: String,
    bus_address: Option<String>,
}

impl GdbusBus {
    /// 创建总线客户端
    ///
    /// # 参数
    /// - app_id: 完整应用 ID（如 `pushnotification.example_pushnotification`）
    /// - bus_address: 目标用户的会话总线地址（如 `unix:path=/run/user/32011/bus`）
    pub fn new(app_id: &str, bus_address: Option<String>) -> Self {
        let pkg_name = mangle_package_name(app_id);
        debug!(
            "[GDBUS] Bus client created: app_id={}, pkg_name={}",
            app_id, pkg_name
        );
        Self {
            app_id: app_id.to_string(),
            pkg_name,
            bus_address,
        }
    }

    fn postal_object_path(&self) -> String {
        format!("{}/{}", POSTAL_PATH, self.pkg_name)
    }

    /// 执行一次 `gdbus call --session`，退出码非 0 视为总线错误
    async fn call(&self, dest: &str, path: &str, method: &str, args: &[String]) -> Result<()> {
        let mut command = Command::new("gdbus");
        // 调用超过等待上限被放弃时，子进程必须跟着终止，
        // 否则挂起的 gdbus 之后还可能把效果落到设备上
        command.kill_on_drop(true);
        command
            .arg("call")
            .arg("--session")
            .arg("--dest")
            .arg(dest)
            .arg("--object-path")
            .arg(path)
            .arg("--method")
            .arg(method)
            .args(args);

        if let Some(address) = &self.bus_address {
            command.env("DBUS_SESSION_BUS_ADDRESS", address);
        }

        let output = command
            .output()
            .await
            .map_err(|e| PushError::Bus(format!("failed to spawn gdbus: {}", e)))?;

        if output.status.success() {
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(PushError::Bus(format!(
                "{} returned {}: {}",
                method,
                output.status.code().unwrap_or(-1),
                stderr.trim()
            )))
        }
    }
}

#[async_trait]
impl NotificationBus for GdbusBus {
    async fn notify(&self, request: &NotifyRequest) -> Result<()> {
        info!(
            "[GDBUS] Notify: title={}, tag={}",
            request.title, request.tag
        );

        // Notify(appName, replacesId, icon, title, body, actions, hints, expireMs)
        // replaces_id 固定为 0（新通知），替换语义由标签承载
        let args = vec![
            self.app_id.clone(),
            "0".to_string(),
            request.icon.clone(),
            request.title.clone(),
            request.body.clone(),
            "[]".to_string(),
            "{}".to_string(),
            NOTIFY_EXPIRE_MS.to_string(),
        ];

        self.call(NOTIFY_SERVICE, NOTIFY_PATH, NOTIFY_METHOD, &args)
            .await
    }

    async fn set_counter(&self, count: i32, visible: bool) -> Result<()> {
        info!("[GDBUS] SetCounter: count={}, visible={}", count, visible);

        let args = vec![
            self.app_id.clone(),
            count.to_string(),
            visible.to_string(),
        ];

        self.call(
            POSTAL_SERVICE,
            &self.postal_object_path(),
            &format!("{}.SetCounter", POSTAL_IFACE),
            &args,
        )
        .await
    }

    async fn clear_persistent(&self, tag: &str) -> Result<()> {
        info!("[GDBUS] ClearPersistent: tag={:?}", tag);

        let args = vec![self.app_id.clone(), tag.to_string()];

        self.call(
            POSTAL_SERVICE,
            &self.postal_object_path(),
            &format!("{}.ClearPersistent", POSTAL_IFACE),
            &args,
        )
        .await
    }
}

/// Mock 总线调用记录
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusCall {
    Notify(NotifyRequest),
    SetCounter { count: i32, visible: bool },
    ClearPersistent { tag: String },
}

/// Mock 总线（测试和演示用）
///
/// 不调用真实设备服务，记录每次调用；可以按标签注入失败。
#[derive(Default)]
pub struct MockBus {
    calls: Mutex<Vec<BusCall>>,
    failing_tags: Mutex<Vec<String>>,
}

impl MockBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// 让带指定标签的 notify 调用失败
    pub fn fail_tag(&self, tag: &str) {
        self.failing_tags.lock().push(tag.to_string());
    }

    /// 取出全部调用记录
    pub fn calls(&self) -> Vec<BusCall> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl NotificationBus for MockBus {
    async fn notify(&self, request: &NotifyRequest) -> Result<()> {
        if self.failing_tags.lock().contains(&request.tag) {
            warn!("[MOCK BUS] Injected failure for tag={}", request.tag);
            return Err(PushError::Bus(format!(
                "injected failure for tag {}",
                request.tag
            )));
        }
        info!(
            "[MOCK BUS] Notify: title={}, body={}, tag={}, icon={}",
            request.title, request.body, request.tag, request.icon
        );
        self.calls.lock().push(BusCall::Notify(request.clone()));
        Ok(())
    }

    async fn set_counter(&self, count: i32, visible: bool) -> Result<()> {
        info!("[MOCK BUS] SetCounter: count={}, visible={}", count, visible);
        self.calls
            .lock()
            .push(BusCall::SetCounter { count, visible });
        Ok(())
    }

    async fn clear_persistent(&self, tag: &str) -> Result<()> {
        info!("[MOCK BUS] ClearPersistent: tag={:?}", tag);
        self.calls.lock().push(BusCall::ClearPersistent {
            tag: tag.to_string(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn package_name_is_escaped_for_object_path() {
        assert_eq!(
            mangle_package_name("pushnotification.surajyadav_pushnotification"),
            "pushnotification_2esurajyadav"
        );
        assert_eq!(mangle_package_name("my-app.dev_myapp"), "my_2dapp_2edev");
        // 没有下划线时整个 ID 就是包名
        assert_eq!(mangle_package_name("plain"), "plain");
    }
}
