use std::env;
use std::fs;
use std::path::Path;
use tracing::info;
use serde::{Deserialize, Serialize};
use anyhow::{Result, Context};

/// 推送工具配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushConfig {
    /// 远程推送网关配置
    pub gateway: GatewayConfig,
    /// 设备侧（本地路径）配置
    pub device: DeviceConfig,
    /// 日志级别
    pub log_level: String,
}

/// 推送网关配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// 网关地址
    pub url: String,
    /// 应用 ID
    pub app_id: String,
    /// 网关认证令牌（可选，敏感，建议用环境变量覆盖）
    pub auth_token: Option<String>,
    /// 默认目标设备令牌（可选）
    pub device_token: Option<String>,
}

/// 设备侧配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// 完整应用 ID（Postal 对象路径由此推导）
    pub app_id: String,
    /// 目标用户的会话总线地址（设备上通常是 unix:path=/run/user/<uid>/bus）
    pub bus_address: Option<String>,
    /// 默认通知图标
    pub icon: String,
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            gateway: GatewayConfig {
                url: "https://push.ubuntu.com/notify".to_string(),
                app_id: "pushnotification.example_pushnotification".to_string(),
                auth_token: None,
                device_token: None,
            },
            device: DeviceConfig {
                app_id: "pushnotification.example_pushnotification".to_string(),
                bus_address: None,
                icon: crate::local::simulator::DEFAULT_ICON.to_string(),
            },
            log_level: "info".to_string(),
        }
    }
}

impl PushConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// 从 TOML 文件加载配置
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("无法读取配置文件: {:?}", path.as_ref()))?;

        let toml_config: TomlConfig = toml::from_str(&content)
            .with_context(|| "配置文件格式错误")?;

        Ok(toml_config.into())
    }

    /// 从环境变量合并配置（PUSHKIT_ 前缀）
    pub fn merge_from_env(&mut self) {
        if let Ok(url) = env::var("PUSHKIT_GATEWAY_URL") {
            self.gateway.url = url;
        }
        if let Ok(app_id) = env::var("PUSHKIT_APP_ID") {
            self.gateway.app_id = app_id.clone();
            self.device.app_id = app_id;
        }
        if let Ok(auth) = env::var("PUSHKIT_AUTH_TOKEN") {
            self.gateway.auth_token = Some(auth);
        }
        if let Ok(token) = env::var("PUSHKIT_DEVICE_TOKEN") {
            self.gateway.device_token = Some(token);
        }
        if let Ok(address) = env::var("PUSHKIT_BUS_ADDRESS") {
            self.device.bus_address = Some(address);
        }
        if let Ok(log_level) = env::var("PUSHKIT_LOG_LEVEL") {
            self.log_level = log_level;
        }
    }

    /// 从命令行参数合并配置
    pub fn merge_from_cli(&mut self, cli: &crate::cli::Cli) {
        if let Some(url) = &cli.gateway_url {
            self.gateway.url = url.clone();
        }
        if let Some(app_id) = &cli.app_id {
            self.gateway.app_id = app_id.clone();
            self.device.app_id = app_id.clone();
        }
        if let Some(address) = &cli.bus_address {
            self.device.bus_address = Some(address.clone());
        }
        if let Some(log_level) = cli.get_log_level() {
            self.log_level = log_level;
        }
    }

    /// 加载配置（按优先级：命令行 > 环境变量 > 配置文件 > 默认值）
    pub fn load(cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = Self::new();

        // 1. 从配置文件加载（如果指定或默认文件存在）
        if let Some(config_file) = &cli.config_file {
            if Path::new(config_file).exists() {
                info!("📄 从配置文件加载: {}", config_file);
                config = Self::from_toml_file(config_file)?;
            } else {
                tracing::warn!("⚠️ 配置文件不存在: {}", config_file);
            }
        } else if Path::new("pushkit.toml").exists() {
            info!("📄 从默认配置文件加载: pushkit.toml");
            config = Self::from_toml_file("pushkit.toml")?;
        }

        // 2. 从环境变量合并（优先级高于配置文件）
        config.merge_from_env();

        // 3. 从命令行参数合并（最高优先级）
        config.merge_from_cli(cli);

        Ok(config)
    }
}

/// 日志早期配置
///
/// 日志系统在完整配置加载之前初始化，这里只读取配置文件的
/// [logging] 段；文件缺失或解析失败时静默回落到默认值。
#[derive(Debug, Default)]
pub struct EarlyLogging {
    pub level: Option<String>,
    pub format: Option<String>,
}

/// 读取配置文件的 [logging] 段（不加载完整配置）
pub fn load_early_logging(config_file: Option<&str>) -> EarlyLogging {
    let path = config_file.unwrap_or("pushkit.toml");
    if !Path::new(path).exists() {
        return EarlyLogging::default();
    }

    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(_) => return EarlyLogging::default(),
    };
    let toml_config: TomlConfig = match toml::from_str(&content) {
        Ok(toml_config) => toml_config,
        Err(_) => return EarlyLogging::default(),
    };

    match toml_config.logging {
        Some(logging) => EarlyLogging {
            level: logging.level,
            format: logging.format,
        },
        None => EarlyLogging::default(),
    }
}

/// TOML 配置文件结构（用于反序列化）
#[derive(Debug, Deserialize)]
struct TomlConfig {
    gateway: Option<TomlGatewayConfig>,
    device: Option<TomlDeviceConfig>,
    logging: Option<TomlLoggingConfig>,
}

#[derive(Debug, Deserialize)]
struct TomlGatewayConfig {
    url: Option<String>,
    app_id: Option<String>,
    auth_token: Option<String>,
    device_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TomlDeviceConfig {
    app_id: Option<String>,
    bus_address: Option<String>,
    icon: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TomlLoggingConfig {
    level: Option<String>,
    format: Option<String>,
}

impl From<TomlConfig> for PushConfig {
    fn from(toml: TomlConfig) -> Self {
        let mut config = Self::default();

        if let Some(gateway) = toml.gateway {
            if let Some(url) = gateway.url {
                config.gateway.url = url;
            }
            if let Some(app_id) = gateway.app_id {
                config.gateway.app_id = app_id;
            }
            if let Some(auth) = gateway.auth_token {
                config.gateway.auth_token = Some(auth);
            }
            if let Some(token) = gateway.device_token {
                config.gateway.device_token = Some(token);
            }
        }

        if let Some(device) = toml.device {
            if let Some(app_id) = device.app_id {
                config.device.app_id = app_id;
            }
            if let Some(address) = device.bus_address {
                config.device.bus_address = Some(address);
            }
            if let Some(icon) = device.icon {
                config.device.icon = icon;
            }
        }

        if let Some(logging) = toml.logging {
            if let Some(level) = logging.level {
                config.log_level = level;
            }
            // format 由 load_early_logging 在日志初始化前读取
        }

        config
    }
}
