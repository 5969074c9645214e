use std::process;
use std::sync::Arc;
use anyhow::{Context, Result};
use chrono::Utc;
use pushkit::{
    cli::{Cli, Commands, MessageKind},
    config::{self, PushConfig},
    interactive, logging,
    local::simulator::default_suite,
    push::envelope::redact_token,
    DispatchOptions, GatewayClient, GdbusBus, LocalSimulator, Message,
};

#[tokio::main]
async fn main() -> Result<()> {
    // 加载 .env 文件（如果存在）
    let _ = dotenvy::dotenv();

    // 解析命令行参数
    let cli = Cli::parse();

    // 不需要完整配置的子命令先处理
    if let Some(command) = &cli.command {
        match command {
            Commands::GenerateConfig { path } => {
                return generate_config(path);
            }
            Commands::ValidateConfig { path } => {
                return validate_config(path);
            }
            _ => {}
        }
    }

    // 日志先于完整配置初始化，级别和格式从配置文件的 [logging] 段预读
    // （优先级：命令行 > 配置文件 > 默认值）
    let early_logging = config::load_early_logging(cli.config_file.as_deref());
    let log_level = cli
        .get_log_level()
        .or(early_logging.level)
        .unwrap_or_else(|| "info".to_string());
    let log_format = cli.get_log_format().or(early_logging.format);
    logging::init_logging(&log_level, log_format.as_deref(), cli.quiet)?;

    // 加载配置（按优先级：命令行 > 环境变量 > 配置文件 > 默认值）
    let config = PushConfig::load(&cli).context("加载配置失败")?;

    match cli.command {
        Some(Commands::ShowConfig) => show_config(&config),
        Some(Commands::Send {
            token,
            auth,
            kind,
            sender,
            message,
            group,
            chat_id,
            badge,
            replace_tag,
            no_clear_pending,
        }) => {
            run_send(
                &config,
                token,
                auth,
                kind,
                &sender,
                &message,
                group.as_deref(),
                chat_id,
                badge,
                replace_tag,
                no_clear_pending,
            )
            .await
        }
        Some(Commands::Demo { token, auth }) => run_demo(&config, token, auth).await,
        Some(Commands::Suite) => run_suite(&config).await,
        Some(Commands::Notify {
            title,
            body,
            tag,
            icon,
        }) => run_notify(&config, &title, &body, tag.as_deref(), icon.as_deref()).await,
        Some(Commands::Badge { count }) => run_badge(&config, count).await,
        Some(Commands::Clear { tag }) => run_clear(&config, tag.as_deref()).await,
        Some(Commands::Interactive) | None => {
            let mut simulator = device_simulator(&config);
            interactive::run(&mut simulator).await
        }
        // generate-config / validate-config 在上面已经返回
        Some(Commands::GenerateConfig { .. }) | Some(Commands::ValidateConfig { .. }) => Ok(()),
    }
}

/// 构建面向真实设备总线的模拟器
fn device_simulator(config: &PushConfig) -> LocalSimulator {
    let bus = GdbusBus::new(&config.device.app_id, config.device.bus_address.clone());
    LocalSimulator::new(Arc::new(bus))
}

/// 构建网关客户端（CLI 的 auth 覆盖配置里的）
fn gateway_client(config: &PushConfig, auth: Option<String>) -> GatewayClient {
    GatewayClient::new(
        config.gateway.url.clone(),
        config.gateway.app_id.clone(),
        auth.or_else(|| config.gateway.auth_token.clone()),
    )
}

/// 解析目标设备令牌（CLI > 配置）
fn resolve_token(config: &PushConfig, token: Option<String>) -> Result<String> {
    token
        .or_else(|| config.gateway.device_token.clone())
        .context("需要目标设备令牌：用 --token 指定或配置 gateway.device_token")
}

#[allow(clippy::too_many_arguments)]
async fn run_send(
    config: &PushConfig,
    token: Option<String>,
    auth: Option<String>,
    kind: MessageKind,
    sender: &str,
    body: &str,
    group: Option<&str>,
    chat_id: i64,
    badge: i32,
    replace_tag: Option<String>,
    no_clear_pending: bool,
) -> Result<()> {
    let token = resolve_token(config, token)?;

    let message = match kind {
        MessageKind::Text => Message::compose_text(sender, body, chat_id, badge),
        MessageKind::Photo => Message::compose_photo(sender, chat_id, badge),
        MessageKind::Group => {
            let group = group.context("group 类型需要 --group")?;
            Message::compose_group_message(sender, group, body, chat_id, badge)
        }
        MessageKind::Invite => {
            let group = group.context("invite 类型需要 --group")?;
            Message::compose_group_invite(sender, group, chat_id, badge)
        }
    }
    .map_err(|e| anyhow::anyhow!("{}", e))?;

    let options = DispatchOptions {
        clear_pending: !no_clear_pending,
        replace_tag: Some(replace_tag.unwrap_or_else(|| format!("msg_{}", chat_id))),
    };

    println!("Sending notification to device: {}", redact_token(&token));

    let client = gateway_client(config, auth);
    let result = client.dispatch(&token, &message, &options).await;

    if result.succeeded {
        println!("✓ Notification sent successfully!");
        Ok(())
    } else {
        println!(
            "✗ Error sending notification: {}",
            result.diagnostic.unwrap_or_default()
        );
        process::exit(1);
    }
}

async fn run_demo(config: &PushConfig, token: Option<String>, auth: Option<String>) -> Result<()> {
    let token = resolve_token(config, token)?;

    println!("Running push notification demo...");

    // 四条演示消息，参数都经过校验，unwrap 不会失败
    let messages = vec![
        Message::compose_text("Alice", "Hey there! How are you?", 123456, 1).unwrap(),
        Message::compose_photo("Bob", 789012, 2).unwrap(),
        Message::compose_group_message("Charlie", "My Friends", "Anyone up for coffee?", 345678, 3)
            .unwrap(),
        Message::compose_group_invite("Dave", "Book Club", 901234, 4).unwrap(),
    ];

    let options = DispatchOptions {
        clear_pending: true,
        replace_tag: Some(format!("demo_{}", Utc::now().timestamp())),
    };

    let client = gateway_client(config, auth);
    let results = client.dispatch_sequence(&token, &messages, &options).await;

    let succeeded = results.iter().filter(|r| r.succeeded).count();
    println!("✓ Demo finished: {}/{} sent", succeeded, results.len());

    if succeeded < results.len() {
        process::exit(1);
    }
    Ok(())
}

async fn run_suite(config: &PushConfig) -> Result<()> {
    println!("Running notification tests...");

    let mut simulator = device_simulator(config);
    let report = simulator.run_suite(&default_suite()).await;

    println!("✓ Test completed!");
    println!(
        "Sent {}/{} notifications successfully",
        report.succeeded, report.attempted
    );
    println!("Check your notification panel!");
    Ok(())
}

async fn run_notify(
    config: &PushConfig,
    title: &str,
    body: &str,
    tag: Option<&str>,
    icon: Option<&str>,
) -> Result<()> {
    let mut simulator = device_simulator(config);
    let icon = icon.or(Some(config.device.icon.as_str()));
    let result = simulator.notify(title, body, tag, icon).await;

    if result.succeeded {
        println!("✓ Notification sent successfully!");
        Ok(())
    } else {
        println!("✗ Failed: {}", result.diagnostic.unwrap_or_default());
        process::exit(1);
    }
}

async fn run_badge(config: &PushConfig, count: i32) -> Result<()> {
    let mut simulator = device_simulator(config);
    let result = simulator
        .set_badge(count)
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    if result.succeeded {
        println!("✓ Badge counter updated!");
        Ok(())
    } else {
        println!("✗ Failed: {}", result.diagnostic.unwrap_or_default());
        process::exit(1);
    }
}

async fn run_clear(config: &PushConfig, tag: Option<&str>) -> Result<()> {
    let mut simulator = device_simulator(config);

    let cleared = simulator.clear_notifications(tag).await;
    // 清除后同时把角标归零
    let badged = simulator
        .set_badge(0)
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    if cleared.succeeded && badged.succeeded {
        println!("✓ Notifications cleared!");
        Ok(())
    } else {
        println!(
            "✗ Failed: {}",
            cleared
                .diagnostic
                .or(badged.diagnostic)
                .unwrap_or_default()
        );
        process::exit(1);
    }
}

/// 生成默认配置文件
fn generate_config(path: &str) -> Result<()> {
    let default_config = r#"# PushKit 配置文件
# 此文件由 pushkit generate-config 生成

[gateway]
url = "https://push.ubuntu.com/notify"
app_id = "pushnotification.example_pushnotification"
# auth_token = "..."     # 敏感，建议用 PUSHKIT_AUTH_TOKEN 环境变量
# device_token = "..."   # 敏感，建议用 PUSHKIT_DEVICE_TOKEN 环境变量

[device]
app_id = "pushnotification.example_pushnotification"
# bus_address = "unix:path=/run/user/32011/bus"
icon = "notification-symbolic"

[logging]
level = "info"
format = "compact"
"#;

    std::fs::write(path, default_config).with_context(|| format!("无法写入配置文件: {}", path))?;

    println!("✅ 配置文件已生成: {}", path);
    Ok(())
}

/// 验证配置文件
fn validate_config(path: &str) -> Result<()> {
    let config = PushConfig::from_toml_file(path)
        .with_context(|| format!("配置文件验证失败: {}", path))?;

    println!("✅ 配置文件有效: {}", path);
    println!("📊 配置摘要:");
    println!("  - Gateway URL: {}", config.gateway.url);
    println!("  - App ID: {}", config.gateway.app_id);
    println!("  - Device App ID: {}", config.device.app_id);

    Ok(())
}

/// 显示最终配置（合并后的配置）
fn show_config(config: &PushConfig) -> Result<()> {
    // 敏感字段脱敏后输出
    let mut shown = config.clone();
    if let Some(token) = &shown.gateway.device_token {
        shown.gateway.device_token = Some(redact_token(token));
    }
    if shown.gateway.auth_token.is_some() {
        shown.gateway.auth_token = Some("<redacted>".to_string());
    }

    println!("📊 最终配置（合并后的配置）:");
    println!("{}", serde_json::to_string_pretty(&shown)?);

    Ok(())
}
