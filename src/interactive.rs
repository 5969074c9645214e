use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use anyhow::Result;

use crate::local::simulator::{default_suite, LocalSimulator};

/// 交互式菜单命令（封闭集合）
///
/// 所有命令集中在一张表里：同一张表负责解析和菜单展示，
/// 分发走单一的 match。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuCommand {
    /// 简单通知
    Simple,
    /// 消息通知
    Message,
    /// 图片通知
    Photo,
    /// 群消息通知
    Group,
    /// 设置角标
    Badge,
    /// 清除通知
    Clear,
    /// 执行全部用例
    RunAll,
    /// 自定义通知
    Custom,
    /// 退出
    Quit,
}

/// 菜单表：按键、命令、展示文字
const MENU: &[(&str, MenuCommand, &str)] = &[
    ("1", MenuCommand::Simple, "Simple notification"),
    ("2", MenuCommand::Message, "Message notification"),
    ("3", MenuCommand::Photo, "Photo notification"),
    ("4", MenuCommand::Group, "Group message"),
    ("5", MenuCommand::Badge, "Set badge counter"),
    ("6", MenuCommand::Clear, "Clear notifications"),
    ("7", MenuCommand::RunAll, "Run all tests"),
    ("8", MenuCommand::Custom, "Custom notification"),
    ("9", MenuCommand::Quit, "Exit"),
];

impl MenuCommand {
    /// 从输入解析命令（只认表里的键）
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        MENU.iter()
            .find(|(key, _, _)| *key == input)
            .map(|(_, command, _)| *command)
    }
}

fn print_menu() {
    println!();
    println!("╔════════════════════════════════════════════╗");
    println!("║  Push Notification Local Testing Tool      ║");
    println!("╚════════════════════════════════════════════╝");
    println!();
    println!("Choose a test:");
    for (key, _, label) in MENU {
        println!("{}) {}", key, label);
    }
    println!();
}

/// 交互式测试循环
pub async fn run(simulator: &mut LocalSimulator) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print_menu();
        let input = match prompt(&mut lines, "Enter choice (1-9): ").await? {
            Some(input) => input,
            None => break, // EOF
        };
        println!();

        let command = match MenuCommand::parse(&input) {
            Some(command) => command,
            None => {
                println!("Invalid choice!");
                continue;
            }
        };

        match command {
            MenuCommand::Simple => {
                report(
                    simulator
                        .notify(
                            "Test Notification",
                            "This is a simple test notification",
                            Some("test-simple"),
                            None,
                        )
                        .await
                        .succeeded,
                );
            }
            MenuCommand::Message => {
                report(
                    simulator
                        .notify(
                            "Alice",
                            "Hey! How are you doing today?",
                            Some("chat-123456"),
                            None,
                        )
                        .await
                        .succeeded,
                );
            }
            MenuCommand::Photo => {
                report(
                    simulator
                        .notify("Bob", "sent you a photo", Some("chat-789012"), Some("image"))
                        .await
                        .succeeded,
                );
            }
            MenuCommand::Group => {
                report(
                    simulator
                        .notify(
                            "Project Team",
                            "Charlie: Meeting at 3pm tomorrow",
                            Some("group-345678"),
                            Some("group"),
                        )
                        .await
                        .succeeded,
                );
            }
            MenuCommand::Badge => {
                let input = match prompt(&mut lines, "Enter badge count (0 to hide): ").await? {
                    Some(input) => input,
                    None => break,
                };
                match input.trim().parse::<i32>() {
                    Ok(count) => match simulator.set_badge(count).await {
                        Ok(result) => report(result.succeeded),
                        Err(e) => println!("✗ {}", e),
                    },
                    Err(_) => println!("✗ Not a number: {}", input.trim()),
                }
            }
            MenuCommand::Clear => {
                let cleared = simulator.clear_notifications(None).await.succeeded;
                // 清除后同时把角标归零
                let badged = matches!(
                    simulator.set_badge(0).await,
                    Ok(result) if result.succeeded
                );
                report(cleared && badged);
            }
            MenuCommand::RunAll => {
                let summary = simulator.run_suite(&default_suite()).await;
                println!("✓ Test completed!");
                println!(
                    "Sent {}/{} notifications successfully",
                    summary.succeeded, summary.attempted
                );
                println!("Check your notification panel!");
            }
            MenuCommand::Custom => {
                let title = match prompt(&mut lines, "Enter notification title: ").await? {
                    Some(title) => title,
                    None => break,
                };
                let body = match prompt(&mut lines, "Enter notification message: ").await? {
                    Some(body) => body,
                    None => break,
                };
                let tag = match prompt(&mut lines, "Enter tag (optional): ").await? {
                    Some(tag) => tag,
                    None => break,
                };
                let tag = tag.trim().to_string();
                let tag = if tag.is_empty() { None } else { Some(tag) };
                report(
                    simulator
                        .notify(title.trim(), body.trim(), tag.as_deref(), None)
                        .await
                        .succeeded,
                );
            }
            MenuCommand::Quit => {
                println!("Goodbye!");
                break;
            }
        }
    }

    Ok(())
}

async fn prompt(
    lines: &mut tokio::io::Lines<BufReader<tokio::io::Stdin>>,
    text: &str,
) -> Result<Option<String>> {
    let mut stdout = tokio::io::stdout();
    stdout.write_all(text.as_bytes()).await?;
    stdout.flush().await?;
    Ok(lines.next_line().await?)
}

fn report(succeeded: bool) {
    if succeeded {
        println!("✓ Done");
    } else {
        println!("✗ Failed (see log for details)");
    }
}
