use clap::{Parser, Subcommand, ValueEnum};

// 确保 Parser trait 被使用
impl Cli {
    /// 解析命令行参数
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }
}

/// PushKit - Ubuntu Touch / Lomiri 推送通知工具
#[derive(Parser, Debug)]
#[command(name = "pushkit")]
#[command(version)]
#[command(about = "推送通知发送与设备端通知测试工具", long_about = None)]
pub struct Cli {
    /// 配置文件路径
    #[arg(long, value_name = "FILE", help = "指定配置文件路径")]
    pub config_file: Option<String>,

    /// 应用 ID
    #[arg(long, value_name = "ID", help = "应用 ID（两条路径共用）")]
    pub app_id: Option<String>,

    /// 推送网关地址
    #[arg(long, value_name = "URL", help = "推送网关地址")]
    pub gateway_url: Option<String>,

    /// 会话总线地址
    #[arg(long, value_name = "ADDRESS", help = "设备会话总线地址")]
    pub bus_address: Option<String>,

    /// 日志级别
    #[arg(
        long,
        value_name = "LEVEL",
        help = "日志级别: trace, debug, info, warn, error"
    )]
    pub log_level: Option<String>,

    /// 日志格式
    #[arg(long, value_name = "FORMAT", help = "日志格式: pretty, json, compact")]
    pub log_format: Option<String>,

    /// 详细输出（可重复使用：-v, -vv, -vvv）
    #[arg(short, action = clap::ArgAction::Count, help = "详细输出级别")]
    pub verbose: u8,

    /// 静默模式
    #[arg(long, short = 'q', help = "静默模式（不输出日志）")]
    pub quiet: bool,

    /// 开发模式（等同于 --log-level debug --log-format pretty）
    #[arg(long, help = "启用开发模式")]
    pub dev: bool,

    /// 子命令
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// 消息类型
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    /// 单聊文本
    Text,
    /// 单聊图片
    Photo,
    /// 群聊文本
    Group,
    /// 群邀请
    Invite,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// 通过推送网关发送一条消息
    Send {
        /// 目标设备令牌
        #[arg(long, value_name = "TOKEN", help = "目标设备推送令牌")]
        token: Option<String>,

        /// 网关认证令牌
        #[arg(long, value_name = "TOKEN", help = "网关 Bearer 认证令牌")]
        auth: Option<String>,

        /// 消息类型
        #[arg(long = "type", value_enum, default_value = "text", help = "消息类型")]
        kind: MessageKind,

        /// 发送者名称
        #[arg(long, default_value = "Test Sender", help = "发送者名称")]
        sender: String,

        /// 消息内容
        #[arg(long, default_value = "Hello from server!", help = "消息内容")]
        message: String,

        /// 群名称（群消息必填）
        #[arg(long, help = "群名称（group/invite 类型必填）")]
        group: Option<String>,

        /// 会话 ID
        #[arg(long, default_value_t = 123456789, help = "会话 ID")]
        chat_id: i64,

        /// 角标计数
        #[arg(long, default_value_t = 1, help = "角标计数")]
        badge: i32,

        /// 替换标签
        #[arg(long, value_name = "TAG", help = "替换标签（缺省为 msg_<chat_id>）")]
        replace_tag: Option<String>,

        /// 不清理排队中的旧通知
        #[arg(long, help = "投递前不清理该设备上排队中的旧通知")]
        no_clear_pending: bool,
    },

    /// 通过推送网关发送四条演示消息（文本/图片/群消息/群邀请）
    Demo {
        /// 目标设备令牌
        #[arg(long, value_name = "TOKEN", help = "目标设备推送令牌")]
        token: Option<String>,

        /// 网关认证令牌
        #[arg(long, value_name = "TOKEN", help = "网关 Bearer 认证令牌")]
        auth: Option<String>,
    },

    /// 在设备上执行完整的本地通知套件
    Suite,

    /// 在设备上发送单条本地通知
    Notify {
        /// 通知标题
        #[arg(long, default_value = "Test", help = "通知标题")]
        title: String,

        /// 通知内容
        #[arg(long, default_value = "Simple test notification", help = "通知内容")]
        body: String,

        /// 常驻标签（缺省自动生成）
        #[arg(long, help = "常驻标签")]
        tag: Option<String>,

        /// 通知图标
        #[arg(long, help = "通知图标")]
        icon: Option<String>,
    },

    /// 设置应用角标计数
    Badge {
        /// 角标计数（0 表示隐藏）
        #[arg(value_name = "COUNT", help = "角标计数（0 表示隐藏）")]
        count: i32,
    },

    /// 清除常驻通知并把角标归零
    Clear {
        /// 只清除这个标签（缺省清除全部）
        #[arg(value_name = "TAG", help = "只清除这个标签")]
        tag: Option<String>,
    },

    /// 交互式测试菜单
    Interactive,

    /// 生成默认配置文件
    GenerateConfig {
        /// 输出文件路径
        #[arg(value_name = "PATH", default_value = "pushkit.toml")]
        path: String,
    },

    /// 验证配置文件
    ValidateConfig {
        /// 配置文件路径
        #[arg(value_name = "PATH", default_value = "pushkit.toml")]
        path: String,
    },

    /// 显示最终配置（合并后的配置）
    ShowConfig,
}

impl Cli {
    /// 获取日志级别（考虑 verbose 和 quiet）
    pub fn get_log_level(&self) -> Option<String> {
        if self.quiet {
            return Some("error".to_string());
        }

        if self.dev {
            return Some("debug".to_string());
        }

        if let Some(level) = &self.log_level {
            return Some(level.clone());
        }

        // 根据 verbose 级别设置
        match self.verbose {
            0 => None, // 使用默认或配置文件
            1 => Some("info".to_string()),
            2 => Some("debug".to_string()),
            _ => Some("trace".to_string()),
        }
    }

    /// 获取日志格式
    pub fn get_log_format(&self) -> Option<String> {
        if self.dev {
            return Some("pretty".to_string());
        }
        self.log_format.clone()
    }
}
