use std::collections::HashSet;
use serde::{Serialize, Deserialize};

/// 设备侧状态（进程生命周期内由本地模拟器独占修改）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceState {
    /// 角标计数（>= 0）
    pub badge_count: i32,
    /// 角标可见性（派生：计数 > 0 时可见）
    pub badge_visible: bool,
    /// 常驻通知标签集合（需要显式清除才会消失）
    pub persistent_tags: HashSet<String>,
}

impl DeviceState {
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置角标计数并重新派生可见性
    pub fn set_badge(&mut self, count: i32) {
        self.badge_count = count;
        self.badge_visible = count > 0;
    }

    /// 记录一条带标签的常驻通知
    pub fn add_tag(&mut self, tag: &str) {
        self.persistent_tags.insert(tag.to_string());
    }

    /// 清除标签：给定标签只移除那一个，空标签清除全部。
    /// 清除不存在的标签也算成功（幂等）。
    pub fn clear_tag(&mut self, tag: &str) {
        if tag.is_empty() {
            self.persistent_tags.clear();
        } else {
            self.persistent_tags.remove(tag);
        }
    }
}
