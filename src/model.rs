//! 数据模型
//!
//! 翻译记录、解析结果与行内标记条目。`Translation` 由外部存储持有，
//! 其余类型都是单次渲染或单次对账过程中的临时值。

use serde::{Deserialize, Serialize};

/// 站点默认语言，作为回退翻译的语言标记
pub const FALLBACK_LANGUAGE: &str = "en";

/// 持久化的翻译记录
///
/// `md5key` 是这条翻译被索引的哈希（沿用历史列名），
/// `last_generated_hash` 是替换文本编写时源内容的哈希。
/// 同一 (`md5key`, `target_language`) 对至多一条记录有效。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Translation {
    pub id: i64,
    pub md5key: String,
    pub last_generated_hash: String,
    pub target_language: String,
    pub substitute_text: String,
    pub context_id: i64,
}

/// 解析结果的新鲜度
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    /// 记录的源内容哈希与当前 generated hash 一致
    Good,
    /// 内容在翻译之后被编辑过
    Stale,
}

/// 单个片段的解析结果
///
/// `translation` 为展示用的匹配记录（可能为空，表示原文透传）。
/// `edit_suggestion` 是可作为编辑对象的记录：当匹配到的是
/// `en` 回退翻译而目标语言不是 `en` 时，替换文本照常展示，
/// 但不提供编辑入口，此字段为空。
#[derive(Debug, Clone)]
pub struct Resolution {
    pub translation: Option<Translation>,
    pub freshness: Freshness,
    pub edit_suggestion: Option<Translation>,
}

impl Resolution {
    /// 无翻译的透传结果
    pub fn none() -> Self {
        Self {
            translation: None,
            freshness: Freshness::Good,
            edit_suggestion: None,
        }
    }

    pub fn is_stale(&self) -> bool {
        self.translation.is_some() && self.freshness == Freshness::Stale
    }
}

/// 行内编辑标记条目
///
/// 在一次渲染会话内按整组字段内容去重，分配从 1 开始递增的
/// 整数 id，会话结束时整体序列化交给页面侧脚本。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerEntry {
    pub raw_text: String,
    pub generated_hash: String,
    pub found_hash: Option<String>,
    pub context_id: i64,
    pub translation_id: Option<i64>,
    pub stale_translation: bool,
    pub good_translation: bool,
    pub no_translation: bool,
}
