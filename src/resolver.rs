//! 双哈希最佳翻译解析
//!
//! 给定片段的 found hash（此前渲染嵌入）与 generated hash
//! （按当前文本新算），在一次存储查询内选出目标语言的最佳
//! 翻译记录。found hash 命中的记录是权威匹配，优先于按内容
//! 哈希命中的记录。

use std::collections::HashMap;

use tracing::debug;

use crate::error::FilterResult;
use crate::model::{Freshness, Resolution, Translation, FALLBACK_LANGUAGE};
use crate::store::TranslationStore;

/// 翻译解析器
pub struct Resolver<'a> {
    store: &'a dyn TranslationStore,
}

impl<'a> Resolver<'a> {
    pub fn new(store: &'a dyn TranslationStore) -> Self {
        Self { store }
    }

    /// 解析一个片段的最佳翻译
    ///
    /// 查询结果按语言分进两个桶：`md5key` 等于 found hash 的进
    /// 权威桶，其余进内容桶。桶内同语言的记录按 `md5key` 升序
    /// 后写覆盖。目标语言先查权威桶，再查内容桶，都没有则透传。
    pub fn get_best_translation(
        &self,
        target_language: &str,
        generated_hash: &str,
        found_hash: Option<&str>,
        text: &str,
    ) -> FilterResult<Resolution> {
        // 空片段与空目标语言都不查询
        if text.is_empty() || target_language.is_empty() {
            return Ok(Resolution::none());
        }

        let matches = self.store.find_matches(found_hash, generated_hash)?;

        let mut by_found_hash: HashMap<String, Translation> = HashMap::new();
        let mut by_generated_hash: HashMap<String, Translation> = HashMap::new();

        for translation in matches {
            let is_found = found_hash.is_some_and(|h| translation.md5key == h);
            let bucket = if is_found {
                &mut by_found_hash
            } else {
                &mut by_generated_hash
            };
            // 升序遍历下的覆盖：同语言保留 md5key 最大的一条
            bucket.insert(translation.target_language.clone(), translation);
        }

        let chosen = by_found_hash
            .remove(target_language)
            .or_else(|| by_generated_hash.remove(target_language))
            .or_else(|| by_found_hash.remove(FALLBACK_LANGUAGE))
            .or_else(|| by_generated_hash.remove(FALLBACK_LANGUAGE));

        let Some(translation) = chosen else {
            debug!(target_language, generated_hash, "没有匹配的翻译，原文透传");
            return Ok(Resolution::none());
        };

        let freshness = if translation.last_generated_hash == generated_hash {
            Freshness::Good
        } else {
            Freshness::Stale
        };

        // 回退语言的翻译照常展示，但不作为编辑对象提供
        let edit_suggestion = if translation.target_language == FALLBACK_LANGUAGE
            && target_language != FALLBACK_LANGUAGE
        {
            None
        } else {
            Some(translation.clone())
        };

        debug!(
            target_language,
            matched_language = %translation.target_language,
            stale = matches!(freshness, Freshness::Stale),
            "翻译解析命中"
        );

        Ok(Resolution {
            translation: Some(translation),
            freshness,
            edit_suggestion,
        })
    }
}
