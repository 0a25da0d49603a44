//! 渲染过滤管道
//!
//! 单次请求的编排：剥离嵌入哈希 → 计算内容哈希 → 查缓存 →
//! 解析最佳翻译 → 按需打行内标记 → 回写缓存。行内编辑开启时
//! 完全绕过缓存，编辑者看到的永远是实时数据。

use tracing::debug;

use crate::cache::{cache_key, CacheStore};
use crate::error::FilterResult;
use crate::fingerprint::{compute_hash, extract_hash};
use crate::marker::{contains_marker_boundary, MarkerSession};
use crate::model::{MarkerEntry, Translation};
use crate::resolver::Resolver;
use crate::store::TranslationStore;

/// 替换文本的渲染钩子
///
/// 文件与附件 URL 改写属于宿主平台，替换文本在进缓存之前
/// 穿过这个接口。默认实现原样返回。
pub trait SubstituteRenderer {
    fn render(&self, translation: &Translation) -> String;
}

/// 默认透传渲染器
pub struct PassthroughRenderer;

impl SubstituteRenderer for PassthroughRenderer {
    fn render(&self, translation: &Translation) -> String {
        translation.substitute_text.clone()
    }
}

static PASSTHROUGH: PassthroughRenderer = PassthroughRenderer;

/// 单次请求的显式上下文
///
/// 原实现里的全局会话状态（当前语言、能力缓存、行内编辑开关）
/// 在这里收敛为调用方显式传入的对象，不做任何环境查找。
#[derive(Debug, Clone)]
pub struct RenderContext {
    pub target_language: String,
    /// 翻译记录缺省时标记条目使用的上下文 id
    pub context_id: i64,
    /// 行内编辑是否开启（能力校验由调用方完成）
    pub inline_editing: bool,
}

impl RenderContext {
    pub fn new(target_language: &str, context_id: i64) -> Self {
        Self {
            target_language: target_language.to_string(),
            context_id,
            inline_editing: false,
        }
    }

    pub fn with_inline_editing(mut self) -> Self {
        self.inline_editing = true;
        self
    }
}

/// 渲染过滤管道
///
/// 存储与缓存由调用方借入，标记会话归管道自己持有，
/// 一个请求一个实例，会话状态绝不跨请求共享。
pub struct FilterPipeline<'a> {
    store: &'a dyn TranslationStore,
    cache: &'a dyn CacheStore,
    renderer: &'a dyn SubstituteRenderer,
    context: RenderContext,
    session: MarkerSession,
}

impl<'a> FilterPipeline<'a> {
    pub fn new(
        store: &'a dyn TranslationStore,
        cache: &'a dyn CacheStore,
        context: RenderContext,
    ) -> Self {
        Self {
            store,
            cache,
            renderer: &PASSTHROUGH,
            context,
            session: MarkerSession::new(),
        }
    }

    /// 替换默认的透传渲染器
    pub fn with_renderer(mut self, renderer: &'a dyn SubstituteRenderer) -> Self {
        self.renderer = renderer;
        self
    }

    /// 过滤一个内容片段，返回最终渲染文本
    pub fn filter(&mut self, text: &str) -> FilterResult<String> {
        // 已打过标记的片段原样透传，防止重复处理
        if contains_marker_boundary(text) {
            return Ok(text.to_string());
        }

        let (stripped, found_hash) = extract_hash(text);
        let generated_hash = compute_hash(&stripped);

        let key = cache_key(
            &self.context.target_language,
            Some(&generated_hash),
            found_hash.as_deref(),
        );

        if !self.context.inline_editing {
            if let Some(cached) = self.cache.get(&key) {
                debug!(key = %key, "解析缓存命中");
                return Ok(cached);
            }
        }

        let translated = if stripped.is_empty() {
            String::new()
        } else {
            let resolver = Resolver::new(self.store);
            let resolution = resolver.get_best_translation(
                &self.context.target_language,
                &generated_hash,
                found_hash.as_deref(),
                &stripped,
            )?;

            let output = match &resolution.translation {
                Some(translation) => self.renderer.render(translation),
                None => stripped.clone(),
            };

            if self.context.inline_editing {
                let suggestion = resolution.edit_suggestion.as_ref();
                let entry = MarkerEntry {
                    raw_text: stripped.clone(),
                    generated_hash: generated_hash.clone(),
                    found_hash: found_hash.clone(),
                    context_id: suggestion
                        .filter(|t| t.context_id != 0)
                        .map(|t| t.context_id)
                        .unwrap_or(self.context.context_id),
                    translation_id: suggestion.map(|t| t.id),
                    stale_translation: suggestion
                        .is_some_and(|t| t.last_generated_hash != generated_hash),
                    good_translation: suggestion
                        .is_some_and(|t| t.last_generated_hash == generated_hash),
                    no_translation: suggestion.is_none(),
                };
                let marker = self.session.marker_for(entry);
                format!("{}{}", output, marker)
            } else {
                output
            }
        };

        if !self.context.inline_editing {
            self.cache.set(&key, translated.clone());
        }

        Ok(translated)
    }

    /// 当前会话的标记注册表
    pub fn session(&self) -> &MarkerSession {
        &self.session
    }

    /// 会话结束：取出标记注册表以便序列化给页面
    pub fn into_session(self) -> MarkerSession {
        self.session
    }
}
