//! 渲染管道集成测试
//!
//! 通过公共管道验证双哈希解析优先级、缓存行为和行内标记

use transfilter::cache::{CacheStore, LruResolutionCache};
use transfilter::fingerprint::compute_hash;
use transfilter::marker::{contains_marker_boundary, decode_marker, marker_boundary};
use transfilter::model::Translation;
use transfilter::pipeline::{FilterPipeline, RenderContext, SubstituteRenderer};
use transfilter::store::{MemoryStore, TranslationStore};

mod common {
    include!("common/mod.rs");
}

use common::{translation, with_marker};

/// 测试找到的翻译替换原文，嵌入哈希的权威匹配优先
#[test]
fn test_found_hash_precedence_through_pipeline() {
    let raw = with_marker("<p>Hello</p>", "foundhash1");
    let generated = compute_hash("<p>Hello</p>");

    let store = MemoryStore::new();
    // 权威匹配与内容匹配指向不同替换文本
    store
        .insert(&translation("foundhash1", "stalehash", "fr", "<p>权威</p>"))
        .unwrap();
    store
        .insert(&translation("zzz", &generated, "fr", "<p>按内容</p>"))
        .unwrap();

    let cache = LruResolutionCache::new(16);
    let mut pipeline = FilterPipeline::new(&store, &cache, RenderContext::new("fr", 1));

    let output = pipeline.filter(&raw).unwrap();
    assert_eq!(output, "<p>权威</p>");

    println!("✅ Found-hash precedence test passed");
}

/// 测试无翻译时剥离标记后的原文透传
#[test]
fn test_no_translation_passthrough_strips_marker() {
    let raw = with_marker("<p>Untranslated</p>", "nobody");

    let store = MemoryStore::new();
    let cache = LruResolutionCache::new(16);
    let mut pipeline = FilterPipeline::new(&store, &cache, RenderContext::new("fr", 1));

    let output = pipeline.filter(&raw).unwrap();
    assert_eq!(output, "<p>Untranslated</p>");
}

/// 测试空片段不查询直接返回空
#[test]
fn test_empty_fragment_short_circuits() {
    let store = MemoryStore::new();
    let cache = LruResolutionCache::new(16);
    let mut pipeline = FilterPipeline::new(&store, &cache, RenderContext::new("fr", 1));

    assert_eq!(pipeline.filter("").unwrap(), "");
}

/// 测试已打过标记的片段原样透传，不重复处理
#[test]
fn test_already_marked_fragment_passes_through() {
    let marked = format!("text{}rest", marker_boundary());

    let store = MemoryStore::new();
    store
        .insert(&translation("x", &compute_hash(&marked), "fr", "should not appear"))
        .unwrap();

    let cache = LruResolutionCache::new(16);
    let mut pipeline = FilterPipeline::new(&store, &cache, RenderContext::new("fr", 1));

    let output = pipeline.filter(&marked).unwrap();
    assert_eq!(output, marked);
}

/// 测试解析结果被缓存：翻译变更后旧条目继续生效
#[test]
fn test_resolution_is_memoized() {
    let text = "<p>Cached</p>";
    let generated = compute_hash(text);

    let store = MemoryStore::new();
    store
        .insert(&translation("k1", &generated, "fr", "<p>v1</p>"))
        .unwrap();

    let cache = LruResolutionCache::new(16);
    let mut pipeline = FilterPipeline::new(&store, &cache, RenderContext::new("fr", 1));

    assert_eq!(pipeline.filter(text).unwrap(), "<p>v1</p>");

    // 后插入一条同语言、md5key 更大的记录，本应改变解析结果
    store
        .insert(&translation("k2", &generated, "fr", "<p>v2</p>"))
        .unwrap();

    // 缓存条目在生命周期内保持旧值
    assert_eq!(pipeline.filter(text).unwrap(), "<p>v1</p>");
}

/// 测试行内编辑模式完全绕过缓存
#[test]
fn test_inline_editing_bypasses_cache() {
    let text = "<p>Live</p>";
    let generated = compute_hash(text);

    let store = MemoryStore::new();
    let cache = LruResolutionCache::new(16);

    // 预先塞一个会命中的缓存条目
    let key = transfilter::cache_key("fr", Some(&generated), None);
    cache.set(&key, "<p>from cache</p>".to_string());

    store
        .insert(&translation("k", &generated, "fr", "<p>live value</p>"))
        .unwrap();

    let context = RenderContext::new("fr", 1).with_inline_editing();
    let mut pipeline = FilterPipeline::new(&store, &cache, context);

    let output = pipeline.filter(text).unwrap();
    assert!(output.starts_with("<p>live value</p>"));
    // 编辑模式下也不回写缓存
    assert_eq!(cache.get(&key), Some("<p>from cache</p>".to_string()));
}

/// 测试行内编辑时输出末尾附加可解码的不可见标记
#[test]
fn test_inline_marker_appended_and_decodable() {
    let text = "<p>Edit me</p>";
    let generated = compute_hash(text);

    let store = MemoryStore::new();
    store
        .insert(&translation("k", &generated, "fr", "<p>editable</p>"))
        .unwrap();

    let cache = LruResolutionCache::new(16);
    let context = RenderContext::new("fr", 7).with_inline_editing();
    let mut pipeline = FilterPipeline::new(&store, &cache, context);

    let output = pipeline.filter(text).unwrap();
    assert!(output.starts_with("<p>editable</p>"));
    assert!(contains_marker_boundary(&output));

    let marker = &output["<p>editable</p>".len()..];
    assert_eq!(decode_marker(marker), Some(1));

    let session = pipeline.into_session();
    let entry = &session.entries()[&1];
    assert_eq!(entry.raw_text, text);
    assert!(entry.good_translation);
    assert!(!entry.no_translation);

    println!("✅ Inline marker test passed");
}

/// 测试同一会话内相同片段复用标记 id，不同片段拿新 id
#[test]
fn test_marker_ids_dedup_within_session() {
    let store = MemoryStore::new();
    let cache = LruResolutionCache::new(16);
    let context = RenderContext::new("fr", 1).with_inline_editing();
    let mut pipeline = FilterPipeline::new(&store, &cache, context);

    let first = pipeline.filter("<p>same</p>").unwrap();
    let second = pipeline.filter("<p>same</p>").unwrap();
    let third = pipeline.filter("<p>other</p>").unwrap();

    assert_eq!(first, second);
    assert_ne!(second, third);
    assert_eq!(pipeline.session().entries().len(), 2);
}

/// 测试回退语言翻译展示但标记为不可编辑
#[test]
fn test_fallback_translation_marked_not_editable() {
    let text = "<p>Fallback</p>";
    let generated = compute_hash(text);

    let store = MemoryStore::new();
    store
        .insert(&translation("k", &generated, "en", "<p>english</p>"))
        .unwrap();

    let cache = LruResolutionCache::new(16);
    let context = RenderContext::new("fr", 1).with_inline_editing();
    let mut pipeline = FilterPipeline::new(&store, &cache, context);

    let output = pipeline.filter(text).unwrap();
    // 展示照常
    assert!(output.starts_with("<p>english</p>"));

    // 编辑条目按"无翻译"处理
    let session = pipeline.into_session();
    let entry = &session.entries()[&1];
    assert!(entry.no_translation);
    assert_eq!(entry.translation_id, None);
}

struct UrlRewriter;

impl SubstituteRenderer for UrlRewriter {
    fn render(&self, translation: &Translation) -> String {
        translation
            .substitute_text
            .replace("@@PLUGINFILE@@", "https://host/pluginfile.php")
    }
}

/// 测试替换文本先过渲染钩子再进缓存
#[test]
fn test_renderer_hook_applies_before_caching() {
    let text = "<p>With file</p>";
    let generated = compute_hash(text);

    let store = MemoryStore::new();
    store
        .insert(&translation(
            "k",
            &generated,
            "fr",
            "<img src=\"@@PLUGINFILE@@/a.png\">",
        ))
        .unwrap();

    let cache = LruResolutionCache::new(16);
    let renderer = UrlRewriter;
    let mut pipeline = FilterPipeline::new(&store, &cache, RenderContext::new("fr", 1))
        .with_renderer(&renderer);

    let output = pipeline.filter(text).unwrap();
    assert_eq!(output, "<img src=\"https://host/pluginfile.php/a.png\">");

    // 缓存里存的是改写后的值
    let key = transfilter::cache_key("fr", Some(&generated), None);
    assert_eq!(cache.get(&key), Some(output));
}
