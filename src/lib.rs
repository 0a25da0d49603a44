//! # Transfilter Library
//!
//! 基于内容指纹的翻译替换核心库。同一段内容会携带两个哈希：
//! 渲染时嵌入的 found hash 和按当前文本新算出的 generated hash，
//! 内容被编辑后两者会漂移。本库负责在漂移下解析最佳翻译、
//! 安全地缓存解析结果、用不可见标记为行内编辑打点，
//! 以及跨数据集批量迁移过期哈希下的翻译记录。
//!
//! ## 模块组织
//!
//! - `fingerprint` - 内容指纹：哈希计算与嵌入标记的提取
//! - `model` - 翻译记录与解析结果的数据模型
//! - `store` - 翻译存储接口（内存实现与 JSON 快照）
//! - `resolver` - 双哈希最佳翻译解析
//! - `cache` - 解析结果缓存（键值接口 + 进程内 LRU 实现）
//! - `marker` - 行内编辑的不可见标记编码
//! - `pipeline` - 单次渲染的过滤管道
//! - `reconcile` - 批量对账（发现、预演、执行）
//! - `error` - 错误处理

pub mod cache;
pub mod error;
pub mod fingerprint;
pub mod marker;
pub mod model;
pub mod pipeline;
pub mod reconcile;
pub mod resolver;
pub mod store;

// Re-export commonly used items for convenience
pub use cache::{cache_key, CacheStore, LruResolutionCache};
pub use error::{FilterError, FilterResult};
pub use model::{Freshness, MarkerEntry, Resolution, Translation};
pub use pipeline::{FilterPipeline, RenderContext, SubstituteRenderer};
pub use resolver::Resolver;
pub use store::{MemoryStore, TranslationStore};
