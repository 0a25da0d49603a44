//! 翻译存储接口
//!
//! 本库只消费存储，不实现持久化。接口收敛为规格用到的唯一
//! 查询形态（`md5key` 等值 OR `last_generated_hash` 等值，按
//! `md5key` 升序）、插入，以及覆盖整次对账运行的事务边界。

pub mod memory;
pub mod snapshot;

pub use memory::MemoryStore;
pub use snapshot::Snapshot;

use crate::error::FilterResult;
use crate::model::Translation;

/// 可查询的翻译记录集合
///
/// 实现方保证 `find_matches` 的返回顺序为 `md5key` 升序，
/// 解析器和对账器的"同语言后写覆盖"语义都建立在这个顺序上。
pub trait TranslationStore {
    /// 查询 `md5key == found_hash OR last_generated_hash == generated_hash`
    /// 的全部记录，按 `md5key` 升序返回。`found_hash` 缺失时只按
    /// `last_generated_hash` 匹配。
    fn find_matches(
        &self,
        found_hash: Option<&str>,
        generated_hash: &str,
    ) -> FilterResult<Vec<Translation>>;

    /// 插入一条新记录，返回分配的 id
    fn insert(&self, translation: &Translation) -> FilterResult<i64>;

    /// 开启覆盖整次运行的事务
    fn begin_transaction(&self) -> FilterResult<()>;

    /// 提交事务
    fn commit(&self) -> FilterResult<()>;

    /// 回滚事务，撤销本次事务内的全部插入
    fn rollback(&self) -> FilterResult<()>;
}
