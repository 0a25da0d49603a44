//! 内存翻译存储
//!
//! 测试与快照后端共用的进程内实现。事务用整表快照做日志：
//! 开启时留存副本，回滚时整体还原。

use std::sync::RwLock;

use crate::error::{FilterError, FilterResult};
use crate::model::Translation;
use crate::store::TranslationStore;

struct Inner {
    records: Vec<Translation>,
    next_id: i64,
    /// 事务开启时的记录副本，`None` 表示不在事务中
    journal: Option<Vec<Translation>>,
}

/// 进程内翻译存储
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_records(Vec::new())
    }

    /// 用既有记录初始化，id 分配从现有最大值之后继续
    pub fn with_records(records: Vec<Translation>) -> Self {
        let next_id = records.iter().map(|t| t.id).max().unwrap_or(0) + 1;
        Self {
            inner: RwLock::new(Inner {
                records,
                next_id,
                journal: None,
            }),
        }
    }

    /// 当前全部记录的副本（快照写回用）
    pub fn records(&self) -> Vec<Translation> {
        self.inner.read().expect("store lock poisoned").records.clone()
    }

    pub fn len(&self) -> usize {
        self.inner.read().expect("store lock poisoned").records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TranslationStore for MemoryStore {
    fn find_matches(
        &self,
        found_hash: Option<&str>,
        generated_hash: &str,
    ) -> FilterResult<Vec<Translation>> {
        let inner = self
            .inner
            .read()
            .map_err(|e| FilterError::Store(format!("读锁获取失败: {}", e)))?;

        let mut matches: Vec<Translation> = inner
            .records
            .iter()
            .filter(|t| {
                found_hash.is_some_and(|h| t.md5key == h)
                    || t.last_generated_hash == generated_hash
            })
            .cloned()
            .collect();

        // 升序排序是查询契约的一部分
        matches.sort_by(|a, b| a.md5key.cmp(&b.md5key));
        Ok(matches)
    }

    fn insert(&self, translation: &Translation) -> FilterResult<i64> {
        let mut inner = self
            .inner
            .write()
            .map_err(|e| FilterError::Store(format!("写锁获取失败: {}", e)))?;

        let id = inner.next_id;
        inner.next_id += 1;

        let mut record = translation.clone();
        record.id = id;
        inner.records.push(record);
        Ok(id)
    }

    fn begin_transaction(&self) -> FilterResult<()> {
        let mut inner = self
            .inner
            .write()
            .map_err(|e| FilterError::Store(format!("写锁获取失败: {}", e)))?;

        if inner.journal.is_some() {
            return Err(FilterError::Transaction("事务已开启".to_string()));
        }
        inner.journal = Some(inner.records.clone());
        Ok(())
    }

    fn commit(&self) -> FilterResult<()> {
        let mut inner = self
            .inner
            .write()
            .map_err(|e| FilterError::Store(format!("写锁获取失败: {}", e)))?;

        if inner.journal.take().is_none() {
            return Err(FilterError::Transaction("没有可提交的事务".to_string()));
        }
        Ok(())
    }

    fn rollback(&self) -> FilterResult<()> {
        let mut inner = self
            .inner
            .write()
            .map_err(|e| FilterError::Store(format!("写锁获取失败: {}", e)))?;

        match inner.journal.take() {
            Some(saved) => {
                inner.records = saved;
                Ok(())
            }
            None => Err(FilterError::Transaction("没有可回滚的事务".to_string())),
        }
    }
}
