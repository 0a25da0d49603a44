//! JSON 数据快照
//!
//! CLI 对外部数据集协作者的绑定：一个 JSON 文档同时承载翻译
//! 记录和各数据表的行。宿主平台的 ORM 不在本库范围内，
//! 快照是最小的可运行替身，也是集成测试的夹具格式。

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{FilterError, FilterResult};
use crate::model::Translation;
use crate::reconcile::dataset::{DatasetAccess, Row};
use crate::store::MemoryStore;

/// 一张数据表：声明的列名与若干行
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

/// 完整快照文档
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    pub translations: Vec<Translation>,
    pub tables: BTreeMap<String, Table>,
}

impl Snapshot {
    /// 从文件加载快照
    pub fn load(path: &Path) -> FilterResult<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|e| FilterError::Snapshot(format!("{}: {}", path.display(), e)))?;
        serde_json::from_str(&raw)
            .map_err(|e| FilterError::Snapshot(format!("{}: {}", path.display(), e)))
    }

    /// 写回快照文件
    pub fn save(&self, path: &Path) -> FilterResult<()> {
        let raw = serde_json::to_string_pretty(self)?;
        fs::write(path, raw)
            .map_err(|e| FilterError::Snapshot(format!("{}: {}", path.display(), e)))
    }

    /// 由翻译记录构建存储（表数据仍由快照自身提供）
    pub fn build_store(&self) -> MemoryStore {
        MemoryStore::with_records(self.translations.clone())
    }
}

impl DatasetAccess for Snapshot {
    fn tables(&self) -> Vec<String> {
        self.tables.keys().cloned().collect()
    }

    fn columns(&self, table: &str) -> Vec<String> {
        self.tables
            .get(table)
            .map(|t| t.columns.clone())
            .unwrap_or_default()
    }

    fn rows_where_not_empty(
        &self,
        table: &str,
        column: &str,
    ) -> Box<dyn Iterator<Item = Row> + '_> {
        let column = column.to_string();
        match self.tables.get(table) {
            Some(t) => Box::new(t.rows.iter().filter(move |row| {
                row.values
                    .get(&column)
                    .map(|v| !v.is_empty())
                    .unwrap_or(false)
            })
            .cloned()),
            None => Box::new(std::iter::empty()),
        }
    }
}
