//! 批量对账
//!
//! 内容被编辑后，翻译仍挂在陈旧的嵌入哈希下。对账器扫描
//! 数据集中每个可翻译字段：重算两个哈希，把按内容哈希能查到、
//! 按嵌入哈希查不到的语言的翻译复制到嵌入哈希名下。预演模式
//! 只报告，执行模式在一个覆盖整次运行的事务内插入。

pub mod dataset;

use std::collections::{BTreeMap, HashMap};

use tracing::{info, warn};

use crate::error::{FilterError, FilterResult};
use crate::fingerprint::{compute_hash, extract_hash, MARKER_ATTR};
use crate::model::Translation;
use crate::reconcile::dataset::{DatasetAccess, TransformRegistry};
use crate::store::TranslationStore;

/// 对账模式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileMode {
    /// 只报告将要复制的记录，不落库
    DryRun,
    /// 实际插入
    Process,
}

/// 一条（将要）复制的翻译
#[derive(Debug, Clone)]
pub struct CopiedTranslation {
    pub table: String,
    pub column: String,
    pub row_id: i64,
    /// 记录原本挂在哪个哈希下
    pub source_md5key: String,
    /// 复制后挂到的嵌入哈希
    pub found_hash: String,
    pub target_language: String,
}

/// 单表处理结果
#[derive(Debug, Clone, Default)]
pub struct TableReport {
    pub table: String,
    pub rows_scanned: usize,
    pub copies: Vec<CopiedTranslation>,
}

/// 整次运行的报告
#[derive(Debug, Clone)]
pub struct ReconcileReport {
    pub mode: ReconcileMode,
    pub tables: Vec<TableReport>,
}

impl ReconcileReport {
    pub fn total_copies(&self) -> usize {
        self.tables.iter().map(|t| t.copies.len()).sum()
    }
}

/// 批量对账器
pub struct Reconciler<'a> {
    store: &'a dyn TranslationStore,
    dataset: &'a dyn DatasetAccess,
    transforms: &'a TransformRegistry,
}

impl<'a> Reconciler<'a> {
    pub fn new(
        store: &'a dyn TranslationStore,
        dataset: &'a dyn DatasetAccess,
        transforms: &'a TransformRegistry,
    ) -> Self {
        Self {
            store,
            dataset,
            transforms,
        }
    }

    /// 发现模式：找出所有可翻译的 (表, 列)
    ///
    /// 判据是存在同名加 `format` 后缀的兄弟列，这是富文本列的
    /// 存储约定。纯只读。
    pub fn list_columns(&self) -> BTreeMap<String, Vec<String>> {
        let mut columns_by_table = BTreeMap::new();

        for table in self.dataset.tables() {
            let column_names = self.dataset.columns(&table);
            let translatable: Vec<String> = column_names
                .iter()
                .filter(|column| column_names.contains(&format!("{}format", column)))
                .cloned()
                .collect();

            if !translatable.is_empty() {
                columns_by_table.insert(table, translatable);
            }
        }

        columns_by_table
    }

    /// 执行一次对账运行
    ///
    /// 先把调用方请求的全部 (表, 列) 对照发现结果校验，任何
    /// 未知项都在处理任何行之前致命中止。整次运行包在一个
    /// 事务里，出错整体回滚，不留部分提交。
    pub fn run(
        &self,
        mode: ReconcileMode,
        requested: &BTreeMap<String, Vec<String>>,
    ) -> FilterResult<ReconcileReport> {
        let discovered = self.list_columns();

        // 行处理开始前的整体校验
        for (table, columns) in requested {
            for column in columns {
                let known = discovered
                    .get(table)
                    .map(|cols| cols.contains(column))
                    .unwrap_or(false);
                if !known {
                    return Err(FilterError::UnknownColumn {
                        table: table.clone(),
                        column: column.clone(),
                    });
                }
            }
        }

        self.store.begin_transaction()?;

        let mut tables = Vec::new();
        for (table, columns) in requested {
            match self.process_table(mode, table, columns) {
                Ok(report) => tables.push(report),
                Err(e) => {
                    warn!(table = %table, error = %e, "对账出错，回滚整次运行");
                    self.store.rollback()?;
                    return Err(e);
                }
            }
        }

        self.store.commit()?;

        if mode == ReconcileMode::Process {
            // 外部共享缓存此时可能还留着旧条目，提醒运维清除
            info!("对账已提交，共享的解析缓存需要外部清除后才会反映新翻译");
        }

        Ok(ReconcileReport { mode, tables })
    }

    fn process_table(
        &self,
        mode: ReconcileMode,
        table: &str,
        columns: &[String],
    ) -> FilterResult<TableReport> {
        info!("Started processing table: {}", table);

        let mut report = TableReport {
            table: table.to_string(),
            ..Default::default()
        };

        for column in columns {
            for row in self.dataset.rows_where_not_empty(table, column) {
                let raw = row.value(column);

                // 没有嵌入标记的行不参与对账
                if !raw.contains(MARKER_ATTR) {
                    continue;
                }
                report.rows_scanned += 1;

                let (stripped_raw, found_hash) = extract_hash(raw);
                let Some(found_hash) = found_hash else {
                    // 属性名出现但标记残缺，无法确定嵌入哈希
                    continue;
                };

                // 渲染值与存储值可能不同，内容哈希按渲染值计算；
                // 渲染结果里残留的标记 span 一并剥掉
                let generated_hash = match self.transforms.render(table, &row) {
                    Some(rendered) => compute_hash(&extract_hash(&rendered).0),
                    None => compute_hash(&stripped_raw),
                };

                let matches = self.store.find_matches(Some(&found_hash), &generated_hash)?;

                let mut by_found_hash: HashMap<String, Translation> = HashMap::new();
                let mut by_generated_hash: HashMap<String, Translation> = HashMap::new();
                for translation in matches {
                    if translation.md5key == found_hash {
                        by_found_hash.insert(translation.target_language.clone(), translation);
                    } else {
                        by_generated_hash.insert(translation.target_language.clone(), translation);
                    }
                }

                if !by_generated_hash.is_empty() {
                    info!("foundhash: {}, content hash: {}", found_hash, generated_hash);
                }

                // 嵌入哈希名下已有的语言绝不覆盖，静默跳过
                for (language, translation) in &by_generated_hash {
                    if by_found_hash.contains_key(language) {
                        continue;
                    }

                    info!(
                        "  + copying translation from md5key: {}, lang: {}",
                        translation.md5key, language
                    );

                    if mode == ReconcileMode::Process {
                        let mut record = translation.clone();
                        record.md5key = found_hash.clone();
                        self.store.insert(&record)?;
                    }

                    report.copies.push(CopiedTranslation {
                        table: table.to_string(),
                        column: column.clone(),
                        row_id: row.id,
                        source_md5key: translation.md5key.clone(),
                        found_hash: found_hash.clone(),
                        target_language: language.clone(),
                    });
                }
            }
        }

        info!("Finished processing table: {}", table);
        Ok(report)
    }
}
