// 集成测试公共模块
//
// 提供翻译记录、带标记内容和数据快照的构造辅助

use std::collections::BTreeMap;

use transfilter::model::Translation;
use transfilter::reconcile::dataset::Row;
use transfilter::store::snapshot::{Snapshot, Table};

/// 构造一条翻译记录
#[allow(dead_code)]
pub fn translation(md5key: &str, last_generated: &str, lang: &str, text: &str) -> Translation {
    Translation {
        id: 0,
        md5key: md5key.to_string(),
        last_generated_hash: last_generated.to_string(),
        target_language: lang.to_string(),
        substitute_text: text.to_string(),
        context_id: 1,
    }
}

/// 给内容附上嵌入哈希标记
#[allow(dead_code)]
pub fn with_marker(text: &str, hash: &str) -> String {
    format!(r#"{}<span data-translationhash="{}"></span>"#, text, hash)
}

/// 构造单表快照：表带 `{col}format` 兄弟列，因此可被发现
#[allow(dead_code)]
pub fn snapshot_with_table(
    table: &str,
    column: &str,
    rows: Vec<Row>,
    translations: Vec<Translation>,
) -> Snapshot {
    let mut tables = BTreeMap::new();
    tables.insert(
        table.to_string(),
        Table {
            columns: vec![
                "id".to_string(),
                column.to_string(),
                format!("{}format", column),
            ],
            rows,
        },
    );
    Snapshot {
        translations,
        tables,
    }
}
