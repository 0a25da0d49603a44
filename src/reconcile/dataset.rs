//! 数据集访问与按表渲染变换
//!
//! 对账器只通过这两个接口接触数据：`DatasetAccess` 提供表、
//! 列与行的只读视图；`TransformRegistry` 按表名注册渲染变换，
//! 替代原实现里写死在循环内的表名分支，新表只需注册新策略。

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// 数据表中的一行：行 id 加上列名 → 文本值
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Row {
    pub id: i64,
    pub values: BTreeMap<String, String>,
}

impl Row {
    pub fn new<'a>(id: i64, values: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            id,
            values: values
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    /// 某列的值，缺失时为空串
    pub fn value(&self, column: &str) -> &str {
        self.values.get(column).map(String::as_str).unwrap_or("")
    }
}

/// 数据集的只读访问接口
pub trait DatasetAccess {
    fn tables(&self) -> Vec<String>;
    fn columns(&self, table: &str) -> Vec<String>;
    /// 指定列非空的行，惰性遍历
    fn rows_where_not_empty(
        &self,
        table: &str,
        column: &str,
    ) -> Box<dyn Iterator<Item = Row> + '_>;
}

/// 按表定制的渲染变换
///
/// 行的存储值和最终渲染值可能不同（相对资源引用要换成绝对
/// 地址、摘要字段要换成完整渲染形式），内容哈希必须按渲染值
/// 计算。返回 `None` 或空串表示直接用存储值。
pub trait RenderTransform {
    fn render(&self, row: &Row) -> Option<String>;
}

/// 表名 → 渲染变换的注册表
///
/// 未注册的表使用原始列值，注册对核心循环开放扩展。
#[derive(Default)]
pub struct TransformRegistry {
    transforms: BTreeMap<String, Box<dyn RenderTransform>>,
}

impl TransformRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, table: &str, transform: Box<dyn RenderTransform>) {
        self.transforms.insert(table.to_string(), transform);
    }

    /// 渲染某表的一行，未注册或变换结果为空时返回 `None`
    pub fn render(&self, table: &str, row: &Row) -> Option<String> {
        self.transforms
            .get(table)?
            .render(row)
            .filter(|rendered| !rendered.is_empty())
    }

    /// 注册源领域已知的三个变换：课程小节摘要、书籍章节、页面内容
    ///
    /// 三者都把 `@@PLUGINFILE@@` 相对资源引用改写为绝对形式。
    pub fn with_defaults(base_url: &str) -> Self {
        let mut registry = Self::new();
        registry.register(
            "course_sections",
            Box::new(ResourceUrlTransform::new(base_url, "course", "section", "summary", None)),
        );
        registry.register(
            "book_chapters",
            Box::new(ResourceUrlTransform::new(base_url, "mod_book", "chapter", "content", None)),
        );
        registry.register(
            "page",
            Box::new(ResourceUrlTransform::new(
                base_url,
                "mod_page",
                "content",
                "content",
                Some("revision"),
            )),
        );
        registry
    }
}

/// 嵌入资源引用的占位符
pub const RESOURCE_PLACEHOLDER: &str = "@@PLUGINFILE@@";

/// 把列值中的资源占位符改写为绝对地址
///
/// 地址形如 `{base_url}/{component}/{file_area}/{item_id}`，
/// `item_id` 默认取行 id，也可以指定取某一列（页面内容用修订号）。
/// 列值里没有占位符时不做渲染。
pub struct ResourceUrlTransform {
    base_url: String,
    component: String,
    file_area: String,
    column: String,
    item_id_column: Option<String>,
}

impl ResourceUrlTransform {
    pub fn new(
        base_url: &str,
        component: &str,
        file_area: &str,
        column: &str,
        item_id_column: Option<&str>,
    ) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            component: component.to_string(),
            file_area: file_area.to_string(),
            column: column.to_string(),
            item_id_column: item_id_column.map(str::to_string),
        }
    }
}

impl RenderTransform for ResourceUrlTransform {
    fn render(&self, row: &Row) -> Option<String> {
        let value = row.value(&self.column);
        if !value.contains(RESOURCE_PLACEHOLDER) {
            return None;
        }

        let item_id = match &self.item_id_column {
            Some(column) => row.value(column).to_string(),
            None => row.id.to_string(),
        };
        let absolute = format!(
            "{}/{}/{}/{}",
            self.base_url, self.component, self.file_area, item_id
        );
        Some(value.replace(RESOURCE_PLACEHOLDER, &absolute))
    }
}
