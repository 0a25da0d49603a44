//! 统一错误处理
//!
//! 提供结构化错误类型：输入错误（未知表列、列定义文件不可读或格式错误）
//! 必须在任何数据变更前中止；解析未命中和哈希漂移不是错误，
//! 由调用方按正常结果处理。

use thiserror::Error;

/// 过滤与对账过程中的错误类型
#[derive(Error, Debug, Clone)]
pub enum FilterError {
    /// 未知的表或列（对账输入校验失败，致命）
    #[error("未知的表或列: {table}.{column}")]
    UnknownColumn { table: String, column: String },

    /// 列定义文件错误（未指定、不可读、格式错误共用同一条消息）
    #[error("无法读取或解析列定义文件")]
    ColumnMap,

    /// 数据快照错误
    #[error("数据快照错误: {0}")]
    Snapshot(String),

    /// 翻译存储错误
    #[error("翻译存储错误: {0}")]
    Store(String),

    /// 事务错误
    #[error("事务错误: {0}")]
    Transaction(String),

    /// 序列化错误
    #[error("序列化错误: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for FilterError {
    fn from(error: serde_json::Error) -> Self {
        FilterError::Serialization(error.to_string())
    }
}

impl From<std::io::Error> for FilterError {
    fn from(error: std::io::Error) -> Self {
        FilterError::Snapshot(format!("IO错误: {}", error))
    }
}

/// 错误结果类型别名
pub type FilterResult<T> = Result<T, FilterError>;
