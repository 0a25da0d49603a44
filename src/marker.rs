//! 行内编辑标记
//!
//! 把解析结果的元数据指针编码成零宽字符序列附在可见输出之后，
//! 页面文本不受影响，客户端脚本再按 id 找回元数据、挂上
//! 行内编辑入口。编码字母表固定为三个零宽码点：
//! 位 1、位 0 和字段分隔符。标记两端各用两个连续分隔符
//! 包裹，单个孤立的分隔符不会被误认成标记边界。

use std::collections::{BTreeMap, HashMap};

use crate::error::FilterResult;
use crate::model::MarkerEntry;

/// 位 1：零宽空格
pub const ENCODED_ONE: char = '\u{200B}';
/// 位 0：零宽不连字
pub const ENCODED_ZERO: char = '\u{200C}';
/// 分隔符：零宽连字
pub const ENCODED_SEPARATOR: char = '\u{200D}';

/// 标记边界：两个连续分隔符
pub fn marker_boundary() -> String {
    let mut boundary = String::new();
    boundary.push(ENCODED_SEPARATOR);
    boundary.push(ENCODED_SEPARATOR);
    boundary
}

/// 片段里是否已有标记边界
///
/// 管道在解析前调用：已被处理过的片段必须原样透传，
/// 避免嵌套或重复打标。
pub fn contains_marker_boundary(text: &str) -> bool {
    text.contains(&marker_boundary())
}

/// 把 id 编码成完整的不可见标记序列
///
/// id 的自然二进制表示逐位映射到零宽符号，不补前导零，
/// 两端各包一层双分隔符。
pub fn encode_id(id: u32) -> String {
    let boundary = marker_boundary();
    let bits: String = format!("{:b}", id)
        .chars()
        .map(|bit| if bit == '1' { ENCODED_ONE } else { ENCODED_ZERO })
        .collect();
    format!("{}{}{}", boundary, bits, boundary)
}

/// 从不可见标记序列里解出 id
///
/// 序列必须以双分隔符开头和结尾、位段非空且只含位符号，
/// 否则返回 `None`。服务端自身不消费标记，此函数描述线上
/// 格式并供客户端关联逻辑与测试使用。
pub fn decode_marker(sequence: &str) -> Option<u32> {
    let boundary = marker_boundary();
    let inner = sequence
        .strip_prefix(&boundary)?
        .strip_suffix(&boundary)?;

    if inner.is_empty() {
        return None;
    }

    let mut id: u32 = 0;
    for symbol in inner.chars() {
        let bit = match symbol {
            ENCODED_ONE => 1,
            ENCODED_ZERO => 0,
            _ => return None,
        };
        id = id.checked_mul(2)?.checked_add(bit)?;
    }
    Some(id)
}

/// 单次渲染会话的标记注册表
///
/// 状态严格限定在一个会话内：每个并发请求持有自己的实例，
/// id 从 1 开始按会话递增，会话结束后整体序列化交给页面，
/// 随后丢弃。
#[derive(Default)]
pub struct MarkerSession {
    /// 条目内容哈希 → 已分配的 id
    registered: HashMap<String, u32>,
    /// id → 条目，交给客户端的映射
    to_inject: BTreeMap<u32, MarkerEntry>,
    next_id: u32,
}

impl MarkerSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册一个条目，返回它的会话内 id
    ///
    /// 按整组字段的内容哈希去重：同一条目重复注册拿到同一个 id。
    pub fn register(&mut self, entry: MarkerEntry) -> u32 {
        let dedup_key = Self::dedup_key(&entry);

        if let Some(&id) = self.registered.get(&dedup_key) {
            return id;
        }

        self.next_id += 1;
        let id = self.next_id;
        self.registered.insert(dedup_key, id);
        self.to_inject.insert(id, entry);
        id
    }

    /// 注册条目并直接给出附加到输出末尾的标记序列
    pub fn marker_for(&mut self, entry: MarkerEntry) -> String {
        encode_id(self.register(entry))
    }

    /// 已注册的 id → 条目映射
    pub fn entries(&self) -> &BTreeMap<u32, MarkerEntry> {
        &self.to_inject
    }

    /// 会话结束时交给页面脚本的 JSON 负载（id → 条目）
    pub fn payload(&self) -> FilterResult<String> {
        Ok(serde_json::to_string(&self.to_inject)?)
    }

    fn dedup_key(entry: &MarkerEntry) -> String {
        // serde_json 按字段声明顺序输出，键在会话间稳定
        let serialized =
            serde_json::to_string(entry).unwrap_or_else(|_| format!("{:?}", entry));
        blake3::hash(serialized.as_bytes()).to_hex().to_string()
    }
}
