//! 内容指纹
//!
//! 对文本片段做规范化哈希，并负责提取和剥离此前渲染时
//! 嵌入的哈希标记 `<span data-translationhash="H"></span>`。

use std::sync::OnceLock;

use regex::Regex;

/// 嵌入标记的属性名，用作正则匹配前的廉价预检
pub const MARKER_ATTR: &str = "data-translationhash";

/// 指纹长度：blake3 十六进制摘要截取 128 位
const HASH_HEX_LEN: usize = 32;

static MARKER_PATTERN: OnceLock<Regex> = OnceLock::new();

fn marker_pattern() -> &'static Regex {
    MARKER_PATTERN.get_or_init(|| {
        Regex::new(r#"<span data-translationhash[ ]*=[ ]*['"]+([a-zA-Z0-9]+)['"]+[ ]*>[ ]*</span>"#)
            .expect("marker pattern must compile")
    })
}

/// 查找并剥离嵌入的哈希标记
///
/// 返回剥离了所有标记 span 的文本，以及第一个匹配到的哈希值。
/// 没有标记时原样返回 `(text, None)`。格式不完整或出现多个标记
/// 都不会出错：只取第一个捕获组，无法匹配的部分保持原样。
pub fn extract_hash(text: &str) -> (String, Option<String>) {
    if !text.contains(MARKER_ATTR) {
        return (text.to_string(), None);
    }

    let pattern = marker_pattern();

    let hash = pattern
        .captures(text)
        .map(|caps| caps[1].to_string());

    if hash.is_none() {
        // 属性名出现但完整 span 匹配不上，视为无标记
        return (text.to_string(), None);
    }

    let stripped = pattern.replace_all(text, "").into_owned();
    (stripped, hash)
}

/// 计算文本的内容哈希
///
/// 只做一种规范化：去掉首尾空白。大小写、内部空白、属性顺序
/// 都参与哈希。结果跨进程稳定，为小写十六进制的 128 位摘要。
pub fn compute_hash(text: &str) -> String {
    let digest = blake3::hash(text.trim().as_bytes());
    digest.to_hex().as_str()[..HASH_HEX_LEN].to_string()
}
