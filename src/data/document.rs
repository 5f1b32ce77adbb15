//! 配置文档值模型
//!
//! `Document` 是落盘配置的内存表示：在 JSON 值的基础上额外支持二进制数据。
//! 二进制数据在磁盘上以 `{"type": "Buffer", "data": [...]}` 形式保存，
//! 读取时会在整个结构中递归还原为 `Document::Bytes`。
//!
//! # 使用示例
//!
//! ```rust
//! use local_config::Document;
//!
//! let doc = Document::from_json(serde_json::json!({
//!     "token": {"type": "Buffer", "data": [1, 2, 3]}
//! }));
//! assert_eq!(doc.get("token").and_then(Document::as_bytes), Some(&[1u8, 2, 3][..]));
//! ```

use serde::de::{Deserialize, Deserializer};
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;

const BUFFER_TYPE_KEY: &str = "type";
const BUFFER_DATA_KEY: &str = "data";
const BUFFER_TYPE: &str = "Buffer";

/// 配置文档
///
/// 除 `Bytes` 外与 JSON 值一一对应，不做任何 schema 校验。
///
/// 对象基于 `BTreeMap`，写入磁盘时键按字典序排列，不保留插入顺序；
/// 比较与读写往返只关心结构是否相等。
#[derive(Debug, Clone, PartialEq)]
pub enum Document {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    /// 二进制数据，序列化为 Buffer 对象
    Bytes(Vec<u8>),
    Array(Vec<Document>),
    Object(BTreeMap<String, Document>),
}

impl Document {
    /// 空配置 `{}`
    pub fn empty() -> Self {
        Document::Object(BTreeMap::new())
    }

    /// 从已解析的 JSON 值构建文档，递归还原 Buffer 对象
    ///
    /// 深度优先遍历数组与对象；仅当对象恰好包含 `type == "Buffer"` 和
    /// 由 0..=255 整数组成的 `data` 两个键时才还原为 `Bytes`，
    /// 其余形似的对象原样保留。
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Null => Document::Null,
            Value::Bool(b) => Document::Bool(b),
            Value::Number(n) => Document::Number(n),
            Value::String(s) => Document::String(s),
            Value::Array(items) => {
                Document::Array(items.into_iter().map(Document::from_json).collect())
            }
            Value::Object(map) => match buffer_bytes(&map) {
                Some(bytes) => Document::Bytes(bytes),
                None => Document::Object(
                    map.into_iter()
                        .map(|(key, value)| (key, Document::from_json(value)))
                        .collect(),
                ),
            },
        }
    }

    /// 转换为写入磁盘时的 JSON 值（二进制展开为 Buffer 对象）
    pub fn to_json(&self) -> Value {
        match self {
            Document::Null => Value::Null,
            Document::Bool(b) => Value::Bool(*b),
            Document::Number(n) => Value::Number(n.clone()),
            Document::String(s) => Value::String(s.clone()),
            Document::Bytes(bytes) => {
                let mut map = Map::new();
                map.insert(BUFFER_TYPE_KEY.to_string(), Value::from(BUFFER_TYPE));
                map.insert(
                    BUFFER_DATA_KEY.to_string(),
                    Value::Array(bytes.iter().map(|b| Value::from(*b)).collect()),
                );
                Value::Object(map)
            }
            Document::Array(items) => Value::Array(items.iter().map(Document::to_json).collect()),
            Document::Object(map) => Value::Object(
                map.iter()
                    .map(|(key, value)| (key.clone(), value.to_json()))
                    .collect(),
            ),
        }
    }

    /// 获取对象中的字段（非对象返回 `None`）
    pub fn get(&self, key: &str) -> Option<&Document> {
        match self {
            Document::Object(map) => map.get(key),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Document::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Document::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_object(&self) -> bool {
        matches!(self, Document::Object(_))
    }

    /// 是否为空对象 `{}`
    pub fn is_empty_object(&self) -> bool {
        matches!(self, Document::Object(map) if map.is_empty())
    }
}

/// 识别 `{"type": "Buffer", "data": [...]}` 形状并提取字节
fn buffer_bytes(map: &Map<String, Value>) -> Option<Vec<u8>> {
    if map.len() != 2 || map.get(BUFFER_TYPE_KEY)?.as_str()? != BUFFER_TYPE {
        return None;
    }

    map.get(BUFFER_DATA_KEY)?
        .as_array()?
        .iter()
        .map(|v| v.as_u64().and_then(|n| u8::try_from(n).ok()))
        .collect()
}

impl Default for Document {
    fn default() -> Self {
        Document::empty()
    }
}

impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Document::Null => serializer.serialize_unit(),
            Document::Bool(b) => serializer.serialize_bool(*b),
            Document::Number(n) => n.serialize(serializer),
            Document::String(s) => serializer.serialize_str(s),
            Document::Bytes(bytes) => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry(BUFFER_TYPE_KEY, BUFFER_TYPE)?;
                map.serialize_entry(BUFFER_DATA_KEY, bytes)?;
                map.end()
            }
            Document::Array(items) => items.serialize(serializer),
            Document::Object(map) => map.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Document {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Document::from_json)
    }
}

impl From<Value> for Document {
    fn from(value: Value) -> Self {
        Document::from_json(value)
    }
}

impl From<bool> for Document {
    fn from(b: bool) -> Self {
        Document::Bool(b)
    }
}

impl From<&str> for Document {
    fn from(s: &str) -> Self {
        Document::String(s.to_string())
    }
}

impl From<String> for Document {
    fn from(s: String) -> Self {
        Document::String(s)
    }
}

impl From<Vec<u8>> for Document {
    fn from(bytes: Vec<u8>) -> Self {
        Document::Bytes(bytes)
    }
}

impl From<i64> for Document {
    fn from(n: i64) -> Self {
        Document::Number(n.into())
    }
}

impl From<u64> for Document {
    fn from(n: u64) -> Self {
        Document::Number(n.into())
    }
}

impl From<f64> for Document {
    /// 非有限浮点数（NaN/∞）无法表示为 JSON，转换为 `Null`
    fn from(n: f64) -> Self {
        Number::from_f64(n).map_or(Document::Null, Document::Number)
    }
}

impl From<Vec<Document>> for Document {
    fn from(items: Vec<Document>) -> Self {
        Document::Array(items)
    }
}

impl From<BTreeMap<String, Document>> for Document {
    fn from(map: BTreeMap<String, Document>) -> Self {
        Document::Object(map)
    }
}

impl<K: Into<String>, V: Into<Document>> FromIterator<(K, V)> for Document {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Document::Object(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_revive_top_level_buffer() {
        let doc = Document::from_json(json!({"type": "Buffer", "data": [104, 105]}));
        assert_eq!(doc, Document::Bytes(b"hi".to_vec()));
    }

    #[test]
    fn test_revive_nested_in_objects_and_arrays() {
        let doc = Document::from_json(json!({
            "user": {
                "email": {"type": "Buffer", "data": [97, 64, 98]},
                "keys": [{"type": "Buffer", "data": []}, "plain"]
            }
        }));

        let user = doc.get("user").unwrap();
        assert_eq!(user.get("email").and_then(Document::as_bytes), Some(&b"a@b"[..]));
        assert_eq!(
            user.get("keys"),
            Some(&Document::Array(vec![
                Document::Bytes(Vec::new()),
                Document::from("plain")
            ]))
        );
    }

    #[test]
    fn test_lookalike_objects_are_kept() {
        // 多余字段
        let extra = json!({"type": "Buffer", "data": [1], "len": 1});
        assert!(Document::from_json(extra).is_object());

        // 超出字节范围
        let out_of_range = json!({"type": "Buffer", "data": [256]});
        assert!(Document::from_json(out_of_range).is_object());

        // 非整数
        let fractional = json!({"type": "Buffer", "data": [1.5]});
        assert!(Document::from_json(fractional).is_object());

        // type 不匹配
        let other_type = json!({"type": "Blob", "data": [1]});
        assert!(Document::from_json(other_type).is_object());
    }

    #[test]
    fn test_bytes_serialize_as_buffer_object() {
        let doc: Document = [("blob", Document::Bytes(vec![1, 2, 255]))]
            .into_iter()
            .collect();

        let text = serde_json::to_string(&doc).unwrap();
        assert_eq!(text, r#"{"blob":{"type":"Buffer","data":[1,2,255]}}"#);
        assert_eq!(serde_json::to_value(&doc).unwrap(), doc.to_json());
    }

    #[test]
    fn test_object_keys_serialize_sorted() {
        let doc: Document = [("zeta", 1i64), ("alpha", 2), ("mid", 3)].into_iter().collect();

        let text = serde_json::to_string(&doc).unwrap();
        assert_eq!(text, r#"{"alpha":2,"mid":3,"zeta":1}"#);
    }

    #[test]
    fn test_deserialize_revives_buffers() {
        let text = r#"{"id":"123","secret":{"type":"Buffer","data":[0,1]},"x":null}"#;
        let doc: Document = serde_json::from_str(text).unwrap();

        assert_eq!(doc.get("id").and_then(Document::as_str), Some("123"));
        assert_eq!(doc.get("secret"), Some(&Document::Bytes(vec![0, 1])));
        assert_eq!(doc.get("x"), Some(&Document::Null));
    }

    #[test]
    fn test_non_finite_float_becomes_null() {
        assert_eq!(Document::from(f64::NAN), Document::Null);
        assert_eq!(Document::from(1.5), Document::Number(Number::from_f64(1.5).unwrap()));
    }

    #[test]
    fn test_default_is_empty_object() {
        assert!(Document::default().is_empty_object());
        assert!(!Document::from("x").is_empty_object());
    }
}
