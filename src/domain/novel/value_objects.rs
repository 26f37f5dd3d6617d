//! Novel Context - Value Objects

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use super::NovelError;

/// 结构化标识（12 字节，文本形式为 24 位十六进制）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectId([u8; 12]);

impl ObjectId {
    /// 转为小写十六进制
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{:02x}", b)).collect()
    }
}

impl FromStr for ObjectId {
    type Err = NovelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 24 || !s.is_ascii() {
            return Err(NovelError::InvalidIdentifier(s.to_string()));
        }

        let mut bytes = [0u8; 12];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&s[i * 2..i * 2 + 2], 16)
                .map_err(|_| NovelError::InvalidIdentifier(s.to_string()))?;
        }
        Ok(Self(bytes))
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// 标识的存储编码
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdKind {
    Object,
    Text,
}

impl IdKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IdKind::Object => "object",
            IdKind::Text => "text",
        }
    }
}

impl FromStr for IdKind {
    type Err = NovelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "object" => Ok(IdKind::Object),
            "text" => Ok(IdKind::Text),
            other => Err(NovelError::InvalidIdentifier(format!("id kind {}", other))),
        }
    }
}

/// 文档标识
///
/// 同一个值在存储里可能以结构化形式或字符串形式出现，
/// 在数据访问边界统一成这个类型。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DocumentId {
    Object(ObjectId),
    Text(String),
}

impl DocumentId {
    /// 按存储编码重建
    pub fn from_parts(kind: IdKind, value: &str) -> Result<Self, NovelError> {
        match kind {
            IdKind::Object => Ok(DocumentId::Object(value.parse()?)),
            IdKind::Text => Ok(DocumentId::Text(value.to_string())),
        }
    }

    /// 原始请求字符串可能对应的编码，按尝试顺序排列
    ///
    /// 能解析为 ObjectId 时先尝试结构化形式，再尝试原字符串。
    pub fn candidates(raw: &str) -> Vec<DocumentId> {
        let mut candidates = Vec::with_capacity(2);
        if let Ok(oid) = raw.parse::<ObjectId>() {
            candidates.push(DocumentId::Object(oid));
        }
        candidates.push(DocumentId::Text(raw.to_string()));
        candidates
    }

    pub fn kind(&self) -> IdKind {
        match self {
            DocumentId::Object(_) => IdKind::Object,
            DocumentId::Text(_) => IdKind::Text,
        }
    }

    /// 归一化字符串（十六进制或原字符串）
    pub fn canonical(&self) -> String {
        match self {
            DocumentId::Object(oid) => oid.to_hex(),
            DocumentId::Text(s) => s.clone(),
        }
    }

    /// 按归一化字符串比较
    pub fn matches(&self, raw: &str) -> bool {
        match self {
            DocumentId::Object(oid) => oid.to_hex().eq_ignore_ascii_case(raw),
            DocumentId::Text(s) => s == raw,
        }
    }

    /// 忽略编码差异的相等
    pub fn same_value(&self, other: &DocumentId) -> bool {
        self.canonical() == other.canonical()
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentId::Object(oid) => write!(f, "{}", oid),
            DocumentId::Text(s) => write!(f, "{}", s),
        }
    }
}

/// JSON 文档中的两种写法：`{"$oid": "..."}` 或裸字符串
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawDocumentId {
    Object {
        #[serde(rename = "$oid")]
        oid: String,
    },
    Text(String),
}

impl Serialize for DocumentId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let raw = match self {
            DocumentId::Object(oid) => RawDocumentId::Object { oid: oid.to_hex() },
            DocumentId::Text(s) => RawDocumentId::Text(s.clone()),
        };
        raw.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for DocumentId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match RawDocumentId::deserialize(deserializer)? {
            RawDocumentId::Object { oid } => oid
                .parse()
                .map(DocumentId::Object)
                .map_err(serde::de::Error::custom),
            RawDocumentId::Text(s) => Ok(DocumentId::Text(s)),
        }
    }
}

/// 章节配图
///
/// 存量数据里既有裸 URL 字符串，也有 `{url|src, caption}` 对象。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChapterImage {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

impl ChapterImage {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            caption: None,
        }
    }

    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawChapterImage {
    Url(String),
    Object {
        #[serde(default)]
        url: Option<String>,
        #[serde(default)]
        src: Option<String>,
        #[serde(default)]
        caption: Option<String>,
    },
}

impl<'de> Deserialize<'de> for ChapterImage {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match RawChapterImage::deserialize(deserializer)? {
            RawChapterImage::Url(url) => ChapterImage { url, caption: None },
            RawChapterImage::Object { url, src, caption } => ChapterImage {
                url: url.or(src).unwrap_or_default(),
                caption: caption.filter(|c| !c.is_empty()),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEX: &str = "65a1f0c2b3d4e5f601234567";

    #[test]
    fn test_object_id_parse() {
        let oid: ObjectId = HEX.parse().unwrap();
        assert_eq!(oid.to_hex(), HEX);

        let upper: ObjectId = HEX.to_uppercase().parse().unwrap();
        assert_eq!(upper, oid);

        assert!("not-an-object-id".parse::<ObjectId>().is_err());
        assert!("65a1f0c2b3d4e5f60123456z".parse::<ObjectId>().is_err());
    }

    #[test]
    fn test_id_kind_parse() {
        assert_eq!("object".parse::<IdKind>().unwrap(), IdKind::Object);
        assert_eq!(IdKind::Text.as_str().parse::<IdKind>().unwrap(), IdKind::Text);
        assert!(matches!(
            "uuid".parse::<IdKind>(),
            Err(NovelError::InvalidIdentifier(_))
        ));
    }

    #[test]
    fn test_candidates_order() {
        let candidates = DocumentId::candidates(HEX);
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].kind(), IdKind::Object);
        assert_eq!(candidates[1], DocumentId::Text(HEX.to_string()));

        let candidates = DocumentId::candidates("chapter-one");
        assert_eq!(candidates, vec![DocumentId::Text("chapter-one".to_string())]);
    }

    #[test]
    fn test_same_value_across_encodings() {
        let structured = DocumentId::Object(HEX.parse().unwrap());
        let plain = DocumentId::Text(HEX.to_string());
        assert_ne!(structured, plain);
        assert!(structured.same_value(&plain));
        assert!(structured.matches(HEX));
    }

    #[test]
    fn test_document_id_json_forms() {
        let structured: DocumentId =
            serde_json::from_str(&format!(r#"{{"$oid":"{}"}}"#, HEX)).unwrap();
        assert_eq!(structured.kind(), IdKind::Object);

        let plain: DocumentId = serde_json::from_str(r#""abc""#).unwrap();
        assert_eq!(plain, DocumentId::Text("abc".to_string()));

        let json = serde_json::to_string(&structured).unwrap();
        assert_eq!(json, format!(r#"{{"$oid":"{}"}}"#, HEX));
    }

    #[test]
    fn test_chapter_image_forms() {
        let images: Vec<ChapterImage> = serde_json::from_str(
            r#"["a.png", {"src": "b.png"}, {"url": "c.png", "caption": "Map"}]"#,
        )
        .unwrap();

        assert_eq!(images[0], ChapterImage::new("a.png"));
        assert_eq!(images[1], ChapterImage::new("b.png"));
        assert_eq!(images[2], ChapterImage::new("c.png").with_caption("Map"));
    }
}
