//! Novel Queries

/// 获取小说详情查询
///
/// novel_id 为原始字符串，结构化/字符串两种编码都会尝试。
#[derive(Debug, Clone)]
pub struct GetNovel {
    pub novel_id: String,
}

/// 列出所有小说查询
#[derive(Debug, Clone)]
pub struct ListNovels;
