//! 章节正文格式化
//!
//! 原始正文可能已经是 `<p>` 包裹的 HTML，也可能是用空行分段的纯文本。
//! 正文中的图片标记（`<img>` 标签或 `![alt](url)`）会被抽出并编号，
//! 以 [`ContentBlock::Image`] 的形式放回原位，渲染层据此统一处理点击放大。
//! 章节附带的图片列表不插入正文，单独作为末尾图集。

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use super::novel::ChapterImage;

/// 正文中的图片占位（私有区字符，不会出现在正常文本里）
const MARK_OPEN: char = '\u{E000}';
const MARK_CLOSE: char = '\u{E001}';

static IMAGE_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?is)(?P<tag><img\b[^>]*>)|!\[(?P<alt>[^\]]*)\]\((?P<src>[^)\s]+)(?:\s+"[^"]*")?\)"#,
    )
    .expect("image marker regex")
});

static SRC_ATTR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\bsrc\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s>"']+))"#).expect("src regex")
});

static ALT_ATTR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\balt\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s>"']+))"#).expect("alt regex")
});

static PARAGRAPH_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<p[\s>]").expect("p regex"));

static PARAGRAPH_ELEMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)(?P<open><p(?:\s[^>]*)?>)(?P<inner>.*?)(?P<close></p\s*>)")
        .expect("paragraph element regex")
});

static BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n[ \t]*\n\s*").expect("blank regex"));

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new("\u{E000}(\\d+)\u{E001}").expect("placeholder regex"));

/// 正文块
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    /// 由纯文本生成的段落（内容不含外层 `<p>`）
    Paragraph { html: String },
    /// 原样保留的 HTML 片段
    Markup { html: String },
    /// 正文图片，index 对应 [`FormattedContent::images`]
    Image { index: usize },
}

/// 正文中抽出的图片
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmbeddedImage {
    pub index: usize,
    pub src: String,
    pub alt: String,
}

/// 末尾图集中的图片
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GalleryImage {
    pub src: String,
    pub alt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

/// 格式化结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormattedContent {
    pub blocks: Vec<ContentBlock>,
    pub images: Vec<EmbeddedImage>,
    pub gallery: Vec<GalleryImage>,
}

impl FormattedContent {
    pub fn paragraph_count(&self) -> usize {
        self.blocks
            .iter()
            .filter(|b| matches!(b, ContentBlock::Paragraph { .. }))
            .count()
    }

    pub fn image(&self, index: usize) -> Option<&EmbeddedImage> {
        self.images.iter().find(|img| img.index == index)
    }

    /// 渲染正文（不含图集）
    pub fn to_html(&self) -> String {
        self.blocks
            .iter()
            .filter_map(|block| match block {
                ContentBlock::Paragraph { html } => Some(format!("<p>{}</p>", html)),
                ContentBlock::Markup { html } => Some(html.clone()),
                ContentBlock::Image { index } => self.image(*index).map(render_image),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// 渲染末尾图集，没有图片时为空
    pub fn gallery_html(&self) -> String {
        if self.gallery.is_empty() {
            return String::new();
        }

        let figures: Vec<String> = self
            .gallery
            .iter()
            .map(|img| {
                let caption = img
                    .caption
                    .as_ref()
                    .map(|c| format!("<figcaption>{}</figcaption>", escape_attr(c)))
                    .unwrap_or_default();
                format!(
                    "<figure><img src=\"{}\" alt=\"{}\" class=\"chapter-image-expandable\" />{}</figure>",
                    escape_attr(&img.src),
                    escape_attr(&img.alt),
                    caption
                )
            })
            .collect();

        format!(
            "<div class=\"chapter-gallery\">\n{}\n</div>",
            figures.join("\n")
        )
    }
}

fn render_image(img: &EmbeddedImage) -> String {
    format!(
        "<figure class=\"chapter-image\" data-chapter-image=\"{index}\"><img src=\"{src}\" alt=\"{alt}\" class=\"chapter-image-expandable\" data-index=\"{index}\" /></figure>",
        index = img.index,
        src = escape_attr(&img.src),
        alt = escape_attr(&img.alt),
    )
}

fn escape_attr(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

fn default_alt(index: usize) -> String {
    format!("Chapter image {}", index + 1)
}

fn attr_value(re: &Regex, tag: &str) -> Option<String> {
    re.captures(tag).and_then(|caps| {
        caps.get(1)
            .or_else(|| caps.get(2))
            .or_else(|| caps.get(3))
            .map(|m| m.as_str().trim().to_string())
    })
}

/// 抽出图片标记，换成内部占位
fn extract_images(text: &str) -> (String, Vec<EmbeddedImage>) {
    let mut images = Vec::new();

    let replaced = IMAGE_MARKER.replace_all(text, |caps: &regex::Captures| {
        let (src, alt) = match caps.name("tag") {
            Some(tag) => (
                attr_value(&SRC_ATTR, tag.as_str()),
                attr_value(&ALT_ATTR, tag.as_str()),
            ),
            None => (
                caps.name("src").map(|m| m.as_str().to_string()),
                caps.name("alt").map(|m| m.as_str().trim().to_string()),
            ),
        };

        // 没有地址的标记直接丢弃，不占编号
        let Some(src) = src.filter(|s| !s.is_empty()) else {
            return String::new();
        };

        let index = images.len();
        images.push(EmbeddedImage {
            index,
            src,
            alt: alt.filter(|a| !a.is_empty()).unwrap_or_else(|| default_alt(index)),
        });
        format!("{}{}{}", MARK_OPEN, index, MARK_CLOSE)
    });

    (replaced.into_owned(), images)
}

/// 按占位切开文本，text 片段交给 on_text 生成块
fn split_on_images<F>(text: &str, mut on_text: F) -> Vec<ContentBlock>
where
    F: FnMut(&str) -> Option<ContentBlock>,
{
    let mut blocks = Vec::new();
    let mut last = 0;

    for caps in PLACEHOLDER.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        if let Some(block) = on_text(&text[last..whole.start()]) {
            blocks.push(block);
        }
        if let Some(index) = caps.get(1).and_then(|m| m.as_str().parse().ok()) {
            blocks.push(ContentBlock::Image { index });
        }
        last = whole.end();
    }

    if let Some(block) = on_text(&text[last..]) {
        blocks.push(block);
    }
    blocks
}

fn loose_markup(text: &str) -> Vec<ContentBlock> {
    split_on_images(text, |piece| {
        let piece = piece.trim();
        (!piece.is_empty()).then(|| ContentBlock::Markup {
            html: piece.to_string(),
        })
    })
}

/// 已包裹的正文；段落内部的图片把该段拆成多个完整的 `<p>` 段
fn markup_blocks(text: &str) -> Vec<ContentBlock> {
    let mut blocks = Vec::new();
    let mut last = 0;

    for caps in PARAGRAPH_ELEMENT.captures_iter(text) {
        let (Some(whole), Some(open), Some(inner), Some(close)) = (
            caps.get(0),
            caps.name("open"),
            caps.name("inner"),
            caps.name("close"),
        ) else {
            continue;
        };
        if !PLACEHOLDER.is_match(inner.as_str()) {
            continue;
        }

        blocks.extend(loose_markup(&text[last..whole.start()]));
        blocks.extend(split_on_images(inner.as_str(), |piece| {
            let piece = piece.trim();
            (!piece.is_empty()).then(|| ContentBlock::Markup {
                html: format!("{}{}{}", open.as_str(), piece, close.as_str()),
            })
        }));
        last = whole.end();
    }

    blocks.extend(loose_markup(&text[last..]));
    blocks
}

fn paragraph_blocks(text: &str) -> Vec<ContentBlock> {
    BLANK_LINES
        .split(text)
        .filter(|para| !para.trim().is_empty())
        .flat_map(|para| {
            split_on_images(para, |piece| {
                let lines: Vec<&str> = piece
                    .lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty())
                    .collect();
                (!lines.is_empty()).then(|| ContentBlock::Paragraph {
                    html: lines.join("<br />"),
                })
            })
        })
        .collect()
}

/// 已经包含 `<p>` 标签的正文不再包裹
pub fn is_paragraph_wrapped(text: &str) -> bool {
    PARAGRAPH_TAG.is_match(text)
}

/// 规范化章节附带的图片列表
pub fn normalize_gallery(images: &[ChapterImage]) -> Vec<GalleryImage> {
    images
        .iter()
        .filter(|img| !img.url.trim().is_empty())
        .enumerate()
        .map(|(i, img)| GalleryImage {
            src: img.url.trim().to_string(),
            alt: default_alt(i),
            caption: img.caption.clone().filter(|c| !c.trim().is_empty()),
        })
        .collect()
}

/// 格式化章节正文
pub fn format_chapter(raw: &str, external_images: &[ChapterImage]) -> FormattedContent {
    let normalized: String = raw
        .replace("\r\n", "\n")
        .chars()
        .filter(|c| *c != MARK_OPEN && *c != MARK_CLOSE)
        .collect();

    let (text, images) = extract_images(&normalized);

    let blocks = if is_paragraph_wrapped(&text) {
        markup_blocks(&text)
    } else {
        paragraph_blocks(&text)
    };

    FormattedContent {
        blocks,
        images,
        gallery: normalize_gallery(external_images),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_two_paragraphs() {
        let raw = "第一段的内容。\n\n第二段的内容。";
        let formatted = format_chapter(raw, &[]);

        assert_eq!(formatted.paragraph_count(), 2);
        assert_eq!(
            formatted.blocks,
            vec![
                ContentBlock::Paragraph { html: "第一段的内容。".to_string() },
                ContentBlock::Paragraph { html: "第二段的内容。".to_string() },
            ]
        );
        assert_eq!(formatted.to_html(), "<p>第一段的内容。</p>\n<p>第二段的内容。</p>");
    }

    #[test]
    fn test_blank_lines_with_whitespace_and_crlf() {
        let raw = "Line one\r\nstill one\r\n  \r\n\r\nLine two";
        let formatted = format_chapter(raw, &[]);

        assert_eq!(formatted.paragraph_count(), 2);
        assert_eq!(
            formatted.blocks[0],
            ContentBlock::Paragraph { html: "Line one<br />still one".to_string() }
        );
    }

    #[test]
    fn test_wrapped_content_not_double_wrapped() {
        let raw = "<p>Already wrapped.</p>\n<P class=\"x\">Second.</P>";
        let formatted = format_chapter(raw, &[]);

        assert_eq!(formatted.paragraph_count(), 0);
        let html = formatted.to_html();
        assert_eq!(html, raw);
        assert!(!html.contains("<p><p>"));
    }

    #[test]
    fn test_two_image_markers_indexed_in_order() {
        let raw = "开头。\n\n<img src=\"a.png\" alt=\"地图\">\n\n中间。\n\n![](b.png)\n\n结尾。";
        let formatted = format_chapter(raw, &[]);

        assert_eq!(formatted.images.len(), 2);
        assert_eq!(formatted.images[0].index, 0);
        assert_eq!(formatted.images[0].src, "a.png");
        assert_eq!(formatted.images[0].alt, "地图");
        assert_eq!(formatted.images[1].index, 1);
        assert_eq!(formatted.images[1].src, "b.png");
        assert_eq!(formatted.images[1].alt, "Chapter image 2");

        let image_blocks: Vec<usize> = formatted
            .blocks
            .iter()
            .filter_map(|b| match b {
                ContentBlock::Image { index } => Some(*index),
                _ => None,
            })
            .collect();
        assert_eq!(image_blocks, vec![0, 1]);
        assert_eq!(formatted.paragraph_count(), 3);

        let html = formatted.to_html();
        assert_eq!(html.matches("data-chapter-image=").count(), 2);
        assert!(html.contains("data-chapter-image=\"0\""));
        assert!(html.contains("data-chapter-image=\"1\""));
        assert!(!html.contains("<img src=\"a.png\" alt=\"地图\">"));
    }

    #[test]
    fn test_inline_image_splits_paragraph() {
        let raw = "before ![x](c.png) after";
        let formatted = format_chapter(raw, &[]);

        assert_eq!(
            formatted.blocks,
            vec![
                ContentBlock::Paragraph { html: "before".to_string() },
                ContentBlock::Image { index: 0 },
                ContentBlock::Paragraph { html: "after".to_string() },
            ]
        );
    }

    #[test]
    fn test_image_in_wrapped_content() {
        let raw = "<p>One</p><img src='d.png'><p>Two</p>";
        let formatted = format_chapter(raw, &[]);

        assert_eq!(
            formatted.blocks,
            vec![
                ContentBlock::Markup { html: "<p>One</p>".to_string() },
                ContentBlock::Image { index: 0 },
                ContentBlock::Markup { html: "<p>Two</p>".to_string() },
            ]
        );
    }

    #[test]
    fn test_image_inside_paragraph_keeps_markup_balanced() {
        let formatted = format_chapter("<p>Before <img src=\"a.png\"> after.</p>", &[]);

        assert_eq!(
            formatted.blocks,
            vec![
                ContentBlock::Markup { html: "<p>Before</p>".to_string() },
                ContentBlock::Image { index: 0 },
                ContentBlock::Markup { html: "<p>after.</p>".to_string() },
            ]
        );
        assert_eq!(formatted.images[0].src, "a.png");
    }

    #[test]
    fn test_split_paragraph_keeps_attributes_and_neighbors() {
        let raw = "<p>甲。</p>\n<P class=\"x\">乙 ![图](b.png) 丙 <img src='c.png'></P>\n<p>丁。</p>";
        let formatted = format_chapter(raw, &[]);

        let markup: Vec<&str> = formatted
            .blocks
            .iter()
            .filter_map(|b| match b {
                ContentBlock::Markup { html } => Some(html.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(
            markup,
            vec!["<p>甲。</p>", "<P class=\"x\">乙</P>", "<P class=\"x\">丙</P>", "<p>丁。</p>"]
        );
        for html in &markup {
            let lower = html.to_lowercase();
            assert_eq!(lower.matches("<p").count(), lower.matches("</p>").count(), "{}", html);
        }
        assert_eq!(formatted.images.len(), 2);
        assert_eq!(formatted.blocks.len(), 6);
        assert!(matches!(formatted.blocks[2], ContentBlock::Image { index: 0 }));
        assert!(matches!(formatted.blocks[4], ContentBlock::Image { index: 1 }));
    }

    #[test]
    fn test_marker_without_src_dropped() {
        let raw = "<img alt=\"broken\">text ![a](e.png)";
        let formatted = format_chapter(raw, &[]);

        assert_eq!(formatted.images.len(), 1);
        assert_eq!(formatted.images[0].index, 0);
        assert_eq!(formatted.images[0].src, "e.png");
    }

    #[test]
    fn test_gallery_kept_separate() {
        let external = vec![
            ChapterImage::new("g1.png").with_caption("封面"),
            ChapterImage::new(""),
            ChapterImage::new("g2.png"),
        ];
        let formatted = format_chapter("正文。", &external);

        assert_eq!(formatted.gallery.len(), 2);
        assert_eq!(formatted.gallery[0].caption.as_deref(), Some("封面"));
        assert_eq!(formatted.gallery[1].alt, "Chapter image 2");
        assert!(formatted.images.is_empty());
        assert!(!formatted.to_html().contains("g1.png"));
        assert!(formatted.gallery_html().contains("<figcaption>封面</figcaption>"));
    }

    #[test]
    fn test_attribute_escaping() {
        let formatted = format_chapter("![a\"b](x.png?a=1&b=2)", &[]);
        let html = formatted.to_html();
        assert!(html.contains("src=\"x.png?a=1&amp;b=2\""));
        assert!(html.contains("alt=\"a&quot;b\""));
    }

    #[test]
    fn test_empty_content() {
        let formatted = format_chapter("   \n\n  ", &[]);
        assert!(formatted.blocks.is_empty());
        assert_eq!(formatted.to_html(), "");
        assert_eq!(formatted.gallery_html(), "");
    }
}
