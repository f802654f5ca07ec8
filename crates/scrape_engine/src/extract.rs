use ego_tree::NodeRef;
use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};

use crate::normalize::normalize;

pub trait Extractor: Send + Sync {
    /// Returns the article text of `html`, or `None` when no article body
    /// was found.
    fn extract(&self, html: &str) -> Option<String>;
}

#[derive(Debug, Clone)]
pub struct ExtractSettings {
    /// Route extracted text through [`normalize`].
    pub clean_text: bool,
    /// Shorter paragraphs and list items are dropped; headings are exempt.
    pub min_block_chars: usize,
    /// Below this total the page is treated as having no article.
    pub min_total_chars: usize,
    /// Blocks whose linked text exceeds this share are navigation.
    pub max_link_density: f64,
}

impl Default for ExtractSettings {
    fn default() -> Self {
        Self {
            clean_text: true,
            min_block_chars: 20,
            min_total_chars: 100,
            max_link_density: 0.5,
        }
    }
}

/// Precision-oriented boilerplate removal:
/// - picks the richest `article`, then `[itemprop=articleBody]`, `main`,
///   `[role=main]`, falling back to `body`
/// - drops scripts, navigation, headers, footers, asides, forms and any
///   element whose class or id marks it as comments, sidebars, sharing,
///   ads, related links, newsletters or cookie banners
/// - keeps headings, paragraphs, list items, quotes and preformatted
///   blocks that are long enough and not mostly links.
#[derive(Debug, Clone, Default)]
pub struct BoilerplateExtractor {
    settings: ExtractSettings,
}

const ROOT_SELECTORS: &[&str] = &[
    "article",
    "[itemprop='articleBody']",
    "main",
    "[role='main']",
];

const SKIPPED_TAGS: &[&str] = &[
    "script", "style", "noscript", "template", "nav", "header", "footer", "aside", "form",
    "button", "input", "select", "textarea", "iframe", "svg", "canvas", "figure", "menu",
    "dialog", "object", "embed", "video", "audio", "map",
];

const BLOCK_TAGS: &[&str] = &["p", "li", "blockquote", "pre", "dd", "dt"];
const HEADING_TAGS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6"];
const INLINE_TAGS: &[&str] = &[
    "a", "span", "em", "strong", "b", "i", "u", "small", "sub", "sup", "abbr", "cite", "code",
    "mark", "q", "s", "time", "font", "label", "br",
];

const BOILERPLATE_PREFIXES: &[&str] = &[
    "comment",
    "sidebar",
    "share",
    "sharing",
    "social",
    "related",
    "advert",
    "promo",
    "newsletter",
    "subscri",
    "cookie",
    "breadcrumb",
    "disqus",
    "popup",
    "navbar",
    "navigation",
];
const BOILERPLATE_TOKENS: &[&str] = &[
    "ad", "ads", "nav", "menu", "footer", "reply", "respond", "widget",
];
const BOILERPLATE_ROLES: &[&str] = &[
    "navigation",
    "complementary",
    "contentinfo",
    "banner",
    "menu",
];

impl BoilerplateExtractor {
    pub fn new(settings: ExtractSettings) -> Self {
        Self { settings }
    }

    fn article_text(&self, html: &str) -> Option<String> {
        let doc = Html::parse_document(html);
        let root = select_root(&doc);

        let mut ctx = BlockContext::new(&self.settings);
        for child in root.children() {
            visit_node(child, &mut ctx);
        }
        ctx.flush_loose();

        let text = ctx.blocks.join("\n");
        if text.chars().count() < self.settings.min_total_chars {
            return None;
        }
        Some(text)
    }
}

impl Extractor for BoilerplateExtractor {
    fn extract(&self, html: &str) -> Option<String> {
        let text = self.article_text(html)?;
        if self.settings.clean_text {
            Some(normalize(&text))
        } else {
            Some(text)
        }
    }
}

fn select_root(doc: &Html) -> ElementRef<'_> {
    for raw in ROOT_SELECTORS {
        let Ok(selector) = Selector::parse(raw) else {
            continue;
        };
        let best = doc
            .select(&selector)
            .filter(|candidate| !is_boilerplate(*candidate))
            .map(|candidate| (visible_len(candidate), candidate))
            .filter(|(len, _)| *len > 0)
            .max_by_key(|(len, _)| *len);
        if let Some((_, element)) = best {
            return element;
        }
    }

    Selector::parse("body")
        .ok()
        .and_then(|body| doc.select(&body).next())
        .unwrap_or_else(|| doc.root_element())
}

fn visible_len(element: ElementRef) -> usize {
    element
        .text()
        .map(|chunk| chunk.trim().chars().count())
        .sum()
}

fn visit_node(node: NodeRef<'_, Node>, ctx: &mut BlockContext) {
    match node.value() {
        Node::Text(text) => ctx.loose.append_text(text, false),
        Node::Element(_) => {
            if let Some(element) = ElementRef::wrap(node) {
                visit_element(element, ctx);
            }
        }
        _ => {}
    }
}

fn visit_element(element: ElementRef, ctx: &mut BlockContext) {
    if is_skipped(element) {
        return;
    }
    let tag = element.value().name();

    if HEADING_TAGS.contains(&tag) || BLOCK_TAGS.contains(&tag) {
        ctx.flush_loose();
        let mut block = BlockText::default();
        collect_text(element, false, &mut block);
        let min_chars = if HEADING_TAGS.contains(&tag) {
            1
        } else {
            ctx.settings.min_block_chars
        };
        ctx.accept(block, min_chars);
    } else if tag == "br" {
        ctx.loose.append_text(" ", false);
    } else if tag == "a" {
        collect_text(element, true, &mut ctx.loose);
    } else if INLINE_TAGS.contains(&tag) {
        for child in element.children() {
            visit_node(child, ctx);
        }
    } else {
        ctx.flush_loose();
        for child in element.children() {
            visit_node(child, ctx);
        }
        ctx.flush_loose();
    }
}

/// Gathers all text below `element`, minus skipped subtrees.
fn collect_text(element: ElementRef, in_link: bool, block: &mut BlockText) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => block.append_text(text, in_link),
            Node::Element(_) => {
                let Some(child) = ElementRef::wrap(child) else {
                    continue;
                };
                if is_skipped(child) {
                    continue;
                }
                let tag = child.value().name();
                if tag == "br" {
                    block.append_text(" ", in_link);
                    continue;
                }
                let is_inline = INLINE_TAGS.contains(&tag);
                if !is_inline {
                    block.append_text(" ", in_link);
                }
                collect_text(child, in_link || tag == "a", block);
                if !is_inline {
                    block.append_text(" ", in_link);
                }
            }
            _ => {}
        }
    }
}

fn is_skipped(element: ElementRef) -> bool {
    SKIPPED_TAGS.contains(&element.value().name())
        || element.value().attr("hidden").is_some()
        || is_boilerplate(element)
}

fn is_boilerplate(element: ElementRef) -> bool {
    let value = element.value();
    if let Some(role) = value.attr("role") {
        if BOILERPLATE_ROLES
            .iter()
            .any(|r| r.eq_ignore_ascii_case(role.trim()))
        {
            return true;
        }
    }

    let markers = [value.attr("class"), value.attr("id")];
    markers.into_iter().flatten().any(|raw| {
        raw.to_ascii_lowercase()
            .split(|c: char| !c.is_ascii_alphanumeric())
            .filter(|token| !token.is_empty())
            .any(|token| {
                BOILERPLATE_TOKENS.contains(&token)
                    || BOILERPLATE_PREFIXES
                        .iter()
                        .any(|prefix| token.starts_with(prefix))
            })
    })
}

#[derive(Debug, Default)]
struct BlockText {
    text: String,
    chars: usize,
    link_chars: usize,
    last_char: Option<char>,
}

impl BlockText {
    fn append_text(&mut self, text: &str, in_link: bool) {
        for ch in text.chars() {
            if ch.is_whitespace() {
                if self.last_char.is_none() || self.last_char == Some(' ') {
                    continue;
                }
                self.push_char(' ');
            } else {
                self.push_char(ch);
                self.chars += 1;
                if in_link {
                    self.link_chars += 1;
                }
            }
        }
    }

    fn push_char(&mut self, ch: char) {
        self.text.push(ch);
        self.last_char = Some(ch);
    }

    fn link_density(&self) -> f64 {
        if self.chars == 0 {
            return 0.0;
        }
        self.link_chars as f64 / self.chars as f64
    }
}

struct BlockContext<'s> {
    settings: &'s ExtractSettings,
    blocks: Vec<String>,
    loose: BlockText,
}

impl<'s> BlockContext<'s> {
    fn new(settings: &'s ExtractSettings) -> Self {
        Self {
            settings,
            blocks: Vec::new(),
            loose: BlockText::default(),
        }
    }

    fn flush_loose(&mut self) {
        let loose = std::mem::take(&mut self.loose);
        let min_chars = self.settings.min_block_chars;
        self.accept(loose, min_chars);
    }

    fn accept(&mut self, block: BlockText, min_chars: usize) {
        if block.chars < min_chars.max(1) {
            return;
        }
        if block.link_density() > self.settings.max_link_density {
            return;
        }
        let text = block.text.trim_end();
        if !text.is_empty() {
            self.blocks.push(text.to_string());
        }
    }
}
