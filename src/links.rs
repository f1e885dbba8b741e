use std::sync::LazyLock;

use pulldown_cmark::{Event, Parser, Tag, TagEnd};
use regex::Regex;
use url::form_urlencoded;

static WIKI_LINK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[\[([^\]]+)\]\]").unwrap());

/// Where a link points
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkTarget {
    /// A `[text](url)` link
    External(String),
    /// A `[[Page]]` or `[[Page|Alias]]` link to another note in the vault
    Wiki(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub start: usize,
    pub end: usize,
    pub target: LinkTarget,
    pub text: String,
}

impl Link {
    pub fn destination(&self) -> &str {
        match &self.target {
            LinkTarget::External(url) => url,
            LinkTarget::Wiki(page) => page,
        }
    }

    /// URI to open for this link. Wiki links resolve inside `vault`.
    pub fn route(&self, vault: &str) -> String {
        match &self.target {
            LinkTarget::External(url) => url.clone(),
            LinkTarget::Wiki(page) => vault_uri(vault, page),
        }
    }
}

/// Parse Markdown content and extract links with their byte positions
pub fn extract_links(content: &str) -> Vec<Link> {
    let mut links = Vec::new();
    let parser = Parser::new(content);

    let mut current_link: Option<(usize, String)> = None;
    let mut link_text = String::new();

    for (event, range) in parser.into_offset_iter() {
        match event {
            Event::Start(Tag::Link { dest_url, .. }) => {
                current_link = Some((range.start, dest_url.to_string()));
                link_text.clear();
            }
            Event::Text(text) | Event::Code(text) if current_link.is_some() => {
                link_text.push_str(&text);
            }
            Event::End(TagEnd::Link) => {
                if let Some((start, dest)) = current_link.take() {
                    links.push(Link {
                        start,
                        end: range.end,
                        target: LinkTarget::External(dest),
                        text: link_text.clone(),
                    });
                }
            }
            _ => {}
        }
    }

    for cap in WIKI_LINK.captures_iter(content) {
        let (Some(matched), Some(inner)) = (cap.get(0), cap.get(1)) else {
            continue;
        };
        let inner = inner.as_str();
        let (page, text) = match inner.split_once('|') {
            Some((page, alias)) if !alias.is_empty() => (page, alias),
            Some((page, _)) => (page, page),
            None => (inner, inner),
        };
        links.push(Link {
            start: matched.start(),
            end: matched.end(),
            target: LinkTarget::Wiki(page.to_string()),
            text: text.to_string(),
        });
    }

    links.sort_by_key(|l| l.start);
    links
}

/// Find link at a specific byte position in the text
pub fn find_link_at_position(links: &[Link], pos: usize) -> Option<&Link> {
    links
        .iter()
        .find(|link| pos >= link.start && pos < link.end)
}

/// Deep link that opens `file` in the vault named `vault`
pub fn vault_uri(vault: &str, file: &str) -> String {
    format!(
        "obsidian://open?vault={}&file={}",
        encode_component(vault),
        encode_component(file)
    )
}

fn encode_component(value: &str) -> String {
    form_urlencoded::byte_serialize(value.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}
