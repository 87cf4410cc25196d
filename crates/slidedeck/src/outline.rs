//! Just enough markdown reading to know how many slides a deck has and what
//! to call them.

use std::sync::LazyLock;

use anyhow::{Context, Result};
use regex::Regex;
use serde::Deserialize;

static HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#{1,6}\s+(.+?)\s*#*\s*$").expect("heading regex"));

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FrontMatter {
    pub title: Option<String>,
    /// Explicit deck id.
    pub id: Option<String>,
    pub view: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Outline {
    pub meta: FrontMatter,
    pub slides: Vec<SlideOutline>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlideOutline {
    pub title: String,
    pub body: String,
}

impl Outline {
    pub fn slide_count(&self) -> u32 {
        u32::try_from(self.slides.len()).unwrap_or(u32::MAX)
    }

    /// Slide `ordinal` (1-indexed).
    pub fn slide(&self, ordinal: u32) -> Option<&SlideOutline> {
        let index = usize::try_from(ordinal).ok()?.checked_sub(1)?;
        self.slides.get(index)
    }
}

pub fn parse(content: &str) -> Result<Outline> {
    let content = content.replace("\r\n", "\n");
    let (meta, body) = extract_front_matter(&content)?;
    let slides = split(body)
        .into_iter()
        .enumerate()
        .map(|(i, body)| SlideOutline {
            title: slide_title(&body).unwrap_or_else(|| format!("Slide {}", i + 1)),
            body,
        })
        .collect();
    Ok(Outline { meta, slides })
}

fn extract_front_matter(content: &str) -> Result<(FrontMatter, &str)> {
    let Some(rest) = content.strip_prefix("---\n") else {
        return Ok((FrontMatter::default(), content));
    };
    let Some(end) = rest.find("\n---\n").or_else(|| rest.strip_suffix("\n---").map(str::len)) else {
        return Ok((FrontMatter::default(), content));
    };
    let yaml = &rest[..end];
    let body = rest.get(end + "\n---\n".len()..).unwrap_or_default();
    let meta = if yaml.trim().is_empty() {
        FrontMatter::default()
    } else {
        serde_yaml::from_str(yaml).context("Invalid front matter")?
    };
    Ok((meta, body))
}

/// Split a body into slides.
///
/// A `---` line with blank lines (or the document edge) on both sides breaks
/// a slide, and so does a `# ` heading once the current slide has content.
/// Nothing inside fenced code blocks counts.
fn split(body: &str) -> Vec<String> {
    let lines: Vec<&str> = body.lines().collect();
    let mut slides = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut fence: Option<char> = None;

    let flush = |current: &mut Vec<&str>, slides: &mut Vec<String>| {
        let text = current.join("\n").trim().to_string();
        if !text.is_empty() {
            slides.push(text);
        }
        current.clear();
    };

    for (i, line) in lines.iter().copied().enumerate() {
        let trimmed = line.trim();

        if let Some(marker) = fence {
            if trimmed.starts_with(marker) && trimmed.chars().filter(|c| *c == marker).count() >= 3 {
                fence = None;
            }
            current.push(line);
            continue;
        }
        if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            fence = trimmed.chars().next();
            current.push(line);
            continue;
        }

        let blank_before = i == 0 || lines[i - 1].trim().is_empty();
        let blank_after = lines.get(i + 1).is_none_or(|next| next.trim().is_empty());
        if is_dash_separator(trimmed) && blank_before && blank_after {
            flush(&mut current, &mut slides);
            continue;
        }

        let has_content = current.iter().any(|l| !l.trim().is_empty());
        if line.starts_with("# ") && has_content {
            flush(&mut current, &mut slides);
        }
        current.push(line);
    }
    flush(&mut current, &mut slides);
    slides
}

fn is_dash_separator(line: &str) -> bool {
    line.len() >= 3 && line.chars().all(|c| c == '-')
}

fn slide_title(body: &str) -> Option<String> {
    let lines = || body.lines().map(str::trim).filter(|l| !l.is_empty());
    lines()
        .find_map(|line| HEADING.captures(line).map(|c| c[1].to_string()))
        .or_else(|| {
            lines().next().map(|line| {
                let mut title: String = line.chars().take(48).collect();
                if line.chars().count() > 48 {
                    title.push('…');
                }
                title
            })
        })
}
