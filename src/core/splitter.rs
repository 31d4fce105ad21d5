use crate::core::document::{
    BANNER_RULE, BLOCK_SEPARATOR, BODY_TITLE, FILE_MARKER, FRAME_LINES, SECTION_RULE,
};
use crate::core::template::TemplateContext;
use log::{debug, info};
use std::ops::Range;

#[derive(Debug, Clone, Copy)]
pub struct PartBanners<'a> {
    pub part_end: &'a str,
    pub last_part_end: &'a str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DocumentPart {
    pub number: usize,
    pub total: usize,
    pub preamble: Vec<String>,
    pub body: Vec<String>,
    pub banner: Vec<String>,
}

impl DocumentPart {
    pub fn render(&self) -> String {
        self.preamble
            .iter()
            .chain(&self.body)
            .chain(&self.banner)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

pub fn split_document(lines: &[String], max_chars: usize, banners: &PartBanners) -> Vec<DocumentPart> {
    let Some(body_start) = find_body_start(lines) else {
        debug!("No body banner found, document kept whole");
        return vec![whole(lines, lines.len())];
    };
    if cost(lines) <= max_chars + 1 {
        return vec![whole(lines, body_start)];
    }

    let preamble = &lines[..body_start];
    let body = &lines[body_start..];
    let blocks = parse_blocks(body);

    // Overhead is measured at its widest so the grouping below is final and
    // every banner can cite the same part count.
    let widest = blocks.len().max(1);
    let overhead = cost(&part_title(widest, widest))
        + cost(preamble)
        + widest_banner_cost(widest, banners);
    let body_budget = max_chars.saturating_sub(overhead);

    let groups = pack(body, &blocks, body_budget);
    if groups.len() <= 1 {
        return vec![whole(lines, body_start)];
    }

    let total = groups.len();
    info!(
        "Splitting {} blocks into {} parts of at most {} chars",
        blocks.len(),
        total,
        max_chars
    );

    groups
        .into_iter()
        .enumerate()
        .map(|(i, group)| {
            let number = i + 1;
            let mut part_preamble = part_title(number, total);
            part_preamble.extend(preamble.iter().cloned());

            let first = blocks[group.start].start;
            let last = blocks[group.end - 1].end;
            DocumentPart {
                number,
                total,
                preamble: part_preamble,
                body: body[first..last].to_vec(),
                banner: banner(number, total, banners),
            }
        })
        .collect()
}

fn whole(lines: &[String], body_start: usize) -> DocumentPart {
    DocumentPart {
        number: 1,
        total: 1,
        preamble: lines[..body_start].to_vec(),
        body: lines[body_start..].to_vec(),
        banner: Vec::new(),
    }
}

fn cost(lines: &[String]) -> usize {
    lines.iter().map(|l| l.chars().count() + 1).sum()
}

fn find_body_start(lines: &[String]) -> Option<usize> {
    (1..lines.len().saturating_sub(1))
        .find(|&i| {
            lines[i] == BODY_TITLE && lines[i - 1] == SECTION_RULE && lines[i + 1] == SECTION_RULE
        })
        .map(|i| (i + 3).min(lines.len()))
}

fn is_block_start(body: &[String], i: usize) -> bool {
    body[i] == BLOCK_SEPARATOR && body.get(i + 1).is_some_and(|l| l.starts_with(FILE_MARKER))
}

/// Line ranges of the framed blocks in `body`. Lines before the first block
/// form a block of their own so nothing is lost.
fn parse_blocks(body: &[String]) -> Vec<Range<usize>> {
    let mut starts = Vec::new();
    let mut i = 0;
    while i < body.len() {
        if is_block_start(body, i) {
            starts.push(i);
            i += FRAME_LINES;
        } else {
            i += 1;
        }
    }
    if starts.first() != Some(&0) && !body.is_empty() {
        starts.insert(0, 0);
    }

    starts
        .iter()
        .enumerate()
        .map(|(n, &start)| start..starts.get(n + 1).copied().unwrap_or(body.len()))
        .collect()
}

// Returns ranges of block indices.
fn pack(body: &[String], blocks: &[Range<usize>], budget: usize) -> Vec<Range<usize>> {
    let mut groups = Vec::new();
    let mut start = 0;
    let mut size = 0;
    for (i, block) in blocks.iter().enumerate() {
        let block_cost = cost(&body[block.clone()]);
        if i > start && size + block_cost > budget {
            groups.push(start..i);
            start = i;
            size = 0;
        }
        size += block_cost;
    }
    if !blocks.is_empty() {
        groups.push(start..blocks.len());
    }
    groups
}

pub const PART_TOC_NOTE: &str = "Line numbers in the table of contents refer to the complete document.";

fn part_title(number: usize, total: usize) -> Vec<String> {
    vec![
        format!("PART {} OF {}", number, total),
        PART_TOC_NOTE.to_string(),
        String::new(),
    ]
}

fn remaining_text(remaining: usize) -> String {
    if remaining == 1 {
        "1 more part remains".to_string()
    } else {
        format!("{} more parts remain", remaining)
    }
}

fn banner(number: usize, total: usize, banners: &PartBanners) -> Vec<String> {
    let remaining = total - number;
    let context = TemplateContext::new()
        .with("current_part", number)
        .with("total_parts", total)
        .with("remaining_parts", remaining)
        .with("remaining_text", remaining_text(remaining));
    let template = if remaining == 0 {
        banners.last_part_end
    } else {
        banners.part_end
    };

    let mut lines = vec![String::new(), BANNER_RULE.to_string()];
    lines.extend(context.render(template).split('\n').map(str::to_string));
    lines.push(BANNER_RULE.to_string());
    lines
}

fn widest_banner_cost(widest: usize, banners: &PartBanners) -> usize {
    let candidate = |remaining: usize, template: &str| {
        let context = TemplateContext::new()
            .with("current_part", widest)
            .with("total_parts", widest)
            .with("remaining_parts", widest)
            .with("remaining_text", remaining_text(remaining));
        let text = context.render(template);
        cost(&[String::new(), BANNER_RULE.to_string(), BANNER_RULE.to_string()])
            + text.chars().count()
            + 1
    };
    [
        candidate(1, banners.part_end),
        candidate(widest, banners.part_end),
        candidate(1, banners.last_part_end),
    ]
    .into_iter()
    .max()
    .unwrap_or(0)
}
