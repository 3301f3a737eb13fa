use console::style;
use pulldown_cmark::{html, Options, Parser};
use terminal_size::{terminal_size, Width};

use crate::{split_first_line, NoteRecord};

const DEFAULT_WIDTH: usize = 100;

/// Converts a note's content to HTML, leaving out its tag line.
pub fn render_html(content: &str) -> String {
    let (first_line, body) = split_first_line(content);
    let markdown = if first_line.starts_with('.') { body } else { content };

    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let mut output = String::new();
    html::push_html(&mut output, Parser::new_ext(markdown, options));
    output
}

pub fn terminal_width() -> usize {
    terminal_size()
        .map(|(Width(w), _)| w as usize)
        .unwrap_or(DEFAULT_WIDTH)
}

/// Cuts `text` to at most `width` characters, marking the cut with `…`.
pub fn clip(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let kept: String = text.chars().take(width.saturating_sub(1)).collect();
    format!("{}…", kept)
}

/// One listing line: modified date, title, word count and tags.
pub fn format_record_row(record: &NoteRecord, pinned: bool, width: usize) -> String {
    let tags = record
        .tags
        .iter()
        .map(|t| format!("#{}", t))
        .collect::<Vec<_>>()
        .join(" ");
    let marker = if pinned { "*" } else { " " };

    let plain = format!(
        "{} {} {} ({}w) {}",
        marker, record.modified, record.title, record.word_count, tags
    );
    if plain.chars().count() > width {
        return clip(&plain, width);
    }

    format!(
        "{} {} {} {} {}",
        style(marker).yellow().bold(),
        style(&record.modified).dim(),
        style(&record.title).bold(),
        style(format!("({}w)", record.word_count)).dim(),
        style(tags).cyan()
    )
}
