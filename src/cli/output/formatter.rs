use colored::Colorize;

/// Width of banners and separators
pub const LINE_WIDTH: usize = 56;

/// Semantic styles mapped onto terminal colors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputStyle {
    /// Section headings and prompts
    Heading,
    Success,
    Failure,
    Warning,
    /// Values the user should notice (paths, ids, names)
    Highlight,
    /// Menu frame lines
    Frame,
    Plain,
}

/// Apply a style to text
pub fn paint(style: OutputStyle, text: &str) -> String {
    match style {
        OutputStyle::Heading => text.cyan().to_string(),
        OutputStyle::Success => text.green().to_string(),
        OutputStyle::Failure => text.red().to_string(),
        OutputStyle::Warning => text.yellow().bold().to_string(),
        OutputStyle::Highlight => text.yellow().to_string(),
        OutputStyle::Frame => text.blue().to_string(),
        OutputStyle::Plain => text.to_string(),
    }
}

/// A title centered in a row of `=`
pub fn banner(title: &str) -> String {
    let title = format!(" {} ", title.trim());
    let width = LINE_WIDTH.max(title.chars().count() + 2);
    let fill = width - title.chars().count();
    let left = fill / 2;
    format!("{}{}{}", "=".repeat(left), title, "=".repeat(fill - left))
}

pub fn separator() -> String {
    "-".repeat(LINE_WIDTH)
}

/// `- 'name': FOUND at <path>` or `- 'name': NOT FOUND. <hint>`
pub fn status_line(name: &str, found: Option<&std::path::Path>, hint: &str) -> String {
    let label = format!("- '{}':", name);
    match found {
        Some(path) => format!(
            "{:<18} {} at {}",
            label,
            paint(OutputStyle::Success, "FOUND"),
            paint(OutputStyle::Highlight, &path.display().to_string())
        ),
        None => format!(
            "{:<18} {}. {}",
            label,
            paint(OutputStyle::Failure, "NOT FOUND"),
            hint
        ),
    }
}
