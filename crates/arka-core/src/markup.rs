use pulldown_cmark::{html, Options, Parser};

/// Extensions enabled for assistant replies
pub fn markdown_options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    options
}

/// Render a Markdown reply to HTML
pub fn markdown_to_html(input: &str) -> String {
    let parser = Parser::new_ext(input, markdown_options());
    let mut output = String::new();
    html::push_html(&mut output, parser);
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bold_renders_strong() {
        let html = markdown_to_html("**bold**");
        assert!(html.contains("<strong>bold</strong>"));
        assert!(!html.contains("**"));
    }

    #[test]
    fn test_list_and_heading() {
        let html = markdown_to_html("# Title\n\n- one\n- two\n");
        assert!(html.contains("<h1>Title</h1>"));
        assert!(html.contains("<li>one</li>"));
        assert!(html.contains("<li>two</li>"));
    }

    #[test]
    fn test_strikethrough_enabled() {
        let html = markdown_to_html("~~gone~~");
        assert!(html.contains("<del>gone</del>"));
    }

    #[test]
    fn test_table_enabled() {
        let html = markdown_to_html("| a | b |\n|---|---|\n| 1 | 2 |\n");
        assert!(html.contains("<table>"));
        assert!(html.contains("<td>1</td>"));
    }

    #[test]
    fn test_html_special_chars_escaped_in_text() {
        let html = markdown_to_html("1 < 2 & 3");
        assert!(html.contains("1 &lt; 2 &amp; 3"));
    }
}
