//! Title/content collection when not given on the command line

use std::io::{self, BufRead, Read, Write};

const TITLE_PROMPT: &str = "Enter blog title: ";
const CONTENT_PROMPT: &str =
    "Enter blog content (finish with Ctrl+D on mac/Linux, Ctrl+Z then Enter on Windows):";

/// Title and content for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inputs {
    pub title: String,
    pub content: String,
}

impl Inputs {
    /// Name of the first empty field, if any
    pub fn missing_field(&self) -> Option<&'static str> {
        if self.title.is_empty() {
            Some("title")
        } else if self.content.is_empty() {
            Some("content")
        } else {
            None
        }
    }
}

/// Fill in whatever the arguments left out, prompting on `prompt_out`
///
/// The title is one line; the content runs until end of input.
pub fn collect<R: BufRead, W: Write>(
    title: Option<String>,
    content: Option<String>,
    mut input: R,
    mut prompt_out: W,
) -> io::Result<Inputs> {
    let title = match title {
        Some(t) => t.trim().to_string(),
        None => {
            write!(prompt_out, "{}", TITLE_PROMPT)?;
            prompt_out.flush()?;
            let mut line = String::new();
            input.read_line(&mut line)?;
            line.trim().to_string()
        }
    };

    let content = match content {
        Some(c) => c.trim().to_string(),
        None => {
            writeln!(prompt_out, "{}", CONTENT_PROMPT)?;
            prompt_out.flush()?;
            let mut body = String::new();
            input.read_to_string(&mut body)?;
            body.trim().to_string()
        }
    };

    Ok(Inputs { title, content })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_both_from_args_reads_nothing() {
        let mut prompts = Vec::new();
        let inputs = collect(
            Some(" T ".to_string()),
            Some("C\n".to_string()),
            Cursor::new("unused"),
            &mut prompts,
        )
        .unwrap();
        assert_eq!(inputs.title, "T");
        assert_eq!(inputs.content, "C");
        assert!(prompts.is_empty());
    }

    #[test]
    fn test_interactive_title_and_multiline_content() {
        let mut prompts = Vec::new();
        let stdin = Cursor::new("My Title\nfirst line\nsecond line\n\n");
        let inputs = collect(None, None, stdin, &mut prompts).unwrap();

        assert_eq!(inputs.title, "My Title");
        assert_eq!(inputs.content, "first line\nsecond line");

        let shown = String::from_utf8(prompts).unwrap();
        assert!(shown.starts_with(TITLE_PROMPT));
        assert!(shown.contains("Ctrl+D"));
    }

    #[test]
    fn test_content_only_interactive() {
        let mut prompts = Vec::new();
        let inputs = collect(
            Some("Given".to_string()),
            None,
            Cursor::new("body text"),
            &mut prompts,
        )
        .unwrap();
        assert_eq!(inputs.title, "Given");
        assert_eq!(inputs.content, "body text");
        assert!(!String::from_utf8(prompts).unwrap().contains(TITLE_PROMPT));
    }

    #[test]
    fn test_missing_field() {
        let inputs = collect(None, None, Cursor::new(""), Vec::new()).unwrap();
        assert_eq!(inputs.missing_field(), Some("title"));

        let inputs = Inputs {
            title: "t".to_string(),
            content: String::new(),
        };
        assert_eq!(inputs.missing_field(), Some("content"));
    }
}
