//! Note markup to HTML
//!
//! The markup is line oriented and loosely Markdown flavoured:
//!
//! - `# ` to `###### ` at the start of a line open a heading
//! - `> ` quotes, `- ` bullets and `. ` numbered items
//! - three backticks on their own line fence a code block
//! - `` `code` `` inline, `---` a horizontal rule
//! - `{href label}` links; `{href}` uses the href as label
//!
//! Paragraphs are not wrapped; newlines survive into the output. Text is
//! copied without escaping, so notes may carry raw HTML.
//!
//! Parsing never fails. Blocks still open at the end of the input are
//! closed, and an unterminated link is emitted as the literal text.

/// Open element on the parser stack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Block {
    Heading(usize),
    Blockquote,
    UList,
    OList,
    Code,
    InlineCode,
    /// `start` indexes the first character after `{`
    Link { start: usize },
}

const MAX_HEADING_LEVEL: usize = 6;

/// Render a note body to HTML
pub fn parse_document(document: &str) -> String {
    Scanner::new(document).run()
}

struct Scanner {
    /// The body, prefixed with a newline so line-start tokens match `\n...`
    input: Vec<char>,
    pos: usize,
    out: String,
    stack: Vec<Block>,
    /// Byte offsets in `out` where a newline is dropped at the end
    suppress: Vec<usize>,
    /// Offset in `out` of the first line-start block tag
    first_block: Option<usize>,
}

impl Scanner {
    fn new(document: &str) -> Self {
        let mut input = Vec::with_capacity(document.len() + 1);
        input.push('\n');
        input.extend(document.chars());

        Self {
            input,
            pos: 0,
            out: String::with_capacity(document.len() * 2),
            stack: Vec::new(),
            suppress: Vec::new(),
            first_block: None,
        }
    }

    fn looking_at(&self, token: &str) -> bool {
        let mut index = self.pos;
        for expected in token.chars() {
            match self.input.get(index) {
                Some(actual) if *actual == expected => index += 1,
                _ => return false,
            }
        }
        true
    }

    fn top(&self) -> Option<Block> {
        self.stack.last().copied()
    }

    fn run(mut self) -> String {
        while self.pos < self.input.len() {
            self.step();
            self.pos += 1;
        }
        self.flush();
        self.finish()
    }

    /// Handle the character at `pos`; may advance `pos` past a token
    fn step(&mut self) {
        let current = self.input[self.pos];

        if current == '\n' && self.end_of_line() {
            return;
        }

        if let Some(Block::Link { .. }) = self.top() {
            if current == '}' {
                self.close_link();
            }
            return;
        }

        if self.looking_at("\n```") && self.top() != Some(Block::InlineCode) {
            self.toggle_fence();
            return;
        }

        match self.top() {
            Some(Block::Code) => {
                if current != '\n' {
                    self.out.push(current);
                }
                return;
            }
            Some(Block::InlineCode) => {
                if current == '`' {
                    self.stack.pop();
                    self.out.push_str("</code>");
                } else if current != '\n' {
                    self.out.push(current);
                }
                return;
            }
            _ => {}
        }

        match current {
            '`' => {
                self.stack.push(Block::InlineCode);
                self.out.push_str("<code>");
            }
            '{' => self.stack.push(Block::Link {
                start: self.pos + 1,
            }),
            '\n' => self.line_start(),
            _ => self.out.push(current),
        }
    }

    /// Close or continue the block on top of the stack at a newline
    ///
    /// Returns true when the newline was fully consumed.
    fn end_of_line(&mut self) -> bool {
        match self.top() {
            Some(Block::Heading(level)) => {
                self.stack.pop();
                self.out.push_str(&format!("</h{}>\n", level));
            }
            Some(Block::Blockquote) => {
                if self.looking_at("\n> ") {
                    self.out.push('\n');
                    self.pos += 2;
                    return true;
                }
                self.stack.pop();
                self.out.push_str("</blockquote>\n");
            }
            Some(Block::UList) => {
                if self.looking_at("\n- ") {
                    self.out.push_str("</li><li>");
                    self.pos += 2;
                    return true;
                }
                self.stack.pop();
                self.out.push_str("</li></ul>\n");
            }
            Some(Block::OList) => {
                if self.looking_at("\n. ") {
                    self.out.push_str("</li><li>");
                    self.pos += 2;
                    return true;
                }
                self.stack.pop();
                self.out.push_str("</li></ol>\n");
            }
            Some(Block::Link { .. }) => {}
            Some(Block::Code) | Some(Block::InlineCode) | None => self.out.push('\n'),
        }
        false
    }

    /// Line-start tokens, tried after the newline itself was emitted
    fn line_start(&mut self) {
        let offset = self.out.len();
        let opened = self.open_line_block();
        if opened && self.first_block.is_none() {
            self.first_block = Some(offset);
        }
    }

    fn open_line_block(&mut self) -> bool {
        if self.looking_at("\n#") {
            let hashes = self.input[self.pos + 1..]
                .iter()
                .take_while(|c| **c == '#')
                .count();
            if self.input.get(self.pos + 1 + hashes) == Some(&' ') {
                let level = hashes.min(MAX_HEADING_LEVEL);
                self.stack.push(Block::Heading(level));
                self.out.push_str(&format!("<h{}>", level));
                self.pos += hashes + 1;
                return true;
            }
        }

        if self.looking_at("\n> ") {
            self.stack.push(Block::Blockquote);
            self.out.push_str("<blockquote>");
            self.pos += 2;
        } else if self.looking_at("\n- ") {
            self.stack.push(Block::UList);
            self.out.push_str("<ul><li>");
            self.pos += 2;
        } else if self.looking_at("\n. ") {
            self.stack.push(Block::OList);
            self.out.push_str("<ol><li>");
            self.pos += 2;
        } else if self.looking_at("\n---") {
            self.out.push_str("<hr>");
            self.pos += 3;
        } else {
            return false;
        }
        true
    }

    fn toggle_fence(&mut self) {
        if self.top() == Some(Block::Code) {
            self.stack.pop();
            self.out.push_str("</pre>");
            self.suppress.push(self.out.len());
        } else {
            // A fence that reopens right after a closed one, with a single
            // blank line between, joins the two blocks.
            if let Some(&marker) = self.suppress.last() {
                if self.out.len() == marker + 2 && &self.out[marker..] == "\n\n" {
                    self.out.truncate(marker);
                }
            }
            if self.first_block.is_none() {
                self.first_block = Some(self.out.len());
            }
            self.stack.push(Block::Code);
            self.out.push_str("<pre>");
        }
        self.pos += 3;
    }

    fn close_link(&mut self) {
        let Some(Block::Link { start }) = self.stack.pop() else {
            return;
        };
        let text: String = self.input[start..self.pos].iter().collect();
        let (href, label) = text
            .split_once(' ')
            .unwrap_or((text.as_str(), text.as_str()));
        self.out
            .push_str(&format!("<a href=\"{}\">{}</a>", href, label));
    }

    /// Close whatever is still open at the end of the input
    fn flush(&mut self) {
        while let Some(block) = self.stack.pop() {
            match block {
                Block::Heading(level) => self.out.push_str(&format!("</h{}>", level)),
                Block::Blockquote => self.out.push_str("</blockquote>"),
                Block::UList => self.out.push_str("</li></ul>"),
                Block::OList => self.out.push_str("</li></ol>"),
                Block::Code => self.out.push_str("</pre>"),
                Block::InlineCode => self.out.push_str("</code>"),
                Block::Link { start } => {
                    self.out.push('{');
                    self.out.extend(self.input[start..].iter());
                }
            }
        }
    }

    /// Apply newline suppression and drop the synthetic leading newline
    ///
    /// One blank line in front of a leading block tag goes too, so a body
    /// opening with `\n# Title` starts at `<h1>`. Blank lines before plain
    /// text are kept.
    fn finish(self) -> String {
        let leading = match self.first_block {
            Some(offset) if offset >= 2 && self.out[..offset].bytes().all(|b| b == b'\n') => 2,
            _ if self.out.starts_with('\n') => 1,
            _ => 0,
        };

        let mut html = String::with_capacity(self.out.len());
        for (offset, c) in self.out.char_indices() {
            if offset < leading || (c == '\n' && self.suppress.contains(&offset)) {
                continue;
            }
            html.push(c);
        }
        html
    }
}
