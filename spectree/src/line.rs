//! Command line input: complete tokens plus the token under the cursor

/// Characters a backslash escapes inside double quotes, as in a POSIX shell.
const DOUBLE_QUOTE_ESCAPES: [char; 4] = ['"', '\\', '$', '`'];

/// The words typed so far, split into complete tokens and the in-progress partial.
///
/// The program name is not part of the line; the first token is resolved against the
/// root's subcommands and options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandLine {
    complete: Vec<String>,
    partial: String,
}

impl CommandLine {
    pub fn new(complete: Vec<String>, partial: impl Into<String>) -> Self {
        Self {
            complete,
            partial: partial.into(),
        }
    }

    /// Build from shell words. When `last_is_complete` is false the final token is the
    /// partial being typed; otherwise the partial is empty.
    pub fn from_tokens<I, S>(tokens: I, last_is_complete: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut complete: Vec<String> = tokens.into_iter().map(Into::into).collect();
        let partial = if last_is_complete {
            String::new()
        } else {
            complete.pop().unwrap_or_default()
        };
        Self { complete, partial }
    }

    /// Tokenize raw text up to the cursor.
    ///
    /// Words are separated by unquoted whitespace. Single quotes are literal. Inside
    /// double quotes a backslash only escapes `"`, `\`, `$` and `` ` ``; elsewhere it is
    /// kept. Outside quotes a backslash escapes the next character. Trailing unquoted whitespace means the last word is complete.
    pub fn parse(line: &str) -> Self {
        #[derive(Clone, Copy, PartialEq)]
        enum Quote {
            None,
            Single,
            Double,
        }

        let mut words = Vec::new();
        let mut current = String::new();
        let mut in_word = false;
        let mut quote = Quote::None;
        let mut chars = line.chars().peekable();

        while let Some(c) = chars.next() {
            match (quote, c) {
                (Quote::None, c) if c.is_whitespace() => {
                    if in_word {
                        words.push(std::mem::take(&mut current));
                        in_word = false;
                    }
                }
                (Quote::None, '\'') => {
                    quote = Quote::Single;
                    in_word = true;
                }
                (Quote::None, '"') => {
                    quote = Quote::Double;
                    in_word = true;
                }
                (Quote::None, '\\') => {
                    in_word = true;
                    if let Some(escaped) = chars.next() {
                        current.push(escaped);
                    }
                }
                // Inside double quotes only these characters are escapable
                (Quote::Double, '\\') => {
                    match chars.next_if(|next| DOUBLE_QUOTE_ESCAPES.contains(next)) {
                        Some(escaped) => current.push(escaped),
                        None => current.push('\\'),
                    }
                }
                (Quote::Single, '\'') | (Quote::Double, '"') => quote = Quote::None,
                (_, c) => {
                    in_word = true;
                    current.push(c);
                }
            }
        }

        let partial = if in_word { current } else { String::new() };
        Self {
            complete: words,
            partial,
        }
    }

    /// Tokens followed by whitespace.
    pub fn complete_tokens(&self) -> &[String] {
        &self.complete
    }

    /// The token under the cursor, possibly empty.
    pub fn partial(&self) -> &str {
        &self.partial
    }
}
