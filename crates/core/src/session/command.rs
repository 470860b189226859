//! Ordered argument tokens for the next invocation.

/// Accumulates argument tokens in the order they are added.
///
/// Tokens are not validated. A token may hold several words (`"-i in.avi"`)
/// and values containing spaces are expected to arrive already single-quoted.
/// The caller appends the `-i <input>` token first and the output file last.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandAssembler {
    tokens: Vec<String>,
}

impl CommandAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a token to the end of the pending command.
    pub fn append(&mut self, token: impl Into<String>) -> &mut Self {
        self.tokens.push(token.into());
        self
    }

    /// Adds several tokens, keeping their order.
    pub fn extend<I, S>(&mut self, tokens: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tokens.extend(tokens.into_iter().map(Into::into));
        self
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Renders `"<executable> <token_1> ... <token_n>"`, joined by single
    /// spaces. With no tokens this is the executable alone.
    pub fn render(&self, executable: &str) -> String {
        let mut rendered = String::from(executable);
        for token in &self.tokens {
            rendered.push(' ');
            rendered.push_str(token);
        }
        rendered
    }

    /// Splits the tokens into process arguments, honouring quoting.
    pub fn arguments(&self) -> Result<Vec<String>, shell_words::ParseError> {
        shell_words::split(&self.tokens.join(" "))
    }

    pub fn clear(&mut self) {
        self.tokens.clear();
    }
}
