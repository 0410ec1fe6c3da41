const INDENT: &str = "    ";

/// Line-oriented text buffer with indentation and collapsed blank lines.
#[derive(Debug, Default)]
pub(crate) struct PumlWriter {
    out: String,
    depth: usize,
    pending_blank: bool,
}

impl PumlWriter {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn line(&mut self, text: impl AsRef<str>) {
        if self.pending_blank {
            self.out.push('\n');
            self.pending_blank = false;
        }
        for _ in 0..self.depth {
            self.out.push_str(INDENT);
        }
        self.out.push_str(text.as_ref());
        self.out.push('\n');
    }

    /// Requests a separating blank line before the next line. Repeated requests collapse
    /// and a blank line is never emitted at the start of the document.
    pub(crate) fn blank(&mut self) {
        if !self.out.is_empty() {
            self.pending_blank = true;
        }
    }

    pub(crate) fn indent(&mut self) {
        self.depth += 1;
    }

    pub(crate) fn dedent(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    pub(crate) fn finish(self) -> String {
        self.out
    }
}

/// PlantUML string literal.
pub(crate) fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for ch in value.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            _ => out.push(ch),
        }
    }
    out.push('"');
    out
}

/// A preprocessor procedure call such as `Container(alias, "label", $tags="x")`.
///
/// Missing positional arguments at the end are dropped; missing ones in the middle are
/// written as `""` so later arguments keep their position.
#[derive(Debug, Clone)]
pub(crate) struct MacroCall {
    name: String,
    positional: Vec<Option<String>>,
    named: Vec<(&'static str, String)>,
}

impl MacroCall {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            positional: Vec::new(),
            named: Vec::new(),
        }
    }

    pub(crate) fn raw(mut self, value: impl Into<String>) -> Self {
        self.positional.push(Some(value.into()));
        self
    }

    pub(crate) fn quoted(mut self, value: &str) -> Self {
        self.positional.push(Some(quote(value)));
        self
    }

    /// Empty strings count as missing.
    pub(crate) fn opt_quoted(mut self, value: Option<&str>) -> Self {
        self.positional
            .push(value.filter(|v| !v.is_empty()).map(quote));
        self
    }

    pub(crate) fn named_quoted(mut self, name: &'static str, value: Option<&str>) -> Self {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            self.named.push((name, quote(value)));
        }
        self
    }

    pub(crate) fn named_raw(mut self, name: &'static str, value: Option<&str>) -> Self {
        if let Some(value) = value {
            self.named.push((name, value.to_string()));
        }
        self
    }

    pub(crate) fn render(&self) -> String {
        let used = self
            .positional
            .iter()
            .rposition(Option::is_some)
            .map_or(0, |idx| idx + 1);
        let mut args: Vec<String> = self.positional[..used]
            .iter()
            .map(|arg| arg.clone().unwrap_or_else(|| "\"\"".to_string()))
            .collect();
        args.extend(
            self.named
                .iter()
                .map(|(name, value)| format!("{name}={value}")),
        );
        format!("{}({})", self.name, args.join(", "))
    }
}
