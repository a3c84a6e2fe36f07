//! Output filename patterns with page-number placeholders.
//!
//! - `{n}`: page number starting at 0
//! - `{n<base>}`: page number starting at `<base>`, e.g. `{n1}`
//! - `{n!}` / `{n1!}`: always emit the number, even for a single page
//!
//! Without `!` the number is left out when only one page is produced.
//! Any other `{...}` text is kept literally.

use anyhow::bail;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Fragment {
    Text(String),
    Number { base: usize, always: bool },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputName {
    fragments: Vec<Fragment>,
}

impl OutputName {
    pub fn parse(pattern: &str) -> Self {
        let mut fragments = Vec::new();
        let mut text = String::new();
        let mut rest = pattern;
        while let Some(open) = rest.find('{') {
            let Some(len) = rest[open..].find('}') else {
                break;
            };
            let inner = &rest[open + 1..open + len];
            text.push_str(&rest[..open]);
            match parse_number(inner) {
                Some(number) => {
                    if !text.is_empty() {
                        fragments.push(Fragment::Text(std::mem::take(&mut text)));
                    }
                    fragments.push(number);
                }
                None => text.push_str(&rest[open..=open + len]),
            }
            rest = &rest[open + len + 1..];
        }
        text.push_str(rest);
        if !text.is_empty() {
            fragments.push(Fragment::Text(text));
        }
        Self { fragments }
    }

    /// True if the pattern carries at least one page-number placeholder.
    pub fn is_numbered(&self) -> bool {
        self.fragments
            .iter()
            .any(|f| matches!(f, Fragment::Number { .. }))
    }

    /// Name of page `index` out of `total` pages.
    pub fn render(&self, index: usize, total: usize) -> anyhow::Result<String> {
        if index >= total {
            bail!("requested name for page {index} but only {total} page(s) exist");
        }
        let mut out = String::new();
        for fragment in &self.fragments {
            match fragment {
                Fragment::Text(t) => out.push_str(t),
                Fragment::Number { base, always } => {
                    if *always || total != 1 {
                        out.push_str(&(index + base).to_string());
                    }
                }
            }
        }
        Ok(out)
    }

    /// Names for all `total` pages. A pattern without a placeholder cannot
    /// name more than one page.
    pub fn render_all(&self, total: usize) -> anyhow::Result<Vec<String>> {
        if total > 1 && !self.is_numbered() {
            bail!(
                "{total} pages were produced but the output name has no {{n}} placeholder: {}",
                self.render(0, 1)?
            );
        }
        (0..total).map(|i| self.render(i, total)).collect()
    }
}

fn parse_number(inner: &str) -> Option<Fragment> {
    let body = inner.strip_prefix('n')?;
    let (digits, always) = match body.strip_suffix('!') {
        Some(d) => (d, true),
        None => (body, false),
    };
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let base = if digits.is_empty() {
        0
    } else {
        digits.parse().ok()?
    };
    Some(Fragment::Number { base, always })
}
