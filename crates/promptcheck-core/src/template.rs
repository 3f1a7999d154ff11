//! Prompt templates and hydration.
//!
//! Placeholders are `{name}` markers where `name` is an identifier. Hydration
//! locates every marker in a single pass over the original template text and
//! splices in the bound value verbatim; substituted text is never scanned
//! again, so values containing braces or marker-like text come through
//! unchanged and the result does not depend on binding order.

use crate::errors::EvalError;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Placeholder name to literal value.
pub type Bindings = BTreeMap<String, String>;

fn placeholder_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("placeholder pattern is valid")
    })
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HydrationMode {
    /// Unbound placeholders are left in place.
    #[default]
    Literal,
    /// Every placeholder in the template must have a binding.
    Strict,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    path: Option<PathBuf>,
    text: String,
}

impl Template {
    pub fn load(path: &Path) -> Result<Self, EvalError> {
        let text = std::fs::read_to_string(path).map_err(|e| EvalError::io(path, e))?;
        tracing::debug!(path = %path.display(), bytes = text.len(), "loaded template");
        Ok(Self {
            path: Some(path.to_path_buf()),
            text,
        })
    }

    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            path: None,
            text: text.into(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Distinct placeholder names in order of first appearance.
    pub fn placeholders(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for caps in placeholder_re().captures_iter(&self.text) {
            let name = &caps[1];
            if !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }
        names
    }

    pub fn hydrate(&self, bindings: &Bindings, mode: HydrationMode) -> Result<String, EvalError> {
        let unbound: Vec<String> = self
            .placeholders()
            .into_iter()
            .filter(|name| !bindings.contains_key(name))
            .collect();

        if let Some(first) = unbound.first() {
            match mode {
                HydrationMode::Strict => {
                    return Err(EvalError::TemplateBinding {
                        name: first.clone(),
                    })
                }
                HydrationMode::Literal => {
                    tracing::debug!(?unbound, "leaving unbound placeholders in place");
                }
            }
        }

        let out = placeholder_re().replace_all(&self.text, |caps: &Captures<'_>| {
            match bindings.get(&caps[1]) {
                Some(value) => value.clone(),
                None => caps[0].to_string(),
            }
        });
        Ok(out.into_owned())
    }
}

/// Bindings for the generation template. `article` and `article_text` alias `input`.
pub fn generation_bindings(input: &str) -> Bindings {
    ["input", "article", "article_text"]
        .into_iter()
        .map(|k| (k.to_string(), input.to_string()))
        .collect()
}

/// Bindings for the evaluation (grading) template.
pub fn evaluation_bindings(input: &str, ideal_output: &str, output: &str) -> Bindings {
    let mut b = Bindings::new();
    b.insert("input".into(), input.into());
    b.insert("ideal_output".into(), ideal_output.into());
    b.insert("output".into(), output.into());
    b
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bind(pairs: &[(&str, &str)]) -> Bindings {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn replaces_each_marker_once() {
        let t = Template::from_text("Summarize:\n{article}\n---\n{article}");
        let out = t
            .hydrate(&generation_bindings("The treaty."), HydrationMode::Literal)
            .unwrap();
        assert_eq!(out, "Summarize:\nThe treaty.\n---\nThe treaty.");
    }

    #[test]
    fn substituted_values_are_not_rescanned() {
        let t = Template::from_text("A={input} B={output}");
        let out = t
            .hydrate(
                &bind(&[("input", "{output}"), ("output", "{input}")]),
                HydrationMode::Literal,
            )
            .unwrap();
        assert_eq!(out, "A={output} B={input}");
    }

    #[test]
    fn result_is_independent_of_binding_order() {
        let t = Template::from_text("{input}|{ideal_output}|{output}");
        let forward = evaluation_bindings("in {x}", "ideal", "out");
        let mut reversed = Bindings::new();
        for (k, v) in forward.iter().rev() {
            reversed.insert(k.clone(), v.clone());
        }
        let expected = "in {x}|ideal|out";
        assert_eq!(t.hydrate(&forward, HydrationMode::Literal).unwrap(), expected);
        assert_eq!(t.hydrate(&reversed, HydrationMode::Literal).unwrap(), expected);
    }

    #[test]
    fn braces_in_values_are_inserted_verbatim() {
        let t = Template::from_text("Article: {article_text}");
        let article = r#"code: fn main() { println!("{}", x); } and {input}"#;
        let out = t
            .hydrate(&generation_bindings(article), HydrationMode::Literal)
            .unwrap();
        assert_eq!(out, format!("Article: {}", article));
    }

    #[test]
    fn unbound_placeholders_stay_in_literal_mode() {
        let t = Template::from_text("{input} then {missing} and {\"json\": 1}");
        let out = t
            .hydrate(&bind(&[("input", "x")]), HydrationMode::Literal)
            .unwrap();
        assert_eq!(out, "x then {missing} and {\"json\": 1}");
    }

    #[test]
    fn strict_mode_reports_first_unbound_placeholder() {
        let t = Template::from_text("{input} {missing} {other}");
        let err = t
            .hydrate(&bind(&[("input", "x")]), HydrationMode::Strict)
            .unwrap_err();
        match err {
            EvalError::TemplateBinding { name } => assert_eq!(name, "missing"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn strict_mode_ignores_braces_inside_values() {
        let t = Template::from_text("{input}");
        let out = t
            .hydrate(&bind(&[("input", "{unbound}")]), HydrationMode::Strict)
            .unwrap();
        assert_eq!(out, "{unbound}");
    }

    #[test]
    fn placeholders_listed_once_in_order() {
        let t = Template::from_text("{output} {input} {output} {ideal_output}");
        assert_eq!(t.placeholders(), vec!["output", "input", "ideal_output"]);
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.txt");
        let err = Template::load(&path).unwrap_err();
        assert!(matches!(err, EvalError::MissingFile { .. }));
        assert!(err.to_string().contains("nope.txt"));
    }

    #[test]
    fn load_reads_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prompt.txt");
        std::fs::write(&path, "Summarize {article}").unwrap();
        let t = Template::load(&path).unwrap();
        assert_eq!(t.text(), "Summarize {article}");
        assert_eq!(t.path(), Some(path.as_path()));
    }
}
