use anyhow::Result;
use log::{debug, warn};
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// Named values substituted into a [`PromptTemplate`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptArguments {
    values: BTreeMap<String, String>,
}

impl PromptArguments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.values.insert(name.into(), value.into())
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for PromptArguments
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut args = Self::new();
        for (k, v) in iter {
            args.insert(k, v);
        }
        args
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Text(String),
    Variable(String),
}

/// A prompt blueprint using `{{$name}}` placeholders.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    source: String,
    segments: Vec<Segment>,
}

fn variable_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^\$([A-Za-z0-9_]+)$").expect("variable pattern is a valid regex")
    })
}

impl PromptTemplate {
    pub fn parse(source: impl Into<String>) -> Result<Self> {
        let source = source.into();
        let mut segments = Vec::new();
        let mut rest = source.as_str();

        while let Some(open) = rest.find("{{") {
            let after_open = &rest[open + 2..];
            let Some(close) = after_open.find("}}") else {
                // Unterminated block stays literal
                break;
            };

            if open > 0 {
                push_text(&mut segments, &rest[..open]);
            }

            let block = after_open[..close].trim();
            if block.is_empty() {
                push_text(&mut segments, &rest[open..open + 2 + close + 2]);
            } else if let Some(caps) = variable_pattern().captures(block) {
                segments.push(Segment::Variable(caps[1].to_string()));
            } else {
                anyhow::bail!("Unsupported template block `{{{{{block}}}}}`: only `{{{{$name}}}}` variables are allowed");
            }

            rest = &after_open[close + 2..];
        }

        if !rest.is_empty() {
            push_text(&mut segments, rest);
        }

        debug!(
            "Parsed prompt template with {} variable(s)",
            segments
                .iter()
                .filter(|s| matches!(s, Segment::Variable(_)))
                .count()
        );

        Ok(Self { source, segments })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Variable names in order of first appearance.
    pub fn variables(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for segment in &self.segments {
            if let Segment::Variable(name) = segment {
                if !names.contains(&name.as_str()) {
                    names.push(name);
                }
            }
        }
        names
    }

    /// Substitutes arguments. Unknown variables render as empty text.
    pub fn render(&self, args: &PromptArguments) -> Result<String> {
        let mut rendered = String::with_capacity(self.source.len());

        for segment in &self.segments {
            match segment {
                Segment::Text(text) => rendered.push_str(text),
                Segment::Variable(name) => match args.get(name) {
                    Some(value) => rendered.push_str(value),
                    None => warn!("Variable `${name}` not found in prompt arguments"),
                },
            }
        }

        Ok(rendered)
    }
}

fn push_text(segments: &mut Vec<Segment>, text: &str) {
    if let Some(Segment::Text(last)) = segments.last_mut() {
        last.push_str(text);
    } else {
        segments.push(Segment::Text(text.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::defaults::DEFAULT_TEMPLATE;

    #[test]
    fn renders_default_template_with_theme() {
        let template = PromptTemplate::parse(DEFAULT_TEMPLATE).unwrap();
        let args = PromptArguments::new().with("input", "AI驱动的无限流世界");

        let rendered = template.render(&args).unwrap();

        assert!(rendered.contains("AI驱动的无限流世界"));
        assert!(rendered.contains("你是一个充满激情的游戏开发者，你的项目DreamWorld刚刚启动。"));
        assert!(rendered.contains("请为你的项目写一句充满力量和梦想的开场白。"));
        assert!(rendered.contains("主题是：AI驱动的无限流世界\n"));
        assert!(!rendered.contains("{{"));
    }

    #[test]
    fn tolerates_whitespace_inside_braces() {
        let template = PromptTemplate::parse("Hi {{ $name }}, bye {{$name}}").unwrap();
        let args: PromptArguments = [("name", "Rin")].into_iter().collect();

        assert_eq!(template.render(&args).unwrap(), "Hi Rin, bye Rin");
        assert_eq!(template.variables(), vec!["name"]);
    }

    #[test]
    fn missing_variable_renders_empty() {
        let template = PromptTemplate::parse("[{{$absent}}]").unwrap();
        assert_eq!(template.render(&PromptArguments::new()).unwrap(), "[]");
    }

    #[test]
    fn rejects_function_call_blocks() {
        let err = PromptTemplate::parse("{{time.now}}").unwrap_err();
        assert!(err.to_string().contains("time.now"));
    }

    #[test]
    fn keeps_unterminated_and_empty_blocks_literal() {
        let template = PromptTemplate::parse("a {{}} b {{$x").unwrap();
        let rendered = template
            .render(&PromptArguments::new().with("x", "ignored"))
            .unwrap();

        assert_eq!(rendered, "a {{}} b {{$x");
        assert!(template.variables().is_empty());
    }
}
