use std::fmt::Write;
use std::io;
use std::mem;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::TemplateError;
use crate::indicator::{IndicatorState, Render};

const DEFAULT_BAR_WIDTH: usize = 40;
const FILLED: char = '█';
const EMPTY: char = '░';

/// Matches `}}`, `{{` and `{key}`.
static KEY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\}\})|\{(\{|[^}]+\})").unwrap());

/// A format-string renderer for indicators.
///
/// Supported keys:
///
/// * `{pos}`: the current position
/// * `{target}`: the target position
/// * `{percent}`: completion in whole percent
/// * `{bar}` / `{bar:N}`: a bar `N` columns wide (40 by default)
///
/// Literal braces are written as `{{` and `}}`.
///
/// ```rust
/// use pollbar::{IndicatorState, Template};
///
/// let template = Template::new("[{bar:10}] {pos}/{target}").unwrap();
/// let state = IndicatorState { pos: 3, target: 10 };
/// assert_eq!(template.format(&state), "[███░░░░░░░] 3/10");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Template {
    parts: Vec<Part>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Part {
    Literal(String),
    Pos,
    Target,
    Percent,
    Bar(usize),
}

impl Template {
    /// Parses a template, rejecting unknown keys and unbalanced braces.
    pub fn new(template: &str) -> Result<Template, TemplateError> {
        let mut parts = Vec::new();
        let mut literal = String::new();
        let mut last = 0;

        for caps in KEY_RE.captures_iter(template) {
            let Some(whole) = caps.get(0) else { continue };
            push_literal(&mut literal, template, last, whole.start())?;
            last = whole.end();

            if caps.get(1).is_some() {
                literal.push('}');
                continue;
            }

            let key = &caps[2];
            if key == "{" {
                literal.push('{');
                continue;
            }

            if !literal.is_empty() {
                parts.push(Part::Literal(mem::take(&mut literal)));
            }
            parts.push(Part::from_key(&key[..key.len() - 1])?);
        }
        push_literal(&mut literal, template, last, template.len())?;

        if !literal.is_empty() {
            parts.push(Part::Literal(literal));
        }
        Ok(Template { parts })
    }

    /// Formats the given state.
    pub fn format(&self, state: &IndicatorState) -> String {
        let mut out = String::new();
        for part in &self.parts {
            // writing to a String cannot fail
            let _ = match part {
                Part::Literal(s) => out.write_str(s),
                Part::Pos => write!(out, "{}", state.pos),
                Part::Target => write!(out, "{}", state.target),
                Part::Percent => write!(out, "{:.0}", state.fraction() * 100.0),
                Part::Bar(width) => {
                    let fill = ((state.fraction() * *width as f32) as usize).min(*width);
                    out.extend(std::iter::repeat(FILLED).take(fill));
                    out.extend(std::iter::repeat(EMPTY).take(width - fill));
                    Ok(())
                }
            };
        }
        out
    }
}

impl Default for Template {
    fn default() -> Self {
        Template {
            parts: vec![
                Part::Bar(DEFAULT_BAR_WIDTH),
                Part::Literal(" ".into()),
                Part::Pos,
                Part::Literal("/".into()),
                Part::Target,
            ],
        }
    }
}

impl Render for Template {
    fn render(&mut self, state: &IndicatorState) -> io::Result<String> {
        Ok(self.format(state))
    }
}

/// Appends the text between two matches; any brace left there is unbalanced.
fn push_literal(
    literal: &mut String,
    template: &str,
    start: usize,
    end: usize,
) -> Result<(), TemplateError> {
    let text = &template[start..end];
    if let Some(idx) = text.find(|c: char| c == '{' || c == '}') {
        return Err(TemplateError::UnbalancedBrace(start + idx));
    }
    literal.push_str(text);
    Ok(())
}

impl Part {
    fn from_key(key: &str) -> Result<Part, TemplateError> {
        let (name, width) = match key.split_once(':') {
            Some((name, width)) => (name, Some(width)),
            None => (key, None),
        };

        match (name, width) {
            ("pos", None) => Ok(Part::Pos),
            ("target", None) => Ok(Part::Target),
            ("percent", None) => Ok(Part::Percent),
            ("bar", None) => Ok(Part::Bar(DEFAULT_BAR_WIDTH)),
            ("bar", Some(width)) => match width.parse::<usize>() {
                Ok(n) if n > 0 => Ok(Part::Bar(n)),
                _ => Err(TemplateError::InvalidWidth {
                    key: name.into(),
                    width: width.into(),
                }),
            },
            (_, Some(width)) if matches!(name, "pos" | "target" | "percent") => {
                Err(TemplateError::InvalidWidth {
                    key: name.into(),
                    width: width.into(),
                })
            }
            _ => Err(TemplateError::UnknownKey(key.into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(pos: u64, target: u64) -> IndicatorState {
        IndicatorState { pos, target }
    }

    #[test]
    fn formats_all_keys() {
        let template = Template::new("{pos}/{target} [{bar:10}] {percent}%").unwrap();
        assert_eq!(template.format(&state(5, 10)), "5/10 [█████░░░░░] 50%");
        assert_eq!(template.format(&state(0, 10)), "0/10 [░░░░░░░░░░] 0%");
        assert_eq!(template.format(&state(12, 10)), "12/10 [██████████] 100%");
    }

    #[test]
    fn default_template() {
        let line = Template::default().format(&state(1, 4));
        assert_eq!(line, format!("{}{} 1/4", "█".repeat(10), "░".repeat(30)));
    }

    #[test]
    fn percent_is_rounded() {
        let template = Template::new("{percent}").unwrap();
        for pos in 0..=100 {
            assert_eq!(template.format(&state(pos, 100)), pos.to_string());
        }
        assert_eq!(template.format(&state(2, 3)), "67");
        assert_eq!(template.format(&state(1, 0)), "100");
    }

    #[test]
    fn escaped_braces() {
        let template = Template::new("{{{pos}}}").unwrap();
        assert_eq!(template.format(&state(7, 9)), "{7}");
    }

    #[test]
    fn rejects_bad_templates() {
        assert_eq!(
            Template::new("{eta}"),
            Err(TemplateError::UnknownKey("eta".into()))
        );
        assert_eq!(
            Template::new("{bar:wide}"),
            Err(TemplateError::InvalidWidth {
                key: "bar".into(),
                width: "wide".into(),
            })
        );
        assert_eq!(
            Template::new("{pos:3}"),
            Err(TemplateError::InvalidWidth {
                key: "pos".into(),
                width: "3".into(),
            })
        );
        assert_eq!(
            Template::new("{bar:0}"),
            Err(TemplateError::InvalidWidth {
                key: "bar".into(),
                width: "0".into(),
            })
        );
        assert_eq!(
            Template::new("ab {pos"),
            Err(TemplateError::UnbalancedBrace(3))
        );
        assert_eq!(Template::new("a}b"), Err(TemplateError::UnbalancedBrace(1)));
        assert_eq!(Template::new("x {}"), Err(TemplateError::UnbalancedBrace(2)));
        assert_eq!(
            Template::new("{pos} }"),
            Err(TemplateError::UnbalancedBrace(6))
        );
    }

    #[test]
    fn renders_through_indicator() {
        let ind = crate::Indicator::with_template(4, Template::new("{percent}%").unwrap());
        ind.inc(3);
        assert_eq!(ind.render().unwrap(), "75%");
    }
}
