//! Ordered per-cell cleaning pipeline.
//!
//! A [`CellCleaner`] is built once per column from its [`ColumnConfig`]
//! (compiling find/replace rules up front) and then applied to every cell of
//! that column. Steps run in a fixed order, each gated by its own option:
//!
//! 1. trim
//! 2. quote / dash / non-breaking-space normalization
//! 3. case transform
//! 4. find/replace (simple or regex mode)
//! 5. reference-marker extraction
//! 6. strip non-alphanumerics
//! 7. auto-numeric coercion
//!
//! Nothing here fails: a regex rule that does not compile is skipped.

use std::{borrow::Cow, sync::LazyLock};

use log::debug;
use regex::{Regex, RegexBuilder};

use crate::{
    schema::{CaseTransform, ColumnConfig, FindReplaceMode, RegexRule, SimpleRule},
    transform::string_ops,
};

static BRACKET_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[[0-9A-Za-z_]+\]").expect("valid bracket marker pattern"));
static FOOTNOTE_GLYPHS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\u{2020}\u{2021}*]+").expect("valid footnote pattern"));

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CleanResult {
    pub value: String,
    pub refs: Option<String>,
}

#[derive(Debug, Clone)]
struct CompiledRegexRule {
    regex: Regex,
    replacement: String,
    global: bool,
}

#[derive(Debug, Clone)]
enum Replacements {
    Simple(Vec<SimpleRule>),
    Regex(Vec<CompiledRegexRule>),
}

#[derive(Debug, Clone)]
pub struct CellCleaner<'a> {
    config: &'a ColumnConfig,
    replacements: Replacements,
}

impl<'a> CellCleaner<'a> {
    pub fn new(config: &'a ColumnConfig) -> Self {
        let replacements = match config.find_replace.mode {
            FindReplaceMode::Simple => Replacements::Simple(
                config
                    .find_replace
                    .simple_rules
                    .iter()
                    .filter(|rule| !rule.find.is_empty())
                    .cloned()
                    .collect(),
            ),
            FindReplaceMode::Regex => Replacements::Regex(
                config
                    .find_replace
                    .regex_rules
                    .iter()
                    .filter_map(|rule| compile_regex_rule(&config.name, rule))
                    .collect(),
            ),
        };
        Self {
            config,
            replacements,
        }
    }

    pub fn config(&self) -> &ColumnConfig {
        self.config
    }

    pub fn clean(&self, raw: &str) -> CleanResult {
        let options = &self.config.cleaning;
        let mut value: Cow<'_, str> = Cow::Borrowed(raw);

        if options.trim_whitespace {
            value = reborrow(value, string_ops::trim);
        }
        if options.normalize_quotes_dashes {
            value = reborrow(value, normalize_quotes_and_dashes);
        }
        value = match options.case_transform {
            CaseTransform::None => value,
            CaseTransform::Lower => reborrow(value, string_ops::lowercase),
            CaseTransform::Upper => reborrow(value, string_ops::uppercase),
            CaseTransform::Title => reborrow(value, string_ops::title_case),
        };
        value = self.apply_replacements(value);

        let mut refs = None;
        if self.config.references.enabled {
            let (stripped, found) = extract_reference_markers(&value);
            refs = found;
            value = Cow::Owned(stripped);
        }
        if options.strip_non_alnum {
            value = reborrow(value, string_ops::strip_non_alphanumeric);
        }
        if options.auto_numeric {
            value = reborrow(value, clean_numeric_string);
        }

        CleanResult {
            value: value.into_owned(),
            refs,
        }
    }

    /// Cleaned value only.
    pub fn clean_value(&self, raw: &str) -> String {
        self.clean(raw).value
    }

    fn apply_replacements<'v>(&self, mut value: Cow<'v, str>) -> Cow<'v, str> {
        match &self.replacements {
            Replacements::Simple(rules) => {
                for rule in rules {
                    value = if rule.case_sensitive {
                        replace_case_sensitive(value, &rule.find, &rule.replacement)
                    } else {
                        Cow::Owned(replace_case_insensitive(&value, &rule.find, &rule.replacement))
                    };
                }
            }
            Replacements::Regex(rules) => {
                for rule in rules {
                    value = reborrow(value, |s| {
                        string_ops::regex_replace(s, &rule.regex, &rule.replacement, rule.global)
                    });
                }
            }
        }
        value
    }
}

/// Cleans a single cell without keeping the compiled cleaner around.
pub fn clean_cell(raw: &str, config: &ColumnConfig) -> CleanResult {
    CellCleaner::new(config).clean(raw)
}

/// Builds one cleaner per column, in column order.
pub fn cleaners_for(columns: &[ColumnConfig]) -> Vec<CellCleaner<'_>> {
    columns.iter().map(CellCleaner::new).collect()
}

fn reborrow<'v, F>(value: Cow<'v, str>, op: F) -> Cow<'v, str>
where
    F: for<'s> Fn(&'s str) -> Cow<'s, str>,
{
    match value {
        Cow::Borrowed(s) => op(s),
        Cow::Owned(s) => Cow::Owned(op(&s).into_owned()),
    }
}

fn compile_regex_rule(column: &str, rule: &RegexRule) -> Option<CompiledRegexRule> {
    if rule.pattern.is_empty() {
        return None;
    }
    let flags = rule.flags.as_deref();
    let has_flag = |flag: char| flags.is_some_and(|f| f.contains(flag));
    let compiled = RegexBuilder::new(&rule.pattern)
        .case_insensitive(has_flag('i'))
        .multi_line(has_flag('m'))
        .dot_matches_new_line(has_flag('s'))
        .build();
    match compiled {
        Ok(regex) => Some(CompiledRegexRule {
            regex,
            replacement: string_ops::expand_replacement(&rule.replacement).into_owned(),
            global: flags.is_none_or(|f| f.contains('g')),
        }),
        Err(err) => {
            debug!(
                "Skipping invalid regex rule '{}' for column '{column}': {err}",
                rule.pattern
            );
            None
        }
    }
}

fn normalize_quotes_and_dashes(input: &str) -> Cow<'_, str> {
    let needs_change = input.chars().any(|ch| {
        matches!(
            ch,
            '\u{2018}'
                | '\u{2019}'
                | '\u{201B}'
                | '\u{2032}'
                | '\u{201C}'
                | '\u{201D}'
                | '\u{201F}'
                | '\u{2033}'
                | '\u{2013}'
                | '\u{2014}'
                | '\u{2212}'
                | '\u{00A0}'
        )
    });
    if !needs_change {
        return Cow::Borrowed(input);
    }
    Cow::Owned(
        input
            .chars()
            .map(|ch| match ch {
                '\u{2018}' | '\u{2019}' | '\u{201B}' | '\u{2032}' => '\'',
                '\u{201C}' | '\u{201D}' | '\u{201F}' | '\u{2033}' => '"',
                '\u{2013}' | '\u{2014}' | '\u{2212}' => '-',
                '\u{00A0}' => ' ',
                other => other,
            })
            .collect(),
    )
}

fn replace_case_sensitive<'v>(value: Cow<'v, str>, find: &str, replacement: &str) -> Cow<'v, str> {
    if value.contains(find) {
        Cow::Owned(value.replace(find, replacement))
    } else {
        value
    }
}

/// Single left-to-right pass matching on a lower-cased view of `value`.
///
/// Matched spans are replaced; unmatched text is copied with its original case.
fn replace_case_insensitive(value: &str, find: &str, replacement: &str) -> String {
    let needle = find.to_lowercase();
    if needle.is_empty() {
        return value.to_string();
    }

    // `origin[i]` is the byte offset in `value` of the char that produced byte
    // `i` of `lowered`; the extra slot maps the end of `lowered` to `value.len()`.
    let mut lowered = String::with_capacity(value.len());
    let mut origin = Vec::with_capacity(value.len() + 1);
    for (offset, ch) in value.char_indices() {
        for lower in ch.to_lowercase() {
            for _ in 0..lower.len_utf8() {
                origin.push(offset);
            }
            lowered.push(lower);
        }
    }
    origin.push(value.len());

    let mut output = String::with_capacity(value.len());
    let mut copied_to = 0usize;
    let mut search_from = 0usize;
    while let Some(found) = lowered[search_from..].find(&needle) {
        let start = search_from + found;
        let end = start + needle.len();
        let original_start = origin[start];
        let original_end = origin[end];
        if original_start < copied_to {
            break;
        }
        output.push_str(&value[copied_to..original_start]);
        output.push_str(replacement);
        copied_to = original_end.max(original_start);
        search_from = end;
    }
    output.push_str(&value[copied_to..]);
    output
}

/// Removes `[3]`/`[a]` markers and dagger/asterisk runs; returns the
/// stripped text and the collected markers joined by spaces.
fn extract_reference_markers(input: &str) -> (String, Option<String>) {
    let mut refs: Vec<String> = Vec::new();
    let without_brackets = BRACKET_MARKER.replace_all(input, |caps: &regex::Captures<'_>| {
        refs.push(caps[0].to_string());
        String::new()
    });
    let stripped = FOOTNOTE_GLYPHS
        .replace_all(&without_brackets, |caps: &regex::Captures<'_>| {
            refs.push(caps[0].to_string());
            String::new()
        })
        .into_owned();
    let joined = refs.join(" ");
    let joined = joined.trim();
    let refs = (!joined.is_empty()).then(|| joined.to_string());
    (stripped, refs)
}

/// Strips `%`, currency symbols, thousands separators and all whitespace.
fn clean_numeric_string(input: &str) -> Cow<'_, str> {
    let trimmed = input.trim();
    if trimmed.len() == input.len() && !trimmed.chars().any(is_numeric_noise) {
        return Cow::Borrowed(input);
    }
    Cow::Owned(
        trimmed
            .chars()
            .filter(|&ch| !is_numeric_noise(ch))
            .collect(),
    )
}

fn is_numeric_noise(ch: char) -> bool {
    matches!(ch, '%' | '$' | '€' | '£' | '¥' | ',') || ch.is_whitespace()
}
