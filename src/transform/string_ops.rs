use std::borrow::Cow;

use heck::ToSnakeCase;
use regex::Regex;

/// Returns a lowercase representation, reusing the original string if already lowercase.
pub fn lowercase(input: &str) -> Cow<'_, str> {
    if input.chars().all(|ch| !ch.is_uppercase()) {
        Cow::Borrowed(input)
    } else {
        Cow::Owned(input.to_lowercase())
    }
}

/// Returns an uppercase representation, avoiding allocation when unnecessary.
pub fn uppercase(input: &str) -> Cow<'_, str> {
    if input.chars().all(|ch| !ch.is_lowercase()) {
        Cow::Borrowed(input)
    } else {
        Cow::Owned(input.to_uppercase())
    }
}

/// Trims leading/trailing whitespace while borrowing the original when unchanged.
pub fn trim(input: &str) -> Cow<'_, str> {
    Cow::Borrowed(input.trim())
}

fn is_word_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

/// Title-cases every whitespace-delimited word.
///
/// Leading non-word characters of a word (`(`, `"`) are kept; the first word
/// character is upper-cased and the rest of the word lower-cased.
pub fn title_case(input: &str) -> Cow<'_, str> {
    let mut output = String::with_capacity(input.len());
    let mut in_word = false;
    for ch in input.chars() {
        if ch.is_whitespace() {
            in_word = false;
            output.push(ch);
        } else if in_word {
            output.extend(ch.to_lowercase());
        } else if is_word_char(ch) {
            in_word = true;
            output.extend(ch.to_uppercase());
        } else {
            output.push(ch);
        }
    }
    if output == input {
        Cow::Borrowed(input)
    } else {
        Cow::Owned(output)
    }
}

/// Converts identifiers to `snake_case`.
pub fn snake_case(input: &str) -> Cow<'_, str> {
    let converted = input.to_snake_case();
    if converted == input {
        Cow::Borrowed(input)
    } else {
        Cow::Owned(converted)
    }
}

/// Replaces each run of whitespace with a single underscore.
pub fn underscore_whitespace(input: &str) -> Cow<'_, str> {
    if !input.chars().any(char::is_whitespace) {
        return Cow::Borrowed(input);
    }
    let mut output = String::with_capacity(input.len());
    let mut in_run = false;
    for ch in input.chars() {
        if ch.is_whitespace() {
            if !in_run {
                output.push('_');
            }
            in_run = true;
        } else {
            in_run = false;
            output.push(ch);
        }
    }
    Cow::Owned(output)
}

/// Removes every character that is not an ASCII letter or digit.
pub fn strip_non_alphanumeric(input: &str) -> Cow<'_, str> {
    if input.chars().all(|ch| ch.is_ascii_alphanumeric()) {
        Cow::Borrowed(input)
    } else {
        Cow::Owned(input.chars().filter(char::is_ascii_alphanumeric).collect())
    }
}

/// Applies a regex replacement while avoiding allocation when there are no matches.
///
/// `global` replaces every match; otherwise only the first.
pub fn regex_replace<'a>(
    value: &'a str,
    regex: &Regex,
    replacement: &str,
    global: bool,
) -> Cow<'a, str> {
    if !regex.is_match(value) {
        return Cow::Borrowed(value);
    }
    if global {
        Cow::Owned(regex.replace_all(value, replacement).into_owned())
    } else {
        Cow::Owned(regex.replace(value, replacement).into_owned())
    }
}

/// Rewrites a `$1` / `$&` / `$$` style replacement template into the
/// `${1}` / `${0}` / `$$` syntax understood by [`Regex::replace_all`].
///
/// Group numbers are braced so a following letter is not read as part of a
/// group name. Any other `$`, including `${name}` and `$0`, stays literal.
pub fn expand_replacement(template: &str) -> Cow<'_, str> {
    if !template.contains('$') {
        return Cow::Borrowed(template);
    }
    let mut output = String::with_capacity(template.len() + 4);
    let mut chars = template.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch != '$' {
            output.push(ch);
            continue;
        }
        match chars.peek().copied() {
            Some('$') => {
                chars.next();
                output.push_str("$$");
            }
            Some('&') => {
                chars.next();
                output.push_str("${0}");
            }
            Some(d) if d.is_ascii_digit() => {
                let mut digits = String::new();
                while let Some(&next) = chars.peek() {
                    if next.is_ascii_digit() && digits.len() < 2 {
                        digits.push(next);
                        chars.next();
                    } else {
                        break;
                    }
                }
                if digits.bytes().all(|b| b == b'0') {
                    output.push_str("$$");
                    output.push_str(&digits);
                } else {
                    output.push_str("${");
                    output.push_str(&digits);
                    output.push('}');
                }
            }
            _ => output.push_str("$$"),
        }
    }
    Cow::Owned(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_case_keeps_leading_punctuation() {
        assert_eq!(title_case("hello WORLD").as_ref(), "Hello World");
        assert_eq!(title_case("(acme) o'neil").as_ref(), "(Acme) O'neil");
        assert!(matches!(title_case("Already Titled"), Cow::Borrowed(_)));
    }

    #[test]
    fn underscore_whitespace_collapses_runs() {
        assert_eq!(underscore_whitespace("a  b\tc").as_ref(), "a_b_c");
        assert!(matches!(underscore_whitespace("plain"), Cow::Borrowed(_)));
    }

    #[test]
    fn expand_replacement_braces_group_numbers() {
        assert_eq!(expand_replacement("$1a").as_ref(), "${1}a");
        assert_eq!(expand_replacement("[$&]").as_ref(), "[${0}]");
        assert_eq!(expand_replacement("$$5").as_ref(), "$$5");
        assert_eq!(expand_replacement("cost $").as_ref(), "cost $$");
    }

    #[test]
    fn expand_replacement_keeps_unknown_dollar_forms_literal() {
        assert_eq!(expand_replacement("${name}").as_ref(), "$${name}");
        assert_eq!(expand_replacement("$0").as_ref(), "$$0");
        assert_eq!(expand_replacement("$00x").as_ref(), "$$00x");
        assert_eq!(expand_replacement("$01").as_ref(), "${01}");

        let regex = Regex::new("(a)").unwrap();
        for template in ["${name}", "$0", "${1}"] {
            let replaced = regex_replace("a", &regex, &expand_replacement(template), true);
            assert_eq!(replaced.as_ref(), template);
        }
    }

    #[test]
    fn regex_replace_borrows_when_no_match() {
        let regex = Regex::new("foo").unwrap();
        assert!(matches!(regex_replace("bar", &regex, "baz", true), Cow::Borrowed(_)));
        assert_eq!(regex_replace("foo foo", &regex, "x", false).as_ref(), "x foo");
        assert_eq!(regex_replace("foo foo", &regex, "x", true).as_ref(), "x x");
    }

    #[test]
    fn strip_non_alphanumeric_drops_symbols() {
        assert_eq!(strip_non_alphanumeric("A-1 b_2!").as_ref(), "A1b2");
    }
}
