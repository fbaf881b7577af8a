//! Pattern expansion that runs before any path matching.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Multi-valued substitutions for `$$name$$` tokens.
pub type Variables = BTreeMap<String, Vec<String>>;

static TOKEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\$\$(\w+)\$\$").unwrap());

// Group 1 swallows `$$name$$` tokens so they pass through untouched.
static ENV_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\$\$\w+\$\$)|\$\{([A-Za-z_]\w*)\}|\$([A-Za-z_]\w*)").unwrap()
});

/// Expand `$$name$$` tokens into the cartesian product of their values.
///
/// Unmapped tokens are left verbatim, so a pattern that still carries one
/// simply matches nothing on disk. The first token varies slowest; values
/// keep the order they were configured in.
pub fn expand_vars(pattern: &str, vars: &Variables) -> Vec<String> {
    let mut names: Vec<&str> = Vec::new();
    for cap in TOKEN_RE.captures_iter(pattern) {
        let Some(name) = cap.get(1).map(|m| m.as_str()) else {
            continue;
        };
        let mapped = vars.get(name).is_some_and(|values| !values.is_empty());
        if mapped && !names.contains(&name) {
            names.push(name);
        }
    }

    let mut expanded = vec![pattern.to_string()];
    for name in names {
        let token = format!("$${}$$", name);
        let values = &vars[name];
        expanded = expanded
            .iter()
            .flat_map(|partial| values.iter().map(|v| partial.replace(&token, v)))
            .collect();
    }
    expanded
}

/// Expand a leading `~` and `$VAR` / `${VAR}` references.
///
/// Unset variables stay as written.
pub fn expand_user_and_env(pattern: &str) -> String {
    let with_home = match pattern.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') || rest.starts_with('\\') => {
            match dirs::home_dir() {
                Some(home) => format!("{}{}", home.display(), rest),
                None => pattern.to_string(),
            }
        }
        _ => pattern.to_string(),
    };

    ENV_RE
        .replace_all(&with_home, |caps: &Captures| {
            let whole = caps.get(0).map(|m| m.as_str()).unwrap_or_default();
            if caps.get(1).is_some() {
                return whole.to_string();
            }
            let name = caps
                .get(2)
                .or_else(|| caps.get(3))
                .map(|m| m.as_str())
                .unwrap_or_default();
            std::env::var(name).unwrap_or_else(|_| whole.to_string())
        })
        .into_owned()
}

/// Both expansions, in the order the matcher needs them.
pub fn expand_pattern(pattern: &str, vars: &Variables) -> Vec<String> {
    expand_vars(pattern, vars)
        .iter()
        .map(|p| expand_user_and_env(p))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn vars(pairs: &[(&str, &[&str])]) -> Variables {
        pairs
            .iter()
            .map(|(k, vs)| (k.to_string(), vs.iter().map(|v| v.to_string()).collect()))
            .collect()
    }

    #[test]
    fn single_token_two_values() {
        let v = vars(&[("x", &["p", "q"])]);
        assert_eq!(expand_vars("/a/$$x$$", &v), vec!["/a/p", "/a/q"]);
    }

    #[test]
    fn unmapped_token_is_left_verbatim() {
        let v = vars(&[("x", &["p"])]);
        assert_eq!(expand_vars("/a/$$y$$", &v), vec!["/a/$$y$$"]);
    }

    #[test]
    fn token_names_are_case_sensitive() {
        let v = vars(&[("profile", &["default"])]);
        assert_eq!(expand_vars("/a/$$Profile$$", &v), vec!["/a/$$Profile$$"]);
    }

    #[test]
    fn no_tokens_yields_pattern() {
        assert_eq!(expand_vars("/tmp/*.log", &Variables::new()), vec!["/tmp/*.log"]);
    }

    #[test]
    fn distinct_tokens_multiply() {
        let v = vars(&[("a", &["1", "2"]), ("b", &["x", "y", "z"])]);
        let out = expand_vars("/$$a$$/$$b$$", &v);
        assert_eq!(
            out,
            vec!["/1/x", "/1/y", "/1/z", "/2/x", "/2/y", "/2/z"]
        );
    }

    #[test]
    fn repeated_token_uses_same_value() {
        let v = vars(&[("a", &["1", "2"])]);
        assert_eq!(expand_vars("/$$a$$/$$a$$", &v), vec!["/1/1", "/2/2"]);
    }

    #[test]
    fn env_expansion_keeps_unset_and_tokens() {
        std::env::set_var("CACHESWEEP_TEST_DIR", "/opt/data");
        assert_eq!(
            expand_user_and_env("$CACHESWEEP_TEST_DIR/${CACHESWEEP_TEST_DIR}/$$name$$"),
            "/opt/data//opt/data/$$name$$"
        );
        assert_eq!(
            expand_user_and_env("$CACHESWEEP_SURELY_UNSET_VAR/x"),
            "$CACHESWEEP_SURELY_UNSET_VAR/x"
        );
    }

    #[test]
    fn tilde_only_expands_at_start() {
        assert_eq!(expand_user_and_env("/a/~b"), "/a/~b");
        if let Some(home) = dirs::home_dir() {
            assert_eq!(
                expand_user_and_env("~/.cache"),
                format!("{}/.cache", home.display())
            );
        }
    }

    proptest! {
        #[test]
        fn expansion_count_is_product(n in 1usize..5, m in 1usize..5) {
            let a: Vec<String> = (0..n).map(|i| format!("a{i}")).collect();
            let b: Vec<String> = (0..m).map(|i| format!("b{i}")).collect();
            let mut v = Variables::new();
            v.insert("first".into(), a);
            v.insert("second".into(), b);
            let out = expand_vars("/$$first$$/$$second$$", &v);
            prop_assert_eq!(out.len(), n * m);
            prop_assert!(out.iter().all(|p| !p.contains("$$")));
        }
    }
}
