use std::fmt;
use std::sync::LazyLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use regex::Regex;
use rustpython_parser::lexer::lex;
use rustpython_parser::text_size::TextRange;
use rustpython_parser::{Mode, Tok};
use serde::Serialize;

/// Matches a class declaration whose base list mentions the library scene type. Only used for
/// source that does not tokenize.
static SCENE_CLASS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"class\s+(\w+)\s*\([^)]*Scene[^)]*\)").expect("scene class pattern is valid")
});

/// Last suffix handed out, in milliseconds since the epoch.
static LAST_SUFFIX_MS: AtomicU64 = AtomicU64::new(0);

/// A scene's declared class name paired with the process-unique name it renders under.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct SceneIdentifier {
    /// Class name as it appears in the generated source (or the fallback).
    pub declared: String,
    /// `<declared>_<millis>`; never reused within the process.
    pub unique: String,
}

impl SceneIdentifier {
    /// The name the renderer is asked to render and the locator searches for.
    pub fn as_str(&self) -> &str {
        &self.unique
    }
}

impl fmt::Display for SceneIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.unique)
    }
}

/// Name of the first scene class declared in `source`, if any.
pub fn declared_scene_name(source: &str) -> Option<&str> {
    declared_scene_names(source).into_iter().next()
}

/// Every scene class declared in `source`, in declaration order.
///
/// Declarations inside comments and string literals do not count.
pub fn declared_scene_names(source: &str) -> Vec<&str> {
    match tokens(source) {
        Some(toks) => scene_classes(source, &toks),
        None => SCENE_CLASS
            .captures_iter(source)
            .filter_map(|c| c.get(1))
            .map(|m| m.as_str())
            .collect(),
    }
}

/// Declared scene class name, or `fallback` when the source declares none.
pub fn extract_scene_name<'a>(source: &'a str, fallback: &'a str) -> &'a str {
    declared_scene_name(source).unwrap_or(fallback)
}

/// Pick the scene to render: `hint` when `source` declares it, else the first declared scene,
/// else `hint` or `fallback`.
pub fn select_scene_name<'a>(source: &'a str, hint: Option<&'a str>, fallback: &'a str) -> &'a str {
    let declared = declared_scene_names(source);
    if let Some(hint) = hint
        && declared.contains(&hint)
    {
        return hint;
    }
    declared
        .first()
        .copied()
        .or(hint)
        .unwrap_or(fallback)
}

/// Attach a process-unique suffix to `declared`.
///
/// Two calls never return the same [`SceneIdentifier::unique`], even for the same name within
/// the same millisecond or from different threads.
pub fn uniquify(declared: &str) -> SceneIdentifier {
    SceneIdentifier {
        declared: declared.to_string(),
        unique: format!("{declared}_{}", next_suffix_ms()),
    }
}

/// Extract the scene name from `source` and attach a process-unique suffix.
pub fn extract_and_uniquify(source: &str, fallback: &str) -> SceneIdentifier {
    uniquify(extract_scene_name(source, fallback))
}

/// Replace the first declared scene class name in `source` with `new_name`.
///
/// Source that declares no scene class is returned unchanged.
pub fn rewrite_scene_name(source: &str, new_name: &str) -> String {
    match declared_scene_name(source) {
        Some(old) => rename_class(source, old, new_name),
        None => source.to_string(),
    }
}

/// Rename every identifier token `old` in `source` to `new_name`.
///
/// References such as `super(Old, self)` stay consistent with the renamed declaration, while
/// string literals and comments keep their text.
pub fn rename_class(source: &str, old: &str, new_name: &str) -> String {
    if old == new_name || old.is_empty() {
        return source.to_string();
    }
    let Some(toks) = tokens(source) else {
        return rename_words(source, old, new_name);
    };

    let mut out = String::with_capacity(source.len() + new_name.len());
    let mut copied = 0;
    for (tok, range) in &toks {
        if let Tok::Name { name } = tok
            && name == old
        {
            out.push_str(&source[copied..usize::from(range.start())]);
            out.push_str(new_name);
            copied = usize::from(range.end());
        }
    }
    out.push_str(&source[copied..]);
    out
}

/// Whole-word textual rename for source the lexer rejects.
fn rename_words(source: &str, old: &str, new_name: &str) -> String {
    match Regex::new(&format!(r"\b{}\b", regex::escape(old))) {
        Ok(re) => re.replace_all(source, regex::NoExpand(new_name)).into_owned(),
        Err(_) => source.replace(old, new_name),
    }
}

fn tokens(source: &str) -> Option<Vec<(Tok, TextRange)>> {
    lex(source, Mode::Module).collect::<Result<Vec<_>, _>>().ok()
}

/// `class <Name>(...)` headers whose parenthesised bases mention `Scene`.
fn scene_classes<'a>(source: &'a str, toks: &[(Tok, TextRange)]) -> Vec<&'a str> {
    let mut names = Vec::new();
    for (i, (tok, _)) in toks.iter().enumerate() {
        if !matches!(tok, Tok::Class) {
            continue;
        }
        let Some((Tok::Name { .. }, name_range)) = toks.get(i + 1) else {
            continue;
        };
        let Some((Tok::Lpar, _)) = toks.get(i + 2) else {
            continue;
        };

        let mut depth = 0usize;
        let mut mentions_scene = false;
        for (tok, _) in &toks[i + 2..] {
            match tok {
                Tok::Lpar | Tok::Lsqb | Tok::Lbrace => depth += 1,
                Tok::Rpar | Tok::Rsqb | Tok::Rbrace => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        break;
                    }
                }
                Tok::Name { name } if name.contains("Scene") => mentions_scene = true,
                _ => {}
            }
        }
        if mentions_scene {
            names.push(&source[*name_range]);
        }
    }
    names
}

/// Current wall-clock milliseconds, bumped past the last value handed out.
fn next_suffix_ms() -> u64 {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);
    let mut last = LAST_SUFFIX_MS.load(Ordering::Relaxed);
    loop {
        let next = now.max(last + 1);
        match LAST_SUFFIX_MS.compare_exchange_weak(last, next, Ordering::AcqRel, Ordering::Relaxed)
        {
            Ok(_) => return next,
            Err(seen) => last = seen,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/naming.rs"]
mod tests;
