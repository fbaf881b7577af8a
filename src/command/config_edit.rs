//! Commands that remove one field or section from a structured config file.
//!
//! Preview reports the file's current size. Execute rewrites the file
//! without the target and reports how many bytes that saved; a target that
//! does not exist leaves the file untouched and reports 0.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use super::{Command, ExecutionResult, Mode, Step};
use crate::error::Result;
use crate::fsops::size_or_zero;
use crate::session::Session;

/// Remove a section, or one parameter of a section, from an INI file.
#[derive(Debug, Clone)]
pub struct IniEdit {
    path: PathBuf,
    section: String,
    parameter: Option<String>,
}

impl IniEdit {
    pub fn new(path: impl Into<PathBuf>, section: impl Into<String>, parameter: Option<String>) -> Self {
        Self {
            path: path.into(),
            section: section.into(),
            parameter,
        }
    }
}

impl Command for IniEdit {
    fn label(&self) -> String {
        "Clean file".into()
    }

    fn target(&self) -> Option<&Path> {
        Some(&self.path)
    }

    fn step(&mut self, mode: Mode, session: &Session) -> Result<Step> {
        let section = self.section.clone();
        let parameter = self.parameter.clone();
        let result = rewrite(&*self, mode, session, move |content| {
            remove_ini(content, &section, parameter.as_deref())
        })?;
        Ok(Step::Done(Some(result)))
    }
}

/// Remove the value at a slash-separated address from a JSON file.
#[derive(Debug, Clone)]
pub struct JsonEdit {
    path: PathBuf,
    address: String,
}

impl JsonEdit {
    pub fn new(path: impl Into<PathBuf>, address: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            address: address.into(),
        }
    }
}

impl Command for JsonEdit {
    fn label(&self) -> String {
        "Clean file".into()
    }

    fn target(&self) -> Option<&Path> {
        Some(&self.path)
    }

    fn step(&mut self, mode: Mode, session: &Session) -> Result<Step> {
        let address = self.address.clone();
        let result = rewrite(&*self, mode, session, move |content| {
            let mut doc: Value = serde_json::from_str(content)?;
            if remove_json(&mut doc, &address) {
                Ok(Some(serde_json::to_string(&doc)?))
            } else {
                Ok(None)
            }
        })?;
        Ok(Step::Done(Some(result)))
    }
}

/// Shared preview/execute flow. `edit` returns the new content, or `None`
/// when the target is absent.
fn rewrite<F>(cmd: &dyn Command, mode: Mode, session: &Session, edit: F) -> Result<ExecutionResult>
where
    F: FnOnce(&str) -> Result<Option<String>>,
{
    let path = cmd.target().map(Path::to_path_buf).unwrap_or_default();
    let before = size_or_zero(session.file_ops(), &path)?;
    let mut result = ExecutionResult {
        label: cmd.label(),
        deleted_count: 0,
        special_count: 1,
        path: path.display().to_string(),
        size: Some(before),
    };
    if mode == Mode::Preview {
        return Ok(result);
    }

    let content = fs::read_to_string(&path)?;
    let saved = match edit(&content)? {
        Some(updated) => {
            fs::write(&path, &updated)?;
            let after = size_or_zero(session.file_ops(), &path)?;
            before.saturating_sub(after)
        }
        None => {
            tracing::debug!(path = %path.display(), "edit target absent, file unchanged");
            0
        }
    };
    result.size = Some(saved);
    Ok(result)
}

fn section_name(line: &str) -> Option<&str> {
    let trimmed = line.trim();
    trimmed
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .map(str::trim)
}

fn parameter_name(line: &str) -> Option<&str> {
    let trimmed = line.trim_start();
    if trimmed.starts_with(['#', ';']) {
        return None;
    }
    let end = trimmed.find(['=', ':'])?;
    Some(trimmed[..end].trim())
}

/// Line-based INI edit that keeps comments and formatting elsewhere intact.
/// Section names are case-sensitive, parameter names are not.
fn remove_ini(content: &str, section: &str, parameter: Option<&str>) -> Result<Option<String>> {
    let mut out = String::with_capacity(content.len());
    let mut in_section = false;
    let mut removed = false;

    for line in content.split_inclusive('\n') {
        if let Some(name) = section_name(line) {
            in_section = name == section;
            if in_section && parameter.is_none() {
                removed = true;
                continue;
            }
            out.push_str(line);
            continue;
        }

        if in_section {
            match parameter {
                None => continue,
                Some(wanted) => {
                    if parameter_name(line).is_some_and(|p| p.eq_ignore_ascii_case(wanted)) {
                        removed = true;
                        continue;
                    }
                }
            }
        }
        out.push_str(line);
    }

    Ok(removed.then_some(out))
}

/// Remove the value at `address`; false if any segment is missing.
fn remove_json(doc: &mut Value, address: &str) -> bool {
    let segments: Vec<&str> = address.split('/').filter(|s| !s.is_empty()).collect();
    let Some((last, parents)) = segments.split_last() else {
        return false;
    };

    let mut node = doc;
    for segment in parents {
        node = match node {
            Value::Object(map) => match map.get_mut(*segment) {
                Some(child) => child,
                None => return false,
            },
            Value::Array(items) => match segment.parse::<usize>().ok().and_then(|i| items.get_mut(i)) {
                Some(child) => child,
                None => return false,
            },
            _ => return false,
        };
    }

    match node {
        Value::Object(map) => map.remove(*last).is_some(),
        Value::Array(items) => match last.parse::<usize>() {
            Ok(i) if i < items.len() => {
                items.remove(i);
                true
            }
            _ => false,
        },
        _ => false,
    }
}
