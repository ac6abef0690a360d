use std::collections::HashSet;
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;

use crate::services::amalgamate::{Amalgamation, AmalgamationError, Amalgamator};
use crate::services::program::{ProgramHandle, ProgramStore, SourceUnit};

fn include_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"^\s*#\s*include\s*([<"])([^>"]+)[>"]"#).expect("include regex")
    })
}

fn is_pragma_once(line: &str) -> bool {
    line.split_whitespace().collect::<Vec<_>>() == ["#pragma", "once"]
}

/// Textual amalgamator.
///
/// Program headers are inlined at their first quoted `#include` (once each),
/// every other include is hoisted into the include list, and `#pragma once`
/// is dropped. Includes are hoisted even when they sit inside conditional
/// blocks.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextAmalgamator;

struct Merger<'u> {
    units: &'u [SourceUnit],
    emitted: HashSet<usize>,
    includes: Vec<String>,
    body: String,
}

impl<'u> Merger<'u> {
    fn resolve(&self, target: &str) -> Option<usize> {
        let file_name = Path::new(target).file_name()?.to_str()?;
        self.units.iter().position(|u| u.name == file_name)
    }

    fn emit(&mut self, index: usize) {
        if !self.emitted.insert(index) {
            return;
        }
        let units = self.units;
        let unit = &units[index];
        self.body.push_str(&format!("/* ---- {} ---- */\n", unit.name));
        for line in unit.text.lines() {
            if is_pragma_once(line) {
                continue;
            }
            if let Some(caps) = include_re().captures(line) {
                let local = if &caps[1] == "\"" { self.resolve(&caps[2]) } else { None };
                match local {
                    Some(header) => self.emit(header),
                    None => {
                        let include = line.trim().to_string();
                        if !self.includes.contains(&include) {
                            self.includes.push(include);
                        }
                    }
                }
                continue;
            }
            self.body.push_str(line);
            self.body.push('\n');
        }
        self.body.push('\n');
    }
}

fn is_header(name: &str) -> bool {
    name.ends_with(".h") || name.ends_with(".hpp")
}

impl Amalgamator for TextAmalgamator {
    fn name(&self) -> &'static str {
        "text"
    }

    fn amalgamate(
        &self,
        store: &dyn ProgramStore,
        program: &ProgramHandle,
        app: &str,
    ) -> Result<Amalgamation, AmalgamationError> {
        let units = store.units(program)?;
        if units.is_empty() {
            return Err(AmalgamationError::Empty(app.to_string()));
        }
        if units.iter().all(|u| u.text.trim().is_empty()) {
            return Err(AmalgamationError::Merge {
                app: app.to_string(),
                reason: "every unit is empty".to_string(),
            });
        }
        let cpp = units.iter().any(|u| u.name.ends_with(".cpp") || u.name.ends_with(".hpp"));
        let file_name = format!("{app}.{}", if cpp { "cpp" } else { "c" });

        let mut merger = Merger {
            units: &units,
            emitted: HashSet::new(),
            includes: Vec::new(),
            body: String::new(),
        };

        // Headers nobody includes go first, then sources pull in theirs.
        let included: HashSet<usize> = units
            .iter()
            .flat_map(|u| u.text.lines())
            .filter_map(|line| include_re().captures(line))
            .filter(|caps| &caps[1] == "\"")
            .filter_map(|caps| merger.resolve(&caps[2]))
            .collect();
        for (index, unit) in units.iter().enumerate() {
            if is_header(&unit.name) && !included.contains(&index) {
                merger.emit(index);
            }
        }
        for (index, unit) in units.iter().enumerate() {
            if !is_header(&unit.name) {
                merger.emit(index);
            }
        }
        for index in 0..units.len() {
            merger.emit(index);
        }

        Ok(Amalgamation { file_name, body: merger.body, includes: merger.includes })
    }
}
