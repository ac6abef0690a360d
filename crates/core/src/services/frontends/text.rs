use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::services::frontends::parse::{check_balance, mask, scan_functions};
use crate::services::program::{
    Directive, FrontendConfig, ProgramHandle, ProgramStore, SourceUnit, StatementRef, StoreError,
};

#[derive(Debug, Clone)]
struct Line {
    id: u64,
    text: String,
}

#[derive(Debug)]
struct TextUnit {
    name: String,
    origin: Option<PathBuf>,
    /// `None` until the unit is read by `rebuild`.
    lines: Option<Vec<Line>>,
}

impl TextUnit {
    fn text(&self) -> String {
        self.lines
            .as_ref()
            .map(|lines| lines.iter().map(|l| l.text.as_str()).collect::<Vec<_>>().join("\n"))
            .unwrap_or_default()
    }

    fn position(&self, id: u64) -> Option<usize> {
        self.lines.as_ref()?.iter().position(|l| l.id == id)
    }
}

#[derive(Debug, Default)]
struct TextProgram {
    units: Vec<TextUnit>,
}

/// Program store that keeps each unit as lines of text.
///
/// Builds check that every unit is readable UTF-8 with balanced braces and,
/// when a compiler is configured, that it passes `-fsyntax-only`. Outlining
/// moves the marked lines into `void name(void)` placed before the enclosing
/// function and leaves a call in their place; it does not compute captured
/// variables, so regions using locals of the enclosing function will not
/// compile afterwards.
#[derive(Debug, Default)]
pub struct TextStore {
    programs: HashMap<u64, TextProgram>,
    next_program: u64,
    next_statement: u64,
    standard: String,
    flags: String,
    compiler: Option<String>,
}

impl TextStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `<compiler> -fsyntax-only` on every C/C++ unit during builds.
    pub fn with_compiler(mut self, compiler: Option<String>) -> Self {
        self.compiler = compiler;
        self
    }

    pub fn standard(&self) -> &str {
        &self.standard
    }

    pub fn flags(&self) -> &str {
        &self.flags
    }

    /// Number of programs created and not yet destroyed.
    pub fn live_programs(&self) -> usize {
        self.programs.len()
    }

    fn program(&self, handle: &ProgramHandle) -> Result<&TextProgram, StoreError> {
        self.programs.get(&handle.id()).ok_or(StoreError::UnknownProgram(handle.id()))
    }

    fn program_mut(&mut self, handle: &ProgramHandle) -> Result<&mut TextProgram, StoreError> {
        self.programs.get_mut(&handle.id()).ok_or(StoreError::UnknownProgram(handle.id()))
    }

    fn number_lines(&mut self, text: &str) -> Vec<Line> {
        text.lines().map(|line| Line { id: self.next_id(), text: line.to_string() }).collect()
    }

    fn next_id(&mut self) -> u64 {
        self.next_statement += 1;
        self.next_statement
    }

    fn syntax_check(&self, compiler: &str, program: &TextProgram) -> Result<(), StoreError> {
        let scratch = tempfile::tempdir().map_err(|source| StoreError::Write {
            path: std::env::temp_dir(),
            source,
        })?;
        for unit in &program.units {
            let path = scratch.path().join(&unit.name);
            fs::write(&path, unit.text())
                .map_err(|source| StoreError::Write { path: path.clone(), source })?;
        }

        let compiled = program.units.iter().filter(|u| u.name.ends_with(".c") || u.name.ends_with(".cpp"));
        for unit in compiled {
            let mut cmd = Command::new(compiler);
            cmd.current_dir(scratch.path()).arg("-fsyntax-only");
            if !self.standard.is_empty() {
                cmd.arg(format!("-std={}", self.standard));
            }
            // Linker inputs mean nothing to a syntax-only run.
            cmd.args(self.flags.split_whitespace().filter(|f| !f.starts_with("-l")));
            cmd.arg(&unit.name);

            let output = cmd.output().map_err(|e| StoreError::Compiler {
                unit: unit.name.clone(),
                message: format!("failed to spawn {compiler}: {e}"),
            })?;
            if !output.status.success() {
                let stderr = String::from_utf8_lossy(&output.stderr);
                let message = stderr.lines().take(5).collect::<Vec<_>>().join("\n");
                return Err(StoreError::Compiler { unit: unit.name.clone(), message });
            }
            tracing::debug!(unit = %unit.name, "Syntax check passed");
        }
        Ok(())
    }
}

impl FrontendConfig for TextStore {
    fn set_standard(&mut self, standard: &str) {
        self.standard = standard.to_string();
    }

    fn set_flags(&mut self, flags: &str) {
        self.flags = flags.to_string();
    }
}

impl ProgramStore for TextStore {
    fn name(&self) -> &'static str {
        "text"
    }

    fn create(&mut self) -> ProgramHandle {
        self.next_program += 1;
        self.programs.insert(self.next_program, TextProgram::default());
        ProgramHandle::from_raw(self.next_program)
    }

    fn destroy(&mut self, program: ProgramHandle) {
        self.programs.remove(&program.id());
    }

    fn add_file(&mut self, program: &ProgramHandle, path: &Path) -> Result<(), StoreError> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        self.program_mut(program)?.units.push(TextUnit {
            name,
            origin: Some(path.to_path_buf()),
            lines: None,
        });
        Ok(())
    }

    fn add_source(
        &mut self,
        program: &ProgramHandle,
        name: &str,
        text: &str,
    ) -> Result<(), StoreError> {
        self.program(program)?;
        let lines = self.number_lines(text);
        self.program_mut(program)?.units.push(TextUnit {
            name: name.to_string(),
            origin: None,
            lines: Some(lines),
        });
        Ok(())
    }

    fn reset(&mut self, program: &ProgramHandle) -> Result<(), StoreError> {
        self.program_mut(program)?.units.clear();
        Ok(())
    }

    fn rebuild(&mut self, program: &ProgramHandle) -> Result<(), StoreError> {
        let pending: Vec<(usize, PathBuf)> = self
            .program(program)?
            .units
            .iter()
            .enumerate()
            .filter(|(_, u)| u.lines.is_none())
            .filter_map(|(i, u)| u.origin.clone().map(|origin| (i, origin)))
            .collect();

        for (index, origin) in pending {
            let text = fs::read_to_string(&origin)
                .map_err(|source| StoreError::Io { path: origin.clone(), source })?;
            let lines = self.number_lines(&text);
            self.program_mut(program)?.units[index].lines = Some(lines);
        }

        let built = self.program(program)?;
        for unit in &built.units {
            check_balance(&mask(&unit.text()))
                .map_err(|message| StoreError::Parse { unit: unit.name.clone(), message })?;
        }
        if let Some(compiler) = &self.compiler {
            self.syntax_check(compiler, built)?;
        }
        tracing::debug!(units = built.units.len(), "Rebuilt program");
        Ok(())
    }

    fn functions(&self, program: &ProgramHandle) -> Result<Vec<String>, StoreError> {
        let mut names: Vec<String> = Vec::new();
        for unit in &self.program(program)?.units {
            for span in scan_functions(&unit.text()) {
                if !names.contains(&span.name) {
                    names.push(span.name);
                }
            }
        }
        Ok(names)
    }

    fn directives(&self, program: &ProgramHandle) -> Result<Vec<Directive>, StoreError> {
        let mut directives = Vec::new();
        for (index, unit) in self.program(program)?.units.iter().enumerate() {
            for line in unit.lines.iter().flatten() {
                if line.text.trim_start().starts_with("#pragma") {
                    directives.push(Directive {
                        statement: StatementRef { unit: index, id: line.id },
                        text: line.text.clone(),
                    });
                }
            }
        }
        Ok(directives)
    }

    fn outline(
        &mut self,
        program: &ProgramHandle,
        begin: StatementRef,
        end: StatementRef,
        name: &str,
    ) -> Result<(), StoreError> {
        let fail =
            |reason: &str| StoreError::Outline { name: name.to_string(), reason: reason.into() };
        if begin.unit != end.unit {
            return Err(fail("markers are in different units"));
        }
        let call_id = self.next_id();
        let mut fresh_ids: Vec<u64> = (0..4).map(|_| self.next_id()).collect();

        let unit = self
            .program_mut(program)?
            .units
            .get_mut(begin.unit)
            .ok_or(StoreError::UnknownStatement(begin))?;
        let start = unit.position(begin.id).ok_or(StoreError::UnknownStatement(begin))?;
        let stop = unit.position(end.id).ok_or(StoreError::UnknownStatement(end))?;
        if stop <= start {
            return Err(fail("end marker precedes begin marker"));
        }
        let enclosing = scan_functions(&unit.text())
            .into_iter()
            .find(|span| span.open_line <= start && stop <= span.close_line)
            .ok_or_else(|| fail("region is not inside a function body"))?;

        let Some(lines) = unit.lines.as_mut() else {
            return Err(StoreError::UnknownStatement(begin));
        };
        let indent: String = lines[start + 1..stop]
            .iter()
            .find(|l| !l.text.trim().is_empty())
            .map(|l| l.text.chars().take_while(|c| c.is_whitespace()).collect())
            .unwrap_or_default();
        let region: Vec<Line> = lines
            .splice(start + 1..stop, [Line { id: call_id, text: format!("{indent}{name}();") }])
            .collect();

        let mut synthesized = |text: String| Line { id: fresh_ids.pop().unwrap_or_default(), text };
        let mut function = Vec::with_capacity(region.len() + 4);
        function.push(synthesized(format!("void {name}(void)")));
        function.push(synthesized("{".to_string()));
        function.extend(region);
        function.push(synthesized("}".to_string()));
        function.push(synthesized(String::new()));
        let tail = lines.split_off(enclosing.header_line);
        lines.extend(function);
        lines.extend(tail);
        Ok(())
    }

    fn remove_statement(
        &mut self,
        program: &ProgramHandle,
        statement: StatementRef,
    ) -> Result<(), StoreError> {
        let unit = self
            .program_mut(program)?
            .units
            .get_mut(statement.unit)
            .ok_or(StoreError::UnknownStatement(statement))?;
        let index = unit.position(statement.id).ok_or(StoreError::UnknownStatement(statement))?;
        if let Some(lines) = unit.lines.as_mut() {
            lines.remove(index);
        }
        Ok(())
    }

    fn units(&self, program: &ProgramHandle) -> Result<Vec<SourceUnit>, StoreError> {
        Ok(self
            .program(program)?
            .units
            .iter()
            .map(|u| SourceUnit { name: u.name.clone(), text: u.text() })
            .collect())
    }

    fn write(&self, program: &ProgramHandle, dest: &Path) -> Result<Vec<PathBuf>, StoreError> {
        fs::create_dir_all(dest)
            .map_err(|source| StoreError::Write { path: dest.to_path_buf(), source })?;
        let mut written = Vec::new();
        for unit in &self.program(program)?.units {
            let path = dest.join(&unit.name);
            let mut text = unit.text();
            text.push('\n');
            fs::write(&path, text)
                .map_err(|source| StoreError::Write { path: path.clone(), source })?;
            written.push(path);
        }
        Ok(written)
    }
}
