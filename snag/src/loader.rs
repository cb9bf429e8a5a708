// SPDX-FileCopyrightText: 2026 The snag Authors
//
// SPDX-License-Identifier: MIT

//! Invokes the platform dynamic linker in trace mode to enumerate a
//! binary's resolved runtime dependencies.
//!
//! Grounded in the `ldd`-equivalent subprocess trick: run the interpreter
//! against the target with `LD_TRACE_LOADED_OBJECTS=1` and parse the
//! `=>`-delimited lines it prints instead of linking against the dynamic
//! loader itself.

use std::path::{Path, PathBuf};
use std::process::Command;

use log::trace;

use crate::error::LoaderError;

/// `true` if `interpreter` looks like a 64-bit `ld-linux` loader we know how
/// to trace: a path under `/lib64/` whose base name starts with
/// `ld-linux` and ends in `.so` (optionally versioned, e.g. `.so.2`).
fn is_supported_interpreter(interpreter: &Path) -> bool {
    let Some(parent) = interpreter.parent() else {
        return false;
    };
    if parent != Path::new("/lib64") {
        return false;
    }
    let Some(name) = interpreter.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    let Some(rest) = name.strip_prefix("ld-linux") else {
        return false;
    };
    rest == ".so" || rest.starts_with(".so.")
}

/// Run `interpreter` against `binary` with `LD_TRACE_LOADED_OBJECTS=1` and
/// return the resolved dependency paths it reports, unsorted and
/// undeduplicated (the caller applies the library-path comparator).
pub fn dependencies(binary: &Path, interpreter: &Path) -> Result<Vec<PathBuf>, LoaderError> {
    if !is_supported_interpreter(interpreter) {
        return Err(LoaderError::UnsupportedInterpreter(interpreter.to_path_buf()));
    }

    trace!(
        "running {} {} with LD_TRACE_LOADED_OBJECTS=1",
        interpreter.display(),
        binary.display()
    );

    let output = Command::new(interpreter)
        .arg(binary)
        .env_clear()
        .env("LD_TRACE_LOADED_OBJECTS", "1")
        .output()
        .map_err(|source| LoaderError::Spawn {
            path: interpreter.to_path_buf(),
            source,
        })?;

    if !output.status.success() {
        return Err(LoaderError::Failed {
            path: interpreter.to_path_buf(),
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }

    let stdout = String::from_utf8(output.stdout)?;
    Ok(parse_trace_output(&stdout))
}

/// Parse `ldd`-style trace output: lines containing `=>` carry the resolved
/// path as their third whitespace-delimited token (`name => path (addr)`).
/// Lines without `=>` (the vDSO, the interpreter's self-reference) are
/// skipped.
fn parse_trace_output(stdout: &str) -> Vec<PathBuf> {
    stdout
        .lines()
        .filter(|line| line.contains("=>"))
        .filter_map(|line| line.split_whitespace().nth(2))
        .map(PathBuf::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_versioned_64bit_loader() {
        assert!(is_supported_interpreter(Path::new(
            "/lib64/ld-linux-x86-64.so.2"
        )));
    }

    #[test]
    fn rejects_32bit_loader_path() {
        assert!(!is_supported_interpreter(Path::new(
            "/lib/ld-linux.so.2"
        )));
    }

    #[test]
    fn rejects_unrelated_binary() {
        assert!(!is_supported_interpreter(Path::new("/lib64/libc.so.6")));
    }

    #[test]
    fn parses_resolved_dependency_lines() {
        let trace = "\tlinux-vdso.so.1 (0x00007ffeaf5f2000)\n\
                     \tlibc.so.6 => /lib64/libc.so.6 (0x00007f5b9a800000)\n\
                     \t/lib64/ld-linux-x86-64.so.2 (0x00007f5b9aa1b000)\n\
                     \tlibpcre2-8.so.0 => /lib64/libpcre2-8.so.0 (0x00007f5b9a700000)\n";
        let deps = parse_trace_output(trace);
        assert_eq!(
            deps,
            vec![
                PathBuf::from("/lib64/libc.so.6"),
                PathBuf::from("/lib64/libpcre2-8.so.0"),
            ]
        );
    }

    #[test]
    fn zero_dependency_result_is_legitimate() {
        let trace = "\tstatically linked\n";
        assert!(parse_trace_output(trace).is_empty());
    }
}
