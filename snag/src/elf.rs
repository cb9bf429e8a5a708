// SPDX-FileCopyrightText: 2026 The snag Authors
//
// SPDX-License-Identifier: MIT

//! ELF header/program-header parsing: classification as executable,
//! library or position-independent-executable, interpreter discovery, and
//! (for dynamically linked objects) dependency enumeration via the
//! platform loader.

use std::path::{Path, PathBuf};

use goblin::elf::{dynamic, header, program_header, Elf};
use log::{debug, trace};

use crate::error::{ElfError, ParseError};
use crate::loader;
use crate::pathutils;

/// The default 64-bit interpreter used to trace a dynamic object (typically
/// a shared library) that carries no `PT_INTERP` of its own.
pub const DEFAULT_INTERPRETER: &str = "/lib64/ld-linux-x86-64.so.2";

/// `DF_1_PIE`, the `DT_FLAGS_1` bit marking a `ET_DYN` object as a
/// position-independent executable rather than a plain shared library.
const DF_1_PIE: u64 = 0x0800_0000;

/// ELF identification class (the `EI_CLASS` byte).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Class {
    #[default]
    Unknown,
    Bit32,
    Bit64,
}

/// The kind of ELF object, as a 2-bit mask: bit 0 = executable, bit 1 =
/// dynamic. A position-independent executable sets both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Kind(u8);

impl Kind {
    pub const UNKNOWN: Kind = Kind(0);
    pub const EXECUTABLE: Kind = Kind(0b01);
    pub const DYNAMIC: Kind = Kind(0b10);
    pub const PIE: Kind = Kind(Kind::EXECUTABLE.0 | Kind::DYNAMIC.0);

    pub fn contains(self, other: Kind) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn is_pie(self) -> bool {
        self.contains(Kind::PIE)
    }

    pub fn is_dynamic(self) -> bool {
        self.contains(Kind::DYNAMIC)
    }

    pub fn is_executable(self) -> bool {
        self.contains(Kind::EXECUTABLE)
    }
}

impl std::ops::BitOr for Kind {
    type Output = Kind;

    fn bitor(self, rhs: Kind) -> Kind {
        Kind(self.0 | rhs.0)
    }
}

/// A parsed ELF binary (or library).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binary {
    /// Base filename of the input as given, before symlink resolution.
    pub name: String,
    /// Absolute, fully symlink-resolved path.
    pub path: PathBuf,
    pub class: Class,
    pub kind: Kind,
    /// Absolute path of the interpreter, if any.
    pub interpreter: Option<PathBuf>,
    /// Unique-by-filename, filename-sorted dependency paths.
    pub dependencies: Vec<PathBuf>,
}

impl Binary {
    fn partial(name: String, path: PathBuf) -> Self {
        Binary {
            name,
            path,
            class: Class::Unknown,
            kind: Kind::UNKNOWN,
            interpreter: None,
            dependencies: Vec::new(),
        }
    }
}

/// A parse failure that still carries the best-effort partial record, so
/// callers (e.g. the snag pipeline in copy-directory mode) can recover the
/// input's name and path even when it isn't a usable ELF file.
#[derive(Debug)]
pub struct PartialParse {
    pub partial: Binary,
    pub source: ParseError,
}

impl std::fmt::Display for PartialParse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.source)
    }
}

impl std::error::Error for PartialParse {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

/// Parse `path` as an ELF binary, invoking the platform loader to
/// enumerate dependencies if it turns out to be dynamically linked.
pub fn parse(path: &Path) -> Result<Binary, PartialParse> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned());
    let mut binary = Binary::partial(name, path.to_path_buf());

    trace!("parsing {}", path.display());

    let resolved = match pathutils::canonicalize(path) {
        Ok(resolved) => resolved,
        Err(err) => {
            // Leave `binary.path` as the originally requested path: there is
            // nothing to resolve to.
            return Err(PartialParse {
                partial: binary,
                source: ParseError::Io(err),
            });
        }
    };
    binary.path = resolved.clone();

    let bytes = match fs_err::read(&resolved) {
        Ok(bytes) => bytes,
        Err(err) => {
            return Err(PartialParse {
                partial: binary,
                source: ParseError::Io(err.into()),
            })
        }
    };

    match parse_header(&bytes) {
        Ok((class, kind, interpreter)) => {
            binary.class = class;
            binary.kind = kind;
            binary.interpreter = interpreter;
        }
        Err(err) => {
            return Err(PartialParse {
                partial: binary,
                source: err.into(),
            })
        }
    }

    if binary.kind.is_dynamic() {
        let loader_interpreter = binary
            .interpreter
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_INTERPRETER));
        debug!(
            "invoking loader {} for {}",
            loader_interpreter.display(),
            binary.path.display()
        );
        match loader::dependencies(&binary.path, &loader_interpreter) {
            Ok(deps) => binary.dependencies = pathutils::sort_and_dedup_by_filename(deps),
            Err(err) => {
                return Err(PartialParse {
                    partial: binary,
                    source: err.into(),
                })
            }
        }
    }

    Ok(binary)
}

/// Parse the ELF header and program headers of `bytes`, returning class,
/// kind and interpreter. Does not touch the filesystem or subprocesses.
fn parse_header(bytes: &[u8]) -> Result<(Class, Kind, Option<PathBuf>), ElfError> {
    if bytes.is_empty() {
        return Err(ElfError::Empty);
    }
    if bytes.len() < 4 || &bytes[0..4] != b"\x7fELF" {
        let mut magic = [0u8; 4];
        let n = bytes.len().min(4);
        magic[..n].copy_from_slice(&bytes[..n]);
        return Err(ElfError::BadMagic(magic));
    }

    let elf = Elf::parse(bytes)?;

    let class = match elf.header.e_ident[header::EI_CLASS] {
        header::ELFCLASS32 => Class::Bit32,
        header::ELFCLASS64 => Class::Bit64,
        _ => Class::Unknown,
    };

    let interpreter = match elf
        .program_headers
        .iter()
        .find(|ph| ph.p_type == program_header::PT_INTERP)
    {
        Some(ph) => Some(read_interpreter(bytes, ph.p_offset, ph.p_filesz)?),
        None => None,
    };

    let kind = match elf.header.e_type {
        header::ET_EXEC => Kind::EXECUTABLE,
        header::ET_DYN => {
            let is_pie = elf
                .dynamic
                .as_ref()
                .and_then(|dynamic| {
                    dynamic
                        .dyns
                        .iter()
                        .find(|d| d.d_tag == dynamic::DT_FLAGS_1)
                })
                .is_some_and(|d| d.d_val & DF_1_PIE != 0);
            if is_pie {
                Kind::PIE
            } else {
                Kind::DYNAMIC
            }
        }
        other => return Err(ElfError::UnsupportedType(other)),
    };

    if kind.is_pie() && interpreter.is_none() {
        return Err(ElfError::BadInterpreter);
    }

    Ok((class, kind, interpreter))
}

/// Read the `PT_INTERP` segment contents, stripping the single trailing
/// NUL and rejecting truncated or noisy entries.
fn read_interpreter(bytes: &[u8], offset: u64, filesz: u64) -> Result<PathBuf, ElfError> {
    let start = offset as usize;
    let end = start
        .checked_add(filesz as usize)
        .filter(|&end| end <= bytes.len())
        .ok_or(ElfError::BadInterpreter)?;
    let raw = &bytes[start..end];

    match raw.iter().position(|&b| b == 0) {
        Some(pos) if pos == raw.len() - 1 && pos > 0 => {
            Ok(PathBuf::from(String::from_utf8_lossy(&raw[..pos]).into_owned()))
        }
        _ => Err(ElfError::BadInterpreter),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_pie_contains_executable_and_dynamic() {
        assert!(Kind::PIE.is_executable());
        assert!(Kind::PIE.is_dynamic());
        assert!(Kind::PIE.is_pie());
        assert!(!Kind::EXECUTABLE.is_dynamic());
        assert!(!Kind::DYNAMIC.is_executable());
    }

    #[test]
    fn empty_file_is_invalid() {
        let err = parse_header(&[]).unwrap_err();
        assert!(matches!(err, ElfError::Empty));
    }

    #[test]
    fn bad_magic_is_reported_verbatim() {
        let err = parse_header(b"#!/bin/sh\n").unwrap_err();
        match err {
            ElfError::BadMagic(magic) => assert_eq!(magic, *b"#!/b"),
            other => panic!("expected BadMagic, got {other:?}"),
        }
    }

    #[test]
    fn interpreter_without_trailing_nul_is_bad() {
        let err = read_interpreter(b"/lib64/ld-linux-x86-64.so.2", 0, 28).unwrap_err();
        assert!(matches!(err, ElfError::BadInterpreter));
    }

    #[test]
    fn interpreter_with_embedded_nul_is_bad() {
        let raw = b"/lib64/ld\0-linux.so.2\0";
        let err = read_interpreter(raw, 0, raw.len() as u64).unwrap_err();
        assert!(matches!(err, ElfError::BadInterpreter));
    }

    #[test]
    fn well_formed_interpreter_is_stripped_of_its_nul() {
        let raw = b"/lib64/ld-linux-x86-64.so.2\0";
        let interp = read_interpreter(raw, 0, raw.len() as u64).unwrap();
        assert_eq!(interp, PathBuf::from("/lib64/ld-linux-x86-64.so.2"));
    }
}
