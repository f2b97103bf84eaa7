//! Read-only access to zip exports submitted by participants.
//!
//! Extractors validate an archive once by listing its members and later read
//! individual members by their full in-archive name.

use std::{
    fs::File,
    io::{self, BufReader, Read},
    path::{Path, PathBuf},
};

use thiserror::Error;
use zip::{ZipArchive, result::ZipError};

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("could not open archive {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("archive {path} is not a readable zip file: {reason}")]
    Corrupted { path: PathBuf, reason: String },

    #[error("archive member not found: {member}")]
    MemberNotFound { member: String },

    #[error("could not read archive member {member}: {source}")]
    Read {
        member: String,
        #[source]
        source: io::Error,
    },

    #[error("archive member {member} is not valid UTF-8")]
    NotUtf8 { member: String },
}

fn open_archive(path: &Path) -> Result<ZipArchive<BufReader<File>>, ArchiveError> {
    let file = File::open(path).map_err(|source| ArchiveError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    ZipArchive::new(BufReader::new(file)).map_err(|error| ArchiveError::Corrupted {
        path: path.to_path_buf(),
        reason: error.to_string(),
    })
}

/// Lists the file members of the archive at `path`, skipping directory entries.
pub fn list_members(path: &Path) -> Result<Vec<String>, ArchiveError> {
    let archive = open_archive(path)?;
    Ok(archive
        .file_names()
        .filter(|name| !name.ends_with('/'))
        .map(str::to_string)
        .collect())
}

/// Reads one member by its full in-archive name.
pub fn read_member(path: &Path, member: &str) -> Result<Vec<u8>, ArchiveError> {
    let mut archive = open_archive(path)?;
    let mut entry = archive.by_name(member).map_err(|error| match error {
        ZipError::FileNotFound => ArchiveError::MemberNotFound { member: member.to_string() },
        other => ArchiveError::Corrupted {
            path: path.to_path_buf(),
            reason: other.to_string(),
        },
    })?;

    let mut buffer = Vec::with_capacity(usize::try_from(entry.size()).unwrap_or(0));
    entry.read_to_end(&mut buffer).map_err(|source| ArchiveError::Read {
        member: member.to_string(),
        source,
    })?;
    Ok(buffer)
}

/// Reads one member as UTF-8 text, dropping a leading byte-order mark.
pub fn read_member_to_string(path: &Path, member: &str) -> Result<String, ArchiveError> {
    let bytes = read_member(path, member)?;
    let text = String::from_utf8(bytes).map_err(|_| ArchiveError::NotUtf8 { member: member.to_string() })?;
    Ok(match text.strip_prefix('\u{feff}') {
        Some(stripped) => stripped.to_string(),
        None => text,
    })
}

/// Final path component of an archive member name.
pub fn basename(member: &str) -> &str {
    member.rsplit(['/', '\\']).next().unwrap_or(member)
}

/// Finds the first member whose basename equals `file_name` (ASCII case-insensitive).
pub fn find_member<'a>(members: &'a [String], file_name: &str) -> Option<&'a str> {
    members
        .iter()
        .map(String::as_str)
        .find(|member| basename(member).eq_ignore_ascii_case(file_name))
}
