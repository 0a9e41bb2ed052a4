//! Name and path validation for actor registration.
//!
//! Names are restricted to a safe character set so that `/`-joined paths
//! can be parsed back unambiguously.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

static NAME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z0-9_-]+$").unwrap());
static PATH_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z0-9/._-]+$").unwrap());

#[derive(Debug, Error, Clone)]
#[error("invalid actor name \"{name}\": must contain only a-Z, 0-9, _ or -")]
pub struct InvalidName {
    pub name: String,
}

#[derive(Debug, Error, Clone)]
#[error("invalid actor path \"{path}\": must contain only a-Z, 0-9, /, ., _ or -")]
pub struct InvalidPath {
    pub path: String,
}

pub fn validate_name(name: &str) -> Result<(), InvalidName> {
    if name.is_empty() || !NAME_RE.is_match(name) {
        Err(InvalidName { name: name.into() })
    } else {
        Ok(())
    }
}

pub fn validate_path(path: &str) -> Result<(), InvalidPath> {
    if !PATH_RE.is_match(path) {
        Err(InvalidPath { path: path.into() })
    } else {
        Ok(())
    }
}
