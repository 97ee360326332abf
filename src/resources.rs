//! Named plain-text fragments read from a directory

use std::fs;
use std::io::ErrorKind as IoErrorKind;
use std::path::PathBuf;
use log::{debug, error};
use crate::error::{Error, Result};

#[derive(Debug, Clone)]
pub struct ResourceDir
{   root: PathBuf
}

impl ResourceDir
{   pub fn new(root: impl Into<PathBuf>) -> Self
    {   ResourceDir { root: root.into() }
    }

    /// Read `name` with surrounding whitespace trimmed
    pub fn load(&self, name: &str) -> Result<String>
    {   let path = self.root.join(name);
        debug!("Loading text resource: {}", path.display());
        fs::read_to_string(&path)
          .map(|s| s.trim().to_string())
          .map_err(|e| {
            error!("Cannot read {}: {}", path.display(), e);
            if e.kind() == IoErrorKind::NotFound
            {   Error::ResourceNotFound(name.to_string())
            } else
            {   Error::InvalidConfiguration(
                  format!("cannot read {}: {}", name, e)
                )
            }
          })
    }

    /// Non-blank lines of `name`, trimmed, in file order
    pub fn load_lines(&self, name: &str) -> Result<Vec<String>>
    {   Ok(self.load(name)?
          .lines()
          .map(str::trim)
          .filter(|l| !l.is_empty())
          .map(str::to_string)
          .collect())
    }
}
