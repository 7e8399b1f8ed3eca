//! Login session persistence.

use std::fs;
use std::io;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use crate::api::Error;

/// A login session: the bearer token for one backend.
///
/// The token is kept in memory and, when a directory is available, mirrored
/// to a file in it. The file is named after the backend URL, so sessions for
/// different backends live side by side.
#[derive(Debug)]
pub struct Session {
  token: Option<String>,
  file: Option<PathBuf>,
}

impl Session {
  /// Creates a [`Session`] for `base_url`, stored in the default location.
  ///
  /// If there is no home directory, the session is kept in memory only.
  pub fn new(base_url: &str) -> Self {
    match Self::default_dir() {
      Some(dir) => Self::with_dir(base_url, dir),
      None => Self::in_memory(),
    }
  }

  /// Creates a [`Session`] for `base_url`, stored under `dir`.
  ///
  /// A token previously stored there is picked up.
  pub fn with_dir(base_url: &str, dir: impl Into<PathBuf>) -> Self {
    let mut file = dir.into();
    file.push(Self::encode_key(base_url));

    let token = match Self::unearth(&file) {
      Ok(token) => token,
      Err(e) => {
        tracing::warn!(path = %file.display(), "could not read session: {}", e);
        None
      }
    };

    Self {
      token,
      file: Some(file),
    }
  }

  /// Creates a [`Session`] which never touches the disk.
  pub fn in_memory() -> Self {
    Self {
      token: None,
      file: None,
    }
  }

  /// Returns the default session directory, `~/.catchdex`.
  pub fn default_dir() -> Option<PathBuf> {
    let mut dir = dirs::home_dir()?;
    dir.push(".catchdex");
    Some(dir)
  }

  /// Returns the current token, if logged in.
  pub fn token(&self) -> Option<&str> {
    self.token.as_deref()
  }

  /// Returns the file this session is stored in, if any.
  pub fn path(&self) -> Option<&Path> {
    self.file.as_deref()
  }

  /// Replaces the current token.
  ///
  /// If the session directory cannot be created, the session falls back to
  /// memory; the token remains usable for the rest of the process.
  pub fn set(&mut self, token: String) -> Result<(), Error> {
    if let Some(file) = &self.file {
      if !Self::bury(file, &token)? {
        tracing::warn!(
          path = %file.display(),
          "session directory unavailable; keeping session in memory"
        );
        self.file = None;
      }
    }

    tracing::info!("session started");
    self.token = Some(token);
    Ok(())
  }

  /// Forgets the current token, deleting it from disk.
  pub fn clear(&mut self) -> Result<(), Error> {
    if let Some(file) = &self.file {
      match fs::remove_file(file) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
      }
    }

    if self.token.take().is_some() {
      tracing::info!("session ended");
    }
    Ok(())
  }

  /// Writes `token` to `file`; returns `false` if its directory could not be
  /// created.
  fn bury(file: &Path, token: &str) -> Result<bool, Error> {
    if let Some(dir) = file.parent() {
      if !dir.exists() && fs::create_dir_all(dir).is_err() {
        return Ok(false);
      }
    }

    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
      use std::os::unix::fs::OpenOptionsExt;
      use std::os::unix::fs::PermissionsExt;
      options.mode(0o600);
      // `mode` only applies to new files.
      if file.exists() {
        fs::set_permissions(file, fs::Permissions::from_mode(0o600))?;
      }
    }

    options.open(file)?.write_all(token.as_bytes())?;
    Ok(true)
  }

  /// Reads a token back out of `file`.
  fn unearth(file: &Path) -> Result<Option<String>, Error> {
    if !file.exists() {
      return Ok(None);
    }

    let token = fs::read_to_string(file)?;
    let token = token.trim();
    Ok(if token.is_empty() {
      None
    } else {
      Some(token.to_string())
    })
  }

  /// Encodes `key` for the purposes of being a file name.
  fn encode_key(key: &str) -> String {
    base64::encode_config(key.as_bytes(), base64::URL_SAFE)
  }
}
