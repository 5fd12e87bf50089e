//! Symmetric decryption of archive nodes.
//!
//! # Responsibility
//! - Define the decryption seam used by the archive parser.
//! - Provide a `gpg`-backed implementation for OpenPGP armored blocks.
//!
//! # Invariants
//! - Passphrases are passed through, never stored or logged.
//! - Implementations are shareable across parser worker threads.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};

const MAX_GPG_MESSAGE_CHARS: usize = 200;

/// Failure to decrypt one ciphertext block.
#[derive(Debug)]
pub enum DecryptionError {
    /// Wrong passphrase or corrupt ciphertext.
    Rejected(String),
    /// Plaintext is not valid UTF-8.
    InvalidUtf8,
    Io(io::Error),
}

impl Display for DecryptionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rejected(message) => write!(f, "decryption rejected: {message}"),
            Self::InvalidUtf8 => write!(f, "decrypted text is not valid UTF-8"),
            Self::Io(err) => write!(f, "decryption process failed: {err}"),
        }
    }
}

impl Error for DecryptionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for DecryptionError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

/// Decrypts one symmetrically encrypted block.
pub trait Decryptor: Send + Sync {
    fn decrypt(&self, ciphertext: &str, passphrase: &str) -> Result<String, DecryptionError>;
}

impl<F> Decryptor for F
where
    F: Fn(&str, &str) -> Result<String, DecryptionError> + Send + Sync,
{
    fn decrypt(&self, ciphertext: &str, passphrase: &str) -> Result<String, DecryptionError> {
        self(ciphertext, passphrase)
    }
}

/// Decryptor that shells out to the `gpg` binary in batch mode.
#[derive(Debug, Clone)]
pub struct GpgDecryptor {
    program: PathBuf,
}

impl GpgDecryptor {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for GpgDecryptor {
    fn default() -> Self {
        Self::new("gpg")
    }
}

impl Decryptor for GpgDecryptor {
    fn decrypt(&self, ciphertext: &str, passphrase: &str) -> Result<String, DecryptionError> {
        // The passphrase goes over stdin, so the ciphertext needs its own file.
        let mut cipher_file = tempfile::NamedTempFile::new()?;
        cipher_file.write_all(ciphertext.as_bytes())?;
        cipher_file.flush()?;

        let mut child = Command::new(&self.program)
            .args([
                "--batch",
                "--quiet",
                "--no-tty",
                "--pinentry-mode",
                "loopback",
                "--passphrase-fd",
                "0",
                "--decrypt",
            ])
            .arg(cipher_file.path())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        // Closing stdin before waiting lets gpg see end of input.
        let sent = match child.stdin.take() {
            Some(mut stdin) => writeln!(stdin, "{passphrase}"),
            None => Ok(()),
        };

        // Reap the child even when it exited before reading the passphrase.
        let output = child.wait_with_output()?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DecryptionError::Rejected(summarize(&stderr)));
        }
        sent?;

        String::from_utf8(output.stdout).map_err(|_| DecryptionError::InvalidUtf8)
    }
}

fn summarize(stderr: &str) -> String {
    let line = stderr
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or("gpg exited with failure");
    line.chars().take(MAX_GPG_MESSAGE_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::{summarize, DecryptionError, Decryptor, GpgDecryptor};

    #[test]
    fn closures_act_as_decryptors() {
        let reverse = |cipher: &str, _: &str| -> Result<String, DecryptionError> {
            Ok(cipher.chars().rev().collect())
        };
        assert_eq!(reverse.decrypt("cba", "pw").unwrap(), "abc");
    }

    #[test]
    fn missing_gpg_binary_is_an_io_error() {
        let decryptor = GpgDecryptor::new("/nonexistent/akku-test-gpg");
        let err = decryptor.decrypt("cipher", "pw").unwrap_err();
        assert!(matches!(err, DecryptionError::Io(_)));
    }

    #[cfg(unix)]
    #[test]
    fn early_exit_without_reading_passphrase_is_rejected() {
        // `false` ignores its arguments and never reads stdin.
        let decryptor = GpgDecryptor::new("false");
        let passphrase = "x".repeat(1 << 20);
        let err = decryptor.decrypt("cipher", &passphrase).unwrap_err();
        assert!(matches!(err, DecryptionError::Rejected(_)));
    }

    #[test]
    fn summarize_uses_first_non_empty_line() {
        assert_eq!(
            summarize("\n gpg: decryption failed: Bad session key\nmore"),
            "gpg: decryption failed: Bad session key"
        );
        assert_eq!(summarize(""), "gpg exited with failure");
    }
}
