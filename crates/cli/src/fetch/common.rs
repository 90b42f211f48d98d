//! Shared infrastructure for `slotsync fetch`.
//!
//! - `FetchClient`: HTTP client with retry / backoff / error classification
//! - `resolve_credential`: flag > env > none
//! - `write_snapshot`: write fetched players to a file or stdout

use std::io::Write;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use slotsync_recon::SourceRecord;
use tracing::{debug, warn};

use crate::exit_codes;
use crate::CliError;

// ── Constants ───────────────────────────────────────────────────────

pub(super) const MAX_RETRIES: u32 = 3;
pub(super) const USER_AGENT: &str = concat!("slotsync/", env!("CARGO_PKG_VERSION"));

// ── FetchClient ─────────────────────────────────────────────────────

/// Shared HTTP client that handles retry, backoff, and error classification.
///
/// Adapters own their base URL and auth method. They pass a
/// request-building closure to [`request_with_retry`] which handles
/// the retry loop and maps HTTP status codes to the standard exit codes.
///
/// [`request_with_retry`]: FetchClient::request_with_retry
pub(super) struct FetchClient {
    pub(super) http: reqwest::blocking::Client,
    source_name: String,
    status_hint: fn(u16) -> Option<&'static str>,
    initial_backoff: Duration,
}

impl FetchClient {
    pub(super) fn new(
        source_name: &str,
        status_hint: fn(u16) -> Option<&'static str>,
    ) -> Result<Self, CliError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| CliError {
                code: exit_codes::EXIT_ERROR,
                message: format!("failed to build HTTP client: {e}"),
                hint: None,
            })?;

        Ok(Self {
            http,
            source_name: source_name.to_string(),
            status_hint,
            initial_backoff: Duration::from_secs(1),
        })
    }

    /// First retry delay; doubles on each further attempt.
    #[cfg(test)]
    pub(super) fn with_initial_backoff(mut self, backoff: Duration) -> Self {
        self.initial_backoff = backoff;
        self
    }

    fn fail(&self, code: u8, status: u16, message: String) -> CliError {
        CliError {
            code,
            message,
            hint: (self.status_hint)(status).map(String::from),
        }
    }

    /// Make a GET request with retry + exponential backoff.
    ///
    /// `build_request` is called once per attempt. It receives the
    /// underlying `reqwest::blocking::Client` and must return a fully
    /// configured `RequestBuilder` (URL, auth, headers, query params).
    pub(super) fn request_with_retry(
        &self,
        build_request: impl Fn(&reqwest::blocking::Client) -> reqwest::blocking::RequestBuilder,
    ) -> Result<serde_json::Value, CliError> {
        let mut backoff = self.initial_backoff;
        let mut attempt = 0u32;

        loop {
            let result = build_request(&self.http).send();

            let resp = match result {
                Ok(resp) => resp,
                Err(e) => {
                    // Network/timeout errors: retry
                    if attempt == MAX_RETRIES {
                        return Err(CliError {
                            code: exit_codes::EXIT_FETCH_UPSTREAM,
                            message: format!(
                                "{} upstream error after {} attempts: {}",
                                self.source_name, MAX_RETRIES + 1, e,
                            ),
                            hint: Some("check your network connection".into()),
                        });
                    }
                    attempt += 1;
                    warn!(attempt, max = MAX_RETRIES, wait = ?backoff, error = %e, "retrying request");
                    thread::sleep(backoff);
                    backoff *= 2;
                    continue;
                }
            };

            let status = resp.status().as_u16();

            // Auth errors: fail immediately
            if status == 401 || status == 403 {
                return Err(self.fail(
                    exit_codes::EXIT_FETCH_AUTH,
                    status,
                    format!("{} auth failed ({})", self.source_name, status),
                ));
            }

            // Bad request / unknown resource: fail immediately
            if status == 400 || status == 404 {
                return Err(self.fail(
                    exit_codes::EXIT_FETCH_VALIDATION,
                    status,
                    format!("{} request rejected ({})", self.source_name, status),
                ));
            }

            // Other 4xx (not 429): fail immediately
            if (400..500).contains(&status) && status != 429 {
                return Err(self.fail(
                    exit_codes::EXIT_FETCH_UPSTREAM,
                    status,
                    format!("{} error ({})", self.source_name, status),
                ));
            }

            // Retryable: 429, 5xx
            if status == 429 || status >= 500 {
                if attempt == MAX_RETRIES {
                    let (code, what) = if status == 429 {
                        (exit_codes::EXIT_FETCH_RATE_LIMIT, "rate limited")
                    } else {
                        (exit_codes::EXIT_FETCH_UPSTREAM, "upstream error")
                    };
                    return Err(self.fail(
                        code,
                        status,
                        format!(
                            "{} {} after {} attempts ({})",
                            self.source_name, what, MAX_RETRIES + 1, status,
                        ),
                    ));
                }

                // Respect Retry-After header for 429
                let wait = if status == 429 {
                    resp.headers()
                        .get("retry-after")
                        .and_then(|v| v.to_str().ok())
                        .and_then(|v| v.parse::<u64>().ok())
                        .map(Duration::from_secs)
                        .unwrap_or(backoff)
                } else {
                    backoff
                };

                attempt += 1;
                warn!(attempt, max = MAX_RETRIES, wait = ?wait, status, "retrying request");
                thread::sleep(wait);
                backoff *= 2;
                continue;
            }

            let text = resp.text().map_err(|e| CliError {
                code: exit_codes::EXIT_FETCH_UPSTREAM,
                message: format!("failed to read {} response body: {}", self.source_name, e),
                hint: None,
            })?;
            let trimmed = text.trim_start_matches('\u{feff}');
            debug!(source = %self.source_name, bytes = trimmed.len(), "response received");

            return serde_json::from_str(trimmed).map_err(|e| CliError {
                code: exit_codes::EXIT_FETCH_UPSTREAM,
                message: format!(
                    "failed to parse {} JSON response: {} (body: {})",
                    self.source_name,
                    e,
                    truncate(trimmed, 200),
                ),
                hint: None,
            });
        }
    }
}

fn truncate(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

// ── Credentials ─────────────────────────────────────────────────────

/// Resolve an optional credential: flag > env > none. Blank values count
/// as absent.
pub(super) fn resolve_credential(flag: Option<String>, env_var: &str) -> Option<String> {
    let from_env = || std::env::var(env_var).ok();
    flag.or_else(from_env)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// ── Snapshot output ─────────────────────────────────────────────────

/// Write fetched players as a JSON snapshot (file or stdout). Returns the
/// output label for use in progress messages.
pub(super) fn write_snapshot(
    players: &[SourceRecord],
    out: &Option<PathBuf>,
) -> Result<String, CliError> {
    match out {
        Some(path) => {
            slotsync_io::json::write_snapshot(path, players).map_err(CliError::from)?;
            Ok(path.display().to_string())
        }
        None => {
            let mut stdout = std::io::BufWriter::new(std::io::stdout().lock());
            serde_json::to_writer_pretty(&mut stdout, players)
                .map_err(|e| CliError::io(format!("JSON write error: {}", e)))?;
            writeln!(stdout).map_err(|e| CliError::io(format!("stdout write error: {}", e)))?;
            stdout
                .flush()
                .map_err(|e| CliError::io(format!("stdout flush error: {}", e)))?;
            Ok("stdout".to_string())
        }
    }
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_credential_flag_priority() {
        std::env::set_var("__SLOTSYNC_TEST_CRED_FLAG", "from_env");
        let value = resolve_credential(Some("  token_123  ".into()), "__SLOTSYNC_TEST_CRED_FLAG");
        assert_eq!(value.as_deref(), Some("token_123"));
    }

    #[test]
    fn test_resolve_credential_env_fallback() {
        std::env::set_var("__SLOTSYNC_TEST_CRED_ENV", " from_env ");
        let value = resolve_credential(None, "__SLOTSYNC_TEST_CRED_ENV");
        assert_eq!(value.as_deref(), Some("from_env"));
    }

    #[test]
    fn test_resolve_credential_blank_is_absent() {
        std::env::remove_var("__SLOTSYNC_TEST_CRED_MISSING");
        assert!(resolve_credential(Some("   ".into()), "__SLOTSYNC_TEST_CRED_MISSING").is_none());
        assert!(resolve_credential(None, "__SLOTSYNC_TEST_CRED_MISSING").is_none());
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate("José Ramírez", 4), "José");
        assert_eq!(truncate("short", 200), "short");
    }
}
