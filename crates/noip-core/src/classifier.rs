//! Interpretation of the provider's textual status codes
//!
//! The update endpoint answers with a short ASCII token such as `good 1.2.3.4`,
//! `nochg 1.2.3.4` or `badauth`. [`classify`] maps every possible body to an
//! [`UpdateOutcome`]; unknown bodies are a regular outcome, not an error.

use std::fmt;

/// Normalized classification of a provider response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutcomeCode {
    /// Hostname updated
    Good,
    /// Address already current
    NoChange,
    /// Hostname does not exist under the account
    NoHost,
    /// Wrong username/password
    BadAuth,
    /// Client has been disabled by the provider
    BadAgent,
    /// Feature not available to this account tier
    NotDonator,
    /// Account blocked for abuse
    Abuse,
    /// Provider-side fatal error
    Fatal911,
    /// The request never produced a response body
    TransportError,
    /// Anything the provider vocabulary does not define
    Unknown,
}

impl OutcomeCode {
    /// Short stable name, used in logs and events
    pub fn as_str(&self) -> &'static str {
        match self {
            OutcomeCode::Good => "good",
            OutcomeCode::NoChange => "nochg",
            OutcomeCode::NoHost => "nohost",
            OutcomeCode::BadAuth => "badauth",
            OutcomeCode::BadAgent => "badagent",
            OutcomeCode::NotDonator => "!donator",
            OutcomeCode::Abuse => "abuse",
            OutcomeCode::Fatal911 => "911",
            OutcomeCode::TransportError => "transport_error",
            OutcomeCode::Unknown => "unknown",
        }
    }
}

impl fmt::Display for OutcomeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one update attempt, produced by [`classify`] or
/// [`UpdateOutcome::transport_failure`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateOutcome {
    pub succeeded: bool,
    pub code: OutcomeCode,
    pub reason: String,
    pub raw_response: String,
}

impl UpdateOutcome {
    fn new(succeeded: bool, code: OutcomeCode, reason: &str, raw: &str) -> Self {
        Self {
            succeeded,
            code,
            reason: reason.to_string(),
            raw_response: raw.to_string(),
        }
    }

    /// Outcome for a request that failed below the protocol level
    pub fn transport_failure(reason: impl Into<String>) -> Self {
        Self {
            succeeded: false,
            code: OutcomeCode::TransportError,
            reason: reason.into(),
            raw_response: String::new(),
        }
    }

    /// Text to show the user: the reason, or the raw body when there is none
    pub fn display_message(&self) -> &str {
        if self.reason.is_empty() {
            &self.raw_response
        } else {
            &self.reason
        }
    }
}

const REASON_GOOD: &str = "DNS hostname update successful.";
const REASON_NOCHG: &str = "IP address is current, no update performed.";
const REASON_NOHOST: &str = "Hostname supplied does not exist under specified account.";
const REASON_BADAUTH: &str = "Invalid username password combination";
const REASON_BADAGENT: &str = "Client disabled.";
const REASON_DONATOR: &str = "An update request was sent including a feature that is not \
     available to that particular user such as offline options.";
const REASON_ABUSE: &str = "Username is blocked due to abuse. Either for not following the \
     update specifications or disabled due to violation of the No-IP terms of service.";
const REASON_911: &str = "Fatal error on provider side; retry no sooner than 30 minutes.";

/// Classify a raw provider response
///
/// First match wins: `good` and `nochg` are prefix matches (the provider
/// appends the address), every error token must match exactly. Surrounding
/// whitespace is ignored; the returned `raw_response` is the untouched input.
pub fn classify(raw: &str) -> UpdateOutcome {
    let body = raw.trim();

    if body.starts_with("good") {
        return UpdateOutcome::new(true, OutcomeCode::Good, REASON_GOOD, raw);
    }
    if body.starts_with("nochg") {
        return UpdateOutcome::new(true, OutcomeCode::NoChange, REASON_NOCHG, raw);
    }

    let (code, reason) = match body {
        "nohost" => (OutcomeCode::NoHost, REASON_NOHOST),
        "badauth" => (OutcomeCode::BadAuth, REASON_BADAUTH),
        "badagent" => (OutcomeCode::BadAgent, REASON_BADAGENT),
        "!donator" => (OutcomeCode::NotDonator, REASON_DONATOR),
        "abuse" => (OutcomeCode::Abuse, REASON_ABUSE),
        "911" => (OutcomeCode::Fatal911, REASON_911),
        _ => (OutcomeCode::Unknown, ""),
    };

    UpdateOutcome::new(false, code, reason, raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn good_prefix_succeeds_with_trailing_address() {
        let outcome = classify("good 203.0.113.5");
        assert!(outcome.succeeded);
        assert_eq!(outcome.code, OutcomeCode::Good);
        assert_eq!(outcome.reason, "DNS hostname update successful.");
        assert_eq!(outcome.raw_response, "good 203.0.113.5");
    }

    #[test]
    fn nochg_prefix_succeeds() {
        for raw in ["nochg", "nochg 203.0.113.5"] {
            let outcome = classify(raw);
            assert!(outcome.succeeded, "{raw}");
            assert_eq!(outcome.code, OutcomeCode::NoChange);
            assert_eq!(outcome.reason, "IP address is current, no update performed.");
        }
    }

    #[test]
    fn error_tokens_fail_with_their_code() {
        let cases = [
            ("nohost", OutcomeCode::NoHost),
            ("badauth", OutcomeCode::BadAuth),
            ("badagent", OutcomeCode::BadAgent),
            ("!donator", OutcomeCode::NotDonator),
            ("abuse", OutcomeCode::Abuse),
            ("911", OutcomeCode::Fatal911),
        ];

        for (raw, code) in cases {
            let outcome = classify(raw);
            assert!(!outcome.succeeded, "{raw} must not succeed");
            assert_eq!(outcome.code, code);
            assert!(!outcome.reason.is_empty());
        }
    }

    #[test]
    fn badauth_reason_text() {
        assert_eq!(
            classify("badauth").reason,
            "Invalid username password combination"
        );
    }

    #[test]
    fn error_tokens_are_exact_matches() {
        // Only good/nochg are prefixes
        let outcome = classify("badauth please");
        assert_eq!(outcome.code, OutcomeCode::Unknown);
        assert!(!outcome.succeeded);

        assert_eq!(classify("9111").code, OutcomeCode::Unknown);
    }

    #[test]
    fn unknown_input_is_a_failure_with_empty_reason() {
        for raw in ["", "Good", "<html>", "dnserr"] {
            let outcome = classify(raw);
            assert!(!outcome.succeeded);
            assert_eq!(outcome.code, OutcomeCode::Unknown);
            assert_eq!(outcome.reason, "");
            assert_eq!(outcome.display_message(), raw);
        }
    }

    #[test]
    fn trailing_newline_is_ignored_for_matching() {
        let outcome = classify("nohost\r\n");
        assert_eq!(outcome.code, OutcomeCode::NoHost);
        assert_eq!(outcome.raw_response, "nohost\r\n");
    }

    #[test]
    fn classify_is_deterministic() {
        for raw in ["good 1.2.3.4", "abuse", "whatever"] {
            assert_eq!(classify(raw), classify(raw));
        }
    }

    #[test]
    fn transport_failure_outcome() {
        let outcome = UpdateOutcome::transport_failure("timed out");
        assert!(!outcome.succeeded);
        assert_eq!(outcome.code, OutcomeCode::TransportError);
        assert_eq!(outcome.raw_response, "");
        assert_eq!(outcome.display_message(), "timed out");
    }
}
