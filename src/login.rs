//! Passwordless login handshake.
//!
//! ```text
//! Idle --begin()--> AwaitingVerification --await_verification()--> Verified
//!                                                              \--> TimedOut
//! ```
//!
//! `begin` submits the email and receives a one-time login hash. Polling
//! then checks the hash on every tick until the server reports it verified
//! or the deadline passes. The deadline and the ticker feed one `select!`;
//! an in-flight poll is dropped when the deadline fires, so no request
//! outlives a timeout and none is issued after it.

use std::time::Duration;

use async_trait::async_trait;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{info, warn};

use crate::api::{ApiClient, LoginStatus, LoginTicket};
use crate::error::ApiError;
use crate::types::LoginSession;

/// Server calls used by the handshake.
#[async_trait]
pub trait LoginTransport {
    /// Request a one-time login hash for `email`.
    async fn initiate(&self, email: &str) -> Result<LoginTicket, ApiError>;

    /// Check whether `hash` has been verified.
    async fn check(&self, email: &str, hash: &str) -> Result<LoginStatus, ApiError>;
}

#[async_trait]
impl LoginTransport for ApiClient {
    async fn initiate(&self, email: &str) -> Result<LoginTicket, ApiError> {
        self.initiate_login(email).await
    }

    async fn check(&self, email: &str, hash: &str) -> Result<LoginStatus, ApiError> {
        self.login_status(email, hash).await
    }
}

/// Polling cadence and overall deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandshakeTiming {
    pub poll_interval: Duration,
    pub deadline: Duration,
}

impl Default for HandshakeTiming {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(10),
            deadline: Duration::from_secs(5 * 60),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandshakeState {
    Idle,
    AwaitingVerification { email: String, login_hash: String },
    Verified { token: String },
    TimedOut,
}

/// Two-step login: hash issuance, then polling until verified or timed out.
#[derive(Debug)]
pub struct LoginHandshake<T> {
    transport: T,
    timing: HandshakeTiming,
    state: HandshakeState,
    polls: u32,
}

impl<T: LoginTransport> LoginHandshake<T> {
    pub fn new(transport: T, timing: HandshakeTiming) -> Self {
        Self {
            transport,
            timing,
            state: HandshakeState::Idle,
            polls: 0,
        }
    }

    pub fn state(&self) -> &HandshakeState {
        &self.state
    }

    /// Number of status checks issued so far.
    pub fn polls(&self) -> u32 {
        self.polls
    }

    /// Submit `email` and move to `AwaitingVerification`.
    ///
    /// # Errors
    ///
    /// Fails immediately, without retry, if the server rejects the request.
    /// The state stays `Idle`. A handshake that has already left `Idle` is
    /// never restarted: `ApiError::HandshakeAlreadyStarted` is returned and
    /// no request is sent.
    pub async fn begin(&mut self, email: &str) -> Result<LoginTicket, ApiError> {
        if self.state != HandshakeState::Idle {
            return Err(ApiError::HandshakeAlreadyStarted);
        }
        let ticket = self.transport.initiate(email).await?;
        info!(email, "login hash issued, awaiting verification");
        self.state = HandshakeState::AwaitingVerification {
            email: email.to_string(),
            login_hash: ticket.login_hash.clone(),
        };
        Ok(ticket)
    }

    /// Poll until the hash is verified or the deadline passes.
    ///
    /// Poll failures are logged and do not end the loop.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::LoginTimeout` when the deadline passes first.
    pub async fn await_verification(&mut self) -> Result<LoginSession, ApiError> {
        let (email, login_hash) = match &self.state {
            HandshakeState::AwaitingVerification { email, login_hash } => {
                (email.clone(), login_hash.clone())
            }
            HandshakeState::Verified { .. } | HandshakeState::TimedOut | HandshakeState::Idle => {
                return Err(ApiError::NotAwaitingVerification);
            }
        };

        let deadline = time::sleep(self.timing.deadline);
        tokio::pin!(deadline);
        let mut ticker = time::interval_at(
            Instant::now() + self.timing.poll_interval,
            self.timing.poll_interval,
        );
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;

                () = &mut deadline => break,

                _ = ticker.tick() => {
                    self.polls += 1;
                    let outcome = tokio::select! {
                        biased;
                        () = &mut deadline => break,
                        outcome = self.transport.check(&email, &login_hash) => outcome,
                    };

                    match outcome {
                        Ok(LoginStatus { login_hash_verified: true, token: Some(token) })
                            if !token.is_empty() =>
                        {
                            info!(email = %email, "login verified");
                            self.state = HandshakeState::Verified { token: token.clone() };
                            return Ok(LoginSession { email, token });
                        }
                        Ok(LoginStatus { login_hash_verified: true, .. }) => {
                            warn!("login reported verified without a token; polling again");
                        }
                        Ok(_) => {}
                        Err(e) => warn!(error = %e, "error checking login status"),
                    }
                }
            }
        }

        warn!(after = ?self.timing.deadline, "login timed out");
        self.state = HandshakeState::TimedOut;
        Err(ApiError::LoginTimeout {
            after: self.timing.deadline,
        })
    }
}
