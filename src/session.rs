use crate::gateway::{ChatMessage, GatewayError};
use crate::problem::{CodeCapture, ProblemModel};
use crate::prompts::{self, PSEUDOCODE_END, PSEUDOCODE_START};

pub const DEFAULT_ATTEMPT_THRESHOLD: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnRole {
    Student,
    Mentor,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub role: TurnRole,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    Active,
    Ended,
}

/// Per-session conversation state. One instance per tutoring session, never
/// shared across sessions and never persisted.
#[derive(Debug)]
pub struct ConversationState {
    pub problem: ProblemModel,
    pub history: Vec<Turn>,
    pub attempts: u32,
    pub pseudo_given: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptMode {
    Interrogate,
    Reveal,
}

/// One outbound gateway exchange, ready to send: system instruction first,
/// then the replayed conversation.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundCall {
    pub messages: Vec<ChatMessage>,
    pub mode: PromptMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitError {
    EmptyInput,
    ExchangeInFlight,
    NotActive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DotState {
    Empty,
    Used,
    Pseudo,
}

/// The three parts of a compliant Reveal reply, markers excluded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevealSegments {
    pub before: String,
    pub pseudocode: String,
    pub after: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    MentorReply {
        text: String,
        segments: Option<RevealSegments>,
        pseudo_unlocked: bool,
    },
    SessionEnded {
        notice: String,
    },
}

#[derive(Debug, Clone, Copy)]
struct PendingExchange {
    mode: PromptMode,
    opening: bool,
}

/// The tutoring state machine: owns attempt counting, the one-shot pseudocode
/// unlock, history accumulation and credential-failure termination. Exactly
/// one exchange may be in flight at a time; submissions while waiting are
/// rejected.
pub struct TutorSession {
    phase: SessionPhase,
    state: Option<ConversationState>,
    attempt_threshold: u32,
    pending: Option<PendingExchange>,
}

impl TutorSession {
    pub fn new(attempt_threshold: u32) -> Self {
        Self {
            phase: SessionPhase::Idle,
            state: None,
            attempt_threshold: attempt_threshold.max(1),
            pending: None,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_waiting_for_reply(&self) -> bool {
        self.pending.is_some()
    }

    pub fn attempt_threshold(&self) -> u32 {
        self.attempt_threshold
    }

    pub fn state(&self) -> Option<&ConversationState> {
        self.state.as_ref()
    }

    pub fn problem(&self) -> Option<&ProblemModel> {
        self.state.as_ref().map(|state| &state.problem)
    }

    /// Start a new session over a freshly extracted problem. Any previous
    /// session state is discarded; history, attempts and the pseudocode
    /// unlock all reset. Returns the opening exchange, whose synthetic
    /// request is not recorded in history.
    pub fn begin(&mut self, problem: ProblemModel) -> OutboundCall {
        let system = prompts::build_system_prompt(&problem, false, self.attempt_threshold);
        self.state = Some(ConversationState {
            problem,
            history: Vec::new(),
            attempts: 0,
            pseudo_given: false,
        });
        self.phase = SessionPhase::Active;
        self.pending = Some(PendingExchange {
            mode: PromptMode::Interrogate,
            opening: true,
        });
        OutboundCall {
            messages: vec![
                ChatMessage::system(system),
                ChatMessage::user(prompts::opening_request()),
            ],
            mode: PromptMode::Interrogate,
        }
    }

    /// Accept one student turn: append it to history, count the attempt and
    /// decide the gating mode for the reply.
    pub fn submit(&mut self, raw: &str) -> Result<OutboundCall, SubmitError> {
        if self.phase != SessionPhase::Active {
            return Err(SubmitError::NotActive);
        }
        if self.pending.is_some() {
            return Err(SubmitError::ExchangeInFlight);
        }
        let text = raw.trim();
        if text.is_empty() {
            return Err(SubmitError::EmptyInput);
        }
        let threshold = self.attempt_threshold;
        let Some(state) = self.state.as_mut() else {
            return Err(SubmitError::NotActive);
        };

        state.history.push(Turn {
            role: TurnRole::Student,
            text: text.to_string(),
        });
        state.attempts += 1;

        let mode = if state.attempts >= threshold && !state.pseudo_given {
            PromptMode::Reveal
        } else {
            PromptMode::Interrogate
        };
        let system = prompts::build_system_prompt(
            &state.problem,
            mode == PromptMode::Reveal,
            threshold,
        );

        let mut messages = Vec::with_capacity(state.history.len() + 1);
        messages.push(ChatMessage::system(system));
        for turn in &state.history {
            messages.push(match turn.role {
                TurnRole::Student => ChatMessage::user(turn.text.clone()),
                TurnRole::Mentor => ChatMessage::assistant(turn.text.clone()),
            });
        }

        self.pending = Some(PendingExchange {
            mode,
            opening: false,
        });
        Ok(OutboundCall { messages, mode })
    }

    /// Apply the gateway's classified outcome for the in-flight exchange.
    /// Success and recoverable failures both land in history as the mentor's
    /// turn; only a rejected credential ends the session, rolling back the
    /// student turn of the failed exchange so that exchange leaves nothing
    /// behind but the terminal notice.
    pub fn apply_reply(&mut self, result: Result<String, GatewayError>) -> Option<SessionEvent> {
        let pending = self.pending.take()?;
        let state = self.state.as_mut()?;

        match result {
            Ok(text) => {
                let pseudo_unlocked = pending.mode == PromptMode::Reveal;
                if pseudo_unlocked {
                    state.pseudo_given = true;
                }
                state.history.push(Turn {
                    role: TurnRole::Mentor,
                    text: text.clone(),
                });
                let segments = if pseudo_unlocked {
                    split_reveal_reply(&text)
                } else {
                    None
                };
                Some(SessionEvent::MentorReply {
                    text,
                    segments,
                    pseudo_unlocked,
                })
            }
            Err(GatewayError::CredentialInvalid) => {
                if !pending.opening
                    && state
                        .history
                        .last()
                        .is_some_and(|turn| turn.role == TurnRole::Student)
                {
                    state.history.pop();
                    state.attempts = state.attempts.saturating_sub(1);
                }
                self.phase = SessionPhase::Ended;
                Some(SessionEvent::SessionEnded {
                    notice: "API key is invalid or expired. Please re-enter your key."
                        .to_string(),
                })
            }
            Err(GatewayError::Transport(message)) => {
                Some(record_failure_turn(state, format!("Network error: {message}")))
            }
            Err(GatewayError::Provider { message, .. }) => {
                Some(record_failure_turn(state, format!("API error: {message}")))
            }
        }
    }

    /// Merge a re-read code capture into the current problem. Only the code
    /// fields change.
    pub fn apply_code_refresh(&mut self, capture: CodeCapture) -> bool {
        match self.state.as_mut() {
            Some(state) => {
                state.problem.apply_code_refresh(capture);
                true
            }
            None => false,
        }
    }

    /// Derived attempt-indicator view: the first `min(attempts, threshold)`
    /// slots are used, and once the pseudocode is out the final slot shows
    /// the distinct pseudo marker instead.
    pub fn attempt_indicator(&self) -> Vec<DotState> {
        let threshold = self.attempt_threshold as usize;
        let (attempts, pseudo_given) = match self.state.as_ref() {
            Some(state) => (state.attempts as usize, state.pseudo_given),
            None => (0, false),
        };
        let used = attempts.min(threshold);
        (0..threshold)
            .map(|slot| {
                if pseudo_given && slot == threshold - 1 {
                    DotState::Pseudo
                } else if slot < used {
                    DotState::Used
                } else {
                    DotState::Empty
                }
            })
            .collect()
    }
}

/// A transport or provider failure becomes the mentor's turn so the session
/// continues and the student can retry by sending again.
fn record_failure_turn(state: &mut ConversationState, text: String) -> SessionEvent {
    state.history.push(Turn {
        role: TurnRole::Mentor,
        text: text.clone(),
    });
    SessionEvent::MentorReply {
        text,
        segments: None,
        pseudo_unlocked: false,
    }
}

/// Split a Reveal-mode reply at the sentinel markers. Returns `None` when
/// either marker is missing or out of order; the caller then renders the
/// reply as one unsegmented block.
pub fn split_reveal_reply(text: &str) -> Option<RevealSegments> {
    let start = text.find(PSEUDOCODE_START)?;
    let after_start = start + PSEUDOCODE_START.len();
    let end_offset = text[after_start..].find(PSEUDOCODE_END)?;
    let end = after_start + end_offset;
    Some(RevealSegments {
        before: text[..start].trim().to_string(),
        pseudocode: text[after_start..end].trim().to_string(),
        after: text[end + PSEUDOCODE_END.len()..].trim().to_string(),
    })
}

#[cfg(test)]
#[path = "../tests/unit/session_tests.rs"]
mod tests;
