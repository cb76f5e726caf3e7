//! Intake conversation state machine.
//!
//! [`IntakeFlow`] owns the draft being collected and the current step.
//! Transport code feeds it [`IntakeInput`]s and renders the returned
//! [`StepOutcome`]s; it never branches on step names itself. The machine
//! is synchronous and pure, so the whole conversation is unit-testable
//! without a bot in sight.
//!
//! Step order: full name, phone, document kind choice, document code,
//! document photo, category choice, body, confirmation. A validation
//! failure re-prompts and stays on the step; the edit action from the
//! confirmation screen loops back to the body step with everything else
//! kept.

use crate::application::{Category, IdKind, NewApplication};
use crate::error::CoreError;
use crate::projection::{self, SummaryFields};
use crate::texts;
use crate::types::{Timestamp, UserId};
use crate::validate::{self, ValidationRules};

// ---------------------------------------------------------------------------
// Callback keys and choice sets
// ---------------------------------------------------------------------------

pub const CB_ID_KIND_FIN: &str = "idkind_fin";
pub const CB_ID_KIND_PIN: &str = "idkind_pin";
pub const CB_CATEGORY_COMPLAINT: &str = "type_complaint";
pub const CB_CATEGORY_SUGGESTION: &str = "type_suggestion";
pub const CB_CATEGORY_APPLICATION: &str = "type_application";
pub const CB_CONFIRM: &str = "confirm";
pub const CB_EDIT: &str = "edit";
pub const CB_CANCEL: &str = "cancel";

/// An inline button the transport should offer for a choice step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Choice {
    pub label: &'static str,
    pub key: &'static str,
}

pub const ID_KIND_CHOICES: &[Choice] = &[
    Choice {
        label: "FIN (7 simvol)",
        key: CB_ID_KIND_FIN,
    },
    Choice {
        label: "PIN (5-6 simvol)",
        key: CB_ID_KIND_PIN,
    },
];

pub const CATEGORY_CHOICES: &[Choice] = &[
    Choice {
        label: "Şikayət",
        key: CB_CATEGORY_COMPLAINT,
    },
    Choice {
        label: "Təklif",
        key: CB_CATEGORY_SUGGESTION,
    },
    Choice {
        label: "Ərizə",
        key: CB_CATEGORY_APPLICATION,
    },
];

pub const CONFIRM_CHOICES: &[Choice] = &[
    Choice {
        label: texts::BTN_CONFIRM,
        key: CB_CONFIRM,
    },
    Choice {
        label: texts::BTN_EDIT,
        key: CB_EDIT,
    },
    Choice {
        label: texts::BTN_CANCEL,
        key: CB_CANCEL,
    },
];

// ---------------------------------------------------------------------------
// Machine types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntakeStep {
    Fullname,
    Phone,
    IdKindChoice,
    IdCode,
    IdPhoto,
    CategoryChoice,
    Body,
    Confirm,
}

/// What the transport should feed the machine for the current update.
#[derive(Debug, Clone, Copy)]
pub enum IntakeInput<'a> {
    Text(&'a str),
    /// Transport file reference of the largest photo size.
    Photo(&'a str),
    /// Callback key of a pressed inline button.
    Choice(&'a str),
}

/// What to send back to the citizen after feeding the machine.
#[derive(Debug, Clone)]
pub enum StepOutcome {
    /// Input accepted; show this prompt (with buttons when `choices` is
    /// non-empty) for the next step.
    Next(Prompt),
    /// Input rejected; stay on the step and show this error.
    Invalid(&'static str),
}

#[derive(Debug, Clone)]
pub struct Prompt {
    pub text: String,
    pub choices: &'static [Choice],
}

impl Prompt {
    fn ask(text: &str) -> Self {
        Self {
            text: text.to_string(),
            choices: &[],
        }
    }

    fn choose(text: &str, choices: &'static [Choice]) -> Self {
        Self {
            text: text.to_string(),
            choices,
        }
    }
}

/// Collected fields; all optional until their step has passed.
#[derive(Debug, Clone, Default)]
pub struct Draft {
    pub fullname: Option<String>,
    pub phone: Option<String>,
    pub id_kind: Option<IdKind>,
    pub id_code: Option<String>,
    pub photo_ref: Option<String>,
    pub category: Option<Category>,
    pub body: Option<String>,
    /// Instant the body was accepted; shown in the summary and stored as
    /// `created_at`.
    pub accepted_at: Option<Timestamp>,
}

impl Draft {
    fn summary_fields(&self) -> Option<SummaryFields<'_>> {
        Some(SummaryFields {
            fullname: self.fullname.as_deref()?,
            phone: self.phone.as_deref()?,
            id_kind: self.id_kind?,
            id_code: self.id_code.as_deref()?,
            category: self.category?,
            body: self.body.as_deref()?,
            created_at: self.accepted_at?,
        })
    }
}

/// One citizen's in-flight intake conversation.
#[derive(Debug, Clone)]
pub struct IntakeFlow {
    step: IntakeStep,
    draft: Draft,
}

impl Default for IntakeFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl IntakeFlow {
    pub fn new() -> Self {
        Self {
            step: IntakeStep::Fullname,
            draft: Draft::default(),
        }
    }

    pub fn step(&self) -> IntakeStep {
        self.step
    }

    /// Feed one update into the machine. `now` is only read when the body
    /// step completes, to stamp the draft.
    pub fn handle(
        &mut self,
        input: IntakeInput<'_>,
        rules: &ValidationRules,
        now: Timestamp,
    ) -> StepOutcome {
        match (self.step, input) {
            (IntakeStep::Fullname, IntakeInput::Text(text)) => {
                match validate::fullname(rules, text) {
                    Ok(name) => {
                        self.draft.fullname = Some(name);
                        self.step = IntakeStep::Phone;
                        StepOutcome::Next(Prompt::ask(texts::PHONE_PROMPT))
                    }
                    Err(_) => StepOutcome::Invalid(texts::FULLNAME_ERROR),
                }
            }
            (IntakeStep::Fullname, _) => StepOutcome::Invalid(texts::FULLNAME_ERROR),

            (IntakeStep::Phone, IntakeInput::Text(text)) => match validate::phone(rules, text) {
                Ok(number) => {
                    self.draft.phone = Some(number);
                    self.step = IntakeStep::IdKindChoice;
                    StepOutcome::Next(Prompt::choose(texts::ID_KIND_PROMPT, ID_KIND_CHOICES))
                }
                Err(_) => StepOutcome::Invalid(texts::PHONE_ERROR),
            },
            (IntakeStep::Phone, _) => StepOutcome::Invalid(texts::PHONE_ERROR),

            (IntakeStep::IdKindChoice, IntakeInput::Choice(key)) => {
                let (kind, prompt) = match key {
                    CB_ID_KIND_FIN => (IdKind::Fin, texts::FIN_PROMPT),
                    CB_ID_KIND_PIN => (IdKind::Pin, texts::PIN_PROMPT),
                    _ => return StepOutcome::Invalid(texts::CHOICE_HINT),
                };
                self.draft.id_kind = Some(kind);
                self.step = IntakeStep::IdCode;
                StepOutcome::Next(Prompt::ask(prompt))
            }
            (IntakeStep::IdKindChoice, _) => StepOutcome::Invalid(texts::CHOICE_HINT),

            (IntakeStep::IdCode, IntakeInput::Text(text)) => {
                let Some(kind) = self.draft.id_kind else {
                    return StepOutcome::Invalid(texts::CHOICE_HINT);
                };
                match validate::id_code(rules, kind, text) {
                    Ok(code) => {
                        self.draft.id_code = Some(code);
                        self.step = IntakeStep::IdPhoto;
                        StepOutcome::Next(Prompt::ask(texts::ID_PHOTO_PROMPT))
                    }
                    Err(_) => StepOutcome::Invalid(match kind {
                        IdKind::Fin => texts::FIN_ERROR,
                        IdKind::Pin => texts::PIN_ERROR,
                    }),
                }
            }
            (IntakeStep::IdCode, _) => StepOutcome::Invalid(texts::ID_PHOTO_ERROR),

            (IntakeStep::IdPhoto, IntakeInput::Photo(file_ref)) => {
                self.draft.photo_ref = Some(file_ref.to_string());
                self.step = IntakeStep::CategoryChoice;
                StepOutcome::Next(Prompt::choose(texts::CATEGORY_PROMPT, CATEGORY_CHOICES))
            }
            (IntakeStep::IdPhoto, _) => StepOutcome::Invalid(texts::ID_PHOTO_ERROR),

            (IntakeStep::CategoryChoice, IntakeInput::Choice(key)) => {
                let category = match key {
                    CB_CATEGORY_COMPLAINT => Category::Complaint,
                    CB_CATEGORY_SUGGESTION => Category::Suggestion,
                    CB_CATEGORY_APPLICATION => Category::Application,
                    _ => return StepOutcome::Invalid(texts::CHOICE_HINT),
                };
                self.draft.category = Some(category);
                self.step = IntakeStep::Body;
                StepOutcome::Next(Prompt::ask(texts::BODY_PROMPT))
            }
            (IntakeStep::CategoryChoice, _) => StepOutcome::Invalid(texts::CHOICE_HINT),

            (IntakeStep::Body, IntakeInput::Text(text)) => match validate::body(rules, text) {
                Ok(body) => {
                    self.draft.body = Some(body);
                    self.draft.accepted_at = Some(now);
                    self.step = IntakeStep::Confirm;
                    match self.draft.summary_fields() {
                        Some(fields) => StepOutcome::Next(Prompt::choose(
                            &projection::summary(&fields),
                            CONFIRM_CHOICES,
                        )),
                        // Unreachable once all prior steps have passed.
                        None => StepOutcome::Invalid(texts::BODY_ERROR),
                    }
                }
                Err(_) => StepOutcome::Invalid(texts::BODY_ERROR),
            },
            (IntakeStep::Body, _) => StepOutcome::Invalid(texts::BODY_ERROR),

            (IntakeStep::Confirm, _) => StepOutcome::Invalid(texts::CHOICE_HINT),
        }
    }

    /// Loop from the confirmation screen back to the body step, keeping
    /// every other collected field.
    pub fn begin_edit(&mut self) {
        if self.step == IntakeStep::Confirm {
            self.step = IntakeStep::Body;
        }
    }

    /// Consume the flow into an insertable record. Fails with
    /// [`CoreError::Incomplete`] if any step was skipped, which the
    /// transport treats as a bug, not user error.
    pub fn into_submission(
        self,
        submitter_id: UserId,
        submitter_handle: Option<String>,
    ) -> Result<NewApplication, CoreError> {
        let draft = self.draft;
        Ok(NewApplication {
            submitter_id,
            submitter_handle,
            fullname: draft.fullname.ok_or(CoreError::Incomplete("fullname"))?,
            phone: draft.phone.ok_or(CoreError::Incomplete("phone"))?,
            id_kind: draft.id_kind.ok_or(CoreError::Incomplete("id_kind"))?,
            id_code: draft.id_code.ok_or(CoreError::Incomplete("id_code"))?,
            category: draft.category.ok_or(CoreError::Incomplete("category"))?,
            body: draft.body.ok_or(CoreError::Incomplete("body"))?,
            photo_ref: draft.photo_ref,
            created_at: draft.accepted_at.ok_or(CoreError::Incomplete("accepted_at"))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::{TimeZone, Utc};

    fn now() -> Timestamp {
        Utc.with_ymd_and_hms(2026, 2, 10, 8, 0, 0).unwrap()
    }

    fn rules() -> ValidationRules {
        ValidationRules::default()
    }

    /// Drive a flow through every step up to the confirmation screen.
    fn filled_flow() -> IntakeFlow {
        let mut flow = IntakeFlow::new();
        let r = rules();
        assert_matches!(
            flow.handle(IntakeInput::Text("Əliyev Anar"), &r, now()),
            StepOutcome::Next(_)
        );
        assert_matches!(
            flow.handle(IntakeInput::Text("+994501234567"), &r, now()),
            StepOutcome::Next(_)
        );
        assert_matches!(
            flow.handle(IntakeInput::Choice(CB_ID_KIND_FIN), &r, now()),
            StepOutcome::Next(_)
        );
        assert_matches!(
            flow.handle(IntakeInput::Text("1abc23x"), &r, now()),
            StepOutcome::Next(_)
        );
        assert_matches!(
            flow.handle(IntakeInput::Photo("file-123"), &r, now()),
            StepOutcome::Next(_)
        );
        assert_matches!(
            flow.handle(IntakeInput::Choice(CB_CATEGORY_COMPLAINT), &r, now()),
            StepOutcome::Next(_)
        );
        let outcome = flow.handle(
            IntakeInput::Text("Küçə işıqları bir həftədir yanmır."),
            &r,
            now(),
        );
        assert_matches!(outcome, StepOutcome::Next(ref p) if p.choices == CONFIRM_CHOICES);
        assert_eq!(flow.step(), IntakeStep::Confirm);
        flow
    }

    #[test]
    fn happy_path_reaches_confirmation_with_summary() {
        let mut flow = IntakeFlow::new();
        let r = rules();
        flow.handle(IntakeInput::Text("Əliyev Anar"), &r, now());
        flow.handle(IntakeInput::Text("+994501234567"), &r, now());
        flow.handle(IntakeInput::Choice(CB_ID_KIND_PIN), &r, now());
        flow.handle(IntakeInput::Text("ab123"), &r, now());
        flow.handle(IntakeInput::Photo("file-9"), &r, now());
        flow.handle(IntakeInput::Choice(CB_CATEGORY_SUGGESTION), &r, now());
        let outcome = flow.handle(IntakeInput::Text("Parkda yeni oturacaqlar qoyulsun."), &r, now());
        let StepOutcome::Next(prompt) = outcome else {
            panic!("expected confirmation prompt");
        };
        assert!(prompt.text.contains("🆔 PIN: AB123"));
        assert!(prompt.text.contains("📂 Növ: Təklif"));
        assert_eq!(prompt.choices, CONFIRM_CHOICES);
    }

    #[test]
    fn invalid_input_stays_on_step() {
        let mut flow = IntakeFlow::new();
        let r = rules();
        assert_matches!(
            flow.handle(IntakeInput::Text("Anar"), &r, now()),
            StepOutcome::Invalid(texts::FULLNAME_ERROR)
        );
        assert_eq!(flow.step(), IntakeStep::Fullname);

        flow.handle(IntakeInput::Text("Əliyev Anar"), &r, now());
        assert_matches!(
            flow.handle(IntakeInput::Text("0501234567"), &r, now()),
            StepOutcome::Invalid(texts::PHONE_ERROR)
        );
        assert_eq!(flow.step(), IntakeStep::Phone);
    }

    #[test]
    fn wrong_input_type_is_a_validation_failure() {
        let mut flow = IntakeFlow::new();
        let r = rules();
        // Photo where text is expected.
        assert_matches!(
            flow.handle(IntakeInput::Photo("file-1"), &r, now()),
            StepOutcome::Invalid(texts::FULLNAME_ERROR)
        );
        // Drive to the photo step, then send text.
        flow.handle(IntakeInput::Text("Əliyev Anar"), &r, now());
        flow.handle(IntakeInput::Text("+994501234567"), &r, now());
        flow.handle(IntakeInput::Choice(CB_ID_KIND_FIN), &r, now());
        flow.handle(IntakeInput::Text("1abc23x"), &r, now());
        assert_matches!(
            flow.handle(IntakeInput::Text("şəkil yoxdur"), &r, now()),
            StepOutcome::Invalid(texts::ID_PHOTO_ERROR)
        );
        assert_eq!(flow.step(), IntakeStep::IdPhoto);
    }

    #[test]
    fn fin_branch_validates_seven_chars() {
        let mut flow = IntakeFlow::new();
        let r = rules();
        flow.handle(IntakeInput::Text("Əliyev Anar"), &r, now());
        flow.handle(IntakeInput::Text("+994501234567"), &r, now());
        flow.handle(IntakeInput::Choice(CB_ID_KIND_FIN), &r, now());
        assert_matches!(
            flow.handle(IntakeInput::Text("ab123"), &r, now()),
            StepOutcome::Invalid(texts::FIN_ERROR)
        );
        assert_matches!(
            flow.handle(IntakeInput::Text("1abc23x"), &r, now()),
            StepOutcome::Next(_)
        );
    }

    #[test]
    fn pin_branch_accepts_five_and_six_chars() {
        let mut flow = IntakeFlow::new();
        let r = rules();
        flow.handle(IntakeInput::Text("Əliyev Anar"), &r, now());
        flow.handle(IntakeInput::Text("+994501234567"), &r, now());
        flow.handle(IntakeInput::Choice(CB_ID_KIND_PIN), &r, now());
        assert_matches!(
            flow.handle(IntakeInput::Text("1abc23x"), &r, now()),
            StepOutcome::Invalid(texts::PIN_ERROR)
        );
        assert_matches!(
            flow.handle(IntakeInput::Text("ab1234"), &r, now()),
            StepOutcome::Next(_)
        );
    }

    #[test]
    fn unknown_choice_key_re_prompts() {
        let mut flow = IntakeFlow::new();
        let r = rules();
        flow.handle(IntakeInput::Text("Əliyev Anar"), &r, now());
        flow.handle(IntakeInput::Text("+994501234567"), &r, now());
        assert_matches!(
            flow.handle(IntakeInput::Choice("exec_reply:5"), &r, now()),
            StepOutcome::Invalid(texts::CHOICE_HINT)
        );
        assert_eq!(flow.step(), IntakeStep::IdKindChoice);
    }

    #[test]
    fn edit_loops_back_to_body_and_keeps_fields() {
        let mut flow = filled_flow();
        flow.begin_edit();
        assert_eq!(flow.step(), IntakeStep::Body);
        let outcome = flow.handle(
            IntakeInput::Text("Yenilənmiş müraciət mətni, daha ətraflı."),
            &rules(),
            now(),
        );
        let StepOutcome::Next(prompt) = outcome else {
            panic!("expected confirmation prompt");
        };
        assert!(prompt.text.contains("Yenilənmiş müraciət mətni"));
        assert!(prompt.text.contains("🆔 FIN: 1ABC23X"));

        let record = flow.into_submission(42, Some("anar".to_string())).unwrap();
        assert_eq!(record.body, "Yenilənmiş müraciət mətni, daha ətraflı.");
        assert_eq!(record.fullname, "Əliyev Anar");
        assert_eq!(record.photo_ref.as_deref(), Some("file-123"));
    }

    #[test]
    fn begin_edit_is_a_no_op_before_confirmation() {
        let mut flow = IntakeFlow::new();
        flow.begin_edit();
        assert_eq!(flow.step(), IntakeStep::Fullname);
    }

    #[test]
    fn submission_carries_accepted_timestamp() {
        let flow = filled_flow();
        let record = flow.into_submission(42, None).unwrap();
        assert_eq!(record.created_at, now());
        assert_eq!(record.submitter_id, 42);
        assert_eq!(record.id_code, "1ABC23X");
        assert_eq!(record.category, Category::Complaint);
    }

    #[test]
    fn incomplete_flow_cannot_become_a_submission() {
        let mut flow = IntakeFlow::new();
        flow.handle(IntakeInput::Text("Əliyev Anar"), &rules(), now());
        assert_matches!(
            flow.into_submission(42, None),
            Err(CoreError::Incomplete("phone"))
        );
    }
}
