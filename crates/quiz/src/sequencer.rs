//! Question list and progress state machine.
//!
//! Progress lives entirely in the request: `question=i` names the question
//! being shown, and every question before `i` must currently pass for the
//! request to get there. The server keeps no session.

use serde::Serialize;

use crate::answers::{self, CandidateLists, Derivation, ExpectedAnswers, QuestionKey};
use crate::inspector::DeploymentSnapshot;
use crate::prober::EnvironmentProber;

/// Result of checking one question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Status {
    Correct,
    Incorrect,
}

impl Status {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Correct => "Correct",
            Self::Incorrect => "Incorrect",
        }
    }

    pub const fn is_correct(self) -> bool {
        matches!(self, Self::Correct)
    }
}

/// What a question expects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expected {
    Replicas(i32),
    CpuRequest(String),
    MemoryRequest(String),
    /// Whatever the environment variable currently holds.
    FreeText,
}

/// One quiz question at its position in the order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub key: QuestionKey,
    pub expected: Expected,
}

/// Live values a question is checked against.
#[derive(Clone, Copy)]
pub struct Actuals<'a> {
    pub deployment: &'a DeploymentSnapshot,
    pub env: &'a EnvironmentProber,
}

/// Where a player is in the quiz.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizState {
    AwaitingAnswer(usize),
    Completed,
}

/// What the handler should do with a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Render the page for this state.
    Show(QuizState),
    /// Every question before `to` passes; redirect to its canonical page.
    Advance { to: usize, completed: bool },
    /// The first failing question before the requested one.
    Incorrect { question: usize },
}

/// The ordered question set for one namespace.
#[derive(Debug, Clone)]
pub struct Quiz {
    derivation: Derivation,
    questions: Vec<Question>,
}

impl Quiz {
    pub fn build(namespace: &str, candidates: &CandidateLists, shuffle: bool) -> Self {
        let derivation = answers::derive(namespace, candidates, shuffle);
        let questions = derivation
            .order
            .iter()
            .map(|&key| Question {
                key,
                expected: expected_for(key, &derivation.expected),
            })
            .collect();

        Self {
            derivation,
            questions,
        }
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn expected(&self) -> &ExpectedAnswers {
        &self.derivation.expected
    }

    pub fn seed(&self) -> u64 {
        self.derivation.seed
    }

    /// Exact comparison of the live value against the expected one.
    pub fn check(&self, index: usize, actual: Actuals<'_>) -> Status {
        let Some(question) = self.questions.get(index) else {
            return Status::Incorrect;
        };

        let correct = match &question.expected {
            Expected::Replicas(want) => actual.deployment.replicas == *want,
            Expected::CpuRequest(want) => {
                actual.deployment.cpu_request.as_deref() == Some(want.as_str())
            }
            Expected::MemoryRequest(want) => {
                actual.deployment.memory_request.as_deref() == Some(want.as_str())
            }
            Expected::FreeText => {
                // Expected and actual are both the variable's current value.
                let expected = actual.env.answer(question.key);
                let live = actual.env.answer(question.key);
                expected.is_some() && expected == live
            }
        };

        if correct {
            Status::Correct
        } else {
            Status::Incorrect
        }
    }

    /// Every question's status, in quiz order.
    pub fn statuses(&self, actual: Actuals<'_>) -> Vec<Status> {
        (0..self.len()).map(|i| self.check(i, actual)).collect()
    }

    /// First question in `[0, upto)` that does not pass.
    pub fn first_failure(&self, upto: usize, actual: Actuals<'_>) -> Option<usize> {
        (0..upto.min(self.len())).find(|&i| !self.check(i, actual).is_correct())
    }

    /// Decide how to answer a request for `progress`.
    ///
    /// `progress` past the last question is treated as the completion page.
    /// A failure reports the first failing question in `[0, progress)`
    /// rather than `progress - 1`, so a player who later breaks an earlier
    /// answer is sent back to it instead of past it. With `advance` set, a passing request becomes a redirect so the
    /// canonical page never repeats the transition.
    pub fn step(&self, progress: usize, advance: bool, actual: Actuals<'_>) -> Step {
        let progress = progress.min(self.len());
        if progress == 0 {
            return Step::Show(self.state_at(0));
        }

        if let Some(question) = self.first_failure(progress, actual) {
            return Step::Incorrect { question };
        }

        if advance {
            Step::Advance {
                to: progress,
                completed: progress == self.len(),
            }
        } else {
            Step::Show(self.state_at(progress))
        }
    }

    fn state_at(&self, index: usize) -> QuizState {
        if index >= self.len() {
            QuizState::Completed
        } else {
            QuizState::AwaitingAnswer(index)
        }
    }
}

fn expected_for(key: QuestionKey, expected: &ExpectedAnswers) -> Expected {
    match key {
        QuestionKey::Replicas => Expected::Replicas(expected.replicas),
        QuestionKey::CpuRequest => Expected::CpuRequest(expected.cpu_request.clone()),
        QuestionKey::MemoryRequest => Expected::MemoryRequest(expected.memory_request.clone()),
        QuestionKey::YourName | QuestionKey::Image | QuestionKey::AriseId => Expected::FreeText,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Candidates, EnvNames};
    use crate::prober::StaticEnv;
    use std::sync::Arc;

    fn lists() -> CandidateLists {
        CandidateLists::try_from(&Candidates::default()).unwrap()
    }

    fn env(vars: &[(&str, &str)]) -> EnvironmentProber {
        EnvironmentProber::new(
            Arc::new(StaticEnv::new(vars.iter().copied())),
            EnvNames::default(),
        )
    }

    fn full_env() -> EnvironmentProber {
        env(&[
            ("YOUR_NAME", "Ada"),
            ("IMAGE_URL", "https://img/cat.gif"),
            ("YOUR_ARISE_ID", "A-42"),
        ])
    }

    /// A deployment matching every expected value of `quiz`.
    fn matching(quiz: &Quiz) -> DeploymentSnapshot {
        let expected = quiz.expected();
        DeploymentSnapshot {
            replicas: expected.replicas,
            cpu_request: Some(expected.cpu_request.clone()),
            memory_request: Some(expected.memory_request.clone()),
            labels: Default::default(),
        }
    }

    fn index_of(quiz: &Quiz, key: QuestionKey) -> usize {
        quiz.questions().iter().position(|q| q.key == key).unwrap()
    }

    #[test]
    fn test_matching_deployment_is_all_correct() {
        let quiz = Quiz::build("team-a", &lists(), true);
        let deployment = matching(&quiz);
        let env = full_env();
        let actual = Actuals {
            deployment: &deployment,
            env: &env,
        };
        assert!(quiz.statuses(actual).iter().all(|s| s.is_correct()));
        assert_eq!(quiz.first_failure(quiz.len(), actual), None);
    }

    #[test]
    fn test_comparison_is_exact() {
        let quiz = Quiz::build("team-a", &lists(), false);
        let mut deployment = matching(&quiz);
        let env = full_env();

        let cpu = index_of(&quiz, QuestionKey::CpuRequest);
        let unitless = quiz.expected().cpu_request.trim_end_matches('m').to_string();
        deployment.cpu_request = Some(unitless);
        let actual = Actuals {
            deployment: &deployment,
            env: &env,
        };
        assert_eq!(quiz.check(cpu, actual), Status::Incorrect);

        deployment.cpu_request = None;
        let actual = Actuals {
            deployment: &deployment,
            env: &env,
        };
        assert_eq!(quiz.check(cpu, actual), Status::Incorrect);
    }

    #[test]
    fn test_replica_mismatch() {
        let quiz = Quiz::build("team-a", &lists(), false);
        let mut deployment = matching(&quiz);
        deployment.replicas += 10;
        let env = full_env();
        let actual = Actuals {
            deployment: &deployment,
            env: &env,
        };
        assert_eq!(
            quiz.check(index_of(&quiz, QuestionKey::Replicas), actual),
            Status::Incorrect
        );
    }

    #[test]
    fn test_free_text_checks_only_presence() {
        let quiz = Quiz::build("team-a", &lists(), false);
        let deployment = matching(&quiz);
        let name = index_of(&quiz, QuestionKey::YourName);

        let unset = env(&[]);
        let actual = Actuals {
            deployment: &deployment,
            env: &unset,
        };
        assert_eq!(quiz.check(name, actual), Status::Incorrect);

        for value in ["Ada", "anything at all"] {
            let set = env(&[("YOUR_NAME", value)]);
            let actual = Actuals {
                deployment: &deployment,
                env: &set,
            };
            assert_eq!(quiz.check(name, actual), Status::Correct);
        }
    }

    #[test]
    fn test_out_of_range_check_is_incorrect() {
        let quiz = Quiz::build("team-a", &lists(), false);
        let deployment = matching(&quiz);
        let env = full_env();
        let actual = Actuals {
            deployment: &deployment,
            env: &env,
        };
        assert_eq!(quiz.check(quiz.len(), actual), Status::Incorrect);
    }

    #[test]
    fn test_step_without_progress_awaits_first_question() {
        let quiz = Quiz::build("team-a", &lists(), true);
        let deployment = DeploymentSnapshot::default();
        let env = env(&[]);
        let actual = Actuals {
            deployment: &deployment,
            env: &env,
        };
        assert_eq!(
            quiz.step(0, false, actual),
            Step::Show(QuizState::AwaitingAnswer(0))
        );
        assert_eq!(
            quiz.step(0, true, actual),
            Step::Show(QuizState::AwaitingAnswer(0))
        );
    }

    #[test]
    fn test_step_cannot_skip_unanswered_questions() {
        let quiz = Quiz::build("team-a", &lists(), false);
        // Nothing matches: every question fails.
        let deployment = DeploymentSnapshot {
            replicas: 0,
            ..Default::default()
        };
        let env = env(&[]);
        let actual = Actuals {
            deployment: &deployment,
            env: &env,
        };
        assert_eq!(quiz.step(2, false, actual), Step::Incorrect { question: 0 });
        assert_eq!(quiz.step(2, true, actual), Step::Incorrect { question: 0 });
    }

    #[test]
    fn test_step_reports_first_failing_question() {
        let quiz = Quiz::build("team-a", &lists(), false);
        let mut deployment = matching(&quiz);
        deployment.memory_request = Some("1Ti".to_string());
        let env = full_env();
        let actual = Actuals {
            deployment: &deployment,
            env: &env,
        };
        let memory = index_of(&quiz, QuestionKey::MemoryRequest);
        assert_eq!(
            quiz.step(quiz.len(), true, actual),
            Step::Incorrect { question: memory }
        );
        // Questions before the failing one still advance.
        assert_eq!(
            quiz.step(memory, true, actual),
            Step::Advance {
                to: memory,
                completed: false
            }
        );
    }

    #[test]
    fn test_step_advances_and_completes() {
        let quiz = Quiz::build("team-a", &lists(), true);
        let deployment = matching(&quiz);
        let env = full_env();
        let actual = Actuals {
            deployment: &deployment,
            env: &env,
        };

        assert_eq!(
            quiz.step(1, true, actual),
            Step::Advance {
                to: 1,
                completed: false
            }
        );
        assert_eq!(
            quiz.step(1, false, actual),
            Step::Show(QuizState::AwaitingAnswer(1))
        );
        assert_eq!(
            quiz.step(quiz.len(), true, actual),
            Step::Advance {
                to: quiz.len(),
                completed: true
            }
        );
        assert_eq!(
            quiz.step(quiz.len(), false, actual),
            Step::Show(QuizState::Completed)
        );
    }

    #[test]
    fn test_progress_past_end_is_clamped() {
        let quiz = Quiz::build("team-a", &lists(), true);
        let deployment = matching(&quiz);
        let env = full_env();
        let actual = Actuals {
            deployment: &deployment,
            env: &env,
        };
        assert_eq!(
            quiz.step(quiz.len() + 7, true, actual),
            Step::Advance {
                to: quiz.len(),
                completed: true
            }
        );
    }

    #[test]
    fn test_question_order_is_stable_per_namespace() {
        let first = Quiz::build("team-a", &lists(), true);
        let second = Quiz::build("team-a", &lists(), true);
        assert_eq!(first.questions(), second.questions());
        assert_eq!(first.seed(), 565);
        assert_eq!(first.len(), QuestionKey::ALL.len());
    }
}
