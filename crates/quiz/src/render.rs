//! HTML pages rendered with Handlebars.
//!
//! Templates are compiled into the binary. Every interpolated value is
//! HTML-escaped except the internal links, which are built here.

use handlebars::{Handlebars, RenderError, TemplateError};
use serde::Serialize;

use crate::answers::QuestionKey;
use crate::inspector::DeploymentSnapshot;
use crate::prober::{EnvironmentProber, UNSET_PLACEHOLDER};
use crate::sequencer::{Expected, Quiz, Status};

/// Image shown when the player has not picked one.
pub const DEFAULT_IMAGE: &str = "https://media2.giphy.com/media/xTiIzJSKB4l7xTouE8/giphy.gif";

const PARTIALS: &[(&str, &str)] = &[
    ("header", include_str!("../templates/_header.hbs")),
    ("footer", include_str!("../templates/_footer.hbs")),
    ("prompt", include_str!("../templates/_prompt.hbs")),
];

const PAGES: &[(&str, &str)] = &[
    ("question", include_str!("../templates/question.hbs")),
    ("incorrect", include_str!("../templates/incorrect.hbs")),
    ("completed", include_str!("../templates/completed.hbs")),
    ("status", include_str!("../templates/status.hbs")),
];

/// Canonical URL of a question page.
pub fn question_url(index: usize) -> String {
    if index == 0 {
        "/".to_string()
    } else {
        format!("/?question={index}")
    }
}

/// URL that checks every question before `index` and moves on to it.
pub fn advance_url(index: usize) -> String {
    format!("/?question={index}&advance=true")
}

/// Values shared by every page.
#[derive(Debug, Serialize)]
pub struct PageContext {
    pub name: Option<String>,
    pub image: String,
    pub namespace: String,
    pub deployment: DeploymentView,
    pub env: Vec<EnvView>,
}

#[derive(Debug, Serialize)]
pub struct DeploymentView {
    pub replicas: i32,
    pub cpu_request: String,
    pub memory_request: String,
    pub labels: Vec<LabelView>,
}

#[derive(Debug, Serialize)]
pub struct LabelView {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Serialize)]
pub struct EnvView {
    pub variable: String,
    pub value: String,
}

/// One question as displayed.
#[derive(Debug, Serialize)]
pub struct PromptView {
    pub number: usize,
    pub key: QuestionKey,
    /// Deployment field to change; absent for free-text questions.
    pub target: Option<&'static str>,
    pub value: Option<String>,
    /// Environment variable to set; absent for deployment questions.
    pub variable: Option<String>,
    pub hint: Option<&'static str>,
    pub status: Option<&'static str>,
    pub css: Option<&'static str>,
}

impl PageContext {
    pub fn new(namespace: &str, deployment: &DeploymentSnapshot, env: &EnvironmentProber) -> Self {
        let or_unset =
            |value: Option<String>| value.unwrap_or_else(|| UNSET_PLACEHOLDER.to_string());

        let env_rows = [QuestionKey::YourName, QuestionKey::Image, QuestionKey::AriseId]
            .into_iter()
            .filter_map(|key| {
                env.source_variable(key).map(|variable| EnvView {
                    variable: variable.to_string(),
                    value: or_unset(env.answer(key)),
                })
            })
            .collect();

        Self {
            name: env.your_name(),
            image: env.image().unwrap_or_else(|| DEFAULT_IMAGE.to_string()),
            namespace: namespace.to_string(),
            deployment: DeploymentView {
                replicas: deployment.replicas,
                cpu_request: or_unset(deployment.cpu_request.clone()),
                memory_request: or_unset(deployment.memory_request.clone()),
                labels: deployment
                    .labels
                    .iter()
                    .map(|(key, value)| LabelView {
                        key: key.clone(),
                        value: value.clone(),
                    })
                    .collect(),
            },
            env: env_rows,
        }
    }
}

impl PromptView {
    pub fn new(quiz: &Quiz, index: usize, env: &EnvironmentProber) -> Option<Self> {
        let question = quiz.questions().get(index)?;
        let (target, value) = match &question.expected {
            Expected::Replicas(n) => (Some("Replica"), Some(n.to_string())),
            Expected::CpuRequest(cpu) => (Some("Resource Request (CPU)"), Some(cpu.clone())),
            Expected::MemoryRequest(mem) => (Some("Resource Request (Memory)"), Some(mem.clone())),
            Expected::FreeText => (None, None),
        };

        Some(Self {
            number: index + 1,
            key: question.key,
            target,
            value,
            variable: env.variable_name(question.key).map(str::to_string),
            hint: free_text_hint(question.key),
            status: None,
            css: None,
        })
    }

    #[must_use]
    pub fn with_status(mut self, status: Status) -> Self {
        self.status = Some(status.as_str());
        self.css = Some(match status {
            Status::Correct => "correct",
            Status::Incorrect => "incorrect",
        });
        self
    }
}

fn free_text_hint(key: QuestionKey) -> Option<&'static str> {
    match key {
        QuestionKey::YourName => Some("your name"),
        QuestionKey::Image => Some("any image you like"),
        QuestionKey::AriseId => Some("your Arise ID"),
        QuestionKey::Replicas | QuestionKey::CpuRequest | QuestionKey::MemoryRequest => None,
    }
}

#[derive(Serialize)]
struct QuestionPage<'a> {
    page: &'a PageContext,
    prompt: &'a PromptView,
    total: usize,
    check_url: String,
}

#[derive(Serialize)]
struct IncorrectPage<'a> {
    page: &'a PageContext,
    prompt: &'a PromptView,
    check_url: String,
    question_url: String,
}

#[derive(Serialize)]
struct TaskListPage<'a> {
    page: &'a PageContext,
    tasks: &'a [PromptView],
    total: usize,
}

/// Template engine for quiz pages.
pub struct Renderer {
    handlebars: Handlebars<'static>,
}

impl Renderer {
    pub fn new() -> Result<Self, TemplateError> {
        let mut handlebars = Handlebars::new();
        for (name, source) in PARTIALS {
            handlebars.register_partial(name, *source)?;
        }
        for (name, source) in PAGES {
            handlebars.register_template_string(name, *source)?;
        }
        Ok(Self { handlebars })
    }

    /// Page asking question `prompt`, with a link that checks it.
    pub fn question(
        &self,
        page: &PageContext,
        prompt: &PromptView,
        total: usize,
    ) -> Result<String, RenderError> {
        self.handlebars.render(
            "question",
            &QuestionPage {
                page,
                prompt,
                total,
                check_url: advance_url(prompt.number),
            },
        )
    }

    /// "Incorrect answer, try again" page for the failing question.
    pub fn incorrect(
        &self,
        page: &PageContext,
        prompt: &PromptView,
    ) -> Result<String, RenderError> {
        self.handlebars.render(
            "incorrect",
            &IncorrectPage {
                page,
                prompt,
                check_url: advance_url(prompt.number),
                question_url: question_url(prompt.number - 1),
            },
        )
    }

    pub fn completed(
        &self,
        page: &PageContext,
        tasks: &[PromptView],
    ) -> Result<String, RenderError> {
        self.handlebars.render(
            "completed",
            &TaskListPage {
                page,
                tasks,
                total: tasks.len(),
            },
        )
    }

    /// Every question with its current status on one page.
    pub fn status_board(
        &self,
        page: &PageContext,
        tasks: &[PromptView],
    ) -> Result<String, RenderError> {
        self.handlebars.render(
            "status",
            &TaskListPage {
                page,
                tasks,
                total: tasks.len(),
            },
        )
    }
}
