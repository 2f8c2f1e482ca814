//! HTTP server for the deployment quiz.

use std::sync::Arc;

use anyhow::Context;
use axum::{
    extract::{Query, State},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use notify::{Notifier, NotifyEvent};
use serde::Deserialize;
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use crate::answers::CandidateLists;
use crate::config::Config;
use crate::error::{QuizError, Result};
use crate::inspector::{DeploymentInspector, DeploymentSnapshot};
use crate::namespace::NamespaceSource;
use crate::prober::{EnvSource, EnvironmentProber};
use crate::render::{question_url, PageContext, PromptView, Renderer};
use crate::sequencer::{Actuals, Quiz, QuizState, Step};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub namespace: NamespaceSource,
    pub candidates: CandidateLists,
    pub inspector: Arc<dyn DeploymentInspector>,
    pub env: EnvironmentProber,
    pub renderer: Arc<Renderer>,
    pub notifier: Arc<Notifier>,
}

impl AppState {
    pub fn new(
        config: Config,
        inspector: Arc<dyn DeploymentInspector>,
        env: Arc<dyn EnvSource>,
        notifier: Notifier,
    ) -> anyhow::Result<Self> {
        let candidates =
            CandidateLists::try_from(&config.candidates).context("Invalid answer candidates")?;
        let renderer = Renderer::new().context("Failed to compile page templates")?;

        Ok(Self {
            namespace: NamespaceSource::from_config(&config),
            candidates,
            inspector,
            env: EnvironmentProber::new(env, config.env_names.clone()),
            renderer: Arc::new(renderer),
            notifier: Arc::new(notifier),
            config: Arc::new(config),
        })
    }
}

/// Build the HTTP router for the quiz service.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(quiz_handler))
        .route("/status", get(status_handler))
        .route("/health", get(health_check))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}

/// Query parameters carrying quiz progress.
#[derive(Debug, Default, Deserialize)]
pub struct ProgressQuery {
    pub question: Option<String>,
    pub advance: Option<String>,
}

impl ProgressQuery {
    /// Requested question index; absent or blank means 0.
    pub fn progress(&self) -> Result<usize> {
        match self.question.as_deref().map(str::trim) {
            None | Some("") => Ok(0),
            Some(raw) => raw
                .parse()
                .map_err(|_| QuizError::InvalidProgress(raw.to_string())),
        }
    }

    pub fn advance(&self) -> bool {
        self.advance
            .as_deref()
            .is_some_and(|v| v == "1" || v.eq_ignore_ascii_case("true"))
    }
}

/// Health check endpoint.
async fn health_check() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

/// Everything a page needs, fetched once per request.
struct Evaluation {
    namespace: String,
    quiz: Quiz,
    deployment: DeploymentSnapshot,
}

impl Evaluation {
    async fn load(state: &AppState) -> Result<Self> {
        let namespace = state.namespace.resolve().await?;
        let quiz = Quiz::build(
            &namespace,
            &state.candidates,
            state.config.shuffle_questions,
        );
        let deployment = state
            .inspector
            .snapshot(&state.config.deployment_name, &namespace)
            .await?;

        Ok(Self {
            namespace,
            quiz,
            deployment,
        })
    }

    fn actuals<'a>(&'a self, env: &'a EnvironmentProber) -> Actuals<'a> {
        Actuals {
            deployment: &self.deployment,
            env,
        }
    }

    fn prompt(&self, index: usize, env: &EnvironmentProber) -> Result<PromptView> {
        PromptView::new(&self.quiz, index, env)
            .ok_or_else(|| QuizError::InvalidProgress(index.to_string()))
    }
}

/// Step-by-step quiz, or the status board when the quiz is hidden.
async fn quiz_handler(
    State(state): State<AppState>,
    Query(query): Query<ProgressQuery>,
) -> Result<Response> {
    if state.config.hide_quiz {
        return render_status_board(&state).await;
    }

    let progress = query.progress()?;
    let advance = query.advance();
    let eval = Evaluation::load(&state).await?;
    let env = &state.env;
    let page = PageContext::new(&eval.namespace, &eval.deployment, env);

    let step = eval.quiz.step(progress, advance, eval.actuals(env));
    debug!(
        namespace = %eval.namespace,
        progress,
        advance,
        step = ?step,
        "Evaluated quiz request"
    );

    match step {
        Step::Show(QuizState::AwaitingAnswer(index)) => {
            let prompt = eval.prompt(index, env)?;
            let html = state.renderer.question(&page, &prompt, eval.quiz.len())?;
            Ok(Html(html).into_response())
        }
        Step::Show(QuizState::Completed) => {
            let tasks = (0..eval.quiz.len())
                .map(|i| eval.prompt(i, env))
                .collect::<Result<Vec<_>>>()?;
            let html = state.renderer.completed(&page, &tasks)?;
            Ok(Html(html).into_response())
        }
        Step::Advance { to, completed } => {
            if completed {
                info!(namespace = %eval.namespace, "Quiz completed");
                state.notifier.notify(NotifyEvent::QuizCompleted {
                    name: env.your_name().unwrap_or_default(),
                    arise_id: env.arise_id(),
                    namespace: eval.namespace.clone(),
                    image: env.image(),
                    timestamp: Utc::now(),
                });
            } else {
                info!(namespace = %eval.namespace, question = to, "Advanced to next question");
            }
            Ok(Redirect::to(&question_url(to)).into_response())
        }
        Step::Incorrect { question } => {
            info!(
                namespace = %eval.namespace,
                question,
                key = eval.quiz.questions()[question].key.as_str(),
                "Incorrect answer"
            );
            let prompt = eval.prompt(question, env)?;
            let html = state.renderer.incorrect(&page, &prompt)?;
            Ok(Html(html).into_response())
        }
    }
}

/// All questions evaluated at once.
async fn status_handler(State(state): State<AppState>) -> Result<Response> {
    render_status_board(&state).await
}

async fn render_status_board(state: &AppState) -> Result<Response> {
    let eval = Evaluation::load(state).await?;
    let env = &state.env;
    let page = PageContext::new(&eval.namespace, &eval.deployment, env);

    let tasks = eval
        .quiz
        .statuses(eval.actuals(env))
        .into_iter()
        .enumerate()
        .map(|(i, status)| eval.prompt(i, env).map(|p| p.with_status(status)))
        .collect::<Result<Vec<_>>>()?;

    let html = state.renderer.status_board(&page, &tasks)?;
    Ok(Html(html).into_response())
}
