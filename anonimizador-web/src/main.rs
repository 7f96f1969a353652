//! Servidor web Axum com HTTP e WebSocket para anonimização de textos em espanhol

use std::path::PathBuf;
use std::sync::Arc;

use anonimizador_core::{
    anonymize_document,
    lexicon::demo_texts,
    pipeline::{Anonymizer, PipelineEvent},
    AnonymizeError, AnonymizerConfig, Document, EntitySpan,
};
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_ADDR: &str = "0.0.0.0:3000";

/// Configuração do processo, lida do ambiente.
#[derive(Debug, Clone, PartialEq)]
struct AppConfig {
    /// `ANONIMIZADOR_ADDR`
    addr: String,
    /// `ANONIMIZADOR_CONFIG`: JSON de [`AnonymizerConfig`]
    config_path: Option<PathBuf>,
}

impl AppConfig {
    fn from_env() -> Self {
        Self::from_vars(
            std::env::var("ANONIMIZADOR_ADDR").ok(),
            std::env::var_os("ANONIMIZADOR_CONFIG").map(PathBuf::from),
        )
    }

    fn from_vars(addr: Option<String>, config_path: Option<PathBuf>) -> Self {
        Self {
            addr: addr
                .filter(|a| !a.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_ADDR.to_string()),
            config_path,
        }
    }

    fn anonymizer_config(&self) -> Result<AnonymizerConfig, AnonymizeError> {
        match &self.config_path {
            Some(path) => AnonymizerConfig::from_json_file(path),
            None => Ok(AnonymizerConfig::default()),
        }
    }
}

/// Estado compartilhado da aplicação
struct AppState {
    anonymizer: Anonymizer,
}

#[derive(Deserialize)]
struct TextRequest {
    text: String,
}

#[derive(Serialize)]
struct AnalyzeResponse {
    entities: Vec<EntitySpan>,
}

#[derive(Serialize)]
struct DocumentResponse {
    document: Document,
    plain_text: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::from_env();
    let anonymizer = Anonymizer::from_config(config.anonymizer_config()?)?;
    let app = router(Arc::new(AppState { anonymizer }));

    let listener = tokio::net::TcpListener::bind(&config.addr).await?;
    info!("Servidor do anonimizador iniciado em http://{}", config.addr);
    axum::serve(listener, app).await?;
    Ok(())
}

fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(index_handler))
        .route("/anonymize", post(anonymize_handler))
        .route("/analyze", post(analyze_handler))
        .route("/document", post(document_handler))
        .route("/demo-texts", get(demo_texts_handler))
        .route("/ws", get(ws_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Retorna a página principal HTML
async fn index_handler() -> impl IntoResponse {
    Html(include_str!("templates/index.html"))
}

fn error_body(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(serde_json::json!({ "error": message.into() }))).into_response()
}

/// Erros de configuração são do cliente; o resto é falha do servidor.
fn pipeline_error(err: AnonymizeError) -> Response {
    let status = match err {
        AnonymizeError::Config(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    error!(error = %err, "falha na anonimização");
    error_body(status, err.to_string())
}

/// Roda trabalho síncrono do pipeline fora do runtime async.
async fn run_blocking<T, F>(state: Arc<AppState>, work: F) -> Result<T, Response>
where
    T: Send + 'static,
    F: FnOnce(&Anonymizer) -> Result<T, AnonymizeError> + Send + 'static,
{
    match tokio::task::spawn_blocking(move || work(&state.anonymizer)).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(pipeline_error(err)),
        Err(join_err) => {
            error!(error = %join_err, "tarefa do pipeline abortada");
            Err(error_body(StatusCode::INTERNAL_SERVER_ERROR, "tarefa do pipeline abortada"))
        }
    }
}

/// Anonimização via HTTP POST
async fn anonymize_handler(State(state): State<Arc<AppState>>, Json(req): Json<TextRequest>) -> Response {
    if req.text.trim().is_empty() {
        return error_body(StatusCode::BAD_REQUEST, "Texto vazio");
    }
    match run_blocking(state, move |a| a.anonymize_with_report(&req.text)).await {
        Ok(report) => Json(report).into_response(),
        Err(response) => response,
    }
}

/// Entidades reconhecidas, sem substituir nada
async fn analyze_handler(State(state): State<Arc<AppState>>, Json(req): Json<TextRequest>) -> Response {
    if req.text.trim().is_empty() {
        return error_body(StatusCode::BAD_REQUEST, "Texto vazio");
    }
    match run_blocking(state, move |a| a.recognize(&req.text)).await {
        Ok(entities) => Json(AnalyzeResponse { entities }).into_response(),
        Err(response) => response,
    }
}

/// Anonimiza parágrafos e tabelas de um documento já extraído
async fn document_handler(State(state): State<Arc<AppState>>, Json(doc): Json<Document>) -> Response {
    match run_blocking(state, move |a| anonymize_document(a, &doc)).await {
        Ok(document) => {
            let plain_text = document.plain_text();
            Json(DocumentResponse { document, plain_text }).into_response()
        }
        Err(response) => response,
    }
}

/// Retorna textos de demonstração
async fn demo_texts_handler() -> impl IntoResponse {
    let texts: Vec<serde_json::Value> = demo_texts()
        .iter()
        .map(|(domain, text)| {
            serde_json::json!({
                "domain": domain,
                "text": text
            })
        })
        .collect();
    Json(texts)
}

/// Upgrade HTTP → WebSocket
async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_websocket(socket, state))
}

/// Texto do cliente: JSON `{text}` ou texto puro, sem alterar espaços.
fn parse_ws_text(raw: &str) -> String {
    match serde_json::from_str::<TextRequest>(raw) {
        Ok(req) => req.text,
        Err(_) => raw.to_string(),
    }
}

/// Lógica do WebSocket: recebe texto, executa o pipeline e repassa os eventos
async fn handle_websocket(mut socket: WebSocket, state: Arc<AppState>) {
    info!("WebSocket conectado");

    while let Some(Ok(msg)) = socket.recv().await {
        match msg {
            Message::Text(raw) => {
                let text = parse_ws_text(&raw);
                if text.trim().is_empty() {
                    continue;
                }
                info!("Anonimizando via WebSocket: {} chars", text.chars().count());

                let (tx, rx) = std::sync::mpsc::channel::<PipelineEvent>();
                let state_for_thread = Arc::clone(&state);
                let handle = tokio::task::spawn_blocking(move || {
                    state_for_thread.anonymizer.anonymize_streaming(&text, tx);
                });
                if let Err(join_err) = handle.await {
                    warn!(error = %join_err, "pipeline do WebSocket abortado");
                }

                // Coleta todos os eventos numa Vec (o Receiver não atravessa awaits)
                let events: Vec<PipelineEvent> = rx.try_iter().collect();
                for event in &events {
                    if let Ok(json) = serde_json::to_string(event) {
                        if socket.send(Message::Text(json)).await.is_err() {
                            return; // cliente desconectou
                        }
                    }
                }
            }
            Message::Close(_) => {
                info!("WebSocket desconectado");
                return;
            }
            Message::Ping(payload) => {
                let _ = socket.send(Message::Pong(payload)).await;
            }
            _ => {}
        }
    }
}
