// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// Falhas vindas de qualquer backend de armazenamento (memória ou Postgres).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Registro rejeitado pelo armazenamento: {0}")]
    Rejected(String),

    #[error("Conflito de unicidade: {0}")]
    Conflict(String),

    #[error("Armazenamento indisponível: {0}")]
    Unavailable(String),

    #[error("Erro de banco de dados: {0}")]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    // Traduz violações de UNIQUE do Postgres para `Conflict`.
    pub fn from_sqlx(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                let constraint = db_err.constraint().unwrap_or_default().to_string();
                return StoreError::Conflict(constraint);
            }
        }
        StoreError::Database(err)
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Produto {0} não encontrado")]
    ProductNotFound(i64),

    #[error("Movimentação {0} não encontrada")]
    MovementNotFound(i64),

    #[error("Categoria {0} não encontrada")]
    CategoryNotFound(i64),

    #[error("Estoque insuficiente: disponível {available}, solicitado {requested}")]
    InsufficientStock { available: i64, requested: i64 },

    #[error("SKU '{0}' já existe")]
    SkuAlreadyExists(String),

    #[error("Categoria '{0}' já existe")]
    CategoryNameAlreadyExists(String),

    #[error("Categoria {0} possui produtos")]
    CategoryInUse(i64),

    #[error("Falha de leitura no armazenamento: {0}")]
    StoreRead(#[source] StoreError),

    #[error("Falha de escrita no armazenamento: {0}")]
    StoreWrite(#[source] StoreError),

    // A movimentação já foi gravada, mas o saldo do produto não.
    #[error("Movimentação {movement_id} gravada mas o saldo do produto {product_id} não foi atualizado: {source}")]
    ReconciliationFailed {
        movement_id: i64,
        product_id: i64,
        #[source]
        source: StoreError,
    },

    #[error("Overflow ao calcular {0}")]
    ArithmeticOverflow(&'static str),

    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors.iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::ProductNotFound(_) => (StatusCode::NOT_FOUND, "Produto não encontrado.".to_string()),
            AppError::MovementNotFound(_) => (StatusCode::NOT_FOUND, "Movimentação não encontrada.".to_string()),
            AppError::CategoryNotFound(_) => (StatusCode::NOT_FOUND, "Categoria não encontrada.".to_string()),
            ref e @ AppError::InsufficientStock { .. } => (StatusCode::CONFLICT, e.to_string()),
            ref e @ AppError::SkuAlreadyExists(_) => (StatusCode::CONFLICT, e.to_string()),
            ref e @ AppError::CategoryNameAlreadyExists(_) => (StatusCode::CONFLICT, e.to_string()),
            AppError::CategoryInUse(_) => (
                StatusCode::CONFLICT,
                "Não é possível remover uma categoria com produtos. Mova os produtos primeiro.".to_string(),
            ),

            // Falhas de armazenamento viram um aviso genérico; o detalhe vai para o log.
            ref e @ (AppError::StoreRead(_) | AppError::StoreWrite(_)) => {
                tracing::error!("Falha no armazenamento: {}", e);
                (StatusCode::BAD_GATEWAY, "Falha ao comunicar com o armazenamento.".to_string())
            }

            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Ocorreu um erro inesperado.".to_string())
            }
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}

// Monta um `ValidationErrors` com um único campo, no padrão de resposta do validator.
pub fn field_error(field: &'static str, code: &'static str, message: &'static str) -> validator::ValidationErrors {
    let mut err = validator::ValidationError::new(code);
    err.message = Some(message.into());
    let mut errors = validator::ValidationErrors::new();
    errors.add(field, err);
    errors
}
