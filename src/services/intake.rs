// src/services/intake.rs

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::models::inventory::{MovementType, MAX_QUANTITY};

// Motivos aceitos por direção, na ordem em que o formulário os oferece.
pub const ADD_REASONS: &[&str] = &["Restock", "Purchase", "Return", "Adjustment", "Other"];
pub const REMOVE_REASONS: &[&str] = &["Sale", "Damage", "Loss", "Transfer", "Adjustment", "Other"];

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Add,
    Remove,
}

impl Direction {
    pub fn allowed_reasons(self) -> &'static [&'static str] {
        match self {
            Direction::Add => ADD_REASONS,
            Direction::Remove => REMOVE_REASONS,
        }
    }

    pub fn movement_type(self) -> MovementType {
        match self {
            Direction::Add => MovementType::In,
            Direction::Remove => MovementType::Out,
        }
    }
}

// O formulário manda a quantidade como texto; clientes de API mandam número.
// Qualquer outro valor JSON cai em `Other` e vira erro de campo na validação.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum QuantityInput {
    Integer(i64),
    Decimal(f64),
    Text(String),
    Other(serde_json::Value),
}

impl QuantityInput {
    /// Só aceita inteiros exatos: "12", 12 ou 12.0. Frações e texto livre não passam.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            QuantityInput::Integer(n) => Some(*n),
            QuantityInput::Decimal(f) => {
                if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
                    Some(*f as i64)
                } else {
                    None
                }
            }
            QuantityInput::Text(s) => s.trim().parse::<i64>().ok(),
            QuantityInput::Other(_) => None,
        }
    }
}

impl From<i64> for QuantityInput {
    fn from(n: i64) -> Self {
        QuantityInput::Integer(n)
    }
}

impl From<&str> for QuantityInput {
    fn from(s: &str) -> Self {
        QuantityInput::Text(s.to_string())
    }
}

// ---
// Payload: ajuste de estoque
// ---
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AdjustmentPayload {
    pub direction: Direction,

    #[validate(required(message = "Informe uma quantidade válida."))]
    pub quantity: Option<QuantityInput>,

    #[validate(required(message = "Selecione um motivo."))]
    pub reason: Option<String>,

    #[validate(length(max = 1000, message = "As observações devem ter no máximo 1000 caracteres."))]
    pub notes: Option<String>,

    // Chave opcional contra envio duplicado (duplo clique, reenvio do cliente).
    pub request_key: Option<String>,
}

/// Ajuste já validado, pronto para ir ao livro-razão.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidAdjustment {
    pub product_id: i64,
    pub movement_type: MovementType,
    pub quantity: i64,
    pub reason: String,
    pub notes: Option<String>,
    pub request_key: Option<String>,
}

impl ValidAdjustment {
    pub fn signed_delta(&self) -> i64 {
        self.movement_type.signed(self.quantity)
    }
}

fn error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

/// Valida o formulário de ajuste. Em caso de erro devolve o mapa campo → mensagens
/// e nada é gravado.
pub fn validate_adjustment(
    product_id: i64,
    payload: AdjustmentPayload,
) -> Result<ValidAdjustment, ValidationErrors> {
    let mut errors = payload.validate().err().unwrap_or_else(ValidationErrors::new);

    let quantity = match &payload.quantity {
        Some(raw) => match raw.as_integer() {
            Some(n) if n > MAX_QUANTITY => {
                errors.add("quantity", error("range", "A quantidade excede o limite permitido."));
                None
            }
            Some(n) if n > 0 => Some(n),
            _ => {
                errors.add("quantity", error("range", "A quantidade deve ser um número inteiro maior que zero."));
                None
            }
        },
        None => None,
    };

    let reason = match payload.reason.as_deref().map(str::trim) {
        Some("") => {
            errors.add("reason", error("required", "Selecione um motivo."));
            None
        }
        Some(reason) if !payload.direction.allowed_reasons().contains(&reason) => {
            errors.add("reason", error("invalid_reason", "Motivo não permitido para este tipo de ajuste."));
            None
        }
        Some(reason) => Some(reason.to_string()),
        None => None,
    };

    match (quantity, reason) {
        (Some(quantity), Some(reason)) if errors.is_empty() => Ok(ValidAdjustment {
            product_id,
            movement_type: payload.direction.movement_type(),
            quantity,
            reason,
            notes: payload.notes.filter(|n| !n.trim().is_empty()),
            request_key: payload.request_key.filter(|k| !k.trim().is_empty()),
        }),
        _ => Err(errors),
    }
}
