// src/models/orcamento.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{validar_nao_negativo, validar_percentual, Entidade, StatusOrcamento};
use crate::db::Tabela;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Orcamento {
    pub id: Uuid,
    pub numero: String,
    pub nome_obra: String,
    pub cliente: String,
    pub valor_total: Decimal,
    pub peso_estimado: Decimal,
    // Chance de fechar, 0..=100
    pub probabilidade: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validade: Option<NaiveDate>,
    pub status: StatusOrcamento,
    // Preenchido só pela aprovação
    #[serde(skip_serializing_if = "Option::is_none")]
    pub obra_id: Option<Uuid>,
}

impl Entidade for Orcamento {
    const TABELA: Tabela = Tabela::Orcamentos;

    fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NovoOrcamento {
    #[validate(length(min = 1, message = "O número do orçamento é obrigatório."))]
    pub numero: String,

    #[validate(length(min = 1, message = "O nome da obra é obrigatório."))]
    pub nome_obra: String,

    pub cliente: String,

    #[validate(custom(function = "validar_nao_negativo"))]
    pub valor_total: Decimal,

    #[validate(custom(function = "validar_nao_negativo"))]
    #[serde(default)]
    pub peso_estimado: Decimal,

    #[validate(custom(function = "validar_percentual"))]
    #[serde(default)]
    pub probabilidade: Decimal,

    pub validade: Option<NaiveDate>,
}

impl NovoOrcamento {
    pub fn into_orcamento(self, id: Uuid) -> Orcamento {
        Orcamento {
            id,
            numero: self.numero,
            nome_obra: self.nome_obra,
            cliente: self.cliente,
            valor_total: self.valor_total,
            peso_estimado: self.peso_estimado,
            probabilidade: self.probabilidade,
            validade: self.validade,
            status: StatusOrcamento::Rascunho,
            obra_id: None,
        }
    }
}
