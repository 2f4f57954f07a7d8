// src/models/obra.rs

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{validar_nao_negativo, Entidade, Orcamento, StatusObra};
use crate::db::Tabela;

/// As seis etapas acompanhadas no progresso de uma obra. A chave é fixa.
pub const ETAPAS_OBRA: [&str; 6] = ["corte", "fabricacao", "solda", "pintura", "expedicao", "montagem"];

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Obra {
    pub id: Uuid,
    pub codigo: String,
    pub nome: String,
    pub cliente: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cliente_id: Option<Uuid>,
    pub status: StatusObra,
    pub valor_contrato: Decimal,
    pub peso_total: Decimal,

    // Etapa -> percentual (0..=100). Etapa ausente conta como 0 no progresso.
    pub progresso: BTreeMap<String, Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_inicio: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_previsao: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub responsavel: Option<String>,
}

impl Entidade for Obra {
    const TABELA: Tabela = Tabela::Obras;

    fn id(&self) -> Uuid {
        self.id
    }
}

fn progresso_zerado() -> BTreeMap<String, Decimal> {
    ETAPAS_OBRA
        .iter()
        .map(|etapa| (etapa.to_string(), Decimal::ZERO))
        .collect()
}

impl Obra {
    /// A obra que nasce quando um orçamento é aprovado.
    pub fn a_partir_do_orcamento(orcamento: &Orcamento, id: Uuid) -> Self {
        Self {
            id,
            codigo: format!("OB-{}", orcamento.numero),
            nome: orcamento.nome_obra.clone(),
            cliente: orcamento.cliente.clone(),
            cliente_id: None,
            status: StatusObra::Aprovado,
            valor_contrato: orcamento.valor_total,
            peso_total: orcamento.peso_estimado,
            progresso: progresso_zerado(),
            data_inicio: None,
            data_previsao: None,
            responsavel: None,
        }
    }
}

// --- Payload de criação ---
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NovaObra {
    #[validate(length(min = 1, message = "O código da obra é obrigatório."))]
    pub codigo: String,

    #[validate(length(min = 1, message = "O nome da obra é obrigatório."))]
    pub nome: String,

    pub cliente: String,
    pub cliente_id: Option<Uuid>,

    // Obra cadastrada direto (sem orçamento) já entra aprovada
    pub status: Option<StatusObra>,

    #[validate(custom(function = "validar_nao_negativo"))]
    pub valor_contrato: Decimal,

    #[validate(custom(function = "validar_nao_negativo"))]
    #[serde(default)]
    pub peso_total: Decimal,

    pub data_inicio: Option<NaiveDate>,
    pub data_previsao: Option<NaiveDate>,
    pub responsavel: Option<String>,
}

impl NovaObra {
    pub fn into_obra(self, id: Uuid) -> Obra {
        Obra {
            id,
            codigo: self.codigo,
            nome: self.nome,
            cliente: self.cliente,
            cliente_id: self.cliente_id,
            status: self.status.unwrap_or(StatusObra::Aprovado),
            valor_contrato: self.valor_contrato,
            peso_total: self.peso_total,
            progresso: progresso_zerado(),
            data_inicio: self.data_inicio,
            data_previsao: self.data_previsao,
            responsavel: self.responsavel,
        }
    }
}
