// src/models/medicao.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{validar_nao_negativo, Entidade, StatusMedicao};
use crate::db::Tabela;

// Medição de faturamento. O percentual do contrato é derivado do valor da obra.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Medicao {
    pub id: Uuid,
    #[serde(deserialize_with = "super::inteiro_flexivel")]
    pub numero: i32,
    pub obra_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<NaiveDate>,
    pub valor: Decimal,
    pub peso: Decimal,
    pub status: StatusMedicao,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observacoes: Option<String>,
}

impl Entidade for Medicao {
    const TABELA: Tabela = Tabela::Medicoes;

    fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NovaMedicao {
    #[validate(range(min = 1, message = "O número da medição começa em 1."))]
    pub numero: i32,

    pub obra_id: Uuid,
    pub data: Option<NaiveDate>,

    #[validate(custom(function = "validar_nao_negativo"))]
    pub valor: Decimal,

    #[validate(custom(function = "validar_nao_negativo"))]
    #[serde(default)]
    pub peso: Decimal,

    pub observacoes: Option<String>,
}

impl NovaMedicao {
    pub fn into_medicao(self, id: Uuid) -> Medicao {
        Medicao {
            id,
            numero: self.numero,
            obra_id: self.obra_id,
            data: self.data,
            valor: self.valor,
            peso: self.peso,
            status: StatusMedicao::Pendente,
            observacoes: self.observacoes,
        }
    }
}
