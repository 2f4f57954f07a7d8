// src/models/expedicao.rs

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{Entidade, StatusExpedicao};
use crate::db::Tabela;

// Romaneio de expedição. O peso total não é gravado: vem das peças referenciadas.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Expedicao {
    pub id: Uuid,
    pub codigo: String,
    pub obra_id: Uuid,
    pub status: StatusExpedicao,
    pub pecas: Vec<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transportadora: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placa: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_saida: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_entrega: Option<NaiveDate>,
}

impl Entidade for Expedicao {
    const TABELA: Tabela = Tabela::Expedicoes;

    fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NovaExpedicao {
    #[validate(length(min = 1, message = "O código do romaneio é obrigatório."))]
    pub codigo: String,

    pub obra_id: Uuid,

    #[validate(length(min = 1, message = "O romaneio precisa de ao menos uma peça."))]
    pub pecas: Vec<Uuid>,

    pub transportadora: Option<String>,
    pub placa: Option<String>,
    pub data_saida: Option<NaiveDate>,
}

impl NovaExpedicao {
    pub fn into_expedicao(self, id: Uuid) -> Expedicao {
        Expedicao {
            id,
            codigo: self.codigo,
            obra_id: self.obra_id,
            status: StatusExpedicao::Aguardando,
            pecas: self.pecas,
            transportadora: self.transportadora,
            placa: self.placa,
            data_saida: self.data_saida,
            data_entrega: None,
        }
    }
}
