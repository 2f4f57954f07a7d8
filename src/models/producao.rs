// src/models/producao.rs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{validar_nao_negativo, Entidade, EtapaProducao, StatusMontagem};
use crate::db::Tabela;

// Peça fabricada (marca do desenho), sempre ligada a uma obra.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Peca {
    pub id: Uuid,
    pub obra_id: Uuid,
    pub marca: String,
    pub perfil: String,
    pub peso_unitario: Decimal,
    #[serde(deserialize_with = "super::inteiro_flexivel")]
    pub quantidade: u32,
    pub etapa: EtapaProducao,
    pub status_montagem: StatusMontagem,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lista_id: Option<Uuid>,
}

impl Entidade for Peca {
    const TABELA: Tabela = Tabela::Pecas;

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Peca {
    pub fn peso_total(&self) -> Decimal {
        crate::derived::vezes(self.peso_unitario, Decimal::from(self.quantidade))
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NovaPeca {
    pub obra_id: Uuid,

    #[validate(length(min = 1, message = "A marca da peça é obrigatória."))]
    pub marca: String,

    #[serde(default)]
    pub perfil: String,

    #[validate(custom(function = "validar_nao_negativo"))]
    pub peso_unitario: Decimal,

    #[validate(range(min = 1, message = "A quantidade deve ser pelo menos 1."))]
    pub quantidade: u32,

    pub lista_id: Option<Uuid>,
}

impl NovaPeca {
    pub fn into_peca(self, id: Uuid) -> Peca {
        Peca {
            id,
            obra_id: self.obra_id,
            marca: self.marca,
            perfil: self.perfil,
            peso_unitario: self.peso_unitario,
            quantidade: self.quantidade,
            etapa: EtapaProducao::Aguardando,
            status_montagem: StatusMontagem::Pendente,
            lista_id: self.lista_id,
        }
    }
}
