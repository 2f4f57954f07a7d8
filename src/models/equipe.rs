// src/models/equipe.rs

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::Entidade;
use crate::db::Tabela;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Equipe {
    pub id: Uuid,
    pub nome: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lider: Option<String>,
    pub membros: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub especialidade: Option<String>,
    // Obra onde a equipe está alocada agora
    #[serde(skip_serializing_if = "Option::is_none")]
    pub obra_id: Option<Uuid>,
    pub ativa: bool,
}

impl Entidade for Equipe {
    const TABELA: Tabela = Tabela::Equipes;

    fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NovaEquipe {
    #[validate(length(min = 1, message = "O nome da equipe é obrigatório."))]
    pub nome: String,

    pub lider: Option<String>,

    #[serde(default)]
    pub membros: Vec<String>,

    pub especialidade: Option<String>,
    pub obra_id: Option<Uuid>,
}

impl NovaEquipe {
    pub fn into_equipe(self, id: Uuid) -> Equipe {
        Equipe {
            id,
            nome: self.nome,
            lider: self.lider,
            membros: self.membros,
            especialidade: self.especialidade,
            obra_id: self.obra_id,
            ativa: true,
        }
    }
}
