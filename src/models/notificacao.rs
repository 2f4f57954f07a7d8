// src/models/notificacao.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TipoNotificacao {
    Info,
    Sucesso,
    Aviso,
    Erro,
}

/// Toast efêmero. Vive só no estado local, nunca vai para o backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notificacao {
    pub id: Uuid,
    pub tipo: TipoNotificacao,
    pub titulo: String,
    pub mensagem: String,
    pub criada_em: DateTime<Utc>,
}

impl Notificacao {
    pub fn nova(tipo: TipoNotificacao, titulo: impl Into<String>, mensagem: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            tipo,
            titulo: titulo.into(),
            mensagem: mensagem.into(),
            criada_em: Utc::now(),
        }
    }
}
