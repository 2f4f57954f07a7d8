// src/db/gateway.rs

use async_trait::async_trait;
use uuid::Uuid;

use crate::{common::error::AppError, db::Tabela, transform::RegistroPersistido};

/// Coluna e direção da listagem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ordenacao {
    pub coluna: String,
    pub ascendente: bool,
}

impl Ordenacao {
    pub fn asc(coluna: impl Into<String>) -> Self {
        Self { coluna: coluna.into(), ascendente: true }
    }

    pub fn desc(coluna: impl Into<String>) -> Self {
        Self { coluna: coluna.into(), ascendente: false }
    }
}

/// A fronteira de rede. O núcleo só fala com o backend por aqui,
/// sempre com registros no formato persistido (snake_case).
#[async_trait]
pub trait Gateway: Send + Sync {
    async fn list(
        &self,
        tabela: Tabela,
        ordem: &Ordenacao,
        limite: Option<i64>,
    ) -> Result<Vec<RegistroPersistido>, AppError>;

    async fn create(
        &self,
        tabela: Tabela,
        payload: RegistroPersistido,
    ) -> Result<RegistroPersistido, AppError>;

    async fn update(
        &self,
        tabela: Tabela,
        id: Uuid,
        patch: RegistroPersistido,
    ) -> Result<RegistroPersistido, AppError>;

    async fn delete(&self, tabela: Tabela, id: Uuid) -> Result<(), AppError>;

    /// Usado uma vez na inicialização para escolher entre backend real e modo offline.
    async fn check_connection(&self) -> bool;
}
