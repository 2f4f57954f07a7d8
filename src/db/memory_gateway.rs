// src/db/memory_gateway.rs

use std::{
    cmp::Ordering,
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering as AtomicOrdering},
        Arc, Mutex, MutexGuard, PoisonError,
    },
};

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use tokio::sync::Notify;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{Gateway, Ordenacao, Tabela},
    transform::RegistroPersistido,
};

/// Gateway em memória.
///
/// Serve de dublê nos testes e de backend vazio no modo offline. Não carrega dados de demonstração.
#[derive(Default)]
pub struct MemoryGateway {
    tabelas: Mutex<HashMap<Tabela, Vec<RegistroPersistido>>>,
    // Quantas das próximas escritas devem falhar com erro de transporte
    falhas_pendentes: AtomicUsize,
    // Simula um backend que gera o próprio id e ignora o que o cliente mandou
    ids_do_servidor: bool,
    desconectado: bool,
    escritas: AtomicUsize,
    // Resposta da próxima escrita bem-sucedida fica parada até o Notify ser acionado
    retencao: Mutex<Option<Arc<Notify>>>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn desconectado() -> Self {
        Self {
            desconectado: true,
            ..Self::default()
        }
    }

    pub fn com_ids_do_servidor(mut self) -> Self {
        self.ids_do_servidor = true;
        self
    }

    pub fn com_registros(self, tabela: Tabela, registros: Vec<RegistroPersistido>) -> Self {
        self.tabelas().insert(tabela, registros);
        self
    }

    pub fn falhar_proximas(&self, quantidade: usize) {
        self.falhas_pendentes.store(quantidade, AtomicOrdering::SeqCst);
    }

    /// Cópia do que está gravado, no formato persistido.
    pub fn registros(&self, tabela: Tabela) -> Vec<RegistroPersistido> {
        self.tabelas().get(&tabela).cloned().unwrap_or_default()
    }

    /// A próxima escrita é gravada na hora, mas a resposta só volta depois de `notify_one()`.
    pub fn segurar_proxima_resposta(&self) -> Arc<Notify> {
        let liberar = Arc::new(Notify::new());
        *self.retencao.lock().unwrap_or_else(PoisonError::into_inner) = Some(Arc::clone(&liberar));
        liberar
    }

    async fn responder<T>(&self, resposta: T) -> T {
        let retida = self.retencao.lock().unwrap_or_else(PoisonError::into_inner).take();
        if let Some(liberar) = retida {
            liberar.notified().await;
        }
        resposta
    }

    /// Total de escritas (create/update/delete) que chegaram ao "servidor", incluindo as que falharam.
    pub fn total_escritas(&self) -> usize {
        self.escritas.load(AtomicOrdering::SeqCst)
    }

    fn tabelas(&self) -> MutexGuard<'_, HashMap<Tabela, Vec<RegistroPersistido>>> {
        self.tabelas.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn registrar_escrita(&self) -> Result<(), AppError> {
        self.escritas.fetch_add(1, AtomicOrdering::SeqCst);

        if self.desconectado {
            return Err(AppError::Transporte("backend em memória desconectado".into()));
        }

        let consumiu = self
            .falhas_pendentes
            .fetch_update(AtomicOrdering::SeqCst, AtomicOrdering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if consumiu {
            return Err(AppError::Transporte("falha simulada de rede".into()));
        }
        Ok(())
    }
}

fn id_do_registro(registro: &RegistroPersistido) -> Option<Uuid> {
    registro
        .get("id")
        .and_then(Value::as_str)
        .and_then(|s| Uuid::parse_str(s).ok())
}

// Ordem total: números, depois textos, depois o resto; nulo e ausente são o mesmo e vão para o fim
fn comparar_valores(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    fn classe(valor: Option<&Value>) -> u8 {
        match valor {
            Some(Value::Number(_)) => 0,
            Some(Value::String(_)) => 1,
            Some(Value::Bool(_)) => 2,
            Some(Value::Array(_) | Value::Object(_)) => 3,
            Some(Value::Null) | None => 4,
        }
    }

    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.total_cmp(&y)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        _ => classe(a).cmp(&classe(b)),
    }
}

#[async_trait]
impl Gateway for MemoryGateway {
    async fn list(
        &self,
        tabela: Tabela,
        ordem: &Ordenacao,
        limite: Option<i64>,
    ) -> Result<Vec<RegistroPersistido>, AppError> {
        if self.desconectado {
            return Err(AppError::Transporte("backend em memória desconectado".into()));
        }

        let mut registros = self.registros(tabela);
        registros.sort_by(|a, b| {
            let ordem_natural = comparar_valores(a.get(&ordem.coluna), b.get(&ordem.coluna));
            if ordem.ascendente { ordem_natural } else { ordem_natural.reverse() }
        });

        if let Some(limite) = limite {
            registros.truncate(usize::try_from(limite).unwrap_or(0));
        }
        Ok(registros)
    }

    async fn create(
        &self,
        tabela: Tabela,
        mut payload: RegistroPersistido,
    ) -> Result<RegistroPersistido, AppError> {
        self.registrar_escrita()?;

        if self.ids_do_servidor || id_do_registro(&payload).is_none() {
            payload.insert("id".into(), Value::String(Uuid::new_v4().to_string()));
        }
        payload
            .entry("created_at")
            .or_insert_with(|| Value::String(Utc::now().to_rfc3339()));

        self.tabelas().entry(tabela).or_default().push(payload.clone());
        Ok(self.responder(payload).await)
    }

    async fn update(
        &self,
        tabela: Tabela,
        id: Uuid,
        patch: RegistroPersistido,
    ) -> Result<RegistroPersistido, AppError> {
        self.registrar_escrita()?;

        let atualizado = {
            let mut tabelas = self.tabelas();
            let registro = tabelas
                .get_mut(&tabela)
                .and_then(|linhas| linhas.iter_mut().find(|r| id_do_registro(r) == Some(id)))
                .ok_or(AppError::RegistroNaoEncontrado { tabela, id })?;

            for (chave, valor) in patch {
                // O id é chave primária: o servidor nunca deixa mudar
                if chave != "id" {
                    registro.insert(chave, valor);
                }
            }
            registro.clone()
        };
        Ok(self.responder(atualizado).await)
    }

    async fn delete(&self, tabela: Tabela, id: Uuid) -> Result<(), AppError> {
        self.registrar_escrita()?;

        let removido = {
            let mut tabelas = self.tabelas();
            let linhas = tabelas.entry(tabela).or_default();
            let antes = linhas.len();
            linhas.retain(|r| id_do_registro(r) != Some(id));
            linhas.len() < antes
        };

        if !removido {
            return Err(AppError::RegistroNaoEncontrado { tabela, id });
        }
        self.responder(()).await;
        Ok(())
    }

    async fn check_connection(&self) -> bool {
        !self.desconectado
    }
}
