// src/config.rs

use std::{env, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;

use crate::{
    common::logging::init_tracing,
    db::{Gateway, MemoryGateway, PgGateway},
    store::ErpStore,
};

/// Configuração do núcleo, lida do ambiente (e do `.env`, se existir).
#[derive(Debug, Clone, PartialEq)]
pub struct SyncConfig {
    // Sem URL o sistema sobe direto em modo offline
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
    // None = sem limite na listagem
    pub limite_listagem: Option<i64>,
    pub carregar_na_inicializacao: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            max_connections: 5,
            acquire_timeout: Duration::from_secs(3),
            limite_listagem: Some(1000),
            carregar_na_inicializacao: true,
        }
    }
}

impl SyncConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|chave| env::var(chave).ok())
    }

    /// Monta a configuração a partir de qualquer fonte de chave/valor. Chave ausente ou vazia usa o padrão.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let ler = |chave: &str| lookup(chave).map(|v| v.trim().to_owned()).filter(|v| !v.is_empty());
        let padrao = Self::default();

        let max_connections = match ler("ERP_MAX_CONNECTIONS") {
            Some(v) => v.parse().with_context(|| format!("ERP_MAX_CONNECTIONS inválido: '{v}'"))?,
            None => padrao.max_connections,
        };

        let acquire_timeout = match ler("ERP_ACQUIRE_TIMEOUT_SECS") {
            Some(v) => Duration::from_secs(
                v.parse()
                    .with_context(|| format!("ERP_ACQUIRE_TIMEOUT_SECS inválido: '{v}'"))?,
            ),
            None => padrao.acquire_timeout,
        };

        let limite_listagem = match ler("ERP_LIST_LIMIT") {
            Some(v) => {
                let limite: i64 = v.parse().with_context(|| format!("ERP_LIST_LIMIT inválido: '{v}'"))?;
                (limite > 0).then_some(limite)
            }
            None => padrao.limite_listagem,
        };

        let carregar_na_inicializacao = match ler("ERP_CARREGAR_NA_INICIALIZACAO") {
            Some(v) => match v.to_lowercase().as_str() {
                "1" | "true" | "sim" => true,
                "0" | "false" | "nao" | "não" => false,
                _ => anyhow::bail!("ERP_CARREGAR_NA_INICIALIZACAO inválido: '{v}'"),
            },
            None => padrao.carregar_na_inicializacao,
        };

        Ok(Self {
            database_url: ler("DATABASE_URL"),
            max_connections,
            acquire_timeout,
            limite_listagem,
            carregar_na_inicializacao,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModoOperacao {
    Online,
    /// Backend indisponível: Gateway em memória, vazio.
    Offline,
}

#[derive(Clone)]
pub struct AppState {
    pub config: SyncConfig,
    pub store: Arc<ErpStore>,
    pub modo: ModoOperacao,
}

impl AppState {
    /// Sobe o núcleo a partir do ambiente, já com o logger configurado.
    pub async fn new() -> anyhow::Result<Self> {
        init_tracing();
        Self::com_config(SyncConfig::from_env()?).await
    }

    pub async fn com_config(config: SyncConfig) -> anyhow::Result<Self> {
        let (gateway, modo) = conectar(&config).await;

        let store = Arc::new(ErpStore::new(gateway).com_limite(config.limite_listagem));

        if config.carregar_na_inicializacao && modo == ModoOperacao::Online {
            let falhas = store.carregar_tudo().await;
            if !falhas.is_empty() {
                tracing::warn!("⚠️ {} tabela(s) não carregaram na inicialização", falhas.len());
            }
        }

        Ok(Self { config, store, modo })
    }
}

// Uma verificação só, na subida. Qualquer falha cai no modo offline.
async fn conectar(config: &SyncConfig) -> (Arc<dyn Gateway>, ModoOperacao) {
    let offline = || -> (Arc<dyn Gateway>, ModoOperacao) { (Arc::new(MemoryGateway::new()), ModoOperacao::Offline) };

    let Some(database_url) = config.database_url.as_deref() else {
        tracing::warn!("⚠️ DATABASE_URL não definida. Iniciando em modo offline.");
        return offline();
    };

    let pool = match PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout)
        .connect(database_url)
        .await
    {
        Ok(pool) => pool,
        Err(e) => {
            tracing::warn!("⚠️ Não foi possível conectar ao banco ({}). Iniciando em modo offline.", e);
            return offline();
        }
    };

    let gateway = PgGateway::new(pool);
    if !gateway.check_connection().await {
        tracing::warn!("⚠️ Banco não respondeu à verificação. Iniciando em modo offline.");
        return offline();
    }

    tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");
    (Arc::new(gateway), ModoOperacao::Online)
}
