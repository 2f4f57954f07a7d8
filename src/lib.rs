// src/lib.rs

//! Núcleo de sincronização de dados do ERP da metalúrgica.
//!
//! Camadas, das folhas para cima:
//! - `transform`: conversão entre o formato persistido (snake_case) e o runtime (camelCase);
//! - `derived`: valores derivados (progresso, nível de estoque, resumos financeiros);
//! - `reducer`: a função pura de transição de estado;
//! - `db`: o Gateway (Postgres ou memória) que faz a I/O de rede;
//! - `store` + `hooks`: o contexto com as leituras por domínio e as escritas otimistas.

pub mod common;
pub mod config;
pub mod db;
pub mod derived;
pub mod hooks;
pub mod models;
pub mod reducer;
pub mod store;
pub mod transform;

pub use crate::common::error::{AppError, ViolacaoInvariante};
pub use crate::config::{AppState, ModoOperacao, SyncConfig};
pub use crate::db::{Gateway, MemoryGateway, Ordenacao, PgGateway, Tabela};
pub use crate::reducer::{Action, AcaoColecao, ErpState};
pub use crate::store::{ErpStore, Pendente};
