// src/hooks.rs

//! Os hooks por domínio. Leituras devolvem uma visão memoizada (mesmo `Arc` enquanto as
//! fatias de que ela depende não mudarem); escritas são otimistas e devolvem um `Pendente`.

mod equipes;
mod estoque;
mod expedicao;
mod lancamentos;
mod medicoes;
mod obras;
mod orcamentos;
mod producao;

pub use equipes::EquipesView;
pub use estoque::{AlertaEstoque, EstoqueView};
pub use expedicao::ExpedicaoView;
pub use lancamentos::LancamentosView;
pub use medicoes::MedicoesView;
pub use obras::{ObraDetalhada, ObrasView};
pub use orcamentos::OrcamentosView;
pub use producao::ProducaoView;

use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use serde_json::Value;

use crate::{reducer::ErpState, store::ErpStore, transform::Patch};

/// Uma visão derivada do estado.
pub trait Visao: Send + Sync + Sized {
    fn derivar(estado: &ErpState) -> Self;

    /// Ainda vale para este estado? (compara os `Arc` das fatias usadas)
    fn vigente(&self, estado: &ErpState) -> bool;
}

pub(crate) struct Memo<V> {
    cache: Mutex<Option<Arc<V>>>,
}

impl<V> Default for Memo<V> {
    fn default() -> Self {
        Self { cache: Mutex::new(None) }
    }
}

impl<V: Visao> Memo<V> {
    pub(crate) fn obter(&self, estado: &ErpState) -> Arc<V> {
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(visao) = cache.as_ref().filter(|v| v.vigente(estado)) {
            return Arc::clone(visao);
        }
        let visao = Arc::new(V::derivar(estado));
        *cache = Some(Arc::clone(&visao));
        visao
    }
}

#[derive(Default)]
pub(crate) struct Memos {
    pub(crate) obras: Memo<ObrasView>,
    pub(crate) producao: Memo<ProducaoView>,
    pub(crate) estoque: Memo<EstoqueView>,
    pub(crate) orcamentos: Memo<OrcamentosView>,
    pub(crate) expedicao: Memo<ExpedicaoView>,
    pub(crate) medicoes: Memo<MedicoesView>,
    pub(crate) equipes: Memo<EquipesView>,
    pub(crate) lancamentos: Memo<LancamentosView>,
}

// Monta um patch a partir de pares (campo do runtime, valor)
pub(crate) fn patch_de<const N: usize>(pares: [(&str, Value); N]) -> Patch {
    pares.into_iter().map(|(k, v)| (k.to_owned(), v)).collect()
}

pub(crate) fn valor<T: Serialize>(valor: T) -> Value {
    serde_json::to_value(valor).unwrap_or(Value::Null)
}

impl ErpStore {
    /// O estado inteiro, sem memoização por domínio.
    pub fn use_erp(&self) -> Arc<ErpState> {
        self.estado()
    }
}
