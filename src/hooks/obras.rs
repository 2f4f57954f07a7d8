// src/hooks/obras.rs

use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use super::Visao;
use crate::{
    common::error::AppError,
    derived::{calcular_progresso_obra, ProgressoObra},
    models::{NovaObra, Obra},
    reducer::{Action, ErpState},
    store::{falhou, ErpStore, Pendente},
    transform::Patch,
};

#[derive(Debug, Clone, PartialEq)]
pub struct ObraDetalhada {
    pub obra: Obra,
    pub progresso: ProgressoObra,
}

#[derive(Debug)]
pub struct ObrasView {
    pub obras: Arc<Vec<Obra>>,
    pub obra_atual: Option<Uuid>,
    /// A obra selecionada já com o progresso calculado.
    pub obra_atual_data: Option<ObraDetalhada>,
}

impl Visao for ObrasView {
    fn derivar(estado: &ErpState) -> Self {
        let obra_atual_data = estado.obra_atual().map(|obra| ObraDetalhada {
            obra: obra.clone(),
            progresso: calcular_progresso_obra(obra),
        });
        Self {
            obras: Arc::clone(&estado.obras),
            obra_atual: estado.obra_atual,
            obra_atual_data,
        }
    }

    fn vigente(&self, estado: &ErpState) -> bool {
        Arc::ptr_eq(&self.obras, &estado.obras) && self.obra_atual == estado.obra_atual
    }
}

impl ObrasView {
    pub fn progresso(&self, id: Uuid) -> Option<ProgressoObra> {
        self.obras
            .iter()
            .find(|o| o.id == id)
            .map(calcular_progresso_obra)
    }
}

impl ErpStore {
    pub fn use_obras(&self) -> Arc<ObrasView> {
        self.memos.obras.obter(&self.estado())
    }

    // --- CRIAR OBRA ---
    pub fn add_obra(&self, nova: NovaObra) -> Pendente<Obra> {
        if let Err(e) = nova.validate() {
            return falhou(e.into());
        }
        self.criar(nova.into_obra(Uuid::new_v4()))
    }

    pub fn update_obra(&self, id: Uuid, patch: Patch) -> Pendente<Obra> {
        self.atualizar::<Obra>(id, patch)
    }

    /// Remove a obra e, localmente, as peças dela.
    pub fn remove_obra(&self, id: Uuid) -> Pendente<()> {
        self.remover::<Obra>(id)
    }

    /// Seleção é só local, não vai para o backend.
    pub fn selecionar_obra(&self, id: Option<Uuid>) -> Result<(), AppError> {
        self.aplicar(&Action::SelecionarObra(id))?;
        Ok(())
    }
}
