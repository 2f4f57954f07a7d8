// src/hooks/equipes.rs

use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use super::Visao;
use crate::{
    models::{Equipe, NovaEquipe},
    reducer::ErpState,
    store::{falhou, ErpStore, Pendente},
    transform::Patch,
};

#[derive(Debug)]
pub struct EquipesView {
    pub equipes: Arc<Vec<Equipe>>,
    pub ativas: usize,
}

impl Visao for EquipesView {
    fn derivar(estado: &ErpState) -> Self {
        Self {
            equipes: Arc::clone(&estado.equipes),
            ativas: estado.equipes.iter().filter(|e| e.ativa).count(),
        }
    }

    fn vigente(&self, estado: &ErpState) -> bool {
        Arc::ptr_eq(&self.equipes, &estado.equipes)
    }
}

impl ErpStore {
    pub fn use_equipes(&self) -> Arc<EquipesView> {
        self.memos.equipes.obter(&self.estado())
    }

    pub fn add_equipe(&self, nova: NovaEquipe) -> Pendente<Equipe> {
        if let Err(e) = nova.validate() {
            return falhou(e.into());
        }
        self.criar(nova.into_equipe(Uuid::new_v4()))
    }

    pub fn update_equipe(&self, id: Uuid, patch: Patch) -> Pendente<Equipe> {
        self.atualizar::<Equipe>(id, patch)
    }

    pub fn remove_equipe(&self, id: Uuid) -> Pendente<()> {
        self.remover::<Equipe>(id)
    }
}
