// src/hooks/producao.rs

use std::{collections::BTreeMap, sync::Arc};

use uuid::Uuid;
use validator::Validate;

use super::{patch_de, valor, Visao};
use crate::{
    derived::{contar_kanban, ColunaKanban},
    models::{EtapaProducao, NovaPeca, Peca},
    reducer::ErpState,
    store::{falhou, ErpStore, Pendente},
    transform::Patch,
};

#[derive(Debug)]
pub struct ProducaoView {
    pub pecas: Arc<Vec<Peca>>,
    pub kanban: BTreeMap<EtapaProducao, ColunaKanban>,
}

impl Visao for ProducaoView {
    fn derivar(estado: &ErpState) -> Self {
        Self {
            pecas: Arc::clone(&estado.pecas),
            kanban: contar_kanban(&estado.pecas),
        }
    }

    fn vigente(&self, estado: &ErpState) -> bool {
        Arc::ptr_eq(&self.pecas, &estado.pecas)
    }
}

impl ProducaoView {
    pub fn pecas_da_obra(&self, obra_id: Uuid) -> Vec<&Peca> {
        self.pecas.iter().filter(|p| p.obra_id == obra_id).collect()
    }
}

impl ErpStore {
    pub fn use_producao(&self) -> Arc<ProducaoView> {
        self.memos.producao.obter(&self.estado())
    }

    /// A obra precisa existir no estado; senão a peça é recusada sem chamada de rede.
    pub fn add_peca(&self, nova: NovaPeca) -> Pendente<Peca> {
        if let Err(e) = nova.validate() {
            return falhou(e.into());
        }
        self.criar(nova.into_peca(Uuid::new_v4()))
    }

    // Arrastar o card no Kanban
    pub fn mover_peca_etapa(&self, id: Uuid, etapa: EtapaProducao) -> Pendente<Peca> {
        self.atualizar::<Peca>(id, patch_de([("etapa", valor(etapa))]))
    }

    pub fn update_peca(&self, id: Uuid, patch: Patch) -> Pendente<Peca> {
        self.atualizar::<Peca>(id, patch)
    }

    pub fn remove_peca(&self, id: Uuid) -> Pendente<()> {
        self.remover::<Peca>(id)
    }
}
