// src/hooks/medicoes.rs

use std::{collections::HashMap, sync::Arc};

use rust_decimal::Decimal;
use uuid::Uuid;
use validator::Validate;

use super::Visao;
use crate::{
    derived::percentual_contrato,
    models::{Medicao, NovaMedicao, Obra},
    reducer::ErpState,
    store::{falhou, ErpStore, Pendente},
    transform::Patch,
};

#[derive(Debug)]
pub struct MedicoesView {
    pub medicoes: Arc<Vec<Medicao>>,
    obras: Arc<Vec<Obra>>,
    /// Percentual do contrato da obra que cada medição representa.
    pub percentuais: HashMap<Uuid, Decimal>,
}

impl Visao for MedicoesView {
    fn derivar(estado: &ErpState) -> Self {
        let percentuais = estado
            .medicoes
            .iter()
            .map(|m| (m.id, percentual_contrato(m, &estado.obras)))
            .collect();
        Self {
            medicoes: Arc::clone(&estado.medicoes),
            obras: Arc::clone(&estado.obras),
            percentuais,
        }
    }

    fn vigente(&self, estado: &ErpState) -> bool {
        Arc::ptr_eq(&self.medicoes, &estado.medicoes) && Arc::ptr_eq(&self.obras, &estado.obras)
    }
}

impl MedicoesView {
    /// Soma medida da obra, em % do contrato.
    pub fn percentual_acumulado(&self, obra_id: Uuid) -> Decimal {
        self.medicoes
            .iter()
            .filter(|m| m.obra_id == obra_id)
            .filter_map(|m| self.percentuais.get(&m.id))
            .sum()
    }
}

impl ErpStore {
    pub fn use_medicoes(&self) -> Arc<MedicoesView> {
        self.memos.medicoes.obter(&self.estado())
    }

    pub fn add_medicao(&self, nova: NovaMedicao) -> Pendente<Medicao> {
        if let Err(e) = nova.validate() {
            return falhou(e.into());
        }
        self.criar(nova.into_medicao(Uuid::new_v4()))
    }

    pub fn update_medicao(&self, id: Uuid, patch: Patch) -> Pendente<Medicao> {
        self.atualizar::<Medicao>(id, patch)
    }

    pub fn remove_medicao(&self, id: Uuid) -> Pendente<()> {
        self.remover::<Medicao>(id)
    }
}
