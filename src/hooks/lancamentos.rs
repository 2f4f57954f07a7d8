// src/hooks/lancamentos.rs

use std::{collections::BTreeMap, sync::Arc};

use uuid::Uuid;
use validator::Validate;

use super::Visao;
use crate::{
    derived::{calcular_resumo_financeiro, resumo_por_status, ResumoFinanceiro, TotalPorStatus},
    models::{Lancamento, NovoLancamento, StatusLancamento},
    reducer::ErpState,
    store::{falhou, ErpStore, Pendente},
    transform::Patch,
};

#[derive(Debug)]
pub struct LancamentosView {
    pub lancamentos: Arc<Vec<Lancamento>>,
    pub resumo: ResumoFinanceiro,
    pub por_status: BTreeMap<StatusLancamento, TotalPorStatus>,
}

impl Visao for LancamentosView {
    fn derivar(estado: &ErpState) -> Self {
        Self {
            lancamentos: Arc::clone(&estado.lancamentos),
            resumo: calcular_resumo_financeiro(&estado.lancamentos),
            por_status: resumo_por_status(&estado.lancamentos),
        }
    }

    fn vigente(&self, estado: &ErpState) -> bool {
        Arc::ptr_eq(&self.lancamentos, &estado.lancamentos)
    }
}

impl LancamentosView {
    pub fn da_obra(&self, obra_id: Uuid) -> ResumoFinanceiro {
        let lancamentos: Vec<Lancamento> = self
            .lancamentos
            .iter()
            .filter(|l| l.obra_id == Some(obra_id))
            .cloned()
            .collect();
        calcular_resumo_financeiro(&lancamentos)
    }
}

impl ErpStore {
    pub fn use_lancamentos(&self) -> Arc<LancamentosView> {
        self.memos.lancamentos.obter(&self.estado())
    }

    pub fn add_lancamento(&self, novo: NovoLancamento) -> Pendente<Lancamento> {
        if let Err(e) = novo.validate() {
            return falhou(e.into());
        }
        self.criar(novo.into_lancamento(Uuid::new_v4()))
    }

    pub fn update_lancamento(&self, id: Uuid, patch: Patch) -> Pendente<Lancamento> {
        self.atualizar::<Lancamento>(id, patch)
    }

    pub fn remove_lancamento(&self, id: Uuid) -> Pendente<()> {
        self.remover::<Lancamento>(id)
    }
}
