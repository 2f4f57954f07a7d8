// src/hooks/expedicao.rs

use std::{collections::HashMap, sync::Arc};

use chrono::Local;
use rust_decimal::Decimal;
use uuid::Uuid;
use validator::Validate;

use super::{valor, Visao};
use crate::{
    common::error::ViolacaoInvariante,
    derived::peso_expedicao,
    models::{Entidade, Expedicao, NovaExpedicao, Peca, StatusExpedicao},
    reducer::ErpState,
    store::{falhou, ErpStore, Pendente},
    transform::Patch,
};

#[derive(Debug)]
pub struct ExpedicaoView {
    pub expedicoes: Arc<Vec<Expedicao>>,
    pecas: Arc<Vec<Peca>>,
    /// Peso de cada romaneio, somado das peças.
    pub pesos: HashMap<Uuid, Decimal>,
}

impl Visao for ExpedicaoView {
    fn derivar(estado: &ErpState) -> Self {
        let pesos = estado
            .expedicoes
            .iter()
            .map(|e| (e.id, peso_expedicao(e, &estado.pecas)))
            .collect();
        Self {
            expedicoes: Arc::clone(&estado.expedicoes),
            pecas: Arc::clone(&estado.pecas),
            pesos,
        }
    }

    fn vigente(&self, estado: &ErpState) -> bool {
        Arc::ptr_eq(&self.expedicoes, &estado.expedicoes) && Arc::ptr_eq(&self.pecas, &estado.pecas)
    }
}

impl ExpedicaoView {
    pub fn em_aberto(&self) -> impl Iterator<Item = &Expedicao> {
        self.expedicoes.iter().filter(|e| e.status.em_aberto())
    }
}

impl ErpStore {
    pub fn use_expedicao(&self) -> Arc<ExpedicaoView> {
        self.memos.expedicao.obter(&self.estado())
    }

    /// Recusada se alguma peça já estiver em outro romaneio aberto.
    pub fn add_expedicao(&self, nova: NovaExpedicao) -> Pendente<Expedicao> {
        if let Err(e) = nova.validate() {
            return falhou(e.into());
        }
        self.criar(nova.into_expedicao(Uuid::new_v4()))
    }

    /// Troca o status e carimba as datas de saída/entrega quando ainda vazias.
    pub fn atualizar_status_expedicao(&self, id: Uuid, status: StatusExpedicao) -> Pendente<Expedicao> {
        let estado = self.estado();
        let Some(expedicao) = estado.expedicoes.iter().find(|e| e.id == id) else {
            return falhou(
                ViolacaoInvariante::EntidadeInexistente {
                    tabela: Expedicao::TABELA,
                    id,
                }
                .into(),
            );
        };

        let hoje = Local::now().date_naive();
        let mut patch = Patch::new();
        if status == StatusExpedicao::EmTransito && expedicao.data_saida.is_none() {
            patch.insert("dataSaida".into(), valor(hoje));
        }
        if status == StatusExpedicao::Entregue && expedicao.data_entrega.is_none() {
            patch.insert("dataEntrega".into(), valor(hoje));
        }
        patch.insert("status".into(), valor(status));

        self.atualizar::<Expedicao>(id, patch)
    }

    pub fn remove_expedicao(&self, id: Uuid) -> Pendente<()> {
        self.remover::<Expedicao>(id)
    }
}
