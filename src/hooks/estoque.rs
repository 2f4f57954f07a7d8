// src/hooks/estoque.rs

use std::{collections::HashMap, sync::Arc};

use rust_decimal::Decimal;
use serde_json::Value;
use uuid::Uuid;
use validator::Validate;

use super::{patch_de, valor, Visao};
use crate::{
    common::error::{AppError, ViolacaoInvariante},
    db::Tabela,
    derived::{calcular_situacao_estoque, NivelEstoque, SituacaoEstoque},
    models::{Entidade, ItemEstoque, NovoItemEstoque},
    reducer::ErpState,
    store::{falhou, ErpStore, Pendente},
    transform::{self, Patch},
};

#[derive(Debug, Clone, PartialEq)]
pub struct AlertaEstoque {
    pub id: Uuid,
    pub material: String,
    pub situacao: SituacaoEstoque,
}

#[derive(Debug)]
pub struct EstoqueView {
    pub itens: Arc<Vec<ItemEstoque>>,
    pub situacoes: HashMap<Uuid, SituacaoEstoque>,
    /// Itens críticos ou baixos, os críticos primeiro.
    pub alertas: Vec<AlertaEstoque>,
}

impl Visao for EstoqueView {
    fn derivar(estado: &ErpState) -> Self {
        let situacoes: HashMap<Uuid, SituacaoEstoque> = estado
            .estoque
            .iter()
            .map(|item| (item.id, calcular_situacao_estoque(item)))
            .collect();

        let mut alertas: Vec<AlertaEstoque> = estado
            .estoque
            .iter()
            .filter_map(|item| {
                let situacao = situacoes.get(&item.id)?;
                (situacao.nivel <= NivelEstoque::Baixo).then(|| AlertaEstoque {
                    id: item.id,
                    material: item.material.clone(),
                    situacao: situacao.clone(),
                })
            })
            .collect();
        alertas.sort_by(|a, b| {
            a.situacao
                .nivel
                .cmp(&b.situacao.nivel)
                .then_with(|| a.situacao.percentual_minimo.cmp(&b.situacao.percentual_minimo))
        });

        Self {
            itens: Arc::clone(&estado.estoque),
            situacoes,
            alertas,
        }
    }

    fn vigente(&self, estado: &ErpState) -> bool {
        Arc::ptr_eq(&self.itens, &estado.estoque)
    }
}

impl ErpStore {
    pub fn use_estoque(&self) -> Arc<EstoqueView> {
        self.memos.estoque.obter(&self.estado())
    }

    pub fn add_item_estoque(&self, novo: NovoItemEstoque) -> Pendente<ItemEstoque> {
        if let Err(e) = novo.validate() {
            return falhou(e.into());
        }
        self.criar(novo.into_item(Uuid::new_v4()))
    }

    pub fn update_item_estoque(&self, id: Uuid, patch: Patch) -> Pendente<ItemEstoque> {
        self.atualizar::<ItemEstoque>(id, patch)
    }

    pub fn remove_item_estoque(&self, id: Uuid) -> Pendente<()> {
        self.remover::<ItemEstoque>(id)
    }

    // --- AJUSTE DE SALDO ---
    /// Soma `delta` (negativo para saída) ao saldo e registra a movimentação em `mov_estoque`.
    /// Saldo que ficaria negativo é recusado antes de qualquer chamada de rede.
    pub fn ajustar_estoque(
        &self,
        id: Uuid,
        delta: Decimal,
        observacao: Option<String>,
    ) -> Pendente<ItemEstoque> {
        let runtime = match self.runtime() {
            Ok(runtime) => runtime,
            Err(e) => return falhou(e),
        };
        let estado = self.estado();
        let Some(item) = estado.item_estoque(id) else {
            return falhou(
                ViolacaoInvariante::EntidadeInexistente {
                    tabela: ItemEstoque::TABELA,
                    id,
                }
                .into(),
            );
        };

        let nova_quantidade = item.quantidade + delta;
        if nova_quantidade < Decimal::ZERO {
            return falhou(ViolacaoInvariante::ValorNegativo { campo: "quantidade" }.into());
        }

        let movimento = patch_de([
            ("itemId", valor(id)),
            ("tipo", Value::from(if delta < Decimal::ZERO { "saida" } else { "entrada" })),
            ("quantidade", valor(delta.abs())),
            ("obraId", valor(estado.obra_atual)),
            ("observacao", valor(observacao)),
        ]);

        let atualizacao = self.atualizar::<ItemEstoque>(id, patch_de([("quantidade", valor(nova_quantidade))]));

        let store = self.clone();
        Self::disparar(&runtime, async move {
            let item = atualizacao.await?;

            let payload = transform::to_persistence(Tabela::MovEstoque, &movimento);
            store
                .gateway()
                .create(Tabela::MovEstoque, payload)
                .await
                .map_err(|e| store.registrar_falha(Tabela::MovEstoque, "registrar movimentação", e))?;

            Ok::<_, AppError>(item)
        })
    }
}
