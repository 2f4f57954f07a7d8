// src/hooks/orcamentos.rs

use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use super::{patch_de, valor, Visao};
use crate::{
    common::error::{AppError, ViolacaoInvariante},
    derived::{resumo_pipeline, ResumoPipeline},
    models::{Entidade, NovoOrcamento, Obra, Orcamento, StatusOrcamento, TipoNotificacao},
    reducer::{Action, ErpState},
    store::{falhou, ErpStore, Pendente},
    transform::{self, Patch},
};

#[derive(Debug)]
pub struct OrcamentosView {
    pub orcamentos: Arc<Vec<Orcamento>>,
    pub pipeline: ResumoPipeline,
}

impl Visao for OrcamentosView {
    fn derivar(estado: &ErpState) -> Self {
        Self {
            orcamentos: Arc::clone(&estado.orcamentos),
            pipeline: resumo_pipeline(&estado.orcamentos),
        }
    }

    fn vigente(&self, estado: &ErpState) -> bool {
        Arc::ptr_eq(&self.orcamentos, &estado.orcamentos)
    }
}

impl ErpStore {
    pub fn use_orcamentos(&self) -> Arc<OrcamentosView> {
        self.memos.orcamentos.obter(&self.estado())
    }

    pub fn add_orcamento(&self, novo: NovoOrcamento) -> Pendente<Orcamento> {
        if let Err(e) = novo.validate() {
            return falhou(e.into());
        }
        self.criar(novo.into_orcamento(Uuid::new_v4()))
    }

    /// Não aprova: mudar o status para `aprovado` só por `aprovar_orcamento`.
    pub fn update_orcamento(&self, id: Uuid, patch: Patch) -> Pendente<Orcamento> {
        self.atualizar::<Orcamento>(id, patch)
    }

    pub fn remove_orcamento(&self, id: Uuid) -> Pendente<()> {
        self.remover::<Orcamento>(id)
    }

    // --- APROVAÇÃO ---
    /// Aprova o orçamento e cria a obra dele numa única transição local.
    /// No backend: cria a obra, depois atualiza o orçamento com o id que o servidor devolveu.
    pub fn aprovar_orcamento(&self, id: Uuid) -> Pendente<Obra> {
        let runtime = match self.runtime() {
            Ok(runtime) => runtime,
            Err(e) => return falhou(e),
        };
        let estado = self.estado();
        let Some(orcamento) = estado.orcamento(id) else {
            return falhou(
                ViolacaoInvariante::EntidadeInexistente {
                    tabela: Orcamento::TABELA,
                    id,
                }
                .into(),
            );
        };

        let obra = Obra::a_partir_do_orcamento(orcamento, Uuid::new_v4());
        let acao = Action::AprovarOrcamento {
            orcamento_id: id,
            obra: obra.clone(),
        };
        if let Err(violacao) = self.aplicar(&acao) {
            return falhou(violacao.into());
        }

        let store = self.clone();
        Self::disparar(&runtime, async move {
            let payload = transform::to_persistence(Obra::TABELA, &transform::serializar_entidade(&obra)?);
            let resposta = store.gateway().create(Obra::TABELA, payload).await;
            let criada: Obra = store.confirmar(obra.id, resposta, "aprovar orçamento")?;

            let vinculo = patch_de([
                ("status", valor(StatusOrcamento::Aprovado)),
                ("obraId", valor(criada.id)),
            ]);
            let resposta = store
                .gateway()
                .update(Orcamento::TABELA, id, transform::to_persistence(Orcamento::TABELA, &vinculo))
                .await;
            store.confirmar_campos::<Orcamento>(id, &vinculo, resposta, "aprovar orçamento")?;

            store.notificar(
                TipoNotificacao::Sucesso,
                "Orçamento aprovado",
                format!("Obra {} criada", criada.codigo),
            );
            Ok::<_, AppError>(criada)
        })
    }
}
