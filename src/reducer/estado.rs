// src/reducer/estado.rs

use std::sync::Arc;

use uuid::Uuid;

use crate::models::{
    Equipe, Expedicao, ItemEstoque, Lancamento, Medicao, Notificacao, Obra, Orcamento, Peca,
};

/// O estado canônico. Cada coleção fica atrás de um `Arc` próprio: uma transição que não
/// toca a coleção devolve o mesmo ponteiro, e é isso que os hooks de leitura comparam.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ErpState {
    pub obras: Arc<Vec<Obra>>,
    pub pecas: Arc<Vec<Peca>>,
    pub estoque: Arc<Vec<ItemEstoque>>,
    pub orcamentos: Arc<Vec<Orcamento>>,
    pub expedicoes: Arc<Vec<Expedicao>>,
    pub medicoes: Arc<Vec<Medicao>>,
    pub lancamentos: Arc<Vec<Lancamento>>,
    pub equipes: Arc<Vec<Equipe>>,
    pub notificacoes: Arc<Vec<Notificacao>>,
    pub obra_atual: Option<Uuid>,
}

impl ErpState {
    pub fn obra(&self, id: Uuid) -> Option<&Obra> {
        self.obras.iter().find(|o| o.id == id)
    }

    pub fn obra_atual(&self) -> Option<&Obra> {
        self.obra_atual.and_then(|id| self.obra(id))
    }

    pub fn peca(&self, id: Uuid) -> Option<&Peca> {
        self.pecas.iter().find(|p| p.id == id)
    }

    pub fn orcamento(&self, id: Uuid) -> Option<&Orcamento> {
        self.orcamentos.iter().find(|o| o.id == id)
    }

    pub fn item_estoque(&self, id: Uuid) -> Option<&ItemEstoque> {
        self.estoque.iter().find(|i| i.id == id)
    }
}
