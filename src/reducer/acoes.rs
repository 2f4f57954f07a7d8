// src/reducer/acoes.rs

use uuid::Uuid;

use crate::{
    models::{Equipe, Expedicao, ItemEstoque, Lancamento, Medicao, Notificacao, Obra, Orcamento, Peca},
    transform::Patch,
};

/// As operações possíveis sobre uma coleção de entidades.
#[derive(Debug, Clone, PartialEq)]
pub enum AcaoColecao<T> {
    /// Substitui a coleção inteira (carga do backend).
    Set(Vec<T>),
    Add(T),
    /// Merge patch (RFC 7396) com os nomes do runtime.
    Update { id: Uuid, patch: Patch },
    Remove(Uuid),
    /// Correção vinda do servidor depois de uma escrita otimista. Idempotente.
    /// Procura pelo id local e, se não achar, pelo id do próprio registro.
    Reconciliar { id_local: Uuid, registro: T },
    /// Correção parcial depois de um update: só os campos que a escrita tocou, com o
    /// valor devolvido pelo servidor. Cada campo é substituído inteiro (sem merge).
    ReconciliarCampos { id: Uuid, campos: Patch },
}

impl<T> AcaoColecao<T> {
    fn verbo(&self) -> &'static str {
        match self {
            AcaoColecao::Set(_) => "SET",
            AcaoColecao::Add(_) => "ADD",
            AcaoColecao::Update { .. } => "UPDATE",
            AcaoColecao::Remove(_) => "REMOVE",
            AcaoColecao::Reconciliar { .. } => "RECONCILIAR",
            AcaoColecao::ReconciliarCampos { .. } => "RECONCILIAR_CAMPOS",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Obras(AcaoColecao<Obra>),
    Pecas(AcaoColecao<Peca>),
    Estoque(AcaoColecao<ItemEstoque>),
    Orcamentos(AcaoColecao<Orcamento>),
    Expedicoes(AcaoColecao<Expedicao>),
    Medicoes(AcaoColecao<Medicao>),
    Lancamentos(AcaoColecao<Lancamento>),
    Equipes(AcaoColecao<Equipe>),

    /// Orçamento -> aprovado, vínculo com a obra e a obra nova, numa transição só.
    AprovarOrcamento { orcamento_id: Uuid, obra: Obra },

    SelecionarObra(Option<Uuid>),

    AddNotificacao(Notificacao),
    RemoveNotificacao(Uuid),
    LimparNotificacoes,

    /// Tipo que o reducer não conhece. Não altera nada.
    Desconhecida(String),
}

impl Action {
    /// Nome estável da ação, usado nos logs.
    pub fn tipo(&self) -> String {
        let colecao = |verbo: &str, nome: &str| format!("{verbo}_{nome}");
        match self {
            Action::Obras(a) => colecao(a.verbo(), "OBRAS"),
            Action::Pecas(a) => colecao(a.verbo(), "PECAS"),
            Action::Estoque(a) => colecao(a.verbo(), "ESTOQUE"),
            Action::Orcamentos(a) => colecao(a.verbo(), "ORCAMENTOS"),
            Action::Expedicoes(a) => colecao(a.verbo(), "EXPEDICOES"),
            Action::Medicoes(a) => colecao(a.verbo(), "MEDICOES"),
            Action::Lancamentos(a) => colecao(a.verbo(), "LANCAMENTOS"),
            Action::Equipes(a) => colecao(a.verbo(), "EQUIPES"),
            Action::AprovarOrcamento { .. } => "APROVAR_ORCAMENTO".into(),
            Action::SelecionarObra(_) => "SET_OBRA_ATUAL".into(),
            Action::AddNotificacao(_) => "ADD_NOTIFICACAO".into(),
            Action::RemoveNotificacao(_) => "REMOVE_NOTIFICACAO".into(),
            Action::LimparNotificacoes => "LIMPAR_NOTIFICACOES".into(),
            Action::Desconhecida(tipo) => tipo.clone(),
        }
    }
}
