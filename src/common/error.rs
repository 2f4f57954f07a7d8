// src/common/error.rs

use thiserror::Error;
use uuid::Uuid;

use crate::db::Tabela;

// Erro de fronteira: tudo que passa pelo Gateway, pela validação ou pela conversão de registros.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação: {0}")]
    ValidationError(#[from] validator::ValidationErrors),

    // A ação otimista foi recusada pelo reducer antes de qualquer chamada de rede
    #[error("Operação recusada: {0}")]
    Invariante(#[from] ViolacaoInvariante),

    #[error("Acesso não autorizado ao backend: {0}")]
    NaoAutorizado(String),

    #[error("Falha de comunicação com o backend: {0}")]
    Transporte(String),

    #[error("Registro {id} não encontrado em '{tabela}'")]
    RegistroNaoEncontrado { tabela: Tabela, id: Uuid },

    #[error("Registro inválido em '{tabela}': {motivo}")]
    RegistroInvalido { tabela: Tabela, motivo: String },

    // A entidade foi removida localmente antes da criação ser confirmada
    #[error("Criação de {id} em '{tabela}' cancelada pela remoção local")]
    OperacaoCancelada { tabela: Tabela, id: Uuid },

    #[error("Nenhum runtime tokio ativo para sincronizar com o backend")]
    SemRuntime,

    #[error("Identificador SQL inválido: '{0}'")]
    IdentificadorInvalido(String),

    #[error("Erro de banco de dados: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro de serialização: {0}")]
    Serializacao(#[from] serde_json::Error),

    // Variante genérica para erros de inicialização (configuração, pool)
    #[error("Erro interno: {0}")]
    InternalServerError(#[from] anyhow::Error),
}

impl AppError {
    /// Mensagem curta para o toast de notificação. O detalhe técnico vai para o log.
    pub fn mensagem_usuario(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "Um ou mais campos são inválidos.",
            AppError::Invariante(_) => "A operação não é permitida no estado atual.",
            AppError::NaoAutorizado(_) => "Sem permissão para gravar no servidor.",
            AppError::Transporte(_) | AppError::DatabaseError(_) => {
                "Não foi possível falar com o servidor. A alteração ficou apenas local."
            }
            AppError::RegistroNaoEncontrado { .. } => "O registro não existe mais no servidor.",
            AppError::OperacaoCancelada { .. } => "O registro foi removido antes de ser salvo.",
            e => {
                tracing::error!("Erro inesperado: {}", e);
                "Ocorreu um erro inesperado."
            }
        }
    }
}

/// Pré-condição de uma ação do reducer que não foi satisfeita.
///
/// É erro de programação quando vem de um `dispatch` direto; os hooks de escrita
/// verificam antes e devolvem `AppError::Invariante` ao chamador.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ViolacaoInvariante {
    #[error("'{tabela}' já contém o id {id}")]
    IdDuplicado { tabela: Tabela, id: Uuid },

    #[error("'{tabela}' não contém o id {id}")]
    EntidadeInexistente { tabela: Tabela, id: Uuid },

    #[error("o patch não pode alterar o id de '{tabela}'")]
    PatchAlteraId { tabela: Tabela },

    #[error("patch inválido para '{tabela}': {motivo}")]
    PatchInvalido { tabela: Tabela, motivo: String },

    #[error("o campo '{campo}' não pode ser negativo")]
    ValorNegativo { campo: &'static str },

    #[error("probabilidade {0} fora do intervalo 0..=100")]
    ProbabilidadeForaDoIntervalo(String),

    #[error("etapa de progresso '{etapa}' inválida ou fora de 0..=100")]
    ProgressoInvalido { etapa: String },

    #[error("a peça {peca} já está na expedição aberta {expedicao}")]
    PecaEmOutraExpedicao { peca: Uuid, expedicao: Uuid },

    #[error("orçamento {0} só pode ser aprovado pela ação de aprovação")]
    AprovacaoForaDoFluxo(Uuid),

    #[error("orçamento {0} já foi aprovado")]
    OrcamentoJaAprovado(Uuid),
}
