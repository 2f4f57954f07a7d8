// src/transform/status_map.rs

use crate::models::{
    EtapaProducao, StatusExpedicao, StatusLancamento, StatusMedicao, StatusMontagem, StatusObra,
    StatusOrcamento, TipoLancamento,
};

/// A qual enum de status um campo pertence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DominioStatus {
    Obra,
    Etapa,
    Montagem,
    Orcamento,
    Expedicao,
    Medicao,
    Lancamento,
    TipoLancamento,
}

impl DominioStatus {
    pub const TODOS: [DominioStatus; 8] = [
        DominioStatus::Obra,
        DominioStatus::Etapa,
        DominioStatus::Montagem,
        DominioStatus::Orcamento,
        DominioStatus::Expedicao,
        DominioStatus::Medicao,
        DominioStatus::Lancamento,
        DominioStatus::TipoLancamento,
    ];

    pub fn canonicos(self) -> &'static [&'static str] {
        match self {
            DominioStatus::Obra => StatusObra::CANONICOS,
            DominioStatus::Etapa => EtapaProducao::CANONICOS,
            DominioStatus::Montagem => StatusMontagem::CANONICOS,
            DominioStatus::Orcamento => StatusOrcamento::CANONICOS,
            DominioStatus::Expedicao => StatusExpedicao::CANONICOS,
            DominioStatus::Medicao => StatusMedicao::CANONICOS,
            DominioStatus::Lancamento => StatusLancamento::CANONICOS,
            DominioStatus::TipoLancamento => TipoLancamento::CANONICOS,
        }
    }
}

/// Grafias antigas/alternativas gravadas no backend -> grafia canônica do runtime.
///
/// O banco acumulou valores de versões anteriores do sistema (e de importações de planilha).
/// Tudo que não estiver aqui passa sem alteração.
pub static STATUS_MAP: &[(DominioStatus, &str, &str)] = &[
    // Obras
    (DominioStatus::Obra, "orcado", "orcamento"),
    (DominioStatus::Obra, "aprovada", "aprovado"),
    (DominioStatus::Obra, "projeto", "em_projeto"),
    (DominioStatus::Obra, "em_desenvolvimento", "em_projeto"),
    (DominioStatus::Obra, "aguardando", "aguardando_material"),
    (DominioStatus::Obra, "ativo", "em_producao"),
    (DominioStatus::Obra, "ativa", "em_producao"),
    (DominioStatus::Obra, "producao", "em_producao"),
    (DominioStatus::Obra, "em_fabricacao", "em_producao"),
    (DominioStatus::Obra, "expedicao", "em_expedicao"),
    (DominioStatus::Obra, "montagem", "em_montagem"),
    (DominioStatus::Obra, "finalizado", "concluido"),
    (DominioStatus::Obra, "finalizada", "concluido"),
    (DominioStatus::Obra, "concluida", "concluido"),
    (DominioStatus::Obra, "cancelada", "cancelado"),
    // Etapas de produção (Kanban)
    (DominioStatus::Etapa, "pendente", "aguardando"),
    (DominioStatus::Etapa, "fila", "aguardando"),
    (DominioStatus::Etapa, "em_corte", "corte"),
    (DominioStatus::Etapa, "cortando", "corte"),
    (DominioStatus::Etapa, "em_fabricacao", "fabricacao"),
    (DominioStatus::Etapa, "fabricando", "fabricacao"),
    (DominioStatus::Etapa, "soldagem", "solda"),
    (DominioStatus::Etapa, "em_solda", "solda"),
    (DominioStatus::Etapa, "em_pintura", "pintura"),
    (DominioStatus::Etapa, "expedido", "expedicao"),
    (DominioStatus::Etapa, "em_montagem", "montagem"),
    (DominioStatus::Etapa, "montado", "montagem"),
    (DominioStatus::Etapa, "finalizado", "concluido"),
    (DominioStatus::Etapa, "pronto", "concluido"),
    // Montagem em campo
    (DominioStatus::Montagem, "nao_iniciado", "pendente"),
    (DominioStatus::Montagem, "em_andamento", "em_montagem"),
    (DominioStatus::Montagem, "montada", "montado"),
    (DominioStatus::Montagem, "concluido", "montado"),
    // Funil comercial
    (DominioStatus::Orcamento, "novo", "rascunho"),
    (DominioStatus::Orcamento, "enviada", "enviado"),
    (DominioStatus::Orcamento, "em_analise", "em_negociacao"),
    (DominioStatus::Orcamento, "negociacao", "em_negociacao"),
    (DominioStatus::Orcamento, "aprovada", "aprovado"),
    (DominioStatus::Orcamento, "ganho", "aprovado"),
    (DominioStatus::Orcamento, "perdido", "recusado"),
    (DominioStatus::Orcamento, "reprovado", "recusado"),
    (DominioStatus::Orcamento, "vencido", "expirado"),
    // Expedição
    (DominioStatus::Expedicao, "pendente", "aguardando"),
    (DominioStatus::Expedicao, "carregamento", "carregando"),
    (DominioStatus::Expedicao, "transito", "em_transito"),
    (DominioStatus::Expedicao, "em_rota", "em_transito"),
    (DominioStatus::Expedicao, "concluida", "entregue"),
    (DominioStatus::Expedicao, "ocorrencia", "problema"),
    // Medições
    (DominioStatus::Medicao, "aberta", "pendente"),
    (DominioStatus::Medicao, "aprovado", "aprovada"),
    (DominioStatus::Medicao, "faturado", "faturada"),
    (DominioStatus::Medicao, "pago", "paga"),
    (DominioStatus::Medicao, "recebida", "paga"),
    // Lançamentos
    (DominioStatus::Lancamento, "quitado", "pago"),
    (DominioStatus::Lancamento, "recebido", "pago"),
    (DominioStatus::Lancamento, "aberto", "pendente"),
    (DominioStatus::Lancamento, "a_vencer", "pendente"),
    (DominioStatus::Lancamento, "vencido", "atrasado"),
    (DominioStatus::TipoLancamento, "entrada", "receita"),
    (DominioStatus::TipoLancamento, "credito", "receita"),
    (DominioStatus::TipoLancamento, "saida", "despesa"),
    (DominioStatus::TipoLancamento, "debito", "despesa"),
];

/// Normaliza um status vindo do backend.
///
/// Ordem: grafia canônica exata; canônica após `trim` + minúsculas; alias da tabela;
/// senão devolve o valor original intacto.
pub fn normalizar<'a>(dominio: DominioStatus, valor: &'a str) -> &'a str {
    let canonicos = dominio.canonicos();
    if canonicos.iter().any(|c| *c == valor) {
        return valor;
    }

    let chave = valor.trim().to_lowercase();
    if let Some(canonico) = canonicos.iter().find(|c| **c == chave) {
        return *canonico;
    }

    STATUS_MAP
        .iter()
        .find(|(d, alias, _)| *d == dominio && *alias == chave)
        .map(|(_, _, canonico)| *canonico)
        .unwrap_or(valor)
}
