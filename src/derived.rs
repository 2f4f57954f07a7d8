// src/derived.rs

//! Valores derivados. Funções puras, calculadas na leitura e nunca gravadas no estado.

use std::collections::BTreeMap;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use crate::models::{
    EtapaProducao, Expedicao, ItemEstoque, Lancamento, Medicao, Obra, Orcamento, Peca,
    StatusLancamento, StatusOrcamento, TipoLancamento, ETAPAS_OBRA,
};

fn arredondar(valor: Decimal) -> Decimal {
    valor.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

// Multiplicação e divisão saturam no limite do `Decimal` em vez de entrar em pânico
pub(crate) fn vezes(a: Decimal, b: Decimal) -> Decimal {
    a.saturating_mul(b)
}

pub(crate) fn dividido(a: Decimal, b: Decimal) -> Decimal {
    if b.is_zero() {
        return Decimal::ZERO;
    }
    a.checked_div(b).unwrap_or(if a.is_sign_negative() == b.is_sign_negative() {
        Decimal::MAX
    } else {
        Decimal::MIN
    })
}

fn somar<I: IntoIterator<Item = Decimal>>(valores: I) -> Decimal {
    valores.into_iter().fold(Decimal::ZERO, Decimal::saturating_add)
}

fn percentual(parte: Decimal, todo: Decimal) -> Decimal {
    arredondar(vezes(dividido(parte, todo), Decimal::ONE_HUNDRED))
}

fn limitar_percentual(valor: Decimal) -> Decimal {
    valor.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED)
}

// ---
// Obras
// ---

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressoObra {
    pub total: Decimal,
    pub etapas: BTreeMap<String, Decimal>,
}

/// Média das seis etapas fixas. Etapa ausente conta 0; cada valor é limitado a 0..=100.
pub fn calcular_progresso_obra(obra: &Obra) -> ProgressoObra {
    let soma = somar(ETAPAS_OBRA.iter().map(|etapa| {
        obra.progresso
            .get(*etapa)
            .copied()
            .map(limitar_percentual)
            .unwrap_or(Decimal::ZERO)
    }));

    ProgressoObra {
        total: arredondar(dividido(soma, Decimal::from(ETAPAS_OBRA.len()))),
        etapas: obra.progresso.clone(),
    }
}

// ---
// Estoque
// ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NivelEstoque {
    Critico,
    Baixo,
    Normal,
    Alto,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SituacaoEstoque {
    pub nivel: NivelEstoque,
    // Quantidade em relação ao mínimo, em %
    pub percentual_minimo: Decimal,
}

pub fn calcular_situacao_estoque(item: &ItemEstoque) -> SituacaoEstoque {
    let quantidade = item.quantidade;
    let minimo = item.minimo;

    let nivel = if quantidade < minimo {
        NivelEstoque::Critico
    } else if quantidade < vezes(minimo, Decimal::new(12, 1)) {
        NivelEstoque::Baixo
    } else if quantidade > vezes(minimo, Decimal::TWO) {
        NivelEstoque::Alto
    } else {
        NivelEstoque::Normal
    };

    let divisor = if minimo.is_zero() { Decimal::ONE } else { minimo };

    SituacaoEstoque {
        nivel,
        percentual_minimo: percentual(quantidade, divisor),
    }
}

// ---
// Financeiro
// ---

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumoFinanceiro {
    pub receitas: Decimal,
    pub despesas: Decimal,
    pub saldo: Decimal,
    pub margem_percentual: Decimal,
}

pub fn calcular_resumo_financeiro(lancamentos: &[Lancamento]) -> ResumoFinanceiro {
    let (receitas, despesas) = lancamentos.iter().fold(
        (Decimal::ZERO, Decimal::ZERO),
        |(receitas, despesas), l| match l.tipo {
            TipoLancamento::Receita => (receitas.saturating_add(l.valor), despesas),
            TipoLancamento::Despesa => (receitas, despesas.saturating_add(l.valor)),
            // Tipo desconhecido não entra em nenhum dos lados
            TipoLancamento::Outro(_) => (receitas, despesas),
        },
    );

    let saldo = receitas.saturating_sub(despesas);
    let margem_percentual = if receitas.is_zero() {
        Decimal::ZERO
    } else {
        percentual(saldo, receitas)
    };

    ResumoFinanceiro {
        receitas,
        despesas,
        saldo,
        margem_percentual,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalPorStatus {
    pub quantidade: usize,
    pub valor: Decimal,
}

pub fn resumo_por_status(lancamentos: &[Lancamento]) -> BTreeMap<StatusLancamento, TotalPorStatus> {
    let mut resumo: BTreeMap<StatusLancamento, TotalPorStatus> = BTreeMap::new();
    for lancamento in lancamentos {
        let total = resumo.entry(lancamento.status.clone()).or_default();
        total.quantidade += 1;
        total.valor = total.valor.saturating_add(lancamento.valor);
    }
    resumo
}

// ---
// Produção
// ---

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColunaKanban {
    pub pecas: usize,
    pub quantidade: u64,
    pub peso: Decimal,
}

/// Contagem por coluna do Kanban. Colunas canônicas aparecem sempre, mesmo vazias.
pub fn contar_kanban(pecas: &[Peca]) -> BTreeMap<EtapaProducao, ColunaKanban> {
    let mut colunas: BTreeMap<EtapaProducao, ColunaKanban> = EtapaProducao::CANONICOS
        .iter()
        .map(|etapa| (EtapaProducao::from(*etapa), ColunaKanban::default()))
        .collect();

    for peca in pecas {
        let coluna = colunas.entry(peca.etapa.clone()).or_default();
        coluna.pecas += 1;
        coluna.quantidade = coluna.quantidade.saturating_add(u64::from(peca.quantidade));
        coluna.peso = coluna.peso.saturating_add(peca.peso_total());
    }
    colunas
}

// ---
// Expedição e medições
// ---

/// Peso do romaneio a partir das peças referenciadas. Id sem peça conhecida conta 0.
pub fn peso_expedicao(expedicao: &Expedicao, pecas: &[Peca]) -> Decimal {
    somar(
        expedicao
            .pecas
            .iter()
            .filter_map(|id| pecas.iter().find(|p| p.id == *id))
            .map(Peca::peso_total),
    )
}

/// Quanto a medição representa do contrato da obra, em %.
pub fn percentual_contrato(medicao: &Medicao, obras: &[Obra]) -> Decimal {
    match obras.iter().find(|o| o.id == medicao.obra_id) {
        Some(obra) if !obra.valor_contrato.is_zero() => {
            percentual(medicao.valor, obra.valor_contrato)
        }
        _ => Decimal::ZERO,
    }
}

// ---
// Comercial
// ---

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumoPipeline {
    pub quantidade: usize,
    pub valor_total: Decimal,
    // Soma de valor × probabilidade
    pub valor_ponderado: Decimal,
    pub por_status: BTreeMap<StatusOrcamento, TotalPorStatus>,
}

pub fn resumo_pipeline(orcamentos: &[Orcamento]) -> ResumoPipeline {
    let mut resumo = ResumoPipeline::default();

    for orcamento in orcamentos {
        resumo.quantidade += 1;
        resumo.valor_total = resumo.valor_total.saturating_add(orcamento.valor_total);
        let ponderado = dividido(
            vezes(orcamento.valor_total, limitar_percentual(orcamento.probabilidade)),
            Decimal::ONE_HUNDRED,
        );
        resumo.valor_ponderado = resumo.valor_ponderado.saturating_add(ponderado);

        let total = resumo.por_status.entry(orcamento.status.clone()).or_default();
        total.quantidade += 1;
        total.valor = total.valor.saturating_add(orcamento.valor_total);
    }

    resumo.valor_ponderado = arredondar(resumo.valor_ponderado);
    resumo
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::str::FromStr;
    use uuid::Uuid;

    fn dec(texto: &str) -> Decimal {
        Decimal::from_str(texto).unwrap()
    }

    fn obra_com_progresso(etapas: &[(&str, i64)]) -> Obra {
        Obra {
            progresso: etapas
                .iter()
                .map(|(etapa, valor)| (etapa.to_string(), Decimal::from(*valor)))
                .collect(),
            ..Obra::default()
        }
    }

    fn item(quantidade: i64, minimo: i64) -> ItemEstoque {
        ItemEstoque {
            quantidade: Decimal::from(quantidade),
            minimo: Decimal::from(minimo),
            ..ItemEstoque::default()
        }
    }

    #[test]
    fn progresso_de_referencia() {
        let obra = obra_com_progresso(&[("corte", 100), ("fabricacao", 80), ("solda", 60), ("pintura", 40)]);
        let progresso = calcular_progresso_obra(&obra);
        assert_eq!(progresso.total, dec("46.67"));
        assert_eq!(progresso.etapas, obra.progresso);
    }

    #[test]
    fn progresso_ignora_chaves_extras_e_limita_valores() {
        let obra = obra_com_progresso(&[("corte", 250), ("projeto", 100), ("montagem", -10)]);
        assert_eq!(calcular_progresso_obra(&obra).total, dec("16.67"));
        assert_eq!(calcular_progresso_obra(&Obra::default()).total, Decimal::ZERO);
    }

    #[test]
    fn niveis_de_estoque_de_referencia() {
        assert_eq!(calcular_situacao_estoque(&item(8, 10)).nivel, NivelEstoque::Critico);
        assert_eq!(calcular_situacao_estoque(&item(11, 10)).nivel, NivelEstoque::Baixo);
        assert_eq!(calcular_situacao_estoque(&item(25, 10)).nivel, NivelEstoque::Alto);
        assert_eq!(calcular_situacao_estoque(&item(15, 10)).nivel, NivelEstoque::Normal);
        assert_eq!(calcular_situacao_estoque(&item(8, 10)).percentual_minimo, dec("80"));
    }

    #[test]
    fn minimo_zero_nao_divide_por_zero() {
        let situacao = calcular_situacao_estoque(&item(3, 0));
        assert_eq!(situacao.nivel, NivelEstoque::Alto);
        assert_eq!(situacao.percentual_minimo, dec("300"));
        assert_eq!(calcular_situacao_estoque(&item(0, 0)).nivel, NivelEstoque::Normal);
    }

    #[test]
    fn resumo_financeiro() {
        let lancamento = |tipo, valor: i64, status| Lancamento {
            tipo,
            valor: Decimal::from(valor),
            status,
            ..Lancamento::default()
        };
        let lancamentos = vec![
            lancamento(TipoLancamento::Receita, 1000, StatusLancamento::Pago),
            lancamento(TipoLancamento::Despesa, 300, StatusLancamento::Pendente),
            lancamento(TipoLancamento::Despesa, 100, StatusLancamento::Pendente),
        ];
        let resumo = calcular_resumo_financeiro(&lancamentos);
        assert_eq!(resumo.receitas, dec("1000"));
        assert_eq!(resumo.despesas, dec("400"));
        assert_eq!(resumo.saldo, dec("600"));
        assert_eq!(resumo.margem_percentual, dec("60"));

        let por_status = resumo_por_status(&lancamentos);
        assert_eq!(por_status[&StatusLancamento::Pendente].quantidade, 2);
        assert_eq!(por_status[&StatusLancamento::Pendente].valor, dec("400"));

        assert_eq!(calcular_resumo_financeiro(&[]), ResumoFinanceiro::default());
    }

    #[test]
    fn kanban_e_peso_de_romaneio() {
        let obra_id = Uuid::new_v4();
        let peca = |etapa, peso: i64, quantidade| Peca {
            id: Uuid::new_v4(),
            obra_id,
            etapa,
            peso_unitario: Decimal::from(peso),
            quantidade,
            ..Peca::default()
        };
        let pecas = vec![
            peca(EtapaProducao::Corte, 10, 2),
            peca(EtapaProducao::Corte, 5, 1),
            peca(EtapaProducao::Solda, 100, 3),
        ];

        let kanban = contar_kanban(&pecas);
        assert_eq!(kanban.len(), EtapaProducao::CANONICOS.len());
        assert_eq!(kanban[&EtapaProducao::Corte].pecas, 2);
        assert_eq!(kanban[&EtapaProducao::Corte].quantidade, 3);
        assert_eq!(kanban[&EtapaProducao::Corte].peso, dec("25"));
        assert_eq!(kanban[&EtapaProducao::Pintura], ColunaKanban::default());

        let expedicao = Expedicao {
            pecas: vec![pecas[0].id, pecas[2].id, Uuid::new_v4()],
            ..Expedicao::default()
        };
        assert_eq!(peso_expedicao(&expedicao, &pecas), dec("320"));
    }

    #[test]
    fn percentual_do_contrato() {
        let obra = Obra {
            id: Uuid::new_v4(),
            valor_contrato: dec("300000"),
            ..Obra::default()
        };
        let medicao = Medicao {
            obra_id: obra.id,
            valor: dec("100000"),
            ..Medicao::default()
        };
        assert_eq!(percentual_contrato(&medicao, std::slice::from_ref(&obra)), dec("33.33"));
        assert_eq!(percentual_contrato(&medicao, &[]), Decimal::ZERO);
    }

    #[test]
    fn pipeline_pondera_pela_probabilidade() {
        let orcamento = |valor: i64, prob: i64, status| Orcamento {
            valor_total: Decimal::from(valor),
            probabilidade: Decimal::from(prob),
            status,
            ..Orcamento::default()
        };
        let resumo = resumo_pipeline(&[
            orcamento(100_000, 50, StatusOrcamento::Enviado),
            orcamento(40_000, 25, StatusOrcamento::EmNegociacao),
        ]);
        assert_eq!(resumo.quantidade, 2);
        assert_eq!(resumo.valor_total, dec("140000"));
        assert_eq!(resumo.valor_ponderado, dec("60000"));
        assert_eq!(resumo.por_status[&StatusOrcamento::Enviado].valor, dec("100000"));
    }

    #[test]
    fn valores_extremos_saturam_sem_panico() {
        let enorme = Decimal::MAX / Decimal::TWO;
        let situacao = calcular_situacao_estoque(&ItemEstoque {
            quantidade: enorme,
            minimo: enorme,
            ..ItemEstoque::default()
        });
        assert_eq!(situacao.nivel, NivelEstoque::Baixo);

        let obra = Obra {
            id: Uuid::new_v4(),
            valor_contrato: dec("0.0000000000000000000000000001"),
            ..Obra::default()
        };
        let medicao = Medicao {
            obra_id: obra.id,
            valor: enorme,
            ..Medicao::default()
        };
        assert_eq!(percentual_contrato(&medicao, std::slice::from_ref(&obra)), Decimal::MAX);

        let peca = Peca {
            peso_unitario: Decimal::MAX,
            quantidade: 3,
            ..Peca::default()
        };
        assert_eq!(peca.peso_total(), Decimal::MAX);
        let kanban = contar_kanban(&[peca.clone(), peca]);
        assert_eq!(kanban[&EtapaProducao::Aguardando].peso, Decimal::MAX);

        let receita = Lancamento {
            tipo: TipoLancamento::Receita,
            valor: Decimal::MAX,
            ..Lancamento::default()
        };
        let resumo = calcular_resumo_financeiro(&[receita.clone(), receita]);
        assert_eq!(resumo.receitas, Decimal::MAX);
        assert_eq!(resumo.margem_percentual, dec("100"));
    }

    proptest! {
        #[test]
        fn progresso_sempre_entre_0_e_100(valores in prop::collection::vec(-500i64..500, 6)) {
            let etapas: Vec<(&str, i64)> = ETAPAS_OBRA.iter().copied().zip(valores).collect();
            let total = calcular_progresso_obra(&obra_com_progresso(&etapas)).total;
            prop_assert!(total >= Decimal::ZERO && total <= Decimal::ONE_HUNDRED);
        }

        #[test]
        fn nivel_nao_diminui_com_mais_quantidade(minimo in 0i64..1000, q in 0i64..5000, extra in 0i64..5000) {
            let menor = calcular_situacao_estoque(&item(q, minimo)).nivel;
            let maior = calcular_situacao_estoque(&item(q + extra, minimo)).nivel;
            prop_assert!(menor <= maior);
        }
    }
}
