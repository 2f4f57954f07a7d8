// src/reducer.rs

mod acoes;
mod estado;

pub use acoes::{AcaoColecao, Action};
pub use estado::ErpState;

use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::{debug, error};
use uuid::Uuid;

use crate::{
    common::error::ViolacaoInvariante,
    models::{
        Entidade, Equipe, Expedicao, ItemEstoque, Lancamento, Medicao, Obra, Orcamento, Peca,
        StatusOrcamento, ETAPAS_OBRA,
    },
    transform::Patch,
};

/// Uma coleção de entidades dentro do `ErpState`, com as regras próprias dela.
pub trait Colecao:
    Entidade + Clone + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
    fn fatia(estado: &ErpState) -> &Arc<Vec<Self>>;
    fn fatia_mut(estado: &mut ErpState) -> &mut Arc<Vec<Self>>;
    fn embrulhar(acao: AcaoColecao<Self>) -> Action;

    /// Regras checadas em `Add` (sem anterior) e `Update` (com anterior).
    fn validar(_novo: &Self, _anterior: Option<&Self>, _estado: &ErpState) -> Result<(), ViolacaoInvariante> {
        Ok(())
    }

    /// Efeitos na mesma transição quando a entidade sai da coleção.
    fn ao_remover(_removido: &Self, _estado: &mut ErpState) {}

    /// O servidor trocou o id da entidade: referências em outras coleções acompanham.
    fn ao_trocar_id(_antigo: Uuid, _novo: Uuid, _estado: &mut ErpState) {}
}

macro_rules! colecao {
    ($tipo:ty, $campo:ident, $variante:ident) => {
        fn fatia(estado: &ErpState) -> &Arc<Vec<$tipo>> {
            &estado.$campo
        }

        fn fatia_mut(estado: &mut ErpState) -> &mut Arc<Vec<$tipo>> {
            &mut estado.$campo
        }

        fn embrulhar(acao: AcaoColecao<$tipo>) -> Action {
            Action::$variante(acao)
        }
    };
}

// Reaproveita o Arc quando nada mudou
fn remapear<T: Clone>(fatia: &mut Arc<Vec<T>>, mut trocar: impl FnMut(&mut T) -> bool) {
    let mut lista = (**fatia).clone();
    let mut mudou = false;
    for item in lista.iter_mut() {
        mudou |= trocar(item);
    }
    if mudou {
        *fatia = Arc::new(lista);
    }
}

fn trocar_id(campo: &mut Uuid, antigo: Uuid, novo: Uuid) -> bool {
    if *campo == antigo {
        *campo = novo;
        true
    } else {
        false
    }
}

fn trocar_id_opcional(campo: &mut Option<Uuid>, antigo: Uuid, novo: Uuid) -> bool {
    match campo {
        Some(id) => trocar_id(id, antigo, novo),
        None => false,
    }
}

impl Colecao for Obra {
    colecao!(Obra, obras, Obras);

    fn validar(novo: &Self, _anterior: Option<&Self>, _estado: &ErpState) -> Result<(), ViolacaoInvariante> {
        for (etapa, valor) in &novo.progresso {
            let conhecida = ETAPAS_OBRA.contains(&etapa.as_str());
            if !conhecida || *valor < rust_decimal::Decimal::ZERO || *valor > rust_decimal::Decimal::ONE_HUNDRED {
                return Err(ViolacaoInvariante::ProgressoInvalido { etapa: etapa.clone() });
            }
        }
        Ok(())
    }

    fn ao_remover(removida: &Self, estado: &mut ErpState) {
        if estado.pecas.iter().any(|p| p.obra_id == removida.id) {
            let restantes: Vec<Peca> = estado
                .pecas
                .iter()
                .filter(|p| p.obra_id != removida.id)
                .cloned()
                .collect();
            estado.pecas = Arc::new(restantes);
        }
        if estado.obra_atual == Some(removida.id) {
            estado.obra_atual = None;
        }
    }

    fn ao_trocar_id(antigo: Uuid, novo: Uuid, estado: &mut ErpState) {
        remapear(&mut estado.pecas, |p| trocar_id(&mut p.obra_id, antigo, novo));
        remapear(&mut estado.expedicoes, |e| trocar_id(&mut e.obra_id, antigo, novo));
        remapear(&mut estado.medicoes, |m| trocar_id(&mut m.obra_id, antigo, novo));
        remapear(&mut estado.lancamentos, |l| trocar_id_opcional(&mut l.obra_id, antigo, novo));
        remapear(&mut estado.orcamentos, |o| trocar_id_opcional(&mut o.obra_id, antigo, novo));
        remapear(&mut estado.equipes, |e| trocar_id_opcional(&mut e.obra_id, antigo, novo));
        trocar_id_opcional(&mut estado.obra_atual, antigo, novo);
    }
}

impl Colecao for Peca {
    colecao!(Peca, pecas, Pecas);

    fn validar(novo: &Self, anterior: Option<&Self>, estado: &ErpState) -> Result<(), ViolacaoInvariante> {
        let trocou_de_obra = anterior.is_none_or(|a| a.obra_id != novo.obra_id);
        if trocou_de_obra && estado.obra(novo.obra_id).is_none() {
            return Err(ViolacaoInvariante::EntidadeInexistente {
                tabela: Obra::TABELA,
                id: novo.obra_id,
            });
        }
        Ok(())
    }

    fn ao_trocar_id(antigo: Uuid, novo: Uuid, estado: &mut ErpState) {
        remapear(&mut estado.expedicoes, |e| {
            e.pecas
                .iter_mut()
                .fold(false, |mudou, id| trocar_id(id, antigo, novo) || mudou)
        });
    }
}

impl Colecao for ItemEstoque {
    colecao!(ItemEstoque, estoque, Estoque);

    fn validar(novo: &Self, _anterior: Option<&Self>, _estado: &ErpState) -> Result<(), ViolacaoInvariante> {
        let campos = [
            ("quantidade", novo.quantidade),
            ("minimo", novo.minimo),
            ("maximo", novo.maximo),
        ];
        match campos.iter().find(|(_, valor)| valor.is_sign_negative() && !valor.is_zero()) {
            Some((campo, _)) => Err(ViolacaoInvariante::ValorNegativo { campo: *campo }),
            None => Ok(()),
        }
    }
}

impl Colecao for Orcamento {
    colecao!(Orcamento, orcamentos, Orcamentos);

    fn validar(novo: &Self, anterior: Option<&Self>, _estado: &ErpState) -> Result<(), ViolacaoInvariante> {
        if novo.probabilidade < rust_decimal::Decimal::ZERO
            || novo.probabilidade > rust_decimal::Decimal::ONE_HUNDRED
        {
            return Err(ViolacaoInvariante::ProbabilidadeForaDoIntervalo(
                novo.probabilidade.to_string(),
            ));
        }

        let ja_aprovado = anterior.is_some_and(|a| a.status == StatusOrcamento::Aprovado);
        if novo.status == StatusOrcamento::Aprovado && !ja_aprovado {
            return Err(ViolacaoInvariante::AprovacaoForaDoFluxo(novo.id));
        }
        Ok(())
    }
}

impl Colecao for Expedicao {
    colecao!(Expedicao, expedicoes, Expedicoes);

    fn validar(novo: &Self, _anterior: Option<&Self>, estado: &ErpState) -> Result<(), ViolacaoInvariante> {
        if !novo.status.em_aberto() {
            return Ok(());
        }
        for outra in estado
            .expedicoes
            .iter()
            .filter(|e| e.id != novo.id && e.status.em_aberto())
        {
            if let Some(peca) = novo.pecas.iter().find(|p| outra.pecas.contains(p)) {
                return Err(ViolacaoInvariante::PecaEmOutraExpedicao {
                    peca: *peca,
                    expedicao: outra.id,
                });
            }
        }
        Ok(())
    }
}

impl Colecao for Medicao {
    colecao!(Medicao, medicoes, Medicoes);
}

impl Colecao for Lancamento {
    colecao!(Lancamento, lancamentos, Lancamentos);
}

impl Colecao for Equipe {
    colecao!(Equipe, equipes, Equipes);
}

// ---
// Patch
// ---

fn mesclar(alvo: &mut Value, patch: &Value) {
    match (alvo, patch) {
        (Value::Object(alvo), Value::Object(patch)) => {
            for (chave, valor) in patch {
                if valor.is_null() {
                    alvo.remove(chave);
                } else {
                    mesclar(alvo.entry(chave.clone()).or_insert(Value::Null), valor);
                }
            }
        }
        (alvo, patch) => *alvo = patch.clone(),
    }
}

/// Aplica um merge patch (nomes do runtime) a uma entidade e relê o resultado tipado.
pub fn aplicar_patch<T: Colecao>(entidade: &T, patch: &Patch) -> Result<T, ViolacaoInvariante> {
    let tabela = T::TABELA;
    if let Some(id) = patch.get("id") {
        if *id != Value::String(entidade.id().to_string()) {
            return Err(ViolacaoInvariante::PatchAlteraId { tabela });
        }
    }

    let invalido = |motivo: String| ViolacaoInvariante::PatchInvalido { tabela, motivo };

    let mut base = serde_json::to_value(entidade).map_err(|e| invalido(e.to_string()))?;
    mesclar(&mut base, &Value::Object(patch.clone()));
    serde_json::from_value(base).map_err(|e| invalido(e.to_string()))
}

// Substitui campos de topo, sem descer em objetos
fn substituir_campos<T: Colecao>(entidade: &T, campos: &Patch) -> Result<T, ViolacaoInvariante> {
    let tabela = T::TABELA;
    let invalido = |motivo: String| ViolacaoInvariante::PatchInvalido { tabela, motivo };

    let mut base = match serde_json::to_value(entidade).map_err(|e| invalido(e.to_string()))? {
        Value::Object(mapa) => mapa,
        _ => return Err(invalido("entidade não é objeto".into())),
    };
    for (chave, valor) in campos {
        if chave == "id" {
            continue;
        }
        if valor.is_null() {
            base.remove(chave);
        } else {
            base.insert(chave.clone(), valor.clone());
        }
    }
    serde_json::from_value(Value::Object(base)).map_err(|e| invalido(e.to_string()))
}

// ---
// Transições
// ---

fn com_fatia<T: Colecao>(estado: &ErpState, lista: Vec<T>) -> ErpState {
    let mut novo = estado.clone();
    *T::fatia_mut(&mut novo) = Arc::new(lista);
    novo
}

fn aplicar_colecao<T: Colecao>(
    estado: &Arc<ErpState>,
    acao: &AcaoColecao<T>,
) -> Result<Arc<ErpState>, ViolacaoInvariante> {
    let atual = T::fatia(estado);
    let posicao = |id: Uuid| atual.iter().position(|e| e.id() == id);

    match acao {
        AcaoColecao::Set(itens) => {
            if atual.as_slice() == itens.as_slice() {
                return Ok(Arc::clone(estado));
            }
            Ok(Arc::new(com_fatia(estado, itens.clone())))
        }

        AcaoColecao::Add(item) => {
            if posicao(item.id()).is_some() {
                return Err(ViolacaoInvariante::IdDuplicado {
                    tabela: T::TABELA,
                    id: item.id(),
                });
            }
            T::validar(item, None, estado)?;

            let mut lista = (**atual).clone();
            lista.push(item.clone());
            Ok(Arc::new(com_fatia(estado, lista)))
        }

        AcaoColecao::Update { id, patch } => {
            let pos = posicao(*id).ok_or(ViolacaoInvariante::EntidadeInexistente {
                tabela: T::TABELA,
                id: *id,
            })?;
            let anterior = &atual[pos];
            let atualizado = aplicar_patch(anterior, patch)?;
            if atualizado == *anterior {
                return Ok(Arc::clone(estado));
            }
            T::validar(&atualizado, Some(anterior), estado)?;

            let mut lista = (**atual).clone();
            lista[pos] = atualizado;
            Ok(Arc::new(com_fatia(estado, lista)))
        }

        AcaoColecao::Remove(id) => {
            let Some(pos) = posicao(*id) else {
                return Ok(Arc::clone(estado));
            };
            let mut lista = (**atual).clone();
            let removido = lista.remove(pos);

            let mut novo = com_fatia(estado, lista);
            T::ao_remover(&removido, &mut novo);
            Ok(Arc::new(novo))
        }

        AcaoColecao::Reconciliar { id_local, registro } => {
            let id_servidor = registro.id();
            // Removida antes da resposta chegar: continua removida
            let Some(pos) = posicao(*id_local).or_else(|| posicao(id_servidor)) else {
                return Ok(Arc::clone(estado));
            };
            if atual[pos] == *registro {
                return Ok(Arc::clone(estado));
            }

            let mut lista = (**atual).clone();
            lista[pos] = registro.clone();
            // Se o id do servidor já estava em outra posição, fica só uma cópia
            let mut indice = 0;
            lista.retain(|e| {
                let manter = indice == pos || e.id() != id_servidor;
                indice += 1;
                manter
            });

            let mut novo = com_fatia(estado, lista);
            if *id_local != id_servidor {
                T::ao_trocar_id(*id_local, id_servidor, &mut novo);
            }
            Ok(Arc::new(novo))
        }

        AcaoColecao::ReconciliarCampos { id, campos } => {
            // Removida antes da resposta chegar: continua removida
            let Some(pos) = posicao(*id) else {
                return Ok(Arc::clone(estado));
            };
            let corrigido = substituir_campos(&atual[pos], campos)?;
            if corrigido == atual[pos] {
                return Ok(Arc::clone(estado));
            }

            let mut lista = (**atual).clone();
            lista[pos] = corrigido;
            Ok(Arc::new(com_fatia(estado, lista)))
        }
    }
}

fn aprovar_orcamento(
    estado: &Arc<ErpState>,
    orcamento_id: Uuid,
    obra: &Obra,
) -> Result<Arc<ErpState>, ViolacaoInvariante> {
    let pos = estado
        .orcamentos
        .iter()
        .position(|o| o.id == orcamento_id)
        .ok_or(ViolacaoInvariante::EntidadeInexistente {
            tabela: Orcamento::TABELA,
            id: orcamento_id,
        })?;
    if estado.orcamentos[pos].status == StatusOrcamento::Aprovado {
        return Err(ViolacaoInvariante::OrcamentoJaAprovado(orcamento_id));
    }
    if estado.obra(obra.id).is_some() {
        return Err(ViolacaoInvariante::IdDuplicado {
            tabela: Obra::TABELA,
            id: obra.id,
        });
    }

    let mut orcamentos = (*estado.orcamentos).clone();
    orcamentos[pos].status = StatusOrcamento::Aprovado;
    orcamentos[pos].obra_id = Some(obra.id);

    let mut obras = (*estado.obras).clone();
    obras.push(obra.clone());

    let mut novo = (**estado).clone();
    novo.orcamentos = Arc::new(orcamentos);
    novo.obras = Arc::new(obras);
    Ok(Arc::new(novo))
}

/// A função de transição. Pura: não toca o estado recebido e devolve o mesmo `Arc`
/// quando a ação não muda nada.
pub fn try_reduce(estado: &Arc<ErpState>, acao: &Action) -> Result<Arc<ErpState>, ViolacaoInvariante> {
    match acao {
        Action::Obras(a) => aplicar_colecao(estado, a),
        Action::Pecas(a) => aplicar_colecao(estado, a),
        Action::Estoque(a) => aplicar_colecao(estado, a),
        Action::Orcamentos(a) => aplicar_colecao(estado, a),
        Action::Expedicoes(a) => aplicar_colecao(estado, a),
        Action::Medicoes(a) => aplicar_colecao(estado, a),
        Action::Lancamentos(a) => aplicar_colecao(estado, a),
        Action::Equipes(a) => aplicar_colecao(estado, a),

        Action::AprovarOrcamento { orcamento_id, obra } => aprovar_orcamento(estado, *orcamento_id, obra),

        Action::SelecionarObra(selecao) => {
            if estado.obra_atual == *selecao {
                return Ok(Arc::clone(estado));
            }
            if let Some(id) = selecao {
                if estado.obra(*id).is_none() {
                    return Err(ViolacaoInvariante::EntidadeInexistente {
                        tabela: Obra::TABELA,
                        id: *id,
                    });
                }
            }
            let mut novo = (**estado).clone();
            novo.obra_atual = *selecao;
            Ok(Arc::new(novo))
        }

        Action::AddNotificacao(notificacao) => {
            let mut notificacoes = (*estado.notificacoes).clone();
            notificacoes.push(notificacao.clone());
            let mut novo = (**estado).clone();
            novo.notificacoes = Arc::new(notificacoes);
            Ok(Arc::new(novo))
        }

        Action::RemoveNotificacao(id) => {
            if !estado.notificacoes.iter().any(|n| n.id == *id) {
                return Ok(Arc::clone(estado));
            }
            let restantes = estado.notificacoes.iter().filter(|n| n.id != *id).cloned().collect();
            let mut novo = (**estado).clone();
            novo.notificacoes = Arc::new(restantes);
            Ok(Arc::new(novo))
        }

        Action::LimparNotificacoes => {
            if estado.notificacoes.is_empty() {
                return Ok(Arc::clone(estado));
            }
            let mut novo = (**estado).clone();
            novo.notificacoes = Arc::default();
            Ok(Arc::new(novo))
        }

        Action::Desconhecida(tipo) => {
            debug!(tipo = %tipo, "Ação desconhecida ignorada");
            Ok(Arc::clone(estado))
        }
    }
}

/// Como `try_reduce`, mas uma violação é tratada como bug: falha em debug e, em release,
/// loga e mantém o estado.
pub fn reduce(estado: &Arc<ErpState>, acao: &Action) -> Arc<ErpState> {
    match try_reduce(estado, acao) {
        Ok(novo) => novo,
        Err(violacao) => {
            error!(acao = %acao.tipo(), erro = %violacao, "Invariante violada, ação descartada");
            debug_assert!(false, "invariante violada em {}: {violacao}", acao.tipo());
            Arc::clone(estado)
        }
    }
}
