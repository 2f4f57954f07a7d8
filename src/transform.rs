// src/transform.rs

pub mod campos;
pub mod status_map;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use tracing::warn;
use uuid::Uuid;

use crate::{common::error::AppError, db::Tabela, models::Entidade};

pub use campos::{campos, Campo, Padrao};
pub use status_map::{normalizar, DominioStatus, STATUS_MAP};

/// Registro como o backend guarda (chaves snake_case).
pub type RegistroPersistido = Map<String, Value>;
/// Registro como o runtime usa (chaves camelCase).
pub type RegistroRuntime = Map<String, Value>;
/// Alteração parcial, em nomes do runtime.
pub type Patch = RegistroRuntime;

/// Prefixo das colunas não mapeadas cujo nome coincide com o de um campo do runtime.
pub const PREFIXO_COLISAO: &str = "__";

/// Aviso de registro que chegou faltando campos obrigatórios (ou que nem virou entidade).
/// Nunca vira erro: o registro segue com os valores padrão.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistroIncompleto {
    pub tabela: Tabela,
    pub id: Option<String>,
    pub faltando: Vec<String>,
    pub erro: Option<String>,
}

impl RegistroIncompleto {
    fn registrar(&self) {
        warn!(
            target: "erp_core::incompleto",
            tabela = %self.tabela,
            id = self.id.as_deref().unwrap_or("-"),
            faltando = ?self.faltando,
            erro = self.erro.as_deref().unwrap_or(""),
            "Registro incompleto vindo do backend"
        );
    }
}

fn valor_presente<'a>(registro: &'a Map<String, Value>, chave: &str) -> Option<&'a Value> {
    registro.get(chave).filter(|v| !v.is_null())
}

fn normalizar_status(campo: &Campo, valor: &Value) -> Value {
    match (campo.status, valor) {
        (Some(dominio), Value::String(texto)) => Value::String(normalizar(dominio, texto).to_owned()),
        _ => valor.clone(),
    }
}

/// Converte um registro persistido para o formato do runtime, devolvendo o aviso de
/// incompleto quando algum campo obrigatório precisou de valor padrão.
pub fn to_runtime_checked(
    tabela: Tabela,
    registro: &RegistroPersistido,
) -> (RegistroRuntime, Option<RegistroIncompleto>) {
    let mapa = campos(tabela);
    let mut saida = RegistroRuntime::new();
    let mut faltando = Vec::new();

    for campo in mapa {
        let valor = valor_presente(registro, campo.persistido)
            .or_else(|| campo.legado.and_then(|coluna| valor_presente(registro, coluna)));

        match (valor, campo.obrigatorio) {
            (Some(valor), _) => {
                saida.insert(campo.runtime.to_owned(), normalizar_status(campo, valor));
            }
            (None, Some(padrao)) => {
                faltando.push(campo.persistido.to_owned());
                saida.insert(campo.runtime.to_owned(), padrao.valor());
            }
            (None, None) => {
                // Nulo explícito em campo opcional continua nulo
                if registro.contains_key(campo.persistido) {
                    saida.insert(campo.runtime.to_owned(), Value::Null);
                }
            }
        }
    }

    for (chave, valor) in registro {
        if mapa.iter().any(|c| c.persistido == chave) {
            continue;
        }
        // Coluna crua com o mesmo nome de um campo do runtime fica guardada com prefixo
        if mapa.iter().any(|c| c.runtime == chave) {
            saida.insert(format!("{PREFIXO_COLISAO}{chave}"), valor.clone());
        } else {
            saida.insert(chave.clone(), valor.clone());
        }
    }

    let id = valor_presente(registro, "id").map(|v| match v {
        Value::String(texto) => texto.clone(),
        outro => outro.to_string(),
    });
    if id.is_none() {
        faltando.insert(0, "id".to_owned());
    }

    let aviso = (!faltando.is_empty()).then(|| RegistroIncompleto {
        tabela,
        id,
        faltando,
        erro: None,
    });

    (saida, aviso)
}

/// Converte para o runtime. Campos obrigatórios ausentes recebem o padrão e geram um `warn!`.
pub fn to_runtime(tabela: Tabela, registro: &RegistroPersistido) -> RegistroRuntime {
    let (saida, aviso) = to_runtime_checked(tabela, registro);
    if let Some(aviso) = aviso {
        aviso.registrar();
    }
    saida
}

pub fn to_runtime_array(tabela: Tabela, registros: &[RegistroPersistido]) -> Vec<RegistroRuntime> {
    registros.iter().map(|r| to_runtime(tabela, r)).collect()
}

/// Caminho inverso: nomes do runtime para os nomes do banco. Não preenche padrões.
pub fn to_persistence(tabela: Tabela, registro: &RegistroRuntime) -> RegistroPersistido {
    let mapa = campos(tabela);
    let mut saida = RegistroPersistido::new();

    for campo in mapa {
        if let Some(valor) = registro.get(campo.runtime) {
            saida.insert(campo.persistido.to_owned(), valor.clone());
        }
    }

    for (chave, valor) in registro {
        if mapa.iter().any(|c| c.runtime == chave) {
            continue;
        }
        let coluna = chave
            .strip_prefix(PREFIXO_COLISAO)
            .filter(|original| mapa.iter().any(|c| c.runtime == *original))
            .unwrap_or(chave);
        // Campo mapeado tem prioridade sobre chave solta com o mesmo nome
        saida.entry(coluna.to_owned()).or_insert_with(|| valor.clone());
    }

    saida
}

// ---
// Camada tipada
// ---

fn substituir_pelo_padrao(registro: &mut RegistroRuntime, campo: &Campo) {
    match campo.obrigatorio {
        Some(padrao) => {
            registro.insert(campo.runtime.to_owned(), padrao.valor());
        }
        None => {
            registro.remove(campo.runtime);
        }
    }
}

// Troca pelo padrão, um a um, os campos que impedem a desserialização.
// O id nunca é trocado: sem id o registro não vira entidade.
fn desserializar_degradando<T: DeserializeOwned>(
    tabela: Tabela,
    mut registro: RegistroRuntime,
) -> Result<(T, Vec<String>), String> {
    let tentar = |r: &RegistroRuntime| serde_json::from_value::<T>(Value::Object(r.clone()));
    let mut trocados: Vec<String> = Vec::new();

    loop {
        let erro = match tentar(&registro) {
            Ok(entidade) => return Ok((entidade, trocados)),
            Err(e) => e.to_string(),
        };

        let culpado = campos(tabela)
            .iter()
            .filter(|c| c.runtime != "id" && registro.contains_key(c.runtime))
            .filter(|c| !trocados.iter().any(|t| t == c.persistido))
            .find(|c| {
                let mut tentativa = registro.clone();
                substituir_pelo_padrao(&mut tentativa, c);
                tentar(&tentativa).map_or_else(|e| e.to_string() != erro, |_| true)
            });

        match culpado {
            Some(campo) => {
                substituir_pelo_padrao(&mut registro, campo);
                trocados.push(campo.persistido.to_owned());
            }
            None => return Err(erro),
        }
    }
}

// Registro persistido -> entidade, com o aviso de incompleto já somando os campos degradados.
fn converter<T: Entidade + DeserializeOwned>(
    tabela: Tabela,
    registro: &RegistroPersistido,
) -> (Result<T, String>, Option<RegistroIncompleto>) {
    let (runtime, mut aviso) = to_runtime_checked(tabela, registro);

    let resultado = desserializar_degradando::<T>(tabela, runtime).and_then(|(entidade, trocados)| {
        if entidade.id() == Uuid::nil() {
            return Err("registro sem id".to_owned());
        }
        if !trocados.is_empty() {
            let marcador = aviso.get_or_insert_with(|| RegistroIncompleto {
                tabela,
                id: Some(entidade.id().to_string()),
                faltando: Vec::new(),
                erro: None,
            });
            marcador.faltando.extend(trocados);
        }
        Ok(entidade)
    });

    (resultado, aviso)
}

/// Converte um registro do backend em entidade. Campo com tipo inesperado recebe o
/// valor padrão (e entra no aviso de incompleto); só falha sem id válido.
pub fn parse_entidade<T: Entidade + DeserializeOwned>(
    tabela: Tabela,
    registro: &RegistroPersistido,
) -> Result<T, AppError> {
    let (resultado, aviso) = converter::<T>(tabela, registro);
    if let Some(aviso) = &aviso {
        aviso.registrar();
    }
    resultado.map_err(|motivo| AppError::RegistroInvalido { tabela, motivo })
}

/// Converte uma listagem inteira. Registros sem id válido ficam de fora (com aviso);
/// os demais entram mesmo incompletos.
pub fn parse_lista<T: Entidade + DeserializeOwned>(
    registros: &[RegistroPersistido],
) -> (Vec<T>, Vec<RegistroIncompleto>) {
    let tabela = T::TABELA;
    let mut entidades = Vec::with_capacity(registros.len());
    let mut avisos = Vec::new();

    for registro in registros {
        let (resultado, aviso) = converter::<T>(tabela, registro);

        match resultado {
            Ok(entidade) => {
                if let Some(aviso) = aviso {
                    aviso.registrar();
                    avisos.push(aviso);
                }
                entidades.push(entidade);
            }
            Err(erro) => {
                let mut aviso = aviso.unwrap_or_else(|| RegistroIncompleto {
                    tabela,
                    id: valor_presente(registro, "id").map(|v| v.to_string()),
                    faltando: Vec::new(),
                    erro: None,
                });
                aviso.erro = Some(erro);
                aviso.registrar();
                avisos.push(aviso);
            }
        }
    }

    (entidades, avisos)
}

/// Entidade tipada -> registro do runtime.
pub fn serializar_entidade<T: Serialize>(entidade: &T) -> Result<RegistroRuntime, AppError> {
    match serde_json::to_value(entidade)? {
        Value::Object(mapa) => Ok(mapa),
        _ => Err(AppError::Serializacao(<serde_json::Error as serde::ser::Error>::custom(
            "entidade não serializou como objeto",
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Obra, Peca, StatusObra};
    use proptest::prelude::*;
    use serde_json::json;

    fn registro(valor: Value) -> RegistroPersistido {
        match valor {
            Value::Object(mapa) => mapa,
            _ => panic!("esperava objeto"),
        }
    }

    #[test]
    fn renomeia_e_normaliza_status() {
        let id = Uuid::new_v4();
        let entrada = registro(json!({
            "id": id.to_string(),
            "codigo": "OB-001",
            "nome": "Galpão Industrial",
            "cliente_nome": "Metalúrgica Sul",
            "status": "ativo",
            "valor_contrato": 150000,
            "peso_total": 12000,
            "progresso": {"corte": 100},
        }));

        let (saida, aviso) = to_runtime_checked(Tabela::Obras, &entrada);
        assert!(aviso.is_none());
        assert_eq!(saida["cliente"], json!("Metalúrgica Sul"));
        assert_eq!(saida["valorContrato"], json!(150000));
        assert_eq!(saida["status"], json!("em_producao"));
        assert!(!saida.contains_key("cliente_nome"));
    }

    #[test]
    fn campos_faltando_recebem_padrao_e_aviso() {
        let entrada = registro(json!({ "id": "abc", "nome": "Sem status", "status": null }));
        let (saida, aviso) = to_runtime_checked(Tabela::Obras, &entrada);

        let aviso = aviso.expect("deveria marcar incompleto");
        assert_eq!(aviso.id.as_deref(), Some("abc"));
        assert!(aviso.faltando.contains(&"status".to_owned()));
        assert!(aviso.faltando.contains(&"valor_contrato".to_owned()));
        assert_eq!(saida["status"], json!("orcamento"));
        assert_eq!(saida["valorContrato"], json!(0));
        assert_eq!(saida["progresso"], json!({}));
    }

    #[test]
    fn etapa_da_peca_cai_para_coluna_legada() {
        let entrada = registro(json!({
            "id": Uuid::new_v4().to_string(),
            "obra_id": Uuid::new_v4().to_string(),
            "marca": "V-12",
            "perfil": "W200",
            "peso_unitario": 35.5,
            "quantidade": 4,
            "status_producao": "soldagem",
            "status_montagem": "pendente",
        }));
        let saida = to_runtime(Tabela::Pecas, &entrada);
        assert_eq!(saida["etapa"], json!("solda"));
        // a coluna legada segue intacta
        assert_eq!(saida["status_producao"], json!("soldagem"));

        let peca: Peca = parse_entidade(Tabela::Pecas, &entrada).unwrap();
        assert_eq!(peca.etapa, crate::models::EtapaProducao::Solda);
        assert_eq!(peca.quantidade, 4);
    }

    #[test]
    fn chaves_desconhecidas_passam_nos_dois_sentidos() {
        let entrada = registro(json!({ "id": "x", "razao_social": "ACME", "campo_novo": 7 }));
        let runtime = to_runtime(Tabela::Clientes, &entrada);
        assert_eq!(runtime["campo_novo"], json!(7));
        let volta = to_persistence(Tabela::Clientes, &runtime);
        assert_eq!(volta["campo_novo"], json!(7));
        assert_eq!(volta["razao_social"], json!("ACME"));
    }

    #[test]
    fn coluna_crua_com_nome_do_runtime_nao_se_perde() {
        let entrada = registro(json!({
            "id": "x",
            "cliente_nome": "Metalúrgica Sul",
            "cliente": "valor antigo",
            "nome": "Galpão",
        }));
        let runtime = to_runtime(Tabela::Obras, &entrada);
        assert_eq!(runtime["cliente"], json!("Metalúrgica Sul"));
        assert_eq!(runtime["__cliente"], json!("valor antigo"));

        let volta = to_persistence(Tabela::Obras, &runtime);
        assert_eq!(volta["cliente_nome"], json!("Metalúrgica Sul"));
        assert_eq!(volta["cliente"], json!("valor antigo"));
        assert!(!volta.contains_key("__cliente"));

        // Mesma coisa no estoque: coluna `minimo` solta ao lado de `estoque_minimo`
        let item = registro(json!({ "id": "y", "estoque_minimo": 10, "minimo": 3 }));
        let runtime = to_runtime(Tabela::Estoque, &item);
        assert_eq!(runtime["minimo"], json!(10));
        assert_eq!(runtime["__minimo"], json!(3));
        assert_eq!(to_persistence(Tabela::Estoque, &runtime)["minimo"], json!(3));
    }

    #[test]
    fn contagem_em_ponto_flutuante_e_aceita() {
        let obra_id = Uuid::new_v4();
        let registros = vec![registro(json!({
            "id": Uuid::new_v4().to_string(),
            "obra_id": obra_id.to_string(),
            "marca": "V-3",
            "peso_unitario": 12.5,
            "quantidade": 2.0,
            "etapa": "corte",
            "status_montagem": "pendente",
        }))];
        let (pecas, avisos) = parse_lista::<Peca>(&registros);
        assert_eq!(pecas.len(), 1);
        assert_eq!(pecas[0].quantidade, 2);
        assert!(avisos.is_empty(), "{avisos:?}");
    }

    #[test]
    fn campo_com_tipo_errado_vira_padrao_e_entra_no_aviso() {
        let id = Uuid::new_v4();
        let registros = vec![registro(json!({
            "id": id.to_string(),
            "obra_id": Uuid::new_v4().to_string(),
            "marca": "V-4",
            "peso_unitario": 10,
            "quantidade": 2.5,
            "lista_id": 42,
            "etapa": "corte",
            "status_montagem": "pendente",
        }))];
        let (pecas, avisos) = parse_lista::<Peca>(&registros);

        assert_eq!(pecas.len(), 1);
        assert_eq!(pecas[0].id, id);
        assert_eq!(pecas[0].marca, "V-4");
        assert_eq!(pecas[0].quantidade, 0);
        assert_eq!(pecas[0].lista_id, None);

        assert_eq!(avisos.len(), 1);
        assert!(avisos[0].erro.is_none());
        assert!(avisos[0].faltando.contains(&"quantidade".to_owned()));
        assert!(avisos[0].faltando.contains(&"lista_id".to_owned()));
    }

    #[test]
    fn status_desconhecido_sobrevive() {
        let entrada = registro(json!({ "id": Uuid::new_v4().to_string(), "status": "Pausada" }));
        let obra: Obra = parse_entidade(Tabela::Obras, &entrada).unwrap();
        assert_eq!(obra.status, StatusObra::Outro("Pausada".into()));
    }

    #[test]
    fn lista_descarta_sem_id_e_invalidos() {
        let obra_id = Uuid::new_v4();
        let registros = vec![
            registro(json!({ "id": Uuid::new_v4().to_string(), "obra_id": obra_id.to_string(), "marca": "A1" })),
            registro(json!({ "obra_id": obra_id.to_string(), "marca": "SEM-ID" })),
            registro(json!({ "id": "nao-e-uuid", "obra_id": obra_id.to_string() })),
        ];
        let (pecas, avisos) = parse_lista::<Peca>(&registros);
        assert_eq!(pecas.len(), 1);
        assert_eq!(pecas[0].marca, "A1");
        assert_eq!(avisos.len(), 3);
        assert_eq!(avisos.iter().filter(|a| a.erro.is_some()).count(), 2);
    }

    #[test]
    fn entidade_serializada_volta_para_o_banco() {
        let orcamento = crate::models::Orcamento {
            id: Uuid::new_v4(),
            numero: "2024-017".into(),
            nome_obra: "Mezanino".into(),
            ..Default::default()
        };
        let runtime = serializar_entidade(&orcamento).unwrap();
        let persistido = to_persistence(Tabela::Orcamentos, &runtime);
        assert_eq!(persistido["nome_obra"], json!("Mezanino"));
        assert_eq!(persistido["status"], json!("rascunho"));
        assert!(!persistido.contains_key("obra_id"));
    }

    fn valor_de_campo(campo: &'static Campo) -> BoxedStrategy<Value> {
        match (campo.status, campo.obrigatorio) {
            (Some(dominio), _) => proptest::sample::select(dominio.canonicos())
                .prop_map(|s| Value::String(s.to_owned()))
                .boxed(),
            (None, Some(Padrao::ListaVazia)) => prop::collection::vec("[a-z]{1,6}", 0..3)
                .prop_map(|v| json!(v))
                .boxed(),
            (None, Some(Padrao::ObjetoVazio)) => (0u32..=100).prop_map(|p| json!({"corte": p})).boxed(),
            (None, Some(Padrao::Verdadeiro)) => any::<bool>().prop_map(Value::Bool).boxed(),
            (None, Some(Padrao::Zero)) => (0i64..1_000_000).prop_map(Value::from).boxed(),
            _ => "[A-Za-z0-9 ]{0,12}".prop_map(Value::String).boxed(),
        }
    }

    fn registro_aleatorio(tabela: Tabela) -> impl Strategy<Value = RegistroPersistido> {
        let estrategias: Vec<_> = campos(tabela)
            .iter()
            .map(|campo| (Just(campo.persistido), proptest::option::of(valor_de_campo(campo))))
            .collect();
        estrategias.prop_map(|pares| {
            pares
                .into_iter()
                .filter_map(|(chave, valor)| valor.map(|v| (chave.to_owned(), v)))
                .collect()
        })
    }

    proptest! {
        #[test]
        fn ida_e_volta_preserva_campos_mapeados(
            (tabela, entrada) in proptest::sample::select(Tabela::TODAS.to_vec())
                .prop_flat_map(|t| (Just(t), registro_aleatorio(t)))
        ) {
            let volta = to_persistence(tabela, &to_runtime(tabela, &entrada));
            for campo in campos(tabela) {
                if let Some(original) = entrada.get(campo.persistido) {
                    prop_assert_eq!(volta.get(campo.persistido), Some(original));
                }
            }
        }
    }
}
