// tests/escritas_otimistas.rs

use std::{sync::Arc, time::Duration};

use erp_core::{
    models::{EtapaProducao, StatusExpedicao, StatusOrcamento, TipoNotificacao},
    AppError, ErpStore, MemoryGateway, Tabela, ViolacaoInvariante,
};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};
use uuid::Uuid;

fn payload<T: DeserializeOwned>(valor: Value) -> T {
    serde_json::from_value(valor).expect("payload de teste inválido")
}

fn patch(valor: Value) -> Map<String, Value> {
    match valor {
        Value::Object(mapa) => mapa,
        _ => panic!("patch de teste precisa ser objeto"),
    }
}

async fn esperar_escritas(gateway: &MemoryGateway, total: usize) {
    while gateway.total_escritas() < total {
        tokio::task::yield_now().await;
    }
}

fn store_com(gateway: MemoryGateway) -> (ErpStore, Arc<MemoryGateway>) {
    let gateway = Arc::new(gateway);
    (ErpStore::new(gateway.clone()), gateway)
}

fn nova_obra(codigo: &str) -> Value {
    json!({
        "codigo": codigo,
        "nome": "Galpão Logístico",
        "cliente": "Transportes Rio Sul",
        "valorContrato": 480000,
        "pesoTotal": 32000,
    })
}

#[tokio::test]
async fn criacao_aparece_antes_da_rede_e_assume_o_id_do_servidor() {
    let (store, gateway) = store_com(MemoryGateway::new().com_ids_do_servidor());

    let pendente = store.add_obra(payload(nova_obra("OB-100")));

    // Otimista: já está no estado, com o id local
    let local = store.estado().obras[0].clone();
    assert_eq!(local.codigo, "OB-100");

    let confirmada = pendente.await.unwrap();
    assert_ne!(confirmada.id, local.id);

    let estado = store.estado();
    assert_eq!(estado.obras.len(), 1);
    assert_eq!(estado.obras[0].id, confirmada.id);
    assert_eq!(gateway.registros(Tabela::Obras).len(), 1);
}

#[tokio::test]
async fn id_trocado_pelo_servidor_acompanha_pecas_ja_criadas() {
    let (store, _gateway) = store_com(MemoryGateway::new().com_ids_do_servidor());

    let pendente_obra = store.add_obra(payload(nova_obra("OB-200")));
    let id_local = store.estado().obras[0].id;

    // Peça criada antes da obra voltar do servidor
    let pendente_peca = store.add_peca(payload(json!({
        "obraId": id_local,
        "marca": "P-01",
        "perfil": "W250x32.7",
        "pesoUnitario": 120.5,
        "quantidade": 2,
    })));

    let obra = pendente_obra.await.unwrap();
    assert_eq!(store.estado().pecas[0].obra_id, obra.id);

    let peca = pendente_peca.await.unwrap();
    assert_eq!(peca.obra_id, obra.id);
    assert_eq!(store.estado().pecas.len(), 1);
    assert_eq!(store.estado().pecas[0].obra_id, obra.id);
}

#[tokio::test]
async fn falha_de_transporte_mantem_o_estado_e_notifica() {
    let (store, gateway) = store_com(MemoryGateway::new());
    gateway.falhar_proximas(1);

    let resultado = store
        .add_item_estoque(payload(json!({
            "material": "Chapa 3/8\"",
            "tipo": "chapa",
            "quantidade": 40,
            "minimo": 10,
            "precoKg": 7.9,
        })))
        .await;

    assert!(matches!(resultado, Err(AppError::Transporte(_))));

    let estado = store.estado();
    assert_eq!(estado.estoque.len(), 1, "a mudança otimista continua visível");
    assert_eq!(estado.notificacoes.len(), 1);
    assert_eq!(estado.notificacoes[0].tipo, TipoNotificacao::Erro);
    assert!(gateway.registros(Tabela::Estoque).is_empty());
}

#[tokio::test]
async fn violacao_e_recusada_sem_chamar_o_backend() {
    let (store, gateway) = store_com(MemoryGateway::new());

    let resultado = store
        .add_peca(payload(json!({
            "obraId": Uuid::new_v4(),
            "marca": "ORFA",
            "pesoUnitario": 10,
            "quantidade": 1,
        })))
        .await;

    assert!(matches!(
        resultado,
        Err(AppError::Invariante(ViolacaoInvariante::EntidadeInexistente { tabela: Tabela::Obras, .. }))
    ));
    assert!(store.estado().pecas.is_empty());
    assert_eq!(gateway.total_escritas(), 0);
}

#[tokio::test]
async fn payload_invalido_nem_chega_ao_estado() {
    let (store, gateway) = store_com(MemoryGateway::new());

    let resultado = store
        .add_item_estoque(payload(json!({ "material": "Perfil U", "minimo": 50, "maximo": 20 })))
        .await;

    assert!(matches!(resultado, Err(AppError::ValidationError(_))));
    assert!(store.estado().estoque.is_empty());
    assert_eq!(gateway.total_escritas(), 0);
}

#[tokio::test]
async fn aprovar_orcamento_cria_a_obra_e_vincula() {
    let (store, gateway) = store_com(MemoryGateway::new().com_ids_do_servidor());

    let orcamento = store
        .add_orcamento(payload(json!({
            "numero": "2025-031",
            "nomeObra": "Cobertura Metálica",
            "cliente": "Agro Cereais",
            "valorTotal": 210000,
            "pesoEstimado": 14500,
            "probabilidade": 70,
        })))
        .await
        .unwrap();

    let pendente = store.aprovar_orcamento(orcamento.id);

    // As duas mudanças entram juntas, antes da rede
    let estado = store.estado();
    let local = estado.orcamento(orcamento.id).unwrap();
    assert_eq!(local.status, StatusOrcamento::Aprovado);
    let obra_local = estado.obra(local.obra_id.unwrap()).unwrap();
    assert_eq!(obra_local.codigo, "OB-2025-031");

    let obra = pendente.await.unwrap();

    let estado = store.estado();
    assert_eq!(estado.obras.len(), 1);
    assert_eq!(estado.obras[0].id, obra.id);
    assert_eq!(estado.orcamento(orcamento.id).unwrap().obra_id, Some(obra.id));

    let gravado = &gateway.registros(Tabela::Orcamentos)[0];
    assert_eq!(gravado["status"], json!("aprovado"));
    assert_eq!(gravado["obra_id"], json!(obra.id.to_string()));

    // Segunda aprovação é recusada localmente
    let de_novo = store.aprovar_orcamento(orcamento.id).await;
    assert!(matches!(
        de_novo,
        Err(AppError::Invariante(ViolacaoInvariante::OrcamentoJaAprovado(_)))
    ));
}

#[tokio::test]
async fn update_generico_nao_aprova_orcamento() {
    let (store, _gateway) = store_com(MemoryGateway::new());
    let orcamento = store
        .add_orcamento(payload(json!({
            "numero": "2025-032",
            "nomeObra": "Passarela",
            "cliente": "Prefeitura",
            "valorTotal": 90000,
        })))
        .await
        .unwrap();

    let mut patch = serde_json::Map::new();
    patch.insert("status".into(), json!("aprovado"));
    let resultado = store.update_orcamento(orcamento.id, patch).await;

    assert!(matches!(
        resultado,
        Err(AppError::Invariante(ViolacaoInvariante::AprovacaoForaDoFluxo(_)))
    ));
    assert_eq!(store.estado().orcamentos[0].status, StatusOrcamento::Rascunho);
}

#[tokio::test]
async fn ajuste_de_estoque_grava_movimentacao() {
    let (store, gateway) = store_com(MemoryGateway::new());
    let item = store
        .add_item_estoque(payload(json!({ "material": "Cantoneira 2\"", "quantidade": 30, "minimo": 10 })))
        .await
        .unwrap();

    let ajustado = store
        .ajustar_estoque(item.id, Decimal::from(-12), Some("Separação OB-100".into()))
        .await
        .unwrap();
    assert_eq!(ajustado.quantidade, Decimal::from(18));
    assert_eq!(store.estado().item_estoque(item.id).unwrap().quantidade, Decimal::from(18));

    let movimentos = gateway.registros(Tabela::MovEstoque);
    assert_eq!(movimentos.len(), 1);
    assert_eq!(movimentos[0]["tipo"], json!("saida"));
    assert_eq!(movimentos[0]["item_id"], json!(item.id.to_string()));

    let negativo = store.ajustar_estoque(item.id, Decimal::from(-100), None).await;
    assert!(matches!(
        negativo,
        Err(AppError::Invariante(ViolacaoInvariante::ValorNegativo { .. }))
    ));
    assert_eq!(store.estado().item_estoque(item.id).unwrap().quantidade, Decimal::from(18));
}

#[tokio::test]
async fn kanban_expedicao_e_remocao_em_cascata() {
    let (store, gateway) = store_com(MemoryGateway::new());
    let obra = store.add_obra(payload(nova_obra("OB-300"))).await.unwrap();
    let peca = store
        .add_peca(payload(json!({ "obraId": obra.id, "marca": "V-7", "pesoUnitario": 80, "quantidade": 3 })))
        .await
        .unwrap();

    let movida = store.mover_peca_etapa(peca.id, EtapaProducao::Pintura).await.unwrap();
    assert_eq!(movida.etapa, EtapaProducao::Pintura);
    assert_eq!(gateway.registros(Tabela::Pecas)[0]["etapa"], json!("pintura"));

    let romaneio = store
        .add_expedicao(payload(json!({ "codigo": "ROM-01", "obraId": obra.id, "pecas": [peca.id] })))
        .await
        .unwrap();
    assert_eq!(store.use_expedicao().pesos[&romaneio.id], Decimal::from(240));

    let segundo = store
        .add_expedicao(payload(json!({ "codigo": "ROM-02", "obraId": obra.id, "pecas": [peca.id] })))
        .await;
    assert!(matches!(
        segundo,
        Err(AppError::Invariante(ViolacaoInvariante::PecaEmOutraExpedicao { .. }))
    ));

    let entregue = store
        .atualizar_status_expedicao(romaneio.id, StatusExpedicao::Entregue)
        .await
        .unwrap();
    assert_eq!(entregue.status, StatusExpedicao::Entregue);
    assert!(entregue.data_entrega.is_some());

    store.remove_obra(obra.id).await.unwrap();
    let estado = store.estado();
    assert!(estado.obras.is_empty());
    assert!(estado.pecas.is_empty());
}

#[tokio::test]
async fn remocao_que_falha_no_servidor_continua_local() {
    let (store, gateway) = store_com(MemoryGateway::new());
    let equipe = store
        .add_equipe(payload(json!({ "nome": "Montagem A", "membros": ["Carlos", "Rita"] })))
        .await
        .unwrap();

    gateway.falhar_proximas(1);
    let resultado = store.remove_equipe(equipe.id).await;

    assert!(resultado.is_err());
    assert!(store.estado().equipes.is_empty());
    assert_eq!(gateway.registros(Tabela::Equipes).len(), 1);
    assert_eq!(store.estado().notificacoes.len(), 1);
}

#[tokio::test]
async fn escrita_chega_ao_backend_mesmo_sem_esperar_o_pendente() {
    let (store, gateway) = store_com(MemoryGateway::new());

    drop(store.add_obra(payload(nova_obra("OB-400"))));
    let id = store.estado().obras[0].id;
    drop(store.update_obra(id, patch(json!({ "responsavel": "Eng. Marta" }))));

    tokio::time::sleep(Duration::from_millis(50)).await;

    let gravadas = gateway.registros(Tabela::Obras);
    assert_eq!(gravadas.len(), 1);
    assert_eq!(gravadas[0]["codigo"], json!("OB-400"));
    assert_eq!(gravadas[0]["responsavel"], json!("Eng. Marta"));
}

#[tokio::test]
async fn resposta_atrasada_nao_desfaz_update_mais_novo() {
    let (store, gateway) = store_com(MemoryGateway::new());
    let obra = store.add_obra(payload(nova_obra("OB-500"))).await.unwrap();

    let liberar = gateway.segurar_proxima_resposta();
    let primeira = store.update_obra(obra.id, patch(json!({ "responsavel": "Eng. Marta" })));
    // Gravada no servidor, resposta presa na volta
    esperar_escritas(&gateway, 2).await;

    store
        .update_obra(obra.id, patch(json!({ "nome": "Galpão Ampliado" })))
        .await
        .unwrap();
    liberar.notify_one();
    primeira.await.unwrap();

    assert_eq!(gateway.registros(Tabela::Obras)[0]["nome"], json!("Galpão Ampliado"));
    let estado = store.estado();
    let local = estado.obra(obra.id).unwrap();
    assert_eq!(local.nome, "Galpão Ampliado");
    assert_eq!(local.responsavel.as_deref(), Some("Eng. Marta"));
}

#[tokio::test]
async fn remocao_antes_do_envio_nao_cria_no_backend() {
    let (store, gateway) = store_com(MemoryGateway::new());

    let pendente = store.add_obra(payload(nova_obra("OB-600")));
    let id = store.estado().obras[0].id;
    store.remove_obra(id).await.unwrap();

    assert!(matches!(pendente.await, Err(AppError::OperacaoCancelada { .. })));
    assert_eq!(gateway.total_escritas(), 0);
    assert!(store.estado().obras.is_empty());
    assert!(store.estado().notificacoes.is_empty());
}

#[tokio::test]
async fn remocao_durante_a_criacao_apaga_no_backend() {
    let (store, gateway) = store_com(MemoryGateway::new().com_ids_do_servidor());
    let liberar = gateway.segurar_proxima_resposta();

    let pendente = store.add_obra(payload(nova_obra("OB-700")));
    let id_local = store.estado().obras[0].id;
    esperar_escritas(&gateway, 1).await;
    assert_eq!(gateway.registros(Tabela::Obras).len(), 1);

    store.remove_obra(id_local).await.unwrap();
    liberar.notify_one();

    assert!(matches!(pendente.await, Err(AppError::OperacaoCancelada { .. })));
    assert!(gateway.registros(Tabela::Obras).is_empty());
    assert_eq!(gateway.total_escritas(), 2);
    assert!(store.estado().obras.is_empty());
}
