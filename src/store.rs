// src/store.rs

use std::{
    collections::HashSet,
    future::Future,
    pin::Pin,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use tokio::{runtime::Handle, sync::watch};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::{
    common::error::{AppError, ViolacaoInvariante},
    db::{Gateway, Tabela},
    hooks::Memos,
    models::{
        Equipe, Expedicao, ItemEstoque, Lancamento, Medicao, Notificacao, Obra, Orcamento, Peca,
        TipoNotificacao,
    },
    reducer::{self, AcaoColecao, Action, Colecao, ErpState},
    transform::{self, Patch, RegistroIncompleto, RegistroPersistido, RegistroRuntime},
};

/// O resultado de uma escrita otimista. A mudança local já foi aplicada e a chamada ao
/// backend já está rodando quando o hook retorna; descartar o `Pendente` não cancela nada.
pub type Pendente<T> = Pin<Box<dyn Future<Output = Result<T, AppError>> + Send + 'static>>;

pub(crate) fn falhou<T: Send + 'static>(erro: AppError) -> Pendente<T> {
    Box::pin(std::future::ready(Err(erro)))
}

/// O contexto de dados do ERP: estado canônico, Gateway e caches dos hooks de leitura.
///
/// Clonar é barato: todos os clones compartilham o mesmo estado.
#[derive(Clone)]
pub struct ErpStore {
    gateway: Arc<dyn Gateway>,
    estado: Arc<watch::Sender<Arc<ErpState>>>,
    limite_listagem: Option<i64>,
    pub(crate) memos: Arc<Memos>,
    incompletos: Arc<Mutex<Vec<RegistroIncompleto>>>,
    // Ids locais cuja criação ainda não voltou do servidor
    criacoes_pendentes: Arc<Mutex<HashSet<Uuid>>>,
}

impl ErpStore {
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        let (estado, _) = watch::channel(Arc::new(ErpState::default()));
        Self {
            gateway,
            estado: Arc::new(estado),
            limite_listagem: None,
            memos: Arc::default(),
            incompletos: Arc::default(),
            criacoes_pendentes: Arc::default(),
        }
    }

    pub fn com_limite(mut self, limite: Option<i64>) -> Self {
        self.limite_listagem = limite;
        self
    }

    pub fn gateway(&self) -> &Arc<dyn Gateway> {
        &self.gateway
    }

    /// Retrato do estado atual.
    pub fn estado(&self) -> Arc<ErpState> {
        Arc::clone(&self.estado.borrow())
    }

    /// Para a UI observar as mudanças.
    pub fn subscribe(&self) -> watch::Receiver<Arc<ErpState>> {
        self.estado.subscribe()
    }

    /// Aplica uma ação. Devolve `true` se o estado mudou.
    ///
    /// Uma violação de invariante aqui é bug de quem despachou (ver `reducer::reduce`).
    pub fn dispatch(&self, acao: Action) -> bool {
        debug!(acao = %acao.tipo(), "dispatch");
        self.estado.send_if_modified(|estado| {
            let novo = reducer::reduce(estado, &acao);
            if Arc::ptr_eq(estado, &novo) {
                return false;
            }
            *estado = novo;
            true
        })
    }

    /// Como `dispatch`, mas devolve a violação em vez de tratá-la como bug.
    /// Checagem e aplicação acontecem sob a mesma trava.
    pub(crate) fn aplicar(&self, acao: &Action) -> Result<(), ViolacaoInvariante> {
        debug!(acao = %acao.tipo(), "dispatch otimista");
        let mut resultado = Ok(());
        self.estado.send_if_modified(|estado| match reducer::try_reduce(estado, acao) {
            Ok(novo) => {
                let mudou = !Arc::ptr_eq(estado, &novo);
                *estado = novo;
                mudou
            }
            Err(violacao) => {
                resultado = Err(violacao);
                false
            }
        });
        resultado
    }

    // ---
    // Carga
    // ---

    /// Carrega todas as coleções tipadas em paralelo. Falha numa tabela não impede as outras.
    pub async fn carregar_tudo(&self) -> Vec<(Tabela, AppError)> {
        let resultados = tokio::join!(
            self.carregar::<Obra>(),
            self.carregar::<Peca>(),
            self.carregar::<ItemEstoque>(),
            self.carregar::<Orcamento>(),
            self.carregar::<Expedicao>(),
            self.carregar::<Medicao>(),
            self.carregar::<Lancamento>(),
            self.carregar::<Equipe>(),
        );

        let falhas: Vec<(Tabela, AppError)> = [
            resultados.0.err().map(|e| (Tabela::Obras, e)),
            resultados.1.err().map(|e| (Tabela::Pecas, e)),
            resultados.2.err().map(|e| (Tabela::Estoque, e)),
            resultados.3.err().map(|e| (Tabela::Orcamentos, e)),
            resultados.4.err().map(|e| (Tabela::Expedicoes, e)),
            resultados.5.err().map(|e| (Tabela::Medicoes, e)),
            resultados.6.err().map(|e| (Tabela::Lancamentos, e)),
            resultados.7.err().map(|e| (Tabela::Equipes, e)),
        ]
        .into_iter()
        .flatten()
        .collect();

        if falhas.is_empty() {
            info!("✅ Dados do ERP carregados");
        } else {
            let tabelas: Vec<&str> = falhas.iter().map(|(t, _)| t.nome()).collect();
            for (tabela, erro) in &falhas {
                error!(tabela = %tabela, erro = %erro, "❌ Falha ao carregar tabela");
            }
            self.notificar(
                TipoNotificacao::Erro,
                "Falha ao carregar dados",
                format!("Não foi possível carregar: {}", tabelas.join(", ")),
            );
        }

        falhas
    }

    /// Carrega uma coleção e substitui a fatia correspondente do estado.
    pub async fn carregar<T: Colecao>(&self) -> Result<usize, AppError> {
        let tabela = T::TABELA;
        let registros = self
            .gateway
            .list(tabela, &tabela.ordenacao_padrao(), self.limite_listagem)
            .await?;

        let (entidades, avisos) = transform::parse_lista::<T>(&registros);
        let descartados = registros.len() - entidades.len();
        if descartados > 0 {
            warn!(tabela = %tabela, descartados, "Registros descartados na carga");
        }
        self.guardar_incompletos(tabela, avisos);

        let total = entidades.len();
        self.dispatch(T::embrulhar(AcaoColecao::Set(entidades)));
        info!(tabela = %tabela, total, "📦 Coleção carregada");
        Ok(total)
    }

    /// Leitura das tabelas que não têm coleção no estado (clientes, compras, ...).
    pub async fn listar_registros(&self, tabela: Tabela) -> Result<Vec<RegistroRuntime>, AppError> {
        let registros = self
            .gateway
            .list(tabela, &tabela.ordenacao_padrao(), self.limite_listagem)
            .await?;
        Ok(transform::to_runtime_array(tabela, &registros))
    }

    fn guardar_incompletos(&self, tabela: Tabela, avisos: Vec<RegistroIncompleto>) {
        let mut incompletos = self.incompletos.lock().unwrap_or_else(PoisonError::into_inner);
        incompletos.retain(|a| a.tabela != tabela);
        incompletos.extend(avisos);
    }

    /// Avisos da última carga de cada tabela.
    pub fn registros_incompletos(&self) -> Vec<RegistroIncompleto> {
        self.incompletos
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    // ---
    // Notificações
    // ---

    pub fn notificar(
        &self,
        tipo: TipoNotificacao,
        titulo: impl Into<String>,
        mensagem: impl Into<String>,
    ) -> Uuid {
        let notificacao = Notificacao::nova(tipo, titulo, mensagem);
        let id = notificacao.id;
        self.dispatch(Action::AddNotificacao(notificacao));
        id
    }

    pub fn dispensar_notificacao(&self, id: Uuid) {
        self.dispatch(Action::RemoveNotificacao(id));
    }

    // ---
    // Escritas otimistas genéricas
    // ---

    /// Runtime onde a parte de rede das escritas roda. Checado antes da mudança otimista.
    pub(crate) fn runtime(&self) -> Result<Handle, AppError> {
        Handle::try_current().map_err(|e| {
            error!("❌ Escrita sem runtime tokio ativo: {}", e);
            AppError::SemRuntime
        })
    }

    /// Põe a parte de rede para rodar já. O `Pendente` devolvido só espera o resultado.
    pub(crate) fn disparar<T, F>(runtime: &Handle, tarefa: F) -> Pendente<T>
    where
        T: Send + 'static,
        F: Future<Output = Result<T, AppError>> + Send + 'static,
    {
        let tarefa = runtime.spawn(tarefa);
        Box::pin(async move {
            tarefa
                .await
                .map_err(|e| AppError::Transporte(format!("escrita interrompida: {e}")))?
        })
    }

    fn pendentes(&self) -> MutexGuard<'_, HashSet<Uuid>> {
        self.criacoes_pendentes.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn contem<T: Colecao>(&self, id: Uuid) -> bool {
        T::fatia(&self.estado()).iter().any(|e| e.id() == id)
    }

    /// Insere localmente e cria no backend. A resposta do servidor substitui o registro
    /// local inteiro (inclusive o id, se o backend gerar outro).
    ///
    /// Removida antes do envio, a entidade não chega ao backend. Removida com a criação
    /// em voo, o registro criado é apagado em seguida.
    pub(crate) fn criar<T: Colecao>(&self, entidade: T) -> Pendente<T> {
        let runtime = match self.runtime() {
            Ok(runtime) => runtime,
            Err(e) => return falhou(e),
        };
        let id_local = entidade.id();
        self.pendentes().insert(id_local);
        if let Err(violacao) = self.aplicar(&T::embrulhar(AcaoColecao::Add(entidade))) {
            self.pendentes().remove(&id_local);
            return falhou(violacao.into());
        }

        let store = self.clone();
        Self::disparar(&runtime, async move {
            // Envia a versão local mais recente (referências podem ter sido remapeadas)
            let atual = {
                let mut pendentes = store.pendentes();
                let atual = T::fatia(&store.estado()).iter().find(|e| e.id() == id_local).cloned();
                if atual.is_none() {
                    pendentes.remove(&id_local);
                }
                atual
            };
            let Some(atual) = atual else {
                debug!(tabela = %T::TABELA, id = %id_local, "Criação descartada: removida antes do envio");
                return Err(AppError::OperacaoCancelada { tabela: T::TABELA, id: id_local });
            };

            let payload = transform::to_persistence(T::TABELA, &transform::serializar_entidade(&atual)?);
            let resposta = store.gateway.create(T::TABELA, payload).await;

            let removida_em_voo = {
                let mut pendentes = store.pendentes();
                pendentes.remove(&id_local);
                resposta.is_ok() && !store.contem::<T>(id_local)
            };
            if removida_em_voo {
                return store.desfazer_criacao::<T>(id_local, resposta).await;
            }
            store.confirmar::<T>(id_local, resposta, "criar")
        })
    }

    // A entidade foi removida localmente enquanto a criação estava em voo
    async fn desfazer_criacao<T: Colecao>(
        &self,
        id_local: Uuid,
        resposta: Result<RegistroPersistido, AppError>,
    ) -> Result<T, AppError> {
        let criada = resposta
            .and_then(|registro| transform::parse_entidade::<T>(T::TABELA, &registro))
            .map_err(|e| self.registrar_falha(T::TABELA, "criar", e))?;

        info!(tabela = %T::TABELA, id = %criada.id(), "Removida durante a criação: apagando no backend");
        self.gateway
            .delete(T::TABELA, criada.id())
            .await
            .map_err(|e| self.registrar_falha(T::TABELA, "remover", e))?;
        Err(AppError::OperacaoCancelada { tabela: T::TABELA, id: id_local })
    }

    /// Aplica o patch localmente e envia ao backend. Na volta só os campos do patch são
    /// corrigidos, então respostas fora de ordem não desfazem escritas mais novas.
    pub(crate) fn atualizar<T: Colecao>(&self, id: Uuid, patch: Patch) -> Pendente<T> {
        let runtime = match self.runtime() {
            Ok(runtime) => runtime,
            Err(e) => return falhou(e),
        };
        let acao = T::embrulhar(AcaoColecao::Update { id, patch: patch.clone() });
        if let Err(violacao) = self.aplicar(&acao) {
            return falhou(violacao.into());
        }

        let store = self.clone();
        Self::disparar(&runtime, async move {
            let persistido = transform::to_persistence(T::TABELA, &patch);
            let resposta = store.gateway.update(T::TABELA, id, persistido).await;
            store.confirmar_campos::<T>(id, &patch, resposta, "atualizar")
        })
    }

    pub(crate) fn remover<T: Colecao>(&self, id: Uuid) -> Pendente<()> {
        let runtime = match self.runtime() {
            Ok(runtime) => runtime,
            Err(e) => return falhou(e),
        };
        // Mesma trava da criação: ou ela vê a remoção, ou nós vemos que ela já terminou
        let criacao_pendente = {
            let pendentes = self.pendentes();
            self.dispatch(T::embrulhar(AcaoColecao::Remove(id)));
            pendentes.contains(&id)
        };
        if criacao_pendente {
            debug!(tabela = %T::TABELA, id = %id, "Remoção local de criação pendente");
            return Box::pin(std::future::ready(Ok(())));
        }

        let store = self.clone();
        Self::disparar(&runtime, async move {
            store
                .gateway
                .delete(T::TABELA, id)
                .await
                .map_err(|e| store.registrar_falha(T::TABELA, "remover", e))
        })
    }

    /// Resposta do backend para uma criação: substitui o registro local.
    pub(crate) fn confirmar<T: Colecao>(
        &self,
        id_local: Uuid,
        resposta: Result<RegistroPersistido, AppError>,
        operacao: &str,
    ) -> Result<T, AppError> {
        let entidade = resposta
            .and_then(|registro| transform::parse_entidade::<T>(T::TABELA, &registro))
            .map_err(|e| self.registrar_falha(T::TABELA, operacao, e))?;

        self.dispatch(T::embrulhar(AcaoColecao::Reconciliar {
            id_local,
            registro: entidade.clone(),
        }));
        Ok(entidade)
    }

    /// Resposta do backend para um update: corrige só os campos que o patch tocou.
    pub(crate) fn confirmar_campos<T: Colecao>(
        &self,
        id: Uuid,
        patch: &Patch,
        resposta: Result<RegistroPersistido, AppError>,
        operacao: &str,
    ) -> Result<T, AppError> {
        let entidade = resposta
            .and_then(|registro| transform::parse_entidade::<T>(T::TABELA, &registro))
            .map_err(|e| self.registrar_falha(T::TABELA, operacao, e))?;

        let do_servidor = transform::serializar_entidade(&entidade)?;
        let campos: Patch = patch
            .keys()
            .filter(|chave| chave.as_str() != "id")
            .map(|chave| (chave.clone(), do_servidor.get(chave).cloned().unwrap_or_default()))
            .collect();

        self.dispatch(T::embrulhar(AcaoColecao::ReconciliarCampos { id, campos }));
        Ok(entidade)
    }

    /// O estado otimista fica como está; o usuário é avisado.
    pub(crate) fn registrar_falha(&self, tabela: Tabela, operacao: &str, erro: AppError) -> AppError {
        error!(tabela = %tabela, operacao, erro = %erro, "❌ Escrita no backend falhou");
        self.notificar(
            TipoNotificacao::Erro,
            format!("Erro ao {operacao} em {tabela}"),
            erro.mensagem_usuario(),
        );
        erro
    }
}
