// src/db/pg_gateway.rs

use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{Gateway, Ordenacao, Tabela},
    transform::RegistroPersistido,
};

// O Gateway real: fala com o Postgres (Supabase) via sqlx.
// Toda linha volta como JSONB (`to_jsonb`) e toda escrita entra via `jsonb_populate_record`,
// assim o formato persistido é sempre o mapa snake_case que a camada de transformação espera.
#[derive(Clone)]
pub struct PgGateway {
    pool: PgPool,
}

impl PgGateway {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Gateway for PgGateway {
    async fn list(
        &self,
        tabela: Tabela,
        ordem: &Ordenacao,
        limite: Option<i64>,
    ) -> Result<Vec<RegistroPersistido>, AppError> {
        let sql = sql_listar(tabela, ordem)?;

        // LIMIT NULL no Postgres = sem limite
        let linhas = sqlx::query_scalar::<_, Value>(&sql)
            .bind(limite)
            .fetch_all(&self.pool)
            .await
            .map_err(mapear_erro_sqlx)?;

        linhas.into_iter().map(|linha| em_registro(tabela, linha)).collect()
    }

    async fn create(
        &self,
        tabela: Tabela,
        payload: RegistroPersistido,
    ) -> Result<RegistroPersistido, AppError> {
        // Chaves com null ficam de fora para os DEFAULTs da tabela valerem (created_at, etc.)
        let colunas = colunas_do_payload(&payload, true)?;
        if colunas.is_empty() {
            return Err(AppError::RegistroInvalido {
                tabela,
                motivo: "payload vazio".into(),
            });
        }
        let sql = sql_inserir(tabela, &colunas);

        let linha = sqlx::query_scalar::<_, Value>(&sql)
            .bind(Value::Object(payload))
            .fetch_one(&self.pool)
            .await
            .map_err(mapear_erro_sqlx)?;

        em_registro(tabela, linha)
    }

    async fn update(
        &self,
        tabela: Tabela,
        id: Uuid,
        patch: RegistroPersistido,
    ) -> Result<RegistroPersistido, AppError> {
        // Aqui null é intencional (limpar um campo), então entra no SET
        let colunas = colunas_do_payload(&patch, false)?;
        if colunas.is_empty() {
            return Err(AppError::RegistroInvalido {
                tabela,
                motivo: "patch vazio".into(),
            });
        }
        let sql = sql_atualizar(tabela, &colunas);

        let linha = sqlx::query_scalar::<_, Value>(&sql)
            .bind(Value::Object(patch))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(mapear_erro_sqlx)?
            .ok_or(AppError::RegistroNaoEncontrado { tabela, id })?;

        em_registro(tabela, linha)
    }

    async fn delete(&self, tabela: Tabela, id: Uuid) -> Result<(), AppError> {
        let resultado = sqlx::query(&sql_excluir(tabela))
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(mapear_erro_sqlx)?;

        if resultado.rows_affected() == 0 {
            return Err(AppError::RegistroNaoEncontrado { tabela, id });
        }
        Ok(())
    }

    async fn check_connection(&self) -> bool {
        match sqlx::query("SELECT 1").execute(&self.pool).await {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!("Backend indisponível: {}", e);
                false
            }
        }
    }
}

// ---
// Montagem do SQL
// ---
// Nome de tabela vem do enum; nome de coluna vem do registro, então passa por validação.

pub(crate) fn validar_identificador(nome: &str) -> Result<&str, AppError> {
    let mut chars = nome.chars();
    let primeiro_ok = chars
        .next()
        .is_some_and(|c| c.is_ascii_lowercase() || c == '_');
    let resto_ok = chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');

    if primeiro_ok && resto_ok {
        Ok(nome)
    } else {
        Err(AppError::IdentificadorInvalido(nome.to_string()))
    }
}

pub(crate) fn colunas_do_payload(
    registro: &RegistroPersistido,
    ignorar_nulos: bool,
) -> Result<Vec<&str>, AppError> {
    registro
        .iter()
        .filter(|(_, valor)| !(ignorar_nulos && valor.is_null()))
        .map(|(chave, _)| validar_identificador(chave))
        .collect()
}

fn lista_de_colunas(colunas: &[&str]) -> String {
    colunas
        .iter()
        .map(|c| format!("\"{c}\""))
        .collect::<Vec<_>>()
        .join(", ")
}

pub(crate) fn sql_listar(tabela: Tabela, ordem: &Ordenacao) -> Result<String, AppError> {
    let coluna = validar_identificador(&ordem.coluna)?;
    let direcao = if ordem.ascendente { "ASC" } else { "DESC" };
    Ok(format!(
        "SELECT to_jsonb(t) FROM {tab} AS t ORDER BY t.\"{coluna}\" {direcao} LIMIT $1",
        tab = tabela.nome()
    ))
}

pub(crate) fn sql_inserir(tabela: Tabela, colunas: &[&str]) -> String {
    let cols = lista_de_colunas(colunas);
    format!(
        "INSERT INTO {tab} ({cols}) SELECT {cols} FROM jsonb_populate_record(NULL::{tab}, $1) RETURNING to_jsonb({tab}.*)",
        tab = tabela.nome()
    )
}

pub(crate) fn sql_atualizar(tabela: Tabela, colunas: &[&str]) -> String {
    let cols = lista_de_colunas(colunas);
    // Com uma coluna só, o Postgres não aceita a forma de lista no SET
    let alvo = if colunas.len() == 1 { cols.clone() } else { format!("({cols})") };
    format!(
        "UPDATE {tab} SET {alvo} = (SELECT {cols} FROM jsonb_populate_record(NULL::{tab}, $1)) WHERE id = $2 RETURNING to_jsonb({tab}.*)",
        tab = tabela.nome()
    )
}

pub(crate) fn sql_excluir(tabela: Tabela) -> String {
    format!("DELETE FROM {} WHERE id = $1", tabela.nome())
}

fn em_registro(tabela: Tabela, linha: Value) -> Result<RegistroPersistido, AppError> {
    match linha {
        Value::Object(registro) => Ok(registro),
        outro => Err(AppError::RegistroInvalido {
            tabela,
            motivo: format!("esperava um objeto JSON, veio {outro}"),
        }),
    }
}

/// Separa o que é permissão (RLS) e o que é rede do resto dos erros de banco.
pub(crate) fn mapear_erro_sqlx(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        // 42501 = insufficient_privilege (política RLS negou a escrita)
        if db_err.code().as_deref() == Some("42501") {
            return AppError::NaoAutorizado(db_err.message().to_string());
        }
    }

    if matches!(
        e,
        sqlx::Error::Io(_) | sqlx::Error::Tls(_) | sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed
    ) {
        return AppError::Transporte(e.to_string());
    }

    AppError::DatabaseError(e)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn registro(valor: Value) -> RegistroPersistido {
        valor.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn listagem_usa_coluna_e_direcao() {
        let sql = sql_listar(Tabela::Obras, &Ordenacao::desc("created_at")).unwrap();
        assert_eq!(
            sql,
            "SELECT to_jsonb(t) FROM obras AS t ORDER BY t.\"created_at\" DESC LIMIT $1"
        );
    }

    #[test]
    fn listagem_recusa_coluna_suspeita() {
        let ordem = Ordenacao::asc("nome; DROP TABLE obras");
        assert!(matches!(
            sql_listar(Tabela::Obras, &ordem),
            Err(AppError::IdentificadorInvalido(_))
        ));
    }

    #[test]
    fn insercao_ignora_nulos_para_valer_o_default() {
        let payload = registro(json!({ "id": "x", "nome": "Galpão", "created_at": null }));
        let colunas = colunas_do_payload(&payload, true).unwrap();
        assert_eq!(colunas, vec!["id", "nome"]);

        let sql = sql_inserir(Tabela::Obras, &colunas);
        assert!(sql.starts_with("INSERT INTO obras (\"id\", \"nome\") SELECT \"id\", \"nome\""));
        assert!(sql.contains("jsonb_populate_record(NULL::obras, $1)"));
    }

    #[test]
    fn atualizacao_de_uma_coluna_nao_usa_lista() {
        let sql = sql_atualizar(Tabela::Pecas, &["etapa"]);
        assert!(sql.starts_with("UPDATE pecas SET \"etapa\" = (SELECT \"etapa\" FROM"));

        let sql = sql_atualizar(Tabela::Pecas, &["etapa", "quantidade"]);
        assert!(sql.starts_with("UPDATE pecas SET (\"etapa\", \"quantidade\") = (SELECT"));
        assert!(sql.ends_with("WHERE id = $2 RETURNING to_jsonb(pecas.*)"));
    }

    #[test]
    fn chaves_com_maiusculas_ou_aspas_sao_recusadas() {
        let payload = registro(json!({ "Nome\"": 1 }));
        assert!(colunas_do_payload(&payload, false).is_err());
        assert!(validar_identificador("_interno_2").is_ok());
        assert!(validar_identificador("2coluna").is_err());
        assert!(validar_identificador("").is_err());
    }
}
