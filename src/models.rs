pub mod status;
pub mod obra;
pub mod producao;
pub mod estoque;
pub mod orcamento;
pub mod expedicao;
pub mod medicao;
pub mod financeiro;
pub mod equipe;
pub mod notificacao;

pub use equipe::{Equipe, NovaEquipe};
pub use estoque::{ItemEstoque, NovoItemEstoque};
pub use expedicao::{Expedicao, NovaExpedicao};
pub use financeiro::{Lancamento, NovoLancamento};
pub use medicao::{Medicao, NovaMedicao};
pub use notificacao::{Notificacao, TipoNotificacao};
pub use obra::{NovaObra, Obra, ETAPAS_OBRA};
pub use orcamento::{NovoOrcamento, Orcamento};
pub use producao::{NovaPeca, Peca};
pub use status::{
    EtapaProducao, StatusExpedicao, StatusLancamento, StatusMedicao, StatusMontagem, StatusObra,
    StatusOrcamento, TipoLancamento,
};

use rust_decimal::{prelude::ToPrimitive, Decimal};
use serde::{de, Deserialize, Deserializer};
use serde_json::Value;
use uuid::Uuid;
use validator::ValidationError;

use crate::db::Tabela;

/// Toda entidade com coleção própria no estado: sabe de qual tabela vem e qual é o seu id.
pub trait Entidade {
    const TABELA: Tabela;

    fn id(&self) -> Uuid;
}

// ---
// Validações customizadas usadas pelos payloads de criação
// ---
pub(crate) fn validar_nao_negativo(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() && !val.is_zero() {
        let mut err = ValidationError::new("range");
        err.add_param("min".into(), &0.0);
        err.message = Some("O valor não pode ser negativo.".into());
        return Err(err);
    }
    Ok(())
}

pub(crate) fn validar_percentual(val: &Decimal) -> Result<(), ValidationError> {
    if *val < Decimal::ZERO || *val > Decimal::ONE_HUNDRED {
        let mut err = ValidationError::new("range");
        err.add_param("min".into(), &0.0);
        err.add_param("max".into(), &100.0);
        err.message = Some("O percentual deve estar entre 0 e 100.".into());
        return Err(err);
    }
    Ok(())
}

// ---
// Desserialização tolerante
// ---

/// Inteiro vindo de coluna `numeric` ou de texto: aceita `2`, `2.0` e `"2"`. Nulo vira o padrão.
pub(crate) fn inteiro_flexivel<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: TryFrom<i64> + Default,
{
    let valor = Value::deserialize(deserializer)?;
    let inteiro = match &valor {
        Value::Null => return Ok(T::default()),
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().and_then(Decimal::from_f64_retain).and_then(inteiro_exato)),
        Value::String(texto) => texto.trim().parse::<Decimal>().ok().and_then(inteiro_exato),
        _ => None,
    };

    inteiro
        .and_then(|n| T::try_from(n).ok())
        .ok_or_else(|| de::Error::custom(format!("esperava um número inteiro, veio {valor}")))
}

fn inteiro_exato(numero: Decimal) -> Option<i64> {
    if numero.fract().is_zero() { numero.to_i64() } else { None }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Contagem {
        #[serde(deserialize_with = "inteiro_flexivel")]
        quantidade: u32,
    }

    fn ler(valor: Value) -> Result<u32, serde_json::Error> {
        serde_json::from_value::<Contagem>(json!({ "quantidade": valor })).map(|c| c.quantidade)
    }

    #[test]
    fn inteiro_aceita_formatos_do_banco() {
        assert_eq!(ler(json!(3)).unwrap(), 3);
        assert_eq!(ler(json!(3.0)).unwrap(), 3);
        assert_eq!(ler(json!(" 12 ")).unwrap(), 12);
        assert_eq!(ler(json!("4.00")).unwrap(), 4);
        assert_eq!(ler(Value::Null).unwrap(), 0);
    }

    #[test]
    fn inteiro_recusa_fracao_e_negativo_em_contagem() {
        assert!(ler(json!(2.5)).is_err());
        assert!(ler(json!(-1)).is_err());
        assert!(ler(json!("muitas")).is_err());
        assert!(ler(json!([1])).is_err());
    }
}
