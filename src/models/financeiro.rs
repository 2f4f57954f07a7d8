// src/models/financeiro.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{validar_nao_negativo, Entidade, StatusLancamento, TipoLancamento};
use crate::db::Tabela;

// --- Tabelas fixas de exibição ---
// O lançamento guarda o código. Código que não estiver aqui continua gravado e aparece como "Outros".

pub const ROTULO_OUTROS: &str = "Outros";

pub const CATEGORIAS: &[(&str, &str)] = &[
    ("materia_prima", "Matéria-prima"),
    ("mao_de_obra", "Mão de obra"),
    ("terceirizados", "Serviços terceirizados"),
    ("transporte", "Transporte"),
    ("energia", "Energia"),
    ("manutencao", "Manutenção"),
    ("impostos", "Impostos"),
    ("administrativo", "Administrativo"),
    ("medicao", "Medição de obra"),
    ("venda", "Venda"),
];

pub const CENTROS_CUSTO: &[(&str, &str)] = &[
    ("producao", "Produção"),
    ("comercial", "Comercial"),
    ("engenharia", "Engenharia"),
    ("logistica", "Logística"),
    ("administrativo", "Administrativo"),
];

fn rotulo(tabela: &[(&str, &'static str)], codigo: &str) -> &'static str {
    tabela
        .iter()
        .find(|(chave, _)| *chave == codigo)
        .map(|(_, rotulo)| *rotulo)
        .unwrap_or(ROTULO_OUTROS)
}

pub fn rotulo_categoria(codigo: &str) -> &'static str {
    rotulo(CATEGORIAS, codigo)
}

pub fn rotulo_centro_custo(codigo: &str) -> &'static str {
    rotulo(CENTROS_CUSTO, codigo)
}

// Lançamento de receita ou despesa
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Lancamento {
    pub id: Uuid,
    pub descricao: String,
    pub categoria: String,
    pub centro_custo: String,
    pub valor: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<NaiveDate>,
    pub status: StatusLancamento,
    pub tipo: TipoLancamento,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub obra_id: Option<Uuid>,
}

impl Entidade for Lancamento {
    const TABELA: Tabela = Tabela::Lancamentos;

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Lancamento {
    pub fn categoria_rotulo(&self) -> &'static str {
        rotulo_categoria(&self.categoria)
    }

    pub fn centro_custo_rotulo(&self) -> &'static str {
        rotulo_centro_custo(&self.centro_custo)
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NovoLancamento {
    #[validate(length(min = 1, message = "A descrição é obrigatória."))]
    pub descricao: String,

    #[serde(default)]
    pub categoria: String,

    #[serde(default)]
    pub centro_custo: String,

    #[validate(custom(function = "validar_nao_negativo"))]
    pub valor: Decimal,

    pub data: Option<NaiveDate>,
    pub tipo: TipoLancamento,
    pub status: Option<StatusLancamento>,
    pub obra_id: Option<Uuid>,
}

impl NovoLancamento {
    pub fn into_lancamento(self, id: Uuid) -> Lancamento {
        Lancamento {
            id,
            descricao: self.descricao,
            categoria: self.categoria,
            centro_custo: self.centro_custo,
            valor: self.valor,
            data: self.data,
            status: self.status.unwrap_or_default(),
            tipo: self.tipo,
            obra_id: self.obra_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codigo_desconhecido_cai_em_outros() {
        assert_eq!(rotulo_categoria("materia_prima"), "Matéria-prima");
        assert_eq!(rotulo_categoria("cafe_da_fabrica"), ROTULO_OUTROS);
        assert_eq!(rotulo_centro_custo(""), ROTULO_OUTROS);
    }

    #[test]
    fn lancamento_com_categoria_desconhecida_continua_valido() {
        let lancamento = Lancamento {
            categoria: "categoria_antiga".into(),
            centro_custo: "logistica".into(),
            ..Lancamento::default()
        };
        assert_eq!(lancamento.categoria_rotulo(), "Outros");
        assert_eq!(lancamento.centro_custo_rotulo(), "Logística");
    }
}
