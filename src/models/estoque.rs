// src/models/estoque.rs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::{validar_nao_negativo, Entidade};
use crate::db::Tabela;

// Saldo de um material. O nível (crítico/baixo/normal/alto) é sempre derivado, nunca gravado.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ItemEstoque {
    pub id: Uuid,
    pub material: String,
    pub tipo: String,
    pub quantidade: Decimal,
    pub minimo: Decimal,
    pub maximo: Decimal,
    pub preco_kg: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unidade: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub localizacao: Option<String>,
}

impl Entidade for ItemEstoque {
    const TABELA: Tabela = Tabela::Estoque;

    fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validar_faixa_estoque"))]
pub struct NovoItemEstoque {
    #[validate(length(min = 1, message = "O material é obrigatório."))]
    pub material: String,

    #[serde(default)]
    pub tipo: String,

    #[validate(custom(function = "validar_nao_negativo"))]
    #[serde(default)]
    pub quantidade: Decimal,

    #[validate(custom(function = "validar_nao_negativo"))]
    #[serde(default)]
    pub minimo: Decimal,

    #[validate(custom(function = "validar_nao_negativo"))]
    #[serde(default)]
    pub maximo: Decimal,

    #[validate(custom(function = "validar_nao_negativo"))]
    #[serde(default)]
    pub preco_kg: Decimal,

    pub unidade: Option<String>,
    pub localizacao: Option<String>,
}

// Máximo zero = sem teto definido
fn validar_faixa_estoque(item: &NovoItemEstoque) -> Result<(), ValidationError> {
    if !item.maximo.is_zero() && item.maximo < item.minimo {
        let mut err = ValidationError::new("MaximoMenorQueMinimo");
        err.message = Some("O estoque máximo não pode ser menor que o mínimo.".into());
        return Err(err);
    }
    Ok(())
}

impl NovoItemEstoque {
    pub fn into_item(self, id: Uuid) -> ItemEstoque {
        ItemEstoque {
            id,
            material: self.material,
            tipo: self.tipo,
            quantidade: self.quantidade,
            minimo: self.minimo,
            maximo: self.maximo,
            preco_kg: self.preco_kg,
            unidade: self.unidade,
            localizacao: self.localizacao,
        }
    }
}
