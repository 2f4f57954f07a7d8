// src/db/tabela.rs

use std::fmt;

use serde::{Deserialize, Serialize};

use super::Ordenacao;

/// As tabelas do backend que o núcleo conhece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tabela {
    Clientes,
    Obras,
    Orcamentos,
    Listas,
    Estoque,
    Pecas,
    Funcionarios,
    Equipes,
    Compras,
    NotasFiscais,
    MovEstoque,
    Maquinas,
    Medicoes,
    Lancamentos,
    PedidosMaterial,
    Expedicoes,
    ConfigMedicao,
}

impl Tabela {
    pub const TODAS: [Tabela; 17] = [
        Tabela::Clientes,
        Tabela::Obras,
        Tabela::Orcamentos,
        Tabela::Listas,
        Tabela::Estoque,
        Tabela::Pecas,
        Tabela::Funcionarios,
        Tabela::Equipes,
        Tabela::Compras,
        Tabela::NotasFiscais,
        Tabela::MovEstoque,
        Tabela::Maquinas,
        Tabela::Medicoes,
        Tabela::Lancamentos,
        Tabela::PedidosMaterial,
        Tabela::Expedicoes,
        Tabela::ConfigMedicao,
    ];

    /// Nome físico da tabela no Postgres.
    pub fn nome(self) -> &'static str {
        match self {
            Tabela::Clientes => "clientes",
            Tabela::Obras => "obras",
            Tabela::Orcamentos => "orcamentos",
            Tabela::Listas => "listas",
            Tabela::Estoque => "estoque",
            Tabela::Pecas => "pecas",
            Tabela::Funcionarios => "funcionarios",
            Tabela::Equipes => "equipes",
            Tabela::Compras => "compras",
            Tabela::NotasFiscais => "notas_fiscais",
            Tabela::MovEstoque => "mov_estoque",
            Tabela::Maquinas => "maquinas",
            Tabela::Medicoes => "medicoes",
            Tabela::Lancamentos => "lancamentos",
            Tabela::PedidosMaterial => "pedidos_material",
            Tabela::Expedicoes => "expedicoes",
            Tabela::ConfigMedicao => "config_medicao",
        }
    }

    /// Ordenação usada na carga inicial de cada tabela.
    pub fn ordenacao_padrao(self) -> Ordenacao {
        match self {
            Tabela::Estoque => Ordenacao::asc("material"),
            Tabela::Pecas => Ordenacao::asc("marca"),
            Tabela::Clientes => Ordenacao::asc("razao_social"),
            Tabela::Funcionarios | Tabela::Equipes | Tabela::Maquinas => Ordenacao::asc("nome"),
            Tabela::Medicoes => Ordenacao::asc("numero"),
            Tabela::Lancamentos => Ordenacao::desc("data"),
            _ => Ordenacao::desc("created_at"),
        }
    }
}

impl fmt::Display for Tabela {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.nome())
    }
}
