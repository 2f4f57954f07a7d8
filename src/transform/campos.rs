// src/transform/campos.rs

use serde_json::{Map, Value};

use super::status_map::DominioStatus;
use crate::db::Tabela;

/// Valor que entra no lugar de um campo obrigatório ausente ou nulo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Padrao {
    Zero,
    TextoVazio,
    ListaVazia,
    ObjetoVazio,
    Verdadeiro,
    Texto(&'static str),
}

impl Padrao {
    pub fn valor(self) -> Value {
        match self {
            Padrao::Zero => Value::from(0),
            Padrao::TextoVazio => Value::String(String::new()),
            Padrao::ListaVazia => Value::Array(Vec::new()),
            Padrao::ObjetoVazio => Value::Object(Map::new()),
            Padrao::Verdadeiro => Value::Bool(true),
            Padrao::Texto(texto) => Value::String(texto.to_owned()),
        }
    }
}

/// Uma linha do mapa de campos: nome no banco, nome no runtime e como tratar ausência.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Campo {
    pub persistido: &'static str,
    pub runtime: &'static str,
    pub obrigatorio: Option<Padrao>,
    pub status: Option<DominioStatus>,
    // Coluna antiga lida só quando a atual não vem
    pub legado: Option<&'static str>,
}

impl Campo {
    const fn novo(persistido: &'static str, runtime: &'static str) -> Self {
        Self {
            persistido,
            runtime,
            obrigatorio: None,
            status: None,
            legado: None,
        }
    }

    const fn padrao(mut self, padrao: Padrao) -> Self {
        self.obrigatorio = Some(padrao);
        self
    }

    const fn status(mut self, dominio: DominioStatus, padrao: &'static str) -> Self {
        self.status = Some(dominio);
        self.obrigatorio = Some(Padrao::Texto(padrao));
        self
    }

    const fn legado(mut self, coluna: &'static str) -> Self {
        self.legado = Some(coluna);
        self
    }
}

// Atalho: mesmo nome dos dois lados
const fn c(nome: &'static str) -> Campo {
    Campo::novo(nome, nome)
}

const fn r(persistido: &'static str, runtime: &'static str) -> Campo {
    Campo::novo(persistido, runtime)
}

use DominioStatus as D;
use Padrao::*;

// ---
// Mapas por tabela. `id` e os carimbos de data entram em todas.
// ---

const OBRAS: &[Campo] = &[
    c("id"),
    r("created_at", "createdAt"),
    r("updated_at", "updatedAt"),
    c("codigo").padrao(TextoVazio),
    c("nome").padrao(TextoVazio),
    r("cliente_nome", "cliente").padrao(TextoVazio),
    r("cliente_id", "clienteId"),
    c("status").status(D::Obra, "orcamento"),
    r("valor_contrato", "valorContrato").padrao(Zero),
    r("peso_total", "pesoTotal").padrao(Zero),
    c("progresso").padrao(ObjetoVazio),
    r("data_inicio", "dataInicio"),
    r("data_previsao", "dataPrevisao"),
    c("responsavel"),
];

const PECAS: &[Campo] = &[
    c("id"),
    r("created_at", "createdAt"),
    r("updated_at", "updatedAt"),
    r("obra_id", "obraId"),
    c("marca").padrao(TextoVazio),
    c("perfil").padrao(TextoVazio),
    r("peso_unitario", "pesoUnitario").padrao(Zero),
    c("quantidade").padrao(Zero),
    c("etapa")
        .status(D::Etapa, "aguardando")
        .legado("status_producao"),
    r("status_montagem", "statusMontagem").status(D::Montagem, "pendente"),
    r("lista_id", "listaId"),
];

const ESTOQUE: &[Campo] = &[
    c("id"),
    r("created_at", "createdAt"),
    r("updated_at", "updatedAt"),
    c("material").padrao(TextoVazio),
    c("tipo").padrao(TextoVazio),
    c("quantidade").padrao(Zero),
    r("estoque_minimo", "minimo").padrao(Zero),
    r("estoque_maximo", "maximo").padrao(Zero),
    r("preco_kg", "precoKg").padrao(Zero),
    c("unidade"),
    c("localizacao"),
];

const ORCAMENTOS: &[Campo] = &[
    c("id"),
    r("created_at", "createdAt"),
    r("updated_at", "updatedAt"),
    c("numero").padrao(TextoVazio),
    r("nome_obra", "nomeObra").padrao(TextoVazio),
    r("cliente_nome", "cliente").padrao(TextoVazio),
    r("valor_total", "valorTotal").padrao(Zero),
    r("peso_estimado", "pesoEstimado").padrao(Zero),
    c("probabilidade").padrao(Zero),
    c("validade"),
    c("status").status(D::Orcamento, "rascunho"),
    r("obra_id", "obraId"),
];

const EXPEDICOES: &[Campo] = &[
    c("id"),
    r("created_at", "createdAt"),
    r("updated_at", "updatedAt"),
    c("codigo").padrao(TextoVazio),
    r("obra_id", "obraId"),
    c("status").status(D::Expedicao, "aguardando"),
    r("pecas_ids", "pecas").padrao(ListaVazia),
    c("transportadora"),
    r("placa_veiculo", "placa"),
    r("data_saida", "dataSaida"),
    r("data_entrega", "dataEntrega"),
];

const MEDICOES: &[Campo] = &[
    c("id"),
    r("created_at", "createdAt"),
    r("updated_at", "updatedAt"),
    c("numero").padrao(Zero),
    r("obra_id", "obraId"),
    c("data"),
    c("valor").padrao(Zero),
    c("peso").padrao(Zero),
    c("status").status(D::Medicao, "pendente"),
    c("observacoes"),
];

const LANCAMENTOS: &[Campo] = &[
    c("id"),
    r("created_at", "createdAt"),
    r("updated_at", "updatedAt"),
    c("descricao").padrao(TextoVazio),
    c("categoria").padrao(TextoVazio),
    r("centro_custo", "centroCusto").padrao(TextoVazio),
    c("valor").padrao(Zero),
    c("data"),
    c("status").status(D::Lancamento, "pendente"),
    c("tipo").status(D::TipoLancamento, "despesa"),
    r("obra_id", "obraId"),
];

const EQUIPES: &[Campo] = &[
    c("id"),
    r("created_at", "createdAt"),
    r("updated_at", "updatedAt"),
    c("nome").padrao(TextoVazio),
    c("lider"),
    c("membros").padrao(ListaVazia),
    c("especialidade"),
    r("obra_id", "obraId"),
    c("ativa").padrao(Verdadeiro),
];

// --- Tabelas sem coleção no estado (só leitura / apoio) ---

const CLIENTES: &[Campo] = &[
    c("id"),
    r("created_at", "createdAt"),
    r("updated_at", "updatedAt"),
    r("razao_social", "razaoSocial").padrao(TextoVazio),
    r("nome_fantasia", "nomeFantasia"),
    c("cnpj"),
    c("email"),
    c("telefone"),
    c("cidade"),
];

const LISTAS: &[Campo] = &[
    c("id"),
    r("created_at", "createdAt"),
    r("updated_at", "updatedAt"),
    r("obra_id", "obraId"),
    c("nome").padrao(TextoVazio),
    c("revisao"),
    r("peso_total", "pesoTotal").padrao(Zero),
];

const FUNCIONARIOS: &[Campo] = &[
    c("id"),
    r("created_at", "createdAt"),
    r("updated_at", "updatedAt"),
    c("nome").padrao(TextoVazio),
    c("cargo"),
    r("equipe_id", "equipeId"),
    c("salario"),
    c("ativo").padrao(Verdadeiro),
];

const COMPRAS: &[Campo] = &[
    c("id"),
    r("created_at", "createdAt"),
    r("updated_at", "updatedAt"),
    c("fornecedor").padrao(TextoVazio),
    r("obra_id", "obraId"),
    r("valor_total", "valorTotal").padrao(Zero),
    c("status"),
    r("data_pedido", "dataPedido"),
];

const NOTAS_FISCAIS: &[Campo] = &[
    c("id"),
    r("created_at", "createdAt"),
    r("updated_at", "updatedAt"),
    c("numero").padrao(TextoVazio),
    c("fornecedor"),
    c("valor").padrao(Zero),
    r("data_emissao", "dataEmissao"),
    r("compra_id", "compraId"),
];

const MOV_ESTOQUE: &[Campo] = &[
    c("id"),
    r("created_at", "createdAt"),
    r("updated_at", "updatedAt"),
    r("item_id", "itemId"),
    c("tipo").padrao(TextoVazio),
    c("quantidade").padrao(Zero),
    r("obra_id", "obraId"),
    c("observacao"),
];

const MAQUINAS: &[Campo] = &[
    c("id"),
    r("created_at", "createdAt"),
    r("updated_at", "updatedAt"),
    c("nome").padrao(TextoVazio),
    c("tipo"),
    c("status"),
    r("ultima_manutencao", "ultimaManutencao"),
];

const PEDIDOS_MATERIAL: &[Campo] = &[
    c("id"),
    r("created_at", "createdAt"),
    r("updated_at", "updatedAt"),
    r("obra_id", "obraId"),
    c("material").padrao(TextoVazio),
    c("quantidade").padrao(Zero),
    c("status"),
    r("data_necessidade", "dataNecessidade"),
];

const CONFIG_MEDICAO: &[Campo] = &[
    c("id"),
    r("created_at", "createdAt"),
    r("updated_at", "updatedAt"),
    r("obra_id", "obraId"),
    r("percentual_retencao", "percentualRetencao").padrao(Zero),
    r("dia_corte", "diaCorte"),
];

/// O contrato de nomes de uma tabela.
pub fn campos(tabela: Tabela) -> &'static [Campo] {
    match tabela {
        Tabela::Obras => OBRAS,
        Tabela::Pecas => PECAS,
        Tabela::Estoque => ESTOQUE,
        Tabela::Orcamentos => ORCAMENTOS,
        Tabela::Expedicoes => EXPEDICOES,
        Tabela::Medicoes => MEDICOES,
        Tabela::Lancamentos => LANCAMENTOS,
        Tabela::Equipes => EQUIPES,
        Tabela::Clientes => CLIENTES,
        Tabela::Listas => LISTAS,
        Tabela::Funcionarios => FUNCIONARIOS,
        Tabela::Compras => COMPRAS,
        Tabela::NotasFiscais => NOTAS_FISCAIS,
        Tabela::MovEstoque => MOV_ESTOQUE,
        Tabela::Maquinas => MAQUINAS,
        Tabela::PedidosMaterial => PEDIDOS_MATERIAL,
        Tabela::ConfigMedicao => CONFIG_MEDICAO,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nomes_sao_unicos_dos_dois_lados() {
        for tabela in Tabela::TODAS {
            let mapa = campos(tabela);
            for (i, campo) in mapa.iter().enumerate() {
                for outro in &mapa[i + 1..] {
                    assert_ne!(campo.persistido, outro.persistido, "{tabela}");
                    assert_ne!(campo.runtime, outro.runtime, "{tabela}");
                }
            }
        }
    }

    #[test]
    fn toda_tabela_tem_id() {
        for tabela in Tabela::TODAS {
            assert!(campos(tabela).iter().any(|c| c.persistido == "id"), "{tabela}");
        }
    }

    #[test]
    fn padrao_de_status_e_canonico() {
        for tabela in Tabela::TODAS {
            for campo in campos(tabela) {
                if let (Some(dominio), Some(Padrao::Texto(padrao))) = (campo.status, campo.obrigatorio) {
                    assert!(dominio.canonicos().contains(&padrao), "{tabela}.{}", campo.persistido);
                }
            }
        }
    }
}
