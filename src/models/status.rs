// src/models/status.rs

use serde::{Deserialize, Serialize};

// Todos os campos de status do domínio seguem o mesmo formato:
// um conjunto fechado de grafias canônicas + `Outro(String)` para o que o backend
// mandar e ainda não conhecemos (passa adiante sem alteração).
macro_rules! enum_status {
    (
        $(#[$meta:meta])*
        pub enum $nome:ident (padrao = $padrao:ident) {
            $( $variante:ident => $texto:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(from = "String", into = "String")]
        pub enum $nome {
            $( $variante, )+
            Outro(String),
        }

        impl $nome {
            pub const CANONICOS: &'static [&'static str] = &[$( $texto ),+];

            pub fn as_str(&self) -> &str {
                match self {
                    $( Self::$variante => $texto, )+
                    Self::Outro(valor) => valor.as_str(),
                }
            }
        }

        impl Default for $nome {
            fn default() -> Self {
                Self::$padrao
            }
        }

        impl From<String> for $nome {
            fn from(valor: String) -> Self {
                match valor.as_str() {
                    $( $texto => Self::$variante, )+
                    _ => Self::Outro(valor),
                }
            }
        }

        impl From<&str> for $nome {
            fn from(valor: &str) -> Self {
                Self::from(valor.to_owned())
            }
        }

        impl From<$nome> for String {
            fn from(valor: $nome) -> String {
                valor.as_str().to_owned()
            }
        }

        impl std::fmt::Display for $nome {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

enum_status! {
    /// Situação da obra no ciclo comercial/produtivo.
    pub enum StatusObra (padrao = Orcamento) {
        Orcamento => "orcamento",
        Aprovado => "aprovado",
        EmProjeto => "em_projeto",
        AguardandoMaterial => "aguardando_material",
        EmProducao => "em_producao",
        EmExpedicao => "em_expedicao",
        EmMontagem => "em_montagem",
        Concluido => "concluido",
        Cancelado => "cancelado",
    }
}

enum_status! {
    /// Colunas do Kanban de produção, na ordem em que a peça anda.
    pub enum EtapaProducao (padrao = Aguardando) {
        Aguardando => "aguardando",
        Corte => "corte",
        Fabricacao => "fabricacao",
        Solda => "solda",
        Pintura => "pintura",
        Expedicao => "expedicao",
        Montagem => "montagem",
        Concluido => "concluido",
    }
}

enum_status! {
    pub enum StatusMontagem (padrao = Pendente) {
        Pendente => "pendente",
        EmMontagem => "em_montagem",
        Montado => "montado",
    }
}

enum_status! {
    /// Estágios do funil comercial.
    pub enum StatusOrcamento (padrao = Rascunho) {
        Rascunho => "rascunho",
        Enviado => "enviado",
        EmNegociacao => "em_negociacao",
        Aprovado => "aprovado",
        Recusado => "recusado",
        Expirado => "expirado",
    }
}

enum_status! {
    pub enum StatusExpedicao (padrao = Aguardando) {
        Aguardando => "aguardando",
        Carregando => "carregando",
        EmTransito => "em_transito",
        Entregue => "entregue",
        Problema => "problema",
    }
}

enum_status! {
    pub enum StatusMedicao (padrao = Pendente) {
        Pendente => "pendente",
        Aprovada => "aprovada",
        Faturada => "faturada",
        Paga => "paga",
    }
}

enum_status! {
    pub enum StatusLancamento (padrao = Pendente) {
        Pago => "pago",
        Pendente => "pendente",
        Atrasado => "atrasado",
    }
}

enum_status! {
    pub enum TipoLancamento (padrao = Despesa) {
        Receita => "receita",
        Despesa => "despesa",
    }
}

impl StatusExpedicao {
    /// Romaneio ainda não entregue: as peças dele não podem entrar em outro.
    pub fn em_aberto(&self) -> bool {
        !matches!(self, StatusExpedicao::Entregue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grafia_desconhecida_sobrevive_ida_e_volta() {
        let status: StatusObra = serde_json::from_str("\"pausada_pelo_cliente\"").unwrap();
        assert_eq!(status, StatusObra::Outro("pausada_pelo_cliente".into()));
        assert_eq!(serde_json::to_string(&status).unwrap(), "\"pausada_pelo_cliente\"");
    }

    #[test]
    fn canonicos_viram_variantes() {
        for texto in EtapaProducao::CANONICOS {
            let etapa = EtapaProducao::from(*texto);
            assert!(!matches!(etapa, EtapaProducao::Outro(_)), "{texto}");
            assert_eq!(etapa.as_str(), *texto);
        }
    }

    #[test]
    fn ordem_do_kanban_segue_a_declaracao() {
        assert!(EtapaProducao::Corte < EtapaProducao::Solda);
        assert!(EtapaProducao::Montagem < EtapaProducao::Concluido);
    }
}
