pub mod gateway;
pub use gateway::{Gateway, Ordenacao};
pub mod tabela;
pub use tabela::Tabela;
pub mod pg_gateway;
pub use pg_gateway::PgGateway;
pub mod memory_gateway;
pub use memory_gateway::MemoryGateway;
