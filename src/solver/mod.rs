//! The solver core: elimination arenas and queues, samplers, the
//! low-stretch tree builder, both approximate factorizations, and the
//! PCG driver tying them together.

mod akpw;
mod alias;
mod conditioning;
mod core;
mod degree_pq;
mod factor;
mod info;
mod ldlinv;
mod llgraph;
mod lls;
mod order;
mod pcg;
mod settings;
mod sketch;

//re-export to appear as one module
pub use self::core::*;
pub use akpw::{akpw, average_stretch};
pub use alias::*;
pub use conditioning::*;
pub use degree_pq::*;
pub use factor::*;
pub use info::*;
pub use ldlinv::*;
pub use llgraph::*;
pub use lls::*;
pub use order::*;
pub use pcg::*;
pub use settings::*;
pub use sketch::*;
